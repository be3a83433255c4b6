use super::message::{bytes, text};
use super::*;

fn encode_vec(message: &Message) -> heapless::Vec<u8, 1024> {
    message.to_vec().unwrap()
}

fn sample_messages() -> [Message; 30] {
    let will = WillTopic {
        flags: Flags::new().with_qos(QoS::AtLeastOnce).with_retain(true),
        will_topic: text("devices/7/status").unwrap(),
    };
    [
        Message::Advertise(Advertise {
            gw_id: 3,
            duration: 900,
        }),
        Message::SearchGw { radius: 1 },
        Message::GwInfo(GwInfo {
            gw_id: 3,
            gw_address: bytes(&[]).unwrap(),
        }),
        Message::GwInfo(GwInfo {
            gw_id: 5,
            gw_address: bytes(&[0x0A, 0x00, 0x00, 0x01]).unwrap(),
        }),
        Message::Connect(
            Connect::new(Flags::new().with_clean_session(true), 60, "node-7").unwrap(),
        ),
        Message::ConnAck {
            return_code: ReturnCode::Accepted,
        },
        Message::WillTopicReq,
        Message::WillTopic(Some(will.clone())),
        Message::WillMsgReq,
        Message::WillMsg {
            will_msg: bytes(b"offline").unwrap(),
        },
        Message::Register(Register {
            topic_id: 0,
            msg_id: 11,
            topic_name: text("sensors/temp").unwrap(),
        }),
        Message::RegAck(RegAck {
            topic_id: 0x0101,
            msg_id: 11,
            return_code: ReturnCode::Accepted,
        }),
        Message::Publish(
            Publish::new(Flags::new().with_qos(QoS::ExactlyOnce), 0x0101, 12, b"21.5").unwrap(),
        ),
        Message::PubAck(PubAck {
            topic_id: 0x0101,
            msg_id: 12,
            return_code: ReturnCode::RejectedInvalidTopicId,
        }),
        Message::PubComp { msg_id: 12 },
        Message::PubRec { msg_id: 12 },
        Message::PubRel { msg_id: 12 },
        Message::Subscribe(Subscribe::new(
            Flags::new().with_qos(QoS::AtLeastOnce),
            13,
            Topic::name("sensors/#").unwrap(),
        )),
        Message::SubAck(SubAck {
            flags: Flags::new().with_qos(QoS::AtLeastOnce),
            topic_id: 0x0102,
            msg_id: 13,
            return_code: ReturnCode::Accepted,
        }),
        Message::Unsubscribe(Subscribe::new(Flags::new(), 14, Topic::Predefined(0x0009))),
        Message::UnsubAck { msg_id: 14 },
        Message::PingReq {
            client_id: text("").unwrap(),
        },
        Message::PingResp,
        Message::Disconnect {
            duration: Some(3600),
        },
        Message::WillTopicUpd(Some(will)),
        Message::WillTopicUpd(None),
        Message::WillTopicResp {
            return_code: ReturnCode::RejectedNotSupported,
        },
        Message::WillMsgUpd {
            will_msg: bytes(b"gone").unwrap(),
        },
        Message::WillMsgResp {
            return_code: ReturnCode::RejectedCongestion,
        },
        Message::Encapsulated(
            Encapsulated::wrap(0x01, &[0xAA, 0xBB], &Message::PubRel { msg_id: 5 }).unwrap(),
        ),
    ]
}

#[test]
fn test_publish_wire_example() {
    let flags = Flags::new()
        .with_qos(QoS::AtLeastOnce)
        .with_topic_id_type(TopicIdType::Normal);
    let message = Message::Publish(Publish::new(flags, 0x0007, 0x0042, b"ON").unwrap());

    let encoded = encode_vec(&message);
    assert_eq!(
        encoded.as_slice(),
        &[0x09, 0x0C, 0x20, 0x00, 0x07, 0x00, 0x42, b'O', b'N']
    );
}

#[test]
fn test_round_trip_every_type() {
    for message in sample_messages() {
        let encoded = encode_vec(&message);
        let decoded = Message::decode(&encoded).unwrap();
        assert_eq!(decoded, message, "type {:?}", message.message_type());
    }
}

#[test]
fn test_encoded_length_matches_declared_length() {
    for message in sample_messages() {
        let encoded = encode_vec(&message);
        assert_eq!(encoded.len(), message.encoded_len().unwrap());
        if let Message::Encapsulated(encapsulated) = &message {
            let declared = peek_length(&encoded).unwrap();
            assert_eq!(declared + encapsulated.frame.len(), encoded.len());
        } else {
            assert_eq!(peek_length(&encoded).unwrap(), encoded.len());
        }
    }
}

#[test]
fn test_flags_subfields_are_independent() {
    for raw in 0..=u8::MAX {
        let flags = Flags::from_bits(raw);

        for qos in [
            QoS::AtMostOnce,
            QoS::AtLeastOnce,
            QoS::ExactlyOnce,
            QoS::NoConnect,
        ] {
            let updated = flags.with_qos(qos);
            assert_eq!(updated.qos(), qos);
            assert_eq!(updated.bits() & !0x60, raw & !0x60);
        }

        for topic_id_type in [
            TopicIdType::Normal,
            TopicIdType::Predefined,
            TopicIdType::ShortName,
            TopicIdType::Reserved,
        ] {
            let updated = flags.with_topic_id_type(topic_id_type);
            assert_eq!(updated.topic_id_type(), topic_id_type);
            assert_eq!(updated.bits() & !0x03, raw & !0x03);
        }

        assert_eq!(flags.with_dup(true).bits() & !0x80, raw & !0x80);
        assert_eq!(flags.with_retain(false).bits() & !0x10, raw & !0x10);
        assert_eq!(flags.with_will(true).bits() & !0x08, raw & !0x08);
        assert_eq!(flags.with_clean_session(false).bits() & !0x04, raw & !0x04);
    }
}

#[test]
fn test_qos_levels() {
    assert_eq!(Flags::from_bits(message::FLAG_QOS_0).qos().level(), 0);
    assert_eq!(Flags::from_bits(message::FLAG_QOS_1).qos().level(), 1);
    assert_eq!(Flags::from_bits(message::FLAG_QOS_2).qos().level(), 2);
    assert_eq!(Flags::from_bits(message::FLAG_QOS_N1).qos().level(), -1);
}

#[test]
fn test_long_form_header() {
    let data = [0x5A; 300];
    let message = Message::Publish(Publish::new(Flags::new(), 1, 2, &data).unwrap());

    let encoded = encode_vec(&message);
    assert_eq!(encoded.len(), 4 + 5 + 300);
    assert_eq!(&encoded[..4], &[0x01, 0x01, 0x35, 0x0C]);
    assert_eq!(peek_length(&encoded).unwrap(), 309);
    assert_eq!(Message::decode(&encoded).unwrap(), message);
}

#[test]
fn test_short_form_boundary() {
    // 2 header + 5 fixed + 248 data = 255, the last short frame.
    let message = Message::Publish(Publish::new(Flags::new(), 1, 2, &[0; 248]).unwrap());
    let encoded = encode_vec(&message);
    assert_eq!(encoded.len(), 255);
    assert_eq!(encoded[0], 0xFF);

    let message = Message::Publish(Publish::new(Flags::new(), 1, 2, &[0; 249]).unwrap());
    let encoded = encode_vec(&message);
    assert_eq!(encoded.len(), 258);
    assert_eq!(encoded[0], 0x01);
}

#[test]
fn test_decode_errors() {
    assert_eq!(Message::decode(&[]), Err(Error::TruncatedFrame));
    assert_eq!(Message::decode(&[0x01, 0x00]), Err(Error::TruncatedFrame));
    assert_eq!(Message::decode(&[0x00, 0x17]), Err(Error::InconsistentLength));
    assert_eq!(
        Message::decode(&[0x01, 0x00, 0x03, 0x17]),
        Err(Error::InconsistentLength)
    );
    assert_eq!(
        Message::decode(&[0x09, 0x0C, 0x20, 0x00]),
        Err(Error::TruncatedFrame)
    );
    assert_eq!(Message::decode(&[0x02, 0x03]), Err(Error::UnknownType(0x03)));
    assert_eq!(Message::decode(&[0x02, 0x1E]), Err(Error::UnknownType(0x1E)));
    // PUBCOMP is fixed size.
    assert_eq!(
        Message::decode(&[0x05, 0x0E, 0x00, 0x01, 0x09]),
        Err(Error::InconsistentLength)
    );
    assert_eq!(
        Message::decode(&[0x03, 0x0E, 0x00]),
        Err(Error::TruncatedFrame)
    );
    assert_eq!(
        Message::decode(&[0x03, 0x18, 0x00]),
        Err(Error::InconsistentLength)
    );
    assert_eq!(
        Message::decode(&[0x07, 0x04, 0x04, 0x01, 0x00, 0x3C, 0xFF]),
        Err(Error::InvalidUtf8)
    );
}

#[test]
fn test_decode_ignores_trailing_bytes() {
    let frame = [0x04, 0x0E, 0x00, 0x2A, 0xDE, 0xAD, 0xBE, 0xEF];
    assert_eq!(
        Message::decode(&frame).unwrap(),
        Message::PubComp { msg_id: 0x2A }
    );
}

#[test]
fn test_subscribe_topic_follows_flags() {
    let predefined = [0x07, 0x12, 0x01, 0x00, 0x01, 0x00, 0x05];
    match Message::decode(&predefined).unwrap() {
        Message::Subscribe(subscribe) => {
            assert_eq!(subscribe.topic, Topic::Predefined(5));
            assert_eq!(subscribe.msg_id, 1);
        }
        other => panic!("unexpected message {:?}", other),
    }

    let mut as_name = predefined;
    as_name[2] = 0x00;
    match Message::decode(&as_name).unwrap() {
        Message::Subscribe(subscribe) => {
            assert_eq!(subscribe.topic, Topic::Name(text("\u{0}\u{5}").unwrap()))
        }
        other => panic!("unexpected message {:?}", other),
    }

    let mut short = predefined;
    short[2] = 0x02;
    short[5] = b'a';
    short[6] = b'b';
    match Message::decode(&short).unwrap() {
        Message::Subscribe(subscribe) => {
            assert_eq!(subscribe.topic, Topic::ShortName(text("ab").unwrap()))
        }
        other => panic!("unexpected message {:?}", other),
    }
}

#[test]
fn test_subscribe_rejects_bad_topics() {
    assert_eq!(
        Message::decode(&[0x06, 0x12, 0x03, 0x00, 0x01, 0x00]),
        Err(Error::ReservedTopicIdType)
    );
    assert_eq!(
        Message::decode(&[0x08, 0x14, 0x01, 0x00, 0x01, 0x00, 0x05, 0x06]),
        Err(Error::InconsistentLength)
    );
    assert_eq!(
        Message::decode(&[0x06, 0x14, 0x01, 0x00, 0x01, 0x00]),
        Err(Error::InconsistentLength)
    );
}

#[test]
fn test_subscribe_short_name_must_be_two_bytes() {
    assert_eq!(
        Message::decode(&[0x08, 0x12, 0x02, 0x00, 0x01, b'a', b'b', b'c']),
        Err(Error::InconsistentLength)
    );
    assert_eq!(
        Message::decode(&[0x06, 0x12, 0x02, 0x00, 0x01, b'a']),
        Err(Error::InconsistentLength)
    );

    let mut buf = [0u8; 16];
    for name in ["a", "abc", ""] {
        let subscribe = Subscribe::new(Flags::new(), 1, Topic::ShortName(text(name).unwrap()));
        assert_eq!(
            Message::Subscribe(subscribe).encode(&mut buf),
            Err(Error::InconsistentLength)
        );
    }
}

#[test]
fn test_subscribe_flags_must_match_topic() {
    let mut buf = [0u8; 16];
    let predefined = Subscribe {
        flags: Flags::new().with_qos(QoS::AtLeastOnce),
        msg_id: 0x0102,
        topic: Topic::Predefined(0x0304),
    };
    assert_eq!(
        Message::Subscribe(predefined).encode(&mut buf),
        Err(Error::TopicIdTypeMismatch)
    );

    let short = Subscribe {
        flags: Flags::new().with_topic_id_type(TopicIdType::Predefined),
        msg_id: 1,
        topic: Topic::ShortName(text("ab").unwrap()),
    };
    assert_eq!(
        Message::Unsubscribe(short).encode(&mut buf),
        Err(Error::TopicIdTypeMismatch)
    );
    assert_eq!(buf, [0u8; 16]);

    let subscribe = Subscribe::new(
        Flags::new().with_qos(QoS::AtLeastOnce),
        0x0102,
        Topic::Predefined(0x0304),
    );
    let encoded = encode_vec(&Message::Subscribe(subscribe));
    assert_eq!(encoded.as_slice(), &[0x07, 0x12, 0x21, 0x01, 0x02, 0x03, 0x04]);
}

#[test]
fn test_empty_will_topic_deletes_will() {
    assert_eq!(Message::decode(&[0x02, 0x07]), Ok(Message::WillTopic(None)));
    assert_eq!(
        Message::decode(&[0x02, 0x1A]),
        Ok(Message::WillTopicUpd(None))
    );
    assert_eq!(encode_vec(&Message::WillTopic(None)).as_slice(), &[0x02, 0x07]);

    // A flags octet with no topic is still a will topic, just an empty one.
    assert_eq!(
        Message::decode(&[0x03, 0x07, 0x20]),
        Ok(Message::WillTopic(Some(WillTopic {
            flags: Flags::new().with_qos(QoS::AtLeastOnce),
            will_topic: text("").unwrap(),
        })))
    );
}

#[test]
fn test_reserved_return_code_survives() {
    let frame = [0x03, 0x05, 0x7F];
    let message = Message::decode(&frame).unwrap();
    assert_eq!(
        message,
        Message::ConnAck {
            return_code: ReturnCode::Reserved(0x7F)
        }
    );
    assert_eq!(encode_vec(&message).as_slice(), &frame);
    assert!(!ReturnCode::Reserved(0x7F).is_known());
    assert!(ReturnCode::from(0x02).is_known());
}

#[test]
fn test_disconnect_duration_is_optional() {
    assert_eq!(
        Message::decode(&[0x02, 0x18]).unwrap(),
        Message::Disconnect { duration: None }
    );
    assert_eq!(
        Message::decode(&[0x04, 0x18, 0x0E, 0x10]).unwrap(),
        Message::Disconnect {
            duration: Some(3600)
        }
    );
}

#[test]
fn test_encapsulated_frame() {
    let inner = Message::PingReq {
        client_id: text("").unwrap(),
    };
    let wrapped = Message::Encapsulated(Encapsulated::wrap(0x01, &[0xAA, 0xBB], &inner).unwrap());

    let encoded = encode_vec(&wrapped);
    assert_eq!(
        encoded.as_slice(),
        &[0x05, 0xFE, 0x01, 0xAA, 0xBB, 0x02, 0x16]
    );

    match Message::decode(&encoded).unwrap() {
        Message::Encapsulated(encapsulated) => {
            assert_eq!(encapsulated.radius(), 1);
            assert_eq!(encapsulated.node_id.as_slice(), &[0xAA, 0xBB]);
            assert_eq!(encapsulated.message().unwrap(), inner);
        }
        other => panic!("unexpected message {:?}", other),
    }

    assert_eq!(
        Message::decode(&[0x05, 0xFE, 0x01, 0xAA, 0xBB, 0x04, 0x0E]),
        Err(Error::TruncatedFrame)
    );
    assert_eq!(
        Message::decode(&[0x05, 0xFE, 0x01, 0xAA, 0xBB, 0x02, 0x03]),
        Err(Error::UnknownType(0x03))
    );
}

#[test]
fn test_encapsulated_frame_must_be_one_valid_frame() {
    let mut buf = [0u8; 32];
    let with_frame = |frame: &[u8]| {
        Message::Encapsulated(Encapsulated {
            ctrl: 0x01,
            node_id: bytes(&[0xAA]).unwrap(),
            frame: bytes(frame).unwrap(),
        })
    };

    assert_eq!(with_frame(&[]).encode(&mut buf), Err(Error::TruncatedFrame));
    assert_eq!(
        with_frame(&[0x02, 0x17, 0x02, 0x17]).encode(&mut buf),
        Err(Error::InconsistentLength)
    );
    assert_eq!(
        with_frame(&[0x04, 0x0E]).encode(&mut buf),
        Err(Error::InconsistentLength)
    );
    assert_eq!(
        with_frame(&[0x02, 0x03]).encode(&mut buf),
        Err(Error::UnknownType(0x03))
    );
    assert_eq!(buf, [0u8; 32]);

    let valid = with_frame(&[0x02, 0x17]);
    let encoded = encode_vec(&valid);
    assert_eq!(Message::decode(&encoded).unwrap(), valid);
}

#[test]
fn test_encode_buffer_too_small() {
    let message = Message::Publish(Publish::new(Flags::new(), 1, 2, b"payload").unwrap());
    let mut buf = [0u8; 8];
    assert_eq!(message.encode(&mut buf), Err(Error::BufferTooSmall));
    assert_eq!(buf, [0u8; 8]);
}

#[test]
fn test_field_capacity() {
    let data = [0u8; MAX_FIELD_LEN + 1];
    assert_eq!(
        Publish::new(Flags::new(), 1, 2, &data),
        Err(Error::FieldTooLong)
    );
}

#[test]
fn test_message_type_codes() {
    assert_eq!(MessageType::try_from(0x0C), Ok(MessageType::Publish));
    assert_eq!(MessageType::try_from(0x11), Err(Error::UnknownType(0x11)));
    assert_eq!(MessageType::Encapsulated.code(), 0xFE);
    assert_eq!(MessageType::from_code(0x19), None);
}
