//! MQTT-SN frame codec.
//!
//! Every frame starts with a length and a message type:
//!
//! ```text
//! short form (frame <= 255 bytes)      long form (256..=65535 bytes)
//! +--------+------+---------           +------+--------+--------+------+---------
//! | length | type | body ...           | 0x01 | len hi | len lo | type | body ...
//! +--------+------+---------           +------+--------+--------+------+---------
//! ```
//!
//! `length` counts the whole frame, header included. Most message types end
//! with a variable-length field that has no length prefix of its own: it
//! runs to the end of the frame, so its size is always derived from the
//! declared length. There is no terminator.
//!
//! The encoder and decoder go through bounds-checked cursors; nothing is
//! ever reinterpreted in place.

use super::error::Error;
use super::message::{
    Advertise, Bytes, Connect, Encapsulated, Flags, GwInfo, Message, MessageType, PubAck, Publish,
    RegAck, Register, ReturnCode, SubAck, Subscribe, Text, Topic, TopicIdType, WillTopic, bytes,
    text,
};
use heapless::Vec;

/// Header size of a frame with a one-octet length.
pub const SHORT_HEADER_LEN: usize = 2;
/// Header size of a frame with the three-octet length.
pub const LONG_HEADER_LEN: usize = 4;
/// Largest frame that still uses the one-octet length.
pub const MAX_SHORT_FRAME_LEN: usize = 0xFF;
/// Largest frame the length field can describe.
pub const MAX_FRAME_LEN: usize = 0xFFFF;

const LONG_LENGTH_MARKER: u8 = 0x01;

struct Reader<'a> {
    buf: &'a [u8],
    pos: usize,
}

impl<'a> Reader<'a> {
    fn new(buf: &'a [u8]) -> Self {
        Self { buf, pos: 0 }
    }

    fn remaining(&self) -> usize {
        self.buf.len() - self.pos
    }

    fn u8(&mut self) -> Result<u8, Error> {
        let byte = *self.buf.get(self.pos).ok_or(Error::TruncatedFrame)?;
        self.pos += 1;
        Ok(byte)
    }

    fn u16(&mut self) -> Result<u16, Error> {
        let hi = self.u8()?;
        let lo = self.u8()?;
        Ok(u16::from_be_bytes([hi, lo]))
    }

    fn return_code(&mut self) -> Result<ReturnCode, Error> {
        self.u8().map(ReturnCode::from)
    }

    /// Everything up to the end of the frame.
    fn rest(&mut self) -> &'a [u8] {
        let rest = &self.buf[self.pos..];
        self.pos = self.buf.len();
        rest
    }

    fn bytes(&mut self) -> Result<Bytes, Error> {
        bytes(self.rest())
    }

    fn text(&mut self) -> Result<Text, Error> {
        let value = core::str::from_utf8(self.rest()).map_err(|_| Error::InvalidUtf8)?;
        text(value)
    }

    /// Fixed-size messages must consume the frame exactly.
    fn finish(&self) -> Result<(), Error> {
        if self.remaining() == 0 {
            Ok(())
        } else {
            Err(Error::InconsistentLength)
        }
    }
}

struct Writer<'a> {
    buf: &'a mut [u8],
    pos: usize,
}

impl<'a> Writer<'a> {
    fn new(buf: &'a mut [u8]) -> Self {
        Self { buf, pos: 0 }
    }

    fn u8(&mut self, value: u8) -> Result<(), Error> {
        let slot = self.buf.get_mut(self.pos).ok_or(Error::BufferTooSmall)?;
        *slot = value;
        self.pos += 1;
        Ok(())
    }

    fn u16(&mut self, value: u16) -> Result<(), Error> {
        self.bytes(&value.to_be_bytes())
    }

    fn return_code(&mut self, code: ReturnCode) -> Result<(), Error> {
        self.u8(code.into())
    }

    fn bytes(&mut self, data: &[u8]) -> Result<(), Error> {
        let end = self.pos + data.len();
        let dst = self
            .buf
            .get_mut(self.pos..end)
            .ok_or(Error::BufferTooSmall)?;
        dst.copy_from_slice(data);
        self.pos = end;
        Ok(())
    }
}

/// Size of the fields that follow the header.
///
/// For an encapsulated message this is the encapsulation header only.
fn body_len(message: &Message) -> usize {
    match message {
        Message::Advertise(_) => 3,
        Message::SearchGw { .. } => 1,
        Message::GwInfo(m) => 1 + m.gw_address.len(),
        Message::Connect(m) => 4 + m.client_id.len(),
        Message::ConnAck { .. }
        | Message::WillTopicResp { .. }
        | Message::WillMsgResp { .. } => 1,
        Message::WillTopicReq | Message::WillMsgReq | Message::PingResp => 0,
        Message::WillTopic(m) | Message::WillTopicUpd(m) => {
            m.as_ref().map_or(0, |m| 1 + m.will_topic.len())
        }
        Message::WillMsg { will_msg } | Message::WillMsgUpd { will_msg } => will_msg.len(),
        Message::Register(m) => 4 + m.topic_name.len(),
        Message::RegAck(_) | Message::PubAck(_) => 5,
        Message::Publish(m) => 5 + m.data.len(),
        Message::PubComp { .. }
        | Message::PubRec { .. }
        | Message::PubRel { .. }
        | Message::UnsubAck { .. } => 2,
        Message::Subscribe(m) | Message::Unsubscribe(m) => 3 + topic_len(&m.topic),
        Message::SubAck(_) => 6,
        Message::PingReq { client_id } => client_id.len(),
        Message::Disconnect { duration } => {
            if duration.is_some() {
                2
            } else {
                0
            }
        }
        Message::Encapsulated(m) => 1 + m.node_id.len(),
    }
}

fn topic_len(topic: &Topic) -> usize {
    match topic {
        Topic::Name(name) | Topic::ShortName(name) => name.len(),
        Topic::Predefined(_) => 2,
    }
}

/// Declared length and header size for a body of `body` bytes.
fn frame_len(body: usize) -> Result<(usize, usize), Error> {
    if body + SHORT_HEADER_LEN <= MAX_SHORT_FRAME_LEN {
        Ok((body + SHORT_HEADER_LEN, SHORT_HEADER_LEN))
    } else if body + LONG_HEADER_LEN <= MAX_FRAME_LEN {
        Ok((body + LONG_HEADER_LEN, LONG_HEADER_LEN))
    } else {
        Err(Error::FrameTooLarge)
    }
}

/// Declared length and header size of the frame at the start of `bytes`.
fn read_header(bytes: &[u8]) -> Result<(usize, usize), Error> {
    let first = *bytes.first().ok_or(Error::TruncatedFrame)?;
    let (length, header_len) = if first == LONG_LENGTH_MARKER {
        match (bytes.get(1), bytes.get(2)) {
            (Some(&hi), Some(&lo)) => (usize::from(u16::from_be_bytes([hi, lo])), LONG_HEADER_LEN),
            _ => return Err(Error::TruncatedFrame),
        }
    } else {
        (usize::from(first), SHORT_HEADER_LEN)
    };

    if length < header_len {
        return Err(Error::InconsistentLength);
    }
    Ok((length, header_len))
}

/// Declared length of the frame at the start of `bytes`.
///
/// Only the length octets are inspected, so this works on a partially
/// received frame.
pub fn peek_length(bytes: &[u8]) -> Result<usize, Error> {
    read_header(bytes).map(|(length, _)| length)
}

/// Number of bytes [`encode`] writes for `message`.
///
/// For an encapsulated message this includes the wrapped frame.
pub fn encoded_len(message: &Message) -> Result<usize, Error> {
    let (length, _) = frame_len(body_len(message))?;
    match message {
        Message::Encapsulated(m) => Ok(length + m.frame.len()),
        _ => Ok(length),
    }
}

/// The wrapped frame of an encapsulated message must be exactly one frame
/// that decodes on its own.
fn check_frame(frame: &[u8]) -> Result<(), Error> {
    if peek_length(frame)? != frame.len() {
        return Err(Error::InconsistentLength);
    }
    decode(frame).map(|_| ())
}

/// Rejects messages whose fields could not be read back as written.
fn check(message: &Message) -> Result<(), Error> {
    match message {
        Message::Subscribe(m) | Message::Unsubscribe(m) => {
            if m.flags.topic_id_type() != m.topic.id_type() {
                return Err(Error::TopicIdTypeMismatch);
            }
            match &m.topic {
                Topic::ShortName(name) if name.len() != 2 => Err(Error::InconsistentLength),
                _ => Ok(()),
            }
        }
        Message::Encapsulated(m) => check_frame(&m.frame),
        _ => Ok(()),
    }
}

/// Encode `message` into the start of `buf`, returning the number of bytes
/// written.
///
/// Nothing is written when `buf` is too small or the message is
/// inconsistent: a SUBSCRIBE whose flags disagree with its topic, a short
/// topic name that is not two bytes, or an encapsulated frame that is not
/// exactly one valid frame.
pub fn encode(message: &Message, buf: &mut [u8]) -> Result<usize, Error> {
    check(message)?;
    let (length, header_len) = frame_len(body_len(message))?;
    if buf.len() < encoded_len(message)? {
        return Err(Error::BufferTooSmall);
    }

    let mut w = Writer::new(buf);
    if header_len == SHORT_HEADER_LEN {
        w.u8(length as u8)?;
    } else {
        w.u8(LONG_LENGTH_MARKER)?;
        w.u16(length as u16)?;
    }
    w.u8(message.message_type().code())?;

    match message {
        Message::Advertise(m) => {
            w.u8(m.gw_id)?;
            w.u16(m.duration)?;
        }
        Message::SearchGw { radius } => w.u8(*radius)?,
        Message::GwInfo(m) => {
            w.u8(m.gw_id)?;
            w.bytes(&m.gw_address)?;
        }
        Message::Connect(m) => {
            w.u8(m.flags.bits())?;
            w.u8(m.protocol_id)?;
            w.u16(m.duration)?;
            w.bytes(m.client_id.as_bytes())?;
        }
        Message::ConnAck { return_code }
        | Message::WillTopicResp { return_code }
        | Message::WillMsgResp { return_code } => w.return_code(*return_code)?,
        Message::WillTopicReq | Message::WillMsgReq | Message::PingResp => {}
        Message::WillTopic(m) | Message::WillTopicUpd(m) => {
            if let Some(m) = m {
                w.u8(m.flags.bits())?;
                w.bytes(m.will_topic.as_bytes())?;
            }
        }
        Message::WillMsg { will_msg } | Message::WillMsgUpd { will_msg } => w.bytes(will_msg)?,
        Message::Register(m) => {
            w.u16(m.topic_id)?;
            w.u16(m.msg_id)?;
            w.bytes(m.topic_name.as_bytes())?;
        }
        Message::RegAck(m) => {
            w.u16(m.topic_id)?;
            w.u16(m.msg_id)?;
            w.return_code(m.return_code)?;
        }
        Message::Publish(m) => {
            w.u8(m.flags.bits())?;
            w.u16(m.topic_id)?;
            w.u16(m.msg_id)?;
            w.bytes(&m.data)?;
        }
        Message::PubAck(m) => {
            w.u16(m.topic_id)?;
            w.u16(m.msg_id)?;
            w.return_code(m.return_code)?;
        }
        Message::PubComp { msg_id }
        | Message::PubRec { msg_id }
        | Message::PubRel { msg_id }
        | Message::UnsubAck { msg_id } => w.u16(*msg_id)?,
        Message::Subscribe(m) | Message::Unsubscribe(m) => {
            w.u8(m.flags.bits())?;
            w.u16(m.msg_id)?;
            match &m.topic {
                Topic::Name(name) | Topic::ShortName(name) => w.bytes(name.as_bytes())?,
                Topic::Predefined(topic_id) => w.u16(*topic_id)?,
            }
        }
        Message::SubAck(m) => {
            w.u8(m.flags.bits())?;
            w.u16(m.topic_id)?;
            w.u16(m.msg_id)?;
            w.return_code(m.return_code)?;
        }
        Message::PingReq { client_id } => w.bytes(client_id.as_bytes())?,
        Message::Disconnect { duration } => {
            if let Some(duration) = duration {
                w.u16(*duration)?;
            }
        }
        Message::Encapsulated(m) => {
            w.u8(m.ctrl)?;
            w.bytes(&m.node_id)?;
            w.bytes(&m.frame)?;
        }
    }

    Ok(w.pos)
}

/// Decode the frame at the start of `bytes`.
///
/// Bytes past the declared length are ignored, so a whole receive buffer can
/// be handed over as is.
pub fn decode(bytes: &[u8]) -> Result<Message, Error> {
    let (length, header_len) = read_header(bytes)?;
    let frame = bytes.get(..length).ok_or(Error::TruncatedFrame)?;
    let msg_type = MessageType::try_from(frame[header_len - 1])?;
    let mut r = Reader::new(&frame[header_len..]);

    let message = match msg_type {
        MessageType::Advertise => {
            let gw_id = r.u8()?;
            let duration = r.u16()?;
            Message::Advertise(Advertise { gw_id, duration })
        }
        MessageType::SearchGw => Message::SearchGw { radius: r.u8()? },
        MessageType::GwInfo => {
            let gw_id = r.u8()?;
            let gw_address = r.bytes()?;
            Message::GwInfo(GwInfo { gw_id, gw_address })
        }
        MessageType::Connect => {
            let flags = Flags::from_bits(r.u8()?);
            let protocol_id = r.u8()?;
            let duration = r.u16()?;
            let client_id = r.text()?;
            Message::Connect(Connect {
                flags,
                protocol_id,
                duration,
                client_id,
            })
        }
        MessageType::ConnAck => Message::ConnAck {
            return_code: r.return_code()?,
        },
        MessageType::WillTopicReq => Message::WillTopicReq,
        MessageType::WillTopic => Message::WillTopic(decode_will_topic(&mut r)?),
        MessageType::WillMsgReq => Message::WillMsgReq,
        MessageType::WillMsg => Message::WillMsg {
            will_msg: r.bytes()?,
        },
        MessageType::Register => {
            let topic_id = r.u16()?;
            let msg_id = r.u16()?;
            let topic_name = r.text()?;
            Message::Register(Register {
                topic_id,
                msg_id,
                topic_name,
            })
        }
        MessageType::RegAck => {
            let topic_id = r.u16()?;
            let msg_id = r.u16()?;
            let return_code = r.return_code()?;
            Message::RegAck(RegAck {
                topic_id,
                msg_id,
                return_code,
            })
        }
        MessageType::Publish => {
            let flags = Flags::from_bits(r.u8()?);
            let topic_id = r.u16()?;
            let msg_id = r.u16()?;
            let data = r.bytes()?;
            Message::Publish(Publish {
                flags,
                topic_id,
                msg_id,
                data,
            })
        }
        MessageType::PubAck => {
            let topic_id = r.u16()?;
            let msg_id = r.u16()?;
            let return_code = r.return_code()?;
            Message::PubAck(PubAck {
                topic_id,
                msg_id,
                return_code,
            })
        }
        MessageType::PubComp => Message::PubComp { msg_id: r.u16()? },
        MessageType::PubRec => Message::PubRec { msg_id: r.u16()? },
        MessageType::PubRel => Message::PubRel { msg_id: r.u16()? },
        MessageType::Subscribe => Message::Subscribe(decode_subscribe(&mut r)?),
        MessageType::SubAck => {
            let flags = Flags::from_bits(r.u8()?);
            let topic_id = r.u16()?;
            let msg_id = r.u16()?;
            let return_code = r.return_code()?;
            Message::SubAck(SubAck {
                flags,
                topic_id,
                msg_id,
                return_code,
            })
        }
        MessageType::Unsubscribe => Message::Unsubscribe(decode_subscribe(&mut r)?),
        MessageType::UnsubAck => Message::UnsubAck { msg_id: r.u16()? },
        MessageType::PingReq => Message::PingReq {
            client_id: r.text()?,
        },
        MessageType::PingResp => Message::PingResp,
        MessageType::Disconnect => {
            let duration = match r.remaining() {
                0 => None,
                2 => Some(r.u16()?),
                _ => return Err(Error::InconsistentLength),
            };
            Message::Disconnect { duration }
        }
        MessageType::WillTopicUpd => Message::WillTopicUpd(decode_will_topic(&mut r)?),
        MessageType::WillTopicResp => Message::WillTopicResp {
            return_code: r.return_code()?,
        },
        MessageType::WillMsgUpd => Message::WillMsgUpd {
            will_msg: r.bytes()?,
        },
        MessageType::WillMsgResp => Message::WillMsgResp {
            return_code: r.return_code()?,
        },
        MessageType::Encapsulated => {
            let ctrl = r.u8()?;
            let node_id = r.bytes()?;
            let inner = &bytes[length..];
            let inner_len = peek_length(inner)?;
            let frame = inner.get(..inner_len).ok_or(Error::TruncatedFrame)?;
            check_frame(frame)?;
            Message::Encapsulated(Encapsulated {
                ctrl,
                node_id,
                frame: self::bytes(frame)?,
            })
        }
    };

    r.finish()?;
    Ok(message)
}

/// An empty body deletes the will.
fn decode_will_topic(r: &mut Reader<'_>) -> Result<Option<WillTopic>, Error> {
    if r.remaining() == 0 {
        return Ok(None);
    }
    let flags = Flags::from_bits(r.u8()?);
    let will_topic = r.text()?;
    Ok(Some(WillTopic { flags, will_topic }))
}

/// SUBSCRIBE and UNSUBSCRIBE share a layout. The flags are parsed first and
/// alone decide how the trailing bytes are read.
fn decode_subscribe(r: &mut Reader<'_>) -> Result<Subscribe, Error> {
    let flags = Flags::from_bits(r.u8()?);
    let msg_id = r.u16()?;
    let topic = match flags.topic_id_type() {
        TopicIdType::Normal => Topic::Name(r.text()?),
        TopicIdType::ShortName => {
            if r.remaining() != 2 {
                return Err(Error::InconsistentLength);
            }
            Topic::ShortName(r.text()?)
        }
        TopicIdType::Predefined => {
            if r.remaining() != 2 {
                return Err(Error::InconsistentLength);
            }
            Topic::Predefined(r.u16()?)
        }
        TopicIdType::Reserved => return Err(Error::ReservedTopicIdType),
    };
    Ok(Subscribe {
        flags,
        msg_id,
        topic,
    })
}

impl Message {
    /// See [`encode`].
    pub fn encode(&self, buf: &mut [u8]) -> Result<usize, Error> {
        encode(self, buf)
    }

    /// See [`decode`].
    pub fn decode(bytes: &[u8]) -> Result<Self, Error> {
        decode(bytes)
    }

    /// See [`encoded_len`].
    pub fn encoded_len(&self) -> Result<usize, Error> {
        encoded_len(self)
    }

    /// Encode into a fixed-capacity vector.
    pub fn to_vec<const N: usize>(&self) -> Result<Vec<u8, N>, Error> {
        let mut out = Vec::new();
        out.resize(self.encoded_len()?, 0)
            .map_err(|_| Error::BufferTooSmall)?;
        let written = self.encode(&mut out)?;
        out.truncate(written);
        Ok(out)
    }
}
