//! MQTT-SN v1.2 message codec for constrained links.
//!
//! MQTT-SN (MQTT for Sensor Networks) keeps the publish/subscribe model of
//! MQTT but replaces topic strings with 16-bit ids and squeezes every message
//! into a length-prefixed frame small enough for radio links such as LoRa.
//!
//! # Layout
//!
//! - [`message`]: message type codes, the flags byte, return codes and one
//!   typed structure per message.
//! - [`codec`]: frame encoding and decoding.
//! - [`error`]: the error type shared by both.
//!
//! The codec does no I/O and keeps no state. Pair it with
//! [`radio::Link`](crate::radio::Link) to move messages over a radio.
//!
//! # Usage
//!
//! ```rust
//! use libmqttsn::network::application::mqttsn::{Flags, Message, Publish, QoS};
//!
//! let flags = Flags::new().with_qos(QoS::AtLeastOnce);
//! let publish = Message::Publish(Publish::new(flags, 0x0007, 0x0042, b"ON").unwrap());
//!
//! let mut buf = [0u8; 16];
//! let len = publish.encode(&mut buf).unwrap();
//! assert_eq!(&buf[..len], &[0x09, 0x0C, 0x20, 0x00, 0x07, 0x00, 0x42, b'O', b'N']);
//!
//! assert_eq!(Message::decode(&buf[..len]).unwrap(), publish);
//! ```

#![allow(missing_docs)]

/// Frame encoding and decoding.
pub mod codec;

/// Errors raised by the codec.
pub mod error;

/// Message catalogue.
pub mod message;

pub use codec::{decode, encode, encoded_len, peek_length};
pub use error::Error;
pub use message::{
    Advertise, Connect, Encapsulated, Flags, GwInfo, MAX_FIELD_LEN, Message, MessageType,
    PROTOCOL_ID, PubAck, Publish, QoS, RegAck, Register, ReturnCode, SubAck, Subscribe, Topic,
    TopicIdType, WillTopic,
};

#[cfg(test)]
mod tests;
