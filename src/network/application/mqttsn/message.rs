//! MQTT-SN v1.2 message catalogue.
//!
//! Message type codes, the shared flags byte, return codes and one typed
//! structure per message. Nothing here touches the wire; see
//! [`codec`](super::codec) for the byte layout.

use super::error::Error;
use heapless::{String, Vec};

/// Capacity of every variable-length field (topic names, client ids, payloads).
///
/// Large enough to exercise the three-octet length form, which kicks in once
/// a frame passes 255 bytes.
pub const MAX_FIELD_LEN: usize = 512;

/// Protocol id carried by CONNECT for MQTT-SN v1.2.
pub const PROTOCOL_ID: u8 = 0x01;

/// Variable-length binary field.
pub type Bytes = Vec<u8, MAX_FIELD_LEN>;

/// Variable-length UTF-8 field.
pub type Text = String<MAX_FIELD_LEN>;

/// Copy `data` into a [`Bytes`] field.
pub fn bytes(data: &[u8]) -> Result<Bytes, Error> {
    Vec::from_slice(data).map_err(|_| Error::FieldTooLong)
}

/// Copy `value` into a [`Text`] field.
pub fn text(value: &str) -> Result<Text, Error> {
    String::try_from(value).map_err(|_| Error::FieldTooLong)
}

/// MQTT-SN message type codes.
///
/// Codes are not contiguous; the gaps (0x03, 0x11, 0x19, 0x1E..=0xFD, 0xFF)
/// are reserved by the protocol.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[repr(u8)]
pub enum MessageType {
    /// Periodic gateway announcement.
    Advertise = 0x00,
    /// Client looking for a gateway.
    SearchGw = 0x01,
    /// Gateway answer to SEARCHGW.
    GwInfo = 0x02,
    /// Client connection request.
    Connect = 0x04,
    /// Connection acknowledgement.
    ConnAck = 0x05,
    /// Gateway asks for the will topic.
    WillTopicReq = 0x06,
    /// Will topic and flags.
    WillTopic = 0x07,
    /// Gateway asks for the will message.
    WillMsgReq = 0x08,
    /// Will message body.
    WillMsg = 0x09,
    /// Topic name to topic id registration.
    Register = 0x0A,
    /// Registration acknowledgement.
    RegAck = 0x0B,
    /// Application data.
    Publish = 0x0C,
    /// QoS 1 acknowledgement.
    PubAck = 0x0D,
    /// QoS 2 completion.
    PubComp = 0x0E,
    /// QoS 2 receipt.
    PubRec = 0x0F,
    /// QoS 2 release.
    PubRel = 0x10,
    /// Subscription request.
    Subscribe = 0x12,
    /// Subscription acknowledgement.
    SubAck = 0x13,
    /// Unsubscription request.
    Unsubscribe = 0x14,
    /// Unsubscription acknowledgement.
    UnsubAck = 0x15,
    /// Keep-alive probe, optionally carrying a sleeping client's id.
    PingReq = 0x16,
    /// Keep-alive answer.
    PingResp = 0x17,
    /// Disconnect, optionally with a sleep duration.
    Disconnect = 0x18,
    /// Will topic update.
    WillTopicUpd = 0x1A,
    /// Will topic update answer.
    WillTopicResp = 0x1B,
    /// Will message update.
    WillMsgUpd = 0x1C,
    /// Will message update answer.
    WillMsgResp = 0x1D,
    /// Forwarder encapsulation of another MQTT-SN frame.
    Encapsulated = 0xFE,
}

impl MessageType {
    /// Look up a type code, `None` for reserved codes.
    pub const fn from_code(code: u8) -> Option<Self> {
        Some(match code {
            0x00 => MessageType::Advertise,
            0x01 => MessageType::SearchGw,
            0x02 => MessageType::GwInfo,
            0x04 => MessageType::Connect,
            0x05 => MessageType::ConnAck,
            0x06 => MessageType::WillTopicReq,
            0x07 => MessageType::WillTopic,
            0x08 => MessageType::WillMsgReq,
            0x09 => MessageType::WillMsg,
            0x0A => MessageType::Register,
            0x0B => MessageType::RegAck,
            0x0C => MessageType::Publish,
            0x0D => MessageType::PubAck,
            0x0E => MessageType::PubComp,
            0x0F => MessageType::PubRec,
            0x10 => MessageType::PubRel,
            0x12 => MessageType::Subscribe,
            0x13 => MessageType::SubAck,
            0x14 => MessageType::Unsubscribe,
            0x15 => MessageType::UnsubAck,
            0x16 => MessageType::PingReq,
            0x17 => MessageType::PingResp,
            0x18 => MessageType::Disconnect,
            0x1A => MessageType::WillTopicUpd,
            0x1B => MessageType::WillTopicResp,
            0x1C => MessageType::WillMsgUpd,
            0x1D => MessageType::WillMsgResp,
            0xFE => MessageType::Encapsulated,
            _ => return None,
        })
    }

    /// The on-wire type code.
    pub const fn code(self) -> u8 {
        self as u8
    }
}

impl TryFrom<u8> for MessageType {
    type Error = Error;

    fn try_from(code: u8) -> Result<Self, Self::Error> {
        MessageType::from_code(code).ok_or(Error::UnknownType(code))
    }
}

/// DUP: the message is a retransmission.
pub const FLAG_DUP: u8 = 0x80;
/// QoS level 0.
pub const FLAG_QOS_0: u8 = 0x00;
/// QoS level 1.
pub const FLAG_QOS_1: u8 = 0x20;
/// QoS level 2.
pub const FLAG_QOS_2: u8 = 0x40;
/// QoS level -1, publish without a connection.
pub const FLAG_QOS_N1: u8 = 0x60;
/// RETAIN.
pub const FLAG_RETAIN: u8 = 0x10;
/// WILL: the client wants to set a will.
pub const FLAG_WILL: u8 = 0x08;
/// CLEAN session.
pub const FLAG_CLEAN: u8 = 0x04;
/// Topic id type: normal topic name.
pub const FLAG_TOPIC_NAME: u8 = 0x00;
/// Topic id type: predefined topic id.
pub const FLAG_TOPIC_PREDEFINED_ID: u8 = 0x01;
/// Topic id type: two character short topic name.
pub const FLAG_TOPIC_SHORT_NAME: u8 = 0x02;

const QOS_MASK: u8 = 0x60;
const QOS_SHIFT: u8 = 5;
const TOPIC_ID_TYPE_MASK: u8 = 0x03;

/// Quality of service carried in bits 6..5 of [`Flags`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum QoS {
    /// QoS 0, fire and forget.
    AtMostOnce,
    /// QoS 1, acknowledged with PUBACK.
    AtLeastOnce,
    /// QoS 2, PUBREC/PUBREL/PUBCOMP handshake.
    ExactlyOnce,
    /// QoS -1, publish on a predefined topic without connecting first.
    NoConnect,
}

impl QoS {
    /// The numeric level, -1 for [`QoS::NoConnect`].
    pub const fn level(self) -> i8 {
        match self {
            QoS::AtMostOnce => 0,
            QoS::AtLeastOnce => 1,
            QoS::ExactlyOnce => 2,
            QoS::NoConnect => -1,
        }
    }

    const fn bits(self) -> u8 {
        match self {
            QoS::AtMostOnce => 0b00,
            QoS::AtLeastOnce => 0b01,
            QoS::ExactlyOnce => 0b10,
            QoS::NoConnect => 0b11,
        }
    }

    const fn from_bits(bits: u8) -> Self {
        match bits & 0b11 {
            0b00 => QoS::AtMostOnce,
            0b01 => QoS::AtLeastOnce,
            0b10 => QoS::ExactlyOnce,
            _ => QoS::NoConnect,
        }
    }
}

/// How the topic of a message is identified, bits 1..0 of [`Flags`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum TopicIdType {
    /// Topic name, or a topic id obtained through REGISTER.
    Normal,
    /// Topic id agreed in advance by both ends.
    Predefined,
    /// Two character topic name.
    ShortName,
    /// Reserved by the protocol.
    Reserved,
}

impl TopicIdType {
    const fn bits(self) -> u8 {
        match self {
            TopicIdType::Normal => FLAG_TOPIC_NAME,
            TopicIdType::Predefined => FLAG_TOPIC_PREDEFINED_ID,
            TopicIdType::ShortName => FLAG_TOPIC_SHORT_NAME,
            TopicIdType::Reserved => 0b11,
        }
    }

    const fn from_bits(bits: u8) -> Self {
        match bits & TOPIC_ID_TYPE_MASK {
            FLAG_TOPIC_NAME => TopicIdType::Normal,
            FLAG_TOPIC_PREDEFINED_ID => TopicIdType::Predefined,
            FLAG_TOPIC_SHORT_NAME => TopicIdType::ShortName,
            _ => TopicIdType::Reserved,
        }
    }
}

/// The flags byte shared by CONNECT, WILLTOPIC, PUBLISH, SUBSCRIBE,
/// UNSUBSCRIBE, SUBACK and WILLTOPICUPD.
///
/// ```text
///   7     6  5     4       3      2       1  0
/// [DUP] [ QoS ] [RETAIN] [WILL] [CLEAN] [TopicIdType]
/// ```
///
/// Setters only touch their own sub-field.
///
/// # Examples
///
/// ```rust
/// use libmqttsn::network::application::mqttsn::{Flags, QoS, TopicIdType};
///
/// let flags = Flags::new()
///     .with_qos(QoS::AtLeastOnce)
///     .with_topic_id_type(TopicIdType::Predefined);
///
/// assert_eq!(flags.bits(), 0x21);
/// assert_eq!(flags.qos(), QoS::AtLeastOnce);
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub struct Flags(u8);

impl Flags {
    /// All bits clear: QoS 0, normal topic name.
    pub const fn new() -> Self {
        Flags(0)
    }

    /// Wrap a raw flags byte.
    pub const fn from_bits(bits: u8) -> Self {
        Flags(bits)
    }

    /// The raw flags byte.
    pub const fn bits(self) -> u8 {
        self.0
    }

    pub const fn dup(self) -> bool {
        self.0 & FLAG_DUP != 0
    }

    pub const fn with_dup(self, dup: bool) -> Self {
        Flags(set_bit(self.0, FLAG_DUP, dup))
    }

    pub const fn qos(self) -> QoS {
        QoS::from_bits((self.0 & QOS_MASK) >> QOS_SHIFT)
    }

    pub const fn with_qos(self, qos: QoS) -> Self {
        Flags((self.0 & !QOS_MASK) | (qos.bits() << QOS_SHIFT))
    }

    pub const fn retain(self) -> bool {
        self.0 & FLAG_RETAIN != 0
    }

    pub const fn with_retain(self, retain: bool) -> Self {
        Flags(set_bit(self.0, FLAG_RETAIN, retain))
    }

    pub const fn will(self) -> bool {
        self.0 & FLAG_WILL != 0
    }

    pub const fn with_will(self, will: bool) -> Self {
        Flags(set_bit(self.0, FLAG_WILL, will))
    }

    pub const fn clean_session(self) -> bool {
        self.0 & FLAG_CLEAN != 0
    }

    pub const fn with_clean_session(self, clean: bool) -> Self {
        Flags(set_bit(self.0, FLAG_CLEAN, clean))
    }

    pub const fn topic_id_type(self) -> TopicIdType {
        TopicIdType::from_bits(self.0)
    }

    pub const fn with_topic_id_type(self, topic_id_type: TopicIdType) -> Self {
        Flags((self.0 & !TOPIC_ID_TYPE_MASK) | topic_id_type.bits())
    }
}

impl From<u8> for Flags {
    fn from(bits: u8) -> Self {
        Flags(bits)
    }
}

impl From<Flags> for u8 {
    fn from(flags: Flags) -> Self {
        flags.0
    }
}

const fn set_bit(bits: u8, mask: u8, on: bool) -> u8 {
    if on { bits | mask } else { bits & !mask }
}

/// Return code carried by CONNACK, REGACK, PUBACK, SUBACK, WILLTOPICRESP
/// and WILLMSGRESP.
///
/// Codes outside the four defined by the protocol are kept as
/// [`ReturnCode::Reserved`] so the raw byte survives a decode/encode cycle.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ReturnCode {
    /// 0x00, accepted.
    Accepted,
    /// 0x01, rejected because of congestion.
    RejectedCongestion,
    /// 0x02, rejected because the topic id is invalid.
    RejectedInvalidTopicId,
    /// 0x03, rejected because the feature is not supported.
    RejectedNotSupported,
    /// Any other value.
    Reserved(u8),
}

impl ReturnCode {
    /// Whether this is one of the four codes the protocol defines.
    pub const fn is_known(self) -> bool {
        !matches!(self, ReturnCode::Reserved(_))
    }
}

impl From<u8> for ReturnCode {
    fn from(raw: u8) -> Self {
        match raw {
            0x00 => ReturnCode::Accepted,
            0x01 => ReturnCode::RejectedCongestion,
            0x02 => ReturnCode::RejectedInvalidTopicId,
            0x03 => ReturnCode::RejectedNotSupported,
            other => ReturnCode::Reserved(other),
        }
    }
}

impl From<ReturnCode> for u8 {
    fn from(code: ReturnCode) -> Self {
        match code {
            ReturnCode::Accepted => 0x00,
            ReturnCode::RejectedCongestion => 0x01,
            ReturnCode::RejectedInvalidTopicId => 0x02,
            ReturnCode::RejectedNotSupported => 0x03,
            ReturnCode::Reserved(raw) => raw,
        }
    }
}

/// Topic of a SUBSCRIBE or UNSUBSCRIBE.
///
/// On the wire the same trailing bytes are either a name or a 16-bit id; the
/// topic-id-type bits of the message flags decide which.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Topic {
    /// Full topic name, possibly with wildcards.
    Name(Text),
    /// Two character short topic name.
    ShortName(Text),
    /// Predefined topic id.
    Predefined(u16),
}

impl Topic {
    /// The topic-id-type this variant is encoded with.
    pub const fn id_type(&self) -> TopicIdType {
        match self {
            Topic::Name(_) => TopicIdType::Normal,
            Topic::ShortName(_) => TopicIdType::ShortName,
            Topic::Predefined(_) => TopicIdType::Predefined,
        }
    }

    /// Build a [`Topic::Name`].
    pub fn name(name: &str) -> Result<Self, Error> {
        Ok(Topic::Name(text(name)?))
    }
}

/// ADVERTISE, broadcast by a gateway.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Advertise {
    pub gw_id: u8,
    /// Seconds until the next ADVERTISE.
    pub duration: u16,
}

/// GWINFO, answer to SEARCHGW.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GwInfo {
    pub gw_id: u8,
    /// Gateway address, only present when a client answers on behalf of a
    /// gateway. Empty when sent by the gateway itself.
    pub gw_address: Bytes,
}

/// CONNECT.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Connect {
    /// Only WILL and CLEAN are meaningful here.
    pub flags: Flags,
    pub protocol_id: u8,
    /// Keep-alive in seconds.
    pub duration: u16,
    pub client_id: Text,
}

impl Connect {
    /// CONNECT for protocol v1.2.
    pub fn new(flags: Flags, duration: u16, client_id: &str) -> Result<Self, Error> {
        Ok(Self {
            flags,
            protocol_id: PROTOCOL_ID,
            duration,
            client_id: text(client_id)?,
        })
    }
}

/// WILLTOPIC and WILLTOPICUPD.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct WillTopic {
    /// Only QoS and RETAIN are meaningful here.
    pub flags: Flags,
    pub will_topic: Text,
}

/// REGISTER.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Register {
    /// Zero when sent by a client.
    pub topic_id: u16,
    pub msg_id: u16,
    pub topic_name: Text,
}

/// REGACK.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RegAck {
    pub topic_id: u16,
    pub msg_id: u16,
    pub return_code: ReturnCode,
}

/// PUBLISH.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Publish {
    pub flags: Flags,
    /// Topic id, predefined id, or the two bytes of a short name.
    pub topic_id: u16,
    /// Zero for QoS 0 and -1.
    pub msg_id: u16,
    pub data: Bytes,
}

impl Publish {
    /// Build a PUBLISH, copying `data`.
    pub fn new(flags: Flags, topic_id: u16, msg_id: u16, data: &[u8]) -> Result<Self, Error> {
        Ok(Self {
            flags,
            topic_id,
            msg_id,
            data: bytes(data)?,
        })
    }
}

/// PUBACK.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PubAck {
    pub topic_id: u16,
    pub msg_id: u16,
    pub return_code: ReturnCode,
}

/// SUBSCRIBE and UNSUBSCRIBE.
///
/// The topic-id-type bits of `flags` must agree with [`Topic`], otherwise
/// encoding fails with [`Error::TopicIdTypeMismatch`]. [`Subscribe::new`]
/// keeps them in agreement.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Subscribe {
    pub flags: Flags,
    pub msg_id: u16,
    pub topic: Topic,
}

impl Subscribe {
    pub fn new(flags: Flags, msg_id: u16, topic: Topic) -> Self {
        Self {
            flags: flags.with_topic_id_type(topic.id_type()),
            msg_id,
            topic,
        }
    }
}

/// SUBACK.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SubAck {
    /// Only the granted QoS is meaningful here.
    pub flags: Flags,
    pub topic_id: u16,
    pub msg_id: u16,
    pub return_code: ReturnCode,
}

/// Forwarder encapsulation (0xFE).
///
/// The length octet of an encapsulated frame covers the encapsulation header
/// only; the wrapped MQTT-SN frame follows it with its own length.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Encapsulated {
    /// Bits 1..0 carry the broadcast radius, the rest are reserved.
    pub ctrl: u8,
    /// Address of the wireless node on the forwarder's side.
    pub node_id: Bytes,
    /// Exactly one complete MQTT-SN frame, header included. Anything else
    /// fails to encode.
    pub frame: Bytes,
}

impl Encapsulated {
    /// Encode `message` and wrap it for the node `node_id`.
    pub fn wrap(ctrl: u8, node_id: &[u8], message: &Message) -> Result<Self, Error> {
        let mut frame = Bytes::new();
        frame
            .resize(message.encoded_len()?, 0)
            .map_err(|_| Error::FieldTooLong)?;
        let written = message.encode(&mut frame)?;
        frame.truncate(written);
        Ok(Self {
            ctrl,
            node_id: bytes(node_id)?,
            frame,
        })
    }

    pub const fn radius(&self) -> u8 {
        self.ctrl & 0x03
    }

    /// Decode the wrapped frame.
    pub fn message(&self) -> Result<Message, Error> {
        Message::decode(&self.frame)
    }
}

/// Any MQTT-SN message.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Message {
    Advertise(Advertise),
    SearchGw { radius: u8 },
    GwInfo(GwInfo),
    Connect(Connect),
    ConnAck { return_code: ReturnCode },
    WillTopicReq,
    /// `None` is the empty WILLTOPIC that deletes the will.
    WillTopic(Option<WillTopic>),
    WillMsgReq,
    WillMsg { will_msg: Bytes },
    Register(Register),
    RegAck(RegAck),
    Publish(Publish),
    PubAck(PubAck),
    PubComp { msg_id: u16 },
    PubRec { msg_id: u16 },
    PubRel { msg_id: u16 },
    Subscribe(Subscribe),
    SubAck(SubAck),
    Unsubscribe(Subscribe),
    UnsubAck { msg_id: u16 },
    /// An empty client id is a plain keep-alive.
    PingReq { client_id: Text },
    PingResp,
    /// A duration asks the gateway to keep the session while the client sleeps.
    Disconnect { duration: Option<u16> },
    /// `None` deletes the will.
    WillTopicUpd(Option<WillTopic>),
    WillTopicResp { return_code: ReturnCode },
    WillMsgUpd { will_msg: Bytes },
    WillMsgResp { return_code: ReturnCode },
    Encapsulated(Encapsulated),
}

impl Message {
    pub const fn message_type(&self) -> MessageType {
        match self {
            Message::Advertise(_) => MessageType::Advertise,
            Message::SearchGw { .. } => MessageType::SearchGw,
            Message::GwInfo(_) => MessageType::GwInfo,
            Message::Connect(_) => MessageType::Connect,
            Message::ConnAck { .. } => MessageType::ConnAck,
            Message::WillTopicReq => MessageType::WillTopicReq,
            Message::WillTopic(_) => MessageType::WillTopic,
            Message::WillMsgReq => MessageType::WillMsgReq,
            Message::WillMsg { .. } => MessageType::WillMsg,
            Message::Register(_) => MessageType::Register,
            Message::RegAck(_) => MessageType::RegAck,
            Message::Publish(_) => MessageType::Publish,
            Message::PubAck(_) => MessageType::PubAck,
            Message::PubComp { .. } => MessageType::PubComp,
            Message::PubRec { .. } => MessageType::PubRec,
            Message::PubRel { .. } => MessageType::PubRel,
            Message::Subscribe(_) => MessageType::Subscribe,
            Message::SubAck(_) => MessageType::SubAck,
            Message::Unsubscribe(_) => MessageType::Unsubscribe,
            Message::UnsubAck { .. } => MessageType::UnsubAck,
            Message::PingReq { .. } => MessageType::PingReq,
            Message::PingResp => MessageType::PingResp,
            Message::Disconnect { .. } => MessageType::Disconnect,
            Message::WillTopicUpd(_) => MessageType::WillTopicUpd,
            Message::WillTopicResp { .. } => MessageType::WillTopicResp,
            Message::WillMsgUpd { .. } => MessageType::WillMsgUpd,
            Message::WillMsgResp { .. } => MessageType::WillMsgResp,
            Message::Encapsulated(_) => MessageType::Encapsulated,
        }
    }

    /// Message id used to correlate this message with its acknowledgement,
    /// if the type carries one.
    pub fn msg_id(&self) -> Option<u16> {
        match self {
            Message::Register(m) => Some(m.msg_id),
            Message::RegAck(m) => Some(m.msg_id),
            Message::Publish(m) => Some(m.msg_id),
            Message::PubAck(m) => Some(m.msg_id),
            Message::PubComp { msg_id }
            | Message::PubRec { msg_id }
            | Message::PubRel { msg_id }
            | Message::UnsubAck { msg_id } => Some(*msg_id),
            Message::Subscribe(m) | Message::Unsubscribe(m) => Some(m.msg_id),
            Message::SubAck(m) => Some(m.msg_id),
            _ => None,
        }
    }
}
