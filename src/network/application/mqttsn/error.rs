//! Error types for MQTT-SN encoding and decoding

/// An error raised while encoding or decoding an MQTT-SN frame.
///
/// Decoding never panics on malformed input; every problem with the bytes
/// maps to one of these variants so the caller can drop the frame and keep
/// listening.
#[derive(Debug, PartialEq, Eq, Clone, Copy)]
pub enum Error {
    /// The message type code is reserved or unknown.
    UnknownType(u8),
    /// The buffer ends before the declared frame length, or before the
    /// fixed fields of the message type.
    TruncatedFrame,
    /// The declared length disagrees with the message layout.
    InconsistentLength,
    /// SUBSCRIBE or UNSUBSCRIBE with the reserved topic-id-type `0b11`.
    ReservedTopicIdType,
    /// The topic-id-type bits of the flags do not match the topic.
    TopicIdTypeMismatch,
    /// A text field is not valid UTF-8.
    InvalidUtf8,
    /// A variable-length field does not fit the field capacity.
    FieldTooLong,
    /// The output buffer is smaller than the encoded frame.
    BufferTooSmall,
    /// The frame would exceed the 16-bit length field.
    FrameTooLarge,
}

#[cfg(feature = "defmt")]
impl defmt::Format for Error {
    fn format(&self, f: defmt::Formatter) {
        match self {
            Error::UnknownType(code) => defmt::write!(f, "UnknownType({=u8:#x})", *code),
            Error::TruncatedFrame => defmt::write!(f, "TruncatedFrame"),
            Error::InconsistentLength => defmt::write!(f, "InconsistentLength"),
            Error::ReservedTopicIdType => defmt::write!(f, "ReservedTopicIdType"),
            Error::TopicIdTypeMismatch => defmt::write!(f, "TopicIdTypeMismatch"),
            Error::InvalidUtf8 => defmt::write!(f, "InvalidUtf8"),
            Error::FieldTooLong => defmt::write!(f, "FieldTooLong"),
            Error::BufferTooSmall => defmt::write!(f, "BufferTooSmall"),
            Error::FrameTooLarge => defmt::write!(f, "FrameTooLarge"),
        }
    }
}
