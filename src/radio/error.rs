//! Error types for the radio transport

/// A step of device bring-up that failed.
#[derive(Debug, PartialEq, Eq, Clone, Copy)]
pub enum InitError {
    /// GPIO bring-up of the host failed.
    PlatformInitFailed,
    /// The reliable datagram layer did not start.
    DatagramInitFailed,
    /// The transceiver did not answer.
    RadioInitFailed,
    /// The transceiver rejected the frequency. Logged only, bring-up goes on.
    FrequencySetFailed,
}

/// Why a reliable send gave up.
#[derive(Debug, PartialEq, Eq, Clone, Copy)]
pub enum SendError {
    /// No ack arrived within the retry budget.
    RetriesExhausted,
    /// The caller cancelled the delivery between attempts.
    Cancelled,
}

/// Errors returned by the radio registry and transport.
#[derive(Debug, PartialEq, Eq, Clone, Copy)]
pub enum RadioError {
    /// Device bring-up failed.
    Init(InitError),
    /// Every slot of the registry is taken.
    CapacityExceeded,
    /// The handle is unknown or its device failed bring-up.
    InvalidHandle,
    /// The delivery was not acknowledged.
    SendFailed(SendError),
    /// The payload is longer than the link carries in one frame.
    PayloadTooLarge,
    /// The device serves the maximum number of endpoints.
    EndpointsFull,
}

impl From<InitError> for RadioError {
    fn from(err: InitError) -> Self {
        RadioError::Init(err)
    }
}

impl From<SendError> for RadioError {
    fn from(err: SendError) -> Self {
        RadioError::SendFailed(err)
    }
}

#[cfg(feature = "defmt")]
impl defmt::Format for InitError {
    fn format(&self, f: defmt::Formatter) {
        match self {
            InitError::PlatformInitFailed => defmt::write!(f, "PlatformInitFailed"),
            InitError::DatagramInitFailed => defmt::write!(f, "DatagramInitFailed"),
            InitError::RadioInitFailed => defmt::write!(f, "RadioInitFailed"),
            InitError::FrequencySetFailed => defmt::write!(f, "FrequencySetFailed"),
        }
    }
}

#[cfg(feature = "defmt")]
impl defmt::Format for SendError {
    fn format(&self, f: defmt::Formatter) {
        match self {
            SendError::RetriesExhausted => defmt::write!(f, "RetriesExhausted"),
            SendError::Cancelled => defmt::write!(f, "Cancelled"),
        }
    }
}

#[cfg(feature = "defmt")]
impl defmt::Format for RadioError {
    fn format(&self, f: defmt::Formatter) {
        match self {
            RadioError::Init(err) => defmt::write!(f, "Init({})", err),
            RadioError::CapacityExceeded => defmt::write!(f, "CapacityExceeded"),
            RadioError::InvalidHandle => defmt::write!(f, "InvalidHandle"),
            RadioError::SendFailed(err) => defmt::write!(f, "SendFailed({})", err),
            RadioError::PayloadTooLarge => defmt::write!(f, "PayloadTooLarge"),
            RadioError::EndpointsFull => defmt::write!(f, "EndpointsFull"),
        }
    }
}
