//! MQTT-SN messages over a registered radio.

use log::warn;

use super::Platform;
use super::error::RadioError;
use super::registry::{DEFAULT_CAPACITY, RadioHandle, RadioRegistry};
use super::status::ReceiveStatus;
use crate::network::application::mqttsn::{self, Message};

/// Largest frame a LoRa chip carries.
const FRAME_BUFFER_LEN: usize = 255;

#[derive(Debug, PartialEq, Eq, Clone, Copy)]
pub enum LinkError {
    Radio(RadioError),
    /// The outgoing message could not be encoded.
    Codec(mqttsn::Error),
    /// A received frame was malformed. Discard it and keep polling.
    Decode(mqttsn::Error),
}

impl From<RadioError> for LinkError {
    fn from(err: RadioError) -> Self {
        LinkError::Radio(err)
    }
}

#[cfg(feature = "defmt")]
impl defmt::Format for LinkError {
    fn format(&self, f: defmt::Formatter) {
        match self {
            LinkError::Radio(err) => defmt::write!(f, "Radio({})", err),
            LinkError::Codec(err) => defmt::write!(f, "Codec({})", err),
            LinkError::Decode(err) => defmt::write!(f, "Decode({})", err),
        }
    }
}

/// One MQTT-SN node on a shared radio.
#[derive(Debug)]
pub struct Link<'r, P: Platform, const N: usize = DEFAULT_CAPACITY> {
    registry: &'r mut RadioRegistry<P, N>,
    handle: RadioHandle,
    address: u8,
}

impl<'r, P: Platform, const N: usize> Link<'r, P, N> {
    /// Open a link for node `address`, registering it as an endpoint.
    pub fn open(
        registry: &'r mut RadioRegistry<P, N>,
        handle: RadioHandle,
        address: u8,
    ) -> Result<Self, LinkError> {
        registry.register_endpoint(handle, address)?;
        Ok(Self {
            registry,
            handle,
            address,
        })
    }

    pub fn address(&self) -> u8 {
        self.address
    }

    pub fn handle(&self) -> RadioHandle {
        self.handle
    }

    /// Encode `message` and deliver it to `to`.
    pub fn send(&mut self, message: &Message, to: u8) -> Result<(), LinkError> {
        let mut buf = [0u8; FRAME_BUFFER_LEN];
        let len = message.encode(&mut buf).map_err(LinkError::Codec)?;
        self.registry
            .send(self.handle, &buf[..len], self.address, to)?;
        Ok(())
    }

    /// Receive and decode a frame for an endpoint of this device, or a
    /// broadcast.
    ///
    /// `buf` only holds the raw frame; the decoded message owns its fields.
    pub fn poll(&mut self, buf: &mut [u8]) -> Result<Option<(Message, ReceiveStatus)>, LinkError> {
        let Some(status) = self.registry.receive_routed(self.handle, buf)? else {
            return Ok(None);
        };

        let frame = &buf[..usize::from(status.length)];
        match Message::decode(frame) {
            Ok(message) => Ok(Some((message, status))),
            Err(err) => {
                warn!(
                    "dropping malformed frame from {} ({} bytes): {:?}",
                    status.from, status.length, err
                );
                Err(LinkError::Decode(err))
            }
        }
    }
}
