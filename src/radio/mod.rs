//! Reliable LoRa radio transport
//!
//! Drives one or more half-duplex LoRa transceivers through a datagram layer
//! that acknowledges every frame at the MAC level. On top of that this module
//! adds device registration, bounded retries, interrupt-gated reception and a
//! compact receive status.
//!
//! The chip itself stays behind three traits implemented by the firmware
//! (or by test mocks):
//!
//! - [`Platform`]: process-wide GPIO bring-up and radio construction
//! - [`Radio`]: one transceiver plus its reliable datagram layer
//! - [`InterruptPin`]: the edge-detect flag of a radio's IRQ line
//!
//! # Example
//!
//! ```rust,ignore
//! use libmqttsn::radio::{RadioRegistry, RetryPolicy};
//!
//! let mut registry: RadioRegistry<MyPlatform> = RadioRegistry::new(platform);
//! let handle = registry.register_device(1, 868.0, 8, 25, 17)?;
//!
//! registry.send(handle, b"hello", 1, 2)?;
//!
//! let mut buf = [0u8; 255];
//! if let Some(status) = registry.receive(handle, &mut buf)? {
//!     let frame = &buf[..status.length as usize];
//! }
//! ```

#![allow(missing_docs)]

/// Device configuration.
pub mod config;

/// Radio error types.
pub mod error;

/// MQTT-SN over a registered radio.
pub mod link;

/// Device table and bring-up.
pub mod registry;

/// Receive status packing.
pub mod status;

/// Acknowledged send and interrupt-gated receive.
pub mod transport;

pub use config::{ConfigError, DeviceConfig};
pub use error::{InitError, RadioError, SendError};
pub use link::{Link, LinkError};
pub use registry::{BROADCAST_ADDRESS, DEFAULT_CAPACITY, DeviceStats, RadioHandle, RadioRegistry};
pub use status::ReceiveStatus;
pub use transport::{CancelToken, RetryPolicy};


/// GPIO lines wiring a transceiver to the host.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RadioPins {
    /// SPI chip select.
    pub chip_select: u8,
    /// Interrupt line (DIO0).
    pub irq: u8,
    /// Reset line.
    pub reset: u8,
}

/// Edge-detect flag of a radio's interrupt line.
pub trait InterruptPin {
    /// An edge was latched since the last [`clear_event`](Self::clear_event).
    fn event_detected(&self) -> bool;

    /// Clear the latched edge.
    fn clear_event(&mut self);
}

/// Header of a datagram handed over by [`Radio::recv_acked`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct Datagram {
    /// Bytes copied into the receive buffer.
    pub length: u8,
    pub from: u8,
    pub to: u8,
    /// Sequence id chosen by the sender.
    pub id: u8,
    /// Datagram header flags, including the ack bit.
    pub flags: u8,
}

/// A LoRa transceiver behind a reliable datagram layer.
///
/// Setup calls mirror the chip driver: each returns whether the chip
/// accepted it. `send_acked` makes exactly one attempt; retries are the
/// transport's job.
pub trait Radio {
    /// Bring up the datagram (addressing and ack) layer.
    fn init_datagram(&mut self) -> bool;

    /// Bring up the transceiver itself.
    fn init_radio(&mut self) -> bool;

    /// Tune to `mhz`.
    fn set_frequency(&mut self, mhz: f32) -> bool;

    /// Address this radio answers to.
    fn set_this_address(&mut self, address: u8);

    /// Source address written into outgoing headers.
    fn set_header_from(&mut self, address: u8);

    /// Enter continuous receive mode.
    fn set_mode_rx(&mut self);

    /// Transmit power in dBm, optionally through the PA_BOOST pin.
    fn set_tx_power(&mut self, dbm: i8, boost: bool);

    /// Channel activity detection timeout before transmitting, 0 disables it.
    fn set_cad_timeout(&mut self, ms: u32);

    /// Accept frames addressed to any node.
    fn set_promiscuous(&mut self, enabled: bool);

    /// Largest payload the chip carries in one frame.
    fn max_message_length(&self) -> u8;

    /// One send attempt to `to`, waiting up to `timeout_ms` for the ack.
    fn send_acked(&mut self, payload: &[u8], to: u8, sequence_id: u8, timeout_ms: u32) -> bool;

    /// Fetch a pending datagram into `buf` and ack it.
    ///
    /// `None` when nothing was pending, or when the frame was an ack or a
    /// duplicate the datagram layer swallowed.
    fn recv_acked(&mut self, buf: &mut [u8]) -> Option<Datagram>;

    /// Signal strength of the last received frame in dBm.
    fn last_rssi(&self) -> i8;
}

/// Host platform owning the GPIO and SPI peripherals.
pub trait Platform {
    type Radio: Radio;
    type Irq: InterruptPin;

    /// Process-wide bring-up. Called at most once per registry.
    fn init(&mut self) -> bool;

    /// Construct the transceiver wired to `pins`.
    fn create_radio(&mut self, pins: RadioPins, node_address: u8) -> (Self::Radio, Self::Irq);

    /// Release the peripherals.
    fn shutdown(&mut self) {}
}
