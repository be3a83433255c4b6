//! # Application Layer Network Protocols
//!
//! Application layer protocols used by the crate. Each protocol keeps its wire
//! format separate from the transport that carries it, so the same codec
//! works over a radio link, a serial line or a UDP socket.
//!
//! ## Available Protocols
//!
//! - **[`mqttsn`]**: MQTT-SN v1.2, publish/subscribe for sensor networks
//!
//! ## Design Principles
//!
//! - **Transport Agnostic**: Codecs read from and write to plain byte slices
//! - **No-std Compatible**: Designed for embedded systems without heap allocation
//! - **Resource Conscious**: Fixed-capacity buffers with explicit limits
//! - **Error Handling**: Malformed input is an error value, never a panic

/// MQTT-SN message codec.
///
/// Encodes and decodes every MQTT-SN v1.2 message type, including the
/// forwarder encapsulation, to and from byte buffers.
pub mod mqttsn;
