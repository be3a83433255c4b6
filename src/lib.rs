//! # libmqttsn - MQTT-SN over LoRa
//!
//! An MQTT-SN v1.2 message codec and a reliable LoRa radio transport for
//! sensor nodes and gateways. The library is designed for embedded systems
//! and supports `no_std` environments.
//!
//! ## Features
//!
//! ### MQTT-SN Codec
//! - Every MQTT-SN v1.2 message type, including forwarder encapsulation
//! - Short and three-octet frame lengths
//! - Fixed-capacity fields, no heap allocation
//!
//! ### Radio Transport
//! - Registry of independently addressed LoRa devices
//! - Acknowledged send with bounded, cancellable retries
//! - Interrupt-gated receive with a compact status word
//! - JSON device configuration
//!
//! ## Usage
//!
//! Add this to your `Cargo.toml`:
//!
//! ```toml
//! [dependencies]
//! libmqttsn = "0.1.0"
//! ```
//!
//! ### Encoding a PUBLISH
//!
//! ```rust
//! use libmqttsn::network::application::mqttsn::{Flags, Message, Publish, QoS};
//!
//! let flags = Flags::new().with_qos(QoS::AtLeastOnce);
//! let message = Message::Publish(Publish::new(flags, 7, 1, b"21.5").unwrap());
//!
//! let mut buf = [0u8; 32];
//! let len = message.encode(&mut buf).unwrap();
//! assert_eq!(buf[0] as usize, len);
//! ```
//!
//! ### Sending over a radio
//!
//! ```rust,ignore
//! use libmqttsn::radio::{DeviceConfig, Link, RadioRegistry};
//!
//! let config = DeviceConfig::from_json(CONFIG)?;
//! let mut registry: RadioRegistry<MyPlatform> = RadioRegistry::new(platform);
//! let handle = registry.register_configured(&config)?;
//!
//! let mut link = Link::open(&mut registry, handle, config.address)?;
//! link.send(&message, GATEWAY_ADDRESS)?;
//! ```
//!
//! ## Platform Support
//!
//! The radio chip is reached through the [`radio::Platform`] and
//! [`radio::Radio`] traits, so the same code runs on:
//! - Embedded microcontrollers (ARM Cortex-M, RISC-V, etc.)
//! - Linux-based gateways (Raspberry Pi with an RFM95 hat, etc.)
//!
//! ## Optional Features
//!
//! - `std`: Enable standard library support (default: disabled)
//! - `defmt`: Enable defmt formatting of error types

#![cfg_attr(not(feature = "std"), no_std)]
#![deny(missing_docs)]
#![warn(missing_debug_implementations)]

/// Network protocol codecs.
///
/// Holds the MQTT-SN message catalogue and frame codec.
pub mod network;

/// LoRa radio transport.
///
/// Device registry, reliable send and receive, status packing and the
/// MQTT-SN link that ties the codec to a radio.
pub mod radio;
