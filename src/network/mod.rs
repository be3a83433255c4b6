//! Network protocol layer
//!
//! Protocol codecs grouped by OSI layer. Transports live elsewhere; see
//! [`radio`](crate::radio) for the LoRa link.

#![allow(missing_docs)]
#![deny(unsafe_code)]

/// Application layer protocols
pub mod application;
