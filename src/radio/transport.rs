//! Acknowledged send and interrupt-gated receive.
//!
//! Every delivery gets one sequence id that all of its retries reuse, so the
//! receiving datagram layer drops repeats it already acked. Reception only
//! touches the radio when its interrupt line latched an edge.

use core::sync::atomic::{AtomicBool, Ordering};

use log::{debug, warn};

use super::error::{RadioError, SendError};
use super::registry::{BROADCAST_ADDRESS, RadioHandle, RadioRegistry, RadioSlot};
use super::status::ReceiveStatus;
use super::{InterruptPin, Platform, Radio};

/// Attempts per delivery unless configured otherwise.
pub const DEFAULT_RETRY_ATTEMPTS: u8 = 3;

/// Ack timeout per attempt in milliseconds unless configured otherwise.
pub const DEFAULT_RETRY_TIMEOUT_MS: u32 = 1000;

/// How hard a delivery tries before giving up.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RetryPolicy {
    attempts: u8,
    timeout_ms: u32,
}

impl RetryPolicy {
    /// At least one attempt is always made.
    pub const fn new(attempts: u8, timeout_ms: u32) -> Self {
        Self {
            attempts: if attempts == 0 { 1 } else { attempts },
            timeout_ms,
        }
    }

    pub const fn attempts(&self) -> u8 {
        self.attempts
    }

    pub const fn timeout_ms(&self) -> u32 {
        self.timeout_ms
    }
}

impl Default for RetryPolicy {
    fn default() -> Self {
        Self::new(DEFAULT_RETRY_ATTEMPTS, DEFAULT_RETRY_TIMEOUT_MS)
    }
}

/// Cancels a delivery between attempts.
///
/// Set from an interrupt handler or another task; the attempt in progress
/// always runs to completion.
#[derive(Debug, Default)]
pub struct CancelToken {
    cancelled: AtomicBool,
}

impl CancelToken {
    pub const fn new() -> Self {
        Self {
            cancelled: AtomicBool::new(false),
        }
    }

    pub fn cancel(&self) {
        self.cancelled.store(true, Ordering::Release);
    }

    pub fn is_cancelled(&self) -> bool {
        self.cancelled.load(Ordering::Acquire)
    }

    /// Re-arm the token for the next delivery.
    pub fn reset(&self) {
        self.cancelled.store(false, Ordering::Release);
    }
}

/// One send call in flight.
struct DeliveryAttempt<'a> {
    payload: &'a [u8],
    destination: u8,
    sequence_id: u8,
    attempts_remaining: u8,
    timeout_ms: u32,
}

impl<R: Radio, I: InterruptPin> RadioSlot<R, I> {
    fn deliver(
        &mut self,
        payload: &[u8],
        source: u8,
        destination: u8,
        cancel: Option<&CancelToken>,
    ) -> Result<(), RadioError> {
        if payload.len() > usize::from(self.radio.max_message_length()) {
            return Err(RadioError::PayloadTooLarge);
        }

        self.radio.set_header_from(source);
        let mut delivery = DeliveryAttempt {
            payload,
            destination,
            sequence_id: self.next_sequence_id(),
            attempts_remaining: self.retry.attempts(),
            timeout_ms: self.retry.timeout_ms(),
        };

        while delivery.attempts_remaining > 0 {
            if cancel.is_some_and(CancelToken::is_cancelled) {
                debug!(
                    "radio {}: delivery {} to {} cancelled",
                    self.index, delivery.sequence_id, delivery.destination
                );
                self.stats.send_failures = self.stats.send_failures.saturating_add(1);
                return Err(SendError::Cancelled.into());
            }

            delivery.attempts_remaining -= 1;
            if self.radio.send_acked(
                delivery.payload,
                delivery.destination,
                delivery.sequence_id,
                delivery.timeout_ms,
            ) {
                self.stats.record_sent(delivery.payload.len());
                return Ok(());
            }

            if delivery.attempts_remaining > 0 {
                debug!(
                    "radio {}: no ack for {} from {}, {} attempts left",
                    self.index,
                    delivery.sequence_id,
                    delivery.destination,
                    delivery.attempts_remaining
                );
            }
        }

        warn!(
            "radio {}: delivery {} to {} failed after {} attempts",
            self.index,
            delivery.sequence_id,
            delivery.destination,
            self.retry.attempts()
        );
        self.stats.send_failures = self.stats.send_failures.saturating_add(1);
        Err(SendError::RetriesExhausted.into())
    }

    fn poll(&mut self, buf: &mut [u8]) -> Option<ReceiveStatus> {
        if !self.irq.event_detected() {
            return None;
        }
        self.irq.clear_event();

        let cap = buf.len().min(usize::from(self.radio.max_message_length()));
        let datagram = self.radio.recv_acked(&mut buf[..cap])?;
        self.last_rssi = self.radio.last_rssi();

        let length = datagram.length.min(cap as u8);
        self.stats.record_received(usize::from(length));

        Some(ReceiveStatus {
            flags: datagram.flags,
            sequence_id: datagram.id,
            to: datagram.to,
            rssi: self.last_rssi,
            from: datagram.from,
            length,
        })
    }
}

impl<P: Platform, const N: usize> RadioRegistry<P, N> {
    /// Reliably send `payload` from `source` to `destination`.
    ///
    /// Blocks for up to `attempts × timeout`. The payload must fit in one
    /// frame; a longer one fails with [`RadioError::PayloadTooLarge`]
    /// before anything is transmitted.
    pub fn send(
        &mut self,
        handle: RadioHandle,
        payload: &[u8],
        source: u8,
        destination: u8,
    ) -> Result<(), RadioError> {
        self.try_slot_mut(handle)?
            .deliver(payload, source, destination, None)
    }

    /// [`send`](Self::send) that gives up once `cancel` is set.
    pub fn send_cancellable(
        &mut self,
        handle: RadioHandle,
        payload: &[u8],
        source: u8,
        destination: u8,
        cancel: &CancelToken,
    ) -> Result<(), RadioError> {
        self.try_slot_mut(handle)?
            .deliver(payload, source, destination, Some(cancel))
    }

    /// Fetch a pending frame into `buf`.
    ///
    /// Returns `Ok(None)` when the interrupt line saw no edge, or when the
    /// edge was an ack or a duplicate. A frame longer than `buf` is cut to
    /// fit and the status reports the copied length.
    pub fn receive(
        &mut self,
        handle: RadioHandle,
        buf: &mut [u8],
    ) -> Result<Option<ReceiveStatus>, RadioError> {
        Ok(self.try_slot_mut(handle)?.poll(buf))
    }

    /// [`receive`](Self::receive) keeping only frames for an endpoint
    /// registered on this device, or broadcast.
    pub fn receive_routed(
        &mut self,
        handle: RadioHandle,
        buf: &mut [u8],
    ) -> Result<Option<ReceiveStatus>, RadioError> {
        let slot = self.try_slot_mut(handle)?;
        let Some(status) = slot.poll(buf) else {
            return Ok(None);
        };

        if status.to == BROADCAST_ADDRESS || slot.endpoints.contains(&status.to) {
            Ok(Some(status))
        } else {
            warn!(
                "radio {}: dropped frame from {} for unknown endpoint {}",
                slot.index, status.from, status.to
            );
            Ok(None)
        }
    }
}
