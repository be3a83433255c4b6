//! Device table and bring-up.
//!
//! A [`RadioRegistry`] owns the host [`Platform`] and a fixed-capacity table
//! of radio slots. Handles index that table; slots are never removed, so a
//! handle stays valid for the life of the registry.

use heapless::Vec;
use log::{debug, error, info, warn};

use super::config::DeviceConfig;
use super::error::{InitError, RadioError};
use super::transport::RetryPolicy;
use super::{InterruptPin, Platform, Radio, RadioPins};

/// Slots per registry unless the capacity parameter says otherwise.
pub const DEFAULT_CAPACITY: usize = 10;

/// Logical endpoints a single device can serve.
pub const MAX_ENDPOINTS: usize = 8;

/// Recipient address every endpoint accepts.
pub const BROADCAST_ADDRESS: u8 = 0xFF;

/// Index of a registered device.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct RadioHandle(u8);

impl RadioHandle {
    pub const fn index(self) -> usize {
        self.0 as usize
    }
}

impl From<u8> for RadioHandle {
    fn from(index: u8) -> Self {
        RadioHandle(index)
    }
}

/// Traffic counters of one device.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct DeviceStats {
    pub packets_sent: u32,
    pub packets_received: u32,
    pub bytes_sent: u32,
    pub bytes_received: u32,
    /// Deliveries that ran out of attempts or were cancelled.
    pub send_failures: u32,
}

impl DeviceStats {
    pub(crate) fn record_sent(&mut self, bytes: usize) {
        self.packets_sent = self.packets_sent.saturating_add(1);
        self.bytes_sent = self.bytes_sent.saturating_add(bytes as u32);
    }

    pub(crate) fn record_received(&mut self, bytes: usize) {
        self.packets_received = self.packets_received.saturating_add(1);
        self.bytes_received = self.bytes_received.saturating_add(bytes as u32);
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum SlotState {
    Ready,
    Failed(InitError),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum PlatformState {
    Uninitialised,
    Ready,
    Failed,
}

pub(crate) struct RadioSlot<R, I> {
    pub(crate) index: u8,
    pub(crate) radio: R,
    pub(crate) irq: I,
    pub(crate) node_address: u8,
    pub(crate) last_rssi: i8,
    pub(crate) state: SlotState,
    pub(crate) retry: RetryPolicy,
    next_sequence: u8,
    pub(crate) endpoints: Vec<u8, MAX_ENDPOINTS>,
    pub(crate) stats: DeviceStats,
}

impl<R: Radio, I: InterruptPin> RadioSlot<R, I> {
    pub(crate) fn next_sequence_id(&mut self) -> u8 {
        let id = self.next_sequence;
        self.next_sequence = self.next_sequence.wrapping_add(1);
        id
    }

    /// Datagram layer, then the chip, then tuning and addressing.
    fn bring_up(&mut self, frequency: f32) -> Result<(), InitError> {
        if !self.radio.init_datagram() {
            return Err(InitError::DatagramInitFailed);
        }
        if !self.radio.init_radio() {
            return Err(InitError::RadioInitFailed);
        }
        if !self.radio.set_frequency(frequency) {
            warn!(
                "radio {}: {:?} at {} MHz, continuing",
                self.index,
                InitError::FrequencySetFailed,
                frequency
            );
        }
        self.radio.set_this_address(self.node_address);
        self.radio.set_header_from(self.node_address);
        self.radio.set_mode_rx();
        Ok(())
    }
}

/// Table of radio devices sharing one host platform.
///
/// Every operation takes `&mut self`, so one operation at a time runs on any
/// device. Wrap the registry in a mutex to share it across contexts.
///
/// Handles are one octet, so at most 256 devices are registered whatever
/// `N` is.
pub struct RadioRegistry<P: Platform, const N: usize = DEFAULT_CAPACITY> {
    platform: P,
    platform_state: PlatformState,
    slots: Vec<RadioSlot<P::Radio, P::Irq>, N>,
    retry: RetryPolicy,
}

impl<P: Platform, const N: usize> core::fmt::Debug for RadioRegistry<P, N> {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.debug_struct("RadioRegistry")
            .field("platform_state", &self.platform_state)
            .field("slots", &self.slots.len())
            .field("capacity", &N)
            .finish()
    }
}

impl<P: Platform, const N: usize> RadioRegistry<P, N> {
    pub fn new(platform: P) -> Self {
        Self::with_retry_policy(platform, RetryPolicy::default())
    }

    /// Registry whose devices start with `retry` instead of the default.
    pub fn with_retry_policy(platform: P, retry: RetryPolicy) -> Self {
        Self {
            platform,
            platform_state: PlatformState::Uninitialised,
            slots: Vec::new(),
            retry,
        }
    }

    fn ensure_platform(&mut self) -> Result<(), InitError> {
        match self.platform_state {
            PlatformState::Ready => Ok(()),
            PlatformState::Failed => Err(InitError::PlatformInitFailed),
            PlatformState::Uninitialised => {
                if self.platform.init() {
                    info!("radio platform initialised");
                    self.platform_state = PlatformState::Ready;
                    Ok(())
                } else {
                    error!("radio platform initialisation failed");
                    self.platform_state = PlatformState::Failed;
                    Err(InitError::PlatformInitFailed)
                }
            }
        }
    }

    /// Bring up a radio and give it the next free slot.
    ///
    /// A radio that fails bring-up still takes its slot, which then behaves
    /// as an invalid handle.
    pub fn register_device(
        &mut self,
        node_address: u8,
        frequency: f32,
        chip_select: u8,
        irq: u8,
        reset: u8,
    ) -> Result<RadioHandle, RadioError> {
        if self.slots.is_full() {
            error!("radio registry full, {} devices registered", N);
            return Err(RadioError::CapacityExceeded);
        }
        let index = u8::try_from(self.slots.len()).map_err(|_| {
            error!("radio registry out of handles, {} devices registered", self.slots.len());
            RadioError::CapacityExceeded
        })?;
        self.ensure_platform()?;

        let pins = RadioPins {
            chip_select,
            irq,
            reset,
        };
        let (radio, irq) = self.platform.create_radio(pins, node_address);
        let mut slot = RadioSlot {
            index,
            radio,
            irq,
            node_address,
            last_rssi: 0,
            state: SlotState::Ready,
            retry: self.retry,
            next_sequence: 0,
            endpoints: Vec::new(),
            stats: DeviceStats::default(),
        };

        let result = slot.bring_up(frequency);
        if let Err(err) = result {
            error!("radio {}: bring-up failed: {:?}", index, err);
            slot.state = SlotState::Failed(err);
        } else {
            info!(
                "radio {}: node {} on {} MHz (cs {}, irq {}, rst {})",
                index, node_address, frequency, pins.chip_select, pins.irq, pins.reset
            );
        }

        // Capacity was checked above.
        if self.slots.push(slot).is_err() {
            return Err(RadioError::CapacityExceeded);
        }
        result.map(|()| RadioHandle(index)).map_err(RadioError::from)
    }

    /// Register a device and apply the rest of its configuration.
    pub fn register_configured(
        &mut self,
        config: &DeviceConfig<'_>,
    ) -> Result<RadioHandle, RadioError> {
        let handle = self.register_device(
            config.address,
            config.frequency,
            config.cs,
            config.irq,
            config.rst,
        )?;

        let slot = self.try_slot_mut(handle)?;
        slot.radio.set_tx_power(config.power, config.boost);
        if config.cad_timeout > 0 {
            slot.radio.set_cad_timeout(config.cad_timeout);
        }
        slot.radio.set_promiscuous(config.promiscuous);
        slot.retry = config.retry_policy();

        debug!(
            "radio {}: configured as {} ({}), {} dBm",
            handle.index(),
            config.name,
            config.radio,
            config.power
        );
        Ok(handle)
    }

    pub(crate) fn try_slot_mut(
        &mut self,
        handle: RadioHandle,
    ) -> Result<&mut RadioSlot<P::Radio, P::Irq>, RadioError> {
        match self.slots.get_mut(handle.index()) {
            Some(slot) if slot.state == SlotState::Ready => Ok(slot),
            _ => Err(RadioError::InvalidHandle),
        }
    }

    fn try_slot(&self, handle: RadioHandle) -> Result<&RadioSlot<P::Radio, P::Irq>, RadioError> {
        match self.slots.get(handle.index()) {
            Some(slot) if slot.state == SlotState::Ready => Ok(slot),
            _ => Err(RadioError::InvalidHandle),
        }
    }

    pub fn try_set_power(
        &mut self,
        handle: RadioHandle,
        dbm: i8,
        boost: bool,
    ) -> Result<(), RadioError> {
        self.try_slot_mut(handle)?.radio.set_tx_power(dbm, boost);
        Ok(())
    }

    /// Transmit power in dBm; false for an invalid handle.
    pub fn set_power(&mut self, handle: RadioHandle, dbm: i8, boost: bool) -> bool {
        self.try_set_power(handle, dbm, boost).is_ok()
    }

    pub fn try_set_timeout(&mut self, handle: RadioHandle, ms: u32) -> Result<(), RadioError> {
        self.try_slot_mut(handle)?.radio.set_cad_timeout(ms);
        Ok(())
    }

    /// Channel activity detection timeout; false for an invalid handle.
    pub fn set_timeout(&mut self, handle: RadioHandle, ms: u32) -> bool {
        self.try_set_timeout(handle, ms).is_ok()
    }

    pub fn try_set_promiscuous(
        &mut self,
        handle: RadioHandle,
        enabled: bool,
    ) -> Result<(), RadioError> {
        self.try_slot_mut(handle)?.radio.set_promiscuous(enabled);
        Ok(())
    }

    pub fn set_promiscuous(&mut self, handle: RadioHandle, enabled: bool) {
        if self.try_set_promiscuous(handle, enabled).is_err() {
            debug!("set_promiscuous on invalid handle {}", handle.index());
        }
    }

    pub fn try_is_packet_available(&self, handle: RadioHandle) -> Result<bool, RadioError> {
        Ok(self.try_slot(handle)?.irq.event_detected())
    }

    /// Whether the interrupt line latched an edge. Does not clear it.
    pub fn is_packet_available(&self, handle: RadioHandle) -> bool {
        self.try_is_packet_available(handle).unwrap_or(false)
    }

    pub fn try_max_payload_size(&self, handle: RadioHandle) -> Result<u16, RadioError> {
        Ok(u16::from(self.try_slot(handle)?.radio.max_message_length()))
    }

    /// Largest payload one frame carries; 0 for an invalid handle.
    pub fn max_payload_size(&self, handle: RadioHandle) -> u16 {
        self.try_max_payload_size(handle).unwrap_or(0)
    }

    /// Serve `address` on this device. Registering twice is a no-op.
    pub fn register_endpoint(&mut self, handle: RadioHandle, address: u8) -> Result<(), RadioError> {
        let slot = self.try_slot_mut(handle)?;
        if slot.endpoints.contains(&address) {
            return Ok(());
        }
        slot.endpoints
            .push(address)
            .map_err(|_| RadioError::EndpointsFull)?;
        debug!("radio {}: endpoint {} registered", slot.index, address);
        Ok(())
    }

    pub fn endpoints(&self, handle: RadioHandle) -> Result<&[u8], RadioError> {
        Ok(self.try_slot(handle)?.endpoints.as_slice())
    }

    pub fn stats(&self, handle: RadioHandle) -> Result<DeviceStats, RadioError> {
        Ok(self.try_slot(handle)?.stats)
    }

    pub fn node_address(&self, handle: RadioHandle) -> Result<u8, RadioError> {
        Ok(self.try_slot(handle)?.node_address)
    }

    /// Signal strength of the last frame received on this device.
    pub fn last_rssi(&self, handle: RadioHandle) -> Result<i8, RadioError> {
        Ok(self.try_slot(handle)?.last_rssi)
    }

    /// Slots taken, including failed ones.
    pub fn len(&self) -> usize {
        self.slots.len()
    }

    pub fn is_empty(&self) -> bool {
        self.slots.is_empty()
    }

    pub const fn capacity(&self) -> usize {
        N
    }

    /// Drop every device and hand the platform back.
    pub fn shutdown(mut self) -> P {
        self.slots.clear();
        if self.platform_state == PlatformState::Ready {
            self.platform.shutdown();
        }
        info!("radio platform shut down");
        self.platform
    }
}
