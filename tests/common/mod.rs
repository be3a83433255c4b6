#![allow(dead_code)]

use libmqttsn::radio::{Datagram, InterruptPin, Platform, Radio, RadioPins};
use std::cell::RefCell;
use std::collections::VecDeque;
use std::rc::Rc;

/// RH_RF95_MAX_MESSAGE_LEN
pub const MOCK_MAX_MESSAGE_LEN: u8 = 251;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Fault {
    #[default]
    None,
    Datagram,
    Radio,
    Frequency,
}

#[derive(Debug, Clone, PartialEq)]
pub struct SentFrame {
    pub payload: Vec<u8>,
    pub from: u8,
    pub to: u8,
    pub sequence_id: u8,
    pub timeout_ms: u32,
}

#[derive(Debug)]
pub struct RadioState {
    pub fault: Fault,
    pub calls: Vec<&'static str>,
    pub frequency: Option<f32>,
    pub this_address: Option<u8>,
    pub header_from: Option<u8>,
    pub rx_mode: bool,
    pub tx_power: Option<(i8, bool)>,
    pub cad_timeout: Option<u32>,
    pub promiscuous: Option<bool>,
    pub max_len: u8,
    /// Ack outcome per attempt; `ack_default` once exhausted.
    pub ack_script: VecDeque<bool>,
    pub ack_default: bool,
    pub sent: Vec<SentFrame>,
    /// `None` stands for a frame the datagram layer swallows (ack, duplicate).
    pub inbox: VecDeque<Option<(Datagram, Vec<u8>, i8)>>,
    pub recv_calls: usize,
    pub rssi: i8,
    pub irq_pending: bool,
}

impl RadioState {
    fn new(fault: Fault) -> Self {
        Self {
            fault,
            calls: Vec::new(),
            frequency: None,
            this_address: None,
            header_from: None,
            rx_mode: false,
            tx_power: None,
            cad_timeout: None,
            promiscuous: None,
            max_len: MOCK_MAX_MESSAGE_LEN,
            ack_script: VecDeque::new(),
            ack_default: true,
            sent: Vec::new(),
            inbox: VecDeque::new(),
            recv_calls: 0,
            rssi: 0,
            irq_pending: false,
        }
    }
}

#[derive(Debug, Clone)]
pub struct MockRadio {
    pub state: Rc<RefCell<RadioState>>,
}

impl MockRadio {
    /// Queue a frame and latch the interrupt.
    pub fn deliver(&self, from: u8, to: u8, id: u8, payload: &[u8], rssi: i8) {
        let datagram = Datagram {
            length: payload.len() as u8,
            from,
            to,
            id,
            flags: 0,
        };
        let mut state = self.state.borrow_mut();
        state.inbox.push_back(Some((datagram, payload.to_vec(), rssi)));
        state.irq_pending = true;
    }

    /// Latch the interrupt for a frame the datagram layer will swallow.
    pub fn deliver_swallowed(&self) {
        let mut state = self.state.borrow_mut();
        state.inbox.push_back(None);
        state.irq_pending = true;
    }

    pub fn script_acks(&self, acks: &[bool]) {
        self.state.borrow_mut().ack_script.extend(acks.iter().copied());
    }

    pub fn never_ack(&self) {
        self.state.borrow_mut().ack_default = false;
    }

    pub fn sent(&self) -> Vec<SentFrame> {
        self.state.borrow().sent.clone()
    }

    pub fn recv_calls(&self) -> usize {
        self.state.borrow().recv_calls
    }

    pub fn calls(&self) -> Vec<&'static str> {
        self.state.borrow().calls.clone()
    }
}

impl Radio for MockRadio {
    fn init_datagram(&mut self) -> bool {
        let mut state = self.state.borrow_mut();
        state.calls.push("init_datagram");
        state.fault != Fault::Datagram
    }

    fn init_radio(&mut self) -> bool {
        let mut state = self.state.borrow_mut();
        state.calls.push("init_radio");
        state.fault != Fault::Radio
    }

    fn set_frequency(&mut self, mhz: f32) -> bool {
        let mut state = self.state.borrow_mut();
        state.calls.push("set_frequency");
        if state.fault == Fault::Frequency {
            return false;
        }
        state.frequency = Some(mhz);
        true
    }

    fn set_this_address(&mut self, address: u8) {
        let mut state = self.state.borrow_mut();
        state.calls.push("set_this_address");
        state.this_address = Some(address);
    }

    fn set_header_from(&mut self, address: u8) {
        let mut state = self.state.borrow_mut();
        state.calls.push("set_header_from");
        state.header_from = Some(address);
    }

    fn set_mode_rx(&mut self) {
        let mut state = self.state.borrow_mut();
        state.calls.push("set_mode_rx");
        state.rx_mode = true;
    }

    fn set_tx_power(&mut self, dbm: i8, boost: bool) {
        self.state.borrow_mut().tx_power = Some((dbm, boost));
    }

    fn set_cad_timeout(&mut self, ms: u32) {
        self.state.borrow_mut().cad_timeout = Some(ms);
    }

    fn set_promiscuous(&mut self, enabled: bool) {
        self.state.borrow_mut().promiscuous = Some(enabled);
    }

    fn max_message_length(&self) -> u8 {
        self.state.borrow().max_len
    }

    fn send_acked(&mut self, payload: &[u8], to: u8, sequence_id: u8, timeout_ms: u32) -> bool {
        let mut state = self.state.borrow_mut();
        let from = state.header_from.unwrap_or_default();
        state.sent.push(SentFrame {
            payload: payload.to_vec(),
            from,
            to,
            sequence_id,
            timeout_ms,
        });
        let default = state.ack_default;
        state.ack_script.pop_front().unwrap_or(default)
    }

    fn recv_acked(&mut self, buf: &mut [u8]) -> Option<Datagram> {
        let mut state = self.state.borrow_mut();
        state.recv_calls += 1;
        let (mut datagram, payload, rssi) = state.inbox.pop_front()??;
        let len = payload.len().min(buf.len());
        buf[..len].copy_from_slice(&payload[..len]);
        datagram.length = len as u8;
        state.rssi = rssi;
        Some(datagram)
    }

    fn last_rssi(&self) -> i8 {
        self.state.borrow().rssi
    }
}

#[derive(Debug, Clone)]
pub struct MockIrq {
    state: Rc<RefCell<RadioState>>,
}

impl InterruptPin for MockIrq {
    fn event_detected(&self) -> bool {
        self.state.borrow().irq_pending
    }

    fn clear_event(&mut self) {
        self.state.borrow_mut().irq_pending = false;
    }
}

#[derive(Debug, Default)]
pub struct PlatformState {
    pub init_ok: bool,
    pub init_calls: usize,
    pub shutdown_calls: usize,
    /// Applied to the radios created next, in order.
    pub faults: VecDeque<Fault>,
    pub created: Vec<(RadioPins, u8, MockRadio)>,
}

#[derive(Debug, Clone)]
pub struct MockPlatform {
    pub state: Rc<RefCell<PlatformState>>,
}

impl MockPlatform {
    pub fn new() -> Self {
        Self {
            state: Rc::new(RefCell::new(PlatformState {
                init_ok: true,
                ..PlatformState::default()
            })),
        }
    }

    pub fn failing() -> Self {
        let platform = Self::new();
        platform.state.borrow_mut().init_ok = false;
        platform
    }

    pub fn fail_next(&self, fault: Fault) {
        self.state.borrow_mut().faults.push_back(fault);
    }

    /// The `index`th radio the platform created.
    pub fn radio(&self, index: usize) -> MockRadio {
        self.state.borrow().created[index].2.clone()
    }

    pub fn pins(&self, index: usize) -> (RadioPins, u8) {
        let state = self.state.borrow();
        (state.created[index].0, state.created[index].1)
    }

    pub fn init_calls(&self) -> usize {
        self.state.borrow().init_calls
    }
}

impl Platform for MockPlatform {
    type Radio = MockRadio;
    type Irq = MockIrq;

    fn init(&mut self) -> bool {
        let mut state = self.state.borrow_mut();
        state.init_calls += 1;
        state.init_ok
    }

    fn create_radio(&mut self, pins: RadioPins, node_address: u8) -> (MockRadio, MockIrq) {
        let mut state = self.state.borrow_mut();
        let fault = state.faults.pop_front().unwrap_or_default();
        let shared = Rc::new(RefCell::new(RadioState::new(fault)));
        let radio = MockRadio {
            state: shared.clone(),
        };
        state.created.push((pins, node_address, radio.clone()));
        (radio, MockIrq { state: shared })
    }

    fn shutdown(&mut self) {
        self.state.borrow_mut().shutdown_calls += 1;
    }
}
