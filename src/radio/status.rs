//! Receive status packing.
//!
//! Receive metadata travels as one integer across boundaries that cannot
//! carry a struct:
//!
//! ```text
//!  47     40 39     32 31     24 23     16 15      8 7       0
//! [  flags  ][   id   ][   to   ][  rssi  ][  from  ][ length ]
//! ```
//!
//! `rssi` is stored as its two's-complement byte.

/// Packed value meaning nothing was received.
pub const NO_DATA: u64 = 0;

/// Metadata of one received frame.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct ReceiveStatus {
    /// Datagram header flags.
    pub flags: u8,
    pub sequence_id: u8,
    pub to: u8,
    /// Signal strength in dBm.
    pub rssi: i8,
    pub from: u8,
    /// Bytes copied into the caller's buffer.
    pub length: u8,
}

impl ReceiveStatus {
    pub const fn pack(&self) -> u64 {
        pack(
            self.flags,
            self.sequence_id,
            self.to,
            self.rssi,
            self.from,
            self.length,
        )
    }

    pub const fn unpack(value: u64) -> Self {
        Self {
            flags: (value >> 40) as u8,
            sequence_id: (value >> 32) as u8,
            to: (value >> 24) as u8,
            rssi: (value >> 16) as u8 as i8,
            from: (value >> 8) as u8,
            length: value as u8,
        }
    }
}

/// Pack receive metadata into one integer.
pub const fn pack(flags: u8, sequence_id: u8, to: u8, rssi: i8, from: u8, length: u8) -> u64 {
    (flags as u64) << 40
        | (sequence_id as u64) << 32
        | (to as u64) << 24
        | (rssi as u8 as u64) << 16
        | (from as u64) << 8
        | length as u64
}

impl From<ReceiveStatus> for u64 {
    fn from(status: ReceiveStatus) -> Self {
        status.pack()
    }
}

impl From<u64> for ReceiveStatus {
    fn from(value: u64) -> Self {
        ReceiveStatus::unpack(value)
    }
}
