//! Declarative device configuration.
//!
//! ```json
//! {
//!   "name": "gateway-868",
//!   "radio": "RFM95",
//!   "address": 1,
//!   "frequency": 868.1,
//!   "cs": 8,
//!   "irq": 25,
//!   "rst": 17,
//!   "power": 20,
//!   "cad_timeout": 150
//! }
//! ```
//!
//! Omitted settings take the defaults listed on [`DeviceConfig`].

use serde::{Deserialize, Serialize};

use super::transport::{DEFAULT_RETRY_ATTEMPTS, DEFAULT_RETRY_TIMEOUT_MS, RetryPolicy};

#[derive(Debug, PartialEq, Eq, Clone, Copy)]
pub enum ConfigError {
    /// Not valid JSON, or a field has the wrong type.
    Parse,
    /// Parsed, but a value is out of range.
    Invalid,
}

#[cfg(feature = "defmt")]
impl defmt::Format for ConfigError {
    fn format(&self, f: defmt::Formatter) {
        match self {
            ConfigError::Parse => defmt::write!(f, "Parse"),
            ConfigError::Invalid => defmt::write!(f, "Invalid"),
        }
    }
}

/// Settings of one radio device.
///
/// Defaults: `power` 14 dBm, `boost` off, `cad_timeout` 0 (disabled),
/// `promiscuous` on, `retries` 3, `retry_timeout` 1000 ms.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DeviceConfig<'a> {
    #[serde(borrow)]
    pub name: &'a str,
    /// Chip model label, informational.
    #[serde(borrow)]
    pub radio: &'a str,
    /// Node address of the device.
    pub address: u8,
    /// Carrier frequency in MHz.
    pub frequency: f32,
    pub cs: u8,
    pub irq: u8,
    pub rst: u8,
    /// Transmit power in dBm.
    #[serde(default = "default_power")]
    pub power: i8,
    #[serde(default)]
    pub boost: bool,
    /// Channel activity detection timeout in milliseconds.
    #[serde(default)]
    pub cad_timeout: u32,
    #[serde(default = "default_promiscuous")]
    pub promiscuous: bool,
    /// Attempts per delivery.
    #[serde(default = "default_retries")]
    pub retries: u8,
    /// Ack timeout per attempt in milliseconds.
    #[serde(default = "default_retry_timeout")]
    pub retry_timeout: u32,
}

fn default_power() -> i8 {
    14
}

fn default_promiscuous() -> bool {
    true
}

fn default_retries() -> u8 {
    DEFAULT_RETRY_ATTEMPTS
}

fn default_retry_timeout() -> u32 {
    DEFAULT_RETRY_TIMEOUT_MS
}

impl<'a> DeviceConfig<'a> {
    /// Parse and validate a JSON document.
    pub fn from_json(json: &'a str) -> Result<Self, ConfigError> {
        let config: DeviceConfig<'a> = serde_json_core::from_str(json)
            .map_err(|_| ConfigError::Parse)?
            .0;
        config.validate()?;
        Ok(config)
    }

    /// Serialize into `buf`, returning the number of bytes written.
    pub fn to_json(&self, buf: &mut [u8]) -> Result<usize, ConfigError> {
        serde_json_core::to_slice(self, buf).map_err(|_| ConfigError::Parse)
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.retries == 0 || self.frequency.is_nan() || self.frequency <= 0.0 {
            return Err(ConfigError::Invalid);
        }
        Ok(())
    }

    pub fn retry_policy(&self) -> RetryPolicy {
        RetryPolicy::new(self.retries, self.retry_timeout)
    }
}
