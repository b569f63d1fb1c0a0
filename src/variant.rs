//! Chip variant policy for the ADS1x15 family.
//!
//! # Copyright
//! Copyright (C) 2020-2022 QUARTIQ GmbH
//!
//! # Description
//! Both devices share the register map and conversion sequencing. The ADS1015 left-justifies its
//! 12-bit result (and expects thresholds in the same layout) within the 16-bit registers, so the
//! only difference between the devices is a 4-bit shift applied at the edges of the protocol.
use serde::{Deserialize, Serialize};

use crate::ConfigError;

/// Indicates which device of the family is on the bus.
#[derive(Debug, Copy, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum Variant {
    /// 12-bit result, up to 3300 samples per second.
    Ads1015,
    /// 16-bit result, up to 860 samples per second.
    Ads1115,
}

impl Variant {
    /// The number of padding bits below the result in the conversion register.
    pub const fn result_shift(&self) -> u32 {
        match self {
            Variant::Ads1015 => 4,
            Variant::Ads1115 => 0,
        }
    }

    /// The number of bits a threshold is shifted up before it is written to the device.
    pub const fn threshold_shift(&self) -> u32 {
        self.result_shift()
    }

    /// The inclusive range of signed result codes the device can produce.
    pub const fn code_range(&self) -> (i16, i16) {
        (i16::MIN >> self.result_shift(), i16::MAX >> self.result_shift())
    }

    /// Decode a raw conversion register value into a signed result code.
    ///
    /// # Note
    /// The register holds a two's-complement value. The arithmetic shift preserves the sign of
    /// left-justified results.
    pub const fn decode(&self, raw: u16) -> i16 {
        (raw as i16) >> self.result_shift()
    }

    /// Encode a signed threshold code into the threshold register layout.
    ///
    /// # Returns
    /// The register value, or an error if the threshold cannot be represented by the device.
    pub fn encode_threshold(&self, threshold: i16) -> Result<u16, ConfigError> {
        let (low, high) = self.code_range();
        if !(low..=high).contains(&threshold) {
            return Err(ConfigError::InvalidThreshold);
        }

        Ok((threshold << self.threshold_shift()) as u16)
    }
}
