//! ADS1x15 register map and configuration word definitions.
//!
//! # Copyright
//! Copyright (C) 2020-2022 QUARTIQ GmbH
use bit_field::BitField;
use enum_iterator::Sequence;
use serde::{Deserialize, Serialize};

use crate::{ConfigError, Variant};

#[doc(hidden)]
#[derive(Debug, Copy, Clone, PartialEq, Eq)]
pub(crate) enum Register {
    Conversion = 0x00,
    Config = 0x01,
    LowThreshold = 0x02,
    HighThreshold = 0x03,
}

/// Input multiplexer selection.
///
/// # Note
/// Declaration order is irrelevant for lookup: channels are only constructed from legal
/// `(positive, negative)` combinations.
#[derive(Debug, Copy, Clone, PartialEq, Eq, Serialize, Deserialize, Sequence)]
pub enum Channel {
    /// AIN0 - AIN1
    Diff0_1 = 0b000,
    /// AIN0 - AIN3
    Diff0_3 = 0b001,
    /// AIN1 - AIN3
    Diff1_3 = 0b010,
    /// AIN2 - AIN3
    Diff2_3 = 0b011,
    /// AIN0 - GND
    Single0 = 0b100,
    /// AIN1 - GND
    Single1 = 0b101,
    /// AIN2 - GND
    Single2 = 0b110,
    /// AIN3 - GND
    Single3 = 0b111,
}

impl Channel {
    /// Select a channel from an input pair.
    ///
    /// # Args
    /// * `positive` - The positive input (0-3).
    /// * `negative` - The negative input. `None` measures `positive` against ground.
    pub fn from_pair(positive: u8, negative: Option<u8>) -> Result<Self, ConfigError> {
        let channel = match (positive, negative) {
            (0, None) => Channel::Single0,
            (1, None) => Channel::Single1,
            (2, None) => Channel::Single2,
            (3, None) => Channel::Single3,
            (0, Some(1)) => Channel::Diff0_1,
            (0, Some(3)) => Channel::Diff0_3,
            (1, Some(3)) => Channel::Diff1_3,
            (2, Some(3)) => Channel::Diff2_3,
            _ => return Err(ConfigError::InvalidChannelPair),
        };

        Ok(channel)
    }

    /// Select a single-ended channel.
    pub fn single(input: u8) -> Result<Self, ConfigError> {
        Channel::from_pair(input, None)
    }

    /// Select a differential channel.
    pub fn differential(positive: u8, negative: u8) -> Result<Self, ConfigError> {
        Channel::from_pair(positive, Some(negative))
    }

    /// Get the input pair measured by this channel.
    pub fn pair(&self) -> (u8, Option<u8>) {
        match self {
            Channel::Single0 => (0, None),
            Channel::Single1 => (1, None),
            Channel::Single2 => (2, None),
            Channel::Single3 => (3, None),
            Channel::Diff0_1 => (0, Some(1)),
            Channel::Diff0_3 => (0, Some(3)),
            Channel::Diff1_3 => (1, Some(3)),
            Channel::Diff2_3 => (2, Some(3)),
        }
    }

    fn from_bits(bits: u16) -> Self {
        enum_iterator::all::<Channel>()
            .find(|channel| *channel as u16 == bits)
            .unwrap_or(Channel::Diff0_1)
    }
}

impl TryFrom<(u8, Option<u8>)> for Channel {
    type Error = ConfigError;

    fn try_from((positive, negative): (u8, Option<u8>)) -> Result<Self, Self::Error> {
        Channel::from_pair(positive, negative)
    }
}

/// Programmable gain amplifier setting. The variants are ordered by index.
#[derive(Debug, Copy, Clone, PartialEq, Eq, Serialize, Deserialize, Sequence)]
pub enum Gain {
    /// +/-6.144V full scale, 2/3x
    TwoThirds = 0b000,
    /// +/-4.096V full scale, 1x
    One = 0b001,
    /// +/-2.048V full scale, 2x
    Two = 0b010,
    /// +/-1.024V full scale, 4x
    Four = 0b011,
    /// +/-0.512V full scale, 8x
    Eight = 0b100,
    /// +/-0.256V full scale, 16x
    Sixteen = 0b101,
}

impl Gain {
    /// Look up a gain setting by its table index (0-5).
    pub fn from_index(index: usize) -> Result<Self, ConfigError> {
        enum_iterator::all::<Gain>()
            .nth(index)
            .ok_or(ConfigError::InvalidIndex)
    }

    /// The magnitude of the full-scale input range in millivolts.
    pub fn full_scale_mv(&self) -> u16 {
        match self {
            Gain::TwoThirds => 6144,
            Gain::One => 4096,
            Gain::Two => 2048,
            Gain::Four => 1024,
            Gain::Eight => 512,
            Gain::Sixteen => 256,
        }
    }

    fn from_bits(bits: u16) -> Self {
        // Codes 0b110 and 0b111 alias the 16x setting.
        enum_iterator::all::<Gain>()
            .find(|gain| *gain as u16 == bits)
            .unwrap_or(Gain::Sixteen)
    }
}

impl TryFrom<usize> for Gain {
    type Error = ConfigError;

    fn try_from(index: usize) -> Result<Self, Self::Error> {
        Gain::from_index(index)
    }
}

/// Conversion rate setting. The variants are ordered by index and named `Sps<ADS1015>_<ADS1115>`.
#[allow(non_camel_case_types)]
#[derive(Debug, Copy, Clone, PartialEq, Eq, Serialize, Deserialize, Sequence)]
pub enum DataRate {
    Sps128_8 = 0b000,
    Sps250_16 = 0b001,
    Sps490_32 = 0b010,
    Sps920_64 = 0b011,
    Sps1600_128 = 0b100,
    Sps2400_250 = 0b101,
    Sps3300_475 = 0b110,
    Sps3300_860 = 0b111,
}

impl DataRate {
    /// Look up a data rate by its table index (0-7).
    pub fn from_index(index: usize) -> Result<Self, ConfigError> {
        enum_iterator::all::<DataRate>()
            .nth(index)
            .ok_or(ConfigError::InvalidIndex)
    }

    /// Get the conversion rate of a device at this setting.
    pub fn samples_per_second(&self, variant: Variant) -> u16 {
        match variant {
            Variant::Ads1015 => match self {
                DataRate::Sps128_8 => 128,
                DataRate::Sps250_16 => 250,
                DataRate::Sps490_32 => 490,
                DataRate::Sps920_64 => 920,
                DataRate::Sps1600_128 => 1600,
                DataRate::Sps2400_250 => 2400,
                DataRate::Sps3300_475 | DataRate::Sps3300_860 => 3300,
            },
            Variant::Ads1115 => match self {
                DataRate::Sps128_8 => 8,
                DataRate::Sps250_16 => 16,
                DataRate::Sps490_32 => 32,
                DataRate::Sps920_64 => 64,
                DataRate::Sps1600_128 => 128,
                DataRate::Sps2400_250 => 250,
                DataRate::Sps3300_475 => 475,
                DataRate::Sps3300_860 => 860,
            },
        }
    }

    /// Get the nominal duration of one conversion, rounded up to the next microsecond.
    pub fn conversion_period(&self, variant: Variant) -> fugit::MicrosDurationU32 {
        let sps = self.samples_per_second(variant) as u32;
        fugit::MicrosDurationU32::from_ticks(1_000_000_u32.div_ceil(sps))
    }

    fn from_bits(bits: u16) -> Self {
        enum_iterator::all::<DataRate>()
            .find(|rate| *rate as u16 == bits)
            .unwrap_or(DataRate::Sps1600_128)
    }
}

impl TryFrom<usize> for DataRate {
    type Error = ConfigError;

    fn try_from(index: usize) -> Result<Self, Self::Error> {
        DataRate::from_index(index)
    }
}

/// Device operating mode.
#[derive(Debug, Copy, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum Mode {
    /// Free-running conversions.
    Continuous = 0,
    /// A single conversion per start request, powered down otherwise.
    SingleShot = 1,
}

#[derive(Debug, Copy, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum ComparatorMode {
    Traditional = 0,
    Window = 1,
}

/// Active level of the ALERT/RDY pin.
#[derive(Debug, Copy, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum ComparatorPolarity {
    ActiveLow = 0,
    ActiveHigh = 1,
}

/// Whether an asserted ALERT/RDY pin stays asserted until the conversion register is read.
#[derive(Debug, Copy, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum ComparatorLatch {
    NonLatching = 0,
    Latching = 1,
}

/// Number of conversions beyond threshold before ALERT/RDY asserts.
#[derive(Debug, Copy, Clone, PartialEq, Eq, Serialize, Deserialize, Sequence)]
pub enum ComparatorQueue {
    One = 0b00,
    Two = 0b01,
    Four = 0b10,
    /// Comparator disabled, ALERT/RDY held in its inactive state.
    Disabled = 0b11,
}

/// The comparator fields of the configuration word.
#[derive(Debug, Copy, Clone, PartialEq, Eq)]
pub struct Comparator {
    pub mode: ComparatorMode,
    pub polarity: ComparatorPolarity,
    pub latch: ComparatorLatch,
    pub queue: ComparatorQueue,
}

impl Comparator {
    /// The comparator is off. This is the power-on state of the device.
    pub const DISABLED: Comparator = Comparator {
        mode: ComparatorMode::Traditional,
        polarity: ComparatorPolarity::ActiveLow,
        latch: ComparatorLatch::NonLatching,
        queue: ComparatorQueue::Disabled,
    };

    /// Assert and latch ALERT/RDY after a single conversion beyond the high threshold.
    pub const ALERT: Comparator = Comparator {
        latch: ComparatorLatch::Latching,
        queue: ComparatorQueue::One,
        ..Comparator::DISABLED
    };

    /// Pulse ALERT/RDY once per conversion. Requires the conversion-ready threshold layout.
    pub const READY: Comparator = Comparator {
        queue: ComparatorQueue::One,
        ..Comparator::DISABLED
    };
}

/// The decoded contents of the configuration register.
#[derive(Debug, Copy, Clone, PartialEq, Eq)]
pub struct Config {
    /// On write, start a single conversion. On read, the device is idle.
    pub os: bool,
    pub channel: Channel,
    pub gain: Gain,
    pub mode: Mode,
    pub rate: DataRate,
    pub comparator: Comparator,
}

impl Config {
    /// A configuration that starts one power-down conversion with the comparator disabled.
    pub fn single_shot(channel: Channel, gain: Gain, rate: DataRate) -> Self {
        Config {
            os: true,
            channel,
            gain,
            mode: Mode::SingleShot,
            rate,
            comparator: Comparator::DISABLED,
        }
    }

    /// A free-running configuration using the ALERT/RDY pin as described by `comparator`.
    pub fn continuous(
        channel: Channel,
        gain: Gain,
        rate: DataRate,
        comparator: Comparator,
    ) -> Self {
        Config {
            os: false,
            channel,
            gain,
            mode: Mode::Continuous,
            rate,
            comparator,
        }
    }

    /// Encode the configuration into the register word.
    pub fn bits(&self) -> u16 {
        let mut bits = 0u16;
        bits.set_bit(15, self.os)
            .set_bits(12..15, self.channel as u16)
            .set_bits(9..12, self.gain as u16)
            .set_bit(8, self.mode == Mode::SingleShot)
            .set_bits(5..8, self.rate as u16)
            .set_bit(4, self.comparator.mode == ComparatorMode::Window)
            .set_bit(3, self.comparator.polarity == ComparatorPolarity::ActiveHigh)
            .set_bit(2, self.comparator.latch == ComparatorLatch::Latching)
            .set_bits(0..2, self.comparator.queue as u16);
        bits
    }

    /// Decode a configuration register word.
    pub fn from_bits(bits: u16) -> Self {
        let queue = enum_iterator::all::<ComparatorQueue>()
            .find(|queue| *queue as u16 == bits.get_bits(0..2))
            .unwrap_or(ComparatorQueue::Disabled);

        Config {
            os: bits.get_bit(15),
            channel: Channel::from_bits(bits.get_bits(12..15)),
            gain: Gain::from_bits(bits.get_bits(9..12)),
            mode: if bits.get_bit(8) {
                Mode::SingleShot
            } else {
                Mode::Continuous
            },
            rate: DataRate::from_bits(bits.get_bits(5..8)),
            comparator: Comparator {
                mode: if bits.get_bit(4) {
                    ComparatorMode::Window
                } else {
                    ComparatorMode::Traditional
                },
                polarity: if bits.get_bit(3) {
                    ComparatorPolarity::ActiveHigh
                } else {
                    ComparatorPolarity::ActiveLow
                },
                latch: if bits.get_bit(2) {
                    ComparatorLatch::Latching
                } else {
                    ComparatorLatch::NonLatching
                },
                queue,
            },
        }
    }
}

/// Encode a configuration word from table indices, with the comparator disabled.
///
/// # Args
/// * `channel` - The `(positive, negative)` input pair. `negative` is `None` for single-ended.
/// * `gain` - The gain table index (0-5).
/// * `rate` - The data rate table index (0-7).
/// * `mode` - The operating mode.
/// * `start` - Whether the OS bit requests a conversion.
pub fn encode_config(
    channel: (u8, Option<u8>),
    gain: usize,
    rate: usize,
    mode: Mode,
    start: bool,
) -> Result<u16, ConfigError> {
    let config = Config {
        os: start,
        channel: Channel::try_from(channel)?,
        gain: Gain::from_index(gain)?,
        mode,
        rate: DataRate::from_index(rate)?,
        comparator: Comparator::DISABLED,
    };

    Ok(config.bits())
}

#[cfg(test)]
mod tests {
    use super::*;

    const PAIRS: [(u8, Option<u8>); 8] = [
        (0, None),
        (1, None),
        (2, None),
        (3, None),
        (0, Some(1)),
        (0, Some(3)),
        (1, Some(3)),
        (2, Some(3)),
    ];

    #[test]
    fn encoding_round_trip() {
        for pair in PAIRS {
            for gain in 0..6 {
                for rate in 0..8 {
                    for mode in [Mode::Continuous, Mode::SingleShot] {
                        let bits = encode_config(pair, gain, rate, mode, true).unwrap();
                        let config = Config::from_bits(bits);

                        assert!(config.os);
                        assert_eq!(config.channel.pair(), pair);
                        assert_eq!(config.gain, Gain::from_index(gain).unwrap());
                        assert_eq!(config.rate, DataRate::from_index(rate).unwrap());
                        assert_eq!(config.mode, mode);
                        assert_eq!(config.comparator, Comparator::DISABLED);
                    }
                }
            }
        }
    }

    #[test]
    fn invalid_channel_pairs() {
        for positive in 0..6u8 {
            for negative in [None, Some(0), Some(1), Some(2), Some(3), Some(4)] {
                let result = Channel::from_pair(positive, negative);
                if PAIRS.contains(&(positive, negative)) {
                    assert!(result.is_ok());
                } else {
                    assert_eq!(result, Err(ConfigError::InvalidChannelPair));
                }
            }
        }

        assert_eq!(
            encode_config((1, Some(0)), 1, 4, Mode::SingleShot, true),
            Err(ConfigError::InvalidChannelPair)
        );
    }

    #[test]
    fn invalid_indices() {
        assert_eq!(Gain::from_index(6), Err(ConfigError::InvalidIndex));
        assert_eq!(DataRate::from_index(8), Err(ConfigError::InvalidIndex));
        assert_eq!(
            encode_config((0, None), 6, 0, Mode::SingleShot, true),
            Err(ConfigError::InvalidIndex)
        );
        assert_eq!(
            encode_config((0, None), 0, 8, Mode::SingleShot, true),
            Err(ConfigError::InvalidIndex)
        );
    }

    #[test]
    fn field_positions() {
        assert_eq!(
            encode_config((0, None), 1, 5, Mode::SingleShot, true),
            Ok(0x8000 | 0x4000 | 0x0200 | 0x0100 | 0x00A0 | 0x0003)
        );
        assert_eq!(
            encode_config((2, Some(3)), 0, 0, Mode::Continuous, false),
            Ok(0x3003)
        );

        let alert = Config::continuous(
            Channel::Single1,
            Gain::Two,
            DataRate::Sps3300_860,
            Comparator::ALERT,
        );
        assert_eq!(alert.bits(), 0x5000 | 0x0400 | 0x00E0 | 0x0004);
        assert_eq!(Config::from_bits(alert.bits()), alert);
    }

    #[test]
    fn gain_aliases() {
        assert_eq!(Config::from_bits(0x0C00).gain, Gain::Sixteen);
        assert_eq!(Config::from_bits(0x0E00).gain, Gain::Sixteen);
    }

    #[test]
    fn conversion_periods() {
        assert_eq!(DataRate::Sps128_8.samples_per_second(Variant::Ads1115), 8);
        assert_eq!(DataRate::Sps3300_860.samples_per_second(Variant::Ads1015), 3300);
        assert_eq!(
            DataRate::Sps128_8.conversion_period(Variant::Ads1115).ticks(),
            125_000
        );
        assert_eq!(
            DataRate::Sps3300_860.conversion_period(Variant::Ads1115).ticks(),
            1163
        );
    }
}
