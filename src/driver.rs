//! Driver for the ADS1015/ADS1115 external ADC.
//!
//! # Copyright
//! Copyright (C) 2020-2022 QUARTIQ GmbH
use embedded_hal::{delay::DelayNs, i2c::I2c};

use crate::{
    register::{Comparator, Config, Mode, Register},
    settings::{Settings, Style},
    Channel, DataRate, Error, Gain, Variant,
};

/// Polls granted beyond twice the nominal conversion period before a conversion is considered
/// stuck.
const POLL_MARGIN: u32 = 4;

/// The high threshold layout (MSB set, low threshold MSB clear) that turns ALERT/RDY into a
/// conversion-ready output.
const READY_HIGH_THRESHOLD: u16 = 0x8000;

/// A driver for the ADS1x15 4-channel analog-to-digital converters.
pub struct Ads1x15<I2C, D> {
    i2c: I2C,
    delay: D,
    address: u8,
    gain: Gain,
    variant: Variant,
    pending: Option<u16>,
    poll_limit: Option<u32>,
}

impl<I2C, D> Ads1x15<I2C, D>
where
    I2C: I2c,
    D: DelayNs,
{
    /// Create a new ADC driver.
    ///
    /// # Note
    /// No bus transaction takes place until a conversion is requested.
    ///
    /// # Args
    /// * `i2c` - The I2C interface to use to communicate with the device.
    /// * `delay` - A means of sleeping between conversion status polls.
    /// * `address` - The 7-bit I2C address of the device, as strapped by the ADDR pin.
    /// * `gain` - The amplifier gain used for every conversion.
    /// * `variant` - The device on the bus.
    pub fn new(i2c: I2C, delay: D, address: u8, gain: Gain, variant: Variant) -> Self {
        Ads1x15 {
            i2c,
            delay,
            address,
            gain,
            variant,
            pending: None,
            poll_limit: None,
        }
    }

    /// Create a driver for the 12-bit ADS1015.
    pub fn ads1015(i2c: I2C, delay: D, address: u8, gain: Gain) -> Self {
        Ads1x15::new(i2c, delay, address, gain, Variant::Ads1015)
    }

    /// Create a driver for the 16-bit ADS1115.
    pub fn ads1115(i2c: I2C, delay: D, address: u8, gain: Gain) -> Self {
        Ads1x15::new(i2c, delay, address, gain, Variant::Ads1115)
    }

    /// Destroy the driver and return the bus and delay.
    pub fn release(self) -> (I2C, D) {
        (self.i2c, self.delay)
    }

    pub fn address(&self) -> u8 {
        self.address
    }

    pub fn gain(&self) -> Gain {
        self.gain
    }

    pub fn variant(&self) -> Variant {
        self.variant
    }

    /// Override the number of status polls allowed for a single-shot conversion.
    ///
    /// # Args
    /// * `limit` - The maximum number of CONFIG reads. `None` derives the budget from the
    ///   conversion period of the requested data rate. A limit of zero is raised to one.
    pub fn set_poll_limit(&mut self, limit: Option<u32>) {
        self.poll_limit = limit.map(|limit| limit.max(1));
    }

    fn write_register(&mut self, register: Register, value: u16) -> Result<(), Error<I2C::Error>> {
        let [high, low] = value.to_be_bytes();
        log::trace!("{:#04x}: {:?} <- {:#06x}", self.address, register, value);

        self.i2c
            .write(self.address, &[register as u8, high, low])
            .map_err(Error::Interface)
    }

    fn read_register(&mut self, register: Register) -> Result<u16, Error<I2C::Error>> {
        let mut value: [u8; 2] = [0; 2];
        self.i2c
            .write_read(self.address, &[register as u8], &mut value)
            .map_err(Error::Interface)?;

        Ok(u16::from_be_bytes(value))
    }

    fn poll_budget(&self, rate: DataRate) -> u32 {
        self.poll_limit.unwrap_or_else(|| {
            let period_ms = rate.conversion_period(self.variant).ticks().div_ceil(1000);
            2 * period_ms + POLL_MARGIN
        })
    }

    fn wait_idle(&mut self, rate: DataRate) -> Result<(), Error<I2C::Error>> {
        let budget = self.poll_budget(rate);

        for poll in 1..=budget {
            if self.is_idle()? {
                return Ok(());
            }

            // No sleep after the final poll.
            if poll < budget {
                self.delay.delay_ms(1);
            }
        }

        log::warn!(
            "{:#04x}: conversion did not complete after {} polls",
            self.address,
            budget
        );
        Err(Error::ConversionTimeout)
    }

    /// Read and decode the live configuration register.
    pub fn config(&mut self) -> Result<Config, Error<I2C::Error>> {
        Ok(Config::from_bits(self.read_register(Register::Config)?))
    }

    /// Check if the device has finished converting.
    ///
    /// # Returns
    /// True when no conversion is in progress.
    pub fn is_idle(&mut self) -> Result<bool, Error<I2C::Error>> {
        Ok(self.config()?.os)
    }

    /// Perform a single-shot conversion and wait for its result.
    ///
    /// # Note
    /// This blocks for the duration of the conversion, polling the device every millisecond.
    ///
    /// # Args
    /// * `rate` - The data rate of the conversion.
    /// * `channel` - The input to measure.
    ///
    /// # Returns
    /// The signed result code of the conversion.
    pub fn read(&mut self, rate: DataRate, channel: Channel) -> Result<i16, Error<I2C::Error>> {
        let config = Config::single_shot(channel, self.gain, rate);
        self.write_register(Register::Config, config.bits())?;

        self.wait_idle(rate)?;

        self.read_latest()
    }

    /// Compute and store the single-shot configuration used by `read_and_restart`.
    ///
    /// # Note
    /// This does not communicate with the device.
    pub fn prepare(&mut self, rate: DataRate, channel: Channel) {
        self.pending = Some(Config::single_shot(channel, self.gain, rate).bits());
    }

    /// Read the result of the previous conversion and start the prepared one.
    ///
    /// # Note
    /// The returned sample belongs to the conversion started by the previous call (or the first
    /// explicit start). The caller must allow a full conversion period between calls.
    pub fn read_and_restart(&mut self) -> Result<i16, Error<I2C::Error>> {
        let sample = self.read_latest()?;

        match self.pending {
            Some(config) => self.write_register(Register::Config, config)?,
            None => log::warn!("{:#04x}: no prepared conversion to restart", self.address),
        }

        Ok(sample)
    }

    /// Start the conversion prepared with `prepare` without reading a result.
    pub fn restart(&mut self) -> Result<(), Error<I2C::Error>> {
        match self.pending {
            Some(config) => self.write_register(Register::Config, config),
            None => {
                log::warn!("{:#04x}: no prepared conversion to restart", self.address);
                Ok(())
            }
        }
    }

    /// Configure the comparator thresholds.
    ///
    /// # Args
    /// * `low` - The low threshold as a signed result code.
    /// * `high` - The high threshold as a signed result code.
    pub fn set_thresholds(&mut self, low: i16, high: i16) -> Result<(), Error<I2C::Error>> {
        let low = self.variant.encode_threshold(low)?;
        let high = self.variant.encode_threshold(high)?;

        self.write_register(Register::LowThreshold, low)?;
        self.write_register(Register::HighThreshold, high)
    }

    /// Start continuous conversions, latching ALERT/RDY when a result exceeds `high_threshold`.
    ///
    /// # Args
    /// * `rate` - The data rate of the conversions.
    /// * `channel` - The input to measure.
    /// * `high_threshold` - The high threshold as a signed result code. The low threshold is 0.
    pub fn start_continuous_with_alert(
        &mut self,
        rate: DataRate,
        channel: Channel,
        high_threshold: i16,
    ) -> Result<(), Error<I2C::Error>> {
        self.set_thresholds(0, high_threshold)?;

        let config = Config::continuous(channel, self.gain, rate, Comparator::ALERT);
        self.write_register(Register::Config, config.bits())?;

        log::debug!(
            "{:#04x}: continuous {:?} at {} SPS, alert above {}",
            self.address,
            channel,
            rate.samples_per_second(self.variant),
            high_threshold
        );
        Ok(())
    }

    /// Start continuous conversions with ALERT/RDY pulsing once per completed conversion.
    ///
    /// # Args
    /// * `rate` - The data rate of the conversions.
    /// * `channel` - The input to measure.
    pub fn start_continuous_with_ready_pulse(
        &mut self,
        rate: DataRate,
        channel: Channel,
    ) -> Result<(), Error<I2C::Error>> {
        // The ready layout is a bit pattern rather than a code, so it bypasses the variant shift.
        self.write_register(Register::LowThreshold, 0)?;
        self.write_register(Register::HighThreshold, READY_HIGH_THRESHOLD)?;

        let config = Config::continuous(channel, self.gain, rate, Comparator::READY);
        self.write_register(Register::Config, config.bits())?;

        log::debug!(
            "{:#04x}: continuous {:?} at {} SPS with ready pulse",
            self.address,
            channel,
            rate.samples_per_second(self.variant)
        );
        Ok(())
    }

    /// Get the most recent conversion result without starting a conversion.
    pub fn read_latest(&mut self) -> Result<i16, Error<I2C::Error>> {
        let raw = self.read_register(Register::Conversion)?;
        Ok(self.variant.decode(raw))
    }

    /// Stop continuous conversions. The device powers down after the current conversion.
    pub fn power_down(&mut self) -> Result<(), Error<I2C::Error>> {
        let mut config = self.config()?;
        config.os = false;
        config.mode = Mode::SingleShot;
        config.comparator = Comparator::DISABLED;

        self.write_register(Register::Config, config.bits())
    }

    /// Configure the device for the acquisition style described by `settings`.
    ///
    /// # Note
    /// Polled acquisition does not touch the device: conversions are requested with `read`.
    /// Overlapped acquisition prepares and starts the first conversion so that the first
    /// `read_and_restart` returns a valid sample.
    pub fn apply(&mut self, settings: &Settings) -> Result<(), Error<I2C::Error>> {
        self.set_poll_limit(*settings.poll_limit);

        let (rate, channel) = (*settings.rate, *settings.channel);
        match *settings.style {
            Style::Polled => Ok(()),
            Style::Overlapped => {
                self.prepare(rate, channel);
                self.restart()
            }
            Style::Alert => {
                self.start_continuous_with_alert(rate, channel, *settings.alert_threshold)
            }
            Style::ReadyPulse => self.start_continuous_with_ready_pulse(rate, channel),
        }
    }
}
