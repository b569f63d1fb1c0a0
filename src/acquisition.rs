//! Interrupt-driven sample acquisition
//!
//! # Copyright
//! Copyright (C) 2020-2022 QUARTIQ GmbH
//!
//! # Description
//! An acquisition collects a fixed number of samples, one per ready event. Ready events are
//! either falling edges of the ALERT/RDY pin (continuous conversions) or a periodic timer slower
//! than the conversion period (overlapped single-shot conversions). The session is
//! `const`-constructible so that it can be placed in a `static` shared between the event handler
//! and the application, which polls `is_complete()` and then consumes the samples.
use core::sync::atomic::{AtomicBool, AtomicI16, AtomicU32, AtomicUsize, Ordering};

use embedded_hal::{delay::DelayNs, i2c::I2c};

use crate::{Ads1x15, Error};

#[allow(clippy::declare_interior_mutable_const)]
const SAMPLE_INIT: AtomicI16 = AtomicI16::new(0);

#[allow(clippy::declare_interior_mutable_const)]
const TIMESTAMP_INIT: AtomicU32 = AtomicU32::new(0);

/// Indicates how a sample is collected on a ready event.
#[derive(Debug, Copy, Clone, PartialEq, Eq)]
pub enum Source {
    /// Read the latest result of free-running conversions.
    Latest,
    /// Read the previous result and start the prepared single-shot conversion.
    Restart,
}

/// The outcome of a ready event.
#[derive(Debug, Copy, Clone, PartialEq, Eq)]
pub enum Status {
    /// A sample was stored at the contained index.
    Stored(usize),
    /// The buffer was already full. The device was not accessed.
    Full,
    /// Another ready event is still being handled. The device was not accessed.
    Busy,
}

/// A fixed-capacity acquisition of samples and their timestamps.
pub struct Acquisition<const N: usize> {
    source: Source,
    samples: [AtomicI16; N],
    timestamps: [AtomicU32; N],
    index: AtomicUsize,
    busy: AtomicBool,
}

impl<const N: usize> Acquisition<N> {
    /// Construct an empty acquisition.
    ///
    /// # Args
    /// * `source` - How each ready event reads the device.
    pub const fn new(source: Source) -> Self {
        Self {
            source,
            samples: [SAMPLE_INIT; N],
            timestamps: [TIMESTAMP_INIT; N],
            index: AtomicUsize::new(0),
            busy: AtomicBool::new(false),
        }
    }

    /// Handle a ready event by reading one sample from the device.
    ///
    /// # Note
    /// This is intended to be called from the ready interrupt or timer handler. A call that
    /// preempts another in-progress call is rejected without touching the device.
    ///
    /// # Args
    /// * `adc` - The converter to read.
    /// * `timestamp` - An optional monotonic timestamp (e.g. microsecond ticks) for the sample.
    pub fn on_ready<I2C, D>(
        &self,
        adc: &mut Ads1x15<I2C, D>,
        timestamp: Option<u32>,
    ) -> Result<Status, Error<I2C::Error>>
    where
        I2C: I2c,
        D: DelayNs,
    {
        if self
            .busy
            .compare_exchange(false, true, Ordering::Acquire, Ordering::Relaxed)
            .is_err()
        {
            return Ok(Status::Busy);
        }

        let status = self.store(adc, timestamp);

        self.busy.store(false, Ordering::Release);

        status
    }

    fn store<I2C, D>(
        &self,
        adc: &mut Ads1x15<I2C, D>,
        timestamp: Option<u32>,
    ) -> Result<Status, Error<I2C::Error>>
    where
        I2C: I2c,
        D: DelayNs,
    {
        let index = self.index.load(Ordering::Relaxed);
        if index >= N {
            return Ok(Status::Full);
        }

        let sample = match self.source {
            Source::Latest => adc.read_latest()?,
            Source::Restart => adc.read_and_restart()?,
        };

        self.samples[index].store(sample, Ordering::Relaxed);
        self.timestamps[index].store(timestamp.unwrap_or(0), Ordering::Relaxed);

        // Publish the sample only after both buffers are written.
        self.index.store(index + 1, Ordering::Release);

        Ok(Status::Stored(index))
    }

    /// The number of samples collected so far.
    pub fn len(&self) -> usize {
        self.index.load(Ordering::Acquire)
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    pub const fn capacity(&self) -> usize {
        N
    }

    /// Check if the acquisition has collected all samples.
    pub fn is_complete(&self) -> bool {
        self.len() >= N
    }

    /// Get the collected samples in acquisition order.
    pub fn samples(&self) -> impl Iterator<Item = i16> + '_ {
        self.samples[..self.len()]
            .iter()
            .map(|sample| sample.load(Ordering::Relaxed))
    }

    /// Get the timestamps of the collected samples, index for index with `samples()`.
    pub fn timestamps(&self) -> impl Iterator<Item = u32> + '_ {
        self.timestamps[..self.len()]
            .iter()
            .map(|timestamp| timestamp.load(Ordering::Relaxed))
    }

    /// Discard all samples to start a new acquisition into the same buffers.
    ///
    /// # Note
    /// Only call this while no ready events can arrive, e.g. with the ready interrupt masked or
    /// the conversions stopped. A ready event handled concurrently may store into the old
    /// acquisition.
    pub fn reset(&self) {
        self.index.store(0, Ordering::Release);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{Channel, DataRate, Gain};
    use embedded_hal::i2c::ErrorKind;
    use embedded_hal_mock::eh1::{
        delay::NoopDelay,
        i2c::{Mock as I2cMock, Transaction as I2cTransaction},
    };

    const ADDRESS: u8 = 0x48;

    fn conversion_read(value: u16) -> I2cTransaction {
        I2cTransaction::write_read(ADDRESS, vec![0x00], value.to_be_bytes().to_vec())
    }

    #[test]
    fn fills_to_capacity() {
        let expectations = [
            conversion_read(0x0001),
            conversion_read(0xFFFF),
            conversion_read(0x7FFF),
        ];

        let mut adc = Ads1x15::ads1115(
            I2cMock::new(&expectations),
            NoopDelay::new(),
            ADDRESS,
            Gain::One,
        );
        let acquisition: Acquisition<3> = Acquisition::new(Source::Latest);

        assert_eq!(acquisition.on_ready(&mut adc, Some(100)), Ok(Status::Stored(0)));
        assert_eq!(acquisition.on_ready(&mut adc, Some(110)), Ok(Status::Stored(1)));
        assert!(!acquisition.is_complete());
        assert_eq!(acquisition.on_ready(&mut adc, Some(120)), Ok(Status::Stored(2)));
        assert!(acquisition.is_complete());

        // A full buffer never reaches the bus.
        assert_eq!(acquisition.on_ready(&mut adc, Some(130)), Ok(Status::Full));

        assert!(acquisition.samples().eq([1, -1, 32767]));
        assert!(acquisition.timestamps().eq([100, 110, 120]));

        let (mut i2c, _) = adc.release();
        i2c.done();
    }

    #[test]
    fn reentry_is_rejected() {
        let mut adc = Ads1x15::ads1115(I2cMock::new(&[]), NoopDelay::new(), ADDRESS, Gain::One);
        let acquisition: Acquisition<4> = Acquisition::new(Source::Latest);

        acquisition.busy.store(true, Ordering::SeqCst);
        assert_eq!(acquisition.on_ready(&mut adc, None), Ok(Status::Busy));
        assert!(acquisition.is_empty());

        let (mut i2c, _) = adc.release();
        i2c.done();
    }

    #[test]
    fn restart_source() {
        let config = 0x8000 | 0x4000 | 0x0200 | 0x0100 | 0x00E0 | 0x0003;
        let [high, low] = u16::to_be_bytes(config);
        let expectations = [
            conversion_read(0x0050),
            I2cTransaction::write(ADDRESS, vec![0x01, high, low]),
        ];

        let mut adc = Ads1x15::ads1015(
            I2cMock::new(&expectations),
            NoopDelay::new(),
            ADDRESS,
            Gain::One,
        );
        adc.prepare(DataRate::Sps3300_860, Channel::Single0);

        let acquisition: Acquisition<1> = Acquisition::new(Source::Restart);
        assert_eq!(acquisition.on_ready(&mut adc, None), Ok(Status::Stored(0)));
        assert!(acquisition.samples().eq([5]));
        assert!(acquisition.timestamps().eq([0]));

        let (mut i2c, _) = adc.release();
        i2c.done();
    }

    #[test]
    fn failed_read_releases_guard() {
        let expectations = [
            conversion_read(0x0000).with_error(ErrorKind::Other),
            conversion_read(0x0002),
        ];

        let mut adc = Ads1x15::ads1115(
            I2cMock::new(&expectations),
            NoopDelay::new(),
            ADDRESS,
            Gain::One,
        );
        let acquisition: Acquisition<2> = Acquisition::new(Source::Latest);

        assert_eq!(
            acquisition.on_ready(&mut adc, None),
            Err(Error::Interface(ErrorKind::Other))
        );
        assert!(acquisition.is_empty());
        assert_eq!(acquisition.on_ready(&mut adc, None), Ok(Status::Stored(0)));

        let (mut i2c, _) = adc.release();
        i2c.done();
    }

    #[test]
    fn static_session() {
        static SESSION: Acquisition<2> = Acquisition::new(Source::Latest);

        let expectations = [conversion_read(0x0003), conversion_read(0x0004)];
        let mut adc = Ads1x15::ads1115(
            I2cMock::new(&expectations),
            NoopDelay::new(),
            ADDRESS,
            Gain::One,
        );

        assert_eq!(SESSION.capacity(), 2);
        assert_eq!(SESSION.on_ready(&mut adc, None), Ok(Status::Stored(0)));
        assert!(SESSION.samples().eq([3]));

        SESSION.reset();
        assert!(SESSION.is_empty());
        assert_eq!(SESSION.on_ready(&mut adc, Some(7)), Ok(Status::Stored(0)));
        assert!(SESSION.samples().eq([4]));
        assert!(SESSION.timestamps().eq([7]));

        let (mut i2c, _) = adc.release();
        i2c.done();
    }

    #[test]
    fn reset_reuses_buffers() {
        let expectations = [conversion_read(0x0003), conversion_read(0x0004)];
        let mut adc = Ads1x15::ads1115(
            I2cMock::new(&expectations),
            NoopDelay::new(),
            ADDRESS,
            Gain::One,
        );
        let acquisition: Acquisition<1> = Acquisition::new(Source::Latest);

        assert_eq!(acquisition.on_ready(&mut adc, Some(1)), Ok(Status::Stored(0)));
        assert!(acquisition.is_complete());

        acquisition.reset();
        assert!(acquisition.is_empty());
        assert_eq!(acquisition.on_ready(&mut adc, Some(2)), Ok(Status::Stored(0)));
        assert!(acquisition.samples().eq([4]));
        assert!(acquisition.timestamps().eq([2]));

        let (mut i2c, _) = adc.release();
        i2c.done();
    }
}
