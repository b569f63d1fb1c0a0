//! Error type definitions for the ADS1x15 driver
//!
//! # Copyright
//! Copyright (C) 2020-2022 QUARTIQ GmbH

/// Errors detected while encoding a configuration, before any bus transaction takes place.
#[derive(Debug, Copy, Clone, PartialEq, Eq, serde::Serialize)]
pub enum ConfigError {
    /// The channel combination is neither single-ended nor one of the four differential pairs.
    InvalidChannelPair,
    /// A gain or data rate index is outside of its table.
    InvalidIndex,
    /// An alert threshold does not fit in the result width of the device.
    InvalidThreshold,
}

/// Represents possible errors from the ADC driver.
#[derive(Debug, Copy, Clone, PartialEq, Eq)]
pub enum Error<E> {
    Config(ConfigError),
    Interface(E),
    /// The device never reported an idle OS bit within the poll budget.
    ConversionTimeout,
}

impl<E> From<ConfigError> for Error<E> {
    fn from(e: ConfigError) -> Self {
        Error::Config(e)
    }
}
