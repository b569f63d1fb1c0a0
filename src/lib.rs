//! Driver for the ADS1015/ADS1115 external ADCs.
//!
//! # Copyright
//! Copyright (C) 2020-2022 QUARTIQ GmbH
//!
//! # Description
//! The ADS1015 (12-bit) and ADS1115 (16-bit) are 4-input delta-sigma converters with a
//! programmable gain amplifier, a selectable data rate, and an ALERT/RDY pin that can signal
//! completed conversions. This driver supports:
//!
//! * Polled single-shot conversions (`Ads1x15::read`).
//! * Overlapped single-shot conversions paced by an external timer (`Ads1x15::prepare` and
//!   `Ads1x15::read_and_restart`).
//! * Free-running conversions signalled on ALERT/RDY, either latched above a threshold or pulsed
//!   once per result (`Ads1x15::start_continuous_with_alert`,
//!   `Ads1x15::start_continuous_with_ready_pulse`, `Ads1x15::read_latest`).
//!
//! Results are signed codes in the resolution of the device. The driver does not convert codes
//! to volts.
#![cfg_attr(not(test), no_std)]
#![deny(warnings)]

pub mod acquisition;
mod driver;
mod error;
pub mod register;
pub mod settings;
mod variant;

pub use acquisition::{Acquisition, Source, Status};
pub use driver::Ads1x15;
pub use error::{ConfigError, Error};
pub use register::{encode_config, Channel, Config, DataRate, Gain, Mode};
pub use settings::{Settings, Style};
pub use variant::Variant;
