//! ADS1x15 runtime acquisition settings
//!
//! # Copyright
//! Copyright (C) 2020-2022 QUARTIQ GmbH
use miniconf::{Leaf, Tree};
use serde::{Deserialize, Serialize};

use crate::{Channel, DataRate};

/// Indicates how conversions are requested and collected.
#[derive(Serialize, Deserialize, Debug, Copy, Clone, PartialEq, Eq)]
pub enum Style {
    /// Each sample is an individually started and polled single-shot conversion.
    Polled,

    /// Each read returns the previous conversion and immediately starts the next one. Used with
    /// a periodic timer slower than the conversion period.
    Overlapped,

    /// Free-running conversions that latch ALERT/RDY above the alert threshold.
    Alert,

    /// Free-running conversions that pulse ALERT/RDY once per result.
    ReadyPulse,
}

/// Represents the runtime-configurable parameters of an acquisition.
///
/// # Note
/// The amplifier gain is fixed when the driver is constructed and is not part of this tree.
#[derive(Tree, Debug, Copy, Clone, PartialEq)]
pub struct Settings {
    pub channel: Leaf<Channel>,

    pub rate: Leaf<DataRate>,

    pub style: Leaf<Style>,

    /// Signed result code. Only used by the alert style.
    pub alert_threshold: Leaf<i16>,

    /// Maximum number of status polls for a polled conversion. `None` derives the limit from the
    /// data rate.
    #[tree(validate=self.validate_poll_limit)]
    pub poll_limit: Leaf<Option<u32>>,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            channel: Leaf::from(Channel::Single0),

            // The power-on data rate of the device.
            rate: Leaf::from(DataRate::Sps1600_128),

            style: Leaf::from(Style::Polled),

            // Representable by both devices.
            alert_threshold: Leaf::from(0x0400),

            poll_limit: Leaf::from(None),
        }
    }
}

impl Settings {
    fn validate_poll_limit(&mut self, depth: usize) -> Result<usize, &'static str> {
        if *self.poll_limit == Some(0) {
            return Err("Poll limit must allow at least one poll");
        }

        Ok(depth)
    }
}
