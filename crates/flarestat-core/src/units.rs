//! Bandwidth display units.
//!
//! The snapshot always stores raw bytes; conversion happens only when a
//! metric is read, so switching units never needs a re-fetch.

use strum::{Display, EnumIter, EnumString, IntoEnumIterator};
use tracing::debug;

/// Unit a byte-valued metric is presented in. Powers of 1024.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Display, EnumString, EnumIter)]
#[strum(ascii_case_insensitive)]
pub enum BandwidthUnit {
    #[strum(to_string = "B", serialize = "bytes")]
    Bytes,
    #[strum(to_string = "KB")]
    Kilobytes,
    #[default]
    #[strum(to_string = "MB")]
    Megabytes,
    #[strum(to_string = "GB")]
    Gigabytes,
}

impl BandwidthUnit {
    /// Resolve a user-supplied setting. Unrecognized input falls back to
    /// the default (MB) instead of failing setup.
    pub fn from_setting(raw: &str) -> Self {
        raw.trim().parse().unwrap_or_else(|_| {
            debug!(setting = raw, "unrecognized bandwidth unit, using default");
            Self::default()
        })
    }

    /// Bytes per one of this unit.
    pub fn factor(self) -> u64 {
        match self {
            Self::Bytes => 1,
            Self::Kilobytes => 1024,
            Self::Megabytes => 1024 * 1024,
            Self::Gigabytes => 1024 * 1024 * 1024,
        }
    }

    /// Unit-of-measurement string shown next to values.
    pub fn symbol(self) -> &'static str {
        match self {
            Self::Bytes => "B",
            Self::Kilobytes => "kB",
            Self::Megabytes => "MB",
            Self::Gigabytes => "GB",
        }
    }

    /// Convert a raw byte count, rounded to two decimals.
    #[allow(clippy::cast_precision_loss, clippy::as_conversions)]
    pub fn convert(self, raw_bytes: f64) -> f64 {
        round2(raw_bytes / self.factor() as f64)
    }

    /// Every accepted unit, for help text and prompts.
    pub fn all() -> Vec<Self> {
        Self::iter().collect()
    }
}

fn round2(value: f64) -> f64 {
    (value * 100.0).round() / 100.0
}
