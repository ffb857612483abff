use serde::{Deserialize, Serialize};
use std::str::FromStr;

use crate::errors::CoreError;

/// Time-window selector for a price chart.
///
/// Controls how long and how volatile the synthetic series is.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum RangeKey {
    #[default]
    #[serde(rename = "1D")]
    Day,
    #[serde(rename = "1W")]
    Week,
    #[serde(rename = "1M")]
    Month,
    #[serde(rename = "6M")]
    HalfYear,
    #[serde(rename = "1Y")]
    Year,
}

/// Generator parameters for one range.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct RangeProfile {
    /// Number of points in the series (≥ 2)
    pub point_count: usize,

    /// Maximum per-step move as a fraction of the base price
    pub volatility: f64,
}

impl RangeKey {
    pub const ALL: [RangeKey; 5] = [
        RangeKey::Day,
        RangeKey::Week,
        RangeKey::Month,
        RangeKey::HalfYear,
        RangeKey::Year,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            RangeKey::Day => "1D",
            RangeKey::Week => "1W",
            RangeKey::Month => "1M",
            RangeKey::HalfYear => "6M",
            RangeKey::Year => "1Y",
        }
    }

    /// Longer windows get more points and a wider walk.
    pub fn profile(&self) -> RangeProfile {
        let (point_count, volatility) = match self {
            RangeKey::Day => (100, 0.02),
            RangeKey::Week => (200, 0.04),
            RangeKey::Month => (300, 0.06),
            RangeKey::HalfYear => (400, 0.09),
            RangeKey::Year => (500, 0.12),
        };
        RangeProfile {
            point_count,
            volatility,
        }
    }
}

impl std::fmt::Display for RangeKey {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for RangeKey {
    type Err = CoreError;

    /// Case-insensitive: "1d", "1D", "6m", …
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        RangeKey::ALL
            .iter()
            .copied()
            .find(|k| k.as_str().eq_ignore_ascii_case(s.trim()))
            .ok_or_else(|| CoreError::InvalidRange(s.to_string()))
    }
}
