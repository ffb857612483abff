use serde::{Deserialize, Serialize};

use crate::errors::CoreError;

use super::chart::ChartConfig;
use super::range::RangeKey;

/// Storage key the ledger snapshot is written under.
pub const DEFAULT_STORAGE_KEY: &str = "ny_holdings_v1";

/// Application settings. Every field falls back to its default when absent.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Settings {
    /// Quantity bought by one SIP (accumulate) instalment
    pub sip_quantity: f64,

    /// Range shown when a chart is first opened
    pub default_range: RangeKey,

    /// Key under which the ledger snapshot is stored
    pub storage_key: String,

    /// Chart appearance
    pub chart: ChartConfig,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            sip_quantity: 1.0,
            default_range: RangeKey::Day,
            storage_key: DEFAULT_STORAGE_KEY.to_string(),
            chart: ChartConfig::default(),
        }
    }
}

impl Settings {
    /// Parse settings from JSON; missing fields take their defaults.
    pub fn from_json(json: &str) -> Result<Self, CoreError> {
        let settings: Settings = serde_json::from_str(json)?;
        if !settings.sip_quantity.is_finite() || settings.sip_quantity <= 0.0 {
            return Err(CoreError::InvalidQuantity(format!(
                "sip_quantity must be positive, got {}",
                settings.sip_quantity
            )));
        }
        Ok(settings)
    }
}
