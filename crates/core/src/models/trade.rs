use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Direction of an executed ledger operation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum TradeSide {
    /// One-off purchase
    Buy,
    /// Sale / redemption
    Sell,
    /// Systematic (SIP) purchase of a fixed quantity
    Accumulate,
}

impl std::fmt::Display for TradeSide {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            TradeSide::Buy => write!(f, "Buy"),
            TradeSide::Sell => write!(f, "Sell"),
            TradeSide::Accumulate => write!(f, "SIP"),
        }
    }
}

/// Receipt for a successfully applied ledger operation.
///
/// Receipts are kept in a session journal only; they are not persisted.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Trade {
    pub id: Uuid,
    pub instrument_id: String,
    pub side: TradeSide,

    /// Absolute quantity traded (always positive)
    pub quantity: f64,

    pub unit_price: f64,
    pub executed_at: DateTime<Utc>,

    /// `(unit_price − average_cost) × quantity` for sells; `None` for purchases
    #[serde(default)]
    pub realized_pl: Option<f64>,
}

impl Trade {
    pub fn new(
        instrument_id: impl Into<String>,
        side: TradeSide,
        quantity: f64,
        unit_price: f64,
        realized_pl: Option<f64>,
    ) -> Self {
        Self {
            id: Uuid::new_v4(),
            instrument_id: instrument_id.into(),
            side,
            quantity,
            unit_price,
            executed_at: Utc::now(),
            realized_pl,
        }
    }

    /// Gross value of the trade (`quantity × unit_price`).
    pub fn gross_value(&self) -> f64 {
        self.quantity * self.unit_price
    }
}
