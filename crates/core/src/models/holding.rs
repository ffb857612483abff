use serde::{Deserialize, Serialize};

/// A net-positive position in one instrument.
///
/// `average_cost` is only meaningful while `quantity > 0`; the ledger deletes
/// the holding when the position is fully closed instead of keeping a zero row.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Holding {
    /// The instrument this position is in
    pub instrument_id: String,

    /// Shares (whole) or fund units (possibly fractional), always > 0
    pub quantity: f64,

    /// Weighted average price paid per unit, rounded to 2 decimals
    pub average_cost: f64,
}

impl Holding {
    pub fn new(instrument_id: impl Into<String>, quantity: f64, average_cost: f64) -> Self {
        Self {
            instrument_id: instrument_id.into(),
            quantity,
            average_cost,
        }
    }

    /// Total amount paid for the current position (`average_cost × quantity`).
    pub fn cost_basis(&self) -> f64 {
        self.average_cost * self.quantity
    }
}
