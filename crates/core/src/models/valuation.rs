use serde::{Deserialize, Serialize};

use super::instrument::InstrumentKind;

/// Live valuation of the whole ledger at current catalog prices.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct PortfolioSummary {
    /// Σ current_value over all holdings
    pub total_value: f64,

    /// Σ average_cost × quantity over all holdings
    pub total_invested: f64,

    /// total_value − total_invested
    pub unrealized_pl: f64,

    /// unrealized_pl / total_invested × 100, or 0 when nothing is invested
    pub unrealized_pl_pct: f64,

    /// Σ quantity: the raw unit count shown as "Holdings" on the summary card
    pub unit_count: f64,

    /// Number of distinct instruments held
    pub position_count: usize,

    /// Per-holding breakdown, largest allocation first
    pub holdings: Vec<HoldingValuation>,
}

/// Valuation of a single holding.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct HoldingValuation {
    pub instrument_id: String,
    pub name: String,
    pub symbol: String,
    pub kind: InstrumentKind,

    pub quantity: f64,
    pub average_cost: f64,

    /// Current reference price of the instrument
    pub price: f64,

    /// price × quantity
    pub current_value: f64,

    /// average_cost × quantity
    pub invested: f64,

    /// current_value − invested
    pub unrealized_pl: f64,

    /// unrealized_pl / invested × 100, or 0 when invested is 0
    pub unrealized_pl_pct: f64,

    /// This holding's share of the portfolio value (%)
    pub allocation_pct: f64,
}
