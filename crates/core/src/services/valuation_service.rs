use log::warn;

use crate::models::catalog::Catalog;
use crate::models::holding::Holding;
use crate::models::instrument::Instrument;
use crate::models::valuation::{HoldingValuation, PortfolioSummary};
use crate::services::ledger_service::PositionLedger;

/// Read-side aggregation: current value, unrealized P/L and portfolio totals.
///
/// Pure calculations over the ledger and catalog prices, no mutation.
pub struct ValuationService;

impl ValuationService {
    pub fn new() -> Self {
        Self
    }

    /// `price × quantity`
    pub fn current_value(&self, holding: &Holding, instrument: &Instrument) -> f64 {
        instrument.price * holding.quantity
    }

    /// `current_value − average_cost × quantity`
    pub fn unrealized_pl(&self, holding: &Holding, instrument: &Instrument) -> f64 {
        self.current_value(holding, instrument) - holding.cost_basis()
    }

    /// Unrealized P/L as a percentage of the cost basis.
    /// Defined as 0 when the cost basis is 0.
    pub fn unrealized_pl_pct(&self, holding: &Holding, instrument: &Instrument) -> f64 {
        let basis = holding.cost_basis();
        if basis == 0.0 {
            return 0.0;
        }
        self.unrealized_pl(holding, instrument) / basis * 100.0
    }

    /// Full valuation of one holding. `allocation_pct` is left at 0;
    /// [`ValuationService::summarize`] fills it in.
    pub fn value_holding(&self, holding: &Holding, instrument: &Instrument) -> HoldingValuation {
        let current_value = self.current_value(holding, instrument);
        let invested = holding.cost_basis();
        HoldingValuation {
            instrument_id: holding.instrument_id.clone(),
            name: instrument.name.clone(),
            symbol: instrument.symbol().to_string(),
            kind: instrument.kind.clone(),
            quantity: holding.quantity,
            average_cost: holding.average_cost,
            price: instrument.price,
            current_value,
            invested,
            unrealized_pl: current_value - invested,
            unrealized_pl_pct: self.unrealized_pl_pct(holding, instrument),
            allocation_pct: 0.0,
        }
    }

    /// Σ current_value over all holdings.
    pub fn portfolio_total(&self, ledger: &PositionLedger, catalog: &Catalog) -> f64 {
        ledger
            .holdings()
            .into_iter()
            .filter_map(|h| catalog.get(&h.instrument_id).map(|i| self.current_value(h, i)))
            .sum()
    }

    /// Σ quantity over all holdings (a unit count, not a distinct-instrument count).
    pub fn portfolio_count(&self, ledger: &PositionLedger) -> f64 {
        ledger.unit_count()
    }

    /// Value every holding and aggregate the totals.
    ///
    /// Holdings whose instrument is missing from the catalog are skipped.
    pub fn summarize(&self, ledger: &PositionLedger, catalog: &Catalog) -> PortfolioSummary {
        let mut holdings = Vec::new();
        let mut total_value = 0.0;
        let mut total_invested = 0.0;

        for holding in ledger.holdings() {
            let Some(instrument) = catalog.get(&holding.instrument_id) else {
                warn!(
                    "Holding for unknown instrument '{}' left out of valuation",
                    holding.instrument_id
                );
                continue;
            };
            let valuation = self.value_holding(holding, instrument);
            total_value += valuation.current_value;
            total_invested += valuation.invested;
            holdings.push(valuation);
        }

        for h in &mut holdings {
            h.allocation_pct = if total_value > 0.0 {
                h.current_value / total_value * 100.0
            } else {
                0.0
            };
        }

        // Largest allocation first
        holdings.sort_by(|a, b| {
            b.allocation_pct
                .partial_cmp(&a.allocation_pct)
                .unwrap_or(std::cmp::Ordering::Equal)
                .then_with(|| a.instrument_id.cmp(&b.instrument_id))
        });

        let unrealized_pl = total_value - total_invested;
        let unrealized_pl_pct = if total_invested > 0.0 {
            unrealized_pl / total_invested * 100.0
        } else {
            0.0
        };

        PortfolioSummary {
            total_value,
            total_invested,
            unrealized_pl,
            unrealized_pl_pct,
            unit_count: holdings.iter().map(|h| h.quantity).sum(),
            position_count: holdings.len(),
            holdings,
        }
    }
}

impl Default for ValuationService {
    fn default() -> Self {
        Self::new()
    }
}
