use log::warn;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

use crate::models::catalog::Catalog;
use crate::models::holding::Holding;
use crate::models::instrument::Instrument;
use crate::services::ledger_service::{round_money, PositionLedger};

/// Persisted form of the ledger, grouped by instrument kind:
///
/// ```json
/// { "stocks": { "RELI": { "quantity": 3, "averageCost": 1398.07 } },
///   "funds":  { "EDEL": { "quantity": 2.5, "averageCost": 232.4 } } }
/// ```
///
/// Older snapshots keyed stocks by their short badge and funds by their
/// scheme code, and used `qty`/`units`/`avg`; both shapes are accepted.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct LedgerSnapshot {
    #[serde(default)]
    pub stocks: BTreeMap<String, HoldingRecord>,

    #[serde(default)]
    pub funds: BTreeMap<String, HoldingRecord>,
}

/// One persisted holding.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct HoldingRecord {
    #[serde(alias = "qty", alias = "units")]
    pub quantity: f64,

    #[serde(alias = "avg")]
    pub average_cost: f64,
}

impl LedgerSnapshot {
    /// Capture the ledger, grouping holdings by their instrument's kind.
    /// Holdings whose instrument is missing from the catalog are left out.
    pub fn capture(ledger: &PositionLedger, catalog: &Catalog) -> Self {
        let mut snapshot = Self::default();
        for holding in ledger.holdings() {
            let Some(instrument) = catalog.get(&holding.instrument_id) else {
                continue;
            };
            let record = HoldingRecord {
                quantity: holding.quantity,
                average_cost: holding.average_cost,
            };
            if instrument.is_fund() {
                snapshot.funds.insert(holding.instrument_id.clone(), record);
            } else {
                snapshot.stocks.insert(holding.instrument_id.clone(), record);
            }
        }
        snapshot
    }

    /// Rebuild a ledger. Rows that do not resolve to a catalog instrument,
    /// carry a non-positive quantity or invalid average cost, or hold a
    /// fractional quantity of a stock, are skipped. Rows whose keys resolve to
    /// the same instrument (a legacy key next to the instrument id) are merged
    /// at their weighted average cost.
    pub fn restore(&self, catalog: &Catalog) -> PositionLedger {
        let stocks = self
            .stocks
            .iter()
            .map(|(key, record)| (key, record, catalog.resolve_stock_key(key)));
        let funds = self
            .funds
            .iter()
            .map(|(key, record)| (key, record, catalog.resolve_fund_key(key)));

        let mut holdings: BTreeMap<String, Holding> = BTreeMap::new();
        for holding in stocks
            .chain(funds)
            .filter_map(|(key, record, instrument)| Self::restore_row(key, record, instrument))
        {
            match holdings.get_mut(&holding.instrument_id) {
                Some(existing) => {
                    warn!(
                        "Merging duplicate stored holding for '{}'",
                        holding.instrument_id
                    );
                    *existing = Self::merge(existing, &holding);
                }
                None => {
                    holdings.insert(holding.instrument_id.clone(), holding);
                }
            }
        }

        PositionLedger::from_holdings(holdings.into_values())
    }

    /// Combine two rows for one instrument as if the second were bought on
    /// top of the first.
    fn merge(a: &Holding, b: &Holding) -> Holding {
        let quantity = a.quantity + b.quantity;
        let average_cost =
            round_money((a.average_cost * a.quantity + b.average_cost * b.quantity) / quantity);
        Holding::new(a.instrument_id.clone(), quantity, average_cost)
    }

    fn restore_row(
        key: &str,
        record: &HoldingRecord,
        instrument: Option<&Instrument>,
    ) -> Option<Holding> {
        let Some(instrument) = instrument else {
            warn!("Skipping stored holding '{key}': not in catalog");
            return None;
        };
        if !record.quantity.is_finite() || record.quantity <= 0.0 {
            warn!("Skipping stored holding '{key}': quantity {}", record.quantity);
            return None;
        }
        if !instrument.allows_fractional() && record.quantity.fract() != 0.0 {
            warn!(
                "Skipping stored holding '{key}': fractional quantity {} of a stock",
                record.quantity
            );
            return None;
        }
        if !record.average_cost.is_finite() || record.average_cost < 0.0 {
            warn!("Skipping stored holding '{key}': average cost {}", record.average_cost);
            return None;
        }
        Some(Holding::new(
            instrument.id.clone(),
            record.quantity,
            record.average_cost,
        ))
    }

    pub fn is_empty(&self) -> bool {
        self.stocks.is_empty() && self.funds.is_empty()
    }

    /// Number of stored rows across both groups.
    pub fn len(&self) -> usize {
        self.stocks.len() + self.funds.len()
    }
}
