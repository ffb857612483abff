use log::info;
use std::collections::HashMap;

use crate::errors::CoreError;
use crate::models::catalog::Catalog;
use crate::models::holding::Holding;
use crate::models::instrument::Instrument;
use crate::models::trade::{Trade, TradeSide};

/// Quantities at or below this are treated as zero (fund units are fractional).
const QUANTITY_EPSILON: f64 = 1e-9;

/// Round a money amount to 2 decimal places.
pub fn round_money(value: f64) -> f64 {
    (value * 100.0).round() / 100.0
}

/// Owns the holdings map and applies buy/sell/accumulate operations.
///
/// The weighted average cost changes only on purchases:
/// `new_avg = (prev_avg × prev_qty + price × qty) / (prev_qty + qty)`, rounded
/// to 2 decimals at every step. Because of that per-step rounding, reordering
/// the same buys can differ by a cent or so; mathematically the mean is
/// order-independent.
///
/// Every operation fails closed: on error the ledger is left untouched.
#[derive(Debug, Clone, Default)]
pub struct PositionLedger {
    holdings: HashMap<String, Holding>,
    journal: Vec<Trade>,
}

impl PositionLedger {
    pub fn new() -> Self {
        Self::default()
    }

    /// Rebuild a ledger from previously stored holdings.
    /// Rows with a non-positive quantity are dropped.
    pub fn from_holdings(holdings: impl IntoIterator<Item = Holding>) -> Self {
        let holdings = holdings
            .into_iter()
            .filter(|h| h.quantity > QUANTITY_EPSILON)
            .map(|h| (h.instrument_id.clone(), h))
            .collect();
        Self {
            holdings,
            journal: Vec::new(),
        }
    }

    /// Apply a signed quantity change at `unit_price`.
    ///
    /// Positive `delta_quantity` buys, negative sells. Returns the trade receipt.
    pub fn apply(
        &mut self,
        catalog: &Catalog,
        instrument_id: &str,
        delta_quantity: f64,
        unit_price: f64,
    ) -> Result<Trade, CoreError> {
        let side = if delta_quantity < 0.0 {
            TradeSide::Sell
        } else {
            TradeSide::Buy
        };
        self.execute(catalog, instrument_id, side, delta_quantity.abs(), unit_price)
    }

    /// Buy `quantity` at `unit_price`.
    pub fn buy(
        &mut self,
        catalog: &Catalog,
        instrument_id: &str,
        quantity: f64,
        unit_price: f64,
    ) -> Result<Trade, CoreError> {
        self.execute(catalog, instrument_id, TradeSide::Buy, quantity, unit_price)
    }

    /// Sell (or redeem) `quantity` at `unit_price`.
    pub fn sell(
        &mut self,
        catalog: &Catalog,
        instrument_id: &str,
        quantity: f64,
        unit_price: f64,
    ) -> Result<Trade, CoreError> {
        self.execute(catalog, instrument_id, TradeSide::Sell, quantity, unit_price)
    }

    /// SIP instalment: a buy of `quantity` at the instrument's current price.
    pub fn accumulate(
        &mut self,
        catalog: &Catalog,
        instrument_id: &str,
        quantity: f64,
    ) -> Result<Trade, CoreError> {
        let price = catalog.require(instrument_id)?.price;
        self.execute(catalog, instrument_id, TradeSide::Accumulate, quantity, price)
    }

    fn execute(
        &mut self,
        catalog: &Catalog,
        instrument_id: &str,
        side: TradeSide,
        quantity: f64,
        unit_price: f64,
    ) -> Result<Trade, CoreError> {
        let instrument = catalog.require(instrument_id)?;
        Self::validate(instrument, quantity, unit_price)?;

        let trade = match side {
            TradeSide::Buy | TradeSide::Accumulate => {
                self.add_position(instrument_id, quantity, unit_price);
                Trade::new(instrument_id, side, quantity, unit_price, None)
            }
            TradeSide::Sell => {
                let realized = self.reduce_position(instrument_id, quantity, unit_price)?;
                Trade::new(instrument_id, side, quantity, unit_price, Some(realized))
            }
        };

        info!(
            "{} {} {} @ {:.2} ({})",
            trade.side,
            trade.quantity,
            instrument.symbol(),
            trade.unit_price,
            instrument.name
        );
        self.journal.push(trade.clone());
        Ok(trade)
    }

    /// Rules:
    /// - quantity must be a positive, finite number
    /// - stocks trade in whole shares only
    /// - price must be non-negative and finite
    fn validate(instrument: &Instrument, quantity: f64, unit_price: f64) -> Result<(), CoreError> {
        if !quantity.is_finite() || quantity <= 0.0 {
            return Err(CoreError::InvalidQuantity(format!(
                "quantity must be positive, got {quantity}"
            )));
        }
        if !instrument.allows_fractional() && quantity.fract() != 0.0 {
            return Err(CoreError::InvalidQuantity(format!(
                "{} trades in whole shares, got {quantity}",
                instrument.symbol()
            )));
        }
        if !unit_price.is_finite() || unit_price < 0.0 {
            return Err(CoreError::InvalidPrice(format!(
                "unit price must be non-negative, got {unit_price}"
            )));
        }
        Ok(())
    }

    fn add_position(&mut self, instrument_id: &str, quantity: f64, unit_price: f64) {
        let (prev_qty, prev_avg) = self
            .holdings
            .get(instrument_id)
            .map(|h| (h.quantity, h.average_cost))
            .unwrap_or((0.0, 0.0));

        let new_qty = prev_qty + quantity;
        let new_avg = (prev_avg * prev_qty + unit_price * quantity) / new_qty;

        self.holdings.insert(
            instrument_id.to_string(),
            Holding::new(instrument_id, new_qty, round_money(new_avg)),
        );
    }

    /// Returns the realized P/L of the sale. A fully closed position is removed.
    fn reduce_position(
        &mut self,
        instrument_id: &str,
        quantity: f64,
        unit_price: f64,
    ) -> Result<f64, CoreError> {
        let held = self
            .holdings
            .get(instrument_id)
            .map(|h| h.quantity)
            .unwrap_or(0.0);

        if quantity > held + QUANTITY_EPSILON {
            return Err(CoreError::InsufficientQuantity {
                instrument_id: instrument_id.to_string(),
                requested: quantity,
                held,
            });
        }

        let Some(holding) = self.holdings.get_mut(instrument_id) else {
            return Err(CoreError::InsufficientQuantity {
                instrument_id: instrument_id.to_string(),
                requested: quantity,
                held: 0.0,
            });
        };

        let realized = round_money((unit_price - holding.average_cost) * quantity);
        let remaining = holding.quantity - quantity;
        if remaining <= QUANTITY_EPSILON {
            self.holdings.remove(instrument_id);
        } else {
            holding.quantity = remaining;
        }
        Ok(realized)
    }

    /// The current holding for an instrument, if any.
    pub fn holding(&self, instrument_id: &str) -> Option<&Holding> {
        self.holdings.get(instrument_id)
    }

    /// All holdings, sorted by instrument id for stable output.
    pub fn holdings(&self) -> Vec<&Holding> {
        let mut holdings: Vec<&Holding> = self.holdings.values().collect();
        holdings.sort_by(|a, b| a.instrument_id.cmp(&b.instrument_id));
        holdings
    }

    /// Quantity held of an instrument (0 when not held).
    pub fn quantity_of(&self, instrument_id: &str) -> f64 {
        self.holdings
            .get(instrument_id)
            .map(|h| h.quantity)
            .unwrap_or(0.0)
    }

    /// Number of distinct instruments held.
    pub fn position_count(&self) -> usize {
        self.holdings.len()
    }

    /// Σ quantity over all holdings.
    pub fn unit_count(&self) -> f64 {
        self.holdings.values().map(|h| h.quantity).sum()
    }

    pub fn is_empty(&self) -> bool {
        self.holdings.is_empty()
    }

    /// Trades executed during this session, oldest first.
    pub fn trades(&self) -> &[Trade] {
        &self.journal
    }
}
