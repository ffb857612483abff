use rand::Rng;

use crate::models::range::RangeProfile;
use crate::services::ledger_service::round_money;

/// Maximum opening offset from the base price, as a fraction (±0.5%).
const OPENING_JITTER: f64 = 0.01;

/// Lowest price a generated point may take.
pub const PRICE_FLOOR: f64 = 1.0;

/// Produces synthetic price series: a bounded random walk around a base price.
///
/// Intentionally not a market model. It only has to look plausible on a
/// chart and never go non-positive.
pub struct PriceSeriesGenerator;

impl PriceSeriesGenerator {
    pub fn new() -> Self {
        Self
    }

    /// Generate a series for a range profile.
    pub fn generate_for<R: Rng + ?Sized>(
        &self,
        rng: &mut R,
        base_price: f64,
        profile: RangeProfile,
    ) -> Vec<f64> {
        self.generate(rng, base_price, profile.point_count, profile.volatility)
    }

    /// Generate `point_count` prices.
    ///
    /// The walk opens within ±0.5% of `base_price`, each step moves by at most
    /// `volatility × base_price / 2` in either direction, and every point is
    /// floored at `min(PRICE_FLOOR, base_price)` and rounded to 2 decimals.
    /// The last point is not pinned to `base_price`.
    ///
    /// Out-of-range inputs are coerced rather than rejected: fewer than 2
    /// points become 2, a non-positive base walks from `PRICE_FLOOR`, and a
    /// negative volatility is treated as 0.
    pub fn generate<R: Rng + ?Sized>(
        &self,
        rng: &mut R,
        base_price: f64,
        point_count: usize,
        volatility: f64,
    ) -> Vec<f64> {
        let base = if base_price.is_finite() && base_price > 0.0 {
            base_price
        } else {
            PRICE_FLOOR
        };
        let volatility = if volatility.is_finite() { volatility.max(0.0) } else { 0.0 };
        let point_count = point_count.max(2);
        let floor = PRICE_FLOOR.min(base);

        let mut series = Vec::with_capacity(point_count);
        let mut price = base * (1.0 + (rng.gen::<f64>() - 0.5) * OPENING_JITTER);

        for _ in 0..point_count {
            let change = (rng.gen::<f64>() - 0.5) * volatility * base;
            price = (price + change).max(floor);
            series.push(round_money(price).max(floor));
        }

        series
    }
}

impl Default for PriceSeriesGenerator {
    fn default() -> Self {
        Self::new()
    }
}
