use log::{debug, warn};
use rand::rngs::StdRng;
use rand::SeedableRng;
use std::collections::HashMap;
use std::sync::Arc;

use crate::models::instrument::Instrument;
use crate::models::range::RangeKey;
use crate::services::series_generator::PriceSeriesGenerator;

/// Cache key: (instrument_id, range)
pub type SeriesKey = (String, RangeKey);

/// Session-lifetime memo of generated price series.
///
/// The first request for an (instrument, range) pair generates the series;
/// every later request returns the same shared slice. Entries are never
/// invalidated, so redraws (resize, reopening the chart) cannot make the line
/// jump. A price update on the instrument does not regenerate its series.
pub struct SeriesCache {
    entries: HashMap<SeriesKey, Arc<[f64]>>,
    generator: PriceSeriesGenerator,
    rng: StdRng,
}

impl SeriesCache {
    /// Create a cache whose generator is seeded from OS entropy.
    pub fn new() -> Self {
        Self::with_seed(session_seed())
    }

    /// Create a cache with a fixed seed (reproducible sessions, tests).
    pub fn with_seed(seed: u64) -> Self {
        Self {
            entries: HashMap::new(),
            generator: PriceSeriesGenerator::new(),
            rng: StdRng::seed_from_u64(seed),
        }
    }

    /// Get the series for `instrument` over `range`, generating it on a miss.
    pub fn get(&mut self, instrument: &Instrument, range: RangeKey) -> Arc<[f64]> {
        let key = (instrument.id.clone(), range);
        if let Some(series) = self.entries.get(&key) {
            return Arc::clone(series);
        }

        debug!("Series cache miss for {}:{}", instrument.id, range);
        let series: Arc<[f64]> = self
            .generator
            .generate_for(&mut self.rng, instrument.price, range.profile())
            .into();
        self.entries.insert(key, Arc::clone(&series));
        series
    }

    /// Cached series without generating.
    pub fn peek(&self, instrument_id: &str, range: RangeKey) -> Option<Arc<[f64]>> {
        self.entries
            .get(&(instrument_id.to_string(), range))
            .map(Arc::clone)
    }

    pub fn contains(&self, instrument_id: &str, range: RangeKey) -> bool {
        self.entries
            .contains_key(&(instrument_id.to_string(), range))
    }

    /// Number of cached series.
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Drop all cached series (equivalent to a reload).
    pub fn clear(&mut self) {
        self.entries.clear();
    }
}

impl Default for SeriesCache {
    fn default() -> Self {
        Self::new()
    }
}

fn session_seed() -> u64 {
    let mut buf = [0u8; 8];
    match getrandom::getrandom(&mut buf) {
        Ok(()) => u64::from_le_bytes(buf),
        Err(e) => {
            warn!("OS entropy unavailable ({e}), seeding series generator from the clock");
            chrono::Utc::now()
                .timestamp_nanos_opt()
                .unwrap_or_default() as u64
        }
    }
}
