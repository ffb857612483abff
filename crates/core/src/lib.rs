pub mod errors;
pub mod models;
pub mod services;
pub mod storage;
pub mod surface;

use log::{debug, warn};
use std::sync::Arc;

use errors::CoreError;
use models::{
    catalog::Catalog,
    chart::Viewport,
    holding::Holding,
    range::RangeKey,
    settings::Settings,
    trade::Trade,
    valuation::{HoldingValuation, PortfolioSummary},
};
use services::{
    chart_renderer::ChartRenderer,
    ledger_service::PositionLedger,
    resize_coordinator::{ChartTarget, ResizeCoordinator},
    series_cache::SeriesCache,
    valuation_service::ValuationService,
};
use storage::{
    snapshot::LedgerSnapshot,
    store::{MemoryStore, Store},
};
use surface::traits::Surface;

/// Main entry point for the paper-brokerage core library.
///
/// Owns the reference catalog, the position ledger, the durable store, the
/// per-session series cache and the chart machinery. One instance is one
/// session; nothing is shared between instances.
#[must_use]
pub struct Brokerage {
    catalog: Catalog,
    settings: Settings,
    ledger: PositionLedger,
    valuation_service: ValuationService,
    series_cache: SeriesCache,
    chart_renderer: ChartRenderer,
    resize: ResizeCoordinator,
    store: Option<Box<dyn Store>>,
    /// Set while the last save failed; cleared by the next successful save.
    persistence_degraded: bool,

    /// Set when the store could not be read at startup. Its content is
    /// unknown, so nothing is written back for the rest of the session.
    saves_blocked: bool,
}

impl std::fmt::Debug for Brokerage {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Brokerage")
            .field("instruments", &self.catalog.len())
            .field("positions", &self.ledger.position_count())
            .field("cached_series", &self.series_cache.len())
            .field("store", &self.store.as_ref().map(|s| s.name().to_string()))
            .field("persistence_degraded", &self.persistence_degraded)
            .field("saves_blocked", &self.saves_blocked)
            .finish()
    }
}

impl Brokerage {
    /// A session with an empty ledger and no durable store.
    pub fn create_new(catalog: Catalog, settings: Settings) -> Self {
        Self::build(catalog, settings, PositionLedger::new(), None, false)
    }

    /// A session backed by an in-memory store under `settings.storage_key`.
    pub fn open_in_memory(catalog: Catalog, settings: Settings) -> Self {
        let store = MemoryStore::for_settings(&settings);
        Self::open(catalog, settings, Box::new(store))
    }

    /// A session backed by `store`.
    ///
    /// A missing snapshot starts an empty ledger. A store that cannot be read,
    /// or holds a malformed snapshot, also starts empty; the session is then
    /// degraded and runs in memory only, leaving the stored data untouched.
    /// It never fails.
    pub fn open(catalog: Catalog, settings: Settings, store: Box<dyn Store>) -> Self {
        let (ledger, unreadable) = match store.load() {
            Ok(Some(snapshot)) => (snapshot.restore(&catalog), false),
            Ok(None) => (PositionLedger::new(), false),
            Err(e) => {
                warn!(
                    "Could not load ledger from {} store, running in memory only: {e}",
                    store.name()
                );
                (PositionLedger::new(), true)
            }
        };
        let mut brokerage = Self::build(catalog, settings, ledger, Some(store), unreadable);
        brokerage.saves_blocked = unreadable;
        brokerage
    }

    /// Replace the series cache with one seeded deterministically.
    pub fn with_series_seed(mut self, seed: u64) -> Self {
        self.series_cache = SeriesCache::with_seed(seed);
        self
    }

    // ── Ledger Operations ───────────────────────────────────────────

    /// Apply a signed quantity change at `unit_price` (positive buys,
    /// negative sells) and persist the result.
    pub fn apply(
        &mut self,
        instrument_id: &str,
        delta_quantity: f64,
        unit_price: f64,
    ) -> Result<Trade, CoreError> {
        let trade = self
            .ledger
            .apply(&self.catalog, instrument_id, delta_quantity, unit_price)?;
        self.persist();
        Ok(trade)
    }

    /// Buy `quantity` at the instrument's current price.
    pub fn buy(&mut self, instrument_id: &str, quantity: f64) -> Result<Trade, CoreError> {
        let price = self.catalog.require(instrument_id)?.price;
        let trade = self.ledger.buy(&self.catalog, instrument_id, quantity, price)?;
        self.persist();
        Ok(trade)
    }

    /// Sell (redeem) `quantity` at the instrument's current price.
    pub fn sell(&mut self, instrument_id: &str, quantity: f64) -> Result<Trade, CoreError> {
        let price = self.catalog.require(instrument_id)?.price;
        let trade = self.ledger.sell(&self.catalog, instrument_id, quantity, price)?;
        self.persist();
        Ok(trade)
    }

    /// One SIP instalment of `settings.sip_quantity` at the current price.
    pub fn accumulate(&mut self, instrument_id: &str) -> Result<Trade, CoreError> {
        let trade = self
            .ledger
            .accumulate(&self.catalog, instrument_id, self.settings.sip_quantity)?;
        self.persist();
        Ok(trade)
    }

    #[must_use]
    pub fn holding(&self, instrument_id: &str) -> Option<&Holding> {
        self.ledger.holding(instrument_id)
    }

    /// All holdings, sorted by instrument id.
    #[must_use]
    pub fn holdings(&self) -> Vec<&Holding> {
        self.ledger.holdings()
    }

    /// Trades executed during this session, oldest first.
    #[must_use]
    pub fn trades(&self) -> &[Trade] {
        self.ledger.trades()
    }

    #[must_use]
    pub fn ledger(&self) -> &PositionLedger {
        &self.ledger
    }

    // ── Valuation ───────────────────────────────────────────────────

    /// Portfolio totals and per-holding breakdown at current prices.
    #[must_use]
    pub fn summary(&self) -> PortfolioSummary {
        self.valuation_service.summarize(&self.ledger, &self.catalog)
    }

    /// Valuation of a single holding, if held.
    #[must_use]
    pub fn valuation(&self, instrument_id: &str) -> Option<HoldingValuation> {
        let holding = self.ledger.holding(instrument_id)?;
        let instrument = self.catalog.get(instrument_id)?;
        Some(self.valuation_service.value_holding(holding, instrument))
    }

    /// Σ current value of all holdings.
    #[must_use]
    pub fn portfolio_total(&self) -> f64 {
        self.valuation_service
            .portfolio_total(&self.ledger, &self.catalog)
    }

    /// Σ quantity of all holdings (units, not distinct instruments).
    #[must_use]
    pub fn portfolio_count(&self) -> f64 {
        self.valuation_service.portfolio_count(&self.ledger)
    }

    // ── Catalog ─────────────────────────────────────────────────────

    #[must_use]
    pub fn catalog(&self) -> &Catalog {
        &self.catalog
    }

    /// Replace an instrument's reference price. Cached chart series keep
    /// their values for the rest of the session.
    pub fn update_price(&mut self, instrument_id: &str, price: f64) -> Result<(), CoreError> {
        self.catalog.set_price(instrument_id, price)
    }

    // ── Charts ──────────────────────────────────────────────────────

    /// The session's series for an instrument and range (generated once).
    pub fn series(&mut self, instrument_id: &str, range: RangeKey) -> Result<Arc<[f64]>, CoreError> {
        let instrument = self.catalog.require(instrument_id)?;
        Ok(self.series_cache.get(instrument, range))
    }

    /// Draw the chart for an instrument and range onto `surface`.
    pub fn draw_chart<S: Surface + ?Sized>(
        &mut self,
        surface: &mut S,
        instrument_id: &str,
        range: RangeKey,
        viewport: Viewport,
    ) -> Result<(), CoreError> {
        let series = self.series(instrument_id, range)?;
        self.chart_renderer.draw(surface, &series, viewport);
        Ok(())
    }

    /// Open the chart overlay for an instrument at the default range.
    pub fn open_chart<S: Surface + ?Sized>(
        &mut self,
        surface: &mut S,
        instrument_id: &str,
        viewport: Viewport,
    ) -> Result<(), CoreError> {
        let range = self.settings.default_range;
        self.draw_chart(surface, instrument_id, range, viewport)?;
        self.resize.open(ChartTarget::new(instrument_id, range));
        self.resize.mark_drawn(viewport);
        Ok(())
    }

    /// Switch the open chart to another range. No-op when no chart is open.
    pub fn select_range<S: Surface + ?Sized>(
        &mut self,
        surface: &mut S,
        range: RangeKey,
        viewport: Viewport,
    ) -> Result<(), CoreError> {
        let Some(target) = self.resize.target().cloned() else {
            return Ok(());
        };
        self.draw_chart(surface, &target.instrument_id, range, viewport)?;
        self.resize.set_range(range);
        self.resize.mark_drawn(viewport);
        Ok(())
    }

    /// Close the chart overlay and clear the surface. The backing buffer keeps
    /// its size so reopening at the same viewport does not reallocate it.
    pub fn close_chart<S: Surface + ?Sized>(&mut self, surface: &mut S) {
        self.resize.close();
        surface.clear();
    }

    /// The chart currently shown, if the overlay is open.
    #[must_use]
    pub fn open_chart_target(&self) -> Option<&ChartTarget> {
        self.resize.target()
    }

    /// Record a container size change. Returns `false` when the chart is closed.
    pub fn notify_resize(&mut self, viewport: Viewport) -> bool {
        self.resize.notify_resize(viewport)
    }

    /// Animation-frame tick: performs at most one coalesced redraw using the
    /// cached series. Returns whether a frame was drawn.
    pub fn on_animation_frame<S: Surface + ?Sized>(&mut self, surface: &mut S) -> bool {
        let Some(request) = self.resize.on_frame() else {
            return false;
        };
        let target = request.target;
        match self.draw_chart(surface, &target.instrument_id, target.range, request.viewport) {
            Ok(()) => {
                debug!("Redrew {}:{} after resize", target.instrument_id, target.range);
                true
            }
            Err(e) => {
                warn!("Resize redraw failed: {e}");
                false
            }
        }
    }

    #[must_use]
    pub fn cached_series_count(&self) -> usize {
        self.series_cache.len()
    }

    // ── Settings & Persistence ──────────────────────────────────────

    #[must_use]
    pub fn settings(&self) -> &Settings {
        &self.settings
    }

    /// `true` while the durable store is failing; the in-memory ledger is
    /// authoritative until the next successful save.
    #[must_use]
    pub fn persistence_degraded(&self) -> bool {
        self.persistence_degraded
    }

    /// Snapshot of the ledger in its persisted shape.
    #[must_use]
    pub fn snapshot(&self) -> LedgerSnapshot {
        LedgerSnapshot::capture(&self.ledger, &self.catalog)
    }

    /// Save the ledger now. Unlike the automatic save after each operation,
    /// this reports failure as `PersistenceUnavailable`.
    pub fn save(&mut self) -> Result<(), CoreError> {
        if self.saves_blocked {
            return Err(CoreError::PersistenceUnavailable(
                "store was unreadable at startup, saving is disabled for this session".into(),
            ));
        }
        let snapshot = self.snapshot();
        let Some(store) = self.store.as_mut() else {
            return Err(CoreError::PersistenceUnavailable("no store configured".into()));
        };
        match store.save(&snapshot) {
            Ok(()) => {
                self.persistence_degraded = false;
                Ok(())
            }
            Err(e) => {
                self.persistence_degraded = true;
                Err(CoreError::PersistenceUnavailable(e.to_string()))
            }
        }
    }

    // ── Internal ────────────────────────────────────────────────────

    /// Fire-and-forget save after a mutation: failures are logged, never returned.
    fn persist(&mut self) {
        if self.store.is_none() || self.saves_blocked {
            return;
        }
        if let Err(e) = self.save() {
            warn!("Ledger kept in memory only: {e}");
        }
    }

    fn build(
        catalog: Catalog,
        settings: Settings,
        ledger: PositionLedger,
        store: Option<Box<dyn Store>>,
        persistence_degraded: bool,
    ) -> Self {
        let chart_renderer = ChartRenderer::new(settings.chart.clone());
        Self {
            catalog,
            settings,
            ledger,
            valuation_service: ValuationService::new(),
            series_cache: SeriesCache::new(),
            chart_renderer,
            resize: ResizeCoordinator::new(),
            store,
            persistence_degraded,
            saves_blocked: false,
        }
    }
}
