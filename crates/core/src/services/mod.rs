pub mod chart_renderer;
pub mod ledger_service;
pub mod resize_coordinator;
pub mod series_cache;
pub mod series_generator;
pub mod valuation_service;
