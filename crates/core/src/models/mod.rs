pub mod catalog;
pub mod chart;
pub mod holding;
pub mod instrument;
pub mod range;
pub mod settings;
pub mod trade;
pub mod valuation;
