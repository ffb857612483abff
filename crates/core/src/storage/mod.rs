pub mod manager;
pub mod snapshot;
pub mod store;
