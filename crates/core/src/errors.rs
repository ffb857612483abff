use thiserror::Error;

/// Unified error type for the entire paper-brokerage-core library.
/// Every public function returns `Result<T, CoreError>`.
#[derive(Debug, Error)]
pub enum CoreError {
    // ── Ledger ──────────────────────────────────────────────────────
    #[error("Invalid quantity: {0}")]
    InvalidQuantity(String),

    #[error("Invalid price: {0}")]
    InvalidPrice(String),

    #[error("Insufficient quantity of {instrument_id}: requested {requested}, held {held}")]
    InsufficientQuantity {
        instrument_id: String,
        requested: f64,
        held: f64,
    },

    #[error("Unknown instrument: {0}")]
    UnknownInstrument(String),

    // ── Reference data / charts ─────────────────────────────────────
    #[error("Invalid range key: {0}")]
    InvalidRange(String),

    #[error("Invalid catalog: {0}")]
    InvalidCatalog(String),

    // ── Storage ─────────────────────────────────────────────────────
    #[error("Persistence unavailable: {0}")]
    PersistenceUnavailable(String),

    #[error("Serialization error: {0}")]
    Serialization(String),

    #[error("Deserialization error: {0}")]
    Deserialization(String),

    // ── File I/O (native only) ──────────────────────────────────────
    #[error("File I/O error: {0}")]
    FileIO(String),
}

// ── Conversion helpers (From impls) ─────────────────────────────────

impl From<std::io::Error> for CoreError {
    fn from(e: std::io::Error) -> Self {
        CoreError::FileIO(e.to_string())
    }
}

impl From<serde_json::Error> for CoreError {
    fn from(e: serde_json::Error) -> Self {
        CoreError::Deserialization(e.to_string())
    }
}
