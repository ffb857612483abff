use crate::errors::CoreError;

use super::snapshot::LedgerSnapshot;

/// Encodes and decodes ledger snapshots at the storage boundary.
pub struct StorageManager;

impl StorageManager {
    /// Serialize a snapshot to its JSON blob.
    pub fn encode(snapshot: &LedgerSnapshot) -> Result<String, CoreError> {
        serde_json::to_string(snapshot)
            .map_err(|e| CoreError::Serialization(format!("Failed to serialize ledger: {e}")))
    }

    /// Parse a JSON blob. An empty or whitespace-only blob is an empty snapshot.
    pub fn decode(blob: &str) -> Result<LedgerSnapshot, CoreError> {
        if blob.trim().is_empty() {
            return Ok(LedgerSnapshot::default());
        }
        serde_json::from_str(blob)
            .map_err(|e| CoreError::Deserialization(format!("Failed to parse ledger: {e}")))
    }

    /// Save a snapshot to a JSON file on disk (native only).
    #[cfg(not(target_arch = "wasm32"))]
    pub fn save_to_file(snapshot: &LedgerSnapshot, path: &std::path::Path) -> Result<(), CoreError> {
        let blob = Self::encode(snapshot)?;
        std::fs::write(path, blob)?;
        Ok(())
    }

    /// Load a snapshot from disk. A missing file yields `Ok(None)`.
    #[cfg(not(target_arch = "wasm32"))]
    pub fn load_from_file(path: &std::path::Path) -> Result<Option<LedgerSnapshot>, CoreError> {
        match std::fs::read_to_string(path) {
            Ok(blob) => Self::decode(&blob).map(Some),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(None),
            Err(e) => Err(e.into()),
        }
    }
}
