//! Error types for the narrative layer.

use kv_mechanics::MechError;
use thiserror::Error;

/// Result type for narrative operations.
pub type NarrativeResult<T> = Result<T, NarrativeError>;

/// Errors raised at the narrative layer's I/O seams.
#[derive(Debug, Error)]
pub enum NarrativeError {
    /// Resolver configuration could not be parsed.
    #[error("invalid resolver config: {0}")]
    Config(#[from] serde_json::Error),

    /// A mechanics operation failed (registry persistence).
    #[error("mechanics error: {0}")]
    Mechanics(#[from] MechError),
}
