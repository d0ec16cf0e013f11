//! Error types for the simulation core.
//!
//! Only genuinely unrecoverable conditions are errors here. Expected
//! runtime outcomes (a to-hit miss, a missile whose creator has since
//! died) are ordinary branches of the algorithms, never `Err`. Callers
//! are expected to treat [`EngineError::SaveData`] as fatal: a corrupt
//! save would desynchronize every subsequent tick, so the session favors
//! fail-fast over silent recovery.

use thiserror::Error;

/// Result type alias using [`EngineError`].
pub type Result<T> = std::result::Result<T, EngineError>;

/// Top-level error type for all simulation errors.
#[derive(Debug, Error)]
pub enum EngineError {
    /// Invalid actor reference.
    #[error("Actor not found: {0}")]
    ActorNotFound(u32),

    /// Operation requires an actor capability it does not have.
    #[error("Invalid actor state: {0}")]
    InvalidActorState(String),

    /// Save payload could not be read back. Fatal: the session cannot be
    /// trusted to replay deterministically.
    #[error("Corrupt save data: {0}")]
    SaveData(String),

    /// Save format version does not match this build.
    #[error("Save version mismatch: expected {expected}, got {actual}")]
    SaveVersionMismatch {
        /// Version this build writes.
        expected: u32,
        /// Version found in the payload.
        actual: u32,
    },
}
