// src/error.rs
//! Unified error types for engine lifecycle and usage faults
//!
//! Two channels exist deliberately: per-frame device faults travel as data
//! inside [`FrameResult`](crate::FrameResult) and never abort a session,
//! while the errors here are synchronous failures of the offending call and
//! leave the engine in the state it was in before the call.

use crate::acquisition::engine::EngineState;
use crate::acquisition::PoolError;
use crate::config::ConfigError;
use thiserror::Error;

pub use crate::worker::WorkerError;

/// Lifecycle and usage errors of the acquisition engine.
#[derive(Debug, Error)]
pub enum EngineError {
    /// `start_acquisition` was called while a session is running.
    #[error("acquisition is already running")]
    AlreadyRunning,

    /// Operation not valid for the engine's current state.
    #[error("operation `{operation}` is invalid in state {state:?}")]
    InvalidState {
        /// The rejected operation
        operation: &'static str,
        /// State the engine was in
        state: EngineState,
    },

    /// No result became available within the retrieve timeout. Retryable.
    #[error("no result available within {timeout_ms} ms")]
    RetrieveTimeout {
        /// How long the caller waited
        timeout_ms: u64,
    },

    /// Buffer pool failure surfaced through an engine call.
    #[error("buffer pool error: {0}")]
    Pool(#[from] PoolError),

    /// Rejected engine configuration.
    #[error(transparent)]
    Config(#[from] ConfigError),

    /// The source failed to open or close.
    #[error("acquisition source error: {0}")]
    Source(String),

    /// The producer thread could not be spawned.
    #[error("failed to spawn producer thread: {0}")]
    Spawn(String),
}
