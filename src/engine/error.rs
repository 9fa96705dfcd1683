//! Engine error types.

use crate::engine::validation::ValidationError;
use crate::impact::ImpactError;
use crate::orderbook::{OrderBookError, OrderId};
use thiserror::Error;

/// Errors returned by [`crate::MatchingEngine`] operations.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum EngineError {
    /// The engine has not been started, or has been stopped.
    #[error("matching engine is not running")]
    NotRunning,

    /// `start` was called on a running engine.
    #[error("matching engine is already running")]
    AlreadyRunning,

    /// The order failed validation; nothing was changed.
    #[error("order rejected: {0}")]
    Validation(#[from] ValidationError),

    /// The order is unknown, already filled or already cancelled.
    #[error("order not found: {0}")]
    NotFound(OrderId),

    /// The order book refused the operation.
    #[error(transparent)]
    Book(#[from] OrderBookError),

    /// A symbol's lock was poisoned by a panicking writer.
    #[error("lock poisoned for symbol {0}")]
    LockPoisoned(String),

    /// The configuration is invalid.
    #[error("invalid configuration: {0}")]
    Config(String),

    /// The impact model could not be created.
    #[error(transparent)]
    Impact(#[from] ImpactError),

    /// The event consumer thread could not be spawned.
    #[error("failed to spawn event consumer: {0}")]
    Spawn(String),
}
