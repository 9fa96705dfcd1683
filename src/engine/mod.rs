//! Multi-symbol matching engine: validation, impact estimation, price
//! improvement, metrics and event publication around the order books.

pub mod config;
pub mod error;
/// Events emitted after every state change.
pub mod events;
pub mod matching_engine;
/// Passive price improvement.
pub mod price_improvement;
pub mod publisher;
pub mod stats;
/// Intake checks run before an order reaches its book.
pub mod validation;

pub use config::{EngineConfig, ImpactConfig, PriceImprovementConfig};
pub use error::EngineError;
pub use events::{CancelReason, EventListener, MatchingEvent, channel_listener};
pub use matching_engine::MatchingEngine;
pub use price_improvement::improve_price;
pub use publisher::EventPublisher;
pub use stats::{EngineStats, MatchingMetrics};
pub use validation::{ValidationError, validate_order};
