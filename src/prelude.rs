//! Prelude module that re-exports commonly used types and traits.
//!
//! Instead of importing each type individually, you can use:
//!
//! ```rust
//! use matching_core::prelude::*;
//! ```

// Engine
pub use crate::engine::{
    CancelReason, EngineConfig, EngineError, EventListener, MatchingEngine, MatchingEvent,
    MatchingMetrics, channel_listener,
};

// Core order book types
pub use crate::orderbook::{
    BookSnapshot, DepthLevel, MassCancelResult, MatchResult, OrderBook, OrderBookError, Trade,
};

// Order types
pub use crate::orderbook::{Order, OrderId, OrderType, Side, TimeInForce};

// Market impact
pub use crate::impact::{ImpactCalculatorFactory, MarketImpactCalculator};

// Utility functions
pub use crate::utils::current_time_millis;
