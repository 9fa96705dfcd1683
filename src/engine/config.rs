//! Engine configuration.

use crate::engine::error::EngineError;
use serde::{Deserialize, Serialize};

/// Market impact estimation settings.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ImpactConfig {
    /// Attach an impact estimate to every accepted order
    pub enabled: bool,
    /// Registry name of the model (`linear`, `sqrt`, `log` or a registered one)
    pub model: String,
    /// Scale of the impact curve
    pub liquidity_factor: f64,
    /// Volatility calibration handed to the model
    pub volatility_factor: f64,
}

impl Default for ImpactConfig {
    fn default() -> Self {
        Self {
            enabled: true,
            model: "linear".to_string(),
            liquidity_factor: 1.0,
            volatility_factor: 1.0,
        }
    }
}

/// Price improvement settings. Exchange-specific, hence configuration.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct PriceImprovementConfig {
    /// Move resting limit prices toward the opposite best
    pub enabled: bool,
    /// Price increment in ticks
    pub tick_size: u128,
    /// Largest move, in multiples of `tick_size`
    pub max_improvement_ticks: u64,
}

impl Default for PriceImprovementConfig {
    fn default() -> Self {
        Self {
            enabled: false,
            tick_size: 1,
            max_improvement_ticks: 1,
        }
    }
}

/// Configuration of a [`crate::MatchingEngine`].
///
/// # Examples
///
/// ```
/// use matching_core::EngineConfig;
///
/// let config = EngineConfig::default()
///     .with_event_channel_capacity(128)
///     .with_price_improvement(1, 2);
/// assert!(config.validate().is_ok());
/// assert!(config.price_improvement.enabled);
/// ```
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct EngineConfig {
    /// Capacity of the bounded event queue; events beyond it are dropped
    pub event_channel_capacity: usize,
    /// Trades kept per symbol for average trade size
    pub trade_history_capacity: usize,
    /// Levels per side returned by [`crate::MatchingEngine::get_order_book`]
    pub snapshot_depth: usize,
    /// Impact model settings
    pub impact: ImpactConfig,
    /// Price improvement settings
    pub price_improvement: PriceImprovementConfig,
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            event_channel_capacity: 10_000,
            trade_history_capacity: 1000,
            snapshot_depth: 10,
            impact: ImpactConfig::default(),
            price_improvement: PriceImprovementConfig::default(),
        }
    }
}

impl EngineConfig {
    /// Parse a configuration from JSON. Missing fields take their defaults.
    pub fn from_json(data: &str) -> Result<Self, EngineError> {
        let config: Self =
            serde_json::from_str(data).map_err(|e| EngineError::Config(e.to_string()))?;
        config.validate()?;
        Ok(config)
    }

    /// Serialize the configuration to JSON.
    pub fn to_json(&self) -> Result<String, EngineError> {
        serde_json::to_string_pretty(self).map_err(|e| EngineError::Config(e.to_string()))
    }

    /// Set the event queue capacity.
    #[must_use]
    pub fn with_event_channel_capacity(mut self, capacity: usize) -> Self {
        self.event_channel_capacity = capacity;
        self
    }

    /// Set the per-symbol trade history capacity.
    #[must_use]
    pub fn with_trade_history_capacity(mut self, capacity: usize) -> Self {
        self.trade_history_capacity = capacity;
        self
    }

    /// Set the default snapshot depth.
    #[must_use]
    pub fn with_snapshot_depth(mut self, depth: usize) -> Self {
        self.snapshot_depth = depth;
        self
    }

    /// Select the impact model and its liquidity factor.
    #[must_use]
    pub fn with_impact_model(mut self, model: &str, liquidity_factor: f64) -> Self {
        self.impact.enabled = true;
        self.impact.model = model.to_string();
        self.impact.liquidity_factor = liquidity_factor;
        self
    }

    /// Turn impact estimation off.
    #[must_use]
    pub fn without_impact(mut self) -> Self {
        self.impact.enabled = false;
        self
    }

    /// Enable price improvement.
    #[must_use]
    pub fn with_price_improvement(mut self, tick_size: u128, max_improvement_ticks: u64) -> Self {
        self.price_improvement = PriceImprovementConfig {
            enabled: true,
            tick_size,
            max_improvement_ticks,
        };
        self
    }

    /// Check the values that have no meaningful zero.
    ///
    /// The impact model name is checked against the registry when the engine
    /// is built.
    pub fn validate(&self) -> Result<(), EngineError> {
        if self.event_channel_capacity == 0 {
            return Err(EngineError::Config(
                "event_channel_capacity must be positive".to_string(),
            ));
        }
        if self.trade_history_capacity == 0 {
            return Err(EngineError::Config(
                "trade_history_capacity must be positive".to_string(),
            ));
        }
        if self.impact.model.trim().is_empty() {
            return Err(EngineError::Config("impact.model must not be empty".to_string()));
        }
        if !self.impact.liquidity_factor.is_finite() || !self.impact.volatility_factor.is_finite() {
            return Err(EngineError::Config("impact factors must be finite".to_string()));
        }
        if self.price_improvement.enabled && self.price_improvement.tick_size == 0 {
            return Err(EngineError::Config(
                "price_improvement.tick_size must be positive".to_string(),
            ));
        }
        Ok(())
    }
}
