//! Market impact models.
//!
//! Each model estimates the price impact of an order from the ratio between
//! its quantity and the symbol's recent average trade size. The result is
//! informational: it is attached to the order and never changes matching.

use crate::orderbook::order::Order;

/// Estimates the market impact of an order.
pub trait MarketImpactCalculator: Send + Sync + std::fmt::Debug {
    /// Impact estimate for `order` given the recent average trade size.
    ///
    /// Returns `0.0` when `avg_trade_size` is not a positive finite number.
    fn calculate_impact(&self, order: &Order, avg_trade_size: f64) -> f64;

    /// Registry name of the model.
    fn model_name(&self) -> &str;

    /// Scale applied to the impact curve.
    fn liquidity_factor(&self) -> f64;

    /// Replace the liquidity factor.
    fn set_liquidity_factor(&mut self, factor: f64);

    /// Volatility factor. Carried as calibration state, not used by the built-in curves.
    fn volatility_factor(&self) -> f64;

    /// Replace the volatility factor.
    fn set_volatility_factor(&mut self, factor: f64);
}

/// `quantity / avg_trade_size`, or `None` when the average is unusable.
#[inline]
fn size_ratio(order: &Order, avg_trade_size: f64) -> Option<f64> {
    if !avg_trade_size.is_finite() || avg_trade_size <= 0.0 {
        return None;
    }
    Some(order.quantity as f64 / avg_trade_size)
}

macro_rules! impl_factors {
    ($name:literal) => {
        fn model_name(&self) -> &str {
            $name
        }

        fn liquidity_factor(&self) -> f64 {
            self.liquidity_factor
        }

        fn set_liquidity_factor(&mut self, factor: f64) {
            self.liquidity_factor = factor;
        }

        fn volatility_factor(&self) -> f64 {
            self.volatility_factor
        }

        fn set_volatility_factor(&mut self, factor: f64) {
            self.volatility_factor = factor;
        }
    };
}

/// Impact grows linearly with relative size: `lf * ratio`.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct LinearImpactCalculator {
    liquidity_factor: f64,
    volatility_factor: f64,
}

impl LinearImpactCalculator {
    /// Create a linear model.
    pub fn new(liquidity_factor: f64) -> Self {
        Self {
            liquidity_factor,
            volatility_factor: 1.0,
        }
    }
}

impl MarketImpactCalculator for LinearImpactCalculator {
    fn calculate_impact(&self, order: &Order, avg_trade_size: f64) -> f64 {
        size_ratio(order, avg_trade_size).map_or(0.0, |ratio| self.liquidity_factor * ratio)
    }

    impl_factors!("linear");
}

/// Square-root impact: `lf * sqrt(ratio)`.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SqrtImpactCalculator {
    liquidity_factor: f64,
    volatility_factor: f64,
}

impl SqrtImpactCalculator {
    /// Create a square-root model.
    pub fn new(liquidity_factor: f64) -> Self {
        Self {
            liquidity_factor,
            volatility_factor: 1.0,
        }
    }
}

impl MarketImpactCalculator for SqrtImpactCalculator {
    fn calculate_impact(&self, order: &Order, avg_trade_size: f64) -> f64 {
        size_ratio(order, avg_trade_size).map_or(0.0, |ratio| self.liquidity_factor * ratio.sqrt())
    }

    impl_factors!("sqrt");
}

/// Logarithmic impact: linear at or below the average size, `lf * ln(ratio)`
/// above it.
///
/// The log branch is floored at `lf`, the value at `ratio == 1`. For ratios in
/// `(1, e)` the unfloored `lf * ln(ratio)` lies between `0` and `lf`, so an
/// order just above the average size would score lower than one at the
/// average; with the floor the impact is non-decreasing in order size.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct LogImpactCalculator {
    liquidity_factor: f64,
    volatility_factor: f64,
}

impl LogImpactCalculator {
    /// Create a logarithmic model.
    pub fn new(liquidity_factor: f64) -> Self {
        Self {
            liquidity_factor,
            volatility_factor: 1.0,
        }
    }
}

impl MarketImpactCalculator for LogImpactCalculator {
    fn calculate_impact(&self, order: &Order, avg_trade_size: f64) -> f64 {
        match size_ratio(order, avg_trade_size) {
            Some(ratio) if ratio <= 1.0 => self.liquidity_factor * ratio,
            Some(ratio) => self.liquidity_factor * ratio.ln().max(1.0),
            None => 0.0,
        }
    }

    impl_factors!("log");
}
