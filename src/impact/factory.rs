//! Name-keyed registry of impact models.

use super::calculator::{
    LinearImpactCalculator, LogImpactCalculator, MarketImpactCalculator, SqrtImpactCalculator,
};
use super::error::ImpactError;
use dashmap::DashMap;
use std::sync::Arc;
use tracing::{debug, info};

/// Builds a calculator from a liquidity factor.
pub type CalculatorConstructor =
    Arc<dyn Fn(f64) -> Box<dyn MarketImpactCalculator> + Send + Sync>;

/// Wraps a plain `new(liquidity_factor)` function into a [`CalculatorConstructor`].
pub fn constructor<C, F>(build: F) -> CalculatorConstructor
where
    C: MarketImpactCalculator + 'static,
    F: Fn(f64) -> C + Send + Sync + 'static,
{
    Arc::new(move |liquidity_factor| -> Box<dyn MarketImpactCalculator> {
        Box::new(build(liquidity_factor))
    })
}

/// Thread-safe registry of impact models, extensible at runtime.
///
/// `linear`, `sqrt` and `log` are registered on construction.
pub struct ImpactCalculatorFactory {
    constructors: DashMap<String, CalculatorConstructor>,
}

impl ImpactCalculatorFactory {
    /// Create a factory with the built-in models registered.
    pub fn new() -> Self {
        let factory = Self {
            constructors: DashMap::new(),
        };
        factory.insert("linear", constructor(LinearImpactCalculator::new));
        factory.insert("sqrt", constructor(SqrtImpactCalculator::new));
        factory.insert("log", constructor(LogImpactCalculator::new));
        factory
    }

    fn insert(&self, name: &str, constructor: CalculatorConstructor) {
        self.constructors.insert(name.to_string(), constructor);
    }

    /// Instantiate the model registered under `name`.
    ///
    /// # Errors
    /// [`ImpactError::UnknownModel`] listing every registered name.
    pub fn create_calculator(
        &self,
        name: &str,
        liquidity_factor: f64,
    ) -> Result<Box<dyn MarketImpactCalculator>, ImpactError> {
        // Clone the constructor out so the shard lock is not held while it runs.
        let build = self
            .constructors
            .get(name)
            .map(|entry| Arc::clone(entry.value()))
            .ok_or_else(|| ImpactError::UnknownModel {
                name: name.to_string(),
                available: self.available_models(),
            })?;
        debug!("Creating impact model {} (lf {})", name, liquidity_factor);
        Ok(build(liquidity_factor))
    }

    /// Register (or replace) a model.
    ///
    /// # Errors
    /// [`ImpactError::InvalidModelName`] for an empty name,
    /// [`ImpactError::MissingConstructor`] when `constructor` is `None`.
    pub fn register_model(
        &self,
        name: &str,
        constructor: Option<CalculatorConstructor>,
    ) -> Result<(), ImpactError> {
        if name.trim().is_empty() {
            return Err(ImpactError::InvalidModelName);
        }
        let constructor =
            constructor.ok_or_else(|| ImpactError::MissingConstructor(name.to_string()))?;
        self.insert(name, constructor);
        info!("Registered impact model: {}", name);
        Ok(())
    }

    /// `true` if a model is registered under `name`.
    pub fn has_model(&self, name: &str) -> bool {
        self.constructors.contains_key(name)
    }

    /// Every registered model name, sorted.
    pub fn available_models(&self) -> Vec<String> {
        let mut names: Vec<String> = self.constructors.iter().map(|e| e.key().clone()).collect();
        names.sort();
        names
    }
}

impl Default for ImpactCalculatorFactory {
    fn default() -> Self {
        Self::new()
    }
}

impl std::fmt::Debug for ImpactCalculatorFactory {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ImpactCalculatorFactory")
            .field("models", &self.available_models())
            .finish()
    }
}
