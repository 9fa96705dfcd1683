//! Pluggable market impact estimation.

pub mod calculator;
pub mod error;
pub mod factory;

pub use calculator::{
    LinearImpactCalculator, LogImpactCalculator, MarketImpactCalculator, SqrtImpactCalculator,
};
pub use error::ImpactError;
pub use factory::{CalculatorConstructor, ImpactCalculatorFactory, constructor};
