//! Impact models, the model registry and runtime model changes.

use matching_core::impact::constructor;
use matching_core::{
    EngineConfig, ImpactCalculatorFactory, ImpactError, LinearImpactCalculator,
    MarketImpactCalculator, MatchingEngine, Order, Side,
};

fn order(quantity: u64) -> Order {
    Order::limit("IMP", Side::Buy, 1000, quantity)
}

/// Impact that only depends on the liquidity factor.
#[derive(Debug)]
struct FlatImpact {
    liquidity_factor: f64,
    volatility_factor: f64,
}

impl MarketImpactCalculator for FlatImpact {
    fn calculate_impact(&self, _order: &Order, _avg_trade_size: f64) -> f64 {
        self.liquidity_factor
    }

    fn model_name(&self) -> &str {
        "flat"
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
}

fn flat(liquidity_factor: f64) -> FlatImpact {
    FlatImpact {
        liquidity_factor,
        volatility_factor: 1.0,
    }
}

#[test]
fn builtin_models_are_registered() {
    let factory = ImpactCalculatorFactory::new();
    assert_eq!(factory.available_models(), vec!["linear", "log", "sqrt"]);
    for name in ["linear", "sqrt", "log"] {
        let calculator = factory.create_calculator(name, 2.0).expect("builtin");
        assert_eq!(calculator.model_name(), name);
        assert_eq!(calculator.liquidity_factor(), 2.0);
    }
}

#[test]
fn custom_model_can_be_registered_and_created() {
    let factory = ImpactCalculatorFactory::new();
    factory
        .register_model("flat", Some(constructor(flat)))
        .expect("register");
    assert!(factory.has_model("flat"));
    assert_eq!(
        factory.available_models(),
        vec!["flat", "linear", "log", "sqrt"]
    );

    let calculator = factory.create_calculator("flat", 0.25).expect("flat");
    assert_eq!(calculator.calculate_impact(&order(1), 1.0), 0.25);
}

#[test]
fn registration_without_constructor_fails() {
    let factory = ImpactCalculatorFactory::new();
    assert_eq!(
        factory.register_model("empty", None),
        Err(ImpactError::MissingConstructor("empty".to_string()))
    );
    assert_eq!(
        factory.register_model("  ", Some(constructor(flat))),
        Err(ImpactError::InvalidModelName)
    );
    assert!(!factory.has_model("empty"));
}

#[test]
fn engine_uses_registered_custom_model() {
    let engine = MatchingEngine::new(EngineConfig::default()).expect("engine");
    engine.start().expect("start");
    engine
        .impact_factory()
        .register_model("flat", Some(constructor(flat)))
        .expect("register");
    engine.set_impact_model("flat", 0.75).expect("switch");
    assert_eq!(engine.impact_model_name(), "flat");

    let resting = order(10);
    let id = resting.id;
    engine.add_order(resting).expect("add");
    assert_eq!(
        engine.get_order(id).and_then(|o| o.estimated_impact),
        Some(0.75)
    );
}

#[test]
fn set_impact_calculator_replaces_model() {
    let engine = MatchingEngine::new(EngineConfig::default()).expect("engine");
    engine.set_impact_calculator(Box::new(LinearImpactCalculator::new(5.0)));
    assert_eq!(engine.impact_model_name(), "linear");
    engine.set_impact_calculator(Box::new(flat(1.0)));
    assert_eq!(engine.impact_model_name(), "flat");
}

#[test]
fn disabled_impact_leaves_orders_untouched() {
    let engine = MatchingEngine::new(EngineConfig::default().without_impact()).expect("engine");
    engine.start().expect("start");
    let resting = order(10);
    let id = resting.id;
    engine.add_order(resting).expect("add");
    assert_eq!(engine.get_order(id).and_then(|o| o.estimated_impact), None);
}

#[test]
fn zero_average_gives_zero_impact() {
    let engine = MatchingEngine::new(EngineConfig::default()).expect("engine");
    engine.start().expect("start");
    let resting = order(10);
    let id = resting.id;
    engine.add_order(resting).expect("add");
    assert_eq!(
        engine.get_order(id).and_then(|o| o.estimated_impact),
        Some(0.0)
    );
}
