//! Intake validation through the engine.

use matching_core::{
    EngineConfig, EngineError, MatchingEngine, Order, OrderType, Side, TimeInForce,
    ValidationError,
};

fn running_engine() -> MatchingEngine {
    let engine = MatchingEngine::new(EngineConfig::default()).expect("engine");
    engine.start().expect("start");
    engine
}

fn rejection(engine: &MatchingEngine, order: Order) -> ValidationError {
    match engine.add_order(order) {
        Err(EngineError::Validation(err)) => err,
        other => panic!("expected a validation error, got {other:?}"),
    }
}

#[test]
fn empty_symbol_is_rejected() {
    let engine = running_engine();
    let err = rejection(&engine, Order::limit("  ", Side::Buy, 100, 1));
    assert_eq!(err, ValidationError::EmptySymbol);
    assert!(engine.symbols().is_empty());
}

#[test]
fn zero_quantity_is_rejected() {
    let engine = running_engine();
    let err = rejection(&engine, Order::limit("AAA", Side::Buy, 100, 0));
    assert_eq!(err, ValidationError::ZeroQuantity);
}

#[test]
fn inconsistent_remaining_quantity_is_rejected() {
    let engine = running_engine();
    let mut order = Order::limit("AAA", Side::Buy, 100, 5);
    order.remaining_quantity = 6;
    let err = rejection(&engine, order);
    assert_eq!(
        err,
        ValidationError::InvalidRemainingQuantity {
            remaining: 6,
            quantity: 5
        }
    );
}

#[test]
fn priced_orders_need_a_price() {
    let engine = running_engine();
    for order in [
        Order::limit("AAA", Side::Buy, 0, 1),
        Order::hidden("AAA", Side::Buy, 0, 1),
        Order::iceberg("AAA", Side::Buy, 0, 10, 2),
        Order::stop("AAA", Side::Buy, 0, 1),
    ] {
        let order_type = order.order_type;
        assert_eq!(
            rejection(&engine, order),
            ValidationError::InvalidPrice { order_type }
        );
    }
}

#[test]
fn market_orders_need_no_price() {
    let engine = running_engine();
    engine
        .add_order(Order::limit("AAA", Side::Sell, 100, 1))
        .expect("ask");
    let trades = engine
        .add_order(Order::market("AAA", Side::Buy, 1))
        .expect("market");
    assert_eq!(trades.len(), 1);
}

#[test]
fn iceberg_display_must_fit() {
    let engine = running_engine();
    for display in [0, 11] {
        let err = rejection(&engine, Order::iceberg("AAA", Side::Sell, 100, 10, display));
        assert!(matches!(err, ValidationError::InvalidDisplayQuantity { .. }));
    }
}

#[test]
fn iceberg_must_be_gtc() {
    let engine = running_engine();
    let order = Order::iceberg("AAA", Side::Sell, 100, 10, 2).with_time_in_force(TimeInForce::Ioc);
    assert_eq!(
        rejection(&engine, order),
        ValidationError::UnsupportedTimeInForce {
            order_type: OrderType::Iceberg,
            time_in_force: TimeInForce::Ioc
        }
    );
}

#[test]
fn hidden_flag_must_match_type() {
    let engine = running_engine();
    let mut order = Order::limit("AAA", Side::Buy, 100, 1);
    order.is_hidden = true;
    assert_eq!(
        rejection(&engine, order),
        ValidationError::HiddenFlagMismatch(OrderType::Limit)
    );
}

#[test]
fn iceberg_slices_cannot_be_submitted() {
    let engine = running_engine();
    let mut order = Order::limit("AAA", Side::Buy, 100, 1);
    order.is_iceberg_child = true;
    assert_eq!(
        rejection(&engine, order),
        ValidationError::IcebergChildSubmitted
    );
}

#[test]
fn every_rejection_is_counted() {
    let engine = running_engine();
    let _ = engine.add_order(Order::limit("", Side::Buy, 100, 1));
    let _ = engine.add_order(Order::limit("AAA", Side::Buy, 100, 0));
    let _ = engine.add_order(Order::limit("AAA", Side::Buy, 0, 1));
    let metrics = engine.get_metrics();
    assert_eq!(metrics.orders_rejected, 3);
    assert_eq!(metrics.orders_processed, 0);
}
