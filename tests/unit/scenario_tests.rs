//! End-to-end matching scenarios through the engine.

use matching_core::{
    EngineConfig, ImpactCalculatorFactory, ImpactError, LogImpactCalculator,
    MarketImpactCalculator, MatchingEngine, Order, OrderId, Side,
};

const SYMBOL: &str = "BTC/USD";

fn running_engine() -> MatchingEngine {
    let engine = MatchingEngine::new(EngineConfig::default()).expect("engine");
    engine.start().expect("start");
    engine
}

// ---------------------------------------------------------------------------
// Scenario A: a single full match empties the book
// ---------------------------------------------------------------------------

#[test]
fn scenario_a_exact_cross_empties_book() {
    let engine = running_engine();

    let buy = Order::limit(SYMBOL, Side::Buy, 1000, 100);
    let sell = Order::limit(SYMBOL, Side::Sell, 1000, 100);
    let (buy_id, sell_id) = (buy.id, sell.id);

    assert!(engine.add_order(buy).expect("buy").is_empty());
    let trades = engine.add_order(sell).expect("sell");

    assert_eq!(trades.len(), 1);
    assert_eq!(trades[0].quantity, 100);
    assert_eq!(trades[0].price, 1000);
    assert_eq!(trades[0].buy_order_id, buy_id);
    assert_eq!(trades[0].sell_order_id, sell_id);
    assert_eq!(trades[0].maker_order_id, buy_id);

    assert!(engine.get_order(buy_id).is_none());
    assert!(engine.get_order(sell_id).is_none());

    let snapshot = engine.get_order_book(SYMBOL);
    assert!(snapshot.bids.is_empty());
    assert!(snapshot.asks.is_empty());
    assert_eq!(snapshot.last_trade_price, Some(1000));
}

// ---------------------------------------------------------------------------
// Scenario B: FIFO at one price level
// ---------------------------------------------------------------------------

#[test]
fn scenario_b_market_sell_respects_fifo() {
    let engine = running_engine();

    let first = Order::limit(SYMBOL, Side::Buy, 1000, 50);
    let second = Order::limit(SYMBOL, Side::Buy, 1000, 50);
    let (first_id, second_id) = (first.id, second.id);
    engine.add_order(first).expect("first");
    engine.add_order(second).expect("second");

    let trades = engine
        .add_order(Order::market(SYMBOL, Side::Sell, 70))
        .expect("market");

    assert_eq!(trades.len(), 2);
    assert_eq!(trades[0].maker_order_id, first_id);
    assert_eq!(trades[0].quantity, 50);
    assert_eq!(trades[1].maker_order_id, second_id);
    assert_eq!(trades[1].quantity, 20);

    assert!(engine.get_order(first_id).is_none());
    let rest = engine.get_order(second_id).expect("second still rests");
    assert_eq!(rest.remaining_quantity, 30);
    assert_eq!(engine.get_order_book(SYMBOL).best_bid(), Some((1000, 30)));
}

// ---------------------------------------------------------------------------
// Scenario C: logarithmic impact
// ---------------------------------------------------------------------------

#[test]
fn scenario_c_log_impact_values() {
    let calculator = LogImpactCalculator::new(1.0);

    let small = Order::limit(SYMBOL, Side::Buy, 1000, 50);
    assert!((calculator.calculate_impact(&small, 100.0) - 0.5).abs() < 1e-12);

    let large = Order::limit(SYMBOL, Side::Buy, 1000, 1000);
    let impact = calculator.calculate_impact(&large, 100.0);
    assert!((impact - 2.302585).abs() < 1e-6);
}

#[test]
fn scenario_c_through_engine_history() {
    let config = EngineConfig::default().with_impact_model("log", 1.0);
    let engine = MatchingEngine::new(config).expect("engine");
    engine.start().expect("start");

    engine
        .add_order(Order::limit(SYMBOL, Side::Sell, 1000, 100))
        .expect("ask");
    engine
        .add_order(Order::limit(SYMBOL, Side::Buy, 1000, 100))
        .expect("bid");
    assert_eq!(engine.average_trade_size(SYMBOL), 100.0);

    let order = Order::limit(SYMBOL, Side::Buy, 900, 1000);
    let id = order.id;
    engine.add_order(order).expect("rest");
    let impact = engine
        .get_order(id)
        .and_then(|order| order.estimated_impact)
        .expect("impact attached");
    assert!((impact - 10f64.ln()).abs() < 1e-9);
}

// ---------------------------------------------------------------------------
// Scenario D: unknown model
// ---------------------------------------------------------------------------

#[test]
fn scenario_d_unknown_model_lists_available() {
    let factory = ImpactCalculatorFactory::new();
    let err = factory
        .create_calculator("quadratic", 1.0)
        .expect_err("unknown model");

    match &err {
        ImpactError::UnknownModel { name, available } => {
            assert_eq!(name, "quadratic");
            assert_eq!(available, &["linear", "log", "sqrt"]);
        }
        other => panic!("unexpected error: {other:?}"),
    }
    let message = err.to_string();
    for model in ["linear", "sqrt", "log"] {
        assert!(message.contains(model), "{message} should list {model}");
    }
}

// ---------------------------------------------------------------------------
// Order types through the engine
// ---------------------------------------------------------------------------

#[test]
fn iceberg_refreshes_and_loses_priority() {
    let engine = running_engine();

    let iceberg = Order::iceberg(SYMBOL, Side::Sell, 1000, 30, 10);
    let iceberg_id = iceberg.id;
    engine.add_order(iceberg).expect("iceberg");
    let plain = Order::limit(SYMBOL, Side::Sell, 1000, 5);
    let plain_id = plain.id;
    engine.add_order(plain).expect("plain");

    // Only the display slice shows.
    assert_eq!(engine.get_order_book(SYMBOL).best_ask(), Some((1000, 15)));

    // Fill the first slice; the refreshed slice goes behind the plain order.
    let trades = engine
        .add_order(Order::limit(SYMBOL, Side::Buy, 1000, 12))
        .expect("buy");
    assert_eq!(trades.len(), 2);
    assert_eq!(trades[0].quantity, 10);
    assert_eq!(trades[1].maker_order_id, plain_id);
    assert_eq!(trades[1].quantity, 2);

    let parent = engine.get_order(iceberg_id).expect("iceberg live");
    assert_eq!(parent.remaining_quantity, 20);
    assert_eq!(engine.get_order_book(SYMBOL).best_ask(), Some((1000, 13)));
}

#[test]
fn hidden_liquidity_matches_but_stays_invisible() {
    let engine = running_engine();

    let hidden = Order::hidden(SYMBOL, Side::Sell, 1000, 40);
    let hidden_id = hidden.id;
    engine.add_order(hidden).expect("hidden");
    assert!(engine.get_order_book(SYMBOL).asks.is_empty());

    let trades = engine
        .add_order(Order::limit(SYMBOL, Side::Buy, 1000, 25))
        .expect("buy");
    assert_eq!(trades.len(), 1);
    assert_eq!(trades[0].maker_order_id, hidden_id);
    assert_eq!(trades[0].price, 1000);

    assert_eq!(
        engine.get_order(hidden_id).map(|o| o.remaining_quantity),
        Some(15)
    );
    assert!(engine.get_order_book(SYMBOL).asks.is_empty());
}

#[test]
fn stop_order_triggers_on_last_trade() {
    let engine = running_engine();

    engine
        .add_order(Order::limit(SYMBOL, Side::Sell, 1010, 10))
        .expect("ask");
    let stop = Order::stop(SYMBOL, Side::Buy, 1000, 10);
    let stop_id = stop.id;
    assert!(engine.add_order(stop).expect("stop").is_empty());
    assert!(engine.get_order(stop_id).is_some());

    // A trade at 1000 fires the buy stop, which lifts the 1010 ask.
    engine
        .add_order(Order::limit(SYMBOL, Side::Sell, 1000, 1))
        .expect("ask");
    let trades = engine
        .add_order(Order::limit(SYMBOL, Side::Buy, 1000, 1))
        .expect("bid");

    assert_eq!(trades.len(), 2);
    assert_eq!(trades[1].taker_order_id, stop_id);
    assert_eq!(trades[1].price, 1010);
    assert!(engine.get_order(stop_id).is_none());
    assert!(engine.get_order_book(SYMBOL).asks.is_empty());
}

#[test]
fn unknown_cancel_is_not_found() {
    let engine = running_engine();
    let id = OrderId::new();
    assert_eq!(
        engine.cancel_order(id),
        Err(matching_core::EngineError::NotFound(id))
    );
}
