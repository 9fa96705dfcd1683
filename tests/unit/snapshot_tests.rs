//! Depth snapshots, queries and trade history.

use matching_core::{
    BookSnapshot, DepthLevel, EngineConfig, MatchingEngine, Order, OrderBook, Side,
};

const SYMBOL: &str = "ADA/USD";

fn populated_engine() -> MatchingEngine {
    let engine = MatchingEngine::new(EngineConfig::default()).expect("engine");
    engine.start().expect("start");
    for (price, quantity) in [(100, 5), (100, 7), (99, 3), (98, 1)] {
        engine
            .add_order(Order::limit(SYMBOL, Side::Buy, price, quantity))
            .expect("bid");
    }
    for (price, quantity) in [(101, 4), (103, 6)] {
        engine
            .add_order(Order::limit(SYMBOL, Side::Sell, price, quantity))
            .expect("ask");
    }
    engine
        .add_order(Order::hidden(SYMBOL, Side::Sell, 102, 50))
        .expect("hidden");
    engine
}

#[test]
fn snapshot_aggregates_visible_levels() {
    let engine = populated_engine();
    let snapshot = engine.get_order_book(SYMBOL);

    assert_eq!(snapshot.symbol, SYMBOL);
    assert_eq!(
        snapshot.bids,
        vec![
            DepthLevel {
                price: 100,
                quantity: 12,
                order_count: 2
            },
            DepthLevel {
                price: 99,
                quantity: 3,
                order_count: 1
            },
            DepthLevel {
                price: 98,
                quantity: 1,
                order_count: 1
            },
        ]
    );
    // The hidden ask at 102 is not part of the public depth.
    let ask_prices: Vec<u128> = snapshot.asks.iter().map(|level| level.price).collect();
    assert_eq!(ask_prices, vec![101, 103]);
    assert_eq!(snapshot.spread(), Some(1));
    assert_eq!(snapshot.mid_price(), Some(100.5));
    assert_eq!(snapshot.total_bid_volume(), 16);
    assert_eq!(snapshot.total_ask_volume(), 10);
}

#[test]
fn depth_limit_is_respected() {
    let engine = populated_engine();
    let snapshot = engine.get_order_book_depth(SYMBOL, 1);
    assert_eq!(snapshot.bids.len(), 1);
    assert_eq!(snapshot.asks.len(), 1);
    assert_eq!(snapshot.best_bid(), Some((100, 12)));
    assert_eq!(snapshot.best_ask(), Some((101, 4)));
}

#[test]
fn unknown_symbol_gives_empty_snapshot() {
    let engine = populated_engine();
    let snapshot = engine.get_order_book("NOPE");
    assert_eq!(snapshot.symbol, "NOPE");
    assert!(snapshot.bids.is_empty());
    assert!(snapshot.asks.is_empty());
    assert_eq!(snapshot.last_trade_price, None);
    assert!(!engine.symbols().contains(&"NOPE".to_string()));
}

#[test]
fn snapshot_survives_json() {
    let engine = populated_engine();
    let snapshot = engine.get_order_book(SYMBOL);
    let json = snapshot.to_json().expect("serialize");
    assert_eq!(BookSnapshot::from_json(&json).expect("deserialize"), snapshot);
}

#[test]
fn recent_trades_newest_first() {
    let engine = populated_engine();
    engine
        .add_order(Order::market(SYMBOL, Side::Sell, 5))
        .expect("sell");
    engine
        .add_order(Order::market(SYMBOL, Side::Buy, 2))
        .expect("buy");

    let trades = engine.recent_trades(SYMBOL, 10);
    assert_eq!(trades.len(), 2);
    assert_eq!(trades[0].taker_side, Side::Buy);
    assert_eq!(trades[1].taker_side, Side::Sell);
    assert_eq!(engine.average_trade_size(SYMBOL), 3.5);
    assert!(engine.recent_trades("NOPE", 10).is_empty());
    assert_eq!(engine.average_trade_size("NOPE"), 0.0);
}

#[test]
fn trade_history_is_bounded() {
    let config = EngineConfig::default().with_trade_history_capacity(3);
    let engine = MatchingEngine::new(config).expect("engine");
    engine.start().expect("start");
    for quantity in 1..=5 {
        engine
            .add_order(Order::limit(SYMBOL, Side::Sell, 100, quantity))
            .expect("ask");
        engine
            .add_order(Order::limit(SYMBOL, Side::Buy, 100, quantity))
            .expect("bid");
    }
    let trades = engine.recent_trades(SYMBOL, 10);
    let quantities: Vec<u64> = trades.iter().map(|t| t.quantity).collect();
    assert_eq!(quantities, vec![5, 4, 3]);
    assert_eq!(engine.average_trade_size(SYMBOL), 4.0);
}

#[test]
fn symbols_are_sorted() {
    let engine = MatchingEngine::new(EngineConfig::default()).expect("engine");
    engine.start().expect("start");
    for symbol in ["ZZZ", "AAA", "MMM"] {
        engine
            .add_order(Order::limit(symbol, Side::Buy, 1, 1))
            .expect("add");
    }
    assert_eq!(engine.symbols(), vec!["AAA", "MMM", "ZZZ"]);
}

#[test]
fn book_queries_cover_hidden_liquidity() {
    let mut book = OrderBook::new(SYMBOL);
    let ask = book
        .add_order(Order::limit(SYMBOL, Side::Sell, 105, 4))
        .expect("ask");
    assert!(ask.trades.is_empty());
    let hidden = book
        .add_order(Order::hidden(SYMBOL, Side::Sell, 104, 9))
        .expect("hidden");
    assert!(hidden.resting_order.is_some());

    assert_eq!(book.best_ask(), Some(105));
    assert_eq!(book.effective_best_ask(), Some(104));
    assert_eq!(book.visible_quantity(Side::Sell), 4);
    assert_eq!(book.hidden_quantity(Side::Sell), 9);
    assert_eq!(book.hidden_order_count(), 1);
    assert_eq!(book.resting_order_count(), 2);
    assert_eq!(book.peek_match(Side::Buy, 20, Some(105)), 13);
    assert_eq!(book.peek_match(Side::Buy, 20, Some(104)), 9);
}
