//! Many threads driving one engine.

use matching_core::{EngineConfig, MatchingEngine, Order, Side};
use std::sync::{Arc, Barrier};
use std::thread;

const THREADS: usize = 8;
const ORDERS_PER_THREAD: u64 = 200;

fn shared_engine() -> Arc<MatchingEngine> {
    let engine = MatchingEngine::new(EngineConfig::default()).expect("engine");
    engine.start().expect("start");
    Arc::new(engine)
}

#[test]
fn independent_symbols_match_in_parallel() {
    let engine = shared_engine();
    let barrier = Arc::new(Barrier::new(THREADS));

    let handles: Vec<_> = (0..THREADS)
        .map(|worker| {
            let engine = Arc::clone(&engine);
            let barrier = Arc::clone(&barrier);
            thread::spawn(move || {
                let symbol = format!("SYM{worker}");
                barrier.wait();
                let mut traded = 0;
                for _ in 0..ORDERS_PER_THREAD {
                    engine
                        .add_order(Order::limit(&symbol, Side::Sell, 100, 1))
                        .expect("ask");
                    traded += engine
                        .add_order(Order::limit(&symbol, Side::Buy, 100, 1))
                        .expect("bid")
                        .len();
                }
                traded
            })
        })
        .collect();

    let traded: usize = handles
        .into_iter()
        .map(|handle| handle.join().expect("worker"))
        .sum();
    assert_eq!(traded, THREADS * ORDERS_PER_THREAD as usize);

    assert_eq!(engine.symbols().len(), THREADS);
    for symbol in engine.symbols() {
        let snapshot = engine.get_order_book(&symbol);
        assert!(snapshot.bids.is_empty() && snapshot.asks.is_empty());
        assert_eq!(engine.recent_trades(&symbol, usize::MAX).len(), ORDERS_PER_THREAD as usize);
    }

    let metrics = engine.get_metrics();
    assert_eq!(metrics.orders_processed, 2 * THREADS as u64 * ORDERS_PER_THREAD);
    assert_eq!(metrics.total_volume, THREADS as u64 * ORDERS_PER_THREAD);
}

#[test]
fn contended_symbol_conserves_quantity() {
    let engine = shared_engine();
    let barrier = Arc::new(Barrier::new(THREADS));

    let handles: Vec<_> = (0..THREADS)
        .map(|worker| {
            let engine = Arc::clone(&engine);
            let barrier = Arc::clone(&barrier);
            thread::spawn(move || {
                let side = if worker % 2 == 0 { Side::Buy } else { Side::Sell };
                barrier.wait();
                let mut submitted = 0;
                for i in 0..ORDERS_PER_THREAD {
                    let price = 95 + (i % 10) as u128;
                    let quantity = 1 + i % 5;
                    engine
                        .add_order(Order::limit("HOT", side, price, quantity))
                        .expect("add");
                    submitted += quantity;
                }
                submitted
            })
        })
        .collect();

    let submitted: u64 = handles
        .into_iter()
        .map(|handle| handle.join().expect("worker"))
        .sum();

    let snapshot = engine.get_order_book_depth("HOT", usize::MAX);
    let resting = snapshot.total_bid_volume() + snapshot.total_ask_volume();
    let metrics = engine.get_metrics();

    // Every traded unit removes one unit from each side.
    assert_eq!(submitted, 2 * metrics.total_volume + resting);
    if let (Some((bid, _)), Some((ask, _))) = (snapshot.best_bid(), snapshot.best_ask()) {
        assert!(bid < ask, "book crossed at rest: {bid} >= {ask}");
    }
}

#[test]
fn concurrent_cancels_succeed_once() {
    let engine = shared_engine();
    let ids: Vec<_> = (0..100)
        .map(|i| {
            let order = Order::limit("CXL", Side::Buy, 100 + i, 1);
            let id = order.id;
            engine.add_order(order).expect("add");
            id
        })
        .collect();
    let ids = Arc::new(ids);

    let handles: Vec<_> = (0..4)
        .map(|_| {
            let engine = Arc::clone(&engine);
            let ids = Arc::clone(&ids);
            thread::spawn(move || {
                ids.iter()
                    .filter(|id| engine.cancel_order(**id).is_ok())
                    .count()
            })
        })
        .collect();

    let cancelled: usize = handles
        .into_iter()
        .map(|handle| handle.join().expect("worker"))
        .sum();
    assert_eq!(cancelled, 100);
    assert!(engine.get_order_book("CXL").bids.is_empty());
    assert_eq!(engine.get_metrics().orders_cancelled, 100);
}
