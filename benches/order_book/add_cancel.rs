use criterion::{BenchmarkId, Criterion};
use matching_core::{Order, OrderBook, Side};
use std::hint::black_box;

/// Register benchmarks for resting and cancelling orders.
pub fn register_benchmarks(c: &mut Criterion) {
    let mut group = c.benchmark_group("OrderBook - Add/Cancel");

    // Resting orders spread over price levels, no matching
    for &order_count in &[100usize, 1_000, 10_000] {
        group.bench_with_input(
            BenchmarkId::new("add_resting_orders", order_count),
            &order_count,
            |b, &count| {
                b.iter(|| {
                    let mut book = OrderBook::new("BENCH");
                    for i in 0..count {
                        let price = 1000 + (i % 200) as u128;
                        let _ = book.add_order(Order::limit("BENCH", Side::Buy, price, 10));
                    }
                    black_box(book.resting_order_count())
                });
            },
        );
    }

    // Cancel from the middle of deep levels
    for &order_count in &[1_000usize, 10_000] {
        group.bench_with_input(
            BenchmarkId::new("cancel_orders", order_count),
            &order_count,
            |b, &count| {
                b.iter_with_setup(
                    || {
                        let mut book = OrderBook::new("BENCH");
                        let mut ids = Vec::with_capacity(count);
                        for i in 0..count {
                            let order = Order::limit("BENCH", Side::Sell, 1000 + (i % 10) as u128, 10);
                            ids.push(order.id);
                            let _ = book.add_order(order);
                        }
                        // Cancel in an order unrelated to arrival
                        ids.reverse();
                        (book, ids)
                    },
                    |(mut book, ids)| {
                        for id in ids {
                            let _ = black_box(book.cancel_order(id));
                        }
                        assert!(book.is_empty());
                    },
                );
            },
        );
    }

    group.finish();
}
