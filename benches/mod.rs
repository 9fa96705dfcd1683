use criterion::{criterion_group, criterion_main};


use engine::register_benchmarks as register_engine_benchmarks;
use order_book::register_benchmarks as register_order_book_benchmarks;

// Define the benchmark groups
criterion_group!(
    benches,
    register_order_book_benchmarks,
    register_engine_benchmarks,
);

criterion_main!(benches);
