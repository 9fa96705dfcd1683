mod concurrency_tests;
mod impact_tests;
mod scenario_tests;
mod snapshot_tests;
mod validation_tests;

/// Send engine logs to the captured test output. Safe to call from every test.
pub(crate) fn init_tracing() {
    let _ = tracing_subscriber::fmt()
        .with_max_level(tracing::Level::DEBUG)
        .with_test_writer()
        .try_init();
}
