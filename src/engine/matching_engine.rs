//! The multi-symbol matching engine.
//!
//! [`MatchingEngine`] owns one order book per symbol, validates incoming
//! orders, attaches an impact estimate, optionally improves passive prices,
//! runs the book's matching loop and publishes what happened on a bounded,
//! lossy event queue.
//!
//! Each symbol's book sits behind its own mutex, so the engine can be shared
//! between threads (`Arc<MatchingEngine>`) and orders on different symbols
//! never wait for each other.

use crate::engine::config::EngineConfig;
use crate::engine::error::EngineError;
use crate::engine::events::{CancelReason, EventListener, MatchingEvent};
use crate::engine::price_improvement::improve_price;
use crate::engine::publisher::EventPublisher;
use crate::engine::stats::{EngineStats, MatchingMetrics};
use crate::engine::validation::validate_order;
use crate::impact::{ImpactCalculatorFactory, MarketImpactCalculator};
use crate::orderbook::manager::{BookManager, SymbolState};
use crate::orderbook::{
    BookSnapshot, MassCancelResult, MatchResult, Order, OrderBook, OrderBookError, OrderId, Side,
    Trade,
};
use crate::utils::current_time_millis;
use dashmap::DashMap;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, MutexGuard, PoisonError, RwLock};
use std::time::Instant;
use tracing::{debug, info, trace, warn};

/// Thread-safe order matching engine for many symbols.
///
/// # Examples
///
/// ```
/// use matching_core::{EngineConfig, MatchingEngine, Order, Side};
///
/// let engine = MatchingEngine::new(EngineConfig::default()).unwrap();
/// engine.start().unwrap();
///
/// engine.add_order(Order::limit("BTC/USD", Side::Buy, 1000, 100)).unwrap();
/// let trades = engine
///     .add_order(Order::limit("BTC/USD", Side::Sell, 1000, 100))
///     .unwrap();
/// assert_eq!(trades.len(), 1);
/// assert_eq!(trades[0].quantity, 100);
///
/// engine.stop().unwrap();
/// ```
#[derive(Debug)]
pub struct MatchingEngine {
    config: EngineConfig,
    books: BookManager,
    /// Symbol of every order id that may still be live
    order_symbols: DashMap<OrderId, String>,
    running: AtomicBool,
    stats: Arc<EngineStats>,
    publisher: EventPublisher,
    impact_factory: ImpactCalculatorFactory,
    impact_calculator: RwLock<Arc<dyn MarketImpactCalculator>>,
}

impl MatchingEngine {
    /// Create a stopped engine.
    ///
    /// # Errors
    /// [`EngineError::Config`] for an invalid configuration,
    /// [`EngineError::Impact`] if the configured impact model is unknown.
    pub fn new(config: EngineConfig) -> Result<Self, EngineError> {
        config.validate()?;

        let impact_factory = ImpactCalculatorFactory::new();
        let mut calculator = impact_factory
            .create_calculator(&config.impact.model, config.impact.liquidity_factor)?;
        calculator.set_volatility_factor(config.impact.volatility_factor);

        let stats = Arc::new(EngineStats::new());
        let publisher = EventPublisher::new(config.event_channel_capacity, Arc::clone(&stats));

        Ok(Self {
            books: BookManager::new(config.trade_history_capacity),
            order_symbols: DashMap::new(),
            running: AtomicBool::new(false),
            stats,
            publisher,
            impact_factory,
            impact_calculator: RwLock::new(Arc::from(calculator)),
            config,
        })
    }

    /// Start accepting orders and delivering events.
    ///
    /// # Errors
    /// [`EngineError::AlreadyRunning`] if the engine is running,
    /// [`EngineError::Spawn`] if the event consumer thread cannot be created.
    pub fn start(&self) -> Result<(), EngineError> {
        self.running
            .compare_exchange(false, true, Ordering::AcqRel, Ordering::Acquire)
            .map_err(|_| EngineError::AlreadyRunning)?;

        if let Err(err) = self.publisher.start() {
            self.running.store(false, Ordering::Release);
            return Err(EngineError::Spawn(err.to_string()));
        }
        info!("Matching engine started");
        Ok(())
    }

    /// Stop accepting orders. Queued events are delivered before the consumer
    /// thread exits; resting orders stay in their books.
    ///
    /// # Errors
    /// [`EngineError::NotRunning`] if the engine is not running.
    pub fn stop(&self) -> Result<(), EngineError> {
        self.running
            .compare_exchange(true, false, Ordering::AcqRel, Ordering::Acquire)
            .map_err(|_| EngineError::NotRunning)?;

        self.publisher.stop();
        info!("Matching engine stopped");
        Ok(())
    }

    /// `true` between a successful `start` and the next `stop`.
    pub fn is_running(&self) -> bool {
        self.running.load(Ordering::Acquire)
    }

    /// Submit an order and return the trades it produced, including trades
    /// of stop orders it triggered.
    ///
    /// The book of a new symbol is created on first use. Rejected orders leave
    /// every book untouched and emit [`MatchingEvent::OrderRejected`].
    ///
    /// # Errors
    /// - [`EngineError::NotRunning`] if the engine is stopped.
    /// - [`EngineError::Validation`] if the order is malformed.
    /// - [`EngineError::Book`] if the book refuses it (duplicate id, fill-or-kill
    ///   without enough liquidity).
    /// - [`EngineError::LockPoisoned`] if the symbol's book lock is poisoned.
    pub fn add_order(&self, mut order: Order) -> Result<Vec<Trade>, EngineError> {
        let started = Instant::now();

        if !self.is_running() {
            return Err(self.reject(order.id, &order.symbol, EngineError::NotRunning));
        }
        if let Err(err) = validate_order(&order) {
            return Err(self.reject(order.id, &order.symbol, err.into()));
        }

        let state = self.books.get_or_create(&order.symbol);
        let mut book = match state.book.lock() {
            Ok(book) => book,
            Err(_) => {
                let err = EngineError::LockPoisoned(order.symbol.clone());
                return Err(self.reject(order.id, &order.symbol, err));
            }
        };

        if self.config.impact.enabled {
            let average = state
                .history
                .lock()
                .unwrap_or_else(PoisonError::into_inner)
                .average_trade_size();
            let calculator = self.calculator();
            order.estimated_impact = Some(calculator.calculate_impact(&order, average));
        }
        let visible_best = book.best_visible_opposite_price(order.side);
        let effective_best = book.best_opposite_price(order.side);
        improve_price(
            &mut order,
            visible_best,
            effective_best,
            &self.config.price_improvement,
        );

        let order_id = order.id;
        let symbol = order.symbol.clone();
        let submitted = order.clone();
        let result = match book.add_order(order) {
            Ok(result) => result,
            Err(err) => return Err(self.reject(order_id, &symbol, err.into())),
        };

        if !result.trades.is_empty() {
            state
                .history
                .lock()
                .unwrap_or_else(PoisonError::into_inner)
                .extend(&result.trades);
        }
        self.track_order_symbols(order_id, &symbol, &result);

        let timestamp = current_time_millis();
        self.publish_result(submitted, &symbol, &result, timestamp);
        drop(book);

        let volume = result.executed_quantity();
        #[cfg(feature = "metrics")]
        ::metrics::counter!("matching_engine_trades_total").increment(result.trades.len() as u64);
        self.stats
            .record_order(started.elapsed(), result.trades.len(), volume, timestamp);

        trace!(
            "Engine: order {} on {} produced {} trades ({} volume)",
            order_id,
            symbol,
            result.trades.len(),
            volume
        );
        Ok(result.trades)
    }

    /// Cancel a live order on any symbol.
    ///
    /// Cancelling an iceberg slice cancels the whole iceberg.
    ///
    /// # Errors
    /// - [`EngineError::NotRunning`] if the engine is stopped.
    /// - [`EngineError::NotFound`] if the order is unknown, filled or already
    ///   cancelled. Nothing changes in that case.
    pub fn cancel_order(&self, order_id: OrderId) -> Result<(), EngineError> {
        if !self.is_running() {
            return Err(EngineError::NotRunning);
        }

        for (symbol, state) in self.candidate_books(order_id) {
            let mut book = lock_book(&symbol, &state)?;
            match book.cancel_order(order_id) {
                Ok(order) => {
                    self.order_symbols.remove(&order_id);
                    self.order_symbols.remove(&order.id);
                    self.publisher.publish(MatchingEvent::OrderCanceled {
                        order_id: order.id,
                        symbol: symbol.clone(),
                        remaining_quantity: order.remaining_quantity,
                        reason: CancelReason::UserRequested,
                        timestamp: current_time_millis(),
                    });
                    drop(book);

                    self.stats.record_cancellations(1);
                    debug!("Engine: cancelled order {} on {}", order.id, symbol);
                    return Ok(());
                }
                Err(OrderBookError::OrderNotFound(_)) => continue,
                Err(err) => return Err(err.into()),
            }
        }
        Err(EngineError::NotFound(order_id))
    }

    /// Cancel every live order of one symbol.
    ///
    /// # Errors
    /// [`EngineError::NotRunning`] if the engine is stopped.
    pub fn cancel_all_orders(&self, symbol: &str) -> Result<MassCancelResult, EngineError> {
        self.mass_cancel(symbol, OrderBook::cancel_all_orders)
    }

    /// Cancel every live order on one side of a symbol.
    ///
    /// # Errors
    /// [`EngineError::NotRunning`] if the engine is stopped.
    pub fn cancel_orders_by_side(
        &self,
        symbol: &str,
        side: Side,
    ) -> Result<MassCancelResult, EngineError> {
        self.mass_cancel(symbol, |book| book.cancel_orders_by_side(side))
    }

    /// Cancel every live order of a user, across all symbols.
    ///
    /// # Errors
    /// [`EngineError::NotRunning`] if the engine is stopped,
    /// [`EngineError::LockPoisoned`] if a book lock is poisoned.
    pub fn cancel_orders_by_user(&self, user_id: &str) -> Result<MassCancelResult, EngineError> {
        if !self.is_running() {
            return Err(EngineError::NotRunning);
        }

        let mut cancelled = Vec::new();
        for (symbol, state) in self.books.states() {
            let mut book = lock_book(&symbol, &state)?;
            let result = book.cancel_orders_by_user(user_id);
            self.publish_mass_cancel(&symbol, &result);
            cancelled.extend_from_slice(result.cancelled_orders());
        }
        self.stats.record_cancellations(cancelled.len());
        Ok(MassCancelResult::new(cancelled))
    }

    fn mass_cancel<F>(&self, symbol: &str, cancel: F) -> Result<MassCancelResult, EngineError>
    where
        F: FnOnce(&mut OrderBook) -> MassCancelResult,
    {
        if !self.is_running() {
            return Err(EngineError::NotRunning);
        }
        let Some(state) = self.books.get(symbol) else {
            return Ok(MassCancelResult::default());
        };

        let mut book = lock_book(symbol, &state)?;
        let result = cancel(&mut *book);
        self.publish_mass_cancel(symbol, &result);
        drop(book);

        self.stats.record_cancellations(result.cancelled_count());
        Ok(result)
    }

    /// Visible depth of a symbol, `snapshot_depth` levels per side.
    /// Unknown symbols give an empty snapshot.
    pub fn get_order_book(&self, symbol: &str) -> BookSnapshot {
        self.get_order_book_depth(symbol, self.config.snapshot_depth)
    }

    /// Visible depth of a symbol, `depth` levels per side.
    pub fn get_order_book_depth(&self, symbol: &str, depth: usize) -> BookSnapshot {
        let Some(state) = self.books.get(symbol) else {
            return BookSnapshot::empty(symbol);
        };
        let book = state.book.lock().unwrap_or_else(PoisonError::into_inner);
        book.create_snapshot(depth)
    }

    /// Current engine counters.
    pub fn get_metrics(&self) -> MatchingMetrics {
        self.stats.snapshot()
    }

    /// A live order by id: resting, hidden, iceberg parent or pending stop.
    pub fn get_order(&self, order_id: OrderId) -> Option<Order> {
        self.candidate_books(order_id)
            .into_iter()
            .find_map(|(_, state)| {
                let book = state.book.lock().unwrap_or_else(PoisonError::into_inner);
                book.get_order(order_id)
            })
    }

    /// Every symbol with a book, sorted.
    pub fn symbols(&self) -> Vec<String> {
        self.books.symbols()
    }

    /// The `n` most recent trades of a symbol, newest first.
    pub fn recent_trades(&self, symbol: &str, n: usize) -> Vec<Trade> {
        self.books
            .get(symbol)
            .map(|state| {
                let history = state.history.lock().unwrap_or_else(PoisonError::into_inner);
                history.recent(n)
            })
            .unwrap_or_default()
    }

    /// Mean trade quantity over the symbol's history window, `0.0` without trades.
    pub fn average_trade_size(&self, symbol: &str) -> f64 {
        self.books
            .get(symbol)
            .map(|state| {
                let history = state.history.lock().unwrap_or_else(PoisonError::into_inner);
                history.average_trade_size()
            })
            .unwrap_or(0.0)
    }

    /// Replace the impact calculator used for new orders.
    pub fn set_impact_calculator(&self, calculator: Box<dyn MarketImpactCalculator>) {
        info!("Impact model set to {}", calculator.model_name());
        let mut guard = self
            .impact_calculator
            .write()
            .unwrap_or_else(PoisonError::into_inner);
        *guard = Arc::from(calculator);
    }

    /// Switch to a registered impact model, keeping the configured volatility factor.
    ///
    /// # Errors
    /// [`EngineError::Impact`] if no model is registered under `name`.
    pub fn set_impact_model(&self, name: &str, liquidity_factor: f64) -> Result<(), EngineError> {
        let mut calculator = self.impact_factory.create_calculator(name, liquidity_factor)?;
        calculator.set_volatility_factor(self.config.impact.volatility_factor);
        self.set_impact_calculator(calculator);
        Ok(())
    }

    /// Name of the active impact model.
    pub fn impact_model_name(&self) -> String {
        self.calculator().model_name().to_string()
    }

    /// The impact model registry, for registering custom models.
    pub fn impact_factory(&self) -> &ImpactCalculatorFactory {
        &self.impact_factory
    }

    /// Deliver events to `listener` on the consumer thread.
    pub fn set_event_listener(&self, listener: EventListener) {
        self.publisher.set_listener(Some(listener));
    }

    /// Remove the event listener. Events keep being consumed and discarded.
    pub fn clear_event_listener(&self) {
        self.publisher.set_listener(None);
    }

    /// Events waiting for delivery.
    pub fn queued_events(&self) -> usize {
        self.publisher.queued()
    }

    /// The configuration the engine was built with.
    pub fn config(&self) -> &EngineConfig {
        &self.config
    }

    fn calculator(&self) -> Arc<dyn MarketImpactCalculator> {
        self.impact_calculator
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .clone()
    }

    /// The book known to hold `order_id`, or every book when the id is not
    /// tracked (iceberg slices, orders already gone).
    fn candidate_books(&self, order_id: OrderId) -> Vec<(String, Arc<SymbolState>)> {
        let known = self
            .order_symbols
            .get(&order_id)
            .map(|entry| entry.value().clone())
            .and_then(|symbol| self.books.get(&symbol).map(|state| (symbol, state)));
        match known {
            Some(entry) => vec![entry],
            None => self.books.states(),
        }
    }

    fn track_order_symbols(&self, order_id: OrderId, symbol: &str, result: &MatchResult) {
        if result.resting_order.is_some() || result.stop_pending {
            self.order_symbols.insert(order_id, symbol.to_string());
        }
        for id in &result.filled_order_ids {
            self.order_symbols.remove(id);
        }
        for (id, _) in &result.cancelled_remainders {
            self.order_symbols.remove(id);
        }
    }

    fn publish_result(&self, submitted: Order, symbol: &str, result: &MatchResult, timestamp: u64) {
        self.publisher.publish(MatchingEvent::OrderAdded {
            order: submitted,
            timestamp,
        });
        for trade in &result.trades {
            self.publisher.publish(MatchingEvent::TradeExecuted {
                trade: trade.clone(),
            });
        }
        for order_id in &result.filled_order_ids {
            self.publisher.publish(MatchingEvent::OrderFilled {
                order_id: *order_id,
                symbol: symbol.to_string(),
                timestamp,
            });
        }
        for (order_id, remaining_quantity) in &result.cancelled_remainders {
            self.publisher.publish(MatchingEvent::OrderCanceled {
                order_id: *order_id,
                symbol: symbol.to_string(),
                remaining_quantity: *remaining_quantity,
                reason: CancelReason::UnfilledRemainder,
                timestamp,
            });
        }
    }

    fn publish_mass_cancel(&self, symbol: &str, result: &MassCancelResult) {
        let timestamp = current_time_millis();
        for order in result.cancelled_orders() {
            self.order_symbols.remove(&order.id);
            self.publisher.publish(MatchingEvent::OrderCanceled {
                order_id: order.id,
                symbol: symbol.to_string(),
                remaining_quantity: order.remaining_quantity,
                reason: CancelReason::MassCancel,
                timestamp,
            });
        }
        if !result.is_empty() {
            debug!("Engine: mass cancel on {}: {}", symbol, result);
        }
    }

    /// Counts and publishes a rejection, then hands the error back.
    fn reject(&self, order_id: OrderId, symbol: &str, err: EngineError) -> EngineError {
        self.stats.record_rejection();
        #[cfg(feature = "metrics")]
        ::metrics::counter!("matching_engine_rejected_orders_total").increment(1);
        warn!("Rejected order {} on {}: {}", order_id, symbol, err);
        self.publisher.publish(MatchingEvent::OrderRejected {
            order_id,
            symbol: symbol.to_string(),
            reason: err.to_string(),
            timestamp: current_time_millis(),
        });
        err
    }
}

impl Drop for MatchingEngine {
    fn drop(&mut self) {
        if self.running.swap(false, Ordering::AcqRel) {
            self.publisher.stop();
        }
    }
}

fn lock_book<'a>(
    symbol: &str,
    state: &'a SymbolState,
) -> Result<MutexGuard<'a, OrderBook>, EngineError> {
    state
        .book
        .lock()
        .map_err(|_| EngineError::LockPoisoned(symbol.to_string()))
}
