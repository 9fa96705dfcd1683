//! Multi-book management.
//!
//! Books are kept in a sharded [`DashMap`], one [`SymbolState`] per symbol.
//! Each symbol's book sits behind its own mutex, so every book has exactly one
//! writer at a time while different symbols never contend on a shared lock.

use crate::orderbook::OrderBook;
use crate::orderbook::history::TradeHistory;
use dashmap::DashMap;
use std::sync::{Arc, Mutex};
use tracing::info;

/// Everything the engine keeps per symbol.
///
/// Lock order is always `book` then `history`.
#[derive(Debug)]
pub struct SymbolState {
    /// The symbol's order book
    pub book: Mutex<OrderBook>,
    /// Recent trades of the symbol
    pub history: Mutex<TradeHistory>,
}

impl SymbolState {
    fn new(symbol: &str, history_capacity: usize) -> Self {
        Self {
            book: Mutex::new(OrderBook::new(symbol)),
            history: Mutex::new(TradeHistory::new(history_capacity)),
        }
    }
}

/// Symbol-keyed registry of order books.
#[derive(Debug)]
pub struct BookManager {
    /// Per-symbol state indexed by symbol
    books: DashMap<String, Arc<SymbolState>>,
    /// Capacity of each symbol's trade window
    history_capacity: usize,
}

impl BookManager {
    /// Create an empty manager whose books keep `history_capacity` recent trades.
    pub fn new(history_capacity: usize) -> Self {
        Self {
            books: DashMap::new(),
            history_capacity,
        }
    }

    /// Get the state of a symbol, creating an empty book on first use.
    pub fn get_or_create(&self, symbol: &str) -> Arc<SymbolState> {
        if let Some(state) = self.books.get(symbol) {
            return Arc::clone(state.value());
        }
        let entry = self.books.entry(symbol.to_string()).or_insert_with(|| {
            info!("Added order book for symbol: {}", symbol);
            Arc::new(SymbolState::new(symbol, self.history_capacity))
        });
        Arc::clone(entry.value())
    }

    /// Get the state of a symbol if a book exists.
    pub fn get(&self, symbol: &str) -> Option<Arc<SymbolState>> {
        self.books.get(symbol).map(|state| Arc::clone(state.value()))
    }

    /// Get the list of all symbols with order books, sorted.
    pub fn symbols(&self) -> Vec<String> {
        let mut symbols: Vec<String> = self.books.iter().map(|e| e.key().clone()).collect();
        symbols.sort();
        symbols
    }

    /// Snapshot of every symbol's state.
    pub fn states(&self) -> Vec<(String, Arc<SymbolState>)> {
        self.books
            .iter()
            .map(|e| (e.key().clone(), Arc::clone(e.value())))
            .collect()
    }

    /// Remove the order book for a specific symbol.
    pub fn remove_book(&self, symbol: &str) -> Option<Arc<SymbolState>> {
        let result = self.books.remove(symbol).map(|(_, state)| state);
        if result.is_some() {
            info!("Removed order book for symbol: {}", symbol);
        }
        result
    }

    /// Check if a book exists for a specific symbol.
    pub fn has_book(&self, symbol: &str) -> bool {
        self.books.contains_key(symbol)
    }

    /// Get the number of order books.
    pub fn book_count(&self) -> usize {
        self.books.len()
    }
}

impl Default for BookManager {
    fn default() -> Self {
        Self::new(1000)
    }
}
