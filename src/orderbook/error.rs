//! Order book error types

use crate::orderbook::order::{OrderId, Side};
use std::fmt;

/// Errors that can occur within the OrderBook
#[derive(Debug, Clone, PartialEq)]
#[non_exhaustive]
pub enum OrderBookError {
    /// Order not found in the book (unknown, filled or already cancelled)
    OrderNotFound(String),

    /// An order with the same id is already live in the book
    DuplicateOrderId(OrderId),

    /// The order was submitted to a book for a different symbol
    SymbolMismatch {
        /// Symbol of the book
        expected: String,
        /// Symbol carried by the order
        actual: String,
    },

    /// Fill-or-kill order could not be filled completely
    InsufficientLiquidity {
        /// The side of the incoming order
        side: Side,
        /// Quantity requested
        requested: u64,
        /// Quantity available at acceptable prices
        available: u64,
    },

    /// Operation not permitted for specified order type
    InvalidOperation {
        /// Description of the error
        message: String,
    },

    /// Error while serializing book data
    SerializationError {
        /// Underlying error message
        message: String,
    },

    /// Error while deserializing book data
    DeserializationError {
        /// Underlying error message
        message: String,
    },
}

impl fmt::Display for OrderBookError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            OrderBookError::OrderNotFound(id) => write!(f, "Order not found: {id}"),
            OrderBookError::DuplicateOrderId(id) => write!(f, "Duplicate order id: {id}"),
            OrderBookError::SymbolMismatch { expected, actual } => {
                write!(f, "Symbol mismatch: book {expected}, order {actual}")
            }
            OrderBookError::InsufficientLiquidity {
                side,
                requested,
                available,
            } => {
                write!(
                    f,
                    "Insufficient liquidity for {side} order: requested {requested}, available {available}"
                )
            }
            OrderBookError::InvalidOperation { message } => {
                write!(f, "Invalid operation: {message}")
            }
            OrderBookError::SerializationError { message } => {
                write!(f, "Serialization error: {message}")
            }
            OrderBookError::DeserializationError { message } => {
                write!(f, "Deserialization error: {message}")
            }
        }
    }
}

impl std::error::Error for OrderBookError {}
