//! Order validation performed before an order reaches its book.

use crate::orderbook::order::{Order, OrderType, TimeInForce};
use thiserror::Error;

/// Why an order was refused at intake.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ValidationError {
    /// The symbol is empty or blank.
    #[error("symbol must not be empty")]
    EmptySymbol,

    /// The order quantity is zero.
    #[error("quantity must be positive")]
    ZeroQuantity,

    /// `remaining_quantity` is zero or larger than `quantity`.
    #[error("remaining quantity {remaining} is invalid for quantity {quantity}")]
    InvalidRemainingQuantity {
        /// Remaining quantity carried by the order
        remaining: u64,
        /// Original quantity
        quantity: u64,
    },

    /// Priced order types need a positive price.
    #[error("{order_type} order requires a positive price")]
    InvalidPrice {
        /// The order type
        order_type: OrderType,
    },

    /// Iceberg display quantity missing, zero or above the order quantity.
    #[error("invalid display quantity {display:?} for quantity {quantity}")]
    InvalidDisplayQuantity {
        /// Display quantity carried by the order
        display: Option<u64>,
        /// Original quantity
        quantity: u64,
    },

    /// The time in force is not supported for this order type.
    #[error("{time_in_force} is not supported for {order_type} orders")]
    UnsupportedTimeInForce {
        /// The order type
        order_type: OrderType,
        /// The requested time in force
        time_in_force: TimeInForce,
    },

    /// `is_hidden` disagrees with the order type.
    #[error("hidden flag does not match order type {0}")]
    HiddenFlagMismatch(OrderType),

    /// Iceberg slices are created by the book, never submitted.
    #[error("iceberg slices cannot be submitted directly")]
    IcebergChildSubmitted,
}

/// Checks an incoming order. Side needs no check: [`crate::Side`] has no invalid value.
pub fn validate_order(order: &Order) -> Result<(), ValidationError> {
    if order.symbol.trim().is_empty() {
        return Err(ValidationError::EmptySymbol);
    }
    if order.quantity == 0 {
        return Err(ValidationError::ZeroQuantity);
    }
    if order.remaining_quantity == 0 || order.remaining_quantity > order.quantity {
        return Err(ValidationError::InvalidRemainingQuantity {
            remaining: order.remaining_quantity,
            quantity: order.quantity,
        });
    }
    if order.is_iceberg_child {
        return Err(ValidationError::IcebergChildSubmitted);
    }
    if order.is_hidden != (order.order_type == OrderType::Hidden) {
        return Err(ValidationError::HiddenFlagMismatch(order.order_type));
    }
    if order.order_type != OrderType::Market && order.price == 0 {
        return Err(ValidationError::InvalidPrice {
            order_type: order.order_type,
        });
    }

    match order.order_type {
        OrderType::Iceberg => {
            let valid_display = order
                .display_quantity
                .is_some_and(|display| display > 0 && display <= order.quantity);
            if !valid_display {
                return Err(ValidationError::InvalidDisplayQuantity {
                    display: order.display_quantity,
                    quantity: order.quantity,
                });
            }
            if order.time_in_force != TimeInForce::Gtc {
                return Err(ValidationError::UnsupportedTimeInForce {
                    order_type: order.order_type,
                    time_in_force: order.time_in_force,
                });
            }
        }
        OrderType::Stop if order.time_in_force == TimeInForce::Fok => {
            return Err(ValidationError::UnsupportedTimeInForce {
                order_type: order.order_type,
                time_in_force: order.time_in_force,
            });
        }
        _ => {}
    }
    Ok(())
}
