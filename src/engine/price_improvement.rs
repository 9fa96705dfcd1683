//! Moves passive limit prices toward the opposite best.

use crate::engine::config::PriceImprovementConfig;
use crate::orderbook::order::{Order, Side, TimeInForce};
use tracing::trace;

/// Improves the price of an order that would rest without trading.
///
/// A buy moves up by at most `max_improvement_ticks * tick_size`, stopping one
/// tick below the displayed best ask; a sell moves down symmetrically.
/// `visible_best` is the displayed opposite best and `effective_best` the
/// opposite best including hidden liquidity. Only displayed prices steer the
/// move, so a resting improved order never sits one tick off a hidden price.
/// If the improved price would cross hidden liquidity the order keeps its
/// price. Orders that already cross, market and stop orders, non-GTC orders
/// and books with no displayed opposite liquidity are left alone. Returns
/// `true` if the price changed.
pub fn improve_price(
    order: &mut Order,
    visible_best: Option<u128>,
    effective_best: Option<u128>,
    config: &PriceImprovementConfig,
) -> bool {
    if !config.enabled
        || config.tick_size == 0
        || config.max_improvement_ticks == 0
        || !order.order_type.is_limit_priced()
        || order.time_in_force != TimeInForce::Gtc
    {
        return false;
    }
    let Some(opposite) = visible_best else {
        return false;
    };
    if effective_best.is_some_and(|best| order.crosses(best)) {
        return false;
    }

    let max_move = config
        .tick_size
        .saturating_mul(config.max_improvement_ticks as u128);
    let improved = match order.side {
        Side::Buy => {
            if order.price >= opposite {
                return false;
            }
            let ceiling = opposite.saturating_sub(config.tick_size);
            order.price.saturating_add(max_move).min(ceiling)
        }
        Side::Sell => {
            if order.price <= opposite {
                return false;
            }
            let floor = opposite.saturating_add(config.tick_size);
            order.price.saturating_sub(max_move).max(floor)
        }
    };

    let better = match order.side {
        Side::Buy => improved > order.price,
        Side::Sell => improved < order.price,
    };
    if !better {
        return false;
    }
    let crosses_hidden = match (order.side, effective_best) {
        (Side::Buy, Some(best)) => improved >= best,
        (Side::Sell, Some(best)) => improved <= best,
        (_, None) => false,
    };
    if crosses_hidden {
        return false;
    }

    trace!(
        "Price improvement for {}: {} -> {} (opposite best {})",
        order.id, order.price, improved, opposite
    );
    order.original_price = Some(order.price);
    order.price = improved;
    order.is_price_improved = true;
    true
}
