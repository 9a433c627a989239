use tracing::debug;

use crate::book::LedgerBook;
use crate::errors::LedgerError;
use crate::models::fees::FeeSchedule;
use crate::models::order::{LongTermOrder, PositionKey, TradeDirection};
use crate::models::position::PositionSummary;

use super::allocation::round_half_up;

/// The average-cost ledger engine: prices long-term orders against the
/// chronological history of their position.
///
/// The average cost is never persisted on its own — it is always
/// recomputed by replaying the ordered record set, so it stays correct
/// after dividend transforms have rewritten earlier records.
pub struct LedgerService;

impl LedgerService {
    pub fn new() -> Self {
        Self
    }

    /// Derive fee/tax/cost_basis/profit for an order.
    ///
    /// Buys depend on nothing but the order itself: fee from the buy
    /// rate, cost basis = value + fee, profit 0. Sells charge the sell
    /// rate and tax, then replay every sibling up to the trade date to
    /// find the running average cost their allocation draws from.
    ///
    /// The order being priced must not be in the book yet (or must be
    /// taken out first) — its own stale fields would contaminate the pool.
    pub fn price_order(
        &self,
        book: &LedgerBook,
        order: &mut LongTermOrder,
        fees: &FeeSchedule,
    ) -> Result<(), LedgerError> {
        if order.quantity <= 0 {
            return Err(LedgerError::ValidationError(
                "Order quantity must be positive".into(),
            ));
        }
        if order.price < 0 {
            return Err(LedgerError::ValidationError(
                "Order price must not be negative".into(),
            ));
        }

        match order.direction {
            TradeDirection::Buy => {
                let value = order.value();
                order.fee = round_half_up(value as f64 * fees.buy_fee_rate);
                order.tax = 0;
                order.cost_basis = value + order.fee;
                order.profit = 0;
            }
            TradeDirection::Sell => {
                self.refresh_sell_charges(order, fees);
                let value = order.value();

                let (running_qty, running_cost) =
                    self.replay_pool(book, &order.key(), order);

                if running_qty <= 0 {
                    // Sell with no buy history: degrade instead of failing.
                    // The proceeds minus charges become the whole profit.
                    order.cost_basis = 0;
                    order.profit = value - order.fee - order.tax;
                } else {
                    let average_cost =
                        round_half_up(running_cost as f64 / running_qty as f64);
                    order.cost_basis = average_cost * order.quantity;
                    let net_proceeds =
                        value as f64 - value as f64 * fees.sell_side_rate();
                    order.profit = round_half_up(
                        net_proceeds - (order.quantity * average_cost) as f64,
                    );
                }

                debug!(
                    stock = %order.stock_code,
                    quantity = order.quantity,
                    cost_basis = order.cost_basis,
                    profit = order.profit,
                    "priced sell against running average cost"
                );
            }
        }
        Ok(())
    }

    /// Recompute only the sell-side charges (fee and tax) from the
    /// current value. Used on edits that do not retrigger the
    /// chronological scan.
    pub fn refresh_sell_charges(&self, order: &mut LongTermOrder, fees: &FeeSchedule) {
        let value = order.value();
        order.fee = round_half_up(value as f64 * fees.sell_fee_rate);
        order.tax = round_half_up(value as f64 * fees.tax_rate);
    }

    /// Recompute trigger policy for sells: the cost_basis/profit scan
    /// re-runs only when the stock, the quantity, or the trade date
    /// changed. A price-only edit updates the charges but leaves the
    /// allocated cost untouched, so it does not ripple into siblings.
    pub fn requires_rescan(old: &LongTermOrder, new: &LongTermOrder) -> bool {
        old.stock_code != new.stock_code
            || old.quantity != new.quantity
            || old.trade_date != new.trade_date
            || old.direction != new.direction
    }

    /// Replay the position's record set at `order`'s trade date:
    /// buys add their quantity and cost basis to the pool, prior sells
    /// remove theirs exactly as charged.
    fn replay_pool(
        &self,
        book: &LedgerBook,
        key: &PositionKey,
        order: &LongTermOrder,
    ) -> (i64, i64) {
        let mut running_qty = 0i64;
        let mut running_cost = 0i64;
        for sibling in book.scan_set(key, order.trade_date, order.id) {
            match sibling.direction {
                TradeDirection::Buy => {
                    running_qty += sibling.quantity;
                    running_cost += sibling.cost_basis;
                }
                TradeDirection::Sell => {
                    running_qty -= sibling.quantity;
                    running_cost -= sibling.cost_basis;
                }
            }
        }
        (running_qty, running_cost)
    }

    /// Replay-derived snapshot of a whole position: held quantity,
    /// remaining cost pool, average cost, and realized profit to date.
    pub fn summarize(&self, book: &LedgerBook, key: &PositionKey) -> PositionSummary {
        let mut quantity = 0i64;
        let mut cost_basis = 0i64;
        let mut realized_profit = 0i64;
        let mut order_count = 0usize;

        for order in book.orders_for_key(key) {
            order_count += 1;
            match order.direction {
                TradeDirection::Buy => {
                    quantity += order.quantity;
                    cost_basis += order.cost_basis;
                }
                TradeDirection::Sell => {
                    quantity -= order.quantity;
                    cost_basis -= order.cost_basis;
                    realized_profit += order.profit;
                }
            }
        }

        let average_cost = if quantity > 0 {
            round_half_up(cost_basis as f64 / quantity as f64)
        } else {
            0
        };

        PositionSummary {
            key: key.clone(),
            quantity,
            cost_basis,
            average_cost,
            realized_profit,
            order_count,
        }
    }
}

impl Default for LedgerService {
    fn default() -> Self {
        Self::new()
    }
}
