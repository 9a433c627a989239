use tracing::debug;

use crate::errors::LedgerError;
use crate::models::fees::FeeSchedule;
use crate::models::t0::T0Order;

use super::allocation::round_half_up;

/// Prices matched intraday round-trips (T0 orders).
///
/// Stateless — each order is fully self-contained, so pricing is a pure
/// function of the order's raw fields and the broker's fee schedule.
pub struct T0Service;

impl T0Service {
    pub fn new() -> Self {
        Self
    }

    /// Derive every computed field on the order from (quantity,
    /// buy_price, sell_price) and the fee schedule. Overwrites any
    /// previously derived values.
    pub fn price(&self, order: &mut T0Order, fees: &FeeSchedule) -> Result<(), LedgerError> {
        if order.quantity <= 0 {
            return Err(LedgerError::ValidationError(
                "T0 order quantity must be positive".into(),
            ));
        }
        if order.buy_price < 0 || order.sell_price < 0 {
            return Err(LedgerError::ValidationError(
                "T0 order prices must not be negative".into(),
            ));
        }

        order.buy_value = order.quantity * order.buy_price;
        order.sell_value = order.quantity * order.sell_price;
        order.buy_fee = round_half_up(order.buy_value as f64 * fees.buy_fee_rate);
        order.sell_fee = round_half_up(order.sell_value as f64 * fees.sell_fee_rate);
        order.sell_tax = round_half_up(order.sell_value as f64 * fees.tax_rate);
        order.profit_before_fees = order.sell_value - order.buy_value;
        order.profit_after_fees =
            order.profit_before_fees - order.buy_fee - order.sell_fee - order.sell_tax;

        debug!(
            stock = %order.stock_code,
            quantity = order.quantity,
            profit_after_fees = order.profit_after_fees,
            "priced T0 order"
        );
        Ok(())
    }

    /// Whether an edit requires repricing: any change to quantity,
    /// either price, or the broker reference.
    pub fn needs_repricing(old: &T0Order, new: &T0Order) -> bool {
        old.quantity != new.quantity
            || old.buy_price != new.buy_price
            || old.sell_price != new.sell_price
            || old.broker_id != new.broker_id
    }
}

impl Default for T0Service {
    fn default() -> Self {
        Self::new()
    }
}
