use tracing::{debug, info};
use uuid::Uuid;

use crate::book::LedgerBook;
use crate::errors::LedgerError;
use crate::models::dividend::{DividendEvent, DividendKind, DividendOutcome, DividendScope};
use crate::models::order::TradeDirection;

use super::allocation::{allocate_proportional, round_half_up};

/// Applies corporate actions to historical orders, and reverts them
/// exactly (up to the documented floor/round precision loss) when the
/// event is deleted.
///
/// The transform is validated fully — target selection and quantity
/// allocation — before any record is mutated, so a failed transform
/// leaves the book untouched.
pub struct DividendService;

impl DividendService {
    pub fn new() -> Self {
        Self
    }

    /// Forward transform: rewrite every order of the stock traded before
    /// the dividend date, then mark the event used.
    ///
    /// Stock dividends multiply the total share count by the split ratio
    /// (largest-remainder allocated so the new total is exact) and
    /// floor-divide prices by it. Cash dividends do not touch orders at
    /// all — the outcome reports zero adjusted records.
    ///
    /// Re-applying an already-used event is rejected, never silently
    /// re-run.
    pub fn apply(
        &self,
        book: &mut LedgerBook,
        dividend_id: Uuid,
        scope: DividendScope,
    ) -> Result<DividendOutcome, LedgerError> {
        let event = book
            .dividend(dividend_id)
            .cloned()
            .ok_or_else(|| LedgerError::DividendNotFound(dividend_id.to_string()))?;
        if event.is_used {
            return Err(LedgerError::DividendAlreadyApplied(dividend_id.to_string()));
        }

        let adjusted = match event.kind {
            DividendKind::Cash => 0,
            DividendKind::Stock => self.apply_stock(book, &event, scope)?,
        };

        if let Some(stored) = book.dividend_mut(dividend_id) {
            stored.is_used = true;
        }
        info!(
            stock = %event.stock_code,
            kind = %event.kind,
            value_pct = event.value_pct,
            adjusted,
            "applied dividend transform"
        );
        Ok(DividendOutcome { adjusted })
    }

    /// Inverse transform: restore the pre-dividend order set for a used
    /// event and clear its used flag. The event itself is not removed —
    /// deletion belongs to the caller.
    pub fn revert(
        &self,
        book: &mut LedgerBook,
        dividend_id: Uuid,
        scope: DividendScope,
    ) -> Result<DividendOutcome, LedgerError> {
        let event = book
            .dividend(dividend_id)
            .cloned()
            .ok_or_else(|| LedgerError::DividendNotFound(dividend_id.to_string()))?;

        let adjusted = match event.kind {
            DividendKind::Stock => self.revert_stock(book, &event, scope)?,
            DividendKind::Cash => self.revert_cash(book, &event, scope)?,
        };

        if let Some(stored) = book.dividend_mut(dividend_id) {
            stored.is_used = false;
        }
        info!(
            stock = %event.stock_code,
            kind = %event.kind,
            reverted = adjusted,
            "reverted dividend transform"
        );
        Ok(DividendOutcome { adjusted })
    }

    fn apply_stock(
        &self,
        book: &mut LedgerBook,
        event: &DividendEvent,
        scope: DividendScope,
    ) -> Result<usize, LedgerError> {
        let ratio = event.split_ratio();
        let targets = self.select_targets(book, event, scope);
        if targets.is_empty() {
            return Ok(0);
        }

        let quantities: Vec<i64> = targets.iter().map(|&i| book.order_at(i).quantity).collect();
        let total: i64 = quantities.iter().sum();
        let new_total = round_half_up(total as f64 * ratio);
        let allocated = allocate_proportional(new_total, &quantities)?;

        debug!(total, new_total, ratio, "stock dividend quantity allocation");

        for (&idx, &share) in targets.iter().zip(allocated.iter()) {
            let order = book.order_at_mut(idx);
            order.quantity = share;
            order.price = (order.price as f64 / ratio).floor() as i64;
            if order.direction == TradeDirection::Sell && order.cost_basis > 0 {
                // More shares at a lower price: the charged cost scales up.
                order.cost_basis = (order.cost_basis as f64 * ratio).floor() as i64;
            }
        }
        Ok(targets.len())
    }

    fn revert_stock(
        &self,
        book: &mut LedgerBook,
        event: &DividendEvent,
        scope: DividendScope,
    ) -> Result<usize, LedgerError> {
        let ratio = event.split_ratio();
        let targets = self.select_targets(book, event, scope);
        if targets.is_empty() {
            return Ok(0);
        }

        let quantities: Vec<i64> = targets.iter().map(|&i| book.order_at(i).quantity).collect();
        let total: i64 = quantities.iter().sum();
        let original_total = round_half_up(total as f64 / ratio);
        let allocated = allocate_proportional(original_total, &quantities)?;

        debug!(total, original_total, ratio, "stock dividend quantity restore");

        for (&idx, &share) in targets.iter().zip(allocated.iter()) {
            let order = book.order_at_mut(idx);
            order.quantity = share;
            // floor(price × ratio) is not an exact inverse of the forward
            // floor(price / ratio); the loss is bounded and documented.
            order.price = (order.price as f64 * ratio).floor() as i64;
            if order.direction == TradeDirection::Sell && order.cost_basis > 0 {
                order.cost_basis = (order.cost_basis as f64 / ratio).floor() as i64;
            }
        }
        Ok(targets.len())
    }

    fn revert_cash(
        &self,
        book: &mut LedgerBook,
        event: &DividendEvent,
        scope: DividendScope,
    ) -> Result<usize, LedgerError> {
        if event.value_pct >= 100.0 {
            return Err(LedgerError::ValidationError(format!(
                "Cannot revert a cash dividend of {}% — price inverse is undefined at or above 100%",
                event.value_pct
            )));
        }
        let inverse = 1.0 / (1.0 - event.value_pct / 100.0);
        let targets = self.select_targets(book, event, scope);

        for &idx in &targets {
            let order = book.order_at_mut(idx);
            order.price = (order.price as f64 * inverse).floor() as i64;
        }
        Ok(targets.len())
    }

    /// Orders predating the dividend: same stock, trade_date strictly
    /// before the dividend date, restricted to the event owner unless
    /// the caller is privileged.
    fn select_targets(
        &self,
        book: &LedgerBook,
        event: &DividendEvent,
        scope: DividendScope,
    ) -> Vec<usize> {
        let owner = match scope {
            DividendScope::Owner => Some(event.owner_id.as_str()),
            DividendScope::AllOwners => None,
        };
        book.dividend_targets(&event.stock_code, owner, event.dividend_date)
    }
}

impl Default for DividendService {
    fn default() -> Self {
        Self::new()
    }
}
