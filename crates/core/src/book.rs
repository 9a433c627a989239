use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::errors::LedgerError;
use crate::models::dividend::DividendEvent;
use crate::models::order::{LongTermOrder, PositionKey};
use crate::models::t0::T0Order;

/// The persistent record set: every long-term order, T0 order, and
/// dividend event known to the engine.
///
/// Long-term orders are kept globally sorted by (trade_date, created_at,
/// id), so any filtered view of them is already in chronological order.
/// All mutation goes through `&mut self` methods — the single-writer
/// discipline the engine assumes is visible in the type system.
#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct LedgerBook {
    orders: Vec<LongTermOrder>,
    t0_orders: Vec<T0Order>,
    dividends: Vec<DividendEvent>,
}

impl LedgerBook {
    pub fn new() -> Self {
        Self::default()
    }

    // ── Long-term orders ────────────────────────────────────────────

    /// Insert an order at its chronological position (O(log n) search).
    pub fn insert_order(&mut self, order: LongTermOrder) {
        let pos = self
            .orders
            .binary_search_by_key(&order.chronological_key(), |o| o.chronological_key())
            .unwrap_or_else(|pos| pos);
        self.orders.insert(pos, order);
    }

    /// Remove an order by id, returning it.
    pub fn remove_order(&mut self, id: Uuid) -> Result<LongTermOrder, LedgerError> {
        let idx = self
            .orders
            .iter()
            .position(|o| o.id == id)
            .ok_or_else(|| LedgerError::OrderNotFound(id.to_string()))?;
        Ok(self.orders.remove(idx))
    }

    pub fn order(&self, id: Uuid) -> Option<&LongTermOrder> {
        self.orders.iter().find(|o| o.id == id)
    }

    /// All long-term orders, oldest first.
    pub fn orders(&self) -> &[LongTermOrder] {
        &self.orders
    }

    /// All orders of one position, oldest first.
    pub fn orders_for_key(&self, key: &PositionKey) -> Vec<&LongTermOrder> {
        self.orders.iter().filter(|o| &o.key() == key).collect()
    }

    /// Ids of one position's orders, oldest first. Used when a caller
    /// needs to reprice while mutating the book.
    pub fn order_ids_for_key(&self, key: &PositionKey) -> Vec<Uuid> {
        self.orders
            .iter()
            .filter(|o| &o.key() == key)
            .map(|o| o.id)
            .collect()
    }

    /// The chronological scan set for pricing a sell: every sibling of
    /// `key` with trade_date ≤ `through`, excluding the record being
    /// priced itself.
    pub fn scan_set(
        &self,
        key: &PositionKey,
        through: NaiveDate,
        exclude: Uuid,
    ) -> impl Iterator<Item = &LongTermOrder> + '_ {
        let key = key.clone();
        self.orders
            .iter()
            .filter(move |o| o.id != exclude && o.trade_date <= through && o.key() == key)
    }

    /// Indices of the orders a dividend transform touches: matching
    /// stock, optionally matching owner, traded strictly before the
    /// dividend date. Chronological order.
    pub(crate) fn dividend_targets(
        &self,
        stock_code: &str,
        owner_id: Option<&str>,
        before: NaiveDate,
    ) -> Vec<usize> {
        self.orders
            .iter()
            .enumerate()
            .filter(|(_, o)| {
                o.stock_code == stock_code
                    && o.trade_date < before
                    && owner_id.map_or(true, |owner| o.owner_id == owner)
            })
            .map(|(i, _)| i)
            .collect()
    }

    pub(crate) fn order_at(&self, idx: usize) -> &LongTermOrder {
        &self.orders[idx]
    }

    pub(crate) fn order_at_mut(&mut self, idx: usize) -> &mut LongTermOrder {
        &mut self.orders[idx]
    }

    pub fn order_count(&self) -> usize {
        self.orders.len()
    }

    // ── T0 orders ───────────────────────────────────────────────────

    pub fn insert_t0(&mut self, order: T0Order) {
        self.t0_orders.push(order);
    }

    pub fn remove_t0(&mut self, id: Uuid) -> Result<T0Order, LedgerError> {
        let idx = self
            .t0_orders
            .iter()
            .position(|o| o.id == id)
            .ok_or_else(|| LedgerError::OrderNotFound(id.to_string()))?;
        Ok(self.t0_orders.remove(idx))
    }

    pub fn t0(&self, id: Uuid) -> Option<&T0Order> {
        self.t0_orders.iter().find(|o| o.id == id)
    }

    pub(crate) fn t0_mut(&mut self, id: Uuid) -> Option<&mut T0Order> {
        self.t0_orders.iter_mut().find(|o| o.id == id)
    }

    pub fn t0_orders(&self) -> &[T0Order] {
        &self.t0_orders
    }

    pub fn t0_count(&self) -> usize {
        self.t0_orders.len()
    }

    // ── Dividend events ─────────────────────────────────────────────

    pub fn insert_dividend(&mut self, event: DividendEvent) {
        self.dividends.push(event);
    }

    pub fn remove_dividend(&mut self, id: Uuid) -> Result<DividendEvent, LedgerError> {
        let idx = self
            .dividends
            .iter()
            .position(|d| d.id == id)
            .ok_or_else(|| LedgerError::DividendNotFound(id.to_string()))?;
        Ok(self.dividends.remove(idx))
    }

    pub fn dividend(&self, id: Uuid) -> Option<&DividendEvent> {
        self.dividends.iter().find(|d| d.id == id)
    }

    pub(crate) fn dividend_mut(&mut self, id: Uuid) -> Option<&mut DividendEvent> {
        self.dividends.iter_mut().find(|d| d.id == id)
    }

    pub fn dividends(&self) -> &[DividendEvent] {
        &self.dividends
    }

    pub fn dividend_count(&self) -> usize {
        self.dividends.len()
    }
}
