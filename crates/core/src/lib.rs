pub mod book;
pub mod errors;
pub mod models;
pub mod providers;
pub mod services;

use std::sync::Arc;

use chrono::NaiveDate;
use uuid::Uuid;

use book::LedgerBook;
use errors::LedgerError;
use models::{
    dividend::{DividendEvent, DividendKind, DividendOutcome, DividendScope},
    order::{LongTermOrder, PositionKey, TradeDirection},
    position::PositionSummary,
    t0::T0Order,
};
use providers::traits::FeeScheduleProvider;
use services::{
    dividend_service::DividendService, ledger_service::LedgerService, t0_service::T0Service,
};

/// Main entry point for the equity-ledger-core library.
///
/// Owns the record set and the three computation engines, and resolves
/// fee schedules through the injected provider. The host CRUD shell
/// feeds raw trade and dividend fields in and reads computed fields
/// back out; persistence and transport stay on the host side.
#[must_use]
pub struct EquityLedger {
    book: LedgerBook,
    ledger_service: LedgerService,
    t0_service: T0Service,
    dividend_service: DividendService,
    fee_provider: Arc<dyn FeeScheduleProvider>,
    /// Tracks whether any mutation has occurred since the last save/load.
    dirty: bool,
}

impl std::fmt::Debug for EquityLedger {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("EquityLedger")
            .field("orders", &self.book.order_count())
            .field("t0_orders", &self.book.t0_count())
            .field("dividends", &self.book.dividend_count())
            .field("fee_provider", &self.fee_provider.name())
            .field("dirty", &self.dirty)
            .finish()
    }
}

impl EquityLedger {
    /// Create an empty ledger backed by the given fee schedule provider.
    pub fn new(fee_provider: Arc<dyn FeeScheduleProvider>) -> Self {
        Self::with_book(LedgerBook::new(), fee_provider)
    }

    /// Wrap an existing record set (e.g. loaded by the host layer).
    pub fn with_book(book: LedgerBook, fee_provider: Arc<dyn FeeScheduleProvider>) -> Self {
        Self {
            book,
            ledger_service: LedgerService::new(),
            t0_service: T0Service::new(),
            dividend_service: DividendService::new(),
            fee_provider,
            dirty: false,
        }
    }

    /// Read-only view of the full record set.
    #[must_use]
    pub fn book(&self) -> &LedgerBook {
        &self.book
    }

    // ── Long-term orders ────────────────────────────────────────────

    /// Record a long-term Buy/Sell trade. Resolves the broker's fee
    /// schedule, derives fee/tax/cost_basis/profit, and inserts the
    /// order at its chronological position. No record is written when
    /// the broker reference cannot be resolved.
    #[allow(clippy::too_many_arguments)]
    pub async fn add_long_term_order(
        &mut self,
        stock_code: impl Into<String>,
        broker_id: impl Into<String>,
        owner_id: impl Into<String>,
        direction: TradeDirection,
        quantity: i64,
        price: i64,
        trade_date: NaiveDate,
    ) -> Result<Uuid, LedgerError> {
        let mut order = LongTermOrder::new(
            stock_code, broker_id, owner_id, direction, quantity, price, trade_date,
        );
        Self::require_stock_code(&order.stock_code)?;

        let fees = self.fee_provider.lookup(&order.broker_id).await?;
        self.ledger_service.price_order(&self.book, &mut order, &fees)?;

        let id = order.id;
        self.book.insert_order(order);
        self.dirty = true;
        Ok(id)
    }

    /// Edit a long-term order. Fee and tax are always re-derived from
    /// the new value; the sell-side chronological scan re-runs only when
    /// the stock, quantity, trade date, or direction changed — a
    /// price-only edit deliberately does not ripple into the position
    /// history. On any failure the original order is restored.
    #[allow(clippy::too_many_arguments)]
    pub async fn update_long_term_order(
        &mut self,
        order_id: Uuid,
        stock_code: impl Into<String>,
        broker_id: impl Into<String>,
        direction: TradeDirection,
        quantity: i64,
        price: i64,
        trade_date: NaiveDate,
    ) -> Result<(), LedgerError> {
        let old = self.book.remove_order(order_id)?;

        let mut updated = old.clone();
        updated.stock_code = stock_code.into();
        updated.broker_id = broker_id.into();
        updated.direction = direction;
        updated.quantity = quantity;
        updated.price = price;
        updated.trade_date = trade_date;

        match self.reprice_updated(&old, &mut updated).await {
            Ok(()) => {
                self.book.insert_order(updated);
                self.dirty = true;
                Ok(())
            }
            Err(e) => {
                // Rollback: restore the original record untouched.
                self.book.insert_order(old);
                Err(e)
            }
        }
    }

    async fn reprice_updated(
        &self,
        old: &LongTermOrder,
        updated: &mut LongTermOrder,
    ) -> Result<(), LedgerError> {
        Self::require_stock_code(&updated.stock_code)?;
        if updated.quantity <= 0 {
            return Err(LedgerError::ValidationError(
                "Order quantity must be positive".into(),
            ));
        }
        if updated.price < 0 {
            return Err(LedgerError::ValidationError(
                "Order price must not be negative".into(),
            ));
        }

        let fees = self.fee_provider.lookup(&updated.broker_id).await?;
        match updated.direction {
            TradeDirection::Buy => {
                // Buys depend on nothing else; always fully re-derived.
                self.ledger_service.price_order(&self.book, updated, &fees)
            }
            TradeDirection::Sell => {
                if LedgerService::requires_rescan(old, updated) {
                    self.ledger_service.price_order(&self.book, updated, &fees)
                } else {
                    self.ledger_service.refresh_sell_charges(updated, &fees);
                    Ok(())
                }
            }
        }
    }

    /// Delete a long-term order, returning it.
    pub fn remove_long_term_order(&mut self, order_id: Uuid) -> Result<LongTermOrder, LedgerError> {
        let removed = self.book.remove_order(order_id)?;
        self.dirty = true;
        Ok(removed)
    }

    #[must_use]
    pub fn get_long_term_order(&self, order_id: Uuid) -> Option<&LongTermOrder> {
        self.book.order(order_id)
    }

    /// All long-term orders, oldest first.
    #[must_use]
    pub fn long_term_orders(&self) -> &[LongTermOrder] {
        self.book.orders()
    }

    /// One position's orders, oldest first.
    #[must_use]
    pub fn orders_for_position(&self, key: &PositionKey) -> Vec<&LongTermOrder> {
        self.book.orders_for_key(key)
    }

    /// All orders of one stock across brokers and owners, oldest first.
    #[must_use]
    pub fn orders_for_stock(&self, stock_code: &str) -> Vec<&LongTermOrder> {
        self.book
            .orders()
            .iter()
            .filter(|o| o.stock_code == stock_code)
            .collect()
    }

    /// Replay-derived snapshot of one position. Never cached.
    #[must_use]
    pub fn position_summary(&self, key: &PositionKey) -> PositionSummary {
        self.ledger_service.summarize(&self.book, key)
    }

    /// Explicitly re-run the average-cost derivation over every order of
    /// a position, oldest first. The remedy for the staleness window a
    /// dividend transform leaves behind: transforms rewrite historical
    /// quantities and prices but do not re-chain sibling sells on their
    /// own. Returns the number of orders repriced.
    pub async fn reprice_position(&mut self, key: &PositionKey) -> Result<usize, LedgerError> {
        let ids = self.book.order_ids_for_key(key);
        if ids.is_empty() {
            return Ok(0);
        }
        let fees = self.fee_provider.lookup(&key.broker_id).await?;

        let mut repriced = 0usize;
        for id in ids {
            let mut order = self.book.remove_order(id)?;
            let result = self.ledger_service.price_order(&self.book, &mut order, &fees);
            self.book.insert_order(order);
            result?;
            repriced += 1;
        }
        self.dirty = true;
        Ok(repriced)
    }

    // ── T0 orders ───────────────────────────────────────────────────

    /// Record a matched intraday round-trip and derive its profit
    /// fields. No record is written when the broker reference cannot be
    /// resolved.
    #[allow(clippy::too_many_arguments)]
    pub async fn add_t0_order(
        &mut self,
        stock_code: impl Into<String>,
        broker_id: impl Into<String>,
        owner_id: impl Into<String>,
        trade_date: NaiveDate,
        quantity: i64,
        buy_price: i64,
        sell_price: i64,
    ) -> Result<Uuid, LedgerError> {
        let mut order = T0Order::new(
            stock_code, broker_id, owner_id, trade_date, quantity, buy_price, sell_price,
        );
        Self::require_stock_code(&order.stock_code)?;

        let fees = self.fee_provider.lookup(&order.broker_id).await?;
        self.t0_service.price(&mut order, &fees)?;

        let id = order.id;
        self.book.insert_t0(order);
        self.dirty = true;
        Ok(id)
    }

    /// Edit a T0 order. Repriced only when quantity, a price, or the
    /// broker reference changed.
    #[allow(clippy::too_many_arguments)]
    pub async fn update_t0_order(
        &mut self,
        order_id: Uuid,
        stock_code: impl Into<String>,
        broker_id: impl Into<String>,
        trade_date: NaiveDate,
        quantity: i64,
        buy_price: i64,
        sell_price: i64,
    ) -> Result<(), LedgerError> {
        let old = self
            .book
            .t0(order_id)
            .cloned()
            .ok_or_else(|| LedgerError::OrderNotFound(order_id.to_string()))?;

        let mut updated = old.clone();
        updated.stock_code = stock_code.into();
        updated.broker_id = broker_id.into();
        updated.trade_date = trade_date;
        updated.quantity = quantity;
        updated.buy_price = buy_price;
        updated.sell_price = sell_price;
        Self::require_stock_code(&updated.stock_code)?;

        if T0Service::needs_repricing(&old, &updated) {
            let fees = self.fee_provider.lookup(&updated.broker_id).await?;
            self.t0_service.price(&mut updated, &fees)?;
        }

        // Lookup and pricing succeeded — safe to commit.
        if let Some(stored) = self.book.t0_mut(order_id) {
            *stored = updated;
        }
        self.dirty = true;
        Ok(())
    }

    /// Delete a T0 order, returning it.
    pub fn remove_t0_order(&mut self, order_id: Uuid) -> Result<T0Order, LedgerError> {
        let removed = self.book.remove_t0(order_id)?;
        self.dirty = true;
        Ok(removed)
    }

    #[must_use]
    pub fn get_t0_order(&self, order_id: Uuid) -> Option<&T0Order> {
        self.book.t0(order_id)
    }

    #[must_use]
    pub fn t0_orders(&self) -> &[T0Order] {
        self.book.t0_orders()
    }

    // ── Dividend events ─────────────────────────────────────────────

    /// Record a corporate action. Recording alone does not touch any
    /// order — the transform runs on `apply_dividend`.
    pub fn add_dividend(
        &mut self,
        stock_code: impl Into<String>,
        owner_id: impl Into<String>,
        dividend_date: NaiveDate,
        kind: DividendKind,
        value_pct: f64,
    ) -> Result<Uuid, LedgerError> {
        let event = DividendEvent::new(stock_code, owner_id, dividend_date, kind, value_pct);
        Self::require_stock_code(&event.stock_code)?;
        if event.value_pct <= 0.0 || event.value_pct.is_nan() {
            return Err(LedgerError::ValidationError(
                "Dividend value must be a positive percentage".into(),
            ));
        }
        if event.kind == DividendKind::Cash && event.value_pct >= 100.0 {
            return Err(LedgerError::ValidationError(
                "Cash dividend value must be below 100%".into(),
            ));
        }

        let id = event.id;
        self.book.insert_dividend(event);
        self.dirty = true;
        Ok(id)
    }

    /// Run the forward transform for a recorded dividend. An empty
    /// affected set is a zero-count success; re-applying a used event is
    /// an error.
    pub fn apply_dividend(
        &mut self,
        dividend_id: Uuid,
        scope: DividendScope,
    ) -> Result<DividendOutcome, LedgerError> {
        let outcome = self
            .dividend_service
            .apply(&mut self.book, dividend_id, scope)?;
        self.dirty = true;
        Ok(outcome)
    }

    /// Delete a dividend event. A used event is reverted first, so the
    /// affected orders return to their pre-dividend state before the
    /// record disappears. Returns how many orders were reverted.
    pub fn delete_dividend(
        &mut self,
        dividend_id: Uuid,
        scope: DividendScope,
    ) -> Result<DividendOutcome, LedgerError> {
        let is_used = self
            .book
            .dividend(dividend_id)
            .ok_or_else(|| LedgerError::DividendNotFound(dividend_id.to_string()))?
            .is_used;

        let outcome = if is_used {
            self.dividend_service
                .revert(&mut self.book, dividend_id, scope)?
        } else {
            DividendOutcome { adjusted: 0 }
        };

        self.book.remove_dividend(dividend_id)?;
        self.dirty = true;
        Ok(outcome)
    }

    #[must_use]
    pub fn get_dividend(&self, dividend_id: Uuid) -> Option<&DividendEvent> {
        self.book.dividend(dividend_id)
    }

    #[must_use]
    pub fn dividends(&self) -> &[DividendEvent] {
        self.book.dividends()
    }

    // ── Counts & Dirty State ────────────────────────────────────────

    #[must_use]
    pub fn order_count(&self) -> usize {
        self.book.order_count()
    }

    #[must_use]
    pub fn t0_count(&self) -> usize {
        self.book.t0_count()
    }

    #[must_use]
    pub fn dividend_count(&self) -> usize {
        self.book.dividend_count()
    }

    /// Returns `true` if the book has been modified since the last
    /// save/load acknowledgement.
    #[must_use]
    pub fn has_unsaved_changes(&self) -> bool {
        self.dirty
    }

    /// Host layer acknowledgement that the current state was persisted.
    pub fn mark_saved(&mut self) {
        self.dirty = false;
    }

    // ── Export ──────────────────────────────────────────────────────

    /// Export the full record set as JSON (unencrypted snapshot for
    /// debugging/display — persistence proper is the host's job).
    pub fn to_json(&self) -> Result<String, LedgerError> {
        Ok(serde_json::to_string_pretty(&self.book)?)
    }

    // ── Internal ────────────────────────────────────────────────────

    fn require_stock_code(stock_code: &str) -> Result<(), LedgerError> {
        if stock_code.trim().is_empty() {
            return Err(LedgerError::ValidationError(
                "Stock code must not be empty".into(),
            ));
        }
        Ok(())
    }
}
