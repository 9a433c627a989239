use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// A matched intraday round-trip: one buy and one sell of the same
/// quantity on the same day, recorded as a single self-contained
/// document. Carries no dependency on position history.
///
/// All `buy_value`..`profit_after_fees` fields are derived and
/// overwritten whenever quantity, prices, or the broker reference change.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct T0Order {
    /// Unique identifier
    pub id: Uuid,

    /// Stock ticker/code
    pub stock_code: String,

    /// Broker reference — resolves the fee schedule
    pub broker_id: String,

    /// Owning account
    pub owner_id: String,

    /// Execution date of both legs
    pub trade_date: NaiveDate,

    /// Shares bought and sold (always positive)
    pub quantity: i64,

    /// Per-share buy price, integer currency units
    pub buy_price: i64,

    /// Per-share sell price, integer currency units
    pub sell_price: i64,

    /// Creation timestamp
    pub created_at: DateTime<Utc>,

    // ── Derived ─────────────────────────────────────────────────────
    #[serde(default)]
    pub buy_value: i64,

    #[serde(default)]
    pub sell_value: i64,

    #[serde(default)]
    pub buy_fee: i64,

    #[serde(default)]
    pub sell_fee: i64,

    #[serde(default)]
    pub sell_tax: i64,

    /// sell_value − buy_value
    #[serde(default)]
    pub profit_before_fees: i64,

    /// profit_before_fees − buy_fee − sell_fee − sell_tax
    #[serde(default)]
    pub profit_after_fees: i64,
}

impl T0Order {
    pub fn new(
        stock_code: impl Into<String>,
        broker_id: impl Into<String>,
        owner_id: impl Into<String>,
        trade_date: NaiveDate,
        quantity: i64,
        buy_price: i64,
        sell_price: i64,
    ) -> Self {
        Self {
            id: Uuid::new_v4(),
            stock_code: stock_code.into(),
            broker_id: broker_id.into(),
            owner_id: owner_id.into(),
            trade_date,
            quantity,
            buy_price,
            sell_price,
            created_at: Utc::now(),
            buy_value: 0,
            sell_value: 0,
            buy_fee: 0,
            sell_fee: 0,
            sell_tax: 0,
            profit_before_fees: 0,
            profit_after_fees: 0,
        }
    }
}
