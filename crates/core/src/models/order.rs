use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Direction of a long-term trade.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum TradeDirection {
    /// Buying shares into the position
    Buy,
    /// Selling shares out of the position
    Sell,
}

impl std::fmt::Display for TradeDirection {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            TradeDirection::Buy => write!(f, "Buy"),
            TradeDirection::Sell => write!(f, "Sell"),
        }
    }
}

/// Identity of one average-cost position: all orders sharing this key
/// form a single ledger whose cost basis advances chronologically.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct PositionKey {
    pub stock_code: String,
    pub broker_id: String,
    pub owner_id: String,
}

impl PositionKey {
    pub fn new(
        stock_code: impl Into<String>,
        broker_id: impl Into<String>,
        owner_id: impl Into<String>,
    ) -> Self {
        Self {
            stock_code: stock_code.into(),
            broker_id: broker_id.into(),
            owner_id: owner_id.into(),
        }
    }
}

impl std::fmt::Display for PositionKey {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}/{}/{}", self.stock_code, self.broker_id, self.owner_id)
    }
}

/// A directional multi-day trade contributing to (or drawing down) an
/// average-cost position.
///
/// The raw fields (`quantity`, `price`, `trade_date`, ...) come from the
/// caller; `fee`, `tax`, `cost_basis` and `profit` are derived by the
/// ledger engine and overwritten on every repricing. Dividend transforms
/// may rewrite `quantity`, `price` and `cost_basis` in place.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LongTermOrder {
    /// Unique identifier
    pub id: Uuid,

    /// Stock ticker/code (e.g. "005930")
    pub stock_code: String,

    /// Broker reference — resolves the fee schedule
    pub broker_id: String,

    /// Owning account
    pub owner_id: String,

    /// Buy or Sell
    pub direction: TradeDirection,

    /// Number of shares (always positive)
    pub quantity: i64,

    /// Per-share price in integer currency units
    pub price: i64,

    /// Execution date (daily granularity)
    pub trade_date: NaiveDate,

    /// Creation timestamp — second-level tie-break in the chronological order
    pub created_at: DateTime<Utc>,

    /// Derived: commission charged on this trade
    #[serde(default)]
    pub fee: i64,

    /// Derived: transaction tax (sells only, 0 for buys)
    #[serde(default)]
    pub tax: i64,

    /// Derived: cost attributed to this trade.
    /// Buy: quantity × price + fee. Sell: quantity × average cost per share.
    #[serde(default)]
    pub cost_basis: i64,

    /// Derived: realized profit (sells only, 0 for buys)
    #[serde(default)]
    pub profit: i64,
}

impl LongTermOrder {
    pub fn new(
        stock_code: impl Into<String>,
        broker_id: impl Into<String>,
        owner_id: impl Into<String>,
        direction: TradeDirection,
        quantity: i64,
        price: i64,
        trade_date: NaiveDate,
    ) -> Self {
        Self {
            id: Uuid::new_v4(),
            stock_code: stock_code.into(),
            broker_id: broker_id.into(),
            owner_id: owner_id.into(),
            direction,
            quantity,
            price,
            trade_date,
            created_at: Utc::now(),
            fee: 0,
            tax: 0,
            cost_basis: 0,
            profit: 0,
        }
    }

    /// The position this order belongs to.
    pub fn key(&self) -> PositionKey {
        PositionKey::new(&self.stock_code, &self.broker_id, &self.owner_id)
    }

    /// Gross trade value: quantity × price.
    pub fn value(&self) -> i64 {
        self.quantity * self.price
    }

    /// Total order on (trade_date, created_at, id) — deterministic
    /// tie-breaking is load-bearing for the chronological scan and the
    /// dividend date partition.
    pub fn chronological_key(&self) -> (NaiveDate, DateTime<Utc>, Uuid) {
        (self.trade_date, self.created_at, self.id)
    }
}
