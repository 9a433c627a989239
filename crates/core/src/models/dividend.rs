use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Kind of corporate action.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum DividendKind {
    /// Stock dividend / split — rewrites share counts and prices
    Stock,
    /// Cash dividend — no effect on held share counts
    Cash,
}

impl std::fmt::Display for DividendKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            DividendKind::Stock => write!(f, "Stock"),
            DividendKind::Cash => write!(f, "Cash"),
        }
    }
}

/// Which owners a dividend transform touches.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DividendScope {
    /// Only the event owner's orders (default)
    Owner,
    /// Every owner's orders for the stock (privileged callers)
    AllOwners,
}

/// A recorded corporate action. `is_used` tracks whether the forward
/// transform has been applied to orders; a used event must be reverted
/// before it can be deleted.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DividendEvent {
    /// Unique identifier
    pub id: Uuid,

    /// Stock ticker/code the action applies to
    pub stock_code: String,

    /// Owning account the event was recorded under
    pub owner_id: String,

    /// Effective date — orders strictly before this date are adjusted
    pub dividend_date: NaiveDate,

    /// Stock or Cash
    pub kind: DividendKind,

    /// Dividend value in percent (10.0 = 10%)
    pub value_pct: f64,

    /// True once the forward transform has rewritten orders
    #[serde(default)]
    pub is_used: bool,

    /// Creation timestamp
    pub created_at: DateTime<Utc>,
}

impl DividendEvent {
    pub fn new(
        stock_code: impl Into<String>,
        owner_id: impl Into<String>,
        dividend_date: NaiveDate,
        kind: DividendKind,
        value_pct: f64,
    ) -> Self {
        Self {
            id: Uuid::new_v4(),
            stock_code: stock_code.into(),
            owner_id: owner_id.into(),
            dividend_date,
            kind,
            value_pct,
            is_used: false,
            created_at: Utc::now(),
        }
    }

    /// Multiplicative share-count factor: 1 + value/100.
    pub fn split_ratio(&self) -> f64 {
        1.0 + self.value_pct / 100.0
    }
}

/// Result of a forward or inverse dividend transform.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct DividendOutcome {
    /// How many orders were rewritten (0 for cash forwards and empty sets)
    pub adjusted: usize,
}
