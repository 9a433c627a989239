use serde::{Deserialize, Serialize};

use super::order::PositionKey;

/// Replay-derived snapshot of one average-cost position.
///
/// Never cached: always recomputed from the ordered record set, so it
/// stays consistent with whatever dividend transforms have rewritten.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PositionSummary {
    /// The position identity
    pub key: PositionKey,

    /// Shares currently held (buys minus sells)
    pub quantity: i64,

    /// Cost pool remaining in the position
    pub cost_basis: i64,

    /// Average cost per held share (0 when the position is flat)
    pub average_cost: i64,

    /// Sum of realized profit over this position's sells
    pub realized_profit: i64,

    /// Number of orders contributing to this position
    pub order_count: usize,
}
