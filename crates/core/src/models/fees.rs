use serde::{Deserialize, Serialize};

/// Per-broker commission and tax rates, expressed as fractions
/// (0.0015 = 0.15%). Resolved through a `FeeScheduleProvider` at
/// pricing time — never stored on the orders themselves.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct FeeSchedule {
    /// Commission charged on the buy side.
    pub buy_fee_rate: f64,

    /// Commission charged on the sell side.
    pub sell_fee_rate: f64,

    /// Transaction tax charged on the sell side.
    pub tax_rate: f64,
}

impl FeeSchedule {
    pub fn new(buy_fee_rate: f64, sell_fee_rate: f64, tax_rate: f64) -> Self {
        Self {
            buy_fee_rate,
            sell_fee_rate,
            tax_rate,
        }
    }

    /// A zero-rate schedule (useful for fee-free brokers and tests).
    pub fn free() -> Self {
        Self::new(0.0, 0.0, 0.0)
    }

    /// Combined sell-side drag: commission plus tax.
    pub fn sell_side_rate(&self) -> f64 {
        self.sell_fee_rate + self.tax_rate
    }
}
