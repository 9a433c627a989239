use thiserror::Error;

/// Unified error type for the entire equity-ledger-core library.
/// Every public fallible function returns `Result<T, LedgerError>`.
#[derive(Debug, Error)]
pub enum LedgerError {
    // ── Reference resolution ────────────────────────────────────────
    #[error("Broker reference not found: {broker_id}")]
    ReferenceNotFound { broker_id: String },

    // ── Record lookup ───────────────────────────────────────────────
    #[error("Order not found: {0}")]
    OrderNotFound(String),

    #[error("Dividend event not found: {0}")]
    DividendNotFound(String),

    // ── Business logic ──────────────────────────────────────────────
    #[error("Order validation failed: {0}")]
    ValidationError(String),

    #[error("Dividend {0} has already been applied to orders")]
    DividendAlreadyApplied(String),

    /// The largest-remainder correction ran out of headroom — continuing
    /// would drive some order's quantity negative. The transform fails
    /// closed before touching any record; `adjusted`/`remaining` report
    /// how far a record-by-record host layer would have gotten.
    #[error("Quantity allocation impossible ({adjusted} adjusted, {remaining} remaining): {reason}")]
    AllocationImpossible {
        adjusted: usize,
        remaining: usize,
        reason: String,
    },

    // ── Serialization ───────────────────────────────────────────────
    #[error("Serialization error: {0}")]
    Serialization(String),
}

// ── Conversion helpers (From impls) ─────────────────────────────────

impl From<serde_json::Error> for LedgerError {
    fn from(e: serde_json::Error) -> Self {
        LedgerError::Serialization(e.to_string())
    }
}
