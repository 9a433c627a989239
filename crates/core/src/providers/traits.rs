use async_trait::async_trait;

use crate::errors::LedgerError;
use crate::models::fees::FeeSchedule;

/// Read-only capability for resolving a broker's fee schedule.
///
/// In the host system this is backed by broker configuration (DB or
/// remote service); the engine only ever sees this trait, which keeps
/// the calculators pure and testable. An unknown broker resolves to
/// `LedgerError::ReferenceNotFound` and the pending write is aborted.
#[async_trait]
pub trait FeeScheduleProvider: Send + Sync {
    /// Human-readable name of this provider (for logs/errors).
    fn name(&self) -> &str;

    /// Resolve the fee schedule for a broker reference.
    async fn lookup(&self, broker_id: &str) -> Result<FeeSchedule, LedgerError>;
}
