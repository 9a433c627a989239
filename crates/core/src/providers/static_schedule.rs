use std::collections::HashMap;

use async_trait::async_trait;

use crate::errors::LedgerError;
use crate::models::fees::FeeSchedule;

use super::traits::FeeScheduleProvider;

/// In-memory fee schedule provider: a fixed broker → rates map.
///
/// The default concrete implementation — fee schedules are configuration,
/// not market data, so most hosts load them once and hand the engine this
/// provider. Also the natural provider for tests.
#[derive(Debug, Clone, Default)]
pub struct StaticFeeScheduleProvider {
    schedules: HashMap<String, FeeSchedule>,
}

impl StaticFeeScheduleProvider {
    pub fn new() -> Self {
        Self::default()
    }

    /// Builder-style registration of a broker's schedule.
    pub fn with_schedule(mut self, broker_id: impl Into<String>, schedule: FeeSchedule) -> Self {
        self.schedules.insert(broker_id.into(), schedule);
        self
    }

    /// Register or replace a broker's schedule.
    pub fn set_schedule(&mut self, broker_id: impl Into<String>, schedule: FeeSchedule) {
        self.schedules.insert(broker_id.into(), schedule);
    }

    pub fn broker_count(&self) -> usize {
        self.schedules.len()
    }
}

#[async_trait]
impl FeeScheduleProvider for StaticFeeScheduleProvider {
    fn name(&self) -> &str {
        "StaticFeeSchedule"
    }

    async fn lookup(&self, broker_id: &str) -> Result<FeeSchedule, LedgerError> {
        self.schedules
            .get(broker_id)
            .copied()
            .ok_or_else(|| LedgerError::ReferenceNotFound {
                broker_id: broker_id.to_string(),
            })
    }
}
