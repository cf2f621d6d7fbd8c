// Runtime configuration consumed by the application layer

use chrono::Duration;
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RuntimeConfig {
    /// How long a transaction may sit in WaitingForPayment without a proof
    /// before the scheduler expires it.
    pub payment_window_minutes: i64,
    /// How long a transaction may sit in WaitingForAdminConfirmation without
    /// an organizer decision before the scheduler cancels it.
    pub confirmation_window_hours: i64,
    /// Interval between scheduler passes.
    pub scheduler_tick_seconds: u64,
}

impl RuntimeConfig {
    pub fn payment_window(&self) -> Duration {
        Duration::minutes(self.payment_window_minutes)
    }

    pub fn confirmation_window(&self) -> Duration {
        Duration::hours(self.confirmation_window_hours)
    }
}

impl Default for RuntimeConfig {
    fn default() -> Self {
        Self {
            payment_window_minutes: 120,
            confirmation_window_hours: 72,
            scheduler_tick_seconds: 300,
        }
    }
}
