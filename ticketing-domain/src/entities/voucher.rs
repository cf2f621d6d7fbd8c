// Voucher entity
// Per-event discount with its own quota, valid inside a date window.
// `deleted_at` is an organizer-initiated removal, independent of quota
// exhaustion.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::value_objects::{EventId, VoucherId};

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Voucher {
    pub id: VoucherId,
    pub event_id: EventId,
    pub nominal: i64,
    pub quota: i64,
    pub start_date: DateTime<Utc>,
    pub end_date: DateTime<Utc>,
    pub deleted_at: Option<DateTime<Utc>>,
}

impl Voucher {
    pub fn is_valid(&self, now: DateTime<Utc>) -> bool {
        self.start_date <= now && self.end_date >= now && self.quota > 0 && self.deleted_at.is_none()
    }
}

/// Insert payload; the store assigns the id.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct NewVoucher {
    pub event_id: EventId,
    pub nominal: i64,
    pub quota: i64,
    pub start_date: DateTime<Utc>,
    pub end_date: DateTime<Utc>,
}
