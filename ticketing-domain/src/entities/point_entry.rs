// Point ledger entry entity
//
// The ledger is append-only. A positive entry is a grant, a negative entry
// records consumption drawn from one specific grant (`original_entry_id`).
// Nothing is ever updated in place except `deleted_at`, which soft-deletes
// an entry on expiry or on compensation.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::value_objects::{PointEntryId, TransactionId, UserId};

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PointEntry {
    pub id: PointEntryId,
    pub user_id: UserId,
    /// Signed: positive = grant, negative = consumption.
    pub amount: i64,
    pub expired_at: Option<DateTime<Utc>>,
    pub created_at: DateTime<Utc>,
    pub deleted_at: Option<DateTime<Utc>>,
    /// Set only on consumption entries: the grant this draw came from.
    pub original_entry_id: Option<PointEntryId>,
    /// The transaction that caused a consumption or a cancellation refund.
    pub transaction_id: Option<TransactionId>,
}

impl PointEntry {
    pub fn is_grant(&self) -> bool {
        self.amount > 0
    }

    pub fn is_consumption(&self) -> bool {
        self.amount < 0
    }

    /// An entry counts toward the balance while not soft-deleted and not
    /// past its expiry.
    pub fn is_live(&self, now: DateTime<Utc>) -> bool {
        self.deleted_at.is_none() && self.expired_at.map_or(true, |at| at > now)
    }
}

/// Insert payload; the store assigns id and `created_at` stamp.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct NewPointEntry {
    pub user_id: UserId,
    pub amount: i64,
    pub expired_at: Option<DateTime<Utc>>,
    pub original_entry_id: Option<PointEntryId>,
    pub transaction_id: Option<TransactionId>,
}
