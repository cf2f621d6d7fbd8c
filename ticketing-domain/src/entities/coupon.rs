// Coupon entity
// One-shot personal discount. Consumption, natural expiry and removal are
// tracked in separate fields: clearing `consumed_at` on rollback must not
// resurrect a coupon whose `expired_at` has passed, so validity re-checks
// all three.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::value_objects::{CouponId, UserId};

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Coupon {
    pub id: CouponId,
    pub user_id: UserId,
    pub nominal: i64,
    pub expired_at: DateTime<Utc>,
    /// Set when the coupon is spent by an allocation, cleared on rollback.
    pub consumed_at: Option<DateTime<Utc>>,
    /// Set by the expiry sweep or administrative removal. Never cleared.
    pub deleted_at: Option<DateTime<Utc>>,
}

impl Coupon {
    pub fn is_valid(&self, now: DateTime<Utc>) -> bool {
        self.consumed_at.is_none() && self.deleted_at.is_none() && self.expired_at > now
    }
}

/// Insert payload; the store assigns the id.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct NewCoupon {
    pub user_id: UserId,
    pub nominal: i64,
    pub expired_at: DateTime<Utc>,
}
