// Transaction entity
//
// Created only by the allocation command, with all resources already
// deducted. Never deleted; it only moves through the status state machine.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::value_objects::{CouponId, EventId, TransactionId, TransactionStatus, UserId, VoucherId};

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Transaction {
    pub id: TransactionId,
    pub user_id: UserId,
    pub event_id: EventId,
    pub quantity: i64,
    /// Final price after discounts, the amount the customer actually owes.
    pub total_price: i64,
    pub total_discount: i64,
    pub status: TransactionStatus,
    pub used_coupon_id: Option<CouponId>,
    pub used_voucher_id: Option<VoucherId>,
    pub payment_proof: Option<String>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl Transaction {
    /// Move to `next` if the state machine allows it, refreshing
    /// `updated_at`. On refusal nothing changes and the current status is
    /// returned so the caller can report it.
    pub fn transition_to(
        &mut self,
        next: TransactionStatus,
        now: DateTime<Utc>,
    ) -> Result<(), TransactionStatus> {
        if !self.status.can_transition_to(next) {
            return Err(self.status);
        }
        self.status = next;
        self.updated_at = now;
        Ok(())
    }
}

/// Insert payload; the store assigns id and timestamps.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct NewTransaction {
    pub user_id: UserId,
    pub event_id: EventId,
    pub quantity: i64,
    pub total_price: i64,
    pub total_discount: i64,
    pub status: TransactionStatus,
    pub used_coupon_id: Option<CouponId>,
    pub used_voucher_id: Option<VoucherId>,
}
