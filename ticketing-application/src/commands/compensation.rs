// Compensation
//
// Reverses everything an allocation consumed: event quota, point
// consumptions, the coupon's consumed marker, the voucher's quota slot.
// Reject, Expire and Cancel all run the same rollback; only the Cancel path
// adds a monetary refund. Expire means no payment was ever made, Reject
// refunds money out of band, Cancel is the one case where the system itself
// owes the customer, so it grants non-expiring points worth the full paid
// price.

use chrono::{DateTime, Utc};
use tracing::debug;

use ticketing_domain::entities::Transaction;
use ticketing_domain::ports::StoreTx;
use ticketing_domain::services::ledger;

use crate::AppError;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RefundPolicy {
    /// Resources back, no money moves inside the system.
    None,
    /// Resources back plus a full-value non-expiring point grant.
    StoreCredit,
}

/// Reverse a transaction's resource consumption inside the caller's atomic
/// unit. Safe to re-run: the ledger reversal skips already-deleted entries,
/// but callers are expected to guard with a status check so quota is not
/// restored twice.
pub fn compensate(
    tx: &mut dyn StoreTx,
    transaction: &Transaction,
    policy: RefundPolicy,
    now: DateTime<Utc>,
) -> Result<(), AppError> {
    let mut event = tx
        .event(transaction.event_id)
        .ok_or(AppError::EventNotFound)?;
    event.quota += transaction.quantity;
    tx.put_event(event);

    let reverted = ledger::reverse(tx, transaction.id, now);

    if let Some(coupon_id) = transaction.used_coupon_id {
        if let Some(mut coupon) = tx.coupon(coupon_id) {
            // Expiry is re-checked at the next use, so clearing the marker
            // cannot resurrect a coupon that has since expired.
            coupon.consumed_at = None;
            tx.put_coupon(coupon);
        }
    }

    if let Some(voucher_id) = transaction.used_voucher_id {
        if let Some(mut voucher) = tx.voucher(voucher_id) {
            voucher.quota += 1;
            tx.put_voucher(voucher);
        }
    }

    if policy == RefundPolicy::StoreCredit && transaction.total_price > 0 {
        ledger::grant(
            tx,
            transaction.user_id,
            transaction.total_price,
            None,
            Some(transaction.id),
            now,
        );
    }

    debug!(
        transaction_id = transaction.id.0,
        quantity = transaction.quantity,
        reverted_point_entries = reverted,
        refund = matches!(policy, RefundPolicy::StoreCredit),
        "compensated transaction resources"
    );
    Ok(())
}
