// Scheduler passes
//
// Each pass selects stale candidates, then processes every candidate in its
// own atomic unit with a fresh status re-check. A candidate failure is
// logged and left for the next tick (at-least-once); it never aborts the
// rest of the batch and never reaches a user-facing caller.

use chrono::{DateTime, Utc};
use tracing::{error, info};

use ticketing_domain::value_objects::{TransactionId, TransactionStatus};

use crate::commands::compensation::{compensate, RefundPolicy};
use crate::{AppError, AppState};

/// Expire WaitingForPayment transactions older than the payment window that
/// never received a proof. No refund: nothing was paid.
pub async fn expire_unpaid_transactions(state: &AppState, now: DateTime<Utc>) -> usize {
    let cutoff = now - state.config.payment_window();
    let candidates: Vec<TransactionId> = {
        let tx = state.store.begin().await;
        tx.transactions_in_status(TransactionStatus::WaitingForPayment)
            .into_iter()
            .filter(|t| t.payment_proof.is_none() && t.created_at < cutoff)
            .map(|t| t.id)
            .collect()
    };

    let mut expired = 0;
    for id in candidates {
        match expire_one(state, id, cutoff, now).await {
            Ok(true) => expired += 1,
            Ok(false) => {}
            Err(err) => {
                error!(transaction_id = id.0, error = %err, "failed to expire transaction");
            }
        }
    }
    if expired > 0 {
        info!(count = expired, "expired unpaid transactions");
    }
    expired
}

async fn expire_one(
    state: &AppState,
    id: TransactionId,
    cutoff: DateTime<Utc>,
    now: DateTime<Utc>,
) -> Result<bool, AppError> {
    let mut tx = state.store.begin().await;
    let mut transaction = match tx.transaction(id) {
        Some(t) => t,
        None => return Ok(false),
    };
    // A concurrent proof upload or an earlier tick may have moved it on.
    if transaction.payment_proof.is_some() || transaction.created_at >= cutoff {
        return Ok(false);
    }
    if transaction
        .transition_to(TransactionStatus::Expired, now)
        .is_err()
    {
        return Ok(false);
    }

    compensate(tx.as_mut(), &transaction, RefundPolicy::None, now)?;
    tx.put_transaction(transaction);
    tx.commit();
    Ok(true)
}

/// Cancel WaitingForAdminConfirmation transactions the organizer ignored
/// past the confirmation window. The customer already paid, so the rollback
/// comes with a full-value store-credit refund.
pub async fn cancel_unconfirmed_transactions(state: &AppState, now: DateTime<Utc>) -> usize {
    let cutoff = now - state.config.confirmation_window();
    let candidates: Vec<TransactionId> = {
        let tx = state.store.begin().await;
        tx.transactions_in_status(TransactionStatus::WaitingForAdminConfirmation)
            .into_iter()
            .filter(|t| t.updated_at < cutoff)
            .map(|t| t.id)
            .collect()
    };

    let mut canceled = 0;
    for id in candidates {
        match cancel_one(state, id, cutoff, now).await {
            Ok(true) => canceled += 1,
            Ok(false) => {}
            Err(err) => {
                error!(transaction_id = id.0, error = %err, "failed to cancel transaction");
            }
        }
    }
    if canceled > 0 {
        info!(count = canceled, "canceled unconfirmed transactions");
    }
    canceled
}

async fn cancel_one(
    state: &AppState,
    id: TransactionId,
    cutoff: DateTime<Utc>,
    now: DateTime<Utc>,
) -> Result<bool, AppError> {
    let mut tx = state.store.begin().await;
    let mut transaction = match tx.transaction(id) {
        Some(t) => t,
        None => return Ok(false),
    };
    if transaction.updated_at >= cutoff {
        return Ok(false);
    }
    // Only WaitingForAdminConfirmation may move to Canceled; the state
    // machine refuses everything an earlier tick or a user already resolved.
    if transaction
        .transition_to(TransactionStatus::Canceled, now)
        .is_err()
    {
        return Ok(false);
    }

    compensate(tx.as_mut(), &transaction, RefundPolicy::StoreCredit, now)?;
    tx.put_transaction(transaction);
    tx.commit();
    Ok(true)
}

/// Soft-delete point grants whose expiry has passed so they stop counting
/// toward balances.
pub async fn sweep_expired_points(state: &AppState, now: DateTime<Utc>) -> usize {
    let mut tx = state.store.begin().await;
    let stale = tx.expired_unmarked_grants(now);
    let count = stale.len();
    for mut entry in stale {
        entry.deleted_at = Some(now);
        tx.put_point_entry(entry);
    }
    tx.commit();
    if count > 0 {
        info!(count, "marked expired point grants");
    }
    count
}

/// Mark coupons past their expiry as removed. Consumed coupons keep their
/// consumed marker; this only prevents stale unconsumed coupons from being
/// offered again.
pub async fn sweep_expired_coupons(state: &AppState, now: DateTime<Utc>) -> usize {
    let mut tx = state.store.begin().await;
    let stale = tx.expired_unmarked_coupons(now);
    let count = stale.len();
    for mut coupon in stale {
        coupon.deleted_at = Some(now);
        tx.put_coupon(coupon);
    }
    tx.commit();
    if count > 0 {
        info!(count, "marked expired coupons");
    }
    count
}
