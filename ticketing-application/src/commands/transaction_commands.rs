// Transaction lifecycle commands
//
// Allocation runs as one atomic unit: either the transaction record lands
// with every resource deducted, or nothing is written at all. The quota
// field re-read inside the unit is the sole stock authority; there is no
// parallel aggregate over sold tickets.

use chrono::{DateTime, Utc};
use serde::Serialize;
use tracing::info;

use ticketing_domain::entities::NewTransaction;
use ticketing_domain::services::{compute_discount, ledger, DiscountContext};
use ticketing_domain::value_objects::{
    DiscountSelection, EventId, TransactionId, TransactionStatus, UserId,
};

use crate::commands::compensation::{compensate, RefundPolicy};
use crate::{AppError, AppState};

#[derive(Debug, Clone, Serialize)]
pub struct CreateTransactionOutcome {
    pub transaction_id: TransactionId,
    pub base_price: i64,
    pub total_discount: i64,
    pub final_price: i64,
}

pub async fn create_transaction(
    state: &AppState,
    user_id: UserId,
    event_id: EventId,
    quantity: i64,
    selection: DiscountSelection,
    now: DateTime<Utc>,
) -> Result<CreateTransactionOutcome, AppError> {
    selection.validate().map_err(AppError::BadRequest)?;
    if quantity <= 0 {
        return Err(AppError::BadRequest(format!(
            "quantity must be positive, got {quantity}"
        )));
    }

    let mut tx = state.store.begin().await;

    let event = tx.event(event_id).ok_or(AppError::EventNotFound)?;
    if quantity > event.quota {
        return Err(AppError::InsufficientStock {
            available: event.quota,
        });
    }

    let base_price = event.price * quantity;
    let entries = tx.point_entries_for_user(user_id);
    let available_points = ledger::available_balance(&entries, now);
    let coupon = tx.valid_coupon_for_user(user_id, now);
    let voucher = tx.voucher_for_event(event_id);

    let breakdown = compute_discount(
        &selection,
        &DiscountContext {
            base_price,
            available_points,
            coupon: coupon.as_ref(),
            voucher: voucher.as_ref(),
        },
        now,
    )?;
    let total_discount = breakdown.total(base_price);
    let final_price = breakdown.final_price(base_price);

    // compute_discount already vouched for the records behind these ids
    let used_coupon_id = coupon.filter(|_| selection.use_coupon).map(|c| c.id);
    let used_voucher_id = voucher.as_ref().filter(|_| selection.use_voucher).map(|v| v.id);

    let transaction = tx.insert_transaction(
        NewTransaction {
            user_id,
            event_id,
            quantity,
            total_price: final_price,
            total_discount,
            status: TransactionStatus::WaitingForPayment,
            used_coupon_id,
            used_voucher_id,
        },
        now,
    );

    if breakdown.points > 0 {
        ledger::consume(tx.as_mut(), user_id, breakdown.points, transaction.id, now)?;
    }

    if let Some(coupon_id) = used_coupon_id {
        if let Some(mut coupon) = tx.coupon(coupon_id) {
            coupon.consumed_at = Some(now);
            tx.put_coupon(coupon);
        }
    }

    if selection.use_voucher {
        // recheck at decrement time
        let mut voucher = voucher.ok_or(AppError::VoucherUnavailable)?;
        if voucher.quota <= 0 {
            return Err(AppError::VoucherUnavailable);
        }
        voucher.quota -= 1;
        tx.put_voucher(voucher);
    }

    let mut event = event;
    event.quota -= quantity;
    tx.put_event(event);

    tx.commit();

    info!(
        transaction_id = transaction.id.0,
        user_id = user_id.0,
        event_id = event_id.0,
        quantity,
        base_price,
        total_discount,
        final_price,
        "transaction created, waiting for payment"
    );

    Ok(CreateTransactionOutcome {
        transaction_id: transaction.id,
        base_price,
        total_discount,
        final_price,
    })
}

/// Customer hands in a payment proof reference, moving the transaction to
/// WaitingForAdminConfirmation. Lookups are scoped to the owning user.
pub async fn submit_payment_proof(
    state: &AppState,
    transaction_id: TransactionId,
    user_id: UserId,
    proof_ref: &str,
    now: DateTime<Utc>,
) -> Result<(), AppError> {
    if proof_ref.trim().is_empty() {
        return Err(AppError::BadRequest("payment proof reference is required".to_string()));
    }

    let mut tx = state.store.begin().await;
    let mut transaction = tx
        .transaction(transaction_id)
        .filter(|t| t.user_id == user_id)
        .ok_or(AppError::TransactionNotFound)?;
    transaction
        .transition_to(TransactionStatus::WaitingForAdminConfirmation, now)
        .map_err(AppError::invalid_status)?;
    transaction.payment_proof = Some(proof_ref.trim().to_string());
    tx.put_transaction(transaction);
    tx.commit();

    info!(
        transaction_id = transaction_id.0,
        user_id = user_id.0,
        "payment proof submitted, waiting for admin confirmation"
    );
    Ok(())
}

/// Organizer accepts a paid transaction. Terminal; no compensation.
pub async fn accept_transaction(
    state: &AppState,
    transaction_id: TransactionId,
    organizer_id: UserId,
    now: DateTime<Utc>,
) -> Result<(), AppError> {
    let mut tx = state.store.begin().await;
    let mut transaction = tx
        .transaction(transaction_id)
        .ok_or(AppError::TransactionNotFound)?;
    let event = tx
        .event(transaction.event_id)
        .ok_or(AppError::EventNotFound)?;
    if event.owner_id != organizer_id {
        return Err(AppError::Unauthorized);
    }
    transaction
        .transition_to(TransactionStatus::Done, now)
        .map_err(AppError::invalid_status)?;
    tx.put_transaction(transaction);
    tx.commit();

    info!(transaction_id = transaction_id.0, "transaction accepted");
    Ok(())
}

/// Organizer rejects a paid transaction: resources roll back, money is
/// assumed to be refunded out of band, so no point grant here.
pub async fn reject_transaction(
    state: &AppState,
    transaction_id: TransactionId,
    organizer_id: UserId,
    now: DateTime<Utc>,
) -> Result<(), AppError> {
    let mut tx = state.store.begin().await;
    let mut transaction = tx
        .transaction(transaction_id)
        .ok_or(AppError::TransactionNotFound)?;
    let event = tx
        .event(transaction.event_id)
        .ok_or(AppError::EventNotFound)?;
    if event.owner_id != organizer_id {
        return Err(AppError::Unauthorized);
    }
    transaction
        .transition_to(TransactionStatus::Rejected, now)
        .map_err(AppError::invalid_status)?;
    compensate(tx.as_mut(), &transaction, RefundPolicy::None, now)?;
    tx.put_transaction(transaction);
    tx.commit();

    info!(transaction_id = transaction_id.0, "transaction rejected, resources rolled back");
    Ok(())
}
