// Read-side lookups for the checkout surface: what a transaction looks like
// and which discounts the customer could still apply to this event.

use chrono::{DateTime, Utc};
use serde::Serialize;

use ticketing_domain::entities::{Coupon, Event, Transaction, Voucher};
use ticketing_domain::services::ledger;
use ticketing_domain::value_objects::{TransactionId, UserId};

use crate::{AppError, AppState};

#[derive(Debug, Clone, Serialize)]
pub struct AvailablePoints {
    pub available: i64,
    /// Points usable against this transaction, capped by what is owed.
    pub max_usage: i64,
}

#[derive(Debug, Clone, Serialize)]
pub struct AvailableDiscounts {
    pub points: AvailablePoints,
    pub coupon: Option<Coupon>,
    pub voucher: Option<Voucher>,
}

#[derive(Debug, Clone, Serialize)]
pub struct TransactionDetails {
    pub transaction: Transaction,
    pub event: Event,
    pub available_discounts: AvailableDiscounts,
}

/// Transaction details scoped to the owning user.
pub async fn transaction_details(
    state: &AppState,
    user_id: UserId,
    transaction_id: TransactionId,
    now: DateTime<Utc>,
) -> Result<TransactionDetails, AppError> {
    let tx = state.store.begin().await;
    let transaction = tx
        .transaction(transaction_id)
        .filter(|t| t.user_id == user_id)
        .ok_or(AppError::TransactionNotFound)?;
    let event = tx
        .event(transaction.event_id)
        .ok_or(AppError::EventNotFound)?;

    let entries = tx.point_entries_for_user(user_id);
    let available = ledger::available_balance(&entries, now);
    let coupon = tx.valid_coupon_for_user(user_id, now);
    let voucher = tx
        .voucher_for_event(event.id)
        .filter(|voucher| voucher.is_valid(now));

    Ok(TransactionDetails {
        available_discounts: AvailableDiscounts {
            points: AvailablePoints {
                available,
                max_usage: available.min(transaction.total_price).max(0),
            },
            coupon,
            voucher,
        },
        transaction,
        event,
    })
}

/// A user's current available point balance.
pub async fn points_balance(state: &AppState, user_id: UserId, now: DateTime<Utc>) -> i64 {
    let tx = state.store.begin().await;
    let entries = tx.point_entries_for_user(user_id);
    ledger::available_balance(&entries, now)
}
