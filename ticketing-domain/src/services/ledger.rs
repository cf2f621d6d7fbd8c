// Points ledger
//
// The ledger is append-only: consuming points never rewrites a grant, it
// appends negative entries that each reference the grant they draw from.
// Reversal soft-deletes those consumption entries, which restores every
// touched grant's computed remaining balance exactly, no matter how many
// partial consumptions hit the same grant.

use chrono::{DateTime, Utc};
use thiserror::Error;

use crate::entities::{NewPointEntry, PointEntry};
use crate::ports::StoreTx;
use crate::value_objects::{PointEntryId, TransactionId, UserId};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
pub enum LedgerError {
    #[error("not enough points: requested {requested}, available {available}")]
    InsufficientPoints { requested: i64, available: i64 },
}

/// Sum of signed amounts over live entries.
pub fn available_balance(entries: &[PointEntry], now: DateTime<Utc>) -> i64 {
    entries
        .iter()
        .filter(|entry| entry.is_live(now))
        .map(|entry| entry.amount)
        .sum()
}

/// What a grant has left after all live consumptions drawn from it.
pub fn remaining_of_grant(grant: &PointEntry, entries: &[PointEntry]) -> i64 {
    let consumed: i64 = entries
        .iter()
        .filter(|entry| {
            entry.is_consumption()
                && entry.deleted_at.is_none()
                && entry.original_entry_id == Some(grant.id)
        })
        .map(|entry| entry.amount.abs())
        .sum();
    grant.amount - consumed
}

/// One planned draw against a specific grant.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ConsumptionDraw {
    pub grant_id: PointEntryId,
    pub amount: i64,
}

/// Plan how `amount` points are taken from a user's grants.
///
/// Candidates are live grants with remaining balance, soonest-expiring
/// first, then non-expiring grants oldest first. That order burns balance
/// that would otherwise be lost to expiry. Planning is pure; the caller
/// applies the draws inside its atomic unit so a later failure discards
/// everything.
pub fn plan_consumption(
    entries: &[PointEntry],
    amount: i64,
    now: DateTime<Utc>,
) -> Result<Vec<ConsumptionDraw>, LedgerError> {
    let mut candidates: Vec<(&PointEntry, i64)> = entries
        .iter()
        .filter(|entry| entry.is_grant() && entry.is_live(now))
        .map(|grant| (grant, remaining_of_grant(grant, entries)))
        .filter(|(_, remaining)| *remaining > 0)
        .collect();
    candidates.sort_by_key(|(grant, _)| match grant.expired_at {
        Some(at) => (0, at, grant.created_at),
        None => (1, DateTime::<Utc>::MAX_UTC, grant.created_at),
    });

    let mut draws = Vec::new();
    let mut still_needed = amount;
    for (grant, remaining) in candidates {
        if still_needed == 0 {
            break;
        }
        let draw = remaining.min(still_needed);
        draws.push(ConsumptionDraw {
            grant_id: grant.id,
            amount: draw,
        });
        still_needed -= draw;
    }

    if still_needed > 0 {
        return Err(LedgerError::InsufficientPoints {
            requested: amount,
            available: amount - still_needed,
        });
    }
    Ok(draws)
}

/// Consume `amount` points for a transaction inside the given atomic unit.
pub fn consume(
    tx: &mut dyn StoreTx,
    user_id: UserId,
    amount: i64,
    transaction_id: TransactionId,
    now: DateTime<Utc>,
) -> Result<(), LedgerError> {
    let entries = tx.point_entries_for_user(user_id);
    let draws = plan_consumption(&entries, amount, now)?;
    for draw in draws {
        tx.insert_point_entry(
            NewPointEntry {
                user_id,
                amount: -draw.amount,
                expired_at: None,
                original_entry_id: Some(draw.grant_id),
                transaction_id: Some(transaction_id),
            },
            now,
        );
    }
    Ok(())
}

/// Soft-delete every consumption entry tagged with the transaction.
/// Idempotent: already-deleted entries are not selected again.
pub fn reverse(tx: &mut dyn StoreTx, transaction_id: TransactionId, now: DateTime<Utc>) -> usize {
    let consumptions = tx.consumptions_for_transaction(transaction_id);
    let reverted = consumptions.len();
    for mut entry in consumptions {
        entry.deleted_at = Some(now);
        tx.put_point_entry(entry);
    }
    reverted
}

/// Append a positive entry. Used by the cancellation refund; the excluded
/// referral flow goes through the same seam.
pub fn grant(
    tx: &mut dyn StoreTx,
    user_id: UserId,
    amount: i64,
    expired_at: Option<DateTime<Utc>>,
    transaction_id: Option<TransactionId>,
    now: DateTime<Utc>,
) -> PointEntry {
    tx.insert_point_entry(
        NewPointEntry {
            user_id,
            amount,
            expired_at,
            original_entry_id: None,
            transaction_id,
        },
        now,
    )
}
