// Shared fixtures for the engine integration tests.

use std::sync::Arc;

use chrono::{DateTime, Duration, Utc};

use ticketing_application::AppState;
use ticketing_domain::entities::{Coupon, Event, NewCoupon, NewEvent, NewVoucher, PointEntry, Transaction, Voucher};
use ticketing_domain::services::ledger;
use ticketing_domain::value_objects::{EventId, TransactionId, UserId};
use ticketing_domain::RuntimeConfig;
use ticketing_infrastructure::MemoryStore;

pub const CUSTOMER: UserId = UserId(100);
pub const ORGANIZER: UserId = UserId(200);

pub fn test_state() -> AppState {
    AppState {
        config: RuntimeConfig::default(),
        store: Arc::new(MemoryStore::new()),
    }
}

pub async fn seed_event(state: &AppState, price: i64, quota: i64) -> Event {
    let mut tx = state.store.begin().await;
    let event = tx.insert_event(NewEvent {
        name: "Test Event".to_string(),
        price,
        quota,
        owner_id: ORGANIZER,
    });
    tx.commit();
    event
}

pub async fn seed_coupon(state: &AppState, user_id: UserId, nominal: i64, now: DateTime<Utc>) -> Coupon {
    let mut tx = state.store.begin().await;
    let coupon = tx.insert_coupon(NewCoupon {
        user_id,
        nominal,
        expired_at: now + Duration::days(30),
    });
    tx.commit();
    coupon
}

pub async fn seed_voucher(
    state: &AppState,
    event_id: EventId,
    nominal: i64,
    quota: i64,
    now: DateTime<Utc>,
) -> Voucher {
    let mut tx = state.store.begin().await;
    let voucher = tx.insert_voucher(NewVoucher {
        event_id,
        nominal,
        quota,
        start_date: now - Duration::days(1),
        end_date: now + Duration::days(30),
    });
    tx.commit();
    voucher
}

pub async fn seed_grant(
    state: &AppState,
    user_id: UserId,
    amount: i64,
    expired_at: Option<DateTime<Utc>>,
    now: DateTime<Utc>,
) -> PointEntry {
    let mut tx = state.store.begin().await;
    let entry = ledger::grant(tx.as_mut(), user_id, amount, expired_at, None, now);
    tx.commit();
    entry
}

pub async fn get_event(state: &AppState, id: EventId) -> Event {
    let tx = state.store.begin().await;
    tx.event(id).expect("event exists")
}

pub async fn get_transaction(state: &AppState, id: TransactionId) -> Transaction {
    let tx = state.store.begin().await;
    tx.transaction(id).expect("transaction exists")
}

pub async fn point_entries(state: &AppState, user_id: UserId) -> Vec<PointEntry> {
    let tx = state.store.begin().await;
    tx.point_entries_for_user(user_id)
}

pub async fn balance(state: &AppState, user_id: UserId, now: DateTime<Utc>) -> i64 {
    let entries = point_entries(state, user_id).await;
    ledger::available_balance(&entries, now)
}
