// In-memory transactional store
//
// Backs the `Store` port with a single async mutex over the whole dataset:
// `begin` takes the lock and clones the state, writes hit the clone, and
// `commit` swaps the clone back in while still holding the lock. That gives
// every unit full isolation and all-or-nothing semantics, and serializes
// conflicting units exactly as row-level locking would.

use std::collections::BTreeMap;
use std::sync::Arc;

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use tokio::sync::{Mutex, OwnedMutexGuard};

use ticketing_domain::entities::{
    Coupon, Event, NewCoupon, NewEvent, NewPointEntry, NewTransaction, NewVoucher, PointEntry,
    Transaction, Voucher,
};
use ticketing_domain::ports::{Store, StoreTx};
use ticketing_domain::value_objects::{
    CouponId, EventId, PointEntryId, TransactionId, TransactionStatus, UserId, VoucherId,
};

#[derive(Debug, Clone, Default)]
struct StoreState {
    events: BTreeMap<i64, Event>,
    coupons: BTreeMap<i64, Coupon>,
    vouchers: BTreeMap<i64, Voucher>,
    point_entries: BTreeMap<i64, PointEntry>,
    transactions: BTreeMap<i64, Transaction>,
    last_id: i64,
}

impl StoreState {
    fn next_id(&mut self) -> i64 {
        self.last_id += 1;
        self.last_id
    }
}

pub struct MemoryStore {
    state: Arc<Mutex<StoreState>>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self {
            state: Arc::new(Mutex::new(StoreState::default())),
        }
    }
}

impl Default for MemoryStore {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl Store for MemoryStore {
    async fn begin(&self) -> Box<dyn StoreTx> {
        let guard = Arc::clone(&self.state).lock_owned().await;
        let work = guard.clone();
        Box::new(MemoryTx { guard, work })
    }
}

struct MemoryTx {
    guard: OwnedMutexGuard<StoreState>,
    work: StoreState,
}

impl StoreTx for MemoryTx {
    fn event(&self, id: EventId) -> Option<Event> {
        self.work.events.get(&id.0).cloned()
    }

    fn insert_event(&mut self, event: NewEvent) -> Event {
        let id = EventId(self.work.next_id());
        let event = Event {
            id,
            name: event.name,
            price: event.price,
            quota: event.quota,
            owner_id: event.owner_id,
        };
        self.work.events.insert(id.0, event.clone());
        event
    }

    fn put_event(&mut self, event: Event) {
        self.work.events.insert(event.id.0, event);
    }

    fn coupon(&self, id: CouponId) -> Option<Coupon> {
        self.work.coupons.get(&id.0).cloned()
    }

    fn valid_coupon_for_user(&self, user_id: UserId, now: DateTime<Utc>) -> Option<Coupon> {
        self.work
            .coupons
            .values()
            .find(|coupon| coupon.user_id == user_id && coupon.is_valid(now))
            .cloned()
    }

    fn expired_unmarked_coupons(&self, now: DateTime<Utc>) -> Vec<Coupon> {
        self.work
            .coupons
            .values()
            .filter(|coupon| coupon.deleted_at.is_none() && coupon.expired_at <= now)
            .cloned()
            .collect()
    }

    fn insert_coupon(&mut self, coupon: NewCoupon) -> Coupon {
        let id = CouponId(self.work.next_id());
        let coupon = Coupon {
            id,
            user_id: coupon.user_id,
            nominal: coupon.nominal,
            expired_at: coupon.expired_at,
            consumed_at: None,
            deleted_at: None,
        };
        self.work.coupons.insert(id.0, coupon.clone());
        coupon
    }

    fn put_coupon(&mut self, coupon: Coupon) {
        self.work.coupons.insert(coupon.id.0, coupon);
    }

    fn voucher(&self, id: VoucherId) -> Option<Voucher> {
        self.work.vouchers.get(&id.0).cloned()
    }

    fn voucher_for_event(&self, event_id: EventId) -> Option<Voucher> {
        self.work
            .vouchers
            .values()
            .find(|voucher| voucher.event_id == event_id && voucher.deleted_at.is_none())
            .cloned()
    }

    fn insert_voucher(&mut self, voucher: NewVoucher) -> Voucher {
        let id = VoucherId(self.work.next_id());
        let voucher = Voucher {
            id,
            event_id: voucher.event_id,
            nominal: voucher.nominal,
            quota: voucher.quota,
            start_date: voucher.start_date,
            end_date: voucher.end_date,
            deleted_at: None,
        };
        self.work.vouchers.insert(id.0, voucher.clone());
        voucher
    }

    fn put_voucher(&mut self, voucher: Voucher) {
        self.work.vouchers.insert(voucher.id.0, voucher);
    }

    fn point_entries_for_user(&self, user_id: UserId) -> Vec<PointEntry> {
        self.work
            .point_entries
            .values()
            .filter(|entry| entry.user_id == user_id)
            .cloned()
            .collect()
    }

    fn consumptions_for_transaction(&self, id: TransactionId) -> Vec<PointEntry> {
        self.work
            .point_entries
            .values()
            .filter(|entry| {
                entry.transaction_id == Some(id)
                    && entry.is_consumption()
                    && entry.deleted_at.is_none()
            })
            .cloned()
            .collect()
    }

    fn expired_unmarked_grants(&self, now: DateTime<Utc>) -> Vec<PointEntry> {
        self.work
            .point_entries
            .values()
            .filter(|entry| {
                entry.is_grant()
                    && entry.deleted_at.is_none()
                    && entry.expired_at.is_some_and(|at| at <= now)
            })
            .cloned()
            .collect()
    }

    fn insert_point_entry(&mut self, entry: NewPointEntry, now: DateTime<Utc>) -> PointEntry {
        let id = PointEntryId(self.work.next_id());
        let entry = PointEntry {
            id,
            user_id: entry.user_id,
            amount: entry.amount,
            expired_at: entry.expired_at,
            created_at: now,
            deleted_at: None,
            original_entry_id: entry.original_entry_id,
            transaction_id: entry.transaction_id,
        };
        self.work.point_entries.insert(id.0, entry.clone());
        entry
    }

    fn put_point_entry(&mut self, entry: PointEntry) {
        self.work.point_entries.insert(entry.id.0, entry);
    }

    fn transaction(&self, id: TransactionId) -> Option<Transaction> {
        self.work.transactions.get(&id.0).cloned()
    }

    fn transactions_in_status(&self, status: TransactionStatus) -> Vec<Transaction> {
        self.work
            .transactions
            .values()
            .filter(|transaction| transaction.status == status)
            .cloned()
            .collect()
    }

    fn insert_transaction(
        &mut self,
        transaction: NewTransaction,
        now: DateTime<Utc>,
    ) -> Transaction {
        let id = TransactionId(self.work.next_id());
        let transaction = Transaction {
            id,
            user_id: transaction.user_id,
            event_id: transaction.event_id,
            quantity: transaction.quantity,
            total_price: transaction.total_price,
            total_discount: transaction.total_discount,
            status: transaction.status,
            used_coupon_id: transaction.used_coupon_id,
            used_voucher_id: transaction.used_voucher_id,
            payment_proof: None,
            created_at: now,
            updated_at: now,
        };
        self.work.transactions.insert(id.0, transaction.clone());
        transaction
    }

    fn put_transaction(&mut self, transaction: Transaction) {
        self.work.transactions.insert(transaction.id.0, transaction);
    }

    fn commit(mut self: Box<Self>) {
        *self.guard = std::mem::take(&mut self.work);
    }
}
