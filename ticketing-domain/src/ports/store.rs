// Transactional store port
//
// Every mutating command runs inside one atomic unit obtained from
// `Store::begin`. Units are isolated from one another; a unit that is
// dropped without `commit` applies nothing. The backend is free to realize
// this with database transactions and row locks or with an in-process lock,
// as long as conflicting units are serialized.

use async_trait::async_trait;
use chrono::{DateTime, Utc};

use crate::entities::{
    Coupon, Event, NewCoupon, NewEvent, NewPointEntry, NewTransaction, NewVoucher, PointEntry,
    Transaction, Voucher,
};
use crate::value_objects::{
    CouponId, EventId, TransactionId, TransactionStatus, UserId, VoucherId,
};

#[async_trait]
pub trait Store: Send + Sync {
    /// Begin an atomic unit. Blocks until any conflicting unit finishes.
    async fn begin(&self) -> Box<dyn StoreTx>;
}

/// One atomic unit of reads and writes. All methods are synchronous: a unit
/// is a bounded sequence of storage operations, never held across user
/// think-time.
pub trait StoreTx: Send {
    // Events
    fn event(&self, id: EventId) -> Option<Event>;
    fn insert_event(&mut self, event: NewEvent) -> Event;
    fn put_event(&mut self, event: Event);

    // Coupons
    fn coupon(&self, id: CouponId) -> Option<Coupon>;
    /// The user's usable coupon, if any: not consumed, not removed, not past
    /// expiry.
    fn valid_coupon_for_user(&self, user_id: UserId, now: DateTime<Utc>) -> Option<Coupon>;
    /// Coupons past their expiry that the sweep has not yet marked removed.
    fn expired_unmarked_coupons(&self, now: DateTime<Utc>) -> Vec<Coupon>;
    fn insert_coupon(&mut self, coupon: NewCoupon) -> Coupon;
    fn put_coupon(&mut self, coupon: Coupon);

    // Vouchers
    fn voucher(&self, id: VoucherId) -> Option<Voucher>;
    /// The voucher attached to an event (an event carries at most one).
    fn voucher_for_event(&self, event_id: EventId) -> Option<Voucher>;
    fn insert_voucher(&mut self, voucher: NewVoucher) -> Voucher;
    fn put_voucher(&mut self, voucher: Voucher);

    // Point ledger
    /// Every entry of a user, deleted or not; ledger arithmetic filters.
    fn point_entries_for_user(&self, user_id: UserId) -> Vec<PointEntry>;
    /// Non-deleted consumption entries tagged with this transaction.
    fn consumptions_for_transaction(&self, id: TransactionId) -> Vec<PointEntry>;
    /// Non-deleted grants whose expiry has passed, for the expiry sweep.
    fn expired_unmarked_grants(&self, now: DateTime<Utc>) -> Vec<PointEntry>;
    fn insert_point_entry(&mut self, entry: NewPointEntry, now: DateTime<Utc>) -> PointEntry;
    fn put_point_entry(&mut self, entry: PointEntry);

    // Transactions
    fn transaction(&self, id: TransactionId) -> Option<Transaction>;
    fn transactions_in_status(&self, status: TransactionStatus) -> Vec<Transaction>;
    fn insert_transaction(&mut self, transaction: NewTransaction, now: DateTime<Utc>)
        -> Transaction;
    fn put_transaction(&mut self, transaction: Transaction);

    /// Apply every write performed in this unit. Consumes the unit; without
    /// this call, the unit is discarded on drop.
    fn commit(self: Box<Self>);
}
