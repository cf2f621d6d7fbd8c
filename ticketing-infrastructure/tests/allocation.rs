// End-to-end allocation and compensation behavior through the application
// commands, backed by the in-memory store.

mod common;

use chrono::Utc;

use common::*;
use ticketing_application::commands::{
    accept_transaction, create_transaction, reject_transaction, submit_payment_proof,
};
use ticketing_application::queries::{points_balance, transaction_details};
use ticketing_application::AppError;
use ticketing_domain::value_objects::{DiscountSelection, TransactionStatus, UserId};

#[tokio::test]
async fn plain_purchase_decrements_quota_and_prices_correctly() {
    let state = test_state();
    let now = Utc::now();
    let event = seed_event(&state, 50_000, 10).await;

    let outcome = create_transaction(&state, CUSTOMER, event.id, 3, DiscountSelection::none(), now)
        .await
        .expect("create");

    assert_eq!(outcome.base_price, 150_000);
    assert_eq!(outcome.total_discount, 0);
    assert_eq!(outcome.final_price, 150_000);
    assert_eq!(get_event(&state, event.id).await.quota, 7);

    let transaction = get_transaction(&state, outcome.transaction_id).await;
    assert_eq!(transaction.status, TransactionStatus::WaitingForPayment);
    assert_eq!(transaction.total_price, 150_000);
    assert_eq!(transaction.quantity, 3);
}

#[tokio::test]
async fn overselling_fails_and_writes_nothing() {
    let state = test_state();
    let now = Utc::now();
    let event = seed_event(&state, 50_000, 2).await;

    let err = create_transaction(&state, CUSTOMER, event.id, 3, DiscountSelection::none(), now)
        .await
        .expect_err("not enough stock");
    assert!(matches!(err, AppError::InsufficientStock { available: 2 }));
    assert_eq!(get_event(&state, event.id).await.quota, 2);
}

#[tokio::test]
async fn unknown_event_and_bad_quantity_are_rejected() {
    let state = test_state();
    let now = Utc::now();
    let event = seed_event(&state, 50_000, 5).await;

    let err = create_transaction(
        &state,
        CUSTOMER,
        ticketing_domain::value_objects::EventId(999),
        1,
        DiscountSelection::none(),
        now,
    )
    .await
    .expect_err("missing event");
    assert!(matches!(err, AppError::EventNotFound));

    let err = create_transaction(&state, CUSTOMER, event.id, 0, DiscountSelection::none(), now)
        .await
        .expect_err("zero quantity");
    assert!(matches!(err, AppError::BadRequest(_)));
}

#[tokio::test]
async fn points_are_consumed_soonest_expiring_first() {
    let state = test_state();
    let now = Utc::now();
    let event = seed_event(&state, 50_000, 10).await;
    let g1 = seed_grant(&state, CUSTOMER, 5_000, Some(now + chrono::Duration::days(2)), now).await;
    let g2 = seed_grant(&state, CUSTOMER, 3_000, None, now).await;

    let selection = DiscountSelection {
        points: Some(6_000),
        ..Default::default()
    };
    let outcome = create_transaction(&state, CUSTOMER, event.id, 1, selection, now)
        .await
        .expect("create");
    assert_eq!(outcome.total_discount, 6_000);
    assert_eq!(outcome.final_price, 44_000);

    let entries = point_entries(&state, CUSTOMER).await;
    let consumptions: Vec<_> = entries.iter().filter(|e| e.is_consumption()).collect();
    assert_eq!(consumptions.len(), 2);
    assert!(consumptions
        .iter()
        .any(|e| e.amount == -5_000 && e.original_entry_id == Some(g1.id)));
    assert!(consumptions
        .iter()
        .any(|e| e.amount == -1_000 && e.original_entry_id == Some(g2.id)));
    assert_eq!(balance(&state, CUSTOMER, now).await, 2_000);
}

#[tokio::test]
async fn points_request_is_capped_by_balance() {
    let state = test_state();
    let now = Utc::now();
    let event = seed_event(&state, 50_000, 10).await;
    seed_grant(&state, CUSTOMER, 2_000, None, now).await;

    let selection = DiscountSelection {
        points: Some(10_000),
        ..Default::default()
    };
    let outcome = create_transaction(&state, CUSTOMER, event.id, 1, selection, now)
        .await
        .expect("create");
    assert_eq!(outcome.total_discount, 2_000);
    assert_eq!(balance(&state, CUSTOMER, now).await, 0);
}

#[tokio::test]
async fn coupon_is_one_shot_until_rolled_back() {
    let state = test_state();
    let now = Utc::now();
    let event = seed_event(&state, 50_000, 10).await;
    seed_coupon(&state, CUSTOMER, 10_000, now).await;

    let selection = DiscountSelection {
        use_coupon: true,
        ..Default::default()
    };
    let outcome = create_transaction(&state, CUSTOMER, event.id, 1, selection.clone(), now)
        .await
        .expect("first use");
    assert_eq!(outcome.total_discount, 10_000);

    let err = create_transaction(&state, CUSTOMER, event.id, 1, selection, now)
        .await
        .expect_err("coupon already consumed");
    assert!(matches!(err, AppError::CouponUnavailable));
}

#[tokio::test]
async fn voucher_with_quota_one_blocks_a_second_transaction() {
    let state = test_state();
    let now = Utc::now();
    let event = seed_event(&state, 50_000, 10).await;
    seed_voucher(&state, event.id, 5_000, 1, now).await;

    let selection = DiscountSelection {
        use_voucher: true,
        ..Default::default()
    };
    create_transaction(&state, CUSTOMER, event.id, 1, selection.clone(), now)
        .await
        .expect("first voucher use");

    // Transaction A is still unresolved; B must not get the voucher.
    let err = create_transaction(&state, UserId(101), event.id, 1, selection, now)
        .await
        .expect_err("voucher exhausted");
    assert!(matches!(err, AppError::VoucherUnavailable));
}

#[tokio::test]
async fn failed_discount_leaves_points_and_quota_untouched() {
    let state = test_state();
    let now = Utc::now();
    let event = seed_event(&state, 50_000, 10).await;
    seed_grant(&state, CUSTOMER, 5_000, None, now).await;

    // Points would be consumed, but the voucher request fails: the whole
    // unit must be discarded.
    let selection = DiscountSelection {
        points: Some(5_000),
        use_voucher: true,
        ..Default::default()
    };
    let err = create_transaction(&state, CUSTOMER, event.id, 1, selection, now)
        .await
        .expect_err("no voucher on this event");
    assert!(matches!(err, AppError::VoucherUnavailable));

    assert_eq!(get_event(&state, event.id).await.quota, 10);
    assert_eq!(balance(&state, CUSTOMER, now).await, 5_000);
    assert_eq!(point_entries(&state, CUSTOMER).await.len(), 1);
}

#[tokio::test]
async fn negative_balance_never_reduces_other_discounts() {
    let state = test_state();
    let t0 = Utc::now();
    let event = seed_event(&state, 50_000, 10).await;
    seed_coupon(&state, CUSTOMER, 10_000, t0).await;
    seed_grant(&state, CUSTOMER, 5_000, Some(t0 + chrono::Duration::days(1)), t0).await;

    let selection = DiscountSelection {
        points: Some(5_000),
        ..Default::default()
    };
    create_transaction(&state, CUSTOMER, event.id, 1, selection, t0)
        .await
        .expect("first purchase");

    // The grant expires while its consumption entries stay live, so the
    // signed balance goes negative.
    let later = t0 + chrono::Duration::days(2);
    assert!(balance(&state, CUSTOMER, later).await < 0);

    let selection = DiscountSelection {
        points: Some(1_000),
        use_coupon: true,
        ..Default::default()
    };
    let outcome = create_transaction(&state, CUSTOMER, event.id, 1, selection, later)
        .await
        .expect("second purchase");
    assert_eq!(outcome.total_discount, 10_000);
    assert_eq!(outcome.final_price, 40_000);
}

#[tokio::test]
async fn stacked_discounts_never_exceed_base_price() {
    let state = test_state();
    let now = Utc::now();
    let event = seed_event(&state, 40_000, 10).await;
    seed_coupon(&state, CUSTOMER, 30_000, now).await;
    seed_voucher(&state, event.id, 25_000, 5, now).await;
    seed_grant(&state, CUSTOMER, 60_000, None, now).await;

    let selection = DiscountSelection {
        points: Some(60_000),
        use_coupon: true,
        use_voucher: true,
    };
    let outcome = create_transaction(&state, CUSTOMER, event.id, 1, selection, now)
        .await
        .expect("create");
    assert_eq!(outcome.base_price, 40_000);
    assert_eq!(outcome.total_discount, 40_000);
    assert_eq!(outcome.final_price, 0);
}

#[tokio::test]
async fn concurrent_purchases_of_the_last_ticket_sell_exactly_one() {
    let state = test_state();
    let now = Utc::now();
    let event = seed_event(&state, 50_000, 1).await;

    let (a, b) = tokio::join!(
        create_transaction(&state, CUSTOMER, event.id, 1, DiscountSelection::none(), now),
        create_transaction(&state, UserId(101), event.id, 1, DiscountSelection::none(), now),
    );

    let successes = [a.is_ok(), b.is_ok()].iter().filter(|ok| **ok).count();
    assert_eq!(successes, 1);
    for result in [a, b] {
        if let Err(err) = result {
            assert!(matches!(err, AppError::InsufficientStock { available: 0 }));
        }
    }
    assert_eq!(get_event(&state, event.id).await.quota, 0);
}

#[tokio::test]
async fn rejecting_a_paid_transaction_restores_everything_without_refund() {
    let state = test_state();
    let now = Utc::now();
    let event = seed_event(&state, 50_000, 10).await;
    let coupon = seed_coupon(&state, CUSTOMER, 10_000, now).await;
    seed_grant(&state, CUSTOMER, 5_000, None, now).await;

    let selection = DiscountSelection {
        points: Some(5_000),
        use_coupon: true,
        ..Default::default()
    };
    let outcome = create_transaction(&state, CUSTOMER, event.id, 2, selection, now)
        .await
        .expect("create");
    assert_eq!(get_event(&state, event.id).await.quota, 8);
    assert_eq!(balance(&state, CUSTOMER, now).await, 0);

    submit_payment_proof(&state, outcome.transaction_id, CUSTOMER, "proof-1", now)
        .await
        .expect("submit proof");
    reject_transaction(&state, outcome.transaction_id, ORGANIZER, now)
        .await
        .expect("reject");

    let transaction = get_transaction(&state, outcome.transaction_id).await;
    assert_eq!(transaction.status, TransactionStatus::Rejected);
    assert_eq!(get_event(&state, event.id).await.quota, 10);
    // Consumptions soft-deleted, coupon marker cleared, and no refund grant.
    assert_eq!(balance(&state, CUSTOMER, now).await, 5_000);
    let entries = point_entries(&state, CUSTOMER).await;
    assert!(entries
        .iter()
        .filter(|e| e.is_consumption())
        .all(|e| e.deleted_at.is_some()));
    assert_eq!(entries.iter().filter(|e| e.is_grant()).count(), 1);

    let tx = state.store.begin().await;
    let coupon = tx.coupon(coupon.id).expect("coupon exists");
    assert!(coupon.consumed_at.is_none());
}

#[tokio::test]
async fn accept_finishes_the_transaction_without_compensation() {
    let state = test_state();
    let now = Utc::now();
    let event = seed_event(&state, 50_000, 10).await;

    let outcome = create_transaction(&state, CUSTOMER, event.id, 2, DiscountSelection::none(), now)
        .await
        .expect("create");
    submit_payment_proof(&state, outcome.transaction_id, CUSTOMER, "proof-1", now)
        .await
        .expect("submit proof");
    accept_transaction(&state, outcome.transaction_id, ORGANIZER, now)
        .await
        .expect("accept");

    let transaction = get_transaction(&state, outcome.transaction_id).await;
    assert_eq!(transaction.status, TransactionStatus::Done);
    // Sold tickets stay sold.
    assert_eq!(get_event(&state, event.id).await.quota, 8);
}

#[tokio::test]
async fn lifecycle_guards_ownership_and_status() {
    let state = test_state();
    let now = Utc::now();
    let event = seed_event(&state, 50_000, 10).await;

    let outcome = create_transaction(&state, CUSTOMER, event.id, 1, DiscountSelection::none(), now)
        .await
        .expect("create");

    // Rejecting before any proof exists is not a legal transition.
    let err = reject_transaction(&state, outcome.transaction_id, ORGANIZER, now)
        .await
        .expect_err("no proof yet");
    assert!(matches!(err, AppError::InvalidStatusForOperation { .. }));

    // Someone else's proof upload must not find the transaction.
    let err = submit_payment_proof(&state, outcome.transaction_id, UserId(101), "proof-x", now)
        .await
        .expect_err("wrong user");
    assert!(matches!(err, AppError::TransactionNotFound));

    submit_payment_proof(&state, outcome.transaction_id, CUSTOMER, "proof-1", now)
        .await
        .expect("submit proof");

    // Repeated upload is rejected by the status re-check.
    let err = submit_payment_proof(&state, outcome.transaction_id, CUSTOMER, "proof-2", now)
        .await
        .expect_err("already submitted");
    assert!(matches!(err, AppError::InvalidStatusForOperation { .. }));

    // A non-owner organizer cannot decide the transaction.
    let err = accept_transaction(&state, outcome.transaction_id, UserId(201), now)
        .await
        .expect_err("not the event owner");
    assert!(matches!(err, AppError::Unauthorized));
}

#[tokio::test]
async fn balance_query_tracks_grants_and_consumptions() {
    let state = test_state();
    let now = Utc::now();
    let event = seed_event(&state, 50_000, 10).await;

    assert_eq!(points_balance(&state, CUSTOMER, now).await, 0);
    seed_grant(&state, CUSTOMER, 8_000, None, now).await;
    assert_eq!(points_balance(&state, CUSTOMER, now).await, 8_000);

    let selection = DiscountSelection {
        points: Some(3_000),
        ..Default::default()
    };
    create_transaction(&state, CUSTOMER, event.id, 1, selection, now)
        .await
        .expect("create");
    assert_eq!(points_balance(&state, CUSTOMER, now).await, 5_000);
}

#[tokio::test]
async fn details_query_reports_available_discounts() {
    let state = test_state();
    let now = Utc::now();
    let event = seed_event(&state, 50_000, 10).await;
    seed_coupon(&state, CUSTOMER, 10_000, now).await;
    seed_voucher(&state, event.id, 5_000, 3, now).await;
    seed_grant(&state, CUSTOMER, 80_000, None, now).await;

    let outcome = create_transaction(&state, CUSTOMER, event.id, 1, DiscountSelection::none(), now)
        .await
        .expect("create");

    let details = transaction_details(&state, CUSTOMER, outcome.transaction_id, now)
        .await
        .expect("details");
    assert_eq!(details.event.id, event.id);
    assert_eq!(details.available_discounts.points.available, 80_000);
    // Max usage is capped by what the transaction still owes.
    assert_eq!(details.available_discounts.points.max_usage, 50_000);
    assert!(details.available_discounts.coupon.is_some());
    assert!(details.available_discounts.voucher.is_some());

    let err = transaction_details(&state, UserId(101), outcome.transaction_id, now)
        .await
        .expect_err("scoped to owner");
    assert!(matches!(err, AppError::TransactionNotFound));
}
