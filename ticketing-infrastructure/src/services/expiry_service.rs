// Periodic expiry scheduler
//
// One tokio task, one fixed tick. Each pass drives the time-based state
// transitions (expire unpaid, cancel unconfirmed) and the ledger/coupon
// expiry sweeps. Passes re-check eligibility per candidate inside its own
// atomic unit, so overlapping or repeated ticks are safe.

use std::time::Duration;

use chrono::Utc;
use tokio::sync::watch;
use tokio::time::MissedTickBehavior;
use tracing::{debug, info};

use ticketing_application::commands::{
    cancel_unconfirmed_transactions, expire_unpaid_transactions, sweep_expired_coupons,
    sweep_expired_points,
};
use ticketing_application::AppState;

pub async fn run_expiry_scheduler(state: AppState, mut shutdown: watch::Receiver<bool>) {
    let tick = Duration::from_secs(state.config.scheduler_tick_seconds.max(1));
    let mut interval = tokio::time::interval(tick);
    interval.set_missed_tick_behavior(MissedTickBehavior::Delay);
    // the first tick completes immediately; wait a full interval instead
    interval.tick().await;

    info!(tick_seconds = tick.as_secs(), "expiry scheduler started");
    loop {
        tokio::select! {
            _ = interval.tick() => {
                run_expiry_pass(&state).await;
            }
            _ = shutdown.changed() => {
                info!("expiry scheduler stopped");
                break;
            }
        }
    }
}

pub async fn run_expiry_pass(state: &AppState) {
    let now = Utc::now();
    let expired = expire_unpaid_transactions(state, now).await;
    let canceled = cancel_unconfirmed_transactions(state, now).await;
    let stale_grants = sweep_expired_points(state, now).await;
    let stale_coupons = sweep_expired_coupons(state, now).await;
    debug!(
        expired,
        canceled, stale_grants, stale_coupons, "expiry pass finished"
    );
}
