use anyhow::Result;
use tokio::sync::watch;
use tracing::info;

use ticketing_infrastructure::run_expiry_scheduler;

use crate::context::AppContext;

/// Run the engine until a shutdown signal arrives. The scheduler task gets
/// its own shutdown channel so it always winds down before the process
/// exits.
pub async fn run_standalone() -> Result<()> {
    let context = AppContext::new().await?;
    let state = context.state;

    let (shutdown_tx, shutdown_rx) = watch::channel(false);
    let scheduler = tokio::spawn(run_expiry_scheduler(state.clone(), shutdown_rx));

    info!(
        payment_window_minutes = state.config.payment_window_minutes,
        confirmation_window_hours = state.config.confirmation_window_hours,
        "ticketing engine running"
    );

    shutdown_signal().await;
    info!("shutdown signal received");

    let _ = shutdown_tx.send(true);
    let _ = scheduler.await;
    Ok(())
}

async fn shutdown_signal() {
    let ctrl_c = async {
        let _ = tokio::signal::ctrl_c().await;
    };

    #[cfg(unix)]
    let terminate = async {
        use tokio::signal::unix::{signal, SignalKind};
        let mut sigterm = signal(SignalKind::terminate()).expect("sigterm handler");
        sigterm.recv().await;
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {},
        _ = terminate => {},
    }
}
