//! Periodic deletion of expired sessions.
//!
//! Expired sessions are already rejected on every request; this job only
//! keeps the `user_sessions` table from growing without bound.

use std::time::Duration;

use attendft_db::repositories::SessionRepo;
use attendft_db::DbPool;
use tokio_util::sync::CancellationToken;

/// Run the sweep loop every `interval` until `cancel` is triggered.
///
/// The first sweep runs immediately on startup.
pub async fn run(pool: DbPool, interval: Duration, cancel: CancellationToken) {
    tracing::info!(interval_secs = interval.as_secs(), "Session sweep job started");

    let mut ticker = tokio::time::interval(interval);

    loop {
        tokio::select! {
            _ = cancel.cancelled() => {
                tracing::info!("Session sweep job stopping");
                break;
            }
            _ = ticker.tick() => {
                match SessionRepo::delete_expired(&pool).await {
                    Ok(0) => tracing::debug!("Session sweep: nothing expired"),
                    Ok(deleted) => tracing::info!(deleted, "Session sweep: removed expired sessions"),
                    Err(e) => tracing::error!(error = %e, "Session sweep: cleanup failed"),
                }
            }
        }
    }
}
