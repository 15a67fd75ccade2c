//! Periodic eviction of abandoned onboarding sessions.
//!
//! A client that opens a session and walks away never sends the closing
//! `DELETE`; this job closes such sessions once they have been idle for the
//! configured timeout.

use std::sync::Arc;
use std::time::Duration;

use tokio::time::MissedTickBehavior;
use tokio_util::sync::CancellationToken;

use crate::sessions::SessionRegistry;

/// Run the idle-session sweep loop until `cancel` is triggered.
///
/// Every `interval`, closes sessions untouched for longer than `idle_timeout`.
/// `interval` must be non-zero.
pub async fn run(
    sessions: Arc<SessionRegistry>,
    idle_timeout: Duration,
    interval: Duration,
    cancel: CancellationToken,
) {
    tracing::info!(
        idle_timeout_secs = idle_timeout.as_secs(),
        interval_secs = interval.as_secs(),
        "Session sweeper started"
    );

    let mut ticker = tokio::time::interval(interval);
    ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);

    loop {
        tokio::select! {
            _ = cancel.cancelled() => {
                tracing::info!("Session sweeper stopping");
                break;
            }
            _ = ticker.tick() => {
                let closed = sessions.sweep_idle(idle_timeout);
                if closed > 0 {
                    tracing::info!(closed, open = sessions.len(), "Closed idle onboarding sessions");
                } else {
                    tracing::debug!(open = sessions.len(), "No idle onboarding sessions");
                }
            }
        }
    }
}
