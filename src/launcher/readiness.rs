//! Manifest readiness polling

use std::path::Path;
use std::time::Duration;

use tokio::time::{interval, MissedTickBehavior};

use crate::session::config::MIN_INTERVAL;

/// Poll for `manifest` until it exists
///
/// Checks immediately, then every `poll_interval`, for at most `attempts`
/// checks in total. Returns `true` on the first sighting and `false` once the
/// budget is exhausted.
pub async fn wait_for_manifest(manifest: &Path, poll_interval: Duration, attempts: u32) -> bool {
    let mut ticker = interval(poll_interval.max(MIN_INTERVAL));
    ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);

    for attempt in 0..attempts.max(1) {
        ticker.tick().await;

        if tokio::fs::try_exists(manifest).await.unwrap_or(false) {
            tracing::debug!(
                manifest = %manifest.display(),
                attempt = attempt + 1,
                "Manifest ready"
            );
            return true;
        }
    }

    // One last look so a manifest written during the final interval counts
    tokio::fs::try_exists(manifest).await.unwrap_or(false)
}
