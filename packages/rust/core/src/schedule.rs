//! Scheduled execution: run a pass, sleep, repeat.
//!
//! The loop runs one pass immediately on startup, then sleeps the
//! configured interval between passes. Passes are strictly sequential;
//! there is no overlap to guard against and no cancellation beyond
//! process termination.

use std::time::Duration;

use tracing::info;

use crate::pipeline::{SyncContext, run_once};

/// Run sync passes forever, `interval_hours` apart.
pub async fn run_forever(ctx: &SyncContext) {
    let interval = Duration::from_secs(ctx.config.schedule.interval_hours * 60 * 60);
    info!(
        interval_hours = ctx.config.schedule.interval_hours,
        "entering scheduled mode"
    );

    loop {
        run_once(ctx).await;
        info!(
            hours = ctx.config.schedule.interval_hours,
            "sleeping until next pass"
        );
        tokio::time::sleep(interval).await;
    }
}
