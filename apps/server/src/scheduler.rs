//! Background scheduler for periodic metrics sync.

use std::sync::Arc;

use tokio::time::{interval, Duration};
use tracing::{info, warn};

use adpulse_core::sync::{SyncOptions, SyncServiceTrait, SyncSummary};

use crate::main_lib::AppState;

/// Initial delay before the first sweep, letting the server finish
/// starting up.
const INITIAL_DELAY_SECS: u64 = 60;

/// Starts the background sync scheduler.
pub fn start_sync_scheduler(state: Arc<AppState>) {
    tokio::spawn(async move {
        info!(
            "Sync scheduler started ({}s interval)",
            state.sync_interval_secs
        );

        tokio::time::sleep(Duration::from_secs(INITIAL_DELAY_SECS)).await;

        let mut sync_interval = interval(Duration::from_secs(state.sync_interval_secs));
        loop {
            sync_interval.tick().await;
            run_scheduled_sync(&state).await;
        }
    });
}

async fn run_scheduled_sync(state: &Arc<AppState>) {
    info!("Running scheduled metrics sync...");
    let options = SyncOptions {
        days_back: state.sync_days_back,
        ..Default::default()
    };
    match state.sync_service.sync_all_companies(&options).await {
        Ok(results) => {
            let summary = SyncSummary::from_results(&results);
            info!(
                "Scheduled sync completed: {}/{} connections healthy, {} campaigns, {} metrics",
                summary.successful, summary.total, summary.total_campaigns, summary.total_metrics
            );
        }
        Err(e) => warn!("Scheduled sync failed: {}", e),
    }
}
