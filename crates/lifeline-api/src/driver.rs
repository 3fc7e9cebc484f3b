//! Wall-clock driver for the engine's virtual timeline.

use std::time::Duration;

use lifeline_session::application::command_handlers::handle_advance_time;
use lifeline_session::domain::commands::AdvanceTime;
use tokio::task::JoinHandle;
use tokio::time::{Instant, MissedTickBehavior};
use tracing::{info, warn};
use uuid::Uuid;

use crate::state::AppState;

/// Advances the engine by `elapsed_ms` and saves progress if the ledger has
/// unsaved completions.
pub async fn tick(state: &AppState, elapsed_ms: u64) {
    let command = AdvanceTime {
        correlation_id: Uuid::new_v4(),
        elapsed_ms,
    };
    handle_advance_time(&command, &mut state.engine());
    if let Err(error) = state.persist_progress().await {
        warn!(%error, "failed to save progression after tick");
    }
}

/// Spawns a task that feeds real elapsed time into the engine every
/// `interval`.
#[must_use]
pub fn spawn_ticker(state: AppState, interval: Duration) -> JoinHandle<()> {
    info!(?interval, "starting engine ticker");
    tokio::spawn(async move {
        let mut ticker = tokio::time::interval(interval);
        ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);
        let mut last = Instant::now();
        loop {
            ticker.tick().await;
            let now = Instant::now();
            let elapsed_ms = u64::try_from(now.duration_since(last).as_millis()).unwrap_or(u64::MAX);
            last = now;
            tick(&state, elapsed_ms).await;
        }
    })
}
