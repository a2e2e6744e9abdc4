//! Tick driver background task

use std::{sync::Arc, time::Duration};
use tokio::time::{interval, MissedTickBehavior};
use tracing::{debug, error, info};

use crate::{
    engine::Transition,
    error::Result,
    state::AppState,
    utils::{
        clock::{local_now, EpochMs, LocalTime},
        format_remaining,
    },
};

/// Background task that feeds real elapsed wall-clock time into the engine.
///
/// The delta is measured on the wall clock rather than the interval, so a
/// host suspension shows up as one large delta applied in a single tick.
pub async fn ticker_task(state: Arc<AppState>, tick_every: Duration, suspend_gap: Duration) {
    info!("Starting ticker task (every {}ms)", tick_every.as_millis());

    let suspend_gap_ms = u64::try_from(suspend_gap.as_millis()).unwrap_or(u64::MAX);
    let mut interval = interval(tick_every);
    interval.set_missed_tick_behavior(MissedTickBehavior::Delay);
    let mut last = local_now();

    loop {
        interval.tick().await;

        let now = local_now();
        let delta_ms = elapsed_ms(&last, &now);
        last = now;

        if delta_ms == 0 {
            continue;
        }
        if delta_ms > suspend_gap_ms {
            info!("Wake-up detected after {}, applying catch-up tick", format_remaining(delta_ms));
        }

        match state.tick(delta_ms, &now) {
            Ok(transition) if transition.changed => {
                debug!("Tick of {}ms produced {} event(s)", delta_ms, transition.events.len());
            }
            Ok(_) => {}
            Err(e) => error!("Tick failed: {}", e),
        }
    }
}

/// Apply the time that passed while the process was down
pub fn catch_up_since(state: &AppState, saved_at: EpochMs, now: &LocalTime) -> Result<Transition> {
    let delta_ms = u64::try_from(now.timestamp_millis() - saved_at).unwrap_or(0);
    info!("Catching up {} since last snapshot", format_remaining(delta_ms));
    state.tick(delta_ms, now)
}

/// Milliseconds from `from` to `to`; a clock going backwards yields zero
pub fn elapsed_ms(from: &LocalTime, to: &LocalTime) -> u64 {
    u64::try_from(to.signed_duration_since(*from).num_milliseconds()).unwrap_or(0)
}
