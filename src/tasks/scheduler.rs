//! Tick loop background task
//!
//! The loop sleeps until the timer is started, then drives it once per frame
//! until it is paused or reset. Frames come from a [`FrameScheduler`], so the
//! loop does not care whether they are produced by a tokio interval, a test,
//! or something else.

use std::{future::Future, sync::Arc, time::{Duration, Instant}};
use tokio::time::{interval, Interval, MissedTickBehavior};
use tracing::{debug, error, info, trace};

use crate::state::{app_state::now, AppState};

/// Source of frame timestamps for the tick loop
pub trait FrameScheduler: Send {
    /// Wait for the next frame and return its timestamp.
    ///
    /// Dropping the returned future cancels the pending frame.
    fn next_frame(&mut self) -> impl Future<Output = Instant> + Send;

    /// Called when the loop starts scheduling again after being idle
    fn restart(&mut self) {}
}

/// Frame scheduler backed by a tokio interval
#[derive(Debug)]
pub struct IntervalScheduler {
    interval: Interval,
}

impl IntervalScheduler {
    /// Create a scheduler firing every `period`; late frames are skipped, not bunched up
    pub fn new(period: Duration) -> Self {
        let mut interval = interval(period);
        interval.set_missed_tick_behavior(MissedTickBehavior::Skip);
        Self { interval }
    }
}

impl FrameScheduler for IntervalScheduler {
    fn next_frame(&mut self) -> impl Future<Output = Instant> + Send {
        async move {
            self.interval.tick().await;
            now()
        }
    }

    fn restart(&mut self) {
        self.interval.reset();
    }
}

/// Background task that advances the timer while it is running
pub async fn tick_loop_task<S: FrameScheduler>(state: Arc<AppState>, mut scheduler: S) {
    info!("Starting tick loop task");

    let mut running_rx = state.subscribe_running();

    loop {
        // Wait for the timer to be started
        if let Err(e) = running_rx.wait_for(|running| *running).await {
            error!("Running flag channel closed: {}", e);
            return;
        }

        debug!("Timer running, scheduling frames");
        scheduler.restart();

        loop {
            tokio::select! {
                biased;

                // Pause or reset - stop scheduling
                changed = running_rx.changed() => {
                    if changed.is_err() {
                        error!("Running flag channel closed");
                        return;
                    }
                    if !*running_rx.borrow_and_update() {
                        debug!("Timer stopped, cancelling pending frame");
                        break;
                    }
                }

                frame = scheduler.next_frame() => {
                    match state.tick(frame) {
                        Ok(outcome) if outcome.transitioned => {
                            info!("Light changed to {} for {:?}", outcome.phase, outcome.remaining);
                        }
                        Ok(outcome) => {
                            trace!("Tick: {} {:?} left", outcome.phase, outcome.remaining);
                        }
                        Err(e) => {
                            error!("Failed to tick timer: {}", e);
                        }
                    }
                }
            }
        }
    }
}
