//! Main application state management

use std::{
    sync::{Arc, Mutex},
    time::Instant,
};
use chrono::{DateTime, Utc};
use tokio::sync::watch;
use tracing::{debug, info};

use super::{TickOutcome, TimerSnapshot, TimerState};

/// Main application state that owns the cycle timer
#[derive(Debug)]
pub struct AppState {
    /// The one timer driven by the tick loop and the control endpoints
    pub timer_state: Arc<Mutex<TimerState>>,
    /// Server metadata
    pub start_time: Instant,
    pub port: u16,
    pub host: String,
    /// Last action tracking
    pub last_action: Arc<Mutex<Option<String>>>,
    pub last_action_time: Arc<Mutex<Option<DateTime<Utc>>>>,
    /// Channel for running flag changes, watched by the tick loop
    pub running_tx: watch::Sender<bool>,
    /// Channel for display updates
    pub snapshot_tx: watch::Sender<TimerSnapshot>,
    /// Keep the receivers alive to prevent channel closure
    pub _running_rx: watch::Receiver<bool>,
    pub _snapshot_rx: watch::Receiver<TimerSnapshot>,
}

impl AppState {
    /// Create a new AppState with a paused red light
    pub fn new(port: u16, host: String) -> Self {
        let timer = TimerState::new();
        let (running_tx, running_rx) = watch::channel(timer.is_running());
        let (snapshot_tx, snapshot_rx) = watch::channel(timer.snapshot());

        Self {
            timer_state: Arc::new(Mutex::new(timer)),
            start_time: Instant::now(),
            port,
            host,
            last_action: Arc::new(Mutex::new(None)),
            last_action_time: Arc::new(Mutex::new(None)),
            running_tx,
            snapshot_tx,
            _running_rx: running_rx,
            _snapshot_rx: snapshot_rx,
        }
    }

    /// Apply a control action to the timer and notify watchers
    pub fn update_timer<F>(&self, action: &str, updater: F) -> Result<TimerSnapshot, String>
    where
        F: FnOnce(&mut TimerState),
    {
        let mut timer = self.timer_state.lock()
            .map_err(|e| format!("Failed to lock timer state: {}", e))?;

        updater(&mut *timer);
        let running = timer.is_running();
        let snapshot = timer.snapshot();
        drop(timer); // Release the lock early

        if let Ok(mut last_action) = self.last_action.lock() {
            *last_action = Some(action.to_string());
        }
        if let Ok(mut last_time) = self.last_action_time.lock() {
            *last_time = Some(Utc::now());
        }

        // send_replace never fails, even with no receivers
        self.running_tx.send_replace(running);
        self.publish(snapshot.clone());

        Ok(snapshot)
    }

    /// Start or pause the timer, whichever it is not doing
    pub fn toggle_running(&self) -> Result<TimerSnapshot, String> {
        let snapshot = self.update_timer("toggle", |timer| timer.toggle_running(now()))?;
        info!("Timer {} on {}", if snapshot.running { "started" } else { "paused" }, snapshot.phase);
        Ok(snapshot)
    }

    /// Start the timer; no effect if already running
    pub fn start(&self) -> Result<TimerSnapshot, String> {
        info!("Starting timer");
        self.update_timer("start", |timer| timer.start(now()))
    }

    /// Pause the timer, keeping the remaining time
    pub fn pause(&self) -> Result<TimerSnapshot, String> {
        info!("Pausing timer");
        self.update_timer("pause", |timer| timer.pause())
    }

    /// Return the timer to a paused red light
    pub fn reset(&self) -> Result<TimerSnapshot, String> {
        info!("Resetting timer");
        self.update_timer("reset", |timer| timer.reset())
    }

    /// Advance the timer to `now` and publish the result
    pub fn tick(&self, now: Instant) -> Result<TickOutcome, String> {
        let mut timer = self.timer_state.lock()
            .map_err(|e| format!("Failed to lock timer state: {}", e))?;

        if !timer.is_running() {
            debug!("Ignoring tick while paused");
            return Ok(timer.tick(now));
        }

        let outcome = timer.tick(now);
        let snapshot = timer.snapshot();
        drop(timer);

        self.publish(snapshot);
        Ok(outcome)
    }

    /// Get current timer state
    pub fn get_timer_state(&self) -> Result<TimerState, String> {
        self.timer_state.lock()
            .map(|state| state.clone())
            .map_err(|e| format!("Failed to lock timer state: {}", e))
    }

    /// Get the display view of the timer
    pub fn get_snapshot(&self) -> Result<TimerSnapshot, String> {
        self.get_timer_state().map(|state| state.snapshot())
    }

    /// Subscribe to running flag changes
    pub fn subscribe_running(&self) -> watch::Receiver<bool> {
        self.running_tx.subscribe()
    }

    /// Subscribe to display updates
    pub fn subscribe_snapshots(&self) -> watch::Receiver<TimerSnapshot> {
        self.snapshot_tx.subscribe()
    }

    /// Calculate server uptime as a formatted string
    pub fn get_uptime(&self) -> String {
        let duration = self.start_time.elapsed();
        let hours = duration.as_secs() / 3600;
        let minutes = (duration.as_secs() % 3600) / 60;
        let seconds = duration.as_secs() % 60;

        if hours > 0 {
            format!("{}h {}m {}s", hours, minutes, seconds)
        } else if minutes > 0 {
            format!("{}m {}s", minutes, seconds)
        } else {
            format!("{}s", seconds)
        }
    }

    /// Get last action information
    pub fn get_last_action(&self) -> (Option<String>, Option<DateTime<Utc>>) {
        let last_action = self.last_action.lock().ok().and_then(|a| a.clone());
        let last_action_time = self.last_action_time.lock().ok().and_then(|t| *t);
        (last_action, last_action_time)
    }

    fn publish(&self, snapshot: TimerSnapshot) {
        let changed = self.snapshot_tx.send_if_modified(|current| {
            if *current == snapshot {
                false
            } else {
                *current = snapshot;
                true
            }
        });
        if !changed {
            debug!("Snapshot unchanged, watchers not notified");
        }
    }
}

/// Current time on the runtime clock, so a paused test clock drives the timer too
pub fn now() -> Instant {
    tokio::time::Instant::now().into_std()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::state::Phase;
    use std::time::Duration;

    fn state() -> AppState {
        AppState::new(0, "127.0.0.1".to_string())
    }

    #[test]
    fn toggle_flips_running_flag_and_notifies() {
        let state = state();
        let running_rx = state.subscribe_running();

        let snapshot = state.toggle_running().unwrap();
        assert!(snapshot.running);
        assert!(*running_rx.borrow());

        let snapshot = state.toggle_running().unwrap();
        assert!(!snapshot.running);
        assert!(!*running_rx.borrow());
        assert_eq!(state.get_last_action().0.as_deref(), Some("toggle"));
    }

    #[test]
    fn tick_publishes_snapshot_while_running() {
        let state = state();
        let mut snapshots = state.subscribe_snapshots();
        state.start().unwrap();
        snapshots.borrow_and_update();

        let started = state.get_timer_state().unwrap().phase_started_at.unwrap();
        let outcome = state.tick(started + Duration::from_millis(5000)).unwrap();
        assert!(outcome.transitioned);
        assert!(snapshots.has_changed().unwrap());
        assert_eq!(snapshots.borrow_and_update().phase, Phase::Green);
    }

    #[test]
    fn tick_after_pause_leaves_state_untouched() {
        let state = state();
        state.start().unwrap();
        state.pause().unwrap();
        let before = state.get_timer_state().unwrap();

        let outcome = state.tick(Instant::now() + Duration::from_secs(60)).unwrap();
        assert!(!outcome.transitioned);
        assert_eq!(state.get_timer_state().unwrap(), before);
    }

    #[test]
    fn reset_returns_defaults() {
        let state = state();
        state.start().unwrap();
        let started = state.get_timer_state().unwrap().phase_started_at.unwrap();
        state.tick(started + Duration::from_millis(5000)).unwrap();

        let snapshot = state.reset().unwrap();
        assert_eq!(snapshot.phase, Phase::Red);
        assert_eq!(snapshot.remaining_ms, 5000.0);
        assert!(!snapshot.running);
        assert_eq!(state.get_timer_state().unwrap(), TimerState::new());
    }

    #[test]
    fn uptime_starts_in_seconds() {
        assert!(state().get_uptime().ends_with('s'));
    }
}
