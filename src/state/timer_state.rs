//! Cycle timer state and its transition logic
//!
//! The timer never reads a clock itself: every operation that needs the
//! current time takes it as an argument, so a caller can drive it from a
//! frame loop, a test, or anything else that produces monotonic instants.

use std::time::{Duration, Instant};
use serde::{Deserialize, Serialize};

use super::Phase;

/// Countdown state for the light
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TimerState {
    pub current_phase: Phase,
    pub remaining: Duration,
    pub running: bool,
    /// When the countdown of the current phase last (re)started
    pub phase_started_at: Option<Instant>,
    /// Remaining time at `phase_started_at`; elapsed time is measured against this
    baseline: Duration,
}

/// Result of a single tick
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TickOutcome {
    pub phase: Phase,
    pub remaining: Duration,
    pub transitioned: bool,
}

/// Display-ready view of the timer
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TimerSnapshot {
    pub phase: Phase,
    pub remaining_ms: f64,
    /// Remaining seconds rounded to one decimal place
    pub seconds_left: String,
    pub running: bool,
}

impl TimerState {
    /// Create a paused timer on red with a full countdown
    pub fn new() -> Self {
        let duration = Phase::Red.duration();
        Self {
            current_phase: Phase::Red,
            remaining: duration,
            running: false,
            phase_started_at: None,
            baseline: duration,
        }
    }

    /// Advance the countdown to `now`.
    ///
    /// At most one transition happens per call no matter how much time has
    /// passed. A timestamp earlier than the phase start counts as zero
    /// elapsed time. Does nothing while paused.
    pub fn tick(&mut self, now: Instant) -> TickOutcome {
        let started_at = match (self.running, self.phase_started_at) {
            (true, Some(started_at)) => started_at,
            _ => return self.outcome(false),
        };

        let elapsed = now.saturating_duration_since(started_at);
        self.remaining = self.baseline.saturating_sub(elapsed);

        if elapsed < self.baseline {
            return self.outcome(false);
        }

        self.current_phase = self.current_phase.next();
        self.remaining = self.current_phase.duration();
        self.baseline = self.remaining;
        self.phase_started_at = Some(now);
        self.outcome(true)
    }

    /// Resume the countdown from whatever time is left
    pub fn start(&mut self, now: Instant) {
        if self.running {
            return;
        }
        self.running = true;
        self.baseline = self.remaining;
        self.phase_started_at = Some(now);
    }

    /// Freeze the countdown, keeping the remaining time
    pub fn pause(&mut self) {
        self.running = false;
        self.phase_started_at = None;
    }

    /// Start when paused, pause when running
    pub fn toggle_running(&mut self, now: Instant) {
        if self.running {
            self.pause();
        } else {
            self.start(now);
        }
    }

    /// Return to a paused red light with a full countdown
    pub fn reset(&mut self) {
        *self = Self::new();
    }

    /// Check if the countdown is advancing
    pub fn is_running(&self) -> bool {
        self.running
    }

    /// Get the display view of the current state
    pub fn snapshot(&self) -> TimerSnapshot {
        TimerSnapshot {
            phase: self.current_phase,
            remaining_ms: self.remaining.as_micros() as f64 / 1000.0,
            seconds_left: format_seconds(self.remaining),
            running: self.running,
        }
    }

    fn outcome(&self, transitioned: bool) -> TickOutcome {
        TickOutcome {
            phase: self.current_phase,
            remaining: self.remaining,
            transitioned,
        }
    }
}

impl Default for TimerState {
    fn default() -> Self {
        Self::new()
    }
}

impl Default for TimerSnapshot {
    fn default() -> Self {
        TimerState::new().snapshot()
    }
}

/// Format a duration as seconds with one decimal, e.g. `4.2`
pub fn format_seconds(remaining: Duration) -> String {
    format!("{:.1}", remaining.as_secs_f64())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn ms(n: u64) -> Duration {
        Duration::from_millis(n)
    }

    #[test]
    fn new_timer_is_paused_on_red() {
        let timer = TimerState::new();
        assert_eq!(timer.current_phase, Phase::Red);
        assert_eq!(timer.remaining, ms(5000));
        assert!(!timer.is_running());
        assert_eq!(timer.phase_started_at, None);
    }

    #[test]
    fn full_cycle_scenario() {
        let t0 = Instant::now();
        let mut timer = TimerState::new();
        timer.start(t0);

        let out = timer.tick(t0 + ms(1000));
        assert_eq!(out, TickOutcome { phase: Phase::Red, remaining: ms(4000), transitioned: false });

        let out = timer.tick(t0 + ms(5000));
        assert_eq!(out, TickOutcome { phase: Phase::Green, remaining: ms(4000), transitioned: true });

        let out = timer.tick(t0 + ms(7000));
        assert_eq!(out, TickOutcome { phase: Phase::Green, remaining: ms(2000), transitioned: false });

        let out = timer.tick(t0 + ms(9000));
        assert_eq!(out, TickOutcome { phase: Phase::Yellow, remaining: ms(2000), transitioned: true });

        let out = timer.tick(t0 + ms(11000));
        assert_eq!(out, TickOutcome { phase: Phase::Red, remaining: ms(5000), transitioned: true });
    }

    #[test]
    fn huge_gap_moves_only_one_phase() {
        let t0 = Instant::now();
        let mut timer = TimerState::new();
        timer.start(t0);

        let out = timer.tick(t0 + ms(100_000));
        assert!(out.transitioned);
        assert_eq!(out.phase, Phase::Green);
        assert_eq!(out.remaining, ms(4000));
    }

    #[test]
    fn three_transitions_return_to_start_phase() {
        let t0 = Instant::now();
        let mut timer = TimerState::new();
        timer.start(t0);

        let mut now = t0;
        let mut transitions = 0;
        while transitions < 3 {
            now += ms(50);
            if timer.tick(now).transitioned {
                transitions += 1;
            }
        }
        assert_eq!(timer.current_phase, Phase::Red);
    }

    #[test]
    fn pause_keeps_remaining_time() {
        let t0 = Instant::now();
        let mut timer = TimerState::new();
        timer.start(t0);
        timer.tick(t0 + ms(2000));
        timer.pause();
        assert_eq!(timer.remaining, ms(3000));

        // ticks while paused are ignored
        let out = timer.tick(t0 + ms(60_000));
        assert!(!out.transitioned);
        assert_eq!(out.remaining, ms(3000));

        let t1 = t0 + ms(30_000);
        timer.start(t1);
        let out = timer.tick(t1);
        assert_eq!(out.phase, Phase::Red);
        assert_eq!(out.remaining, ms(3000));

        let out = timer.tick(t1 + ms(1500));
        assert_eq!(out.remaining, ms(1500));
    }

    #[test]
    fn repeated_resume_does_not_drift() {
        let t0 = Instant::now();
        let mut timer = TimerState::new();
        let mut now = t0;
        for _ in 0..40 {
            timer.start(now);
            now += ms(33);
            timer.tick(now);
            timer.pause();
        }
        assert_eq!(timer.remaining, ms(5000 - 40 * 33));
    }

    #[test]
    fn double_pause_matches_single_pause() {
        let t0 = Instant::now();
        let mut once = TimerState::new();
        once.start(t0);
        once.tick(t0 + ms(1200));
        let mut twice = once.clone();

        once.pause();
        twice.pause();
        twice.pause();
        assert_eq!(once, twice);
    }

    #[test]
    fn start_while_running_keeps_phase_start() {
        let t0 = Instant::now();
        let mut timer = TimerState::new();
        timer.start(t0);
        timer.start(t0 + ms(1000));
        assert_eq!(timer.phase_started_at, Some(t0));
        assert_eq!(timer.tick(t0 + ms(1000)).remaining, ms(4000));
    }

    #[test]
    fn toggle_alternates_start_and_pause() {
        let t0 = Instant::now();
        let mut timer = TimerState::new();
        timer.toggle_running(t0);
        assert!(timer.is_running());
        timer.tick(t0 + ms(500));
        timer.toggle_running(t0 + ms(500));
        assert!(!timer.is_running());
        assert_eq!(timer.remaining, ms(4500));
    }

    #[test]
    fn reset_restores_defaults_from_any_phase() {
        let t0 = Instant::now();
        let mut timer = TimerState::new();
        timer.start(t0);
        timer.tick(t0 + ms(5000));
        timer.tick(t0 + ms(6000));
        assert_eq!(timer.current_phase, Phase::Green);

        timer.reset();
        assert_eq!(timer, TimerState::new());
        assert_eq!(timer.current_phase, Phase::Red);
        assert_eq!(timer.remaining, ms(5000));
        assert!(!timer.running);
    }

    #[test]
    fn earlier_timestamp_counts_as_no_elapsed_time() {
        let t0 = Instant::now();
        let mut timer = TimerState::new();
        timer.start(t0 + ms(1000));
        let out = timer.tick(t0);
        assert!(!out.transitioned);
        assert_eq!(out.remaining, ms(5000));

        let out = timer.tick(t0 + ms(1000));
        assert_eq!(out.remaining, ms(5000));
    }

    #[test]
    fn remaining_never_exceeds_phase_duration() {
        let t0 = Instant::now();
        let mut timer = TimerState::new();
        timer.start(t0);
        let mut now = t0;
        for step in [3u64, 1700, 0, 4999, 12, 8000, 250, 1, 30_000] {
            now += ms(step);
            let out = timer.tick(now);
            assert!(out.remaining <= out.phase.duration());
        }
    }

    #[test]
    fn snapshot_rounds_to_one_decimal() {
        let t0 = Instant::now();
        let mut timer = TimerState::new();
        timer.start(t0);
        timer.tick(t0 + ms(1234));

        let snapshot = timer.snapshot();
        assert_eq!(snapshot.phase, Phase::Red);
        assert_eq!(snapshot.seconds_left, "3.8");
        assert_eq!(snapshot.remaining_ms, 3766.0);
        assert!(snapshot.running);
        assert_eq!(TimerSnapshot::default().seconds_left, "5.0");
    }
}
