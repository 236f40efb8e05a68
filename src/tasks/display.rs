//! Display background task

use serde::{Deserialize, Serialize};
use tokio::sync::watch;
use tracing::{debug, info};

use crate::state::{Phase, TimerSnapshot};

/// One lamp of the light and whether it is lit
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Lamp {
    pub color: Phase,
    pub lit: bool,
}

/// Lamps top to bottom, with only the current phase lit
pub fn lamps(current: Phase) -> [Lamp; 3] {
    Phase::ALL.map(|color| Lamp {
        color,
        lit: color == current,
    })
}

/// Label of the start/pause button for the given running flag
pub fn button_label(running: bool) -> &'static str {
    if running { "Pause" } else { "Start" }
}

/// Render a snapshot as a single status line, e.g. `RED 4.2s left`
pub fn status_line(snapshot: &TimerSnapshot) -> String {
    let mut line = format!(
        "{} {}s left",
        snapshot.phase.as_str().to_uppercase(),
        snapshot.seconds_left
    );
    if !snapshot.running {
        line.push_str(" (paused)");
    }
    line
}

/// Background task that logs the light as it changes
pub async fn display_task(mut rx: watch::Receiver<TimerSnapshot>) {
    info!("Starting display task");

    let mut shown = rx.borrow_and_update().clone();
    info!("{}", status_line(&shown));

    while rx.changed().await.is_ok() {
        let snapshot = rx.borrow_and_update().clone();

        if snapshot.phase != shown.phase || snapshot.running != shown.running {
            info!("{}", status_line(&snapshot));
        } else if snapshot.seconds_left != shown.seconds_left {
            debug!("{}", status_line(&snapshot));
        }

        shown = snapshot;
    }

    debug!("Display channel closed, stopping display task");
}
