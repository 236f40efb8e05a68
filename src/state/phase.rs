//! Signal phases and their fixed schedule

use std::{fmt, time::Duration};
use serde::{Deserialize, Serialize};

/// One of the three lamps of the light
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Phase {
    #[default]
    Red,
    Green,
    Yellow,
}

/// Static schedule entry for a phase
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PhaseConfig {
    /// How long the phase stays lit
    pub duration: Duration,
    /// Phase that follows once the duration has elapsed
    pub next: Phase,
}

impl Phase {
    /// All phases in lamp order, top to bottom
    pub const ALL: [Phase; 3] = [Phase::Red, Phase::Yellow, Phase::Green];

    /// Schedule entry for this phase
    pub const fn config(self) -> PhaseConfig {
        match self {
            Phase::Red => PhaseConfig {
                duration: Duration::from_millis(5000),
                next: Phase::Green,
            },
            Phase::Green => PhaseConfig {
                duration: Duration::from_millis(4000),
                next: Phase::Yellow,
            },
            Phase::Yellow => PhaseConfig {
                duration: Duration::from_millis(2000),
                next: Phase::Red,
            },
        }
    }

    pub const fn duration(self) -> Duration {
        self.config().duration
    }

    pub const fn next(self) -> Phase {
        self.config().next
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Phase::Red => "red",
            Phase::Green => "green",
            Phase::Yellow => "yellow",
        }
    }
}

impl fmt::Display for Phase {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}
