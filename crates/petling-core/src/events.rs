use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::pet::{ActionKind, NeedsVector, PetState};

/// What ended a sleep.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum WakeCause {
    /// The randomized auto-wake deadline passed.
    Auto,
    /// A gated action was applied while sleeping.
    Manual,
}

/// Every observable state change produces an Event.
/// Frontends (UI, audio cues) consume these; the CLI prints them as JSON.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(tag = "type")]
pub enum Event {
    /// The pet fell asleep after idling; `wake_at` is the drawn auto-wake time.
    FellAsleep {
        wake_at: DateTime<Utc>,
        at: DateTime<Utc>,
    },
    /// The pet entered AWAKE.
    Woke {
        cause: WakeCause,
        at: DateTime<Utc>,
    },
    /// A gated action was admitted and applied.
    ActionApplied {
        kind: ActionKind,
        needs: NeedsVector,
        state: PetState,
        at: DateTime<Utc>,
    },
    /// The active-minute budget was crossed and a cooldown began.
    QuietStarted {
        until: DateTime<Utc>,
        active_minutes: usize,
        at: DateTime<Utc>,
    },
    /// An expired cooldown deadline was observed and cleared.
    QuietEnded {
        at: DateTime<Utc>,
    },
    /// Full state snapshot for polling frontends.
    StateSnapshot {
        state: PetState,
        needs: NeedsVector,
        idle_ms: u64,
        quiet_active: bool,
        quiet_remaining_ms: u64,
        at: DateTime<Utc>,
    },
}
