//! Quiet-time admission control.
//!
//! A rolling-window rate limiter over "active minutes": each wall-clock
//! minute in which at least one gated action was applied counts once,
//! regardless of how many actions landed in it. Crossing the budget within
//! the trailing hour starts a fixed cooldown during which every gated action
//! is blocked.
//!
//! The window and the cooldown deadline live in an injected [`StateStore`];
//! deadlines are plain timestamps cleared lazily on read -- there is no
//! background sweep.

use serde::{Deserialize, Serialize};

use crate::clock::MS_PER_MINUTE;
use crate::error::{CoreError, Result};
use crate::storage::StateStore;

/// Trailing window size, in minutes.
pub const WINDOW_MINUTES: u64 = 60;
/// Distinct active minutes allowed inside the window before a cooldown.
pub const ACTIVE_MINUTE_BUDGET: usize = 40;
/// Cooldown length once the budget is crossed.
pub const COOLDOWN_MS: u64 = 20 * 60 * 1000;

const WINDOW_KEY: &str = "quiet_window";
const DEADLINE_KEY: &str = "quiet_deadline";

/// Result of an admission check.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Admission {
    Admitted,
    Blocked { until_ms: u64 },
}

/// Quiet-time status for presentation collaborators.
#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
pub struct QuietStatus {
    pub active: bool,
    pub remaining_ms: u64,
}

/// Outcome of registering an admitted action.
#[derive(Debug, Clone, Copy)]
pub struct RegisterOutcome {
    /// The cooldown deadline currently in force, if any.
    pub deadline_ms: Option<u64>,
    /// Distinct active minutes in the trailing window, after this action.
    pub active_minutes: usize,
    /// Whether this call crossed the budget and started the cooldown.
    pub started_cooldown: bool,
}

/// Self-pruning set of minute stamps (epoch minutes), ascending.
///
/// Invariant: after `prune(now_minute)` only minutes within the trailing
/// [`WINDOW_MINUTES`]-minute window remain, so the size is bounded by 60.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ActivityWindow {
    minutes: Vec<u64>,
}

impl ActivityWindow {
    /// Drop minutes that fell out of the trailing window.
    pub fn prune(&mut self, now_minute: u64) {
        let cutoff = now_minute.saturating_sub(WINDOW_MINUTES - 1);
        self.minutes.retain(|&m| m >= cutoff);
    }

    /// Count a minute once; repeated actions in the same minute are a no-op.
    pub fn mark(&mut self, minute: u64) {
        if !self.minutes.contains(&minute) {
            self.minutes.push(minute);
            self.minutes.sort_unstable();
        }
    }

    pub fn len(&self) -> usize {
        self.minutes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.minutes.is_empty()
    }

    pub fn contains(&self, minute: u64) -> bool {
        self.minutes.contains(&minute)
    }
}

/// Rolling-window admission gate over an injected durable store.
pub struct QuietTimeGate<S: StateStore> {
    store: S,
}

impl<S: StateStore> QuietTimeGate<S> {
    pub fn new(store: S) -> Self {
        Self { store }
    }

    pub fn store(&self) -> &S {
        &self.store
    }

    /// Record an admitted action at `now_ms` and evaluate the budget.
    ///
    /// Prunes and updates the persisted window, then: crossing the budget
    /// with no live deadline starts a fresh cooldown; an already-running
    /// cooldown is never extended or stacked; an expired one is cleared.
    pub fn register_action(&self, now_ms: u64) -> Result<RegisterOutcome> {
        let now_minute = now_ms / MS_PER_MINUTE;

        let mut window = self.load_window()?;
        window.prune(now_minute);
        window.mark(now_minute);
        self.save_window(&window)?;

        let active_minutes = window.len();
        let mut deadline_ms = self.load_deadline()?;
        let mut started_cooldown = false;

        if active_minutes >= ACTIVE_MINUTE_BUDGET {
            let live = deadline_ms.filter(|&d| now_ms < d);
            if live.is_none() {
                let d = now_ms + COOLDOWN_MS;
                self.save_deadline(d)?;
                deadline_ms = Some(d);
                started_cooldown = true;
            }
        } else if let Some(d) = deadline_ms {
            if now_ms >= d {
                self.clear_deadline()?;
                deadline_ms = None;
            }
        }

        Ok(RegisterOutcome {
            deadline_ms,
            active_minutes,
            started_cooldown,
        })
    }

    /// Check whether a gated action may proceed at `now_ms`.
    ///
    /// Read-only apart from lazy expiry: a deadline observed in the past is
    /// deleted from the store before reporting `Admitted`.
    pub fn check_admission(&self, now_ms: u64) -> Result<Admission> {
        match self.load_deadline()? {
            Some(d) if now_ms < d => Ok(Admission::Blocked { until_ms: d }),
            Some(_) => {
                self.clear_deadline()?;
                Ok(Admission::Admitted)
            }
            None => Ok(Admission::Admitted),
        }
    }

    /// Quiet-time status, with the same lazy expiry as [`check_admission`].
    ///
    /// [`check_admission`]: QuietTimeGate::check_admission
    pub fn status(&self, now_ms: u64) -> Result<QuietStatus> {
        match self.load_deadline()? {
            Some(d) if now_ms < d => Ok(QuietStatus {
                active: true,
                remaining_ms: d - now_ms,
            }),
            Some(_) => {
                self.clear_deadline()?;
                Ok(QuietStatus {
                    active: false,
                    remaining_ms: 0,
                })
            }
            None => Ok(QuietStatus {
                active: false,
                remaining_ms: 0,
            }),
        }
    }

    /// Distinct active minutes in the trailing window as of `now_ms`.
    /// Does not persist the pruned view.
    pub fn active_minutes(&self, now_ms: u64) -> Result<usize> {
        let mut window = self.load_window()?;
        window.prune(now_ms / MS_PER_MINUTE);
        Ok(window.len())
    }

    // ── Persistence ──────────────────────────────────────────────────

    fn load_window(&self) -> Result<ActivityWindow> {
        let raw = self.store.get(WINDOW_KEY).map_err(CoreError::Store)?;
        // Malformed data recovers to an empty window, never an error.
        Ok(raw
            .and_then(|s| serde_json::from_str(&s).ok())
            .unwrap_or_default())
    }

    fn save_window(&self, window: &ActivityWindow) -> Result<()> {
        let raw = serde_json::to_string(window)?;
        self.store.set(WINDOW_KEY, &raw).map_err(CoreError::Store)
    }

    fn load_deadline(&self) -> Result<Option<u64>> {
        let raw = self.store.get(DEADLINE_KEY).map_err(CoreError::Store)?;
        Ok(raw.and_then(|s| s.parse::<u64>().ok()))
    }

    fn save_deadline(&self, deadline_ms: u64) -> Result<()> {
        self.store
            .set(DEADLINE_KEY, &deadline_ms.to_string())
            .map_err(CoreError::Store)
    }

    fn clear_deadline(&self) -> Result<()> {
        self.store.delete(DEADLINE_KEY).map_err(CoreError::Store)
    }
}
