//! Pet lifecycle engine.
//!
//! A wall-clock-based state machine. It does not use internal threads or
//! timers - the caller is responsible for calling `tick()` periodically and
//! `decay_step()` on the decay cadence (see [`DECAY_INTERVAL_MS`]).
//!
//! ## State Transitions
//!
//! ```text
//! Awake -> Drowsy -> Sleeping -> Awake (auto-wake or gated action)
//! ```
//!
//! Idle time drives the forward transitions; wake deadlines are plain
//! timestamps re-evaluated on every tick, never scheduled callbacks.

use rand::prelude::*;
use rand_pcg::Mcg128Xsl64;
use serde::{Deserialize, Serialize};

use super::needs::{ActionKind, NeedsVector};
use crate::clock::to_utc;
use crate::events::{Event, WakeCause};

/// Idle time before an awake pet turns drowsy.
pub const DROWSY_AFTER_MS: u64 = 8 * 60 * 1000;
/// Idle time before the pet falls asleep.
pub const SLEEP_AFTER_MS: u64 = 10 * 60 * 1000;
/// Auto-wake fires between 5 and 12 minutes after falling asleep.
pub const WAKE_DELAY_MIN_MS: u64 = 5 * 60 * 1000;
/// Exclusive upper bound of the auto-wake delay.
pub const WAKE_DELAY_MAX_MS: u64 = 12 * 60 * 1000;
/// Cadence at which `decay_step()` is meant to be driven.
pub const DECAY_INTERVAL_MS: u64 = 15 * 1000;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum PetState {
    Awake,
    Drowsy,
    Sleeping,
}

/// Source of the randomized auto-wake delay.
///
/// Seeded with `Mcg128Xsl64` so tests can pin the draw; the serde-skipped
/// default re-seeds from entropy on restore.
#[derive(Debug, Clone)]
struct WakeJitter {
    rng: Mcg128Xsl64,
}

impl Default for WakeJitter {
    fn default() -> Self {
        Self {
            rng: Mcg128Xsl64::from_entropy(),
        }
    }
}

impl WakeJitter {
    fn seeded(seed: u64) -> Self {
        Self {
            rng: Mcg128Xsl64::seed_from_u64(seed),
        }
    }

    /// Uniform draw from [WAKE_DELAY_MIN_MS, WAKE_DELAY_MAX_MS).
    fn wake_delay_ms(&mut self) -> u64 {
        self.rng.gen_range(WAKE_DELAY_MIN_MS..WAKE_DELAY_MAX_MS)
    }
}

/// Core pet engine.
///
/// Operates on wall-clock timestamps passed in by the caller -- no internal
/// thread, no clock reads. Serializable so a host can persist it between
/// invocations; the wake jitter is re-seeded on restore.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PetEngine {
    state: PetState,
    needs: NeedsVector,
    /// Timestamp (ms since epoch) of the most recent qualifying activity.
    last_activity_ms: u64,
    /// When a sleeping pet will wake on its own (only set while sleeping).
    #[serde(default)]
    wake_deadline_ms: Option<u64>,
    #[serde(skip, default)]
    jitter: WakeJitter,
}

impl PetEngine {
    /// Create a new engine at `now_ms`, awake with full needs.
    pub fn new(now_ms: u64) -> Self {
        Self {
            state: PetState::Awake,
            needs: NeedsVector::default(),
            last_activity_ms: now_ms,
            wake_deadline_ms: None,
            jitter: WakeJitter::default(),
        }
    }

    /// Create an engine with a deterministic auto-wake draw (for tests and
    /// replayable embedders).
    pub fn with_seed(now_ms: u64, seed: u64) -> Self {
        Self {
            jitter: WakeJitter::seeded(seed),
            ..Self::new(now_ms)
        }
    }

    // ── Queries ──────────────────────────────────────────────────────

    pub fn state(&self) -> PetState {
        self.state
    }

    pub fn needs(&self) -> NeedsVector {
        self.needs
    }

    pub fn wake_deadline_ms(&self) -> Option<u64> {
        self.wake_deadline_ms
    }

    /// Elapsed time since the last qualifying activity signal.
    pub fn idle_ms(&self, now_ms: u64) -> u64 {
        now_ms.saturating_sub(self.last_activity_ms)
    }

    /// Replace the needs vector (restore seam for embedders).
    pub fn set_needs(&mut self, needs: NeedsVector) {
        self.needs = needs;
    }

    // ── Commands ─────────────────────────────────────────────────────

    /// Re-evaluate idle/auto-wake transitions against `now_ms`.
    ///
    /// Idempotent; safe to call at any frequency. Coarser polling only
    /// delays transitions, it never corrupts state. Returns at most one
    /// transition event per call.
    pub fn tick(&mut self, now_ms: u64) -> Option<Event> {
        match self.state {
            PetState::Sleeping => {
                let deadline = self.wake_deadline_ms?;
                if now_ms >= deadline {
                    self.wake(now_ms);
                    return Some(Event::Woke {
                        cause: WakeCause::Auto,
                        at: to_utc(now_ms),
                    });
                }
                None
            }
            PetState::Awake | PetState::Drowsy => {
                let idle = self.idle_ms(now_ms);
                if idle >= SLEEP_AFTER_MS {
                    let wake_at = now_ms + self.jitter.wake_delay_ms();
                    self.state = PetState::Sleeping;
                    self.wake_deadline_ms = Some(wake_at);
                    return Some(Event::FellAsleep {
                        wake_at: to_utc(wake_at),
                        at: to_utc(now_ms),
                    });
                }
                if self.state == PetState::Awake && idle >= DROWSY_AFTER_MS {
                    self.state = PetState::Drowsy;
                }
                None
            }
        }
    }

    /// One decay application: every need drops by one, floored at zero.
    /// Metabolism pauses during sleep, so this is a no-op while sleeping.
    pub fn decay_step(&mut self) {
        if self.state != PetState::Sleeping {
            self.needs.decay();
        }
    }

    /// Apply a gated action. The caller is responsible for having passed the
    /// quiet-time admission check already.
    ///
    /// PLAY while sleeping is a silent no-op (empty vec). Every other
    /// combination boosts the mapped need, forces AWAKE and resets the idle
    /// clock and wake deadline, even when the pet was already awake.
    pub fn apply_action(&mut self, kind: ActionKind, now_ms: u64) -> Vec<Event> {
        if kind == ActionKind::Play && self.state == PetState::Sleeping {
            return Vec::new();
        }

        let mut events = Vec::new();
        if self.state != PetState::Awake {
            events.push(Event::Woke {
                cause: WakeCause::Manual,
                at: to_utc(now_ms),
            });
        }
        self.needs.boost(kind);
        self.wake(now_ms);
        events.push(Event::ActionApplied {
            kind,
            needs: self.needs,
            state: self.state,
            at: to_utc(now_ms),
        });
        events
    }

    /// Generic user input (key press, window regaining focus): resets the
    /// idle clock only. Never changes state or needs -- a drowsy or sleeping
    /// pet stays that way until a gated action or the auto-wake deadline.
    pub fn register_activity(&mut self, now_ms: u64) {
        self.last_activity_ms = now_ms;
    }

    // ── Internal ─────────────────────────────────────────────────────

    fn wake(&mut self, now_ms: u64) {
        self.state = PetState::Awake;
        self.last_activity_ms = now_ms;
        self.wake_deadline_ms = None;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const MIN: u64 = 60 * 1000;

    fn sleeping_engine(seed: u64) -> (PetEngine, u64) {
        let mut engine = PetEngine::with_seed(0, seed);
        engine.tick(SLEEP_AFTER_MS);
        assert_eq!(engine.state(), PetState::Sleeping);
        (engine, SLEEP_AFTER_MS)
    }

    #[test]
    fn idle_progression_awake_drowsy_sleeping() {
        let mut engine = PetEngine::with_seed(0, 7);

        assert!(engine.tick(8 * MIN - 1).is_none());
        assert_eq!(engine.state(), PetState::Awake);

        assert!(engine.tick(8 * MIN).is_none());
        assert_eq!(engine.state(), PetState::Drowsy);

        assert!(engine.tick(10 * MIN - 1).is_none());
        assert_eq!(engine.state(), PetState::Drowsy);

        let event = engine.tick(10 * MIN);
        assert!(matches!(event, Some(Event::FellAsleep { .. })));
        assert_eq!(engine.state(), PetState::Sleeping);
    }

    #[test]
    fn wake_deadline_within_bounds() {
        for seed in 0..50 {
            let (engine, slept_at) = sleeping_engine(seed);
            let deadline = engine.wake_deadline_ms().unwrap();
            assert!(deadline >= slept_at + WAKE_DELAY_MIN_MS);
            assert!(deadline < slept_at + WAKE_DELAY_MAX_MS);
        }
    }

    #[test]
    fn wake_deadline_deterministic_per_seed() {
        let (a, _) = sleeping_engine(42);
        let (b, _) = sleeping_engine(42);
        assert_eq!(a.wake_deadline_ms(), b.wake_deadline_ms());
    }

    #[test]
    fn auto_wake_at_deadline() {
        let (mut engine, _) = sleeping_engine(1);
        let deadline = engine.wake_deadline_ms().unwrap();

        assert!(engine.tick(deadline - 1).is_none());
        assert_eq!(engine.state(), PetState::Sleeping);

        let event = engine.tick(deadline);
        assert!(matches!(
            event,
            Some(Event::Woke {
                cause: WakeCause::Auto,
                ..
            })
        ));
        assert_eq!(engine.state(), PetState::Awake);
        assert!(engine.wake_deadline_ms().is_none());

        // Waking resets the idle clock, so a repeated tick at the same
        // instant is a no-op.
        assert!(engine.tick(deadline).is_none());
        assert_eq!(engine.state(), PetState::Awake);
    }

    #[test]
    fn gated_action_wakes_and_clears_deadline() {
        let (mut engine, slept_at) = sleeping_engine(2);
        let now = slept_at + MIN;

        let events = engine.apply_action(ActionKind::Cuddle, now);
        assert_eq!(events.len(), 2);
        assert!(matches!(
            events[0],
            Event::Woke {
                cause: WakeCause::Manual,
                ..
            }
        ));
        assert!(matches!(events[1], Event::ActionApplied { .. }));
        assert_eq!(engine.state(), PetState::Awake);
        assert!(engine.wake_deadline_ms().is_none());
        assert_eq!(engine.idle_ms(now), 0);
    }

    #[test]
    fn play_while_sleeping_is_silent_noop() {
        let (mut engine, slept_at) = sleeping_engine(3);
        let needs_before = engine.needs();

        let events = engine.apply_action(ActionKind::Play, slept_at + MIN);
        assert!(events.is_empty());
        assert_eq!(engine.state(), PetState::Sleeping);
        assert_eq!(engine.needs(), needs_before);
        assert!(engine.wake_deadline_ms().is_some());
    }

    #[test]
    fn feed_scenario() {
        let mut engine = PetEngine::with_seed(0, 4);
        engine.set_needs(NeedsVector::new(70, 70, 70, 70));

        let events = engine.apply_action(ActionKind::Feed, 30 * 1000);
        assert_eq!(events.len(), 1); // already awake, no Woke event

        let needs = engine.needs();
        assert_eq!(needs.hunger, 85);
        assert_eq!(needs.cleanliness, 70);
        assert_eq!(needs.playfulness, 70);
        assert_eq!(needs.affection, 70);
        assert_eq!(engine.state(), PetState::Awake);
        assert_eq!(engine.idle_ms(30 * 1000), 0);
    }

    #[test]
    fn generic_activity_delays_sleep_but_never_wakes() {
        let mut engine = PetEngine::with_seed(0, 5);

        engine.tick(9 * MIN);
        assert_eq!(engine.state(), PetState::Drowsy);

        // Poking a drowsy pet resets the idle clock but leaves it drowsy.
        engine.register_activity(9 * MIN);
        assert!(engine.tick(9 * MIN + 1).is_none());
        assert_eq!(engine.state(), PetState::Drowsy);

        // Sleep is now pushed out to 9min + 10min of idle.
        assert!(engine.tick(19 * MIN - 1).is_none());
        assert_eq!(engine.state(), PetState::Drowsy);
        assert!(matches!(engine.tick(19 * MIN), Some(Event::FellAsleep { .. })));

        // Poking a sleeping pet does not wake it either.
        engine.register_activity(19 * MIN);
        engine.tick(19 * MIN + 1);
        assert_eq!(engine.state(), PetState::Sleeping);
    }

    #[test]
    fn decay_pauses_while_sleeping() {
        let (mut engine, _) = sleeping_engine(6);
        let before = engine.needs();
        engine.decay_step();
        assert_eq!(engine.needs(), before);

        let mut awake = PetEngine::with_seed(0, 6);
        awake.decay_step();
        assert_eq!(awake.needs().hunger, 99);
    }

    #[test]
    fn serde_roundtrip_drops_jitter_only() {
        let (engine, _) = sleeping_engine(9);
        let json = serde_json::to_string(&engine).unwrap();
        let restored: PetEngine = serde_json::from_str(&json).unwrap();
        assert_eq!(restored.state(), engine.state());
        assert_eq!(restored.needs(), engine.needs());
        assert_eq!(restored.wake_deadline_ms(), engine.wake_deadline_ms());
    }
}
