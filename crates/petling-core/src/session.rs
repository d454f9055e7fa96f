//! Session glue: one pet, one gate, one store.
//!
//! `PetSession` is the embedding surface. It owns the durable store, routes
//! gated actions through the quiet-time gate before they reach the engine,
//! replays elapsed decay boundaries on tick, and persists the whole session
//! under a single kv key so hosts (like the CLI) can resume between
//! invocations.

use serde::{Deserialize, Serialize};

use crate::clock::to_utc;
use crate::error::Result;
use crate::events::Event;
use crate::pet::{ActionKind, NeedsVector, PetEngine, PetState, DECAY_INTERVAL_MS};
use crate::quiet::{Admission, QuietStatus, QuietTimeGate};
use crate::storage::StateStore;

const SESSION_KEY: &str = "pet_session";

/// What happened to a requested gated action.
#[derive(Debug, Clone)]
pub enum ActionOutcome {
    /// Admitted and applied; the events describe every resulting change.
    Applied { events: Vec<Event> },
    /// Quiet time is in force; nothing was mutated.
    Blocked { until_ms: u64 },
    /// The engine ignored the action (PLAY while sleeping); nothing was
    /// registered against the window.
    Ignored,
}

#[derive(Serialize, Deserialize)]
struct SessionSnapshot {
    engine: PetEngine,
    last_decay_ms: u64,
    quiet_active: bool,
}

/// A single pet session over an injected durable store.
pub struct PetSession<S: StateStore> {
    store: S,
    engine: PetEngine,
    /// Last decay boundary that has been applied.
    last_decay_ms: u64,
    /// Quiet-time state as of the last reconciliation, used to emit
    /// started/ended edges.
    quiet_active: bool,
}

impl<S: StateStore> PetSession<S> {
    /// Start a fresh session at `now_ms`.
    pub fn new(store: S, now_ms: u64) -> Self {
        Self {
            store,
            engine: PetEngine::new(now_ms),
            last_decay_ms: now_ms,
            quiet_active: false,
        }
    }

    /// Fresh session with a deterministic auto-wake draw.
    pub fn with_seed(store: S, now_ms: u64, seed: u64) -> Self {
        Self {
            engine: PetEngine::with_seed(now_ms, seed),
            ..Self::new(store, now_ms)
        }
    }

    /// Resume the persisted session, or start fresh when the snapshot is
    /// missing or malformed.
    pub fn load(store: S, now_ms: u64) -> Self {
        let snapshot = store
            .get(SESSION_KEY)
            .ok()
            .flatten()
            .and_then(|raw| serde_json::from_str::<SessionSnapshot>(&raw).ok());
        match snapshot {
            Some(snap) => Self {
                store,
                engine: snap.engine,
                last_decay_ms: snap.last_decay_ms,
                quiet_active: snap.quiet_active,
            },
            None => Self::new(store, now_ms),
        }
    }

    /// Persist the session snapshot.
    pub fn save(&self) -> Result<()> {
        let snap = SessionSnapshot {
            engine: self.engine.clone(),
            last_decay_ms: self.last_decay_ms,
            quiet_active: self.quiet_active,
        };
        let raw = serde_json::to_string(&snap)?;
        self.store.set(SESSION_KEY, &raw)?;
        Ok(())
    }

    // ── Queries ──────────────────────────────────────────────────────

    pub fn engine(&self) -> &PetEngine {
        &self.engine
    }

    pub fn engine_mut(&mut self) -> &mut PetEngine {
        &mut self.engine
    }

    pub fn store(&self) -> &S {
        &self.store
    }

    pub fn quiet_status(&self, now_ms: u64) -> Result<QuietStatus> {
        self.gate().status(now_ms)
    }

    pub fn active_minutes(&self, now_ms: u64) -> Result<usize> {
        self.gate().active_minutes(now_ms)
    }

    /// Full state snapshot for polling frontends.
    pub fn snapshot(&self, now_ms: u64) -> Result<Event> {
        let quiet = self.gate().status(now_ms)?;
        Ok(Event::StateSnapshot {
            state: self.engine.state(),
            needs: self.engine.needs(),
            idle_ms: self.engine.idle_ms(now_ms),
            quiet_active: quiet.active,
            quiet_remaining_ms: quiet.remaining_ms,
            at: to_utc(now_ms),
        })
    }

    // ── Commands ─────────────────────────────────────────────────────

    /// Advance the session to `now_ms`.
    ///
    /// Replays every elapsed 15-second decay boundary, evaluating lifecycle
    /// transitions at each one so that sleep correctly pauses decay, then
    /// reconciles quiet-time expiry. Returns every transition event.
    pub fn tick(&mut self, now_ms: u64) -> Result<Vec<Event>> {
        let mut events = Vec::new();
        while self.last_decay_ms + DECAY_INTERVAL_MS <= now_ms {
            self.last_decay_ms += DECAY_INTERVAL_MS;
            if let Some(event) = self.engine.tick(self.last_decay_ms) {
                events.push(event);
            }
            self.engine.decay_step();
        }
        if let Some(event) = self.engine.tick(now_ms) {
            events.push(event);
        }
        if let Some(event) = self.reconcile_quiet(now_ms)? {
            events.push(event);
        }
        Ok(events)
    }

    /// Attempt a gated action at `now_ms`.
    ///
    /// Admission is checked first: a blocked attempt mutates neither needs,
    /// lifecycle state nor the activity window. An admitted action is
    /// applied, then registered against the window; crossing the budget
    /// emits `QuietStarted`.
    pub fn apply(&mut self, kind: ActionKind, now_ms: u64) -> Result<ActionOutcome> {
        match self.gate().check_admission(now_ms)? {
            Admission::Blocked { until_ms } => return Ok(ActionOutcome::Blocked { until_ms }),
            Admission::Admitted => {}
        }

        let mut events = self.engine.apply_action(kind, now_ms);
        if events.is_empty() {
            return Ok(ActionOutcome::Ignored);
        }

        let outcome = self.gate().register_action(now_ms)?;
        if outcome.started_cooldown {
            self.quiet_active = true;
            if let Some(deadline_ms) = outcome.deadline_ms {
                events.push(Event::QuietStarted {
                    until: to_utc(deadline_ms),
                    active_minutes: outcome.active_minutes,
                    at: to_utc(now_ms),
                });
            }
        }
        Ok(ActionOutcome::Applied { events })
    }

    /// Ungated idle-clock reset (generic user input, regained foreground).
    pub fn register_generic_activity(&mut self, now_ms: u64) {
        self.engine.register_activity(now_ms);
    }

    // ── Internal ─────────────────────────────────────────────────────

    fn gate(&self) -> QuietTimeGate<&S> {
        QuietTimeGate::new(&self.store)
    }

    /// Observe quiet-time expiry (lazy, on read) and emit the ended edge.
    fn reconcile_quiet(&mut self, now_ms: u64) -> Result<Option<Event>> {
        let status = self.gate().status(now_ms)?;
        let ended = self.quiet_active && !status.active;
        self.quiet_active = status.active;
        Ok(ended.then(|| Event::QuietEnded { at: to_utc(now_ms) }))
    }
}

/// Convenience: the snapshot fields most hosts want, without matching on
/// [`Event::StateSnapshot`].
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PetStatus {
    pub state: PetState,
    pub needs: NeedsVector,
    pub idle_ms: u64,
    pub quiet: QuietStatus,
}

impl<S: StateStore> PetSession<S> {
    pub fn status(&self, now_ms: u64) -> Result<PetStatus> {
        Ok(PetStatus {
            state: self.engine.state(),
            needs: self.engine.needs(),
            idle_ms: self.engine.idle_ms(now_ms),
            quiet: self.gate().status(now_ms)?,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::pet::SLEEP_AFTER_MS;
    use crate::quiet::COOLDOWN_MS;
    use crate::storage::MemoryStore;

    const SEC: u64 = 1000;
    const MIN: u64 = 60 * SEC;

    /// Drive enough distinct-minute feeds to start a cooldown.
    /// Returns the time of the budget-crossing call.
    fn saturate(session: &mut PetSession<&MemoryStore>) -> u64 {
        let mut last = 0;
        for i in 0..40u64 {
            last = i * 61 * SEC; // 61s apart -> 40 distinct minutes
            let outcome = session.apply(ActionKind::Feed, last).unwrap();
            assert!(matches!(outcome, ActionOutcome::Applied { .. }));
        }
        last
    }

    #[test]
    fn decay_catchup_applies_elapsed_steps() {
        let store = MemoryStore::new();
        let mut session = PetSession::with_seed(&store, 0, 1);

        session.tick(60 * SEC).unwrap();
        assert_eq!(session.engine().needs().hunger, 96);

        // A partial interval does not decay.
        session.tick(70 * SEC).unwrap();
        assert_eq!(session.engine().needs().hunger, 96);
    }

    #[test]
    fn decay_catchup_pauses_at_sleep_boundary() {
        let store = MemoryStore::new();
        let mut session = PetSession::with_seed(&store, 0, 2);

        let events = session.tick(SLEEP_AFTER_MS).unwrap();
        assert!(events
            .iter()
            .any(|e| matches!(e, Event::FellAsleep { .. })));
        assert_eq!(session.engine().state(), PetState::Sleeping);
        // 39 decay boundaries precede the sleep transition at 10min; the
        // boundary that puts the pet to sleep no longer decays.
        assert_eq!(session.engine().needs().hunger, 61);
    }

    #[test]
    fn blocked_action_mutates_nothing() {
        let store = MemoryStore::new();
        let mut session = PetSession::with_seed(&store, 0, 3);
        session.engine_mut().set_needs(NeedsVector::new(70, 70, 70, 70));

        let crossed_at = saturate(&mut session);
        let needs_before = session.engine().needs();

        let outcome = session.apply(ActionKind::Feed, crossed_at + SEC).unwrap();
        match outcome {
            ActionOutcome::Blocked { until_ms } => {
                assert_eq!(until_ms, crossed_at + COOLDOWN_MS);
            }
            other => panic!("expected Blocked, got {other:?}"),
        }
        assert_eq!(session.engine().needs(), needs_before);
        assert_eq!(session.engine().state(), PetState::Awake);
        assert_eq!(session.active_minutes(crossed_at + SEC).unwrap(), 40);
    }

    #[test]
    fn budget_crossing_emits_quiet_started() {
        let store = MemoryStore::new();
        let mut session = PetSession::with_seed(&store, 0, 4);

        let mut started = 0;
        for i in 0..40u64 {
            let outcome = session.apply(ActionKind::Cuddle, i * 61 * SEC).unwrap();
            if let ActionOutcome::Applied { events } = outcome {
                started += events
                    .iter()
                    .filter(|e| matches!(e, Event::QuietStarted { .. }))
                    .count();
            }
        }
        assert_eq!(started, 1);

        let status = session.quiet_status(39 * 61 * SEC).unwrap();
        assert!(status.active);
    }

    #[test]
    fn quiet_ended_emitted_on_tick_after_expiry() {
        let store = MemoryStore::new();
        let mut session = PetSession::with_seed(&store, 0, 5);
        let crossed_at = saturate(&mut session);

        let events = session.tick(crossed_at + COOLDOWN_MS + SEC).unwrap();
        assert!(events.iter().any(|e| matches!(e, Event::QuietEnded { .. })));
        assert!(!session.quiet_status(crossed_at + COOLDOWN_MS + SEC).unwrap().active);
    }

    #[test]
    fn ignored_play_registers_nothing() {
        let store = MemoryStore::new();
        let mut session = PetSession::with_seed(&store, 0, 6);

        session.tick(SLEEP_AFTER_MS).unwrap();
        assert_eq!(session.engine().state(), PetState::Sleeping);

        let outcome = session.apply(ActionKind::Play, SLEEP_AFTER_MS + SEC).unwrap();
        assert!(matches!(outcome, ActionOutcome::Ignored));
        assert_eq!(session.active_minutes(SLEEP_AFTER_MS + SEC).unwrap(), 0);
        assert_eq!(session.engine().state(), PetState::Sleeping);
    }

    #[test]
    fn feed_scenario_through_session() {
        let store = MemoryStore::new();
        let mut session = PetSession::with_seed(&store, 0, 7);
        session.engine_mut().set_needs(NeedsVector::new(70, 70, 70, 70));

        let outcome = session.apply(ActionKind::Feed, 30 * SEC).unwrap();
        let events = match outcome {
            ActionOutcome::Applied { events } => events,
            other => panic!("expected Applied, got {other:?}"),
        };
        assert!(events.iter().any(|e| matches!(
            e,
            Event::ActionApplied { needs, .. } if needs.hunger == 85 && needs.affection == 70
        )));
        assert_eq!(session.engine().idle_ms(30 * SEC), 0);
    }

    #[test]
    fn persistence_roundtrip() {
        let store = MemoryStore::new();
        let mut session = PetSession::with_seed(&store, 0, 8);
        session.engine_mut().set_needs(NeedsVector::new(50, 60, 70, 80));
        session.tick(9 * MIN).unwrap();
        let state = session.engine().state();
        let needs = session.engine().needs();
        session.save().unwrap();

        let restored = PetSession::load(&store, 9 * MIN);
        assert_eq!(restored.engine().state(), state);
        assert_eq!(restored.engine().needs(), needs);
    }

    #[test]
    fn malformed_snapshot_recovers_to_fresh_session() {
        let store = MemoryStore::new();
        store.set("pet_session", "{definitely not json").unwrap();

        let session = PetSession::load(&store, 5 * MIN);
        assert_eq!(session.engine().state(), PetState::Awake);
        assert_eq!(session.engine().needs(), NeedsVector::default());
        assert_eq!(session.engine().idle_ms(5 * MIN), 0);
    }
}
