//! Pet needs and the actions that satisfy them.

use serde::{Deserialize, Serialize};

/// How much an action raises its associated need.
pub const ACTION_BOOST: u8 = 15;
/// How much each need drops per decay tick.
pub const DECAY_STEP: u8 = 1;
/// Upper bound for every need level.
pub const NEED_MAX: u8 = 100;

/// The four needs a pet has.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum NeedKind {
    Hunger,
    Cleanliness,
    Playfulness,
    Affection,
}

/// User-initiated, quiet-time-gated actions. Each maps to exactly one need.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ActionKind {
    Feed,
    Groom,
    Play,
    Cuddle,
}

impl ActionKind {
    /// The need this action raises.
    pub fn need(self) -> NeedKind {
        match self {
            ActionKind::Feed => NeedKind::Hunger,
            ActionKind::Groom => NeedKind::Cleanliness,
            ActionKind::Play => NeedKind::Playfulness,
            ActionKind::Cuddle => NeedKind::Affection,
        }
    }

    pub fn as_str(self) -> &'static str {
        match self {
            ActionKind::Feed => "feed",
            ActionKind::Groom => "groom",
            ActionKind::Play => "play",
            ActionKind::Cuddle => "cuddle",
        }
    }
}

/// Four independent need levels, each clamped to [0, 100].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct NeedsVector {
    pub hunger: u8,
    pub cleanliness: u8,
    pub playfulness: u8,
    pub affection: u8,
}

impl Default for NeedsVector {
    fn default() -> Self {
        Self::new(NEED_MAX, NEED_MAX, NEED_MAX, NEED_MAX)
    }
}

impl NeedsVector {
    /// Build a needs vector, clamping every component to [0, 100].
    pub fn new(hunger: u8, cleanliness: u8, playfulness: u8, affection: u8) -> Self {
        Self {
            hunger: hunger.min(NEED_MAX),
            cleanliness: cleanliness.min(NEED_MAX),
            playfulness: playfulness.min(NEED_MAX),
            affection: affection.min(NEED_MAX),
        }
    }

    pub fn get(&self, kind: NeedKind) -> u8 {
        match kind {
            NeedKind::Hunger => self.hunger,
            NeedKind::Cleanliness => self.cleanliness,
            NeedKind::Playfulness => self.playfulness,
            NeedKind::Affection => self.affection,
        }
    }

    fn get_mut(&mut self, kind: NeedKind) -> &mut u8 {
        match kind {
            NeedKind::Hunger => &mut self.hunger,
            NeedKind::Cleanliness => &mut self.cleanliness,
            NeedKind::Playfulness => &mut self.playfulness,
            NeedKind::Affection => &mut self.affection,
        }
    }

    /// One decay tick: every need drops by [`DECAY_STEP`], floored at 0.
    pub fn decay(&mut self) {
        self.hunger = self.hunger.saturating_sub(DECAY_STEP);
        self.cleanliness = self.cleanliness.saturating_sub(DECAY_STEP);
        self.playfulness = self.playfulness.saturating_sub(DECAY_STEP);
        self.affection = self.affection.saturating_sub(DECAY_STEP);
    }

    /// Apply an action's effect: +15 to its need, capped at 100.
    pub fn boost(&mut self, action: ActionKind) {
        let need = self.get_mut(action.need());
        *need = need.saturating_add(ACTION_BOOST).min(NEED_MAX);
    }

    /// True when every need is within [0, 100].
    pub fn in_range(&self) -> bool {
        self.hunger <= NEED_MAX
            && self.cleanliness <= NEED_MAX
            && self.playfulness <= NEED_MAX
            && self.affection <= NEED_MAX
    }
}
