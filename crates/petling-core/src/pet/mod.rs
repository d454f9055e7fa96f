mod engine;
mod needs;

pub use engine::{
    PetEngine, PetState, DECAY_INTERVAL_MS, DROWSY_AFTER_MS, SLEEP_AFTER_MS, WAKE_DELAY_MAX_MS,
    WAKE_DELAY_MIN_MS,
};
pub use needs::{ActionKind, NeedKind, NeedsVector, ACTION_BOOST, DECAY_STEP, NEED_MAX};
