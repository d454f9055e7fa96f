//! # Petling Core Library
//!
//! Core logic for Petling, a client-side virtual pet. The library follows a
//! CLI-first philosophy: every operation is available from the standalone
//! CLI binary, with any GUI being a thin layer over this same crate.
//!
//! ## Architecture
//!
//! - **Pet Engine**: a wall-clock-based lifecycle state machine
//!   (awake/drowsy/sleeping) with need decay, requiring the caller to
//!   periodically invoke `tick()`
//! - **Quiet-Time Gate**: rolling-window admission control that throttles
//!   gated actions to a budget of distinct active minutes per trailing hour
//! - **Session**: glue that routes actions through the gate, replays decay,
//!   and persists the whole session through a durable key-value store
//! - **Storage**: SQLite-backed key-value store and action history, plus an
//!   in-memory fake for tests
//!
//! ## Key Components
//!
//! - [`PetEngine`]: pet lifecycle state machine
//! - [`QuietTimeGate`]: rolling-window rate limiter
//! - [`PetSession`]: gated orchestration over an injected store
//! - [`Database`]: durable storage and action statistics
//! - [`Config`]: application configuration management

pub mod clock;
pub mod config;
pub mod error;
pub mod events;
pub mod pet;
pub mod quiet;
pub mod session;
pub mod storage;

pub use config::Config;
pub use error::{ConfigError, CoreError, Result, StoreError};
pub use events::{Event, WakeCause};
pub use pet::{ActionKind, NeedKind, NeedsVector, PetEngine, PetState};
pub use quiet::{Admission, ActivityWindow, QuietStatus, QuietTimeGate};
pub use session::{ActionOutcome, PetSession, PetStatus};
pub use storage::{Database, MemoryStore, StateStore, Stats};
