//! Deterministic simulation module
//!
//! All gameplay logic lives here. This module must be pure and deterministic:
//! - Time comes in as frame timestamps, never read from a clock
//! - Seeded RNG only
//! - Stable iteration order (spawn order)
//! - No rendering, audio or network dependencies

pub mod run;
pub mod scoring;
pub mod spawn;
pub mod state;
pub mod tick;
pub mod timers;
pub mod view;

pub use run::{Action, Content, Cue, Effect, apply_content, dispatch, evaluate_outcome};
pub use scoring::{CatchOutcome, resolve_catch};
pub use spawn::{BONUS_POOL, SpawnTemplate, place_object};
pub use state::{
    BonusEffect, FallingObject, FloatingText, GamePhase, GameState, ItemKind, LevelConfig,
    LevelItem, PendingFetch, PlayerStats, Reward, SizeClass,
};
pub use tick::tick;
pub use timers::{Scheduler, TimerKey};
pub use view::{GameView, ObjectView};
