//! Genna Arcade - a falling-gift catch game for the Ethiopian Christmas holiday
//!
//! Core modules:
//! - `sim`: Deterministic simulation (spawning, scoring, run state machine)
//! - `content`: Generated level/reward/blessing content with built-in fallbacks
//! - `audio`: Feedback cues (Web Audio on the browser, silent elsewhere)
//! - `settings`: Runtime configuration

pub mod audio;
pub mod content;
pub mod settings;
pub mod sim;

pub use audio::{FeedbackSink, SilentSink};
pub use content::{ContentError, ContentService, Generator};
pub use settings::Settings;

/// Game configuration constants
///
/// Positions are percentages of the play field, times are milliseconds
/// unless the name says otherwise.
pub mod consts {
    /// Seconds on the level clock at the start of every level
    pub const LEVEL_SECONDS: u32 = 30;
    /// Clock tick period
    pub const CLOCK_TICK_MS: f64 = 1000.0;

    /// Spawn height (above the visible field)
    pub const SPAWN_Y: f32 = -10.0;
    /// Horizontal spawn band [min, min + width)
    pub const SPAWN_X_MIN: f32 = 12.0;
    pub const SPAWN_X_WIDTH: f32 = 76.0;
    /// Objects at or past this height have left the field
    pub const EXIT_Y: f32 = 105.0;

    /// Base per-tick fall speed and its random spread
    pub const BASE_VELOCITY: f32 = 0.12;
    pub const VELOCITY_SPREAD: f32 = 0.15;
    /// Chance that a spawn is drawn from the bonus pool
    pub const BONUS_SPAWN_CHANCE: f32 = 0.12;

    /// Score lost when a collectible falls out of the field
    pub const MISS_PENALTY: u64 = 50;

    /// Combo lapses if no catch lands within this window
    pub const COMBO_WINDOW_MS: f64 = 1200.0;
    /// Catches per multiplier step
    pub const COMBO_STEP: u32 = 4;
    /// Points per swept object on a burst, before multiplier
    pub const BURST_POINTS_PER_OBJECT: i64 = 100;
    /// Seconds added by a time bonus
    pub const TIME_BONUS_SECONDS: u32 = 5;

    /// Caught objects linger this long for the pop animation
    pub const CAUGHT_REMOVAL_MS: f64 = 250.0;
    /// Floating score text lifetime
    pub const FLOATING_TEXT_MS: f64 = 800.0;
    /// Delay between winning and showing the reward box
    pub const REWARD_REVEAL_MS: f64 = 1200.0;

    /// Alarm flash durations
    pub const HAZARD_FLASH_MS: f64 = 200.0;
    pub const MISS_FLASH_MS: f64 = 80.0;
}

/// Combo multiplier for a given combo count
#[inline]
pub fn combo_multiplier(combo: u32) -> u32 {
    combo / consts::COMBO_STEP + 1
}
