//! Game state and core simulation types
//!
//! Everything the simulation mutates lives in one owned `GameState`.

use glam::Vec2;
use rand::SeedableRng;
use rand_pcg::Pcg32;
use serde::{Deserialize, Serialize};

use super::timers::Scheduler;
use crate::combo_multiplier;
use crate::consts::*;

/// Current phase of the run
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum GamePhase {
    /// Title screen, no run in progress
    Start,
    /// Level name and target shown, waiting for the player
    LevelIntro,
    /// Active gameplay
    Playing,
    /// Target met, reward being prepared
    Won,
    /// Gift box on screen
    Reward,
    /// Target missed, retry or give up
    Lost,
    /// Closing blessing
    Summary,
}

/// Special effect carried by a bonus item
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum BonusEffect {
    /// Adds seconds to the level clock
    Time,
    /// Catches every collectible on the field
    Burst,
}

impl BonusEffect {
    /// Floating text shown when caught
    pub fn label(&self) -> String {
        match self {
            BonusEffect::Time => format!("+{}s", TIME_BONUS_SECONDS),
            BonusEffect::Burst => "BURST!".to_string(),
        }
    }
}

/// What an object does when caught
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum ItemKind {
    /// Level item worth points
    Standard,
    /// Level item with negative points
    Hazard,
    /// Global bonus pool item
    Bonus(BonusEffect),
}

/// Render size class (hazards largest, standard items smallest)
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum SizeClass {
    Standard,
    Bonus,
    Hazard,
}

impl SizeClass {
    pub fn for_kind(kind: ItemKind) -> Self {
        match kind {
            ItemKind::Standard => SizeClass::Standard,
            ItemKind::Bonus(_) => SizeClass::Bonus,
            ItemKind::Hazard => SizeClass::Hazard,
        }
    }

    /// Icon size in CSS pixels
    pub fn px(&self) -> u32 {
        match self {
            SizeClass::Standard => 45,
            SizeClass::Bonus => 50,
            SizeClass::Hazard => 55,
        }
    }
}

/// Item template from a level config
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LevelItem {
    pub icon: String,
    pub points: i32,
    pub color: String,
}

/// Per-level descriptor produced by the content generator
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LevelConfig {
    pub name: String,
    pub description: String,
    pub target_score: u64,
    /// Seconds between spawns
    pub spawn_rate: f32,
    pub speed_multiplier: f32,
    pub theme_color: String,
    pub accent_color: String,
    pub items: Vec<LevelItem>,
}

/// End-of-level gift
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Reward {
    pub name: String,
    pub meaning: String,
    pub icon: String,
}

/// A falling item
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FallingObject {
    pub id: u32,
    pub icon: String,
    pub color: String,
    pub points: i32,
    pub kind: ItemKind,
    pub size: SizeClass,
    /// Percent of the field; y starts above the top edge
    pub pos: Vec2,
    /// Fall per frame, fixed at spawn
    pub velocity: f32,
    pub caught: bool,
}

impl FallingObject {
    pub fn is_hazard(&self) -> bool {
        self.points < 0
    }

    pub fn bonus(&self) -> Option<BonusEffect> {
        match self.kind {
            ItemKind::Bonus(effect) => Some(effect),
            _ => None,
        }
    }

    /// Leaving the field uncaught costs points
    pub fn penalized_on_exit(&self) -> bool {
        self.points > 0 && self.bonus().is_none()
    }
}

/// Run-wide counters
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PlayerStats {
    pub score: u64,
    pub level: u32,
    pub gifts_found: u32,
    pub time_remaining: u32,
    pub missed_count: u32,
}

impl Default for PlayerStats {
    fn default() -> Self {
        Self {
            score: 0,
            level: 1,
            gifts_found: 0,
            time_remaining: LEVEL_SECONDS,
            missed_count: 0,
        }
    }
}

impl PlayerStats {
    /// Apply a signed score change, flooring at zero
    pub fn add_points(&mut self, delta: i64) {
        self.score = if delta >= 0 {
            self.score.saturating_add(delta as u64)
        } else {
            self.score.saturating_sub(delta.unsigned_abs())
        };
    }
}

/// Short-lived score popup
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FloatingText {
    pub id: u32,
    pub text: String,
    pub pos: Vec2,
    pub color: String,
}

/// Content request the run is blocked on
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum PendingFetch {
    Level(u32),
    Reward(u32),
    Summary,
}

/// Complete game state
#[derive(Debug, Clone)]
pub struct GameState {
    /// Run seed for reproducibility
    pub seed: u64,
    pub rng: Pcg32,
    pub phase: GamePhase,
    pub stats: PlayerStats,
    /// Consecutive non-hazard catches
    pub combo: u32,
    pub level_config: Option<LevelConfig>,
    /// Active objects (spawn order)
    pub objects: Vec<FallingObject>,
    pub floating_texts: Vec<FloatingText>,
    pub reward: Option<Reward>,
    pub summary: Option<String>,
    pub pending: Option<PendingFetch>,
    /// Reward box opened on the reward screen
    pub box_opened: bool,
    /// Reveal delay elapsed but reward not here yet
    pub reward_reveal_due: bool,
    /// Red alarm flash
    pub alarm: bool,
    /// Frame time of the last spawn; `None` spawns on the next frame
    pub last_spawn_ms: Option<f64>,
    pub timers: Scheduler,
    next_id: u32,
}

impl GameState {
    /// Create a new game state with the given seed
    pub fn new(seed: u64) -> Self {
        Self {
            seed,
            rng: Pcg32::seed_from_u64(seed),
            phase: GamePhase::Start,
            stats: PlayerStats::default(),
            combo: 0,
            level_config: None,
            objects: Vec::new(),
            floating_texts: Vec::new(),
            reward: None,
            summary: None,
            pending: None,
            box_opened: false,
            reward_reveal_due: false,
            alarm: false,
            last_spawn_ms: None,
            timers: Scheduler::new(),
            next_id: 1,
        }
    }

    /// Allocate a new entity ID
    pub fn next_entity_id(&mut self) -> u32 {
        let id = self.next_id;
        self.next_id += 1;
        id
    }

    /// Waiting on the content generator
    pub fn is_loading(&self) -> bool {
        self.pending.is_some()
    }

    /// Multiplier the next catch would use
    pub fn multiplier(&self) -> u32 {
        combo_multiplier(self.combo)
    }

    /// Catches are only accepted mid-level with no fetch outstanding
    pub fn accepts_input(&self) -> bool {
        self.phase == GamePhase::Playing && !self.is_loading()
    }

    pub fn object(&self, id: u32) -> Option<&FallingObject> {
        self.objects.iter().find(|o| o.id == id)
    }

    pub fn object_mut(&mut self, id: u32) -> Option<&mut FallingObject> {
        self.objects.iter_mut().find(|o| o.id == id)
    }

    pub fn target_score(&self) -> u64 {
        self.level_config.as_ref().map_or(0, |c| c.target_score)
    }

    /// Clear the field for a fresh level
    pub fn clear_field(&mut self) {
        self.objects.clear();
        self.floating_texts.clear();
        self.combo = 0;
        self.alarm = false;
        self.last_spawn_ms = None;
        self.timers.clear();
    }
}
