//! Run state machine
//!
//! Player actions and content arrivals move the run between phases. Every
//! entry point takes the state by reference and returns the side effects the
//! host has to carry out (sound cues, content requests).

use serde::{Deserialize, Serialize};

use super::scoring::resolve_catch;
use super::state::{GamePhase, GameState, LevelConfig, PendingFetch, PlayerStats, Reward};
use super::tick::fire_due_timers;
use super::timers::TimerKey;
use crate::consts::*;

/// Audio feedback cue
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Cue {
    /// Collectible or bonus caught (base points of the item)
    Catch { points: i32, is_bonus: bool },
    Hazard,
    Victory,
    BoxOpen,
}

/// Side effect requested by the core
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum Effect {
    Feedback(Cue),
    FetchLevel { level: u32 },
    FetchReward { level: u32 },
    FetchSummary { score: u64 },
}

/// Player action from the presentation layer
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Action {
    StartRun,
    ConfirmLevelIntro,
    CatchObject(u32),
    RequestRetry,
    RequestAbandon,
    OpenRewardBox,
    ConfirmNextLevel,
    RestartFromSummary,
}

/// Completed content request
#[derive(Debug, Clone, PartialEq)]
pub enum Content {
    Level { level: u32, config: LevelConfig },
    Reward { level: u32, reward: Reward },
    Summary(String),
}

/// Apply a player action at frame time `now_ms`
pub fn dispatch(state: &mut GameState, action: Action, now_ms: f64) -> Vec<Effect> {
    // Deadlines that passed since the last frame land before the action
    let mut effects = fire_due_timers(state, now_ms);

    if let Action::CatchObject(id) = action {
        if !state.accepts_input() {
            log::debug!("Catch {} ignored in {:?}", id, state.phase);
            return effects;
        }
        if let Some(outcome) = resolve_catch(state, id, now_ms) {
            effects.push(Effect::Feedback(outcome.cue));
        }
        return effects;
    }

    if state.is_loading() {
        log::debug!("{:?} ignored while loading {:?}", action, state.pending);
        return effects;
    }

    match (state.phase, action) {
        (GamePhase::Start, Action::StartRun) => {
            state.stats = PlayerStats::default();
            state.reward = None;
            state.summary = None;
            log::info!("Run started (seed {})", state.seed);
            effects.push(request_level(state, 1));
        }
        (GamePhase::LevelIntro, Action::ConfirmLevelIntro) => begin_level(state, now_ms),
        (GamePhase::Lost, Action::RequestRetry) => {
            let level = state.stats.level;
            log::info!("Retrying level {}", level);
            effects.push(request_level(state, level));
        }
        (GamePhase::Lost, Action::RequestAbandon) => {
            log::info!("Run abandoned with score {}", state.stats.score);
            state.pending = Some(PendingFetch::Summary);
            effects.push(Effect::FetchSummary {
                score: state.stats.score,
            });
        }
        (GamePhase::Reward, Action::OpenRewardBox) => {
            if !state.box_opened {
                state.box_opened = true;
                effects.push(Effect::Feedback(Cue::BoxOpen));
            }
        }
        (GamePhase::Reward, Action::ConfirmNextLevel) if state.box_opened => {
            let next = state.stats.level + 1;
            effects.push(request_level(state, next));
        }
        (GamePhase::Summary, Action::RestartFromSummary) => {
            state.phase = GamePhase::Start;
            log::info!("Back to start");
        }
        (phase, action) => log::debug!("{:?} ignored in {:?}", action, phase),
    }
    effects
}

/// Apply a finished content request
pub fn apply_content(state: &mut GameState, content: Content, now_ms: f64) -> Vec<Effect> {
    let effects = fire_due_timers(state, now_ms);

    match content {
        Content::Level { level, config } => {
            if state.pending == Some(PendingFetch::Level(level)) {
                state.pending = None;
                enter_intro(state, level, config);
            } else {
                log::warn!("Dropping level {} config nobody is waiting for", level);
            }
        }
        Content::Reward { level, reward } => {
            log::info!("Reward for level {}: {}", level, reward.name);
            state.reward = Some(reward);
            if state.pending == Some(PendingFetch::Reward(level)) {
                state.pending = None;
            }
            if state.phase == GamePhase::Won && state.reward_reveal_due {
                show_reward(state);
            }
        }
        Content::Summary(text) => {
            state.summary = Some(text);
            if state.pending == Some(PendingFetch::Summary) {
                state.pending = None;
                state.phase = GamePhase::Summary;
                log::info!("Summary shown");
            }
        }
    }
    effects
}

fn request_level(state: &mut GameState, level: u32) -> Effect {
    state.pending = Some(PendingFetch::Level(level));
    Effect::FetchLevel { level }
}

/// Level config arrived: show the intro for `level`
fn enter_intro(state: &mut GameState, level: u32, config: LevelConfig) {
    log::info!(
        "Level {} '{}' (target {}, spawn {}s, speed x{})",
        level,
        config.name,
        config.target_score,
        config.spawn_rate,
        config.speed_multiplier
    );
    state.level_config = Some(config);
    state.clear_field();
    state.stats.level = level;
    state.stats.time_remaining = LEVEL_SECONDS;
    state.stats.missed_count = 0;
    state.reward = None;
    state.box_opened = false;
    state.reward_reveal_due = false;
    state.phase = GamePhase::LevelIntro;
}

/// Start the clock and the spawner
fn begin_level(state: &mut GameState, now_ms: f64) {
    state.clear_field();
    state.stats.time_remaining = LEVEL_SECONDS;
    state.phase = GamePhase::Playing;
    state
        .timers
        .schedule(TimerKey::ClockTick, now_ms + CLOCK_TICK_MS);
    log::info!("Level {} playing", state.stats.level);
}

/// Won or lost, judged against the level target
pub fn evaluate_outcome(state: &GameState) -> GamePhase {
    if state.stats.score >= state.target_score() {
        GamePhase::Won
    } else {
        GamePhase::Lost
    }
}

/// Clock ran out at `now_ms`: stop the level and judge it
pub fn finish_level(state: &mut GameState, now_ms: f64) -> Vec<Effect> {
    state.timers.cancel(TimerKey::ClockTick);
    state.phase = evaluate_outcome(state);
    log::info!(
        "Level {} over: {:?} with {} / {}",
        state.stats.level,
        state.phase,
        state.stats.score,
        state.target_score()
    );

    if state.phase != GamePhase::Won {
        return Vec::new();
    }

    let level = state.stats.level;
    state.reward = None;
    state.box_opened = false;
    state.reward_reveal_due = false;
    state.pending = Some(PendingFetch::Reward(level));
    state
        .timers
        .schedule(TimerKey::RevealReward, now_ms + REWARD_REVEAL_MS);
    vec![
        Effect::Feedback(Cue::Victory),
        Effect::FetchReward { level },
    ]
}

/// Reveal delay elapsed; the box appears once the reward is in
pub fn reveal_reward(state: &mut GameState) {
    if state.phase != GamePhase::Won {
        return;
    }
    if state.reward.is_some() {
        show_reward(state);
    } else {
        state.reward_reveal_due = true;
    }
}

fn show_reward(state: &mut GameState) {
    state.reward_reveal_due = false;
    state.box_opened = false;
    state.phase = GamePhase::Reward;
    log::info!("Reward box shown");
}
