//! Frame driver
//!
//! Called once per animation frame with the frame timestamp. Fires every
//! timer that came due, then spawns and moves objects while a level is live.

use super::run::{Effect, finish_level, reveal_reward};
use super::spawn::{advance, clock_tick, spawn_if_due};
use super::state::{GamePhase, GameState};
use super::timers::TimerKey;
use crate::consts::*;

/// Advance the game to frame time `now_ms`
pub fn tick(state: &mut GameState, now_ms: f64) -> Vec<Effect> {
    let effects = fire_due_timers(state, now_ms);

    // Frames arriving after the level ended must not touch the field
    if state.phase != GamePhase::Playing {
        return effects;
    }

    spawn_if_due(state, now_ms);
    advance(state, now_ms);
    effects
}

/// Run every timer due at or before `now_ms`, oldest deadline first
pub fn fire_due_timers(state: &mut GameState, now_ms: f64) -> Vec<Effect> {
    let mut effects = Vec::new();
    while let Some((key, due_ms)) = state.timers.pop_due(now_ms) {
        match key {
            TimerKey::ComboDecay => state.combo = 0,
            TimerKey::ExpireText(id) => state.floating_texts.retain(|t| t.id != id),
            TimerKey::RemoveObject(id) => state.objects.retain(|o| o.id != id),
            TimerKey::AlarmOff => state.alarm = false,
            TimerKey::RevealReward => reveal_reward(state),
            TimerKey::ClockTick => {
                if state.phase != GamePhase::Playing {
                    continue;
                }
                if clock_tick(state) {
                    effects.extend(finish_level(state, due_ms));
                } else {
                    state
                        .timers
                        .schedule(TimerKey::ClockTick, due_ms + CLOCK_TICK_MS);
                }
            }
        }
    }
    effects
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::content::fallback_level;
    use crate::sim::run::{Action, Content, apply_content, dispatch};
    use crate::sim::spawn::{SpawnTemplate, place_object};
    use crate::sim::state::ItemKind;

    fn playing(seed: u64, start_ms: f64) -> GameState {
        let mut state = GameState::new(seed);
        dispatch(&mut state, Action::StartRun, 0.0);
        apply_content(
            &mut state,
            Content::Level {
                level: 1,
                config: fallback_level(1),
            },
            0.0,
        );
        dispatch(&mut state, Action::ConfirmLevelIntro, start_ms);
        state
    }

    fn gift() -> SpawnTemplate {
        SpawnTemplate {
            icon: "fa-gift".into(),
            color: "text-red-500".into(),
            points: 150,
            kind: ItemKind::Standard,
        }
    }

    #[test]
    fn test_first_frame_spawns() {
        let mut state = playing(1, 0.0);
        tick(&mut state, 16.0);
        assert_eq!(state.objects.len(), 1);
    }

    #[test]
    fn test_clock_counts_down() {
        let mut state = playing(1, 0.0);
        tick(&mut state, 999.0);
        assert_eq!(state.stats.time_remaining, 30);
        tick(&mut state, 1000.0);
        assert_eq!(state.stats.time_remaining, 29);
        tick(&mut state, 5000.0);
        assert_eq!(state.stats.time_remaining, 25);
    }

    #[test]
    fn test_clock_expiry_ends_level() {
        let mut state = playing(1, 0.0);
        state.stats.score = 2500;
        let effects = tick(&mut state, 30_000.0);
        assert_eq!(state.phase, GamePhase::Won);
        assert_eq!(state.stats.time_remaining, 0);
        assert!(effects.contains(&Effect::FetchReward { level: 1 }));
    }

    #[test]
    fn test_no_ticks_after_level_ends() {
        let mut state = playing(1, 0.0);
        tick(&mut state, 30_000.0);
        assert_eq!(state.phase, GamePhase::Lost);
        let before = state.objects.len();
        let ids: Vec<_> = state.objects.iter().map(|o| (o.id, o.pos)).collect();

        tick(&mut state, 31_000.0);
        tick(&mut state, 45_000.0);
        assert_eq!(state.objects.len(), before);
        let after: Vec<_> = state.objects.iter().map(|o| (o.id, o.pos)).collect();
        assert_eq!(ids, after);
        assert!(!state.timers.is_pending(TimerKey::ClockTick));
        assert_eq!(state.stats.time_remaining, 0);
    }

    #[test]
    fn test_combo_lapses() {
        let mut state = playing(1, 0.0);
        let id = place_object(&mut state, gift(), 50.0, 0.0);
        dispatch(&mut state, Action::CatchObject(id), 100.0);
        assert_eq!(state.combo, 1);
        tick(&mut state, 1299.0);
        assert_eq!(state.combo, 1);
        tick(&mut state, 1300.0);
        assert_eq!(state.combo, 0);
    }

    #[test]
    fn test_combo_window_restarts_on_catch() {
        let mut state = playing(1, 0.0);
        let a = place_object(&mut state, gift(), 50.0, 0.0);
        let b = place_object(&mut state, gift(), 60.0, 0.0);
        dispatch(&mut state, Action::CatchObject(a), 0.0);
        dispatch(&mut state, Action::CatchObject(b), 1000.0);
        tick(&mut state, 1500.0);
        assert_eq!(state.combo, 2);
        tick(&mut state, 2200.0);
        assert_eq!(state.combo, 0);
    }

    #[test]
    fn test_caught_object_removed_after_grace() {
        let mut state = playing(1, 0.0);
        let id = place_object(&mut state, gift(), 50.0, 0.0);
        dispatch(&mut state, Action::CatchObject(id), 100.0);
        tick(&mut state, 349.0);
        assert!(state.object(id).is_some());
        assert_eq!(state.floating_texts.len(), 1);
        tick(&mut state, 350.0);
        assert!(state.object(id).is_none());
        tick(&mut state, 900.0);
        assert!(state.floating_texts.is_empty());
    }
}
