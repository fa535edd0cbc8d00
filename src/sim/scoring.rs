//! Catch resolution
//!
//! Turns a tap on a falling object into score, combo and bonus effects.

use glam::Vec2;

use super::run::Cue;
use super::state::{BonusEffect, FallingObject, FloatingText, GameState};
use super::timers::TimerKey;
use crate::combo_multiplier;
use crate::consts::*;

/// Text color for hazard penalties
pub const HAZARD_TEXT_COLOR: &str = "text-red-500";

/// Result of a successful catch
#[derive(Debug, Clone, PartialEq)]
pub struct CatchOutcome {
    /// Signed score change requested (before the zero floor)
    pub points_added: i64,
    /// Multiplier applied (1 for hazards)
    pub multiplier: u32,
    /// Objects swept up by a burst
    pub swept: Vec<u32>,
    /// Floating text shown at the object
    pub label: String,
    pub cue: Cue,
}

/// Resolve a catch on object `id`. Returns `None` for unknown or
/// already-caught objects.
pub fn resolve_catch(state: &mut GameState, id: u32, now_ms: f64) -> Option<CatchOutcome> {
    let obj = state.object_mut(id)?;
    if obj.caught {
        return None;
    }
    obj.caught = true;
    let obj = obj.clone();

    let outcome = if obj.is_hazard() {
        catch_hazard(state, &obj, now_ms)
    } else {
        catch_collectible(state, &obj, now_ms)
    };

    state
        .timers
        .schedule(TimerKey::RemoveObject(id), now_ms + CAUGHT_REMOVAL_MS);
    Some(outcome)
}

fn catch_hazard(state: &mut GameState, obj: &FallingObject, now_ms: f64) -> CatchOutcome {
    state.combo = 0;
    state.timers.cancel(TimerKey::ComboDecay);
    state.stats.add_points(obj.points as i64);

    state.alarm = true;
    state
        .timers
        .schedule(TimerKey::AlarmOff, now_ms + HAZARD_FLASH_MS);

    let label = obj.points.to_string();
    add_floating_text(state, label.clone(), obj.pos, HAZARD_TEXT_COLOR, now_ms);

    CatchOutcome {
        points_added: obj.points as i64,
        multiplier: 1,
        swept: Vec::new(),
        label,
        cue: Cue::Hazard,
    }
}

fn catch_collectible(state: &mut GameState, obj: &FallingObject, now_ms: f64) -> CatchOutcome {
    // Multiplier comes from the combo before this catch counts
    let multiplier = combo_multiplier(state.combo);
    state.combo += 1;
    state
        .timers
        .schedule(TimerKey::ComboDecay, now_ms + COMBO_WINDOW_MS);

    let mut points_added = obj.points as i64 * multiplier as i64;
    let mut label = format!("+{}", points_added);
    let mut swept = Vec::new();

    match obj.bonus() {
        Some(BonusEffect::Time) => {
            state.stats.time_remaining += TIME_BONUS_SECONDS;
            label = BonusEffect::Time.label();
        }
        Some(BonusEffect::Burst) => {
            for other in state.objects.iter_mut() {
                if !other.caught && other.points > 0 {
                    other.caught = true;
                    swept.push(other.id);
                }
            }
            for &id in &swept {
                state
                    .timers
                    .schedule(TimerKey::RemoveObject(id), now_ms + CAUGHT_REMOVAL_MS);
            }
            points_added += swept.len() as i64 * BURST_POINTS_PER_OBJECT * multiplier as i64;
            label = BonusEffect::Burst.label();
        }
        None => state.stats.gifts_found += 1,
    }

    state.stats.add_points(points_added);

    if multiplier > 1 {
        label = format!("{} x{}", label, multiplier);
    }
    add_floating_text(state, label.clone(), obj.pos, &obj.color, now_ms);

    CatchOutcome {
        points_added,
        multiplier,
        swept,
        label,
        cue: Cue::Catch {
            points: obj.points,
            is_bonus: obj.bonus().is_some(),
        },
    }
}

/// Show a popup that expires on its own
pub fn add_floating_text(state: &mut GameState, text: String, pos: Vec2, color: &str, now_ms: f64) -> u32 {
    let id = state.next_entity_id();
    state.floating_texts.push(FloatingText {
        id,
        text,
        pos,
        color: color.to_string(),
    });
    state
        .timers
        .schedule(TimerKey::ExpireText(id), now_ms + FLOATING_TEXT_MS);
    id
}
