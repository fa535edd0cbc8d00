//! Spawning, falling and the level clock
//!
//! Runs once per animation frame while the level is being played.

use glam::Vec2;
use rand::Rng;

use super::state::{BonusEffect, FallingObject, GameState, ItemKind, LevelItem, SizeClass};
use super::timers::TimerKey;
use crate::consts::*;

/// Global bonus pool: (effect, icon, color)
pub const BONUS_POOL: [(BonusEffect, &str, &str); 2] = [
    (BonusEffect::Time, "fa-clock", "text-cyan-400"),
    (BonusEffect::Burst, "fa-bolt", "text-white"),
];

/// Everything needed to put one object on the field
#[derive(Debug, Clone, PartialEq)]
pub struct SpawnTemplate {
    pub icon: String,
    pub color: String,
    pub points: i32,
    pub kind: ItemKind,
}

impl SpawnTemplate {
    pub fn bonus(effect: BonusEffect) -> Self {
        let (_, icon, color) = BONUS_POOL
            .iter()
            .find(|(e, _, _)| *e == effect)
            .copied()
            .unwrap_or(BONUS_POOL[0]);
        Self {
            icon: icon.to_string(),
            color: color.to_string(),
            points: 0,
            kind: ItemKind::Bonus(effect),
        }
    }
}

impl From<&LevelItem> for SpawnTemplate {
    fn from(item: &LevelItem) -> Self {
        Self {
            icon: item.icon.clone(),
            color: item.color.clone(),
            points: item.points,
            kind: if item.points < 0 {
                ItemKind::Hazard
            } else {
                ItemKind::Standard
            },
        }
    }
}

/// Fall speed for a spawn. `roll` is uniform in [0, 1). Speed ramps up as the
/// clock runs down.
pub fn spawn_velocity(roll: f32, speed_multiplier: f32, time_remaining: u32) -> f32 {
    let ramp = 1.0 + (LEVEL_SECONDS as f32 - time_remaining as f32) / 100.0;
    (BASE_VELOCITY + roll * VELOCITY_SPREAD) * speed_multiplier * ramp
}

/// Put an object on the field at the spawn height
pub fn place_object(state: &mut GameState, template: SpawnTemplate, x: f32, velocity: f32) -> u32 {
    let id = state.next_entity_id();
    state.objects.push(FallingObject {
        id,
        icon: template.icon,
        color: template.color,
        points: template.points,
        size: SizeClass::for_kind(template.kind),
        kind: template.kind,
        pos: Vec2::new(x, SPAWN_Y),
        velocity,
        caught: false,
    });
    id
}

/// Spawn one random object from the bonus pool or the level's items
pub fn spawn_random(state: &mut GameState) -> Option<u32> {
    let (speed_multiplier, item_count) = {
        let config = state.level_config.as_ref()?;
        (config.speed_multiplier, config.items.len())
    };

    let template = if state.rng.random::<f32>() < BONUS_SPAWN_CHANCE {
        let (effect, _, _) = BONUS_POOL[state.rng.random_range(0..BONUS_POOL.len())];
        SpawnTemplate::bonus(effect)
    } else {
        if item_count == 0 {
            return None;
        }
        let idx = state.rng.random_range(0..item_count);
        SpawnTemplate::from(&state.level_config.as_ref()?.items[idx])
    };

    let x = SPAWN_X_MIN + state.rng.random::<f32>() * SPAWN_X_WIDTH;
    let roll = state.rng.random::<f32>();
    let velocity = spawn_velocity(roll, speed_multiplier, state.stats.time_remaining);
    Some(place_object(state, template, x, velocity))
}

/// Spawn if the level's spawn interval has elapsed since the last spawn
pub fn spawn_if_due(state: &mut GameState, now_ms: f64) -> Option<u32> {
    let interval_ms = state
        .level_config
        .as_ref()
        .map_or(1000.0, |c| c.spawn_rate as f64 * 1000.0);
    let due = match state.last_spawn_ms {
        None => true,
        Some(last) => now_ms - last > interval_ms,
    };
    if !due {
        return None;
    }
    state.last_spawn_ms = Some(now_ms);
    spawn_random(state)
}

/// Move every uncaught object down one step and drop those that left the
/// field. Returns the number of penalized misses.
pub fn advance(state: &mut GameState, now_ms: f64) -> u32 {
    let mut misses = 0;
    state.objects.retain_mut(|obj| {
        // Caught objects stay frozen until their removal timer fires
        if obj.caught {
            return true;
        }
        let next_y = obj.pos.y + obj.velocity;
        if next_y >= EXIT_Y {
            if obj.penalized_on_exit() {
                misses += 1;
            }
            return false;
        }
        obj.pos.y = next_y;
        true
    });

    for _ in 0..misses {
        register_miss(state, now_ms);
    }
    misses
}

/// A collectible fell out of the field
fn register_miss(state: &mut GameState, now_ms: f64) {
    state.stats.add_points(-(MISS_PENALTY as i64));
    state.stats.missed_count += 1;
    state.combo = 0;
    state.timers.cancel(TimerKey::ComboDecay);
    state.alarm = true;
    state.timers.schedule(TimerKey::AlarmOff, now_ms + MISS_FLASH_MS);
    log::debug!(
        "Missed item (score {}, missed {})",
        state.stats.score,
        state.stats.missed_count
    );
}

/// Count one second off the level clock. Returns true when it hits zero.
pub fn clock_tick(state: &mut GameState) -> bool {
    state.stats.time_remaining = state.stats.time_remaining.saturating_sub(1);
    state.stats.time_remaining == 0
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::content::fallback_level;

    fn playing_state() -> GameState {
        let mut state = GameState::new(7);
        state.level_config = Some(fallback_level(1));
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
    fn test_velocity_ramp() {
        let start = spawn_velocity(0.0, 1.0, 30);
        assert!((start - 0.12).abs() < 1e-6);
        let late = spawn_velocity(0.0, 1.0, 10);
        assert!((late - 0.12 * 1.2).abs() < 1e-6);
        let fast = spawn_velocity(1.0, 2.0, 30);
        assert!((fast - 0.27 * 2.0).abs() < 1e-6);
    }

    #[test]
    fn test_spawn_interval() {
        let mut state = playing_state();
        // Fallback spawn rate is 0.6s
        assert!(spawn_if_due(&mut state, 0.0).is_some());
        assert!(spawn_if_due(&mut state, 600.0).is_none());
        assert!(spawn_if_due(&mut state, 601.0).is_some());
        assert_eq!(state.objects.len(), 2);
    }

    #[test]
    fn test_spawn_bounds() {
        let mut state = playing_state();
        for _ in 0..500 {
            spawn_random(&mut state);
        }
        for obj in &state.objects {
            assert!(obj.pos.x >= 12.0 && obj.pos.x <= 88.0);
            assert_eq!(obj.pos.y, SPAWN_Y);
            assert!(obj.velocity > 0.0);
            assert_eq!(obj.size, SizeClass::for_kind(obj.kind));
        }
        let bonuses = state.objects.iter().filter(|o| o.bonus().is_some()).count();
        assert!(bonuses > 20 && bonuses < 120, "bonus share off: {bonuses}");
    }

    #[test]
    fn test_same_seed_same_spawns() {
        let mut a = playing_state();
        let mut b = playing_state();
        for _ in 0..20 {
            spawn_random(&mut a);
            spawn_random(&mut b);
        }
        let pa: Vec<_> = a.objects.iter().map(|o| (o.icon.clone(), o.pos, o.velocity)).collect();
        let pb: Vec<_> = b.objects.iter().map(|o| (o.icon.clone(), o.pos, o.velocity)).collect();
        assert_eq!(pa, pb);
    }

    #[test]
    fn test_miss_penalty() {
        let mut state = playing_state();
        state.stats.score = 120;
        state.combo = 6;
        place_object(&mut state, gift(), 50.0, 200.0);

        assert_eq!(advance(&mut state, 10.0), 1);
        assert!(state.objects.is_empty());
        assert_eq!(state.stats.score, 70);
        assert_eq!(state.stats.missed_count, 1);
        assert_eq!(state.combo, 0);
        assert!(state.alarm);
        assert_eq!(state.timers.due(TimerKey::AlarmOff), Some(90.0));
    }

    #[test]
    fn test_miss_penalty_floors_at_zero() {
        let mut state = playing_state();
        state.stats.score = 20;
        place_object(&mut state, gift(), 50.0, 200.0);
        advance(&mut state, 0.0);
        assert_eq!(state.stats.score, 0);
    }

    #[test]
    fn test_hazard_and_bonus_exit_free() {
        let mut state = playing_state();
        state.stats.score = 500;
        state.combo = 3;
        let skull = SpawnTemplate {
            icon: "fa-skull".into(),
            color: "text-purple-600".into(),
            points: -600,
            kind: ItemKind::Hazard,
        };
        place_object(&mut state, skull, 30.0, 200.0);
        place_object(&mut state, SpawnTemplate::bonus(BonusEffect::Time), 40.0, 200.0);

        assert_eq!(advance(&mut state, 0.0), 0);
        assert!(state.objects.is_empty());
        assert_eq!(state.stats.score, 500);
        assert_eq!(state.stats.missed_count, 0);
        assert_eq!(state.combo, 3);
    }

    #[test]
    fn test_caught_objects_frozen() {
        let mut state = playing_state();
        let id = place_object(&mut state, gift(), 50.0, 1.0);
        state.object_mut(id).unwrap().caught = true;
        advance(&mut state, 0.0);
        assert_eq!(state.object(id).unwrap().pos.y, SPAWN_Y);
    }

    #[test]
    fn test_clock_floors_at_zero() {
        let mut state = playing_state();
        state.stats.time_remaining = 2;
        assert!(!clock_tick(&mut state));
        assert!(clock_tick(&mut state));
        assert!(clock_tick(&mut state));
        assert_eq!(state.stats.time_remaining, 0);
    }
}
