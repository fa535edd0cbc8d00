//! Read-only snapshot for the presentation layer

use serde::Serialize;

use super::state::{FloatingText, GamePhase, GameState, LevelConfig, PlayerStats, Reward};

/// One object as the field draws it
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ObjectView {
    pub id: u32,
    pub x: f32,
    pub y: f32,
    pub size_px: u32,
    pub color: String,
    pub icon: String,
    pub caught: bool,
}

/// Everything a renderer needs for one frame
#[derive(Debug, Clone, Serialize)]
pub struct GameView {
    /// Run seed, shown so a run can be replayed
    pub seed: u64,
    pub phase: GamePhase,
    pub stats: PlayerStats,
    pub level_config: Option<LevelConfig>,
    pub objects: Vec<ObjectView>,
    pub floating_texts: Vec<FloatingText>,
    pub loading: bool,
    pub combo: u32,
    pub multiplier: u32,
    pub alarm: bool,
    pub reward: Option<Reward>,
    pub box_opened: bool,
    pub summary: Option<String>,
    /// Score as a percentage of the level target, capped at 100
    pub score_progress: f32,
    pub target_met: bool,
}

impl GameState {
    pub fn view(&self) -> GameView {
        let target = self.target_score();
        let score_progress = if target == 0 {
            0.0
        } else {
            (self.stats.score as f32 / target as f32 * 100.0).min(100.0)
        };

        GameView {
            seed: self.seed,
            phase: self.phase,
            stats: self.stats.clone(),
            level_config: self.level_config.clone(),
            objects: self
                .objects
                .iter()
                .map(|o| ObjectView {
                    id: o.id,
                    x: o.pos.x,
                    y: o.pos.y,
                    size_px: o.size.px(),
                    color: o.color.clone(),
                    icon: o.icon.clone(),
                    caught: o.caught,
                })
                .collect(),
            floating_texts: self.floating_texts.clone(),
            loading: self.is_loading(),
            combo: self.combo,
            multiplier: self.multiplier(),
            alarm: self.alarm,
            reward: self.reward.clone(),
            box_opened: self.box_opened,
            summary: self.summary.clone(),
            score_progress,
            target_met: self.level_config.is_some() && self.stats.score >= target,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::content::fallback_level;

    #[test]
    fn test_progress_capped() {
        let mut state = GameState::new(1);
        assert_eq!(state.view().score_progress, 0.0);
        assert!(!state.view().target_met);

        state.level_config = Some(fallback_level(1));
        state.stats.score = 500;
        assert_eq!(state.view().score_progress, 25.0);
        state.stats.score = 9000;
        let view = state.view();
        assert_eq!(view.score_progress, 100.0);
        assert!(view.target_met);
    }

    #[test]
    fn test_view_reports_seed_and_gifts() {
        let mut state = GameState::new(4242);
        state.stats.gifts_found = 9;
        let view = state.view();
        assert_eq!(view.seed, 4242);
        assert_eq!(view.stats.gifts_found, 9);
    }

    #[test]
    fn test_view_serializes() {
        let state = GameState::new(1);
        let json = serde_json::to_string(&state.view()).unwrap();
        assert!(json.contains("\"phase\":\"Start\""));
    }
}
