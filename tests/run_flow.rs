//! Whole-run scenarios driven through the public API

use std::collections::VecDeque;

use genna_arcade::content::{ContentService, FALLBACK_BLESSING, Offline, fallback_level};
use genna_arcade::sim::{
    Action, Content, Cue, Effect, GamePhase, GameState, ItemKind, SpawnTemplate, apply_content,
    dispatch, place_object, tick,
};

/// Resolve every fetch against built-in content, returning the cues played
fn fulfill(state: &mut GameState, effects: Vec<Effect>, now: f64) -> Vec<Cue> {
    let service = ContentService::new(Offline);
    let mut cues = Vec::new();
    let mut queue: VecDeque<Effect> = effects.into();
    while let Some(effect) = queue.pop_front() {
        match effect {
            Effect::Feedback(cue) => cues.push(cue),
            fetch => {
                let content = pollster::block_on(service.fetch(&fetch)).unwrap();
                queue.extend(apply_content(state, content, now));
            }
        }
    }
    cues
}

fn send(state: &mut GameState, action: Action, now: f64) -> Vec<Cue> {
    let effects = dispatch(state, action, now);
    fulfill(state, effects, now)
}

fn gift() -> SpawnTemplate {
    SpawnTemplate {
        icon: "fa-gift".into(),
        color: "text-red-500".into(),
        points: 150,
        kind: ItemKind::Standard,
    }
}

/// Run started and level 1 playing from t = 0
fn playing() -> GameState {
    let mut state = GameState::new(7);
    send(&mut state, Action::StartRun, 0.0);
    assert_eq!(state.phase, GamePhase::LevelIntro);
    send(&mut state, Action::ConfirmLevelIntro, 0.0);
    assert_eq!(state.phase, GamePhase::Playing);
    state
}

#[test]
fn test_win_open_box_and_advance() {
    let mut state = playing();
    assert_eq!(state.level_config, Some(fallback_level(1)));

    // Ten quick catches: multipliers 1,1,1,1,2,2,2,2,3,3
    for i in 0..10 {
        let id = place_object(&mut state, gift(), 50.0, 0.0);
        let cues = send(&mut state, Action::CatchObject(id), i as f64 * 100.0);
        assert_eq!(cues, vec![Cue::Catch { points: 150, is_bonus: false }]);
    }
    assert_eq!(state.stats.score, 2700);
    assert_eq!(state.stats.gifts_found, 10);

    let effects = tick(&mut state, 30_000.0);
    assert_eq!(state.phase, GamePhase::Won);
    let cues = fulfill(&mut state, effects, 30_000.0);
    assert_eq!(cues, vec![Cue::Victory]);
    assert!(state.reward.is_some());

    // Box appears only after the reveal delay
    tick(&mut state, 31_000.0);
    assert_eq!(state.phase, GamePhase::Won);
    tick(&mut state, 31_200.0);
    assert_eq!(state.phase, GamePhase::Reward);

    // Next level is locked until the box is opened
    assert!(dispatch(&mut state, Action::ConfirmNextLevel, 31_300.0).is_empty());
    assert_eq!(send(&mut state, Action::OpenRewardBox, 31_400.0), vec![Cue::BoxOpen]);
    assert!(send(&mut state, Action::OpenRewardBox, 31_500.0).is_empty());

    send(&mut state, Action::ConfirmNextLevel, 31_600.0);
    assert_eq!(state.phase, GamePhase::LevelIntro);
    assert_eq!(state.stats.level, 2);
    assert_eq!(state.stats.score, 2700);
    assert_eq!(state.level_config, Some(fallback_level(2)));
}

#[test]
fn test_loss_then_retry_same_level() {
    let mut state = playing();
    tick(&mut state, 30_000.0);
    assert_eq!(state.phase, GamePhase::Lost);

    let effects = dispatch(&mut state, Action::RequestRetry, 30_100.0);
    assert_eq!(effects, vec![Effect::FetchLevel { level: 1 }]);
    assert!(state.is_loading());

    // Nothing else goes through while the level is loading
    assert!(dispatch(&mut state, Action::RequestAbandon, 30_150.0).is_empty());

    fulfill(&mut state, effects, 30_200.0);
    assert_eq!(state.phase, GamePhase::LevelIntro);
    assert_eq!(state.stats.level, 1);
    assert_eq!(state.stats.time_remaining, 30);
    assert!(state.objects.is_empty());
}

#[test]
fn test_abandon_summary_restart() {
    let mut state = playing();
    let id = place_object(&mut state, gift(), 40.0, 0.0);
    send(&mut state, Action::CatchObject(id), 500.0);
    tick(&mut state, 30_000.0);
    assert_eq!(state.phase, GamePhase::Lost);

    let effects = dispatch(&mut state, Action::RequestAbandon, 30_100.0);
    assert_eq!(effects, vec![Effect::FetchSummary { score: 150 }]);
    fulfill(&mut state, effects, 30_100.0);
    assert_eq!(state.phase, GamePhase::Summary);
    assert_eq!(state.summary.as_deref(), Some(FALLBACK_BLESSING));
    let view = state.view();
    assert_eq!(view.stats.gifts_found, 1);
    assert_eq!(view.seed, 7);

    send(&mut state, Action::RestartFromSummary, 31_000.0);
    assert_eq!(state.phase, GamePhase::Start);

    send(&mut state, Action::StartRun, 31_100.0);
    assert_eq!(state.phase, GamePhase::LevelIntro);
    assert_eq!(state.stats.score, 0);
    assert_eq!(state.stats.level, 1);
}

#[test]
fn test_stale_level_content_ignored() {
    let mut state = playing();
    apply_content(
        &mut state,
        Content::Level {
            level: 4,
            config: fallback_level(4),
        },
        100.0,
    );
    assert_eq!(state.phase, GamePhase::Playing);
    assert_eq!(state.stats.level, 1);
}

#[test]
fn test_offline_service_uses_fallbacks() {
    let service = ContentService::new(Offline);
    let config = pollster::block_on(service.level_config(3));
    assert_eq!(config, fallback_level(3));
    assert_eq!(config.target_score, 6000);
    assert_eq!(pollster::block_on(service.summary(900)), FALLBACK_BLESSING);
}

#[test]
fn test_same_seed_same_run() {
    let run = |seed: u64| {
        let mut state = GameState::new(seed);
        send(&mut state, Action::StartRun, 0.0);
        send(&mut state, Action::ConfirmLevelIntro, 0.0);
        let mut now = 0.0;
        while now < 10_000.0 {
            now += 16.0;
            tick(&mut state, now);
        }
        (state.stats.clone(), state.objects.len())
    };
    assert_eq!(run(99), run(99));
}
