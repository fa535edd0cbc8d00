//! Genna Arcade entry point
//!
//! Handles platform-specific initialization and runs the game loop.
//!
//! The browser host expects a page with these element ids:
//! - screens: `screen-start`, `screen-intro`, `screen-playing`, `screen-won`,
//!   `screen-reward`, `screen-lost`, `screen-summary`, plus a `loading` overlay
//! - field: `field` (objects and floating texts are drawn into it)
//! - HUD: `hud-score`, `hud-level`, `hud-time`, `hud-target`, `hud-multiplier`,
//!   `hud-progress`
//! - summary: `summary-text`, `summary-score`, `summary-gifts`
//! - buttons: `start-btn`, `intro-btn`, `retry-btn`, `abandon-btn`,
//!   `reward-box`, `next-btn`, `restart-btn`

#[cfg(target_arch = "wasm32")]
use wasm_bindgen::prelude::*;

#[cfg(target_arch = "wasm32")]
mod wasm_game {
    use std::cell::RefCell;
    use std::fmt::Write as _;
    use std::rc::Rc;
    use wasm_bindgen::prelude::*;
    use web_sys::{Document, Element, HtmlElement};

    use genna_arcade::audio::AudioManager;
    use genna_arcade::content::http::HttpGenerator;
    use genna_arcade::sim::{
        Action, Effect, GamePhase, GameState, GameView, apply_content, dispatch, tick,
    };
    use genna_arcade::{ContentService, FeedbackSink, Settings};

    /// Game instance holding all state
    struct Game {
        state: GameState,
        audio: AudioManager,
        settings: Settings,
        content: Rc<ContentService<HttpGenerator>>,
    }

    impl Game {
        fn new(settings: Settings, seed: u64) -> Self {
            Self {
                state: GameState::new(seed),
                audio: AudioManager::new(&settings),
                content: Rc::new(ContentService::new(HttpGenerator::from_settings(&settings))),
                settings,
            }
        }
    }

    fn document() -> Option<Document> {
        web_sys::window()?.document()
    }

    /// Frame-clock timestamp, same origin as requestAnimationFrame
    fn now_ms() -> f64 {
        web_sys::window()
            .and_then(|w| w.performance())
            .map(|p| p.now())
            .unwrap_or_default()
    }

    pub fn run() {
        console_error_panic_hook::set_once();
        if console_log::init_with_level(log::Level::Info).is_err() {
            web_sys::console::warn_1(&"Logger already initialized".into());
        }

        log::info!("Genna Arcade starting...");

        let settings = Settings::load();
        let seed = settings.seed.unwrap_or_else(|| js_sys::Date::now() as u64);
        if settings.api_key.is_empty() {
            log::info!("No API key configured - using built-in content");
        }
        let game = Rc::new(RefCell::new(Game::new(settings, seed)));

        log::info!("Game initialized with seed: {}", seed);

        setup_field(game.clone());
        setup_buttons(game.clone());

        // Start game loop
        request_animation_frame(game);

        log::info!("Genna Arcade running!");
    }

    /// Apply a player action and carry out its effects
    fn send(game: &Rc<RefCell<Game>>, action: Action) {
        let effects = {
            let mut g = game.borrow_mut();
            dispatch(&mut g.state, action, now_ms())
        };
        run_effects(game, effects);
    }

    /// Play cues now, start fetches in the background
    fn run_effects(game: &Rc<RefCell<Game>>, effects: Vec<Effect>) {
        for effect in effects {
            match effect {
                Effect::Feedback(cue) => game.borrow_mut().audio.play(cue),
                fetch => {
                    let game = game.clone();
                    let content = game.borrow().content.clone();
                    wasm_bindgen_futures::spawn_local(async move {
                        let Some(result) = content.fetch(&fetch).await else {
                            return;
                        };
                        let more = {
                            let mut g = game.borrow_mut();
                            apply_content(&mut g.state, result, now_ms())
                        };
                        run_effects(&game, more);
                    });
                }
            }
        }
    }

    /// Catch clicks on falling objects via delegation on the field
    fn setup_field(game: Rc<RefCell<Game>>) {
        let Some(field) = document().and_then(|d| d.get_element_by_id("field")) else {
            log::error!("No #field element - nothing to play on");
            return;
        };

        let closure = Closure::<dyn FnMut(_)>::new(move |event: web_sys::PointerEvent| {
            let target = event
                .target()
                .and_then(|t| t.dyn_into::<Element>().ok())
                .and_then(|el| el.closest("[data-id]").ok().flatten());
            let id = target
                .and_then(|el| el.get_attribute("data-id"))
                .and_then(|id| id.parse::<u32>().ok());
            if let Some(id) = id {
                event.prevent_default();
                send(&game, Action::CatchObject(id));
            }
        });
        let _ = field.add_event_listener_with_callback("pointerdown", closure.as_ref().unchecked_ref());
        closure.forget();
    }

    fn setup_buttons(game: Rc<RefCell<Game>>) {
        let Some(document) = document() else { return };

        let buttons = [
            ("start-btn", Action::StartRun),
            ("intro-btn", Action::ConfirmLevelIntro),
            ("retry-btn", Action::RequestRetry),
            ("abandon-btn", Action::RequestAbandon),
            ("reward-box", Action::OpenRewardBox),
            ("next-btn", Action::ConfirmNextLevel),
            ("restart-btn", Action::RestartFromSummary),
        ];

        for (id, action) in buttons {
            let Some(btn) = document.get_element_by_id(id) else {
                log::warn!("Missing button #{}", id);
                continue;
            };
            let game = game.clone();
            let closure = Closure::<dyn FnMut(_)>::new(move |_event: web_sys::MouseEvent| {
                send(&game, action);
            });
            let _ = btn.add_event_listener_with_callback("click", closure.as_ref().unchecked_ref());
            closure.forget();
        }
    }

    fn request_animation_frame(game: Rc<RefCell<Game>>) {
        let Some(window) = web_sys::window() else { return };
        let closure = Closure::once(move |time: f64| {
            game_loop(game, time);
        });
        let _ = window.request_animation_frame(closure.as_ref().unchecked_ref());
        closure.forget();
    }

    fn game_loop(game: Rc<RefCell<Game>>, time: f64) {
        let effects = {
            let mut g = game.borrow_mut();
            let effects = tick(&mut g.state, time);
            if let Some(document) = document() {
                render(&document, &g.state.view(), &g.settings);
            }
            effects
        };
        run_effects(&game, effects);

        request_animation_frame(game);
    }

    fn show(document: &Document, id: &str, visible: bool) {
        if let Some(el) = document.get_element_by_id(id) {
            let _ = el.class_list().toggle_with_force("hidden", !visible);
        }
    }

    fn set_text(document: &Document, id: &str, text: &str) {
        if let Some(el) = document.get_element_by_id(id) {
            if el.text_content().as_deref() != Some(text) {
                el.set_text_content(Some(text));
            }
        }
    }

    /// Escape model-generated text before it goes into markup
    fn escape(text: &str) -> String {
        text.replace('&', "&amp;")
            .replace('<', "&lt;")
            .replace('>', "&gt;")
            .replace('"', "&quot;")
    }

    /// Update the DOM from a view snapshot
    fn render(document: &Document, view: &GameView, settings: &Settings) {
        let screens = [
            ("screen-start", GamePhase::Start),
            ("screen-intro", GamePhase::LevelIntro),
            ("screen-playing", GamePhase::Playing),
            ("screen-won", GamePhase::Won),
            ("screen-reward", GamePhase::Reward),
            ("screen-lost", GamePhase::Lost),
            ("screen-summary", GamePhase::Summary),
        ];
        for (id, phase) in screens {
            show(document, id, view.phase == phase);
        }
        show(document, "loading", view.loading);

        // HUD
        set_text(document, "hud-score", &view.stats.score.to_string());
        set_text(document, "hud-level", &view.stats.level.to_string());
        set_text(document, "hud-time", &format!("{}s", view.stats.time_remaining));
        if let Some(config) = &view.level_config {
            set_text(document, "hud-target", &config.target_score.to_string());
            set_text(document, "intro-name", &config.name);
            set_text(document, "intro-description", &config.description);
            set_text(document, "intro-target", &config.target_score.to_string());
        }
        set_text(document, "hud-multiplier", &format!("x{}", view.multiplier));
        if let Some(bar) = document
            .get_element_by_id("hud-progress")
            .and_then(|el| el.dyn_into::<HtmlElement>().ok())
        {
            let _ = bar
                .style()
                .set_property("width", &format!("{:.1}%", view.score_progress));
        }

        // Reward and end screens
        if let Some(reward) = &view.reward {
            set_text(document, "reward-name", &reward.name);
            set_text(document, "reward-meaning", &reward.meaning);
        }
        show(document, "reward-details", view.box_opened);
        show(document, "next-btn", view.box_opened);
        set_text(document, "lost-score", &view.stats.score.to_string());
        if let Some(summary) = &view.summary {
            set_text(document, "summary-text", summary);
        }
        set_text(document, "summary-score", &view.stats.score.to_string());
        set_text(document, "summary-gifts", &view.stats.gifts_found.to_string());

        if view.phase == GamePhase::Playing {
            render_field(document, view, settings);
        }
    }

    fn render_field(document: &Document, view: &GameView, settings: &Settings) {
        let Some(field) = document
            .get_element_by_id("field")
            .and_then(|el| el.dyn_into::<HtmlElement>().ok())
        else {
            return;
        };

        let alarm = settings.effective_alarm(view.alarm);
        let _ = field.class_list().toggle_with_force("alarm", alarm);
        if let Some(config) = &view.level_config {
            let _ = field
                .style()
                .set_property("background-color", &config.theme_color);
        }

        let mut html = String::new();
        for obj in &view.objects {
            let _ = write!(
                html,
                r#"<div class="falling {color}{caught}" data-id="{id}" style="left:{x:.2}%;top:{y:.2}%;width:{px}px;height:{px}px"><i class="fa-solid {icon}"></i></div>"#,
                color = escape(&obj.color),
                caught = if obj.caught { " caught" } else { "" },
                id = obj.id,
                x = obj.x,
                y = obj.y,
                px = obj.size_px,
                icon = escape(&obj.icon),
            );
        }
        for text in &view.floating_texts {
            let _ = write!(
                html,
                r#"<div class="floating-text {color}" style="left:{x:.2}%;top:{y:.2}%">{text}</div>"#,
                color = escape(&text.color),
                x = text.pos.x,
                y = text.pos.y,
                text = escape(&text.text),
            );
        }
        field.set_inner_html(&html);
    }
}

#[cfg(target_arch = "wasm32")]
#[wasm_bindgen(start)]
pub fn wasm_main() {
    wasm_game::run();
}

#[cfg(not(target_arch = "wasm32"))]
fn main() {
    env_logger::init();
    log::info!("Genna Arcade (native) starting...");
    log::info!("Native mode runs a headless autopilot - serve the wasm build for the real game");

    let settings = genna_arcade::Settings::load();
    let seed = settings.seed.unwrap_or(2026);
    let report = autopilot::play(seed, 3);

    println!("\nSeed {}: reached level {}", seed, report.level);
    println!("Final score: {}", report.score);
    println!("Gifts found: {}, missed: {}", report.gifts, report.missed);
    println!("Blessing: {}", report.blessing);
}

#[cfg(target_arch = "wasm32")]
fn main() {
    // WASM entry point is wasm_main, this is just to satisfy the compiler
}

/// Headless player: catches everything that isn't a hazard once it is
/// halfway down the field, using built-in content only
#[cfg(not(target_arch = "wasm32"))]
mod autopilot {
    use std::collections::VecDeque;

    use genna_arcade::content::{ContentService, Offline};
    use genna_arcade::sim::{Action, Effect, GamePhase, GameState, apply_content, dispatch, tick};
    use genna_arcade::{FeedbackSink, SilentSink};

    const FRAME_MS: f64 = 16.0;
    const MAX_FRAMES: u32 = 50_000;
    const REACH_Y: f32 = 50.0;

    pub struct Report {
        pub level: u32,
        pub score: u64,
        pub gifts: u32,
        pub missed: u32,
        pub blessing: String,
    }

    struct Driver {
        state: GameState,
        content: ContentService<Offline>,
        sink: SilentSink,
        now: f64,
    }

    impl Driver {
        fn send(&mut self, action: Action) {
            let effects = dispatch(&mut self.state, action, self.now);
            self.run_effects(effects);
        }

        /// Fetches against the offline generator resolve immediately
        fn run_effects(&mut self, effects: Vec<Effect>) {
            let mut queue: VecDeque<Effect> = effects.into();
            while let Some(effect) = queue.pop_front() {
                if let Effect::Feedback(cue) = effect {
                    self.sink.play(cue);
                    continue;
                }
                if let Some(content) = pollster::block_on(self.content.fetch(&effect)) {
                    queue.extend(apply_content(&mut self.state, content, self.now));
                }
            }
        }
    }

    pub fn play(seed: u64, levels: u32) -> Report {
        let mut driver = Driver {
            state: GameState::new(seed),
            content: ContentService::new(Offline),
            sink: SilentSink,
            now: 0.0,
        };
        driver.send(Action::StartRun);

        for _ in 0..MAX_FRAMES {
            driver.now += FRAME_MS;
            let effects = tick(&mut driver.state, driver.now);
            driver.run_effects(effects);

            match driver.state.phase {
                GamePhase::LevelIntro => {
                    log::info!(
                        "Level {}: {}",
                        driver.state.stats.level,
                        driver.state.level_config.as_ref().map_or("?", |c| c.name.as_str())
                    );
                    driver.send(Action::ConfirmLevelIntro);
                }
                GamePhase::Playing => {
                    let targets: Vec<u32> = driver
                        .state
                        .objects
                        .iter()
                        .filter(|o| !o.caught && !o.is_hazard() && o.pos.y >= REACH_Y)
                        .map(|o| o.id)
                        .collect();
                    for id in targets {
                        driver.send(Action::CatchObject(id));
                    }
                }
                GamePhase::Reward if driver.state.stats.level >= levels => {
                    log::info!("Autopilot cleared {} levels", levels);
                    break;
                }
                GamePhase::Reward => {
                    driver.send(Action::OpenRewardBox);
                    driver.send(Action::ConfirmNextLevel);
                }
                GamePhase::Lost => driver.send(Action::RequestAbandon),
                GamePhase::Summary => break,
                GamePhase::Start | GamePhase::Won => {}
            }
        }

        let state = &driver.state;
        Report {
            level: state.stats.level,
            score: state.stats.score,
            gifts: state.stats.gifts_found,
            missed: state.stats.missed_count,
            blessing: state
                .summary
                .clone()
                .unwrap_or_else(|| genna_arcade::content::FALLBACK_BLESSING.to_string()),
        }
    }
}
