//! Generated level, reward and blessing content
//!
//! A `Generator` turns a prompt into model text. `ContentService` wraps it
//! and never fails: any transport, parse or schema problem is logged and
//! replaced with built-in fallback content.

use serde::Deserialize;
use serde_json::{Value, json};
use thiserror::Error;

use crate::sim::{Content, Effect, LevelConfig, LevelItem, Reward};

/// Blessing used when the generator has nothing to say
pub const FALLBACK_BLESSING: &str = "May your journey be filled with light!";

/// Why a content request produced nothing usable
#[derive(Debug, Error)]
pub enum ContentError {
    #[error("transport failed: {0}")]
    Transport(String),
    #[error("response carried no text")]
    MissingText,
    #[error("malformed JSON: {0}")]
    Parse(#[from] serde_json::Error),
    #[error("content out of range: {0}")]
    Schema(String),
}

/// Text generation backend
#[allow(async_fn_in_trait)]
pub trait Generator {
    /// Send `prompt`; with a `schema` the reply must be JSON matching it
    async fn generate(&self, prompt: &str, schema: Option<&Value>) -> Result<String, ContentError>;
}

/// Backend that is never reachable; every request uses fallback content
#[derive(Debug, Clone, Copy, Default)]
pub struct Offline;

impl Generator for Offline {
    async fn generate(&self, _prompt: &str, _schema: Option<&Value>) -> Result<String, ContentError> {
        Err(ContentError::Transport("offline".to_string()))
    }
}

/// Never-failing content source
#[derive(Debug, Clone)]
pub struct ContentService<G> {
    generator: G,
}

impl<G: Generator> ContentService<G> {
    pub fn new(generator: G) -> Self {
        Self { generator }
    }

    /// Level descriptor for `level`, or the built-in one
    pub async fn level_config(&self, level: u32) -> LevelConfig {
        match self.try_level_config(level).await {
            Ok(config) => config,
            Err(e) => {
                log::warn!("Level {} generation failed ({}), using fallback", level, e);
                fallback_level(level)
            }
        }
    }

    /// Gift for beating `level`, or the built-in one
    pub async fn reward(&self, level: u32) -> Reward {
        match self.try_reward(level).await {
            Ok(reward) => reward,
            Err(e) => {
                log::warn!("Reward generation failed ({}), using fallback", e);
                fallback_reward()
            }
        }
    }

    /// Closing blessing for `score`, or the built-in one
    pub async fn summary(&self, score: u64) -> String {
        match self.try_summary(score).await {
            Ok(text) => text,
            Err(e) => {
                log::warn!("Blessing generation failed ({}), using fallback", e);
                FALLBACK_BLESSING.to_string()
            }
        }
    }

    /// Carry out a fetch effect. Non-fetch effects yield `None`.
    pub async fn fetch(&self, effect: &Effect) -> Option<Content> {
        match *effect {
            Effect::FetchLevel { level } => Some(Content::Level {
                level,
                config: self.level_config(level).await,
            }),
            Effect::FetchReward { level } => Some(Content::Reward {
                level,
                reward: self.reward(level).await,
            }),
            Effect::FetchSummary { score } => Some(Content::Summary(self.summary(score).await)),
            Effect::Feedback(_) => None,
        }
    }

    async fn try_level_config(&self, level: u32) -> Result<LevelConfig, ContentError> {
        let text = self
            .generator
            .generate(&level_prompt(level), Some(&level_schema()))
            .await?;
        parse_level_config(&text)
    }

    async fn try_reward(&self, level: u32) -> Result<Reward, ContentError> {
        let text = self
            .generator
            .generate(&reward_prompt(level), Some(&reward_schema()))
            .await?;
        parse_reward(&text)
    }

    async fn try_summary(&self, score: u64) -> Result<String, ContentError> {
        let text = self.generator.generate(&summary_prompt(score), None).await?;
        let text = text.trim();
        if text.is_empty() {
            return Err(ContentError::MissingText);
        }
        Ok(text.to_string())
    }
}

/// Built-in level: fixed palette, four gifts and two hazards
pub fn fallback_level(level: u32) -> LevelConfig {
    let item = |icon: &str, points: i32, color: &str| LevelItem {
        icon: icon.to_string(),
        points,
        color: color.to_string(),
    };
    LevelConfig {
        name: format!("Sanctuary {}", level),
        description: "A mysterious realm of floating treasures.".to_string(),
        target_score: level as u64 * 2000,
        spawn_rate: 0.6,
        speed_multiplier: 1.5 + level as f32 * 0.2,
        theme_color: "#0a0a0f".to_string(),
        accent_color: "#ef4444".to_string(),
        items: vec![
            item("fa-gift", 150, "text-red-500"),
            item("fa-star", 300, "text-yellow-400"),
            item("fa-skull", -600, "text-purple-600"),
            item("fa-leaf", 100, "text-green-500"),
            item("fa-bomb", -1200, "text-gray-500"),
            item("fa-moon", 250, "text-indigo-400"),
        ],
    }
}

pub fn fallback_reward() -> Reward {
    Reward {
        name: "Traditional Scarf".to_string(),
        meaning: "Woven with the colors of peace and unity.".to_string(),
        icon: "fa-scroll".to_string(),
    }
}

/// Parse and sanity-check a generated level
pub fn parse_level_config(text: &str) -> Result<LevelConfig, ContentError> {
    let config: LevelConfig = serde_json::from_str(text)?;

    if config.items.is_empty() {
        return Err(ContentError::Schema("no items".to_string()));
    }
    if !config.items.iter().any(|i| i.points > 0) {
        return Err(ContentError::Schema("no collectible items".to_string()));
    }
    if !(config.spawn_rate.is_finite() && config.spawn_rate > 0.0) {
        return Err(ContentError::Schema(format!("spawn rate {}", config.spawn_rate)));
    }
    if !(config.speed_multiplier.is_finite() && config.speed_multiplier > 0.0) {
        return Err(ContentError::Schema(format!(
            "speed multiplier {}",
            config.speed_multiplier
        )));
    }
    if config.target_score == 0 {
        return Err(ContentError::Schema("zero target score".to_string()));
    }
    Ok(config)
}

pub fn parse_reward(text: &str) -> Result<Reward, ContentError> {
    let reward: Reward = serde_json::from_str(text)?;
    if reward.name.trim().is_empty() {
        return Err(ContentError::Schema("unnamed reward".to_string()));
    }
    Ok(reward)
}

pub fn level_prompt(level: u32) -> String {
    format!(
        "Design level {level} for an Ethiopian Genna arcade game. \
         The game should be challenging but fair.\n\
         Provide:\n\
         1. A unique level name and cultural description.\n\
         2. Stats: targetScore (approx {target}), spawnRate (0.3-0.7), speedMultiplier (balanced: 1.2-3.2).\n\
         3. Visual Theme: A primary themeColor and a high-contrast accentColor (Hex codes).\n\
         4. Custom Items: A list of 6 unique items relevant to this level's theme.\n\
            - 4 Positive items (high points).\n\
            - 2 CURSED items (negative points, e.g. fa-skull, fa-bomb, fa-poo-storm).\n\
            Each item needs a FontAwesome icon, point value (negative for hazards), and color class.",
        target = level * 2500
    )
}

pub fn reward_prompt(level: u32) -> String {
    format!(
        "Generate a traditional Ethiopian Genna gift for beating Level {level}. \
         Name, meaning, and FontAwesome icon."
    )
}

pub fn summary_prompt(score: u64) -> String {
    format!("Write a short professional New Year blessing for score {score}.")
}

/// Response schema for `level_prompt`
pub fn level_schema() -> Value {
    json!({
        "type": "OBJECT",
        "properties": {
            "name": { "type": "STRING" },
            "description": { "type": "STRING" },
            "targetScore": { "type": "INTEGER" },
            "spawnRate": { "type": "NUMBER" },
            "speedMultiplier": { "type": "NUMBER" },
            "themeColor": { "type": "STRING" },
            "accentColor": { "type": "STRING" },
            "items": {
                "type": "ARRAY",
                "items": {
                    "type": "OBJECT",
                    "properties": {
                        "icon": { "type": "STRING" },
                        "points": { "type": "INTEGER" },
                        "color": { "type": "STRING" }
                    },
                    "required": ["icon", "points", "color"]
                }
            }
        },
        "required": [
            "name", "description", "targetScore", "spawnRate",
            "speedMultiplier", "themeColor", "accentColor", "items"
        ]
    })
}

/// Response schema for `reward_prompt`
pub fn reward_schema() -> Value {
    json!({
        "type": "OBJECT",
        "properties": {
            "name": { "type": "STRING" },
            "meaning": { "type": "STRING" },
            "icon": { "type": "STRING" }
        },
        "required": ["name", "meaning", "icon"]
    })
}

/// `generateContent` request body
pub fn request_body(prompt: &str, schema: Option<&Value>) -> Value {
    let mut body = json!({
        "contents": [{ "parts": [{ "text": prompt }] }]
    });
    if let Some(schema) = schema {
        body["generationConfig"] = json!({
            "responseMimeType": "application/json",
            "responseSchema": schema
        });
    }
    body
}

#[derive(Debug, Deserialize)]
struct GenerateResponse {
    #[serde(default)]
    candidates: Vec<Candidate>,
}

#[derive(Debug, Deserialize)]
struct Candidate {
    content: Option<CandidateContent>,
}

#[derive(Debug, Deserialize)]
struct CandidateContent {
    #[serde(default)]
    parts: Vec<Part>,
}

#[derive(Debug, Deserialize)]
struct Part {
    text: Option<String>,
}

/// Pull the model text out of a `generateContent` response body
pub fn extract_text(body: &str) -> Result<String, ContentError> {
    let response: GenerateResponse = serde_json::from_str(body)?;
    let text: String = response
        .candidates
        .into_iter()
        .next()
        .and_then(|c| c.content)
        .map(|c| c.parts.into_iter().filter_map(|p| p.text).collect())
        .unwrap_or_default();
    if text.is_empty() {
        return Err(ContentError::MissingText);
    }
    Ok(text)
}

/// HTTP backend speaking the `generateContent` REST protocol (browser only)
#[cfg(target_arch = "wasm32")]
pub mod http {
    use serde_json::Value;
    use wasm_bindgen::{JsCast, JsValue};
    use wasm_bindgen_futures::JsFuture;
    use web_sys::{Request, RequestInit, RequestMode, Response};

    use super::{ContentError, Generator, extract_text, request_body};
    use crate::settings::Settings;

    #[derive(Debug, Clone)]
    pub struct HttpGenerator {
        endpoint: String,
        model: String,
        api_key: String,
    }

    impl HttpGenerator {
        pub fn from_settings(settings: &Settings) -> Self {
            Self {
                endpoint: settings.content_endpoint.trim_end_matches('/').to_string(),
                model: settings.content_model.clone(),
                api_key: settings.api_key.clone(),
            }
        }
    }

    fn js_err(e: JsValue) -> ContentError {
        ContentError::Transport(format!("{:?}", e))
    }

    impl Generator for HttpGenerator {
        async fn generate(&self, prompt: &str, schema: Option<&Value>) -> Result<String, ContentError> {
            if self.api_key.is_empty() {
                return Err(ContentError::Transport("no API key configured".to_string()));
            }
            let url = format!(
                "{}/models/{}:generateContent?key={}",
                self.endpoint, self.model, self.api_key
            );
            let body = request_body(prompt, schema).to_string();

            let opts = RequestInit::new();
            opts.set_method("POST");
            opts.set_mode(RequestMode::Cors);
            opts.set_body(&JsValue::from_str(&body));
            let request = Request::new_with_str_and_init(&url, &opts).map_err(js_err)?;
            request
                .headers()
                .set("Content-Type", "application/json")
                .map_err(js_err)?;

            let window = web_sys::window()
                .ok_or_else(|| ContentError::Transport("no window".to_string()))?;
            let response: Response = JsFuture::from(window.fetch_with_request(&request))
                .await
                .map_err(js_err)?
                .dyn_into()
                .map_err(js_err)?;
            if !response.ok() {
                return Err(ContentError::Transport(format!("HTTP {}", response.status())));
            }

            let text = JsFuture::from(response.text().map_err(js_err)?)
                .await
                .map_err(js_err)?;
            let body = text.as_string().ok_or(ContentError::MissingText)?;
            extract_text(&body)
        }
    }
}
