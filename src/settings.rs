//! Game settings and preferences
//!
//! Read once at startup from a JSON block embedded in the host page.
//! Nothing is persisted between sessions.

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Settings JSON could not be used
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("invalid settings JSON: {0}")]
    Parse(#[from] serde_json::Error),
}

/// Game settings/preferences
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Settings {
    // === Audio ===
    /// Master volume (0.0 - 1.0)
    pub master_volume: f32,
    /// Sound effects volume (0.0 - 1.0)
    pub sfx_volume: f32,
    pub muted: bool,

    // === Accessibility ===
    /// Reduced motion (suppresses the alarm flash)
    pub reduced_motion: bool,

    // === Content ===
    /// Base URL of the `generateContent` API
    pub content_endpoint: String,
    pub content_model: String,
    /// Empty means every request falls back to built-in content
    pub api_key: String,

    /// Fixed RNG seed; the host picks one from the clock when absent
    pub seed: Option<u64>,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            master_volume: 0.8,
            sfx_volume: 1.0,
            muted: false,

            reduced_motion: false,

            content_endpoint: "https://generativelanguage.googleapis.com/v1beta".to_string(),
            content_model: "gemini-3-flash-preview".to_string(),
            api_key: String::new(),

            seed: None,
        }
    }
}

impl Settings {
    /// Element id of the embedded config block
    pub const CONFIG_ELEMENT_ID: &'static str = "genna-config";

    /// Parse settings JSON; missing fields take their defaults
    pub fn from_json(json: &str) -> Result<Self, ConfigError> {
        Ok(serde_json::from_str(json)?)
    }

    /// Effective sound volume (0 when muted)
    pub fn effective_volume(&self) -> f32 {
        if self.muted {
            0.0
        } else {
            self.master_volume.clamp(0.0, 1.0) * self.sfx_volume.clamp(0.0, 1.0)
        }
    }

    /// Whether the alarm flash should be drawn (respects reduced_motion)
    pub fn effective_alarm(&self, alarm: bool) -> bool {
        alarm && !self.reduced_motion
    }

    /// Load settings from the page's config block (WASM only)
    #[cfg(target_arch = "wasm32")]
    pub fn load() -> Self {
        let text = web_sys::window()
            .and_then(|w| w.document())
            .and_then(|d| d.get_element_by_id(Self::CONFIG_ELEMENT_ID))
            .and_then(|el| el.text_content());

        match text {
            Some(json) => match Self::from_json(&json) {
                Ok(settings) => {
                    log::info!("Loaded settings from #{}", Self::CONFIG_ELEMENT_ID);
                    settings
                }
                Err(e) => {
                    log::warn!("{}, using default settings", e);
                    Self::default()
                }
            },
            None => {
                log::info!("Using default settings");
                Self::default()
            }
        }
    }

    /// Native stub
    #[cfg(not(target_arch = "wasm32"))]
    pub fn load() -> Self {
        Self::default()
    }
}
