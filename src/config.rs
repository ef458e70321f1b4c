//! Studio configuration
//!
//! Defaults match the behaviour of the shipped studio; environment variables
//! override the AI section so the credential never has to live in a file.

use std::env;
use std::fs;
use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::error::{Result, StudioError};

/// Environment variable holding the generative-AI credential.
pub const API_KEY_VAR: &str = "API_KEY";

/// Fallback credential variable.
pub const GEMINI_API_KEY_VAR: &str = "GEMINI_API_KEY";

const BASE_URL_VAR: &str = "DAW_SHELL_AI_BASE_URL";
const MODEL_VAR: &str = "DAW_SHELL_AI_MODEL";
const TIMEOUT_VAR: &str = "DAW_SHELL_AI_TIMEOUT_MS";

/// Top-level configuration.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct StudioConfig {
    #[serde(default)]
    pub ai: AiConfig,

    #[serde(default)]
    pub history: HistoryConfig,

    #[serde(default)]
    pub timeline: TimelineConfig,

    #[serde(default)]
    pub transport: TransportConfig,
}

/// Settings for the generative-AI collaborator.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AiConfig {
    /// Credential; absent means every generator reports a missing key.
    #[serde(default, skip_serializing)]
    pub api_key: Option<String>,

    /// Base URL of the generateContent API.
    #[serde(default = "default_base_url")]
    pub base_url: String,

    /// Model used for all three generators.
    #[serde(default = "default_model")]
    pub model: String,

    /// Request timeout in milliseconds.
    #[serde(default = "default_timeout_ms")]
    pub timeout_ms: u64,

    /// Sampling temperature for lyrics.
    #[serde(default = "default_lyrics_temperature")]
    pub lyrics_temperature: f32,
}

fn default_base_url() -> String {
    "https://generativelanguage.googleapis.com".to_string()
}

fn default_model() -> String {
    "gemini-2.5-flash".to_string()
}

fn default_timeout_ms() -> u64 {
    60_000
}

fn default_lyrics_temperature() -> f32 {
    0.8
}

impl Default for AiConfig {
    fn default() -> Self {
        Self {
            api_key: None,
            base_url: default_base_url(),
            model: default_model(),
            timeout_ms: default_timeout_ms(),
            lyrics_temperature: default_lyrics_temperature(),
        }
    }
}

/// Undo history limits.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct HistoryConfig {
    #[serde(default = "default_max_levels")]
    pub max_levels: usize,
}

fn default_max_levels() -> usize {
    crate::state::history::DEFAULT_MAX_UNDO_LEVELS
}

impl Default for HistoryConfig {
    fn default() -> Self {
        Self {
            max_levels: default_max_levels(),
        }
    }
}

/// Timeline view defaults.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TimelineConfig {
    /// Initial zoom in pixels per second.
    #[serde(default = "default_zoom")]
    pub zoom: f64,

    /// Whether the view follows the playhead while playing.
    #[serde(default = "default_true")]
    pub auto_follow: bool,

    #[serde(default = "default_view_width")]
    pub view_width: f64,

    #[serde(default = "default_view_height")]
    pub view_height: f64,
}

fn default_zoom() -> f64 {
    crate::timeline::viewport::DEFAULT_ZOOM
}

fn default_true() -> bool {
    true
}

fn default_view_width() -> f64 {
    1280.0
}

fn default_view_height() -> f64 {
    600.0
}

impl Default for TimelineConfig {
    fn default() -> Self {
        Self {
            zoom: default_zoom(),
            auto_follow: true,
            view_width: default_view_width(),
            view_height: default_view_height(),
        }
    }
}

/// Frame loop pacing.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TransportConfig {
    #[serde(default = "default_frame_interval_ms")]
    pub frame_interval_ms: u64,
}

fn default_frame_interval_ms() -> u64 {
    16
}

impl Default for TransportConfig {
    fn default() -> Self {
        Self {
            frame_interval_ms: default_frame_interval_ms(),
        }
    }
}

impl StudioConfig {
    /// Build a configuration from defaults plus environment overrides.
    pub fn from_env() -> Self {
        let mut config = Self::default();
        config.apply_env();
        config
    }

    /// Load a JSON configuration file, then apply environment overrides.
    pub fn from_json_file(path: &Path) -> Result<Self> {
        let content = fs::read_to_string(path).map_err(|e| StudioError::Config {
            reason: format!("cannot read {}: {}", path.display(), e),
        })?;
        let mut config: StudioConfig = serde_json::from_str(&content)?;
        config.apply_env();
        config.validate()?;
        Ok(config)
    }

    fn apply_env(&mut self) {
        let key = env::var(API_KEY_VAR)
            .or_else(|_| env::var(GEMINI_API_KEY_VAR))
            .ok()
            .filter(|k| !k.trim().is_empty());
        if key.is_some() {
            self.ai.api_key = key;
        }
        if let Ok(url) = env::var(BASE_URL_VAR) {
            self.ai.base_url = url;
        }
        if let Ok(model) = env::var(MODEL_VAR) {
            self.ai.model = model;
        }
        if let Some(timeout) = env::var(TIMEOUT_VAR).ok().and_then(|s| s.parse().ok()) {
            self.ai.timeout_ms = timeout;
        }
    }

    /// Reject values the studio cannot work with.
    pub fn validate(&self) -> Result<()> {
        if !self.timeline.zoom.is_finite() || self.timeline.zoom <= 0.0 {
            return Err(StudioError::Config {
                reason: format!("timeline.zoom must be positive, got {}", self.timeline.zoom),
            });
        }
        if self.transport.frame_interval_ms == 0 {
            return Err(StudioError::Config {
                reason: "transport.frame_interval_ms must be at least 1".to_string(),
            });
        }
        if self.ai.timeout_ms == 0 {
            return Err(StudioError::Config {
                reason: "ai.timeout_ms must be at least 1".to_string(),
            });
        }
        if self.history.max_levels == 0 {
            return Err(StudioError::Config {
                reason: "history.max_levels must be at least 1".to_string(),
            });
        }
        Ok(())
    }
}
