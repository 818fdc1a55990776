use crate::error::Result;
use crate::{io, paths};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use std::time::Duration;

/// Placeholder value shipped in setup docs; treated as "no key configured".
pub const PLACEHOLDER_API_KEY: &str = "YOUR_KEY_HERE";

// ---------------------------------------------------------------------------
// ConfigWarning / WarnLevel
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ConfigWarning {
    pub level: WarnLevel,
    pub message: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum WarnLevel {
    Warning,
    Error,
}

// ---------------------------------------------------------------------------
// ModelConfig
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct ModelConfig {
    #[serde(default = "default_base_url")]
    pub base_url: String,
    #[serde(default = "default_model")]
    pub model: String,
    /// Model used for web-search grounded requests. Falls back to `model`.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub grounded_model: Option<String>,
    #[serde(default = "default_api_key_env")]
    pub api_key_env: String,
    #[serde(default = "default_timeout_seconds")]
    pub timeout_seconds: u64,
    #[serde(default = "default_connect_timeout_seconds")]
    pub connect_timeout_seconds: u64,
    /// Total attempts for a rate-limited request, first attempt included.
    #[serde(default = "default_max_attempts")]
    pub max_attempts: u32,
    #[serde(default = "default_backoff_base_ms")]
    pub backoff_base_ms: u64,
}

fn default_base_url() -> String {
    "https://generativelanguage.googleapis.com/v1beta".to_string()
}

fn default_model() -> String {
    "gemini-2.5-flash-preview-05-20".to_string()
}

fn default_api_key_env() -> String {
    "GEMINI_API_KEY".to_string()
}

fn default_timeout_seconds() -> u64 {
    60
}

fn default_connect_timeout_seconds() -> u64 {
    10
}

fn default_max_attempts() -> u32 {
    3
}

fn default_backoff_base_ms() -> u64 {
    1000
}

impl Default for ModelConfig {
    fn default() -> Self {
        Self {
            base_url: default_base_url(),
            model: default_model(),
            grounded_model: None,
            api_key_env: default_api_key_env(),
            timeout_seconds: default_timeout_seconds(),
            connect_timeout_seconds: default_connect_timeout_seconds(),
            max_attempts: default_max_attempts(),
            backoff_base_ms: default_backoff_base_ms(),
        }
    }
}

impl ModelConfig {
    /// `generateContent` endpoint for a plain or grounded request.
    pub fn endpoint(&self, grounded: bool) -> String {
        let model = if grounded {
            self.grounded_model.as_deref().unwrap_or(&self.model)
        } else {
            &self.model
        };
        format!(
            "{}/models/{}:generateContent",
            self.base_url.trim_end_matches('/'),
            model
        )
    }

    pub fn timeout(&self) -> Duration {
        Duration::from_secs(self.timeout_seconds)
    }

    pub fn connect_timeout(&self) -> Duration {
        Duration::from_secs(self.connect_timeout_seconds)
    }

    /// Delay before retrying after the 0-based `attempt` failed: base * 2^attempt.
    pub fn backoff(&self, attempt: u32) -> Duration {
        let factor = 2u64.saturating_pow(attempt);
        Duration::from_millis(self.backoff_base_ms.saturating_mul(factor))
    }

    /// Read the API key from the configured environment variable.
    pub fn api_key_from_env(&self) -> Option<String> {
        normalize_api_key(std::env::var(&self.api_key_env).ok())
    }
}

/// Strip stray quotes and reject empty or placeholder keys.
pub fn normalize_api_key(raw: Option<String>) -> Option<String> {
    let raw = raw?;
    let key = raw.trim().trim_matches(|c| c == '\'' || c == '"').trim();
    if key.is_empty() || key == PLACEHOLDER_API_KEY {
        None
    } else {
        Some(key.to_string())
    }
}

// ---------------------------------------------------------------------------
// RecipesConfig
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct RecipesConfig {
    #[serde(default = "default_recipes_file")]
    pub file: PathBuf,
}

fn default_recipes_file() -> PathBuf {
    PathBuf::from(paths::DEFAULT_RECIPES_FILE)
}

impl Default for RecipesConfig {
    fn default() -> Self {
        Self {
            file: default_recipes_file(),
        }
    }
}

// ---------------------------------------------------------------------------
// Config
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
pub struct Config {
    #[serde(default)]
    pub model: ModelConfig,
    #[serde(default)]
    pub recipes: RecipesConfig,
}

impl Config {
    /// Load `.assist/config.yaml`, falling back to defaults when it is absent.
    pub fn load(root: &Path) -> Result<Self> {
        let path = paths::config_path(root);
        if !path.exists() {
            return Ok(Self::default());
        }
        let data = std::fs::read_to_string(&path)?;
        let config: Config = serde_yaml::from_str(&data)?;
        Ok(config)
    }

    pub fn save(&self, root: &Path) -> Result<()> {
        let path = paths::config_path(root);
        let data = serde_yaml::to_string(self)?;
        io::atomic_write(&path, data.as_bytes())
    }

    /// Write the default config unless one already exists. Returns true if written.
    pub fn init(root: &Path) -> Result<bool> {
        let data = serde_yaml::to_string(&Self::default())?;
        io::write_if_missing(&paths::config_path(root), data.as_bytes())
    }

    pub fn recipes_path(&self, root: &Path) -> PathBuf {
        paths::recipes_path(root, &self.recipes.file)
    }

    pub fn validate(&self) -> Vec<ConfigWarning> {
        let mut warnings = Vec::new();
        let m = &self.model;

        if m.model.trim().is_empty() {
            warnings.push(ConfigWarning {
                level: WarnLevel::Error,
                message: "model.model is empty".to_string(),
            });
        }
        if !(m.base_url.starts_with("http://") || m.base_url.starts_with("https://")) {
            warnings.push(ConfigWarning {
                level: WarnLevel::Error,
                message: format!("model.base_url '{}' is not an http(s) URL", m.base_url),
            });
        }
        if m.max_attempts == 0 {
            warnings.push(ConfigWarning {
                level: WarnLevel::Error,
                message: "model.max_attempts=0: no request would ever be sent".to_string(),
            });
        } else if m.max_attempts > 10 {
            warnings.push(ConfigWarning {
                level: WarnLevel::Warning,
                message: format!("model.max_attempts={} (>10 is unusual)", m.max_attempts),
            });
        }
        if m.timeout_seconds == 0 {
            warnings.push(ConfigWarning {
                level: WarnLevel::Warning,
                message: "model.timeout_seconds=0: every request will time out".to_string(),
            });
        }
        if m.api_key_env.trim().is_empty() {
            warnings.push(ConfigWarning {
                level: WarnLevel::Error,
                message: "model.api_key_env is empty".to_string(),
            });
        }
        if self.recipes.file.as_os_str().is_empty() {
            warnings.push(ConfigWarning {
                level: WarnLevel::Error,
                message: "recipes.file is empty".to_string(),
            });
        }

        warnings
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
