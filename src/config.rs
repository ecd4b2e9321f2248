use anyhow::Result;
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

pub const DEFAULT_PROMPT: &str = "Please enter your email address: ";

/// A validation error in the configuration
#[derive(Debug, Clone)]
pub struct ValidationError {
    pub field: String,
    pub message: String,
}

impl std::fmt::Display for ValidationError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "[{}]: {}", self.field, self.message)
    }
}

/// Settings for the interactive prompt loop
#[derive(Debug, Clone, Serialize)]
pub struct PromptConfig {
    pub text: String,
    /// Unlimited when unset
    pub max_attempts: Option<usize>,
    pub explain: bool,
    pub history: bool,
}

impl Default for PromptConfig {
    fn default() -> Self {
        Self {
            text: DEFAULT_PROMPT.to_string(),
            max_attempts: None,
            explain: false,
            history: true,
        }
    }
}

/// Settings for the JSONL session transcript
#[derive(Debug, Clone, Serialize)]
pub struct TranscriptConfig {
    pub enabled: bool,
    pub dir: PathBuf,
}

impl Default for TranscriptConfig {
    fn default() -> Self {
        Self {
            enabled: false,
            dir: Path::new(".mailcheck").join("sessions"),
        }
    }
}

/// Main configuration structure
#[derive(Debug, Clone, Serialize, Default)]
pub struct Config {
    pub prompt: PromptConfig,
    pub transcript: TranscriptConfig,
}

/// Same shape as `Config`, but every field is optional so a layer only
/// overrides what it actually sets.
#[derive(Debug, Clone, Deserialize, Default)]
struct ConfigLayer {
    #[serde(default)]
    prompt: PromptLayer,
    #[serde(default)]
    transcript: TranscriptLayer,
}

#[derive(Debug, Clone, Deserialize, Default)]
struct PromptLayer {
    text: Option<String>,
    max_attempts: Option<usize>,
    explain: Option<bool>,
    history: Option<bool>,
}

#[derive(Debug, Clone, Deserialize, Default)]
struct TranscriptLayer {
    enabled: Option<bool>,
    dir: Option<PathBuf>,
}

impl Config {
    /// Load configuration from default paths
    /// Priority: local (.mailcheck/config.local.toml) > project (.mailcheck/config.toml)
    /// > user (~/.mailcheck/config.toml) > built-in defaults
    pub fn load() -> Result<Self> {
        let mut config = Self::default();

        if let Some(home) = dirs::home_dir() {
            let user_config = home.join(".mailcheck").join("config.toml");
            if user_config.exists() {
                config.merge_file(&user_config)?;
            }
        }

        let project_dir = Path::new(".mailcheck");
        for name in ["config.toml", "config.local.toml"] {
            let path = project_dir.join(name);
            if path.exists() {
                config.merge_file(&path)?;
            }
        }

        Ok(config)
    }

    /// Load configuration from a specific path, on top of the defaults
    pub fn load_from(path: &Path) -> Result<Self> {
        let mut config = Self::default();
        config.merge_file(path)?;
        Ok(config)
    }

    fn merge_file(&mut self, path: &Path) -> Result<()> {
        let content = std::fs::read_to_string(path)?;
        let layer: ConfigLayer = toml::from_str(&content)
            .map_err(|e| anyhow::anyhow!("failed to parse {}: {}", path.display(), e))?;
        self.merge(layer);
        Ok(())
    }

    /// Merge a layer into this config (layer takes priority where set)
    fn merge(&mut self, other: ConfigLayer) {
        if let Some(text) = other.prompt.text {
            self.prompt.text = text;
        }
        if other.prompt.max_attempts.is_some() {
            self.prompt.max_attempts = other.prompt.max_attempts;
        }
        if let Some(explain) = other.prompt.explain {
            self.prompt.explain = explain;
        }
        if let Some(history) = other.prompt.history {
            self.prompt.history = history;
        }

        if let Some(enabled) = other.transcript.enabled {
            self.transcript.enabled = enabled;
        }
        if let Some(dir) = other.transcript.dir {
            self.transcript.dir = dir;
        }
    }

    /// Path of the persistent line-editor history, if history is enabled
    pub fn history_path(&self) -> Option<PathBuf> {
        if !self.prompt.history {
            return None;
        }
        dirs::home_dir().map(|home| home.join(".mailcheck").join("history.txt"))
    }

    /// Validate configuration and return any errors found
    pub fn validate(&self) -> Result<(), Vec<ValidationError>> {
        let mut errors = Vec::new();

        if self.prompt.max_attempts == Some(0) {
            errors.push(ValidationError {
                field: "prompt.max_attempts".to_string(),
                message: "Must be greater than 0".to_string(),
            });
        }

        if self.prompt.text.trim().is_empty() {
            errors.push(ValidationError {
                field: "prompt.text".to_string(),
                message: "Prompt text must not be empty".to_string(),
            });
        }

        if self.transcript.enabled && self.transcript.dir.as_os_str().is_empty() {
            errors.push(ValidationError {
                field: "transcript.dir".to_string(),
                message: "Directory required when transcript is enabled".to_string(),
            });
        }

        if errors.is_empty() {
            Ok(())
        } else {
            Err(errors)
        }
    }
}
