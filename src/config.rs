use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};
use std::time::Duration;

use crate::error::{NpcError, Result};
use crate::llm::openai::{DEFAULT_BASE_URL, DEFAULT_MODEL};
use crate::llm::RetryPolicy;

/// What to do when the model names an NPC after an existing one
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum NameCollisionPolicy {
    /// Keep the duplicate and log a warning
    #[default]
    Warn,
    /// Ask for a new character, up to `max_name_attempts` times
    Regenerate,
}

/// Settings for a generation run, loadable from TOML. Every field has a default.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct GeneratorConfig {
    pub model: String,
    pub base_url: String,
    /// Environment variable checked for the API key before `secrets_path`
    pub api_key_env: String,
    pub secrets_path: PathBuf,
    pub palette_temperature: f64,
    pub npc_temperature: f64,
    pub relationship_temperature: f64,
    pub request_timeout_secs: u64,
    pub max_retries: u32,
    pub initial_backoff_ms: u64,
    pub output_dir: PathBuf,
    pub prompts_dir: Option<PathBuf>,
    pub downscale_factor: f64,
    pub relationship_concurrency: usize,
    pub name_collision: NameCollisionPolicy,
    pub max_name_attempts: u32,
    pub seed: Option<u64>,
}

impl Default for GeneratorConfig {
    fn default() -> Self {
        Self {
            model: DEFAULT_MODEL.to_string(),
            base_url: DEFAULT_BASE_URL.to_string(),
            api_key_env: "OPENAI_API_KEY".to_string(),
            secrets_path: PathBuf::from(".secrets"),
            palette_temperature: 0.0,
            npc_temperature: 0.7,
            relationship_temperature: 0.7,
            request_timeout_secs: 120,
            max_retries: 2,
            initial_backoff_ms: 1000,
            output_dir: PathBuf::from("./characters"),
            prompts_dir: None,
            downscale_factor: 1.0,
            relationship_concurrency: 1,
            name_collision: NameCollisionPolicy::Warn,
            max_name_attempts: 3,
            seed: None,
        }
    }
}

impl GeneratorConfig {
    /// Reads a TOML file; missing keys fall back to the defaults
    pub fn load(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let text = fs::read_to_string(path)
            .map_err(|e| NpcError::Config(format!("cannot read {:?}: {}", path, e)))?;
        let config: Self = toml::from_str(&text)?;
        config.validate()?;
        log::debug!("Loaded configuration from {:?}", path);
        Ok(config)
    }

    pub fn validate(&self) -> Result<()> {
        if !(self.downscale_factor > 0.0) {
            return Err(NpcError::Config("downscale_factor must be positive".into()));
        }
        if self.request_timeout_secs == 0 {
            return Err(NpcError::Config("request_timeout_secs must be at least 1".into()));
        }
        if self.relationship_concurrency == 0 {
            return Err(NpcError::Config("relationship_concurrency must be at least 1".into()));
        }
        if self.max_name_attempts == 0 {
            return Err(NpcError::Config("max_name_attempts must be at least 1".into()));
        }
        for (label, t) in [
            ("palette_temperature", self.palette_temperature),
            ("npc_temperature", self.npc_temperature),
            ("relationship_temperature", self.relationship_temperature),
        ] {
            if !(0.0..=2.0).contains(&t) {
                return Err(NpcError::Config(format!("{} must be within [0, 2]", label)));
            }
        }
        Ok(())
    }

    pub fn request_timeout(&self) -> Duration {
        Duration::from_secs(self.request_timeout_secs)
    }

    pub fn retry_policy(&self) -> RetryPolicy {
        RetryPolicy {
            max_retries: self.max_retries,
            initial_backoff: Duration::from_millis(self.initial_backoff_ms),
            timeout: self.request_timeout(),
        }
    }
}
