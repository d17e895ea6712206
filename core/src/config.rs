use crate::errors::{SkyscoutError, SkyscoutResult};
use serde::{Deserialize, Serialize};
use std::env;
use std::fs;
use std::path::{Path, PathBuf};

const DEFAULT_MODEL: &str = "gemini-2.0-flash-exp";
const DEFAULT_AGENT_URL: &str = "http://127.0.0.1:8377";
const DEFAULT_RESULTS_FILE: &str = "kayak_search_results.json";

/// Configuration for the flight-search assistant
#[derive(Debug, Serialize, Deserialize, Clone)]
pub struct Config {
    pub api_key: Option<String>,
    pub model_name: Option<String>,
    pub system_prompt: Option<String>,
    pub agent_url: Option<String>,
    pub results_file: Option<PathBuf>,
    pub log_level: Option<String>,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            api_key: None,
            model_name: Some(DEFAULT_MODEL.to_string()),
            system_prompt: None,
            agent_url: Some(DEFAULT_AGENT_URL.to_string()),
            results_file: Some(PathBuf::from(DEFAULT_RESULTS_FILE)),
            log_level: None,
        }
    }
}

impl Config {
    /// Loads configuration from a file if it exists, otherwise returns the default config
    pub fn load_from_file(path: &Path) -> SkyscoutResult<Self> {
        if path.exists() {
            let content = fs::read_to_string(path).map_err(|e| {
                SkyscoutError::ConfigError(format!("Failed to read config file: {}", e))
            })?;

            let config: Self = toml::from_str(&content).map_err(|e| {
                SkyscoutError::ConfigError(format!("Failed to parse config file: {}", e))
            })?;

            Ok(config)
        } else {
            Ok(Self::default())
        }
    }

    /// Loads the layered configuration: defaults, then the config file,
    /// then environment overrides.
    pub fn load() -> SkyscoutResult<Self> {
        let file_config = match get_default_config_file("skyscout") {
            Ok(path) => Self::load_from_file(&path)?,
            Err(_) => Self::default(),
        };
        Ok(Self::default().merge(&file_config).with_env_overrides())
    }

    /// Merges this config with another config, preferring values from the other config if present
    pub fn merge(&self, other: &Self) -> Self {
        Self {
            api_key: other.api_key.clone().or_else(|| self.api_key.clone()),
            model_name: other.model_name.clone().or_else(|| self.model_name.clone()),
            system_prompt: other
                .system_prompt
                .clone()
                .or_else(|| self.system_prompt.clone()),
            agent_url: other.agent_url.clone().or_else(|| self.agent_url.clone()),
            results_file: other
                .results_file
                .clone()
                .or_else(|| self.results_file.clone()),
            log_level: other.log_level.clone().or_else(|| self.log_level.clone()),
        }
    }

    /// Applies environment variable overrides on top of this config
    pub fn with_env_overrides(mut self) -> Self {
        if let Ok(key) = env::var("GEMINI_API_KEY") {
            if !key.is_empty() {
                self.api_key = Some(key);
            }
        }
        if let Ok(url) = env::var("SKYSCOUT_AGENT_URL") {
            if !url.is_empty() {
                self.agent_url = Some(url);
            }
        }
        self
    }

    /// Returns the API key, or `MissingCredential` if absent.
    ///
    /// Absence is fatal at startup: callers check this before any
    /// interactive work begins.
    pub fn require_api_key(&self) -> SkyscoutResult<String> {
        self.api_key.clone().filter(|k| !k.is_empty()).ok_or_else(|| {
            SkyscoutError::MissingCredential(
                "GEMINI_API_KEY not found in environment or config file".to_string(),
            )
        })
    }

    pub fn agent_url(&self) -> String {
        self.agent_url
            .clone()
            .unwrap_or_else(|| DEFAULT_AGENT_URL.to_string())
    }

    pub fn results_file(&self) -> PathBuf {
        self.results_file
            .clone()
            .unwrap_or_else(|| PathBuf::from(DEFAULT_RESULTS_FILE))
    }
}

/// Helper function to get default config directory
pub fn get_default_config_dir(app_name: &str) -> SkyscoutResult<PathBuf> {
    let home_dir = dirs::home_dir().ok_or_else(|| {
        SkyscoutError::ConfigError("Could not determine home directory".to_string())
    })?;

    Ok(home_dir.join(".config").join(app_name))
}

/// Helper function to get default config file path
pub fn get_default_config_file(app_name: &str) -> SkyscoutResult<PathBuf> {
    let config_dir = get_default_config_dir(app_name)?;
    Ok(config_dir.join("config.toml"))
}
