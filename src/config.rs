//! Process-wide settings.
//!
//! Sources are layered, later wins: built-in defaults, an optional YAML
//! file, then environment variables.

use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Errors loading settings.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("failed to read settings file {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("invalid settings YAML: {0}")]
    Yaml(#[from] serde_yaml::Error),
}

/// Runtime settings shared by every capability.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct Settings {
    /// Chat model identifier.
    pub model: String,
    /// Base URL of the OpenAI-compatible API.
    pub api_base: String,
    /// API key; `None` disables language-model calls.
    pub api_key: Option<String>,
    /// Per-request timeout in seconds.
    pub request_timeout_secs: u64,
    /// Retries on transient API failures.
    pub max_retries: u32,
    /// Interpreter used by `ExecTool`.
    pub exec_interpreter: String,
    /// Working directory for shell and exec capabilities.
    pub working_dir: Option<PathBuf>,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            model: "gpt-4-1106-preview".to_string(),
            api_base: "https://api.openai.com/v1".to_string(),
            api_key: None,
            request_timeout_secs: 120,
            max_retries: 2,
            exec_interpreter: "python3".to_string(),
            working_dir: None,
        }
    }
}

impl Settings {
    /// Parse settings from YAML. Missing keys keep their defaults.
    pub fn from_yaml_str(yaml: &str) -> Result<Self, ConfigError> {
        if yaml.trim().is_empty() {
            return Ok(Self::default());
        }
        Ok(serde_yaml::from_str(yaml)?)
    }

    /// Read settings from a YAML file.
    pub fn from_yaml_file(path: &Path) -> Result<Self, ConfigError> {
        let text = std::fs::read_to_string(path).map_err(|source| ConfigError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        Self::from_yaml_str(&text)
    }

    /// Overlay values from an environment lookup.
    ///
    /// Empty values are ignored.
    pub fn apply_env<F>(mut self, lookup: F) -> Self
    where
        F: Fn(&str) -> Option<String>,
    {
        let get = |key: &str| lookup(key).filter(|v| !v.trim().is_empty());

        if let Some(key) = get("OPENAI_API_KEY") {
            self.api_key = Some(key);
        }
        if let Some(base) = get("OPENAI_BASE_URL") {
            self.api_base = base;
        }
        if let Some(model) = get("TOOLSMITH_MODEL") {
            self.model = model;
        }
        if let Some(interpreter) = get("TOOLSMITH_EXEC_INTERPRETER") {
            self.exec_interpreter = interpreter;
        }
        if let Some(dir) = get("TOOLSMITH_WORKDIR") {
            self.working_dir = Some(PathBuf::from(dir));
        }
        self
    }

    /// Load defaults, then `path` if given, then the process environment.
    pub fn load(path: Option<&Path>) -> Result<Self, ConfigError> {
        let base = match path {
            Some(path) => {
                log::debug!("Loading settings from {}", path.display());
                Self::from_yaml_file(path)?
            }
            None => Self::default(),
        };
        Ok(base.apply_env(|key| std::env::var(key).ok()))
    }
}
