//! Configuration file support for recovery-aid.
//!
//! Settings come from, in order of priority: command-line flags,
//! `recovery-aid.toml` in the working directory, then
//! `<config dir>/recovery-aid/config.toml`.

use std::path::{Path, PathBuf};
use std::time::Duration;

use anyhow::{Context, Result};
use serde::Deserialize;

use recovery_aid_advice::{PromptVariant, DEFAULT_BASE_URL};
use recovery_aid_intake::QuestionnaireVariant;

/// The project config file name
pub const CONFIG_FILE_NAME: &str = "recovery-aid.toml";

const GLOBAL_CONFIG_DIR: &str = "recovery-aid";
const GLOBAL_CONFIG_FILE: &str = "config.toml";

const DEFAULT_TIMEOUT_SECS: u64 = 120;

/// Contents of a config file. Every field is optional.
#[derive(Debug, Deserialize, Default, Clone, PartialEq)]
#[serde(deny_unknown_fields)]
pub struct FileConfig {
    /// Default question set
    pub questionnaire: Option<QuestionnaireVariant>,
    /// Default prompt variant
    pub prompt: Option<PromptVariant>,
    /// Root URL of the chat-completion API
    pub base_url: Option<String>,
    /// Request timeout for the advice service
    pub timeout_secs: Option<u64>,
}

impl FileConfig {
    /// Load a config file.
    ///
    /// Returns:
    /// - `Ok(Some(config))` if file exists and parses successfully
    /// - `Ok(None)` if file does not exist
    /// - `Err(...)` if file exists but fails to parse (hard error)
    pub fn load_from(path: &Path) -> Result<Option<Self>> {
        if !path.exists() {
            return Ok(None);
        }

        let content = std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read {}", path.display()))?;

        let config: FileConfig = toml::from_str(&content)
            .with_context(|| format!("Failed to parse {}", path.display()))?;

        Ok(Some(config))
    }

    /// Load `recovery-aid.toml` from the working directory
    pub fn load_project(working_dir: &Path) -> Result<Option<Self>> {
        Self::load_from(&working_dir.join(CONFIG_FILE_NAME))
    }

    /// Load the per-user config, if the platform has a config directory
    pub fn load_global() -> Result<Option<Self>> {
        match global_config_path() {
            Some(path) => Self::load_from(&path),
            None => Ok(None),
        }
    }

    /// Fill unset fields from `fallback`
    pub fn or(self, fallback: FileConfig) -> FileConfig {
        FileConfig {
            questionnaire: self.questionnaire.or(fallback.questionnaire),
            prompt: self.prompt.or(fallback.prompt),
            base_url: self.base_url.or(fallback.base_url),
            timeout_secs: self.timeout_secs.or(fallback.timeout_secs),
        }
    }
}

pub fn global_config_path() -> Option<PathBuf> {
    dirs::config_dir().map(|dir| dir.join(GLOBAL_CONFIG_DIR).join(GLOBAL_CONFIG_FILE))
}

/// Command-line values that override the config files
#[derive(Debug, Default, Clone, Copy)]
pub struct Overrides {
    pub questionnaire: Option<QuestionnaireVariant>,
    pub prompt: Option<PromptVariant>,
}

/// Fully resolved settings
#[derive(Debug, Clone, PartialEq)]
pub struct Settings {
    pub questionnaire: QuestionnaireVariant,
    pub prompt: PromptVariant,
    pub base_url: String,
    pub timeout: Duration,
}

impl Settings {
    /// Resolve settings for a working directory, reading both config files
    pub fn load(working_dir: &Path, overrides: Overrides) -> Result<Self> {
        let project = FileConfig::load_project(working_dir)?.unwrap_or_default();
        let global = FileConfig::load_global()?.unwrap_or_default();
        Ok(Self::resolve(overrides, project.or(global)))
    }

    pub fn resolve(overrides: Overrides, file: FileConfig) -> Self {
        Self {
            questionnaire: overrides
                .questionnaire
                .or(file.questionnaire)
                .unwrap_or_default(),
            prompt: overrides.prompt.or(file.prompt).unwrap_or_default(),
            base_url: file
                .base_url
                .unwrap_or_else(|| DEFAULT_BASE_URL.to_string()),
            timeout: Duration::from_secs(file.timeout_secs.unwrap_or(DEFAULT_TIMEOUT_SECS)),
        }
    }
}
