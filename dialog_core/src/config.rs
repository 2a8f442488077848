//! Bot configuration, read from TOML with environment overrides.

use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use thiserror::Error;

use story_rules::{DialogRegistry, RegistryError};

use crate::dispatcher::TurnSettings;

/// Environment variable overriding the entry node.
pub const ENTRY_NODE_ENV: &str = "ZOMBIE_OFFICE_ENTRY_NODE";

/// Environment variable pointing at a story file to use instead of the built-in one.
pub const STORY_PATH_ENV: &str = "ZOMBIE_OFFICE_STORY";

/// Environment variable enabling the text-correction pass (`"true"` enables).
pub const SPELL_CORRECTION_ENV: &str = "IS_SPELL_CORRECTION_ENABLED";

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("failed to read config file {path}: {source}")]
    Io {
        path: String,
        #[source]
        source: std::io::Error,
    },

    #[error("failed to parse config: {0}")]
    Parse(#[from] toml::de::Error),
}

/// Settings that sit outside the story content.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct BotConfig {
    /// Story file to serve. The built-in story is used when unset.
    pub story_path: Option<PathBuf>,

    /// Overrides the story's entry node.
    pub entry_node: Option<String>,

    /// Intents that show the help text from any node.
    pub help_intents: Vec<String>,

    pub help_text: String,

    /// Shown when a guard refuses a choice.
    pub denial_text: String,

    /// Run user text through the corrector before resolving intents.
    pub spell_correction: bool,
}

impl Default for BotConfig {
    fn default() -> Self {
        let settings = TurnSettings::default();
        Self {
            story_path: None,
            entry_node: None,
            help_intents: settings.help_intents,
            help_text: settings.help_text,
            denial_text: settings.denial_text,
            spell_correction: false,
        }
    }
}

impl BotConfig {
    /// Parse a config from TOML text. Missing keys take their defaults.
    pub fn from_toml_str(src: &str) -> Result<Self, ConfigError> {
        Ok(toml::from_str(src)?)
    }

    /// Read and parse a config file.
    pub fn load(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let path = path.as_ref();
        let src = std::fs::read_to_string(path).map_err(|source| ConfigError::Io {
            path: path.display().to_string(),
            source,
        })?;
        Self::from_toml_str(&src)
    }

    /// Apply overrides from the process environment.
    pub fn apply_env(self) -> Self {
        self.apply_env_from(|name| std::env::var(name).ok())
    }

    /// Apply overrides from an arbitrary variable lookup.
    pub fn apply_env_from(mut self, lookup: impl Fn(&str) -> Option<String>) -> Self {
        if let Some(path) = lookup(STORY_PATH_ENV).filter(|v| !v.trim().is_empty()) {
            self.story_path = Some(PathBuf::from(path.trim()));
        }
        if let Some(entry) = lookup(ENTRY_NODE_ENV).filter(|v| !v.trim().is_empty()) {
            self.entry_node = Some(entry.trim().to_string());
        }
        if let Some(flag) = lookup(SPELL_CORRECTION_ENV) {
            self.spell_correction = flag.trim().eq_ignore_ascii_case("true");
        }
        self
    }

    /// Load the configured story, or the built-in one.
    pub fn load_registry(&self) -> Result<DialogRegistry, RegistryError> {
        match &self.story_path {
            Some(path) => DialogRegistry::load(path),
            None => DialogRegistry::zombie_office(),
        }
    }

    /// Dispatcher settings derived from this config.
    pub fn turn_settings(&self) -> TurnSettings {
        TurnSettings {
            help_intents: self.help_intents.clone(),
            help_text: self.help_text.clone(),
            denial_text: self.denial_text.clone(),
        }
    }
}
