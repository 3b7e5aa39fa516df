use std::path::Path;

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};

/// Romaji-specific configuration that extends the base `Config` from core.
///
/// This configuration includes:
/// - All generic options from `libkana_core::Config` (flattened via serde)
/// - Which optional rule groups the built-in romaji table contains
///
/// # Example
///
/// ```rust
/// use libromaji::RomajiConfig;
///
/// let config = RomajiConfig::default();
/// let base_config = config.into_base();
/// // Use base_config with Composition::with_config()
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Deserialize, Serialize)]
#[serde(default)]
pub struct RomajiConfig {
    /// Base configuration fields (input mode, case sensitivity)
    #[serde(flatten)]
    pub base: libkana_core::Config,

    /// Doubled consonants produce a small tsu: "tta" → "った"
    pub double_consonant_sokuon: bool,

    /// "nn" → "ん"
    pub nn_to_n: bool,

    // , . - [ ]  →  、 。 ー 「 」
    pub kana_punctuation: bool,
}

impl Default for RomajiConfig {
    fn default() -> Self {
        Self {
            base: libkana_core::Config::default(),
            double_consonant_sokuon: true,
            nn_to_n: true,
            kana_punctuation: true,
        }
    }
}

impl RomajiConfig {
    /// Convert this romaji config into the base config
    pub fn into_base(self) -> libkana_core::Config {
        self.base
    }

    /// Get a reference to the base config
    pub fn base(&self) -> &libkana_core::Config {
        &self.base
    }

    /// Get a mutable reference to the base config
    pub fn base_mut(&mut self) -> &mut libkana_core::Config {
        &mut self.base
    }

    /// Load configuration from a TOML file.
    pub fn load_toml<P: AsRef<Path>>(path: P) -> Result<Self> {
        let path = path.as_ref();
        let content = std::fs::read_to_string(path)
            .with_context(|| format!("read config {}", path.display()))?;
        Self::from_toml_str(&content).with_context(|| format!("parse config {}", path.display()))
    }

    /// Load configuration from TOML string.
    pub fn from_toml_str(content: &str) -> Result<Self, toml::de::Error> {
        toml::from_str(content)
    }
}
