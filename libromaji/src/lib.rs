//! libromaji crate root
//!
//! Romaji input on top of `libkana-core`: the built-in romaji → hiragana
//! rule set, its configuration, and helpers that hand out ready-to-use
//! compositions.
//!
//! Public API exported here:
//! - `romaji_table` and the rule maps from `rules`
//! - `RomajiConfig` from `config`
//! - `DEFAULT_TABLE`, `default_composition`, `composition`, `load_table`

use std::path::Path;
use std::sync::Arc;

use anyhow::Result;
use once_cell::sync::Lazy;

pub mod config;
pub mod rules;

// Re-export the composition types from core.
pub use libkana_core::{
    CharChunk, Chunk, Composition, Config, Preedit, Segment, Table, Transliterator, TrimMode,
};

// Convenience re-exports for common types used by callers.
pub use config::RomajiConfig;
pub use rules::{romaji_table, DOUBLE_CONSONANTS, KANA_PUNCTUATION, ROMAJI_RULES};

/// Table built from the default `RomajiConfig`, shared by every composition
/// that does not need custom rules.
pub static DEFAULT_TABLE: Lazy<Arc<Table>> =
    Lazy::new(|| Arc::new(romaji_table(&RomajiConfig::default())));

/// Empty composition over the default table.
pub fn default_composition() -> Composition {
    Composition::new(Arc::clone(&DEFAULT_TABLE))
}

/// Empty composition over a table built for `config`.
pub fn composition(config: &RomajiConfig) -> Composition {
    Composition::with_config(Arc::new(romaji_table(config)), config.base())
}

/// Load a tab-separated rule file, applying the lookup options in `config`.
pub fn load_table<P: AsRef<Path>>(path: P, config: &RomajiConfig) -> Result<Table> {
    let mut table = Table::load_from_file(path)?;
    if config.base().case_sensitive {
        table.set_case_sensitive(true);
    }
    Ok(table)
}
