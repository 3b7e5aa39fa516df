//! libkana-core
//!
//! Composition buffer, conversion tables and rendering modes shared by
//! table-driven kana input crates (libromaji).
//!
//! The composition is the in-progress, not yet committed text a user is
//! typing. It is kept as a sequence of chunks, each holding a slice of raw
//! keystrokes and their converted form, so the same buffer can be shown as
//! converted text, raw keys, katakana or full-width ASCII, with cursor
//! positions translated between those renderings.
//!
//! Public API:
//! - `Composition` - The chunk-sequence editor and its position arithmetic
//! - `Chunk` / `CharChunk` - The editable unit and its default implementation
//! - `Table` - Prefix-searchable conversion rules
//! - `Transliterator` - Rendering mode tokens
//! - `Config` - Composition and lookup options
use std::path::Path;

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};

pub mod trie;
pub use trie::TrieNode;

pub mod table;
pub use table::{Entry, PrefixMatch, Table};

pub mod transliterator;
pub use transliterator::{SplitParts, Transliterator};

pub mod chunk;
pub use chunk::{CharChunk, Chunk};

pub mod composition;
pub use composition::{Composition, Preedit, Segment, TrimMode};

/// Generic configuration for composition behavior.
///
/// Language crates embed this with `#[serde(flatten)]` and add their own
/// options (see `RomajiConfig` in libromaji).
#[derive(Debug, Clone, PartialEq, Eq, Deserialize, Serialize)]
#[serde(default)]
pub struct Config {
    /// Rendering mode stamped on newly created chunks.
    pub input_mode: Transliterator,

    /// Force case-sensitive table lookups. Tables also become case-sensitive
    /// on their own when a rule input contains upper-case letters.
    pub case_sensitive: bool,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            input_mode: Transliterator::Native,
            case_sensitive: false,
        }
    }
}

impl Config {
    /// Load configuration from a TOML file.
    pub fn load_toml<P: AsRef<Path>>(path: P) -> Result<Self> {
        let path = path.as_ref();
        let content = std::fs::read_to_string(path)
            .with_context(|| format!("read config {}", path.display()))?;
        Self::from_toml_str(&content).with_context(|| format!("parse config {}", path.display()))
    }

    /// Save configuration to a TOML file.
    pub fn save_toml<P: AsRef<Path>>(&self, path: P) -> Result<()> {
        let path = path.as_ref();
        let content = self.to_toml_string()?;
        std::fs::write(path, content).with_context(|| format!("write config {}", path.display()))
    }

    /// Load configuration from TOML string.
    pub fn from_toml_str(content: &str) -> Result<Self, toml::de::Error> {
        toml::from_str(content)
    }

    /// Serialize configuration to TOML string.
    pub fn to_toml_string(&self) -> Result<String, toml::ser::Error> {
        toml::to_string_pretty(self)
    }
}

/// Utility helpers for script and width conversion.
pub mod utils {
    use std::collections::HashMap;

    use once_cell::sync::Lazy;
    use unicode_normalization::UnicodeNormalization;

    const HALF_KATAKANA_BLOCK: std::ops::RangeInclusive<char> = '\u{FF61}'..='\u{FF9F}';

    /// Full-width character → half-width katakana.
    ///
    /// Built from the NFKC mappings of the half-width block, so the voiced
    /// marks map from their combining forms (U+3099, U+309A).
    static HALF_KATAKANA: Lazy<HashMap<char, char>> = Lazy::new(|| {
        let mut map = HashMap::new();
        for half in HALF_KATAKANA_BLOCK {
            let mut full = std::iter::once(half).nfkc();
            if let (Some(full), None) = (full.next(), full.next()) {
                map.insert(full, half);
            }
        }
        // Spacing voiced marks
        map.insert('\u{309B}', '\u{FF9E}');
        map.insert('\u{309C}', '\u{FF9F}');
        map
    });

    /// Canonical composition (NFC).
    pub fn nfc(s: &str) -> String {
        s.nfc().collect()
    }

    /// Convert ASCII characters to full-width equivalents.
    ///
    /// This converts:
    /// - ASCII letters (A-Z, a-z) → Full-width letters (Ａ-Ｚ, ａ-ｚ)
    /// - ASCII digits (0-9) → Full-width digits (０-９)
    /// - ASCII space → Ideographic space (　)
    /// - ASCII punctuation → Full-width punctuation
    ///
    /// Non-ASCII characters are passed through unchanged.
    pub fn to_fullwidth(s: &str) -> String {
        s.chars()
            .map(|ch| match ch {
                // Space -> Ideographic space
                ' ' => '\u{3000}',
                // ASCII printable range (0x21-0x7E) -> Full-width (0xFF01-0xFF5E)
                '!'..='~' => {
                    let code = ch as u32;
                    char::from_u32(code - 0x21 + 0xFF01).unwrap_or(ch)
                }
                _ => ch,
            })
            .collect()
    }

    /// Convert full-width characters back to ASCII (half-width).
    pub fn to_halfwidth(s: &str) -> String {
        s.chars()
            .map(|ch| match ch {
                // Ideographic space -> ASCII space
                '\u{3000}' => ' ',
                // Full-width range (0xFF01-0xFF5E) -> ASCII (0x21-0x7E)
                '\u{FF01}'..='\u{FF5E}' => {
                    let code = ch as u32;
                    char::from_u32(code - 0xFF01 + 0x21).unwrap_or(ch)
                }
                _ => ch,
            })
            .collect()
    }

    /// Fold full-width katakana (ァ-ヶ) to hiragana.
    pub fn katakana_to_hiragana(s: &str) -> String {
        s.chars()
            .map(|ch| match ch {
                '\u{30A1}'..='\u{30F6}' => char::from_u32(ch as u32 - 0x60).unwrap_or(ch),
                _ => ch,
            })
            .collect()
    }

    /// Lift hiragana (ぁ-ゖ) to full-width katakana.
    pub fn hiragana_to_katakana(s: &str) -> String {
        s.chars()
            .map(|ch| match ch {
                '\u{3041}'..='\u{3096}' => char::from_u32(ch as u32 + 0x60).unwrap_or(ch),
                _ => ch,
            })
            .collect()
    }

    /// Narrow full-width katakana and CJK punctuation to half-width forms.
    ///
    /// Voiced katakana split into base + mark ("ガ" → "ｶﾞ"). Characters with
    /// no half-width form (hiragana, kanji, "ヰ") pass through unchanged.
    pub fn to_half_katakana(s: &str) -> String {
        let mut out = String::with_capacity(s.len());
        for ch in s.chars() {
            if let Some(&half) = HALF_KATAKANA.get(&ch) {
                out.push(half);
                continue;
            }
            let decomposed: Vec<char> = std::iter::once(ch).nfd().collect();
            if decomposed.len() > 1 && decomposed.iter().all(|c| HALF_KATAKANA.contains_key(c)) {
                out.extend(decomposed.iter().filter_map(|c| HALF_KATAKANA.get(c)));
            } else {
                out.push(ch);
            }
        }
        out
    }

    /// Widen runs of half-width katakana, recombining voiced marks
    /// ("ｶﾞ" → "ガ"). Everything else passes through unchanged.
    pub fn to_full_katakana(s: &str) -> String {
        let mut out = String::with_capacity(s.len());
        let mut run = String::new();
        for ch in s.chars() {
            if HALF_KATAKANA_BLOCK.contains(&ch) {
                run.push(ch);
                continue;
            }
            if !run.is_empty() {
                out.extend(run.nfkc());
                run.clear();
            }
            out.push(ch);
        }
        out.extend(run.nfkc());
        out
    }

}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_config_defaults() {
        let config = Config::default();
        assert_eq!(config.input_mode, Transliterator::Native);
        assert!(!config.case_sensitive);
    }

    #[test]
    fn test_config_toml_roundtrip() {
        let config = Config {
            input_mode: Transliterator::FullKatakana,
            case_sensitive: true,
        };
        let text = config.to_toml_string().unwrap();
        assert!(text.contains("full_katakana"));
        assert_eq!(Config::from_toml_str(&text).unwrap(), config);
    }

    #[test]
    fn test_config_partial_toml_uses_defaults() {
        let config = Config::from_toml_str("input_mode = \"half_ascii\"").unwrap();
        assert_eq!(config.input_mode, Transliterator::HalfAscii);
        assert!(!config.case_sensitive);
    }

    #[test]
    fn test_config_file_roundtrip() {
        let path = std::env::temp_dir().join(format!("libkana_config_{}.toml", std::process::id()));
        let config = Config {
            input_mode: Transliterator::Raw,
            case_sensitive: false,
        };
        config.save_toml(&path).unwrap();
        assert_eq!(Config::load_toml(&path).unwrap(), config);
        let _ = std::fs::remove_file(&path);
    }
}
