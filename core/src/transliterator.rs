//! Rendering modes for composition chunks.
//!
//! A chunk holds two strings: the raw keystrokes and their converted form.
//! A `Transliterator` picks one of them and reshapes it (script, width) for
//! display. `Native` is the "no override" token: a chunk asked to render
//! under `Native` uses the mode it was stamped with.
//!
//! Modes are compared by variant. `Native` and `Conversion` often render the
//! same text but are still different tokens.

use serde::{Deserialize, Serialize};

use crate::utils;

/// Rendering mode token.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Transliterator {
    /// Defer to the chunk's own stamped mode
    Native,
    /// Converted text as produced by the table
    Conversion,
    /// Raw keystrokes
    Raw,
    /// Converted text as full-width hiragana
    Hiragana,
    /// Converted text as full-width katakana
    FullKatakana,
    /// Converted text as half-width katakana
    HalfKatakana,
    /// Raw keystrokes as full-width ASCII
    FullAscii,
    /// Raw keystrokes as half-width ASCII
    HalfAscii,
}

impl Default for Transliterator {
    fn default() -> Self {
        Self::Native
    }
}

/// The four halves produced by splitting a chunk.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SplitParts {
    pub raw_lhs: String,
    pub raw_rhs: String,
    pub converted_lhs: String,
    pub converted_rhs: String,
}

impl Transliterator {
    /// Every mode, `Native` first.
    pub const ALL: [Transliterator; 8] = [
        Transliterator::Native,
        Transliterator::Conversion,
        Transliterator::Raw,
        Transliterator::Hiragana,
        Transliterator::FullKatakana,
        Transliterator::HalfKatakana,
        Transliterator::FullAscii,
        Transliterator::HalfAscii,
    ];

    /// Resolve this request against a chunk's stamped mode.
    ///
    /// Non-native requests win. A native request falls back to the stamp, and
    /// an unstamped chunk renders its converted text.
    pub fn resolve(self, stamped: Transliterator) -> Transliterator {
        match (self, stamped) {
            (Transliterator::Native, Transliterator::Native) => Transliterator::Conversion,
            (Transliterator::Native, stamped) => stamped,
            (requested, _) => requested,
        }
    }

    /// Whether this mode renders the raw keystrokes rather than the
    /// converted text.
    pub fn uses_raw(self) -> bool {
        matches!(
            self,
            Transliterator::Raw | Transliterator::FullAscii | Transliterator::HalfAscii
        )
    }

    /// Render a chunk's strings under this mode.
    pub fn transliterate(self, raw: &str, converted: &str) -> String {
        match self {
            Transliterator::Native | Transliterator::Conversion => converted.to_string(),
            Transliterator::Raw => raw.to_string(),
            Transliterator::Hiragana => utils::katakana_to_hiragana(&utils::to_full_katakana(
                &utils::to_fullwidth(converted),
            )),
            Transliterator::FullKatakana => utils::hiragana_to_katakana(
                &utils::to_full_katakana(&utils::to_fullwidth(converted)),
            ),
            Transliterator::HalfKatakana => utils::to_halfwidth(&utils::to_half_katakana(
                &utils::hiragana_to_katakana(converted),
            )),
            Transliterator::FullAscii => utils::to_fullwidth(raw),
            Transliterator::HalfAscii => utils::to_halfwidth(raw),
        }
    }

    /// Split a chunk's strings at `position`, measured in this mode's
    /// rendering.
    ///
    /// The string this mode renders from is cut at the char boundary whose
    /// prefix renders to exactly `position` characters. The other string is
    /// cut at the same char index when both have the same char count, and is
    /// replaced by the source halves otherwise. If no such boundary exists
    /// (a single glyph renders as several characters, e.g. "が" → "ｶﾞ") the
    /// rendered text itself is split and becomes every half.
    pub fn split(self, position: usize, raw: &str, converted: &str) -> SplitParts {
        let (source, other) = if self.uses_raw() {
            (raw, converted)
        } else {
            (converted, raw)
        };

        let boundary = source
            .char_indices()
            .map(|(idx, _)| idx)
            .chain(std::iter::once(source.len()))
            .find(|&idx| self.rendered_len(&source[..idx]) == position);

        let Some(boundary) = boundary else {
            let rendered = self.transliterate(raw, converted);
            let (lhs, rhs) = split_at_char(&rendered, position);
            return SplitParts {
                raw_lhs: lhs.to_string(),
                raw_rhs: rhs.to_string(),
                converted_lhs: lhs.to_string(),
                converted_rhs: rhs.to_string(),
            };
        };

        let (source_lhs, source_rhs) = source.split_at(boundary);
        let (other_lhs, other_rhs) = if other.chars().count() == source.chars().count() {
            split_at_char(other, source_lhs.chars().count())
        } else {
            (source_lhs, source_rhs)
        };

        if self.uses_raw() {
            SplitParts {
                raw_lhs: source_lhs.to_string(),
                raw_rhs: source_rhs.to_string(),
                converted_lhs: other_lhs.to_string(),
                converted_rhs: other_rhs.to_string(),
            }
        } else {
            SplitParts {
                raw_lhs: other_lhs.to_string(),
                raw_rhs: other_rhs.to_string(),
                converted_lhs: source_lhs.to_string(),
                converted_rhs: source_rhs.to_string(),
            }
        }
    }

    fn rendered_len(self, source: &str) -> usize {
        self.transliterate(source, source).chars().count()
    }
}

/// Split `s` after its first `n` characters.
fn split_at_char(s: &str, n: usize) -> (&str, &str) {
    let idx = s.char_indices().nth(n).map_or(s.len(), |(idx, _)| idx);
    s.split_at(idx)
}
