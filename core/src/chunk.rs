//! The atomic editable unit of a composition.
//!
//! A chunk holds a contiguous slice of raw keystrokes together with what the
//! conversion table made of them. `Composition` only talks to chunks through
//! the `Chunk` trait; `CharChunk` is the table-driven implementation used by
//! default.

use std::fmt;

use crate::table::{PrefixMatch, Table};
use crate::transliterator::Transliterator;

/// Contract between a composition and its chunks.
///
/// Lengths and offsets are character counts under the requested rendering
/// mode. `Transliterator::Native` means "the chunk's own stamped mode".
pub trait Chunk: Default + Clone + fmt::Debug {
    /// Consume a prefix of `input` through `table`, leaving the unconsumed
    /// remainder in `input`.
    fn feed_input(&mut self, table: &Table, input: &mut String);

    /// Consume raw keys paired with already converted text. Each stream is
    /// drained independently; whatever the chunk refuses stays behind.
    fn feed_input_and_rendered(&mut self, table: &Table, raw: &mut String, rendered: &mut String);

    /// Length of the chunk rendered under `mode`.
    fn length(&self, mode: Transliterator) -> usize;

    /// Whether more raw input can still be merged into this chunk when
    /// typing under `mode`.
    fn is_appendable(&self, mode: Transliterator) -> bool;

    /// Split at `position` (measured under `mode`), keeping the suffix in
    /// `self` and returning the prefix as a new chunk.
    ///
    /// # Panics
    ///
    /// Panics unless `0 < position < self.length(mode)`.
    fn split_off_left(&mut self, mode: Transliterator, position: usize) -> Self;

    /// Stamp the chunk with a rendering mode.
    fn set_transliterator(&mut self, mode: Transliterator);

    /// The stamped rendering mode.
    fn transliterator(&self) -> Transliterator;

    /// Append the full rendering under `mode`.
    fn render(&self, table: &Table, mode: Transliterator, out: &mut String);

    /// Append only the settled part, hiding keystrokes still waiting for
    /// more input.
    fn render_trimmed(&self, table: &Table, mode: Transliterator, out: &mut String);

    /// Append a best-effort rendering that resolves pending input as if
    /// typing had stopped.
    fn render_fixed(&self, table: &Table, mode: Transliterator, out: &mut String);
}

/// Table-driven chunk.
///
/// - `raw`: every keystroke fed into the chunk
/// - `conversion`: settled converted text
/// - `pending`: keys waiting for more input ("k" before "a")
/// - `ambiguous`: what `pending` would become if input stopped now
///   ("n" → "ん" while "na" is still possible)
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CharChunk {
    raw: String,
    conversion: String,
    pending: String,
    ambiguous: String,
    transliterator: Transliterator,
}

impl CharChunk {
    /// Create an empty chunk stamped with `mode`.
    pub fn new(mode: Transliterator) -> Self {
        Self {
            transliterator: mode,
            ..Self::default()
        }
    }

    pub fn raw(&self) -> &str {
        &self.raw
    }

    pub fn conversion(&self) -> &str {
        &self.conversion
    }

    pub fn pending(&self) -> &str {
        &self.pending
    }

    pub fn ambiguous(&self) -> &str {
        &self.ambiguous
    }

    /// True when nothing has been fed into the chunk.
    pub fn is_empty(&self) -> bool {
        self.raw.is_empty() && self.conversion.is_empty() && self.pending.is_empty()
    }

    fn converted(&self) -> String {
        format!("{}{}", self.conversion, self.pending)
    }

    /// One table step. Returns true when the chunk consumed input, still has
    /// pending keys and more input is waiting.
    fn feed_once(&mut self, table: &Table, input: &mut String) -> bool {
        if input.is_empty() {
            return false;
        }
        let key = format!("{}{}", self.pending, input);
        let pending_len = self.pending.len();

        match table.lookup_prefix(&key) {
            PrefixMatch::Unmatched => {
                // Nothing in the table starts like this: pass one character
                // through as-is, unless it would break up pending keys.
                if self.pending.is_empty() {
                    let len = input.chars().next().map_or(0, char::len_utf8);
                    let passed: String = input.drain(..len).collect();
                    self.raw.push_str(&passed);
                    self.conversion.push_str(&passed);
                }
                false
            }
            PrefixMatch::Prefix { len } => {
                if len <= pending_len {
                    return false;
                }
                let taken: String = input.drain(..len - pending_len).collect();
                self.raw.push_str(&taken);
                self.pending.push_str(&taken);
                self.ambiguous.clear();
                false
            }
            PrefixMatch::Entry { entry, len, fixed } => {
                if len < pending_len {
                    return false;
                }
                if !fixed {
                    self.raw.push_str(input);
                    input.clear();
                    self.pending = key;
                    self.ambiguous = format!("{}{}", entry.result(), entry.pending());
                    return false;
                }
                let taken: String = input.drain(..len - pending_len).collect();
                self.raw.push_str(&taken);
                self.conversion.push_str(entry.result());
                self.pending = entry.pending().to_string();
                self.ambiguous.clear();
                !self.pending.is_empty() && !input.is_empty()
            }
        }
    }
}

impl Chunk for CharChunk {
    fn feed_input(&mut self, table: &Table, input: &mut String) {
        while self.feed_once(table, input) {}
    }

    fn feed_input_and_rendered(&mut self, table: &Table, raw: &mut String, rendered: &mut String) {
        if self.is_empty() {
            self.raw = std::mem::take(raw);
            self.pending = std::mem::take(rendered);
            return;
        }

        let candidate = format!("{}{}", self.pending, rendered);
        if !table.has_sub_rules(&candidate) {
            return;
        }
        self.raw.push_str(raw);
        raw.clear();
        rendered.clear();
        self.ambiguous.clear();

        match table.lookup(&candidate) {
            Some(entry) => {
                self.conversion.push_str(entry.result());
                self.pending = entry.pending().to_string();
            }
            None => self.pending = candidate,
        }
    }

    fn length(&self, mode: Transliterator) -> usize {
        mode.resolve(self.transliterator)
            .transliterate(&self.raw, &self.converted())
            .chars()
            .count()
    }

    fn is_appendable(&self, mode: Transliterator) -> bool {
        !self.pending.is_empty() && (mode == Transliterator::Native || mode == self.transliterator)
    }

    fn split_off_left(&mut self, mode: Transliterator, position: usize) -> Self {
        let length = self.length(mode);
        assert!(
            position > 0 && position < length,
            "split position {} outside chunk of length {}",
            position,
            length
        );

        let parts = mode
            .resolve(self.transliterator)
            .split(position, &self.raw, &self.converted());

        self.raw = parts.raw_rhs;
        self.conversion = parts.converted_rhs;
        self.pending.clear();
        self.ambiguous.clear();

        Self {
            raw: parts.raw_lhs,
            conversion: parts.converted_lhs,
            pending: String::new(),
            ambiguous: String::new(),
            transliterator: self.transliterator,
        }
    }

    fn set_transliterator(&mut self, mode: Transliterator) {
        self.transliterator = mode;
    }

    fn transliterator(&self) -> Transliterator {
        self.transliterator
    }

    fn render(&self, _table: &Table, mode: Transliterator, out: &mut String) {
        let text = mode
            .resolve(self.transliterator)
            .transliterate(&self.raw, &self.converted());
        out.push_str(&text);
    }

    fn render_trimmed(&self, table: &Table, mode: Transliterator, out: &mut String) {
        let mut converted = self.conversion.clone();
        // Pending text that converts to itself is already settled
        if let Some(entry) = table.lookup(&self.pending) {
            if entry.input() == entry.result() {
                converted.push_str(entry.result());
            }
        }
        let text = mode
            .resolve(self.transliterator)
            .transliterate(&self.raw, &converted);
        out.push_str(&text);
    }

    fn render_fixed(&self, _table: &Table, mode: Transliterator, out: &mut String) {
        let mut converted = self.conversion.clone();
        if !self.ambiguous.is_empty() {
            converted.push_str(&self.ambiguous);
        } else {
            converted.push_str(&self.pending);
        }
        let text = mode
            .resolve(self.transliterator)
            .transliterate(&self.raw, &converted);
        out.push_str(&text);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn romaji_table() -> Table {
        let mut table = Table::new();
        for (input, result) in [
            ("a", "あ"),
            ("i", "い"),
            ("o", "お"),
            ("ka", "か"),
            ("ki", "き"),
            ("kya", "きゃ"),
            ("na", "な"),
            ("n", "ん"),
            ("nn", "ん"),
            ("to", "と"),
            ("-", "ー"),
        ] {
            table.add_rule(input, result, "");
        }
        table.add_rule("tt", "っ", "t");
        table.add_rule("か゛", "が", "");
        table
    }

    fn fed(table: &Table, input: &str) -> (CharChunk, String) {
        let mut chunk = CharChunk::default();
        let mut rest = input.to_string();
        chunk.feed_input(table, &mut rest);
        (chunk, rest)
    }

    #[test]
    fn test_feed_single_syllable() {
        let table = romaji_table();
        let (chunk, rest) = fed(&table, "ka");
        assert_eq!(rest, "");
        assert_eq!(chunk.raw(), "ka");
        assert_eq!(chunk.conversion(), "か");
        assert_eq!(chunk.pending(), "");
        assert_eq!(chunk.length(Transliterator::Native), 1);
        assert_eq!(chunk.length(Transliterator::Raw), 2);
        assert!(!chunk.is_appendable(Transliterator::Native));
    }

    #[test]
    fn test_feed_stops_after_closed_syllable() {
        let table = romaji_table();
        let (chunk, rest) = fed(&table, "kaki");
        assert_eq!(chunk.conversion(), "か");
        assert_eq!(rest, "ki");
    }

    #[test]
    fn test_feed_pending_consonant() {
        let table = romaji_table();
        let (mut chunk, rest) = fed(&table, "k");
        assert_eq!(rest, "");
        assert_eq!(chunk.pending(), "k");
        assert_eq!(chunk.length(Transliterator::Native), 1);
        assert!(chunk.is_appendable(Transliterator::Native));

        let mut more = "ya".to_string();
        chunk.feed_input(&table, &mut more);
        assert_eq!(more, "");
        assert_eq!(chunk.raw(), "kya");
        assert_eq!(chunk.conversion(), "きゃ");
        assert_eq!(chunk.pending(), "");
    }

    #[test]
    fn test_feed_double_consonant_carries_pending() {
        let table = romaji_table();
        let (chunk, rest) = fed(&table, "tto");
        assert_eq!(rest, "");
        assert_eq!(chunk.raw(), "tto");
        assert_eq!(chunk.conversion(), "っと");
        assert_eq!(chunk.length(Transliterator::Native), 2);
        assert_eq!(chunk.length(Transliterator::Raw), 3);
    }

    #[test]
    fn test_feed_ambiguous_then_resolved() {
        let table = romaji_table();
        let (mut chunk, rest) = fed(&table, "n");
        assert_eq!(rest, "");
        assert_eq!(chunk.pending(), "n");
        assert_eq!(chunk.ambiguous(), "ん");

        // "k" cannot follow "n", so the "n" settles and "k" is refused
        let mut more = "k".to_string();
        chunk.feed_input(&table, &mut more);
        assert_eq!(more, "k");
        assert_eq!(chunk.conversion(), "ん");
        assert_eq!(chunk.pending(), "");
        assert!(!chunk.is_appendable(Transliterator::Native));
    }

    #[test]
    fn test_feed_unknown_character_passes_through() {
        let table = romaji_table();
        let (chunk, rest) = fed(&table, "x1");
        assert_eq!(chunk.raw(), "x");
        assert_eq!(chunk.conversion(), "x");
        assert_eq!(rest, "1");
    }

    #[test]
    fn test_pending_chunk_refuses_dead_end() {
        let table = romaji_table();
        let (mut chunk, _) = fed(&table, "k");
        let mut more = "x".to_string();
        chunk.feed_input(&table, &mut more);
        assert_eq!(more, "x");
        assert_eq!(chunk.raw(), "k");
        assert_eq!(chunk.pending(), "k");
    }

    #[test]
    fn test_appendable_respects_mode() {
        let table = romaji_table();
        let mut chunk = CharChunk::new(Transliterator::FullKatakana);
        let mut input = "k".to_string();
        chunk.feed_input(&table, &mut input);
        assert!(chunk.is_appendable(Transliterator::Native));
        assert!(chunk.is_appendable(Transliterator::FullKatakana));
        assert!(!chunk.is_appendable(Transliterator::HalfAscii));
    }

    #[test]
    fn test_feed_input_and_rendered_into_empty_chunk() {
        let table = romaji_table();
        let mut chunk = CharChunk::default();
        let mut raw = "ka".to_string();
        let mut rendered = "か".to_string();
        chunk.feed_input_and_rendered(&table, &mut raw, &mut rendered);
        assert!(raw.is_empty() && rendered.is_empty());
        assert_eq!(chunk.raw(), "ka");
        assert_eq!(chunk.pending(), "か");
        assert!(chunk.is_appendable(Transliterator::Native));
    }

    #[test]
    fn test_feed_input_and_rendered_combines_with_table() {
        let table = romaji_table();
        let mut chunk = CharChunk::default();
        let (mut raw, mut rendered) = ("t".to_string(), "か".to_string());
        chunk.feed_input_and_rendered(&table, &mut raw, &mut rendered);

        let (mut raw, mut rendered) = ("@".to_string(), "゛".to_string());
        chunk.feed_input_and_rendered(&table, &mut raw, &mut rendered);
        assert!(raw.is_empty() && rendered.is_empty());
        assert_eq!(chunk.raw(), "t@");
        assert_eq!(chunk.conversion(), "が");
        assert_eq!(chunk.pending(), "");
    }

    #[test]
    fn test_feed_input_and_rendered_refused() {
        let table = romaji_table();
        let mut chunk = CharChunk::default();
        let (mut raw, mut rendered) = ("t".to_string(), "か".to_string());
        chunk.feed_input_and_rendered(&table, &mut raw, &mut rendered);

        let (mut raw, mut rendered) = ("e".to_string(), "い".to_string());
        chunk.feed_input_and_rendered(&table, &mut raw, &mut rendered);
        assert_eq!(raw, "e");
        assert_eq!(rendered, "い");
        assert_eq!(chunk.pending(), "か");
    }

    #[test]
    fn test_split_off_left() {
        let table = romaji_table();
        let (mut chunk, _) = fed(&table, "tto");
        chunk.set_transliterator(Transliterator::Hiragana);

        let left = chunk.split_off_left(Transliterator::Native, 1);
        assert_eq!(left.conversion(), "っ");
        assert_eq!(chunk.conversion(), "と");
        assert_eq!(left.transliterator(), Transliterator::Hiragana);
        assert_eq!(chunk.transliterator(), Transliterator::Hiragana);
        assert_eq!(left.length(Transliterator::Native), 1);
        assert_eq!(chunk.length(Transliterator::Native), 1);
    }

    #[test]
    fn test_split_folds_pending() {
        let table = romaji_table();
        let mut combined = CharChunk::default();
        let (mut raw, mut rendered) = ("xy".to_string(), "xy".to_string());
        combined.feed_input_and_rendered(&table, &mut raw, &mut rendered);
        let left = combined.split_off_left(Transliterator::Native, 1);
        assert_eq!(left.raw(), "x");
        assert_eq!(left.conversion(), "x");
        assert_eq!(combined.raw(), "y");
        assert_eq!(combined.conversion(), "y");
        assert_eq!(combined.pending(), "");
        assert!(!combined.is_appendable(Transliterator::Native));
    }

    #[test]
    #[should_panic(expected = "split position")]
    fn test_split_at_boundary_panics() {
        let table = romaji_table();
        let (mut chunk, _) = fed(&table, "ka");
        chunk.split_off_left(Transliterator::Native, 1);
    }

    #[test]
    fn test_render_modes() {
        let table = romaji_table();
        let (chunk, _) = fed(&table, "kya");
        let mut out = String::new();
        chunk.render(&table, Transliterator::Native, &mut out);
        chunk.render(&table, Transliterator::FullKatakana, &mut out);
        chunk.render(&table, Transliterator::HalfKatakana, &mut out);
        chunk.render(&table, Transliterator::FullAscii, &mut out);
        assert_eq!(out, "きゃキャｷｬｋｙａ");
    }

    #[test]
    fn test_render_trimmed_hides_pending() {
        let table = romaji_table();
        let (chunk, _) = fed(&table, "k");
        let mut out = String::new();
        chunk.render_trimmed(&table, Transliterator::Native, &mut out);
        assert_eq!(out, "");

        let mut out = String::new();
        chunk.render(&table, Transliterator::Native, &mut out);
        assert_eq!(out, "k");
    }

    #[test]
    fn test_render_trimmed_keeps_self_mapping_pending() {
        let mut table = romaji_table();
        table.add_rule("-", "-", "");
        table.add_rule("->", "→", "");
        let (chunk, _) = fed(&table, "-");
        assert_eq!(chunk.pending(), "-");
        let mut out = String::new();
        chunk.render_trimmed(&table, Transliterator::Native, &mut out);
        assert_eq!(out, "-");
    }

    #[test]
    fn test_render_fixed_resolves_ambiguous() {
        let table = romaji_table();
        let (chunk, _) = fed(&table, "n");
        let mut out = String::new();
        chunk.render_fixed(&table, Transliterator::Native, &mut out);
        assert_eq!(out, "ん");

        let (chunk, _) = fed(&table, "k");
        let mut out = String::new();
        chunk.render_fixed(&table, Transliterator::Native, &mut out);
        assert_eq!(out, "k");
    }
}
