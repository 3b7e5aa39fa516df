//! Preedit composition as an editable sequence of chunks.
//!
//! The composition represents the text being composed, e.g. typing "kyouha"
//! shows "きょうは" while the raw keys are still available. It is stored as
//! an ordered list of chunks; each chunk renders itself under a rendering
//! mode (`Transliterator`), and different modes give different lengths. Every
//! position in this module is therefore tied to a mode: position 1 under
//! `Raw` ("k|a") is not position 1 under `Native` ("か|").
//!
//! Positions are resolved by a single linear scan (`locate`). Edits first cut
//! the sequence at a chunk boundary (`split_at`), so inserts and deletes only
//! ever act on whole chunks.

use std::ops::Range;
use std::sync::Arc;

use serde::{Deserialize, Serialize};
use tracing::{error, warn};

use crate::chunk::{CharChunk, Chunk};
use crate::table::Table;
use crate::transliterator::Transliterator;
use crate::Config;

/// How the last chunk is rendered.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TrimMode {
    /// Hide keys still waiting for more input
    Trim,
    /// Render like every other chunk
    AsIs,
    /// Resolve pending keys as if typing stopped
    Fix,
}

impl Default for TrimMode {
    fn default() -> Self {
        Self::AsIs
    }
}

/// Preedit text split around a cursor.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Preedit {
    /// Characters before the cursor
    pub left: String,
    /// The character at the cursor, if any
    pub focused: String,
    /// Everything after the focused character
    pub right: String,
}

/// The character range one chunk occupies under some rendering mode.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Segment {
    /// Character range in the rendered text
    pub range: Range<usize>,
    /// Mode the chunk is stamped with
    pub transliterator: Transliterator,
}

/// Editable composition buffer.
///
/// Owns its chunks; the conversion table is shared. New chunks are stamped
/// with the current input mode.
#[derive(Debug, Clone)]
pub struct Composition<C: Chunk = CharChunk> {
    chunks: Vec<C>,
    table: Arc<Table>,
    input_mode: Transliterator,
}

impl<C: Chunk> Composition<C> {
    /// Create an empty composition over `table`.
    pub fn new(table: Arc<Table>) -> Self {
        Self {
            chunks: Vec::new(),
            table,
            input_mode: Transliterator::Native,
        }
    }

    /// Create an empty composition using the input mode from `config`.
    pub fn with_config(table: Arc<Table>, config: &Config) -> Self {
        Self {
            chunks: Vec::new(),
            table,
            input_mode: config.input_mode,
        }
    }

    pub fn table(&self) -> &Table {
        &self.table
    }

    pub fn set_table(&mut self, table: Arc<Table>) {
        self.table = table;
    }

    /// Mode stamped on chunks created by future insertions.
    pub fn input_mode(&self) -> Transliterator {
        self.input_mode
    }

    pub fn set_input_mode(&mut self, mode: Transliterator) {
        self.input_mode = mode;
    }

    pub fn chunks(&self) -> &[C] {
        &self.chunks
    }

    pub fn is_empty(&self) -> bool {
        self.chunks.is_empty()
    }

    /// Drop every chunk.
    pub fn clear(&mut self) {
        self.chunks.clear();
    }

    // ========== Editing ==========

    /// Insert raw keys at `position` (native mode).
    ///
    /// Returns the native position just after the inserted content.
    pub fn insert_at(&mut self, position: usize, input: &str) -> usize {
        if input.is_empty() {
            return position;
        }
        let mode = self.input_mode;

        let (_, mut next) = self.split_at(position);
        let target = self.insertion_chunk(&mut next, mode);

        let mut rest = input.to_string();
        self.chunks[target].feed_input(&self.table, &mut rest);
        while !rest.is_empty() {
            let target = self.insert_chunk(&mut next, mode);
            let before = rest.len();
            self.chunks[target].feed_input(&self.table, &mut rest);
            assert!(rest.len() < before, "empty chunk refused input {:?}", rest);
        }

        self.position_of(next, Transliterator::Native)
    }

    /// Insert raw keys together with their already converted text.
    ///
    /// Works like `insert_at` but skips the table conversion for `rendered`;
    /// chunks are added until both strings are used up.
    pub fn insert_key_and_rendered_at(&mut self, position: usize, key: &str, rendered: &str) -> usize {
        if key.is_empty() && rendered.is_empty() {
            return position;
        }
        let mode = self.input_mode;

        let (_, mut next) = self.split_at(position);
        let target = self.insertion_chunk(&mut next, mode);

        let mut raw = key.to_string();
        let mut converted = rendered.to_string();
        self.chunks[target].feed_input_and_rendered(&self.table, &mut raw, &mut converted);
        while !(raw.is_empty() && converted.is_empty()) {
            let target = self.insert_chunk(&mut next, mode);
            let before = raw.len() + converted.len();
            self.chunks[target].feed_input_and_rendered(&self.table, &mut raw, &mut converted);
            assert!(
                raw.len() + converted.len() < before,
                "empty chunk refused input {:?} / {:?}",
                raw,
                converted
            );
        }

        self.position_of(next, Transliterator::Native)
    }

    /// Delete the character to the right of `position` (native mode).
    ///
    /// Deleting at or past the end changes nothing. The returned position is
    /// `position` itself, since nothing before it moves.
    pub fn delete_at(&mut self, position: usize) -> usize {
        let (_, index) = self.split_at(position);
        if index >= self.chunks.len() {
            return position;
        }
        let new_position = self.position_of(index, Transliterator::Native);

        if self.chunks[index].length(Transliterator::Native) <= 1 {
            self.chunks.remove(index);
        } else {
            // Keep the suffix, drop the one-character prefix
            self.chunks[index].split_off_left(Transliterator::Native, 1);
        }
        new_position
    }

    // ========== Positions ==========

    /// Total length under `mode`.
    pub fn length(&self, mode: Transliterator) -> usize {
        self.chunks.iter().map(|chunk| chunk.length(mode)).sum()
    }

    /// Find the chunk holding `position` under `mode`.
    ///
    /// Returns `(chunk index, offset inside that chunk)`. A position on a
    /// boundary belongs to the chunk on its left (offset == chunk length).
    /// Positions past the end clamp to the end of the last chunk. On an empty
    /// composition the result is `(0, 0)`, i.e. the end.
    pub fn locate(&self, position: usize, mode: Transliterator) -> (usize, usize) {
        let Some(last) = self.chunks.len().checked_sub(1) else {
            return (0, 0);
        };

        let mut rest = position;
        for (index, chunk) in self.chunks.iter().enumerate() {
            let length = chunk.length(mode);
            if rest <= length {
                return (index, rest);
            }
            rest -= length;
        }
        (last, self.chunks[last].length(mode))
    }

    /// Position (under `mode`) where the chunk at `index` starts.
    pub fn position_of(&self, index: usize, mode: Transliterator) -> usize {
        let end = index.min(self.chunks.len());
        self.chunks[..end].iter().map(|chunk| chunk.length(mode)).sum()
    }

    /// Make `position` (native mode) a chunk boundary.
    ///
    /// Returns `(left, right)`: the index of the chunk ending at `position`
    /// (`None` at the start) and the index of the chunk starting there
    /// (`chunks().len()` at the end). A chunk straddling `position` is split
    /// in two.
    pub fn split_at(&mut self, position: usize) -> (Option<usize>, usize) {
        if position == 0 || self.chunks.is_empty() {
            return (None, 0);
        }

        let (index, inner) = self.locate(position, Transliterator::Native);
        let length = self.chunks[index].length(Transliterator::Native);
        assert!(
            inner <= length,
            "inner offset {} beyond chunk length {}",
            inner,
            length
        );
        if inner == length {
            return (Some(index), index + 1);
        }

        let left = self.chunks[index].split_off_left(Transliterator::Native, inner);
        self.chunks.insert(index, left);
        (Some(index), index + 1)
    }

    /// Translate a position from one rendering mode into another.
    ///
    /// Inside a chunk renderings need not line up character by character,
    /// so offsets that do not fit the target rendering snap to the chunk's
    /// trailing boundary.
    pub fn convert_position(&self, position: usize, from: Transliterator, to: Transliterator) -> usize {
        if from == to {
            return position;
        }

        let (index, inner) = self.locate(position, from);
        let Some(chunk) = self.chunks.get(index) else {
            return 0;
        };

        let length_from = chunk.length(from);
        assert!(
            inner <= length_from,
            "inner offset {} beyond chunk length {}",
            inner,
            length_from
        );

        let base = self.position_of(index, to);
        if inner == 0 {
            return base;
        }

        let length_to = chunk.length(to);
        if inner == length_from {
            // End of the chunk stays the end: "ka|" → "か|"
            return base + length_to;
        }
        if inner > length_to {
            // No room in the target rendering: "ts|u" → "つ|"
            return base + length_to;
        }
        // Fits: "っ|と" → "t|to"
        base + inner
    }

    // ========== Rendering modes ==========

    /// Stamp `mode` on the whole composition and use it for future input.
    ///
    /// Returns the new native length.
    pub fn set_display_mode(&mut self, mode: Transliterator) -> usize {
        let length = self.length(Transliterator::Native);
        self.set_transliterator(0, length, mode);
        self.set_input_mode(mode);
        self.length(Transliterator::Native)
    }

    /// Stamp `mode` on every chunk touched by the native range `from..=to`.
    pub fn set_transliterator(&mut self, from: usize, to: usize, mode: Transliterator) {
        if from > to {
            error!(from = from, to = to, "transliterator range start is after its end");
            return;
        }
        if self.chunks.is_empty() {
            return;
        }

        let (first, _) = self.locate(from, Transliterator::Native);
        let (last, _) = self.locate(to, Transliterator::Native);
        for chunk in &mut self.chunks[first..=last] {
            chunk.set_transliterator(mode);
        }
    }

    /// Mode stamped on the chunk holding `position` (native mode).
    pub fn transliterator_at(&self, position: usize) -> Transliterator {
        let (index, _) = self.locate(position, Transliterator::Native);
        self.chunks
            .get(index)
            .map_or(Transliterator::Native, |chunk| chunk.transliterator())
    }

    // ========== Text ==========

    /// Render every chunk under `mode`, treating the last one per `trim`.
    pub fn render(&self, mode: Transliterator, trim: TrimMode) -> String {
        let mut out = String::new();
        let Some((last, init)) = self.chunks.split_last() else {
            warn!("composition is empty");
            return out;
        };

        for chunk in init {
            chunk.render(&self.table, mode, &mut out);
        }
        match trim {
            TrimMode::Trim => last.render_trimmed(&self.table, mode, &mut out),
            TrimMode::AsIs => last.render(&self.table, mode, &mut out),
            TrimMode::Fix => last.render_fixed(&self.table, mode, &mut out),
        }
        out
    }

    /// The native rendering, untrimmed.
    pub fn text(&self) -> String {
        self.render(Transliterator::Native, TrimMode::AsIs)
    }

    /// Render under `mode` with pending keys resolved.
    pub fn render_with_transliterator(&self, mode: Transliterator) -> String {
        self.render(mode, TrimMode::Fix)
    }

    /// Render natively with the last chunk treated per `trim`.
    pub fn render_with_trim_mode(&self, trim: TrimMode) -> String {
        self.render(Transliterator::Native, trim)
    }

    /// Split the native text around `position`.
    pub fn preedit(&self, position: usize) -> Preedit {
        let text = self.text();
        let mut chars = text.chars();
        let left = chars.by_ref().take(position).collect();
        let focused = chars.by_ref().take(1).collect();
        let right = chars.collect();
        Preedit {
            left,
            focused,
            right,
        }
    }

    /// Character ranges of each chunk under `mode`.
    pub fn segments(&self, mode: Transliterator) -> Vec<Segment> {
        let mut start = 0;
        self.chunks
            .iter()
            .map(|chunk| {
                let end = start + chunk.length(mode);
                let segment = Segment {
                    range: start..end,
                    transliterator: chunk.transliterator(),
                };
                start = end;
                segment
            })
            .collect()
    }

    /// Pick the chunk that receives input inserted before `*next`: the left
    /// neighbour when it can still grow, otherwise a fresh one.
    fn insertion_chunk(&mut self, next: &mut usize, mode: Transliterator) -> usize {
        if *next > 0 && self.chunks[*next - 1].is_appendable(mode) {
            return *next - 1;
        }
        self.insert_chunk(next, mode)
    }

    /// Insert an empty chunk stamped with `mode` before `*next`.
    fn insert_chunk(&mut self, next: &mut usize, mode: Transliterator) -> usize {
        let mut chunk = C::default();
        chunk.set_transliterator(mode);
        self.chunks.insert(*next, chunk);
        *next += 1;
        *next - 1
    }
}
