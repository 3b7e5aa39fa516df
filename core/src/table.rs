//! Conversion table: the rule set that turns raw keystrokes into text.
//!
//! Each rule maps an input sequence to a result and an optional pending
//! string that is fed back as the start of the next key. For example the
//! romaji rule `"tt" → "っ" (pending "t")` lets "tta" become "った".
//!
//! Tables can be built in code with `add_rule` or loaded from a simple
//! tab-separated text format:
//!
//! ```text
//! # input<TAB>result[<TAB>pending]
//! ka	か
//! tt	っ	t
//! ```

use std::borrow::Cow;
use std::path::Path;

use anyhow::{bail, Context, Result};
use tracing::{debug, warn};

use crate::trie::TrieNode;
use crate::{utils, Config};

/// A single conversion rule.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Entry {
    input: String,
    result: String,
    pending: String,
}

impl Entry {
    pub fn new<I, R, P>(input: I, result: R, pending: P) -> Self
    where
        I: Into<String>,
        R: Into<String>,
        P: Into<String>,
    {
        Self {
            input: input.into(),
            result: result.into(),
            pending: pending.into(),
        }
    }

    /// The key sequence this rule consumes.
    pub fn input(&self) -> &str {
        &self.input
    }

    /// Text appended to the converted output.
    pub fn result(&self) -> &str {
        &self.result
    }

    /// Text carried over as the start of the next key.
    pub fn pending(&self) -> &str {
        &self.pending
    }
}

/// Result of a longest-prefix lookup.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PrefixMatch<'a> {
    /// No rule starts with the first character of the key.
    Unmatched,
    /// The first `len` bytes lead into longer rules but no rule can be
    /// applied yet.
    Prefix { len: usize },
    /// The longest rule whose input is a prefix of the key.
    ///
    /// `fixed` is false when the key is exactly this rule's input and longer
    /// rules could still extend it (e.g. "n" while "na" exists).
    Entry {
        entry: &'a Entry,
        len: usize,
        fixed: bool,
    },
}

/// Prefix-searchable rule table.
#[derive(Debug, Clone, Default)]
pub struct Table {
    entries: Vec<Entry>,
    trie: TrieNode,
    case_sensitive: bool,
}

impl Table {
    /// Create an empty, case-insensitive table.
    pub fn new() -> Self {
        Self {
            entries: Vec::new(),
            trie: TrieNode::new(),
            case_sensitive: false,
        }
    }

    /// Create an empty table honoring the lookup options in `config`.
    pub fn with_config(config: &Config) -> Self {
        let mut table = Self::new();
        table.case_sensitive = config.case_sensitive;
        table
    }

    /// Add a rule, replacing any existing rule with the same input.
    ///
    /// A rule whose input contains an upper-case ASCII letter makes the whole
    /// table case-sensitive.
    pub fn add_rule(&mut self, input: &str, result: &str, pending: &str) {
        if input.is_empty() {
            warn!(result = result, "ignoring conversion rule with empty input");
            return;
        }
        if input.chars().any(|c| c.is_ascii_uppercase()) {
            self.case_sensitive = true;
        }

        let entry = Entry::new(input, result, pending);
        match self.trie.get(input) {
            Some(index) => self.entries[index] = entry,
            None => {
                self.trie.insert(input, self.entries.len());
                self.entries.push(entry);
            }
        }
    }

    /// Exact rule lookup.
    pub fn lookup(&self, input: &str) -> Option<&Entry> {
        let key = self.normalize_key(input);
        self.trie.get(&key).map(|index| &self.entries[index])
    }

    /// Check whether any rule input equals or extends `prefix`.
    pub fn has_sub_rules(&self, prefix: &str) -> bool {
        let key = self.normalize_key(prefix);
        self.trie.contains_prefix(&key)
    }

    /// Find the longest rule whose input is a prefix of `key`.
    ///
    /// Lengths in the result are byte lengths into `key`.
    pub fn lookup_prefix(&self, key: &str) -> PrefixMatch<'_> {
        if key.is_empty() {
            return PrefixMatch::Unmatched;
        }
        let key = self.normalize_key(key);
        let walk = self.trie.walk(&key);

        // The whole key lies on a path that still continues: wait for more
        // input unless the key itself is a rule.
        if walk.complete && walk.open {
            return match walk.matched {
                Some((index, len)) if len == key.len() => PrefixMatch::Entry {
                    entry: &self.entries[index],
                    len,
                    fixed: false,
                },
                _ => PrefixMatch::Prefix { len: key.len() },
            };
        }

        match walk.matched {
            Some((index, len)) => PrefixMatch::Entry {
                entry: &self.entries[index],
                len,
                fixed: true,
            },
            None if walk.walked == 0 => PrefixMatch::Unmatched,
            None => PrefixMatch::Prefix { len: walk.walked },
        }
    }

    /// Force or relax case-sensitive lookups.
    pub fn set_case_sensitive(&mut self, case_sensitive: bool) {
        self.case_sensitive = case_sensitive;
    }

    pub fn case_sensitive(&self) -> bool {
        self.case_sensitive
    }

    /// Number of rules.
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Iterate over rules in insertion order.
    pub fn entries(&self) -> impl Iterator<Item = &Entry> {
        self.entries.iter()
    }

    /// Parse a table from tab-separated text.
    ///
    /// Blank lines and lines starting with `#` are skipped. Every other line
    /// must hold `input<TAB>result` or `input<TAB>result<TAB>pending`.
    pub fn load_from_str(content: &str) -> Result<Self> {
        let mut table = Self::new();
        for (lineno, line) in content.lines().enumerate() {
            if line.trim().is_empty() || line.starts_with('#') {
                continue;
            }
            let fields: Vec<&str> = line.split('\t').collect();
            let (input, result, pending) = match fields.as_slice() {
                [input, result] => (*input, *result, ""),
                [input, result, pending] => (*input, *result, *pending),
                _ => bail!(
                    "line {}: expected 2 or 3 tab-separated fields, found {}",
                    lineno + 1,
                    fields.len()
                ),
            };
            if input.is_empty() {
                bail!("line {}: empty rule input", lineno + 1);
            }
            table.add_rule(
                &utils::nfc(input),
                &utils::nfc(result),
                &utils::nfc(pending),
            );
        }

        debug!(
            rules = table.len(),
            case_sensitive = table.case_sensitive,
            "loaded conversion table"
        );
        Ok(table)
    }

    /// Load a table file in the format accepted by `load_from_str`.
    pub fn load_from_file<P: AsRef<Path>>(path: P) -> Result<Self> {
        let path = path.as_ref();
        let content = std::fs::read_to_string(path)
            .with_context(|| format!("read table {}", path.display()))?;
        Self::load_from_str(&content).with_context(|| format!("parse table {}", path.display()))
    }

    fn normalize_key<'a>(&self, key: &'a str) -> Cow<'a, str> {
        if self.case_sensitive || !key.chars().any(|c| c.is_ascii_uppercase()) {
            Cow::Borrowed(key)
        } else {
            Cow::Owned(key.to_ascii_lowercase())
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn demo_table() -> Table {
        let mut table = Table::new();
        table.add_rule("a", "あ", "");
        table.add_rule("ka", "か", "");
        table.add_rule("kya", "きゃ", "");
        table.add_rule("n", "ん", "");
        table.add_rule("na", "な", "");
        table.add_rule("nn", "ん", "");
        table.add_rule("tt", "っ", "t");
        table.add_rule("ta", "た", "");
        table
    }

    #[test]
    fn test_exact_lookup() {
        let table = demo_table();
        assert_eq!(table.lookup("ka").map(Entry::result), Some("か"));
        assert_eq!(table.lookup("tt").map(Entry::pending), Some("t"));
        assert!(table.lookup("k").is_none());
        assert_eq!(table.len(), 8);
    }

    #[test]
    fn test_lookup_prefix_fixed_entry() {
        let table = demo_table();
        match table.lookup_prefix("kab") {
            PrefixMatch::Entry { entry, len, fixed } => {
                assert_eq!(entry.result(), "か");
                assert_eq!(len, 2);
                assert!(fixed);
            }
            other => panic!("unexpected {:?}", other),
        }
    }

    #[test]
    fn test_lookup_prefix_ambiguous_entry() {
        let table = demo_table();
        match table.lookup_prefix("n") {
            PrefixMatch::Entry { entry, len, fixed } => {
                assert_eq!(entry.input(), "n");
                assert_eq!(len, 1);
                assert!(!fixed);
            }
            other => panic!("unexpected {:?}", other),
        }
    }

    #[test]
    fn test_lookup_prefix_shorter_rule_before_mismatch() {
        let table = demo_table();
        // "n" is a rule and "k" cannot follow it
        match table.lookup_prefix("nk") {
            PrefixMatch::Entry { entry, len, fixed } => {
                assert_eq!(entry.input(), "n");
                assert_eq!(len, 1);
                assert!(fixed);
            }
            other => panic!("unexpected {:?}", other),
        }
    }

    #[test]
    fn test_lookup_prefix_partial() {
        let table = demo_table();
        assert_eq!(table.lookup_prefix("k"), PrefixMatch::Prefix { len: 1 });
        assert_eq!(table.lookup_prefix("ky"), PrefixMatch::Prefix { len: 2 });
        // "k" is live but "x" breaks it
        assert_eq!(table.lookup_prefix("kx"), PrefixMatch::Prefix { len: 1 });
    }

    #[test]
    fn test_lookup_prefix_unmatched() {
        let table = demo_table();
        assert_eq!(table.lookup_prefix("x"), PrefixMatch::Unmatched);
        assert_eq!(table.lookup_prefix(""), PrefixMatch::Unmatched);
    }

    #[test]
    fn test_has_sub_rules() {
        let table = demo_table();
        assert!(table.has_sub_rules("k"));
        assert!(table.has_sub_rules("ky"));
        assert!(table.has_sub_rules("kya"));
        assert!(!table.has_sub_rules("kyo"));
    }

    #[test]
    fn test_add_rule_replaces() {
        let mut table = demo_table();
        table.add_rule("ka", "カ", "");
        assert_eq!(table.len(), 8);
        assert_eq!(table.lookup("ka").map(Entry::result), Some("カ"));
    }

    #[test]
    fn test_empty_input_rule_ignored() {
        let mut table = Table::new();
        table.add_rule("", "x", "");
        assert!(table.is_empty());
    }

    #[test]
    fn test_case_insensitive_by_default() {
        let table = demo_table();
        assert!(!table.case_sensitive());
        assert_eq!(table.lookup("KA").map(Entry::result), Some("か"));
        match table.lookup_prefix("Ka") {
            PrefixMatch::Entry { len, .. } => assert_eq!(len, 2),
            other => panic!("unexpected {:?}", other),
        }
    }

    #[test]
    fn test_uppercase_rule_makes_table_case_sensitive() {
        let mut table = demo_table();
        table.add_rule("A", "Ａ", "");
        assert!(table.case_sensitive());
        assert_eq!(table.lookup("A").map(Entry::result), Some("Ａ"));
        assert!(table.lookup("KA").is_none());
    }

    #[test]
    fn test_with_config_case_sensitive() {
        let config = Config {
            case_sensitive: true,
            ..Config::default()
        };
        let mut table = Table::with_config(&config);
        table.add_rule("ka", "か", "");
        assert!(table.lookup("KA").is_none());
    }

    #[test]
    fn test_load_from_str() {
        let content = "# romaji\nka\tか\n\ntt\tっ\tt\n";
        let table = Table::load_from_str(content).unwrap();
        assert_eq!(table.len(), 2);
        assert_eq!(table.lookup("tt"), Some(&Entry::new("tt", "っ", "t")));
    }

    #[test]
    fn test_load_from_str_normalizes_nfc() {
        // "か" followed by a combining voiced mark composes to "が"
        let table = Table::load_from_str("ga\tか\u{3099}\n").unwrap();
        assert_eq!(table.lookup("ga").map(Entry::result), Some("が"));
    }

    #[test]
    fn test_load_from_str_rejects_malformed_line() {
        let err = Table::load_from_str("ka\tか\nbroken\n").unwrap_err();
        assert!(err.to_string().contains("line 2"));

        let err = Table::load_from_str("a\tb\tc\td\n").unwrap_err();
        assert!(err.to_string().contains("found 4"));
    }

    #[test]
    fn test_load_from_missing_file() {
        let err = Table::load_from_file("/nonexistent/libkana/table.tsv").unwrap_err();
        assert!(err.to_string().contains("read table"));
    }
}
