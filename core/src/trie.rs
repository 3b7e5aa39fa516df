//! Prefix trie backing conversion table lookups.

use std::collections::HashMap;

/// A character trie mapping rule inputs to entry indices.
///
/// Used by `Table` to answer the "longest rule that is a prefix of this key"
/// question that drives chunk feeding, and to tell whether a partial key can
/// still grow into a rule.
///
/// # Example
/// ```
/// use libkana_core::trie::TrieNode;
///
/// let mut trie = TrieNode::new();
/// trie.insert("ka", 0);
/// trie.insert("kya", 1);
///
/// assert_eq!(trie.get("ka"), Some(0));
/// assert_eq!(trie.get("k"), None);
/// assert!(trie.contains_prefix("ky"));
///
/// let walk = trie.walk("kak");
/// assert_eq!(walk.matched, Some((0, 2)));
/// assert_eq!(walk.walked, 2);
/// assert!(!walk.complete);
/// ```
#[derive(Debug, Clone, Default)]
pub struct TrieNode {
    children: HashMap<char, Box<TrieNode>>,
    /// Index of the entry whose input ends at this node.
    value: Option<usize>,
}

/// Outcome of walking a key through the trie.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Walk {
    /// Longest stored key that is a prefix of the walked key, as
    /// `(value, byte length)`.
    pub matched: Option<(usize, usize)>,
    /// Number of bytes of the key that could be followed.
    pub walked: usize,
    /// Whether the whole key was followed.
    pub complete: bool,
    /// Whether the node reached at the end of the walk has children.
    pub open: bool,
}

impl TrieNode {
    /// Create a new empty trie root.
    pub fn new() -> Self {
        Self {
            children: HashMap::new(),
            value: None,
        }
    }

    /// Insert a key, returning the value it previously mapped to.
    pub fn insert(&mut self, key: &str, value: usize) -> Option<usize> {
        let mut node = self;
        for ch in key.chars() {
            node = node
                .children
                .entry(ch)
                .or_insert_with(|| Box::new(TrieNode::new()));
        }
        node.value.replace(value)
    }

    /// Exact lookup.
    pub fn get(&self, key: &str) -> Option<usize> {
        self.node(key).and_then(|node| node.value)
    }

    /// Check whether some stored key equals or extends `prefix`.
    ///
    /// The empty prefix is contained only when the trie is non-empty.
    pub fn contains_prefix(&self, prefix: &str) -> bool {
        match self.node(prefix) {
            Some(node) => node.value.is_some() || !node.children.is_empty(),
            None => false,
        }
    }

    /// Follow `key` from the root as far as the trie allows.
    ///
    /// The walk records the longest stored key seen on the way, so a caller
    /// can decide between "a rule matched", "the key is still a live prefix"
    /// and "nothing here starts like this".
    pub fn walk(&self, key: &str) -> Walk {
        let mut node = self;
        let mut walked = 0;
        let mut matched = None;
        let mut complete = true;

        for (idx, ch) in key.char_indices() {
            match node.children.get(&ch) {
                Some(child) => {
                    node = child;
                    walked = idx + ch.len_utf8();
                    if let Some(value) = node.value {
                        matched = Some((value, walked));
                    }
                }
                None => {
                    complete = false;
                    break;
                }
            }
        }

        Walk {
            matched,
            walked,
            complete,
            open: !node.children.is_empty(),
        }
    }

    fn node(&self, key: &str) -> Option<&TrieNode> {
        let mut node = self;
        for ch in key.chars() {
            node = node.children.get(&ch)?;
        }
        Some(node)
    }
}
