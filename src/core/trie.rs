// --- File: src/core/trie.rs
use crate::core::types::{Word, ALPHABET};
use crate::error::{Result, WordleError};
use crate::persistence::load_vocabulary;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::path::Path;

/// Index of a node inside the tree's arena.
pub type NodeId = usize;

/// A set of letters `a..=z` packed into a bitmask.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct LetterSet(u32);

impl LetterSet {
    pub const ALL: LetterSet = LetterSet((1 << ALPHABET) - 1);
    pub const EMPTY: LetterSet = LetterSet(0);

    pub fn from_letters(letters: &[u8]) -> Self {
        let mut set = Self::EMPTY;
        for &b in letters {
            set.insert(b);
        }
        set
    }

    pub fn insert(&mut self, letter: u8) {
        if letter.is_ascii_lowercase() {
            self.0 |= 1 << (letter - b'a');
        }
    }

    pub fn contains(&self, letter: u8) -> bool {
        letter.is_ascii_lowercase() && self.0 & (1 << (letter - b'a')) != 0
    }
}

#[derive(Clone, Debug, Serialize, Deserialize)]
struct Node {
    // ordered so that expansion order is alphabetical and reproducible
    children: BTreeMap<u8, NodeId>,
    terminal: bool,
}

impl Node {
    fn new() -> Self {
        Self { children: BTreeMap::new(), terminal: false }
    }
}

/// Immutable letter tree over a vocabulary. Node 0 is the root (the empty prefix).
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct PrefixTree {
    nodes: Vec<Node>,
    words: usize,
}

impl PrefixTree {
    /// O(total letters). Duplicate words are stored once.
    pub fn build<'a, I>(words: I) -> Self
    where
        I: IntoIterator<Item = &'a Word>,
    {
        let mut tree = Self { nodes: vec![Node::new()], words: 0 };
        for word in words {
            tree.insert(word);
        }
        tree
    }

    /// Reads a vocabulary file and builds its tree. An empty file is an error.
    pub fn from_file(path: &Path) -> Result<Self> {
        let words = load_vocabulary(path)?;
        if words.is_empty() {
            return Err(WordleError::EmptyVocabulary);
        }
        Ok(Self::build(&words))
    }

    fn insert(&mut self, word: &Word) {
        let mut node_idx = 0;
        for &byte in word.bytes() {
            node_idx = match self.nodes[node_idx].children.get(&byte) {
                Some(&id) => id,
                None => {
                    let new_node_id = self.nodes.len();
                    self.nodes.push(Node::new());
                    self.nodes[node_idx].children.insert(byte, new_node_id);
                    new_node_id
                }
            };
        }
        if !self.nodes[node_idx].terminal {
            self.nodes[node_idx].terminal = true;
            self.words += 1;
        }
    }

    pub fn root(&self) -> NodeId {
        0
    }

    /// Number of distinct words.
    pub fn len(&self) -> usize {
        self.words
    }

    pub fn is_empty(&self) -> bool {
        self.words == 0
    }

    pub fn node_count(&self) -> usize {
        self.nodes.len()
    }

    pub fn child(&self, node: NodeId, letter: u8) -> Option<NodeId> {
        self.nodes[node].children.get(&letter).copied()
    }

    pub fn is_terminal(&self, node: NodeId) -> bool {
        self.nodes[node].terminal
    }

    /// Children of `node` restricted to `allowed`, in alphabetical order.
    pub fn children_at(&self, node: NodeId, allowed: LetterSet) -> impl Iterator<Item = (u8, NodeId)> + '_ {
        self.nodes[node]
            .children
            .iter()
            .filter(move |&(&letter, _)| allowed.contains(letter))
            .map(|(&letter, &id)| (letter, id))
    }

    /// Descends letter by letter. Case-folded; true only on a terminal node.
    pub fn contains(&self, word: &str) -> bool {
        let mut node = self.root();
        for byte in word.bytes().map(|b| b.to_ascii_lowercase()) {
            match self.child(node, byte) {
                Some(next) => node = next,
                None => return false,
            }
        }
        self.is_terminal(node)
    }

    pub fn contains_word(&self, word: &Word) -> bool {
        self.contains(word.as_str())
    }

    /// All stored words in alphabetical order.
    pub fn words(&self) -> Vec<Word> {
        let mut out = Vec::with_capacity(self.words);
        let mut prefix = Vec::new();
        self.collect_words(self.root(), &mut prefix, &mut out);
        out
    }

    fn collect_words(&self, node: NodeId, prefix: &mut Vec<u8>, out: &mut Vec<Word>) {
        if self.nodes[node].terminal {
            if let Ok(word) = Word::new(&String::from_utf8_lossy(prefix)) {
                out.push(word);
            }
        }
        for (&letter, &child) in &self.nodes[node].children {
            prefix.push(letter);
            self.collect_words(child, prefix, out);
            prefix.pop();
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn tree(words: &[&str]) -> PrefixTree {
        let words: Vec<Word> = words.iter().map(|w| Word::new(w).unwrap()).collect();
        PrefixTree::build(&words)
    }

    #[test]
    fn contains_exactly_the_vocabulary() {
        let vocab = ["crane", "crate", "slate", "trace", "cramp"];
        let t = tree(&vocab);
        assert_eq!(t.len(), 5);
        for w in vocab {
            assert!(t.contains(w));
        }
        assert!(t.contains("CRANE"));
        assert!(!t.contains("cran"));
        assert!(!t.contains("cranes"));
        assert!(!t.contains("crank"));
        assert!(!t.contains(""));
        assert!(!t.contains(" crane"));
        assert!(!t.contains("crane\n"));
        assert!(!t.contains("\tCRANE "));
    }

    #[test]
    fn duplicates_are_counted_once() {
        let t = tree(&["hello", "hello", "world"]);
        assert_eq!(t.len(), 2);
        assert_eq!(t.words().len(), 2);
    }

    #[test]
    fn children_are_alphabetical_and_masked() {
        let t = tree(&["crane", "crate", "cramp", "craze"]);
        let mut node = t.root();
        for &b in b"cra" {
            node = t.child(node, b).unwrap();
        }
        let all: Vec<u8> = t.children_at(node, LetterSet::ALL).map(|(l, _)| l).collect();
        assert_eq!(all, b"mntz".to_vec());
        let some: Vec<u8> = t
            .children_at(node, LetterSet::from_letters(b"tz"))
            .map(|(l, _)| l)
            .collect();
        assert_eq!(some, b"tz".to_vec());
        assert_eq!(t.children_at(node, LetterSet::EMPTY).count(), 0);
    }

    #[test]
    fn words_round_trip_sorted() {
        let t = tree(&["slate", "crane", "adieu"]);
        let words: Vec<String> = t.words().iter().map(|w| w.to_string()).collect();
        assert_eq!(words, vec!["adieu", "crane", "slate"]);
    }

    #[test]
    fn shared_prefixes_share_nodes() {
        let t = tree(&["crane", "crate"]);
        // root + c r a + n e + t e
        assert_eq!(t.node_count(), 1 + 3 + 2 + 2);
    }
}
