// src/core/decoder.rs
use crate::core::trie::{LetterSet, NodeId, PrefixTree};
use crate::core::types::{letter, Logits, Word, ALPHABET, WORD_LEN};
use crate::error::{Result, WordleError};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Turns a 5 x 26 score matrix into a guess.
pub trait Decoder: Sync {
    fn decode(&self, logits: &Logits) -> Result<Word>;
}

/// Which decoder a run should use.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum Strategy {
    Greedy,
    #[default]
    Beam,
}

impl Strategy {
    /// Instantiates the strategy against a tree. `Greedy` ignores the tree.
    pub fn decoder<'t>(self, tree: &'t PrefixTree, width: usize) -> Box<dyn Decoder + 't> {
        match self {
            Strategy::Greedy => Box::new(Greedy),
            Strategy::Beam => Box::new(BeamSearch::new(tree, width)),
        }
    }
}

impl FromStr for Strategy {
    type Err = WordleError;
    fn from_str(s: &str) -> Result<Self> {
        match s.to_ascii_lowercase().as_str() {
            "greedy" => Ok(Strategy::Greedy),
            "beam" => Ok(Strategy::Beam),
            other => Err(WordleError::Config(format!("unknown decoder {other:?}, expected greedy or beam"))),
        }
    }
}

impl fmt::Display for Strategy {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Strategy::Greedy => f.write_str("greedy"),
            Strategy::Beam => f.write_str("beam"),
        }
    }
}

/// Per-position argmax; the first maximum wins ties.
pub fn decode_greedy(logits: &Logits) -> Word {
    let mut letters = [b'a'; WORD_LEN];
    for (slot, row) in letters.iter_mut().zip(logits.rows()) {
        let mut best = 0;
        for k in 1..ALPHABET {
            if row[k] > row[best] {
                best = k;
            }
        }
        *slot = letter(best);
    }
    Word::from_letters(letters)
}

/// Unconstrained argmax decoder. May produce words outside the vocabulary.
#[derive(Debug, Clone, Copy, Default)]
pub struct Greedy;

impl Decoder for Greedy {
    fn decode(&self, logits: &Logits) -> Result<Word> {
        Ok(decode_greedy(logits))
    }
}

#[derive(Debug, Clone, Copy)]
struct Candidate {
    prefix: [u8; WORD_LEN],
    score: f32,
    node: NodeId,
}

/// Up to `width` complete vocabulary words, best first.
///
/// Every expansion follows an edge of the tree, so each surviving candidate is a
/// prefix of some vocabulary word no matter what the model scores. Ties keep the
/// order in which candidates were generated (beam order, then alphabetical).
pub fn top_k(logits: &Logits, tree: &PrefixTree, width: usize) -> Vec<(Word, f32)> {
    let mut beam = vec![Candidate { prefix: [0; WORD_LEN], score: 0.0, node: tree.root() }];
    let mut next = Vec::new();

    for position in 0..WORD_LEN {
        next.clear();
        for candidate in &beam {
            for (byte, child) in tree.children_at(candidate.node, LetterSet::ALL) {
                let mut prefix = candidate.prefix;
                prefix[position] = byte;
                next.push(Candidate {
                    prefix,
                    score: candidate.score + logits[position][(byte - b'a') as usize],
                    node: child,
                });
            }
        }
        next.sort_by(|a, b| b.score.total_cmp(&a.score));
        next.truncate(width);
        std::mem::swap(&mut beam, &mut next);
        if beam.is_empty() {
            break;
        }
    }

    beam.into_iter()
        .filter(|c| tree.is_terminal(c.node))
        .map(|c| (Word::from_letters(c.prefix), c.score))
        .collect()
}

/// Best vocabulary word reachable by a beam of `width`.
pub fn beam_search(logits: &Logits, tree: &PrefixTree, width: usize) -> Result<Word> {
    top_k(logits, tree, width)
        .into_iter()
        .next()
        .map(|(word, _)| word)
        .ok_or(WordleError::DecodingExhausted { width })
}

/// Tree-constrained beam search decoder.
#[derive(Debug, Clone, Copy)]
pub struct BeamSearch<'t> {
    tree: &'t PrefixTree,
    width: usize,
}

impl<'t> BeamSearch<'t> {
    pub fn new(tree: &'t PrefixTree, width: usize) -> Self {
        Self { tree, width }
    }

    pub fn width(&self) -> usize {
        self.width
    }
}

impl Decoder for BeamSearch<'_> {
    fn decode(&self, logits: &Logits) -> Result<Word> {
        beam_search(logits, self.tree, self.width)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::rngs::SmallRng;
    use rand::{Rng, SeedableRng};
    use crate::core::types::letter_index;

    fn tree(words: &[&str]) -> PrefixTree {
        let words: Vec<Word> = words.iter().map(|w| Word::new(w).unwrap()).collect();
        PrefixTree::build(&words)
    }

    fn word(s: &str) -> Word {
        Word::new(s).unwrap()
    }

    /// Deterministic pseudo-random logits.
    fn noisy(seed: u64) -> Logits {
        let mut rng = SmallRng::seed_from_u64(seed);
        let mut logits = Logits::zeros();
        for p in 0..WORD_LEN {
            for k in 0..ALPHABET {
                logits[p][k] = rng.random_range(-2.0..2.0);
            }
        }
        logits
    }

    fn word_score(logits: &Logits, w: &Word) -> f32 {
        w.labels().iter().enumerate().map(|(p, &k)| logits[p][k]).sum()
    }

    #[test]
    fn greedy_takes_argmax_per_position() {
        let logits = Logits::one_hot(&word("zzzzz"), 1.0, 0.0);
        assert_eq!(decode_greedy(&logits), word("zzzzz"));
        // all ties fall back to the first letter
        assert_eq!(decode_greedy(&Logits::zeros()), word("aaaaa"));
    }

    #[test]
    fn beam_only_returns_vocabulary_words() {
        let t = tree(&["crane", "slate", "adieu"]);
        // the model prefers a word that is not in the vocabulary
        let logits = Logits::one_hot(&word("crant"), 5.0, 0.0);
        let guess = beam_search(&logits, &t, 3).unwrap();
        assert_eq!(guess, word("crane"));
        assert!(t.contains_word(&guess));
    }

    #[test]
    fn masking_beats_high_scores_off_the_tree() {
        let t = tree(&["abcde"]);
        let logits = Logits::one_hot(&word("zzzzz"), 100.0, 0.0);
        assert_eq!(beam_search(&logits, &t, 1).unwrap(), word("abcde"));
    }

    #[test]
    fn wide_beam_finds_global_best() {
        let vocab = ["crane", "crate", "slate", "trace", "cramp", "adieu", "stare", "spare", "scare", "snare"];
        let t = tree(&vocab);
        for seed in 0..50 {
            let logits = noisy(seed);
            let best = vocab
                .iter()
                .map(|w| word(w))
                .max_by(|a, b| word_score(&logits, a).total_cmp(&word_score(&logits, b)))
                .unwrap();
            assert_eq!(beam_search(&logits, &t, vocab.len()).unwrap(), best, "seed {seed}");
        }
    }

    #[test]
    fn narrow_beam_can_miss_but_stays_legal() {
        // greedy-ish width 1 commits to 'b' at position 0
        let t = tree(&["baaaa", "azzzz"]);
        let mut logits = Logits::zeros();
        logits[0][letter_index(b'b')] = 1.0;
        for p in 1..WORD_LEN {
            logits[p][letter_index(b'z')] = 10.0;
        }
        assert_eq!(beam_search(&logits, &t, 1).unwrap(), word("baaaa"));
        assert_eq!(beam_search(&logits, &t, 2).unwrap(), word("azzzz"));
    }

    #[test]
    fn top_k_is_sorted_and_bounded() {
        let t = tree(&["crane", "crate", "slate", "trace"]);
        let logits = noisy(7);
        let ranked = top_k(&logits, &t, 3);
        assert!(ranked.len() <= 3);
        assert!(ranked.windows(2).all(|w| w[0].1 >= w[1].1));
    }

    #[test]
    fn ties_keep_generation_order() {
        let t = tree(&["bbbbb", "aaaaa"]);
        assert_eq!(beam_search(&Logits::zeros(), &t, 2).unwrap(), word("aaaaa"));
    }

    #[test]
    fn empty_tree_or_zero_width_is_exhausted() {
        let empty = PrefixTree::build(&Vec::<Word>::new());
        let err = beam_search(&Logits::zeros(), &empty, 3).unwrap_err();
        assert!(matches!(err, WordleError::DecodingExhausted { width: 3 }));
        let t = tree(&["crane"]);
        assert!(matches!(beam_search(&Logits::zeros(), &t, 0), Err(WordleError::DecodingExhausted { width: 0 })));
    }

    #[test]
    fn strategy_parses_and_builds() {
        let t = tree(&["crane"]);
        assert_eq!("BEAM".parse::<Strategy>().unwrap(), Strategy::Beam);
        assert_eq!("greedy".parse::<Strategy>().unwrap(), Strategy::Greedy);
        assert!("sample".parse::<Strategy>().is_err());
        let logits = Logits::one_hot(&word("zzzzz"), 1.0, 0.0);
        assert_eq!(Strategy::Greedy.decoder(&t, 3).decode(&logits).unwrap(), word("zzzzz"));
        assert_eq!(Strategy::Beam.decoder(&t, 3).decode(&logits).unwrap(), word("crane"));
    }
}
