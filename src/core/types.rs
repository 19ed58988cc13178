// src/core/types.rs
use crate::error::{Result, WordleError};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::ops::{Index, IndexMut};
use std::str::FromStr;

/// Letters per word.
pub const WORD_LEN: usize = 5;
/// Size of the alphabet, `a..=z`.
pub const ALPHABET: usize = 26;
/// Attempts allowed per secret word.
pub const DEFAULT_ATTEMPT_CAP: usize = 6;

/// Maps `b'a'..=b'z'` to `0..26`. Callers guarantee the byte is a lowercase letter.
#[inline]
pub fn letter_index(byte: u8) -> usize {
    (byte - b'a') as usize
}

/// Inverse of [`letter_index`].
#[inline]
pub fn letter(index: usize) -> u8 {
    b'a' + index as u8
}

/// A five letter lowercase word. Construction is the only place the
/// length and alphabet invariants are checked.
#[derive(Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(into = "String", try_from = "String")]
pub struct Word([u8; WORD_LEN]);

impl Word {
    /// Strict constructor: exactly five bytes in `a..=z`.
    pub fn new(input: &str) -> Result<Self> {
        let bytes = input.as_bytes();
        if bytes.len() != WORD_LEN {
            return Err(WordleError::InvalidInput {
                input: input.to_string(),
                reason: "expected exactly 5 letters",
            });
        }
        if !bytes.iter().all(u8::is_ascii_lowercase) {
            return Err(WordleError::InvalidInput {
                input: input.to_string(),
                reason: "expected only letters a-z",
            });
        }
        let mut letters = [0u8; WORD_LEN];
        letters.copy_from_slice(bytes);
        Ok(Self(letters))
    }

    /// Case-folding constructor used for vocabulary lines and user input.
    pub fn parse_folded(input: &str) -> Result<Self> {
        Self::new(&input.trim().to_ascii_lowercase())
    }

    /// Builds a word from letter indices (`0..26`).
    pub fn from_indices(indices: [usize; WORD_LEN]) -> Result<Self> {
        if indices.iter().any(|&i| i >= ALPHABET) {
            return Err(WordleError::InvalidInput {
                input: format!("{indices:?}"),
                reason: "letter index out of range",
            });
        }
        Ok(Self(indices.map(letter)))
    }

    /// Callers guarantee every byte is in `a..=z` (argmax indices, tree paths).
    pub(crate) fn from_letters(letters: [u8; WORD_LEN]) -> Self {
        debug_assert!(letters.iter().all(u8::is_ascii_lowercase));
        Self(letters)
    }

    pub fn bytes(&self) -> &[u8; WORD_LEN] {
        &self.0
    }

    pub fn as_str(&self) -> &str {
        std::str::from_utf8(&self.0).unwrap_or_default()
    }

    /// Class labels for the five output heads.
    pub fn labels(&self) -> [usize; WORD_LEN] {
        self.0.map(letter_index)
    }
}

impl FromStr for Word {
    type Err = WordleError;
    fn from_str(s: &str) -> Result<Self> {
        Self::new(s)
    }
}

impl TryFrom<String> for Word {
    type Error = WordleError;
    fn try_from(s: String) -> Result<Self> {
        Self::new(&s)
    }
}

impl From<Word> for String {
    fn from(word: Word) -> Self {
        word.as_str().to_string()
    }
}

impl fmt::Display for Word {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl fmt::Debug for Word {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Word({})", self.as_str())
    }
}

/// Per-position verdict. Serialized as `-1`, `0` or `1`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(into = "i8", try_from = "i8")]
#[repr(i8)]
pub enum Mark {
    Absent = -1,
    Present = 0,
    Correct = 1,
}

impl TryFrom<i8> for Mark {
    type Error = WordleError;
    fn try_from(symbol: i8) -> Result<Self> {
        match symbol {
            -1 => Ok(Mark::Absent),
            0 => Ok(Mark::Present),
            1 => Ok(Mark::Correct),
            other => Err(WordleError::InvalidFeedback { symbol: other.into() }),
        }
    }
}

impl From<Mark> for i8 {
    fn from(mark: Mark) -> Self {
        mark as i8
    }
}

/// Five marks, one per guessed letter.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Feedback([Mark; WORD_LEN]);

impl Feedback {
    pub fn new(marks: [Mark; WORD_LEN]) -> Self {
        Self(marks)
    }

    /// Parses raw `{-1, 0, 1}` symbols, the representation used in traces.
    pub fn from_symbols(symbols: &[i8]) -> Result<Self> {
        if symbols.len() != WORD_LEN {
            return Err(WordleError::InvalidInput {
                input: format!("{symbols:?}"),
                reason: "feedback must have exactly 5 symbols",
            });
        }
        let mut marks = [Mark::Absent; WORD_LEN];
        for (mark, &symbol) in marks.iter_mut().zip(symbols) {
            *mark = Mark::try_from(symbol)?;
        }
        Ok(Self(marks))
    }

    pub fn marks(&self) -> &[Mark; WORD_LEN] {
        &self.0
    }

    pub fn symbols(&self) -> [i8; WORD_LEN] {
        self.0.map(i8::from)
    }

    pub fn is_solved(&self) -> bool {
        self.0.iter().all(|&m| m == Mark::Correct)
    }
}

impl Index<usize> for Feedback {
    type Output = Mark;
    fn index(&self, i: usize) -> &Mark {
        &self.0[i]
    }
}

/// Model output: one score per letter for each of the five positions.
#[derive(Debug, Clone, PartialEq)]
pub struct Logits([[f32; ALPHABET]; WORD_LEN]);

impl Logits {
    pub fn zeros() -> Self {
        Self([[0.0; ALPHABET]; WORD_LEN])
    }

    /// Reads a row-major `5 * 26` slice.
    pub fn from_flat(flat: &[f32]) -> Result<Self> {
        if flat.len() != WORD_LEN * ALPHABET {
            return Err(WordleError::InvalidInput {
                input: format!("{} scores", flat.len()),
                reason: "logits must hold 5 x 26 scores",
            });
        }
        let mut rows = [[0.0; ALPHABET]; WORD_LEN];
        for (row, chunk) in rows.iter_mut().zip(flat.chunks_exact(ALPHABET)) {
            row.copy_from_slice(chunk);
        }
        Ok(Self(rows))
    }

    /// `hit` for the letter of `word` at each position, `miss` elsewhere.
    pub fn one_hot(word: &Word, hit: f32, miss: f32) -> Self {
        let mut rows = [[miss; ALPHABET]; WORD_LEN];
        for (row, label) in rows.iter_mut().zip(word.labels()) {
            row[label] = hit;
        }
        Self(rows)
    }

    pub fn rows(&self) -> &[[f32; ALPHABET]; WORD_LEN] {
        &self.0
    }

    /// Row-wise log-softmax, turning raw scores into log-probabilities.
    pub fn log_softmax(&self) -> Self {
        let mut rows = self.0;
        for row in rows.iter_mut() {
            let max = row.iter().copied().fold(f32::NEG_INFINITY, f32::max);
            let lse = max + row.iter().map(|&x| (x - max).exp()).sum::<f32>().ln();
            row.iter_mut().for_each(|x| *x -= lse);
        }
        Self(rows)
    }
}

impl Index<usize> for Logits {
    type Output = [f32; ALPHABET];
    fn index(&self, position: usize) -> &Self::Output {
        &self.0[position]
    }
}

impl IndexMut<usize> for Logits {
    fn index_mut(&mut self, position: usize) -> &mut Self::Output {
        &mut self.0[position]
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn word_rejects_wrong_length_and_letters() {
        assert!(Word::new("hello").is_ok());
        assert!(matches!(Word::new("hell"), Err(WordleError::InvalidInput { .. })));
        assert!(matches!(Word::new("hello!"), Err(WordleError::InvalidInput { .. })));
        assert!(matches!(Word::new("Hello"), Err(WordleError::InvalidInput { .. })));
        assert!(matches!(Word::new("he1lo"), Err(WordleError::InvalidInput { .. })));
    }

    #[test]
    fn folded_parse_trims_and_lowercases() {
        let word = Word::parse_folded("  CrAnE \n").unwrap();
        assert_eq!(word.as_str(), "crane");
    }

    #[test]
    fn labels_are_letter_indices() {
        let word = Word::new("azbyc").unwrap();
        assert_eq!(word.labels(), [0, 25, 1, 24, 2]);
        assert_eq!(Word::from_indices(word.labels()).unwrap(), word);
        assert!(Word::from_indices([0, 1, 2, 3, 26]).is_err());
    }

    #[test]
    fn marks_serialize_as_symbols() {
        let fb = Feedback::new([Mark::Correct, Mark::Present, Mark::Absent, Mark::Absent, Mark::Correct]);
        let json = serde_json::to_string(&fb).unwrap();
        assert_eq!(json, "[1,0,-1,-1,1]");
        let back: Feedback = serde_json::from_str(&json).unwrap();
        assert_eq!(back, fb);
        assert!(serde_json::from_str::<Feedback>("[1,0,2,-1,1]").is_err());
    }

    #[test]
    fn out_of_range_symbol_is_invalid_feedback() {
        let err = Feedback::from_symbols(&[1, 1, 3, 1, 1]).unwrap_err();
        assert!(matches!(err, WordleError::InvalidFeedback { symbol: 3 }));
    }

    #[test]
    fn log_softmax_rows_sum_to_one() {
        let mut logits = Logits::zeros();
        logits[2][7] = 3.0;
        let lp = logits.log_softmax();
        for row in lp.rows() {
            let total: f32 = row.iter().map(|x| x.exp()).sum();
            assert!((total - 1.0).abs() < 1e-5);
        }
        assert!(lp[2][7] > lp[2][0]);
    }
}
