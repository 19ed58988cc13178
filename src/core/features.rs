// src/core/features.rs
use crate::core::types::{letter_index, Feedback, Mark, Word, ALPHABET, WORD_LEN};
use crate::error::Result;

/// Columns per letter row.
pub const FEATURE_COLS: usize = 12;
/// Flattened input width for models.
pub const FEATURE_LEN: usize = ALPHABET * FEATURE_COLS;

pub const COL_NOT_GUESSED: usize = 0;
pub const COL_ABSENT: usize = 1;
/// First of five "correct at position i" columns.
pub const COL_CORRECT_AT: usize = 2;
/// First of five "present, not at position i" columns.
pub const COL_PRESENT_AT: usize = 7;

/// Running knowledge about every letter during one episode.
///
/// Binary 26 x 12 grid. Apart from column 0, which starts at 1 and is cleared the
/// first time a letter is guessed, entries only ever go from 0 to 1.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FeatureMatrix {
    cells: [[u8; FEATURE_COLS]; ALPHABET],
}

impl Default for FeatureMatrix {
    fn default() -> Self {
        let mut cells = [[0u8; FEATURE_COLS]; ALPHABET];
        for row in cells.iter_mut() {
            row[COL_NOT_GUESSED] = 1;
        }
        Self { cells }
    }
}

/// The state every episode starts from.
pub fn default_features() -> FeatureMatrix {
    FeatureMatrix::default()
}

impl FeatureMatrix {
    pub fn new() -> Self {
        Self::default()
    }

    /// Folds one scored guess into the matrix.
    pub fn apply_feedback(&mut self, feedback: &Feedback, guess: &Word) -> &mut Self {
        for (i, (&byte, &mark)) in guess.bytes().iter().zip(feedback.marks()).enumerate() {
            let row = &mut self.cells[letter_index(byte)];
            let col = match mark {
                Mark::Absent => COL_ABSENT,
                Mark::Correct => COL_CORRECT_AT + i,
                Mark::Present => COL_PRESENT_AT + i,
            };
            row[col] = 1;
            row[COL_NOT_GUESSED] = 0;
        }
        self
    }

    /// Same as [`apply_feedback`](Self::apply_feedback) for raw `{-1, 0, 1}` symbols.
    /// Nothing is written unless every symbol is valid.
    pub fn apply_symbols(&mut self, symbols: &[i8], guess: &Word) -> Result<&mut Self> {
        let feedback = Feedback::from_symbols(symbols)?;
        Ok(self.apply_feedback(&feedback, guess))
    }

    pub fn get(&self, letter: usize, col: usize) -> u8 {
        self.cells[letter][col]
    }

    pub fn row(&self, letter: usize) -> &[u8; FEATURE_COLS] {
        &self.cells[letter]
    }

    pub fn is_guessed(&self, letter: usize) -> bool {
        self.cells[letter][COL_NOT_GUESSED] == 0
    }

    /// Letter confirmed at `position`, if any.
    pub fn correct_at(&self, position: usize) -> Option<usize> {
        debug_assert!(position < WORD_LEN);
        (0..ALPHABET).find(|&k| self.cells[k][COL_CORRECT_AT + position] == 1)
    }

    /// Row-major flattening used as model input.
    pub fn to_input(&self) -> Vec<f32> {
        self.cells
            .iter()
            .flat_map(|row| row.iter().map(|&v| f32::from(v)))
            .collect()
    }
}
