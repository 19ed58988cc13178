// File: src/dataset.rs
use crate::core::types::{Word, WORD_LEN};
use crate::error::{Result, WordleError};
use crate::persistence::load_vocabulary;
use rand::rngs::SmallRng;
use rand::seq::SliceRandom;
use rand::SeedableRng;
use std::path::Path;

/// Secret words for training or evaluation, each paired with its letter labels.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Dataset {
    words: Vec<Word>,
}

impl Dataset {
    pub fn new(words: Vec<Word>) -> Self {
        Self { words }
    }

    pub fn from_file(path: &Path) -> Result<Self> {
        Ok(Self::new(load_vocabulary(path)?))
    }

    pub fn len(&self) -> usize {
        self.words.len()
    }

    pub fn is_empty(&self) -> bool {
        self.words.is_empty()
    }

    pub fn words(&self) -> &[Word] {
        &self.words
    }

    pub fn iter(&self) -> impl Iterator<Item = (Word, [usize; WORD_LEN])> + '_ {
        self.words.iter().map(|w| (*w, w.labels()))
    }

    /// Seeded shuffle, then `floor(len * ratio)` words per ratio except the last,
    /// which takes whatever remains.
    pub fn split(&self, ratios: &[f64], seed: u64) -> Result<Vec<Dataset>> {
        if ratios.is_empty() {
            return Err(WordleError::Config("at least one split ratio is required".into()));
        }
        if ratios.iter().any(|r| !r.is_finite() || *r < 0.0) {
            return Err(WordleError::Config(format!("split ratios must be non-negative, got {ratios:?}")));
        }
        if ratios.iter().sum::<f64>() > 1.0 + 1e-9 {
            return Err(WordleError::Config(format!("split ratios sum above 1: {ratios:?}")));
        }

        let mut shuffled = self.words.clone();
        shuffled.shuffle(&mut SmallRng::seed_from_u64(seed));

        let total = shuffled.len();
        let mut sizes: Vec<usize> = ratios.iter().map(|r| (total as f64 * r).floor() as usize).collect();
        let head: usize = sizes[..sizes.len() - 1].iter().sum();
        if let Some(last) = sizes.last_mut() {
            *last = total - head;
        }

        let mut rest = shuffled.as_slice();
        let mut parts = Vec::with_capacity(sizes.len());
        for size in sizes {
            let (part, tail) = rest.split_at(size);
            parts.push(Dataset::new(part.to_vec()));
            rest = tail;
        }
        Ok(parts)
    }
}

/// The three named partitions a training run works with.
#[derive(Debug, Clone, Default)]
pub struct Splits {
    pub train: Dataset,
    pub val: Dataset,
    pub test: Dataset,
}

impl Splits {
    pub fn new(dataset: &Dataset, ratios: [f64; 3], seed: u64) -> Result<Self> {
        let mut parts = dataset.split(&ratios, seed)?.into_iter();
        Ok(Self {
            train: parts.next().unwrap_or_default(),
            val: parts.next().unwrap_or_default(),
            test: parts.next().unwrap_or_default(),
        })
    }
}
