// File: src/config.rs
use crate::core::decoder::Strategy;
use crate::core::types::DEFAULT_ATTEMPT_CAP;
use crate::error::{Result, WordleError};
use crate::persistence::load_json;
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

/// Everything a training run depends on. Passed explicitly; nothing lives in globals.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct TrainingConfig {
    pub epochs: usize,
    pub learning_rate: f32,
    /// Weight initialization seed.
    pub seed: u64,
    /// Shuffle seed for the train/val/test split.
    pub split_seed: u64,
    pub splits: [f64; 3],
    pub hidden: usize,
    pub decoder: Strategy,
    pub beam_width: usize,
    pub attempt_cap: usize,
    /// Worker threads for evaluation; 0 lets rayon decide.
    pub threads: usize,
    /// Best-validation checkpoint destination; none disables checkpointing.
    pub checkpoint: Option<PathBuf>,
}

impl Default for TrainingConfig {
    fn default() -> Self {
        Self {
            epochs: 1,
            learning_rate: 1e-4,
            seed: 2002,
            split_seed: 42,
            splits: [0.8, 0.05, 0.0],
            hidden: 512,
            decoder: Strategy::Beam,
            beam_width: 3,
            attempt_cap: DEFAULT_ATTEMPT_CAP,
            threads: 0,
            checkpoint: None,
        }
    }
}

impl TrainingConfig {
    /// Reads a JSON config; missing fields take their defaults.
    pub fn from_file(path: &Path) -> Result<Self> {
        let config: Self = load_json(path)?;
        config.validate()?;
        Ok(config)
    }

    pub fn validate(&self) -> Result<()> {
        let fail = |msg: String| Err(WordleError::Config(msg));
        if self.epochs == 0 {
            return fail("epochs must be at least 1".into());
        }
        if !self.learning_rate.is_finite() || self.learning_rate <= 0.0 {
            return fail(format!("learning rate must be positive, got {}", self.learning_rate));
        }
        if self.hidden == 0 {
            return fail("hidden layer must have at least one unit".into());
        }
        if self.beam_width == 0 {
            return fail("beam width must be at least 1".into());
        }
        if self.attempt_cap == 0 {
            return fail("attempt cap must be at least 1".into());
        }
        if self.splits.iter().any(|r| !r.is_finite() || *r < 0.0) {
            return fail(format!("split ratios must be non-negative, got {:?}", self.splits));
        }
        if self.splits.iter().sum::<f64>() > 1.0 + 1e-9 {
            return fail(format!("split ratios sum above 1: {:?}", self.splits));
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_are_valid() {
        let config = TrainingConfig::default();
        config.validate().unwrap();
        assert_eq!(config.attempt_cap, 6);
        assert_eq!(config.decoder, Strategy::Beam);
    }

    #[test]
    fn partial_json_fills_defaults() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("config.json");
        std::fs::write(&path, r#"{ "epochs": 3, "decoder": "greedy" }"#).unwrap();
        let config = TrainingConfig::from_file(&path).unwrap();
        assert_eq!(config.epochs, 3);
        assert_eq!(config.decoder, Strategy::Greedy);
        assert_eq!(config.beam_width, 3);
    }

    #[test]
    fn invalid_values_are_rejected() {
        let bad = [
            TrainingConfig { epochs: 0, ..Default::default() },
            TrainingConfig { learning_rate: f32::NAN, ..Default::default() },
            TrainingConfig { beam_width: 0, ..Default::default() },
            TrainingConfig { attempt_cap: 0, ..Default::default() },
            TrainingConfig { splits: [0.7, 0.4, 0.0], ..Default::default() },
        ];
        for config in bad {
            assert!(matches!(config.validate(), Err(WordleError::Config(_))), "{config:?}");
        }
    }
}
