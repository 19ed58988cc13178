// src/lib.rs

pub mod config;
pub mod core;
pub mod dataset;
pub mod display;
pub mod error;
pub mod learning;
pub mod logging;
pub mod model;
pub mod persistence;

pub use crate::config::TrainingConfig;
pub use crate::core::decoder::{BeamSearch, Decoder, Greedy, Strategy};
pub use crate::core::engine::{play, Attempt, Episode, Interactions, Policy, Trace};
pub use crate::core::features::FeatureMatrix;
pub use crate::core::feedback::{feedback, score};
pub use crate::core::trie::PrefixTree;
pub use crate::core::types::{Feedback, Logits, Mark, Word};
pub use crate::error::{Result, WordleError};
pub use crate::learning::Trainer;
pub use crate::model::{Mlp, Model};
