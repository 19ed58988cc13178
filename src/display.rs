// File: src/display.rs
use crate::core::engine::{Attempt, Interactions};
use crate::core::types::{Feedback, Mark, Word};
use crossterm::style::Stylize;
use std::collections::BTreeMap;

/// Green for correct, yellow for present, red for absent, letter by letter.
pub fn colored_word(word: &Word, feedback: &Feedback) -> String {
    word.as_str()
        .chars()
        .zip(feedback.marks())
        .map(|(ch, mark)| {
            let ch = ch.to_string();
            match mark {
                Mark::Correct => ch.green().to_string(),
                Mark::Present => ch.yellow().to_string(),
                Mark::Absent => ch.red().to_string(),
            }
        })
        .collect()
}

/// Every attempt of one secret, joined with ` => `.
pub fn colored_trace(record: &BTreeMap<usize, Attempt>) -> String {
    record
        .values()
        .map(|a| colored_word(&a.guessed_word, &a.feedback))
        .collect::<Vec<_>>()
        .join(" => ")
}

/// Fraction of secrets whose recorded guesses include the secret.
pub fn history_accuracy(epoch: &Interactions) -> f64 {
    if epoch.is_empty() {
        return 0.0;
    }
    let solved = epoch
        .iter()
        .filter(|(secret, record)| record.values().any(|a| a.guessed_word == **secret))
        .count();
    solved as f64 / epoch.len() as f64
}
