// src/core/mod.rs
pub mod decoder;
pub mod engine;
pub mod features;
pub mod feedback;
pub mod trie;
pub mod types;
