// File: src/error.rs
use thiserror::Error;

/// Everything that can go wrong inside the game core and its surrounding I/O.
#[derive(Debug, Error)]
pub enum WordleError {
    /// A word or guess that is not five lowercase ASCII letters.
    #[error("invalid word {input:?}: {reason}")]
    InvalidInput { input: String, reason: &'static str },

    /// A feedback symbol outside {-1, 0, 1}.
    #[error("invalid feedback symbol {symbol}, expected -1, 0 or 1")]
    InvalidFeedback { symbol: i64 },

    /// Beam search finished without a single complete vocabulary word.
    #[error("beam search (width {width}) found no terminal vocabulary word")]
    DecodingExhausted { width: usize },

    /// A turn was requested after the episode ended.
    #[error("episode for {secret} is already over")]
    EpisodeOver { secret: String },

    #[error("vocabulary line {line}: {source}")]
    Vocabulary {
        line: usize,
        #[source]
        source: Box<WordleError>,
    },

    #[error("vocabulary is empty")]
    EmptyVocabulary,

    #[error("configuration: {0}")]
    Config(String),

    #[error(transparent)]
    Io(#[from] std::io::Error),

    #[error(transparent)]
    Json(#[from] serde_json::Error),

    #[error(transparent)]
    Codec(#[from] bincode::Error),

    #[error(transparent)]
    Persist(#[from] tempfile::PersistError),
}

pub type Result<T> = std::result::Result<T, WordleError>;
