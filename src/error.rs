use thiserror::Error;

/// Errors raised while loading the vocabulary corpus.
#[derive(Error, Debug)]
pub enum CorpusError {
    #[error("I/O error reading corpus file {path}: {source}")]
    Io {
        path: String,
        source: std::io::Error,
    },

    #[error("JSON error in corpus file {path}: {source}")]
    Json {
        path: String,
        source: serde_json::Error,
    },
}

/// Errors raised by a key-value persistence backend.
#[derive(Error, Debug)]
pub enum StoreError {
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}

/// Rejections produced by the battle state machine.
///
/// These never escape the public store API as errors; the store turns them into
/// neutral return values and leaves state untouched.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum BattleError {
    #[error("no battle in progress")]
    NoBattle,

    #[error("action not allowed in phase {0:?}")]
    WrongPhase(crate::battle::types::BattlePhase),

    #[error("card {0} is not in the current hand")]
    CardNotInHand(String),

    #[error("burst needs two different cards")]
    DuplicateBurstCard,

    #[error("term {0} is missing from the corpus")]
    UnknownTerm(String),

    #[error("no quiz is pending")]
    NoQuiz,
}
