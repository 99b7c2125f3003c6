use thiserror::Error;

/// A scenario field rejected at construction time.
#[derive(Error, Debug, Copy, Clone, PartialEq, Eq)]
pub enum InvalidValue {
    #[error("unknown difficulty")]
    Difficulty,
    #[error("mine count out of range for the difficulty")]
    MineCount,
    #[error("time limit out of range for the difficulty")]
    TimeLimit,
    #[error("a special mine is not allowed at this difficulty")]
    SpecialMine,
}

/// A textual scenario description that does not parse into a valid scenario.
#[derive(Error, Debug, Copy, Clone, PartialEq, Eq)]
pub enum InvalidDescription {
    #[error("expected exactly {expected} lines, found {found}")]
    LineCount { expected: usize, found: usize },
    #[error("line {0} is not an integer")]
    Integer(usize),
    #[error(transparent)]
    Value(#[from] InvalidValue),
}

/// Failure while persisting or loading engine data on disk.
#[derive(Error, Debug)]
pub enum StoreError {
    #[error("the file already exists")]
    AlreadyExists,
    #[error(transparent)]
    Io(#[from] std::io::Error),
    #[error(transparent)]
    Description(#[from] InvalidDescription),
    #[error(transparent)]
    Json(#[from] serde_json::Error),
}
