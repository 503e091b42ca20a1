use thiserror::Error;

/// Enum for the error taxonomy of the engine (collection, storage, query, ingestion).
#[derive(Clone, Debug, Error, PartialEq)]
pub enum Error {
    #[error("config error: {0}")]
    Config(String),

    #[error("could not parse line: {0}")]
    Parse(String),

    #[error("descriptor {0} already registered")]
    DuplicateRegistration(String),

    #[error("invalid collect interval, must be > 0")]
    InvalidCollectInterval,

    #[error("tailer error: {0}")]
    Tailer(String),

    #[error("{0}")]
    General(String),
}

pub type Result<T> = std::result::Result<T, Error>;

impl From<&str> for Error {
    fn from(s: &str) -> Self {
        Error::General(s.to_string())
    }
}

impl From<String> for Error {
    fn from(s: String) -> Self {
        Error::General(s)
    }
}

impl From<std::io::Error> for Error {
    fn from(e: std::io::Error) -> Self {
        Error::Tailer(e.to_string())
    }
}
