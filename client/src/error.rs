use thiserror::Error;

use crate::session::Phase;

#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum SessionError {
    #[error("Action not allowed in the {actual} phase (expected {expected})")]
    InvalidPhase { expected: Phase, actual: Phase },
    #[error("Questions are still loading")]
    QuestionsNotLoaded,
    #[error("There is no question to answer")]
    NoCurrentQuestion,
    #[error("Answer index {index} is out of range for {len} answers")]
    AnswerOutOfRange { index: usize, len: usize },
}

#[derive(Debug, Error)]
pub enum ClientError {
    #[error("HTTP request failed: {0}")]
    Http(#[from] reqwest::Error),
    #[error("Server responded with {status}: {message}")]
    Api { status: u16, message: String },
    #[error("Session error: {0}")]
    Session(#[from] SessionError),
    #[error("Session controller communication error: {0}")]
    ActorComm(String),
    #[error("Configuration error: {0}")]
    Config(#[from] config::ConfigError),
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

pub type Result<T, E = ClientError> = std::result::Result<T, E>;
