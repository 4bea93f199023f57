use sweephint_core::{GameError, ParseError};
use thiserror::Error;

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ProtocolError {
    #[error("Empty response")]
    EmptyResponse,
    #[error("Malformed status line {0:?}")]
    MalformedStatus(String),
    #[error("Unknown command {0:?}")]
    UnknownCommand(String),
    #[error("Missing argument for {0}")]
    MissingArgument(&'static str),
    #[error("Invalid argument {0:?}")]
    InvalidArgument(String),
    #[error("Unknown level {0:?}")]
    InvalidLevel(String),
    #[error("Invalid board: {0}")]
    Grid(#[from] ParseError),
    #[error(transparent)]
    Game(#[from] GameError),
}

pub type Result<T> = core::result::Result<T, ProtocolError>;
