use core::fmt;

use serde::{Deserialize, Serialize};
use sweephint_core::{GameStatus, VisibleGrid};

use crate::*;

const OK_MESSAGE: &str = "OK";
const LOSE_MESSAGE: &str = "You lose";
const WIN_MESSAGE: &str = "You win";

/// Message part of a status line.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub enum ResponseStatus {
    Ok,
    Lose,
    Win,
    /// Bare `map:` header.
    Empty,
    Error(String),
}

impl ResponseStatus {
    pub fn from_message(message: &str) -> Self {
        match message {
            OK_MESSAGE => Self::Ok,
            LOSE_MESSAGE => Self::Lose,
            WIN_MESSAGE => Self::Win,
            "" => Self::Empty,
            other => Self::Error(other.to_owned()),
        }
    }

    pub fn message(&self) -> &str {
        match self {
            Self::Ok => OK_MESSAGE,
            Self::Lose => LOSE_MESSAGE,
            Self::Win => WIN_MESSAGE,
            Self::Empty => "",
            Self::Error(message) => message,
        }
    }

    pub fn game_status(&self) -> GameStatus {
        match self {
            Self::Lose => GameStatus::Lost,
            Self::Win => GameStatus::Won,
            Self::Ok | Self::Empty | Self::Error(_) => GameStatus::Playing,
        }
    }

    pub fn is_error(&self) -> bool {
        matches!(self, Self::Error(_))
    }
}

/// Status line plus an optional board.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Response {
    pub verb: Verb,
    pub status: ResponseStatus,
    pub grid: Option<VisibleGrid>,
}

impl Response {
    pub fn new(verb: Verb, status: ResponseStatus) -> Self {
        Self {
            verb,
            status,
            grid: None,
        }
    }

    pub fn with_grid(mut self, grid: VisibleGrid) -> Self {
        self.grid = Some(grid);
        self
    }

    /// Parses a full response block. Blank lines are ignored, every line after
    /// the status line is a board row.
    pub fn parse(text: &str) -> Result<Self> {
        let mut lines = text.lines().map(str::trim).filter(|line| !line.is_empty());

        let status_line = lines.next().ok_or(ProtocolError::EmptyResponse)?;
        let (verb, message) = status_line
            .split_once(':')
            .ok_or_else(|| ProtocolError::MalformedStatus(status_line.to_owned()))?;
        let verb = verb
            .trim()
            .parse()
            .map_err(|_| ProtocolError::MalformedStatus(status_line.to_owned()))?;
        let status = ResponseStatus::from_message(message.trim());

        let rows: Vec<&str> = lines.collect();
        let grid = if rows.is_empty() {
            None
        } else {
            Some(rows.join("\n").parse::<VisibleGrid>()?)
        };

        Ok(Self { verb, status, grid })
    }
}

impl fmt::Display for Response {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.status.message() {
            "" => writeln!(f, "{}:", self.verb)?,
            message => writeln!(f, "{}: {message}", self.verb)?,
        }
        if let Some(grid) = &self.grid {
            write!(f, "{grid}")?;
        }
        Ok(())
    }
}
