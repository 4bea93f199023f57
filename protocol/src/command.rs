use core::fmt;
use core::str::FromStr;

use serde::{Deserialize, Serialize};
use sweephint_core::{Coord, GameConfig};

use crate::*;

/// Preset board sizes offered by `new <level>`.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub enum Level {
    Beginner,
    Intermediate,
    Expert,
}

impl Level {
    pub const fn number(self) -> u8 {
        match self {
            Self::Beginner => 1,
            Self::Intermediate => 2,
            Self::Expert => 3,
        }
    }

    pub const fn from_number(number: u8) -> Option<Self> {
        match number {
            1 => Some(Self::Beginner),
            2 => Some(Self::Intermediate),
            3 => Some(Self::Expert),
            _ => None,
        }
    }

    pub const fn game_config(self) -> GameConfig {
        match self {
            Self::Beginner => GameConfig::new_unchecked((9, 9), 0.12),
            Self::Intermediate => GameConfig::new_unchecked((16, 16), 0.16),
            Self::Expert => GameConfig::new_unchecked((30, 16), 0.21),
        }
    }
}

impl fmt::Display for Level {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.number())
    }
}

impl FromStr for Level {
    type Err = ProtocolError;

    fn from_str(s: &str) -> Result<Self> {
        let level = match s.to_ascii_lowercase().as_str() {
            "beginner" => Some(Self::Beginner),
            "intermediate" => Some(Self::Intermediate),
            "expert" => Some(Self::Expert),
            number => number.parse().ok().and_then(Self::from_number),
        };
        level.ok_or_else(|| ProtocolError::InvalidLevel(s.to_owned()))
    }
}

#[derive(Copy, Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub enum Verb {
    New,
    Open,
    Map,
}

impl Verb {
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::New => "new",
            Self::Open => "open",
            Self::Map => "map",
        }
    }
}

impl fmt::Display for Verb {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Verb {
    type Err = ProtocolError;

    fn from_str(s: &str) -> Result<Self> {
        match s {
            "new" => Ok(Self::New),
            "open" => Ok(Self::Open),
            "map" => Ok(Self::Map),
            other => Err(ProtocolError::UnknownCommand(other.to_owned())),
        }
    }
}

/// Outbound request, serialized as a single line without terminator.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub enum Command {
    New { level: Level },
    Open { col: Coord, row: Coord },
    Map,
}

impl Command {
    pub const fn verb(&self) -> Verb {
        match self {
            Self::New { .. } => Verb::New,
            Self::Open { .. } => Verb::Open,
            Self::Map => Verb::Map,
        }
    }
}

impl fmt::Display for Command {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::New { level } => write!(f, "new {level}"),
            Self::Open { col, row } => write!(f, "open {col} {row}"),
            Self::Map => write!(f, "map"),
        }
    }
}

impl FromStr for Command {
    type Err = ProtocolError;

    fn from_str(s: &str) -> Result<Self> {
        let mut words = s.split_whitespace();
        let verb: Verb = words.next().unwrap_or_default().parse()?;

        let command = match verb {
            Verb::New => Self::New {
                level: next_arg(&mut words, "new")?.parse()?,
            },
            Verb::Open => Self::Open {
                col: parse_coord(next_arg(&mut words, "open")?)?,
                row: parse_coord(next_arg(&mut words, "open")?)?,
            },
            Verb::Map => Self::Map,
        };

        if let Some(extra) = words.next() {
            return Err(ProtocolError::InvalidArgument(extra.to_owned()));
        }
        Ok(command)
    }
}

fn next_arg<'a>(
    words: &mut impl Iterator<Item = &'a str>,
    command: &'static str,
) -> Result<&'a str> {
    words.next().ok_or(ProtocolError::MissingArgument(command))
}

fn parse_coord(arg: &str) -> Result<Coord> {
    arg.parse()
        .map_err(|_| ProtocolError::InvalidArgument(arg.to_owned()))
}
