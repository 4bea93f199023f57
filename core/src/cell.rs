use serde::{Deserialize, Serialize};

pub const UNKNOWN_GLYPH: char = '#';
pub const EXPLODED_GLYPH: char = 'X';
pub const FLAGGED_GLYPH: char = 'F';
pub const KNOWN_SAFE_GLYPH: char = '.';
pub const SUGGESTED_GLYPH: char = '?';

/// Player-visible state of a single cell.
#[derive(Copy, Clone, Debug, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum VisibleCell {
    /// Not opened and nothing deduced.
    #[default]
    Unrevealed,
    /// Opened, no mine, with the number of mined neighbours.
    Revealed(u8),
    /// Opened and was a mine.
    Exploded,
    /// Marked or deduced as certainly a mine.
    Flagged,
    /// Deduced certainly safe, not opened yet.
    KnownSafe,
    /// Recommended as the next click among undetermined cells.
    Suggested,
}

impl VisibleCell {
    /// Cells that were clicked and can never change again.
    pub const fn is_opened(self) -> bool {
        matches!(self, Self::Revealed(_) | Self::Exploded)
    }

    /// Cells without any certainty attached, the ones probabilities are computed for.
    pub const fn is_undetermined(self) -> bool {
        matches!(self, Self::Unrevealed | Self::Suggested)
    }

    /// Cells a zero-count reveal may expand into.
    ///
    /// A [`PlayEngine`](crate::PlayEngine) board only ever holds `Unrevealed`,
    /// `Flagged`, `Revealed` and `Exploded`; planner annotations live on the
    /// copy returned in a [`Plan`](crate::Plan) and never reach the engine.
    pub const fn is_expandable(self) -> bool {
        matches!(self, Self::Unrevealed | Self::Suggested | Self::KnownSafe)
    }

    pub const fn clue(self) -> Option<u8> {
        match self {
            Self::Revealed(count) => Some(count),
            _ => None,
        }
    }

    pub const fn glyph(self) -> char {
        match self {
            Self::Unrevealed => UNKNOWN_GLYPH,
            Self::Revealed(count) => (b'0' + count) as char,
            Self::Exploded => EXPLODED_GLYPH,
            Self::Flagged => FLAGGED_GLYPH,
            Self::KnownSafe => KNOWN_SAFE_GLYPH,
            Self::Suggested => SUGGESTED_GLYPH,
        }
    }

    pub fn from_glyph(glyph: char) -> Option<Self> {
        Some(match glyph {
            UNKNOWN_GLYPH => Self::Unrevealed,
            EXPLODED_GLYPH => Self::Exploded,
            FLAGGED_GLYPH => Self::Flagged,
            KNOWN_SAFE_GLYPH => Self::KnownSafe,
            SUGGESTED_GLYPH => Self::Suggested,
            '0'..='8' => Self::Revealed(glyph as u8 - b'0'),
            _ => return None,
        })
    }
}

/// Cell of a textual clue snapshot, as consumed by the Monte Carlo estimator.
#[derive(Copy, Clone, Debug, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum ClueCell {
    #[default]
    Unknown,
    Clue(u8),
    /// An exploded cell, known to hold a mine.
    Mine,
}

impl ClueCell {
    pub const fn glyph(self) -> char {
        match self {
            Self::Unknown => UNKNOWN_GLYPH,
            Self::Clue(count) => (b'0' + count) as char,
            Self::Mine => EXPLODED_GLYPH,
        }
    }

    pub fn from_glyph(glyph: char) -> Option<Self> {
        Some(match glyph {
            UNKNOWN_GLYPH => Self::Unknown,
            EXPLODED_GLYPH => Self::Mine,
            '0'..='8' => Self::Clue(glyph as u8 - b'0'),
            _ => return None,
        })
    }
}

impl From<VisibleCell> for ClueCell {
    fn from(cell: VisibleCell) -> Self {
        use VisibleCell::*;
        match cell {
            Revealed(count) => Self::Clue(count),
            Exploded => Self::Mine,
            Unrevealed | Flagged | KnownSafe | Suggested => Self::Unknown,
        }
    }
}
