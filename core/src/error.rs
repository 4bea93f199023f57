use thiserror::Error;

#[derive(Error, Debug, Copy, Clone, PartialEq, Eq)]
pub enum GameError {
    #[error("Board width and height must be positive")]
    InvalidDimensions,
    #[error("Mine density must be within [0, 1]")]
    InvalidDensity,
    #[error("Invalid coordinates")]
    InvalidCoords,
    #[error("No sampled layout matched the revealed clues")]
    NoAcceptedSamples,
    #[error(transparent)]
    Parse(#[from] ParseError),
}

/// Rejected textual grid. Rows and columns are 0-indexed.
#[derive(Error, Debug, Copy, Clone, PartialEq, Eq)]
pub enum ParseError {
    #[error("Grid has no rows")]
    Empty,
    #[error("Unexpected character {found:?} at row {row}, column {col}")]
    UnexpectedChar { found: char, row: usize, col: usize },
    #[error("Row {row} has {found} cells, expected {expected}")]
    RaggedRow {
        row: usize,
        expected: usize,
        found: usize,
    },
    #[error("Grid of {width}x{height} cells exceeds the supported board size")]
    TooLarge { width: usize, height: usize },
}

pub type Result<T> = core::result::Result<T, GameError>;
