//! Error types for the simulation.

use thiserror::Error;

pub type Result<T> = std::result::Result<T, Error>;

#[derive(Error, Debug)]
pub enum Error {
    #[error("Coordinates ({x}, {y}) are out of bounds")]
    OutOfBounds { x: i32, y: i32 },

    #[error("Tile ({x}, {y}) is already occupied")]
    TileOccupied { x: i32, y: i32 },

    #[error("No empty tiles found in the grid")]
    NoEmptyTile,

    #[error("Not found: {0}")]
    NotFound(String),

    #[error("Population is at its cap of {max}")]
    PopulationFull { max: usize },

    #[error("Grid dimensions must be positive, got {width}x{height}")]
    InvalidDimensions { width: i32, height: i32 },

    #[error("Invalid configuration: {0}")]
    InvalidConfig(String),

    #[error("Invalid state: {0}")]
    InvalidState(String),

    #[error("Serialization error: {0}")]
    Serialization(String),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

impl From<serde_json::Error> for Error {
    fn from(err: serde_json::Error) -> Self {
        Error::Serialization(err.to_string())
    }
}

impl Error {
    /// Spatial misses and placement collisions are steady-state outcomes the
    /// engine absorbs; everything else is a hard failure.
    pub fn is_recoverable(&self) -> bool {
        matches!(
            self,
            Error::TileOccupied { .. }
                | Error::NoEmptyTile
                | Error::NotFound(_)
                | Error::PopulationFull { .. }
        )
    }
}
