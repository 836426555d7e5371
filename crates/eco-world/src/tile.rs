//! A single grid cell.

use eco_core::{Error, OrganismId, OrganismKind, Position, Result};
use serde::{Deserialize, Serialize};

/// Handle to the organism standing on a tile.
///
/// The kind is cached alongside the id so spatial queries can filter by
/// kind without touching the population.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Occupant {
    pub id: OrganismId,
    pub kind: OrganismKind,
}

/// Tile state
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Tile {
    position: Position,
    occupant: Option<Occupant>,
}

impl Tile {
    pub fn new(position: Position) -> Self {
        Self {
            position,
            occupant: None,
        }
    }

    pub fn position(&self) -> Position {
        self.position
    }

    pub fn is_empty(&self) -> bool {
        self.occupant.is_none()
    }

    pub fn occupant(&self) -> Option<Occupant> {
        self.occupant
    }

    /// Only the world manager changes occupancy.
    pub(crate) fn set_occupant(&mut self, occupant: Occupant) -> Result<()> {
        if self.occupant.is_some() {
            return Err(Error::TileOccupied {
                x: self.position.x,
                y: self.position.y,
            });
        }
        self.occupant = Some(occupant);
        Ok(())
    }

    pub(crate) fn clear_occupant(&mut self) -> Option<Occupant> {
        self.occupant.take()
    }
}
