//! Core type definitions for the simulation.

use serde::{Deserialize, Serialize};
use slotmap::new_key_type;
use std::fmt;

new_key_type! {
    /// Stable handle for an organism stored in the world's arena.
    pub struct OrganismId;
}

/// 2D position in the world
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub struct Position {
    pub x: i32,
    pub y: i32,
}

impl Position {
    pub fn new(x: i32, y: i32) -> Self {
        Self { x, y }
    }

    pub fn add(&self, dx: i32, dy: i32) -> Self {
        Self {
            x: self.x + dx,
            y: self.y + dy,
        }
    }

    /// Euclidean distance truncated to an integer
    pub fn distance(&self, other: &Position) -> i32 {
        let dx = f64::from(other.x - self.x);
        let dy = f64::from(other.y - self.y);
        (dx * dx + dy * dy).sqrt() as i32
    }

    /// Exact squared Euclidean distance, for comparisons that must not truncate
    pub fn distance_squared(&self, other: &Position) -> i64 {
        let dx = i64::from(other.x - self.x);
        let dy = i64::from(other.y - self.y);
        dx * dx + dy * dy
    }

    /// Chebyshev (king-move) distance
    pub fn chebyshev_distance(&self, other: &Position) -> i32 {
        (self.x - other.x).abs().max((self.y - other.y).abs())
    }

    /// The up-to-8 surrounding positions, skipping any with a negative coordinate.
    ///
    /// Positions past the far edge of a grid are not filtered here; the grid
    /// owns that bound.
    pub fn neighbors(&self) -> Vec<Position> {
        Direction::all()
            .iter()
            .map(|dir| {
                let (dx, dy) = dir.to_delta();
                self.add(dx, dy)
            })
            .filter(|p| p.x >= 0 && p.y >= 0)
            .collect()
    }
}

impl fmt::Display for Position {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "({}, {})", self.x, self.y)
    }
}

/// Direction for movement
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Direction {
    North,
    South,
    East,
    West,
    NorthEast,
    NorthWest,
    SouthEast,
    SouthWest,
}

impl Direction {
    pub fn to_delta(&self) -> (i32, i32) {
        match self {
            Direction::North => (0, -1),
            Direction::South => (0, 1),
            Direction::East => (1, 0),
            Direction::West => (-1, 0),
            Direction::NorthEast => (1, -1),
            Direction::NorthWest => (-1, -1),
            Direction::SouthEast => (1, 1),
            Direction::SouthWest => (-1, 1),
        }
    }

    pub fn all() -> [Direction; 8] {
        [
            Direction::North,
            Direction::South,
            Direction::East,
            Direction::West,
            Direction::NorthEast,
            Direction::NorthWest,
            Direction::SouthEast,
            Direction::SouthWest,
        ]
    }
}

/// Top-level organism variant
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum OrganismKind {
    Plant,
    Animal,
}

impl fmt::Display for OrganismKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            OrganismKind::Plant => write!(f, "plant"),
            OrganismKind::Animal => write!(f, "animal"),
        }
    }
}

/// Diet class of an animal
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum AnimalType {
    Herbivore,
    Carnivore,
    Omnivore,
}

impl AnimalType {
    pub fn all() -> [AnimalType; 3] {
        [AnimalType::Herbivore, AnimalType::Carnivore, AnimalType::Omnivore]
    }
}

impl fmt::Display for AnimalType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            AnimalType::Herbivore => write!(f, "herbivore"),
            AnimalType::Carnivore => write!(f, "carnivore"),
            AnimalType::Omnivore => write!(f, "omnivore"),
        }
    }
}
