//! World simulation engine.
//!
//! This module implements the bounded 2D grid where plants grow and spread,
//! and animals move, hunt, breed and die.

pub mod animal;
pub mod grid;
pub mod organism;
pub mod plant;
pub mod population;
pub mod seeding;
pub mod tile;
pub mod world;

pub use animal::Animal;
pub use grid::Grid;
pub use organism::{Body, DeathCause, Organism};
pub use plant::Plant;
pub use population::Population;
pub use seeding::animal_from_archetype;
pub use tile::{Occupant, Tile};
pub use world::WorldManager;
