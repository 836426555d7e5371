//! Population statistics and per-tick accounting.

use crate::AnimalType;
use serde::{Deserialize, Serialize};

/// What happened during a single tick
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct TickReport {
    /// Tick number this report belongs to (1-based)
    pub tick: u64,
    /// Animal offspring placed on the grid
    pub births: u32,
    /// Plant offspring placed on the grid
    pub spreads: u32,
    /// Organisms eaten by animals
    pub meals: u32,
    pub deaths_by_age: u32,
    pub deaths_by_starvation: u32,
    /// Decomposition plants spawned at death sites
    pub decomposition_spawns: u32,
    /// Reproduction attempts that found no free tile
    pub failed_placements: u32,
    /// Births refused because the population cap was reached
    pub capped_births: u32,
}

impl TickReport {
    pub fn new(tick: u64) -> Self {
        Self {
            tick,
            ..Self::default()
        }
    }

    pub fn deaths(&self) -> u32 {
        self.deaths_by_age + self.deaths_by_starvation
    }

    /// Fold another report into this one, keeping the later tick number
    pub fn accumulate(&mut self, other: &TickReport) {
        self.tick = self.tick.max(other.tick);
        self.births += other.births;
        self.spreads += other.spreads;
        self.meals += other.meals;
        self.deaths_by_age += other.deaths_by_age;
        self.deaths_by_starvation += other.deaths_by_starvation;
        self.decomposition_spawns += other.decomposition_spawns;
        self.failed_placements += other.failed_placements;
        self.capped_births += other.capped_births;
    }
}

/// Snapshot of the live population
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct PopulationStats {
    pub plants: usize,
    pub herbivores: usize,
    pub carnivores: usize,
    pub omnivores: usize,
    pub total_nutrients: f64,
    pub mean_nutrients: f64,
    pub mean_age: f64,
    pub oldest_age: u32,
}

impl PopulationStats {
    pub fn total(&self) -> usize {
        self.plants + self.animals()
    }

    pub fn animals(&self) -> usize {
        self.herbivores + self.carnivores + self.omnivores
    }

    pub fn animals_of(&self, animal_type: AnimalType) -> usize {
        match animal_type {
            AnimalType::Herbivore => self.herbivores,
            AnimalType::Carnivore => self.carnivores,
            AnimalType::Omnivore => self.omnivores,
        }
    }

    /// Build a snapshot from `(animal_type, nutrients, age)` samples; plants carry `None`.
    pub fn from_samples<I>(samples: I) -> Self
    where
        I: IntoIterator<Item = (Option<AnimalType>, f32, u32)>,
    {
        let mut stats = Self::default();
        let mut total_age = 0u64;

        for (animal_type, nutrients, age) in samples {
            match animal_type {
                None => stats.plants += 1,
                Some(AnimalType::Herbivore) => stats.herbivores += 1,
                Some(AnimalType::Carnivore) => stats.carnivores += 1,
                Some(AnimalType::Omnivore) => stats.omnivores += 1,
            }
            stats.total_nutrients += f64::from(nutrients);
            total_age += u64::from(age);
            stats.oldest_age = stats.oldest_age.max(age);
        }

        let n = stats.total();
        if n > 0 {
            stats.mean_nutrients = stats.total_nutrients / n as f64;
            stats.mean_age = total_age as f64 / n as f64;
        }

        stats
    }
}
