//! Initial population placement.

use crate::animal::Animal;
use crate::organism::Organism;
use crate::plant::Plant;
use crate::world::WorldManager;
use eco_core::{
    AnimalArchetype, AnimalType, Archetypes, Error, PlantArchetype, Position, SeedingConfig,
};
use rand::Rng;
use tracing::{info, warn};

impl From<&PlantArchetype> for Organism {
    fn from(archetype: &PlantArchetype) -> Self {
        Organism::plant(
            archetype.nutrients,
            archetype.max_lifespan,
            Plant::new(archetype.growth_rate, archetype.nutrient_absorption_rate)
                .with_spreading_threshold(archetype.spreading_threshold),
        )
    }
}

/// Build an animal of `animal_type` from its template
pub fn animal_from_archetype(archetype: &AnimalArchetype, animal_type: AnimalType) -> Organism {
    Organism::animal(
        archetype.nutrients,
        archetype.max_lifespan,
        Animal::new(
            archetype.movement_speed,
            archetype.vision_distance,
            animal_type,
            archetype.nutrient_requirement,
            archetype.reproduction_nutrient_threshold,
            archetype.mass,
        ),
    )
}

impl WorldManager {
    /// Scatter the configured initial population using the world's own config.
    pub fn populate_from_config(&mut self) -> usize {
        let seeding = self.config().seeding.clone();
        let archetypes = self.config().archetypes.clone();
        self.populate(&seeding, &archetypes)
    }

    /// Scatter plants, then herbivores, carnivores and omnivores over random
    /// empty tiles. Returns how many organisms were placed; stops early once
    /// the grid is full or the population cap is reached.
    pub fn populate(&mut self, seeding: &SeedingConfig, archetypes: &Archetypes) -> usize {
        let mut batch: Vec<Organism> = Vec::new();
        batch.extend((0..seeding.plants).map(|_| Organism::from(&archetypes.plant)));
        for animal_type in AnimalType::all() {
            let archetype = archetypes.animal(animal_type);
            batch.extend(
                (0..seeding.animals(animal_type))
                    .map(|_| animal_from_archetype(archetype, animal_type)),
            );
        }

        let requested = batch.len();
        let max_population = self.config().reproduction.max_population;
        let mut placed = 0;
        for organism in batch {
            if self.organism_count() >= max_population {
                warn!(
                    placed,
                    requested,
                    max_population,
                    "Population cap reached, stopping initial placement"
                );
                break;
            }
            match self.place_randomly(organism, seeding.placement_attempts) {
                Ok(()) => placed += 1,
                Err(Error::NoEmptyTile) => {
                    warn!(placed, requested, "Grid is full, stopping initial placement");
                    break;
                }
                Err(e) => {
                    warn!(error = %e, "Failed to place seeded organism");
                }
            }
        }

        info!(
            event = "population_seeded",
            placed,
            requested,
            plants = seeding.plants,
            herbivores = seeding.herbivores,
            carnivores = seeding.carnivores,
            omnivores = seeding.omnivores,
            "Initial population placed"
        );
        placed
    }

    fn place_randomly(&mut self, organism: Organism, attempts: usize) -> eco_core::Result<()> {
        let (width, height) = (self.grid().width(), self.grid().height());

        let mut last = Position::new(0, 0);
        for _ in 0..attempts {
            let rng = self.rng_mut();
            let pos = Position::new(rng.gen_range(0..width), rng.gen_range(0..height));
            if self.grid().get(pos)?.is_empty() {
                return self.place(organism, pos).map(|_| ());
            }
            last = pos;
        }

        let fallback = self.grid().find_closest_empty_tile(last)?.position();
        self.place(organism, fallback).map(|_| ())
    }
}
