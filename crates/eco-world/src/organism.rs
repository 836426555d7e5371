//! Organism state and lifecycle.

use crate::animal::Animal;
use crate::plant::Plant;
use eco_core::{AnimalType, OrganismKind, Position};
use rand::Rng;
use serde::{Deserialize, Serialize};

/// Behavioural payload of an organism
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum Body {
    Plant(Plant),
    Animal(Animal),
}

/// Why an organism died
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum DeathCause {
    OldAge,
    Starvation,
}

/// An organism in the simulation
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Organism {
    nutrients: f32,
    age: u32,
    max_lifespan: u32,
    position: Option<Position>,
    body: Body,
}

impl Organism {
    pub fn new(nutrients: f32, max_lifespan: u32, body: Body) -> Self {
        Self {
            nutrients: nutrients.max(0.0),
            age: 0,
            max_lifespan,
            position: None,
            body,
        }
    }

    pub fn plant(nutrients: f32, max_lifespan: u32, plant: Plant) -> Self {
        Self::new(nutrients, max_lifespan, Body::Plant(plant))
    }

    pub fn animal(nutrients: f32, max_lifespan: u32, animal: Animal) -> Self {
        Self::new(nutrients, max_lifespan, Body::Animal(animal))
    }

    pub fn kind(&self) -> OrganismKind {
        match self.body {
            Body::Plant(_) => OrganismKind::Plant,
            Body::Animal(_) => OrganismKind::Animal,
        }
    }

    pub fn body(&self) -> &Body {
        &self.body
    }

    pub fn as_plant(&self) -> Option<&Plant> {
        match &self.body {
            Body::Plant(plant) => Some(plant),
            Body::Animal(_) => None,
        }
    }

    pub fn as_animal(&self) -> Option<&Animal> {
        match &self.body {
            Body::Animal(animal) => Some(animal),
            Body::Plant(_) => None,
        }
    }

    pub fn animal_type(&self) -> Option<AnimalType> {
        self.as_animal().map(|animal| animal.animal_type)
    }

    pub fn nutrients(&self) -> f32 {
        self.nutrients
    }

    pub fn age(&self) -> u32 {
        self.age
    }

    pub fn max_lifespan(&self) -> u32 {
        self.max_lifespan
    }

    /// Where the organism was last placed, if it is on a grid
    pub fn position(&self) -> Option<Position> {
        self.position
    }

    pub(crate) fn set_position(&mut self, position: Option<Position>) {
        self.position = position;
    }

    pub fn add_nutrients(&mut self, amount: f32) {
        self.nutrients += amount;
    }

    /// Subtract `amount`, clamping at zero
    pub fn consume_nutrients(&mut self, amount: f32) {
        self.nutrients = (self.nutrients - amount).max(0.0);
    }

    pub fn increment_age(&mut self) {
        self.age = self.age.saturating_add(1);
    }

    pub fn is_dead(&self) -> bool {
        self.death_cause().is_some()
    }

    pub fn death_cause(&self) -> Option<DeathCause> {
        if self.age >= self.max_lifespan {
            Some(DeathCause::OldAge)
        } else if self.nutrients <= 0.0 {
            Some(DeathCause::Starvation)
        } else {
            None
        }
    }

    pub fn is_ready_to_reproduce(&self) -> bool {
        match &self.body {
            Body::Plant(plant) => self.nutrients > plant.spreading_threshold,
            Body::Animal(animal) => self.nutrients > animal.reproduction_nutrient_threshold,
        }
    }

    /// Per-tick upkeep. Plants have none.
    pub fn consume_resources(&mut self) {
        if let Body::Animal(animal) = &self.body {
            let upkeep = animal.nutrient_requirement;
            self.consume_nutrients(upkeep);
        }
    }

    /// Nutrients the parent gives up for one offspring
    pub fn reproduction_cost(&self) -> f32 {
        match &self.body {
            Body::Plant(plant) => plant.spreading_threshold / 2.0,
            Body::Animal(animal) => animal.reproduction_nutrient_threshold / 2.0,
        }
    }

    /// Produce an offspring, paying its cost, or `None` if not ready.
    ///
    /// Plant offspring are exact clones. Animal offspring get independent
    /// multiplicative jitter in `1 - jitter ..= 1 + jitter` on movement
    /// speed and upkeep.
    pub fn reproduce<R: Rng + ?Sized>(&mut self, rng: &mut R, jitter: f32) -> Option<Organism> {
        if !self.is_ready_to_reproduce() {
            return None;
        }

        let cost = self.reproduction_cost();
        let body = match &self.body {
            Body::Plant(plant) => Body::Plant(plant.clone()),
            Body::Animal(animal) => Body::Animal(animal.offspring(rng, jitter)),
        };
        self.consume_nutrients(cost);

        Some(Organism::new(cost, self.max_lifespan, body))
    }
}
