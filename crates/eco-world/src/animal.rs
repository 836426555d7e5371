//! Animal traits, diet and inheritance.

use crate::organism::{Body, Organism};
use eco_core::{AnimalType, CarnivorePrey};
use rand::Rng;
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Animal {
    pub movement_speed: i32,
    /// Chebyshev radius scanned for food
    pub vision_distance: i32,
    pub animal_type: AnimalType,
    /// Upkeep paid every tick
    pub nutrient_requirement: f32,
    pub reproduction_nutrient_threshold: f32,
    pub mass: i32,
}

impl Animal {
    pub fn new(
        movement_speed: i32,
        vision_distance: i32,
        animal_type: AnimalType,
        nutrient_requirement: f32,
        reproduction_nutrient_threshold: f32,
        mass: i32,
    ) -> Self {
        Self {
            movement_speed,
            vision_distance,
            animal_type,
            nutrient_requirement,
            reproduction_nutrient_threshold,
            mass,
        }
    }

    /// Diet check with the strict herbivores-only prey rule for carnivores
    pub fn can_eat(&self, food: Option<&Organism>) -> bool {
        self.can_eat_with(food, CarnivorePrey::HerbivoresOnly)
    }

    pub fn can_eat_with(&self, food: Option<&Organism>, prey: CarnivorePrey) -> bool {
        let Some(food) = food else {
            return false;
        };

        match (self.animal_type, food.body()) {
            (AnimalType::Herbivore, Body::Plant(_)) => true,
            (AnimalType::Herbivore, Body::Animal(_)) => false,
            (AnimalType::Carnivore, Body::Plant(_)) => false,
            (AnimalType::Carnivore, Body::Animal(other)) => match prey {
                CarnivorePrey::HerbivoresOnly => other.animal_type == AnimalType::Herbivore,
                CarnivorePrey::AnyAnimal => true,
            },
            (AnimalType::Omnivore, _) => true,
        }
    }

    /// Nutrients charged for one step
    pub fn movement_cost(&self, cost_factor: f32) -> f32 {
        cost_factor * self.movement_speed as f32 * self.mass as f32
    }

    pub(crate) fn offspring<R: Rng + ?Sized>(&self, rng: &mut R, jitter: f32) -> Animal {
        let speed_factor = jitter_factor(rng, jitter);
        let requirement_factor = jitter_factor(rng, jitter);

        Animal {
            movement_speed: ((self.movement_speed as f32 * speed_factor).round() as i32).max(1),
            nutrient_requirement: self.nutrient_requirement * requirement_factor,
            ..self.clone()
        }
    }
}

fn jitter_factor<R: Rng + ?Sized>(rng: &mut R, jitter: f32) -> f32 {
    if jitter <= 0.0 {
        1.0
    } else {
        rng.gen_range(1.0 - jitter..=1.0 + jitter)
    }
}

impl Organism {
    /// Whether this organism may eat `food`; plants never eat.
    pub fn can_eat(&self, food: Option<&Organism>) -> bool {
        self.as_animal().map_or(false, |animal| animal.can_eat(food))
    }

    /// Take in all of `food`'s nutrients if it is edible, returning the gain.
    ///
    /// The prey itself is left untouched; removing it from the world is the
    /// caller's job.
    pub fn eat(&mut self, food: &Organism) -> Option<f32> {
        self.eat_with(food, CarnivorePrey::HerbivoresOnly)
    }

    pub fn eat_with(&mut self, food: &Organism, prey: CarnivorePrey) -> Option<f32> {
        let edible = self
            .as_animal()
            .map_or(false, |animal| animal.can_eat_with(Some(food), prey));
        if !edible {
            return None;
        }

        let gain = food.nutrients();
        self.add_nutrients(gain);
        Some(gain)
    }
}
