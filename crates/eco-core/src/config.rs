//! Configuration types for the simulation.

use crate::{AnimalType, Error, Result};
use serde::{Deserialize, Serialize};
use std::path::Path;

/// World configuration parameters
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct WorldConfig {
    /// Width of the world grid
    pub width: i32,
    /// Height of the world grid
    pub height: i32,
    /// Soil fertility; scales the absorption rate of decomposition plants
    pub base_nutrient_rate: f32,
}

impl Default for WorldConfig {
    fn default() -> Self {
        Self {
            width: 100,
            height: 100,
            base_nutrient_rate: 1.0,
        }
    }
}

/// Plant behaviour shared by every plant in the world
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct PlantConfig {
    /// Chebyshev radius searched for a free tile when a plant spreads
    pub spread_radius: i32,
}

impl Default for PlantConfig {
    fn default() -> Self {
        Self {
            spread_radius: 1,
        }
    }
}

/// Which animals a carnivore may hunt
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum CarnivorePrey {
    /// Only herbivores; never omnivores or other carnivores
    HerbivoresOnly,
    /// Any animal
    AnyAnimal,
}

/// Animal behaviour shared by every animal in the world
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct AnimalConfig {
    /// Nutrients charged per step, multiplied by speed and mass
    pub movement_cost_factor: f32,
    /// Half-width of the multiplicative jitter applied to inherited speed and upkeep
    pub offspring_jitter: f32,
    /// Prey rule for carnivores
    pub carnivore_prey: CarnivorePrey,
}

impl Default for AnimalConfig {
    fn default() -> Self {
        Self {
            movement_cost_factor: 0.01,
            offspring_jitter: 0.1,
            carnivore_prey: CarnivorePrey::HerbivoresOnly,
        }
    }
}

/// Inclusive float range used for randomized traits
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct FloatRange {
    pub min: f32,
    pub max: f32,
}

impl FloatRange {
    pub fn new(min: f32, max: f32) -> Self {
        Self { min, max }
    }

    pub fn is_valid(&self) -> bool {
        self.min.is_finite() && self.max.is_finite() && self.min <= self.max
    }
}

/// How dead organisms are recycled into new plants
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct DecompositionConfig {
    /// Chance that a dead plant seeds a replacement (animal corpses always do)
    pub plant_corpse_probability: f32,
    /// Floor on the nutrients a decomposition plant starts with
    pub min_nutrients: f32,
    /// Lifespan of decomposition plants
    pub max_lifespan: u32,
    pub growth_rate_range: FloatRange,
    pub absorption_rate_range: FloatRange,
    /// Scaled by `1 + growth_rate` to get each decomposition plant's threshold
    pub global_spreading_threshold: f32,
}

impl Default for DecompositionConfig {
    fn default() -> Self {
        Self {
            plant_corpse_probability: 0.5,
            min_nutrients: 2.0,
            max_lifespan: 100,
            growth_rate_range: FloatRange::new(0.3, 0.8),
            absorption_rate_range: FloatRange::new(0.2, 0.5),
            global_spreading_threshold: 12.0,
        }
    }
}

/// When the parent pays for an offspring
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum ReproductionCostPolicy {
    /// Only when a free tile was found and the offspring placed
    ChargeOnPlacement,
    /// Whenever the parent is ready, even if there is nowhere to put the offspring
    ChargeAlways,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ReproductionConfig {
    pub cost_policy: ReproductionCostPolicy,
    /// Births are refused once the population reaches this size
    pub max_population: usize,
}

impl Default for ReproductionConfig {
    fn default() -> Self {
        Self {
            cost_policy: ReproductionCostPolicy::ChargeOnPlacement,
            max_population: 10_000,
        }
    }
}

/// Initial population counts
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct SeedingConfig {
    pub plants: usize,
    pub herbivores: usize,
    pub carnivores: usize,
    pub omnivores: usize,
    /// Random tiles tried per organism before falling back to the nearest empty one
    pub placement_attempts: usize,
}

impl Default for SeedingConfig {
    fn default() -> Self {
        Self {
            plants: 2000,
            herbivores: 400,
            carnivores: 300,
            omnivores: 0,
            placement_attempts: 100,
        }
    }
}

impl SeedingConfig {
    pub fn animals(&self, animal_type: AnimalType) -> usize {
        match animal_type {
            AnimalType::Herbivore => self.herbivores,
            AnimalType::Carnivore => self.carnivores,
            AnimalType::Omnivore => self.omnivores,
        }
    }
}

/// Template for a seeded plant
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PlantArchetype {
    pub nutrients: f32,
    pub max_lifespan: u32,
    pub growth_rate: f32,
    pub nutrient_absorption_rate: f32,
    pub spreading_threshold: f32,
}

impl Default for PlantArchetype {
    fn default() -> Self {
        Self {
            nutrients: 10.0,
            max_lifespan: 100,
            growth_rate: 0.5,
            nutrient_absorption_rate: 0.3,
            spreading_threshold: 15.0,
        }
    }
}

/// Template for a seeded animal
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AnimalArchetype {
    pub nutrients: f32,
    pub max_lifespan: u32,
    pub movement_speed: i32,
    pub vision_distance: i32,
    pub nutrient_requirement: f32,
    pub reproduction_nutrient_threshold: f32,
    pub mass: i32,
}

impl PlantArchetype {
    pub fn validate(&self) -> Result<()> {
        let rates_ok = [self.growth_rate, self.nutrient_absorption_rate]
            .iter()
            .all(|rate| rate.is_finite() && *rate >= 0.0);
        if !rates_ok {
            return Err(Error::InvalidConfig(
                "plant growth and absorption rates must be finite and non-negative".to_string(),
            ));
        }
        check_archetype_basics("plant", self.nutrients, self.max_lifespan)?;
        check_positive("plant spreading_threshold", self.spreading_threshold)
    }
}

impl AnimalArchetype {
    pub fn validate(&self, animal_type: AnimalType) -> Result<()> {
        check_archetype_basics(&animal_type.to_string(), self.nutrients, self.max_lifespan)?;
        check_positive(
            &format!("{} reproduction_nutrient_threshold", animal_type),
            self.reproduction_nutrient_threshold,
        )?;
        if !self.nutrient_requirement.is_finite() || self.nutrient_requirement < 0.0 {
            return Err(Error::InvalidConfig(format!(
                "{} nutrient_requirement must be finite and non-negative, got {}",
                animal_type, self.nutrient_requirement
            )));
        }
        if self.movement_speed < 0 || self.vision_distance < 0 || self.mass < 0 {
            return Err(Error::InvalidConfig(format!(
                "{} speed, vision and mass must not be negative",
                animal_type
            )));
        }
        Ok(())
    }

    pub fn herbivore() -> Self {
        Self {
            nutrients: 20.0,
            max_lifespan: 80,
            movement_speed: 2,
            vision_distance: 5,
            nutrient_requirement: 1.5,
            reproduction_nutrient_threshold: 25.0,
            mass: 10,
        }
    }

    pub fn carnivore() -> Self {
        Self {
            nutrients: 15.0,
            max_lifespan: 80,
            movement_speed: 2,
            vision_distance: 5,
            nutrient_requirement: 1.2,
            reproduction_nutrient_threshold: 20.0,
            mass: 8,
        }
    }

    pub fn omnivore() -> Self {
        Self {
            nutrients: 18.0,
            max_lifespan: 90,
            movement_speed: 2,
            vision_distance: 4,
            nutrient_requirement: 1.4,
            reproduction_nutrient_threshold: 24.0,
            mass: 9,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct Archetypes {
    pub plant: PlantArchetype,
    pub herbivore: AnimalArchetype,
    pub carnivore: AnimalArchetype,
    pub omnivore: AnimalArchetype,
}

impl Default for Archetypes {
    fn default() -> Self {
        Self {
            plant: PlantArchetype::default(),
            herbivore: AnimalArchetype::herbivore(),
            carnivore: AnimalArchetype::carnivore(),
            omnivore: AnimalArchetype::omnivore(),
        }
    }
}

impl Archetypes {
    pub fn animal(&self, animal_type: AnimalType) -> &AnimalArchetype {
        match animal_type {
            AnimalType::Herbivore => &self.herbivore,
            AnimalType::Carnivore => &self.carnivore,
            AnimalType::Omnivore => &self.omnivore,
        }
    }
}

fn check_archetype_basics(name: &str, nutrients: f32, max_lifespan: u32) -> Result<()> {
    if !nutrients.is_finite() || nutrients <= 0.0 {
        return Err(Error::InvalidConfig(format!(
            "{} starting nutrients must be positive, got {}",
            name, nutrients
        )));
    }
    if max_lifespan == 0 {
        return Err(Error::InvalidConfig(format!(
            "{} max_lifespan must be at least 1",
            name
        )));
    }
    Ok(())
}

fn check_positive(name: &str, value: f32) -> Result<()> {
    if !value.is_finite() || value <= 0.0 {
        return Err(Error::InvalidConfig(format!(
            "{} must be positive, got {}",
            name, value
        )));
    }
    Ok(())
}

/// Full simulation configuration
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct SimulationConfig {
    /// Random seed for reproducibility; a fresh one is drawn when absent
    pub seed: Option<u64>,
    pub world: WorldConfig,
    pub plant: PlantConfig,
    pub animal: AnimalConfig,
    pub decomposition: DecompositionConfig,
    pub reproduction: ReproductionConfig,
    pub seeding: SeedingConfig,
    pub archetypes: Archetypes,
}

impl SimulationConfig {
    /// Parse and validate.
    pub fn from_json_str(json: &str) -> Result<Self> {
        let config: Self = serde_json::from_str(json)?;
        config.validate()?;
        Ok(config)
    }

    /// Read and validate.
    pub fn from_json_file(path: impl AsRef<Path>) -> Result<Self> {
        let config = Self::read_json_file(path)?;
        config.validate()?;
        Ok(config)
    }

    /// Read without validating, for callers that patch the result before
    /// calling [`SimulationConfig::validate`] themselves.
    pub fn read_json_file(path: impl AsRef<Path>) -> Result<Self> {
        let json = std::fs::read_to_string(path)?;
        Ok(serde_json::from_str(&json)?)
    }

    pub fn validate(&self) -> Result<()> {
        if self.world.width <= 0 || self.world.height <= 0 {
            return Err(Error::InvalidDimensions {
                width: self.world.width,
                height: self.world.height,
            });
        }
        if !self.world.base_nutrient_rate.is_finite() || self.world.base_nutrient_rate < 0.0 {
            return Err(Error::InvalidConfig(format!(
                "base_nutrient_rate must be finite and non-negative, got {}",
                self.world.base_nutrient_rate
            )));
        }
        if !(0.0..=1.0).contains(&self.decomposition.plant_corpse_probability) {
            return Err(Error::InvalidConfig(format!(
                "plant_corpse_probability must be within 0..=1, got {}",
                self.decomposition.plant_corpse_probability
            )));
        }
        if !self.decomposition.growth_rate_range.is_valid()
            || !self.decomposition.absorption_rate_range.is_valid()
        {
            return Err(Error::InvalidConfig(
                "decomposition trait ranges must be finite with min <= max".to_string(),
            ));
        }
        if !(0.0..1.0).contains(&self.animal.offspring_jitter) {
            return Err(Error::InvalidConfig(format!(
                "offspring_jitter must be within 0..1, got {}",
                self.animal.offspring_jitter
            )));
        }
        if self.animal.movement_cost_factor < 0.0 {
            return Err(Error::InvalidConfig(
                "movement_cost_factor must not be negative".to_string(),
            ));
        }
        if self.plant.spread_radius < 1 {
            return Err(Error::InvalidConfig(format!(
                "spread_radius must be at least 1, got {}",
                self.plant.spread_radius
            )));
        }
        check_positive(
            "global_spreading_threshold",
            self.decomposition.global_spreading_threshold,
        )?;
        if self.decomposition.max_lifespan == 0 {
            return Err(Error::InvalidConfig(
                "decomposition max_lifespan must be at least 1".to_string(),
            ));
        }

        self.archetypes.plant.validate()?;
        for animal_type in AnimalType::all() {
            self.archetypes.animal(animal_type).validate(animal_type)?;
        }
        Ok(())
    }
}
