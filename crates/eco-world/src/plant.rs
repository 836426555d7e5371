//! Plant traits and passive growth.

use crate::organism::{Body, Organism};
use serde::{Deserialize, Serialize};

/// Spreading threshold for plants built without an explicit one
pub const DEFAULT_SPREADING_THRESHOLD: f32 = 15.0;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Plant {
    pub growth_rate: f32,
    pub nutrient_absorption_rate: f32,
    /// Nutrient level above which the plant spreads
    pub spreading_threshold: f32,
}

impl Plant {
    pub fn new(growth_rate: f32, nutrient_absorption_rate: f32) -> Self {
        Self {
            growth_rate,
            nutrient_absorption_rate,
            spreading_threshold: DEFAULT_SPREADING_THRESHOLD,
        }
    }

    pub fn with_spreading_threshold(mut self, spreading_threshold: f32) -> Self {
        self.spreading_threshold = spreading_threshold;
        self
    }

    /// Nutrients gained per tick
    pub fn absorption(&self) -> f32 {
        self.nutrient_absorption_rate * self.growth_rate
    }
}

impl Organism {
    /// Passive accretion; a no-op for animals.
    pub fn absorb_nutrients(&mut self) {
        if let Body::Plant(plant) = self.body() {
            let gain = plant.absorption();
            self.add_nutrients(gain);
        }
    }
}
