//! The world manager: sole owner of the grid and the population.

use crate::grid::Grid;
use crate::organism::{DeathCause, Organism};
use crate::plant::Plant;
use crate::population::Population;
use crate::tile::Occupant;
use eco_core::{
    Error, OrganismId, OrganismKind, PopulationStats, Position, ReproductionCostPolicy, Result,
    SimulationConfig, TickReport, WorldConfig,
};
use rand::seq::SliceRandom;
use rand::{Rng, SeedableRng};
use rand_chacha::ChaCha8Rng;
use tracing::{debug, debug_span, info, trace, warn};

pub struct WorldManager {
    grid: Grid,
    population: Population,
    config: SimulationConfig,
    rng: ChaCha8Rng,
    seed: u64,
    tick: u64,
    report: TickReport,
    totals: TickReport,
}

impl WorldManager {
    /// Build an empty world with default behaviour settings.
    pub fn new(width: i32, height: i32, base_nutrient_rate: f32) -> Result<Self> {
        let config = SimulationConfig {
            world: WorldConfig {
                width,
                height,
                base_nutrient_rate,
            },
            ..Default::default()
        };
        Self::with_config(config)
    }

    pub fn with_config(config: SimulationConfig) -> Result<Self> {
        config.validate()?;
        let grid = Grid::new(config.world.width, config.world.height)?;

        let seed = config.seed.unwrap_or_else(|| rand::thread_rng().gen());
        let rng = ChaCha8Rng::seed_from_u64(seed);

        info!(
            width = grid.width(),
            height = grid.height(),
            seed,
            "World created"
        );

        Ok(Self {
            grid,
            population: Population::new(),
            config,
            rng,
            seed,
            tick: 0,
            report: TickReport::default(),
            totals: TickReport::default(),
        })
    }

    pub fn seed(&self) -> u64 {
        self.seed
    }

    /// Number of completed ticks
    pub fn tick(&self) -> u64 {
        self.tick
    }

    pub fn config(&self) -> &SimulationConfig {
        &self.config
    }

    pub fn grid(&self) -> &Grid {
        &self.grid
    }

    pub fn population(&self) -> &Population {
        &self.population
    }

    pub fn organism_count(&self) -> usize {
        self.population.len()
    }

    pub fn organism(&self, id: OrganismId) -> Option<&Organism> {
        self.population.get(id)
    }

    /// Live organisms in insertion order
    pub fn organisms(&self) -> impl Iterator<Item = (OrganismId, &Organism)> + '_ {
        self.population.iter()
    }

    pub fn occupant_at(&self, x: i32, y: i32) -> Result<Option<(OrganismId, &Organism)>> {
        let tile = self.grid.tile(x, y)?;
        Ok(tile
            .occupant()
            .and_then(|occupant| self.population.get(occupant.id).map(|o| (occupant.id, o))))
    }

    /// Report for the most recent tick
    pub fn last_report(&self) -> &TickReport {
        &self.report
    }

    /// Reports of every tick so far, summed
    pub fn totals(&self) -> &TickReport {
        &self.totals
    }

    pub fn stats(&self) -> PopulationStats {
        PopulationStats::from_samples(
            self.population
                .iter()
                .map(|(_, o)| (o.animal_type(), o.nutrients(), o.age())),
        )
    }

    pub fn find_closest_organism_of_type(
        &self,
        pos: Position,
        kind: OrganismKind,
    ) -> Result<OrganismId> {
        self.grid
            .find_closest_organism(pos, kind)
            .map(|occupant| occupant.id)
    }

    /// Place `organism` on the empty tile at `(x, y)`.
    ///
    /// On failure the organism is dropped and the world is left untouched.
    pub fn add_organism(&mut self, organism: Organism, x: i32, y: i32) -> Result<OrganismId> {
        let kind = organism.kind();
        match self.place(organism, Position::new(x, y)) {
            Ok(id) => {
                debug!(organism_id = ?id, %kind, x, y, "Organism added");
                Ok(id)
            }
            Err(e) => {
                warn!(%kind, x, y, error = %e, "Discarding organism that could not be placed");
                Err(e)
            }
        }
    }

    pub fn remove_organism(&mut self, id: OrganismId) -> Option<Organism> {
        let organism = self.detach(id)?;
        debug!(organism_id = ?id, kind = %organism.kind(), "Organism removed");
        Some(organism)
    }

    /// Remove whatever stands at `(x, y)`; `Ok(None)` for an empty tile.
    pub fn remove_organism_at(&mut self, x: i32, y: i32) -> Result<Option<Organism>> {
        let occupant = self.grid.tile(x, y)?.occupant();
        Ok(occupant.and_then(|occupant| self.remove_organism(occupant.id)))
    }

    /// Seed a decomposition plant at `pos` from a corpse's `nutrients`.
    pub fn spawn_plant_from_dead_organism(
        &mut self,
        pos: Position,
        nutrients: f32,
    ) -> Result<OrganismId> {
        if !self.grid.get(pos)?.is_empty() {
            return Err(Error::TileOccupied { x: pos.x, y: pos.y });
        }
        self.ensure_room()?;

        let decomposition = &self.config.decomposition;
        let growth_rate = self.rng.gen_range(
            decomposition.growth_rate_range.min..=decomposition.growth_rate_range.max,
        );
        let absorption_rate = self.rng.gen_range(
            decomposition.absorption_rate_range.min..=decomposition.absorption_rate_range.max,
        ) * self.config.world.base_nutrient_rate;
        let spreading_threshold = decomposition.global_spreading_threshold * (1.0 + growth_rate);

        let plant = Organism::plant(
            nutrients.max(decomposition.min_nutrients),
            decomposition.max_lifespan,
            Plant::new(growth_rate, absorption_rate).with_spreading_threshold(spreading_threshold),
        );

        let id = self.place(plant, pos)?;
        self.report.decomposition_spawns += 1;
        trace!(organism_id = ?id, x = pos.x, y = pos.y, nutrients, "Decomposition plant spawned");
        Ok(id)
    }

    /// Nearest edible organism within the animal's vision box.
    ///
    /// Animal prey is preferred over plants when both are in sight.
    pub fn find_food(&self, id: OrganismId) -> Option<(OrganismId, Position)> {
        let hunter = self.population.get(id)?;
        let animal = hunter.as_animal()?;
        let pos = hunter.position()?;
        let prey_rule = self.config.animal.carnivore_prey;
        let vision = animal.vision_distance.max(0);

        let mut best_animal: Option<(OrganismId, Position, i64)> = None;
        let mut best_plant: Option<(OrganismId, Position, i64)> = None;

        // Scan box clipped to the grid
        let min_x = pos.x.saturating_sub(vision).max(0);
        let max_x = pos.x.saturating_add(vision).min(self.grid.width() - 1);
        let min_y = pos.y.saturating_sub(vision).max(0);
        let max_y = pos.y.saturating_add(vision).min(self.grid.height() - 1);
        for y in min_y..=max_y {
            for x in min_x..=max_x {
                let Ok(tile) = self.grid.tile(x, y) else {
                    continue;
                };
                let Some(occupant) = tile.occupant() else {
                    continue;
                };
                if occupant.id == id {
                    continue;
                }
                let food = self.population.get(occupant.id);
                if !animal.can_eat_with(food, prey_rule) {
                    continue;
                }

                let distance = pos.distance_squared(&tile.position());
                let best = match occupant.kind {
                    OrganismKind::Animal => &mut best_animal,
                    OrganismKind::Plant => &mut best_plant,
                };
                if best.map_or(true, |(_, _, d)| distance < d) {
                    *best = Some((occupant.id, tile.position(), distance));
                }
            }
        }

        best_animal
            .or(best_plant)
            .map(|(food_id, food_pos, _)| (food_id, food_pos))
    }

    /// Advance the whole population by one tick.
    pub fn update(&mut self) {
        self.tick += 1;
        let span = debug_span!("tick", tick = self.tick);
        let _enter = span.enter();

        self.report = TickReport::new(self.tick);

        // Offspring born during this tick are not in the snapshot
        let snapshot: Vec<OrganismId> = self.population.ids().collect();
        for id in snapshot {
            self.process_organism(id);
        }

        self.remove_dead_organisms();
        self.population.compact();
        self.totals.accumulate(&self.report);

        debug_assert!(
            self.check_consistency().is_ok(),
            "grid and population diverged: {:?}",
            self.check_consistency()
        );

        debug!(
            population = self.population.len(),
            births = self.report.births,
            spreads = self.report.spreads,
            meals = self.report.meals,
            deaths = self.report.deaths(),
            "Tick complete"
        );
    }

    /// Verify that the grid and the population describe the same world.
    pub fn check_consistency(&self) -> Result<()> {
        for (id, organism) in self.population.iter() {
            let pos = organism.position().ok_or_else(|| {
                Error::InvalidState(format!("organism {:?} has no position", id))
            })?;
            let occupant = self.grid.get(pos)?.occupant();
            let expected = Occupant {
                id,
                kind: organism.kind(),
            };
            if occupant != Some(expected) {
                return Err(Error::InvalidState(format!(
                    "organism {:?} thinks it is at {} but the tile holds {:?}",
                    id, pos, occupant
                )));
            }
            if organism.nutrients() < 0.0 {
                return Err(Error::InvalidState(format!(
                    "organism {:?} has negative nutrients",
                    id
                )));
            }
        }

        let occupied = self.grid.occupied_count();
        if occupied != self.population.len() {
            return Err(Error::InvalidState(format!(
                "{} occupied tiles but {} organisms",
                occupied,
                self.population.len()
            )));
        }

        Ok(())
    }

    fn process_organism(&mut self, id: OrganismId) {
        // Eaten earlier in this tick
        let Some(organism) = self.population.get_mut(id) else {
            return;
        };

        organism.increment_age();
        if let Some(cause) = organism.death_cause() {
            self.kill(id, cause);
            return;
        }

        organism.consume_resources();
        if organism.is_dead() {
            // Starved on upkeep; collected by the end-of-tick sweep
            return;
        }

        match organism.kind() {
            OrganismKind::Plant => self.update_plant(id),
            OrganismKind::Animal => self.update_animal(id),
        }
    }

    fn update_plant(&mut self, id: OrganismId) {
        let Some(plant) = self.population.get_mut(id) else {
            return;
        };
        plant.absorb_nutrients();

        if plant.is_ready_to_reproduce() {
            let radius = self.config.plant.spread_radius;
            self.try_reproduce(id, radius);
        }
    }

    fn update_animal(&mut self, id: OrganismId) {
        let Some(pos) = self.position_of(id) else {
            return;
        };

        // Hunt, then move, then breed
        match self.find_food(id) {
            Some((food_id, food_pos)) if pos.distance(&food_pos) <= 1 => {
                self.try_eat(id, food_id);
                self.random_walk(id);
            }
            Some((_, food_pos)) => {
                self.step_toward(id, food_pos);
            }
            None => {
                self.random_walk(id);
            }
        }

        let ready = self
            .population
            .get(id)
            .map_or(false, Organism::is_ready_to_reproduce);
        if ready {
            self.try_reproduce(id, 1);
        }
    }

    fn try_eat(&mut self, id: OrganismId, food_id: OrganismId) -> bool {
        let prey_rule = self.config.animal.carnivore_prey;
        let edible = match (self.population.get(id), self.population.get(food_id)) {
            (Some(hunter), Some(food)) => hunter
                .as_animal()
                .map_or(false, |animal| animal.can_eat_with(Some(food), prey_rule)),
            _ => false,
        };
        if !edible {
            return false;
        }

        let Some(food) = self.detach(food_id) else {
            return false;
        };
        let Some(hunter) = self.population.get_mut(id) else {
            return false;
        };

        match hunter.eat_with(&food, prey_rule) {
            Some(gain) => {
                self.report.meals += 1;
                trace!(
                    organism_id = ?id,
                    prey_id = ?food_id,
                    prey_kind = %food.kind(),
                    gain,
                    "Organism ate"
                );
                true
            }
            None => false,
        }
    }

    fn step_toward(&mut self, id: OrganismId, target: Position) -> bool {
        let Some(pos) = self.position_of(id) else {
            return false;
        };

        let mut best: Option<(Position, i64)> = None;
        for candidate in self.grid.empty_neighbors(pos, 1) {
            let distance = candidate.distance_squared(&target);
            if best.map_or(true, |(_, d)| distance < d) {
                best = Some((candidate, distance));
            }
        }

        match best {
            Some((next, _)) => self.move_organism(id, next),
            None => false,
        }
    }

    fn random_walk(&mut self, id: OrganismId) -> bool {
        let Some(pos) = self.position_of(id) else {
            return false;
        };

        let candidates = self.grid.empty_neighbors(pos, 1);
        match candidates.choose(&mut self.rng) {
            Some(&next) => self.move_organism(id, next),
            None => false,
        }
    }

    /// Move an animal onto an empty tile, charging its movement cost.
    fn move_organism(&mut self, id: OrganismId, to: Position) -> bool {
        let Some(organism) = self.population.get_mut(id) else {
            return false;
        };
        let Some(from) = organism.position() else {
            return false;
        };
        let occupant = Occupant {
            id,
            kind: organism.kind(),
        };

        // Claim the destination before releasing the origin so a failed
        // claim leaves everything as it was
        let claimed = self
            .grid
            .get_mut(to)
            .and_then(|tile| tile.set_occupant(occupant));
        if let Err(e) = claimed {
            warn!(organism_id = ?id, x = to.x, y = to.y, error = %e, "Move rejected");
            return false;
        }
        if let Ok(tile) = self.grid.get_mut(from) {
            tile.clear_occupant();
        }

        let cost_factor = self.config.animal.movement_cost_factor;
        organism.set_position(Some(to));
        if let Some(animal) = organism.as_animal() {
            let cost = animal.movement_cost(cost_factor);
            organism.consume_nutrients(cost);
        }

        trace!(organism_id = ?id, from = %from, to = %to, "Organism moved");
        true
    }

    /// Try to place one offspring of `id` on a random empty tile within `radius`.
    fn try_reproduce(&mut self, id: OrganismId, radius: i32) -> bool {
        let Some(pos) = self.position_of(id) else {
            return false;
        };
        if self.ensure_room().is_err() {
            self.report.capped_births += 1;
            return false;
        }

        let candidates = self.grid.empty_neighbors(pos, radius);
        let Some(&site) = candidates.choose(&mut self.rng) else {
            self.report.failed_placements += 1;
            if self.config.reproduction.cost_policy == ReproductionCostPolicy::ChargeAlways {
                if let Some(parent) = self.population.get_mut(id) {
                    let cost = parent.reproduction_cost();
                    parent.consume_nutrients(cost);
                }
            }
            trace!(organism_id = ?id, x = pos.x, y = pos.y, "No room for offspring");
            return false;
        };

        let jitter = self.config.animal.offspring_jitter;
        let Some(parent) = self.population.get_mut(id) else {
            return false;
        };
        let Some(offspring) = parent.reproduce(&mut self.rng, jitter) else {
            return false;
        };
        let kind = offspring.kind();

        match self.place(offspring, site) {
            Ok(child_id) => {
                match kind {
                    OrganismKind::Plant => self.report.spreads += 1,
                    OrganismKind::Animal => self.report.births += 1,
                }
                debug!(
                    parent_id = ?id,
                    offspring_id = ?child_id,
                    %kind,
                    x = site.x,
                    y = site.y,
                    "Offspring placed"
                );
                true
            }
            Err(e) => {
                warn!(parent_id = ?id, x = site.x, y = site.y, error = %e, "Discarding offspring");
                false
            }
        }
    }

    fn remove_dead_organisms(&mut self) {
        let dead: Vec<(OrganismId, DeathCause)> = self
            .population
            .iter()
            .filter_map(|(id, organism)| organism.death_cause().map(|cause| (id, cause)))
            .collect();

        for (id, cause) in dead {
            self.kill(id, cause);
        }
    }

    /// Remove a dead organism and let it decompose where it fell.
    fn kill(&mut self, id: OrganismId, cause: DeathCause) {
        // detach clears the cached position, so read it first
        let last_position = self.position_of(id);
        let Some(corpse) = self.detach(id) else {
            return;
        };
        match cause {
            DeathCause::OldAge => self.report.deaths_by_age += 1,
            DeathCause::Starvation => self.report.deaths_by_starvation += 1,
        }

        let kind = corpse.kind();
        trace!(
            organism_id = ?id,
            %kind,
            ?cause,
            age = corpse.age(),
            nutrients = corpse.nutrients(),
            "Organism died"
        );

        if let Some(pos) = last_position {
            self.decompose(pos, corpse.nutrients(), kind);
        }
    }

    fn decompose(&mut self, pos: Position, nutrients: f32, kind: OrganismKind) {
        if kind == OrganismKind::Plant {
            let p = f64::from(self.config.decomposition.plant_corpse_probability);
            if !self.rng.gen_bool(p) {
                return;
            }
        }

        if let Err(e) = self.spawn_plant_from_dead_organism(pos, nutrients) {
            trace!(x = pos.x, y = pos.y, error = %e, "No decomposition plant");
        }
    }

    fn ensure_room(&self) -> Result<()> {
        let max = self.config.reproduction.max_population;
        if self.population.len() >= max {
            return Err(Error::PopulationFull { max });
        }
        Ok(())
    }

    pub(crate) fn rng_mut(&mut self) -> &mut ChaCha8Rng {
        &mut self.rng
    }

    fn position_of(&self, id: OrganismId) -> Option<Position> {
        self.population.get(id).and_then(Organism::position)
    }

    /// Register `organism` in both the population and the grid, or in neither.
    pub(crate) fn place(&mut self, mut organism: Organism, pos: Position) -> Result<OrganismId> {
        if !self.grid.get(pos)?.is_empty() {
            return Err(Error::TileOccupied { x: pos.x, y: pos.y });
        }

        let kind = organism.kind();
        organism.set_position(Some(pos));
        let id = self.population.insert(organism);

        let claimed = self
            .grid
            .get_mut(pos)
            .and_then(|tile| tile.set_occupant(Occupant { id, kind }));
        if let Err(e) = claimed {
            self.population.remove(id);
            return Err(e);
        }

        Ok(id)
    }

    /// Take `id` out of the population and clear its tile.
    fn detach(&mut self, id: OrganismId) -> Option<Organism> {
        let mut organism = self.population.remove(id)?;
        if let Some(pos) = organism.position() {
            if let Ok(tile) = self.grid.get_mut(pos) {
                if tile.occupant().map(|o| o.id) == Some(id) {
                    tile.clear_occupant();
                }
            }
        }
        organism.set_position(None);
        Some(organism)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::animal::Animal;
    use eco_core::{AnimalType, CarnivorePrey};

    fn world(width: i32, height: i32) -> WorldManager {
        let config = SimulationConfig {
            seed: Some(42),
            world: WorldConfig {
                width,
                height,
                base_nutrient_rate: 1.0,
            },
            ..Default::default()
        };
        WorldManager::with_config(config).unwrap()
    }

    fn plant(nutrients: f32) -> Organism {
        Organism::plant(nutrients, 100, Plant::new(0.5, 0.3))
    }

    fn animal(animal_type: AnimalType, nutrients: f32, requirement: f32) -> Organism {
        Organism::animal(
            nutrients,
            80,
            Animal::new(2, 5, animal_type, requirement, 1000.0, 10),
        )
    }

    #[test]
    fn test_world_creation() {
        let world = WorldManager::new(10, 8, 1.0).unwrap();
        assert_eq!(world.grid().width(), 10);
        assert_eq!(world.grid().height(), 8);
        assert_eq!(world.organism_count(), 0);
        assert_eq!(world.tick(), 0);
    }

    #[test]
    fn test_invalid_dimensions() {
        assert!(matches!(
            WorldManager::new(0, 10, 1.0),
            Err(Error::InvalidDimensions { .. })
        ));
        assert!(WorldManager::new(10, -3, 1.0).is_err());
    }

    #[test]
    fn test_explicit_seed_is_reported() {
        let world = world(5, 5);
        assert_eq!(world.seed(), 42);
    }

    #[test]
    fn test_add_organism() {
        let mut world = world(15, 15);
        let id = world.add_organism(plant(10.0), 5, 5).unwrap();

        assert_eq!(world.organism_count(), 1);
        let tile = world.grid().tile(5, 5).unwrap();
        assert!(!tile.is_empty());
        assert_eq!(tile.occupant().unwrap().id, id);
        assert_eq!(world.organism(id).unwrap().position(), Some(Position::new(5, 5)));
        assert!(world.check_consistency().is_ok());
    }

    #[test]
    fn test_add_to_occupied_tile_keeps_original() {
        let mut world = world(15, 15);
        let original = world.add_organism(plant(8.0), 3, 3).unwrap();

        let err = world.add_organism(plant(12.0), 3, 3).unwrap_err();
        assert!(matches!(err, Error::TileOccupied { x: 3, y: 3 }));
        assert_eq!(world.organism_count(), 1);

        let (id, occupant) = world.occupant_at(3, 3).unwrap().unwrap();
        assert_eq!(id, original);
        assert_eq!(occupant.nutrients(), 8.0);
    }

    #[test]
    fn test_add_out_of_bounds() {
        let mut world = world(10, 10);
        assert!(matches!(
            world.add_organism(plant(10.0), 15, 5),
            Err(Error::OutOfBounds { x: 15, y: 5 })
        ));
        assert!(world.add_organism(plant(10.0), -1, 0).is_err());
        assert_eq!(world.organism_count(), 0);
    }

    #[test]
    fn test_place_then_remove_round_trip() {
        let mut world = world(10, 10);
        world.add_organism(plant(5.0), 1, 1).unwrap();
        let before = world.organism_count();

        let id = world.add_organism(plant(10.0), 4, 6).unwrap();
        let removed = world.remove_organism(id).unwrap();

        assert_eq!(removed.nutrients(), 10.0);
        assert!(removed.position().is_none());
        assert!(world.grid().tile(4, 6).unwrap().is_empty());
        assert_eq!(world.organism_count(), before);
        assert!(world.organism(id).is_none());
        assert!(world.remove_organism(id).is_none());
        assert!(world.check_consistency().is_ok());
    }

    #[test]
    fn test_remove_by_position() {
        let mut world = world(10, 10);
        world
            .add_organism(animal(AnimalType::Carnivore, 15.0, 1.2), 2, 1)
            .unwrap();

        let removed = world.remove_organism_at(2, 1).unwrap().unwrap();
        assert_eq!(removed.kind(), OrganismKind::Animal);
        assert!(world.grid().tile(2, 1).unwrap().is_empty());
        assert_eq!(world.organism_count(), 0);

        assert!(world.remove_organism_at(1, 0).unwrap().is_none());
        assert!(matches!(
            world.remove_organism_at(10, 0),
            Err(Error::OutOfBounds { .. })
        ));
    }

    #[test]
    fn test_spawn_plant_from_dead_organism() {
        let mut world = world(15, 15);
        let id = world
            .spawn_plant_from_dead_organism(Position::new(6, 7), 20.0)
            .unwrap();

        let plant = world.organism(id).unwrap();
        assert_eq!(plant.kind(), OrganismKind::Plant);
        assert_eq!(plant.nutrients(), 20.0);
        assert_eq!(plant.max_lifespan(), 100);

        let traits = plant.as_plant().unwrap();
        assert!((0.3..=0.8).contains(&traits.growth_rate));
        assert!((0.2..=0.5).contains(&traits.nutrient_absorption_rate));
        let expected = 12.0 * (1.0 + traits.growth_rate);
        assert!((traits.spreading_threshold - expected).abs() < 1e-4);
    }

    #[test]
    fn test_spawn_plant_uses_nutrient_floor() {
        let mut world = world(15, 15);
        let id = world
            .spawn_plant_from_dead_organism(Position::new(1, 1), 0.5)
            .unwrap();
        assert_eq!(world.organism(id).unwrap().nutrients(), 2.0);
    }

    #[test]
    fn test_spawn_plant_on_occupied_or_invalid_tile() {
        let mut world = world(15, 15);
        let existing = world.add_organism(plant(5.0), 8, 8).unwrap();

        assert!(matches!(
            world.spawn_plant_from_dead_organism(Position::new(8, 8), 20.0),
            Err(Error::TileOccupied { .. })
        ));
        assert_eq!(world.occupant_at(8, 8).unwrap().unwrap().0, existing);

        assert!(matches!(
            world.spawn_plant_from_dead_organism(Position::new(20, 20), 20.0),
            Err(Error::OutOfBounds { .. })
        ));
        assert_eq!(world.organism_count(), 1);
    }

    #[test]
    fn test_update_empty_world() {
        let mut world = world(5, 5);
        world.update();
        assert_eq!(world.tick(), 1);
        assert_eq!(world.organism_count(), 0);
        assert_eq!(world.last_report().tick, 1);
    }

    #[test]
    fn test_plant_spreads_to_adjacent_tile() {
        let mut world = world(5, 5);
        let parent = world.add_organism(plant(20.0), 2, 2).unwrap();

        world.update();

        assert_eq!(world.organism_count(), 2);
        assert_eq!(world.last_report().spreads, 1);
        let (child_id, child) = world
            .organisms()
            .find(|(id, _)| *id != parent)
            .unwrap();
        assert_ne!(child_id, parent);
        let child_pos = child.position().unwrap();
        assert_eq!(child_pos.chebyshev_distance(&Position::new(2, 2)), 1);
        assert_eq!(child.nutrients(), 7.5);

        // 20 + 0.15 absorbed - 7.5 paid
        let parent = world.organism(parent).unwrap();
        assert!((parent.nutrients() - 12.65).abs() < 1e-4);
        assert!(world.check_consistency().is_ok());
    }

    #[test]
    fn test_plant_without_room_keeps_nutrients() {
        let mut world = world(1, 1);
        let id = world.add_organism(plant(20.0), 0, 0).unwrap();

        world.update();

        assert_eq!(world.organism_count(), 1);
        assert_eq!(world.last_report().failed_placements, 1);
        // Only the absorbed nutrients changed
        let nutrients = world.organism(id).unwrap().nutrients();
        assert!((nutrients - 20.15).abs() < 1e-4);
    }

    #[test]
    fn test_charge_always_policy_pays_without_room() {
        let mut config = world(1, 1).config().clone();
        config.reproduction.cost_policy = ReproductionCostPolicy::ChargeAlways;
        let mut world = WorldManager::with_config(config).unwrap();
        let id = world.add_organism(plant(20.0), 0, 0).unwrap();

        world.update();

        let nutrients = world.organism(id).unwrap().nutrients();
        assert!((nutrients - 12.65).abs() < 1e-4);
    }

    #[test]
    fn test_herbivore_eats_adjacent_plant() {
        let mut config = world(10, 10).config().clone();
        config.animal.movement_cost_factor = 0.0;
        let mut world = WorldManager::with_config(config).unwrap();
        let herbivore = world
            .add_organism(animal(AnimalType::Herbivore, 20.0, 0.0), 4, 4)
            .unwrap();
        let food = world.add_organism(plant(10.0), 5, 4).unwrap();

        world.update();

        assert!(world.organism(food).is_none());
        assert!(world.grid().tile(5, 4).unwrap().is_empty());
        let herbivore = world.organism(herbivore).unwrap();
        assert_eq!(herbivore.nutrients(), 30.0);
        // Eating does not end the turn; the herbivore still takes a step
        let pos = herbivore.position().unwrap();
        assert_eq!(pos.chebyshev_distance(&Position::new(4, 4)), 1);
        assert_eq!(world.last_report().meals, 1);
        // Eaten prey does not decompose
        assert_eq!(world.last_report().decomposition_spawns, 0);
        assert_eq!(world.organism_count(), 1);
    }

    #[test]
    fn test_herbivore_steps_toward_distant_plant() {
        let mut world = world(10, 10);
        let herbivore = world
            .add_organism(animal(AnimalType::Herbivore, 20.0, 0.0), 0, 0)
            .unwrap();
        world.add_organism(plant(10.0), 4, 0).unwrap();

        world.update();

        let herbivore = world.organism(herbivore).unwrap();
        assert_eq!(herbivore.position(), Some(Position::new(1, 0)));
        // 0.01 * speed 2 * mass 10
        assert!((herbivore.nutrients() - 19.8).abs() < 1e-4);
    }

    #[test]
    fn test_plant_out_of_sight_is_ignored() {
        let mut world = world(20, 1);
        let herbivore = world
            .add_organism(
                Organism::animal(
                    20.0,
                    80,
                    Animal::new(1, 2, AnimalType::Herbivore, 0.0, 1000.0, 1),
                ),
                0,
                0,
            )
            .unwrap();
        world.add_organism(plant(10.0), 10, 0).unwrap();

        assert!(world.find_food(herbivore).is_none());
    }

    #[test]
    fn test_carnivore_ignores_other_carnivores() {
        let mut world = world(6, 6);
        let hunter = world
            .add_organism(animal(AnimalType::Carnivore, 20.0, 0.0), 2, 2)
            .unwrap();
        let rival = world
            .add_organism(animal(AnimalType::Carnivore, 20.0, 0.0), 3, 2)
            .unwrap();

        assert!(world.find_food(hunter).is_none());
        world.update();
        assert!(world.organism(rival).is_some());
        assert_eq!(world.last_report().meals, 0);
    }

    #[test]
    fn test_carnivore_any_animal_policy() {
        let mut config = world(6, 6).config().clone();
        config.animal.carnivore_prey = CarnivorePrey::AnyAnimal;
        let mut world = WorldManager::with_config(config).unwrap();
        let hunter = world
            .add_organism(animal(AnimalType::Carnivore, 20.0, 0.0), 2, 2)
            .unwrap();
        let rival = world
            .add_organism(animal(AnimalType::Carnivore, 7.0, 0.0), 3, 2)
            .unwrap();

        world.update();

        assert!(world.organism(rival).is_none());
        // 20 + 7 eaten - 0.2 for the step that follows
        let nutrients = world.organism(hunter).unwrap().nutrients();
        assert!((nutrients - 26.8).abs() < 1e-4);
    }

    #[test]
    fn test_omnivore_prefers_animal_prey() {
        let mut world = world(10, 10);
        let omnivore = world
            .add_organism(animal(AnimalType::Omnivore, 20.0, 0.0), 5, 5)
            .unwrap();
        world.add_organism(plant(10.0), 5, 4).unwrap();
        let prey = world
            .add_organism(animal(AnimalType::Herbivore, 10.0, 0.0), 8, 8)
            .unwrap();

        let (target, pos) = world.find_food(omnivore).unwrap();
        assert_eq!(target, prey);
        assert_eq!(pos, Position::new(8, 8));
    }

    #[test]
    fn test_starving_animal_is_clamped_and_removed() {
        let mut world = world(5, 5);
        let id = world
            .add_organism(animal(AnimalType::Herbivore, 1.0, 5.0), 2, 2)
            .unwrap();

        world.update();

        assert!(world.organism(id).is_none());
        assert_eq!(world.last_report().deaths_by_starvation, 1);
        // Animal corpses always decompose, seeded at the nutrient floor
        let (_, remains) = world.occupant_at(2, 2).unwrap().unwrap();
        assert_eq!(remains.kind(), OrganismKind::Plant);
        assert_eq!(remains.nutrients(), 2.0);
    }

    #[test]
    fn test_foodless_animal_random_walks() {
        let mut world = world(5, 5);
        let id = world
            .add_organism(animal(AnimalType::Herbivore, 20.0, 0.0), 2, 2)
            .unwrap();

        world.update();

        let herbivore = world.organism(id).unwrap();
        let pos = herbivore.position().unwrap();
        assert_eq!(pos.chebyshev_distance(&Position::new(2, 2)), 1);
        assert!((herbivore.nutrients() - 19.8).abs() < 1e-4);
        assert!(world.grid().tile(2, 2).unwrap().is_empty());
    }

    #[test]
    fn test_ready_animal_moves_then_breeds() {
        let mut world = world(7, 7);
        let parent = world
            .add_organism(
                Organism::animal(
                    30.0,
                    80,
                    Animal::new(2, 1, AnimalType::Carnivore, 0.0, 10.0, 10),
                ),
                3,
                3,
            )
            .unwrap();

        world.update();

        assert_eq!(world.last_report().births, 1);
        assert_eq!(world.organism_count(), 2);

        let parent_organism = world.organism(parent).unwrap();
        let parent_pos = parent_organism.position().unwrap();
        assert_ne!(parent_pos, Position::new(3, 3));
        // 30 - 0.2 for the step - 5 paid for the offspring
        assert!((parent_organism.nutrients() - 24.8).abs() < 1e-4);

        let (_, child) = world.organisms().find(|(id, _)| *id != parent).unwrap();
        assert_eq!(child.nutrients(), 5.0);
        assert_eq!(child.animal_type(), Some(AnimalType::Carnivore));
        assert_eq!(child.position().unwrap().chebyshev_distance(&parent_pos), 1);
        assert!(world.check_consistency().is_ok());
    }

    #[test]
    fn test_wide_spread_radius_reaches_past_full_ring() {
        let mut config = world(7, 7).config().clone();
        config.plant.spread_radius = 2;
        let mut world = WorldManager::with_config(config).unwrap();

        let center = Position::new(3, 3);
        let mut known = vec![world.add_organism(plant(20.0), 3, 3).unwrap()];
        let ring = world.grid().neighbors(center, 1);
        for pos in ring {
            known.push(world.add_organism(plant(1.0), pos.x, pos.y).unwrap());
        }

        world.update();

        assert_eq!(world.last_report().spreads, 1);
        assert_eq!(world.organism_count(), 10);
        let (_, child) = world
            .organisms()
            .find(|(id, _)| !known.contains(id))
            .unwrap();
        assert_eq!(child.position().unwrap().chebyshev_distance(&center), 2);
    }

    #[test]
    fn test_plant_corpse_always_decomposes_at_probability_one() {
        let mut config = world(5, 5).config().clone();
        config.decomposition.plant_corpse_probability = 1.0;
        let mut world = WorldManager::with_config(config).unwrap();
        let id = world
            .add_organism(Organism::plant(5.0, 1, Plant::new(0.5, 0.3)), 2, 2)
            .unwrap();

        world.update();

        assert!(world.organism(id).is_none());
        assert_eq!(world.last_report().deaths_by_age, 1);
        assert_eq!(world.last_report().decomposition_spawns, 1);
        let (remains_id, remains) = world.occupant_at(2, 2).unwrap().unwrap();
        assert_ne!(remains_id, id);
        assert_eq!(remains.kind(), OrganismKind::Plant);
        assert_eq!(remains.nutrients(), 5.0);
        assert_eq!(remains.max_lifespan(), 100);
    }

    #[test]
    fn test_plant_corpse_never_decomposes_at_probability_zero() {
        let mut config = world(5, 5).config().clone();
        config.decomposition.plant_corpse_probability = 0.0;
        let mut world = WorldManager::with_config(config).unwrap();
        world
            .add_organism(Organism::plant(5.0, 1, Plant::new(0.5, 0.3)), 2, 2)
            .unwrap();

        world.update();

        assert_eq!(world.organism_count(), 0);
        assert_eq!(world.last_report().decomposition_spawns, 0);
        assert!(world.grid().tile(2, 2).unwrap().is_empty());
    }

    #[test]
    fn test_decomposition_spawns_over_many_ticks() {
        let mut config = world(20, 20).config().clone();
        config.decomposition.plant_corpse_probability = 1.0;
        config.seeding.plants = 60;
        config.seeding.herbivores = 20;
        config.seeding.carnivores = 10;
        config.seeding.omnivores = 0;
        let mut world = WorldManager::with_config(config).unwrap();
        world.populate_from_config();

        for _ in 0..200 {
            world.update();
        }

        let totals = world.totals();
        assert!(totals.deaths() > 0);
        assert!(totals.decomposition_spawns > 0);
    }

    #[test]
    fn test_refused_decomposition_is_not_a_capped_birth() {
        let mut config = world(5, 5).config().clone();
        config.reproduction.max_population = 1;
        let mut world = WorldManager::with_config(config).unwrap();
        world.add_organism(plant(5.0), 0, 0).unwrap();

        assert!(matches!(
            world.spawn_plant_from_dead_organism(Position::new(1, 1), 10.0),
            Err(Error::PopulationFull { max: 1 })
        ));
        assert_eq!(world.last_report().capped_births, 0);
        assert_eq!(world.organism_count(), 1);
    }

    #[test]
    fn test_old_age_death() {
        let mut world = world(5, 5);
        let id = world
            .add_organism(Organism::plant(50.0, 2, Plant::new(0.5, 0.3)), 0, 0)
            .unwrap();

        world.update();
        assert!(world.organism(id).is_some());
        world.update();

        assert!(world.organism(id).is_none());
        assert_eq!(world.last_report().deaths_by_age, 1);
        for (_, organism) in world.organisms() {
            assert!(organism.age() < organism.max_lifespan());
        }
    }

    #[test]
    fn test_population_cap_blocks_births() {
        let mut config = world(5, 5).config().clone();
        config.reproduction.max_population = 1;
        let mut world = WorldManager::with_config(config).unwrap();
        world.add_organism(plant(20.0), 2, 2).unwrap();

        world.update();

        assert_eq!(world.organism_count(), 1);
        assert_eq!(world.last_report().capped_births, 1);
        assert_eq!(world.last_report().spreads, 0);
    }

    #[test]
    fn test_closest_organism_of_type() {
        let mut world = world(10, 10);
        let near = world.add_organism(plant(5.0), 2, 2).unwrap();
        world.add_organism(plant(5.0), 9, 9).unwrap();

        assert_eq!(
            world
                .find_closest_organism_of_type(Position::new(0, 0), OrganismKind::Plant)
                .unwrap(),
            near
        );
        assert!(matches!(
            world.find_closest_organism_of_type(Position::new(0, 0), OrganismKind::Animal),
            Err(Error::NotFound(_))
        ));
    }

    #[test]
    fn test_same_seed_same_history() {
        fn run() -> Vec<(Position, f32)> {
            let mut world = world(12, 12);
            world.add_organism(plant(20.0), 3, 3).unwrap();
            world.add_organism(plant(14.0), 8, 2).unwrap();
            world
                .add_organism(animal(AnimalType::Herbivore, 30.0, 0.5), 6, 6)
                .unwrap();
            for _ in 0..25 {
                world.update();
            }
            world
                .organisms()
                .map(|(_, o)| (o.position().unwrap(), o.nutrients()))
                .collect()
        }

        assert_eq!(run(), run());
    }

    #[test]
    fn test_stats_and_totals() {
        let mut world = world(10, 10);
        world.add_organism(plant(10.0), 0, 0).unwrap();
        world
            .add_organism(animal(AnimalType::Herbivore, 20.0, 1.0), 9, 9)
            .unwrap();
        world
            .add_organism(animal(AnimalType::Carnivore, 20.0, 1.0), 9, 0)
            .unwrap();

        let stats = world.stats();
        assert_eq!(stats.plants, 1);
        assert_eq!(stats.herbivores, 1);
        assert_eq!(stats.carnivores, 1);
        assert_eq!(stats.total(), world.organism_count());

        world.update();
        world.update();
        assert_eq!(world.totals().tick, 2);
    }
}
