//! Bounded 2D grid of tiles.

use crate::tile::{Occupant, Tile};
use eco_core::{Error, OrganismKind, Position, Result};
use serde::{Deserialize, Serialize};

/// A fixed-size rectangular grid, stored row-major
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Grid {
    width: i32,
    height: i32,
    tiles: Vec<Tile>,
}

impl Grid {
    pub fn new(width: i32, height: i32) -> Result<Self> {
        if width <= 0 || height <= 0 {
            return Err(Error::InvalidDimensions { width, height });
        }

        let tiles = (0..height)
            .flat_map(|y| (0..width).map(move |x| Tile::new(Position::new(x, y))))
            .collect();

        Ok(Self {
            width,
            height,
            tiles,
        })
    }

    pub fn width(&self) -> i32 {
        self.width
    }

    pub fn height(&self) -> i32 {
        self.height
    }

    pub fn is_in_bounds(&self, x: i32, y: i32) -> bool {
        x >= 0 && x < self.width && y >= 0 && y < self.height
    }

    pub fn contains(&self, pos: Position) -> bool {
        self.is_in_bounds(pos.x, pos.y)
    }

    /// Get tile at coordinates
    pub fn tile(&self, x: i32, y: i32) -> Result<&Tile> {
        let index = self.index_of(x, y)?;
        Ok(&self.tiles[index])
    }

    /// Get tile at position
    pub fn get(&self, pos: Position) -> Result<&Tile> {
        self.tile(pos.x, pos.y)
    }

    pub(crate) fn get_mut(&mut self, pos: Position) -> Result<&mut Tile> {
        let index = self.index_of(pos.x, pos.y)?;
        Ok(&mut self.tiles[index])
    }

    /// Nearest empty tile by Euclidean distance; ties go to the first tile in row-major order.
    pub fn find_closest_empty_tile(&self, pos: Position) -> Result<&Tile> {
        let mut best: Option<(&Tile, i64)> = None;

        for tile in self.tiles.iter().filter(|tile| tile.is_empty()) {
            let distance = pos.distance_squared(&tile.position());
            if best.map_or(true, |(_, d)| distance < d) {
                best = Some((tile, distance));
            }
        }

        best.map(|(tile, _)| tile).ok_or(Error::NoEmptyTile)
    }

    /// Nearest organism of `kind` by Euclidean distance, same tie-break as
    /// [`Grid::find_closest_empty_tile`].
    pub fn find_closest_organism(&self, pos: Position, kind: OrganismKind) -> Result<Occupant> {
        let mut best: Option<(Occupant, i64)> = None;

        for tile in &self.tiles {
            let Some(occupant) = tile.occupant() else {
                continue;
            };
            if occupant.kind != kind {
                continue;
            }
            let distance = pos.distance_squared(&tile.position());
            if best.map_or(true, |(_, d)| distance < d) {
                best = Some((occupant, distance));
            }
        }

        best.map(|(occupant, _)| occupant)
            .ok_or_else(|| Error::NotFound(format!("no {} on the grid", kind)))
    }

    /// In-bounds positions within Chebyshev `radius` of `pos`, excluding `pos`,
    /// in row-major order.
    pub fn neighbors(&self, pos: Position, radius: i32) -> Vec<Position> {
        let mut neighbors = Vec::new();

        let radius = radius.max(0);
        let min_x = pos.x.saturating_sub(radius).max(0);
        let max_x = pos.x.saturating_add(radius).min(self.width - 1);
        let min_y = pos.y.saturating_sub(radius).max(0);
        let max_y = pos.y.saturating_add(radius).min(self.height - 1);

        for y in min_y..=max_y {
            for x in min_x..=max_x {
                let neighbor_pos = Position::new(x, y);
                if neighbor_pos != pos {
                    neighbors.push(neighbor_pos);
                }
            }
        }

        neighbors
    }

    /// Like [`Grid::neighbors`], keeping only empty tiles
    pub fn empty_neighbors(&self, pos: Position, radius: i32) -> Vec<Position> {
        self.neighbors(pos, radius)
            .into_iter()
            .filter(|p| self.get(*p).map_or(false, Tile::is_empty))
            .collect()
    }

    pub fn occupied_count(&self) -> usize {
        self.tiles.iter().filter(|tile| !tile.is_empty()).count()
    }

    /// Iterator over all tiles in row-major order
    pub fn tiles(&self) -> impl Iterator<Item = &Tile> + '_ {
        self.tiles.iter()
    }

    /// Iterator over all positions
    pub fn positions(&self) -> impl Iterator<Item = Position> + '_ {
        self.tiles.iter().map(Tile::position)
    }

    fn index_of(&self, x: i32, y: i32) -> Result<usize> {
        if !self.is_in_bounds(x, y) {
            return Err(Error::OutOfBounds { x, y });
        }
        Ok((y * self.width + x) as usize)
    }
}
