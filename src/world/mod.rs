//! Tile world: terrain tags on a fixed grid.
//!
//! A map is produced once per game from a [`MapSource`] and never changes
//! afterwards. World coordinates are measured in tiles; the tile at column
//! `c`, row `r` covers `[c, c+1) × [r, r+1)`.

use rand::Rng;
use serde::{Deserialize, Serialize};

use crate::error::MapError;
use crate::geom::Vec2;

mod crossroads;
mod noise;

pub use noise::Perlin;

/// Largest map, in tiles, that a game will build.
pub const MAX_TILES: usize = 1 << 20;

/// Number of tiles in a `width` x `height` map, or `TooLarge` when it would
/// exceed [`MAX_TILES`].
pub fn tile_count(width: usize, height: usize) -> Result<usize, MapError> {
    width
        .checked_mul(height)
        .filter(|n| *n <= MAX_TILES)
        .ok_or(MapError::TooLarge { width, height })
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Terrain {
    Grass,
    Water,
    Sand,
    Forest,
    Tree,
    Road,
    Mountain,
}

impl Terrain {
    /// Terrain the player cannot walk onto.
    pub fn is_blocking(self) -> bool {
        matches!(self, Terrain::Water | Terrain::Tree | Terrain::Mountain)
    }

    /// Glyph used by fixed layouts.
    pub fn glyph(self) -> char {
        match self {
            Terrain::Grass => '.',
            Terrain::Water => '~',
            Terrain::Sand => ':',
            Terrain::Forest => 'f',
            Terrain::Tree => 'T',
            Terrain::Road => '=',
            Terrain::Mountain => '^',
        }
    }

    pub fn from_glyph(c: char) -> Option<Terrain> {
        Some(match c {
            '.' => Terrain::Grass,
            '~' => Terrain::Water,
            ':' => Terrain::Sand,
            'f' => Terrain::Forest,
            'T' => Terrain::Tree,
            '=' => Terrain::Road,
            '^' => Terrain::Mountain,
            _ => return None,
        })
    }
}

/// How the terrain of a game is produced.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "lowercase")]
pub enum MapSource {
    /// Gradient-noise terrain banded by height: water, sand, grass, forest.
    Noise {
        #[serde(default = "default_noise_scale")]
        scale: f64,
        #[serde(default = "default_water_below")]
        water_below: f64,
        #[serde(default)]
        sand_below: f64,
        #[serde(default = "default_grass_below")]
        grass_below: f64,
    },
    /// Grass field with corner ponds, a tree border and a road cross.
    Crossroads,
    /// Fixed rows of terrain glyphs (see [`Terrain::from_glyph`]).
    Layout { rows: Vec<String> },
}

fn default_noise_scale() -> f64 {
    10.0
}
fn default_water_below() -> f64 {
    -0.3
}
fn default_grass_below() -> f64 {
    0.5
}

impl Default for MapSource {
    fn default() -> Self {
        MapSource::Noise {
            scale: default_noise_scale(),
            water_below: default_water_below(),
            sand_below: 0.0,
            grass_below: default_grass_below(),
        }
    }
}

#[derive(Clone, Debug, PartialEq)]
pub struct TileMap {
    width: usize,
    height: usize,
    tiles: Vec<Terrain>, // row-major, len = width * height
}

impl TileMap {
    pub fn filled(width: usize, height: usize, terrain: Terrain) -> Result<Self, MapError> {
        let count = tile_count(width, height)?;
        Ok(Self { width, height, tiles: vec![terrain; count] })
    }

    /// Build the map for `source`. Generated sources use the requested size;
    /// a fixed layout brings its own.
    pub fn generate<R: Rng + ?Sized>(
        source: &MapSource,
        width: usize,
        height: usize,
        rng: &mut R,
    ) -> Result<Self, MapError> {
        let mut map = match source {
            MapSource::Noise { scale, water_below, sand_below, grass_below } => {
                let perlin = Perlin::new(rng);
                let scale = if *scale > 0.0 { *scale } else { default_noise_scale() };
                let mut map = TileMap::filled(width, height, Terrain::Grass)?;
                for row in 0..height {
                    for col in 0..width {
                        let n = perlin.noise(col as f64 / scale, row as f64 / scale);
                        let t = if n < *water_below {
                            Terrain::Water
                        } else if n < *sand_below {
                            Terrain::Sand
                        } else if n < *grass_below {
                            Terrain::Grass
                        } else {
                            Terrain::Forest
                        };
                        map.set(col, row, t);
                    }
                }
                map
            }
            MapSource::Crossroads => crossroads::generate(width, height, rng)?,
            MapSource::Layout { rows } => TileMap::from_layout(rows)?,
        };
        map.ensure_walkable();
        Ok(map)
    }

    pub fn from_layout<S: AsRef<str>>(rows: &[S]) -> Result<Self, MapError> {
        let first = rows.first().ok_or(MapError::Empty)?;
        let width = first.as_ref().chars().count();
        if width == 0 {
            return Err(MapError::Empty);
        }
        let mut tiles = Vec::with_capacity(tile_count(width, rows.len())?);
        for (row, line) in rows.iter().enumerate() {
            let line = line.as_ref();
            let found = line.chars().count();
            if found != width {
                return Err(MapError::Ragged { row, expected: width, found });
            }
            for (col, glyph) in line.chars().enumerate() {
                tiles.push(Terrain::from_glyph(glyph).ok_or(MapError::UnknownGlyph { glyph, row, col })?);
            }
        }
        Ok(Self { width, height: rows.len(), tiles })
    }

    pub fn width(&self) -> usize {
        self.width
    }

    pub fn height(&self) -> usize {
        self.height
    }

    /// Size of the world in tile units.
    pub fn size(&self) -> Vec2 {
        Vec2::new(self.width as f64, self.height as f64)
    }

    pub fn get(&self, col: i64, row: i64) -> Option<Terrain> {
        if col < 0 || row < 0 || col as usize >= self.width || row as usize >= self.height {
            return None;
        }
        Some(self.tiles[row as usize * self.width + col as usize])
    }

    pub(crate) fn set(&mut self, col: usize, row: usize, terrain: Terrain) {
        let idx = row * self.width + col;
        self.tiles[idx] = terrain;
    }

    pub fn terrain_at(&self, pos: Vec2) -> Option<Terrain> {
        let (col, row) = pos.tile();
        self.get(col, row)
    }

    /// True when `pos` lies inside the map on a non-blocking tile.
    pub fn is_passable(&self, pos: Vec2) -> bool {
        pos.x >= 0.0
            && pos.y >= 0.0
            && pos.x < self.width as f64
            && pos.y < self.height as f64
            && self.terrain_at(pos).is_some_and(|t| !t.is_blocking())
    }

    /// Closest passable tile to `(col, row)` by expanding square rings.
    pub fn nearest_passable(&self, col: i64, row: i64) -> Option<(usize, usize)> {
        let max_ring = self.width.max(self.height) as i64;
        for ring in 0..=max_ring {
            for dy in -ring..=ring {
                for dx in -ring..=ring {
                    if dx.abs() != ring && dy.abs() != ring {
                        continue;
                    }
                    let (c, r) = (col + dx, row + dy);
                    if self.get(c, r).is_some_and(|t| !t.is_blocking()) {
                        return Some((c as usize, r as usize));
                    }
                }
            }
        }
        None
    }

    /// Center of the nearest passable tile to `pos`.
    pub fn snap_to_passable(&self, pos: Vec2) -> Option<Vec2> {
        if self.is_passable(pos) {
            return Some(pos);
        }
        let (col, row) = pos.tile();
        self.nearest_passable(col, row)
            .map(|(c, r)| Vec2::new(c as f64 + 0.5, r as f64 + 0.5))
    }

    /// Iterate `(col, row, terrain)` in row-major order.
    pub fn iter(&self) -> impl Iterator<Item = (usize, usize, Terrain)> + '_ {
        self.tiles
            .iter()
            .enumerate()
            .map(move |(i, t)| (i % self.width, i / self.width, *t))
    }

    // A world with nowhere to stand would leave the player stuck inside a
    // wall; open up the center tile in that case.
    fn ensure_walkable(&mut self) {
        if self.width == 0 || self.height == 0 {
            return;
        }
        if self.tiles.iter().all(|t| t.is_blocking()) {
            log::warn!("generated map has no passable tiles; clearing the center");
            self.set(self.width / 2, self.height / 2, Terrain::Grass);
        }
    }
}
