//! The walking player and its collision against the tile map.

use crate::geom::Vec2;
use crate::world::TileMap;

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum Facing {
    Up,
    #[default]
    Down,
    Left,
    Right,
}

#[derive(Clone, Debug, PartialEq)]
pub struct Player {
    pub pos: Vec2,
    pub facing: Facing,
    /// Tiles per second.
    pub speed: f64,
    // Health is shown on the HUD only; nothing damages the player.
    pub health: u32,
    pub max_health: u32,
}

impl Player {
    pub fn new(pos: Vec2, speed: f64) -> Self {
        Self { pos, facing: Facing::Down, speed, health: 10, max_health: 10 }
    }

    /// Walk for `dt` seconds along `axes` (each component in {-1, 0, 1}).
    ///
    /// Diagonals are normalized. Each axis is resolved on its own so the
    /// player slides along walls; a component is kept only if it ends on a
    /// passable tile inside the map. Returns whether the player moved.
    pub fn step(&mut self, dt: f64, axes: Vec2, map: &TileMap) -> bool {
        if axes == Vec2::ZERO || dt <= 0.0 {
            return false;
        }
        self.face(axes);
        let delta = axes.normalized() * (self.speed * dt);
        let mut moved = false;

        let try_x = Vec2::new(self.pos.x + delta.x, self.pos.y);
        if delta.x != 0.0 && map.is_passable(try_x) {
            self.pos = try_x;
            moved = true;
        }
        let try_y = Vec2::new(self.pos.x, self.pos.y + delta.y);
        if delta.y != 0.0 && map.is_passable(try_y) {
            self.pos = try_y;
            moved = true;
        }
        moved
    }

    // Vertical input wins when both axes are held.
    fn face(&mut self, axes: Vec2) {
        self.facing = if axes.y < 0.0 {
            Facing::Up
        } else if axes.y > 0.0 {
            Facing::Down
        } else if axes.x < 0.0 {
            Facing::Left
        } else {
            Facing::Right
        };
    }
}
