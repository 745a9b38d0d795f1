//! Viewport offset into the world, recomputed every frame from the player.

use crate::geom::Vec2;
use crate::world::TileMap;

#[derive(Clone, Copy, Debug, Default, PartialEq)]
pub struct Camera {
    /// Top-left corner of the viewport in world units.
    pub x: f64,
    pub y: f64,
}

/// Inclusive tile range to draw.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct TileRange {
    pub cols: (usize, usize),
    pub rows: (usize, usize),
}

impl Camera {
    /// Center on `target`, then clamp so the viewport stays inside `world`.
    /// `view` and `world` are sizes in world units. On an axis where the world
    /// is smaller than the view the offset is pinned to 0.
    pub fn follow(target: Vec2, view: Vec2, world: Vec2) -> Self {
        Self {
            x: clamp_axis(target.x - view.x / 2.0, view.x, world.x),
            y: clamp_axis(target.y - view.y / 2.0, view.y, world.y),
        }
    }

    /// World position to screen pixels.
    pub fn world_to_screen(&self, pos: Vec2, tile_size: f64) -> (f64, f64) {
        ((pos.x - self.x) * tile_size, (pos.y - self.y) * tile_size)
    }

    /// Screen pixels (e.g. a click on the canvas) back to a world position.
    pub fn screen_to_world(&self, sx: f64, sy: f64, tile_size: f64) -> Vec2 {
        Vec2::new(self.x + sx / tile_size, self.y + sy / tile_size)
    }

    /// Whether `pos` is within the view, widened by `margin` world units.
    pub fn is_visible(&self, pos: Vec2, view: Vec2, margin: f64) -> bool {
        pos.x > self.x - margin
            && pos.x < self.x + view.x + margin
            && pos.y > self.y - margin
            && pos.y < self.y + view.y + margin
    }

    /// Tiles overlapping the view plus one tile of margin, clipped to the map.
    /// `None` when the map is empty.
    pub fn visible_tiles(&self, view: Vec2, map: &TileMap) -> Option<TileRange> {
        if map.width() == 0 || map.height() == 0 {
            return None;
        }
        let span = |start: f64, len: f64, max: usize| {
            let lo = (start.floor() - 1.0).max(0.0) as usize;
            let hi = (((start + len).ceil() + 1.0).max(0.0) as usize).min(max - 1);
            (lo.min(max - 1), hi)
        };
        Some(TileRange {
            cols: span(self.x, view.x, map.width()),
            rows: span(self.y, view.y, map.height()),
        })
    }
}

fn clamp_axis(v: f64, view: f64, world: f64) -> f64 {
    let max = (world - view).max(0.0);
    v.clamp(0.0, max)
}
