// Crossroads map: grass base, water ponds in the four 3x3 corners, trees on
// the border and a road cross through the center row and column. Roads never
// replace water.
use rand::Rng;

use super::{Terrain, TileMap};
use crate::error::MapError;

const POND_CHANCE: f64 = 0.25;
const BORDER_TREE_CHANCE: f64 = 0.5;

pub(super) fn generate<R: Rng + ?Sized>(width: usize, height: usize, rng: &mut R) -> Result<TileMap, MapError> {
    let mut map = TileMap::filled(width, height, Terrain::Grass)?;
    let (mid_col, mid_row) = (width / 2, height / 2);
    for row in 0..height {
        for col in 0..width {
            let mut tile = Terrain::Grass;
            if in_corner(col, row, width, height) && rng.gen_bool(POND_CHANCE) {
                tile = Terrain::Water;
            }
            let border = row == 0 || col == 0 || row + 1 == height || col + 1 == width;
            if border && rng.gen_bool(BORDER_TREE_CHANCE) {
                tile = Terrain::Tree;
            }
            if (col == mid_col || row == mid_row) && tile != Terrain::Water {
                tile = Terrain::Road;
            }
            map.set(col, row, tile);
        }
    }
    Ok(map)
}

fn in_corner(col: usize, row: usize, width: usize, height: usize) -> bool {
    let near_top = row < 3;
    let near_bottom = row + 3 >= height;
    let near_left = col < 3;
    let near_right = col + 3 >= width;
    (near_top || near_bottom) && (near_left || near_right)
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::SeedableRng;
    use rand::rngs::SmallRng;

    #[test]
    fn center_cross_is_road_unless_water() {
        for seed in 0..20 {
            let map = generate(15, 10, &mut SmallRng::seed_from_u64(seed)).unwrap();
            for (col, row, t) in map.iter() {
                if col == 7 || row == 5 {
                    assert!(matches!(t, Terrain::Road | Terrain::Water), "({col},{row}) = {t:?}");
                }
                if t == Terrain::Water {
                    assert!(in_corner(col, row, 15, 10));
                }
            }
        }
    }
}
