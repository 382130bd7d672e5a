//! Seeded battlefield generation and tank anchor layout.

use rand::Rng;
use rand_chacha::ChaCha8Rng;
use tank_battle_core::CellCoord;

use crate::terrain::{rasterize_line, TerrainGrid};

/// Horizontal distance between neighbouring ridge control points.
const RIDGE_SPACING: u32 = 16;

/// Generates a hilly battlefield: a ridge of random control points joined by
/// rasterized lines, with every line cell filled down to the bottom row.
#[must_use]
pub fn generate_terrain(width: u32, height: u32, rng: &mut ChaCha8Rng) -> TerrainGrid {
    let mut terrain = TerrainGrid::empty(width, height);
    if width == 0 || height == 0 {
        return terrain;
    }

    let highest = height / 3;
    let lowest = height.saturating_sub(1 + height / 8).max(highest);

    let mut anchors: Vec<CellCoord> = (0..width)
        .step_by(RIDGE_SPACING as usize)
        .map(|column| CellCoord::new(column, rng.gen_range(highest..=lowest)))
        .collect();
    if anchors.last().map(CellCoord::column) != Some(width - 1) {
        anchors.push(CellCoord::new(width - 1, rng.gen_range(highest..=lowest)));
    }

    for pair in anchors.windows(2) {
        for cell in rasterize_line(pair[0], pair[1]) {
            terrain.fill_down(cell);
        }
    }
    if let [only] = anchors.as_slice() {
        terrain.fill_down(*only);
    }
    terrain
}

/// Anchor columns for `players` tanks spread evenly across the battlefield.
///
/// Each tank is centred in an equal slice of the width; the returned value is
/// the left column of a footprint `tank_width` cells wide.
#[must_use]
pub fn player_positions(width: u32, players: usize, tank_width: u32) -> Vec<u32> {
    if players == 0 {
        return Vec::new();
    }
    let slice = width as f32 / players as f32;
    (1..=players)
        .map(|index| {
            let centre = slice * index as f32 - slice / 2.0;
            let left = (centre - tank_width as f32 / 2.0).round().max(0.0) as u32;
            left.min(width.saturating_sub(tank_width))
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::SeedableRng;
    use tank_battle_core::{CellRectSize, BATTLEFIELD_HEIGHT, BATTLEFIELD_WIDTH};

    #[test]
    fn generated_terrain_is_settled_and_leaves_headroom() {
        let mut rng = ChaCha8Rng::seed_from_u64(7);
        let terrain = generate_terrain(BATTLEFIELD_WIDTH, BATTLEFIELD_HEIGHT, &mut rng);
        assert!(terrain.is_settled());
        let tank = CellRectSize::new(4, 3);
        for column in 0..=BATTLEFIELD_WIDTH - tank.width() {
            let row = terrain
                .tank_y_position(column, tank)
                .expect("every column has a landing spot");
            assert!(row >= BATTLEFIELD_HEIGHT / 3 - tank.height());
        }
        for column in 0..BATTLEFIELD_WIDTH {
            assert!(terrain.terrain_at(column, BATTLEFIELD_HEIGHT - 1));
            assert!(!terrain.terrain_at(column, 0));
        }
    }

    #[test]
    fn generation_is_reproducible_from_seed() {
        let first = generate_terrain(64, 48, &mut ChaCha8Rng::seed_from_u64(11));
        let second = generate_terrain(64, 48, &mut ChaCha8Rng::seed_from_u64(11));
        let other = generate_terrain(64, 48, &mut ChaCha8Rng::seed_from_u64(12));
        assert_eq!(first, second);
        assert_ne!(first, other);
    }

    #[test]
    fn player_positions_spread_evenly() {
        assert_eq!(player_positions(160, 2, 4), vec![38, 118]);
        assert_eq!(player_positions(160, 4, 4), vec![18, 58, 98, 138]);
        let positions = player_positions(20, 3, 4);
        assert!(positions.windows(2).all(|pair| pair[0] + 4 <= pair[1]));
    }
}
