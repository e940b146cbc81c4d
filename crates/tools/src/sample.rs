use tileview_common::Seed;
use tileview_common::variant::{anti_exponential_distribution, random, random_int, random_with_bias};
use tileview_kernel::{Building, Tile, TileKind, World, WorldError};

fn kind_for(height: f64) -> TileKind {
    match height {
        h if h < 0.25 => TileKind::Water,
        h if h < 0.4 => TileKind::Swamp,
        h if h < 0.55 => TileKind::Valley,
        h if h < 0.7 => TileKind::Forest,
        h if h < 0.85 => TileKind::Desert,
        _ => TileKind::Volcano,
    }
}

/// A deterministic demo world for tooling and tests, with heights rising
/// towards the top rows and a sprinkling of houses on valley and forest tiles.
pub fn sample_world(resolution: u32) -> Result<World, WorldError> {
    let n = resolution as i32;
    let falloff = anti_exponential_distribution(resolution as usize, 0.9, 0.02, Seed(resolution as f64));

    let mut tiles = Vec::with_capacity((resolution * resolution) as usize);
    let mut buildings = Vec::new();
    for y in 0..n {
        let row_bias = falloff.get(y as usize).copied().unwrap_or(0.0);
        for x in 0..n {
            let seed = Seed(f64::from(x) * 7919.0 + f64::from(y) * 104_729.0 + 0.5);
            let height = random_with_bias(0.0, 1.0, seed, row_bias, 0.6);
            let kind = kind_for(height);
            if matches!(kind, TileKind::Valley | TileKind::Forest)
                && random_int(0, 8, Seed(seed.0 + 1.0)) == 0
            {
                let size = random(1.0, 3.0, Seed(seed.0 + 2.0)) as f32;
                buildings.push(Building::new(x, y, size, "house"));
            }
            tiles.push(Tile::new(x, y, kind, height as f32));
        }
    }
    tracing::debug!(resolution, buildings = buildings.len(), "sample world built");
    World::new(resolution, tiles, buildings)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn fills_the_grid() {
        let world = sample_world(12).unwrap();
        assert_eq!(world.tiles().len(), 144);
        for y in 0..12 {
            for x in 0..12 {
                assert!(world.tile_at(x, y).is_some());
            }
        }
    }

    #[test]
    fn is_deterministic() {
        let a = sample_world(16).unwrap();
        let b = sample_world(16).unwrap();
        assert_eq!(a.fingerprint(), b.fingerprint());
    }

    #[test]
    fn buildings_sit_on_valley_or_forest() {
        let world = sample_world(30).unwrap();
        for b in world.buildings() {
            let tile = world.tile_at(b.coordinates.x, b.coordinates.y).unwrap();
            assert!(matches!(tile.kind, TileKind::Valley | TileKind::Forest));
        }
    }

    #[test]
    fn zero_resolution_is_rejected() {
        assert!(matches!(sample_world(0), Err(WorldError::ZeroResolution)));
    }
}
