use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::fmt;
use tileview_common::{Color, GridPos};

/// Terrain type of a tile. Unknown generator types are kept by name.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(from = "String", into = "String")]
pub enum TileKind {
    Water,
    Forest,
    Desert,
    Swamp,
    Valley,
    Volcano,
    Other(String),
}

impl TileKind {
    pub fn as_str(&self) -> &str {
        match self {
            Self::Water => "water",
            Self::Forest => "forest",
            Self::Desert => "desert",
            Self::Swamp => "swamp",
            Self::Valley => "valley",
            Self::Volcano => "volcano",
            Self::Other(name) => name,
        }
    }
}

impl From<String> for TileKind {
    fn from(name: String) -> Self {
        match name.as_str() {
            "water" => Self::Water,
            "forest" => Self::Forest,
            "desert" => Self::Desert,
            "swamp" => Self::Swamp,
            "valley" => Self::Valley,
            "volcano" => Self::Volcano,
            _ => Self::Other(name),
        }
    }
}

impl From<&str> for TileKind {
    fn from(name: &str) -> Self {
        Self::from(name.to_string())
    }
}

impl From<TileKind> for String {
    fn from(kind: TileKind) -> Self {
        kind.as_str().to_string()
    }
}

impl fmt::Display for TileKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

fn default_tile_size() -> f32 {
    1.0
}

/// One cell of the world grid.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Tile {
    pub x: i32,
    pub y: i32,
    #[serde(rename = "type")]
    pub kind: TileKind,
    #[serde(default)]
    pub height: f32,
    /// Fallback fill when the tile kind has no texture.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub color: Option<Color>,
    /// Side length in tiles.
    #[serde(default = "default_tile_size")]
    pub size: f32,
}

impl Tile {
    pub fn new(x: i32, y: i32, kind: impl Into<TileKind>, height: f32) -> Self {
        Self {
            x,
            y,
            kind: kind.into(),
            height,
            color: None,
            size: default_tile_size(),
        }
    }

    pub fn pos(&self) -> GridPos {
        GridPos::new(self.x, self.y)
    }

    /// Center of the grid cell, in tile units.
    pub fn center(&self) -> (f32, f32) {
        (self.x as f32 + 0.5, self.y as f32 + 0.5)
    }
}

/// A point-placed building, tied to the tile with equal coordinates.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Building {
    pub coordinates: GridPos,
    pub size: f32,
    #[serde(rename = "type")]
    pub kind: String,
}

impl Building {
    pub fn new(x: i32, y: i32, size: f32, kind: impl Into<String>) -> Self {
        Self {
            coordinates: GridPos::new(x, y),
            size,
            kind: kind.into(),
        }
    }
}

/// Errors from constructing a world.
#[derive(Debug, thiserror::Error)]
pub enum WorldError {
    #[error("world resolution must be positive")]
    ZeroResolution,
    #[error("tile ({0}) lies outside the {1}x{1} grid")]
    OutOfGrid(GridPos, u32),
    #[error("duplicate tile at ({0})")]
    DuplicateTile(GridPos),
    #[error("building of type {kind:?} at ({at}) has no tile")]
    OrphanBuilding { at: GridPos, kind: String },
}

/// Minimum and maximum tile height across a world.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct HeightRange {
    pub min: f32,
    pub max: f32,
}

impl HeightRange {
    /// Value used when every tile has the same height.
    pub const NEUTRAL: f32 = 0.5;

    /// Map a height into `[0, 1]`.
    pub fn normalize(&self, height: f32) -> f32 {
        let span = self.max - self.min;
        if span.abs() <= f32::EPSILON {
            return Self::NEUTRAL;
        }
        ((height - self.min) / span).clamp(0.0, 1.0)
    }

    pub fn is_degenerate(&self) -> bool {
        (self.max - self.min).abs() <= f32::EPSILON
    }
}

#[derive(Serialize, Deserialize)]
struct WorldData {
    resolution: u32,
    tiles: Vec<Tile>,
    #[serde(default)]
    buildings: Vec<Building>,
}

/// A finished world as delivered by the generator.
///
/// Tiles and buildings are indexed by coordinate at construction so that
/// hit-testing and building lookup are constant time.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(try_from = "WorldData", into = "WorldData")]
pub struct World {
    resolution: u32,
    tiles: Vec<Tile>,
    buildings: Vec<Building>,
    tile_index: HashMap<GridPos, usize>,
    building_index: HashMap<GridPos, usize>,
    height_range: Option<HeightRange>,
}

impl World {
    /// Validate and index a world.
    pub fn new(resolution: u32, tiles: Vec<Tile>, buildings: Vec<Building>) -> Result<Self, WorldError> {
        if resolution == 0 {
            return Err(WorldError::ZeroResolution);
        }
        let bound = i64::from(resolution);

        let mut tile_index = HashMap::with_capacity(tiles.len());
        for (i, tile) in tiles.iter().enumerate() {
            let pos = tile.pos();
            let inside = (0..bound).contains(&i64::from(pos.x)) && (0..bound).contains(&i64::from(pos.y));
            if !inside {
                return Err(WorldError::OutOfGrid(pos, resolution));
            }
            if tile_index.insert(pos, i).is_some() {
                return Err(WorldError::DuplicateTile(pos));
            }
        }

        let mut building_index = HashMap::with_capacity(buildings.len());
        for (i, building) in buildings.iter().enumerate() {
            if !tile_index.contains_key(&building.coordinates) {
                return Err(WorldError::OrphanBuilding {
                    at: building.coordinates,
                    kind: building.kind.clone(),
                });
            }
            // First building on a tile wins, matching a front-to-back search.
            building_index.entry(building.coordinates).or_insert(i);
        }

        let height_range = tiles.iter().map(|t| t.height).fold(None::<HeightRange>, |acc, h| match acc {
            None => Some(HeightRange { min: h, max: h }),
            Some(r) => Some(HeightRange {
                min: r.min.min(h),
                max: r.max.max(h),
            }),
        });

        tracing::debug!(
            resolution,
            tiles = tiles.len(),
            buildings = buildings.len(),
            "world indexed"
        );

        Ok(Self {
            resolution,
            tiles,
            buildings,
            tile_index,
            building_index,
            height_range,
        })
    }

    /// Grid width and height in tiles.
    pub fn resolution(&self) -> u32 {
        self.resolution
    }

    pub fn tiles(&self) -> &[Tile] {
        &self.tiles
    }

    pub fn buildings(&self) -> &[Building] {
        &self.buildings
    }

    /// Tile occupying grid cell `(x, y)`, if any.
    pub fn tile_at(&self, x: i32, y: i32) -> Option<&Tile> {
        self.tile_index
            .get(&GridPos::new(x, y))
            .map(|&i| &self.tiles[i])
    }

    /// Building standing on `tile`, if any.
    pub fn building_on(&self, tile: &Tile) -> Option<&Building> {
        self.building_at(tile.pos())
    }

    pub fn building_at(&self, pos: GridPos) -> Option<&Building> {
        self.building_index.get(&pos).map(|&i| &self.buildings[i])
    }

    /// Height range over all tiles; `None` for a world without tiles.
    pub fn height_range(&self) -> Option<HeightRange> {
        self.height_range
    }

    /// Normalized `[0, 1]` height of a tile, neutral when the range is degenerate.
    pub fn relative_height(&self, tile: &Tile) -> f32 {
        self.height_range
            .map_or(HeightRange::NEUTRAL, |r| r.normalize(tile.height))
    }

    /// Largest building size, used to scale buildings relative to each other.
    pub fn max_building_size(&self) -> Option<f32> {
        self.buildings
            .iter()
            .map(|b| b.size)
            .fold(None::<f32>, |acc, s| Some(acc.map_or(s, |m| m.max(s))))
    }

    /// Deterministic hash of the world content, used to key render caches.
    pub fn fingerprint(&self) -> u64 {
        let mut h: u64 = 0xcbf2_9ce4_8422_2325; // FNV offset basis
        let mix = |h: &mut u64, bytes: &[u8]| {
            for &b in bytes {
                *h ^= b as u64;
                *h = h.wrapping_mul(0x0100_0000_01b3);
            }
        };
        mix(&mut h, &self.resolution.to_le_bytes());
        for tile in &self.tiles {
            mix(&mut h, &tile.x.to_le_bytes());
            mix(&mut h, &tile.y.to_le_bytes());
            mix(&mut h, tile.kind.as_str().as_bytes());
            mix(&mut h, &tile.height.to_le_bytes());
            mix(&mut h, &tile.size.to_le_bytes());
            if let Some(c) = tile.color {
                mix(&mut h, &[c.r, c.g, c.b, c.a]);
            }
        }
        for building in &self.buildings {
            mix(&mut h, &building.coordinates.x.to_le_bytes());
            mix(&mut h, &building.coordinates.y.to_le_bytes());
            mix(&mut h, &building.size.to_le_bytes());
            mix(&mut h, building.kind.as_bytes());
        }
        h
    }
}

impl TryFrom<WorldData> for World {
    type Error = WorldError;

    fn try_from(data: WorldData) -> Result<Self, Self::Error> {
        World::new(data.resolution, data.tiles, data.buildings)
    }
}

impl From<World> for WorldData {
    fn from(world: World) -> Self {
        WorldData {
            resolution: world.resolution,
            tiles: world.tiles,
            buildings: world.buildings,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn small_world() -> World {
        let tiles = vec![
            Tile::new(0, 0, "water", 0.0),
            Tile::new(1, 0, "forest", 2.0),
            Tile::new(0, 1, "desert", 4.0),
        ];
        let buildings = vec![Building::new(1, 0, 3.0, "house")];
        World::new(2, tiles, buildings).unwrap()
    }

    #[test]
    fn tile_lookup_by_coordinate() {
        let world = small_world();
        assert_eq!(world.tile_at(1, 0).unwrap().kind, TileKind::Forest);
        assert!(world.tile_at(1, 1).is_none());
        assert!(world.tile_at(-1, 0).is_none());
        assert!(world.tile_at(5, 5).is_none());
    }

    #[test]
    fn building_on_matches_coordinates() {
        let world = small_world();
        let forest = world.tile_at(1, 0).unwrap();
        assert_eq!(world.building_on(forest).unwrap().kind, "house");
        let water = world.tile_at(0, 0).unwrap();
        assert!(world.building_on(water).is_none());
    }

    #[test]
    fn zero_resolution_rejected() {
        assert!(matches!(World::new(0, vec![], vec![]), Err(WorldError::ZeroResolution)));
    }

    #[test]
    fn out_of_grid_tile_rejected() {
        let err = World::new(2, vec![Tile::new(2, 0, "water", 0.0)], vec![]).unwrap_err();
        assert!(matches!(err, WorldError::OutOfGrid(_, 2)));
    }

    #[test]
    fn duplicate_tile_rejected() {
        let tiles = vec![Tile::new(0, 0, "water", 0.0), Tile::new(0, 0, "forest", 1.0)];
        assert!(matches!(World::new(2, tiles, vec![]), Err(WorldError::DuplicateTile(_))));
    }

    #[test]
    fn orphan_building_rejected() {
        let tiles = vec![Tile::new(0, 0, "water", 0.0)];
        let buildings = vec![Building::new(1, 1, 1.0, "house")];
        assert!(matches!(
            World::new(2, tiles, buildings),
            Err(WorldError::OrphanBuilding { .. })
        ));
    }

    #[test]
    fn relative_height_spans_unit_interval() {
        let world = small_world();
        assert_eq!(world.relative_height(world.tile_at(0, 0).unwrap()), 0.0);
        assert_eq!(world.relative_height(world.tile_at(1, 0).unwrap()), 0.5);
        assert_eq!(world.relative_height(world.tile_at(0, 1).unwrap()), 1.0);
    }

    #[test]
    fn degenerate_height_range_is_neutral() {
        let tiles = vec![Tile::new(0, 0, "water", 3.0), Tile::new(1, 0, "water", 3.0)];
        let world = World::new(2, tiles, vec![]).unwrap();
        assert!(world.height_range().unwrap().is_degenerate());
        let h = world.relative_height(world.tile_at(0, 0).unwrap());
        assert_eq!(h, HeightRange::NEUTRAL);
        assert!(h.is_finite());
    }

    #[test]
    fn max_building_size() {
        assert_eq!(small_world().max_building_size(), Some(3.0));
        let empty = World::new(1, vec![], vec![]).unwrap();
        assert_eq!(empty.max_building_size(), None);
    }

    #[test]
    fn unknown_kind_keeps_name() {
        let kind = TileKind::from("tundra");
        assert_eq!(kind, TileKind::Other("tundra".into()));
        assert_eq!(kind.to_string(), "tundra");
    }

    #[test]
    fn deserialize_validates() {
        let json = r##"{
            "resolution": 10,
            "tiles": [{"x": 3, "y": 3, "type": "forest", "height": 0.5, "color": "#00ff00"}],
            "buildings": [{"coordinates": {"x": 3, "y": 3}, "size": 2.0, "type": "house"}]
        }"##;
        let world: World = serde_json::from_str(json).unwrap();
        let tile = world.tile_at(3, 3).unwrap();
        assert_eq!(tile.size, 1.0);
        assert_eq!(tile.color, Some(Color::rgb(0, 255, 0)));
        assert!(world.building_on(tile).is_some());

        let bad = r#"{"resolution": 2, "tiles": [{"x": 9, "y": 0, "type": "water"}]}"#;
        assert!(serde_json::from_str::<World>(bad).is_err());
    }

    #[test]
    fn serde_roundtrip_preserves_fingerprint() {
        let world = small_world();
        let text = serde_json::to_string(&world).unwrap();
        let back: World = serde_json::from_str(&text).unwrap();
        assert_eq!(world.fingerprint(), back.fingerprint());
    }

    #[test]
    fn fingerprint_changes_with_content() {
        let a = small_world();
        let b = World::new(2, vec![Tile::new(0, 0, "water", 0.0)], vec![]).unwrap();
        assert_ne!(a.fingerprint(), b.fingerprint());
    }
}
