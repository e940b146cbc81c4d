use std::collections::BTreeMap;
use std::fmt;

use tileview_assets::{VoxelFill, VoxelModelDefinition};
use tileview_common::GridPos;
use tileview_kernel::{HeightRange, World};

/// World inspector for developer tooling.
///
/// Read-only queries against a loaded world for debugging and CLI output.
pub struct WorldInspector;

impl WorldInspector {
    pub fn summary(world: &World) -> WorldSummary {
        let mut tiles_by_kind = BTreeMap::new();
        for tile in world.tiles() {
            *tiles_by_kind.entry(tile.kind.to_string()).or_insert(0) += 1;
        }
        let mut buildings_by_type = BTreeMap::new();
        for building in world.buildings() {
            *buildings_by_type.entry(building.kind.clone()).or_insert(0) += 1;
        }
        WorldSummary {
            resolution: world.resolution(),
            tile_count: world.tiles().len(),
            tiles_by_kind,
            height_range: world.height_range(),
            building_count: world.buildings().len(),
            buildings_by_type,
            fingerprint: world.fingerprint(),
        }
    }

    pub fn inspect_tile(world: &World, x: i32, y: i32) -> Option<TileInfo> {
        let tile = world.tile_at(x, y)?;
        Some(TileInfo {
            pos: tile.pos(),
            kind: tile.kind.to_string(),
            height: tile.height,
            relative_height: world.relative_height(tile),
            building: world.building_on(tile).map(|b| b.kind.clone()),
        })
    }

    pub fn model(model: &VoxelModelDefinition) -> ModelSummary {
        let textures = model
            .voxels
            .iter()
            .filter(|d| matches!(d.fill, VoxelFill::Texture(_)))
            .count();
        ModelSummary {
            name: model.name.clone(),
            descriptors: model.voxels.len(),
            textured_descriptors: textures,
            voxels: model.voxel_count(),
            extent: model.extent(),
            colors: model.colors.keys().cloned().collect(),
        }
    }
}

#[derive(Debug, Clone)]
pub struct WorldSummary {
    pub resolution: u32,
    pub tile_count: usize,
    pub tiles_by_kind: BTreeMap<String, usize>,
    pub height_range: Option<HeightRange>,
    pub building_count: usize,
    pub buildings_by_type: BTreeMap<String, usize>,
    pub fingerprint: u64,
}

impl fmt::Display for WorldSummary {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(
            f,
            "World: resolution={} tiles={} buildings={} fingerprint={:016x}",
            self.resolution, self.tile_count, self.building_count, self.fingerprint
        )?;
        match self.height_range {
            Some(r) if r.is_degenerate() => writeln!(f, "  height: flat at {:.3}", r.min)?,
            Some(r) => writeln!(f, "  height: {:.3}..{:.3}", r.min, r.max)?,
            None => writeln!(f, "  height: n/a")?,
        }
        for (kind, count) in &self.tiles_by_kind {
            writeln!(f, "  {kind}: {count}")?;
        }
        for (kind, count) in &self.buildings_by_type {
            writeln!(f, "  building {kind}: {count}")?;
        }
        Ok(())
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct TileInfo {
    pub pos: GridPos,
    pub kind: String,
    pub height: f32,
    pub relative_height: f32,
    pub building: Option<String>,
}

impl fmt::Display for TileInfo {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "Tile ({}) {} height={:.3} relative={:.3}",
            self.pos, self.kind, self.height, self.relative_height
        )?;
        if let Some(b) = &self.building {
            write!(f, " building={b}")?;
        }
        Ok(())
    }
}

#[derive(Debug, Clone)]
pub struct ModelSummary {
    pub name: String,
    pub descriptors: usize,
    pub textured_descriptors: usize,
    pub voxels: usize,
    pub extent: [i32; 3],
    pub colors: Vec<String>,
}

impl fmt::Display for ModelSummary {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "Model {} descriptors={} (textured {}) voxels={} extent={}x{}x{} colors=[{}]",
            self.name,
            self.descriptors,
            self.textured_descriptors,
            self.voxels,
            self.extent[0],
            self.extent[1],
            self.extent[2],
            self.colors.join(", ")
        )
    }
}
