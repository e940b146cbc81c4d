//! Full walk of the world: terrain boxes plus model placements.

use std::sync::Arc;

use glam::{Vec2, Vec3};
use tileview_assets::{ModelLibrary, TextureSet, VoxelModelDefinition};
use tileview_common::variant::random;
use tileview_common::{Color, Seed};
use tileview_kernel::{Building, Tile, World};
use tileview_render::{Cube, Fill, Layer, RenderBackend};
use tileview_stream::{ModelId, ModelInstancer, Placement};

use crate::config::DrawConfig;

/// Everything the walk reads.
pub(crate) struct Scene<'a> {
    pub world: &'a World,
    pub textures: &'a TextureSet,
    pub models: &'a ModelLibrary,
    pub config: &'a DrawConfig,
    pub tile_size: f32,
}

/// Counts from one walk.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct WalkStats {
    pub tiles: usize,
    pub buildings: usize,
    pub decorations: usize,
}

impl Scene<'_> {
    fn tile_fill(&self, tile: &Tile) -> Fill {
        match self.textures.resolve(tile.kind.as_str(), Seed::texture(tile.x, tile.y)) {
            Some(texture) => Fill::Texture(texture.clone()),
            None => Fill::Color(tile.color.unwrap_or(Color::NEUTRAL)),
        }
    }

    /// Top surface height of a tile in world render units.
    fn surface(&self, tile: &Tile) -> f32 {
        self.world.relative_height(tile) * self.config.height_scale
    }

    pub fn tile_cube(&self, tile: &Tile) -> Cube {
        let corner = Vec2::new(tile.x as f32, tile.y as f32) * self.tile_size;
        let side = tile.size * self.tile_size;
        Cube {
            min: corner.extend(0.0),
            size: Vec3::new(side, side, self.surface(tile)),
            fill: self.tile_fill(tile),
        }
    }

    /// Model centered on `tile`, `footprint` world units wide, resting on its surface.
    fn placement(&self, tile: &Tile, model: &Arc<VoxelModelDefinition>, footprint: f32) -> Placement {
        let [ex, ey, _] = model.extent();
        let cells = ex.max(ey).max(1) as f32;
        let inset = (self.tile_size - footprint) / 2.0;
        let corner = Vec2::new(tile.x as f32, tile.y as f32) * self.tile_size + Vec2::splat(inset);
        Placement {
            id: ModelId::at(tile.pos()),
            model: Arc::clone(model),
            origin: corner.extend(self.surface(tile)),
            voxel_size: footprint / cells,
        }
    }

    pub fn building_placement(&self, tile: &Tile, building: &Building) -> Option<Placement> {
        let model = self
            .models
            .get(&building.kind)
            .or_else(|| self.models.get(&self.config.building_model))?;
        let max_size = self.world.max_building_size().filter(|m| *m > 0.0).unwrap_or(1.0);
        let footprint = (building.size / max_size).clamp(0.0, 1.0) * self.tile_size;
        Some(self.placement(tile, model, footprint))
    }

    pub fn decoration_placement(&self, tile: &Tile) -> Option<Placement> {
        let rule = self.config.decoration_for(tile.kind.as_str())?;
        if random(0.0, 1.0, Seed::decoration(tile.x, tile.y)) >= rule.chance {
            return None;
        }
        let model = self.models.get(&rule.model)?;
        let footprint = self.config.decoration_footprint.clamp(0.0, 1.0) * self.tile_size;
        Some(self.placement(tile, model, footprint))
    }

    /// Draw every tile onto the terrain layer and register model placements.
    pub fn walk<B: RenderBackend + ?Sized>(
        &self,
        backend: &mut B,
        instancer: &mut ModelInstancer,
    ) -> WalkStats {
        let mut stats = WalkStats::default();
        for tile in self.world.tiles() {
            backend.draw_cube(Layer::Terrain, self.tile_cube(tile));
            stats.tiles += 1;

            let placement = match self.world.building_on(tile) {
                Some(building) => {
                    let placement = self.building_placement(tile, building);
                    if placement.is_none() {
                        tracing::warn!(kind = %building.kind, at = %tile.pos(), "no model for building");
                    }
                    stats.buildings += usize::from(placement.is_some());
                    placement
                }
                None => {
                    let placement = self.decoration_placement(tile);
                    stats.decorations += usize::from(placement.is_some());
                    placement
                }
            };
            if let Some(placement) = placement {
                instancer.register(placement);
            }
        }
        stats
    }
}
