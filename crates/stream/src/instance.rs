use std::fmt;
use std::sync::Arc;

use glam::Vec3;
use tileview_assets::{TextureSet, VoxelFill, VoxelModelDefinition};
use tileview_common::{Color, GridPos, Seed};
use tileview_render::{Cube, Fill, Layer, PrimitiveId, RenderBackend};

/// Identity of a model placement, derived from its grid position so that
/// placing again at the same tile refers to the same instance.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct ModelId(pub i64);

impl ModelId {
    pub fn at(pos: GridPos) -> Self {
        ModelId(pos.x as i64 * 100_000 + pos.y as i64)
    }
}

impl fmt::Display for ModelId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "model#{}", self.0)
    }
}

/// A model anchored in world render space.
#[derive(Debug, Clone)]
pub struct Placement {
    pub id: ModelId,
    pub model: Arc<VoxelModelDefinition>,
    /// World position of the model's local `(0, 0, 0)` corner.
    pub origin: Vec3,
    /// Edge length of one voxel in world render units.
    pub voxel_size: f32,
}

impl Placement {
    /// Same model at the same spot and scale.
    pub fn same_as(&self, other: &Placement) -> bool {
        self.id == other.id
            && self.model.name == other.model.name
            && self.origin == other.origin
            && self.voxel_size == other.voxel_size
    }

    /// World position of a model-local voxel coordinate.
    pub fn voxel_origin(&self, at: [i32; 3]) -> Vec3 {
        self.origin + Vec3::new(at[0] as f32, at[1] as f32, at[2] as f32) * self.voxel_size
    }
}

fn resolve_fill(placement: &Placement, fill: &VoxelFill, textures: &TextureSet) -> Fill {
    match fill {
        VoxelFill::Color(name) => Fill::Color(placement.model.color(name).unwrap_or(Color::NEUTRAL)),
        VoxelFill::Texture(name) => match textures.resolve(name, Seed(placement.id.0 as f64)) {
            Some(texture) => Fill::Texture(texture.clone()),
            None => Fill::Color(Color::NEUTRAL),
        },
    }
}

/// Draw every voxel of `placement` on the model layer and return the
/// primitives as one group.
pub fn instantiate<B: RenderBackend + ?Sized>(
    placement: &Placement,
    textures: &TextureSet,
    backend: &mut B,
) -> Vec<PrimitiveId> {
    let size = Vec3::splat(placement.voxel_size);
    placement
        .model
        .expand()
        .map(|(at, fill)| {
            backend.draw_cube(
                Layer::Models,
                Cube {
                    min: placement.voxel_origin(at),
                    size,
                    fill: resolve_fill(placement, fill, textures),
                },
            )
        })
        .collect()
}
