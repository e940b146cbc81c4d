//! Assets consumed by the renderer: textures, their preload barrier, and the
//! voxel model library.
//!
//! Textures are identified by content-addressed ids; the renderer refers to
//! them by id, never by raw path.
//!
//! # Invariants
//! - A preload releases its completion callback exactly once.
//! - Voxel model definitions are validated when loaded, never at draw time.

mod model;
mod preload;
mod texture;

pub use model::{
    Axis, MAX_AXIS_SPAN, MAX_DESCRIPTOR_VOXELS, ModelError, ModelLibrary, VoxelDescriptor,
    VoxelFill, VoxelModelDefinition,
};
pub use preload::{LoadTicket, PreloadBarrier, PreloadError, Readiness};
pub use texture::{TextureEntry, TextureId, TextureRef, TextureSet};
