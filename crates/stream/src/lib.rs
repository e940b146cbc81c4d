//! Voxel model instancing with distance culling.
//!
//! # Invariants
//! - A model id has either no live primitives or exactly one full group.
//! - Model ids derive from grid position, so repeated placement collapses.
//! - Realize work per reconcile is bounded by the configured budget; culling
//!   past the threshold is never deferred.

mod culling;
mod instance;

pub use culling::{CullingConfig, CullingStats, ModelInstancer};
pub use instance::{ModelId, Placement, instantiate};
