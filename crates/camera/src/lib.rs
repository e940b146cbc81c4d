//! Coordinate & camera transform.
//!
//! Three spaces are in play:
//! - **tile space**: fractional grid coordinates, one unit per tile;
//! - **world render space**: tile space scaled by the tile render size,
//!   y pointing down, z pointing up out of the map;
//! - **screen space**: backing-surface pixels, `screen = (world + offset) / zoom`.
//!
//! Client (pointer) coordinates are converted to screen space through a
//! [`SurfaceRect`] that accounts for any scaling between the backing surface
//! and its displayed size.
//!
//! # Invariants
//! - `screen_to_world(world_to_screen(p)) == p` up to float tolerance.
//! - Zoom is clamped to the configured range before it is applied.

mod config;
mod transform;

pub use config::{CameraConfig, ZoomAnchor};
pub use transform::{CameraPose, CameraState, CameraTransform, ScreenRect, SurfaceRect};
