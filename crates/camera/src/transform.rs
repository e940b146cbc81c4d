use glam::{Vec2, Vec3};
use serde::{Deserialize, Serialize};

use crate::config::{CameraConfig, ZoomAnchor};

/// Pan offset and zoom divisor.
///
/// The offset is stored in world render units at zoom 1, so that
/// `screen = (world + offset) / zoom` inverts exactly.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct CameraState {
    pub offset: Vec2,
    pub zoom: f32,
}

impl Default for CameraState {
    fn default() -> Self {
        Self {
            offset: Vec2::ZERO,
            zoom: 1.0,
        }
    }
}

/// Axis-aligned rectangle in screen space.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ScreenRect {
    pub min: Vec2,
    pub size: Vec2,
}

impl ScreenRect {
    pub fn new(min: Vec2, size: Vec2) -> Self {
        Self { min, size }
    }

    pub fn max(&self) -> Vec2 {
        self.min + self.size
    }

    pub fn contains(&self, point: Vec2) -> bool {
        point.cmpge(self.min).all() && point.cmplt(self.max()).all()
    }
}

/// Placement of the drawing surface on the page.
///
/// `displayed` is the on-screen size of the surface and `backing` its pixel
/// size; the two differ whenever the surface is stretched or drawn at a
/// device pixel ratio other than one.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SurfaceRect {
    pub origin: Vec2,
    pub displayed: Vec2,
    pub backing: Vec2,
}

impl SurfaceRect {
    /// Unscaled square surface at the client origin.
    pub fn square(size: f32) -> Self {
        Self {
            origin: Vec2::ZERO,
            displayed: Vec2::splat(size),
            backing: Vec2::splat(size),
        }
    }

    /// Backing pixels per displayed pixel, per axis.
    pub fn scale(&self) -> Vec2 {
        let axis = |backing: f32, displayed: f32| {
            if displayed > 0.0 { backing / displayed } else { 1.0 }
        };
        Vec2::new(
            axis(self.backing.x, self.displayed.x),
            axis(self.backing.y, self.displayed.y),
        )
    }

    /// Client coordinates to backing-surface pixels.
    pub fn to_backing(&self, client: Vec2) -> Vec2 {
        (client - self.origin) * self.scale()
    }

    /// Backing-surface pixels to client coordinates.
    pub fn to_client(&self, backing: Vec2) -> Vec2 {
        backing / self.scale() + self.origin
    }
}

/// Eye position and look-at target for a 3D backend, in world render space.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct CameraPose {
    pub eye: Vec3,
    pub target: Vec3,
}

/// World/screen conversion for one world resolution.
#[derive(Debug, Clone)]
pub struct CameraTransform {
    config: CameraConfig,
    resolution: u32,
}

impl CameraTransform {
    pub fn new(config: CameraConfig, resolution: u32) -> Self {
        Self {
            config,
            resolution: resolution.max(1),
        }
    }

    pub fn config(&self) -> &CameraConfig {
        &self.config
    }

    pub fn resolution(&self) -> u32 {
        self.resolution
    }

    /// Render units per tile on the square map.
    pub fn tile_render_size(&self) -> f32 {
        self.config.map_size / self.resolution as f32
    }

    /// Tile space to world render space.
    pub fn tile_to_render(&self, tile: Vec2) -> Vec2 {
        tile * self.tile_render_size()
    }

    /// Tile space to screen pixels.
    pub fn world_to_screen(&self, camera: &CameraState, world: Vec2) -> Vec2 {
        (self.tile_to_render(world) + camera.offset) / camera.zoom
    }

    /// Screen pixels to tile space.
    pub fn screen_to_tile(&self, camera: &CameraState, screen: Vec2) -> Vec2 {
        (screen * camera.zoom - camera.offset) / self.tile_render_size()
    }

    /// Client pointer coordinates to tile space.
    pub fn screen_to_world(&self, camera: &CameraState, client: Vec2, surface: &SurfaceRect) -> Vec2 {
        self.screen_to_tile(camera, surface.to_backing(client))
    }

    /// Screen rectangle covered by the square of `size` tiles whose corner is `tile`.
    pub fn tile_screen_rect(&self, camera: &CameraState, tile: Vec2, size: f32) -> ScreenRect {
        let min = self.world_to_screen(camera, tile);
        let side = size * self.tile_render_size() / camera.zoom;
        ScreenRect::new(min, Vec2::splat(side))
    }

    /// Apply a pointer drag of `client_delta` displayed pixels; content follows the pointer.
    pub fn pan(&self, camera: &mut CameraState, client_delta: Vec2, surface: &SurfaceRect) {
        camera.offset += client_delta * surface.scale() * camera.zoom;
    }

    /// Multiply the zoom by `factor`, clamped to range. `anchor` is the screen
    /// point to hold fixed under [`ZoomAnchor::Pointer`]; the surface center is
    /// used when none is given. Returns whether the zoom changed.
    pub fn zoom_by(&self, camera: &mut CameraState, factor: f32, anchor: Option<Vec2>) -> bool {
        let old = self.config.clamp_zoom(camera.zoom);
        let new = self.config.clamp_zoom(old * factor);
        camera.zoom = new;
        if new == old {
            return false;
        }
        if self.config.zoom_anchor == ZoomAnchor::Pointer {
            let anchor = anchor.unwrap_or(Vec2::splat(self.config.map_size / 2.0));
            camera.offset += anchor * (new - old);
        }
        tracing::trace!(from = old, to = new, "zoom changed");
        true
    }

    /// Magnify by one step.
    pub fn zoom_in(&self, camera: &mut CameraState, anchor: Option<Vec2>) -> bool {
        self.zoom_by(camera, 1.0 / self.config.zoom_step, anchor)
    }

    /// Shrink by one step.
    pub fn zoom_out(&self, camera: &mut CameraState, anchor: Option<Vec2>) -> bool {
        self.zoom_by(camera, self.config.zoom_step, anchor)
    }

    /// Bring a restored or hand-built state into the configured zoom range.
    pub fn clamp(&self, camera: &mut CameraState) {
        camera.zoom = self.config.clamp_zoom(camera.zoom);
        if !camera.offset.is_finite() {
            camera.offset = Vec2::ZERO;
        }
    }

    /// World render point at the center of the visible surface.
    pub fn view_center(&self, camera: &CameraState) -> Vec2 {
        Vec2::splat(self.config.map_size / 2.0) * camera.zoom - camera.offset
    }

    /// Eye above the view center, raised with the zoom, looking slightly ahead.
    pub fn pose(&self, camera: &CameraState) -> CameraPose {
        let center = self.view_center(camera);
        CameraPose {
            eye: center.extend(self.config.camera_height * camera.zoom),
            target: Vec3::new(center.x, center.y - self.config.look_ahead, 0.0),
        }
    }
}
