use glam::{Vec2, Vec3};
use serde::{Deserialize, Serialize};
use tileview_assets::TextureRef;
use tileview_camera::{CameraPose, ScreenRect};
use tileview_common::Color;

/// Independent primitive groups. Layers are composited in declaration order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Layer {
    /// Tile boxes. Snapshotted into the render cache.
    Terrain,
    /// Voxel model instances, reconciled every frame.
    Models,
    /// Screen-space highlight and labels.
    Overlay,
}

impl Layer {
    pub const ALL: [Layer; 3] = [Layer::Terrain, Layer::Models, Layer::Overlay];
}

/// Handle of a drawn primitive, unique per backend.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct PrimitiveId(pub u64);

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Fill {
    Color(Color),
    Texture(TextureRef),
}

/// Axis-aligned box in world render space. `min.z` is the bottom face.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Cube {
    pub min: Vec3,
    pub size: Vec3,
    pub fill: Fill,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TextItem {
    /// Baseline-left position in screen pixels.
    pub at: Vec2,
    pub text: String,
    pub color: Color,
    pub font_size: f32,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum Primitive {
    Cube(Cube),
    Rect { rect: ScreenRect, color: Color },
    Text(TextItem),
}

/// Everything a backend needs to place the scene: the 2D pan/zoom and the
/// equivalent 3D eye pose.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct CameraView {
    pub offset: Vec2,
    pub zoom: f32,
    pub pose: CameraPose,
}

/// Contents of one layer, in draw order.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Frame {
    pub primitives: Vec<Primitive>,
}

impl Frame {
    pub fn len(&self) -> usize {
        self.primitives.len()
    }

    pub fn is_empty(&self) -> bool {
        self.primitives.is_empty()
    }
}

/// Backend-agnostic drawing surface.
///
/// The engine only talks to this trait, so a GPU scene graph, a 2D canvas
/// or the [`RecordingBackend`](crate::RecordingBackend) can sit behind it.
/// Nothing is visible until [`present`](RenderBackend::present).
pub trait RenderBackend {
    /// Drop every primitive on `layer`.
    fn clear(&mut self, layer: Layer);

    fn set_camera(&mut self, view: &CameraView);

    fn draw_cube(&mut self, layer: Layer, cube: Cube) -> PrimitiveId;

    /// Draw a filled screen-space rectangle on the overlay.
    fn draw_rect(&mut self, rect: ScreenRect, color: Color) -> PrimitiveId;

    /// Draw text on the overlay.
    fn draw_text(&mut self, text: TextItem) -> PrimitiveId;

    /// Remove one primitive. Returns false if it was already gone.
    fn remove(&mut self, id: PrimitiveId) -> bool;

    /// Pixel size of `text` at `font_size`.
    fn measure_text(&self, text: &str, font_size: f32) -> Vec2 {
        Vec2::new(text.chars().count() as f32 * font_size * 0.5, font_size)
    }

    /// Show the current contents of all layers.
    fn present(&mut self);

    /// Copy of what is currently drawn on `layer`.
    fn snapshot(&self, layer: Layer) -> Frame;

    /// Replace the contents of `layer` with `frame`.
    fn restore(&mut self, layer: Layer, frame: &Frame);
}
