use std::collections::BTreeMap;
use std::fmt::Write as _;

use glam::Vec2;
use serde::Serialize;
use tileview_camera::ScreenRect;
use tileview_common::Color;

use crate::backend::{
    CameraView, Cube, Fill, Frame, Layer, Primitive, PrimitiveId, RenderBackend, TextItem,
};

/// What was on screen after one [`RenderBackend::present`] call.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct PresentedFrame {
    pub camera: Option<CameraView>,
    pub terrain: Frame,
    pub models: Frame,
    pub overlay: Frame,
}

impl PresentedFrame {
    pub fn layer(&self, layer: Layer) -> &Frame {
        match layer {
            Layer::Terrain => &self.terrain,
            Layer::Models => &self.models,
            Layer::Overlay => &self.overlay,
        }
    }

    pub fn primitive_count(&self) -> usize {
        self.terrain.len() + self.models.len() + self.overlay.len()
    }

    /// Overlay text lines in draw order.
    pub fn texts(&self) -> impl Iterator<Item = &str> {
        self.overlay.primitives.iter().filter_map(|p| match p {
            Primitive::Text(t) => Some(t.text.as_str()),
            _ => None,
        })
    }

    /// Human-readable dump, one primitive per line.
    pub fn dump(&self) -> String {
        let mut out = String::new();
        match &self.camera {
            Some(c) => {
                let _ = writeln!(
                    out,
                    "Camera: offset=({:.1}, {:.1}) zoom={:.3} eye=({:.1}, {:.1}, {:.1}) target=({:.1}, {:.1}, {:.1})",
                    c.offset.x,
                    c.offset.y,
                    c.zoom,
                    c.pose.eye.x,
                    c.pose.eye.y,
                    c.pose.eye.z,
                    c.pose.target.x,
                    c.pose.target.y,
                    c.pose.target.z
                );
            }
            None => out.push_str("Camera: unset\n"),
        }
        for layer in Layer::ALL {
            let frame = self.layer(layer);
            let _ = writeln!(out, "{layer:?}: {} primitives", frame.len());
            for primitive in &frame.primitives {
                let _ = writeln!(out, "  {}", describe(primitive));
            }
        }
        out
    }
}

fn describe(primitive: &Primitive) -> String {
    match primitive {
        Primitive::Cube(c) => {
            let fill = match &c.fill {
                Fill::Color(color) => color.to_string(),
                Fill::Texture(t) => t.name.clone(),
            };
            format!(
                "cube min=({:.1}, {:.1}, {:.1}) size=({:.1}, {:.1}, {:.1}) {fill}",
                c.min.x, c.min.y, c.min.z, c.size.x, c.size.y, c.size.z
            )
        }
        Primitive::Rect { rect, color } => format!(
            "rect min=({:.1}, {:.1}) size=({:.1}, {:.1}) {color}",
            rect.min.x, rect.min.y, rect.size.x, rect.size.y
        ),
        Primitive::Text(t) => format!(
            "text at=({:.1}, {:.1}) size={} {:?}",
            t.at.x, t.at.y, t.font_size, t.text
        ),
    }
}

/// Backend that keeps every primitive in memory and records presented frames.
///
/// Used by tests and the command line tool in place of a real scene graph.
#[derive(Debug, Default)]
pub struct RecordingBackend {
    layers: BTreeMap<Layer, BTreeMap<PrimitiveId, Primitive>>,
    camera: Option<CameraView>,
    next_id: u64,
    presented: Option<PresentedFrame>,
    present_count: u64,
    removed: u64,
}

impl RecordingBackend {
    pub fn new() -> Self {
        Self::default()
    }

    /// The last presented frame, if any.
    pub fn presented(&self) -> Option<&PresentedFrame> {
        self.presented.as_ref()
    }

    pub fn present_count(&self) -> u64 {
        self.present_count
    }

    /// Primitives removed through [`RenderBackend::remove`] so far.
    pub fn removed_count(&self) -> u64 {
        self.removed
    }

    /// Live primitives currently on `layer`.
    pub fn live(&self, layer: Layer) -> usize {
        self.layers.get(&layer).map_or(0, BTreeMap::len)
    }

    pub fn contains(&self, id: PrimitiveId) -> bool {
        self.layers.values().any(|l| l.contains_key(&id))
    }

    pub fn camera(&self) -> Option<&CameraView> {
        self.camera.as_ref()
    }

    fn push(&mut self, layer: Layer, primitive: Primitive) -> PrimitiveId {
        let id = PrimitiveId(self.next_id);
        self.next_id += 1;
        self.layers.entry(layer).or_default().insert(id, primitive);
        id
    }
}

impl RenderBackend for RecordingBackend {
    fn clear(&mut self, layer: Layer) {
        self.layers.remove(&layer);
    }

    fn set_camera(&mut self, view: &CameraView) {
        self.camera = Some(*view);
    }

    fn draw_cube(&mut self, layer: Layer, cube: Cube) -> PrimitiveId {
        self.push(layer, Primitive::Cube(cube))
    }

    fn draw_rect(&mut self, rect: ScreenRect, color: Color) -> PrimitiveId {
        self.push(Layer::Overlay, Primitive::Rect { rect, color })
    }

    fn draw_text(&mut self, text: TextItem) -> PrimitiveId {
        self.push(Layer::Overlay, Primitive::Text(text))
    }

    fn remove(&mut self, id: PrimitiveId) -> bool {
        let found = self
            .layers
            .values_mut()
            .any(|layer| layer.remove(&id).is_some());
        if found {
            self.removed += 1;
        }
        found
    }

    fn measure_text(&self, text: &str, font_size: f32) -> Vec2 {
        Vec2::new(text.chars().count() as f32 * font_size * 0.5, font_size)
    }

    fn present(&mut self) {
        let frame = PresentedFrame {
            camera: self.camera,
            terrain: self.snapshot(Layer::Terrain),
            models: self.snapshot(Layer::Models),
            overlay: self.snapshot(Layer::Overlay),
        };
        self.present_count += 1;
        tracing::trace!(
            frame = self.present_count,
            primitives = frame.primitive_count(),
            "frame presented"
        );
        self.presented = Some(frame);
    }

    fn snapshot(&self, layer: Layer) -> Frame {
        Frame {
            primitives: self
                .layers
                .get(&layer)
                .map(|l| l.values().cloned().collect())
                .unwrap_or_default(),
        }
    }

    fn restore(&mut self, layer: Layer, frame: &Frame) {
        self.clear(layer);
        for primitive in &frame.primitives {
            self.push(layer, primitive.clone());
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use glam::Vec3;

    fn cube(x: f32) -> Cube {
        Cube {
            min: Vec3::new(x, 0.0, 0.0),
            size: Vec3::ONE,
            fill: Fill::Color(Color::WHITE),
        }
    }

    #[test]
    fn nothing_is_visible_before_present() {
        let mut backend = RecordingBackend::new();
        backend.draw_cube(Layer::Terrain, cube(0.0));
        assert!(backend.presented().is_none());
        backend.present();
        assert_eq!(backend.presented().unwrap().terrain.len(), 1);
        assert_eq!(backend.present_count(), 1);
    }

    #[test]
    fn remove_is_per_primitive() {
        let mut backend = RecordingBackend::new();
        let a = backend.draw_cube(Layer::Models, cube(0.0));
        let b = backend.draw_cube(Layer::Models, cube(1.0));
        assert!(backend.remove(a));
        assert!(!backend.remove(a));
        assert!(backend.contains(b));
        assert_eq!(backend.live(Layer::Models), 1);
        assert_eq!(backend.removed_count(), 1);
    }

    #[test]
    fn snapshot_restore_preserves_order() {
        let mut backend = RecordingBackend::new();
        for x in 0..5 {
            backend.draw_cube(Layer::Terrain, cube(x as f32));
        }
        let frame = backend.snapshot(Layer::Terrain);
        backend.clear(Layer::Terrain);
        assert_eq!(backend.live(Layer::Terrain), 0);
        backend.restore(Layer::Terrain, &frame);
        assert_eq!(backend.snapshot(Layer::Terrain), frame);
    }

    #[test]
    fn clear_leaves_other_layers() {
        let mut backend = RecordingBackend::new();
        backend.draw_cube(Layer::Terrain, cube(0.0));
        backend.draw_rect(ScreenRect::new(Vec2::ZERO, Vec2::ONE), Color::BLACK);
        backend.clear(Layer::Overlay);
        assert_eq!(backend.live(Layer::Terrain), 1);
        assert_eq!(backend.live(Layer::Overlay), 0);
    }

    #[test]
    fn dump_lists_primitives() {
        let mut backend = RecordingBackend::new();
        backend.draw_cube(Layer::Terrain, cube(2.0));
        backend.draw_text(TextItem {
            at: Vec2::new(1.0, 2.0),
            text: "forest".into(),
            color: Color::WHITE,
            font_size: 52.0,
        });
        backend.present();
        let dump = backend.presented().unwrap().dump();
        assert!(dump.contains("Camera: unset"));
        assert!(dump.contains("Terrain: 1 primitives"));
        assert!(dump.contains("\"forest\""));
        assert_eq!(backend.presented().unwrap().texts().collect::<Vec<_>>(), ["forest"]);
    }

    #[test]
    fn presented_frame_serializes() {
        let mut backend = RecordingBackend::new();
        backend.draw_cube(Layer::Terrain, cube(0.0));
        backend.present();
        let json = serde_json::to_string(backend.presented().unwrap()).unwrap();
        assert!(json.contains("\"kind\":\"cube\""));
    }
}
