use serde::{Deserialize, Serialize};
use tileview_camera::CameraConfig;
use tileview_render::{LabelStyle, OverlayColors};
use tileview_stream::CullingConfig;

/// Decorative model scattered on tiles of one kind.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Decoration {
    /// Tile kind name, e.g. `desert`.
    pub kind: String,
    /// Model library name.
    pub model: String,
    /// Probability in `[0, 1]` that a tile of this kind is decorated.
    pub chance: f64,
}

impl Decoration {
    pub fn new(kind: &str, model: &str, chance: f64) -> Self {
        Self {
            kind: kind.to_string(),
            model: model.to_string(),
            chance,
        }
    }
}

/// How tiles, buildings and the hover overlay are drawn.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct DrawConfig {
    /// Box depth of the highest tile, in world render units.
    pub height_scale: f32,
    /// Side of a decoration's footprint as a fraction of a tile.
    pub decoration_footprint: f32,
    pub decorations: Vec<Decoration>,
    /// Model used for buildings whose type has no model of its own.
    pub building_model: String,
    pub overlay: OverlayColors,
    /// Style of the first hover label line (the tile kind).
    pub title_label: LabelStyle,
    /// Style of the remaining hover label lines.
    pub detail_label: LabelStyle,
}

impl Default for DrawConfig {
    fn default() -> Self {
        Self {
            height_scale: 100.0,
            decoration_footprint: 0.8,
            decorations: vec![
                Decoration::new("desert", "palm", 0.2),
                Decoration::new("valley", "palm", 0.05),
            ],
            building_model: "house".into(),
            overlay: OverlayColors::default(),
            title_label: LabelStyle::with_font(52.0),
            detail_label: LabelStyle {
                font_size: 26.0,
                padding: 13.0,
            },
        }
    }
}

impl DrawConfig {
    pub fn decoration_for(&self, kind: &str) -> Option<&Decoration> {
        self.decorations.iter().find(|d| d.kind == kind)
    }
}

/// Engine configuration.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct EngineConfig {
    pub camera: CameraConfig,
    pub culling: CullingConfig,
    pub draw: DrawConfig,
    /// Store key of the persisted camera state.
    pub camera_key: String,
    /// Store key of the cached world.
    pub world_key: String,
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            camera: CameraConfig::default(),
            culling: CullingConfig::default(),
            draw: DrawConfig::default(),
            camera_key: "camera".into(),
            world_key: "world".into(),
        }
    }
}
