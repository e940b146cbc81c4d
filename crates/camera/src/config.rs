use serde::{Deserialize, Serialize};

/// Where the view stays fixed while zooming.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ZoomAnchor {
    /// Keep the offset; content scales about the surface origin.
    Origin,
    /// Keep the world point under the pointer (or the surface center when no
    /// pointer is involved) at the same screen position.
    Pointer,
}

/// Camera configuration: surface size, zoom range and the 3D pose rig.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct CameraConfig {
    /// Side length of the square backing surface, in pixels.
    pub map_size: f32,
    /// Smallest zoom divisor (most magnified).
    pub min_zoom: f32,
    /// Largest zoom divisor (whole map visible).
    pub max_zoom: f32,
    /// Multiplicative zoom change per wheel notch.
    pub zoom_step: f32,
    pub zoom_anchor: ZoomAnchor,
    /// Eye height above the map at zoom 1.
    pub camera_height: f32,
    /// How far ahead of the eye (towards -y) the camera looks.
    pub look_ahead: f32,
}

impl Default for CameraConfig {
    fn default() -> Self {
        Self {
            map_size: 3000.0,
            min_zoom: 0.1,
            max_zoom: 1.0,
            zoom_step: 1.1,
            zoom_anchor: ZoomAnchor::Pointer,
            camera_height: 1000.0,
            look_ahead: 400.0,
        }
    }
}

impl CameraConfig {
    /// Usable `(min, max)` zoom bounds.
    ///
    /// Bounds that are not finite and positive fall back to the defaults, and
    /// swapped bounds are put back in order, so a hand-edited config can never
    /// produce an empty range.
    pub fn zoom_range(&self) -> (f32, f32) {
        let defaults = Self::default();
        let usable = |v: f32, fallback: f32| if v.is_finite() && v > 0.0 { v } else { fallback };
        let lo = usable(self.min_zoom, defaults.min_zoom);
        let hi = usable(self.max_zoom, defaults.max_zoom);
        if lo <= hi { (lo, hi) } else { (hi, lo) }
    }

    /// Clamp a zoom value into the configured range.
    pub fn clamp_zoom(&self, zoom: f32) -> f32 {
        let (lo, hi) = self.zoom_range();
        if !zoom.is_finite() {
            return hi;
        }
        zoom.clamp(lo, hi)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn config_defaults() {
        let config = CameraConfig::default();
        assert_eq!(config.map_size, 3000.0);
        assert_eq!(config.zoom_step, 1.1);
        assert_eq!(config.zoom_anchor, ZoomAnchor::Pointer);
    }

    #[test]
    fn clamp_zoom_range() {
        let config = CameraConfig::default();
        assert_eq!(config.clamp_zoom(0.01), 0.1);
        assert_eq!(config.clamp_zoom(4.0), 1.0);
        assert_eq!(config.clamp_zoom(0.5), 0.5);
        assert_eq!(config.clamp_zoom(f32::NAN), 1.0);
    }

    #[test]
    fn inverted_zoom_bounds_do_not_panic() {
        let config: CameraConfig = serde_json::from_str(r#"{"min_zoom": 2.0}"#).unwrap();
        assert_eq!(config.zoom_range(), (1.0, 2.0));
        assert_eq!(config.clamp_zoom(0.5), 1.0);
        assert_eq!(config.clamp_zoom(1.5), 1.5);
        assert_eq!(config.clamp_zoom(f32::INFINITY), 2.0);
    }

    #[test]
    fn unusable_zoom_bounds_fall_back() {
        let config = CameraConfig {
            min_zoom: f32::NAN,
            max_zoom: -3.0,
            ..CameraConfig::default()
        };
        assert_eq!(config.zoom_range(), (0.1, 1.0));
        assert_eq!(config.clamp_zoom(0.01), 0.1);
        assert_eq!(config.clamp_zoom(f32::NAN), 1.0);
    }

    #[test]
    fn partial_json_uses_defaults() {
        let config: CameraConfig =
            serde_json::from_str(r#"{"map_size": 500, "zoom_anchor": "origin"}"#).unwrap();
        assert_eq!(config.map_size, 500.0);
        assert_eq!(config.zoom_anchor, ZoomAnchor::Origin);
        assert_eq!(config.max_zoom, 1.0);
    }
}
