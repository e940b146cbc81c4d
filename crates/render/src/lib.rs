//! Rendering adapter: backend-agnostic interface.
//!
//! # Invariants
//! - The renderer never mutates world truth; it only receives primitives.
//! - Layers are independent: clearing or restoring one leaves the others.
//! - A cached terrain frame is camera-independent, so pan stays live on a
//!   cache hit.

mod backend;
mod cache;
mod overlay;
mod recording;

pub use backend::{
    CameraView, Cube, Fill, Frame, Layer, Primitive, PrimitiveId, RenderBackend, TextItem,
};
pub use cache::{CacheKey, RenderCache, ZOOM_BUCKET, quantize_zoom};
pub use overlay::{HoverOverlay, LabelBox, LabelLine, LabelStyle, OverlayColors, layout_labels};
pub use recording::{PresentedFrame, RecordingBackend};
