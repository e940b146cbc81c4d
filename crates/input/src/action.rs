use glam::Vec2;
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ZoomDirection {
    In,
    Out,
}

/// A camera-level action produced from raw pointer input.
///
/// The engine consumes actions, never raw events, so any input source
/// (pointer, keyboard, scripted replay) drives the same camera logic.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(tag = "action", rename_all = "snake_case")]
pub enum Action {
    /// Drag by a client-space delta; content follows the pointer.
    Pan { delta: Vec2 },
    /// One zoom step towards or away from the client point `at`.
    Zoom { direction: ZoomDirection, at: Vec2 },
    /// Pointer rests at a client point; highlight the tile under it.
    Hover { at: Vec2 },
    /// Pointer left the surface; drop any hover overlay.
    ClearHover,
}
