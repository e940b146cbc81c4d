//! The map engine: one [`Engine`] per map view.
//!
//! The engine owns the loaded world, the camera state and all render state
//! (frame cache, model instances, hover overlay) and draws through a
//! [`RenderBackend`](tileview_render::RenderBackend) supplied by the host.
//!
//! # Invariants
//! - Nothing is presented until every texture has loaded.
//! - A cached terrain frame is identical to what a full walk would draw.
//! - Coalesced pointer input produces at most one redraw per display refresh.

mod config;
mod draw;
mod engine;
mod error;

pub use config::{Decoration, DrawConfig, EngineConfig};
pub use draw::WalkStats;
pub use engine::{DrawOutcome, Engine, PickedTile, PointerResponse};
pub use error::EngineError;
