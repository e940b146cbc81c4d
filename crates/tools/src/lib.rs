//! Developer tooling: world and model inspectors, sample worlds.
//!
//! # Invariants
//! - Tools only read world truth.
//! - Sample worlds are a pure function of their resolution.

mod inspector;
mod sample;

pub use inspector::{ModelSummary, TileInfo, WorldInspector, WorldSummary};
pub use sample::sample_world;
