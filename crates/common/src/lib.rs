//! Shared primitives for the tileview engine.
//!
//! # Invariants
//! - Everything here is plain data or a pure function; no global state.
//! - Variant selection is a pure function of its seed.

pub mod types;
pub mod variant;

pub use types::{Color, ColorError, GridPos};
pub use variant::Seed;
