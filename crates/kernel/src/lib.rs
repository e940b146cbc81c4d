//! World model: a finished grid of typed tiles plus point-placed buildings.
//!
//! # Invariants
//! - A world is immutable once constructed; a new load replaces it wholesale.
//! - Tile coordinates are unique and lie inside `0..resolution`.
//! - Every tile lookup goes through the coordinate index, never a linear scan.

pub mod world;

pub use world::{Building, HeightRange, Tile, TileKind, World, WorldError};
