//! Pointer interaction mapped to camera actions.
//!
//! # Invariants
//! - Consumers see [`Action`]s, never raw pointer events.
//! - At most one frame is requested per display refresh; intermediate move
//!   and wheel events are coalesced, last event wins.

pub mod action;
mod machine;

pub use action::{Action, ZoomDirection};
pub use machine::{Interaction, InteractionState, PointerEvent, Step};
