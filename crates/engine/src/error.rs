use tileview_assets::ModelError;
use tileview_kernel::WorldError;
use tileview_persist::StoreError;

/// Errors surfaced by the engine's setup and persistence entry points.
///
/// Drawing itself never fails: a frame that cannot be drawn yet is reported
/// through [`DrawOutcome`](crate::DrawOutcome).
#[derive(Debug, thiserror::Error)]
pub enum EngineError {
    #[error("model library: {0}")]
    Model(#[from] ModelError),
    #[error("store: {0}")]
    Store(#[from] StoreError),
    #[error("world: {0}")]
    World(#[from] WorldError),
}
