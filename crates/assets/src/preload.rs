use std::cell::RefCell;
use std::fmt;
use std::rc::Rc;

use crate::texture::{TextureRef, TextureSet};

/// Errors from preparing assets for preload.
#[derive(Debug, thiserror::Error)]
pub enum PreloadError {
    #[error("texture manifest: {0}")]
    Manifest(#[from] serde_json::Error),
}

/// Observable state of a preload.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Readiness {
    Pending { loaded: usize, total: usize },
    Ready,
    /// A resource failed; the barrier will never release.
    Failed { resource: String, reason: String },
}

impl fmt::Display for Readiness {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Pending { loaded, total } => write!(f, "loading {loaded}/{total}"),
            Self::Ready => f.write_str("ready"),
            Self::Failed { resource, reason } => write!(f, "failed on {resource}: {reason}"),
        }
    }
}

struct BarrierState {
    total: usize,
    loaded: usize,
    failure: Option<(String, String)>,
    on_all_loaded: Option<Box<dyn FnOnce()>>,
}

impl BarrierState {
    fn readiness(&self) -> Readiness {
        if let Some((resource, reason)) = &self.failure {
            return Readiness::Failed {
                resource: resource.clone(),
                reason: reason.clone(),
            };
        }
        if self.loaded == self.total {
            Readiness::Ready
        } else {
            Readiness::Pending {
                loaded: self.loaded,
                total: self.total,
            }
        }
    }
}

/// Counting join over a set of one-shot texture loads.
///
/// Each call to [`PreloadBarrier::preload`] starts a fresh counter, hands out
/// one [`LoadTicket`] per individual texture and runs the completion callback
/// exactly once, when the last ticket completes. Single-threaded by
/// construction; the host completes tickets from its own event loop.
#[derive(Clone)]
pub struct PreloadBarrier {
    state: Rc<RefCell<BarrierState>>,
}

impl fmt::Debug for PreloadBarrier {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("PreloadBarrier")
            .field("readiness", &self.readiness())
            .finish()
    }
}

impl PreloadBarrier {
    /// Start preloading every texture in `textures`, flattening variant lists.
    /// With nothing to load the callback runs before this returns.
    pub fn preload(
        textures: &TextureSet,
        on_all_loaded: impl FnOnce() + 'static,
    ) -> (Self, Vec<LoadTicket>) {
        let resources: Vec<TextureRef> = textures.resources().cloned().collect();
        let total = resources.len();
        let barrier = Self {
            state: Rc::new(RefCell::new(BarrierState {
                total,
                loaded: 0,
                failure: None,
                on_all_loaded: Some(Box::new(on_all_loaded)),
            })),
        };
        tracing::debug!(total, "preload started");

        if total == 0 {
            barrier.release();
            return (barrier, Vec::new());
        }

        let tickets = resources
            .into_iter()
            .map(|texture| LoadTicket {
                texture,
                state: Some(Rc::clone(&barrier.state)),
            })
            .collect();
        (barrier, tickets)
    }

    pub fn readiness(&self) -> Readiness {
        self.state.borrow().readiness()
    }

    pub fn is_ready(&self) -> bool {
        self.readiness() == Readiness::Ready
    }

    fn release(&self) {
        // Take the callback out before running it so it may inspect the barrier.
        let callback = self.state.borrow_mut().on_all_loaded.take();
        if let Some(callback) = callback {
            tracing::info!("all textures loaded");
            callback();
        }
    }
}

/// One-shot completion signal for a single texture.
///
/// Consumed by [`LoadTicket::complete`] or [`LoadTicket::fail`]; dropping an
/// unsettled ticket counts as a failure so a lost load is observable instead
/// of stalling silently.
pub struct LoadTicket {
    texture: TextureRef,
    state: Option<Rc<RefCell<BarrierState>>>,
}

impl fmt::Debug for LoadTicket {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("LoadTicket")
            .field("texture", &self.texture.name)
            .finish()
    }
}

impl LoadTicket {
    pub fn texture(&self) -> &TextureRef {
        &self.texture
    }

    /// Signal that the texture finished loading.
    pub fn complete(mut self) {
        let Some(state) = self.state.take() else {
            return;
        };
        let release = {
            let mut s = state.borrow_mut();
            s.loaded += 1;
            tracing::trace!(texture = %self.texture.name, loaded = s.loaded, total = s.total, "texture loaded");
            s.loaded == s.total && s.failure.is_none()
        };
        if release {
            PreloadBarrier { state }.release();
        }
    }

    /// Signal that the texture could not be loaded. Loads are not retried.
    pub fn fail(mut self, reason: impl Into<String>) {
        if let Some(state) = self.state.take() {
            Self::record_failure(&state, &self.texture.name, reason.into());
        }
    }

    fn record_failure(state: &Rc<RefCell<BarrierState>>, resource: &str, reason: String) {
        tracing::warn!(resource, %reason, "texture failed to load; first draw withheld");
        let mut s = state.borrow_mut();
        if s.failure.is_none() {
            s.failure = Some((resource.to_string(), reason));
        }
        s.on_all_loaded = None;
    }
}

impl Drop for LoadTicket {
    fn drop(&mut self) {
        if let Some(state) = self.state.take() {
            Self::record_failure(&state, &self.texture.name, "dropped before loading".into());
        }
    }
}
