use std::collections::BTreeMap;
use std::time::{Duration, Instant};

use glam::Vec3;
use serde::{Deserialize, Serialize};
use tileview_assets::TextureSet;
use tileview_render::{PrimitiveId, RenderBackend};

use crate::instance::{ModelId, Placement, instantiate};

/// Culling configuration: distance threshold plus a per-frame realize budget.
///
/// Culling has no budget: every placement past the threshold loses its
/// primitives in the same reconcile.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct CullingConfig {
    /// Placements farther than this from the eye have no live primitives.
    pub threshold: f32,
    /// Maximum number of placements realized per reconcile.
    pub realize_budget: usize,
}

impl Default for CullingConfig {
    fn default() -> Self {
        Self {
            threshold: 1500.0,
            realize_budget: 256,
        }
    }
}

/// Per-reconcile statistics for instrumentation.
#[derive(Debug, Clone, Default)]
pub struct CullingStats {
    pub realized_this_frame: usize,
    pub culled_this_frame: usize,
    pub total_realized: usize,
    pub total_placements: usize,
    pub live_primitives: usize,
    pub reconcile_time: Duration,
}

#[derive(Debug)]
struct Entry {
    placement: Placement,
    realized: Option<Vec<PrimitiveId>>,
}

/// Registry of every known placement and the primitives of those currently
/// realized.
///
/// A placement is either unrealized or holds exactly one full primitive
/// group; realizing and culling always act on whole groups.
#[derive(Debug)]
pub struct ModelInstancer {
    pub config: CullingConfig,
    entries: BTreeMap<ModelId, Entry>,
    /// Groups of replaced placements, removed on the next reconcile.
    stale: Vec<Vec<PrimitiveId>>,
    stats: CullingStats,
}

impl ModelInstancer {
    pub fn new(config: CullingConfig) -> Self {
        Self {
            config,
            entries: BTreeMap::new(),
            stale: Vec::new(),
            stats: CullingStats::default(),
        }
    }

    /// Record a placement. Registering the same placement again is a no-op;
    /// a different placement under an existing id replaces it. Returns
    /// whether anything changed.
    pub fn register(&mut self, placement: Placement) -> bool {
        match self.entries.get_mut(&placement.id) {
            Some(entry) if entry.placement.same_as(&placement) => false,
            Some(entry) => {
                tracing::debug!(id = %placement.id, model = %placement.model.name, "placement replaced");
                if let Some(old) = entry.realized.take() {
                    self.stale.push(old);
                }
                entry.placement = placement;
                true
            }
            None => {
                self.entries.insert(
                    placement.id,
                    Entry {
                        placement,
                        realized: None,
                    },
                );
                true
            }
        }
    }

    /// Cull every realized placement beyond the threshold of `eye`, then
    /// realize unrealized ones within it, nearest first, up to the realize
    /// budget. Returns the ids realized and culled this call.
    pub fn reconcile<B: RenderBackend + ?Sized>(
        &mut self,
        eye: Vec3,
        textures: &TextureSet,
        backend: &mut B,
    ) -> (Vec<ModelId>, Vec<ModelId>) {
        let _span = tracing::info_span!("reconcile_models").entered();
        let start = Instant::now();

        for group in self.stale.drain(..) {
            for id in group {
                backend.remove(id);
            }
        }

        let threshold = self.config.threshold;
        let mut to_realize = Vec::new();
        let mut to_cull = Vec::new();
        for (id, entry) in &self.entries {
            let distance = eye.distance(entry.placement.origin);
            match (&entry.realized, distance > threshold) {
                (Some(_), true) => to_cull.push((*id, distance)),
                (None, false) => to_realize.push((*id, distance)),
                _ => {}
            }
        }
        to_realize.sort_by(|a, b| a.1.total_cmp(&b.1));
        to_realize.truncate(self.config.realize_budget);
        to_cull.sort_by(|a, b| b.1.total_cmp(&a.1));

        let culled: Vec<ModelId> = to_cull.into_iter().map(|(id, _)| id).collect();
        for id in &culled {
            if let Some(group) = self.entries.get_mut(id).and_then(|e| e.realized.take()) {
                tracing::trace!(%id, primitives = group.len(), "culling model");
                for primitive in group {
                    backend.remove(primitive);
                }
            }
        }

        let realized: Vec<ModelId> = to_realize.into_iter().map(|(id, _)| id).collect();
        for id in &realized {
            if let Some(entry) = self.entries.get_mut(id) {
                let group = instantiate(&entry.placement, textures, backend);
                tracing::trace!(%id, primitives = group.len(), "realizing model");
                entry.realized = Some(group);
            }
        }

        self.stats = CullingStats {
            realized_this_frame: realized.len(),
            culled_this_frame: culled.len(),
            total_realized: self.realized_count(),
            total_placements: self.entries.len(),
            live_primitives: self.live_primitives(),
            reconcile_time: start.elapsed(),
        };
        tracing::debug!(
            realized = realized.len(),
            culled = culled.len(),
            total = self.stats.total_realized,
            "models reconciled"
        );

        (realized, culled)
    }

    /// Mark everything unrealized without touching the backend. Use after
    /// the model layer was cleared wholesale.
    pub fn forget_realized(&mut self) {
        for entry in self.entries.values_mut() {
            entry.realized = None;
        }
        self.stale.clear();
    }

    /// Remove every live primitive and forget all placements.
    pub fn clear<B: RenderBackend + ?Sized>(&mut self, backend: &mut B) {
        let groups = self
            .entries
            .values_mut()
            .filter_map(|e| e.realized.take())
            .chain(self.stale.drain(..));
        for group in groups {
            for id in group {
                backend.remove(id);
            }
        }
        self.entries.clear();
        self.stats = CullingStats::default();
    }

    pub fn is_realized(&self, id: ModelId) -> bool {
        self.entries.get(&id).is_some_and(|e| e.realized.is_some())
    }

    /// Primitive group of a realized placement.
    pub fn primitives(&self, id: ModelId) -> Option<&[PrimitiveId]> {
        self.entries.get(&id)?.realized.as_deref()
    }

    pub fn placement(&self, id: ModelId) -> Option<&Placement> {
        self.entries.get(&id).map(|e| &e.placement)
    }

    pub fn placements(&self) -> impl Iterator<Item = &Placement> {
        self.entries.values().map(|e| &e.placement)
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn realized_count(&self) -> usize {
        self.entries.values().filter(|e| e.realized.is_some()).count()
    }

    fn live_primitives(&self) -> usize {
        self.entries
            .values()
            .filter_map(|e| e.realized.as_ref())
            .map(Vec::len)
            .sum()
    }

    /// Statistics from the last reconcile.
    pub fn stats(&self) -> &CullingStats {
        &self.stats
    }
}
