use std::collections::HashMap;

/// Zoom values within this distance share a cache entry.
pub const ZOOM_BUCKET: f32 = 0.001;

/// Quantize a zoom level so float drift does not fragment the cache.
pub fn quantize_zoom(zoom: f32) -> i32 {
    (zoom / ZOOM_BUCKET).round() as i32
}

/// Identifies one fully drawn frame: which world, at which zoom.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct CacheKey {
    pub world: u64,
    pub zoom_bucket: i32,
}

impl CacheKey {
    pub fn new(world: u64, zoom: f32) -> Self {
        Self {
            world,
            zoom_bucket: quantize_zoom(zoom),
        }
    }
}

/// One frame per key; storing under an existing key replaces it.
///
/// There is no eviction. Growth is bounded by how many distinct zoom buckets
/// the camera visits.
#[derive(Debug, Clone)]
pub struct RenderCache<F> {
    entries: HashMap<CacheKey, F>,
    hits: u64,
    misses: u64,
}

impl<F> Default for RenderCache<F> {
    fn default() -> Self {
        Self {
            entries: HashMap::new(),
            hits: 0,
            misses: 0,
        }
    }
}

impl<F> RenderCache<F> {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn get(&mut self, key: &CacheKey) -> Option<&F> {
        match self.entries.get(key) {
            Some(frame) => {
                self.hits += 1;
                tracing::debug!(?key, "render cache hit");
                Some(frame)
            }
            None => {
                self.misses += 1;
                tracing::debug!(?key, "render cache miss");
                None
            }
        }
    }

    pub fn contains(&self, key: &CacheKey) -> bool {
        self.entries.contains_key(key)
    }

    /// Store `frame`, returning the entry it replaced.
    pub fn set(&mut self, key: CacheKey, frame: F) -> Option<F> {
        self.entries.insert(key, frame)
    }

    /// Drop every entry, e.g. when a new world is loaded.
    pub fn invalidate_all(&mut self) {
        self.entries.clear();
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn hits(&self) -> u64 {
        self.hits
    }

    pub fn misses(&self) -> u64 {
        self.misses
    }
}
