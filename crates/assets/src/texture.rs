use serde::{Deserialize, Serialize};
use sha2::{Digest, Sha256};
use std::collections::BTreeMap;
use tileview_common::Seed;
use tileview_common::variant::random_int;

use crate::preload::PreloadError;

/// Content-addressed texture id computed from the texture source.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct TextureId(pub u64);

impl TextureId {
    pub fn for_source(source: &str) -> Self {
        let digest = Sha256::digest(source.as_bytes());
        let mut bytes = [0u8; 8];
        bytes.copy_from_slice(&digest[..8]);
        TextureId(u64::from_le_bytes(bytes))
    }
}

/// A single loadable texture.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TextureRef {
    pub id: TextureId,
    /// Resource name, e.g. `desert_2`.
    pub name: String,
    /// Where the host should load it from.
    pub source: String,
}

/// A named texture slot: either one texture or a list of variants.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TextureEntry {
    Single(TextureRef),
    Variants(Vec<TextureRef>),
}

impl TextureEntry {
    /// Pick the texture for a seed; variants are chosen deterministically.
    pub fn pick(&self, seed: Seed) -> &TextureRef {
        match self {
            Self::Single(texture) => texture,
            Self::Variants(list) => {
                let index = random_int(0, list.len() as i64, seed) as usize;
                &list[index.min(list.len() - 1)]
            }
        }
    }

    pub fn textures(&self) -> &[TextureRef] {
        match self {
            Self::Single(texture) => std::slice::from_ref(texture),
            Self::Variants(list) => list,
        }
    }
}

#[derive(Deserialize)]
#[serde(untagged)]
enum ManifestEntry {
    Single(String),
    Variants(Vec<String>),
}

/// Named texture slots keyed by tile kind (plus building materials).
#[derive(Debug, Clone, Default)]
pub struct TextureSet {
    base: String,
    entries: BTreeMap<String, TextureEntry>,
}

impl TextureSet {
    /// Empty set whose resources live under `base` (e.g. `images`).
    pub fn new(base: impl Into<String>) -> Self {
        Self {
            base: base.into(),
            entries: BTreeMap::new(),
        }
    }

    /// The terrain and building textures the map ships with.
    pub fn standard() -> Self {
        let mut set = Self::new("images");
        set.insert_single("water", "water");
        set.insert_single("forest", "forest");
        set.insert_variants("volcano", &["volcano_1", "volcano_2"]);
        set.insert_variants("desert", &["desert_1", "desert_2"]);
        set.insert_variants("swamp", &["swamp_1", "swamp_2"]);
        set.insert_variants("valley", &["valley_1", "valley_2"]);
        set.insert_single("building", "house");
        set.insert_single("brick", "brick");
        set
    }

    /// Parse a manifest like `{"water": "water", "desert": ["desert_1", "desert_2"]}`.
    pub fn from_manifest(base: impl Into<String>, json: &str) -> Result<Self, PreloadError> {
        let manifest: BTreeMap<String, ManifestEntry> = serde_json::from_str(json)?;
        let mut set = Self::new(base);
        for (name, entry) in manifest {
            match entry {
                ManifestEntry::Single(resource) => set.insert_single(&name, &resource),
                ManifestEntry::Variants(list) => {
                    let list: Vec<&str> = list.iter().map(String::as_str).collect();
                    set.insert_variants(&name, &list);
                }
            }
        }
        Ok(set)
    }

    fn texture_ref(&self, resource: &str) -> TextureRef {
        let source = format!("{}/{}.gif", self.base, resource);
        TextureRef {
            id: TextureId::for_source(&source),
            name: resource.to_string(),
            source,
        }
    }

    pub fn insert_single(&mut self, name: &str, resource: &str) {
        let texture = self.texture_ref(resource);
        self.entries.insert(name.to_string(), TextureEntry::Single(texture));
    }

    /// Insert a variant list; an empty list removes the slot.
    pub fn insert_variants(&mut self, name: &str, resources: &[&str]) {
        if resources.is_empty() {
            self.entries.remove(name);
            return;
        }
        let list = resources.iter().map(|r| self.texture_ref(r)).collect();
        self.entries.insert(name.to_string(), TextureEntry::Variants(list));
    }

    pub fn get(&self, name: &str) -> Option<&TextureEntry> {
        self.entries.get(name)
    }

    pub fn contains(&self, name: &str) -> bool {
        self.entries.contains_key(name)
    }

    /// Texture for slot `name`, picking a variant by `seed`.
    pub fn resolve(&self, name: &str, seed: Seed) -> Option<&TextureRef> {
        self.get(name).map(|entry| entry.pick(seed))
    }

    /// Every individual texture, flattened across slots.
    pub fn resources(&self) -> impl Iterator<Item = &TextureRef> {
        self.entries.values().flat_map(TextureEntry::textures)
    }

    pub fn resource_count(&self) -> usize {
        self.entries.values().map(|e| e.textures().len()).sum()
    }

    /// Number of named slots.
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}
