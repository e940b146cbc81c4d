//! Declarative voxel models.
//!
//! A model is a color table plus an ordered list of voxel descriptors. Each
//! descriptor axis is either a single integer or an inclusive range written
//! `"range:lo-hi"`. Descriptors are parsed and checked once, when the model
//! is loaded; nothing downstream parses strings.

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fmt;
use std::ops::RangeInclusive;
use std::sync::Arc;
use tileview_common::Color;

use crate::texture::TextureSet;

const RANGE_PREFIX: &str = "range:";
/// Widest range one axis may cover.
pub const MAX_AXIS_SPAN: usize = 256;
/// Most unit voxels one descriptor may expand to.
pub const MAX_DESCRIPTOR_VOXELS: usize = 65_536;

#[derive(Debug, thiserror::Error)]
pub enum ModelError {
    #[error("axis value {0:?} is neither an integer nor \"range:lo-hi\"")]
    BadRange(String),
    #[error("range {lo}-{hi} runs backwards")]
    ReversedRange { lo: i32, hi: i32 },
    #[error("range {lo}-{hi} covers more than {MAX_AXIS_SPAN} values")]
    RangeTooWide { lo: i32, hi: i32 },
    #[error("voxel expands to {0} cells, more than {MAX_DESCRIPTOR_VOXELS}")]
    TooManyVoxels(usize),
    #[error("voxel sets neither color nor texture")]
    MissingFill,
    #[error("voxel sets both color {color:?} and texture {texture:?}")]
    AmbiguousFill { color: String, texture: String },
    #[error("color {0:?} is not in the model's color table")]
    UnknownColor(String),
    #[error("model {model:?} voxel #{index}: {source}")]
    InVoxel {
        model: String,
        index: usize,
        #[source]
        source: Box<ModelError>,
    },
    #[error("model {model:?} uses texture {texture:?} which the texture set lacks")]
    UnknownTexture { model: String, texture: String },
    #[error("model json: {0}")]
    Json(#[from] serde_json::Error),
}

/// One axis of a voxel descriptor.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Axis {
    Scalar(i32),
    /// Inclusive on both ends.
    Range(i32, i32),
}

impl Axis {
    pub fn parse(text: &str) -> Result<Self, ModelError> {
        let bad = || ModelError::BadRange(text.to_string());
        let body = text.trim().strip_prefix(RANGE_PREFIX).ok_or_else(bad)?;
        // Skip the first character so a leading minus sign is not taken as the separator.
        let split = body
            .char_indices()
            .skip(1)
            .find(|&(_, c)| c == '-')
            .map(|(i, _)| i)
            .ok_or_else(bad)?;
        let lo: i32 = body[..split].trim().parse().map_err(|_| bad())?;
        let hi: i32 = body[split + 1..].trim().parse().map_err(|_| bad())?;
        if lo > hi {
            return Err(ModelError::ReversedRange { lo, hi });
        }
        let axis = Axis::Range(lo, hi);
        if axis.len() > MAX_AXIS_SPAN {
            return Err(ModelError::RangeTooWide { lo, hi });
        }
        Ok(axis)
    }

    pub fn values(self) -> RangeInclusive<i32> {
        match self {
            Axis::Scalar(v) => v..=v,
            Axis::Range(lo, hi) => lo..=hi,
        }
    }

    pub fn len(self) -> usize {
        match self {
            Axis::Scalar(_) => 1,
            Axis::Range(lo, hi) => (i64::from(hi) - i64::from(lo) + 1).max(0) as usize,
        }
    }

    pub fn max(self) -> i32 {
        match self {
            Axis::Scalar(v) => v,
            Axis::Range(_, hi) => hi,
        }
    }
}

impl fmt::Display for Axis {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Axis::Scalar(v) => write!(f, "{v}"),
            Axis::Range(lo, hi) => write!(f, "{RANGE_PREFIX}{lo}-{hi}"),
        }
    }
}

/// Axis as written in model JSON.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(untagged)]
pub enum RawAxis {
    Int(i32),
    Text(String),
}

impl TryFrom<RawAxis> for Axis {
    type Error = ModelError;

    fn try_from(raw: RawAxis) -> Result<Self, Self::Error> {
        match raw {
            RawAxis::Int(v) => Ok(Axis::Scalar(v)),
            RawAxis::Text(text) => Axis::parse(&text),
        }
    }
}

impl From<Axis> for RawAxis {
    fn from(axis: Axis) -> Self {
        match axis {
            Axis::Scalar(v) => RawAxis::Int(v),
            range => RawAxis::Text(range.to_string()),
        }
    }
}

/// How a voxel is painted.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum VoxelFill {
    /// Name in the owning model's color table.
    Color(String),
    /// Name in the shared texture set.
    Texture(String),
}

/// A voxel descriptor as written in model JSON, before validation.
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct RawVoxel {
    pub x: RawAxis,
    pub y: RawAxis,
    pub z: RawAxis,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub color: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub texture: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct VoxelDescriptor {
    pub x: Axis,
    pub y: Axis,
    pub z: Axis,
    pub fill: VoxelFill,
}

impl TryFrom<RawVoxel> for VoxelDescriptor {
    type Error = ModelError;

    fn try_from(raw: RawVoxel) -> Result<Self, Self::Error> {
        let fill = match (raw.color, raw.texture) {
            (Some(color), None) => VoxelFill::Color(color),
            (None, Some(texture)) => VoxelFill::Texture(texture),
            (None, None) => return Err(ModelError::MissingFill),
            (Some(color), Some(texture)) => {
                return Err(ModelError::AmbiguousFill { color, texture });
            }
        };
        let descriptor = Self {
            x: raw.x.try_into()?,
            y: raw.y.try_into()?,
            z: raw.z.try_into()?,
            fill,
        };
        let count = descriptor.voxel_count();
        if count > MAX_DESCRIPTOR_VOXELS {
            return Err(ModelError::TooManyVoxels(count));
        }
        Ok(descriptor)
    }
}

impl VoxelDescriptor {
    /// Every unit voxel this descriptor covers, as the cartesian product of its axes.
    pub fn expand(&self) -> Vec<[i32; 3]> {
        let mut out = Vec::with_capacity(self.voxel_count());
        cartesian(&[self.x, self.y, self.z], &mut Vec::with_capacity(3), &mut out);
        out
    }

    pub fn voxel_count(&self) -> usize {
        self.x
            .len()
            .saturating_mul(self.y.len())
            .saturating_mul(self.z.len())
    }
}

fn cartesian(axes: &[Axis], prefix: &mut Vec<i32>, out: &mut Vec<[i32; 3]>) {
    let Some((first, rest)) = axes.split_first() else {
        if let [x, y, z] = prefix[..] {
            out.push([x, y, z]);
        }
        return;
    };
    for v in first.values() {
        prefix.push(v);
        cartesian(rest, prefix, out);
        prefix.pop();
    }
}

#[derive(Deserialize)]
struct RawModel {
    name: String,
    #[serde(default)]
    colors: BTreeMap<String, Color>,
    voxels: Vec<RawVoxel>,
}

/// A validated voxel model. Shared by every placement that uses it.
#[derive(Debug, Clone, PartialEq)]
pub struct VoxelModelDefinition {
    pub name: String,
    pub colors: BTreeMap<String, Color>,
    pub voxels: Vec<VoxelDescriptor>,
}

impl VoxelModelDefinition {
    pub fn from_json(json: &str) -> Result<Self, ModelError> {
        let raw: RawModel = serde_json::from_str(json)?;
        let mut voxels = Vec::with_capacity(raw.voxels.len());
        for (index, voxel) in raw.voxels.into_iter().enumerate() {
            let in_voxel = |source| ModelError::InVoxel {
                model: raw.name.clone(),
                index,
                source: Box::new(source),
            };
            let descriptor = VoxelDescriptor::try_from(voxel).map_err(in_voxel)?;
            if let VoxelFill::Color(name) = &descriptor.fill
                && !raw.colors.contains_key(name)
            {
                return Err(in_voxel(ModelError::UnknownColor(name.clone())));
            }
            voxels.push(descriptor);
        }
        tracing::debug!(model = %raw.name, descriptors = voxels.len(), "model loaded");
        Ok(Self {
            name: raw.name,
            colors: raw.colors,
            voxels,
        })
    }

    pub fn color(&self, name: &str) -> Option<Color> {
        self.colors.get(name).copied()
    }

    /// Every unit voxel of the model with its fill, in descriptor order.
    pub fn expand(&self) -> impl Iterator<Item = ([i32; 3], &VoxelFill)> + '_ {
        self.voxels
            .iter()
            .flat_map(|d| d.expand().into_iter().map(move |at| (at, &d.fill)))
    }

    pub fn voxel_count(&self) -> usize {
        self.voxels.iter().map(VoxelDescriptor::voxel_count).sum()
    }

    /// Size of the model's local grid: one past the largest coordinate per axis.
    pub fn extent(&self) -> [i32; 3] {
        self.voxels.iter().fold([0; 3], |acc, d| {
            [
                acc[0].max(d.x.max() + 1),
                acc[1].max(d.y.max() + 1),
                acc[2].max(d.z.max() + 1),
            ]
        })
    }

    pub fn textures(&self) -> impl Iterator<Item = &str> {
        self.voxels.iter().filter_map(|d| match &d.fill {
            VoxelFill::Texture(name) => Some(name.as_str()),
            VoxelFill::Color(_) => None,
        })
    }
}

/// Named models available for placement.
#[derive(Debug, Clone, Default)]
pub struct ModelLibrary {
    models: BTreeMap<String, Arc<VoxelModelDefinition>>,
}

impl ModelLibrary {
    pub fn new() -> Self {
        Self::default()
    }

    /// The `house` and `palm` models bundled with the crate.
    pub fn builtin() -> Result<Self, ModelError> {
        let mut library = Self::new();
        library.insert_json(include_str!("../models/house.json"))?;
        library.insert_json(include_str!("../models/palm.json"))?;
        Ok(library)
    }

    pub fn insert(&mut self, model: VoxelModelDefinition) -> Arc<VoxelModelDefinition> {
        let model = Arc::new(model);
        self.models.insert(model.name.clone(), Arc::clone(&model));
        model
    }

    pub fn insert_json(&mut self, json: &str) -> Result<Arc<VoxelModelDefinition>, ModelError> {
        Ok(self.insert(VoxelModelDefinition::from_json(json)?))
    }

    pub fn get(&self, name: &str) -> Option<&Arc<VoxelModelDefinition>> {
        self.models.get(name)
    }

    pub fn names(&self) -> impl Iterator<Item = &str> {
        self.models.keys().map(String::as_str)
    }

    pub fn iter(&self) -> impl Iterator<Item = &Arc<VoxelModelDefinition>> {
        self.models.values()
    }

    pub fn len(&self) -> usize {
        self.models.len()
    }

    pub fn is_empty(&self) -> bool {
        self.models.is_empty()
    }

    /// Check that every texture a model names exists in `textures`.
    pub fn validate_textures(&self, textures: &TextureSet) -> Result<(), ModelError> {
        for model in self.models.values() {
            if let Some(missing) = model.textures().find(|t| !textures.contains(t)) {
                return Err(ModelError::UnknownTexture {
                    model: model.name.clone(),
                    texture: missing.to_string(),
                });
            }
        }
        Ok(())
    }
}
