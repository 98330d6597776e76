//! Mesh geometry and model loading.
//!
//! A loaded model is an ordered list of meshes; each mesh is a plain vertex
//! position array. Mesh order is the load order and is stable for the life of
//! the model.

use crate::DataError;
use glam::Vec3;
use serde::Deserialize;
use std::fs;
use std::path::Path;
use tracing::{debug, info};

/// Vertex positions of a single mesh.
#[derive(Debug, Clone, PartialEq)]
pub struct MeshGeometry {
    pub name: String,
    pub positions: Vec<Vec3>,
}

impl MeshGeometry {
    /// Create a mesh from vertex positions.
    pub fn new(name: impl Into<String>, positions: Vec<Vec3>) -> Self {
        Self {
            name: name.into(),
            positions,
        }
    }

    /// Build a mesh from a flat `[x, y, z, x, y, z, ...]` array.
    pub fn from_flat(name: impl Into<String>, flat: &[f32]) -> Result<Self, DataError> {
        let name = name.into();
        if flat.len() % 3 != 0 {
            return Err(DataError::MalformedPositions {
                name,
                len: flat.len(),
            });
        }
        let positions = flat
            .chunks_exact(3)
            .map(|c| Vec3::new(c[0], c[1], c[2]))
            .collect();
        Ok(Self { name, positions })
    }

    pub fn vertex_count(&self) -> usize {
        self.positions.len()
    }

    /// Flatten back into `[x, y, z, ...]` order.
    pub fn to_flat(&self) -> Vec<f32> {
        self.positions.iter().flat_map(|p| p.to_array()).collect()
    }
}

/// A loaded model: meshes in load order.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Model {
    pub meshes: Vec<MeshGeometry>,
}

impl Model {
    pub fn new(meshes: Vec<MeshGeometry>) -> Self {
        Self { meshes }
    }

    pub fn vertex_count(&self) -> usize {
        self.meshes.iter().map(MeshGeometry::vertex_count).sum()
    }
}

#[derive(Deserialize, Debug)]
struct ModelFile {
    meshes: Vec<MeshRecord>,
}

#[derive(Deserialize, Debug)]
struct MeshRecord {
    #[serde(default)]
    name: Option<String>,
    positions: Vec<f32>,
}

/// Parse a model from its JSON text.
pub fn parse_model(text: &str) -> Result<Model, DataError> {
    let file: ModelFile = serde_json::from_str(text)?;
    if file.meshes.is_empty() {
        return Err(DataError::EmptyModel);
    }

    let meshes = file
        .meshes
        .into_iter()
        .enumerate()
        .map(|(i, record)| {
            let name = record.name.unwrap_or_else(|| format!("mesh-{i}"));
            MeshGeometry::from_flat(name, &record.positions)
        })
        .collect::<Result<Vec<_>, _>>()?;

    Ok(Model { meshes })
}

/// Load a model from a JSON file.
#[tracing::instrument(skip_all, fields(path = %path.as_ref().display()))]
pub fn load_model(path: impl AsRef<Path>) -> Result<Model, DataError> {
    debug!("Loading model");
    let text = fs::read_to_string(path.as_ref())?;
    let model = parse_model(&text)?;
    info!(
        "Model loaded: {} meshes, {} vertices",
        model.meshes.len(),
        model.vertex_count()
    );
    Ok(model)
}
