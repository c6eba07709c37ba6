//! Mesh provider interface
//!
//! Mesh geometry and materials belong to the renderer. The engine only needs
//! a vessel's local bounding box, so this is the whole surface it consumes.

use std::collections::HashMap;
use std::sync::Arc;

use thiserror::Error;

use crate::foundation::math::Vec3;
use crate::scene::AABB;

/// Mesh data the engine needs from a loaded vessel mesh
#[derive(Debug, Clone, PartialEq)]
pub struct VesselMesh {
    /// Mesh identifier as written in the part config
    pub name: String,
    /// Bounding box in vessel-local coordinates
    pub bounding_box: AABB,
}

/// Mesh lookup errors
#[derive(Debug, Error)]
pub enum MeshError {
    /// No mesh registered under this name and no fallback configured
    #[error("mesh not found: {0}")]
    NotFound(String),
}

/// Source of vessel meshes
pub trait MeshProvider {
    /// Load (or fetch a cached) mesh by identifier
    fn load_mesh(&mut self, name: &str) -> Result<Arc<VesselMesh>, MeshError>;
}

/// In-memory mesh table
///
/// Meshes are registered up front by the host. With a fallback box set,
/// unknown meshes resolve to that box instead of failing.
#[derive(Debug, Default)]
pub struct MeshLibrary {
    meshes: HashMap<String, Arc<VesselMesh>>,
    fallback: Option<AABB>,
}

impl MeshLibrary {
    /// Create an empty library without fallback
    pub fn new() -> Self {
        Self::default()
    }

    /// Create a library that answers unknown meshes with `bounds`
    pub fn with_fallback(bounds: AABB) -> Self {
        Self {
            meshes: HashMap::new(),
            fallback: Some(bounds),
        }
    }

    /// Register a mesh by its bounding box
    pub fn register(&mut self, name: impl Into<String>, bounding_box: AABB) {
        let name = name.into();
        let mesh = Arc::new(VesselMesh { name: name.clone(), bounding_box });
        self.meshes.insert(name, mesh);
    }

    /// Register a mesh by its vertex positions. Returns `false` (and
    /// registers nothing) when there are no vertices.
    pub fn register_vertices<I>(&mut self, name: impl Into<String>, vertices: I) -> bool
    where
        I: IntoIterator<Item = Vec3>,
    {
        match AABB::from_points(vertices) {
            Some(bounds) => {
                self.register(name, bounds);
                true
            }
            None => false,
        }
    }

    /// Number of registered meshes
    pub fn len(&self) -> usize {
        self.meshes.len()
    }

    /// Whether no mesh is registered
    pub fn is_empty(&self) -> bool {
        self.meshes.is_empty()
    }
}

impl MeshProvider for MeshLibrary {
    fn load_mesh(&mut self, name: &str) -> Result<Arc<VesselMesh>, MeshError> {
        if let Some(mesh) = self.meshes.get(name) {
            return Ok(Arc::clone(mesh));
        }

        let bounds = self.fallback.ok_or_else(|| MeshError::NotFound(name.to_string()))?;
        log::warn!("Mesh '{}' not registered, using fallback bounds", name);
        self.register(name, bounds);
        Ok(Arc::clone(&self.meshes[name]))
    }
}
