//! Part definitions and the part library
//!
//! A part is described by an Orbiter-style vessel config:
//!
//! ```text
//! ClassName = ShuttleA
//! MeshName = ShuttleA
//! BEGIN_DOCKLIST
//! 0 0 10   0 0 1   0 1 0   ; position, approach, reference
//! END_DOCKLIST
//! ```
//!
//! Keys are case-insensitive and unknown keys are ignored.

use std::collections::HashMap;
use std::path::{Path, PathBuf};
use std::sync::Arc;

use thiserror::Error;

use super::line_reader::{parse_floats, LineReader};
use super::mesh::{MeshError, MeshProvider, VesselMesh};
use crate::foundation::math::{self, TransformError, Vec3};

/// Part config errors
#[derive(Debug, Error)]
pub enum PartError {
    /// Config file could not be read
    #[error("failed to read part config {path}: {source}")]
    Io {
        /// Path that was read
        path: PathBuf,
        /// Underlying error
        #[source]
        source: std::io::Error,
    },

    /// Config has no `MeshName`
    #[error("part '{0}' does not name a mesh")]
    MissingMesh(String),

    /// Dock list is unterminated or has a bad entry
    #[error("malformed dock list at line {line}: {reason}")]
    MalformedDockList {
        /// 1-based line number
        line: usize,
        /// What was wrong
        reason: String,
    },

    /// A port's approach and reference directions do not fix an orientation
    #[error("docking port {index} has a degenerate frame: {source}")]
    DegenerateFrame {
        /// Index of the port in the dock list
        index: usize,
        /// Underlying error
        #[source]
        source: TransformError,
    },

    /// Mesh lookup failed
    #[error(transparent)]
    Mesh(#[from] MeshError),
}

/// One declared docking port, in vessel-local coordinates
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PortDefinition {
    /// Port position
    pub position: Vec3,
    /// Outward docking axis (unit length)
    pub approach_direction: Vec3,
    /// Up axis fixing the roll (unit length)
    pub reference_direction: Vec3,
}

impl PortDefinition {
    /// Create a port definition, normalizing both directions. Zero-length
    /// directions are kept as they are and rejected by frame validation.
    pub fn new(position: Vec3, approach_direction: Vec3, reference_direction: Vec3) -> Self {
        Self {
            position,
            approach_direction: approach_direction.try_normalize(0.0).unwrap_or(approach_direction),
            reference_direction: reference_direction.try_normalize(0.0).unwrap_or(reference_direction),
        }
    }
}

/// A parsed part config
#[derive(Debug, Clone, PartialEq)]
pub struct PartDefinition {
    /// Class name, used in session files
    pub class_name: String,
    /// Mesh identifier
    pub mesh_name: String,
    /// Declared docking ports in file order
    pub docking_ports: Vec<PortDefinition>,
}

impl PartDefinition {
    /// Parse a part config. `default_class_name` is used when the file
    /// has no `ClassName` entry.
    pub fn parse(default_class_name: &str, contents: &str) -> Result<Self, PartError> {
        let mut reader = LineReader::new(contents);
        let mut class_name = None;
        let mut mesh_name = None;
        let mut docking_ports = Vec::new();

        while let Some(tokens) = reader.next_tokens() {
            let Some(key) = tokens.first() else {
                continue;
            };

            if key.eq_ignore_ascii_case("ClassName") && tokens.len() > 1 {
                class_name = Some(tokens[1..].join(" "));
            } else if key.eq_ignore_ascii_case("MeshName") && tokens.len() > 1 {
                mesh_name = Some(tokens[1..].join(" "));
            } else if key.eq_ignore_ascii_case("BEGIN_DOCKLIST") {
                Self::parse_dock_list(&mut reader, &mut docking_ports)?;
            }
        }

        let class_name = class_name.unwrap_or_else(|| default_class_name.to_string());
        let mesh_name = mesh_name.ok_or_else(|| PartError::MissingMesh(class_name.clone()))?;

        for (index, port) in docking_ports.iter().enumerate() {
            math::orthonormal_basis(port.approach_direction, port.reference_direction)
                .map_err(|source| PartError::DegenerateFrame { index, source })?;
        }

        Ok(Self {
            class_name,
            mesh_name,
            docking_ports,
        })
    }

    fn parse_dock_list(
        reader: &mut LineReader<'_>,
        ports: &mut Vec<PortDefinition>,
    ) -> Result<(), PartError> {
        loop {
            let tokens = reader.next_tokens().ok_or_else(|| PartError::MalformedDockList {
                line: reader.line_number(),
                reason: "missing END_DOCKLIST".to_string(),
            })?;

            match tokens.first() {
                None => continue,
                Some(key) if key.eq_ignore_ascii_case("END_DOCKLIST") => return Ok(()),
                Some(_) => {
                    let [px, py, pz, ax, ay, az, rx, ry, rz] =
                        parse_floats::<9>(&tokens).ok_or_else(|| PartError::MalformedDockList {
                            line: reader.line_number(),
                            reason: format!("expected 9 numbers, got '{}'", tokens.join(" ")),
                        })?;
                    ports.push(PortDefinition::new(
                        Vec3::new(px, py, pz),
                        Vec3::new(ax, ay, az),
                        Vec3::new(rx, ry, rz),
                    ));
                }
            }
        }
    }
}

/// A part definition together with its mesh, ready to instantiate
#[derive(Debug, Clone)]
pub struct LoadedPart {
    /// Parsed config
    pub definition: PartDefinition,
    /// Mesh shared by every vessel of this class
    pub mesh: Arc<VesselMesh>,
}

/// Resolves part class names to loaded parts, caching the results
pub struct PartLibrary {
    config_dir: PathBuf,
    meshes: Box<dyn MeshProvider>,
    parts: HashMap<String, Arc<LoadedPart>>,
}

impl PartLibrary {
    /// Library reading `<config_dir>/<class>.cfg` files
    pub fn new(config_dir: impl Into<PathBuf>, meshes: Box<dyn MeshProvider>) -> Self {
        Self {
            config_dir: config_dir.into(),
            meshes,
            parts: HashMap::new(),
        }
    }

    /// Directory part configs are read from
    pub fn config_dir(&self) -> &Path {
        &self.config_dir
    }

    /// Register a part built in code instead of read from disk
    pub fn register(&mut self, definition: PartDefinition) -> Result<Arc<LoadedPart>, PartError> {
        let mesh = self.meshes.load_mesh(&definition.mesh_name)?;
        let part = Arc::new(LoadedPart { definition, mesh });
        self.parts
            .insert(part.definition.class_name.clone(), Arc::clone(&part));
        Ok(part)
    }

    /// Look up a part by class name, reading its config on first use
    pub fn load(&mut self, class_name: &str) -> Result<Arc<LoadedPart>, PartError> {
        if let Some(part) = self.parts.get(class_name) {
            return Ok(Arc::clone(part));
        }

        let path = self.config_dir.join(format!("{class_name}.cfg"));
        let contents = std::fs::read_to_string(&path)
            .map_err(|source| PartError::Io { path: path.clone(), source })?;
        let definition = PartDefinition::parse(class_name, &contents)?;
        log::debug!(
            "Loaded part '{}' from {} with {} docking port(s)",
            definition.class_name,
            path.display(),
            definition.docking_ports.len()
        );

        let part = self.register(definition)?;
        // Sessions refer to parts by the name they were requested under.
        self.parts.insert(class_name.to_string(), Arc::clone(&part));
        Ok(part)
    }

    /// Number of cached parts
    pub fn len(&self) -> usize {
        self.parts.len()
    }

    /// Whether nothing is cached
    pub fn is_empty(&self) -> bool {
        self.parts.is_empty()
    }
}
