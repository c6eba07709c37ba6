//! Editor session
//!
//! [`EditorSession`] ties together one editing session: configuration,
//! working directory, the vessel registry, the part library and the current
//! selection. Nothing here is global; dropping the session drops the scene.

use std::collections::HashSet;
use std::path::{Path, PathBuf};

use thiserror::Error;

use super::codec::{self, SessionError, VesselRecord};
use crate::assets::{MeshProvider, PartError, PartLibrary};
use crate::core::config::EditorConfig;
use crate::foundation::collections::{PortKey, VesselKey};
use crate::foundation::math::Vec3;
use crate::vessel::{
    DockingError, RegistryError, SnapOutcome, StackError, VesselNode, VesselRegistry, VesselStack,
};

/// Ports closer than this (squared distance) after a load are docked again
pub const RESTORE_DISTANCE_SQUARED: f32 = 1.0e-2;

/// Editor session errors
#[derive(Debug, Error)]
pub enum EditorError {
    /// Part could not be loaded
    #[error(transparent)]
    Part(#[from] PartError),

    /// Vessel could not be registered
    #[error(transparent)]
    Registry(#[from] RegistryError),

    /// Stack operation failed
    #[error(transparent)]
    Stack(#[from] StackError),

    /// Docking failed
    #[error(transparent)]
    Docking(#[from] DockingError),

    /// Session file could not be read, written or applied
    #[error(transparent)]
    Session(#[from] SessionError),

    /// The operation needs a selected stack
    #[error("no stack selected")]
    NoSelection,

    /// Vessel handle is not in the registry
    #[error("unknown vessel {0:?}")]
    UnknownVessel(VesselKey),
}

/// One editing session
pub struct EditorSession {
    config: EditorConfig,
    registry: VesselRegistry,
    parts: PartLibrary,
    selection: Option<VesselStack>,
}

impl EditorSession {
    /// Session reading parts from the configured parts directory
    pub fn new(config: EditorConfig, meshes: Box<dyn MeshProvider>) -> Self {
        let parts = PartLibrary::new(config.parts_directory(), meshes);
        Self::with_part_library(config, parts)
    }

    /// Session using an existing part library
    pub fn with_part_library(config: EditorConfig, parts: PartLibrary) -> Self {
        log::info!(
            "Editor session in {} (parts from {})",
            config.working_directory.display(),
            parts.config_dir().display()
        );
        Self {
            config,
            registry: VesselRegistry::new(),
            parts,
            selection: None,
        }
    }

    /// Session configuration
    pub fn config(&self) -> &EditorConfig {
        &self.config
    }

    /// Base directory relative paths are resolved against
    pub fn working_directory(&self) -> &Path {
        &self.config.working_directory
    }

    /// All vessels
    pub fn registry(&self) -> &VesselRegistry {
        &self.registry
    }

    /// All vessels, mutably. Changing the dock graph this way leaves the
    /// selection stale until [`select`](Self::select) is called again.
    pub fn registry_mut(&mut self) -> &mut VesselRegistry {
        &mut self.registry
    }

    /// Part library
    pub fn parts_mut(&mut self) -> &mut PartLibrary {
        &mut self.parts
    }

    /// Currently selected stack
    pub fn selection(&self) -> Option<&VesselStack> {
        self.selection.as_ref()
    }

    /// Create a vessel of the given part class at the origin
    pub fn spawn_part(&mut self, class_name: &str) -> Result<VesselKey, EditorError> {
        let part = self.parts.load(class_name).map_err(|err| {
            log::warn!("Cannot spawn '{}': {}", class_name, err);
            err
        })?;
        let key = self.registry.insert_vessel(&part)?;
        log::debug!("Spawned {} as {:?}", class_name, key);
        Ok(key)
    }

    /// Select the stack containing `vessel`
    pub fn select(&mut self, vessel: VesselKey) -> Result<&VesselStack, EditorError> {
        if !self.registry.contains(vessel) {
            return Err(EditorError::UnknownVessel(vessel));
        }
        let stack = VesselStack::build(&self.registry, vessel)?;
        Ok(self.selection.insert(stack))
    }

    /// Drop the selection
    pub fn clear_selection(&mut self) {
        self.selection = None;
    }

    /// Rotate the selected stack about its center
    pub fn rotate_selection(&mut self, delta_degrees: Vec3) -> Result<(), EditorError> {
        let stack = self.selection.as_ref().ok_or(EditorError::NoSelection)?;
        stack.rotate(&mut self.registry, delta_degrees)?;
        Ok(())
    }

    /// Move the selected stack
    pub fn move_selection(&mut self, delta: Vec3) -> Result<(), EditorError> {
        let stack = self.selection.as_mut().ok_or(EditorError::NoSelection)?;
        stack.move_relative(&mut self.registry, delta)?;
        Ok(())
    }

    /// Snap or dock the selected stack to any nearby vessel
    pub fn snap_selection(&mut self, should_dock: bool) -> Result<SnapOutcome, EditorError> {
        let stack = self.selection.as_mut().ok_or(EditorError::NoSelection)?;
        let candidates = self.registry.keys().to_vec();
        Ok(stack.check_for_snapping(&mut self.registry, &candidates, should_dock)?)
    }

    /// Delete a vessel. The selection is rebuilt without it, or dropped
    /// when it was the seed.
    pub fn remove_vessel(&mut self, vessel: VesselKey) -> Option<VesselNode> {
        let removed = self.registry.remove_vessel(vessel)?;
        if let Some(stack) = self.selection.take() {
            if stack.seed() != vessel {
                self.selection = VesselStack::build(&self.registry, stack.seed()).ok();
            }
        }
        Some(removed)
    }

    /// Every stack in the scene, each seeded at its earliest vessel
    pub fn stacks(&self) -> Vec<VesselStack> {
        let mut seen = HashSet::new();
        let mut stacks = Vec::new();
        for key in self.registry.keys() {
            if seen.contains(key) {
                continue;
            }
            if let Ok(stack) = VesselStack::build(&self.registry, *key) {
                seen.extend(stack.members().iter().copied());
                stacks.push(stack);
            }
        }
        stacks
    }

    /// Resolve a path against the working directory
    pub fn resolve_path(&self, path: impl AsRef<Path>) -> PathBuf {
        self.config.working_directory.join(path)
    }

    /// Write every vessel to a session file. Returns the vessel count.
    pub fn save_session(&self, path: impl AsRef<Path>) -> Result<usize, EditorError> {
        let path = self.resolve_path(path);
        let records: Vec<VesselRecord> = self
            .registry
            .vessels()
            .map(|vessel| VesselRecord {
                class_name: vessel.class_name().to_string(),
                position: self.registry.position(vessel.key()),
                rotation: self.registry.rotation_degrees(vessel.key()),
            })
            .collect();

        std::fs::write(&path, codec::write_session(&records)).map_err(|source| {
            let err = SessionError::Io { path: path.clone(), source };
            log::error!("Saving session failed: {}", err);
            err
        })?;
        log::info!("Saved {} vessel(s) to {}", records.len(), path.display());
        Ok(records.len())
    }

    /// Replace the scene with the vessels of a session file.
    ///
    /// The file is parsed and every part resolved before anything changes;
    /// on error the current scene is kept. Ports left touching each other
    /// are docked again. Returns the vessel count.
    pub fn load_session(&mut self, path: impl AsRef<Path>) -> Result<usize, EditorError> {
        let path = self.resolve_path(path);
        let result = self.build_from_file(&path);
        let registry = result.map_err(|err| {
            log::error!("Loading session {} failed: {}", path.display(), err);
            err
        })?;

        self.registry = registry;
        self.selection = None;
        log::info!("Loaded {} vessel(s) from {}", self.registry.len(), path.display());
        Ok(self.registry.len())
    }

    fn build_from_file(&mut self, path: &Path) -> Result<VesselRegistry, EditorError> {
        let text = std::fs::read_to_string(path).map_err(|source| SessionError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        let records = codec::read_session(&text)?;

        let mut parts = Vec::with_capacity(records.len());
        for record in &records {
            let part = self.parts.load(&record.class_name).map_err(|source| SessionError::UnknownPart {
                class_name: record.class_name.clone(),
                source,
            })?;
            parts.push(part);
        }

        let mut registry = VesselRegistry::new();
        for (record, part) in records.iter().zip(&parts) {
            let key = registry.insert_vessel(part)?;
            registry.set_position(key, record.position);
            registry.set_rotation_degrees(key, record.rotation);
        }
        restore_docks(&mut registry)?;
        Ok(registry)
    }
}

/// Dock free ports of different vessels that coincide, closest first
fn restore_docks(registry: &mut VesselRegistry) -> Result<usize, DockingError> {
    let mut free: Vec<(PortKey, VesselKey, Vec3)> = Vec::new();
    for vessel in registry.vessels() {
        for port in vessel.ports() {
            if !registry.ports()[*port].is_occupied() {
                free.push((*port, vessel.key(), registry.port_world_position(*port)?));
            }
        }
    }

    let mut touching = Vec::new();
    for (i, (a, a_vessel, a_position)) in free.iter().enumerate() {
        for (b, b_vessel, b_position) in &free[i + 1..] {
            let distance_squared = (a_position - b_position).norm_squared();
            if a_vessel != b_vessel && distance_squared < RESTORE_DISTANCE_SQUARED {
                touching.push((distance_squared, *a, *b));
            }
        }
    }
    touching.sort_by(|x, y| x.0.total_cmp(&y.0));

    let mut docked = 0;
    for (_, a, b) in touching {
        if registry.ports()[a].is_occupied() || registry.ports()[b].is_occupied() {
            continue;
        }
        registry.dock(a, b)?;
        docked += 1;
    }
    log::debug!("Restored {} dock(s)", docked);
    Ok(docked)
}
