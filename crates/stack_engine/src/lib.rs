//! # Stack Engine
//!
//! Stack assembly and docking alignment for a modular spacecraft editor.
//!
//! ## Features
//!
//! - **Docking Ports**: Symmetric dock relation over a global port table
//! - **Stacks**: Connected vessels that rotate, move and snap as one body
//! - **Snapping**: Exact port-to-port alignment with proximity detection
//! - **Sessions**: Plain-text session files and part configs
//!
//! ## Quick Start
//!
//! ```rust,no_run
//! use stack_engine::prelude::*;
//!
//! fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     let config = EditorConfig::new().with_working_directory("orbiter");
//!     let meshes = MeshLibrary::with_fallback(AABB::from_center_extents(Vec3::zeros(), Vec3::repeat(1.0)));
//!     let mut session = EditorSession::new(config, Box::new(meshes));
//!
//!     session.spawn_part("ShuttleA")?;
//!     let second = session.spawn_part("ShuttleA")?;
//!     session.registry_mut().set_position(second, Vec3::new(0.0, 0.0, 12.0));
//!
//!     session.select(second)?;
//!     session.snap_selection(true)?;
//!     session.save_session("assembly.scn")?;
//!     Ok(())
//! }
//! ```

#![warn(missing_docs)]
#![warn(clippy::all, clippy::pedantic, clippy::nursery)]
#![allow(clippy::module_name_repetitions, clippy::similar_names, clippy::too_many_arguments)]

// Core modules
pub mod core;
pub mod foundation;
pub mod config;

pub mod assets;
pub mod scene;
pub mod vessel;
pub mod session;

/// Common imports for engine users
pub mod prelude {
    pub use crate::{
        assets::{LoadedPart, MeshLibrary, MeshProvider, PartDefinition, PartLibrary, PortDefinition},
        core::config::{Config, EditorConfig},
        foundation::{
            collections::{PortKey, VesselKey},
            math::{Quat, Transform, Vec3},
        },
        scene::AABB,
        session::{EditorError, EditorSession},
        vessel::{PortVisibility, SnapOutcome, VesselRegistry, VesselStack},
    };
}
