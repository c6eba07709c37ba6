//! # Core Module
//!
//! Shared abstractions the rest of the crate builds on.
//!
//! ## Organization
//!
//! - **Config**: Editor configuration and its file formats
//! - **Foundation**: Low-level utilities (math, handles, logging)
//! - **Assets**: Part and mesh loading

pub mod config;

// Re-export foundation modules for convenience
pub use crate::assets;
pub use crate::foundation;

pub use config::{Config, ConfigError, EditorConfig};
