//! Foundation module - Core utilities and types
//!
//! This module provides fundamental utilities used throughout the engine:
//! - Math types, rigid transforms and rotation conversions
//! - Handle types for the vessel, port and scene node tables
//! - Logging utilities

pub mod math;
pub mod collections;
pub mod logging;
