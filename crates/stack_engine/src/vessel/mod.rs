//! Vessels, docking ports and stacks
//!
//! Provides the docking model of the editor: vessels built from parts, the
//! symmetric dock relation between their ports, and stacks of connected
//! vessels that move, rotate and snap as one rigid body.

pub mod docking_port;
pub mod registry;
pub mod stack;
pub mod vessel_node;

pub use docking_port::{DockingError, DockingPort, PortTable, PortVisibility};
pub use registry::{RegistryError, VesselRegistry};
pub use stack::{PortPair, SnapOutcome, StackError, VesselStack, SNAP_DISTANCE_SQUARED};
pub use vessel_node::VesselNode;

#[cfg(test)]
mod tests;
