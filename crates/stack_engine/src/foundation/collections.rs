//! Handle types for the engine's slot-map backed tables
//!
//! Vessels, docking ports and scene nodes all live in [`SlotMap`]s and refer
//! to each other through these keys instead of references, so relations stay
//! valid when other entries are inserted or removed.

pub use slotmap::SlotMap;

slotmap::new_key_type! {
    /// Handle to a vessel in the [`VesselRegistry`](crate::vessel::VesselRegistry)
    pub struct VesselKey;

    /// Handle to a docking port in the global [`PortTable`](crate::vessel::PortTable)
    pub struct PortKey;

    /// Handle to a node in the [`SceneNodes`](crate::scene::SceneNodes) tree
    pub struct NodeKey;
}
