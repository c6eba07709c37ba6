//! Docking ports and the global port table
//!
//! Every port lives in one [`PortTable`] shared by all vessels. The dock
//! relation is a pair of `Option<PortKey>` entries that always point at each
//! other; [`PortTable::dock`] and [`PortTable::undock`] are the only ways to
//! change it.

use std::ops::Index;

use thiserror::Error;

use crate::assets::PortDefinition;
use crate::foundation::collections::{NodeKey, PortKey, SlotMap, VesselKey};
use crate::foundation::math::{self, Quat, TransformError, Vec3};

/// Axis a port marker looks along in its own frame
pub fn port_forward() -> Vec3 {
    Vec3::new(0.0, 0.0, 1.0)
}

/// Up axis of a port marker in its own frame
pub fn port_up() -> Vec3 {
    Vec3::new(0.0, 1.0, 0.0)
}

/// Docking errors
#[derive(Debug, Clone, Copy, PartialEq, Error)]
pub enum DockingError {
    /// Port is already linked to another port
    #[error("docking port {port:?} is already occupied")]
    AlreadyOccupied {
        /// The occupied port
        port: PortKey,
    },

    /// Attempted to dock a port to itself
    #[error("a docking port cannot dock to itself")]
    SelfLink,

    /// Port handle does not refer to a live port
    #[error("unknown docking port {0:?}")]
    UnknownPort(PortKey),

    /// Port belongs to a different vessel than the one asked to use it
    #[error("docking port {0:?} does not belong to this vessel")]
    ForeignPort(PortKey),

    /// Port frame could not be aligned
    #[error(transparent)]
    Alignment(#[from] TransformError),
}

bitflags::bitflags! {
    /// Which port nodes a stack shows
    #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
    pub struct PortVisibility: u32 {
        /// Show ports that are not docked
        const SHOW_EMPTY = 0b0000_0001;
        /// Show ports that are docked
        const SHOW_DOCKED = 0b0000_0010;
        /// Draw the helper node instead of the marker
        const USE_HELPER = 0b0000_0100;
    }
}

/// An oriented attachment point owned by one vessel
#[derive(Debug, Clone)]
pub struct DockingPort {
    vessel: VesselKey,
    definition: PortDefinition,
    marker: NodeKey,
    helper: NodeKey,
    linked: Option<PortKey>,
}

impl DockingPort {
    /// Create a free port
    pub fn new(vessel: VesselKey, definition: PortDefinition, marker: NodeKey, helper: NodeKey) -> Self {
        Self {
            vessel,
            definition,
            marker,
            helper,
            linked: None,
        }
    }

    /// Owning vessel
    pub fn vessel(&self) -> VesselKey {
        self.vessel
    }

    /// Position in vessel-local coordinates
    pub fn position(&self) -> Vec3 {
        self.definition.position
    }

    /// Outward docking axis in vessel-local coordinates
    pub fn approach_direction(&self) -> Vec3 {
        self.definition.approach_direction
    }

    /// Roll reference axis in vessel-local coordinates
    pub fn reference_direction(&self) -> Vec3 {
        self.definition.reference_direction
    }

    /// Marker scene node
    pub fn marker(&self) -> NodeKey {
        self.marker
    }

    /// Helper scene node
    pub fn helper(&self) -> NodeKey {
        self.helper
    }

    /// Port this one is docked to
    pub fn linked_port(&self) -> Option<PortKey> {
        self.linked
    }

    /// Whether the port is docked
    pub fn is_occupied(&self) -> bool {
        self.linked.is_some()
    }

    /// Rotation of the port frame relative to its vessel: maps
    /// [`port_forward`] onto the approach direction and [`port_up`] onto
    /// the reference direction.
    pub fn frame_rotation(&self) -> Result<Quat, TransformError> {
        frame_rotation(&self.definition)
    }
}

/// Rotation of a port frame relative to its vessel
pub fn frame_rotation(definition: &PortDefinition) -> Result<Quat, TransformError> {
    math::alignment_rotation(
        port_forward(),
        port_up(),
        definition.approach_direction,
        definition.reference_direction,
    )
}

/// Table of every docking port in a registry
#[derive(Debug, Default)]
pub struct PortTable {
    ports: SlotMap<PortKey, DockingPort>,
}

impl PortTable {
    /// Create an empty table
    pub fn new() -> Self {
        Self::default()
    }

    /// Add a free port
    pub fn insert(&mut self, port: DockingPort) -> PortKey {
        self.ports.insert(DockingPort { linked: None, ..port })
    }

    /// Remove a port, undocking it first
    pub fn remove(&mut self, key: PortKey) -> Option<DockingPort> {
        let port = self.ports.remove(key)?;
        if let Some(partner) = port.linked.and_then(|linked| self.ports.get_mut(linked)) {
            partner.linked = None;
        }
        Some(DockingPort { linked: None, ..port })
    }

    /// Look up a port
    pub fn get(&self, key: PortKey) -> Option<&DockingPort> {
        self.ports.get(key)
    }

    /// Whether the port exists
    pub fn contains(&self, key: PortKey) -> bool {
        self.ports.contains_key(key)
    }

    /// Number of ports
    pub fn len(&self) -> usize {
        self.ports.len()
    }

    /// Whether the table is empty
    pub fn is_empty(&self) -> bool {
        self.ports.is_empty()
    }

    /// Iterate over all ports
    pub fn iter(&self) -> impl Iterator<Item = (PortKey, &DockingPort)> {
        self.ports.iter()
    }

    /// Link two free ports to each other. Leaves both untouched on error.
    pub fn dock(&mut self, a: PortKey, b: PortKey) -> Result<(), DockingError> {
        if a == b {
            return Err(DockingError::SelfLink);
        }
        for key in [a, b] {
            let port = self.ports.get(key).ok_or(DockingError::UnknownPort(key))?;
            if port.is_occupied() {
                return Err(DockingError::AlreadyOccupied { port: key });
            }
        }

        self.ports[a].linked = Some(b);
        self.ports[b].linked = Some(a);
        log::debug!("Docked port {:?} to {:?}", a, b);
        Ok(())
    }

    /// Free a port and its partner. Returns the former partner, or `None`
    /// when the port was already free.
    pub fn undock(&mut self, key: PortKey) -> Result<Option<PortKey>, DockingError> {
        let port = self.ports.get_mut(key).ok_or(DockingError::UnknownPort(key))?;
        let Some(partner) = port.linked.take() else {
            return Ok(None);
        };
        if let Some(other) = self.ports.get_mut(partner) {
            other.linked = None;
        }
        log::debug!("Undocked port {:?} from {:?}", key, partner);
        Ok(Some(partner))
    }
}

impl Index<PortKey> for PortTable {
    type Output = DockingPort;

    fn index(&self, key: PortKey) -> &Self::Output {
        &self.ports[key]
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    fn free_port(table: &mut PortTable) -> PortKey {
        let definition = PortDefinition::new(Vec3::zeros(), Vec3::z(), Vec3::y());
        table.insert(DockingPort::new(
            VesselKey::default(),
            definition,
            NodeKey::default(),
            NodeKey::default(),
        ))
    }

    #[test]
    fn test_dock_is_symmetric() {
        let mut table = PortTable::new();
        let a = free_port(&mut table);
        let b = free_port(&mut table);

        table.dock(a, b).unwrap();
        assert!(table[a].is_occupied() && table[b].is_occupied());
        assert_eq!(table[a].linked_port(), Some(b));
        assert_eq!(table[b].linked_port(), Some(a));

        assert_eq!(table.undock(a).unwrap(), Some(b));
        assert!(!table[a].is_occupied() && !table[b].is_occupied());
        assert_eq!(table.undock(b).unwrap(), None);
    }

    #[test]
    fn test_dock_rejects_occupied_and_self() {
        let mut table = PortTable::new();
        let a = free_port(&mut table);
        let b = free_port(&mut table);
        let c = free_port(&mut table);
        table.dock(a, b).unwrap();

        assert_eq!(table.dock(c, a), Err(DockingError::AlreadyOccupied { port: a }));
        assert!(!table[c].is_occupied());
        assert_eq!(table[a].linked_port(), Some(b));
        assert_eq!(table.dock(c, c), Err(DockingError::SelfLink));
    }

    #[test]
    fn test_remove_frees_partner() {
        let mut table = PortTable::new();
        let a = free_port(&mut table);
        let b = free_port(&mut table);
        table.dock(a, b).unwrap();

        table.remove(a);
        assert!(!table.contains(a));
        assert!(!table[b].is_occupied());
        assert_eq!(table.dock(a, b), Err(DockingError::UnknownPort(a)));
    }

    #[test]
    fn test_frame_rotation_maps_port_axes() {
        let definition = PortDefinition::new(Vec3::zeros(), Vec3::new(1.0, 0.0, 0.0), Vec3::z());
        let rotation = frame_rotation(&definition).unwrap();
        assert_relative_eq!(rotation * port_forward(), Vec3::x(), epsilon = 1e-5);
        assert_relative_eq!(rotation * port_up(), Vec3::z(), epsilon = 1e-5);
    }
}
