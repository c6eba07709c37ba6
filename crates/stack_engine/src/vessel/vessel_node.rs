//! A single vessel placed in the scene
//!
//! [`VesselNode`] holds only handles: its transform lives in the
//! [`SceneNodes`] tree and its ports in the [`PortTable`]. Methods take the
//! tables they read or write explicitly.

use std::sync::Arc;

use super::docking_port::{port_forward, port_up, DockingError, PortTable, PortVisibility};
use crate::assets::VesselMesh;
use crate::foundation::collections::{NodeKey, PortKey, VesselKey};
use crate::foundation::math::{self, Quat, Transform, Vec3};
use crate::scene::{SceneNodes, AABB};

/// A vessel instance: part class, mesh, ports and scene node
#[derive(Debug, Clone)]
pub struct VesselNode {
    pub(super) key: VesselKey,
    pub(super) uid: u32,
    pub(super) class_name: String,
    pub(super) mesh: Arc<VesselMesh>,
    pub(super) ports: Vec<PortKey>,
    pub(super) node: NodeKey,
}

impl VesselNode {
    /// Handle of this vessel in its registry
    pub fn key(&self) -> VesselKey {
        self.key
    }

    /// Unique id, stable across save and load
    pub fn uid(&self) -> u32 {
        self.uid
    }

    /// Part class this vessel was built from
    pub fn class_name(&self) -> &str {
        &self.class_name
    }

    /// Shared mesh data
    pub fn mesh(&self) -> &Arc<VesselMesh> {
        &self.mesh
    }

    /// Docking ports in part-definition order
    pub fn ports(&self) -> &[PortKey] {
        &self.ports
    }

    /// Scene node carrying the vessel transform
    pub fn node(&self) -> NodeKey {
        self.node
    }

    /// Absolute transform of the vessel
    pub fn transform(&self, nodes: &SceneNodes) -> Transform {
        nodes.absolute_transform(self.node)
    }

    /// `local` rotated by the vessel's current absolute rotation
    pub fn rotated_direction(&self, nodes: &SceneNodes, local: Vec3) -> Vec3 {
        nodes.absolute_rotation(self.node) * local
    }

    /// World position of one of this vessel's ports
    pub fn port_world_position(
        &self,
        nodes: &SceneNodes,
        ports: &PortTable,
        port: PortKey,
    ) -> Result<Vec3, DockingError> {
        let port = self.own_port(ports, port)?;
        Ok(self.transform(nodes).transform_point(ports[port].position()))
    }

    /// Mesh bounding box mapped through the absolute transform
    pub fn transformed_bounding_box(&self, nodes: &SceneNodes) -> AABB {
        self.mesh.bounding_box.transformed(&self.transform(nodes))
    }

    /// Turn and move this vessel so `our_port` sits on `their_port`, facing
    /// it with matching roll. Ports are not docked and their occupancy is
    /// not checked.
    pub fn snap_to(
        &self,
        nodes: &mut SceneNodes,
        ports: &PortTable,
        our_port: PortKey,
        their_port: PortKey,
    ) -> Result<(), DockingError> {
        let our_port = self.own_port(ports, our_port)?;
        let theirs = ports.get(their_port).ok_or(DockingError::UnknownPort(their_port))?;
        let our_marker = ports[our_port].marker();

        let their_marker = nodes.absolute_transform(theirs.marker());
        let their_dir = (their_marker.rotation * -port_forward()).normalize();
        let their_up = (their_marker.rotation * port_up()).normalize();

        let port_to_world = math::alignment_rotation(port_forward(), port_up(), their_dir, their_up)?;
        let vessel_to_port: Quat = nodes.rotation(our_marker).inverse();
        nodes.set_absolute_rotation(self.node, port_to_world * vessel_to_port);

        let offset = nodes.absolute_position(our_marker) - nodes.absolute_position(self.node);
        nodes.set_absolute_position(self.node, their_marker.position - offset);

        log::debug!(
            "Snapped vessel {} port {:?} onto port {:?} at {:?}",
            self.uid,
            our_port,
            their_port,
            their_marker.position
        );
        Ok(())
    }

    /// Record `our_port` and `their_port` as docked. No geometry changes.
    pub fn dock(
        &self,
        ports: &mut PortTable,
        our_port: PortKey,
        their_port: PortKey,
    ) -> Result<(), DockingError> {
        let our_port = self.own_port(ports, our_port)?;
        ports.dock(our_port, their_port)
    }

    /// Show or hide each port's marker and helper nodes
    pub fn change_port_visibility(&self, nodes: &mut SceneNodes, ports: &PortTable, flags: PortVisibility) {
        for port in self.ports.iter().filter_map(|key| ports.get(*key)) {
            let visible = if port.is_occupied() {
                flags.contains(PortVisibility::SHOW_DOCKED)
            } else {
                flags.contains(PortVisibility::SHOW_EMPTY)
            };
            let (chosen, other) = if flags.contains(PortVisibility::USE_HELPER) {
                (port.helper(), port.marker())
            } else {
                (port.marker(), port.helper())
            };
            nodes.set_visible(chosen, visible);
            nodes.set_visible(other, false);
        }
    }

    fn own_port(&self, ports: &PortTable, port: PortKey) -> Result<PortKey, DockingError> {
        match ports.get(port) {
            None => Err(DockingError::UnknownPort(port)),
            Some(found) if found.vessel() != self.key => Err(DockingError::ForeignPort(port)),
            Some(_) => Ok(port),
        }
    }
}
