//! Vessel registry
//!
//! Owns everything a session places in the scene: the node tree, the vessel
//! table, the global port table and the uid index. Vessels are scene roots,
//! so their local and absolute transforms coincide.
//!
//! Accessors taking a [`VesselKey`] panic when the key is stale, the same
//! contract as [`SceneNodes`]. Operations that are expected to see arbitrary
//! port handles return [`DockingError`] instead.

use std::collections::HashMap;

use thiserror::Error;

use super::docking_port::{self, DockingError, DockingPort, PortTable, PortVisibility};
use super::vessel_node::VesselNode;
use crate::assets::LoadedPart;
use crate::foundation::collections::{PortKey, SlotMap, VesselKey};
use crate::foundation::math::{self, Quat, Transform, TransformError, Vec3};
use crate::scene::{SceneNodes, AABB};

/// Registry errors
#[derive(Debug, Clone, Copy, PartialEq, Error)]
pub enum RegistryError {
    /// A vessel with this uid already exists
    #[error("vessel uid {0} is already registered")]
    DuplicateUid(u32),

    /// A port definition does not fix an orientation
    #[error("invalid docking port frame: {0}")]
    Frame(#[from] TransformError),
}

/// All vessels of an editor session
#[derive(Debug, Default)]
pub struct VesselRegistry {
    nodes: SceneNodes,
    vessels: SlotMap<VesselKey, VesselNode>,
    ports: PortTable,
    uids: HashMap<u32, VesselKey>,
    order: Vec<VesselKey>,
    next_uid: u32,
}

impl VesselRegistry {
    /// Create an empty registry
    pub fn new() -> Self {
        Self::default()
    }

    /// First uid at or after `start` that no vessel uses
    pub fn find_free_uid(&self, start: u32) -> u32 {
        (start..=u32::MAX)
            .chain(0..start)
            .find(|uid| !self.uids.contains_key(uid))
            .unwrap_or(start)
    }

    /// Instantiate a part at the origin under a fresh uid
    pub fn insert_vessel(&mut self, part: &LoadedPart) -> Result<VesselKey, RegistryError> {
        let uid = self.find_free_uid(self.next_uid);
        self.insert_vessel_with_uid(part, uid)
    }

    /// Instantiate a part at the origin under a given uid
    pub fn insert_vessel_with_uid(&mut self, part: &LoadedPart, uid: u32) -> Result<VesselKey, RegistryError> {
        if self.uids.contains_key(&uid) {
            return Err(RegistryError::DuplicateUid(uid));
        }
        let frames = part
            .definition
            .docking_ports
            .iter()
            .map(docking_port::frame_rotation)
            .collect::<Result<Vec<Quat>, _>>()?;

        let node = self.nodes.insert(None, Transform::identity());
        let key = self.vessels.insert_with_key(|key| VesselNode {
            key,
            uid,
            class_name: part.definition.class_name.clone(),
            mesh: part.mesh.clone(),
            ports: Vec::with_capacity(frames.len()),
            node,
        });

        for (definition, frame) in part.definition.docking_ports.iter().zip(frames) {
            let local = Transform::from_position_rotation(definition.position, frame);
            let marker = self.nodes.insert(Some(node), local);
            let helper = self.nodes.insert(Some(node), local);
            let port = self.ports.insert(DockingPort::new(key, *definition, marker, helper));
            self.vessels[key].ports.push(port);
        }

        self.uids.insert(uid, key);
        self.order.push(key);
        self.next_uid = uid.wrapping_add(1);
        log::debug!(
            "Registered vessel {} ({}) with {} docking port(s)",
            uid,
            part.definition.class_name,
            part.definition.docking_ports.len()
        );
        Ok(key)
    }

    /// Remove a vessel, undocking its ports and dropping its scene nodes
    pub fn remove_vessel(&mut self, key: VesselKey) -> Option<VesselNode> {
        let vessel = self.vessels.remove(key)?;
        for port in &vessel.ports {
            self.ports.remove(*port);
        }
        self.nodes.remove(vessel.node);
        self.uids.remove(&vessel.uid);
        self.order.retain(|existing| *existing != key);
        log::debug!("Removed vessel {}", vessel.uid);
        Some(vessel)
    }

    /// Look up a vessel
    pub fn vessel(&self, key: VesselKey) -> Option<&VesselNode> {
        self.vessels.get(key)
    }

    /// Look up a vessel by uid
    pub fn vessel_by_uid(&self, uid: u32) -> Option<&VesselNode> {
        self.uids.get(&uid).and_then(|key| self.vessels.get(*key))
    }

    /// Vessels in insertion order
    pub fn vessels(&self) -> impl Iterator<Item = &VesselNode> + '_ {
        self.order.iter().map(|key| &self.vessels[*key])
    }

    /// Vessel handles in insertion order
    pub fn keys(&self) -> &[VesselKey] {
        &self.order
    }

    /// Whether the vessel exists
    pub fn contains(&self, key: VesselKey) -> bool {
        self.vessels.contains_key(key)
    }

    /// Number of vessels
    pub fn len(&self) -> usize {
        self.vessels.len()
    }

    /// Whether there are no vessels
    pub fn is_empty(&self) -> bool {
        self.vessels.is_empty()
    }

    /// Scene node tree
    pub fn nodes(&self) -> &SceneNodes {
        &self.nodes
    }

    /// Global port table
    pub fn ports(&self) -> &PortTable {
        &self.ports
    }

    /// Look up a port
    pub fn port(&self, key: PortKey) -> Option<&DockingPort> {
        self.ports.get(key)
    }

    /// Absolute transform of a vessel
    pub fn transform(&self, key: VesselKey) -> Transform {
        self.vessels[key].transform(&self.nodes)
    }

    /// Place a vessel
    pub fn set_transform(&mut self, key: VesselKey, transform: Transform) {
        self.nodes.set_absolute_transform(self.vessels[key].node, transform);
    }

    /// Vessel position
    pub fn position(&self, key: VesselKey) -> Vec3 {
        self.nodes.absolute_position(self.vessels[key].node)
    }

    /// Move a vessel
    pub fn set_position(&mut self, key: VesselKey, position: Vec3) {
        self.nodes.set_absolute_position(self.vessels[key].node, position);
    }

    /// Vessel orientation
    pub fn rotation(&self, key: VesselKey) -> Quat {
        self.nodes.absolute_rotation(self.vessels[key].node)
    }

    /// Turn a vessel
    pub fn set_rotation(&mut self, key: VesselKey, rotation: Quat) {
        self.nodes.set_absolute_rotation(self.vessels[key].node, rotation);
    }

    /// Vessel orientation as Euler degrees
    pub fn rotation_degrees(&self, key: VesselKey) -> Vec3 {
        math::quaternion_to_euler_degrees(&self.rotation(key))
    }

    /// Turn a vessel to the given Euler degrees
    pub fn set_rotation_degrees(&mut self, key: VesselKey, euler: Vec3) {
        self.set_rotation(key, math::euler_degrees_to_quaternion(euler));
    }

    /// `local` rotated by a vessel's orientation
    pub fn rotated_direction(&self, key: VesselKey, local: Vec3) -> Vec3 {
        self.vessels[key].rotated_direction(&self.nodes, local)
    }

    /// World-space bounding box of a vessel
    pub fn transformed_bounding_box(&self, key: VesselKey) -> AABB {
        self.vessels[key].transformed_bounding_box(&self.nodes)
    }

    /// Vessel owning a port
    pub fn port_owner(&self, port: PortKey) -> Result<VesselKey, DockingError> {
        self.ports
            .get(port)
            .map(DockingPort::vessel)
            .ok_or(DockingError::UnknownPort(port))
    }

    /// World position of a port
    pub fn port_world_position(&self, port: PortKey) -> Result<Vec3, DockingError> {
        let owner = self.port_owner(port)?;
        self.vessels[owner].port_world_position(&self.nodes, &self.ports, port)
    }

    /// World approach direction of a port
    pub fn port_world_direction(&self, port: PortKey) -> Result<Vec3, DockingError> {
        let owner = self.port_owner(port)?;
        Ok(self.rotated_direction(owner, self.ports[port].approach_direction()))
    }

    /// Align the vessel owning `our_port` so that port meets `their_port`
    pub fn snap_to(&mut self, our_port: PortKey, their_port: PortKey) -> Result<(), DockingError> {
        let owner = self.port_owner(our_port)?;
        self.vessels[owner]
            .snap_to(&mut self.nodes, &self.ports, our_port, their_port)
            .map_err(|err| {
                log::warn!("Snap of {:?} onto {:?} rejected: {}", our_port, their_port, err);
                err
            })
    }

    /// Dock two ports
    pub fn dock(&mut self, our_port: PortKey, their_port: PortKey) -> Result<(), DockingError> {
        let owner = self.port_owner(our_port)?;
        self.vessels[owner].dock(&mut self.ports, our_port, their_port).map_err(|err| {
            log::warn!("Dock of {:?} to {:?} rejected: {}", our_port, their_port, err);
            err
        })
    }

    /// Undock a port. Returns the former partner.
    pub fn undock(&mut self, port: PortKey) -> Result<Option<PortKey>, DockingError> {
        self.ports.undock(port)
    }

    /// Vessel on the other side of a docked port
    pub fn docked_vessel(&self, port: PortKey) -> Option<VesselKey> {
        let linked = self.ports.get(port)?.linked_port()?;
        self.ports.get(linked).map(DockingPort::vessel)
    }

    /// Apply port visibility flags to one vessel
    pub fn change_port_visibility(&mut self, key: VesselKey, flags: PortVisibility) {
        self.vessels[key].change_port_visibility(&mut self.nodes, &self.ports, flags);
    }
}
