//! Vessel stacks
//!
//! A stack is the set of vessels connected to a seed vessel through docked
//! ports. It is a view over a [`VesselRegistry`]: it stores handles only and
//! every operation takes the registry it works on.

use std::collections::HashSet;

use thiserror::Error;

use super::docking_port::{DockingError, PortVisibility};
use super::registry::VesselRegistry;
use crate::foundation::collections::{PortKey, VesselKey};
use crate::foundation::math::{self, Vec3};
use crate::scene::AABB;

/// Ports closer than this (squared distance) snap together
pub const SNAP_DISTANCE_SQUARED: f32 = 16.0;

/// Stack errors
#[derive(Debug, Clone, Copy, PartialEq, Error)]
pub enum StackError {
    /// A referenced move ran without a matching position snapshot
    #[error("move reference not set: {snapshot} stored positions for {members} vessels")]
    ReferenceNotSet {
        /// Number of stored positions
        snapshot: usize,
        /// Number of stack members
        members: usize,
    },

    /// A member was removed from the registry after the stack was built
    #[error("stack member {0:?} no longer exists")]
    StaleMember(VesselKey),

    /// Snapping or docking failed
    #[error(transparent)]
    Docking(#[from] DockingError),
}

/// A free port of the stack paired with a free port outside it
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PortPair {
    /// Port on a stack member
    pub ours: PortKey,
    /// Port on a candidate vessel
    pub theirs: PortKey,
}

/// Result of a proximity check
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SnapOutcome {
    /// No free ports within snapping distance
    Nothing,
    /// The stack was aligned onto this pair without docking
    Snapped(PortPair),
    /// These pairs were docked, closest first
    Docked(Vec<PortPair>),
}

/// Connected group of docked vessels
#[derive(Debug, Clone)]
pub struct VesselStack {
    seed: VesselKey,
    members: Vec<VesselKey>,
    previous_positions: Vec<Vec3>,
    move_reference: Vec3,
}

impl VesselStack {
    /// Collect every vessel connected to `seed`
    pub fn build(registry: &VesselRegistry, seed: VesselKey) -> Result<Self, StackError> {
        if !registry.contains(seed) {
            return Err(StackError::StaleMember(seed));
        }
        let members = discover(registry, seed);
        log::debug!("Built stack of {} vessel(s)", members.len());
        Ok(Self {
            seed,
            members,
            previous_positions: Vec::new(),
            move_reference: Vec3::zeros(),
        })
    }

    /// Re-collect members from the seed after the dock graph changed.
    /// Clears the move snapshot.
    pub fn rebuild(&mut self, registry: &VesselRegistry) -> Result<(), StackError> {
        *self = Self::build(registry, self.seed)?;
        Ok(())
    }

    /// Vessel the stack was built from
    pub fn seed(&self) -> VesselKey {
        self.seed
    }

    /// Number of vessels in the stack
    pub fn num_vessels(&self) -> usize {
        self.members.len()
    }

    /// Member by index, in discovery order
    pub fn vessel(&self, index: usize) -> Option<VesselKey> {
        self.members.get(index).copied()
    }

    /// All members in discovery order
    pub fn members(&self) -> &[VesselKey] {
        &self.members
    }

    /// Whether a vessel belongs to the stack
    pub fn contains(&self, vessel: VesselKey) -> bool {
        self.members.contains(&vessel)
    }

    /// Combined world-space bounding box of all live members
    pub fn bounding_box(&self, registry: &VesselRegistry) -> Option<AABB> {
        let mut boxes = self
            .members
            .iter()
            .filter(|key| registry.contains(**key))
            .map(|key| registry.transformed_bounding_box(*key));
        let mut bounds = boxes.next()?;
        for other in boxes {
            bounds.add_box(&other);
        }
        Some(bounds)
    }

    /// Rotate the whole stack rigidly about its bounding-box center
    pub fn rotate(&self, registry: &mut VesselRegistry, delta_degrees: Vec3) -> Result<(), StackError> {
        self.ensure_members(registry)?;
        let delta = math::euler_degrees_to_quaternion(delta_degrees);

        for key in &self.members {
            let rotation = registry.rotation(*key);
            registry.set_rotation(*key, delta * rotation);
        }

        let center = self
            .bounding_box(registry)
            .map(|bounds| bounds.center())
            .unwrap_or_else(Vec3::zeros);
        for key in &self.members {
            let position = registry.position(*key);
            let offset = position - center;
            registry.set_position(*key, position + delta * offset - offset);
        }
        Ok(())
    }

    /// Snapshot member positions for a referenced move
    pub fn set_move_reference(&mut self, registry: &VesselRegistry, reference: Vec3) -> Result<(), StackError> {
        self.ensure_members(registry)?;
        self.previous_positions = self.members.iter().map(|key| registry.position(*key)).collect();
        self.move_reference = reference;
        Ok(())
    }

    /// Place every member at its snapshot position shifted by
    /// `position - reference`
    pub fn move_referenced(&self, registry: &mut VesselRegistry, position: Vec3) -> Result<(), StackError> {
        if self.previous_positions.len() != self.members.len() {
            log::warn!("Referenced move without a matching position snapshot");
            return Err(StackError::ReferenceNotSet {
                snapshot: self.previous_positions.len(),
                members: self.members.len(),
            });
        }
        self.ensure_members(registry)?;

        let shift = position - self.move_reference;
        for (key, previous) in self.members.iter().zip(&self.previous_positions) {
            registry.set_position(*key, previous + shift);
        }
        Ok(())
    }

    /// Move every member by `delta`
    pub fn move_relative(&mut self, registry: &mut VesselRegistry, delta: Vec3) -> Result<(), StackError> {
        self.set_move_reference(registry, Vec3::zeros())?;
        self.move_referenced(registry, delta)
    }

    /// Look for free stack ports near free ports of `candidates`.
    ///
    /// Pairs are taken closest first and each port is used at most once.
    /// Without `should_dock` the closest pair is snapped and the rest of
    /// the stack follows the snapped vessel. With `should_dock` every
    /// non-conflicting pair is docked and the stack is rebuilt.
    pub fn check_for_snapping(
        &mut self,
        registry: &mut VesselRegistry,
        candidates: &[VesselKey],
        should_dock: bool,
    ) -> Result<SnapOutcome, StackError> {
        self.ensure_members(registry)?;
        let pairs = self.pairs_in_range(registry, candidates)?;
        if pairs.is_empty() {
            return Ok(SnapOutcome::Nothing);
        }

        if !should_dock {
            let closest = pairs[0];
            self.snap_pair(registry, closest)?;
            return Ok(SnapOutcome::Snapped(closest));
        }

        let mut claimed = HashSet::new();
        let mut docked = Vec::new();
        for pair in pairs {
            if claimed.contains(&pair.ours) || claimed.contains(&pair.theirs) {
                continue;
            }
            registry.dock(pair.ours, pair.theirs)?;
            claimed.insert(pair.ours);
            claimed.insert(pair.theirs);
            docked.push(pair);
        }
        log::debug!("Docked {} port pair(s)", docked.len());
        self.rebuild(registry)?;
        Ok(SnapOutcome::Docked(docked))
    }

    /// Apply port visibility flags to every member
    pub fn change_port_visibility(&self, registry: &mut VesselRegistry, flags: PortVisibility) {
        for key in &self.members {
            if registry.contains(*key) {
                registry.change_port_visibility(*key, flags);
            }
        }
    }

    /// Free port pairs within snapping distance, closest first
    fn pairs_in_range(
        &self,
        registry: &VesselRegistry,
        candidates: &[VesselKey],
    ) -> Result<Vec<PortPair>, StackError> {
        let ours = self.free_ports(registry, &self.members)?;
        let outside: Vec<VesselKey> = candidates
            .iter()
            .copied()
            .filter(|key| registry.contains(*key) && !self.contains(*key))
            .collect();
        let theirs = self.free_ports(registry, &outside)?;

        let mut in_range = Vec::new();
        for (our_port, our_position) in &ours {
            for (their_port, their_position) in &theirs {
                let distance_squared = (our_position - their_position).norm_squared();
                if distance_squared < SNAP_DISTANCE_SQUARED {
                    in_range.push((distance_squared, PortPair { ours: *our_port, theirs: *their_port }));
                }
            }
        }
        in_range.sort_by(|a, b| a.0.total_cmp(&b.0));
        Ok(in_range.into_iter().map(|(_, pair)| pair).collect())
    }

    fn free_ports(
        &self,
        registry: &VesselRegistry,
        vessels: &[VesselKey],
    ) -> Result<Vec<(PortKey, Vec3)>, StackError> {
        let mut free = Vec::new();
        for key in vessels {
            for port in registry.vessel(*key).map(|vessel| vessel.ports()).unwrap_or_default() {
                if !registry.ports()[*port].is_occupied() {
                    free.push((*port, registry.port_world_position(*port)?));
                }
            }
        }
        Ok(free)
    }

    fn snap_pair(&self, registry: &mut VesselRegistry, pair: PortPair) -> Result<(), StackError> {
        let snapped = registry.port_owner(pair.ours)?;
        let before = registry.transform(snapped);
        registry.snap_to(pair.ours, pair.theirs)?;
        let after = registry.transform(snapped);

        let delta = after.combine(&before.inverse());
        for key in self.members.iter().filter(|key| **key != snapped) {
            let moved = delta.combine(&registry.transform(*key));
            registry.set_transform(*key, moved);
        }
        Ok(())
    }

    fn ensure_members(&self, registry: &VesselRegistry) -> Result<(), StackError> {
        match self.members.iter().find(|key| !registry.contains(**key)) {
            Some(stale) => Err(StackError::StaleMember(*stale)),
            None => Ok(()),
        }
    }
}

/// Depth-first walk over the dock graph. Never re-enters a vessel and never
/// leaves through the port it arrived by.
fn discover(registry: &VesselRegistry, seed: VesselKey) -> Vec<VesselKey> {
    let mut members = vec![seed];
    let mut visited = HashSet::from([seed]);
    let mut pending: Vec<(VesselKey, Option<PortKey>)> = vec![(seed, None)];

    while let Some((current, arrived_through)) = pending.pop() {
        let Some(vessel) = registry.vessel(current) else {
            continue;
        };
        for port in vessel.ports() {
            if Some(*port) == arrived_through {
                continue;
            }
            let Some(linked) = registry.ports()[*port].linked_port() else {
                continue;
            };
            let neighbour = registry.ports()[linked].vessel();
            if visited.insert(neighbour) {
                members.push(neighbour);
                pending.push((neighbour, Some(linked)));
            }
        }
    }
    members
}
