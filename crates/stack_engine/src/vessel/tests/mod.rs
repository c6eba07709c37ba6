//! Multi-vessel scenarios for stacks, snapping and docking

use std::sync::Arc;

use crate::assets::{LoadedPart, PartDefinition, PortDefinition, VesselMesh};
use crate::foundation::collections::{PortKey, VesselKey};
use crate::foundation::math::Vec3;
use crate::scene::AABB;
use crate::vessel::VesselRegistry;

mod docking;
mod stack_discovery;

/// Index of the +Z port of [`module_part`]
pub(super) const FORE: usize = 0;
/// Index of the -Z port of [`module_part`]
pub(super) const AFT: usize = 1;

/// Ten-unit cylinder-ish module with a port on each end
pub(super) fn module_part() -> LoadedPart {
    LoadedPart {
        definition: PartDefinition {
            class_name: "Module".to_string(),
            mesh_name: "module".to_string(),
            docking_ports: vec![
                PortDefinition::new(Vec3::new(0.0, 0.0, 5.0), Vec3::z(), Vec3::y()),
                PortDefinition::new(Vec3::new(0.0, 0.0, -5.0), -Vec3::z(), Vec3::y()),
            ],
        },
        mesh: Arc::new(VesselMesh {
            name: "module".to_string(),
            bounding_box: AABB::new(Vec3::new(-1.0, -1.0, -5.0), Vec3::new(1.0, 1.0, 5.0)),
        }),
    }
}

pub(super) fn spawn(registry: &mut VesselRegistry, position: Vec3, rotation_degrees: Vec3) -> VesselKey {
    let key = registry.insert_vessel(&module_part()).unwrap();
    registry.set_position(key, position);
    registry.set_rotation_degrees(key, rotation_degrees);
    key
}

pub(super) fn port(registry: &VesselRegistry, vessel: VesselKey, index: usize) -> PortKey {
    registry.vessel(vessel).unwrap().ports()[index]
}

/// Snap `ours` of `vessel` onto `theirs` of `target`, then dock them
pub(super) fn attach(
    registry: &mut VesselRegistry,
    vessel: VesselKey,
    ours: usize,
    target: VesselKey,
    theirs: usize,
) {
    let our_port = port(registry, vessel, ours);
    let their_port = port(registry, target, theirs);
    registry.snap_to(our_port, their_port).unwrap();
    registry.dock(our_port, their_port).unwrap();
}

/// Three modules docked nose to tail along +Z, starting at the origin
pub(super) fn chain_of_three(registry: &mut VesselRegistry) -> [VesselKey; 3] {
    let a = spawn(registry, Vec3::zeros(), Vec3::zeros());
    let b = spawn(registry, Vec3::new(40.0, 0.0, 0.0), Vec3::new(0.0, 90.0, 0.0));
    let c = spawn(registry, Vec3::new(-40.0, 3.0, 0.0), Vec3::new(15.0, 0.0, 70.0));
    attach(registry, b, AFT, a, FORE);
    attach(registry, c, AFT, b, FORE);
    [a, b, c]
}
