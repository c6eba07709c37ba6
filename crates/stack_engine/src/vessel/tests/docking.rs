use super::*;
use crate::vessel::{DockingError, PortTable, PortVisibility, RegistryError, VesselStack};

#[test]
fn test_dock_and_undock_through_registry() {
    let mut registry = VesselRegistry::new();
    let a = spawn(&mut registry, Vec3::zeros(), Vec3::zeros());
    let b = spawn(&mut registry, Vec3::new(0.0, 0.0, 10.0), Vec3::zeros());
    let (a_fore, b_aft) = (port(&registry, a, FORE), port(&registry, b, AFT));

    registry.dock(a_fore, b_aft).unwrap();
    let ports = registry.ports();
    assert!(ports[a_fore].is_occupied() && ports[b_aft].is_occupied());
    assert_eq!(ports[a_fore].linked_port(), Some(b_aft));
    assert_eq!(ports[b_aft].linked_port(), Some(a_fore));
    assert_eq!(registry.docked_vessel(b_aft), Some(a));

    assert_eq!(
        registry.dock(port(&registry, b, FORE), a_fore),
        Err(DockingError::AlreadyOccupied { port: a_fore })
    );

    assert_eq!(registry.undock(b_aft).unwrap(), Some(a_fore));
    assert!(!registry.ports()[a_fore].is_occupied());
    assert!(!registry.ports()[b_aft].is_occupied());
}

#[test]
fn test_vessel_only_uses_its_own_ports() {
    let mut registry = VesselRegistry::new();
    let a = spawn(&mut registry, Vec3::zeros(), Vec3::zeros());
    let b = spawn(&mut registry, Vec3::new(0.0, 0.0, 10.0), Vec3::zeros());

    let vessel = registry.vessel(a).unwrap().clone();
    let foreign = port(&registry, b, AFT);
    let mut ports = PortTable::new();
    assert_eq!(
        vessel.dock(&mut ports, foreign, port(&registry, a, FORE)),
        Err(DockingError::UnknownPort(foreign))
    );
    assert_eq!(
        vessel.port_world_position(registry.nodes(), registry.ports(), foreign),
        Err(DockingError::ForeignPort(foreign))
    );
}

#[test]
fn test_remove_vessel_frees_partner_and_nodes() {
    let mut registry = VesselRegistry::new();
    let [a, b, c] = chain_of_three(&mut registry);
    let node_count = registry.nodes().len();
    let b_uid = registry.vessel(b).unwrap().uid();

    let removed = registry.remove_vessel(b).unwrap();
    assert_eq!(removed.uid(), b_uid);
    assert!(registry.vessel_by_uid(b_uid).is_none());
    assert_eq!(registry.nodes().len(), node_count - 5);
    assert_eq!(registry.ports().len(), 4);
    assert!(!registry.ports()[port(&registry, a, FORE)].is_occupied());
    assert!(!registry.ports()[port(&registry, c, AFT)].is_occupied());
    assert_eq!(registry.keys(), &[a, c]);
}

#[test]
fn test_uids_are_unique() {
    let mut registry = VesselRegistry::new();
    let part = module_part();

    let first = registry.insert_vessel_with_uid(&part, 5).unwrap();
    assert_eq!(
        registry.insert_vessel_with_uid(&part, 5),
        Err(RegistryError::DuplicateUid(5))
    );
    registry.insert_vessel_with_uid(&part, 6).unwrap();
    registry.insert_vessel_with_uid(&part, 0).unwrap();

    assert_eq!(registry.find_free_uid(5), 7);
    let next = registry.insert_vessel(&part).unwrap();
    assert_eq!(registry.vessel(next).unwrap().uid(), 1);
    assert_eq!(registry.vessel_by_uid(5).unwrap().key(), first);
    assert_eq!(registry.len(), 4);
}

#[test]
fn test_port_visibility_flags() {
    let mut registry = VesselRegistry::new();
    let [a, b, _] = chain_of_three(&mut registry);
    let stack = VesselStack::build(&registry, a).unwrap();

    let docked = registry.ports()[port(&registry, a, FORE)].clone();
    let free = registry.ports()[port(&registry, a, AFT)].clone();

    stack.change_port_visibility(&mut registry, PortVisibility::SHOW_EMPTY);
    let nodes = registry.nodes();
    assert!(nodes.is_visible(free.marker()));
    assert!(!nodes.is_visible(free.helper()));
    assert!(!nodes.is_visible(docked.marker()));
    assert!(!nodes.is_visible(docked.helper()));

    stack.change_port_visibility(
        &mut registry,
        PortVisibility::SHOW_DOCKED | PortVisibility::USE_HELPER,
    );
    let nodes = registry.nodes();
    assert!(!nodes.is_visible(free.marker()));
    assert!(!nodes.is_visible(free.helper()));
    assert!(nodes.is_visible(docked.helper()));
    assert!(!nodes.is_visible(docked.marker()));

    let b_aft = registry.ports()[port(&registry, b, AFT)].clone();
    registry.change_port_visibility(b, PortVisibility::empty());
    assert!(!registry.nodes().is_visible(b_aft.marker()));
    assert!(!registry.nodes().is_visible(b_aft.helper()));
}
