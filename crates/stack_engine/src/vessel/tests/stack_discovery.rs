use std::collections::HashSet;

use super::*;
use crate::vessel::{StackError, VesselStack};

fn member_set(stack: &VesselStack) -> HashSet<VesselKey> {
    stack.members().iter().copied().collect()
}

#[test]
fn test_stack_is_same_from_every_seed() {
    let mut registry = VesselRegistry::new();
    let chain = chain_of_three(&mut registry);
    let loose = spawn(&mut registry, Vec3::new(100.0, 0.0, 0.0), Vec3::zeros());

    let expected: HashSet<VesselKey> = chain.iter().copied().collect();
    for seed in chain {
        let stack = VesselStack::build(&registry, seed).unwrap();
        assert_eq!(stack.num_vessels(), 3);
        assert_eq!(stack.vessel(0), Some(seed));
        assert_eq!(member_set(&stack), expected);
        assert!(!stack.contains(loose));
    }

    let alone = VesselStack::build(&registry, loose).unwrap();
    assert_eq!(alone.members(), &[loose]);
    assert_eq!(alone.vessel(1), None);
}

#[test]
fn test_ring_is_visited_once() {
    let mut registry = VesselRegistry::new();
    let ring: Vec<VesselKey> = (0..3)
        .map(|i| spawn(&mut registry, Vec3::new(i as f32 * 20.0, 0.0, 0.0), Vec3::zeros()))
        .collect();

    // Geometry does not matter to discovery, so dock without snapping.
    for i in 0..3 {
        let next = (i + 1) % 3;
        let fore = port(&registry, ring[i], FORE);
        let aft = port(&registry, ring[next], AFT);
        registry.dock(fore, aft).unwrap();
    }

    for seed in &ring {
        let stack = VesselStack::build(&registry, *seed).unwrap();
        assert_eq!(stack.num_vessels(), 3);
        assert_eq!(member_set(&stack).len(), 3);
    }
}

#[test]
fn test_undock_splits_stack() {
    let mut registry = VesselRegistry::new();
    let [a, b, c] = chain_of_three(&mut registry);

    registry.undock(port(&registry, b, FORE)).unwrap();
    let mut stack = VesselStack::build(&registry, a).unwrap();
    assert_eq!(member_set(&stack), HashSet::from([a, b]));

    registry.dock(port(&registry, c, AFT), port(&registry, b, FORE)).unwrap();
    stack.rebuild(&registry).unwrap();
    assert_eq!(stack.num_vessels(), 3);
}

#[test]
fn test_removed_member_is_reported() {
    let mut registry = VesselRegistry::new();
    let [a, b, _] = chain_of_three(&mut registry);
    let stack = VesselStack::build(&registry, a).unwrap();

    registry.remove_vessel(b);
    assert_eq!(
        stack.rotate(&mut registry, Vec3::new(0.0, 10.0, 0.0)),
        Err(StackError::StaleMember(b))
    );
    assert!(matches!(VesselStack::build(&registry, b), Err(StackError::StaleMember(_))));

    // a lost its partner when b went away.
    let rebuilt = VesselStack::build(&registry, a).unwrap();
    assert_eq!(rebuilt.members(), &[a]);
}
