//! Scene node tree with on-demand absolute transforms
//!
//! Local transforms are the source of truth. Each node caches its absolute
//! transform; changing a local transform marks that node and its whole
//! subtree stale, and reading an absolute transform recomputes the chain
//! from the topmost stale ancestor down. A child therefore always sees its
//! parent's latest placement without any explicit update call.
//!
//! Handles to removed nodes are a caller bug: accessors index the table
//! directly and panic on an unknown [`NodeKey`].

use std::cell::Cell;

use crate::foundation::collections::{NodeKey, SlotMap};
use crate::foundation::math::{self, Quat, Transform, Vec3};

/// One node of the tree
#[derive(Debug, Clone)]
pub struct SceneNode {
    parent: Option<NodeKey>,
    children: Vec<NodeKey>,
    local: Transform,
    absolute: Cell<Option<Transform>>,
    visible: bool,
}

impl SceneNode {
    /// Parent node, `None` for roots
    pub fn parent(&self) -> Option<NodeKey> {
        self.parent
    }

    /// Direct children
    pub fn children(&self) -> &[NodeKey] {
        &self.children
    }

    /// Transform relative to the parent
    pub fn local_transform(&self) -> &Transform {
        &self.local
    }

    /// Whether the node is drawn
    pub fn is_visible(&self) -> bool {
        self.visible
    }

    /// Whether the cached absolute transform needs recomputing
    pub fn is_stale(&self) -> bool {
        self.absolute.get().is_none()
    }
}

/// Tree of scene nodes
#[derive(Debug, Default)]
pub struct SceneNodes {
    nodes: SlotMap<NodeKey, SceneNode>,
}

impl SceneNodes {
    /// Create an empty tree
    pub fn new() -> Self {
        Self::default()
    }

    /// Add a node under `parent` (or as a root). An unknown parent is
    /// treated as no parent.
    pub fn insert(&mut self, parent: Option<NodeKey>, local: Transform) -> NodeKey {
        let parent = parent.filter(|key| self.nodes.contains_key(*key));
        let key = self.nodes.insert(SceneNode {
            parent,
            children: Vec::new(),
            local,
            absolute: Cell::new(None),
            visible: true,
        });
        if let Some(parent) = parent {
            self.nodes[parent].children.push(key);
        }
        key
    }

    /// Remove a node together with its subtree
    pub fn remove(&mut self, key: NodeKey) {
        if let Some(parent) = self.nodes.get(key).and_then(SceneNode::parent) {
            if let Some(parent) = self.nodes.get_mut(parent) {
                parent.children.retain(|child| *child != key);
            }
        }

        let mut pending = vec![key];
        while let Some(next) = pending.pop() {
            if let Some(node) = self.nodes.remove(next) {
                pending.extend(node.children);
            }
        }
    }

    /// Look up a node
    pub fn get(&self, key: NodeKey) -> Option<&SceneNode> {
        self.nodes.get(key)
    }

    /// Whether the node exists
    pub fn contains(&self, key: NodeKey) -> bool {
        self.nodes.contains_key(key)
    }

    /// Number of nodes in the tree
    pub fn len(&self) -> usize {
        self.nodes.len()
    }

    /// Whether the tree is empty
    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }

    /// Transform relative to the parent
    pub fn local_transform(&self, key: NodeKey) -> Transform {
        self.nodes[key].local
    }

    /// Replace the local transform
    pub fn set_local_transform(&mut self, key: NodeKey, local: Transform) {
        self.nodes[key].local = local;
        self.mark_stale(key);
    }

    /// Local position
    pub fn position(&self, key: NodeKey) -> Vec3 {
        self.nodes[key].local.position
    }

    /// Set the local position
    pub fn set_position(&mut self, key: NodeKey, position: Vec3) {
        self.nodes[key].local.position = position;
        self.mark_stale(key);
    }

    /// Local rotation
    pub fn rotation(&self, key: NodeKey) -> Quat {
        self.nodes[key].local.rotation
    }

    /// Set the local rotation
    pub fn set_rotation(&mut self, key: NodeKey, rotation: Quat) {
        self.nodes[key].local.rotation = rotation;
        self.mark_stale(key);
    }

    /// Local rotation as Euler degrees
    pub fn rotation_degrees(&self, key: NodeKey) -> Vec3 {
        math::quaternion_to_euler_degrees(&self.rotation(key))
    }

    /// Set the local rotation from Euler degrees
    pub fn set_rotation_degrees(&mut self, key: NodeKey, euler: Vec3) {
        self.set_rotation(key, math::euler_degrees_to_quaternion(euler));
    }

    /// Absolute transform, recomputed from the topmost stale ancestor
    pub fn absolute_transform(&self, key: NodeKey) -> Transform {
        let mut stale_chain = Vec::new();
        let mut base = Transform::identity();
        let mut cursor = Some(key);

        while let Some(current) = cursor {
            let node = &self.nodes[current];
            if let Some(cached) = node.absolute.get() {
                base = cached;
                break;
            }
            stale_chain.push(current);
            cursor = node.parent;
        }

        for current in stale_chain.into_iter().rev() {
            let node = &self.nodes[current];
            base = base.combine(&node.local);
            node.absolute.set(Some(base));
        }
        base
    }

    /// Absolute position
    pub fn absolute_position(&self, key: NodeKey) -> Vec3 {
        self.absolute_transform(key).position
    }

    /// Absolute rotation
    pub fn absolute_rotation(&self, key: NodeKey) -> Quat {
        self.absolute_transform(key).rotation
    }

    /// Place the node so its absolute transform equals `absolute`
    pub fn set_absolute_transform(&mut self, key: NodeKey, absolute: Transform) {
        let local = match self.nodes[key].parent {
            Some(parent) => self.absolute_transform(parent).inverse().combine(&absolute),
            None => absolute,
        };
        self.set_local_transform(key, local);
    }

    /// Move the node so its absolute position equals `position`
    pub fn set_absolute_position(&mut self, key: NodeKey, position: Vec3) {
        let local = match self.nodes[key].parent {
            Some(parent) => self.absolute_transform(parent).inverse().transform_point(position),
            None => position,
        };
        self.set_position(key, local);
    }

    /// Turn the node so its absolute rotation equals `rotation`
    pub fn set_absolute_rotation(&mut self, key: NodeKey, rotation: Quat) {
        let local = match self.nodes[key].parent {
            Some(parent) => self.absolute_rotation(parent).inverse() * rotation,
            None => rotation,
        };
        self.set_rotation(key, local);
    }

    /// Show or hide the node
    pub fn set_visible(&mut self, key: NodeKey, visible: bool) {
        self.nodes[key].visible = visible;
    }

    /// Whether the node is drawn
    pub fn is_visible(&self, key: NodeKey) -> bool {
        self.nodes[key].visible
    }

    fn mark_stale(&self, key: NodeKey) {
        let mut pending = vec![key];
        while let Some(next) = pending.pop() {
            let node = &self.nodes[next];
            // A fresh descendant implies fresh ancestors, so a stale node's
            // subtree is already stale.
            if node.absolute.take().is_none() && next != key {
                continue;
            }
            pending.extend_from_slice(&node.children);
        }
    }
}
