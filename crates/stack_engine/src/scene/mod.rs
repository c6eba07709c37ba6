//! Scene management
//!
//! The scene is a tree of transform nodes. Vessels are root nodes; each
//! docking port contributes a marker node and a helper node parented to its
//! vessel, so port placement falls out of the same parent/child composition
//! the renderer would use.
//!
//! ```text
//! vessel node (position, rotation)
//!   ├── port marker (port position, port frame)
//!   └── port helper (port position, port frame)
//! ```

mod bounds;
mod node_tree;

pub use bounds::AABB;
pub use node_tree::{SceneNode, SceneNodes};
