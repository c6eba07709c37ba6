//! Asset loading: part configs, meshes and the shared line tokenizer

pub mod line_reader;
pub mod mesh;
pub mod part_loader;

pub use line_reader::LineReader;
pub use mesh::{MeshError, MeshLibrary, MeshProvider, VesselMesh};
pub use part_loader::{LoadedPart, PartDefinition, PartError, PartLibrary, PortDefinition};
