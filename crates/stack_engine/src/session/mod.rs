//! Editor sessions and their file format

pub mod codec;
pub mod context;

pub use codec::{read_session, write_session, SessionError, VesselRecord};
pub use context::{EditorError, EditorSession};
