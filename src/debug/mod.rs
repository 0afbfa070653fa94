//! Debug configuration and output: the facet level, the line buffer and the debug stream.

pub mod buffer;
pub mod level;
pub mod stream;

pub use buffer::AppendBuffer;
pub use level::DebugLevel;
pub use stream::{DebugStream, DebugTarget, DestinationKind};
