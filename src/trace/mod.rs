//! Macro call tracing: the line formatter and the three-phase trace session.

pub mod format;
pub mod session;

pub use format::{trace_format, FormatOptions, TraceArg, TRUNCATION_MARKER};
pub use session::{MacroCall, TokenData, TraceEnv, Tracer};
