pub use crate::context::{DiagContext, SourceLocation};
pub use crate::diagnostics::{DiagError, Exit, ExitStatus};

pub mod builtin;
pub mod cli;
pub mod config;
pub mod context;
pub mod debug;
pub mod diagnostics;
pub mod output;
pub mod report;
pub mod syntax;
pub mod trace;
