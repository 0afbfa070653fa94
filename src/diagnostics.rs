//!
//! # Overview
//!
//! This module defines the unified, `miette`-based error types for the mtrace diagnostics
//! subsystem. Every recoverable failure produced by this crate is a [`DiagError`]; callers
//! decide how to surface it (the replay CLI renders it through `miette`).
//!
//! Process termination is not a `DiagError`. The reporter returns [`Exit`] when
//! an error (or a warning promoted by fatal-warnings) must end the process. `Exit` travels up
//! the caller's stack through `?` until it reaches the binary's entry point, which calls
//! [`Exit::terminate`].
//!
//! # Rules
//!
//! - **Invalid debug flags are values, not terminations.** `DebugLevel::decode` returns
//!   `DiagError::InvalidDebugFlag` and leaves the current level untouched.
//! - **A debug file that cannot be opened changes nothing.** `DiagError::DebugFileOpen` is
//!   returned before any stream state is touched.
//! - **Never call `process::exit` from library code.** Return `Exit` instead. The only exception
//!   is the internal contract abort in the reporter.

use std::fmt;
use std::io;
use std::path::PathBuf;
use std::process;

use miette::Diagnostic;
use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::builtin::BuiltinId;

/// A process exit status, as handed to `process::exit`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ExitStatus(pub i32);

impl ExitStatus {
    pub const SUCCESS: ExitStatus = ExitStatus(0);
    pub const FAILURE: ExitStatus = ExitStatus(1);

    pub fn is_success(self) -> bool {
        self == Self::SUCCESS
    }

    pub fn code(self) -> i32 {
        self.0
    }
}

impl fmt::Display for ExitStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Request to terminate the process with a given status.
///
/// Produced by `error` with a non-success status and by warnings under fatal-warnings. The
/// diagnostic has already been written and flushed when an `Exit` is created.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[must_use = "an Exit must be propagated to the entry point and terminated"]
pub struct Exit {
    status: ExitStatus,
}

impl Exit {
    pub fn new(status: ExitStatus) -> Self {
        Self { status }
    }

    pub fn status(&self) -> ExitStatus {
        self.status
    }

    /// Ends the process with the carried status.
    pub fn terminate(self) -> ! {
        process::exit(self.status.code())
    }
}

impl fmt::Display for Exit {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "terminating with exit status {}", self.status)
    }
}

impl std::error::Error for Exit {}

/// Unified error type for all recoverable mtrace failures.
#[derive(Debug, Error, Diagnostic)]
pub enum DiagError {
    #[error("bad debug flag `{flag}` at position {position} in `{flags}`")]
    #[diagnostic(
        code(mtrace::debug::flag),
        help("valid flags are a, e, q, t, l, f, p, c, i, x and V")
    )]
    InvalidDebugFlag {
        flag: char,
        position: usize,
        flags: String,
    },

    #[error("cannot set debug file `{}`", path.display())]
    #[diagnostic(code(mtrace::debug::file))]
    DebugFileOpen {
        path: PathBuf,
        #[source]
        source: io::Error,
    },

    #[error("builtin {id} not found in builtin table")]
    #[diagnostic(code(mtrace::internal::builtin))]
    UnknownBuiltin { id: BuiltinId },

    #[error("{context}")]
    #[diagnostic(code(mtrace::io))]
    Io {
        context: String,
        #[source]
        source: io::Error,
    },

    #[error("configuration error: {message}")]
    #[diagnostic(code(mtrace::config))]
    Config { message: String },

    #[error("script error: {message}")]
    #[diagnostic(code(mtrace::script), help("each step needs an `op` field"))]
    Script { message: String },
}

impl DiagError {
    /// Wraps an I/O failure with a short description of what was being done.
    pub fn io(context: impl Into<String>, source: io::Error) -> Self {
        DiagError::Io {
            context: context.into(),
            source,
        }
    }
}
