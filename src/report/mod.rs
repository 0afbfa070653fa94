//! Error and warning reporting with exit-status bookkeeping.
//!
//! The reporter is the single place where exit status and termination are decided:
//!
//! - an **error** always marks the run as failed, and ends it when its status is not success
//!   (a success status is escalated to failure under fatal-warnings);
//! - a **warning** is dropped entirely when warnings are suppressed, and otherwise only ends the
//!   run when warnings are fatal. A warning never marks the run as failed on its own.
//!
//! Messages go to the diagnostic stream as `prog:file:line: message[: os error]`, the location
//! part omitted when no line is known. Standard output is flushed first so the diagnostic lands
//! after output already produced.

pub mod validate;

use std::fmt::Display;
use std::io;

use log::error;
use termcolor::{Color, ColorSpec};

use crate::output::{SharedStream, StdStreams};
use crate::{Exit, ExitStatus};

/// Placed ahead of every warning message.
pub const WARNING_PREFIX: &str = "Warning: ";
const INTERNAL_ERROR_PREFIX: &str = "INTERNAL ERROR: ";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Severity {
    Error,
    Warning,
}

/// Process-wide diagnostic state: the sticky failure flag and the warning switches.
pub struct Reporter {
    program: String,
    out: SharedStream,
    err: SharedStream,
    exit_status: ExitStatus,
    suppress_warnings: bool,
    fatal_warnings: bool,
    errors: usize,
    warnings: usize,
}

impl Reporter {
    pub fn new(program: impl Into<String>, std: &StdStreams) -> Self {
        Self {
            program: program.into(),
            out: std.out.clone(),
            err: std.err.clone(),
            exit_status: ExitStatus::SUCCESS,
            suppress_warnings: false,
            fatal_warnings: false,
            errors: 0,
            warnings: 0,
        }
    }

    pub fn program_name(&self) -> &str {
        &self.program
    }

    pub fn set_program_name(&mut self, program: impl Into<String>) {
        self.program = program.into();
    }

    pub fn suppress_warnings(&self) -> bool {
        self.suppress_warnings
    }

    pub fn set_suppress_warnings(&mut self, suppress: bool) {
        self.suppress_warnings = suppress;
    }

    pub fn fatal_warnings(&self) -> bool {
        self.fatal_warnings
    }

    pub fn set_fatal_warnings(&mut self, fatal: bool) {
        self.fatal_warnings = fatal;
    }

    /// The status the process should end with if nothing terminates it earlier.
    pub fn exit_status(&self) -> ExitStatus {
        self.exit_status
    }

    /// Number of errors written so far.
    pub fn error_count(&self) -> usize {
        self.errors
    }

    /// Number of warnings written so far; suppressed warnings are not counted.
    pub fn warning_count(&self) -> usize {
        self.warnings
    }

    /// Reports an error at an explicit location (`line == 0` omits the location).
    pub fn error_at_line(
        &mut self,
        status: ExitStatus,
        errnum: i32,
        file: &str,
        line: u32,
        message: impl Display,
    ) -> Result<(), Exit> {
        let status = if status.is_success() && self.fatal_warnings {
            ExitStatus::FAILURE
        } else {
            status
        };
        self.emit(Severity::Error, errnum, location(file, line), &message);
        self.errors += 1;
        self.exit_status = ExitStatus::FAILURE;
        finish(status)
    }

    /// Reports a warning at an explicit location (`line == 0` omits the location).
    pub fn warn_at_line(
        &mut self,
        errnum: i32,
        file: &str,
        line: u32,
        message: impl Display,
    ) -> Result<(), Exit> {
        if self.suppress_warnings {
            return Ok(());
        }
        let status = if self.fatal_warnings {
            ExitStatus::FAILURE
        } else {
            ExitStatus::SUCCESS
        };
        self.emit(Severity::Warning, errnum, location(file, line), &message);
        self.warnings += 1;
        finish(status)
    }

    /// Reports corrupted internal state and aborts the process.
    pub fn internal_error(&mut self, message: impl Display) -> ! {
        error!("internal contract violation: {message}");
        let _ = self.out.flush();
        let _ = self.write_internal(&message);
        std::process::abort()
    }

    fn write_internal(&self, message: &dyn Display) -> io::Result<()> {
        let mut err = self.err.borrow_mut();
        write!(err, "{}: ", self.program)?;
        err.set_color(ColorSpec::new().set_fg(Some(Color::Red)).set_bold(true))?;
        write!(err, "{INTERNAL_ERROR_PREFIX}")?;
        err.reset()?;
        writeln!(err, "{message}")?;
        err.flush()
    }

    fn emit(
        &self,
        severity: Severity,
        errnum: i32,
        location: Option<(&str, u32)>,
        message: &dyn Display,
    ) {
        let _ = self.out.flush();
        if let Err(e) = self.write_diagnostic(severity, errnum, location, message) {
            error!("cannot write diagnostic: {e}");
        }
    }

    fn write_diagnostic(
        &self,
        severity: Severity,
        errnum: i32,
        location: Option<(&str, u32)>,
        message: &dyn Display,
    ) -> io::Result<()> {
        let mut err = self.err.borrow_mut();
        match location {
            Some((file, line)) => write!(err, "{}:{}:{}: ", self.program, file, line)?,
            None => write!(err, "{}: ", self.program)?,
        }
        if severity == Severity::Warning {
            err.set_color(ColorSpec::new().set_fg(Some(Color::Yellow)).set_bold(true))?;
            write!(err, "{WARNING_PREFIX}")?;
            err.reset()?;
        }
        write!(err, "{message}")?;
        if errnum != 0 {
            write!(err, ": {}", os_error_text(errnum))?;
        }
        writeln!(err)?;
        err.flush()
    }
}

fn location(file: &str, line: u32) -> Option<(&str, u32)> {
    if line == 0 {
        None
    } else {
        Some((file, line))
    }
}

fn finish(status: ExitStatus) -> Result<(), Exit> {
    if status.is_success() {
        Ok(())
    } else {
        Err(Exit::new(status))
    }
}

/// The platform description of an OS error number, without Rust's `(os error N)` suffix.
pub fn os_error_text(errnum: i32) -> String {
    let text = io::Error::from_raw_os_error(errnum).to_string();
    let suffix = format!(" (os error {errnum})");
    match text.strip_suffix(&suffix) {
        Some(stripped) => stripped.to_string(),
        None => text,
    }
}
