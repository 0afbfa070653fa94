//! The diagnostics context: one explicitly owned value holding every piece of process-wide
//! diagnostic state.
//!
//! The macro engine keeps a single [`DiagContext`] for the lifetime of the process and passes it
//! to every tracing and reporting call. It owns:
//!
//! - the debug level and trace settings (argument length limit, quotes, program name);
//! - the current source location;
//! - the debug stream and the trace buffer;
//! - the reporter with its sticky failure flag and warning switches.
//!
//! # Example
//!
//! ```rust
//! use mtrace::output::{MemoryStream, StdStreams};
//! use mtrace::trace::MacroCall;
//! use mtrace::DiagContext;
//!
//! let out = MemoryStream::new();
//! let err = MemoryStream::new();
//! let mut ctx = DiagContext::new(StdStreams::capture(&out, &err));
//! ctx.decode_level(Some("aeq")).unwrap();
//!
//! let call = MacroCall {
//!     id: 1,
//!     name: "dnl",
//!     depth: 1,
//!     args: &[],
//! };
//! ctx.trace_prepre(&call).unwrap();
//! assert_eq!(err.contents(), "m4trace: -1- dnl ...\n");
//! ```

use std::io;

use log::debug;

use crate::builtin::BuiltinTable;
use crate::config::DiagConfig;
use crate::debug::{DebugLevel, DebugStream, DebugTarget, DestinationKind};
use crate::output::StdStreams;
use crate::report::Reporter;
use crate::syntax::{DefaultSyntax, QuoteSet, SyntaxTable};
use crate::trace::{MacroCall, TraceEnv, Tracer};
use crate::{DiagError, Exit, ExitStatus};

/// Program name used until the caller sets one.
pub const DEFAULT_PROGRAM_NAME: &str = "m4";

/// Current position in the input.
///
/// A location is either fully known (file and nonzero line) or absent; a line without a file is
/// a caller bug.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SourceLocation {
    pub file: Option<String>,
    pub line: u32,
}

impl SourceLocation {
    pub fn new(file: impl Into<String>, line: u32) -> Self {
        Self {
            file: Some(file.into()),
            line,
        }
    }

    pub fn unknown() -> Self {
        Self::default()
    }

    /// The location diagnostics should show, if any.
    pub fn reportable(&self) -> Option<(&str, u32)> {
        debug_assert!(
            self.file.is_some() || self.line == 0,
            "line {} without a file",
            self.line
        );
        match (&self.file, self.line) {
            (_, 0) | (None, _) => None,
            (Some(file), line) => Some((file.as_str(), line)),
        }
    }
}

/// All diagnostic state of one macro-processor run.
pub struct DiagContext {
    program: String,
    level: DebugLevel,
    max_arg_length: usize,
    quotes: QuoteSet,
    syntax: Box<dyn SyntaxTable>,
    location: SourceLocation,
    stream: DebugStream,
    tracer: Tracer,
    reporter: Reporter,
}

impl DiagContext {
    /// Debug output starts on the diagnostic stream with an empty trace buffer and no facets.
    pub fn new(std: StdStreams) -> Self {
        let reporter = Reporter::new(DEFAULT_PROGRAM_NAME, &std);
        Self {
            program: DEFAULT_PROGRAM_NAME.to_string(),
            level: DebugLevel::NONE,
            max_arg_length: 0,
            quotes: QuoteSet::default(),
            syntax: Box::new(DefaultSyntax),
            location: SourceLocation::unknown(),
            stream: DebugStream::new(std),
            tracer: Tracer::new(),
            reporter,
        }
    }

    /// Builds a context and applies `config` to it.
    pub fn from_config(config: &DiagConfig, std: StdStreams) -> Result<Self, DiagError> {
        let mut ctx = Self::new(std);
        ctx.set_program_name(config.program_name.clone());
        ctx.set_max_arg_length(config.max_debug_arg_length);
        ctx.set_quotes(QuoteSet::new(
            config.left_quote.clone(),
            config.right_quote.clone(),
        ));
        ctx.set_suppress_warnings(config.suppress_warnings);
        ctx.set_fatal_warnings(config.fatal_warnings);
        if let Some(flags) = &config.debug_flags {
            ctx.decode_level(Some(flags))?;
        }
        if let Some(file) = &config.debug_file {
            ctx.set_debug_output(Some(file))?;
        }
        Ok(ctx)
    }

    // ------------------------------------------------------------------------
    // Settings
    // ------------------------------------------------------------------------

    pub fn program_name(&self) -> &str {
        &self.program
    }

    pub fn set_program_name(&mut self, program: impl Into<String>) {
        self.program = program.into();
        self.reporter.set_program_name(self.program.clone());
    }

    pub fn debug_level(&self) -> DebugLevel {
        self.level
    }

    /// Decodes `opts` and makes it the current level, discarding any half-built trace line.
    ///
    /// On an invalid flag the current level is kept.
    pub fn decode_level(&mut self, opts: Option<&str>) -> Result<DebugLevel, DiagError> {
        let level = DebugLevel::decode(opts)?;
        self.set_debug_level(level);
        Ok(level)
    }

    pub fn set_debug_level(&mut self, level: DebugLevel) {
        debug!("debug level {:?} -> {:?}", self.level, level);
        self.level = level;
        self.tracer.reset();
    }

    pub fn max_arg_length(&self) -> usize {
        self.max_arg_length
    }

    /// Maximum characters of each traced argument and expansion; 0 means unlimited.
    pub fn set_max_arg_length(&mut self, max: usize) {
        self.max_arg_length = max;
    }

    pub fn quotes(&self) -> &QuoteSet {
        &self.quotes
    }

    pub fn set_quotes(&mut self, quotes: QuoteSet) {
        self.quotes = quotes;
    }

    pub fn syntax(&self) -> &dyn SyntaxTable {
        self.syntax.as_ref()
    }

    pub fn set_syntax(&mut self, syntax: Box<dyn SyntaxTable>) {
        self.syntax = syntax;
    }

    pub fn location(&self) -> &SourceLocation {
        &self.location
    }

    pub fn set_location(&mut self, location: SourceLocation) {
        self.location = location;
    }

    pub fn suppress_warnings(&self) -> bool {
        self.reporter.suppress_warnings()
    }

    pub fn set_suppress_warnings(&mut self, suppress: bool) {
        self.reporter.set_suppress_warnings(suppress);
    }

    pub fn fatal_warnings(&self) -> bool {
        self.reporter.fatal_warnings()
    }

    pub fn set_fatal_warnings(&mut self, fatal: bool) {
        self.reporter.set_fatal_warnings(fatal);
    }

    pub fn reporter(&self) -> &Reporter {
        &self.reporter
    }

    pub fn exit_status(&self) -> ExitStatus {
        self.reporter.exit_status()
    }

    // ------------------------------------------------------------------------
    // Debug stream
    // ------------------------------------------------------------------------

    /// Redirects debug output: `None` reverts to the diagnostic stream, `""` discards, anything
    /// else is appended to as a file.
    pub fn set_debug_output(&mut self, selector: Option<&str>) -> Result<(), DiagError> {
        self.stream.set_output(DebugTarget::from_selector(selector))
    }

    pub fn debug_destination(&self) -> DestinationKind {
        self.stream.kind()
    }

    pub fn debug_stream(&self) -> &DebugStream {
        &self.stream
    }

    /// The process output and diagnostic streams this context writes to.
    pub fn std_streams(&self) -> &StdStreams {
        self.stream.std()
    }

    /// Flushes all three destinations; call before running an external process.
    pub fn flush_all(&mut self) -> io::Result<()> {
        self.stream.flush_all()
    }

    pub fn message_prefix(&mut self) -> io::Result<()> {
        self.stream
            .message_prefix(&self.program, self.level, &self.location)
    }

    /// Writes a complete one-line debug message.
    pub fn debug_message(&mut self, message: &str) -> io::Result<()> {
        self.message_prefix()?;
        self.stream.write_str(message)?;
        self.stream.write_str("\n")
    }

    // ------------------------------------------------------------------------
    // Tracing
    // ------------------------------------------------------------------------

    /// Length of a trace line still waiting for its post phase.
    pub fn pending_trace_len(&self) -> usize {
        self.tracer.pending_len()
    }

    pub fn trace_prepre(&mut self, call: &MacroCall<'_>) -> Result<(), DiagError> {
        let env = TraceEnv {
            program: &self.program,
            level: self.level,
            max_arg_length: self.max_arg_length,
            quotes: &self.quotes,
            location: &self.location,
        };
        self.tracer.prepre(&env, &mut self.stream, call)
    }

    /// Aborts the process if an argument names a builtin missing from `builtins`.
    pub fn trace_pre(
        &mut self,
        call: &MacroCall<'_>,
        builtins: &dyn BuiltinTable,
    ) -> Result<(), DiagError> {
        let env = TraceEnv {
            program: &self.program,
            level: self.level,
            max_arg_length: self.max_arg_length,
            quotes: &self.quotes,
            location: &self.location,
        };
        match self.tracer.pre(&env, &mut self.stream, call, builtins) {
            Err(err @ DiagError::UnknownBuiltin { .. }) => {
                let _ = self.stream.flush_all();
                self.reporter
                    .internal_error(format_args!("{err} (trace_pre, macro `{}')", call.name))
            }
            other => other,
        }
    }

    pub fn trace_post(
        &mut self,
        call: &MacroCall<'_>,
        expanded: Option<&str>,
    ) -> Result<(), DiagError> {
        let env = TraceEnv {
            program: &self.program,
            level: self.level,
            max_arg_length: self.max_arg_length,
            quotes: &self.quotes,
            location: &self.location,
        };
        self.tracer.post(&env, &mut self.stream, call, expanded)
    }

    // ------------------------------------------------------------------------
    // Reporting
    // ------------------------------------------------------------------------

    /// Reports an error at the current location.
    pub fn error(
        &mut self,
        status: ExitStatus,
        errnum: i32,
        message: impl std::fmt::Display,
    ) -> Result<(), Exit> {
        let (file, line) = self.location.reportable().unwrap_or(("", 0));
        self.reporter
            .error_at_line(status, errnum, file, line, message)
    }

    /// Reports an error about a previously seen position.
    pub fn error_at_line(
        &mut self,
        status: ExitStatus,
        errnum: i32,
        file: &str,
        line: u32,
        message: impl std::fmt::Display,
    ) -> Result<(), Exit> {
        self.reporter
            .error_at_line(status, errnum, file, line, message)
    }

    /// Reports a warning at the current location.
    pub fn warn(&mut self, errnum: i32, message: impl std::fmt::Display) -> Result<(), Exit> {
        let (file, line) = self.location.reportable().unwrap_or(("", 0));
        self.reporter.warn_at_line(errnum, file, line, message)
    }

    /// Reports a warning about a previously seen position.
    pub fn warn_at_line(
        &mut self,
        errnum: i32,
        file: &str,
        line: u32,
        message: impl std::fmt::Display,
    ) -> Result<(), Exit> {
        self.reporter.warn_at_line(errnum, file, line, message)
    }
}
