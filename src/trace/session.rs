//! Trace lines for the three phases of a macro call.
//!
//! All tracing output for one call is collected in the trace buffer and only printed when the
//! line is complete, so it never interleaves with debug messages written by builtins while the
//! call is in progress.
//!
//! - **prepre** announces the call before its arguments are collected: `name ...`.
//! - **pre** renders the name and, with `ARGS`, the argument list. With `CALL` the line is
//!   finished with ` -> ???` and printed; otherwise it stays open for **post**.
//! - **post** (with `CALL`) starts a fresh line for the call, adds the expansion when `EXPANSION`
//!   is set, and always prints the line.

use serde::{Deserialize, Serialize};

use crate::builtin::{BuiltinId, BuiltinTable};
use crate::debug::{AppendBuffer, DebugLevel, DebugStream};
use crate::syntax::QuoteSet;
use crate::trace::format::{trace_format, FormatOptions, TraceArg};
use crate::{DiagError, SourceLocation};

/// One macro argument as the engine stores it.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TokenData {
    Text(String),
    Builtin(BuiltinId),
}

impl TokenData {
    pub fn text(s: impl Into<String>) -> Self {
        TokenData::Text(s.into())
    }

    /// The textual value; builtin references have none.
    pub fn as_text(&self) -> &str {
        match self {
            TokenData::Text(s) => s,
            TokenData::Builtin(_) => "",
        }
    }
}

/// The traced call, as supplied by the engine. `args` excludes the macro name.
#[derive(Debug, Clone, Copy)]
pub struct MacroCall<'a> {
    pub id: u32,
    pub name: &'a str,
    pub depth: usize,
    pub args: &'a [TokenData],
}

/// Everything a trace line depends on besides the call itself.
#[derive(Debug, Clone, Copy)]
pub struct TraceEnv<'a> {
    pub program: &'a str,
    pub level: DebugLevel,
    pub max_arg_length: usize,
    pub quotes: &'a QuoteSet,
    pub location: &'a SourceLocation,
}

/// Owner of the trace buffer.
#[derive(Debug, Default)]
pub struct Tracer {
    buffer: AppendBuffer,
}

/// Short-lived view used to assemble a line; the only way out of it is [`LineBuilder::flush`].
struct LineBuilder<'b, 'e> {
    buffer: &'b mut AppendBuffer,
    env: &'b TraceEnv<'e>,
}

impl LineBuilder<'_, '_> {
    fn format(&mut self, template: &str, args: &[TraceArg<'_>]) {
        let opts = FormatOptions {
            level: self.env.level,
            max_arg_length: self.env.max_arg_length,
            quotes: self.env.quotes,
        };
        trace_format(&mut *self.buffer, &opts, template, args);
    }

    fn header(&mut self, call: &MacroCall<'_>) {
        let env = self.env;
        self.format("%strace:", &[env.program.into()]);
        if env.level.contains(DebugLevel::FILE) {
            let file = env.location.file.as_deref().unwrap_or("");
            self.format("%s:", &[file.into()]);
        }
        if env.level.contains(DebugLevel::LINE) {
            self.format("%d:", &[env.location.line.into()]);
        }
        self.format(" -%d- ", &[call.depth.into()]);
        if env.level.contains(DebugLevel::CALLID) {
            self.format("id %d: ", &[call.id.into()]);
        }
    }

    /// Prints the line and leaves the buffer empty, even when the write fails.
    fn flush(self, out: &mut DebugStream) -> Result<(), DiagError> {
        let mut line = self.buffer.finish();
        line.push(b'\n');
        out.write_bytes(&line)
            .map_err(|e| DiagError::io("writing trace output", e))
    }
}

impl Tracer {
    pub fn new() -> Self {
        Self::default()
    }

    /// Length of the line still waiting for its post phase.
    pub fn pending_len(&self) -> usize {
        self.buffer.len()
    }

    /// Drops any half-built line.
    pub fn reset(&mut self) {
        self.buffer.reset();
    }

    fn line<'b, 'e>(&'b mut self, env: &'b TraceEnv<'e>) -> LineBuilder<'b, 'e> {
        LineBuilder {
            buffer: &mut self.buffer,
            env,
        }
    }

    pub fn prepre(
        &mut self,
        env: &TraceEnv<'_>,
        out: &mut DebugStream,
        call: &MacroCall<'_>,
    ) -> Result<(), DiagError> {
        let mut line = self.line(env);
        line.header(call);
        line.format("%s ...", &[call.name.into()]);
        line.flush(out)
    }

    /// Fails with [`DiagError::UnknownBuiltin`] when an argument refers to a builtin missing from
    /// `builtins`; the half-built line is discarded.
    pub fn pre(
        &mut self,
        env: &TraceEnv<'_>,
        out: &mut DebugStream,
        call: &MacroCall<'_>,
        builtins: &dyn BuiltinTable,
    ) -> Result<(), DiagError> {
        let mut line = self.line(env);
        line.header(call);
        line.format("%s", &[call.name.into()]);

        if !call.args.is_empty() && env.level.contains(DebugLevel::ARGS) {
            line.format("(", &[]);
            for (i, arg) in call.args.iter().enumerate() {
                if i > 0 {
                    line.format(", ", &[]);
                }
                match arg {
                    TokenData::Text(text) => line.format("%l%S%r", &[text.as_str().into()]),
                    TokenData::Builtin(id) => match builtins.name_of(*id) {
                        Some(name) => line.format("<%s>", &[name.into()]),
                        None => {
                            line.buffer.reset();
                            return Err(DiagError::UnknownBuiltin { id: *id });
                        }
                    },
                }
            }
            line.format(")", &[]);
        }

        if env.level.contains(DebugLevel::CALL) {
            line.format(" -> ???", &[]);
            return line.flush(out);
        }
        Ok(())
    }

    pub fn post(
        &mut self,
        env: &TraceEnv<'_>,
        out: &mut DebugStream,
        call: &MacroCall<'_>,
        expanded: Option<&str>,
    ) -> Result<(), DiagError> {
        let mut line = self.line(env);
        if env.level.contains(DebugLevel::CALL) {
            line.header(call);
            let marker = if call.args.is_empty() { "" } else { "(...)" };
            line.format("%s%s", &[call.name.into(), marker.into()]);
        }
        if let Some(expanded) = expanded {
            if env.level.contains(DebugLevel::EXPANSION) {
                line.format(" -> %l%S%r", &[expanded.into()]);
            }
        }
        line.flush(out)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::builtin::BuiltinRegistry;
    use crate::output::{MemoryStream, StdStreams};

    struct Fixture {
        err: MemoryStream,
        stream: DebugStream,
        tracer: Tracer,
        quotes: QuoteSet,
        location: SourceLocation,
    }

    impl Fixture {
        fn new() -> Self {
            let out = MemoryStream::new();
            let err = MemoryStream::new();
            Self {
                stream: DebugStream::new(StdStreams::capture(&out, &err)),
                err,
                tracer: Tracer::new(),
                quotes: QuoteSet::default(),
                location: SourceLocation::new("in.m4", 7),
            }
        }
    }

    fn env_for<'a>(
        quotes: &'a QuoteSet,
        location: &'a SourceLocation,
        flags: &str,
    ) -> TraceEnv<'a> {
        TraceEnv {
            program: "m4",
            level: DebugLevel::decode(Some(flags)).unwrap(),
            max_arg_length: 0,
            quotes,
            location,
        }
    }

    #[test]
    fn test_prepre_line() {
        let mut fx = Fixture::new();
        let call = MacroCall {
            id: 3,
            name: "define",
            depth: 1,
            args: &[],
        };
        let env = env_for(&fx.quotes, &fx.location, "aeq");
        fx.tracer.prepre(&env, &mut fx.stream, &call).unwrap();
        assert_eq!(fx.err.contents(), "m4trace: -1- define ...\n");
        assert_eq!(fx.tracer.pending_len(), 0);
    }

    #[test]
    fn test_pre_then_post_single_line() {
        let mut fx = Fixture::new();
        let args = [TokenData::text("foo"), TokenData::text("bar")];
        let call = MacroCall {
            id: 1,
            name: "define",
            depth: 2,
            args: &args,
        };
        let env = env_for(&fx.quotes, &fx.location, "aeq");
        let builtins = BuiltinRegistry::new();
        fx.tracer.pre(&env, &mut fx.stream, &call, &builtins).unwrap();
        assert_eq!(fx.err.contents(), "");
        assert!(fx.tracer.pending_len() > 0);
        fx.tracer.post(&env, &mut fx.stream, &call, Some("")).unwrap();
        assert_eq!(fx.err.contents(), "m4trace: -2- define(`foo', `bar') -> `'\n");
        assert_eq!(fx.tracer.pending_len(), 0);
    }

    #[test]
    fn test_call_mode_splits_lines() {
        let mut fx = Fixture::new();
        let args = [TokenData::text("x")];
        let call = MacroCall {
            id: 9,
            name: "len",
            depth: 1,
            args: &args,
        };
        let env = env_for(&fx.quotes, &fx.location, "aecx");
        let builtins = BuiltinRegistry::new();
        fx.tracer.pre(&env, &mut fx.stream, &call, &builtins).unwrap();
        assert_eq!(fx.tracer.pending_len(), 0);
        fx.tracer.post(&env, &mut fx.stream, &call, Some("1")).unwrap();
        assert_eq!(
            fx.err.contents(),
            "m4trace: -1- id 9: len(x) -> ???\nm4trace: -1- id 9: len(...) -> 1\n"
        );
    }

    #[test]
    fn test_header_file_and_line() {
        let mut fx = Fixture::new();
        let call = MacroCall {
            id: 1,
            name: "dnl",
            depth: 1,
            args: &[],
        };
        let env = env_for(&fx.quotes, &fx.location, "fl");
        fx.tracer.prepre(&env, &mut fx.stream, &call).unwrap();
        assert_eq!(fx.err.contents(), "m4trace:in.m4:7: -1- dnl ...\n");
    }

    #[test]
    fn test_builtin_argument_rendered_by_name() {
        let mut fx = Fixture::new();
        let mut builtins = BuiltinRegistry::new();
        let len = builtins.register("len");
        let args = [TokenData::text("mylen"), TokenData::Builtin(len)];
        let call = MacroCall {
            id: 1,
            name: "define",
            depth: 1,
            args: &args,
        };
        let env = env_for(&fx.quotes, &fx.location, "aqc");
        fx.tracer.pre(&env, &mut fx.stream, &call, &builtins).unwrap();
        assert_eq!(fx.err.contents(), "m4trace: -1- define(`mylen', <len>) -> ???\n");
    }

    #[test]
    fn test_unknown_builtin_is_reported_and_buffer_cleared() {
        let mut fx = Fixture::new();
        let args = [TokenData::Builtin(BuiltinId(404))];
        let call = MacroCall {
            id: 1,
            name: "define",
            depth: 1,
            args: &args,
        };
        let env = env_for(&fx.quotes, &fx.location, "a");
        let result = fx.tracer.pre(&env, &mut fx.stream, &call, &BuiltinRegistry::new());
        assert!(matches!(result, Err(DiagError::UnknownBuiltin { id: BuiltinId(404) })));
        assert_eq!(fx.tracer.pending_len(), 0);
    }

    #[test]
    fn test_post_without_call_or_expansion_still_flushes() {
        let mut fx = Fixture::new();
        let call = MacroCall {
            id: 1,
            name: "foo",
            depth: 1,
            args: &[],
        };
        let env = env_for(&fx.quotes, &fx.location, "t");
        fx.tracer.pre(&env, &mut fx.stream, &call, &BuiltinRegistry::new()).unwrap();
        fx.tracer.post(&env, &mut fx.stream, &call, Some("bar")).unwrap();
        assert_eq!(fx.err.contents(), "m4trace: -1- foo\n");
    }
}
