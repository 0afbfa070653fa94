//! The mtrace Command-Line Interface.
//!
//! This module is the main entry point of the `mtrace` binary: it layers the command-line
//! flags over the configuration file, builds the diagnostics context on the real process
//! streams and replays a script through it. The process exit code is the context's exit status.

use std::io;

use clap::Parser;
use log::{debug, info};
use termcolor::ColorChoice;

use crate::builtin::{standard_registry, BuiltinRegistry};
use crate::cli::args::MtraceArgs;
use crate::cli::script::{CallStep, Step};
use crate::config::DiagConfig;
use crate::output::StdStreams;
use crate::trace::MacroCall;
use crate::{DiagContext, DiagError, Exit, ExitStatus, SourceLocation};

pub mod args;
pub mod diagnostics;
pub mod script;

/// Environment variable holding the `log` filter for the binary's own logging.
pub const LOG_ENV: &str = "MTRACE_LOG";

/// The main entry point for the CLI.
///
/// Returns the status to exit with, or an [`Exit`] when a diagnostic ended the run early.
pub fn run() -> Result<ExitStatus, Exit> {
    let args = MtraceArgs::parse();
    init_logging();

    let color = args.color.choice();
    match replay_from_args(&args, StdStreams::process(color)) {
        Ok(result) => result,
        Err(err) => {
            eprint!("{}", diagnostics::render(&err, color != ColorChoice::Never));
            Err(Exit::new(ExitStatus::FAILURE))
        }
    }
}

fn init_logging() {
    let env = env_logger::Env::new().filter_or(LOG_ENV, "warn");
    let _ = env_logger::Builder::from_env(env)
        .format_timestamp(None)
        .try_init();
}

/// Loads configuration and script for `args` and replays the script on `std`.
///
/// The outer error is a setup failure; the inner result is the outcome of the replay.
pub fn replay_from_args(
    args: &MtraceArgs,
    std: StdStreams,
) -> Result<Result<ExitStatus, Exit>, DiagError> {
    let mut config = match &args.config {
        Some(path) => DiagConfig::load(path)?,
        None => DiagConfig::default(),
    };
    args.apply_to(&mut config);
    let steps = script::load(&args.script)?;
    info!("replaying {} steps from {}", steps.len(), args.script.display());

    let ctx = DiagContext::from_config(&config, std)?;
    Replay::new(ctx).run(&steps)
}

/// Drives a [`DiagContext`] through a list of steps.
pub struct Replay {
    ctx: DiagContext,
    builtins: BuiltinRegistry,
}

impl Replay {
    /// Uses the standard builtin table for rendering builtin arguments.
    pub fn new(ctx: DiagContext) -> Self {
        Self {
            ctx,
            builtins: standard_registry(),
        }
    }

    pub fn context(&self) -> &DiagContext {
        &self.ctx
    }

    /// Runs every step, then flushes all streams.
    ///
    /// An [`Exit`] raised by a step stops the replay; streams are flushed before it is returned.
    pub fn run(mut self, steps: &[Step]) -> Result<Result<ExitStatus, Exit>, DiagError> {
        for (index, step) in steps.iter().enumerate() {
            debug!("step {}: {:?}", index + 1, step);
            if let Err(exit) = self.step(step)? {
                let _ = self.ctx.flush_all();
                return Ok(Err(exit));
            }
        }
        self.ctx
            .flush_all()
            .map_err(|e| DiagError::io("flushing output", e))?;
        Ok(Ok(self.ctx.exit_status()))
    }

    fn step(&mut self, step: &Step) -> Result<Result<(), Exit>, DiagError> {
        match step {
            Step::Location { file, line } => {
                if file.is_none() && *line != 0 {
                    return Err(DiagError::Script {
                        message: format!("location line {line} given without a file"),
                    });
                }
                self.ctx.set_location(SourceLocation {
                    file: file.clone(),
                    line: *line,
                });
            }
            Step::DebugMode { flags } => {
                if self.ctx.decode_level(flags.as_deref()).is_err() {
                    let flags = flags.as_deref().unwrap_or("");
                    return Ok(self
                        .ctx
                        .warn(0, format_args!("debugmode: bad debug flags: `{flags}'")));
                }
            }
            Step::DebugFile { path } => {
                if let Err(err) = self.ctx.set_debug_output(path.as_deref()) {
                    let errnum = match &err {
                        DiagError::DebugFileOpen { source, .. } => source.raw_os_error(),
                        _ => None,
                    };
                    let path = path.as_deref().unwrap_or("");
                    return Ok(self.ctx.error(
                        ExitStatus::SUCCESS,
                        errnum.unwrap_or(0),
                        format_args!("debugfile: cannot set debug file `{path}'"),
                    ));
                }
            }
            Step::Prepre(call) => self.ctx.trace_prepre(&macro_call(call))?,
            Step::Pre(call) => self.ctx.trace_pre(&macro_call(call), &self.builtins)?,
            Step::Post(call) => self
                .ctx
                .trace_post(&macro_call(call), call.result.as_deref())?,
            Step::Message { text } => self
                .ctx
                .debug_message(text)
                .map_err(|e| DiagError::io("writing debug message", e))?,
            Step::Output { text } => self.write_stdout(text)?,
            Step::Error {
                status,
                errnum,
                text,
            } => return Ok(self.ctx.error(ExitStatus(*status), *errnum, text)),
            Step::Warn { errnum, text } => return Ok(self.ctx.warn(*errnum, text)),
            Step::Argc {
                name,
                argc,
                min,
                max,
                side_effect,
            } => {
                let empty = match self.ctx.check_arg_count(name, *argc, *min, *max, *side_effect) {
                    Ok(empty) => empty,
                    Err(exit) => return Ok(Err(exit)),
                };
                self.write_stdout(&format!("{empty}\n"))?;
            }
            Step::Numeric { name, text } => match self.ctx.numeric_arg(name, text) {
                Ok(Some(value)) => self.write_stdout(&format!("{value}\n"))?,
                Ok(None) => {}
                Err(exit) => return Ok(Err(exit)),
            },
            Step::DumpArgs {
                args,
                separator,
                quoted,
            } => {
                let mut line = String::new();
                // Writing into a String cannot fail.
                let _ = self.ctx.dump_args(&mut line, args, separator, *quoted);
                line.push('\n');
                self.write_stdout(&line)?;
            }
            Step::Flush => self
                .ctx
                .flush_all()
                .map_err(|e| DiagError::io("flushing output", e))?,
        }
        Ok(Ok(()))
    }

    fn write_stdout(&self, text: &str) -> Result<(), DiagError> {
        self.ctx
            .std_streams()
            .out
            .write_str(text)
            .map_err(|e: io::Error| DiagError::io("writing standard output", e))
    }
}

fn macro_call(call: &CallStep) -> MacroCall<'_> {
    MacroCall {
        id: call.id,
        name: &call.name,
        depth: call.depth,
        args: &call.args,
    }
}
