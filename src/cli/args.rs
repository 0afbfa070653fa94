//! Defines the command-line arguments for the mtrace CLI.
//!
//! This module uses the `clap` crate with its "derive" feature to create a
//! declarative and type-safe argument parsing structure.

use std::path::PathBuf;

use clap::{Parser, ValueEnum};
use termcolor::ColorChoice;

use crate::config::DiagConfig;
use crate::output::stderr_color_choice;

/// The main CLI argument structure.
#[derive(Debug, Parser)]
#[command(
    name = "mtrace",
    version,
    about = "Replays a script of macro-processor events through the tracing and diagnostics layer."
)]
pub struct MtraceArgs {
    /// The replay script (YAML, or JSON with a `.json` extension).
    #[arg(required = true)]
    pub script: PathBuf,

    /// Debug flags to start with (`-d=FLAGS`); a bare `-d` selects the default set `aeq`.
    #[arg(
        short = 'd',
        long = "debug",
        value_name = "FLAGS",
        num_args = 0..=1,
        require_equals = true,
        default_missing_value = ""
    )]
    pub debug: Option<String>,

    /// Send debug output to FILE (appending); an empty name discards it.
    #[arg(short = 'o', long = "debugfile", value_name = "FILE")]
    pub debug_file: Option<String>,

    /// Truncate traced arguments and expansions to NUM characters (0 is unlimited).
    #[arg(short = 'l', long = "arglength", value_name = "NUM")]
    pub arg_length: Option<usize>,

    /// Suppress all warnings.
    #[arg(short = 'Q', long = "quiet", visible_alias = "silent")]
    pub quiet: bool,

    /// Treat warnings as fatal errors.
    #[arg(short = 'E', long = "fatal-warnings")]
    pub fatal_warnings: bool,

    /// Configuration file (YAML or JSON) applied before the flags above.
    #[arg(long, value_name = "FILE")]
    pub config: Option<PathBuf>,

    /// When to colour diagnostics on standard error.
    #[arg(long, value_enum, default_value_t = ColorArg::Auto)]
    pub color: ColorArg,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum ColorArg {
    Auto,
    Always,
    Never,
}

impl ColorArg {
    pub fn choice(self) -> ColorChoice {
        match self {
            ColorArg::Auto => stderr_color_choice(),
            ColorArg::Always => ColorChoice::Always,
            ColorArg::Never => ColorChoice::Never,
        }
    }
}

impl MtraceArgs {
    /// Layers the command-line flags over `config`.
    pub fn apply_to(&self, config: &mut DiagConfig) {
        if let Some(flags) = &self.debug {
            config.debug_flags = Some(flags.clone());
        }
        if let Some(file) = &self.debug_file {
            config.debug_file = Some(file.clone());
        }
        if let Some(length) = self.arg_length {
            config.max_debug_arg_length = length;
        }
        if self.quiet {
            config.suppress_warnings = true;
        }
        if self.fatal_warnings {
            config.fatal_warnings = true;
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_flags_override_config() {
        let args =
            MtraceArgs::try_parse_from(["mtrace", "-d=aeqc", "-l", "9", "-E", "run.yaml"])
                .unwrap();
        let mut config = DiagConfig {
            debug_flags: Some("t".into()),
            ..DiagConfig::default()
        };
        args.apply_to(&mut config);
        assert_eq!(config.debug_flags.as_deref(), Some("aeqc"));
        assert_eq!(config.max_debug_arg_length, 9);
        assert!(config.fatal_warnings);
        assert!(!config.suppress_warnings);
    }

    #[test]
    fn test_bare_debug_flag_means_default() {
        let args = MtraceArgs::try_parse_from(["mtrace", "run.yaml", "-d"]).unwrap();
        assert_eq!(args.debug.as_deref(), Some(""));
        assert_eq!(args.script, PathBuf::from("run.yaml"));
    }

    #[test]
    fn test_bare_debug_flag_before_script() {
        let args = MtraceArgs::try_parse_from(["mtrace", "-d", "run.yaml"]).unwrap();
        assert_eq!(args.debug.as_deref(), Some(""));
        assert_eq!(args.script, PathBuf::from("run.yaml"));

        let args = MtraceArgs::try_parse_from(["mtrace", "--debug=V", "run.yaml"]).unwrap();
        assert_eq!(args.debug.as_deref(), Some("V"));
    }

    #[test]
    fn test_script_is_required() {
        assert!(MtraceArgs::try_parse_from(["mtrace"]).is_err());
    }
}
