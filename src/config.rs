//! Startup configuration for the diagnostics subsystem.
//!
//! A [`DiagConfig`] can be read from a YAML (`.yaml`, `.yml`) or JSON (`.json`) file; every
//! field is optional and falls back to the built-in default. Command-line flags are layered on
//! top by the binary.
//!
//! ```yaml
//! program_name: m4
//! debug_flags: aeqc
//! debug_file: trace.log
//! max_debug_arg_length: 40
//! fatal_warnings: true
//! ```

use std::fs;
use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::context::DEFAULT_PROGRAM_NAME;
use crate::syntax::{DEFAULT_LEFT_QUOTE, DEFAULT_RIGHT_QUOTE};
use crate::DiagError;

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct DiagConfig {
    pub program_name: String,
    /// Debug flag string, decoded as for `debugmode`.
    pub debug_flags: Option<String>,
    /// Debug output selector: a path, or `""` to discard.
    pub debug_file: Option<String>,
    /// Maximum characters shown per traced argument; 0 is unlimited.
    pub max_debug_arg_length: usize,
    pub suppress_warnings: bool,
    pub fatal_warnings: bool,
    pub left_quote: String,
    pub right_quote: String,
}

impl Default for DiagConfig {
    fn default() -> Self {
        Self {
            program_name: DEFAULT_PROGRAM_NAME.to_string(),
            debug_flags: None,
            debug_file: None,
            max_debug_arg_length: 0,
            suppress_warnings: false,
            fatal_warnings: false,
            left_quote: DEFAULT_LEFT_QUOTE.to_string(),
            right_quote: DEFAULT_RIGHT_QUOTE.to_string(),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Format {
    Yaml,
    Json,
}

fn format_of(path: &Path) -> Result<Format, DiagError> {
    match path.extension().and_then(|ext| ext.to_str()) {
        Some("yaml") | Some("yml") => Ok(Format::Yaml),
        Some("json") => Ok(Format::Json),
        _ => Err(DiagError::Config {
            message: format!(
                "{}: unsupported configuration format (expected .yaml, .yml or .json)",
                path.display()
            ),
        }),
    }
}

impl DiagConfig {
    /// Reads a configuration file, choosing the format by extension.
    pub fn load(path: impl AsRef<Path>) -> Result<Self, DiagError> {
        let path = path.as_ref();
        let format = format_of(path)?;
        let text = fs::read_to_string(path)
            .map_err(|e| DiagError::io(format!("reading {}", path.display()), e))?;
        Self::parse(&text, format).map_err(|message| DiagError::Config {
            message: format!("{}: {}", path.display(), message),
        })
    }

    pub fn from_yaml(text: &str) -> Result<Self, DiagError> {
        Self::parse(text, Format::Yaml).map_err(|message| DiagError::Config { message })
    }

    pub fn from_json(text: &str) -> Result<Self, DiagError> {
        Self::parse(text, Format::Json).map_err(|message| DiagError::Config { message })
    }

    fn parse(text: &str, format: Format) -> Result<Self, String> {
        match format {
            Format::Yaml if text.trim().is_empty() => Ok(Self::default()),
            Format::Yaml => serde_yaml::from_str(text).map_err(|e| e.to_string()),
            Format::Json => serde_json::from_str(text).map_err(|e| e.to_string()),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        let config = DiagConfig::default();
        assert_eq!(config.program_name, "m4");
        assert_eq!(config.left_quote, "`");
        assert_eq!(config.right_quote, "'");
        assert!(config.debug_flags.is_none());
        assert_eq!(DiagConfig::from_yaml("").unwrap(), config);
    }

    #[test]
    fn test_partial_yaml() {
        let config = DiagConfig::from_yaml("debug_flags: aeqc\nfatal_warnings: true\n").unwrap();
        assert_eq!(config.debug_flags.as_deref(), Some("aeqc"));
        assert!(config.fatal_warnings);
        assert_eq!(config.program_name, "m4");
    }

    #[test]
    fn test_json_and_unknown_fields() {
        let config = DiagConfig::from_json(r#"{"program_name": "gm4", "debug_file": ""}"#).unwrap();
        assert_eq!(config.program_name, "gm4");
        assert_eq!(config.debug_file.as_deref(), Some(""));
        assert!(matches!(
            DiagConfig::from_json(r#"{"colour": true}"#),
            Err(DiagError::Config { .. })
        ));
    }

    #[test]
    fn test_load_by_extension() {
        let dir = tempfile::tempdir().unwrap();
        let yaml = dir.path().join("diag.yml");
        std::fs::write(&yaml, "max_debug_arg_length: 8\n").unwrap();
        assert_eq!(DiagConfig::load(&yaml).unwrap().max_debug_arg_length, 8);

        let toml = dir.path().join("diag.toml");
        std::fs::write(&toml, "").unwrap();
        assert!(matches!(DiagConfig::load(&toml), Err(DiagError::Config { .. })));
    }
}
