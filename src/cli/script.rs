//! The replay script: a list of steps, each one event the macro engine would feed into the
//! diagnostics layer.
//!
//! ```yaml
//! - op: location
//!   file: input.m4
//!   line: 3
//! - op: debugmode
//!   flags: aeqc
//! - op: pre
//!   id: 1
//!   name: define
//!   depth: 1
//!   args: [{text: foo}, {builtin: 5}]
//! - op: post
//!   id: 1
//!   name: define
//!   depth: 1
//!   args: [{text: foo}, {builtin: 5}]
//!   result: ""
//! ```

use std::fs;
use std::path::Path;

use serde::Deserialize;

use crate::trace::TokenData;
use crate::DiagError;

/// The traced call shared by the three trace phases.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct CallStep {
    pub id: u32,
    pub name: String,
    #[serde(default = "default_depth")]
    pub depth: usize,
    #[serde(default)]
    pub args: Vec<TokenData>,
    /// Expansion text, consulted by `post` only.
    #[serde(default)]
    pub result: Option<String>,
}

fn default_depth() -> usize {
    1
}

#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(tag = "op", rename_all = "lowercase", deny_unknown_fields)]
pub enum Step {
    /// Moves the current input position; omit both fields to clear it.
    Location {
        #[serde(default)]
        file: Option<String>,
        #[serde(default)]
        line: u32,
    },
    /// Changes the debug level; no flags selects the default set.
    DebugMode {
        #[serde(default)]
        flags: Option<String>,
    },
    /// Redirects debug output; no path reverts to standard error, `""` discards.
    DebugFile {
        #[serde(default)]
        path: Option<String>,
    },
    Prepre(CallStep),
    Pre(CallStep),
    Post(CallStep),
    /// A one-line debug message.
    Message { text: String },
    /// Text written to standard output as macro expansion output.
    Output { text: String },
    Error {
        #[serde(default)]
        status: i32,
        #[serde(default)]
        errnum: i32,
        text: String,
    },
    Warn {
        #[serde(default)]
        errnum: i32,
        text: String,
    },
    /// Argument count check; prints `true` when the call may expand to nothing.
    Argc {
        name: String,
        argc: usize,
        min: usize,
        #[serde(default)]
        max: Option<usize>,
        #[serde(default)]
        side_effect: bool,
    },
    /// Numeric argument parse; prints the value when it parses.
    Numeric { name: String, text: String },
    /// Prints the joined arguments followed by a newline.
    DumpArgs {
        #[serde(default)]
        args: Vec<TokenData>,
        #[serde(default = "default_separator")]
        separator: String,
        #[serde(default)]
        quoted: bool,
    },
    Flush,
}

fn default_separator() -> String {
    ",".to_string()
}

/// Reads a script file, JSON for a `.json` extension and YAML otherwise.
pub fn load(path: &Path) -> Result<Vec<Step>, DiagError> {
    let text = fs::read_to_string(path)
        .map_err(|e| DiagError::io(format!("reading {}", path.display()), e))?;
    let is_json = path.extension().and_then(|ext| ext.to_str()) == Some("json");
    parse(&text, is_json).map_err(|message| DiagError::Script {
        message: format!("{}: {}", path.display(), message),
    })
}

fn parse(text: &str, is_json: bool) -> Result<Vec<Step>, String> {
    if is_json {
        serde_json::from_str(text).map_err(|e| e.to_string())
    } else if text.trim().is_empty() {
        Ok(Vec::new())
    } else {
        serde_yaml::from_str(text).map_err(|e| e.to_string())
    }
}
