//! The debug output stream: where trace lines and debug messages go.
//!
//! There is exactly one active destination at a time. Switching closes the previous destination
//! unless it is one of the standard streams. Whenever the new destination is not standard
//! output, its storage identity is compared with standard output's; if they name the same file,
//! standard output itself is used instead, so that debug text and normal output go through one
//! buffered stream and keep their relative order.

use std::fs::{File, OpenOptions};
use std::io::{self, BufWriter, Write};
use std::mem;
use std::path::{Path, PathBuf};

use log::{debug, warn};

use crate::debug::DebugLevel;
use crate::output::{FileIdentity, StdStreams};
use crate::{DiagError, SourceLocation};

/// Requested debug destination.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DebugTarget<'a> {
    /// Revert to the default diagnostic stream.
    Stderr,
    /// Discard all debug output.
    Discard,
    /// Append to the named file.
    File(&'a Path),
}

impl<'a> DebugTarget<'a> {
    /// Maps the textual selector: `None` is standard error, `""` discards, anything else is a path.
    pub fn from_selector(selector: Option<&'a str>) -> Self {
        match selector {
            None => DebugTarget::Stderr,
            Some("") => DebugTarget::Discard,
            Some(path) => DebugTarget::File(Path::new(path)),
        }
    }
}

/// Which kind of destination is active.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DestinationKind {
    Stderr,
    Stdout,
    File,
    Discard,
}

enum Destination {
    Stderr,
    Stdout,
    File {
        path: PathBuf,
        writer: BufWriter<File>,
    },
    Discard,
}

impl Destination {
    fn kind(&self) -> DestinationKind {
        match self {
            Destination::Stderr => DestinationKind::Stderr,
            Destination::Stdout => DestinationKind::Stdout,
            Destination::File { .. } => DestinationKind::File,
            Destination::Discard => DestinationKind::Discard,
        }
    }
}

/// Owner of the active debug destination.
pub struct DebugStream {
    std: StdStreams,
    active: Destination,
}

impl DebugStream {
    /// Starts out writing to the default diagnostic stream, or to standard output when both
    /// name the same storage.
    pub fn new(std: StdStreams) -> Self {
        let mut stream = Self {
            std,
            active: Destination::Discard,
        };
        stream.adopt(Destination::Stderr);
        stream
    }

    pub fn std(&self) -> &StdStreams {
        &self.std
    }

    pub fn kind(&self) -> DestinationKind {
        self.active.kind()
    }

    /// Path of the active debug file, if one is open.
    pub fn file_path(&self) -> Option<&Path> {
        match &self.active {
            Destination::File { path, .. } => Some(path),
            _ => None,
        }
    }

    /// Switches the debug destination.
    ///
    /// If the file cannot be opened the active destination is left unchanged.
    pub fn set_output(&mut self, target: DebugTarget<'_>) -> Result<(), DiagError> {
        let next = match target {
            DebugTarget::Stderr => Destination::Stderr,
            DebugTarget::Discard => Destination::Discard,
            DebugTarget::File(path) => {
                let file = OpenOptions::new()
                    .append(true)
                    .create(true)
                    .open(path)
                    .map_err(|source| DiagError::DebugFileOpen {
                        path: path.to_path_buf(),
                        source,
                    })?;
                Destination::File {
                    path: path.to_path_buf(),
                    writer: BufWriter::new(file),
                }
            }
        };
        self.adopt(next);
        debug!("debug output now goes to {:?}", self.kind());
        Ok(())
    }

    fn adopt(&mut self, next: Destination) {
        let previous = mem::replace(&mut self.active, next);
        close(previous);

        if matches!(self.active, Destination::Stdout | Destination::Discard) {
            return;
        }
        let Some(stdout_id) = self.std.out_identity else {
            return;
        };
        let Some(debug_id) = self.identity() else {
            return;
        };
        if stdout_id == debug_id {
            debug!("debug output shares storage with stdout, writing to stdout instead");
            let shadowed = mem::replace(&mut self.active, Destination::Stdout);
            close(shadowed);
        }
    }

    fn identity(&self) -> Option<FileIdentity> {
        match &self.active {
            Destination::Stderr => self.std.err_identity,
            Destination::File { writer, .. } => FileIdentity::of_file(writer.get_ref()),
            Destination::Stdout | Destination::Discard => None,
        }
    }

    /// Writes raw text to the active destination.
    pub fn write_str(&mut self, text: &str) -> io::Result<()> {
        self.write_bytes(text.as_bytes())
    }

    pub fn write_bytes(&mut self, bytes: &[u8]) -> io::Result<()> {
        match &mut self.active {
            Destination::Stderr => self.std.err.write_bytes(bytes),
            Destination::Stdout => self.std.out.write_bytes(bytes),
            Destination::File { writer, .. } => writer.write_all(bytes),
            Destination::Discard => Ok(()),
        }
    }

    /// Flushes standard output, standard error and then the debug file, if one is open.
    ///
    /// Must run before anything that shares the terminal or file with another process.
    pub fn flush_all(&mut self) -> io::Result<()> {
        self.std.out.flush()?;
        self.std.err.flush()?;
        if let Destination::File { writer, .. } = &mut self.active {
            writer.flush()?;
        }
        Ok(())
    }

    /// Writes the header of a one-line debug message directly to the active destination.
    pub fn message_prefix(
        &mut self,
        program: &str,
        level: DebugLevel,
        location: &SourceLocation,
    ) -> io::Result<()> {
        let mut prefix = format!("{program} debug: ");
        if level.contains(DebugLevel::FILE) {
            prefix.push_str(location.file.as_deref().unwrap_or(""));
            prefix.push_str(": ");
        }
        if level.contains(DebugLevel::LINE) {
            prefix.push_str(&format!("{}: ", location.line));
        }
        self.write_str(&prefix)
    }
}

fn close(destination: Destination) {
    if let Destination::File { path, mut writer } = destination {
        if let Err(e) = writer.flush() {
            warn!("error closing debug file {}: {}", path.display(), e);
        }
    }
}
