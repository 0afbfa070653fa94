//! Shared helpers for the integration tests.

#![allow(dead_code)]

use std::fs;
use std::path::{Path, PathBuf};

use mtrace::output::{MemoryStream, StdStreams};
use mtrace::DiagContext;

/// A context writing into two in-memory captures.
pub struct Captured {
    pub out: MemoryStream,
    pub err: MemoryStream,
    pub ctx: DiagContext,
}

impl Captured {
    pub fn new() -> Self {
        let out = MemoryStream::new();
        let err = MemoryStream::new();
        let ctx = DiagContext::new(StdStreams::capture(&out, &err));
        Self { out, err, ctx }
    }

    /// Number of complete lines written to the diagnostic stream.
    pub fn err_lines(&self) -> usize {
        self.err.contents().lines().count()
    }
}

/// Writes `contents` to `dir/name` and returns the path.
pub fn write_file(dir: &Path, name: &str, contents: &str) -> PathBuf {
    let path = dir.join(name);
    fs::write(&path, contents).expect("write test file");
    path
}
