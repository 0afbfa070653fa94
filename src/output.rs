//! Output streams shared by the debug stream manager and the reporter.
//!
//! Both subsystems write to the same standard output and standard error handles, so that
//! interleaved debug text, diagnostics and normal output keep the order in which they were
//! produced. The handles are single-threaded shared writers (`Rc<RefCell<..>>`), which matches
//! the one logical thread of control the diagnostics run on.

// ============================================================================
// SHARED STREAMS: SharedStream and MemoryStream
// ============================================================================

use std::cell::{RefCell, RefMut};
use std::fs::{File, Metadata};
use std::io;
use std::rc::Rc;

use termcolor::{Buffer, ColorChoice, StandardStream, WriteColor};

/// Ergonomic wrapper for a shared, mutable, colour-capable output stream.
#[derive(Clone)]
pub struct SharedStream(Rc<RefCell<dyn WriteColor>>);

impl SharedStream {
    /// Create a new SharedStream from any `WriteColor` implementation.
    pub fn new<W: WriteColor + 'static>(writer: W) -> Self {
        SharedStream(Rc::new(RefCell::new(writer)))
    }

    pub fn write_str(&self, text: &str) -> io::Result<()> {
        self.write_bytes(text.as_bytes())
    }

    pub fn write_bytes(&self, bytes: &[u8]) -> io::Result<()> {
        self.0.borrow_mut().write_all(bytes)
    }

    pub fn flush(&self) -> io::Result<()> {
        self.0.borrow_mut().flush()
    }

    /// Borrow the stream mutably (for coloured output).
    pub fn borrow_mut(&self) -> RefMut<'_, dyn WriteColor> {
        self.0.borrow_mut()
    }
}

/// MemoryStream: collects output into memory for testing or programmatic capture.
#[derive(Clone)]
pub struct MemoryStream {
    inner: Rc<RefCell<Buffer>>,
}

impl MemoryStream {
    /// A capture that drops colour requests.
    pub fn new() -> Self {
        Self {
            inner: Rc::new(RefCell::new(Buffer::no_color())),
        }
    }

    /// A capture that records colour requests as ANSI escapes.
    pub fn ansi() -> Self {
        Self {
            inner: Rc::new(RefCell::new(Buffer::ansi())),
        }
    }

    pub fn shared(&self) -> SharedStream {
        let inner: Rc<RefCell<dyn WriteColor>> = self.inner.clone();
        SharedStream(inner)
    }

    pub fn contents(&self) -> String {
        String::from_utf8_lossy(self.inner.borrow().as_slice()).into_owned()
    }

    pub fn clear(&self) {
        self.inner.borrow_mut().clear();
    }
}

impl Default for MemoryStream {
    fn default() -> Self {
        Self::new()
    }
}

// ============================================================================
// STORAGE IDENTITY
// ============================================================================

/// Identity of the storage behind an open stream (device and inode number).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct FileIdentity {
    pub dev: u64,
    pub ino: u64,
}

impl FileIdentity {
    #[cfg(unix)]
    pub fn from_metadata(meta: &Metadata) -> Option<Self> {
        use std::os::unix::fs::MetadataExt;
        Some(Self {
            dev: meta.dev(),
            ino: meta.ino(),
        })
    }

    #[cfg(not(unix))]
    pub fn from_metadata(_meta: &Metadata) -> Option<Self> {
        None
    }

    pub fn of_file(file: &File) -> Option<Self> {
        file.metadata().ok().and_then(|meta| Self::from_metadata(&meta))
    }

    pub fn of_path(path: impl AsRef<std::path::Path>) -> Option<Self> {
        std::fs::metadata(path)
            .ok()
            .and_then(|meta| Self::from_metadata(&meta))
    }

    #[cfg(unix)]
    pub fn of_stdout() -> Option<Self> {
        use std::os::fd::AsFd;
        let fd = io::stdout().as_fd().try_clone_to_owned().ok()?;
        Self::of_file(&File::from(fd))
    }

    #[cfg(unix)]
    pub fn of_stderr() -> Option<Self> {
        use std::os::fd::AsFd;
        let fd = io::stderr().as_fd().try_clone_to_owned().ok()?;
        Self::of_file(&File::from(fd))
    }

    #[cfg(not(unix))]
    pub fn of_stdout() -> Option<Self> {
        None
    }

    #[cfg(not(unix))]
    pub fn of_stderr() -> Option<Self> {
        None
    }
}

// ============================================================================
// STANDARD STREAMS
// ============================================================================

/// The default output stream and default diagnostic stream, with their storage identities.
///
/// An identity of `None` means it could not be determined; loop avoidance is then skipped.
#[derive(Clone)]
pub struct StdStreams {
    pub out: SharedStream,
    pub err: SharedStream,
    pub out_identity: Option<FileIdentity>,
    pub err_identity: Option<FileIdentity>,
}

impl StdStreams {
    /// The real process streams. Colour is only ever applied to standard error.
    pub fn process(err_color: ColorChoice) -> Self {
        Self {
            out: SharedStream::new(StandardStream::stdout(ColorChoice::Never)),
            err: SharedStream::new(StandardStream::stderr(err_color)),
            out_identity: FileIdentity::of_stdout(),
            err_identity: FileIdentity::of_stderr(),
        }
    }

    /// Streams with no known storage identity.
    pub fn detached(out: SharedStream, err: SharedStream) -> Self {
        Self {
            out,
            err,
            out_identity: None,
            err_identity: None,
        }
    }

    /// In-memory captures for both streams.
    pub fn capture(out: &MemoryStream, err: &MemoryStream) -> Self {
        Self::detached(out.shared(), err.shared())
    }

    pub fn with_out_identity(mut self, identity: Option<FileIdentity>) -> Self {
        self.out_identity = identity;
        self
    }

    pub fn with_err_identity(mut self, identity: Option<FileIdentity>) -> Self {
        self.err_identity = identity;
        self
    }
}

/// Picks the colour choice for standard error: `Auto` only when it is a terminal.
pub fn stderr_color_choice() -> ColorChoice {
    if atty::is(atty::Stream::Stderr) {
        ColorChoice::Auto
    } else {
        ColorChoice::Never
    }
}
