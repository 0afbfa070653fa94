//! Growable append-only byte buffer used to assemble one output line at a time.

use std::fmt;
use std::mem;

/// Bytes are appended until the line is complete, then taken out in one piece with
/// [`AppendBuffer::finish`] or discarded with [`AppendBuffer::reset`].
#[derive(Debug, Default, Clone)]
pub struct AppendBuffer {
    bytes: Vec<u8>,
}

impl AppendBuffer {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_capacity(capacity: usize) -> Self {
        Self {
            bytes: Vec::with_capacity(capacity),
        }
    }

    pub fn push_byte(&mut self, byte: u8) {
        self.bytes.push(byte);
    }

    pub fn push_bytes(&mut self, bytes: &[u8]) {
        self.bytes.extend_from_slice(bytes);
    }

    pub fn push_str(&mut self, text: &str) {
        self.push_bytes(text.as_bytes());
    }

    pub fn len(&self) -> usize {
        self.bytes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.bytes.is_empty()
    }

    pub fn as_bytes(&self) -> &[u8] {
        &self.bytes
    }

    /// Takes the accumulated contents, leaving the buffer empty.
    pub fn finish(&mut self) -> Vec<u8> {
        mem::take(&mut self.bytes)
    }

    /// Discards the accumulated contents.
    pub fn reset(&mut self) {
        self.bytes.clear();
    }
}

impl fmt::Write for AppendBuffer {
    fn write_str(&mut self, s: &str) -> fmt::Result {
        self.push_str(s);
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fmt::Write;

    #[test]
    fn test_append_and_finish() {
        let mut buf = AppendBuffer::with_capacity(8);
        buf.push_str("m4");
        buf.push_byte(b':');
        write!(buf, " -{}- ", 3).unwrap();
        assert_eq!(buf.as_bytes(), b"m4: -3- ");
        assert_eq!(buf.finish(), b"m4: -3- ".to_vec());
        assert!(buf.is_empty());
    }

    #[test]
    fn test_reset_discards() {
        let mut buf = AppendBuffer::new();
        buf.push_bytes(b"partial");
        assert_eq!(buf.len(), 7);
        buf.reset();
        assert_eq!(buf.len(), 0);
    }
}
