//! In-memory buffer for the target executable.
//!
//! The whole file is read into a `PatchBuffer` once, mutated in place by the
//! signature and property passes, and only written back after the size
//! invariant has been re-validated. The buffer records its length at load
//! time; any length drift between load and write is a patcher defect.

use std::fs;
use std::ops::Range;
use std::path::Path;

use memchr::{memchr, memmem};

use crate::error::{Error, Result};

/// Owned contents of the target binary.
#[derive(Debug, Clone)]
pub struct PatchBuffer {
    bytes: Vec<u8>,
    original_len: usize,
}

impl PatchBuffer {
    pub fn new(bytes: Vec<u8>) -> Self {
        let original_len = bytes.len();
        Self {
            bytes,
            original_len,
        }
    }

    /// Read the entire file at `path` into a new buffer.
    pub fn read_from<P: AsRef<Path>>(path: P) -> Result<Self> {
        Ok(Self::new(fs::read(path)?))
    }

    /// Write the buffer back to `path`. Callers must run
    /// [`check_size_invariant`](Self::check_size_invariant) first.
    pub fn write_to<P: AsRef<Path>>(&self, path: P) -> Result<()> {
        fs::write(path, &self.bytes)?;
        Ok(())
    }

    pub fn len(&self) -> usize {
        self.bytes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.bytes.is_empty()
    }

    /// Buffer length captured at construction time.
    pub fn original_len(&self) -> usize {
        self.original_len
    }

    pub fn as_slice(&self) -> &[u8] {
        &self.bytes
    }

    /// Find the first occurrence of `needle` at or after `from`.
    ///
    /// Both signature and property scanning go through this one primitive.
    /// Returns the span of the match in whole-buffer coordinates.
    pub fn find_span(&self, from: usize, needle: &[u8]) -> Option<Range<usize>> {
        if needle.is_empty() || from >= self.bytes.len() {
            return None;
        }
        let start = from + memmem::find(&self.bytes[from..], needle)?;
        Some(start..start + needle.len())
    }

    pub fn contains(&self, needle: &[u8]) -> bool {
        self.find_span(0, needle).is_some()
    }

    /// Offset of the first `\n` at or after `from`.
    pub fn next_newline(&self, from: usize) -> Option<usize> {
        if from >= self.bytes.len() {
            return None;
        }
        memchr(b'\n', &self.bytes[from..]).map(|i| from + i)
    }

    pub fn byte_at(&self, offset: usize) -> Option<u8> {
        self.bytes.get(offset).copied()
    }

    /// Replace `span` with `replacement`.
    ///
    /// The span must come from a prior scan of this buffer. Replacement
    /// length may differ from the span length; the caller is responsible for
    /// re-checking the size invariant afterwards.
    pub fn splice(&mut self, span: Range<usize>, replacement: &[u8]) {
        self.bytes.splice(span, replacement.iter().copied());
    }

    /// Final defense against length drift: fatal if the buffer no longer has
    /// its load-time length.
    pub fn check_size_invariant(&self) -> Result<()> {
        if self.bytes.len() != self.original_len {
            return Err(Error::SizeInvariantViolated {
                before: self.original_len,
                after: self.bytes.len(),
            });
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_find_span_first_match_only() {
        let buf = PatchBuffer::new(b"abcXYZabcXYZ".to_vec());
        assert_eq!(buf.find_span(0, b"XYZ"), Some(3..6));
        assert_eq!(buf.find_span(4, b"XYZ"), Some(9..12));
        assert_eq!(buf.find_span(10, b"XYZ"), None);
    }

    #[test]
    fn test_find_span_empty_needle() {
        let buf = PatchBuffer::new(b"abc".to_vec());
        assert_eq!(buf.find_span(0, b""), None);
    }

    #[test]
    fn test_next_newline() {
        let buf = PatchBuffer::new(b"one\ntwo\n".to_vec());
        assert_eq!(buf.next_newline(0), Some(3));
        assert_eq!(buf.next_newline(4), Some(7));
        assert_eq!(buf.next_newline(8), None);
    }

    #[test]
    fn test_splice_same_length_keeps_invariant() {
        let mut buf = PatchBuffer::new(b"hello world".to_vec());
        buf.splice(0..5, b"HELLO");
        assert_eq!(buf.as_slice(), b"HELLO world");
        assert!(buf.check_size_invariant().is_ok());
    }

    #[test]
    fn test_size_invariant_detects_drift() {
        let mut buf = PatchBuffer::new(b"hello".to_vec());
        buf.splice(0..5, b"hi");
        let err = buf.check_size_invariant().unwrap_err();
        match err {
            Error::SizeInvariantViolated { before, after } => {
                assert_eq!(before, 5);
                assert_eq!(after, 2);
            }
            other => panic!("unexpected error: {other}"),
        }
    }
}
