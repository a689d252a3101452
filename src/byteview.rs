//! Bounds-checked random access over an image buffer.
//!
//! `ByteView` is the only component that dereferences the raw image bytes;
//! every other stage goes through it and its `scroll::Pread`-based reads
//! instead of touching a buffer directly.

use scroll::Pread;

use crate::error::{Error, Result};

/// Borrowed, bounds-checked view over an image buffer.
#[derive(Debug, Clone, Copy)]
pub struct ByteView<'a> {
    bytes: &'a [u8],
}

impl<'a> ByteView<'a> {
    /// Wrap a byte slice for bounds-checked access.
    pub fn new(bytes: &'a [u8]) -> Self {
        ByteView { bytes }
    }

    /// Total length of the image in bytes.
    pub fn len(&self) -> usize {
        self.bytes.len()
    }

    /// Whether the image is empty.
    pub fn is_empty(&self) -> bool {
        self.bytes.is_empty()
    }

    /// The full underlying slice, for the rare operations (anchor scanning)
    /// that need to search across the whole image rather than one offset.
    pub fn as_slice(&self) -> &'a [u8] {
        self.bytes
    }

    /// Read a single byte at `off`.
    pub fn byte(&self, off: usize) -> Result<u8> {
        self.bytes
            .get(off)
            .copied()
            .ok_or(Error::OutOfBounds { offset: off, len: self.bytes.len() })
    }

    /// Read `len` bytes starting at `off`.
    pub fn slice(&self, off: usize, len: usize) -> Result<&'a [u8]> {
        let end = off
            .checked_add(len)
            .ok_or(Error::OutOfBounds { offset: off, len: self.bytes.len() })?;
        self.bytes
            .get(off..end)
            .ok_or(Error::OutOfBounds { offset: off, len: self.bytes.len() })
    }

    /// Read a target-endian `u32` at `off`.
    pub fn u32(&self, off: usize, big_endian: bool) -> Result<u32> {
        let word = self.slice(off, 4)?;
        let endian = if big_endian { scroll::BE } else { scroll::LE };
        word.pread_with::<u32>(0, endian)
            .map_err(|_| Error::OutOfBounds { offset: off, len: self.bytes.len() })
    }
}
