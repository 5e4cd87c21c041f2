//! # Append buffer
//!
//! A growable byte buffer that accumulates exactly one rendered frame.
//! Coalescing every escape sequence and row of text into a single `write`
//! call keeps the terminal from ever observing a partial frame.

/// Accumulates the bytes of a single output frame.
#[derive(Default)]
pub struct AppendBuffer(Vec<u8>);

impl AppendBuffer {
    /// Create an empty buffer.
    pub fn new() -> Self { Self::default() }

    /// Append raw bytes to the buffer.
    pub fn append(&mut self, bytes: &[u8]) { self.0.extend_from_slice(bytes); }

    /// The accumulated bytes, ready to be written out in one syscall.
    pub fn as_bytes(&self) -> &[u8] { &self.0 }
}
