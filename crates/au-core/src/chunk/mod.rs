//! Chunk splitting.
//!
//! A file is uploaded as a sequence of contiguous, non-overlapping slices of at
//! most [`ChunkSize`] bytes. The remote store concatenates chunks in the order
//! their ids appear in the commit manifest, so the order produced here is the
//! order that must be committed.

use std::iter::FusedIterator;
use std::num::NonZeroUsize;

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// 1 MiB
pub const DEFAULT_CHUNK_SIZE_BYTES: usize = 1024 * 1024;

/// Maximum number of bytes per chunk. Never zero.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(try_from = "usize", into = "usize")]
pub struct ChunkSize(NonZeroUsize);

#[derive(Debug, Error, PartialEq, Eq)]
#[error("chunk size must be greater than zero")]
pub struct ChunkSizeError;

impl ChunkSize {
    pub const DEFAULT: Self = match NonZeroUsize::new(DEFAULT_CHUNK_SIZE_BYTES) {
        Some(bytes) => Self(bytes),
        None => panic!("default chunk size must be non-zero"),
    };

    pub fn new(bytes: usize) -> Result<Self, ChunkSizeError> {
        NonZeroUsize::new(bytes).map(Self).ok_or(ChunkSizeError)
    }

    pub fn get(self) -> usize {
        self.0.get()
    }
}

impl Default for ChunkSize {
    fn default() -> Self {
        Self::DEFAULT
    }
}

impl TryFrom<usize> for ChunkSize {
    type Error = ChunkSizeError;

    fn try_from(bytes: usize) -> Result<Self, Self::Error> {
        Self::new(bytes)
    }
}

impl From<ChunkSize> for usize {
    fn from(size: ChunkSize) -> Self {
        size.get()
    }
}

/// Lazy iterator over the chunks of a buffer.
///
/// Borrows the buffer, never copies it. Cloning the iterator restarts the
/// sequence from the clone's position.
#[derive(Debug, Clone)]
pub struct Chunks<'a> {
    remaining: &'a [u8],
    chunk_size: usize,
}

/// Split `bytes` into chunks of at most `chunk_size` bytes.
///
/// Empty input yields no chunks.
pub fn split(bytes: &[u8], chunk_size: ChunkSize) -> Chunks<'_> {
    Chunks {
        remaining: bytes,
        chunk_size: chunk_size.get(),
    }
}

/// Number of chunks [`split`] produces for a buffer of `len` bytes: `ceil(len / chunk_size)`.
pub fn chunk_count(len: usize, chunk_size: ChunkSize) -> usize {
    len.div_ceil(chunk_size.get())
}

impl<'a> Iterator for Chunks<'a> {
    type Item = &'a [u8];

    fn next(&mut self) -> Option<Self::Item> {
        if self.remaining.is_empty() {
            return None;
        }
        let take = self.remaining.len().min(self.chunk_size);
        let (head, tail) = self.remaining.split_at(take);
        self.remaining = tail;
        Some(head)
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        let n = self.remaining.len().div_ceil(self.chunk_size);
        (n, Some(n))
    }
}

impl ExactSizeIterator for Chunks<'_> {}

impl FusedIterator for Chunks<'_> {}
