//! Record-aligned chunk planning.
//!
//! Chunks are discovered lazily by jumping `target_size` bytes ahead and
//! scanning forward to the next terminator, so the file is never pre-scanned.
//! The emitted chunks tile the source exactly: contiguous, non-overlapping,
//! never empty, and every non-final chunk ends on a terminator.

use std::iter::FusedIterator;

use crate::error::Result;
use crate::source::ByteSource;

/// Default target chunk size: 64 MiB.
pub const DEFAULT_CHUNK_SIZE: u64 = 64 * 1024 * 1024;

/// A `(offset, length)` byte range of the source.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct Chunk {
    pub offset: u64,
    pub length: u64,
}

impl Chunk {
    /// Offset one past the last byte.
    pub fn end(&self) -> u64 {
        self.offset + self.length
    }
}

pub struct ChunkPlanner<'a, S: ?Sized> {
    source: &'a S,
    target_size: u64,
    cursor: u64,
    done: bool,
}

impl<'a, S: ByteSource + ?Sized> ChunkPlanner<'a, S> {
    /// A `target_size` of zero is allowed and yields one chunk per record.
    pub fn new(source: &'a S, target_size: u64) -> Self {
        Self {
            source,
            target_size,
            cursor: 0,
            done: false,
        }
    }

    /// The chunk starting at `cursor`, or `None` once the source is covered.
    /// The next cursor is the returned chunk's `end()`.
    pub fn next_chunk(&self, cursor: u64) -> Result<Option<Chunk>> {
        let len = self.source.len();
        if cursor >= len {
            return Ok(None);
        }
        let candidate = cursor.saturating_add(self.target_size);
        let end = if candidate >= len {
            len
        } else {
            // No terminator before end of file: the remainder is the final chunk.
            match self.source.find_terminator(candidate)? {
                Some(terminator) => terminator + 1,
                None => len,
            }
        };
        Ok(Some(Chunk {
            offset: cursor,
            length: end - cursor,
        }))
    }
}

impl<S: ByteSource + ?Sized> Iterator for ChunkPlanner<'_, S> {
    type Item = Result<Chunk>;

    fn next(&mut self) -> Option<Self::Item> {
        if self.done {
            return None;
        }
        match self.next_chunk(self.cursor) {
            Ok(Some(chunk)) => {
                self.cursor = chunk.end();
                Some(Ok(chunk))
            }
            Ok(None) => {
                self.done = true;
                None
            }
            Err(e) => {
                self.done = true;
                Some(Err(e))
            }
        }
    }
}

impl<S: ByteSource + ?Sized> FusedIterator for ChunkPlanner<'_, S> {}
