//! Chunked Line Reader
//!
//! Streams a log source as bounded batches of raw lines so peak memory stays
//! proportional to the chunk size, not the file size.

use std::fs::File;
use std::io::{BufRead, BufReader};
use std::path::Path;

use crate::error::{CoreError, CoreResult};

/// Default number of lines per chunk
pub const DEFAULT_CHUNK_SIZE: usize = 1024;

/// Lazy, finite, single-pass sequence of line batches
///
/// Each item holds at most `chunk_size` lines in source order. A source with
/// N > 0 lines yields exactly ⌈N / chunk_size⌉ chunks; an empty source yields
/// a single empty chunk. Once exhausted (or after a read error) the iterator
/// keeps returning `None`.
#[derive(Debug)]
pub struct ChunkedReader<R> {
    reader: R,
    chunk_size: usize,
    source_name: String,
    buf: Vec<u8>,
    emitted: bool,
    finished: bool,
}

impl ChunkedReader<BufReader<File>> {
    /// Open `path` for chunked reading
    ///
    /// # Errors
    ///
    /// Returns error if `chunk_size` is zero or the file cannot be opened
    pub fn open(path: &Path, chunk_size: usize) -> CoreResult<Self> {
        let file = File::open(path).map_err(|e| CoreError::input(path.display().to_string(), e))?;
        Self::new(BufReader::new(file), chunk_size)
            .map(|reader| reader.with_source_name(path.display().to_string()))
    }
}

impl<R: BufRead> ChunkedReader<R> {
    /// Wrap an already-buffered reader
    ///
    /// # Errors
    ///
    /// Returns error if `chunk_size` is zero
    pub fn new(reader: R, chunk_size: usize) -> CoreResult<Self> {
        if chunk_size == 0 {
            return Err(CoreError::validation(
                "chunk_size",
                "must be greater than zero",
            ));
        }

        Ok(Self {
            reader,
            chunk_size,
            source_name: "<reader>".to_string(),
            buf: Vec::with_capacity(256),
            emitted: false,
            finished: false,
        })
    }

    /// Name used when reporting read errors
    #[must_use]
    pub fn with_source_name(mut self, name: impl Into<String>) -> Self {
        self.source_name = name.into();
        self
    }

    /// Configured chunk size
    #[must_use]
    pub const fn chunk_size(&self) -> usize {
        self.chunk_size
    }

    /// Read the next raw line without its terminator; `None` at end of input
    fn read_line(&mut self) -> CoreResult<Option<String>> {
        self.buf.clear();
        let read = self
            .reader
            .read_until(b'\n', &mut self.buf)
            .map_err(|e| CoreError::input(self.source_name.clone(), e))?;
        if read == 0 {
            return Ok(None);
        }

        if self.buf.last() == Some(&b'\n') {
            self.buf.pop();
            if self.buf.last() == Some(&b'\r') {
                self.buf.pop();
            }
        }

        Ok(Some(String::from_utf8_lossy(&self.buf).into_owned()))
    }
}

impl<R: BufRead> Iterator for ChunkedReader<R> {
    type Item = CoreResult<Vec<String>>;

    fn next(&mut self) -> Option<Self::Item> {
        if self.finished {
            return None;
        }

        let mut chunk = Vec::with_capacity(self.chunk_size);
        while chunk.len() < self.chunk_size {
            match self.read_line() {
                Ok(Some(line)) => chunk.push(line),
                Ok(None) => {
                    self.finished = true;
                    break;
                }
                Err(e) => {
                    self.finished = true;
                    tracing::error!("Aborting read of {}: {}", self.source_name, e);
                    return Some(Err(e));
                }
            }
        }

        // A short final read only produces a chunk if it carries lines, or
        // if nothing has been produced yet (empty source).
        if chunk.is_empty() && self.emitted {
            return None;
        }

        self.emitted = true;
        Some(Ok(chunk))
    }
}
