//! Blocking chunk iterator over a [`Read`] source.

use std::io::{self, Read};
use std::iter::FusedIterator;

use tracing::warn;

use crate::buffer::Buffer;
use crate::chunk::Chunk;
use crate::chunker::assembler::ChunkAssembler;
use crate::error::ChunkError;

/// An iterator that yields chunks from a reader.
///
/// `ChunkIter` reads the source in pieces of up to 512 KiB and yields each
/// chunk as soon as its boundary has been read. Chunk boundaries do not
/// depend on how the reader splits its reads.
///
/// After the source is exhausted, or after a read error has been yielded,
/// the iterator returns `None`.
///
/// # Example
///
/// ```no_run
/// use rabin_chunker::Chunker;
/// use std::fs::File;
///
/// let file = File::open("data.bin")?;
/// let chunker = Chunker::default();
///
/// for chunk in chunker.chunk(file) {
///     let chunk = chunk?;
///     println!("{chunk}");
/// }
/// # Ok::<(), rabin_chunker::ChunkError>(())
/// ```
#[derive(Debug)]
pub struct ChunkIter<R> {
    reader: R,
    assembler: ChunkAssembler,
    buffer: Buffer,
    pos: usize,
    filled: usize,
    finished: bool,
}

impl<R: Read> ChunkIter<R> {
    pub(crate) fn new(reader: R, assembler: ChunkAssembler) -> Self {
        Self {
            reader,
            assembler,
            buffer: Buffer::take(),
            pos: 0,
            filled: 0,
            finished: false,
        }
    }

    /// Returns the stream offset of the next chunk to be yielded.
    pub fn offset(&self) -> u64 {
        self.assembler.offset()
    }

    /// Returns a reference to the underlying reader.
    pub fn get_ref(&self) -> &R {
        &self.reader
    }

    /// Returns true once the source is exhausted or has failed.
    pub fn is_finished(&self) -> bool {
        self.finished
    }
}

impl<R: Read> Iterator for ChunkIter<R> {
    type Item = Result<Chunk, ChunkError>;

    fn next(&mut self) -> Option<Self::Item> {
        if self.finished {
            return None;
        }

        loop {
            // Scan what is already buffered before reading more
            if self.pos < self.filled {
                let (used, chunk) = self
                    .assembler
                    .feed(&self.buffer.as_slice()[self.pos..self.filled]);
                self.pos += used;
                if chunk.is_some() {
                    return chunk.map(Ok);
                }
            }

            match self.reader.read(self.buffer.as_mut_slice()) {
                Ok(0) => {
                    self.finished = true;
                    return self.assembler.finish().map(Ok);
                }
                Ok(n) => {
                    self.pos = 0;
                    self.filled = n;
                }
                Err(e) if e.kind() == io::ErrorKind::Interrupted => continue,
                Err(e) => {
                    self.finished = true;
                    warn!(offset = self.assembler.offset(), error = %e, "read failed");
                    return Some(Err(e.into()));
                }
            }
        }
    }
}

impl<R: Read> FusedIterator for ChunkIter<R> {}
