//! Pull-based chunking sessions.
//!
//! A [`Session`] wraps a [`ChunkIter`] with the terminal-state rules and the
//! copy-into-caller-buffer protocol used by the handle registry and the C
//! interface:
//!
//! - `Ready` → `Ready` on each delivered chunk
//! - `Ready` → `Ended` when the source is exhausted; end of stream is then
//!   reported on every later call
//! - `Ready` → `Failed` on a read error; every later call fails with
//!   [`ChunkError::SessionFailed`] without touching the source
//!
//! A chunk that does not fit the caller's buffer stays pending and is
//! offered again on the next call.

use std::io::Read;

use crate::chunk::Chunk;
use crate::chunker::{ChunkIter, Chunker};
use crate::error::ChunkError;

/// Lifecycle state of a [`Session`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SessionState {
    /// More chunks may follow.
    Ready,
    /// The source is exhausted.
    Ended,
    /// A read failed; the session is unusable.
    Failed,
}

/// A chunking session over one reader.
///
/// # Example
///
/// ```
/// use rabin_chunker::{ChunkConfig, Chunker, SessionState};
///
/// let chunker = Chunker::new(ChunkConfig::new(64, 256)?)?;
/// let data = [7u8; 50];
/// let mut session = chunker.session(&data[..]);
///
/// let mut small = [0u8; 10];
/// assert!(session.next_into(&mut small).is_err());
///
/// let mut buf = [0u8; 256];
/// assert_eq!(session.next_into(&mut buf)?, 50);
/// assert_eq!(session.next_into(&mut buf)?, 0);
/// assert_eq!(session.state(), SessionState::Ended);
/// # Ok::<(), rabin_chunker::ChunkError>(())
/// ```
#[derive(Debug)]
pub struct Session<R> {
    iter: ChunkIter<R>,
    pending: Option<Chunk>,
    state: SessionState,
}

impl<R: Read> Session<R> {
    /// Opens a session reading from `reader`.
    pub fn new(reader: R, chunker: &Chunker) -> Self {
        Self {
            iter: chunker.chunk(reader),
            pending: None,
            state: SessionState::Ready,
        }
    }

    /// Returns the current state.
    pub fn state(&self) -> SessionState {
        self.state
    }

    /// Returns the next chunk, or `None` at end of stream.
    pub fn next_chunk(&mut self) -> Result<Option<Chunk>, ChunkError> {
        self.fill()?;
        Ok(self.pending.take())
    }

    /// Copies the next chunk into the front of `buf` and returns its length,
    /// or 0 at end of stream.
    ///
    /// # Errors
    ///
    /// [`ChunkError::BufferTooSmall`] if the chunk is longer than `buf`; the
    /// chunk is kept and returned by the next call.
    pub fn next_into(&mut self, buf: &mut [u8]) -> Result<usize, ChunkError> {
        self.next_with(buf.len(), |data| buf[..data.len()].copy_from_slice(data))
    }

    /// Hands the next chunk to `copy` if it is at most `capacity` bytes long
    /// and returns its length, or 0 at end of stream.
    ///
    /// `copy` is not called at end of stream or on error.
    pub fn next_with<F>(&mut self, capacity: usize, copy: F) -> Result<usize, ChunkError>
    where
        F: FnOnce(&[u8]),
    {
        self.fill()?;
        let Some(chunk) = self.pending.as_ref() else {
            return Ok(0);
        };

        let needed = chunk.len();
        if needed > capacity {
            return Err(ChunkError::BufferTooSmall { needed, capacity });
        }

        copy(chunk.data());
        self.pending = None;
        Ok(needed)
    }

    /// Makes sure a chunk is pending unless the session is terminal.
    fn fill(&mut self) -> Result<(), ChunkError> {
        match self.state {
            SessionState::Failed => return Err(ChunkError::SessionFailed),
            SessionState::Ended => return Ok(()),
            SessionState::Ready => {}
        }
        if self.pending.is_some() {
            return Ok(());
        }

        match self.iter.next() {
            Some(Ok(chunk)) => self.pending = Some(chunk),
            Some(Err(e)) => {
                self.state = SessionState::Failed;
                return Err(e);
            }
            None => self.state = SessionState::Ended,
        }
        Ok(())
    }
}
