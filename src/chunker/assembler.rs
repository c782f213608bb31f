//! Accumulates scanned bytes into owned chunks.

use bytes::Bytes;
use tracing::trace;

use crate::cdc::RabinCdc;
use crate::chunk::Chunk;

/// Sans-I/O chunk builder shared by the blocking and async front ends.
///
/// Bytes go in through [`feed`](Self::feed) in pieces of any size. A chunk is
/// returned as soon as its cut point has been fed.
///
/// Pending bytes live in one `max_size` scratch buffer that is reused for
/// every chunk; each emitted chunk owns an exact-size copy.
#[derive(Debug)]
pub(crate) struct ChunkAssembler {
    cdc: RabinCdc,
    scratch: Vec<u8>,
    offset: u64,
}

impl ChunkAssembler {
    pub(crate) fn new(cdc: RabinCdc, max_size: usize) -> Self {
        Self {
            cdc,
            scratch: Vec::with_capacity(max_size),
            offset: 0,
        }
    }

    /// Feeds `data` and returns how many of its bytes were consumed, plus
    /// the chunk they completed, if any.
    ///
    /// Bytes after the cut are not consumed; feed them again.
    pub(crate) fn feed(&mut self, data: &[u8]) -> (usize, Option<Chunk>) {
        match self.cdc.find_boundary(data) {
            Some(cut) => {
                self.scratch.extend_from_slice(&data[..cut.len]);
                (cut.len, Some(self.emit(cut.fingerprint)))
            }
            None => {
                self.scratch.extend_from_slice(data);
                (data.len(), None)
            }
        }
    }

    /// Ends the stream, returning the trailing partial chunk if any bytes
    /// are pending.
    pub(crate) fn finish(&mut self) -> Option<Chunk> {
        let fingerprint = self.cdc.finish();
        if self.scratch.is_empty() {
            return None;
        }
        Some(self.emit(fingerprint))
    }

    /// Returns the stream offset of the next chunk's first byte.
    pub(crate) fn offset(&self) -> u64 {
        self.offset
    }

    fn emit(&mut self, fingerprint: u64) -> Chunk {
        let data = Bytes::copy_from_slice(&self.scratch);
        self.scratch.clear();
        let offset = self.offset;
        self.offset += data.len() as u64;
        trace!(offset, len = data.len(), "emitted chunk");
        Chunk::new(data, offset, fingerprint)
    }
}
