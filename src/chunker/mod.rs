//! Chunking engine.
//!
//! - [`Chunker`] - Validated configuration plus hash tables; starts chunking
//! - [`ChunkIter`] - Iterator yielding chunks from a [`std::io::Read`] source
//!
//! # Example
//!
//! ```
//! use rabin_chunker::{ChunkConfig, Chunker};
//!
//! let config = ChunkConfig::new(1024, 8192)?.with_average_bits(11);
//! let chunker = Chunker::new(config)?;
//!
//! let data: Vec<u8> = (0..64 * 1024u32).map(|i| (i * 7 % 251) as u8).collect();
//! let chunks = chunker.chunk_bytes(data.clone());
//!
//! let total: usize = chunks.iter().map(|c| c.len()).sum();
//! assert_eq!(total, data.len());
//! # Ok::<(), rabin_chunker::ChunkError>(())
//! ```

mod assembler;
mod iter;

use std::io::Read;
use std::sync::Arc;

use bytes::Bytes;
use tracing::trace;

use crate::cdc::{RabinCdc, Tables};
use crate::chunk::Chunk;
use crate::config::ChunkConfig;
use crate::error::ChunkError;
use crate::session::Session;

pub(crate) use assembler::ChunkAssembler;
pub use iter::ChunkIter;

/// A chunker that splits byte streams into content-defined chunks.
///
/// Creating a `Chunker` validates the configuration and builds (or fetches
/// from the process-wide cache) the lookup tables for its polynomial. The
/// chunker itself is immutable and cheap to clone; every call to
/// [`chunk`](Self::chunk) starts an independent pass.
#[derive(Debug, Clone)]
pub struct Chunker {
    config: ChunkConfig,
    tables: Arc<Tables>,
}

impl Chunker {
    /// Creates a chunker for `config`.
    ///
    /// # Errors
    ///
    /// [`ChunkError::InvalidConfig`] if the sizes or mask are out of range,
    /// [`ChunkError::InvalidPolynomial`] if the polynomial is reducible or of
    /// unsupported degree.
    pub fn new(config: ChunkConfig) -> Result<Self, ChunkError> {
        config.validate()?;
        let tables = Tables::for_polynomial(config.polynomial())?;
        Ok(Self { config, tables })
    }

    /// Returns the configuration.
    pub fn config(&self) -> &ChunkConfig {
        &self.config
    }

    /// Creates a chunking iterator over `reader`.
    pub fn chunk<R: Read>(&self, reader: R) -> ChunkIter<R> {
        ChunkIter::new(reader, self.assembler())
    }

    /// Opens a [`Session`] over `reader`.
    pub fn session<R: Read>(&self, reader: R) -> Session<R> {
        Session::new(reader, self)
    }

    /// Chunks an in-memory buffer.
    ///
    /// Chunk data are zero-copy slices of `data`. Boundaries are the same as
    /// for [`chunk`](Self::chunk) over the same bytes.
    pub fn chunk_bytes(&self, data: impl Into<Bytes>) -> Vec<Chunk> {
        let data = data.into();
        let mut cdc = self.scanner();
        let mut chunks = Vec::new();
        let mut start = 0;

        while let Some(cut) = cdc.find_boundary(&data[start..]) {
            let end = start + cut.len;
            chunks.push(Chunk::new(data.slice(start..end), start as u64, cut.fingerprint));
            start = end;
        }

        if start < data.len() {
            chunks.push(Chunk::new(data.slice(start..), start as u64, cdc.finish()));
        }

        trace!(len = data.len(), chunks = chunks.len(), "chunked buffer");
        chunks
    }

    pub(crate) fn scanner(&self) -> RabinCdc {
        RabinCdc::new(&self.config, Arc::clone(&self.tables))
    }

    pub(crate) fn assembler(&self) -> ChunkAssembler {
        ChunkAssembler::new(self.scanner(), self.config.max_size())
    }
}

impl Default for Chunker {
    /// A chunker with the default configuration and polynomial.
    ///
    /// # Panics
    ///
    /// Never in practice: the defaults are valid and the default polynomial
    /// is irreducible.
    fn default() -> Self {
        let config = ChunkConfig::default();
        match Tables::for_polynomial(config.polynomial()) {
            Ok(tables) => Self { config, tables },
            Err(e) => panic!("default polynomial rejected: {e}"),
        }
    }
}
