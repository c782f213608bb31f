//! rabin-chunker
//!
//! Streaming Content-Defined Chunking (CDC) with a 64-bit Rabin rolling hash.
//!
//! `rabin-chunker` splits a byte stream into variable-length chunks whose
//! boundaries depend on the content, so an insertion or deletion only
//! changes the chunks around it. With the default configuration the
//! boundaries match those of restic's chunker for the same polynomial.
//!
//! The crate intentionally:
//! - does NOT hash chunks for deduplication keys
//! - does NOT persist chunks
//! - does NOT compress or encrypt
//!
//! It only does one thing: **Read bytes → yield chunks**
//!
//! # Sync
//!
//! ```no_run
//! use std::fs::File;
//! use rabin_chunker::{Chunker, ChunkConfig, ChunkError};
//!
//! fn main() -> Result<(), ChunkError> {
//!     let file = File::open("data.bin")?;
//!     let chunker = Chunker::new(ChunkConfig::default())?;
//!
//!     for chunk in chunker.chunk(file) {
//!         let chunk = chunk?;
//!         println!("chunk {} bytes at {}", chunk.len(), chunk.offset);
//!     }
//!     Ok(())
//! }
//! ```
//!
//! # Sessions and handles
//!
//! [`Session`] adds the copy-into-buffer protocol with explicit end and
//! failure states, and [`SessionRegistry`] maps integer handles to sessions.
//! With the `ffi` feature (on by default) the same operations are exported
//! as a C ABI, see `include/rabin_chunker.h`.
//!
//! # Async (feature = "async-io")
//!
//! ```ignore
//! use futures_util::StreamExt;
//! use rabin_chunker::{chunk_async, Chunker};
//! use futures_io::AsyncRead;
//!
//! async fn demo<R: AsyncRead + Unpin>(reader: R) -> Result<(), rabin_chunker::ChunkError> {
//!     let mut stream = chunk_async(reader, &Chunker::default());
//!
//!     while let Some(chunk) = stream.next().await {
//!         let chunk = chunk?;
//!         println!("chunk {}", chunk.len());
//!     }
//!     Ok(())
//! }
//! ```

#![deny(unsafe_code)]
#![warn(missing_docs)]

mod chunk;
mod chunker;
mod config;
mod error;
mod polynomial;
mod registry;
mod session;

mod buffer; // internal (thread-local reuse)
mod cdc; // internal rolling hash and boundary scanner

#[cfg(feature = "async-io")]
mod async_stream;

#[cfg(feature = "ffi")]
pub mod ffi;

//
// Public surface
//

pub use cdc::{RollingHash, Tables};
pub use chunk::Chunk;
pub use chunker::{ChunkIter, Chunker};
pub use config::{
    ChunkConfig, DEFAULT_AVERAGE_BITS, DEFAULT_MAX_SIZE, DEFAULT_MIN_SIZE, DEFAULT_POLYNOMIAL,
    WINDOW_SIZE,
};
pub use error::ChunkError;
pub use polynomial::{DERIVE_MAX_ATTEMPTS, Pol};
pub use registry::{BoxedReader, SessionHandle, SessionRegistry};
pub use session::{Session, SessionState};

#[cfg(feature = "async-io")]
pub use async_stream::{ChunkStream, chunk_async};
