//! Error types for rabin-chunker.

use std::io;
use std::path::PathBuf;

use crate::polynomial::Pol;

/// Errors that can occur while configuring, creating, or driving a chunker.
#[derive(Debug, thiserror::Error)]
pub enum ChunkError {
    /// The underlying stream failed mid-chunking.
    ///
    /// A session that reports this is terminal and must be closed.
    #[error("io error: {0}")]
    Io(#[from] io::Error),

    /// The byte source could not be opened.
    #[error("source unavailable: {}: {source}", path.display())]
    SourceUnavailable {
        /// Path that was requested.
        path: PathBuf,
        /// Why opening failed.
        #[source]
        source: io::Error,
    },

    /// The handle does not name a live session.
    #[error("unknown session handle {0}")]
    UnknownHandle(i32),

    /// The caller's buffer cannot hold the next chunk. The chunk is not consumed.
    #[error("buffer too small: chunk is {needed} bytes, buffer holds {capacity}")]
    BufferTooSmall {
        /// Length of the pending chunk.
        needed: usize,
        /// Capacity offered by the caller.
        capacity: usize,
    },

    /// The session already reported a read failure.
    #[error("session failed after an earlier read error")]
    SessionFailed,

    /// Invalid configuration parameter.
    #[error("invalid config: {message}")]
    InvalidConfig {
        /// Description of what was invalid.
        message: &'static str,
    },

    /// The polynomial cannot drive the rolling hash.
    #[error("invalid polynomial {polynomial}: {reason}")]
    InvalidPolynomial {
        /// The rejected polynomial.
        polynomial: Pol,
        /// Why it was rejected.
        reason: &'static str,
    },

    /// Polynomial derivation gave up.
    #[error("no irreducible polynomial found after {attempts} attempts")]
    NoIrreduciblePolynomial {
        /// Candidates tested.
        attempts: usize,
    },

    /// Every positive handle value has been handed out.
    #[error("session handles exhausted")]
    HandlesExhausted,
}
