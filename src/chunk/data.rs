//! The Chunk type - represents a content-defined chunk.

use bytes::Bytes;
use std::fmt;

/// A content-defined chunk with its position in the source stream.
///
/// # Example
///
/// ```
/// use rabin_chunker::Chunk;
/// use bytes::Bytes;
///
/// let chunk = Chunk::new(Bytes::from_static(b"hello world"), 100, 0);
///
/// assert_eq!(chunk.len(), 11);
/// assert_eq!(chunk.range(), 100..111);
/// ```
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Chunk {
    /// The chunk data.
    pub data: Bytes,

    /// Offset of the first byte in the source stream.
    pub offset: u64,

    /// Rolling hash digest at the cut point.
    pub cut: u64,
}

impl Chunk {
    /// Creates a chunk.
    pub fn new(data: impl Into<Bytes>, offset: u64, cut: u64) -> Self {
        Self {
            data: data.into(),
            offset,
            cut,
        }
    }

    /// Returns the length of the chunk data.
    pub fn len(&self) -> usize {
        self.data.len()
    }

    /// Returns true if the chunk has no data.
    pub fn is_empty(&self) -> bool {
        self.data.is_empty()
    }

    /// Returns a reference to the chunk data.
    pub fn data(&self) -> &Bytes {
        &self.data
    }

    /// Returns the start offset.
    pub fn offset(&self) -> u64 {
        self.offset
    }

    /// Returns the cut digest.
    pub fn cut(&self) -> u64 {
        self.cut
    }

    /// Returns the end offset (exclusive).
    pub fn end(&self) -> u64 {
        self.offset + self.data.len() as u64
    }

    /// Returns the chunk as a range of stream offsets.
    pub fn range(&self) -> std::ops::Range<u64> {
        self.offset..self.end()
    }

    /// Consumes the chunk and returns the underlying data.
    pub fn into_data(self) -> Bytes {
        self.data
    }
}

impl fmt::Display for Chunk {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "Chunk({} bytes @ {}, cut={:016x})",
            self.len(),
            self.offset,
            self.cut
        )
    }
}
