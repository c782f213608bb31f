//! Async stream adapter for chunking.
//!
//! Uses `futures_io::AsyncRead`, so it works with tokio (through
//! `tokio_util::compat`), async-std, smol, or any futures-compatible runtime.
//! Boundaries are identical to the blocking [`ChunkIter`](crate::ChunkIter).

use std::io;
use std::pin::Pin;
use std::task::{Context, Poll};

use futures_core::Stream;
use futures_core::stream::FusedStream;
use futures_io::AsyncRead;
use pin_project_lite::pin_project;
use tracing::warn;

use crate::buffer::Buffer;
use crate::chunk::Chunk;
use crate::chunker::{ChunkAssembler, Chunker};
use crate::error::ChunkError;

pin_project! {
    /// A stream that yields chunks from an async reader.
    ///
    /// Created by [`chunk_async`]. Ends after the source is exhausted or
    /// after a read error has been yielded.
    #[derive(Debug)]
    pub struct ChunkStream<R> {
        #[pin]
        reader: R,
        assembler: ChunkAssembler,
        buffer: Buffer,
        pos: usize,
        filled: usize,
        finished: bool,
    }
}

impl<R> ChunkStream<R> {
    /// Returns the stream offset of the next chunk to be yielded.
    pub fn offset(&self) -> u64 {
        self.assembler.offset()
    }
}

impl<R: AsyncRead> Stream for ChunkStream<R> {
    type Item = Result<Chunk, ChunkError>;

    fn poll_next(self: Pin<&mut Self>, cx: &mut Context<'_>) -> Poll<Option<Self::Item>> {
        let mut this = self.project();

        if *this.finished {
            return Poll::Ready(None);
        }

        loop {
            if *this.pos < *this.filled {
                let (used, chunk) = this
                    .assembler
                    .feed(&this.buffer.as_slice()[*this.pos..*this.filled]);
                *this.pos += used;
                if chunk.is_some() {
                    return Poll::Ready(chunk.map(Ok));
                }
            }

            match this.reader.as_mut().poll_read(cx, this.buffer.as_mut_slice()) {
                Poll::Pending => return Poll::Pending,
                Poll::Ready(Ok(0)) => {
                    *this.finished = true;
                    return Poll::Ready(this.assembler.finish().map(Ok));
                }
                Poll::Ready(Ok(n)) => {
                    *this.pos = 0;
                    *this.filled = n;
                }
                Poll::Ready(Err(e)) if e.kind() == io::ErrorKind::Interrupted => continue,
                Poll::Ready(Err(e)) => {
                    *this.finished = true;
                    warn!(offset = this.assembler.offset(), error = %e, "read failed");
                    return Poll::Ready(Some(Err(e.into())));
                }
            }
        }
    }
}

impl<R: AsyncRead> FusedStream for ChunkStream<R> {
    fn is_terminated(&self) -> bool {
        self.finished
    }
}

/// Creates a chunk stream from an async reader.
///
/// For tokio readers, convert with `tokio_util::compat`:
///
/// ```no_run
/// use futures_util::StreamExt;
/// use rabin_chunker::{Chunker, chunk_async};
/// use tokio_util::compat::TokioAsyncReadCompatExt;
///
/// # async fn demo() -> Result<(), rabin_chunker::ChunkError> {
/// let file = tokio::fs::File::open("data.bin").await?;
/// let mut stream = chunk_async(file.compat(), &Chunker::default());
///
/// while let Some(chunk) = stream.next().await {
///     let chunk = chunk?;
///     println!("{chunk}");
/// }
/// # Ok(())
/// # }
/// ```
pub fn chunk_async<R: AsyncRead>(reader: R, chunker: &Chunker) -> ChunkStream<R> {
    ChunkStream {
        reader,
        assembler: chunker.assembler(),
        buffer: Buffer::take(),
        pos: 0,
        filled: 0,
        finished: false,
    }
}
