//! Async file chunking example using tokio.
//!
//! Run with:
//!     cargo run --example async_chunk_file --features async-io -- /path/to/file

use std::env;

use futures_util::StreamExt;
use rabin_chunker::{ChunkConfig, Chunker, chunk_async};
use tokio_util::compat::TokioAsyncReadCompatExt;

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let path = env::args()
        .nth(1)
        .unwrap_or_else(|| "Cargo.toml".to_string());

    println!("Async chunking file: {}\n", path);

    let config = ChunkConfig::new(8 * 1024, 128 * 1024)?.with_average_bits(15);
    let chunker = Chunker::new(config)?;

    // tokio's AsyncRead is bridged to futures-io through compat
    let file = tokio::fs::File::open(&path).await?;
    let mut stream = chunk_async(file.compat(), &chunker);

    let mut total_chunks = 0;
    let mut total_bytes = 0;

    while let Some(chunk) = stream.next().await {
        let chunk = chunk?;
        total_chunks += 1;
        total_bytes += chunk.len();
        println!("{chunk}");
    }

    println!("\nTotal: {} chunks, {} bytes", total_chunks, total_bytes);
    Ok(())
}
