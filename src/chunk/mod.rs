//! Chunk types.
//!
//! - [`Chunk`] - Content-defined chunk with data, offset and cut digest

mod data;

pub use data::Chunk;
