//! Content-Defined Chunking (CDC) core.
//!
//! - [`Tables`] - Per-polynomial lookup tables, cached process-wide
//! - [`RollingHash`] - 64-byte sliding-window Rabin fingerprint
//! - `RabinCdc` - Boundary policy (min/max size, mask) over the hash

mod rabin;
mod rolling;
mod tables;

pub(crate) use rabin::RabinCdc;
pub use rolling::RollingHash;
pub use tables::Tables;
