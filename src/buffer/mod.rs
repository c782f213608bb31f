//! Internal buffer management.
//!
//! Read buffers are pooled per thread so that opening many short sessions
//! does not allocate a fresh 512 KiB buffer each time. This is an
//! implementation detail and not part of the public API.

mod pool;

pub(crate) use pool::Buffer;
