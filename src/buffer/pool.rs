//! Thread-local pool of read buffers.

use std::cell::RefCell;

/// Size of each read buffer. Sources are read in pieces of at most this many
/// bytes.
pub const READ_BUFFER_SIZE: usize = 512 * 1024; // 512 KiB

/// Maximum number of buffers to keep per thread.
pub const MAX_POOL_SIZE: usize = 4;

/// A fixed-size, reusable read buffer.
///
/// The buffer is always [`READ_BUFFER_SIZE`] bytes long. Its contents are
/// whatever the last reader left there; callers track the filled range.
pub struct Buffer {
    data: Vec<u8>,
}

impl Buffer {
    /// Takes a buffer from the thread-local pool or allocates a new one.
    pub fn take() -> Self {
        let pooled = THREAD_BUFFER_POOL.with(|pool| pool.borrow_mut().pop());
        Self {
            data: pooled.unwrap_or_else(|| vec![0; READ_BUFFER_SIZE]),
        }
    }

    /// Returns the whole buffer.
    pub fn as_slice(&self) -> &[u8] {
        &self.data
    }

    /// Returns the whole buffer for reading into.
    pub fn as_mut_slice(&mut self) -> &mut [u8] {
        &mut self.data
    }
}

impl Drop for Buffer {
    fn drop(&mut self) {
        if self.data.len() != READ_BUFFER_SIZE {
            return;
        }
        // May run during thread teardown, after the pool itself is gone.
        let _ = THREAD_BUFFER_POOL.try_with(|pool| {
            let mut pool = pool.borrow_mut();
            if pool.len() < MAX_POOL_SIZE {
                pool.push(std::mem::take(&mut self.data));
            }
        });
    }
}

impl std::fmt::Debug for Buffer {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Buffer").field("len", &self.data.len()).finish()
    }
}

thread_local! {
    static THREAD_BUFFER_POOL: RefCell<Vec<Vec<u8>>> = const { RefCell::new(Vec::new()) };
}
