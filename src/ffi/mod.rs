//! C interface.
//!
//! Exposes one process-wide [`SessionRegistry`] through plain integer
//! handles, using the default configuration and polynomial. The matching
//! declarations are in `include/rabin_chunker.h`.
//!
//! | Function | Returns |
//! |----------|---------|
//! | `chunker_new(path)` | handle > 0, or 0 on failure |
//! | `chunker_next(handle, buf, cap)` | chunk length, 0 at end of stream, -1 on error |
//! | `chunker_close(handle)` | nothing; unknown handles are ignored |
//! | `chunker_get_min_size()` | default minimum chunk size |
//! | `chunker_get_max_size()` | default maximum chunk size |
//!
//! Errors are logged at `warn` level since the integer results cannot carry
//! them.

#![allow(unsafe_code)]

use std::ffi::{CStr, c_char, c_int};
use std::path::Path;
use std::ptr;
use std::sync::LazyLock;

use tracing::warn;

use crate::config::{ChunkConfig, DEFAULT_MAX_SIZE, DEFAULT_MIN_SIZE};
use crate::registry::{SessionHandle, SessionRegistry};

static REGISTRY: LazyLock<SessionRegistry> = LazyLock::new(SessionRegistry::new);

/// Opens a chunking session over the file at `path`.
///
/// Returns a positive handle, or 0 if `path` is null or cannot be opened.
/// On unix the path bytes are used as-is; elsewhere they must be UTF-8.
///
/// # Safety
///
/// `path` must be null or point to a NUL-terminated string that stays valid
/// for the duration of the call.
#[unsafe(no_mangle)]
pub unsafe extern "C" fn chunker_new(path: *const c_char) -> c_int {
    if path.is_null() {
        warn!("chunker_new: null path");
        return 0;
    }

    // SAFETY: non-null and NUL-terminated per the contract above.
    let path = unsafe { CStr::from_ptr(path) };
    let Some(path) = c_path(path) else {
        warn!("chunker_new: path is not valid UTF-8");
        return 0;
    };

    match REGISTRY.open(path, ChunkConfig::default()) {
        Ok(handle) => handle.get(),
        Err(e) => {
            warn!(error = %e, "chunker_new failed");
            0
        }
    }
}

#[cfg(unix)]
fn c_path(path: &CStr) -> Option<&Path> {
    use std::os::unix::ffi::OsStrExt;
    Some(Path::new(std::ffi::OsStr::from_bytes(path.to_bytes())))
}

#[cfg(not(unix))]
fn c_path(path: &CStr) -> Option<&Path> {
    path.to_str().ok().map(Path::new)
}

/// Copies the next chunk of `handle` into `buffer`.
///
/// Returns the chunk length, 0 at end of stream, or -1 if the handle is
/// unknown, the buffer is null or too small, `capacity` is negative, or the
/// source failed. A chunk that did not fit is returned again by the next
/// call.
///
/// # Safety
///
/// `buffer` must be null or valid for writes of `capacity` bytes, and must
/// not be accessed by anything else during the call.
#[unsafe(no_mangle)]
pub unsafe extern "C" fn chunker_next(handle: c_int, buffer: *mut u8, capacity: c_int) -> c_int {
    let Some(handle) = SessionHandle::from_raw(handle) else {
        warn!(handle, "chunker_next: invalid handle");
        return -1;
    };
    let Ok(capacity) = usize::try_from(capacity) else {
        warn!(%handle, capacity, "chunker_next: negative capacity");
        return -1;
    };
    if buffer.is_null() {
        warn!(%handle, "chunker_next: null buffer");
        return -1;
    }

    let copied = REGISTRY.next_with(handle, capacity, |chunk| {
        // SAFETY: `chunk.len() <= capacity` is checked before this runs, and
        // the caller guarantees `buffer` holds `capacity` writable bytes.
        unsafe { ptr::copy_nonoverlapping(chunk.as_ptr(), buffer, chunk.len()) }
    });

    match copied {
        // Chunks never exceed max_size, which fits in a c_int
        Ok(n) => c_int::try_from(n).unwrap_or(-1),
        Err(e) => {
            warn!(%handle, error = %e, "chunker_next failed");
            -1
        }
    }
}

/// Closes `handle` and releases its source. Unknown handles are ignored.
#[unsafe(no_mangle)]
pub extern "C" fn chunker_close(handle: c_int) {
    if let Some(handle) = SessionHandle::from_raw(handle) {
        REGISTRY.close(handle);
    }
}

/// Returns the minimum chunk size used by [`chunker_new`].
#[unsafe(no_mangle)]
pub extern "C" fn chunker_get_min_size() -> c_int {
    DEFAULT_MIN_SIZE as c_int
}

/// Returns the maximum chunk size used by [`chunker_new`].
#[unsafe(no_mangle)]
pub extern "C" fn chunker_get_max_size() -> c_int {
    DEFAULT_MAX_SIZE as c_int
}
