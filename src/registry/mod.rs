//! Integer handles for live sessions.
//!
//! [`SessionRegistry`] owns sessions on behalf of callers that can only hold
//! an integer, such as the C interface. Handles are positive, never reused
//! and never 0, so 0 can signal failure across the C boundary.
//!
//! The registry lock only guards the handle table. Each session has its own
//! lock, held while it reads from its source, so one slow source does not
//! stall other handles.

use std::collections::HashMap;
use std::fmt;
use std::fs::File;
use std::io::Read;
use std::path::Path;
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};

use tracing::debug;

use crate::chunk::Chunk;
use crate::chunker::Chunker;
use crate::config::ChunkConfig;
use crate::error::ChunkError;
use crate::session::Session;

/// Reader type held by registered sessions.
pub type BoxedReader = Box<dyn Read + Send>;

type SharedSession = Arc<Mutex<Session<BoxedReader>>>;

/// Opaque handle naming a registered session.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct SessionHandle(i32);

impl SessionHandle {
    /// Wraps a raw handle value. Returns `None` unless `raw` is positive.
    pub fn from_raw(raw: i32) -> Option<Self> {
        (raw > 0).then_some(Self(raw))
    }

    /// Returns the raw handle value.
    pub fn get(self) -> i32 {
        self.0
    }
}

impl fmt::Display for SessionHandle {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "#{}", self.0)
    }
}

struct Inner {
    sessions: HashMap<SessionHandle, SharedSession>,
    next_handle: i32,
}

/// A table of open chunking sessions keyed by [`SessionHandle`].
///
/// # Example
///
/// ```
/// use rabin_chunker::{ChunkConfig, SessionRegistry};
///
/// let registry = SessionRegistry::new();
/// let config = ChunkConfig::new(64, 1024)?;
/// let handle = registry.insert(Box::new(&b"hello"[..]), config)?;
///
/// let mut buf = [0u8; 1024];
/// assert_eq!(registry.next_into(handle, &mut buf)?, 5);
/// assert_eq!(&buf[..5], b"hello");
/// assert_eq!(registry.next_into(handle, &mut buf)?, 0);
///
/// assert!(registry.close(handle));
/// assert!(registry.next_into(handle, &mut buf).is_err());
/// # Ok::<(), rabin_chunker::ChunkError>(())
/// ```
pub struct SessionRegistry {
    inner: Mutex<Inner>,
}

impl SessionRegistry {
    /// Creates an empty registry.
    pub fn new() -> Self {
        Self {
            inner: Mutex::new(Inner {
                sessions: HashMap::new(),
                next_handle: 1,
            }),
        }
    }

    /// Opens the file at `path` and registers a session over it.
    ///
    /// # Errors
    ///
    /// [`ChunkError::SourceUnavailable`] if the file cannot be opened, plus
    /// the errors of [`insert`](Self::insert).
    pub fn open(
        &self,
        path: impl AsRef<Path>,
        config: ChunkConfig,
    ) -> Result<SessionHandle, ChunkError> {
        let path = path.as_ref();
        let file = File::open(path).map_err(|source| ChunkError::SourceUnavailable {
            path: path.to_path_buf(),
            source,
        })?;
        let handle = self.insert(Box::new(file), config)?;
        debug!(%handle, path = %path.display(), "opened session");
        Ok(handle)
    }

    /// Registers a session over `reader` and returns its handle.
    ///
    /// # Errors
    ///
    /// Configuration errors from [`Chunker::new`], or
    /// [`ChunkError::HandlesExhausted`] once `i32::MAX` handles have been
    /// issued.
    pub fn insert(
        &self,
        reader: BoxedReader,
        config: ChunkConfig,
    ) -> Result<SessionHandle, ChunkError> {
        let chunker = Chunker::new(config)?;
        let session = Arc::new(Mutex::new(chunker.session(reader)));

        let mut inner = self.lock();
        let raw = inner.next_handle;
        let handle = SessionHandle::from_raw(raw).ok_or(ChunkError::HandlesExhausted)?;
        // i32::MIN marks the handle space as used up
        inner.next_handle = raw.checked_add(1).unwrap_or(i32::MIN);
        inner.sessions.insert(handle, session);
        Ok(handle)
    }

    /// Copies the next chunk of `handle` into `buf`. See [`Session::next_into`].
    pub fn next_into(&self, handle: SessionHandle, buf: &mut [u8]) -> Result<usize, ChunkError> {
        self.with_session(handle, |session| session.next_into(buf))
    }

    /// Hands the next chunk of `handle` to `copy`. See [`Session::next_with`].
    pub fn next_with<F>(
        &self,
        handle: SessionHandle,
        capacity: usize,
        copy: F,
    ) -> Result<usize, ChunkError>
    where
        F: FnOnce(&[u8]),
    {
        self.with_session(handle, |session| session.next_with(capacity, copy))
    }

    /// Returns the next chunk of `handle`. See [`Session::next_chunk`].
    pub fn next_chunk(&self, handle: SessionHandle) -> Result<Option<Chunk>, ChunkError> {
        self.with_session(handle, Session::next_chunk)
    }

    /// Closes `handle`, dropping its session and source.
    ///
    /// Returns false if the handle was not open.
    pub fn close(&self, handle: SessionHandle) -> bool {
        let removed = self.lock().sessions.remove(&handle);
        if removed.is_some() {
            debug!(%handle, "closed session");
        }
        removed.is_some()
    }

    /// Returns the number of open sessions.
    pub fn len(&self) -> usize {
        self.lock().sessions.len()
    }

    /// Returns true if no sessions are open.
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    fn lock(&self) -> MutexGuard<'_, Inner> {
        self.inner.lock().unwrap_or_else(PoisonError::into_inner)
    }

    fn with_session<T>(
        &self,
        handle: SessionHandle,
        f: impl FnOnce(&mut Session<BoxedReader>) -> Result<T, ChunkError>,
    ) -> Result<T, ChunkError> {
        let session = self
            .lock()
            .sessions
            .get(&handle)
            .cloned()
            .ok_or(ChunkError::UnknownHandle(handle.get()))?;

        // A panic while reading leaves the session in an unknown state
        let mut session = session.lock().map_err(|_| ChunkError::SessionFailed)?;
        f(&mut session)
    }
}

impl Default for SessionRegistry {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Debug for SessionRegistry {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let inner = self.lock();
        f.debug_struct("SessionRegistry")
            .field("sessions", &inner.sessions.len())
            .field("next_handle", &inner.next_handle)
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::{self, Cursor, Write};
    use std::thread;

    fn config() -> ChunkConfig {
        ChunkConfig::new(64, 256).unwrap().with_average_bits(53)
    }

    struct Broken;

    impl Read for Broken {
        fn read(&mut self, _buf: &mut [u8]) -> io::Result<usize> {
            Err(io::Error::other("broken"))
        }
    }

    #[test]
    fn test_handles_are_positive_and_distinct() {
        let registry = SessionRegistry::new();
        let a = registry.insert(Box::new(Cursor::new(vec![1u8; 10])), config()).unwrap();
        let b = registry.insert(Box::new(Cursor::new(vec![2u8; 10])), config()).unwrap();

        assert!(a.get() > 0);
        assert!(b.get() > a.get());
        assert_eq!(registry.len(), 2);
    }

    #[test]
    fn test_handles_not_reused_after_close() {
        let registry = SessionRegistry::new();
        let a = registry.insert(Box::new(io::empty()), config()).unwrap();
        assert!(registry.close(a));
        let b = registry.insert(Box::new(io::empty()), config()).unwrap();
        assert_ne!(a, b);
    }

    #[test]
    fn test_from_raw_rejects_non_positive() {
        assert!(SessionHandle::from_raw(0).is_none());
        assert!(SessionHandle::from_raw(-3).is_none());
        assert_eq!(SessionHandle::from_raw(7).map(SessionHandle::get), Some(7));
    }

    #[test]
    fn test_unknown_handle() {
        let registry = SessionRegistry::new();
        let handle = SessionHandle::from_raw(42).unwrap();
        let mut buf = [0u8; 16];

        assert!(matches!(
            registry.next_into(handle, &mut buf),
            Err(ChunkError::UnknownHandle(42))
        ));
        assert!(!registry.close(handle));
    }

    #[test]
    fn test_close_is_idempotent() {
        let registry = SessionRegistry::new();
        let handle = registry.insert(Box::new(io::empty()), config()).unwrap();
        assert!(registry.close(handle));
        assert!(!registry.close(handle));
        assert!(registry.is_empty());
    }

    #[test]
    fn test_handles_exhausted() {
        let registry = SessionRegistry::new();
        registry.lock().next_handle = i32::MAX;

        let last = registry.insert(Box::new(io::empty()), config()).unwrap();
        assert_eq!(last.get(), i32::MAX);
        assert!(matches!(
            registry.insert(Box::new(io::empty()), config()),
            Err(ChunkError::HandlesExhausted)
        ));
    }

    #[test]
    fn test_invalid_config_not_registered() {
        let registry = SessionRegistry::new();
        let bad = ChunkConfig::default().with_max_size(1);
        assert!(registry.insert(Box::new(io::empty()), bad).is_err());
        assert!(registry.is_empty());
    }

    #[test]
    fn test_open_missing_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("missing.bin");

        let err = SessionRegistry::new().open(&path, config()).unwrap_err();
        match err {
            ChunkError::SourceUnavailable { path: p, source } => {
                assert_eq!(p, path);
                assert_eq!(source.kind(), io::ErrorKind::NotFound);
            }
            other => panic!("unexpected error: {other}"),
        }
    }

    #[test]
    fn test_open_file_and_read_chunks() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        file.write_all(&[0xAB; 600]).unwrap();
        file.flush().unwrap();

        let registry = SessionRegistry::new();
        let handle = registry.open(file.path(), config()).unwrap();

        let mut lens = Vec::new();
        while let Some(chunk) = registry.next_chunk(handle).unwrap() {
            lens.push(chunk.len());
        }
        assert_eq!(lens, vec![256, 256, 88]);
        assert!(registry.close(handle));
    }

    #[test]
    fn test_failed_session_reports_session_failed() {
        let registry = SessionRegistry::new();
        let handle = registry.insert(Box::new(Broken), config()).unwrap();

        assert!(matches!(registry.next_chunk(handle), Err(ChunkError::Io(_))));
        assert!(matches!(
            registry.next_chunk(handle),
            Err(ChunkError::SessionFailed)
        ));
        assert!(registry.close(handle));
    }

    #[test]
    fn test_sessions_are_independent_across_threads() {
        let registry = Arc::new(SessionRegistry::new());

        let workers: Vec<_> = (0..4u8)
            .map(|n| {
                let registry = Arc::clone(&registry);
                thread::spawn(move || {
                    let data = vec![n + 1; 1000];
                    let handle = registry.insert(Box::new(Cursor::new(data)), config()).unwrap();
                    let mut total = 0;
                    let mut buf = [0u8; 256];
                    loop {
                        let n = registry.next_into(handle, &mut buf).unwrap();
                        if n == 0 {
                            break;
                        }
                        total += n;
                    }
                    registry.close(handle);
                    total
                })
            })
            .collect();

        for worker in workers {
            assert_eq!(worker.join().unwrap(), 1000);
        }
        assert!(registry.is_empty());
    }
}
