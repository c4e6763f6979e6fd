//! Process-wide session registry.

use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Arc, LazyLock, Mutex, PoisonError};

use dashmap::DashMap;
use meshgen_chunk::{ChunkError, ChunkGenerator};

use crate::status::FfiError;

type Session = Arc<Mutex<ChunkGenerator>>;

static GENERATORS: LazyLock<DashMap<u64, Session>> = LazyLock::new(DashMap::new);
static NEXT_HANDLE: AtomicU64 = AtomicU64::new(1);

/// Register a session and return its new handle. Handles are never reused.
pub(crate) fn insert(generator: ChunkGenerator) -> u64 {
    let handle = NEXT_HANDLE.fetch_add(1, Ordering::Relaxed);
    GENERATORS.insert(handle, Arc::new(Mutex::new(generator)));
    handle
}

/// Run `f` with exclusive access to the session behind `handle`.
///
/// The map's shard guard is released before `f` runs. Only calls on the same
/// handle wait for each other.
pub(crate) fn with_generator<T>(
    handle: u64,
    f: impl FnOnce(&mut ChunkGenerator) -> Result<T, ChunkError>,
) -> Result<T, FfiError> {
    let session = GENERATORS
        .get(&handle)
        .map(|entry| Arc::clone(entry.value()))
        .ok_or(FfiError::InvalidHandle(handle))?;
    let mut generator = session
        .lock()
        .map_err(|_| FfiError::Poisoned(handle))?;
    Ok(f(&mut generator)?)
}

/// Unregister a session. A call still running on another thread keeps the
/// generator alive until it returns.
pub(crate) fn remove(handle: u64) -> Result<(), FfiError> {
    let (_, session) = GENERATORS
        .remove(&handle)
        .ok_or(FfiError::InvalidHandle(handle))?;
    if let Ok(mutex) = Arc::try_unwrap(session) {
        mutex
            .into_inner()
            .unwrap_or_else(PoisonError::into_inner)
            .destroy();
    }
    Ok(())
}

#[cfg(test)]
pub(crate) fn live_sessions() -> usize {
    GENERATORS.len()
}
