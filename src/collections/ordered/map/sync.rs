use std::fmt::{self, Debug, Formatter};
use std::sync::Arc;

use parking_lot::{Mutex, MutexGuard};

/// A shared lock handle associated with an [`OrderedMap`](super::OrderedMap), for callers that
/// coordinate access to one map from several places.
///
/// The map never takes this lock itself. Holding the guard only excludes other holders of the same
/// handle. Clones share the underlying lock.
///
/// # Examples
/// ```
/// # use ordered_collections::collections::ordered::OrderedMap;
/// let map: OrderedMap<u8, u8> = OrderedMap::new();
/// let root = map.sync_root().clone();
/// assert!(root.ptr_eq(map.sync_root()));
///
/// let guard = root.lock();
/// assert!(map.sync_root().try_lock().is_none());
/// drop(guard);
/// ```
#[derive(Clone, Default)]
pub struct SyncRoot(Arc<Mutex<()>>);

impl SyncRoot {
    /// Creates a new, unshared handle.
    pub fn new() -> SyncRoot {
        SyncRoot(Arc::new(Mutex::new(())))
    }

    /// Blocks until the lock is acquired.
    pub fn lock(&self) -> MutexGuard<'_, ()> {
        self.0.lock()
    }

    /// Acquires the lock if nobody else holds it.
    pub fn try_lock(&self) -> Option<MutexGuard<'_, ()>> {
        self.0.try_lock()
    }

    /// Returns true if both handles refer to the same lock.
    pub fn ptr_eq(&self, other: &SyncRoot) -> bool {
        Arc::ptr_eq(&self.0, &other.0)
    }
}

impl Debug for SyncRoot {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        f.debug_tuple("SyncRoot")
            .field(&Arc::as_ptr(&self.0))
            .finish()
    }
}
