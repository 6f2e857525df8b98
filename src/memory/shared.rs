//! Thread-safe handle to a memory

use std::sync::Arc;

use parking_lot::{RwLock, RwLockReadGuard, RwLockWriteGuard};

use super::Memory;

/// Cloneable handle sharing one [`Memory`] between threads
///
/// Every mutation takes the write lock for its whole duration, so readers
/// never observe an event without its index entries or variable history.
#[derive(Debug, Clone, Default)]
pub struct SharedMemory {
    inner: Arc<RwLock<Memory>>,
}

impl SharedMemory {
    pub fn new(memory: Memory) -> Self {
        Self {
            inner: Arc::new(RwLock::new(memory)),
        }
    }

    pub fn read(&self) -> RwLockReadGuard<'_, Memory> {
        self.inner.read()
    }

    pub fn write(&self) -> RwLockWriteGuard<'_, Memory> {
        self.inner.write()
    }

    /// Run `f` with shared access
    pub fn with<R>(&self, f: impl FnOnce(&Memory) -> R) -> R {
        f(&*self.inner.read())
    }

    /// Run `f` with exclusive access
    pub fn with_mut<R>(&self, f: impl FnOnce(&mut Memory) -> R) -> R {
        f(&mut *self.inner.write())
    }

    /// Deep copy of the current state
    pub fn snapshot_clone(&self) -> Memory {
        self.inner.read().clone()
    }
}

impl From<Memory> for SharedMemory {
    fn from(memory: Memory) -> Self {
        Self::new(memory)
    }
}
