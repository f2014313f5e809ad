//! Poison-tolerant lock acquisition.
//!
//! A panic while a lock is held must not take the whole service down; the
//! guard is recovered and the event logged.

use std::sync::{Mutex, MutexGuard, RwLock, RwLockReadGuard, RwLockWriteGuard};

pub(crate) fn read<'a, T>(lock: &'a RwLock<T>, op: &'static str) -> RwLockReadGuard<'a, T> {
    lock.read().unwrap_or_else(|poisoned| {
        tracing::warn!(op, lock_kind = "rwlock.read", "recovered from poisoned lock");
        poisoned.into_inner()
    })
}

pub(crate) fn write<'a, T>(lock: &'a RwLock<T>, op: &'static str) -> RwLockWriteGuard<'a, T> {
    lock.write().unwrap_or_else(|poisoned| {
        tracing::warn!(op, lock_kind = "rwlock.write", "recovered from poisoned lock");
        poisoned.into_inner()
    })
}

pub(crate) fn lock<'a, T>(lock: &'a Mutex<T>, op: &'static str) -> MutexGuard<'a, T> {
    lock.lock().unwrap_or_else(|poisoned| {
        tracing::warn!(op, lock_kind = "mutex.lock", "recovered from poisoned lock");
        poisoned.into_inner()
    })
}
