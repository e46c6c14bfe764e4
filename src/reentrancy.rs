//! Debug-only reentrancy guard.
//!
//! `LinHashMap` runs user code (`K: Hash`, `K: Eq`, observer callbacks) in
//! the middle of chain walks and splits. In debug builds each public
//! operation marks the map busy with its own name, and a nested entry panics
//! naming both operations. In release builds the guard is zero-sized and
//! does nothing.

use core::cell::Cell;
use core::marker::PhantomData;

/// Tracks the operation currently running on one map.
#[derive(Debug)]
pub(crate) struct OpGuard {
    #[cfg(debug_assertions)]
    active: Cell<Option<&'static str>>,
    // Shared access must be serialized by the caller; keep it !Sync in
    // release builds too. Moving the map to another thread is fine.
    _nosync: PhantomData<Cell<()>>,
}

impl OpGuard {
    pub(crate) const fn new() -> Self {
        Self {
            #[cfg(debug_assertions)]
            active: Cell::new(None),
            _nosync: PhantomData,
        }
    }

    /// Marks `op` as running until the returned token drops.
    ///
    /// Panics in debug builds if another operation is already running.
    #[inline]
    pub(crate) fn enter(&self, op: &'static str) -> Busy<'_> {
        #[cfg(debug_assertions)]
        {
            if let Some(running) = self.active.get() {
                panic!("reentrant call into LinHashMap::{op} while {running} is in progress");
            }
            self.active.set(Some(op));
            return Busy { owner: self };
        }

        #[cfg(not(debug_assertions))]
        {
            let _ = op;
            return Busy { _z: PhantomData };
        }
    }
}

impl Default for OpGuard {
    fn default() -> Self {
        Self::new()
    }
}

/// Clears the running operation on drop.
pub(crate) struct Busy<'a> {
    #[cfg(debug_assertions)]
    owner: &'a OpGuard,
    #[cfg(not(debug_assertions))]
    _z: PhantomData<&'a ()>,
}

impl Drop for Busy<'_> {
    fn drop(&mut self) {
        #[cfg(debug_assertions)]
        self.owner.active.set(None);
    }
}
