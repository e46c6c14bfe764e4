//! Diagnostics hooks.
//!
//! The map reports what it does to an [`Observer`] instead of keeping
//! counters of its own. [`NoopObserver`] is the default and compiles away;
//! [`AccessCounter`] tallies bucket accesses per lookup.

use core::cell::Cell;

/// Receives structural events from a `LinHashMap`.
///
/// Callbacks run while the map is inside an operation and must not call back
/// into the same map. All methods default to doing nothing.
pub trait Observer {
    /// A `get`/`contains_key` walked `buckets_visited` buckets of `chain`.
    fn lookup(&self, chain: usize, buckets_visited: usize, found: bool) {
        let _ = (chain, buckets_visited, found);
    }

    /// Chain `source` was split into the new chain `target`; `moved` entries
    /// changed chain.
    fn split(&self, source: usize, target: usize, moved: usize) {
        let _ = (source, target, moved);
    }

    /// An overflow bucket was linked onto `chain`.
    fn overflow(&self, chain: usize) {
        let _ = chain;
    }
}

impl<T: Observer + ?Sized> Observer for &T {
    fn lookup(&self, chain: usize, buckets_visited: usize, found: bool) {
        (**self).lookup(chain, buckets_visited, found)
    }
    fn split(&self, source: usize, target: usize, moved: usize) {
        (**self).split(source, target, moved)
    }
    fn overflow(&self, chain: usize) {
        (**self).overflow(chain)
    }
}

/// Ignores every event.
#[derive(Copy, Clone, Debug, Default, Eq, PartialEq)]
pub struct NoopObserver;

impl Observer for NoopObserver {}

/// Counts lookups, buckets accessed, splits and overflow allocations.
///
/// Single-threaded like the map; pass `&counter` to keep reading it while the
/// map holds the reference.
#[derive(Debug, Default)]
pub struct AccessCounter {
    lookups: Cell<u64>,
    hits: Cell<u64>,
    buckets_accessed: Cell<u64>,
    splits: Cell<u64>,
    moved: Cell<u64>,
    overflows: Cell<u64>,
}

fn bump(c: &Cell<u64>, by: u64) {
    c.set(c.get().saturating_add(by));
}

impl AccessCounter {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn lookups(&self) -> u64 {
        self.lookups.get()
    }

    pub fn hits(&self) -> u64 {
        self.hits.get()
    }

    pub fn buckets_accessed(&self) -> u64 {
        self.buckets_accessed.get()
    }

    pub fn splits(&self) -> u64 {
        self.splits.get()
    }

    /// Entries that changed chain across all splits.
    pub fn moved(&self) -> u64 {
        self.moved.get()
    }

    pub fn overflows(&self) -> u64 {
        self.overflows.get()
    }

    /// Mean buckets accessed per lookup; 0 before the first lookup.
    pub fn average_accesses(&self) -> f64 {
        match self.lookups() {
            0 => 0.0,
            n => self.buckets_accessed() as f64 / n as f64,
        }
    }

    pub fn reset(&self) {
        for c in [
            &self.lookups,
            &self.hits,
            &self.buckets_accessed,
            &self.splits,
            &self.moved,
            &self.overflows,
        ] {
            c.set(0);
        }
    }
}

impl Observer for AccessCounter {
    fn lookup(&self, _chain: usize, buckets_visited: usize, found: bool) {
        bump(&self.lookups, 1);
        bump(&self.buckets_accessed, buckets_visited as u64);
        if found {
            bump(&self.hits, 1);
        }
    }

    fn split(&self, _source: usize, _target: usize, moved: usize) {
        bump(&self.splits, 1);
        bump(&self.moved, moved as u64);
    }

    fn overflow(&self, _chain: usize) {
        bump(&self.overflows, 1);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn counter_tallies_and_resets() {
        let c = AccessCounter::new();
        assert_eq!(c.average_accesses(), 0.0);

        c.lookup(0, 1, true);
        c.lookup(3, 3, false);
        c.split(0, 4, 2);
        c.overflow(1);

        assert_eq!(c.lookups(), 2);
        assert_eq!(c.hits(), 1);
        assert_eq!(c.buckets_accessed(), 4);
        assert_eq!(c.average_accesses(), 2.0);
        assert_eq!(c.splits(), 1);
        assert_eq!(c.moved(), 2);
        assert_eq!(c.overflows(), 1);

        c.reset();
        assert_eq!(c.lookups(), 0);
        assert_eq!(c.buckets_accessed(), 0);
        assert_eq!(c.overflows(), 0);
    }

    /// Invariant: observing through a reference reaches the referent.
    #[test]
    fn reference_forwards_events() {
        fn feed<O: Observer>(o: O) {
            o.lookup(0, 2, true);
        }
        let c = AccessCounter::new();
        feed(&c);
        assert_eq!(c.buckets_accessed(), 2);
    }
}
