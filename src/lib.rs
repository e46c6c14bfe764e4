//! linhash: a hash map built on Linear Hashing. The table grows one bucket
//! chain at a time and never rehashes everything at once.
//!
//! ```
//! use linhash::LinHashMap;
//!
//! let mut m = LinHashMap::new();
//! for k in (1..40u32).step_by(2) {
//!     m.put(k, k * k);
//! }
//! assert_eq!(m.get(&5), Some(&25));
//! assert_eq!(m.get(&40), None);
//! assert!(m.size() > 16); // at least one chain was split
//! ```
//!
//! Internal Design:
//!
//! Summary
//! - Layers, leaf to root:
//!   - `Bucket`: `N` slots (`SLOTS = 4` by default) holding
//!     `(hash, key, value)` and the arena handle of its overflow bucket.
//!   - `Directory`: chain heads over a `SlotMap` arena of buckets; appends,
//!     lookups and chain draining.
//!   - `SplitState` (public, see [`split`]): the split pointer and the
//!     low/high moduli as a plain value with a single `advance` transition.
//!   - `LinHashMap`: `get`/`put`/`size`/`iter`/`print` on top, plus the
//!     growth policy.
//!
//! Addressing
//! - `h(x) = H(x) mod low`, `h2(x) = H(x) mod 2*low`.
//! - A key lives in chain `h2` when that chain exists
//!   (`h2 < low + split`), otherwise in chain `h`. Lookups and insertions
//!   use the same rule, so a key is reachable no matter how many splits
//!   happened since it was stored.
//! - `H` comes from the map's `BuildHasher` and is stored next to the key;
//!   splits move entries by stored hash without running `K: Hash` again.
//!
//! Growth
//! - Every `put` counts towards `insertions` (overwrites too). When
//!   `insertions / size()` exceeds the load threshold (1.2 by default) one
//!   chain is split before the new pair is placed; at most one split per
//!   `put`.
//! - A split appends chain `low + split`, drains chain `split` (head and
//!   overflow buckets) and re-places each entry by `h2`. When the split
//!   pointer reaches `low` the round ends: it resets to 0 and `low` doubles.
//! - `size()` is `N * (low + split)`: the home buckets' slots, not the
//!   number of stored pairs (`len()`).
//!
//! Invariants
//! - `chain_count() == low + split`; `high == 2 * low`.
//! - No bucket holds more than `N` entries; a chain gains an overflow bucket
//!   only when its tail is full, so every non-tail bucket is full.
//! - Each key is stored exactly once: `put` on an existing key replaces the
//!   value and returns the old one.
//!
//! Constraints
//! - No interior locking. The map is `Send` but not `Sync`: share it across
//!   threads behind one exclusive lock, e.g. `Mutex<LinHashMap<..>>`.
//! - In debug builds a reentrancy guard panics if user code (`Hash`, `Eq`,
//!   an [`Observer`]) calls back into the map during an operation.
//! - No removal; the directory only grows. Overflow buckets of a chain are
//!   released when that chain is split.
//! - Bucket handles never leave the crate; only `&K`/`&V` do.
//!
//! Diagnostics
//! - Bucket accesses, splits and overflow allocations are reported to an
//!   [`Observer`] chosen at construction. [`AccessCounter`] keeps totals;
//!   the default [`NoopObserver`] does nothing.
//! - Splits and overflow allocations are logged at `debug` level through
//!   the `log` facade, each `put` at `trace`.

mod bucket;
mod config;
mod directory;
mod lin_hash_map;
mod lin_hash_map_proptest;
mod observer;
mod reentrancy;
pub mod split;

// Public surface
pub use bucket::SLOTS;
pub use config::{ConfigError, LinHashConfig};
pub use directory::Iter;
pub use lin_hash_map::{LinHashMap, Layout};
pub use observer::{AccessCounter, NoopObserver, Observer};
pub use split::{SplitState, SplitStep};
