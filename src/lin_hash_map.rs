//! LinHashMap: public facade over the directory and the split controller.

use crate::bucket::{Entry, SLOTS};
use crate::config::{ConfigError, LinHashConfig};
use crate::directory::{Directory, Iter, Placement};
use crate::observer::{NoopObserver, Observer};
use crate::reentrancy::OpGuard;
use crate::split::{SplitState, SplitStep};
use core::borrow::Borrow;
use core::fmt;
use core::hash::{BuildHasher, Hash};
use hashbrown::hash_map::DefaultHashBuilder;
use log::{debug, error, trace};

/// A hash map that grows by splitting one bucket chain at a time.
///
/// `N` is the number of slots per bucket. `O` receives diagnostics events,
/// see [`Observer`].
pub struct LinHashMap<K, V, S = DefaultHashBuilder, O = NoopObserver, const N: usize = SLOTS> {
    table: Table<K, V, S, O, N>,
    guard: OpGuard,
}

/// Everything except the reentrancy guard, so a guard token can stay alive
/// while the table is mutably borrowed.
struct Table<K, V, S, O, const N: usize> {
    hasher: S,
    directory: Directory<K, V, N>,
    state: SplitState,
    load_threshold: f64,
    // Every put counts, overwrites included.
    insertions: usize,
    // Distinct live keys.
    len: usize,
    observer: O,
}

impl<K, V> LinHashMap<K, V>
where
    K: Eq + Hash,
{
    pub fn new() -> Self {
        Self::with_hasher(DefaultHashBuilder::default())
    }
}

impl<K, V, S> LinHashMap<K, V, S>
where
    K: Eq + Hash,
    S: BuildHasher,
{
    /// Default configuration (4 chains, threshold 1.2) with a custom hasher.
    pub fn with_hasher(hasher: S) -> Self {
        Self::from_parts(LinHashConfig::new(), hasher, NoopObserver)
    }
}

impl<K, V, S> Default for LinHashMap<K, V, S>
where
    K: Eq + Hash,
    S: BuildHasher + Default,
{
    fn default() -> Self {
        Self::with_hasher(S::default())
    }
}

impl<K, V, S, O, const N: usize> LinHashMap<K, V, S, O, N>
where
    K: Eq + Hash,
    S: BuildHasher,
    O: Observer,
{
    /// Builds a map from a validated configuration.
    pub fn with_config(config: LinHashConfig, hasher: S, observer: O) -> Result<Self, ConfigError> {
        config.validate(N)?;
        Ok(Self::from_parts(config, hasher, observer))
    }

    fn from_parts(config: LinHashConfig, hasher: S, observer: O) -> Self {
        let state = SplitState::new(config.initial_modulus);
        Self {
            table: Table {
                hasher,
                directory: Directory::with_chains(state.chain_count()),
                state,
                load_threshold: config.load_threshold,
                insertions: 0,
                len: 0,
                observer,
            },
            guard: OpGuard::new(),
        }
    }

    /// Returns the value stored for `key`.
    pub fn get<Q>(&self, key: &Q) -> Option<&V>
    where
        K: Borrow<Q>,
        Q: ?Sized + Hash + Eq,
    {
        let _g = self.guard.enter("get");
        self.table.lookup(key)
    }

    pub fn contains_key<Q>(&self, key: &Q) -> bool
    where
        K: Borrow<Q>,
        Q: ?Sized + Hash + Eq,
    {
        let _g = self.guard.enter("contains_key");
        self.table.lookup(key).is_some()
    }

    /// Inserts `value` under `key`, returning the value it replaces.
    ///
    /// Splits one chain first when the load factor, counting this call,
    /// exceeds the threshold.
    pub fn put(&mut self, key: K, value: V) -> Option<V> {
        let _g = self.guard.enter("put");
        self.table.put(key, value)
    }

    /// Splits the chain under the split pointer into a new chain appended to
    /// the directory. `put` calls this on its own; calling it directly grows
    /// the table ahead of a bulk load.
    pub fn split(&mut self) -> SplitStep {
        let _g = self.guard.enter("split");
        self.table.split()
    }

    /// Chain index `key` is addressed to.
    pub fn chain_of<Q>(&self, key: &Q) -> usize
    where
        K: Borrow<Q>,
        Q: ?Sized + Hash,
    {
        let _g = self.guard.enter("chain_of");
        self.table.state.address(self.table.hasher.hash_one(key))
    }
}

impl<K, V, S, O, const N: usize> LinHashMap<K, V, S, O, N> {
    /// Nominal capacity of the home buckets: `N * (low_modulus + split_pointer)`.
    /// Overflow buckets and occupancy are not counted.
    pub fn size(&self) -> usize {
        N * self.table.directory.len()
    }

    /// Number of distinct keys stored.
    pub fn len(&self) -> usize {
        self.table.len
    }

    pub fn is_empty(&self) -> bool {
        self.table.len == 0
    }

    /// Number of `put` calls so far, overwrites included.
    pub fn insertions(&self) -> usize {
        self.table.insertions
    }

    /// `insertions / size`.
    pub fn load_factor(&self) -> f64 {
        self.table.load_factor()
    }

    pub fn load_threshold(&self) -> f64 {
        self.table.load_threshold
    }

    pub fn chain_count(&self) -> usize {
        self.table.directory.len()
    }

    /// Buckets allocated, overflow buckets included.
    pub fn bucket_count(&self) -> usize {
        self.table.directory.bucket_count()
    }

    pub fn split_state(&self) -> SplitState {
        self.table.state
    }

    pub fn observer(&self) -> &O {
        &self.table.observer
    }

    /// Entries in chain order, then slot order.
    pub fn iter(&self) -> Iter<'_, K, V, N> {
        self.table.directory.iter()
    }

    pub fn keys(&self) -> impl Iterator<Item = &K> {
        self.iter().map(|(k, _)| k)
    }

    pub fn values(&self) -> impl Iterator<Item = &V> {
        self.iter().map(|(_, v)| v)
    }

    /// Keys of every chain and bucket, for debugging.
    pub fn layout(&self) -> Layout<'_, K, V, N> {
        Layout {
            dir: &self.table.directory,
        }
    }

    /// Prints [`layout`](Self::layout) to stdout.
    pub fn print(&self)
    where
        K: fmt::Debug,
    {
        println!("{}", self.layout());
    }

    /// Panics if a structural invariant does not hold.
    #[cfg(test)]
    pub(crate) fn assert_invariants(&self) {
        let t = &self.table;
        let dir = &t.directory;
        assert_eq!(dir.len(), t.state.chain_count(), "directory length");
        assert_eq!(t.state.high_modulus(), 2 * t.state.low_modulus());
        assert!(t.state.split_pointer() < t.state.low_modulus());

        let mut entries = 0;
        for chain in 0..dir.len() {
            let buckets: Vec<_> = dir.chain(chain).collect();
            for (i, b) in buckets.iter().enumerate() {
                assert!(b.len() <= N, "bucket over capacity");
                if i + 1 < buckets.len() {
                    assert_eq!(b.len(), N, "non-tail bucket of chain {chain} not full");
                }
                for e in b.entries() {
                    assert_eq!(t.state.address(e.hash), chain, "entry in wrong chain");
                    entries += 1;
                }
            }
        }
        assert_eq!(entries, t.len, "entry count");
    }
}

impl<K, V, S, O, const N: usize> Table<K, V, S, O, N>
where
    K: Eq + Hash,
    S: BuildHasher,
    O: Observer,
{
    fn lookup<Q>(&self, key: &Q) -> Option<&V>
    where
        K: Borrow<Q>,
        Q: ?Sized + Hash + Eq,
    {
        let hash = self.hasher.hash_one(key);
        let chain = self.state.address(hash);
        let (found, visited) = self.directory.find(chain, hash, key);
        self.observer.lookup(chain, visited, found.is_some());
        found
    }

    fn put(&mut self, key: K, value: V) -> Option<V> {
        self.insertions += 1;
        if self.load_factor() > self.load_threshold {
            self.split();
        }

        let hash = self.hasher.hash_one(&key);
        let chain = self.state.address(hash);
        trace!("put: hash={hash:#018x} chain={chain}");

        if let Some(slot) = self.directory.find_mut(chain, hash, &key) {
            return Some(core::mem::replace(slot, value));
        }
        self.place(chain, Entry { hash, key, value });
        self.len += 1;
        None
    }

    fn split(&mut self) -> SplitStep {
        let before = self.state;
        let step = self.state.advance();
        let target = self.directory.push_chain();
        debug_assert_eq!(target, step.target);

        let mut moved = 0;
        for entry in self.directory.drain_chain(step.source) {
            let chain = before.high_index(entry.hash) % self.directory.len();
            if chain != step.source {
                moved += 1;
            }
            self.place(chain, entry);
        }

        debug!(
            "split: chain {} -> {}, moved {} entries{}",
            step.source,
            step.target,
            moved,
            if step.round_complete {
                format!(", round complete (low modulus {})", self.state.low_modulus())
            } else {
                String::new()
            }
        );
        self.observer.split(step.source, step.target, moved);
        step
    }

    fn place(&mut self, chain: usize, entry: Entry<K, V>) {
        match self.directory.append(chain, entry) {
            Ok(Placement::Existing) => {}
            Ok(Placement::Overflow) => {
                debug!("overflow bucket linked onto chain {chain}");
                self.observer.overflow(chain);
            }
            Err(_) => {
                // Addresses come from the split state, which never outruns the directory.
                error!("chain {chain} outside directory of {}", self.directory.len());
                panic!(
                    "chain {chain} must exist in a directory of {} chains",
                    self.directory.len()
                );
            }
        }
    }
}

impl<K, V, S, O, const N: usize> Table<K, V, S, O, N> {
    fn load_factor(&self) -> f64 {
        self.insertions as f64 / (N * self.directory.len()) as f64
    }
}

impl<'a, K, V, S, O, const N: usize> IntoIterator for &'a LinHashMap<K, V, S, O, N> {
    type Item = (&'a K, &'a V);
    type IntoIter = Iter<'a, K, V, N>;

    fn into_iter(self) -> Self::IntoIter {
        self.iter()
    }
}

impl<K, V, S, O, const N: usize> Extend<(K, V)> for LinHashMap<K, V, S, O, N>
where
    K: Eq + Hash,
    S: BuildHasher,
    O: Observer,
{
    fn extend<T: IntoIterator<Item = (K, V)>>(&mut self, iter: T) {
        for (k, v) in iter {
            self.put(k, v);
        }
    }
}

impl<K, V, S> FromIterator<(K, V)> for LinHashMap<K, V, S>
where
    K: Eq + Hash,
    S: BuildHasher + Default,
{
    fn from_iter<T: IntoIterator<Item = (K, V)>>(iter: T) -> Self {
        let mut map = Self::default();
        map.extend(iter);
        map
    }
}

impl<K, V, S, O, const N: usize> fmt::Debug for LinHashMap<K, V, S, O, N>
where
    K: fmt::Debug,
    V: fmt::Debug,
{
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_map().entries(self.iter()).finish()
    }
}

/// Display adapter listing the keys of each chain, bucket by bucket.
pub struct Layout<'a, K, V, const N: usize> {
    dir: &'a Directory<K, V, N>,
}

impl<K: fmt::Debug, V, const N: usize> fmt::Display for Layout<'_, K, V, N> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        const RULE: &str = "-------------------------------------------";
        writeln!(f, "LinHashMap")?;
        writeln!(f, "{RULE}")?;
        for chain in 0..self.dir.len() {
            write!(f, "chain [{chain:>3}] =")?;
            for (i, bucket) in self.dir.chain(chain).enumerate() {
                if i > 0 {
                    write!(f, " -->")?;
                }
                write!(f, " [")?;
                for e in bucket.entries() {
                    write!(f, " {:?} |", e.key)?;
                }
                write!(f, " ]")?;
            }
            writeln!(f)?;
        }
        write!(f, "{RULE}")
    }
}
