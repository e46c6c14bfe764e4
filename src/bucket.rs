//! Bucket: fixed-capacity slot array with a link to its overflow bucket.

use crate::directory::BucketId;
use core::borrow::Borrow;

/// Default number of slots per bucket.
pub const SLOTS: usize = 4;

/// A stored pair together with its precomputed hash.
#[derive(Debug)]
pub(crate) struct Entry<K, V> {
    pub(crate) hash: u64,
    pub(crate) key: K,
    pub(crate) value: V,
}

/// Holds up to `N` entries. Slots `0..len` are occupied, the rest are `None`.
#[derive(Debug)]
pub(crate) struct Bucket<K, V, const N: usize> {
    slots: [Option<Entry<K, V>>; N],
    len: usize,
    pub(crate) next: Option<BucketId>,
}

impl<K, V, const N: usize> Bucket<K, V, N> {
    pub(crate) fn new() -> Self {
        Self {
            slots: core::array::from_fn(|_| None),
            len: 0,
            next: None,
        }
    }

    pub(crate) fn len(&self) -> usize {
        self.len
    }

    pub(crate) fn is_full(&self) -> bool {
        self.len >= N
    }

    /// Stores `entry` in the first free slot, handing it back when the bucket is full.
    pub(crate) fn push(&mut self, entry: Entry<K, V>) -> Result<(), Entry<K, V>> {
        match self.slots.get_mut(self.len) {
            Some(slot) => {
                *slot = Some(entry);
                self.len += 1;
                Ok(())
            }
            None => Err(entry),
        }
    }

    pub(crate) fn entry(&self, i: usize) -> Option<&Entry<K, V>> {
        self.slots.get(i).and_then(Option::as_ref)
    }

    pub(crate) fn entries(&self) -> impl Iterator<Item = &Entry<K, V>> {
        self.slots.iter().map_while(Option::as_ref)
    }

    /// Stored hashes are compared first so `K: Eq` only runs on likely matches.
    pub(crate) fn find<Q>(&self, hash: u64, q: &Q) -> Option<&V>
    where
        K: Borrow<Q>,
        Q: ?Sized + Eq,
    {
        self.entries()
            .find(|e| e.hash == hash && e.key.borrow() == q)
            .map(|e| &e.value)
    }

    /// Slot index of `q`, for a later `value_mut`.
    pub(crate) fn position<Q>(&self, hash: u64, q: &Q) -> Option<usize>
    where
        K: Borrow<Q>,
        Q: ?Sized + Eq,
    {
        self.entries().position(|e| e.hash == hash && e.key.borrow() == q)
    }

    pub(crate) fn value_mut(&mut self, slot: usize) -> Option<&mut V> {
        self.slots
            .get_mut(slot)
            .and_then(Option::as_mut)
            .map(|e| &mut e.value)
    }

    /// Moves every entry into `out` in slot order. The `next` link is kept.
    pub(crate) fn drain_into(&mut self, out: &mut Vec<Entry<K, V>>) {
        out.extend(self.slots.iter_mut().map_while(Option::take));
        self.len = 0;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn entry(hash: u64, key: &str, value: i32) -> Entry<String, i32> {
        Entry {
            hash,
            key: key.to_string(),
            value,
        }
    }

    /// Invariant: a bucket accepts exactly `N` entries and rejects the next one
    /// without losing it.
    #[test]
    fn push_until_full_returns_overflowing_entry() {
        let mut b: Bucket<String, i32, 2> = Bucket::new();
        assert!(b.push(entry(1, "a", 1)).is_ok());
        assert!(!b.is_full());
        assert!(b.push(entry(2, "b", 2)).is_ok());
        assert!(b.is_full());
        assert_eq!(b.len(), 2);

        let rejected = b.push(entry(3, "c", 3)).unwrap_err();
        assert_eq!(rejected.key, "c");
        assert_eq!(b.len(), 2);
    }

    /// Invariant: lookups require both the stored hash and the key to match.
    #[test]
    fn find_matches_hash_and_key() {
        let mut b: Bucket<String, i32, 4> = Bucket::new();
        b.push(entry(7, "k", 10)).unwrap();
        assert_eq!(b.find(7, "k"), Some(&10));
        assert_eq!(b.find(8, "k"), None, "hash mismatch must not match");
        assert_eq!(b.find(7, "x"), None);

        assert_eq!(b.position(7, "k"), Some(0));
        assert_eq!(b.position(7, "x"), None);
        *b.value_mut(0).unwrap() = 11;
        assert_eq!(b.find(7, "k"), Some(&11));
    }

    /// Invariant: `drain_into` moves the entries out in slot order and leaves the
    /// bucket empty.
    #[test]
    fn drain_into_empties_in_order() {
        let mut b: Bucket<String, i32, 4> = Bucket::new();
        for (i, k) in ["a", "b", "c"].iter().enumerate() {
            b.push(entry(i as u64, k, i as i32)).unwrap();
        }
        let mut out = Vec::new();
        b.drain_into(&mut out);
        let taken: Vec<String> = out.into_iter().map(|e| e.key).collect();
        assert_eq!(taken, vec!["a", "b", "c"]);
        assert_eq!(b.len(), 0);
        assert!(b.entry(0).is_none());
        assert_eq!(b.entries().count(), 0);
    }
}
