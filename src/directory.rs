//! Directory: chain heads over an arena of buckets.
//!
//! Buckets live in a `SlotMap` and link to their overflow successor by
//! `BucketId`, so chains carry no owning pointers and a split can move
//! entries between chains without touching the links of other chains.

use crate::bucket::{Bucket, Entry};
use core::borrow::Borrow;
use slotmap::SlotMap;

slotmap::new_key_type! {
    /// Arena handle of a bucket. Never leaves the crate.
    pub(crate) struct BucketId;
}

pub(crate) struct Directory<K, V, const N: usize> {
    buckets: SlotMap<BucketId, Bucket<K, V, N>>,
    heads: Vec<BucketId>,
}

/// Where `Directory::append` placed an entry.
#[derive(Copy, Clone, Debug, Eq, PartialEq)]
pub(crate) enum Placement {
    /// Into a bucket that already existed.
    Existing,
    /// Into a freshly linked overflow bucket.
    Overflow,
}

impl<K, V, const N: usize> Directory<K, V, N> {
    pub(crate) fn with_chains(chains: usize) -> Self {
        let mut dir = Self {
            buckets: SlotMap::with_capacity_and_key(chains),
            heads: Vec::with_capacity(chains),
        };
        for _ in 0..chains {
            dir.push_chain();
        }
        dir
    }

    /// Number of chains.
    pub(crate) fn len(&self) -> usize {
        self.heads.len()
    }

    /// Number of buckets across all chains, overflow buckets included.
    pub(crate) fn bucket_count(&self) -> usize {
        self.buckets.len()
    }

    /// Appends an empty chain and returns its index.
    pub(crate) fn push_chain(&mut self) -> usize {
        let head = self.buckets.insert(Bucket::new());
        self.heads.push(head);
        self.heads.len() - 1
    }

    pub(crate) fn head(&self, chain: usize) -> Option<BucketId> {
        self.heads.get(chain).copied()
    }

    pub(crate) fn bucket(&self, id: BucketId) -> Option<&Bucket<K, V, N>> {
        self.buckets.get(id)
    }

    /// Buckets of `chain` from head to tail.
    pub(crate) fn chain(&self, chain: usize) -> ChainIter<'_, K, V, N> {
        ChainIter {
            dir: self,
            cur: self.head(chain),
        }
    }

    /// Looks `q` up in `chain`, also returning how many buckets were visited.
    pub(crate) fn find<Q>(&self, chain: usize, hash: u64, q: &Q) -> (Option<&V>, usize)
    where
        K: Borrow<Q>,
        Q: ?Sized + Eq,
    {
        let mut visited = 0;
        for bucket in self.chain(chain) {
            visited += 1;
            if let Some(v) = bucket.find(hash, q) {
                return (Some(v), visited);
            }
        }
        (None, visited)
    }

    /// Value stored under `q` in `chain`. Each key is compared at most once.
    pub(crate) fn find_mut<Q>(&mut self, chain: usize, hash: u64, q: &Q) -> Option<&mut V>
    where
        K: Borrow<Q>,
        Q: ?Sized + Eq,
    {
        let mut cur = self.head(chain);
        while let Some(id) = cur {
            let bucket = self.buckets.get(id)?;
            if let Some(slot) = bucket.position(hash, q) {
                return self.buckets.get_mut(id)?.value_mut(slot);
            }
            cur = bucket.next;
        }
        None
    }

    /// Places `entry` in the first bucket of `chain` with a free slot, linking a
    /// new overflow bucket behind the tail when all of them are full.
    ///
    /// Hands `entry` back if `chain` does not exist or buckets have no slots.
    pub(crate) fn append(
        &mut self,
        chain: usize,
        entry: Entry<K, V>,
    ) -> Result<Placement, Entry<K, V>> {
        let Some(mut id) = self.head(chain) else {
            return Err(entry);
        };
        let mut entry = entry;
        loop {
            let Some(bucket) = self.buckets.get_mut(id) else {
                return Err(entry);
            };
            match bucket.push(entry) {
                Ok(()) => return Ok(Placement::Existing),
                Err(rejected) => entry = rejected,
            }
            match bucket.next {
                Some(next) => id = next,
                None => break,
            }
        }

        let mut overflow = Bucket::new();
        overflow.push(entry)?;
        let new_id = self.buckets.insert(overflow);
        if let Some(tail) = self.buckets.get_mut(id) {
            tail.next = Some(new_id);
        }
        Ok(Placement::Overflow)
    }

    /// Removes every entry of `chain`, returning them in chain order. The head
    /// bucket stays in place; emptied overflow buckets are released.
    pub(crate) fn drain_chain(&mut self, chain: usize) -> Vec<Entry<K, V>> {
        let mut out = Vec::new();
        let mut cur = match self.head(chain).and_then(|id| self.buckets.get_mut(id)) {
            Some(head) => {
                out.reserve(head.len());
                head.drain_into(&mut out);
                head.next.take()
            }
            None => None,
        };
        while let Some(id) = cur {
            let Some(mut overflow) = self.buckets.remove(id) else {
                break;
            };
            out.reserve(overflow.len());
            overflow.drain_into(&mut out);
            cur = overflow.next;
        }
        out
    }

    /// All entries, chain by chain, bucket by bucket, slot by slot.
    pub(crate) fn iter(&self) -> Iter<'_, K, V, N> {
        Iter {
            dir: self,
            next_chain: 0,
            bucket: None,
            slot: 0,
        }
    }
}

/// Walks the buckets of one chain.
pub(crate) struct ChainIter<'a, K, V, const N: usize> {
    dir: &'a Directory<K, V, N>,
    cur: Option<BucketId>,
}

impl<'a, K, V, const N: usize> Iterator for ChainIter<'a, K, V, N> {
    type Item = &'a Bucket<K, V, N>;

    fn next(&mut self) -> Option<Self::Item> {
        let bucket = self.dir.bucket(self.cur?)?;
        self.cur = bucket.next;
        Some(bucket)
    }
}

/// Iterator over the entries of a `LinHashMap` in directory order.
pub struct Iter<'a, K, V, const N: usize> {
    dir: &'a Directory<K, V, N>,
    next_chain: usize,
    bucket: Option<&'a Bucket<K, V, N>>,
    slot: usize,
}

impl<'a, K, V, const N: usize> Iterator for Iter<'a, K, V, N> {
    type Item = (&'a K, &'a V);

    fn next(&mut self) -> Option<Self::Item> {
        let dir = self.dir;
        loop {
            if let Some(bucket) = self.bucket {
                if let Some(e) = bucket.entry(self.slot) {
                    self.slot += 1;
                    return Some((&e.key, &e.value));
                }
                self.bucket = bucket.next.and_then(|id| dir.bucket(id));
                self.slot = 0;
                continue;
            }
            let head = dir.head(self.next_chain)?;
            self.next_chain += 1;
            self.bucket = dir.bucket(head);
            self.slot = 0;
        }
    }
}
