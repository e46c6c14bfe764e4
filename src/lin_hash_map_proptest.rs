#![cfg(test)]

// Property tests for LinHashMap kept inside the crate so they can check the
// structural invariants that are not visible through the public API.

use crate::config::LinHashConfig;
use crate::lin_hash_map::LinHashMap;
use crate::observer::{AccessCounter, NoopObserver};
use core::hash::{BuildHasherDefault, Hasher};
use proptest::prelude::*;
use std::collections::HashMap;

// Keeps the low bits of small integers so many keys collide in a chain,
// which exercises overflow buckets and splits of long chains.
#[derive(Default)]
struct LowBitsHasher(u64);

impl Hasher for LowBitsHasher {
    fn finish(&self) -> u64 {
        self.0
    }
    fn write(&mut self, bytes: &[u8]) {
        for &b in bytes {
            self.0 = self.0.wrapping_mul(31).wrapping_add(u64::from(b));
        }
    }
    fn write_u16(&mut self, n: u16) {
        self.0 = u64::from(n);
    }
}

type LowBits = BuildHasherDefault<LowBitsHasher>;

#[derive(Clone, Debug)]
enum Op {
    Put(u16, i32),
    Get(u16),
    Split,
    Iterate,
}

fn arb_ops() -> impl Strategy<Value = Vec<Op>> {
    let op = prop_oneof![
        6 => (0u16..256, any::<i32>()).prop_map(|(k, v)| Op::Put(k, v)),
        3 => (0u16..300).prop_map(Op::Get),
        1 => Just(Op::Split),
        1 => Just(Op::Iterate),
    ];
    proptest::collection::vec(op, 1..300)
}

// Property: state-machine equivalence against std::collections::HashMap.
// Invariants exercised across random operation sequences:
// - `put` returns the previous value exactly when the model had one.
// - `get` agrees with the model for present and absent keys.
// - `len` equals the model's size; `insertions` counts every put.
// - `size()` never shrinks and grows by exactly `N` on a splitting put.
// - Structural invariants hold after every step (directory length, bucket
//   capacity, full non-tail buckets, every entry in the chain it addresses).
proptest! {
    #![proptest_config(ProptestConfig { cases: 64, .. ProptestConfig::default() })]
    #[test]
    fn prop_state_machine(ops in arb_ops()) {
        let mut sut: LinHashMap<u16, i32, LowBits> = LinHashMap::with_hasher(LowBits::default());
        let mut model: HashMap<u16, i32> = HashMap::new();
        let mut puts = 0usize;

        for op in ops {
            match op {
                Op::Put(k, v) => {
                    let size = sut.size();
                    let splits = (puts + 1) as f64 / size as f64 > sut.load_threshold();
                    puts += 1;
                    prop_assert_eq!(sut.put(k, v), model.insert(k, v));
                    let grown = sut.size() - size;
                    prop_assert_eq!(grown, if splits { crate::SLOTS } else { 0 });
                }
                Op::Get(k) => {
                    prop_assert_eq!(sut.get(&k), model.get(&k));
                    prop_assert_eq!(sut.contains_key(&k), model.contains_key(&k));
                }
                Op::Split => {
                    let chains = sut.chain_count();
                    let step = sut.split();
                    prop_assert_eq!(step.target, chains);
                    prop_assert_eq!(sut.chain_count(), chains + 1);
                }
                Op::Iterate => {
                    let seen: HashMap<u16, i32> = sut.iter().map(|(k, v)| (*k, *v)).collect();
                    prop_assert_eq!(seen.len(), sut.iter().count(), "each key once");
                    prop_assert_eq!(&seen, &model);
                }
            }
            sut.assert_invariants();
            prop_assert_eq!(sut.len(), model.len());
            prop_assert_eq!(sut.insertions(), puts);
        }

        for (k, v) in &model {
            prop_assert_eq!(sut.get(k), Some(v));
        }
    }
}

// Property: with a 2-slot bucket and a low threshold the table splits often;
// every key stays reachable and the average bucket accesses of a hit stay
// bounded by the longest chain.
proptest! {
    #![proptest_config(ProptestConfig { cases: 32, .. ProptestConfig::default() })]
    #[test]
    fn prop_small_buckets_keep_keys_reachable(keys in proptest::collection::hash_set(any::<u16>(), 1..200)) {
        let counter = AccessCounter::new();
        let config = LinHashConfig::new().initial_modulus(2).load_threshold(0.75);
        let mut sut: LinHashMap<u16, u32, LowBits, &AccessCounter, 2> =
            LinHashMap::with_config(config, LowBits::default(), &counter).unwrap();
        for &k in &keys {
            prop_assert_eq!(sut.put(k, u32::from(k) * 3), None);
        }
        sut.assert_invariants();

        for &k in &keys {
            prop_assert_eq!(sut.get(&k), Some(&(u32::from(k) * 3)));
        }
        prop_assert_eq!(counter.lookups(), keys.len() as u64);
        prop_assert_eq!(counter.hits(), keys.len() as u64);
        prop_assert!(counter.average_accesses() >= 1.0);
        prop_assert!(counter.average_accesses() <= sut.bucket_count() as f64);
    }
}

// Property: enumeration is stable without intervening mutation and matches
// the stored pairs exactly.
proptest! {
    #[test]
    fn prop_enumeration_idempotent(pairs in proptest::collection::vec((any::<u16>(), any::<i32>()), 0..150)) {
        let mut sut: LinHashMap<u16, i32, LowBits, NoopObserver> = LinHashMap::with_hasher(LowBits::default());
        sut.extend(pairs.iter().copied());
        let a: Vec<(u16, i32)> = sut.iter().map(|(k, v)| (*k, *v)).collect();
        let b: Vec<(u16, i32)> = sut.iter().map(|(k, v)| (*k, *v)).collect();
        prop_assert_eq!(&a, &b);
        prop_assert_eq!(a.len(), sut.len());
    }
}
