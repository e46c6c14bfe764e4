//! Fills a `LinHashMap`, prints its chains and reports the average number of
//! buckets accessed per lookup.
//!
//! Usage: `lin_hash_demo [TOTAL_KEYS] [--random]`
//!
//! Keys `1, 3, 5, ..` up to `TOTAL_KEYS` (default 40) are inserted with value
//! `key * key`; with `--random` the keys are drawn from `0..2 * TOTAL_KEYS`
//! instead. Every key in `0..=TOTAL_KEYS` is then looked up. `TOTAL_KEYS` is
//! capped at `u32::MAX` so keys and squared values fit in a `u64`. Set
//! `RUST_LOG=debug` to watch splits as they happen.

use linhash::{AccessCounter, LinHashConfig, LinHashMap};
use rand::Rng;
use std::collections::hash_map::RandomState;
use std::error::Error;

const DEFAULT_KEYS: u64 = 40;
const MAX_KEYS: u64 = u32::MAX as u64;

fn parse_total_keys(arg: &str) -> Result<u64, Box<dyn Error>> {
    let n: u64 = arg.parse()?;
    if n > MAX_KEYS {
        return Err(format!("TOTAL_KEYS must be at most {MAX_KEYS}, got {n}").into());
    }
    Ok(n)
}

fn main() -> Result<(), Box<dyn Error>> {
    env_logger::init();

    let mut total_keys = DEFAULT_KEYS;
    let mut randomly = false;
    for arg in std::env::args().skip(1) {
        match arg.as_str() {
            "--random" => randomly = true,
            n => total_keys = parse_total_keys(n)?,
        }
    }

    let counter = AccessCounter::new();
    let mut map: LinHashMap<u64, u64, RandomState, &AccessCounter> =
        LinHashMap::with_config(LinHashConfig::default(), RandomState::new(), &counter)?;

    let mut rng = rand::rng();
    for i in (1..=total_keys).step_by(2) {
        let key = if randomly {
            rng.random_range(0..2 * total_keys.max(1))
        } else {
            i
        };
        map.put(key, i * i);
    }

    map.print();
    println!(
        "size = {}, keys = {}, buckets = {}, load factor = {:.2}",
        map.size(),
        map.len(),
        map.bucket_count(),
        map.load_factor()
    );

    for key in 0..=total_keys {
        match map.get(&key) {
            Some(value) => println!("key = {key} value = {value}"),
            None => println!("key = {key} value = null"),
        }
    }

    println!("-------------------------------------------");
    println!(
        "Average number of buckets accessed per lookup ({} lookups) = {:.4}",
        counter.lookups(),
        counter.average_accesses()
    );
    Ok(())
}
