use criterion::{black_box, criterion_group, criterion_main, BatchSize, Criterion};
use linhash::{AccessCounter, LinHashConfig, LinHashMap};
use std::collections::hash_map::RandomState;
use std::time::Duration;

fn lcg(mut s: u64) -> impl Iterator<Item = u64> {
    std::iter::from_fn(move || {
        s = s.wrapping_mul(6364136223846793005).wrapping_add(1);
        Some(s)
    })
}

fn key(n: u64) -> String {
    format!("k{:016x}", n)
}

fn bench_put_fresh_100k(c: &mut Criterion) {
    c.bench_function("linhash::put_fresh_100k", |b| {
        b.iter_batched(
            LinHashMap::<String, u64>::new,
            |mut m| {
                for (i, x) in lcg(1).take(100_000).enumerate() {
                    m.put(key(x), i as u64);
                }
                black_box(m)
            },
            BatchSize::SmallInput,
        )
    });
}

fn bench_put_overwrite_100k(c: &mut Criterion) {
    c.bench_function("linhash::put_overwrite_100k", |b| {
        b.iter_batched(
            || {
                let mut m = LinHashMap::new();
                for (i, x) in lcg(2).take(100_000).enumerate() {
                    m.put(key(x), i as u64);
                }
                m
            },
            |mut m| {
                for (i, x) in lcg(2).take(100_000).enumerate() {
                    black_box(m.put(key(x), i as u64 + 1));
                }
                black_box(m)
            },
            BatchSize::SmallInput,
        )
    });
}

fn bench_get_hit_miss(c: &mut Criterion) {
    let mut m = LinHashMap::new();
    let keys: Vec<String> = lcg(7).take(100_000).map(key).collect();
    for (i, k) in keys.iter().enumerate() {
        m.put(k.clone(), i as u64);
    }
    let misses: Vec<String> = lcg(0xdead_beef).take(10_000).map(key).collect();

    c.bench_function("linhash::get_hit_10k", |b| {
        b.iter(|| {
            for k in keys.iter().take(10_000) {
                black_box(m.get(k));
            }
        })
    });
    c.bench_function("linhash::get_miss_10k", |b| {
        b.iter(|| {
            for k in &misses {
                black_box(m.get(k));
            }
        })
    });
}

// Compares the growth threshold's effect on insert cost and chain length.
fn bench_thresholds(c: &mut Criterion) {
    for threshold in [0.8, 1.2, 2.0] {
        let name = format!("linhash::put_50k_threshold_{threshold}");
        c.bench_function(&name, |b| {
            b.iter_batched(
                AccessCounter::new,
                |counter| {
                    let config = LinHashConfig::new().load_threshold(threshold);
                    let mut m: LinHashMap<u64, u64, RandomState, &AccessCounter> =
                        LinHashMap::with_config(config, RandomState::new(), &counter).unwrap();
                    for x in lcg(9).take(50_000) {
                        m.put(x, x);
                    }
                    for x in lcg(9).take(1_000) {
                        black_box(m.get(&x));
                    }
                    black_box(counter.average_accesses())
                },
                BatchSize::SmallInput,
            )
        });
    }
}

fn bench_config() -> Criterion {
    Criterion::default()
        .sample_size(12)
        .measurement_time(Duration::from_secs(5))
        .warm_up_time(Duration::from_secs(1))
}

criterion_group! {
    name = benches_put;
    config = bench_config();
    targets = bench_put_fresh_100k, bench_put_overwrite_100k
}
criterion_group! {
    name = benches_ops;
    config = bench_config();
    targets = bench_get_hit_miss,
              bench_thresholds
}
criterion_main!(benches_put, benches_ops);
