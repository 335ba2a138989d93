// Copyright (c) Microsoft Corporation.
// Licensed under the MIT License.

//! Benchmarks for reading cached values through each accessor flavor.

#![allow(missing_docs, reason = "Benchmark code")]

use std::hint::black_box;
use std::time::Duration;

use criterion::{Criterion, criterion_group, criterion_main};
use lazyslot::{CachedProperty, HasSlots, Slots};
use tick::Clock;

#[derive(Default)]
struct Host {
    slots: Slots,
}

impl HasSlots for Host {
    fn slots(&self) -> &Slots {
        &self.slots
    }
}

fn sum(_: &Host) -> u64 {
    (0..64).sum()
}

fn bench_hits(c: &mut Criterion) {
    let mut group = c.benchmark_group("hit");
    let host = Host::default();

    let plain = CachedProperty::new("plain", sum);
    let _ = plain.get(&host);
    group.bench_function("plain", |b| b.iter(|| black_box(plain.get(black_box(&host)))));

    let threaded = CachedProperty::new("threaded", sum).threaded();
    let _ = threaded.get(&host);
    group.bench_function("threaded", |b| b.iter(|| black_box(threaded.get(black_box(&host)))));

    let ttl = CachedProperty::builder("ttl")
        .ttl(Duration::from_secs(3600))
        .clock(Clock::new_frozen())
        .build(sum)
        .expect("valid configuration");
    let _ = ttl.get(&host);
    group.bench_function("ttl", |b| b.iter(|| black_box(ttl.get(black_box(&host)))));

    group.finish();
}

fn bench_misses(c: &mut Criterion) {
    let mut group = c.benchmark_group("miss");
    let host = Host::default();

    let plain = CachedProperty::new("plain", sum);
    group.bench_function("plain", |b| {
        b.iter(|| {
            plain.delete(&host);
            black_box(plain.get(black_box(&host)))
        });
    });

    let threaded = CachedProperty::new("threaded", sum).threaded();
    group.bench_function("threaded", |b| {
        b.iter(|| {
            threaded.delete(&host);
            black_box(threaded.get(black_box(&host)))
        });
    });

    group.finish();
}

criterion_group!(benches, bench_hits, bench_misses);
criterion_main!(benches);
