// Copyright (c) Microsoft Corporation.
// Licensed under the MIT License.

//! Basic Example
//!
//! Demonstrates the accessor flavors: plain, guarded, time-limited and async.

use std::sync::LazyLock;
use std::thread;
use std::time::Duration;

use lazyslot::{AsyncCachedProperty, CachedProperty, HasSlots, Slots, ThreadedCachedProperty};
use tick::Clock;

#[derive(Default)]
struct Report {
    rows: Vec<u64>,
    slots: Slots,
}

impl HasSlots for Report {
    fn slots(&self) -> &Slots {
        &self.slots
    }
}

static TOTAL: LazyLock<CachedProperty<Report, u64>> = LazyLock::new(|| {
    CachedProperty::new("total", |report: &Report| {
        println!("computing total...");
        report.rows.iter().sum()
    })
});

static AVERAGE: LazyLock<ThreadedCachedProperty<Report, f64>> = LazyLock::new(|| {
    CachedProperty::new("average", |report: &Report| {
        println!("computing average on {:?}...", thread::current().id());
        #[expect(clippy::cast_precision_loss, reason = "example values are small")]
        let average = TOTAL.get(report) as f64 / report.rows.len().max(1) as f64;
        average
    })
    .threaded()
});

static SUMMARY: LazyLock<AsyncCachedProperty<Report, String>> = LazyLock::new(|| {
    AsyncCachedProperty::new("summary", |report: &Report| {
        let rows = report.rows.len();
        async move {
            tokio::time::sleep(Duration::from_millis(50)).await;
            format!("{rows} rows")
        }
    })
});

#[tokio::main]
async fn main() -> Result<(), lazyslot::Error> {
    let report = Report {
        rows: vec![3, 5, 8, 13],
        ..Report::default()
    };

    // Computed on the first read, served from the instance afterwards.
    println!("total = {}", TOTAL.get(&report));
    println!("total = {}", TOTAL.get(&report));

    // Only one of the threads computes.
    thread::scope(|scope| {
        for _ in 0..4 {
            scope.spawn(|| println!("average = {}", AVERAGE.get(&report)));
        }
    });

    // Values older than the TTL are recomputed on the next read.
    let fresh = CachedProperty::builder("fresh_total")
        .ttl(Duration::from_millis(100))
        .clock(Clock::new_tokio())
        .build(|report: &Report| report.rows.iter().sum::<u64>())?;
    println!("fresh total = {}", fresh.get(&report));

    // Awaiters share one computation.
    let (first, second) = tokio::join!(SUMMARY.get(&report), SUMMARY.get(&report));
    println!("summary = {first} / {second}");

    Ok(())
}
