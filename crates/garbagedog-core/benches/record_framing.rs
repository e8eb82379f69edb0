// Copyright 2023-Present Datadog, Inc. https://www.datadoghq.com/
// SPDX-License-Identifier: Apache-2.0

use criterion::{black_box, criterion_group, criterion_main, BenchmarkId, Criterion};
use garbagedog_core::{GcEventType, RecordAccumulator};

fn benchmark_feed(c: &mut Criterion) {
    let mut group = c.benchmark_group("RecordAccumulator::feed");

    let test_cases = vec![
        (
            "boundary",
            "2012-04-04T19:08:55.302+0000: 511033.796: [GC 511033.796: [ParNew: \
             1903987K->11969K(4723456K), 0.0559371 secs] 14989018K->13097000K(28835840K), \
             0.0560799 secs] [Times: user=0.35 sys=0.01, real=0.06 secs]\n",
        ),
        (
            "conflated",
            "[Times: user=4.39 sys=0.11, real=2.99 secs]511027.401: [Rescan (parallel)]\n",
        ),
        ("continuation", " (concurrent mode failure)\n"),
    ];

    for (name, line) in test_cases {
        group.bench_with_input(BenchmarkId::from_parameter(name), &line, |b, &line| {
            let mut accumulator = RecordAccumulator::new();
            b.iter(|| accumulator.feed(black_box(line)));
        });
    }

    group.finish();
}

fn benchmark_classify(c: &mut Criterion) {
    let record = "2012-04-04T19:08:23.054+0000: 511001.548: [Full GC 511001.549: [CMS: \
                  18431999K->16174249K(18432000K), 106.0788490 secs] \
                  [Times: user=106.01 sys=0.00, real=106.06 secs]";
    c.bench_function("GcEventType::from_record", |b| {
        b.iter(|| GcEventType::from_record(black_box(record)));
    });
}

criterion_group!(benches, benchmark_feed, benchmark_classify);
criterion_main!(benches);
