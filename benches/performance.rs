// SPDX-License-Identifier: Apache-2.0
// Copyright (c) 2025 Polyframe Inc.

//! Performance benchmarks

use criterion::{black_box, criterion_group, criterion_main, BenchmarkId, Criterion};
use dpsim::detector::build;
use dpsim::geometry::{check_overlaps, subtract, Shape};
use dpsim::{DetectorConfig, MaterialCatalog};
use nalgebra::Vector3;

fn bench_construction(c: &mut Criterion) {
    let mut group = c.benchmark_group("construction");
    let catalog = MaterialCatalog::new();

    for modules in [11u32, 50, 200] {
        let config = DetectorConfig::default().with_ecal_modules(modules);
        group.bench_with_input(BenchmarkId::new("ecal_modules", modules), &config, |b, config| {
            b.iter(|| build(black_box(&catalog), black_box(config)).unwrap());
        });
    }

    group.finish();
}

fn bench_overlap_check(c: &mut Criterion) {
    let catalog = MaterialCatalog::new();
    let detector = build(&catalog, &DetectorConfig::default().with_ecal_modules(200)).unwrap();
    c.bench_function("overlap_check_200_modules", |b| {
        b.iter(|| check_overlaps(black_box(detector.hierarchy())).unwrap());
    });
}

fn bench_shapes(c: &mut Criterion) {
    let tube = Shape::tube("Tube", 0.0, 500.0, 4.0).unwrap();
    let slot = Shape::cuboid("Slot", 300.0, 300.0, 1.0).unwrap();
    let shell = subtract("Shell", &tube, &slot, Vector3::new(0.0, 0.0, 2.0)).unwrap();

    c.bench_function("subtraction_volume", |b| {
        b.iter(|| black_box(&shell).cubic_volume());
    });
}

criterion_group!(benches, bench_construction, bench_overlap_check, bench_shapes);
criterion_main!(benches);
