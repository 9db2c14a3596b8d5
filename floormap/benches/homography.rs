//! Benchmarks for the calibration math hot paths

use criterion::{criterion_group, criterion_main, Criterion};
use floormap::{derive_real_points, point_in_polygon, Homography, PairDistances};
use std::hint::black_box;

fn bench_homography_solve(c: &mut Criterion) {
    let src = [(12.0, 34.0), (620.0, 28.0), (600.0, 455.0), (20.0, 470.0)];
    let dst = [(0.0, 0.0), (800.0, 0.0), (800.0, 800.0), (0.0, 800.0)];

    c.bench_function("homography_solve", |b| {
        b.iter(|| Homography::from_points(black_box(&src), black_box(&dst)).unwrap())
    });
}

fn bench_homography_apply(c: &mut Criterion) {
    let src = [(12.0, 34.0), (620.0, 28.0), (600.0, 455.0), (20.0, 470.0)];
    let dst = [(0.0, 0.0), (800.0, 0.0), (800.0, 800.0), (0.0, 800.0)];
    let h = Homography::from_points(&src, &dst).unwrap();
    let points: Vec<(f64, f64)> = (0..1000)
        .map(|i| (i as f64 % 640.0, i as f64 % 480.0))
        .collect();

    c.bench_function("homography_apply_1000_points", |b| {
        b.iter(|| {
            for p in &points {
                black_box(h.apply(black_box(*p)));
            }
        })
    });
}

fn bench_layout_derivation(c: &mut Criterion) {
    let d = PairDistances {
        d01: 3.0,
        d02: 5.0,
        d03: 4.0,
        d12: 4.0,
        d13: 5.0,
        d23: 3.0,
    };

    c.bench_function("derive_real_points", |b| {
        b.iter(|| derive_real_points(black_box(&d)).unwrap())
    });
}

fn bench_containment(c: &mut Criterion) {
    let octagon: Vec<(f64, f64)> = (0..8)
        .map(|i| {
            let a = i as f64 * std::f64::consts::FRAC_PI_4;
            (400.0 + 300.0 * a.cos(), 400.0 + 300.0 * a.sin())
        })
        .collect();
    let points: Vec<(f64, f64)> = (0..1000)
        .map(|i| ((i * 7 % 800) as f64, (i * 13 % 800) as f64))
        .collect();

    c.bench_function("point_in_polygon_1000_queries", |b| {
        b.iter(|| {
            for p in &points {
                black_box(point_in_polygon(black_box(*p), &octagon));
            }
        })
    });
}

criterion_group!(
    benches,
    bench_homography_solve,
    bench_homography_apply,
    bench_layout_derivation,
    bench_containment
);
criterion_main!(benches);
