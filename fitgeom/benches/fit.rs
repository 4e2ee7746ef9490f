//! Benchmarks pour l'ajustement de géométries

use criterion::{black_box, criterion_group, criterion_main, BenchmarkId, Criterion, Throughput};
use fitgeom::{fit_polygon, CoordinateBridge, Crs, TransformContext};
use geo::{Coord, LineString, Polygon};

/// Polygone régulier de `n` sommets autour de `(cx, cy)`
fn regular_polygon(n: usize, cx: f64, cy: f64, radius: f64) -> Polygon {
    let mut coords: Vec<Coord> = (0..n)
        .map(|i| {
            let t = i as f64 / n as f64 * std::f64::consts::TAU;
            Coord {
                x: cx + radius * t.cos(),
                y: cy + radius * t.sin(),
            }
        })
        .collect();
    coords.push(coords[0]);
    Polygon::new(LineString::new(coords), vec![])
}

fn bench_fit_direct(c: &mut Criterion) {
    let mut group = c.benchmark_group("fit_direct");

    for n in [4, 64, 1024] {
        let poly = regular_polygon(n, 652_000.0, 6_862_000.0, 50.0);
        group.throughput(Throughput::Elements(n as u64));
        group.bench_with_input(BenchmarkId::from_parameter(n), &poly, |b, poly| {
            b.iter(|| fit_polygon(black_box(poly), black_box(10_000.0)).unwrap())
        });
    }

    group.finish();
}

fn bench_fit_reprojected(c: &mut Criterion) {
    let bridge = CoordinateBridge::new(
        Crs::from_epsg(4674).unwrap(),
        Crs::from_epsg(29101).unwrap(),
        &TransformContext::default(),
    )
    .unwrap();

    let mut group = c.benchmark_group("fit_reprojected");

    for n in [4, 64, 1024] {
        let poly = regular_polygon(n, -52.0, -15.0, 0.001);
        group.throughput(Throughput::Elements(n as u64));
        group.bench_with_input(BenchmarkId::from_parameter(n), &poly, |b, poly| {
            b.iter(|| bridge.fit_polygon(black_box(poly), black_box(20_000.0)).unwrap())
        });
    }

    group.finish();
}

criterion_group!(benches, bench_fit_direct, bench_fit_reprojected);
criterion_main!(benches);
