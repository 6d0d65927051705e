//! Performance benchmarks for stormcatchment delineation
//!
//! Synthetic layout: a `size × size` grid of parallel south-draining columns.
//! Every column carries an inlet halfway down, piped into the outfall at the
//! mouth of the next column east, so each request recurses across the
//! whole chain.

use std::sync::Arc;

use criterion::{black_box, criterion_group, criterion_main, BenchmarkId, Criterion, Throughput};
use stormcatchment::features::network::{FeatureSet, LineFeature, PointFeature};
use stormcatchment::features::terrain::{CachedTerrain, GridSpec};
use stormcatchment::{Delineate, FlowGrid, Network, Point, StormConfig, TerrainService};

fn columns_grid(size: usize) -> FlowGrid {
    let spec = GridSpec::new(0.0, size as f64, 1.0, size, size);
    let mut directions = vec![4u8; size * size];
    for col in 0..size {
        directions[(size - 1) * size + col] = 0;
    }
    FlowGrid::from_directions(spec, directions).expect("valid grid")
}

fn center(size: usize, row: usize, col: usize) -> (f64, f64) {
    (col as f64 + 0.5, size as f64 - row as f64 - 0.5)
}

fn chain(size: usize) -> (FeatureSet<PointFeature>, FeatureSet<LineFeature>) {
    let mut points = Vec::new();
    let mut lines = Vec::new();
    for col in 0..size {
        let (ix, iy) = center(size, size / 2, col);
        let (ox, oy) = center(size, size - 1, col);
        let inlet = 2 * col as u64;
        let outfall = inlet + 1;
        points.push(PointFeature::new(inlet, ix, iy).with_attribute("Type", 2));
        points.push(PointFeature::new(outfall, ox, oy).with_attribute("Type", 5));
        if col + 1 < size {
            let (nx, ny) = center(size, size - 1, col + 1);
            lines.push(LineFeature::segment(col as u64, (ix, iy), (nx, ny)));
        }
    }
    (FeatureSet::new(points), FeatureSet::new(lines))
}

fn bench_network_build(c: &mut Criterion) {
    let mut group = c.benchmark_group("network_build");

    for size in [16usize, 64, 256] {
        let (points, lines) = chain(size);
        group.throughput(Throughput::Elements(points.len() as u64));
        group.bench_with_input(BenchmarkId::from_parameter(size), &size, |b, _| {
            b.iter(|| {
                let network = Network::build(&points, &lines, &Default::default()).unwrap();
                black_box(network)
            });
        });
    }

    group.finish();
}

fn bench_single_request(c: &mut Criterion) {
    let mut group = c.benchmark_group("get_stormcatchment");

    for size in [16usize, 64] {
        let (points, lines) = chain(size);
        let engine =
            Delineate::from_parts(&points, &lines, columns_grid(size), &StormConfig::default())
                .unwrap();
        let (x, y) = center(size, size - 1, size - 1);
        group.bench_with_input(BenchmarkId::from_parameter(size), &size, |b, _| {
            b.iter(|| black_box(engine.get_stormcatchment(Point::new(x, y)).unwrap()));
        });
    }

    group.finish();
}

fn bench_batch(c: &mut Criterion) {
    let size = 64;
    let (points, lines) = chain(size);
    let network = Arc::new(Network::build(&points, &lines, &Default::default()).unwrap());
    let terrain: Arc<dyn TerrainService> = Arc::new(CachedTerrain::new(columns_grid(size)));
    let engine = Delineate::new(network, terrain, &StormConfig::default()).unwrap();

    let pour_points: Vec<Point> = (0..size)
        .map(|col| {
            let (x, y) = center(size, size - 1, col);
            Point::new(x, y)
        })
        .collect();

    c.bench_function("get_stormcatchments_64", |b| {
        b.iter(|| black_box(engine.get_stormcatchments(&pour_points)));
    });
}

criterion_group!(benches, bench_network_build, bench_single_request, bench_batch);
criterion_main!(benches);
