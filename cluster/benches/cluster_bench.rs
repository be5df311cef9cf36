use criterion::{Criterion, black_box, criterion_group, criterion_main};
use dwell_cluster::{DensityClusterer, FrameSplit, Observation, Params, PlanarNeighbors};

fn lcg(state: &mut u64) -> f64 {
    *state = state.wrapping_mul(6364136223846793005).wrapping_add(1);
    ((*state >> 33) as f64) / (u32::MAX as f64)
}

/// `blobs` dwell sites visited one after another, `per_blob` pings each,
/// scattered within ~50m and ~60s of the site.
fn make_stream(blobs: usize, per_blob: usize, seed: u64) -> Vec<Observation> {
    let mut state = seed;
    let mut stream = Vec::with_capacity(blobs * per_blob);
    for b in 0..blobs {
        let cx = b as f64 * 2000.0;
        let cy = b as f64 * 500.0;
        let ct = b as i64 * 1800;
        for i in 0..per_blob {
            stream.push(Observation {
                id: (b * per_blob + i) as i64,
                unix_time: ct + (lcg(&mut state) * 60.0) as i64,
                x: cx + (lcg(&mut state) - 0.5) * 100.0,
                y: cy + (lcg(&mut state) - 0.5) * 100.0,
            });
        }
    }
    stream.sort_by_key(|o| o.unix_time);
    stream
}

fn bench_fit(c: &mut Criterion) {
    let stream = make_stream(20, 50, 7);
    c.bench_function("fit_1000_points", |b| {
        b.iter(|| {
            let mut clusterer =
                DensityClusterer::new(Params::new(300.0, 200, 3), PlanarNeighbors::new()).unwrap();
            black_box(clusterer.fit(black_box(&stream)).unwrap())
        })
    });
}

fn bench_frame_split(c: &mut Criterion) {
    let stream = make_stream(20, 50, 7);
    c.bench_function("frame_split_1000_points", |b| {
        b.iter(|| {
            let mut split =
                FrameSplit::new(Params::new(300.0, 200, 3), PlanarNeighbors::new()).unwrap();
            black_box(split.run(black_box(&stream)).unwrap())
        })
    });
}

criterion_group!(benches, bench_fit, bench_frame_split);
criterion_main!(benches);
