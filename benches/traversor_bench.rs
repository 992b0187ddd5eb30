use criterion::{BenchmarkId, Criterion, black_box, criterion_group, criterion_main};
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};

use mesh_cmap::prelude::*;

fn quad_grid(n: usize) -> Map2 {
    let mut map = Map2::new();
    let quads: Vec<Dart> = (0..n * n).map(|_| map.new_face(4).expect("face")).collect();
    for j in 0..n {
        for i in 0..n {
            let q = quads[j * n + i];
            if i + 1 < n {
                let r = quads[j * n + i + 1];
                map.sew_faces(map.phi1(q), map.phi_1(r)).expect("sew right");
            }
            if j + 1 < n {
                let t = quads[(j + 1) * n + i];
                map.sew_faces(map.phi1(map.phi1(q)), t).expect("sew top");
            }
        }
    }
    map
}

fn bench_traversors(c: &mut Criterion) {
    let mut group = c.benchmark_group("traversor");

    for &n in &[32usize, 64usize] {
        let map = quad_grid(n);
        group.bench_with_input(BenchmarkId::new("vertices_by_dart", n), &n, |b, _| {
            b.iter(|| black_box(TraversorV::new(&map).expect("traversor").count()));
        });

        let mut embedded = map.clone();
        embedded.init_orbit_embedding(Orbit::Vertex);
        group.bench_with_input(BenchmarkId::new("vertices_by_line", n), &n, |b, _| {
            b.iter(|| black_box(TraversorV::new(&embedded).expect("traversor").count()));
        });

        group.bench_with_input(BenchmarkId::new("faces", n), &n, |b, _| {
            b.iter(|| black_box(TraversorF::new(&map).expect("traversor").count()));
        });
    }

    group.finish();
}

fn bench_orbits(c: &mut Criterion) {
    let mut group = c.benchmark_group("orbit_walk");
    let map = quad_grid(64);
    let darts: Vec<Dart> = map.generic().darts().collect();
    let mut rng = StdRng::seed_from_u64(7);
    let picks: Vec<Dart> = (0..1024).map(|_| darts[rng.gen_range(0..darts.len())]).collect();

    for orbit in [Orbit::Vertex, Orbit::Edge, Orbit::Face] {
        group.bench_with_input(BenchmarkId::new("orbit_size", orbit), &orbit, |b, &o| {
            b.iter(|| {
                let total: usize = picks.iter().map(|&d| map.generic().orbit_size(o, d)).sum();
                black_box(total)
            });
        });
    }

    group.finish();
}

fn bench_surgery(c: &mut Criterion) {
    c.bench_function("cut_uncut_edge_embedded", |b| {
        let mut map = quad_grid(16);
        map.init_orbit_embedding(Orbit::Vertex);
        map.init_orbit_embedding(Orbit::Face);
        let d = map.phi1(map.generic().begin());
        b.iter(|| {
            let n = map.cut_edge(d).expect("cut");
            black_box(n);
            map.uncut_edge(d).expect("uncut");
        });
    });
}

criterion_group!(benches, bench_traversors, bench_orbits, bench_surgery);
criterion_main!(benches);
