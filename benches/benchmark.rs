use criterion::{black_box, criterion_group, criterion_main, Criterion};
use rand::{rngs::StdRng, Rng, SeedableRng};

use avl_index::AvlTreeMap;

const N: usize = 100_000;

pub fn benchmarks(c: &mut Criterion) {
    let mut rng = StdRng::seed_from_u64(0);
    let values: Vec<i32> = (1..=N).map(|_| rng.gen()).collect();

    c.bench_function("map_insert", |b| {
        b.iter(|| {
            let mut map = AvlTreeMap::new();
            for value in &values {
                map.insert(*value, *value);
            }
            map
        })
    });

    c.bench_function("map_insert_sequential", |b| {
        b.iter(|| {
            let mut map = AvlTreeMap::new();
            for value in 0..N {
                map.insert(value, value);
            }
            map
        })
    });

    let mut map = AvlTreeMap::new();
    for value in &values {
        map.insert(*value, *value);
    }

    c.bench_function("map_search", |b| {
        b.iter(|| {
            for value in &values {
                black_box(map.search(value));
            }
        })
    });

    c.bench_function("map_iter", |b| {
        b.iter(|| {
            for (k, v) in &map {
                black_box((k, v));
            }
        })
    });
}

criterion_group!(benches, benchmarks);
criterion_main!(benches);
