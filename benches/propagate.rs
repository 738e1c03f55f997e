use criterion::{criterion_group, criterion_main, Criterion};
use ndarray::Array2;
use topo_mp::prelude::*;

fn ring_neighborhood(n: usize) -> SparseNeighborhood {
    let triplets = (0..n).flat_map(|i| [(i, i, 1.0), (i, (i + 1) % n, 0.5), (i, (i + n - 1) % n, 0.5)]);
    SparseNeighborhood::from_triplets(triplets, (n, n)).unwrap()
}

fn bench_propagate(c: &mut Criterion) {
    let n = 2048;
    let neighborhood = ring_neighborhood(n);
    let x = Array2::from_shape_fn((n, 32), |(i, j)| ((i + j) % 7) as f32);
    let mut mp = MessagePassing::new(MessagePassingConfig::default());

    c.bench_function("propagate_ring_2048x32", |b| {
        b.iter(|| mp.propagate(&x, &neighborhood).unwrap())
    });

    let mut conv = Conv::new(32, 16, MessagePassingConfig::default().with_seed(0)).unwrap();
    c.bench_function("conv_ring_2048x32x16", |b| {
        b.iter(|| conv.forward(&x, &neighborhood).unwrap())
    });
}

criterion_group!(benches, bench_propagate);
criterion_main!(benches);
