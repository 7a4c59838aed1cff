use bitpack::BitTable;
use criterion::{criterion_group, criterion_main, BenchmarkId, Criterion};
use rand::{rngs::StdRng, Rng, SeedableRng};

fn random_table(size: usize, rng: &mut StdRng) -> BitTable {
    let mut t = BitTable::zeros_square(size);
    for r in 0..size {
        for c in 0..size {
            if rng.gen::<bool>() {
                t.set(r, c, true);
            }
        }
    }
    t
}

fn bench_transpose(c: &mut Criterion) {
    let mut group = c.benchmark_group("bittable_transpose");
    let mut rng = StdRng::seed_from_u64(0x5EED);
    for size in [64, 256, 1024] {
        let table = random_table(size, &mut rng);
        group.bench_with_input(BenchmarkId::from_parameter(size), &table, |b, table| {
            b.iter(|| table.transposed());
        });
    }
    group.finish();
}

criterion_group!(benches, bench_transpose);
criterion_main!(benches);
