use circuit::Circuit;
use criterion::{criterion_group, criterion_main, BenchmarkId, Criterion};
use frame_sim::{FrameSimulator, NullSink, StreamingConfig};

fn repetition_code_text(distance: usize, rounds: usize) -> String {
    let mut text = String::new();
    for _ in 0..rounds {
        for d in 0..distance - 1 {
            text.push_str(&format!("CX {} {}\n", d, distance + d));
            text.push_str(&format!("CX {} {}\n", d + 1, distance + d));
        }
        for d in 0..distance - 1 {
            text.push_str(&format!("MR {}\n", distance + d));
        }
    }
    text
}

fn bench_sampling(c: &mut Criterion) {
    let mut group = c.benchmark_group("frame_simulator_sample");
    for distance in [3, 9, 27] {
        let circuit = Circuit::parse(&repetition_code_text(distance, 5)).unwrap();
        let stats = circuit.stats();
        group.bench_with_input(BenchmarkId::from_parameter(distance), &circuit, |b, circuit| {
            b.iter(|| {
                let sim = FrameSimulator::new(stats.qubit_count as usize, 1024, 0x5EED, StreamingConfig::default(), NullSink);
                sim.run(circuit).unwrap()
            });
        });
    }
    group.finish();
}

criterion_group!(benches, bench_sampling);
criterion_main!(benches);
