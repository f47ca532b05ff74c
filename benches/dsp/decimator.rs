//! Benchmarks for the half-band decimator cascade.

use std::hint::black_box;

use criterion::{BenchmarkId, Criterion};
use ppg_wave::dsp::{DecimatorCascade, Oversampling};

use crate::BLOCK_SIZES;

pub fn bench_decimator(c: &mut Criterion) {
    let mut group = c.benchmark_group("dsp/decimator");

    for &size in BLOCK_SIZES {
        let input: Vec<[f32; 4]> = (0..size)
            .map(|i| {
                let x = i as f32 * 0.37;
                [x.sin(), (x + 0.1).sin(), (x + 0.2).sin(), (x + 0.3).sin()]
            })
            .collect();

        for mode in [Oversampling::X2, Oversampling::X4] {
            let mut decimator = DecimatorCascade::new();
            let name = format!("{:?}", mode).to_lowercase();
            group.bench_with_input(BenchmarkId::new(name, size), &size, |b, _| {
                b.iter(|| {
                    let mut acc = 0.0;
                    for frame in &input {
                        acc += decimator.process(mode, black_box(frame));
                    }
                    black_box(acc)
                })
            });
        }
    }

    group.finish();
}
