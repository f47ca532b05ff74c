//! Benchmarks for wave index resolution and wavetable loading.

use std::hint::black_box;
use std::sync::Arc;

use criterion::{BenchmarkId, Criterion};
use ppg_wave::dsp::WavetableResolver;
use ppg_wave::WaveBank;

use crate::BLOCK_SIZES;

pub fn bench_wavetable(c: &mut Criterion) {
    let mut group = c.benchmark_group("dsp/wavetable");
    let bank = Arc::new(WaveBank::builtin());

    // Worst case: the index moves every sample
    for &size in BLOCK_SIZES {
        let mut resolver = WavetableResolver::new(Arc::clone(&bank));
        let step = u32::MAX / size as u32;
        group.bench_with_input(BenchmarkId::new("sweep", size), &size, |b, &size| {
            b.iter(|| {
                let mut index = 0u32;
                for _ in 0..size {
                    index = index.wrapping_add(step);
                    resolver.set_wave_index(black_box(index));
                }
                black_box(resolver.active().alpha)
            })
        });
    }

    // Control-rate cost of switching tables
    let mut resolver = WavetableResolver::new(Arc::clone(&bank));
    let mut selector = 0u8;
    group.bench_function("load_table", |b| {
        b.iter(|| {
            selector = (selector + 1) % 61;
            resolver.select_wavetable(black_box(selector))
        })
    });

    group.finish();
}
