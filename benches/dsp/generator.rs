//! Benchmarks for per-sample wave generation.

use std::hint::black_box;

use criterion::{BenchmarkId, Criterion};
use ppg_wave::dsp::{ActiveWaves, Interpolation, WaveGenerator, WaveSource};
use ppg_wave::rom::StandardWave;
use ppg_wave::{WaveBank, WaveId};

use crate::BLOCK_SIZES;

fn run(generator: &mut WaveGenerator, bank: &WaveBank, waves: &ActiveWaves, out: &mut [f32]) {
    for y in out.iter_mut() {
        *y = generator.generate(bank, waves);
    }
}

pub fn bench_generator(c: &mut Criterion) {
    let mut group = c.benchmark_group("dsp/generator");
    let bank = WaveBank::builtin();

    let cases = [
        // Single fragment, no crossfade
        (
            "memory",
            ActiveWaves {
                lower: WaveSource::Memory(WaveId(10)),
                upper: WaveSource::Memory(WaveId(10)),
                alpha: 0.0,
            },
        ),
        // Two fragment reads per sample
        (
            "crossfade",
            ActiveWaves {
                lower: WaveSource::Memory(WaveId(10)),
                upper: WaveSource::Memory(WaveId(11)),
                alpha: 0.4,
            },
        ),
        // Two PolyBLEP residuals per sample
        (
            "square",
            ActiveWaves {
                lower: WaveSource::Standard(StandardWave::Square),
                upper: WaveSource::Standard(StandardWave::Square),
                alpha: 0.0,
            },
        ),
        (
            "sync",
            ActiveWaves {
                lower: WaveSource::Sync(30),
                upper: WaveSource::Sync(31),
                alpha: 0.5,
            },
        ),
    ];

    for &size in BLOCK_SIZES {
        let mut buffer = vec![0.0f32; size];

        for (name, waves) in &cases {
            let mut generator = WaveGenerator::new();
            generator.set_frequency(440.0, 96_000.0);
            group.bench_with_input(BenchmarkId::new(*name, size), &size, |b, _| {
                b.iter(|| run(&mut generator, &bank, black_box(waves), black_box(&mut buffer)))
            });
        }

        // Stair-stepped reads skip the interpolation multiply
        let mut generator = WaveGenerator::new();
        generator.set_frequency(440.0, 96_000.0);
        generator.set_interpolation(Interpolation::Nearest);
        let waves = cases[1].1;
        group.bench_with_input(BenchmarkId::new("nearest", size), &size, |b, _| {
            b.iter(|| run(&mut generator, &bank, black_box(&waves), black_box(&mut buffer)))
        });
    }

    group.finish();
}
