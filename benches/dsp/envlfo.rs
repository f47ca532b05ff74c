//! Benchmarks for the envelope/LFO modulator.

use std::hint::black_box;

use criterion::{BenchmarkId, Criterion};
use ppg_wave::dsp::EnvLfo;

use crate::BLOCK_SIZES;

pub fn bench_envlfo(c: &mut Criterion) {
    let mut group = c.benchmark_group("dsp/envlfo");

    for &size in BLOCK_SIZES {
        // Attack phase, one step per sample
        let mut m = EnvLfo::new(48_000.0);
        m.set_attack_time(10.0);
        m.set_env_amount(80);
        m.note_on();
        group.bench_with_input(BenchmarkId::new("attack", size), &size, |b, &size| {
            b.iter(|| {
                for _ in 0..size {
                    black_box(m.advance(1));
                }
            })
        });

        // LFO sustain, one step per sample
        let mut m = EnvLfo::new(48_000.0);
        m.set_hold(true);
        m.set_env_amount(50);
        m.set_lfo_amount(100);
        m.set_lfo_frequency(5.0);
        m.note_on();
        group.bench_with_input(BenchmarkId::new("lfo", size), &size, |b, &size| {
            b.iter(|| {
                for _ in 0..size {
                    black_box(m.advance(1));
                }
            })
        });

        // The same LFO advanced once per block
        group.bench_with_input(BenchmarkId::new("lfo_block", size), &size, |b, &size| {
            b.iter(|| black_box(m.advance(black_box(size as u32))))
        });
    }

    group.finish();
}
