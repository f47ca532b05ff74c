//! Benchmarks for the oscillator primitives and complete voices.
//!
//! Run with: cargo bench
//!
//! Reference timing at 48kHz sample rate:
//!   - 64 samples  = 1.33ms deadline
//!   - 128 samples = 2.67ms deadline
//!   - 256 samples = 5.33ms deadline
//!   - 512 samples = 10.67ms deadline
//!
//! Benchmark groups:
//!   - dsp/*        Low-level primitives (generator, resolver, modulator, decimator)
//!   - scenarios/*  Full voices and a stack of voices summed

use criterion::{criterion_group, criterion_main};

mod dsp;
mod scenarios;

/// Common buffer sizes used in audio applications.
pub const BLOCK_SIZES: &[usize] = &[64, 128, 256, 512];

criterion_group!(
    benches,
    // Low-level DSP primitives
    dsp::bench_generator,
    dsp::bench_wavetable,
    dsp::bench_envlfo,
    dsp::bench_decimator,
    // Real-world scenarios
    scenarios::bench_voice,
    scenarios::bench_mix,
);
criterion_main!(benches);
