//! Benchmarks for complete voices.
//!
//! These cover the configurations a host is likely to pick, from the plain
//! 2x default to a modulated dual-layer patch at 4x.

use std::hint::black_box;
use std::sync::Arc;

use criterion::{BenchmarkId, Criterion};
use ppg_wave::dsp::Oversampling;
use ppg_wave::synth::ModulationRate;
use ppg_wave::{Param, VoiceConfig, WaveBank, WaveVoice};

use crate::BLOCK_SIZES;

fn modulated(voice: &mut WaveVoice) {
    voice.set_parameter(Param::Wavetable, 7);
    voice.set_parameter(Param::WaveIndex, 300);
    voice.set_parameter(Param::EnvAttack, 40);
    voice.set_parameter(Param::EnvDecay, 60);
    voice.set_parameter(Param::EnvAmount, 70);
    voice.set_parameter(Param::LfoRate, 60);
    voice.set_parameter(Param::LfoAmount, 40);
}

pub fn bench_voice(c: &mut Criterion) {
    let mut group = c.benchmark_group("scenarios/voice");
    let bank = Arc::new(WaveBank::builtin());

    for &size in BLOCK_SIZES {
        let mut buffer = vec![0.0f32; size];

        // === DEFAULT ===
        // 2x oversampling, block-rate modulation, static index
        let mut plain = WaveVoice::new(Arc::clone(&bank), VoiceConfig::default());
        plain.note_on(57 << 8);
        group.bench_with_input(BenchmarkId::new("default", size), &size, |b, _| {
            b.iter(|| plain.render(black_box(&mut buffer)))
        });

        // === SWEEPING ===
        // Envelope and LFO move the index every sample
        let config = VoiceConfig::default().with_modulation_rate(ModulationRate::PerSample);
        let mut sweep = WaveVoice::new(Arc::clone(&bank), config);
        modulated(&mut sweep);
        sweep.note_on(57 << 8);
        group.bench_with_input(BenchmarkId::new("sweep", size), &size, |b, _| {
            b.iter(|| sweep.render(black_box(&mut buffer)))
        });

        // === HEAVY ===
        // 4x, both layers, per-sample modulation
        let config = VoiceConfig::default()
            .with_oversampling(Oversampling::X4)
            .with_modulation_rate(ModulationRate::PerSample);
        let mut heavy = WaveVoice::new(Arc::clone(&bank), config);
        modulated(&mut heavy);
        heavy.set_parameter(Param::SecondaryWaveIndex, 800);
        heavy.note_on(57 << 8);
        group.bench_with_input(BenchmarkId::new("heavy", size), &size, |b, _| {
            b.iter(|| heavy.render(black_box(&mut buffer)))
        });

        // Hardware output format
        let mut ints = vec![0i32; size];
        let mut q31 = WaveVoice::new(Arc::clone(&bank), VoiceConfig::default());
        q31.note_on(57 << 8);
        group.bench_with_input(BenchmarkId::new("q31", size), &size, |b, _| {
            b.iter(|| q31.render_q31(black_box(&mut ints)))
        });
    }

    group.finish();
}
