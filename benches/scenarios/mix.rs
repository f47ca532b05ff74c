//! Benchmarks for several voices summed.
//!
//! A chord played on independent voices sharing one bank, each as a boxed
//! graph node the way a host would hold them.

use std::hint::black_box;
use std::sync::Arc;

use criterion::{BenchmarkId, Criterion};
use ppg_wave::graph::node::{GraphNode, RenderCtx};
use ppg_wave::{Param, VoiceConfig, WaveBank, WaveVoice};

use crate::BLOCK_SIZES;

/// Render every voice and sum them (simulating a mixer)
fn render_and_mix(
    voices: &mut [Box<dyn GraphNode>],
    buffer: &mut [f32],
    scratch: &mut [f32],
    ctx: &RenderCtx,
) {
    buffer.fill(0.0);

    for voice in voices.iter_mut() {
        voice.render_block(scratch, ctx);
        for (out, &sample) in buffer.iter_mut().zip(scratch.iter()) {
            *out += sample;
        }
    }

    let scale = 1.0 / voices.len() as f32;
    for sample in buffer.iter_mut() {
        *sample *= scale;
    }
}

pub fn bench_mix(c: &mut Criterion) {
    let mut group = c.benchmark_group("scenarios/mix");
    let bank = Arc::new(WaveBank::builtin());
    let chord: [u8; 8] = [36, 48, 55, 60, 64, 67, 71, 74];

    for &size in BLOCK_SIZES {
        let mut buffer = vec![0.0f32; size];
        let mut scratch = vec![0.0f32; size];
        let ctx = RenderCtx::from_note(48_000.0, chord[0]);

        let mut voices: Vec<Box<dyn GraphNode>> = chord
            .iter()
            .enumerate()
            .map(|(i, &note)| {
                let mut voice = WaveVoice::new(Arc::clone(&bank), VoiceConfig::default());
                voice.set_parameter(Param::Wavetable, i as i32 * 3);
                voice.set_parameter(Param::EnvAmount, 50);
                voice.set_parameter(Param::LfoRate, 40);
                voice.set_parameter(Param::LfoAmount, 30);
                let mut node: Box<dyn GraphNode> = Box::new(voice);
                node.note_on(&RenderCtx::from_note(48_000.0, note));
                node
            })
            .collect();

        group.bench_with_input(BenchmarkId::new("chord_8", size), &size, |b, _| {
            b.iter(|| {
                render_and_mix(
                    &mut voices,
                    black_box(&mut buffer),
                    &mut scratch,
                    black_box(&ctx),
                )
            })
        });
    }

    group.finish();
}
