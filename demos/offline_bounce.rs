/// Renders a wave index sweep through wavetable 0 into a buffer
/// and prints a short summary per quarter of the sweep
use std::sync::Arc;

use ppg_wave::{Param, VoiceConfig, WaveBank, WaveVoice, MAX_BLOCK_SIZE};

fn main() {
    println!("=== Offline Wavetable Sweep ===\n");

    let sample_rate = 48_000.0;
    let seconds = 2.0;
    let note = 57u16; // A3

    let mut voice = WaveVoice::new(Arc::new(WaveBank::builtin()), VoiceConfig::new(sample_rate));
    voice.set_parameter(Param::Wavetable, 0);
    voice.note_on(note << 8);

    let blocks = (sample_rate * seconds) as usize / MAX_BLOCK_SIZE;
    let mut output = Vec::with_capacity(blocks * MAX_BLOCK_SIZE);
    let mut block = [0.0f32; MAX_BLOCK_SIZE];

    for i in 0..blocks {
        // Walk the whole table once over the bounce
        let index = (i * 1023 / blocks.max(1)) as i32;
        voice.set_parameter(Param::WaveIndex, index);
        voice.render(&mut block);
        output.extend_from_slice(&block);
    }

    println!("Rendered {} samples at {:.1} Hz\n", output.len(), voice.frequency());

    for (quarter, chunk) in output.chunks(output.len().div_ceil(4).max(1)).enumerate() {
        let peak = chunk.iter().fold(0.0f32, |m, y| m.max(y.abs()));
        let rms = (chunk.iter().map(|y| y * y).sum::<f32>() / chunk.len() as f32).sqrt();
        println!("  quarter {}: peak {:.3}  rms {:.3}", quarter + 1, peak, rms);
    }
}
