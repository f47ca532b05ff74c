use super::{
    Keyframe, WaveBank, WaveId, WavetableDefinition, FRAGMENT_LEN, MAX_POSITION, NUM_WAVES,
    NUM_WAVETABLES, WT_STEP, WT_SYNC, WT_UPPER,
};
use std::f32::consts::PI;

/*
Built-in Wave Bank
==================

The real PPG ROM is an external asset. This bank is a deterministic stand-in
with the same shape: 204 fragments and 31 wavetable definitions, so voices,
tests and benches work without a dump on disk.

Fragments
---------

Each fragment is a sum of sines sampled at the centres of the first 64 of
128 cycle positions:

    s(i) = sum_h a_h * sin(2*pi*h * (i + 0.5) / 128)

A pure sine series satisfies s(1 - x) = -s(x), which is exactly the symmetry
the playback mirror (time reversed, amplitude inverted) rebuilds the second
half with. Values are normalized to the byte range as 128 + 127 * s / peak.

The 204 waves come in six families of 34, each swept by one parameter:

    0..34     saw, harmonic count 1..24
    34..68    odd harmonics (square-like), count 1..31
    68..102   formant, a gaussian bump moving through harmonics 1..16
    102..136  pulse width 5%..50%
    136..170  alternating-sign bell, high partials growing
    170..204  organ drawbars, rotating weights

Tables
------

Tables 0..27 walk through one family each with 4..6 keyframes. Odd tables
stop before position 60 so the resolver's "past the last keyframe" path is
exercised. Every fifth table ends in a standard wave, like the PPG's
computed terminals. Table 30 (upper) runs from a saw to the triangle.
*/

const FAMILY_SIZE: usize = 34;

impl WaveBank {
    /// Deterministic stand-in bank.
    pub fn builtin() -> Self {
        let waves = (0..NUM_WAVES).map(fragment).collect();
        let tables = (0..NUM_WAVETABLES as u8).map(table).collect();
        Self::from_trusted(waves, tables)
    }
}

fn fragment(index: usize) -> [u8; FRAGMENT_LEN] {
    let family = index / FAMILY_SIZE;
    let t = (index % FAMILY_SIZE) as f32 / (FAMILY_SIZE - 1) as f32;

    let mut amplitudes = [0.0f32; 32];
    match family {
        0 => {
            let count = 1 + (t * 23.0).round() as usize;
            for h in 1..=count {
                amplitudes[h - 1] = 1.0 / h as f32;
            }
        }
        1 => {
            let count = 1 + 2 * (t * 15.0).round() as usize;
            for h in (1..=count).step_by(2) {
                amplitudes[h - 1] = 1.0 / h as f32;
            }
        }
        2 => {
            let centre = 1.0 + t * 15.0;
            for h in 1..=24 {
                let d = (h as f32 - centre) / 2.0;
                amplitudes[h - 1] = (-d * d).exp();
            }
        }
        3 => {
            let width = 0.05 + 0.45 * t;
            for h in 1..=16 {
                amplitudes[h - 1] = (PI * h as f32 * width).sin() / h as f32;
            }
        }
        4 => {
            amplitudes[0] = 1.0;
            for h in 2..=12 {
                let sign = if h % 2 == 0 { -1.0 } else { 1.0 };
                amplitudes[h - 1] = sign * t.powf(h as f32 / 3.0);
            }
        }
        _ => {
            for (slot, h) in [1usize, 2, 3, 4, 6, 8].into_iter().enumerate() {
                let phase = 2.0 * PI * (t + slot as f32 / 6.0);
                amplitudes[h - 1] = 0.5 + 0.5 * phase.cos();
            }
        }
    }

    let mut raw = [0.0f32; FRAGMENT_LEN];
    for (i, value) in raw.iter_mut().enumerate() {
        let x = (i as f32 + 0.5) / 128.0;
        *value = amplitudes
            .iter()
            .enumerate()
            .map(|(k, a)| a * (2.0 * PI * (k + 1) as f32 * x).sin())
            .sum();
    }

    let peak = raw.iter().fold(0.0f32, |acc, v| acc.max(v.abs()));
    let peak = if peak < 1e-6 { 1.0 } else { peak };

    let mut out = [0u8; FRAGMENT_LEN];
    for (dst, value) in out.iter_mut().zip(raw) {
        *dst = (128.0 + 127.0 * value / peak).round().clamp(0.0, 255.0) as u8;
    }
    out
}

fn table(number: u8) -> WavetableDefinition {
    if number == WT_SYNC || number == WT_STEP {
        return WavetableDefinition::default();
    }

    if number == WT_UPPER {
        return WavetableDefinition::new(vec![
            Keyframe::new(0, WaveId::SAW),
            Keyframe::new(16, WaveId(10)),
            Keyframe::new(32, WaveId(FAMILY_SIZE as u8 + 20)),
            Keyframe::new(48, WaveId(3 * FAMILY_SIZE as u8 + 12)),
            Keyframe::new(56, WaveId::SQUARE),
            Keyframe::new(60, WaveId::TRIANGLE),
        ]);
    }

    let n = number as usize;
    let family = n % 6;
    let first = (n / 6) * 7;
    let count = 4 + n % 3;
    let last_position = if n % 2 == 0 { MAX_POSITION } else { 56 } as usize;

    let mut keyframes: Vec<Keyframe> = (0..count)
        .map(|k| {
            let position = k * last_position / (count - 1);
            let wave = first + k * (FAMILY_SIZE - 1 - first) / (count - 1);
            Keyframe::new(position as u8, WaveId((family * FAMILY_SIZE + wave) as u8))
        })
        .collect();

    if n % 5 == 0 {
        if let Some(terminal) = keyframes.last_mut() {
            terminal.wave = if n % 10 == 0 {
                WaveId::SQUARE
            } else {
                WaveId::SAW
            };
        }
    }

    WavetableDefinition::new(keyframes)
}
