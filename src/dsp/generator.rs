use crate::dsp::phase::{PhaseAccumulator, MASK_25, Q24TOF, Q25TOF};
use crate::dsp::polyblep::edge_residual;
use crate::dsp::wavetable::{ActiveWaves, WaveSource};
use crate::rom::{StandardWave, WaveBank, FRAGMENT_LEN, MAX_POSITION, WT28_SPAN};

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

/*
Sample Generation
=================

One call produces one (oversampled) sample: both active sources are
evaluated at the current phase, crossfaded by alpha, and the phase advances.

Stored bytes are centred on 127.5, so stored waves come out in
-127.5..127.5 and a byte and its complement cancel. The analytic waves are
already symmetric and get no offset.

Stored Waves
------------

A fragment holds positions 0..63. The rest of the cycle is the fragment
mirrored in time and inverted in amplitude:

    value(p) = f[p]                 p < 64
    value(p) = !f[63 - (p & 63)]    p >= 64

    byte
    255 ┤  ╭─╮
        │ ╭╯ ╰╮
    128 ┼─╯───╰╮────╭──  (cycle centre)
        │      ╰╮  ╭╯
      0 ┤       ╰──╯
        0      64     128   position

Reads interpolate linearly between p and p + 1 (wrapping at 128), or take
the byte as is in Nearest mode, which is the stair-stepped sound of the
original hardware.

Skew moves the mirror point: positions [0, b) are stretched over the first
half of the fragment cycle and [b, 128) over the second.

Standard Waves
--------------

    triangle  -96 → 96 → -96, corners at 0 and 64
    pulse     -64, jumping to 127 for the last 4 positions
    square    ±96, edges at 0 and 64, PolyBLEP on both
    saw       -64 + p, PolyBLEP at the wrap

Synthetic Waves
---------------

Hard sync folds the phase by a span that shrinks as the parameter rises,
ramping faster each time. It aliases on purpose, that is the sound.

Step is a ±32 square whose falling edge sits at 69 + n. At n >= 59 the
edge leaves the cycle and the output is a constant +32.
*/

/// How stored fragments are read between sample positions.
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Interpolation {
    #[default]
    Linear,
    /// Raw byte per position, no smoothing.
    Nearest,
}

/// Skew breakpoint that leaves the cycle unwarped (position 64).
pub const NO_SKEW: u32 = 64 << 25;

/// Midpoint of the unsigned byte range, `(0 + 255) / 2`.
const BYTE_CENTRE: f32 = 127.5;

const HALF_CYCLE: u64 = 1 << 31;
const FULL_CYCLE: u64 = 1 << 32;

pub struct WaveGenerator {
    phase: PhaseAccumulator,
    interpolation: Interpolation,
    skew: u32,
}

impl WaveGenerator {
    pub fn new() -> Self {
        Self {
            phase: PhaseAccumulator::new(),
            interpolation: Interpolation::Linear,
            skew: NO_SKEW,
        }
    }

    pub fn set_frequency(&mut self, frequency: f32, rate: f32) {
        self.phase.set_frequency(frequency, rate);
    }

    pub fn set_step_raw(&mut self, step: u32) {
        self.phase.set_step_raw(step);
    }

    pub fn reset(&mut self) {
        self.phase.reset();
    }

    pub fn set_interpolation(&mut self, interpolation: Interpolation) {
        self.interpolation = interpolation;
    }

    /// Mirror-point breakpoint in Q7.25, clamped to (0, 64].
    pub fn set_skew(&mut self, breakpoint: u32) {
        self.skew = breakpoint.clamp(1, NO_SKEW);
    }

    pub fn skew(&self) -> u32 {
        self.skew
    }

    pub fn phase(&self) -> &PhaseAccumulator {
        &self.phase
    }

    /// Produce one sample and advance the phase.
    #[inline]
    pub fn generate(&mut self, bank: &WaveBank, waves: &ActiveWaves) -> f32 {
        let lower = self.evaluate(bank, waves.lower);
        let y = if waves.alpha > 0.0 {
            let upper = self.evaluate(bank, waves.upper);
            (1.0 - waves.alpha) * lower + waves.alpha * upper
        } else {
            lower
        };
        self.phase.advance();
        y
    }

    #[inline]
    fn evaluate(&self, bank: &WaveBank, source: WaveSource) -> f32 {
        match source {
            WaveSource::Memory(id) => match bank.fragment(id) {
                Some(fragment) => memory_sample(fragment, self.warped_phase(), self.interpolation),
                None => 0.0,
            },
            WaveSource::Standard(wave) => self.standard_sample(wave),
            WaveSource::Sync(n) => sync_sample(self.phase.phase(), n),
            WaveSource::Step(n) => self.step_sample(n),
        }
    }

    #[inline]
    fn warped_phase(&self) -> u32 {
        let phase = self.phase.phase();
        if self.skew >= NO_SKEW {
            return phase;
        }
        let p = phase as u64;
        let b = self.skew as u64;
        let warped = if p < b {
            p * HALF_CYCLE / b
        } else {
            HALF_CYCLE + (p - b) * HALF_CYCLE / (FULL_CYCLE - b)
        };
        warped as u32
    }

    #[inline]
    fn blep(&self, pos: f32, edge: f32) -> f32 {
        edge_residual(
            pos,
            edge,
            self.phase.step_positions(),
            self.phase.recip_step(),
        )
    }

    fn standard_sample(&self, wave: StandardWave) -> f32 {
        let pos = self.phase.position();
        match wave {
            StandardWave::Triangle => {
                if pos < 64.0 {
                    -96.0 + 3.0 * pos
                } else {
                    96.0 - 3.0 * (pos - 64.0)
                }
            }
            StandardWave::Pulse => {
                if pos < 124.0 {
                    -64.0
                } else {
                    127.0
                }
            }
            StandardWave::Square => {
                let y = if pos < 64.0 { -96.0 } else { 96.0 };
                y + 96.0 * self.blep(pos, 64.0) - 96.0 * self.blep(pos, 0.0)
            }
            StandardWave::Saw => -64.0 + pos - 64.0 * self.blep(pos, 0.0),
        }
    }

    fn step_sample(&self, n: u8) -> f32 {
        let pos = self.phase.position();
        let edge = 69.0 + n.min(MAX_POSITION) as f32;
        if edge >= 128.0 {
            return 32.0;
        }
        let y = if pos < edge { 32.0 } else { -32.0 };
        y - 32.0 * self.blep(pos, edge) + 32.0 * self.blep(pos, 0.0)
    }
}

impl Default for WaveGenerator {
    fn default() -> Self {
        Self::new()
    }
}

/// Byte at a full-cycle position, rebuilt from the half-cycle fragment.
#[inline]
fn cycle_value(fragment: &[u8; FRAGMENT_LEN], pos: usize) -> u8 {
    if pos < FRAGMENT_LEN {
        fragment[pos]
    } else {
        !fragment[FRAGMENT_LEN - 1 - (pos & (FRAGMENT_LEN - 1))]
    }
}

#[inline]
fn memory_sample(fragment: &[u8; FRAGMENT_LEN], phase: u32, interpolation: Interpolation) -> f32 {
    let pos = (phase >> 25) as usize;
    let a = cycle_value(fragment, pos) as f32;
    match interpolation {
        Interpolation::Nearest => a - BYTE_CENTRE,
        Interpolation::Linear => {
            let alpha = (phase & MASK_25) as f32 * Q25TOF;
            let b = cycle_value(fragment, (pos + 1) & 127) as f32;
            (1.0 - alpha) * a + alpha * b - BYTE_CENTRE
        }
    }
}

#[inline]
fn sync_sample(phase: u32, n: u8) -> f32 {
    let n = n.min(MAX_POSITION);
    let span = (WT28_SPAN[n as usize] as u32) << 24;
    let pos = (phase >> 1) % span;
    (1.0 + n as f32 * 0.085_937_5) * pos as f32 * Q24TOF - 64.0
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::rom::WaveId;

    fn ramp_bank() -> WaveBank {
        let mut fragment = [0u8; 64];
        for (i, v) in fragment.iter_mut().enumerate() {
            *v = 128 + 2 * i as u8;
        }
        let waves = vec![fragment; 204];
        let tables = (0..31)
            .map(|_| crate::rom::WavetableDefinition::from_pairs(&[(0, 0), (60, 1)]))
            .collect();
        WaveBank::new(waves, tables).unwrap()
    }

    fn single(source: WaveSource) -> ActiveWaves {
        ActiveWaves {
            lower: source,
            upper: source,
            alpha: 0.0,
        }
    }

    /// One sample per integer position, starting at 0.
    fn one_cycle(gen: &mut WaveGenerator, bank: &WaveBank, waves: &ActiveWaves) -> Vec<f32> {
        gen.reset();
        gen.set_step_raw(1 << 25);
        (0..128).map(|_| gen.generate(bank, waves)).collect()
    }

    #[test]
    fn second_half_mirrors_and_inverts() {
        let bank = ramp_bank();
        let mut gen = WaveGenerator::new();
        let y = one_cycle(&mut gen, &bank, &single(WaveSource::Memory(WaveId(0))));

        assert_eq!(y[0], 0.5);
        assert_eq!(y[63], 126.5);
        for q in 0..64 {
            assert_eq!(y[64 + q] + y[63 - q], 0.0, "position {}", 64 + q);
        }
    }

    #[test]
    fn linear_interpolation_reads_between_bytes() {
        let bank = ramp_bank();
        let waves = single(WaveSource::Memory(WaveId(0)));
        let mut gen = WaveGenerator::new();
        gen.set_step_raw(1 << 24);
        let y: Vec<f32> = (0..4).map(|_| gen.generate(&bank, &waves)).collect();
        assert_eq!(y, vec![0.5, 1.5, 2.5, 3.5]);

        let mut nearest = WaveGenerator::new();
        nearest.set_interpolation(Interpolation::Nearest);
        nearest.set_step_raw(1 << 24);
        let y: Vec<f32> = (0..4).map(|_| nearest.generate(&bank, &waves)).collect();
        assert_eq!(y, vec![0.5, 0.5, 2.5, 2.5]);
    }

    #[test]
    fn last_position_wraps_to_first_byte() {
        let bank = ramp_bank();
        let waves = single(WaveSource::Memory(WaveId(0)));
        let mut gen = WaveGenerator::new();
        // start at 127.5
        gen.set_step_raw((127 << 25) + (1 << 24));
        gen.generate(&bank, &waves);
        let y = gen.generate(&bank, &waves);
        // halfway between !f[0] = 127 and f[0] = 128
        assert!(y.abs() < 1e-6, "got {}", y);
    }

    #[test]
    fn crossfade_weights_the_upper_wave() {
        let bank = ramp_bank();
        let mut gen = WaveGenerator::new();
        gen.set_step_raw(0);
        let half = ActiveWaves {
            lower: WaveSource::Memory(WaveId(0)),
            upper: WaveSource::Standard(StandardWave::Triangle),
            alpha: 0.5,
        };
        // memory 0.5, triangle -96.0 at position 0
        assert_eq!(gen.generate(&bank, &half), -47.75);

        let zero = ActiveWaves { alpha: 0.0, ..half };
        assert_eq!(gen.generate(&bank, &zero), 0.5);
    }

    #[test]
    fn polyblep_square_has_no_dc() {
        let bank = ramp_bank();
        let mut gen = WaveGenerator::new();
        gen.set_frequency(187.5, 48_000.0);
        let waves = single(WaveSource::Standard(StandardWave::Square));
        let samples: Vec<f32> = (0..256).map(|_| gen.generate(&bank, &waves)).collect();
        let mean = samples.iter().sum::<f32>() / samples.len() as f32;
        assert!(mean.abs() < 0.5, "square DC offset: {}", mean);
        assert!(samples.iter().all(|y| y.abs() <= 96.0));
    }

    #[test]
    fn polyblep_corrects_only_within_one_step() {
        let bank = ramp_bank();
        let waves = single(WaveSource::Standard(StandardWave::Square));

        // 4 samples per position, the edge at 64 lands on a sample
        let mut gen = WaveGenerator::new();
        gen.set_step_raw(1 << 23);
        let samples: Vec<f32> = (0..512).map(|_| gen.generate(&bank, &waves)).collect();
        assert_eq!(samples[256], 0.0);
        assert_eq!(samples[255], -96.0);
        assert_eq!(samples[257], 96.0);

        // 0.3 positions per sample, the edge falls between 63.9 and 64.2
        let mut gen = WaveGenerator::new();
        gen.set_frequency(112.5, 48_000.0);
        let samples: Vec<f32> = (0..300).map(|_| gen.generate(&bank, &waves)).collect();
        assert!(samples[213] > -96.0 && samples[213] < 0.0, "{}", samples[213]);
        assert!(samples[214] > 0.0 && samples[214] < 96.0, "{}", samples[214]);
        assert_eq!(samples[150], -96.0);
    }

    #[test]
    fn saw_wrap_is_corrected() {
        let bank = ramp_bank();
        let waves = single(WaveSource::Standard(StandardWave::Saw));

        // 4 samples per position, the wrap lands on a sample
        let mut gen = WaveGenerator::new();
        gen.set_step_raw(1 << 23);
        let samples: Vec<f32> = (0..520).map(|_| gen.generate(&bank, &waves)).collect();
        assert_eq!(samples[0], 0.0);
        assert_eq!(samples[512], 0.0);
        assert_eq!(samples[511], 63.75);
        assert_eq!(samples[513], -63.75);

        // 0.3 positions per sample, the wrap falls between 127.8 and 0.1
        let mut gen = WaveGenerator::new();
        gen.set_frequency(112.5, 48_000.0);
        let samples: Vec<f32> = (0..430).map(|_| gen.generate(&bank, &waves)).collect();
        assert!((samples[425] - 63.5).abs() < 0.01, "{}", samples[425]);
        assert!(samples[426] > 0.0 && samples[426] < 60.0, "{}", samples[426]);
        assert!(samples[427] > -60.0 && samples[427] < 0.0, "{}", samples[427]);
    }

    #[test]
    fn step_edges_are_corrected() {
        let bank = ramp_bank();
        // falling edge at 79
        let waves = single(WaveSource::Step(10));

        let mut gen = WaveGenerator::new();
        gen.set_step_raw(1 << 23);
        let samples: Vec<f32> = (0..520).map(|_| gen.generate(&bank, &waves)).collect();
        assert_eq!(samples[315], 32.0);
        assert_eq!(samples[316], 0.0);
        assert_eq!(samples[317], -32.0);
        assert_eq!(samples[511], -32.0);
        assert_eq!(samples[512], 0.0);
        assert_eq!(samples[513], 32.0);

        // 0.3 positions per sample, the edge falls between 78.9 and 79.2
        let mut gen = WaveGenerator::new();
        gen.set_frequency(112.5, 48_000.0);
        let samples: Vec<f32> = (0..300).map(|_| gen.generate(&bank, &waves)).collect();
        assert_eq!(samples[200], 32.0);
        assert!(samples[263] > 0.0 && samples[263] < 32.0, "{}", samples[263]);
        assert!(samples[264] > -32.0 && samples[264] < 0.0, "{}", samples[264]);
    }

    #[test]
    fn triangle_is_continuous() {
        let bank = ramp_bank();
        let mut gen = WaveGenerator::new();
        gen.set_frequency(440.0, 96_000.0);
        let waves = single(WaveSource::Standard(StandardWave::Triangle));
        let step = gen.phase().step_positions();
        let mut last = gen.generate(&bank, &waves);
        for _ in 0..2_000 {
            let y = gen.generate(&bank, &waves);
            assert!((y - last).abs() <= 3.0 * step + 1e-3);
            last = y;
        }
    }

    #[test]
    fn sync_zero_is_a_plain_ramp() {
        let bank = ramp_bank();
        let mut gen = WaveGenerator::new();
        let y = one_cycle(&mut gen, &bank, &single(WaveSource::Sync(0)));
        for (p, v) in y.iter().enumerate() {
            assert!((v - (p as f32 - 64.0)).abs() < 1e-4);
        }
    }

    #[test]
    fn sync_resets_within_span() {
        let bank = ramp_bank();
        let mut gen = WaveGenerator::new();
        let y = one_cycle(&mut gen, &bank, &single(WaveSource::Sync(60)));
        // span 21: position 21 restarts the ramp
        assert_eq!(y[21], -64.0);
        assert!(y[20] > y[19]);
    }

    #[test]
    fn step_edge_follows_parameter() {
        let bank = ramp_bank();
        let mut gen = WaveGenerator::new();
        let y = one_cycle(&mut gen, &bank, &single(WaveSource::Step(10)));
        assert_eq!(y[40], 32.0);
        assert_eq!(y[78], 32.0);
        assert_eq!(y[80], -32.0);

        let y = one_cycle(&mut gen, &bank, &single(WaveSource::Step(60)));
        assert!(y.iter().all(|&v| v == 32.0));
    }

    #[test]
    fn skew_moves_the_mirror_point() {
        let bank = ramp_bank();
        let waves = single(WaveSource::Memory(WaveId(0)));
        let plain = {
            let mut gen = WaveGenerator::new();
            one_cycle(&mut gen, &bank, &waves)
        };
        let mut gen = WaveGenerator::new();
        gen.set_skew(32 << 25);
        let skewed = one_cycle(&mut gen, &bank, &waves);

        assert_eq!(skewed[16], plain[32]);
        assert_eq!(skewed[32], plain[64]);
        assert_eq!(skewed[80], plain[96]);
    }
}
