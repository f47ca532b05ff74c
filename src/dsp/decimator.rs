#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

/*
Half-Band Decimation
====================

Oversampling renders the oscillator at 2x or 4x the output rate, so the
aliases produced by hard edges and fast wave-index sweeps land above the
output Nyquist where a filter can remove them. Decimation is the way back
down: lowpass at a quarter of the oversampled rate, keep every second sample.

The filter is a polyphase IIR half-band (hiir by Laurent de Soras): two
chains of first-order allpasses, one fed with even samples, one with odd.
Averaging the two chain outputs is the lowpass; doing it once per input
pair is the decimation, so no sample is ever computed and thrown away.

    x2 ──► [a0]──[a2]──[a4]──[a6] ──┐
                                    (+) × 0.5 ──► y
    x1 ──► [a1]──[a3]──[a5]──[a7] ──┘

Order 8, 69 dB stopband rejection, transition band 0.01 of the rate.

Each allpass section is

    out = (in - s[p + 2]) * c[p] + s[p]

where s[p] holds the section's previous input and s[p + 2] the previous
output (which is the next section's previous input). The last two slots
hold the chain outputs.
*/

const COEFFICIENTS: [f32; 8] = [
    0.077_115_08,
    0.265_968_53,
    0.482_070_62,
    0.665_104_15,
    0.796_820_5,
    0.884_101_5,
    0.941_251_4,
    0.982_005_4,
];

/// One 2:1 half-band decimation stage.
#[derive(Debug, Clone, Default)]
pub struct HalfBandDecimator {
    state: [f32; COEFFICIENTS.len() + 2],
}

impl HalfBandDecimator {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn reset(&mut self) {
        self.state = [0.0; COEFFICIENTS.len() + 2];
    }

    /// Consume two consecutive input samples, return one output sample.
    #[inline]
    pub fn process(&mut self, x1: f32, x2: f32) -> f32 {
        let s = &mut self.state;
        let mut a_in = x2;
        let mut b_in = x1;
        let mut a_out = 0.0;
        let mut b_out = 0.0;

        let mut p = 0;
        while p < COEFFICIENTS.len() {
            a_out = (a_in - s[p + 2]) * COEFFICIENTS[p] + s[p];
            s[p] = a_in;
            a_in = a_out;
            p += 1;

            b_out = (b_in - s[p + 2]) * COEFFICIENTS[p] + s[p];
            s[p] = b_in;
            b_in = b_out;
            p += 1;
        }
        s[p] = a_out;
        s[p + 1] = b_out;

        0.5 * (a_out + b_out)
    }

    pub fn state(&self) -> &[f32] {
        &self.state
    }
}

/// Oversampling factor of the oscillator.
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Oversampling {
    X1,
    #[default]
    X2,
    X4,
}

impl Oversampling {
    pub fn factor(self) -> usize {
        match self {
            Oversampling::X1 => 1,
            Oversampling::X2 => 2,
            Oversampling::X4 => 4,
        }
    }
}

/// Decimators for one oscillator at any oversampling factor.
///
/// X4 runs the inner stage on both input pairs, then the outer stage on the
/// two results (4 → 2 → 1).
#[derive(Debug, Clone, Default)]
pub struct DecimatorCascade {
    outer: HalfBandDecimator,
    inner: HalfBandDecimator,
}

impl DecimatorCascade {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn reset(&mut self) {
        self.outer.reset();
        self.inner.reset();
    }

    /// Reduce `factor` oversampled values to one output sample.
    #[inline]
    pub fn process(&mut self, mode: Oversampling, input: &[f32; 4]) -> f32 {
        match mode {
            Oversampling::X1 => input[0],
            Oversampling::X2 => self.outer.process(input[0], input[1]),
            Oversampling::X4 => {
                let y0 = self.inner.process(input[0], input[1]);
                let y1 = self.inner.process(input[2], input[3]);
                self.outer.process(y0, y1)
            }
        }
    }
}
