//! Host parameters and their mapping onto internal units.
//!
//! Values arrive as plain integers in host units and are clamped to each
//! parameter's range before mapping. The envelope and LFO tables are part of
//! the patch format: a stored value must produce the same rate everywhere.

use std::ops::RangeInclusive;

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Param {
    /// 0..=95. Wraps mod 61; 30 and above disables the upper table.
    Wavetable,
    /// 0..=1023 over wave positions 0..61.
    WaveIndex,
    /// -1..=1023. Enables a second oscillator layer; -1 turns it off.
    SecondaryWaveIndex,
    /// 0..=100 through `ENV_LUT`.
    EnvAttack,
    /// -99..=100. Zero and above: attack, LFO, release on note off.
    /// Negative: attack then decay.
    EnvDecay,
    /// -99..=100. Zero is no envelope modulation.
    EnvAmount,
    /// 0..=100 through `LFO_LUT`.
    LfoRate,
    /// 0..=100.
    LfoAmount,
    /// 0..=1023. Moves the mirror point from position 64 towards 0.
    Skew,
}

impl Param {
    pub const ALL: [Param; 9] = [
        Param::Wavetable,
        Param::WaveIndex,
        Param::SecondaryWaveIndex,
        Param::EnvAttack,
        Param::EnvDecay,
        Param::EnvAmount,
        Param::LfoRate,
        Param::LfoAmount,
        Param::Skew,
    ];

    pub fn range(self) -> RangeInclusive<i32> {
        match self {
            Param::Wavetable => 0..=95,
            Param::WaveIndex => 0..=1023,
            Param::SecondaryWaveIndex => -1..=1023,
            Param::EnvAttack => 0..=100,
            Param::EnvDecay => -99..=100,
            Param::EnvAmount => -99..=100,
            Param::LfoRate => 0..=100,
            Param::LfoAmount => 0..=100,
            Param::Skew => 0..=1023,
        }
    }

    pub fn default_value(self) -> i32 {
        match self {
            Param::SecondaryWaveIndex => -1,
            _ => 0,
        }
    }

    pub fn clamp(self, value: i32) -> i32 {
        let range = self.range();
        value.clamp(*range.start(), *range.end())
    }

    pub fn name(self) -> &'static str {
        match self {
            Param::Wavetable => "wavetable",
            Param::WaveIndex => "wave",
            Param::SecondaryWaveIndex => "wave 2",
            Param::EnvAttack => "env attack",
            Param::EnvDecay => "env decay",
            Param::EnvAmount => "env amount",
            Param::LfoRate => "lfo rate",
            Param::LfoAmount => "lfo amount",
            Param::Skew => "skew",
        }
    }
}

/// Envelope parameter 0..=100 to UQ1.31 rate per sample at 48 kHz.
/// `tau = 0.1 * exp(0.046 * par)` seconds; 0 is instantaneous.
pub const ENV_LUT: [u32; 101] = [
    0x80000000, 0x6850f, 0x63a05, 0x5f25b, 0x5adea, 0x56c8c, 0x52e1f, 0x4f280, 0x4b990,
    0x4832f, 0x44f40, 0x41da6, 0x3ee47, 0x3c10a, 0x395d5, 0x36c91, 0x34529, 0x31f86, 0x2fb94,
    0x2d940, 0x2b876, 0x29927, 0x27b3f, 0x25eb0, 0x24369, 0x2295d, 0x2107c, 0x1f8ba, 0x1e209,
    0x1cc5d, 0x1b7aa, 0x1a3e6, 0x19105, 0x17efe, 0x16dc6, 0x15d54, 0x14da0, 0x13ea0, 0x1304d,
    0x1229f, 0x1158e, 0x10913, 0xfd28, 0xf1c7, 0xe6e8, 0xdc87, 0xd29c, 0xc924, 0xc019, 0xb777,
    0xaf37, 0xa756, 0x9fd1, 0x98a1, 0x91c5, 0x8b37, 0x84f5, 0x7efa, 0x7945, 0x73d1, 0x6e9c,
    0x69a3, 0x64e3, 0x605a, 0x5c05, 0x57e2, 0x53ef, 0x5029, 0x4c8e, 0x491d, 0x45d4, 0x42b0,
    0x3fb0, 0x3cd3, 0x3a17, 0x377b, 0x34fc, 0x329a, 0x3054, 0x2e28, 0x2c15, 0x2a19, 0x2835,
    0x2666, 0x24ac, 0x2306, 0x2173, 0x1ff2, 0x1e82, 0x1d23, 0x1bd4, 0x1a93, 0x1962, 0x183e,
    0x1727, 0x161c, 0x151e, 0x142b, 0x1342, 0x1265, 0x1191,
];

/// LFO parameter 0..=100 to phase increment per sample at 48 kHz.
/// 0 stops the LFO, 50 is 2 s per cycle, 100 is about 20 Hz.
pub const LFO_LUT: [u32; 101] = [
    0x0, 0x3ed, 0x807, 0xc50, 0x10cb, 0x1579, 0x1a5d, 0x1f79, 0x24d0, 0x2a64, 0x3039, 0x3650,
    0x3cae, 0x4354, 0x4a48, 0x518b, 0x5922, 0x6110, 0x6959, 0x7201, 0x7b0d, 0x8482, 0x8e62,
    0x98b5, 0xa37e, 0xaec3, 0xba8a, 0xc6d8, 0xd3b4, 0xe124, 0xef2e, 0xfdda, 0x10d2e, 0x11d33,
    0x12df0, 0x13f6d, 0x151b4, 0x164cc, 0x178c1, 0x18d9a, 0x1a364, 0x1ba28, 0x1d1f2, 0x1eace,
    0x204c7, 0x21fec, 0x23c48, 0x259eb, 0x278e2, 0x2993d, 0x2bb0d, 0x2de61, 0x3034c, 0x329e0,
    0x3522f, 0x37c4d, 0x3a850, 0x3d64d, 0x4065b, 0x43892, 0x46d0a, 0x4a3de, 0x4dd28, 0x51905,
    0x55792, 0x598ef, 0x5dd3c, 0x6249a, 0x66f2d, 0x6bd19, 0x70e86, 0x7639b, 0x7bc83, 0x81969,
    0x87a7b, 0x8dfea, 0x949e8, 0x9b8a8, 0xa2c62, 0xaa54f, 0xb23ab, 0xba7b4, 0xc31ab, 0xcc1d5,
    0xd5879, 0xdf5e2, 0xe9a5d, 0xf463b, 0xff9d2, 0x10b57b, 0x117991, 0x124677, 0x131c91,
    0x13fc4a, 0x14e60f, 0x15da55, 0x16d995, 0x17e44c, 0x18fafe, 0x1a1e35, 0x1b4e82,
];

/// Rate the lookup tables were computed for.
pub const LUT_SAMPLE_RATE: f32 = 48_000.0;

/// Scale a per-sample table rate to another sample rate so times in seconds
/// stay put. Exact at 48 kHz.
pub fn rescale(rate: u32, sample_rate: f32) -> u32 {
    if sample_rate == LUT_SAMPLE_RATE || sample_rate.is_nan() || sample_rate <= 0.0 {
        return rate;
    }
    let scaled = (rate as f64 * LUT_SAMPLE_RATE as f64 / sample_rate as f64).round();
    scaled.min(u32::MAX as f64) as u32
}

/// Modulation output (Q7.24, ±100 units full scale) to a Q7.25 index offset.
/// One unit is 0.64 positions, so 100 sweeps a 64-position half.
#[inline]
pub fn modulation_to_index(out: i32) -> i64 {
    out as i64 * 128 / 100
}

/// Wave index parameter to Q7.25, `v * 61 / 1024` positions.
pub fn wave_index(value: i32) -> u32 {
    Param::WaveIndex.clamp(value) as u32 * 61 * (1 << 15)
}

/// Skew parameter to a Q7.25 mirror breakpoint, `64 - v / 16` positions.
pub fn skew_breakpoint(value: i32) -> u32 {
    (1024 - Param::Skew.clamp(value) as u32) << 21
}

pub fn attack_rate(value: i32) -> u32 {
    ENV_LUT[Param::EnvAttack.clamp(value) as usize]
}

/// Decay parameter to `(rate, hold)`.
pub fn decay_setting(value: i32) -> (u32, bool) {
    let value = Param::EnvDecay.clamp(value);
    (ENV_LUT[value.unsigned_abs() as usize], value >= 0)
}

pub fn lfo_rate(value: i32) -> u32 {
    LFO_LUT[Param::LfoRate.clamp(value) as usize]
}
