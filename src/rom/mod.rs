//! Wave fragments and wavetable definitions.
//!
//! The PPG Wave stores every waveform as 64 unsigned bytes describing the
//! first half of one cycle. The second half is rebuilt at playback by
//! mirroring the fragment in time and inverting it in amplitude, so a stored
//! wave is always odd-symmetric around the middle of the cycle.
//!
//! A wavetable is a sparse list of keyframes: `(position, wave)` pairs with
//! positions on a 0..=60 grid. Everything between two keyframes is a linear
//! crossfade of their waves. Tables 28 and 29 are synthetic (hard-sync and
//! step) and never read their definitions; table 30 is the "upper" wavetable
//! that the second half of the wave index sweeps through in reverse.

/// Fragment storage and keyframe validation.
pub mod bank;
/// Deterministic stand-in bank used when no ROM dump is loaded.
pub mod builtin;

pub use bank::{Keyframe, WaveBank, WavetableDefinition};

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

/// Number of stored wave fragments.
pub const NUM_WAVES: usize = 204;
/// Samples per fragment (half a cycle).
pub const FRAGMENT_LEN: usize = 64;
/// Wavetable definitions in a bank, including the synthetic and upper tables.
pub const NUM_WAVETABLES: usize = 31;
/// Hard-sync synthetic wavetable.
pub const WT_SYNC: u8 = 28;
/// Step synthetic wavetable.
pub const WT_STEP: u8 = 29;
/// Upper wavetable, swept in reverse over index positions 64..124.
pub const WT_UPPER: u8 = 30;
/// Last keyframe position of a wavetable.
pub const MAX_POSITION: u8 = 60;

/// Identifies a wave: a stored fragment, a standard analytic wave, or one of
/// the two synthetic generators.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct WaveId(pub u8);

impl WaveId {
    pub const TRIANGLE: WaveId = WaveId(NUM_WAVES as u8);
    pub const PULSE: WaveId = WaveId(NUM_WAVES as u8 + 1);
    pub const SQUARE: WaveId = WaveId(NUM_WAVES as u8 + 2);
    pub const SAW: WaveId = WaveId(NUM_WAVES as u8 + 3);
    pub const SYNC: WaveId = WaveId(NUM_WAVES as u8 + 4);
    pub const STEP: WaveId = WaveId(NUM_WAVES as u8 + 5);

    /// True for ids backed by a stored fragment.
    pub fn is_memory(self) -> bool {
        (self.0 as usize) < NUM_WAVES
    }

    pub fn standard(self) -> Option<StandardWave> {
        match self {
            Self::TRIANGLE => Some(StandardWave::Triangle),
            Self::PULSE => Some(StandardWave::Pulse),
            Self::SQUARE => Some(StandardWave::Square),
            Self::SAW => Some(StandardWave::Saw),
            _ => None,
        }
    }

    /// Whether this id may appear as a keyframe wave.
    pub fn is_keyframe_wave(self) -> bool {
        self.is_memory() || self.standard().is_some()
    }
}

/// Analytic waves that stand in for the PPG's computed table terminals.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub enum StandardWave {
    Triangle,
    Pulse,
    Square,
    Saw,
}

impl From<StandardWave> for WaveId {
    fn from(wave: StandardWave) -> Self {
        match wave {
            StandardWave::Triangle => WaveId::TRIANGLE,
            StandardWave::Pulse => WaveId::PULSE,
            StandardWave::Square => WaveId::SQUARE,
            StandardWave::Saw => WaveId::SAW,
        }
    }
}

/// Number of accumulator steps of the simulated hard-sync oscillator for wave
/// parameter `n` before the sync reset (bit 31) fires.
const fn sync_span(n: u32) -> u8 {
    let step = (1u32 << 24) + n * 1_441_792;
    let mut acc = 0u32;
    let mut count = 0u8;
    while acc & 0x8000_0000 == 0 {
        acc += step;
        count += 1;
    }
    count
}

/// Sync period, in wave positions, for every hard-sync parameter 0..=60.
pub const WT28_SPAN: [u8; MAX_POSITION as usize + 1] = {
    let mut table = [0u8; MAX_POSITION as usize + 1];
    let mut n = 0;
    while n < table.len() {
        table[n] = sync_span(n as u32);
        n += 1;
    }
    table
};
