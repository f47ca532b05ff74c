pub mod dsp; // Oscillator, modulation and resampling primitives
pub mod error;
pub mod graph; // Graph node integration
pub mod io;
pub mod rom; // Wave and wavetable data
pub mod synth; // Voice engine and host parameters

pub use error::BankError;
pub use rom::{WaveBank, WaveId, WavetableDefinition};
pub use synth::params::Param;
pub use synth::voice::{VoiceConfig, WaveVoice};

pub const MAX_BLOCK_SIZE: usize = 2048;
pub const DEFAULT_SAMPLE_RATE: f32 = 48_000.0;
pub(crate) const MIN_TIME: f32 = 1e-6;
