//! Low-level DSP primitives of the wavetable oscillator.
//!
//! These components are allocation-free and realtime-safe, making them safe to
//! embed directly inside a voice. They stay focused on the signal-processing
//! math; the voice in `synth` layers parameter handling and block scheduling on
//! top.

/// Polyphase half-band decimation for 2x/4x oversampling.
pub mod decimator;
/// Attack/decay envelope with a triangle LFO sustain.
pub mod envlfo;
/// Per-sample wave evaluation and crossfading.
pub mod generator;
/// Q7.25 phase accumulator.
pub mod phase;
/// Band-limited step residuals.
pub mod polyblep;
/// Wavetable slot tables and wave index resolution.
pub mod wavetable;

pub use decimator::{DecimatorCascade, HalfBandDecimator, Oversampling};
pub use envlfo::{EnvLfo, ModStage};
pub use generator::{Interpolation, WaveGenerator};
pub use phase::PhaseAccumulator;
pub use wavetable::{ActiveWaves, ResolvedWaveSlot, WaveSource, WavetableResolver};
