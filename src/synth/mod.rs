// Purpose: Voice engine, host parameters and control messages
// This layer sits above the dsp primitives and owns one complete oscillator

pub mod message;
pub mod params;
pub mod voice;

pub use message::{MessageReceiver, VoiceMessage};
pub use voice::{ModulationRate, VoiceConfig, WaveVoice};
