//! PpgWave - application builder and audio runner

use color_eyre::eyre::{eyre, Result as EyreResult, WrapErr};
use cpal::traits::{DeviceTrait, HostTrait, StreamTrait};
use rtrb::RingBuffer;
use std::sync::Arc;

use ppg_wave::{
    dsp::Oversampling,
    synth::{ModulationRate, VoiceMessage},
    Param, VoiceConfig, WaveBank, WaveVoice, MAX_BLOCK_SIZE,
};

use super::ui::{PatchState, UiApp, VIS_BUFFER_SIZE};

/// Control messages that may queue up between two audio callbacks
const CONTROL_CAPACITY: usize = 256;

/// Headroom for the decimator ringing above full scale
const OUTPUT_GAIN: f32 = 0.5;

/// Main application builder
pub struct PpgWave {
    oversampling: Oversampling,
    modulation_rate: ModulationRate,
    patch: PatchState,
}

impl PpgWave {
    pub fn new() -> Self {
        Self {
            oversampling: Oversampling::default(),
            modulation_rate: ModulationRate::default(),
            patch: PatchState::new(),
        }
    }

    pub fn oversampling(mut self, oversampling: Oversampling) -> Self {
        self.oversampling = oversampling;
        self
    }

    pub fn modulation_rate(mut self, modulation_rate: ModulationRate) -> Self {
        self.modulation_rate = modulation_rate;
        self
    }

    /// Set an initial parameter value in host units
    pub fn param(mut self, param: Param, value: i32) -> Self {
        self.patch.set(param, value);
        self
    }

    /// Run the application (takes over the terminal, plays audio)
    pub fn run(self) -> EyreResult<()> {
        let host = cpal::default_host();
        let device = host
            .default_output_device()
            .ok_or_else(|| eyre!("no default output device available"))?;
        let config = device
            .default_output_config()
            .wrap_err("failed to fetch default output config")?;

        let sample_rate = config.sample_rate().0 as f32;
        let channels = config.channels() as usize;
        tracing::info!(sample_rate, channels, "audio device ready");

        let voice_config = VoiceConfig::new(sample_rate)
            .with_oversampling(self.oversampling)
            .with_modulation_rate(self.modulation_rate);
        let mut voice = WaveVoice::new(Arc::new(WaveBank::builtin()), voice_config);
        for (param, value) in self.patch.values() {
            voice.set_parameter(param, value);
        }

        let (control_tx, mut control_rx) = RingBuffer::<VoiceMessage>::new(CONTROL_CAPACITY);
        let (mut scope_tx, scope_rx) = RingBuffer::<f32>::new(VIS_BUFFER_SIZE * 4);
        let mut render_buf = vec![0.0f32; MAX_BLOCK_SIZE];

        let stream = device.build_output_stream(
            &config.into(),
            move |data: &mut [f32], _| {
                voice.process_messages(&mut control_rx);

                let total_frames = data.len() / channels;
                let mut frames_written = 0;
                while frames_written < total_frames {
                    let frames_to_render = (total_frames - frames_written).min(MAX_BLOCK_SIZE);
                    let block = &mut render_buf[..frames_to_render];
                    voice.render(block);

                    // Copy to output (mono to all channels)
                    let out_off = frames_written * channels;
                    for (i, &s) in block.iter().enumerate() {
                        let s = s * OUTPUT_GAIN;
                        for ch in 0..channels {
                            data[out_off + i * channels + ch] = s;
                        }
                        // The scope only needs recent samples, drop when full
                        let _ = scope_tx.push(s);
                    }

                    frames_written += frames_to_render;
                }
            },
            |err| tracing::error!(%err, "audio stream error"),
            None,
        )?;
        stream.play()?;

        let mut terminal = ratatui::init();
        let result = UiApp::new(control_tx, scope_rx, self.patch, voice_config).run(&mut terminal);
        ratatui::restore();
        result
    }
}

impl Default for PpgWave {
    fn default() -> Self {
        Self::new()
    }
}
