use std::sync::Arc;

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

use crate::dsp::{
    DecimatorCascade, EnvLfo, Interpolation, ModStage, Oversampling, WaveGenerator,
    WavetableResolver,
};
use crate::graph::node::{GraphNode, RenderCtx};
use crate::io::converter::{pitch_to_freq, to_normalized, to_q31};
use crate::rom::WaveBank;
use crate::synth::message::{MessageReceiver, VoiceMessage};
use crate::synth::params::{self, Param};
use crate::DEFAULT_SAMPLE_RATE;

/// Samples between modulation updates in `PerBlock` mode. Host buffers are
/// split at this size so the modulation curve does not depend on them.
pub const CONTROL_BLOCK: usize = 32;

/// How often the envelope/LFO is evaluated.
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ModulationRate {
    /// One modulator step per output sample.
    PerSample,
    /// One modulator update per control block, ramped linearly across it.
    #[default]
    PerBlock,
}

#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct VoiceConfig {
    pub sample_rate: f32,
    pub oversampling: Oversampling,
    pub modulation_rate: ModulationRate,
    pub interpolation: Interpolation,
}

impl Default for VoiceConfig {
    fn default() -> Self {
        Self {
            sample_rate: DEFAULT_SAMPLE_RATE,
            oversampling: Oversampling::X2,
            modulation_rate: ModulationRate::PerBlock,
            interpolation: Interpolation::Linear,
        }
    }
}

impl VoiceConfig {
    pub fn new(sample_rate: f32) -> Self {
        Self {
            sample_rate,
            ..Self::default()
        }
    }

    pub fn with_oversampling(mut self, oversampling: Oversampling) -> Self {
        self.oversampling = oversampling;
        self
    }

    pub fn with_modulation_rate(mut self, modulation_rate: ModulationRate) -> Self {
        self.modulation_rate = modulation_rate;
        self
    }

    pub fn with_interpolation(mut self, interpolation: Interpolation) -> Self {
        self.interpolation = interpolation;
        self
    }
}

/// One oscillator: wave lookup, oversampled generation and decimation.
struct Layer {
    resolver: WavetableResolver,
    generator: WaveGenerator,
    decimator: DecimatorCascade,
}

impl Layer {
    fn new(bank: Arc<WaveBank>, interpolation: Interpolation) -> Self {
        let mut generator = WaveGenerator::new();
        generator.set_interpolation(interpolation);
        Self {
            resolver: WavetableResolver::new(bank),
            generator,
            decimator: DecimatorCascade::new(),
        }
    }

    fn reset(&mut self) {
        self.generator.reset();
        self.decimator.reset();
    }

    #[inline]
    fn tick(&mut self, index: u32, mode: Oversampling) -> f32 {
        self.resolver.set_wave_index(index);
        let bank = self.resolver.bank();
        let waves = self.resolver.active();
        let mut sub = [0.0f32; 4];
        for s in sub.iter_mut().take(mode.factor()) {
            *s = self.generator.generate(bank, waves);
        }
        self.decimator.process(mode, &sub)
    }
}

/// A monophonic PPG-style wavetable voice.
///
/// The wave index is the sum of the `WaveIndex` parameter and the internal
/// envelope/LFO, wrapped around the 128-position cycle. With
/// `SecondaryWaveIndex` set, a second oscillator at the same pitch reads the
/// same wavetable from its own base index and the two are averaged.
///
/// Everything is allocated in [`WaveVoice::new`]; rendering never allocates
/// or locks.
pub struct WaveVoice {
    config: VoiceConfig,
    primary: Layer,
    secondary: Layer,
    modulator: EnvLfo,

    pitch: Option<u16>,
    frequency: f32,
    wavetable: u8,
    base_index: u32,
    secondary_index: Option<u32>,

    // Applied on note on.
    attack_rate: u32,
    decay_rate: u32,
    hold: bool,

    /// Last applied modulation offset, Q7.25.
    modulation: i64,
    gate: bool,

    #[cfg(test)]
    index_trace: Vec<u32>,
}

impl WaveVoice {
    pub fn new(bank: Arc<WaveBank>, config: VoiceConfig) -> Self {
        tracing::debug!(
            sample_rate = config.sample_rate,
            oversampling = ?config.oversampling,
            modulation_rate = ?config.modulation_rate,
            interpolation = ?config.interpolation,
            "wave voice created"
        );

        let (decay_rate, hold) = params::decay_setting(Param::EnvDecay.default_value());
        let mut voice = Self {
            config,
            primary: Layer::new(Arc::clone(&bank), config.interpolation),
            secondary: Layer::new(bank, config.interpolation),
            modulator: EnvLfo::new(config.sample_rate),
            pitch: None,
            frequency: 0.0,
            wavetable: 0,
            base_index: 0,
            secondary_index: None,
            attack_rate: params::rescale(
                params::attack_rate(Param::EnvAttack.default_value()),
                config.sample_rate,
            ),
            decay_rate: params::rescale(decay_rate, config.sample_rate),
            hold,
            modulation: 0,
            gate: false,
            #[cfg(test)]
            index_trace: Vec::new(),
        };
        voice.update_frequency(69 << 8);
        voice
    }

    pub fn config(&self) -> &VoiceConfig {
        &self.config
    }

    /// Start a note at a UQ8.8 pitch.
    pub fn note_on(&mut self, pitch: u16) {
        self.update_frequency(pitch);

        self.primary.reset();
        self.secondary.reset();
        self.apply_wavetable();

        self.modulator.set_attack_rate(self.attack_rate);
        self.modulator.set_decay_rate(self.decay_rate);
        self.modulator.set_hold(self.hold);
        self.modulator.note_on();
        self.modulation = 0;
        self.gate = true;

        tracing::trace!(pitch, frequency = self.frequency, "note on");
    }

    /// Release the modulator. The oscillator keeps running.
    pub fn note_off(&mut self) {
        self.modulator.note_off();
        self.gate = false;
        tracing::trace!("note off");
    }

    /// Change pitch without retriggering.
    pub fn set_pitch(&mut self, pitch: u16) {
        self.update_frequency(pitch);
    }

    pub fn set_parameter(&mut self, param: Param, value: i32) {
        let value = param.clamp(value);
        let sample_rate = self.config.sample_rate;
        match param {
            Param::Wavetable => self.wavetable = value as u8,
            Param::WaveIndex => self.base_index = params::wave_index(value),
            Param::SecondaryWaveIndex => {
                let index = (value >= 0).then(|| params::wave_index(value));
                if index.is_some() && self.secondary_index.is_none() {
                    self.secondary.reset();
                }
                self.secondary_index = index;
            }
            Param::EnvAttack => {
                self.attack_rate = params::rescale(params::attack_rate(value), sample_rate);
            }
            Param::EnvDecay => {
                let (rate, hold) = params::decay_setting(value);
                self.decay_rate = params::rescale(rate, sample_rate);
                self.hold = hold;
            }
            Param::EnvAmount => self.modulator.set_env_amount(value),
            Param::LfoRate => self
                .modulator
                .set_lfo_rate(params::rescale(params::lfo_rate(value), sample_rate)),
            Param::LfoAmount => self.modulator.set_lfo_amount(value),
            Param::Skew => {
                let breakpoint = params::skew_breakpoint(value);
                self.primary.generator.set_skew(breakpoint);
                self.secondary.generator.set_skew(breakpoint);
            }
        }
    }

    /// Drain pending control messages. Call between blocks.
    pub fn process_messages<R: MessageReceiver>(&mut self, rx: &mut R) {
        while let Some(msg) = rx.pop() {
            match msg {
                VoiceMessage::NoteOn { pitch } => self.note_on(pitch),
                VoiceMessage::NoteOff => self.note_off(),
                VoiceMessage::SetPitch { pitch } => self.set_pitch(pitch),
                VoiceMessage::SetParam { param, value } => self.set_parameter(param, value),
            }
        }
    }

    /// Render normalized samples, ±1.0 at the fragment byte range.
    pub fn render(&mut self, out: &mut [f32]) {
        self.render_with(out, to_normalized);
    }

    /// Render Q31 samples with the hardware output scaling.
    pub fn render_q31(&mut self, out: &mut [i32]) {
        self.render_with(out, to_q31);
    }

    /// True while the note is held or the modulator is still moving.
    pub fn is_active(&self) -> bool {
        self.gate || matches!(self.modulator.stage(), ModStage::Attack | ModStage::Decay)
    }

    pub fn modulator(&self) -> &EnvLfo {
        &self.modulator
    }

    /// Current primary wave index in Q7.25, modulation included.
    pub fn wave_index(&self) -> u32 {
        self.primary.resolver.index()
    }

    /// Loaded wavetable and whether its upper half is in use.
    pub fn wavetable(&self) -> (u8, bool) {
        self.primary.resolver.table()
    }

    pub fn frequency(&self) -> f32 {
        self.frequency
    }

    pub fn pitch(&self) -> Option<u16> {
        self.pitch
    }

    fn update_frequency(&mut self, pitch: u16) {
        if self.pitch == Some(pitch) {
            return;
        }
        self.frequency = pitch_to_freq(pitch);
        let rate = self.config.sample_rate * self.config.oversampling.factor() as f32;
        self.primary.generator.set_frequency(self.frequency, rate);
        self.secondary.generator.set_frequency(self.frequency, rate);
        self.pitch = Some(pitch);
    }

    fn apply_wavetable(&mut self) {
        self.primary.resolver.select_wavetable(self.wavetable);
        self.secondary.resolver.select_wavetable(self.wavetable);
    }

    fn render_with<T>(&mut self, out: &mut [T], convert: impl Fn(f32) -> T) {
        self.apply_wavetable();
        for chunk in out.chunks_mut(CONTROL_BLOCK) {
            self.render_chunk(chunk, &convert);
        }
    }

    fn render_chunk<T>(&mut self, out: &mut [T], convert: &impl Fn(f32) -> T) {
        match self.config.modulation_rate {
            ModulationRate::PerSample => {
                for o in out.iter_mut() {
                    let modulation = params::modulation_to_index(self.modulator.advance(1));
                    *o = convert(self.tick(modulation));
                }
                self.modulation = params::modulation_to_index(self.modulator.output());
            }
            ModulationRate::PerBlock => {
                let n = out.len();
                let target = params::modulation_to_index(self.modulator.advance(n as u32));
                let increment = ramp_increment(target - self.modulation, n);
                let mut modulation = self.modulation;
                for (i, o) in out.iter_mut().enumerate() {
                    modulation = if i + 1 == n {
                        target
                    } else {
                        modulation + increment
                    };
                    *o = convert(self.tick(modulation));
                }
                self.modulation = target;
            }
        }
    }

    #[inline]
    fn tick(&mut self, modulation: i64) -> f32 {
        let mode = self.config.oversampling;
        let index = wrap_index(self.base_index, modulation);
        #[cfg(test)]
        self.index_trace.push(index);
        let y = self.primary.tick(index, mode);
        match self.secondary_index {
            Some(base) => 0.5 * (y + self.secondary.tick(wrap_index(base, modulation), mode)),
            None => y,
        }
    }
}

/// Base index plus modulation, wrapped to the 128-position cycle.
#[inline]
fn wrap_index(base: u32, modulation: i64) -> u32 {
    (base as i64).wrapping_add(modulation) as u32
}

/// Per-sample step of a linear ramp covering `delta` over `n` samples.
#[inline]
fn ramp_increment(delta: i64, n: usize) -> i64 {
    if n.is_power_of_two() {
        delta >> n.trailing_zeros()
    } else {
        delta / n.max(1) as i64
    }
}

impl GraphNode for WaveVoice {
    fn render_block(&mut self, out: &mut [f32], _ctx: &RenderCtx) {
        self.render(out);
    }

    fn note_on(&mut self, ctx: &RenderCtx) {
        WaveVoice::note_on(self, ctx.pitch);
    }

    fn note_off(&mut self, _ctx: &RenderCtx) {
        WaveVoice::note_off(self);
    }

    fn get_envelope_level(&self) -> Option<f32> {
        Some(self.modulator.level())
    }

    fn is_active(&self) -> bool {
        WaveVoice::is_active(self)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::io::converter::to_q31;

    fn voice(config: VoiceConfig) -> WaveVoice {
        WaveVoice::new(Arc::new(WaveBank::builtin()), config)
    }

    fn rendered(v: &mut WaveVoice, len: usize) -> Vec<f32> {
        let mut out = vec![0.0; len];
        v.render(&mut out);
        out
    }

    #[test]
    fn empty_block_is_fine() {
        let mut v = voice(VoiceConfig::default());
        v.note_on(60 << 8);
        v.render(&mut []);
        v.render_q31(&mut []);
        assert!(v.is_active());
    }

    #[test]
    fn note_produces_bounded_audio() {
        for oversampling in [Oversampling::X1, Oversampling::X2, Oversampling::X4] {
            let mut v = voice(VoiceConfig::default().with_oversampling(oversampling));
            v.note_on(57 << 8);
            let out = rendered(&mut v, 1000);
            assert!(out.iter().all(|y| y.is_finite() && y.abs() < 1.2));
            let peak = out.iter().fold(0.0f32, |m, y| m.max(y.abs()));
            assert!(peak > 0.1, "{:?} peak {}", oversampling, peak);
        }
    }

    #[test]
    fn odd_block_lengths_match_one_long_block_without_modulation() {
        let mut a = voice(VoiceConfig::default());
        let mut b = voice(VoiceConfig::default());
        a.note_on(64 << 8);
        b.note_on(64 << 8);

        let long = rendered(&mut a, 300);
        let mut split = rendered(&mut b, 7);
        split.extend(rendered(&mut b, 100));
        split.extend(rendered(&mut b, 193));
        assert_eq!(long, split);
    }

    #[test]
    fn control_blocks_make_output_independent_of_buffer_size() {
        let setup = |v: &mut WaveVoice| {
            v.set_parameter(Param::EnvAttack, 10);
            v.set_parameter(Param::EnvAmount, 80);
            v.note_on(60 << 8);
        };
        let mut a = voice(VoiceConfig::default());
        let mut b = voice(VoiceConfig::default());
        setup(&mut a);
        setup(&mut b);

        let long = rendered(&mut a, 256);
        let mut split = Vec::new();
        for _ in 0..4 {
            split.extend(rendered(&mut b, 64));
        }
        assert_eq!(long, split);
    }

    #[test]
    fn per_sample_and_per_block_agree_without_modulation() {
        let mut a = voice(VoiceConfig::default().with_modulation_rate(ModulationRate::PerSample));
        let mut b = voice(VoiceConfig::default());
        a.note_on(62 << 8);
        b.note_on(62 << 8);
        assert_eq!(rendered(&mut a, 200), rendered(&mut b, 200));
    }

    #[test]
    fn block_modulation_lands_on_the_modulator_output() {
        let mut v = voice(VoiceConfig::default());
        v.set_parameter(Param::WaveIndex, 100);
        v.set_parameter(Param::EnvAttack, 20);
        v.set_parameter(Param::EnvAmount, 50);
        v.note_on(60 << 8);
        rendered(&mut v, CONTROL_BLOCK * 3);

        let offset = params::modulation_to_index(v.modulator().output());
        assert!(offset > 0);
        assert_eq!(v.wave_index(), wrap_index(params::wave_index(100), offset));
    }

    #[test]
    fn block_ramp_is_continuous_across_chunks() {
        let mut v = voice(VoiceConfig::default());
        v.set_parameter(Param::EnvAttack, 5);
        v.set_parameter(Param::EnvAmount, 100);
        v.note_on(60 << 8);

        // three full blocks and a 7-sample tail on the division path
        let chunks = [CONTROL_BLOCK, CONTROL_BLOCK, CONTROL_BLOCK, 7];
        rendered(&mut v, chunks.iter().sum());
        let trace: Vec<i64> = v.index_trace.iter().map(|&i| i as i64).collect();
        assert_eq!(trace.len(), 103);
        assert_eq!(
            *trace.last().unwrap() as u32,
            wrap_index(0, params::modulation_to_index(v.modulator().output()))
        );

        let mut previous = 0i64;
        let mut start = 0;
        for n in chunks {
            let block = &trace[start..start + n];
            let target = block[n - 1];
            assert!(target > previous, "attack should rise");
            // The last sample also takes up the rounding remainder.
            let limit = (target - previous) / n as i64 + n as i64;
            let mut last = previous;
            for (i, &index) in block.iter().enumerate() {
                let step = index - last;
                assert!(
                    (0..=limit).contains(&step),
                    "sample {} of chunk at {}: step {} limit {}",
                    i,
                    start,
                    step,
                    limit
                );
                last = index;
            }
            previous = target;
            start += n;
        }
    }

    #[test]
    fn ramp_uses_shift_or_division() {
        assert_eq!(ramp_increment(320, 32), 10);
        assert_eq!(ramp_increment(-320, 32), -10);
        assert_eq!(ramp_increment(300, 3), 100);
        assert_eq!(ramp_increment(5, 1), 5);
    }

    #[test]
    fn negative_modulation_wraps_the_index() {
        assert_eq!(wrap_index(0, -(1 << 25)), 127 << 25);
        assert_eq!(wrap_index(127 << 25, 2 << 25), 1 << 25);
    }

    #[test]
    fn wavetable_selection_applies_at_the_next_block() {
        let mut v = voice(VoiceConfig::default());
        assert_eq!(v.wavetable(), (0, true));
        v.set_parameter(Param::Wavetable, 35);
        assert_eq!(v.wavetable(), (0, true));
        rendered(&mut v, 16);
        assert_eq!(v.wavetable(), (5, false));
        v.set_parameter(Param::Wavetable, 64);
        v.note_on(60 << 8);
        assert_eq!(v.wavetable(), (3, true));
    }

    #[test]
    fn secondary_layer_changes_the_sound_and_can_be_disabled() {
        let mut a = voice(VoiceConfig::default());
        let mut b = voice(VoiceConfig::default());
        b.set_parameter(Param::SecondaryWaveIndex, 700);
        a.note_on(60 << 8);
        b.note_on(60 << 8);
        assert_ne!(rendered(&mut a, 128), rendered(&mut b, 128));

        let mut c = voice(VoiceConfig::default());
        c.set_parameter(Param::SecondaryWaveIndex, 700);
        c.set_parameter(Param::SecondaryWaveIndex, -1);
        let mut d = voice(VoiceConfig::default());
        c.note_on(60 << 8);
        d.note_on(60 << 8);
        assert_eq!(rendered(&mut c, 128), rendered(&mut d, 128));
    }

    #[test]
    fn q31_output_matches_float_output() {
        let mut a = voice(VoiceConfig::default());
        let mut b = voice(VoiceConfig::default());
        a.note_on(69 << 8);
        b.note_on(69 << 8);
        let floats = rendered(&mut a, 96);
        let mut ints = vec![0i32; 96];
        b.render_q31(&mut ints);
        for (f, q) in floats.iter().zip(&ints) {
            assert_eq!(to_q31(f * 128.0), *q);
        }
    }

    #[test]
    fn pitch_changes_only_retune() {
        let mut v = voice(VoiceConfig::default());
        v.note_on(69 << 8);
        assert!((v.frequency() - 440.0).abs() < 1e-3);
        v.set_pitch(81 << 8);
        assert!((v.frequency() - 880.0).abs() < 1e-2);
        assert_eq!(v.pitch(), Some(81 << 8));
    }

    #[test]
    fn hold_release_ends_the_voice() {
        let mut v = voice(VoiceConfig::default());
        v.set_parameter(Param::EnvDecay, 1);
        v.set_parameter(Param::EnvAmount, 100);
        v.note_on(60 << 8);
        rendered(&mut v, 480);
        assert_eq!(v.modulator().stage(), ModStage::Sustain);

        v.note_off();
        assert!(v.is_active());
        // ENV_LUT[1] releases in about 0.1 s.
        rendered(&mut v, 9600);
        assert!(!v.is_active());
        assert_eq!(v.modulator().output(), 0);
    }

    #[test]
    fn messages_drive_the_voice() {
        let mut v = voice(VoiceConfig::default());
        let mut queue = std::collections::VecDeque::from([
            VoiceMessage::SetParam {
                param: Param::Wavetable,
                value: 3,
            },
            VoiceMessage::NoteOn { pitch: 48 << 8 },
            VoiceMessage::SetPitch { pitch: 50 << 8 },
        ]);
        v.process_messages(&mut queue);
        assert!(queue.is_empty());
        assert_eq!(v.wavetable(), (3, true));
        assert_eq!(v.pitch(), Some(50 << 8));
        assert!(v.is_active());

        queue.push_back(VoiceMessage::NoteOff);
        v.process_messages(&mut queue);
        // Instant release finishes within the next block.
        rendered(&mut v, CONTROL_BLOCK);
        assert!(!v.is_active());
    }

    #[test]
    fn config_builder() {
        let config = VoiceConfig::new(44_100.0)
            .with_oversampling(Oversampling::X4)
            .with_modulation_rate(ModulationRate::PerSample)
            .with_interpolation(Interpolation::Nearest);
        assert_eq!(config.sample_rate, 44_100.0);
        assert_eq!(config.oversampling, Oversampling::X4);
        assert_eq!(config.modulation_rate, ModulationRate::PerSample);
        assert_eq!(config.interpolation, Interpolation::Nearest);
        assert_eq!(VoiceConfig::default().oversampling, Oversampling::X2);
    }
}
