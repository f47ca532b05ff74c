use crate::MIN_TIME;

/*
Wave Envelope and LFO
=====================

A single modulation source for the wave index: a one-shot attack/decay
envelope that can hand over to a triangle LFO. Everything is integer so the
modulation trajectory is bit-reproducible.

Vocabulary
----------

  env       Envelope value, UQ1.31. 1 << 31 is full scale.

  rate      Envelope change per sample, also UQ1.31. A rate of 1 << 31
            means "instantaneous" and skips the stage entirely.

  amount    Modulation depth in host units, -100..=100. Output is
            env * amount in Q7.24, so ±100 units is ±100 << 24.

  hold      true:  [note on] attack → LFO, [note off] release
            false: [note on] attack → decay → LFO, [note off] nothing

  lfo phase Unsigned 32-bit. The triangle is 2 * |phase as i32| - 1, so
            starting at 1 << 30 the LFO begins at zero going up.


The Two Shapes
--------------

    hold = false (AD, then LFO)

      amount ┤   ╱╲
             │  ╱  ╲
           0 ┼─╱────╲─╲╱╲╱╲╱╲───
              atk  dec  LFO

    hold = true (attack, LFO on top of amount, release on note off)

      amount ┤   ╱╲╱╲╱╲╱╲
             │  ╱        ╲
           0 ┼─╱──────────╲───
              atk  LFO   rel
                         ↑ note off


Transitions
-----------

  note on   Attack when attack has a rate, else Sustain when holding, else
            Decay from full scale when decay has a rate, else Idle.

  Attack    Overshoot past 1.0 either enters Sustain (hold) with the
            amount as the sustain value, or Decay starting from the
            overshoot reflected back below 1.0, or Idle.

  Decay     Undershoot below zero ends in Idle (hold, this was the
            release) or in Sustain with a zero base (the LFO phase is moved
            half a cycle so the LFO starts going down).

  note off  Sustain (hold) releases scaled by the current output, so the
            release starts from wherever the LFO is. Attack releases scaled
            by the amount.

Stage arithmetic widens to 64 bits: a block of steps times a large rate
does not fit in 32.
*/

/// 1.0 in UQ1.31.
pub const FIXED_ONE: u32 = 1 << 31;
/// Quarter LFO cycle.
pub const TRI_SHIFT: u32 = 1 << 30;
/// Largest envelope value, keeping env in [0, 1).
const ENV_MAX: u32 = FIXED_ONE - 1;
/// Largest triangle value in Q30, keeping it in [-1, 1).
const TRI_MAX: i64 = TRI_SHIFT as i64 - 1;
/// One modulation unit in Q7.24.
pub const UNIT: i32 = 1 << 24;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ModStage {
    Idle,
    Attack,
    /// Decay, or release after note off in hold mode.
    Decay,
    /// LFO around a base value.
    Sustain,
}

#[derive(Debug, Clone)]
pub struct EnvLfo {
    stage: ModStage,
    out: i32,
    env: u32,
    attack_rate: u32,
    decay_rate: u32,
    sustain: i32,
    lfo_phase: u32,
    lfo_step: u32,
    sample_rate: f32,
    env_amount: i8,
    lfo_amount: i8,
    decay_scale: i8,
    hold: bool,
}

impl EnvLfo {
    pub fn new(sample_rate: f32) -> Self {
        Self {
            stage: ModStage::Idle,
            out: 0,
            env: 0,
            attack_rate: FIXED_ONE,
            decay_rate: FIXED_ONE,
            sustain: 0,
            lfo_phase: TRI_SHIFT,
            lfo_step: 0,
            sample_rate,
            env_amount: 0,
            lfo_amount: 0,
            decay_scale: 0,
            hold: false,
        }
    }

    /// Back to Idle with the LFO at its rising zero crossing. Parameters stay.
    pub fn reset(&mut self) {
        self.stage = ModStage::Idle;
        self.env = 0;
        self.out = 0;
        self.lfo_phase = TRI_SHIFT;
    }

    pub fn set_sample_rate(&mut self, sample_rate: f32) {
        self.sample_rate = sample_rate;
    }

    pub fn set_hold(&mut self, hold: bool) {
        self.hold = hold;
    }

    /// Envelope depth, clamped to -100..=100.
    pub fn set_env_amount(&mut self, amount: i32) {
        self.env_amount = amount.clamp(-100, 100) as i8;
        if self.hold && self.stage == ModStage::Sustain {
            self.sustain = self.env_amount as i32 * UNIT;
        }
    }

    /// LFO depth, clamped to -100..=100. Negative inverts the LFO.
    pub fn set_lfo_amount(&mut self, amount: i32) {
        self.lfo_amount = amount.clamp(-100, 100) as i8;
    }

    pub fn set_attack_time(&mut self, seconds: f32) {
        self.attack_rate = self.time_to_rate(seconds);
    }

    pub fn set_decay_time(&mut self, seconds: f32) {
        self.decay_rate = self.time_to_rate(seconds);
    }

    /// Raw UQ1.31 attack rate; anything at or above 1.0 is instantaneous.
    pub fn set_attack_rate(&mut self, rate: u32) {
        self.attack_rate = rate.min(FIXED_ONE);
    }

    pub fn set_decay_rate(&mut self, rate: u32) {
        self.decay_rate = rate.min(FIXED_ONE);
    }

    /// LFO frequency in Hz.
    pub fn set_lfo_frequency(&mut self, hz: f32) {
        let ratio = if self.sample_rate > 0.0 {
            hz / self.sample_rate
        } else {
            0.0
        };
        let ratio = if ratio.is_finite() {
            ratio.clamp(0.0, 0.5)
        } else {
            0.0
        };
        self.lfo_step = (ratio as f64 * 4_294_967_296.0) as u32;
    }

    /// Raw LFO phase increment per sample.
    pub fn set_lfo_rate(&mut self, step: u32) {
        self.lfo_step = step;
    }

    fn time_to_rate(&self, seconds: f32) -> u32 {
        if seconds.is_nan() || seconds <= MIN_TIME {
            return FIXED_ONE;
        }
        let rate = FIXED_ONE as f32 / (self.sample_rate * seconds) + 0.5;
        if rate.is_finite() && rate >= 0.0 {
            (rate as u32).min(FIXED_ONE)
        } else {
            FIXED_ONE
        }
    }

    pub fn note_on(&mut self) {
        self.reset();
        if self.attack_rate < FIXED_ONE {
            self.stage = ModStage::Attack;
            self.env = 0;
        } else if self.hold {
            self.enter_hold_sustain();
        } else if self.decay_rate < FIXED_ONE {
            self.stage = ModStage::Decay;
            self.env = ENV_MAX;
            self.decay_scale = self.env_amount;
        } else {
            self.stage = ModStage::Idle;
            self.env = 0;
        }
        tracing::trace!(stage = ?self.stage, "modulator note on");
    }

    pub fn note_off(&mut self) {
        match self.stage {
            ModStage::Sustain if self.hold => {
                self.stage = ModStage::Decay;
                self.decay_scale = (self.out >> 24).clamp(i8::MIN as i32, i8::MAX as i32) as i8;
            }
            ModStage::Attack => {
                self.stage = ModStage::Decay;
                self.decay_scale = self.env_amount;
            }
            _ => {}
        }
        tracing::trace!(stage = ?self.stage, "modulator note off");
    }

    fn enter_hold_sustain(&mut self) {
        self.stage = ModStage::Sustain;
        self.env = ENV_MAX;
        self.sustain = self.env_amount as i32 * UNIT;
    }

    #[inline]
    fn scaled(env: u32, scale: i8) -> i32 {
        (env >> 7) as i32 * scale as i32
    }

    /// Advance by `steps` samples and return the output in Q7.24.
    pub fn advance(&mut self, steps: u32) -> i32 {
        match self.stage {
            ModStage::Attack => {
                let env = self.env as u64 + self.attack_rate as u64 * steps as u64;
                if env >= FIXED_ONE as u64 {
                    let overshoot = env - FIXED_ONE as u64;
                    if self.hold {
                        self.enter_hold_sustain();
                        self.out = self.sustain;
                    } else if self.decay_rate < FIXED_ONE {
                        self.stage = ModStage::Decay;
                        self.env = ENV_MAX - overshoot.min(ENV_MAX as u64) as u32;
                        self.decay_scale = self.env_amount;
                        self.out = Self::scaled(self.env, self.env_amount);
                    } else {
                        self.stage = ModStage::Idle;
                        self.env = 0;
                        self.out = 0;
                    }
                } else {
                    self.env = env as u32;
                    self.out = Self::scaled(self.env, self.env_amount);
                }
            }
            ModStage::Decay => {
                let env = self.env as i64 - self.decay_rate as i64 * steps as i64;
                if env < 0 {
                    self.env = 0;
                    self.sustain = 0;
                    self.out = 0;
                    if self.hold {
                        self.stage = ModStage::Idle;
                    } else {
                        self.stage = ModStage::Sustain;
                        self.lfo_phase = self.lfo_phase.wrapping_add(TRI_SHIFT << 1);
                    }
                } else {
                    self.env = env as u32;
                    self.out = Self::scaled(self.env, self.decay_scale);
                }
            }
            ModStage::Sustain => {
                let x = self.lfo_phase as i32 as i64;
                let tri = (x.abs() - TRI_SHIFT as i64).min(TRI_MAX);
                self.lfo_phase = self
                    .lfo_phase
                    .wrapping_add(self.lfo_step.wrapping_mul(steps));
                let lfo = (tri >> 6) as i32 * self.lfo_amount as i32;
                self.out = self.sustain.saturating_add(lfo);
            }
            ModStage::Idle => {
                self.out = 0;
            }
        }
        self.out
    }

    /// Last output in Q7.24.
    pub fn output(&self) -> i32 {
        self.out
    }

    pub fn stage(&self) -> ModStage {
        self.stage
    }

    pub fn is_active(&self) -> bool {
        self.stage != ModStage::Idle
    }

    /// Envelope value in [0, 1).
    pub fn level(&self) -> f32 {
        self.env as f32 / FIXED_ONE as f32
    }
}
