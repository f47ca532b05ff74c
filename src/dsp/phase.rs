/*
Fixed-Point Phase
=================

The oscillator phase is an unsigned 32-bit number in Q7.25: the top 7 bits
are the integer cycle position (0..128, one stored sample per half unit of a
64-byte fragment), the low 25 bits the fraction between positions.

    phase = 0x0000_0000   position 0.0    start of cycle
    phase = 0x8000_0000   position 64.0   mirror point
    phase = 0xFFFF_FFFF   position 127.99...

A full cycle is exactly 2^32, so advancing with a wrapping add is the cycle
wraparound. There is no "phase >= 1.0, subtract 1.0" branch to get wrong.

    step = frequency / (oversampling * sample_rate) * 2^32

The step is clamped to half a cycle (Nyquist at the oversampled rate).
*/

/// Q7.25 position to float positions.
pub const Q25TOF: f32 = 2.980_232_2e-8;
/// Q8.24 position to float positions.
pub const Q24TOF: f32 = 5.960_464_5e-8;
/// Mask for the Q7.25 fractional bits.
pub const MASK_25: u32 = 0x01ff_ffff;
/// Positions per cycle.
pub const CYCLE_POSITIONS: f32 = 128.0;

#[derive(Debug, Clone, Copy, Default)]
pub struct PhaseAccumulator {
    phase: u32,
    step: u32,
    step_positions: f32,
    recip_step: f32,
}

impl PhaseAccumulator {
    pub fn new() -> Self {
        Self::default()
    }

    /// Set the step from a frequency and the (oversampled) rate it runs at.
    pub fn set_frequency(&mut self, frequency: f32, rate: f32) {
        let ratio = if rate > 0.0 { frequency / rate } else { 0.0 };
        // NaN falls through clamp, catch it explicitly
        let ratio = if ratio.is_finite() {
            ratio.clamp(0.0, 0.5)
        } else {
            0.0
        };
        self.step = (ratio as f64 * 4_294_967_296.0) as u32;
        self.step_positions = ratio * CYCLE_POSITIONS;
        self.recip_step = if self.step_positions > 0.0 {
            1.0 / self.step_positions
        } else {
            0.0
        };
    }

    /// Set a raw Q7.25 step.
    pub fn set_step_raw(&mut self, step: u32) {
        self.step = step;
        self.step_positions = step as f32 * Q25TOF;
        self.recip_step = if step > 0 {
            1.0 / self.step_positions
        } else {
            0.0
        };
    }

    #[inline]
    pub fn reset(&mut self) {
        self.phase = 0;
    }

    #[inline]
    pub fn advance(&mut self) {
        self.phase = self.phase.wrapping_add(self.step);
    }

    #[inline]
    pub fn phase(&self) -> u32 {
        self.phase
    }

    /// Phase as a float position in [0, 128).
    #[inline]
    pub fn position(&self) -> f32 {
        self.phase as f32 * Q25TOF
    }

    #[inline]
    pub fn step(&self) -> u32 {
        self.step
    }

    /// Step in positions, the PolyBLEP window half-width.
    #[inline]
    pub fn step_positions(&self) -> f32 {
        self.step_positions
    }

    #[inline]
    pub fn recip_step(&self) -> f32 {
        self.recip_step
    }
}
