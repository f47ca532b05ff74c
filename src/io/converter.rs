//! Conversions between the oscillator's internal units and host formats.
//!
//! Internally a sample spans roughly -128..128 (the byte range of a wave
//! fragment, centred) and pitch is UQ8.8: note number in the high byte, 1/256
//! semitone fraction in the low byte.

/// Internal full-scale to Q31. Leaves about 10% headroom for decimator
/// ringing above the nominal ±128 range.
pub const Q31_SCALE: f32 = 15_000_000.0;

/// MIDI note number to frequency in Hz. A4 = 440 Hz = note 69.
#[inline]
pub fn note_to_freq(note: u8) -> f32 {
    440.0 * 2.0_f32.powf((note as f32 - 69.0) / 12.0)
}

/// UQ8.8 pitch to frequency in Hz.
///
/// The fraction is applied with a quadratic fit of `2^(f/12)` rather than an
/// exponential, matching the hardware's tuning curve.
///
/// ```
/// use ppg_wave::io::converter::pitch_to_freq;
///
/// assert!((pitch_to_freq(69 << 8) - 440.0).abs() < 1e-3);
/// let half_up = pitch_to_freq((69 << 8) | 128);
/// assert!((half_up / 440.0 - 2f32.powf(0.5 / 12.0)).abs() < 1e-4);
/// ```
#[inline]
pub fn pitch_to_freq(pitch: u16) -> f32 {
    let note = (pitch >> 8) as u8;
    let fine = pitch & 0xff;
    let freq = note_to_freq(note);
    if fine == 0 {
        return freq;
    }
    let f = fine as f32 * 0.003_906_25;
    freq * (0.001_717_23 * f * f + 0.057_742_66 * f + 1.000_001_6)
}

/// Internal sample to Q31.
#[inline]
pub fn to_q31(y: f32) -> i32 {
    (y * Q31_SCALE + 0.5) as i32
}

/// Internal sample to a normalized float, ±1.0 at the byte range.
#[inline]
pub fn to_normalized(y: f32) -> f32 {
    y * (1.0 / 128.0)
}

/// Q31 to float in [-1, 1).
#[inline]
pub fn q31_to_f32(x: i32) -> f32 {
    x as f32 * (1.0 / 2_147_483_648.0)
}
