//! Quadratic PolyBLEP residuals for hard edges.
//!
//! A naive square or saw jumps within a single sample, which folds energy
//! above Nyquist back into the audible band. PolyBLEP subtracts the
//! difference between that ideal step and a band-limited one, spread over
//! one phase step on each side of the edge:
//!
//! ```text
//!   t in [0, 1)   after the edge:   2t - t^2 - 1
//!   t in (-1, 0)  before the edge:  t^2 + 2t + 1
//! ```
//!
//! where `t` is the distance to the edge in phase steps. Multiply the
//! residual by half the jump height (signed, `after - before`) and add it.

/// Residual for an edge at `edge` (positions, 0..=128) with the phase at `pos`.
///
/// Distances wrap around the 128-position cycle, so an edge at 0 or 128
/// sees phases on both sides of the wrap.
///
/// ```
/// use ppg_wave::dsp::polyblep::edge_residual;
///
/// // half a step past the edge
/// let r = edge_residual(64.5, 64.0, 1.0, 1.0);
/// assert!((r + 0.25).abs() < 1e-6);
/// // far from the edge
/// assert_eq!(edge_residual(10.0, 64.0, 1.0, 1.0), 0.0);
/// ```
#[inline]
pub fn edge_residual(pos: f32, edge: f32, step: f32, recip_step: f32) -> f32 {
    let mut d = pos - edge;
    if d >= 64.0 {
        d -= 128.0;
    } else if d < -64.0 {
        d += 128.0;
    }

    if d >= 0.0 && d < step {
        let t = d * recip_step;
        t + t - t * t - 1.0
    } else if d < 0.0 && d > -step {
        let t = d * recip_step;
        t * t + t + t + 1.0
    } else {
        0.0
    }
}
