//! Spectrum analyzer widget
//!
//! Hann-windowed FFT of the scope buffer, sampled at log-spaced
//! frequencies. Aliasing from the oscillator shows up as energy between the
//! harmonics.

use ratatui::{
    layout::Rect,
    style::{Color, Style},
    symbols,
    widgets::{Axis, Block, Borders, Chart, Dataset, GraphType},
    Frame,
};
use rustfft::{num_complex::Complex, Fft, FftPlanner};
use std::sync::Arc;

/// Number of frequency points to display
const SPECTRUM_BINS: usize = 96;

const FLOOR_DB: f64 = -100.0;

pub struct SpectrumAnalyzer {
    window: Vec<f32>,
    /// log10 of the frequency shown at each point
    log_freqs: Vec<f64>,
    bin_indices: Vec<usize>,
    fft: Arc<dyn Fft<f32>>,
    scratch: Vec<Complex<f32>>,
    /// (log10 Hz, dB)
    spectrum: Vec<(f64, f64)>,
}

impl SpectrumAnalyzer {
    /// `buffer_len` is the FFT size and must match the scope buffer.
    pub fn new(buffer_len: usize, sample_rate: f32) -> Self {
        let mut planner = FftPlanner::new();
        let fft = planner.plan_fft_forward(buffer_len);

        let window: Vec<f32> = (0..buffer_len)
            .map(|i| {
                if buffer_len > 1 {
                    let denom = (buffer_len - 1) as f32;
                    0.5 * (1.0 - (2.0 * std::f32::consts::PI * i as f32 / denom).cos())
                } else {
                    1.0
                }
            })
            .collect();

        // Log-spaced from 20 Hz to Nyquist
        let max_freq = (sample_rate as f64 / 2.0).max(40.0);
        let min_freq = 20.0f64;
        let half = (buffer_len / 2).max(1);
        let (log_freqs, bin_indices): (Vec<f64>, Vec<usize>) = (0..SPECTRUM_BINS)
            .map(|i| {
                let t = i as f64 / (SPECTRUM_BINS - 1) as f64;
                let freq = min_freq * (max_freq / min_freq).powf(t);
                let index = (freq * buffer_len as f64 / sample_rate as f64).round() as usize;
                (freq.log10(), index.min(half - 1))
            })
            .unzip();

        Self {
            window,
            spectrum: Vec::with_capacity(SPECTRUM_BINS),
            log_freqs,
            bin_indices,
            fft,
            scratch: vec![Complex::new(0.0, 0.0); buffer_len],
        }
    }

    /// Recompute from the latest samples. Ignored unless the length matches.
    pub fn update(&mut self, buffer: &[f32]) {
        if buffer.len() != self.window.len() {
            return;
        }

        for ((bin, &sample), &w) in self.scratch.iter_mut().zip(buffer).zip(&self.window) {
            *bin = Complex::new(sample * w, 0.0);
        }
        self.fft.process(&mut self.scratch);

        // Normalize so a full-scale sine sits near 0 dB
        let norm = (self.window.len() as f32 / 4.0).powi(2);
        self.spectrum.clear();
        for (&log_freq, &index) in self.log_freqs.iter().zip(&self.bin_indices) {
            let power = (self.scratch[index].norm_sqr() / norm).max(1e-12);
            let db = (10.0 * (power as f64).log10()).max(FLOOR_DB);
            self.spectrum.push((log_freq, db));
        }
    }

    pub fn data(&self) -> &[(f64, f64)] {
        &self.spectrum
    }

    fn x_bounds(&self) -> [f64; 2] {
        match (self.log_freqs.first(), self.log_freqs.last()) {
            (Some(&lo), Some(&hi)) => [lo, hi],
            _ => [1.0, 4.0],
        }
    }
}

/// Render the spectrum analyzer widget
pub fn render_spectrum(frame: &mut Frame, area: Rect, analyzer: &SpectrumAnalyzer) {
    let block = Block::default().title(" Spectrum ").borders(Borders::ALL);

    let dataset = Dataset::default()
        .marker(symbols::Marker::Braille)
        .graph_type(GraphType::Line)
        .style(Style::default().fg(Color::Green))
        .data(analyzer.data());

    let chart = Chart::new(vec![dataset])
        .block(block)
        .x_axis(
            Axis::default()
                .bounds(analyzer.x_bounds())
                .labels(vec!["20", "200", "2k", "20k"])
                .style(Style::default().fg(Color::DarkGray)),
        )
        .y_axis(
            Axis::default()
                .bounds([FLOOR_DB, 10.0])
                .labels(vec!["-100", "-60", "-20", "0"])
                .style(Style::default().fg(Color::DarkGray)),
        );

    frame.render_widget(chart, area);
}
