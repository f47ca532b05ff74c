//! Status bar widget - shows the playing note, wavetable, engine setup and audio stats

use ratatui::{
    layout::Rect,
    style::{Color, Style},
    text::{Line, Span},
    widgets::{Block, Borders, Paragraph},
    Frame,
};

use ppg_wave::{Param, VoiceConfig};

use super::PatchState;

const NOTE_NAMES: [&str; 12] = [
    "C", "C#", "D", "D#", "E", "F", "F#", "G", "G#", "A", "A#", "B",
];

/// Audio statistics for display
pub struct AudioStats {
    pub peak: f32,
    pub rms: f32,
}

impl AudioStats {
    /// Compute audio stats from a buffer
    pub fn from_buffer(buffer: &[f32]) -> Self {
        if buffer.is_empty() {
            return Self { peak: 0.0, rms: 0.0 };
        }
        let peak = buffer.iter().fold(0.0f32, |acc, &x| acc.max(x.abs()));
        let rms = (buffer.iter().map(|&x| x * x).sum::<f32>() / buffer.len() as f32).sqrt();
        Self { peak, rms }
    }
}

pub fn note_name(note: u8) -> String {
    format!("{}{}", NOTE_NAMES[note as usize % 12], note as i32 / 12 - 1)
}

/// Render the status bar
pub fn render_status(
    frame: &mut Frame,
    area: Rect,
    note: Option<u8>,
    patch: &PatchState,
    config: &VoiceConfig,
    audio_stats: &AudioStats,
) {
    let block = Block::default().title(" ppgwave ").borders(Borders::ALL);

    let (note_str, note_color) = match note {
        Some(n) => (format!("▶ {:<4}", note_name(n)), Color::Green),
        None => ("⏸ --  ".to_string(), Color::Yellow),
    };

    let selector = patch.get(Param::Wavetable) % 61;
    let table = if selector >= 30 {
        format!("WT {:02}", selector - 30)
    } else {
        format!("WT {:02}+up", selector)
    };

    let line = Line::from(vec![
        Span::styled(format!(" {}  ", note_str), Style::default().fg(note_color)),
        Span::styled(format!("{}  ", table), Style::default().fg(Color::Cyan)),
        Span::styled(
            format!(
                "{:.1}kHz {:?} {:?}  ",
                config.sample_rate / 1000.0,
                config.oversampling,
                config.modulation_rate
            ),
            Style::default().fg(Color::DarkGray),
        ),
        Span::styled(
            format!("Peak: {:.2}  RMS: {:.2}", audio_stats.peak, audio_stats.rms),
            Style::default().fg(Color::Magenta),
        ),
    ]);

    frame.render_widget(Paragraph::new(line).block(block), area);
}
