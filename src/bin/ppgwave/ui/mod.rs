//! TUI module for ppgwave
//!
//! A computer-keyboard piano, a parameter editor and a live scope of the
//! voice output. All control goes to the audio thread over an rtrb queue.

mod params;
mod spectrum;
mod state;
mod status;
mod waveform;

use color_eyre::eyre::Result as EyreResult;
use crossterm::event::{self, Event, KeyCode, KeyEventKind};
use ratatui::{
    layout::{Constraint, Direction, Layout},
    DefaultTerminal, Frame,
};
use rtrb::{Consumer, Producer};
use std::time::Duration;

use ppg_wave::{synth::VoiceMessage, VoiceConfig};

pub use state::PatchState;

use params::render_params;
use spectrum::{render_spectrum, SpectrumAnalyzer};
use status::{render_status, AudioStats};
use waveform::render_waveform;

/// Audio visualization buffer size (also the FFT size)
pub const VIS_BUFFER_SIZE: usize = 2048;

/// Piano layout on the bottom letter row, semitones from C
const PIANO_KEYS: [char; 13] = [
    'z', 's', 'x', 'd', 'c', 'v', 'g', 'b', 'h', 'n', 'j', 'm', ',',
];

/// UI application state
pub struct UiApp {
    control_tx: Producer<VoiceMessage>,
    audio_rx: Consumer<f32>,
    patch: PatchState,
    config: VoiceConfig,
    audio_buffer: Vec<f32>,
    analyzer: SpectrumAnalyzer,
    octave: u8,
    note: Option<u8>,
    should_quit: bool,
}

impl UiApp {
    pub fn new(
        control_tx: Producer<VoiceMessage>,
        audio_rx: Consumer<f32>,
        patch: PatchState,
        config: VoiceConfig,
    ) -> Self {
        Self {
            control_tx,
            audio_rx,
            patch,
            analyzer: SpectrumAnalyzer::new(VIS_BUFFER_SIZE, config.sample_rate),
            config,
            audio_buffer: vec![0.0; VIS_BUFFER_SIZE],
            octave: 4,
            note: None,
            should_quit: false,
        }
    }

    /// Run the UI event loop
    pub fn run(&mut self, terminal: &mut DefaultTerminal) -> EyreResult<()> {
        while !self.should_quit {
            self.poll_audio();
            terminal.draw(|frame| self.render(frame))?;

            // Handle keyboard input (non-blocking, ~60fps)
            if event::poll(Duration::from_millis(16))? {
                if let Event::Key(key) = event::read()? {
                    if key.kind == KeyEventKind::Press {
                        self.handle_key(key.code);
                    }
                }
            }
        }

        self.send(VoiceMessage::NoteOff);
        Ok(())
    }

    /// Read new scope samples, keeping the last VIS_BUFFER_SIZE
    fn poll_audio(&mut self) {
        let available = self.audio_rx.slots();
        if available == 0 {
            return;
        }
        if let Ok(chunk) = self.audio_rx.read_chunk(available) {
            let (first, second) = chunk.as_slices();
            self.audio_buffer.extend_from_slice(first);
            self.audio_buffer.extend_from_slice(second);
            chunk.commit_all();
        }
        if self.audio_buffer.len() > VIS_BUFFER_SIZE {
            let excess = self.audio_buffer.len() - VIS_BUFFER_SIZE;
            self.audio_buffer.drain(0..excess);
        }
        self.analyzer.update(&self.audio_buffer);
    }

    fn send(&mut self, msg: VoiceMessage) {
        if self.control_tx.push(msg).is_err() {
            tracing::warn!(?msg, "control queue full, message dropped");
        }
    }

    fn handle_key(&mut self, key: KeyCode) {
        match key {
            KeyCode::Char('q') | KeyCode::Esc => self.should_quit = true,
            KeyCode::Char(' ') => {
                self.note = None;
                self.send(VoiceMessage::NoteOff);
            }
            KeyCode::Char('-') => self.octave = self.octave.saturating_sub(1),
            KeyCode::Char('=') => self.octave = (self.octave + 1).min(8),
            KeyCode::Up => self.patch.select_prev(),
            KeyCode::Down => self.patch.select_next(),
            KeyCode::Left => self.nudge(-1),
            KeyCode::Right => self.nudge(1),
            KeyCode::Char(c) => {
                if let Some(semitone) = PIANO_KEYS.iter().position(|&k| k == c) {
                    let note = (self.octave + 1) * 12 + semitone as u8;
                    self.note = Some(note);
                    self.send(VoiceMessage::NoteOn {
                        pitch: (note as u16) << 8,
                    });
                }
            }
            _ => {}
        }
    }

    fn nudge(&mut self, steps: i32) {
        let (param, value) = self.patch.nudge(steps);
        self.send(VoiceMessage::SetParam { param, value });
    }

    fn render(&self, frame: &mut Frame) {
        let area = frame.area();

        let rows = Layout::default()
            .direction(Direction::Vertical)
            .constraints([
                Constraint::Length(3),  // Status bar
                Constraint::Min(11),    // Parameters + waveform
                Constraint::Length(10), // Spectrum
                Constraint::Length(1),  // Help bar
            ])
            .split(area);

        let middle = Layout::default()
            .direction(Direction::Horizontal)
            .constraints([Constraint::Length(24), Constraint::Min(20)])
            .split(rows[1]);

        let stats = AudioStats::from_buffer(&self.audio_buffer);
        render_status(frame, rows[0], self.note, &self.patch, &self.config, &stats);
        render_params(frame, middle[0], &self.patch);
        render_waveform(frame, middle[1], &self.audio_buffer);
        render_spectrum(frame, rows[2], &self.analyzer);

        let help = ratatui::widgets::Paragraph::new(format!(
            " [Z..M] Play  [Space] Release  [-/=] Octave {}  [Up/Down] Select  [Left/Right] Edit  [Q] Quit",
            self.octave
        ))
        .style(ratatui::style::Style::default().fg(ratatui::style::Color::DarkGray));
        frame.render_widget(help, rows[3]);
    }
}
