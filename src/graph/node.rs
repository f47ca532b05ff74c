use crate::io::converter::pitch_to_freq;

/// Context passed to graph nodes during rendering
///
/// Contains information about what to render:
/// - sample_rate: Audio sample rate (e.g., 48000.0)
/// - pitch: UQ8.8 note, high byte the note number, low byte 1/256 semitone
/// - frequency: The same pitch in Hz
pub struct RenderCtx {
    pub sample_rate: f32,
    pub pitch: u16,
    pub frequency: f32,
}

impl RenderCtx {
    /// Create context from a MIDI note number
    pub fn from_note(sample_rate: f32, note: u8) -> Self {
        Self::from_pitch(sample_rate, (note as u16) << 8)
    }

    /// Create context from a fine-tuned UQ8.8 pitch
    pub fn from_pitch(sample_rate: f32, pitch: u16) -> Self {
        Self {
            sample_rate,
            pitch,
            frequency: pitch_to_freq(pitch),
        }
    }
}

/// Core trait for audio processing graph nodes
///
/// Nodes can render audio and respond to musical events
pub trait GraphNode: Send {
    fn render_block(&mut self, out: &mut [f32], ctx: &RenderCtx);

    /// Triggered when a note starts
    ///
    /// Default implementation does nothing (passthrough nodes).
    fn note_on(&mut self, _ctx: &RenderCtx) {}

    /// Triggered when a note is released
    fn note_off(&mut self, _ctx: &RenderCtx) {}

    /// Modulation envelope level in [0, 1), when the node has one.
    fn get_envelope_level(&self) -> Option<f32> {
        None
    }

    /// Check if this node is still producing sound
    ///
    /// Used by voice management to know when a voice can be freed.
    fn is_active(&self) -> bool {
        true
    }
}

/// Allow boxed graph nodes to be used as graph nodes (for dynamic dispatch)
impl GraphNode for Box<dyn GraphNode> {
    fn render_block(&mut self, out: &mut [f32], ctx: &RenderCtx) {
        (**self).render_block(out, ctx)
    }

    fn note_on(&mut self, ctx: &RenderCtx) {
        (**self).note_on(ctx)
    }

    fn note_off(&mut self, ctx: &RenderCtx) {
        (**self).note_off(ctx)
    }

    fn get_envelope_level(&self) -> Option<f32> {
        (**self).get_envelope_level()
    }

    fn is_active(&self) -> bool {
        (**self).is_active()
    }
}
