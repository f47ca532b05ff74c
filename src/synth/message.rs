#[cfg(feature = "rtrb")]
use rtrb::Consumer;

use super::params::Param;

/// Control-thread request, applied by the voice at the next block boundary.
#[derive(Debug, Copy, Clone, PartialEq, Eq)]
pub enum VoiceMessage {
    /// UQ8.8 pitch: note number in the high byte, fine tune in the low byte.
    NoteOn { pitch: u16 },
    NoteOff,
    SetPitch { pitch: u16 },
    SetParam { param: Param, value: i32 },
}

pub trait MessageReceiver {
    fn pop(&mut self) -> Option<VoiceMessage>;
}

#[cfg(feature = "rtrb")]
impl MessageReceiver for Consumer<VoiceMessage> {
    fn pop(&mut self) -> Option<VoiceMessage> {
        Consumer::pop(self).ok()
    }
}

impl MessageReceiver for std::collections::VecDeque<VoiceMessage> {
    fn pop(&mut self) -> Option<VoiceMessage> {
        self.pop_front()
    }
}
