//! Patch state held by the UI thread
//!
//! The audio thread never reads this; every change is mirrored to the voice
//! as a `VoiceMessage`.

use ppg_wave::Param;

/// Host-unit value of every parameter plus the one being edited
#[derive(Clone, Debug)]
pub struct PatchState {
    values: [i32; Param::ALL.len()],
    selected: usize,
}

impl PatchState {
    pub fn new() -> Self {
        Self {
            values: Param::ALL.map(Param::default_value),
            selected: 0,
        }
    }

    fn slot(param: Param) -> usize {
        Param::ALL.iter().position(|&p| p == param).unwrap_or(0)
    }

    pub fn get(&self, param: Param) -> i32 {
        self.values[Self::slot(param)]
    }

    /// Store a clamped value and return it
    pub fn set(&mut self, param: Param, value: i32) -> i32 {
        let value = param.clamp(value);
        self.values[Self::slot(param)] = value;
        value
    }

    pub fn values(&self) -> impl Iterator<Item = (Param, i32)> + '_ {
        Param::ALL.iter().copied().zip(self.values.iter().copied())
    }

    pub fn selected(&self) -> Param {
        Param::ALL[self.selected]
    }

    pub fn select_next(&mut self) {
        self.selected = (self.selected + 1) % Param::ALL.len();
    }

    pub fn select_prev(&mut self) {
        self.selected = (self.selected + Param::ALL.len() - 1) % Param::ALL.len();
    }

    /// Move the selected parameter by `steps` increments
    pub fn nudge(&mut self, steps: i32) -> (Param, i32) {
        let param = self.selected();
        let value = self.set(param, self.get(param) + steps * step_size(param));
        (param, value)
    }
}

/// About 64 increments across the range, at least 1
pub fn step_size(param: Param) -> i32 {
    let range = param.range();
    ((range.end() - range.start()) / 64).max(1)
}

impl Default for PatchState {
    fn default() -> Self {
        Self::new()
    }
}
