//! Errors raised while loading wave data.
//!
//! Nothing in the render path returns an error: out-of-range values are
//! clamped or wrapped where they are applied. The only fallible step is
//! turning an external ROM dump into a [`WaveBank`](crate::rom::WaveBank).

use thiserror::Error;

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum BankError {
    #[error("wave data must be {expected} bytes ({waves} waves of 64 samples), got {actual}")]
    WaveDataLength {
        expected: usize,
        waves: usize,
        actual: usize,
    },

    #[error("expected {expected} wavetable definitions, got {actual}")]
    TableCount { expected: usize, actual: usize },

    #[error("wavetable {table} has no keyframes")]
    EmptyTable { table: usize },

    #[error("wavetable {table} must start at position 0, starts at {position}")]
    FirstPosition { table: usize, position: u8 },

    #[error("wavetable {table}: keyframe positions must increase ({previous} then {position})")]
    UnorderedKeyframes {
        table: usize,
        previous: u8,
        position: u8,
    },

    #[error("wavetable {table}: keyframe position {position} is past the last slot (60)")]
    PositionOutOfRange { table: usize, position: u8 },

    #[error("wavetable {table}: wave id {wave} is neither a stored wave nor a standard wave")]
    UnknownWave { table: usize, wave: u8 },
}

pub type Result<T> = std::result::Result<T, BankError>;
