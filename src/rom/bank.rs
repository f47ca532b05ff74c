use super::{WaveId, FRAGMENT_LEN, MAX_POSITION, NUM_WAVES, NUM_WAVETABLES, WT_STEP, WT_SYNC};
use crate::error::{BankError, Result};

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

/// One `(position, wave)` point of a wavetable.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct Keyframe {
    pub position: u8,
    pub wave: WaveId,
}

impl Keyframe {
    pub const fn new(position: u8, wave: WaveId) -> Self {
        Self { position, wave }
    }
}

/// Sparse keyframe list describing one wavetable.
///
/// Construction does not validate; a definition is checked when it is handed
/// to [`WaveBank::new`], which knows the table number to report.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct WavetableDefinition {
    keyframes: Vec<Keyframe>,
}

impl WavetableDefinition {
    pub fn new(keyframes: Vec<Keyframe>) -> Self {
        Self { keyframes }
    }

    /// Build from raw `(position, wave)` byte pairs, the layout of the ROM dump.
    pub fn from_pairs(pairs: &[(u8, u8)]) -> Self {
        Self {
            keyframes: pairs
                .iter()
                .map(|&(position, wave)| Keyframe::new(position, WaveId(wave)))
                .collect(),
        }
    }

    pub fn keyframes(&self) -> &[Keyframe] {
        &self.keyframes
    }

    /// Check ordering and wave ids. `table` is only used for error reporting.
    pub fn validate(&self, table: usize) -> Result<()> {
        let first = self
            .keyframes
            .first()
            .ok_or(BankError::EmptyTable { table })?;
        if first.position != 0 {
            return Err(BankError::FirstPosition {
                table,
                position: first.position,
            });
        }

        for pair in self.keyframes.windows(2) {
            if pair[1].position <= pair[0].position {
                return Err(BankError::UnorderedKeyframes {
                    table,
                    previous: pair[0].position,
                    position: pair[1].position,
                });
            }
        }

        for keyframe in &self.keyframes {
            if keyframe.position > MAX_POSITION {
                return Err(BankError::PositionOutOfRange {
                    table,
                    position: keyframe.position,
                });
            }
            if !keyframe.wave.is_keyframe_wave() {
                return Err(BankError::UnknownWave {
                    table,
                    wave: keyframe.wave.0,
                });
            }
        }

        Ok(())
    }
}

/// Immutable set of wave fragments and wavetable definitions.
///
/// Voices share a bank through `Arc<WaveBank>`; nothing mutates it after
/// construction.
#[derive(Debug, Clone)]
pub struct WaveBank {
    waves: Vec<[u8; FRAGMENT_LEN]>,
    tables: Vec<WavetableDefinition>,
}

impl WaveBank {
    /// Validate and assemble a bank.
    ///
    /// Definitions for the synthetic tables (28 and 29) are kept as given and
    /// never checked, since the generator does not read them.
    pub fn new(
        waves: Vec<[u8; FRAGMENT_LEN]>,
        tables: Vec<WavetableDefinition>,
    ) -> Result<Self> {
        if waves.len() != NUM_WAVES {
            return Err(BankError::WaveDataLength {
                expected: NUM_WAVES * FRAGMENT_LEN,
                waves: NUM_WAVES,
                actual: waves.len() * FRAGMENT_LEN,
            });
        }
        if tables.len() != NUM_WAVETABLES {
            return Err(BankError::TableCount {
                expected: NUM_WAVETABLES,
                actual: tables.len(),
            });
        }

        for (table, definition) in tables.iter().enumerate() {
            if is_synthetic(table) {
                continue;
            }
            definition.validate(table)?;
        }

        tracing::debug!(
            waves = waves.len(),
            tables = tables.len(),
            "wave bank loaded"
        );

        Ok(Self { waves, tables })
    }

    /// Load from a flat ROM dump: 204 fragments of 64 bytes back to back.
    pub fn from_rom(wave_data: &[u8], tables: Vec<WavetableDefinition>) -> Result<Self> {
        if wave_data.len() != NUM_WAVES * FRAGMENT_LEN {
            return Err(BankError::WaveDataLength {
                expected: NUM_WAVES * FRAGMENT_LEN,
                waves: NUM_WAVES,
                actual: wave_data.len(),
            });
        }

        let waves = wave_data
            .chunks_exact(FRAGMENT_LEN)
            .map(|chunk| {
                let mut fragment = [0u8; FRAGMENT_LEN];
                fragment.copy_from_slice(chunk);
                fragment
            })
            .collect();

        Self::new(waves, tables)
    }

    /// Assemble a bank from data generated in-crate.
    pub(super) fn from_trusted(
        waves: Vec<[u8; FRAGMENT_LEN]>,
        tables: Vec<WavetableDefinition>,
    ) -> Self {
        debug_assert_eq!(waves.len(), NUM_WAVES);
        debug_assert_eq!(tables.len(), NUM_WAVETABLES);
        debug_assert!(tables
            .iter()
            .enumerate()
            .all(|(table, def)| is_synthetic(table) || def.validate(table).is_ok()));
        Self { waves, tables }
    }

    /// Fragment for a memory wave, `None` for standard and synthetic ids.
    #[inline]
    pub fn fragment(&self, id: WaveId) -> Option<&[u8; FRAGMENT_LEN]> {
        self.waves.get(id.0 as usize)
    }

    pub fn table(&self, table: u8) -> Option<&WavetableDefinition> {
        self.tables.get(table as usize)
    }

    pub fn num_waves(&self) -> usize {
        self.waves.len()
    }
}

fn is_synthetic(table: usize) -> bool {
    table == WT_SYNC as usize || table == WT_STEP as usize
}
