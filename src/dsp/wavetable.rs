use std::sync::Arc;

use crate::dsp::phase::Q25TOF;
use crate::rom::{
    StandardWave, WaveBank, WaveId, WavetableDefinition, MAX_POSITION, WT_STEP, WT_SYNC, WT_UPPER,
};

/*
Wavetable Resolution
====================

Turns "wavetable number + continuous wave index" into "two waves and a
crossfade weight". The expensive part (walking keyframes) happens once per
wavetable change; per index change it is one array lookup and a multiply.

Vocabulary
----------

  keyframe    A (position, wave) point in a wavetable definition.
              Positions live on a 0..=60 grid.

  slot        One integer index position. Holds the two bracketing waves,
              the position the crossfade starts at (offset), and the
              reciprocal of the distance between the keyframes (scale).

  wave index  Continuous position 0..128 in Q7.25. Wraps.

  upper table Table 30. When enabled it fills the second half of the index
              range; otherwise the base table is reused there.


Index Layout
------------

The index sweeps a closed loop through both tables:

    0 ........ 60 | 60..64 | 64 ....... 124 | 124..128
    base table    | fade   | upper table,   | fade back
    forward       | to     | reversed       | to base
                  | upper  |                | position 0

Position 64 belongs to the upper half: it is the upper table's position 60.
Going below zero lands in the reversed upper half, so a negative modulation
mirrors the sweep around base position 0.

    alpha = (index - offset) * scale

Scales come from a reciprocal table rather than a division, WSCALER[n] is
1 / (n + 1).


Synthetic Tables
----------------

Tables 28 (hard sync) and 29 (step) have no fragments. Every slot of their
half holds the synthetic source with offset = slot and span 1, so alpha is
the fractional index. The generator parameter of each side is the folded
integer position (n for the lower, n + 1 for the upper source):

    p < 60   ->  p
    p < 64   ->  60
    p < 124  ->  124 - p
    else     ->  0
*/

/// Reciprocal interpolation spans, `WSCALER[n] = 1 / (n + 1)`.
pub const WSCALER: [f32; 64] = [
    1.0, 0.5, 0.333_333_34, 0.25, 0.2, 0.166_666_67, 0.142_857_15, 0.125,
    0.111_111_11, 0.1, 0.090_909_09, 0.083_333_336, 0.076_923_08, 0.071_428_575, 0.066_666_67, 0.0625,
    0.058_823_53, 0.055_555_556, 0.052_631_58, 0.05, 0.047_619_05, 0.045_454_547, 0.043_478_26, 0.041_666_668,
    0.04, 0.038_461_54, 0.037_037_037, 0.035_714_287, 0.034_482_76, 0.033_333_335, 0.032_258_064, 0.031_25,
    0.030_303_031, 0.029_411_765, 0.028_571_429, 0.027_777_778, 0.027_027_028, 0.026_315_79, 0.025_641_026, 0.025,
    0.024_390_243, 0.023_809_524, 0.023_255_814, 0.022_727_273, 0.022_222_223, 0.021_739_13, 0.021_276_595, 0.020_833_334,
    0.020_408_163, 0.02, 0.019_607_844, 0.019_230_77, 0.018_867_925, 0.018_518_519, 0.018_181_818, 0.017_857_144,
    0.017_543_86, 0.017_241_38, 0.016_949_153, 0.016_666_668, 0.016_393_442, 0.016_129_032, 0.015_873_017, 0.015_625,
];

/// Slots per definition expansion (positions 0..=60).
pub const TABLE_SLOTS: usize = MAX_POSITION as usize + 1;
/// Slots across the full index loop.
pub const SLOT_COUNT: usize = 128;

const UPPER_MIRROR: u8 = 124;
const TRANSITION_SPAN: u8 = 4;

/// What the generator evaluates for one side of the crossfade.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum WaveSource {
    /// Stored fragment.
    Memory(WaveId),
    Standard(StandardWave),
    /// Hard-sync ramp with its 0..=60 parameter.
    Sync(u8),
    /// Step wave with its 0..=60 parameter.
    Step(u8),
}

impl WaveSource {
    pub fn from_id(id: WaveId) -> Self {
        if let Some(standard) = id.standard() {
            WaveSource::Standard(standard)
        } else if id == WaveId::SYNC {
            WaveSource::Sync(0)
        } else if id == WaveId::STEP {
            WaveSource::Step(0)
        } else {
            WaveSource::Memory(id)
        }
    }

    #[inline]
    fn with_parameter(self, n: u8) -> Self {
        match self {
            WaveSource::Sync(_) => WaveSource::Sync(n),
            WaveSource::Step(_) => WaveSource::Step(n),
            other => other,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ResolvedWaveSlot {
    pub lower: WaveSource,
    pub upper: WaveSource,
    /// Index position where alpha is zero.
    pub offset: u8,
    /// Distance between the bracketing keyframes, 0 past the last one.
    pub span: u8,
    pub scale: f32,
}

impl ResolvedWaveSlot {
    fn bracket(lower: WaveSource, upper: WaveSource, offset: u8, span: u8) -> Self {
        Self {
            lower,
            upper,
            offset,
            span,
            scale: match span {
                0 => 0.0,
                s => WSCALER
                    .get(s as usize - 1)
                    .copied()
                    .unwrap_or(1.0 / s as f32),
            },
        }
    }

    /// A single wave with zero weight on the other side.
    fn flat(wave: WaveSource, offset: u8) -> Self {
        Self {
            lower: wave,
            upper: wave,
            offset,
            span: 0,
            scale: 0.0,
        }
    }

    /// Mirror a base-table slot into the reversed upper half.
    fn reversed(self) -> Self {
        if self.span == 0 {
            return Self::flat(self.lower, UPPER_MIRROR.saturating_sub(self.offset));
        }
        Self {
            lower: self.upper,
            upper: self.lower,
            offset: UPPER_MIRROR.saturating_sub(self.offset.saturating_add(self.span)),
            span: self.span,
            scale: self.scale,
        }
    }
}

pub type SlotTable = [ResolvedWaveSlot; SLOT_COUNT];

/// The two sources the generator crossfades and the weight of `upper`.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ActiveWaves {
    pub lower: WaveSource,
    pub upper: WaveSource,
    pub alpha: f32,
}

const FALLBACK: WaveSource = WaveSource::Memory(WaveId(0));

/// Expand a keyframe list to one slot per position 0..=60.
///
/// For slot `n` the bracketing keyframes satisfy `lower <= n < upper`; slots
/// at or past the last keyframe hold that keyframe's wave alone.
pub fn expand_definition(definition: &WavetableDefinition) -> [ResolvedWaveSlot; TABLE_SLOTS] {
    let keyframes = definition.keyframes();
    let mut slots = [ResolvedWaveSlot::flat(FALLBACK, 0); TABLE_SLOTS];
    if keyframes.is_empty() {
        return slots;
    }

    let mut k = 0;
    for (n, slot) in slots.iter_mut().enumerate() {
        while k + 1 < keyframes.len() && keyframes[k + 1].position as usize <= n {
            k += 1;
        }
        let lo = keyframes[k];
        *slot = match keyframes.get(k + 1) {
            Some(hi) => ResolvedWaveSlot::bracket(
                WaveSource::from_id(lo.wave),
                WaveSource::from_id(hi.wave),
                lo.position,
                hi.position.saturating_sub(lo.position),
            ),
            None => ResolvedWaveSlot::flat(WaveSource::from_id(lo.wave), lo.position),
        };
    }
    slots
}

#[derive(Clone, Copy)]
enum Half<'a> {
    Table(&'a WavetableDefinition),
    Synthetic(WaveSource),
}

fn synthetic_source(table: u8) -> Option<WaveSource> {
    match table {
        WT_SYNC => Some(WaveSource::Sync(0)),
        WT_STEP => Some(WaveSource::Step(0)),
        _ => None,
    }
}

/// Build the 128-slot loop for `table`, with table 30 on the upper half when
/// `use_upper` is set. Returns `None` for table numbers the bank lacks.
pub fn build_slot_table(bank: &WaveBank, table: u8, use_upper: bool) -> Option<SlotTable> {
    let base = match synthetic_source(table) {
        Some(source) => Half::Synthetic(source),
        None => Half::Table(bank.table(table)?),
    };
    let upper = if use_upper {
        Half::Table(bank.table(WT_UPPER)?)
    } else {
        base
    };

    let mut slots = [ResolvedWaveSlot::flat(FALLBACK, 0); SLOT_COUNT];

    let (base_first, base_last) = match base {
        Half::Table(def) => {
            let expanded = expand_definition(def);
            slots[..60].copy_from_slice(&expanded[..60]);
            (expanded[0].lower, expanded[59].upper)
        }
        Half::Synthetic(source) => {
            for (p, slot) in slots[..60].iter_mut().enumerate() {
                *slot = ResolvedWaveSlot::bracket(source, source, p as u8, 1);
            }
            (source, source)
        }
    };

    let (upper_first, upper_last) = match upper {
        Half::Table(def) => {
            let expanded = expand_definition(def);
            for p in 1..TABLE_SLOTS {
                slots[UPPER_MIRROR as usize - p] = expanded[p - 1].reversed();
            }
            (expanded[0].lower, expanded[59].upper)
        }
        Half::Synthetic(source) => {
            for p in 64..UPPER_MIRROR as usize {
                slots[p] = ResolvedWaveSlot::bracket(source, source, p as u8, 1);
            }
            (source, source)
        }
    };

    for slot in &mut slots[60..64] {
        *slot = ResolvedWaveSlot::bracket(base_last, upper_last, 60, TRANSITION_SPAN);
    }
    for slot in &mut slots[124..128] {
        *slot = ResolvedWaveSlot::bracket(upper_first, base_first, UPPER_MIRROR, TRANSITION_SPAN);
    }

    Some(slots)
}

/// Synthetic-wave parameter for integer index position `p`.
#[inline]
fn fold_position(p: usize) -> u8 {
    let p = (p & 127) as u8;
    if p < 60 {
        p
    } else if p < 64 {
        60
    } else if p < UPPER_MIRROR {
        UPPER_MIRROR - p
    } else {
        0
    }
}

/// Look up the active waves for a Q7.25 index. Pure; the resolver caches it.
#[inline]
pub fn resolve_slot(slots: &SlotTable, index: u32) -> ActiveWaves {
    let i = (index >> 25) as usize;
    let slot = &slots[i];
    let x = index as f32 * Q25TOF;
    let alpha = ((x - slot.offset as f32) * slot.scale).clamp(0.0, 1.0);
    ActiveWaves {
        lower: slot.lower.with_parameter(fold_position(i)),
        upper: slot.upper.with_parameter(fold_position(i + 1)),
        alpha,
    }
}

/// Float wave position (any value, wraps at 128) to Q7.25.
///
/// ```
/// use ppg_wave::dsp::wavetable::position_to_index;
///
/// assert_eq!(position_to_index(1.5), 3 << 24);
/// assert_eq!(position_to_index(-1.0), 127 << 25);
/// ```
pub fn position_to_index(position: f32) -> u32 {
    if !position.is_finite() {
        return 0;
    }
    let wrapped = position.rem_euclid(128.0) as f64;
    // rem_euclid may round up to exactly 128.0, the u64 step wraps that to 0
    (wrapped * 33_554_432.0) as u64 as u32
}

/// Caches the slot table of the selected wavetable and the waves at the
/// current index.
pub struct WavetableResolver {
    bank: Arc<WaveBank>,
    selector: Option<u8>,
    table: u8,
    use_upper: bool,
    slots: SlotTable,
    index: u32,
    stale: bool,
    active: ActiveWaves,
}

impl WavetableResolver {
    /// Resolver with wavetable 0 and the upper table loaded, index 0.
    pub fn new(bank: Arc<WaveBank>) -> Self {
        let slot = ResolvedWaveSlot::flat(FALLBACK, 0);
        let mut resolver = Self {
            bank,
            selector: None,
            table: 0,
            use_upper: true,
            slots: [slot; SLOT_COUNT],
            index: 0,
            stale: true,
            active: ActiveWaves {
                lower: FALLBACK,
                upper: FALLBACK,
                alpha: 0.0,
            },
        };
        resolver.select_wavetable(0);
        resolver
    }

    /// Select by host number: wraps mod 61, 30 and above disables the upper
    /// table. Returns false when the normalized number did not change.
    pub fn select_wavetable(&mut self, selector: u8) -> bool {
        let selector = selector % 61;
        if self.selector == Some(selector) {
            return false;
        }
        let (table, use_upper) = if selector >= WT_UPPER {
            (selector - WT_UPPER, false)
        } else {
            (selector, true)
        };
        if !self.load_table(table, use_upper) {
            return false;
        }
        self.selector = Some(selector);
        true
    }

    /// Load a table directly. Numbers above 30 are ignored and the current
    /// table kept.
    pub fn load_table(&mut self, table: u8, use_upper: bool) -> bool {
        if table > WT_UPPER {
            tracing::debug!(table, "ignoring out of range wavetable");
            return false;
        }
        let Some(slots) = build_slot_table(&self.bank, table, use_upper) else {
            tracing::warn!(table, "wave bank has no definition for wavetable");
            return false;
        };

        self.slots = slots;
        self.selector = None;
        self.table = table;
        self.use_upper = use_upper;
        self.stale = true;
        self.apply(self.index);

        tracing::debug!(table, use_upper, "wavetable loaded");
        true
    }

    /// Set the index in Q7.25. The same value twice is a no-op.
    #[inline]
    pub fn set_wave_index(&mut self, index: u32) {
        if !self.stale && index == self.index {
            return;
        }
        self.apply(index);
    }

    /// Set the index in float positions.
    pub fn set_wave_position(&mut self, position: f32) {
        self.set_wave_index(position_to_index(position));
    }

    #[inline]
    fn apply(&mut self, index: u32) {
        self.index = index;
        self.active = resolve_slot(&self.slots, index);
        self.stale = false;
    }

    #[inline]
    pub fn active(&self) -> &ActiveWaves {
        &self.active
    }

    pub fn index(&self) -> u32 {
        self.index
    }

    pub fn slots(&self) -> &SlotTable {
        &self.slots
    }

    pub fn bank(&self) -> &Arc<WaveBank> {
        &self.bank
    }

    /// Loaded table number and whether the upper table is in use.
    pub fn table(&self) -> (u8, bool) {
        (self.table, self.use_upper)
    }
}
