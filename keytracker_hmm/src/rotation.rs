// Transposing C-relative base vectors into full HMM tables.
//
// Every major key is a transposition of C major and every minor key a
// transposition of c minor, so one distance profile and one key profile per
// mode are enough to fill the 24x24 transition table and the 24x12 emission
// table. Each row is the base vector cyclically shifted so that the entry
// authored for C lands on the row's own tonic.
//
// Minor rows are the awkward case. The distance profile is authored from a
// major reference, so for a minor state the halves swap roles: its distances
// to the major keys come from the relative half, shifted by `(i + 3) mod 12`
// (a minor tonic's relative major sits three semitones above it), and its
// distances to the other minor keys come from the tonic half, shifted by
// `i mod 12`. Rows are never renormalised.

use crate::key::{Key, NUM_KEYS, NUM_PITCH_CLASSES};
use crate::profiles::{DistanceProfile, ModeProfiles};
use crate::table::ProbabilityTable;

/// Cyclic shift moving the element at position `p` to `(p + shift) % 12`.
pub fn rotate(values: &[f64; NUM_PITCH_CLASSES], shift: usize) -> [f64; NUM_PITCH_CLASSES] {
    let mut out = *values;
    out.rotate_right(shift % NUM_PITCH_CLASSES);
    out
}

/// Key-to-key probabilities. Row = source key, column = destination key,
/// both in canonical order.
#[derive(Debug, Clone, PartialEq)]
pub struct TransitionTable {
    probs: [[f64; NUM_KEYS]; NUM_KEYS],
}

impl TransitionTable {
    pub fn from_profile(profile: &DistanceProfile) -> Self {
        let tonic_half = profile.tonic_half();
        let relative_half = profile.relative_half();
        let mut probs = [[0.0; NUM_KEYS]; NUM_KEYS];

        for (i, row) in probs.iter_mut().enumerate() {
            let (to_major, to_minor) = if Key::ALL[i].is_major() {
                (rotate(&tonic_half, i), rotate(&relative_half, i))
            } else {
                (
                    rotate(&relative_half, (i + 3) % NUM_PITCH_CLASSES),
                    rotate(&tonic_half, i % NUM_PITCH_CLASSES),
                )
            };
            row[..NUM_PITCH_CLASSES].copy_from_slice(&to_major);
            row[NUM_PITCH_CLASSES..].copy_from_slice(&to_minor);
        }

        TransitionTable { probs }
    }

    pub fn row(&self, from: Key) -> &[f64; NUM_KEYS] {
        &self.probs[from.index()]
    }

    pub fn get(&self, from: Key, to: Key) -> f64 {
        self.probs[from.index()][to.index()]
    }
}

impl ProbabilityTable for TransitionTable {
    fn rows(&self) -> usize {
        NUM_KEYS
    }

    fn columns(&self) -> usize {
        NUM_KEYS
    }

    fn probability(&self, row: usize, column: usize) -> f64 {
        self.probs[row][column]
    }
}

/// Key-to-pitch-class probabilities.
#[derive(Debug, Clone, PartialEq)]
pub struct EmissionTable {
    probs: [[f64; NUM_PITCH_CLASSES]; NUM_KEYS],
}

impl EmissionTable {
    pub fn from_profiles(profiles: &ModeProfiles) -> Self {
        let mut probs = [[0.0; NUM_PITCH_CLASSES]; NUM_KEYS];
        for (row, key) in probs.iter_mut().zip(Key::ALL) {
            let base = profiles.for_mode(key.mode()).weights();
            *row = rotate(base, key.tonic() as usize);
        }
        EmissionTable { probs }
    }

    pub fn row(&self, key: Key) -> &[f64; NUM_PITCH_CLASSES] {
        &self.probs[key.index()]
    }

    pub fn get(&self, key: Key, pitch_class: u8) -> f64 {
        self.probs[key.index()][pitch_class as usize]
    }
}

impl ProbabilityTable for EmissionTable {
    fn rows(&self) -> usize {
        NUM_KEYS
    }

    fn columns(&self) -> usize {
        NUM_PITCH_CLASSES
    }

    fn probability(&self, row: usize, column: usize) -> f64 {
        self.probs[row][column]
    }
}
