// Two-pass cascaded key estimation.
//
// Pass 1 decodes the pitch-class observations over the 24 keys with the
// configured transition table (modulations allowed) and the key-profile
// emission table. The result is a local key per note: musically plausible
// but noisy, since a few chromatic notes can tip it into a neighbouring key.
//
// Pass 2 treats that local key path as a new observation sequence. Its
// emission table is pass 1's transition table (P(surface key j | underlying
// key i) is taken to be the key distance from i to j) and its transition
// table is the identity (no modulation). Under the identity only constant
// paths have a finite score, so pass 2 picks the single key that best
// explains the whole local path: a likelihood-weighted majority vote. That
// key is the global estimate.
//
// `KeyModel` owns the three tables and the uniform start distribution. It
// is built once from a resolved configuration and is immutable afterwards,
// so one model can serve any number of estimates, from any thread.

use crate::config::{KeyTrackerConfig, ResolvedConfig};
use crate::error::{KeyTrackerError, Result};
use crate::key::{Key, NUM_KEYS, NUM_PITCH_CLASSES};
use crate::profiles::{DistanceProfile, DistanceProfileName, KeyProfileName, ModeProfiles};
use crate::rotation::{EmissionTable, TransitionTable};
use crate::viterbi::decode;
use serde::Serialize;
use tracing::{debug, warn};

#[derive(Debug, Clone)]
pub struct KeyModel {
    transitions: TransitionTable,
    emissions: EmissionTable,
    no_modulation: TransitionTable,
    start: [f64; NUM_KEYS],
}

impl KeyModel {
    pub fn new(distance: &DistanceProfile, profiles: &ModeProfiles) -> Self {
        KeyModel {
            transitions: TransitionTable::from_profile(distance),
            emissions: EmissionTable::from_profiles(profiles),
            no_modulation: TransitionTable::from_profile(&DistanceProfile::named(
                DistanceProfileName::NoModulation,
            )),
            start: [1.0 / NUM_KEYS as f64; NUM_KEYS],
        }
    }

    pub fn from_names(transitions: DistanceProfileName, key_profile: KeyProfileName) -> Self {
        KeyModel::new(
            &DistanceProfile::named(transitions),
            &ModeProfiles::named(key_profile),
        )
    }

    pub fn from_resolved(resolved: &ResolvedConfig) -> Self {
        KeyModel::new(&resolved.distance, &resolved.profiles)
    }

    pub fn from_config(config: &KeyTrackerConfig) -> Result<Self> {
        Ok(KeyModel::from_resolved(&config.resolve()?))
    }

    /// Pass-1 transition table, reused as the pass-2 emission table.
    pub fn transitions(&self) -> &TransitionTable {
        &self.transitions
    }

    pub fn emissions(&self) -> &EmissionTable {
        &self.emissions
    }

    /// Estimate the key of a sequence of pitch classes (0-11).
    pub fn estimate(&self, pitch_classes: &[u8]) -> Result<KeyEstimate> {
        let observations = pitch_class_symbols(pitch_classes)?;

        let local = decode(
            &observations,
            &self.start,
            &self.transitions,
            &self.emissions,
        )?;
        debug!(
            notes = observations.len(),
            log_prob = local.log_prob,
            "local key pass done"
        );
        let local_path: Vec<Key> = local.states.iter().map(|&s| Key::ALL[s]).collect();

        let (global_key, global_log_prob) = self.decode_global(&local_path)?;
        if local.log_prob == f64::NEG_INFINITY || global_log_prob == f64::NEG_INFINITY {
            warn!("no key explains the observations under the configured tables");
        }

        Ok(KeyEstimate {
            global_key,
            local_path,
            local_log_prob: local.log_prob,
            global_log_prob,
        })
    }

    /// The second pass on its own: the single key best explaining a local
    /// key path, with identity transitions and the key-distance table as
    /// emissions.
    pub fn decode_global(&self, local_path: &[Key]) -> Result<(Key, f64)> {
        let observations: Vec<usize> = local_path.iter().map(|k| k.index()).collect();
        let global = decode(
            &observations,
            &self.start,
            &self.no_modulation,
            &self.transitions,
        )?;
        debug!(
            key = %Key::ALL[global.states[0]],
            log_prob = global.log_prob,
            "global key pass done"
        );
        Ok((Key::ALL[global.states[0]], global.log_prob))
    }
}

/// Free-function form of `KeyModel::estimate`.
pub fn estimate_key(pitch_classes: &[u8], model: &KeyModel) -> Result<KeyEstimate> {
    model.estimate(pitch_classes)
}

fn pitch_class_symbols(pitch_classes: &[u8]) -> Result<Vec<usize>> {
    if pitch_classes.is_empty() {
        return Err(KeyTrackerError::EmptyObservations);
    }
    pitch_classes
        .iter()
        .enumerate()
        .map(|(index, &pc)| {
            let symbol = pc as usize;
            if symbol < NUM_PITCH_CLASSES {
                Ok(symbol)
            } else {
                Err(KeyTrackerError::SymbolOutOfRange {
                    index,
                    symbol,
                    limit: NUM_PITCH_CLASSES,
                })
            }
        })
        .collect()
}

/// Result of the two-pass cascade.
///
/// Non-finite log-probabilities serialise as `null`.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct KeyEstimate {
    pub global_key: Key,
    pub local_path: Vec<Key>,
    pub local_log_prob: f64,
    pub global_log_prob: f64,
}

impl KeyEstimate {
    /// False when either pass found no state sequence able to explain its
    /// observations (log-probability of negative infinity). The reported key
    /// then falls out of tie-breaking and carries no information.
    pub fn is_confident(&self) -> bool {
        self.local_log_prob.is_finite() && self.global_log_prob.is_finite()
    }

    /// Number of key changes along the local path.
    pub fn local_modulations(&self) -> usize {
        self.local_path.windows(2).filter(|w| w[0] != w[1]).count()
    }
}
