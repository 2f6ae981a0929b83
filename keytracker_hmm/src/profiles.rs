// Named base vectors for the key-tracking HMM.
//
// Two kinds of data live here, both authored relative to C:
//
// - Distance profiles (24 weights): how close every key is to C major.
//   Positions 0-11 are the major keys C..B (the "tonic half"), positions
//   12-23 the minor keys c..b (the "relative half"). All variants derive
//   from one table of neighbour levels on the bidimensional key map
//   (fifths on one axis, relative/parallel on the other):
//
//       D   d   F   f   Ab  ab  Cb  cb  Ebb
//       A   a   C   c   Eb  eb  Gb  gb  Bbb
//       E   e   G   g   Bb  bb  Db  db  Fb
//       B   b   D   d   F   f   Ab  ab  Cb
//       F#  f#  A   a   C   c   Eb  eb  Gb
//       C#  c#  E   e   G   g   Bb  bb  Db
//       G#  g#  B   b   D   d   F   f   Ab
//       D#  d#  F#  f#  A   a   C   c   Eb
//       A#  a#  C#  c#  E   e   G   g   Bb
//
//   With C in the middle, keys fall into nine groups by geometric distance:
//   level 1 is C itself, level 2 is {G, F, a, c}, ..., level 9 is F#.
//
// - Key profiles (12 weights per mode): expected pitch-class emphasis when
//   the tonic is C. The empirical profiles are stored normalised so each
//   mode's vector sums to 1; the `-raw` variants keep the published values
//   and are usable as-is, since decoding only compares log-weights.
//
// Rotating these to every other tonic is `rotation.rs`'s job. Profiles are
// selected by name (`DistanceProfileName`, `KeyProfileName`) and resolved
// once, at configuration time (see `config.rs`).

use crate::error::{KeyTrackerError, Result};
use crate::key::{KeyMode, NUM_KEYS, NUM_PITCH_CLASSES};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

// ---------------------------------------------------------------------------
// Distance profiles
// ---------------------------------------------------------------------------

/// Neighbour level of every key relative to C major (1 = C itself, 9 = F#).
pub const NEIGHBOUR_LEVEL: [u8; NUM_KEYS] = [
    1, 6, 4, 4, 5, 2, 9, 2, 5, 4, 4, 6, // C Db D Eb E F F# G Ab A Bb B
    2, 8, 3, 7, 3, 3, 7, 3, 8, 2, 5, 5, // c c# d eb e f f# g ab a bb b
];

/// Number of neighbour levels in `NEIGHBOUR_LEVEL`.
const NUM_LEVELS: u8 = 9;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum DistanceProfileName {
    /// Weight falls linearly with neighbour level: `(10 - level) / 132`.
    Linear,
    /// Weight halves with each neighbour level.
    Exponential,
    /// Weight drops tenfold with each neighbour level.
    #[serde(rename = "exponential-10")]
    Exponential10,
    /// Probability 1 of staying in the same key, 0 of moving.
    NoModulation,
    /// The raw neighbour levels, unnormalised (higher = farther).
    NeighbourLevelCount,
}

impl DistanceProfileName {
    pub const ALL: [DistanceProfileName; 5] = [
        DistanceProfileName::Linear,
        DistanceProfileName::Exponential,
        DistanceProfileName::Exponential10,
        DistanceProfileName::NoModulation,
        DistanceProfileName::NeighbourLevelCount,
    ];

    pub fn name(self) -> &'static str {
        match self {
            DistanceProfileName::Linear => "linear",
            DistanceProfileName::Exponential => "exponential",
            DistanceProfileName::Exponential10 => "exponential-10",
            DistanceProfileName::NoModulation => "no-modulation",
            DistanceProfileName::NeighbourLevelCount => "neighbour-level-count",
        }
    }
}

impl fmt::Display for DistanceProfileName {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl FromStr for DistanceProfileName {
    type Err = KeyTrackerError;

    fn from_str(s: &str) -> Result<Self> {
        let wanted = normalise_name(s);
        DistanceProfileName::ALL
            .into_iter()
            .find(|p| p.name() == wanted)
            .ok_or_else(|| KeyTrackerError::UnknownProfile {
                kind: "transition",
                name: s.to_string(),
                expected: join_names(DistanceProfileName::ALL.iter().map(|p| p.name())),
            })
    }
}

/// A 24-weight closeness vector relative to C major.
#[derive(Debug, Clone, PartialEq)]
pub struct DistanceProfile {
    weights: [f64; NUM_KEYS],
}

impl DistanceProfile {
    pub fn named(name: DistanceProfileName) -> Self {
        let weights = match name {
            DistanceProfileName::Linear => {
                normalised(NEIGHBOUR_LEVEL.map(|level| f64::from(NUM_LEVELS + 1 - level)))
            }
            DistanceProfileName::Exponential => exponential(2.0),
            DistanceProfileName::Exponential10 => exponential(10.0),
            DistanceProfileName::NoModulation => {
                let mut w = [0.0; NUM_KEYS];
                w[0] = 1.0;
                w
            }
            DistanceProfileName::NeighbourLevelCount => NEIGHBOUR_LEVEL.map(f64::from),
        };
        DistanceProfile { weights }
    }

    /// Build from a caller-supplied vector; it must have 24 finite
    /// nonnegative entries.
    pub fn from_weights(weights: &[f64]) -> Result<Self> {
        Ok(DistanceProfile {
            weights: checked_array("distance profile", weights)?,
        })
    }

    pub fn weights(&self) -> &[f64; NUM_KEYS] {
        &self.weights
    }

    /// Distances from C major to the 12 major keys.
    pub fn tonic_half(&self) -> [f64; NUM_PITCH_CLASSES] {
        half(&self.weights, 0)
    }

    /// Distances from C major to the 12 minor keys.
    pub fn relative_half(&self) -> [f64; NUM_PITCH_CLASSES] {
        half(&self.weights, NUM_PITCH_CLASSES)
    }
}

fn exponential(base: f64) -> [f64; NUM_KEYS] {
    normalised(NEIGHBOUR_LEVEL.map(|level| base.powi(-(i32::from(level) - 1))))
}

fn half(weights: &[f64; NUM_KEYS], start: usize) -> [f64; NUM_PITCH_CLASSES] {
    let mut out = [0.0; NUM_PITCH_CLASSES];
    out.copy_from_slice(&weights[start..start + NUM_PITCH_CLASSES]);
    out
}

fn normalised<const N: usize>(raw: [f64; N]) -> [f64; N] {
    let total: f64 = raw.iter().sum();
    raw.map(|w| w / total)
}

// ---------------------------------------------------------------------------
// Key profiles
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum KeyProfileName {
    /// Krumhansl & Kessler probe-tone ratings.
    KrumhanslKessler,
    /// Aarden's Essen folksong corpus counts.
    AardenEssen,
    /// Sapp's simple scale-membership weights.
    Sapp,
    /// Bellman & Budge corpus counts.
    BellmanBudge,
    /// Temperley's Kostka-Payne corpus profile.
    Temperley,
    KrumhanslKesslerRaw,
    AardenEssenRaw,
    SappRaw,
    BellmanBudgeRaw,
    TemperleyRaw,
}

impl KeyProfileName {
    pub const ALL: [KeyProfileName; 10] = [
        KeyProfileName::KrumhanslKessler,
        KeyProfileName::AardenEssen,
        KeyProfileName::Sapp,
        KeyProfileName::BellmanBudge,
        KeyProfileName::Temperley,
        KeyProfileName::KrumhanslKesslerRaw,
        KeyProfileName::AardenEssenRaw,
        KeyProfileName::SappRaw,
        KeyProfileName::BellmanBudgeRaw,
        KeyProfileName::TemperleyRaw,
    ];

    pub fn name(self) -> &'static str {
        match self {
            KeyProfileName::KrumhanslKessler => "krumhansl-kessler",
            KeyProfileName::AardenEssen => "aarden-essen",
            KeyProfileName::Sapp => "sapp",
            KeyProfileName::BellmanBudge => "bellman-budge",
            KeyProfileName::Temperley => "temperley",
            KeyProfileName::KrumhanslKesslerRaw => "krumhansl-kessler-raw",
            KeyProfileName::AardenEssenRaw => "aarden-essen-raw",
            KeyProfileName::SappRaw => "sapp-raw",
            KeyProfileName::BellmanBudgeRaw => "bellman-budge-raw",
            KeyProfileName::TemperleyRaw => "temperley-raw",
        }
    }

    /// The `-raw` variants hold the published values as-is; their modes
    /// do not sum to 1.
    pub fn is_raw(self) -> bool {
        self.normalised() != self
    }

    /// The sum-to-one counterpart of a `-raw` variant (identity otherwise).
    pub fn normalised(self) -> KeyProfileName {
        match self {
            KeyProfileName::KrumhanslKesslerRaw => KeyProfileName::KrumhanslKessler,
            KeyProfileName::AardenEssenRaw => KeyProfileName::AardenEssen,
            KeyProfileName::SappRaw => KeyProfileName::Sapp,
            KeyProfileName::BellmanBudgeRaw => KeyProfileName::BellmanBudge,
            KeyProfileName::TemperleyRaw => KeyProfileName::Temperley,
            other => other,
        }
    }
}

impl fmt::Display for KeyProfileName {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl FromStr for KeyProfileName {
    type Err = KeyTrackerError;

    fn from_str(s: &str) -> Result<Self> {
        let wanted = normalise_name(s);
        KeyProfileName::ALL
            .into_iter()
            .find(|p| p.name() == wanted)
            .ok_or_else(|| KeyTrackerError::UnknownProfile {
                kind: "key",
                name: s.to_string(),
                expected: join_names(KeyProfileName::ALL.iter().map(|p| p.name())),
            })
    }
}

/// Expected pitch-class emphasis for one mode with its tonic at C.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct KeyProfile {
    weights: [f64; NUM_PITCH_CLASSES],
}

impl KeyProfile {
    pub fn from_weights(weights: &[f64]) -> Result<Self> {
        Ok(KeyProfile {
            weights: checked_array("key profile", weights)?,
        })
    }

    pub fn weights(&self) -> &[f64; NUM_PITCH_CLASSES] {
        &self.weights
    }
}

/// A major/minor pair of key profiles.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ModeProfiles {
    pub major: KeyProfile,
    pub minor: KeyProfile,
}

impl ModeProfiles {
    pub fn named(name: KeyProfileName) -> Self {
        let (major, minor) = match name {
            KeyProfileName::KrumhanslKessler => (KRUMHANSL_KESSLER_MAJOR, KRUMHANSL_KESSLER_MINOR),
            KeyProfileName::AardenEssen => (AARDEN_ESSEN_MAJOR, AARDEN_ESSEN_MINOR),
            KeyProfileName::Sapp => (SAPP_MAJOR, SAPP_MINOR),
            KeyProfileName::BellmanBudge => (BELLMAN_BUDGE_MAJOR, BELLMAN_BUDGE_MINOR),
            KeyProfileName::Temperley => (TEMPERLEY_MAJOR, TEMPERLEY_MINOR),
            KeyProfileName::KrumhanslKesslerRaw => {
                (KRUMHANSL_KESSLER_MAJOR_RAW, KRUMHANSL_KESSLER_MINOR_RAW)
            }
            KeyProfileName::AardenEssenRaw => (AARDEN_ESSEN_MAJOR_RAW, AARDEN_ESSEN_MINOR_RAW),
            KeyProfileName::SappRaw => (SAPP_MAJOR_RAW, SAPP_MINOR_RAW),
            KeyProfileName::BellmanBudgeRaw => (BELLMAN_BUDGE_MAJOR_RAW, BELLMAN_BUDGE_MINOR_RAW),
            KeyProfileName::TemperleyRaw => (TEMPERLEY_MAJOR_RAW, TEMPERLEY_MINOR_RAW),
        };
        ModeProfiles {
            major: KeyProfile { weights: major },
            minor: KeyProfile { weights: minor },
        }
    }

    pub fn for_mode(&self, mode: KeyMode) -> &KeyProfile {
        match mode {
            KeyMode::Major => &self.major,
            KeyMode::Minor => &self.minor,
        }
    }
}

const KRUMHANSL_KESSLER_MAJOR: [f64; 12] = [
    0.15195022732711172, 0.0533620483369227, 0.08327351040918879, 0.05575496530270399,
    0.10480976310122037, 0.09787030390045463, 0.06030150753768843, 0.1241923905240488,
    0.05719071548217276, 0.08758076094759511, 0.05479779851639147, 0.06891600861450106,
];
const KRUMHANSL_KESSLER_MINOR: [f64; 12] = [
    0.14221523253201526, 0.06021118849696697, 0.07908335205571781, 0.12087171422152324,
    0.05841383958660975, 0.07930802066951245, 0.05706582790384183, 0.1067175915524601,
    0.08941810829027184, 0.06043585711076162, 0.07503931700741405, 0.07121995057290496,
];
const AARDEN_ESSEN_MAJOR: [f64; 12] = [
    0.17766092893562843, 0.001456239417504233, 0.1492649402940239, 0.0016018593592562562,
    0.19804892078043168, 0.11358695456521818, 0.002912478835008466, 0.2206199117520353,
    0.001456239417504233, 0.08154936738025305, 0.002329979068008373, 0.049512180195127924,
];
const AARDEN_ESSEN_MINOR: [f64; 12] = [
    0.18264800547944018, 0.007376190221285707, 0.14049900421497014, 0.16859900505797015,
    0.0070249402107482066, 0.14436200433086013, 0.0070249402107482066, 0.18616100558483017,
    0.04566210136986304, 0.019318600579558018, 0.07376190221285707, 0.017562300526869017,
];
const SAPP_MAJOR: [f64; 12] = [
    0.2222222222222222, 0.0, 0.1111111111111111, 0.0,
    0.1111111111111111, 0.1111111111111111, 0.0, 0.2222222222222222,
    0.0, 0.1111111111111111, 0.0, 0.1111111111111111,
];
const SAPP_MINOR: [f64; 12] = [
    0.2222222222222222, 0.0, 0.1111111111111111, 0.1111111111111111,
    0.0, 0.1111111111111111, 0.0, 0.2222222222222222,
    0.1111111111111111, 0.0, 0.05555555555555555, 0.05555555555555555,
];
const BELLMAN_BUDGE_MAJOR: [f64; 12] = [
    0.168, 0.0086, 0.1295, 0.0141,
    0.1349, 0.1193, 0.0125, 0.2028,
    0.018000000000000002, 0.0804, 0.0062, 0.1057,
];
const BELLMAN_BUDGE_MINOR: [f64; 12] = [
    0.1816, 0.0069, 0.12990000000000002, 0.1334,
    0.010700000000000001, 0.1115, 0.0138, 0.2107,
    0.07490000000000001, 0.015300000000000001, 0.0092, 0.10210000000000001,
];
const TEMPERLEY_MAJOR: [f64; 12] = [
    0.17616580310880825, 0.014130946773433817, 0.11493170042392838, 0.019312293923692884,
    0.15779557230334432, 0.10833725859632594, 0.02260951483749411, 0.16839378238341965,
    0.02449364107395195, 0.08619877531794629, 0.013424399434762127, 0.09420631182289213,
];
const TEMPERLEY_MINOR: [f64; 12] = [
    0.1702127659574468, 0.020081281377002155, 0.1133158020559407, 0.14774085584508725,
    0.011714080803251255, 0.10996892182644036, 0.02510160172125269, 0.1785799665311977,
    0.09658140090843893, 0.016017212526894576, 0.03179536218025341, 0.07889074826679417,
];

// Published values, before normalisation.
const KRUMHANSL_KESSLER_MAJOR_RAW: [f64; 12] = [
    6.35, 2.23, 3.48, 2.33, 4.38, 4.09, 2.52, 5.19, 2.39, 3.66, 2.29, 2.88,
];
const KRUMHANSL_KESSLER_MINOR_RAW: [f64; 12] = [
    6.33, 2.68, 3.52, 5.38, 2.6, 3.53, 2.54, 4.75, 3.98, 2.69, 3.34, 3.17,
];
const AARDEN_ESSEN_MAJOR_RAW: [f64; 12] = [
    17.7661, 0.145624, 14.9265, 0.160186, 19.8049, 11.3587, 0.291248, 22.062, 0.145624, 8.15494,
    0.232998, 4.95122,
];
const AARDEN_ESSEN_MINOR_RAW: [f64; 12] = [
    18.2648, 0.737619, 14.0499, 16.8599, 0.702494, 14.4362, 0.702494, 18.6161, 4.56621, 1.93186,
    7.37619, 1.75623,
];
const SAPP_MAJOR_RAW: [f64; 12] = [
    2.0, 0.0, 1.0, 0.0, 1.0, 1.0, 0.0, 2.0, 0.0, 1.0, 0.0, 1.0,
];
const SAPP_MINOR_RAW: [f64; 12] = [
    2.0, 0.0, 1.0, 1.0, 0.0, 1.0, 0.0, 2.0, 1.0, 0.0, 0.5, 0.5,
];
const BELLMAN_BUDGE_MAJOR_RAW: [f64; 12] = [
    16.8, 0.86, 12.95, 1.41, 13.49, 11.93, 1.25, 20.28, 1.8, 8.04, 0.62, 10.57,
];
const BELLMAN_BUDGE_MINOR_RAW: [f64; 12] = [
    18.16, 0.69, 12.99, 13.34, 1.07, 11.15, 1.38, 21.07, 7.49, 1.53, 0.92, 10.21,
];
const TEMPERLEY_MAJOR_RAW: [f64; 12] = [
    0.748, 0.06, 0.488, 0.082, 0.67, 0.46, 0.096, 0.715, 0.104, 0.366, 0.057, 0.4,
];
const TEMPERLEY_MINOR_RAW: [f64; 12] = [
    0.712, 0.084, 0.474, 0.618, 0.049, 0.46, 0.105, 0.747, 0.404, 0.067, 0.133, 0.33,
];

// ---------------------------------------------------------------------------
// Helpers
// ---------------------------------------------------------------------------

/// Lower-case and accept `_` or spaces in place of `-`, so
/// `Krumhansl_Kessler` resolves the same as `krumhansl-kessler`.
fn normalise_name(s: &str) -> String {
    s.trim().to_ascii_lowercase().replace(['_', ' '], "-")
}

fn join_names<'a>(names: impl Iterator<Item = &'a str>) -> String {
    names.collect::<Vec<_>>().join(", ")
}

fn checked_array<const N: usize>(what: &'static str, weights: &[f64]) -> Result<[f64; N]> {
    if weights.len() != N {
        return Err(KeyTrackerError::DimensionMismatch {
            what,
            expected: N,
            actual: weights.len(),
        });
    }
    let mut out = [0.0; N];
    for (i, (&w, slot)) in weights.iter().zip(out.iter_mut()).enumerate() {
        if !w.is_finite() || w < 0.0 {
            return Err(KeyTrackerError::InvalidWeight {
                what,
                index: i,
                value: w,
            });
        }
        *slot = w;
    }
    Ok(out)
}
