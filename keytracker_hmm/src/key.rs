// The 24-key state space.
//
// A key is a tonic pitch class plus a mode. The canonical order used by every
// table and by the decoder's tie-breaking is: the 12 major keys by ascending
// pitch class (indices 0-11), then the 12 minor keys by ascending pitch class
// (indices 12-23). "First in canonical order" always means lowest index.
//
// Names follow the convention of the key-finding literature this model comes
// from: major keys are capitalised (`C`, `Eb`, `F#`), minor keys are lower
// case (`c`, `eb`, `f#`). Parsing goes through a fixed enharmonic alias table
// (`C#` = `Db`, `Cb` = `B`, `fs` = `f#`, ...). There is no context-dependent
// spelling: each of the 24 keys has exactly one display name.

use crate::error::KeyTrackerError;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Number of pitch classes (observation symbols in the first pass).
pub const NUM_PITCH_CLASSES: usize = 12;

/// Number of keys (hidden states).
pub const NUM_KEYS: usize = 2 * NUM_PITCH_CLASSES;

const MAJOR_NAMES: [&str; NUM_PITCH_CLASSES] = [
    "C", "Db", "D", "Eb", "E", "F", "F#", "G", "Ab", "A", "Bb", "B",
];

const MINOR_NAMES: [&str; NUM_PITCH_CLASSES] = [
    "c", "c#", "d", "eb", "e", "f", "f#", "g", "ab", "a", "bb", "b",
];

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum KeyMode {
    Major,
    Minor,
}

impl KeyMode {
    /// Offset of this mode's block in the canonical key order.
    fn base_index(self) -> usize {
        match self {
            KeyMode::Major => 0,
            KeyMode::Minor => NUM_PITCH_CLASSES,
        }
    }
}

/// A major or minor key. Serialised as its display name (`"Eb"`, `"f#"`).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(into = "String", try_from = "String")]
pub struct Key {
    tonic: u8,
    mode: KeyMode,
}

impl Key {
    /// All 24 keys in canonical order.
    pub const ALL: [Key; NUM_KEYS] = {
        let mut keys = [Key {
            tonic: 0,
            mode: KeyMode::Major,
        }; NUM_KEYS];
        let mut i = 0;
        while i < NUM_KEYS {
            keys[i] = Key {
                tonic: (i % NUM_PITCH_CLASSES) as u8,
                mode: if i < NUM_PITCH_CLASSES {
                    KeyMode::Major
                } else {
                    KeyMode::Minor
                },
            };
            i += 1;
        }
        keys
    };

    /// Build a key; the tonic is reduced modulo 12.
    pub fn new(tonic: u8, mode: KeyMode) -> Self {
        Key {
            tonic: tonic % NUM_PITCH_CLASSES as u8,
            mode,
        }
    }

    pub fn major(tonic: u8) -> Self {
        Key::new(tonic, KeyMode::Major)
    }

    pub fn minor(tonic: u8) -> Self {
        Key::new(tonic, KeyMode::Minor)
    }

    /// The key at a canonical index, or `None` for indices >= 24.
    pub fn from_index(index: usize) -> Option<Self> {
        Key::ALL.get(index).copied()
    }

    /// Position in the canonical order (0-23).
    pub fn index(self) -> usize {
        self.mode.base_index() + self.tonic as usize
    }

    pub fn tonic(self) -> u8 {
        self.tonic
    }

    pub fn mode(self) -> KeyMode {
        self.mode
    }

    pub fn is_major(self) -> bool {
        self.mode == KeyMode::Major
    }

    /// The key of the other mode sharing this key's signature: a minor tonic
    /// sits three semitones below its relative major.
    pub fn relative(self) -> Self {
        match self.mode {
            KeyMode::Major => Key::minor(self.tonic + 9),
            KeyMode::Minor => Key::major(self.tonic + 3),
        }
    }

    pub fn name(self) -> &'static str {
        match self.mode {
            KeyMode::Major => MAJOR_NAMES[self.tonic as usize],
            KeyMode::Minor => MINOR_NAMES[self.tonic as usize],
        }
    }
}

impl fmt::Display for Key {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl FromStr for Key {
    type Err = KeyTrackerError;

    /// Parse a key name. The case of the letter selects the mode; the
    /// remainder must be one of the accidental spellings in
    /// `accidental_offset`.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let trimmed = s.trim();
        let invalid = || KeyTrackerError::InvalidKeyName(s.to_string());

        let mut chars = trimmed.chars();
        let letter = chars.next().ok_or_else(invalid)?;
        let natural = natural_pitch_class(letter.to_ascii_uppercase()).ok_or_else(invalid)?;
        let mode = if letter.is_ascii_uppercase() {
            KeyMode::Major
        } else {
            KeyMode::Minor
        };
        let offset = accidental_offset(chars.as_str()).ok_or_else(invalid)?;

        let tonic = (natural as i32 + offset).rem_euclid(NUM_PITCH_CLASSES as i32) as u8;
        Ok(Key::new(tonic, mode))
    }
}

impl From<Key> for String {
    fn from(key: Key) -> Self {
        key.name().to_string()
    }
}

impl TryFrom<String> for Key {
    type Error = KeyTrackerError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        value.parse()
    }
}

fn natural_pitch_class(letter: char) -> Option<u8> {
    match letter {
        'C' => Some(0),
        'D' => Some(2),
        'E' => Some(4),
        'F' => Some(5),
        'G' => Some(7),
        'A' => Some(9),
        'B' => Some(11),
        _ => None,
    }
}

/// Semitone offset of an accidental spelling. Only single accidentals are
/// recognised; `Ebb` and friends are rejected rather than guessed at.
fn accidental_offset(accidental: &str) -> Option<i32> {
    match accidental.to_ascii_lowercase().as_str() {
        "" => Some(0),
        "#" | "s" | "sharp" => Some(1),
        "b" | "f" | "flat" => Some(-1),
        _ => None,
    }
}
