use std::fmt;
use std::str::FromStr;

use thiserror::Error;

/// Number of diatonic degrees in every key.
pub const DEGREES: usize = 7;

/// Seventh-chord quality of each diatonic degree, I through vii.
pub const QUALITIES: [&str; DEGREES] = ["Maj7", "min7", "min7", "Maj7", "7", "min7", "min7b5"];

pub type ChordTable = [String; DEGREES];

// ── Key ───────────────────────────────────────────────────────────────────────

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum Key {
    C,
    CSharp,
    DFlat,
    D,
    DSharp,
    EFlat,
    E,
    F,
    FSharp,
    GFlat,
    G,
    GSharp,
    AFlat,
    A,
    ASharp,
    BFlat,
    B,
    CFlat,
}

impl Key {
    pub const ALL: [Key; 18] = [
        Self::C,
        Self::CSharp,
        Self::DFlat,
        Self::D,
        Self::DSharp,
        Self::EFlat,
        Self::E,
        Self::F,
        Self::FSharp,
        Self::GFlat,
        Self::G,
        Self::GSharp,
        Self::AFlat,
        Self::A,
        Self::ASharp,
        Self::BFlat,
        Self::B,
        Self::CFlat,
    ];

    pub fn name(self) -> &'static str {
        match self {
            Self::C      => "C",
            Self::CSharp => "C#",
            Self::DFlat  => "Db",
            Self::D      => "D",
            Self::DSharp => "D#",
            Self::EFlat  => "Eb",
            Self::E      => "E",
            Self::F      => "F",
            Self::FSharp => "F#",
            Self::GFlat  => "Gb",
            Self::G      => "G",
            Self::GSharp => "G#",
            Self::AFlat  => "Ab",
            Self::A      => "A",
            Self::ASharp => "A#",
            Self::BFlat  => "Bb",
            Self::B      => "B",
            Self::CFlat  => "Cb",
        }
    }

    /// Note names of the major scale, spelled so every letter appears once.
    pub fn notes(self) -> [&'static str; DEGREES] {
        match self {
            Self::C      => ["C",  "D",  "E",  "F",  "G",  "A",  "B"],
            Self::CSharp => ["C#", "D#", "E#", "F#", "G#", "A#", "B#"],
            Self::DFlat  => ["Db", "Eb", "F",  "Gb", "Ab", "Bb", "C"],
            Self::D      => ["D",  "E",  "F#", "G",  "A",  "B",  "C#"],
            Self::DSharp => ["D#", "E#", "F##", "G#", "A#", "B#", "C##"],
            Self::EFlat  => ["Eb", "F",  "G",  "Ab", "Bb", "C",  "D"],
            Self::E      => ["E",  "F#", "G#", "A",  "B",  "C#", "D#"],
            Self::F      => ["F",  "G",  "A",  "Bb", "C",  "D",  "E"],
            Self::FSharp => ["F#", "G#", "A#", "B",  "C#", "D#", "E#"],
            Self::GFlat  => ["Gb", "Ab", "Bb", "Cb", "Db", "Eb", "F"],
            Self::G      => ["G",  "A",  "B",  "C",  "D",  "E",  "F#"],
            Self::GSharp => ["G#", "A#", "B#", "C#", "D#", "E#", "F##"],
            Self::AFlat  => ["Ab", "Bb", "C",  "Db", "Eb", "F",  "G"],
            Self::A      => ["A",  "B",  "C#", "D",  "E",  "F#", "G#"],
            Self::ASharp => ["A#", "B#", "C##", "D#", "E#", "F##", "G##"],
            Self::BFlat  => ["Bb", "C",  "D",  "Eb", "F",  "G",  "A"],
            Self::B      => ["B",  "C#", "D#", "E",  "F#", "G#", "A#"],
            Self::CFlat  => ["Cb", "Db", "Eb", "Fb", "Gb", "Ab", "Bb"],
        }
    }

    /// The other spelling of a black-key tonic. B/Cb is deliberately unlinked.
    pub fn enharmonic(self) -> Option<Key> {
        match self {
            Self::CSharp => Some(Self::DFlat),
            Self::DFlat  => Some(Self::CSharp),
            Self::DSharp => Some(Self::EFlat),
            Self::EFlat  => Some(Self::DSharp),
            Self::FSharp => Some(Self::GFlat),
            Self::GFlat  => Some(Self::FSharp),
            Self::GSharp => Some(Self::AFlat),
            Self::AFlat  => Some(Self::GSharp),
            Self::ASharp => Some(Self::BFlat),
            Self::BFlat  => Some(Self::ASharp),
            _ => None,
        }
    }

    /// Key that results from pressing `selected` while `current` is shown.
    /// Pressing the shown key again swaps it to its enharmonic spelling.
    pub fn toggle_from(current: Key, selected: Key) -> Key {
        if current == selected {
            selected.enharmonic().unwrap_or(selected)
        } else {
            selected
        }
    }

    pub fn next(self) -> Self {
        let i = Self::ALL.iter().position(|&k| k == self).unwrap_or(0);
        Self::ALL[(i + 1) % Self::ALL.len()]
    }
}

impl fmt::Display for Key {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("unknown key `{0}` (expected one of C, C#, Db, D, D#, Eb, E, F, F#, Gb, G, G#, Ab, A, A#, Bb, B, Cb)")]
pub struct ParseKeyError(pub String);

impl FromStr for Key {
    type Err = ParseKeyError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let s = s.trim();
        Self::ALL
            .iter()
            .copied()
            .find(|k| k.name() == s)
            .ok_or_else(|| ParseKeyError(s.to_string()))
    }
}

// ── Chord table ───────────────────────────────────────────────────────────────

/// Diatonic seventh chords of `key`, indexed by degree.
pub fn chord_table(key: Key) -> ChordTable {
    let notes = key.notes();
    std::array::from_fn(|i| format!("{}{}", notes[i], QUALITIES[i]))
}

/// Roman numeral label for a degree, used next to each chord in the list.
pub fn degree_numeral(degree: usize) -> &'static str {
    ["I", "ii", "iii", "IV", "V", "vi", "vii"].get(degree).copied().unwrap_or("?")
}
