use serde::{Serialize, Serializer};
use std::fmt;

/// One of the 12 pitch classes in semitone order, starting at C
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum PitchClass {
    C,
    Cs,
    D,
    Ds,
    E,
    F,
    Fs,
    G,
    Gs,
    A,
    As,
    B,
}

impl PitchClass {
    /// All pitch classes, indexed by semitone
    pub const ALL: [PitchClass; 12] = [
        PitchClass::C,
        PitchClass::Cs,
        PitchClass::D,
        PitchClass::Ds,
        PitchClass::E,
        PitchClass::F,
        PitchClass::Fs,
        PitchClass::G,
        PitchClass::Gs,
        PitchClass::A,
        PitchClass::As,
        PitchClass::B,
    ];

    /// Pitch class for a semitone index (wraps modulo 12)
    pub fn from_index(index: usize) -> Self {
        Self::ALL[index % 12]
    }

    /// Semitone index above C (0-11)
    pub fn index(&self) -> usize {
        *self as usize
    }

    /// Get human-readable pitch class name
    pub fn name(&self) -> &'static str {
        match self {
            PitchClass::C => "C",
            PitchClass::Cs => "C#",
            PitchClass::D => "D",
            PitchClass::Ds => "D#",
            PitchClass::E => "E",
            PitchClass::F => "F",
            PitchClass::Fs => "F#",
            PitchClass::G => "G",
            PitchClass::Gs => "G#",
            PitchClass::A => "A",
            PitchClass::As => "A#",
            PitchClass::B => "B",
        }
    }

    /// Pitch class `semitones` above this one
    pub fn transpose(&self, semitones: usize) -> Self {
        Self::from_index(self.index() + semitones)
    }
}

impl fmt::Display for PitchClass {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// Tonal mode of a key
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Mode {
    Major,
    Minor,
}

impl Mode {
    pub fn name(&self) -> &'static str {
        match self {
            Mode::Major => "Major",
            Mode::Minor => "Minor",
        }
    }
}

/// Estimated key: tonic pitch class plus mode
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct KeyEstimate {
    pub tonic: PitchClass,
    pub mode: Mode,

    /// Winning score minus the best score of any other key (0 when tied)
    pub margin: f32,
}

impl KeyEstimate {
    /// Rendered key name, e.g. "F# Minor"
    pub fn name(&self) -> String {
        format!("{} {}", self.tonic.name(), self.mode.name())
    }
}

impl fmt::Display for KeyEstimate {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} {}", self.tonic, self.mode.name())
    }
}

/// Key field of an analysis result
///
/// `Unknown` is what a failed key estimate degrades to in partial-result mode.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum DetectedKey {
    Known(KeyEstimate),
    Unknown,
}

impl DetectedKey {
    pub fn estimate(&self) -> Option<&KeyEstimate> {
        match self {
            DetectedKey::Known(estimate) => Some(estimate),
            DetectedKey::Unknown => None,
        }
    }
}

impl From<KeyEstimate> for DetectedKey {
    fn from(estimate: KeyEstimate) -> Self {
        DetectedKey::Known(estimate)
    }
}

impl fmt::Display for DetectedKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            DetectedKey::Known(estimate) => estimate.fmt(f),
            DetectedKey::Unknown => f.write_str("Unknown"),
        }
    }
}

impl Serialize for DetectedKey {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.collect_str(self)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn renders_canonical_names() {
        let key = KeyEstimate {
            tonic: PitchClass::Fs,
            mode: Mode::Minor,
            margin: 0.0,
        };
        assert_eq!(key.name(), "F# Minor");
        assert_eq!(DetectedKey::from(key).to_string(), "F# Minor");
        assert_eq!(DetectedKey::Unknown.to_string(), "Unknown");
    }

    #[test]
    fn pitch_class_indices_wrap() {
        assert_eq!(PitchClass::from_index(0), PitchClass::C);
        assert_eq!(PitchClass::from_index(13), PitchClass::Cs);
        assert_eq!(PitchClass::B.transpose(2), PitchClass::Cs);
        for (i, pc) in PitchClass::ALL.iter().enumerate() {
            assert_eq!(pc.index(), i);
        }
    }
}
