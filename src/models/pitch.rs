//! Pitch spelling
//!
//! Labels spell a note as letter + printed accidental + octave (`F#5`, `Bb4`, `C4`).
//! A `Height` is that printed spelling; the sounding `Pitch` is only known once the
//! key signature and earlier accidentals of the measure are taken into account.

use serde::{Deserialize, Serialize};
use std::fmt;

/// Pitch letter
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum Step {
    C,
    D,
    E,
    F,
    G,
    A,
    B,
}

impl Step {
    pub const ALL: [Step; 7] = [Step::C, Step::D, Step::E, Step::F, Step::G, Step::A, Step::B];

    pub fn from_char(c: char) -> Option<Self> {
        match c.to_ascii_uppercase() {
            'C' => Some(Step::C),
            'D' => Some(Step::D),
            'E' => Some(Step::E),
            'F' => Some(Step::F),
            'G' => Some(Step::G),
            'A' => Some(Step::A),
            'B' => Some(Step::B),
            _ => None,
        }
    }

    pub fn letter(&self) -> char {
        match self {
            Step::C => 'C',
            Step::D => 'D',
            Step::E => 'E',
            Step::F => 'F',
            Step::G => 'G',
            Step::A => 'A',
            Step::B => 'B',
        }
    }

    /// Position within the octave (C = 0 .. B = 6)
    pub fn index(&self) -> usize {
        *self as usize
    }
}

// ============================================================================
// ACCIDENTALS
// ============================================================================

/// A printed accidental sign
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Accidental {
    DoubleFlat,
    Flat,
    Natural,
    Sharp,
    DoubleSharp,
}

impl Accidental {
    /// Parse the sign part of a height (`#`, `##`, `b`, `bb`, `N`, `0`)
    pub fn from_sign(sign: &str) -> Option<Self> {
        match sign {
            "bb" => Some(Accidental::DoubleFlat),
            "b" => Some(Accidental::Flat),
            "N" | "0" => Some(Accidental::Natural),
            "#" => Some(Accidental::Sharp),
            "##" => Some(Accidental::DoubleSharp),
            _ => None,
        }
    }

    pub fn sign(&self) -> &'static str {
        match self {
            Accidental::DoubleFlat => "bb",
            Accidental::Flat => "b",
            Accidental::Natural => "N",
            Accidental::Sharp => "#",
            Accidental::DoubleSharp => "##",
        }
    }

    /// Parse a MusicXML `<accidental>` value
    pub fn from_musicxml(value: &str) -> Option<Self> {
        match value.trim() {
            "flat-flat" | "double-flat" => Some(Accidental::DoubleFlat),
            "flat" | "natural-flat" => Some(Accidental::Flat),
            "natural" => Some(Accidental::Natural),
            "sharp" | "natural-sharp" => Some(Accidental::Sharp),
            "double-sharp" | "sharp-sharp" => Some(Accidental::DoubleSharp),
            _ => None,
        }
    }

    /// Semitone offset from the natural letter
    pub fn alter(&self) -> i8 {
        match self {
            Accidental::DoubleFlat => -2,
            Accidental::Flat => -1,
            Accidental::Natural => 0,
            Accidental::Sharp => 1,
            Accidental::DoubleSharp => 2,
        }
    }

    pub fn from_alter(alter: i8) -> Self {
        match alter {
            i8::MIN..=-2 => Accidental::DoubleFlat,
            -1 => Accidental::Flat,
            0 => Accidental::Natural,
            1 => Accidental::Sharp,
            _ => Accidental::DoubleSharp,
        }
    }
}

// ============================================================================
// HEIGHT (printed spelling)
// ============================================================================

/// Printed note height: letter, optional accidental sign, octave
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Height {
    pub step: Step,
    pub accidental: Option<Accidental>,
    pub octave: i8,
}

impl Height {
    pub fn new(step: Step, accidental: Option<Accidental>, octave: i8) -> Self {
        Self { step, accidental, octave }
    }

    /// Parse `C4`, `F#5`, `Bbb3`, `EN4`
    pub fn parse(text: &str) -> Option<Self> {
        let mut chars = text.chars();
        let step = Step::from_char(chars.next()?)?;
        let octave_char = chars.next_back()?;
        let octave = octave_char.to_digit(10)? as i8;
        let sign = chars.as_str();
        let accidental = if sign.is_empty() {
            None
        } else {
            Some(Accidental::from_sign(sign)?)
        };
        Some(Self { step, accidental, octave })
    }

    /// Ordinal used to sort simultaneous notes bottom-up within one octave
    ///
    /// Naturals sit on odd numbers (C = 1 .. B = 13); a sharp or flat moves one
    /// position so `C#` and `Db` share an ordinal.
    pub fn ordinal(&self) -> i32 {
        let base = 2 * self.step.index() as i32 + 1;
        let shift = self.accidental.map(|a| a.alter().signum() as i32).unwrap_or(0);
        base + shift
    }
}

impl fmt::Display for Height {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let sign = self.accidental.map(|a| a.sign()).unwrap_or("");
        write!(f, "{}{}{}", self.step.letter(), sign, self.octave)
    }
}

// ============================================================================
// PITCH (sounding)
// ============================================================================

/// Resolved pitch
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Pitch {
    pub step: Step,
    /// Semitones (-2 double flat .. +2 double sharp)
    pub alter: i8,
    pub octave: i8,
}

impl Pitch {
    pub fn new(step: Step, alter: i8, octave: i8) -> Self {
        Self { step, alter, octave }
    }

    /// MIDI note number (C4 = 60)
    pub fn midi(&self) -> i32 {
        const SEMITONES: [i32; 7] = [0, 2, 4, 5, 7, 9, 11];
        (self.octave as i32 + 1) * 12 + SEMITONES[self.step.index()] + self.alter as i32
    }
}

impl fmt::Display for Pitch {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let sign = if self.alter >= 0 {
            "#".repeat(self.alter as usize)
        } else {
            "b".repeat(self.alter.unsigned_abs() as usize)
        };
        write!(f, "{}{}{}", self.step.letter(), sign, self.octave)
    }
}
