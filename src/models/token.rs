//! Label vocabulary
//!
//! One `Token` per label. The string form is produced by `Display` and is the only
//! place that knows the label syntax on the writing side; `decode::symbol` is its inverse.
//!
//! ```text
//! clef-G2   keySignature-2   timeSignature-6/8   timeSignature-C/
//! note-F#5_quarter.   gracenote-D5_eighth   rest-half_fermata
//! multirest-12   tie   barline
//! ```

use super::duration::{zero, Length, Rational};
use super::pitch::{Accidental, Height, Step};
use serde::{Deserialize, Serialize};
use std::fmt;

pub const CLEF_PREFIX: &str = "clef-";
pub const GRACENOTE_PREFIX: &str = "gracenote-";
pub const KEY_SIGNATURE_PREFIX: &str = "keySignature-";
pub const MULTIREST_PREFIX: &str = "multirest-";
pub const NOTE_PREFIX: &str = "note-";
pub const REST_PREFIX: &str = "rest-";
pub const TIE: &str = "tie";
pub const TIME_SIGNATURE_PREFIX: &str = "timeSignature-";
pub const BARLINE: &str = "barline";
pub const FERMATA_SUFFIX: &str = "_fermata";

/// Literal join marker between groups
pub const SEPARATOR: &str = "+";

// ============================================================================
// CLEF
// ============================================================================

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum ClefSign {
    G,
    F,
    C,
    Percussion,
    Tab,
}

impl ClefSign {
    pub fn from_musicxml(sign: &str) -> Option<Self> {
        match sign.trim() {
            "G" => Some(ClefSign::G),
            "F" => Some(ClefSign::F),
            "C" => Some(ClefSign::C),
            "percussion" => Some(ClefSign::Percussion),
            "TAB" => Some(ClefSign::Tab),
            _ => None,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Clef {
    pub sign: ClefSign,
    pub line: u8,
}

impl Clef {
    pub fn new(sign: ClefSign, line: u8) -> Self {
        Self { sign, line }
    }

    pub fn treble() -> Self {
        Self::new(ClefSign::G, 2)
    }

    /// Standard line for a sign when `<line>` is absent
    pub fn default_line(sign: ClefSign) -> u8 {
        match sign {
            ClefSign::G => 2,
            ClefSign::F => 4,
            ClefSign::C => 3,
            ClefSign::Percussion | ClefSign::Tab => 0,
        }
    }

    /// Percussion and tablature staves are never encoded
    pub fn is_unsupported(&self) -> bool {
        matches!(self.sign, ClefSign::Percussion | ClefSign::Tab)
    }

    /// Parse a two-character clef code (`G2`, `F4`, `C3`)
    pub fn parse(code: &str) -> Option<Self> {
        let mut chars = code.chars();
        let sign = match chars.next()? {
            'G' => ClefSign::G,
            'F' => ClefSign::F,
            'C' => ClefSign::C,
            _ => return None,
        };
        let line = chars.next()?.to_digit(10)? as u8;
        if chars.next().is_some() || !(1..=5).contains(&line) {
            return None;
        }
        Some(Self { sign, line })
    }
}

impl fmt::Display for Clef {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.sign {
            ClefSign::G => write!(f, "G{}", self.line),
            ClefSign::F => write!(f, "F{}", self.line),
            ClefSign::C => write!(f, "C{}", self.line),
            ClefSign::Percussion => write!(f, "percussion"),
            ClefSign::Tab => write!(f, "TAB"),
        }
    }
}

// ============================================================================
// KEY SIGNATURE
// ============================================================================

const SHARP_ORDER: [Step; 7] = [Step::F, Step::C, Step::G, Step::D, Step::A, Step::E, Step::B];
const FLAT_ORDER: [Step; 7] = [Step::B, Step::E, Step::A, Step::D, Step::G, Step::C, Step::F];

const MAJOR_NAMES: [&str; 15] = [
    "Cb", "Gb", "Db", "Ab", "Eb", "Bb", "F", "C", "G", "D", "A", "E", "B", "F#", "C#",
];
const MINOR_NAMES: [&str; 15] = [
    "Ab", "Eb", "Bb", "F", "C", "G", "D", "A", "E", "B", "F#", "C#", "G#", "D#", "A#",
];

/// Key signature as a position on the circle of fifths
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub struct KeySignature {
    pub fifths: i8,
}

impl KeySignature {
    pub fn new(fifths: i8) -> Self {
        Self { fifths: fifths.clamp(-7, 7) }
    }

    /// Parse `2`, `-3`, or a key name such as `DM`, `BbM`, `F#m`
    pub fn parse(code: &str) -> Option<Self> {
        if let Ok(fifths) = code.parse::<i8>() {
            return (-7..=7).contains(&fifths).then(|| Self::new(fifths));
        }
        let (tonic, names) = if let Some(tonic) = code.strip_suffix('M') {
            (tonic, &MAJOR_NAMES)
        } else if let Some(tonic) = code.strip_suffix('m') {
            (tonic, &MINOR_NAMES)
        } else {
            return None;
        };
        names
            .iter()
            .position(|name| *name == tonic)
            .map(|i| Self::new(i as i8 - 7))
    }

    /// Letters altered by this key, with their accidental
    pub fn altered_steps(&self) -> Vec<(Step, Accidental)> {
        let count = self.fifths.unsigned_abs() as usize;
        if self.fifths >= 0 {
            SHARP_ORDER[..count].iter().map(|s| (*s, Accidental::Sharp)).collect()
        } else {
            FLAT_ORDER[..count].iter().map(|s| (*s, Accidental::Flat)).collect()
        }
    }
}

// ============================================================================
// TIME SIGNATURE
// ============================================================================

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum TimeSignature {
    Standard { beats: u32, beat_type: u32 },
    Common,
    Cut,
}

impl TimeSignature {
    /// Parse `4/4`, `C`, `C/`
    pub fn parse(code: &str) -> Option<Self> {
        match code {
            "C" => Some(TimeSignature::Common),
            "C/" => Some(TimeSignature::Cut),
            _ => {
                let (beats, beat_type) = code.split_once('/')?;
                let beats: u32 = beats.parse().ok()?;
                let beat_type: u32 = beat_type.parse().ok()?;
                (beats > 0 && beat_type > 0).then_some(TimeSignature::Standard { beats, beat_type })
            }
        }
    }

    /// Length of a full bar in quarter notes
    pub fn bar_length(&self) -> Rational {
        match self {
            TimeSignature::Standard { beats, beat_type } => {
                Rational::new(*beats as i32 * 4, *beat_type as i32)
            }
            TimeSignature::Common | TimeSignature::Cut => Rational::from_integer(4),
        }
    }
}

impl Default for TimeSignature {
    fn default() -> Self {
        TimeSignature::Standard { beats: 4, beat_type: 4 }
    }
}

impl fmt::Display for TimeSignature {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            TimeSignature::Standard { beats, beat_type } => write!(f, "{}/{}", beats, beat_type),
            TimeSignature::Common => write!(f, "C"),
            TimeSignature::Cut => write!(f, "C/"),
        }
    }
}

// ============================================================================
// TOKENS
// ============================================================================

/// Pitched note label payload
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct NoteToken {
    pub height: Height,
    pub length: Length,
    pub fermata: bool,
}

impl NoteToken {
    pub fn new(height: Height, length: Length) -> Self {
        Self { height, length, fermata: false }
    }
}

/// One label
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Token {
    Clef(Clef),
    KeySignature(KeySignature),
    TimeSignature(TimeSignature),
    Note(NoteToken),
    GraceNote(NoteToken),
    Rest { length: Length, fermata: bool },
    MultiRest(u32),
    Tie,
    Barline,
}

impl Token {
    /// Time the token occupies; grace notes and attributes take none
    pub fn duration(&self) -> Rational {
        match self {
            Token::Note(note) => note.length.quarter_length(),
            Token::Rest { length, .. } => length.quarter_length(),
            _ => zero(),
        }
    }

    pub fn is_note(&self) -> bool {
        matches!(self, Token::Note(_) | Token::GraceNote(_))
    }

    pub fn is_rest(&self) -> bool {
        matches!(self, Token::Rest { .. })
    }

    /// Clef, key or time signature
    pub fn is_attribute(&self) -> bool {
        matches!(
            self,
            Token::Clef(_) | Token::KeySignature(_) | Token::TimeSignature(_)
        )
    }

    pub fn height(&self) -> Option<Height> {
        match self {
            Token::Note(note) | Token::GraceNote(note) => Some(note.height),
            _ => None,
        }
    }
}

fn fermata_suffix(fermata: bool) -> &'static str {
    if fermata {
        FERMATA_SUFFIX
    } else {
        ""
    }
}

impl fmt::Display for Token {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Token::Clef(clef) => write!(f, "{}{}", CLEF_PREFIX, clef),
            Token::KeySignature(key) => write!(f, "{}{}", KEY_SIGNATURE_PREFIX, key.fifths),
            Token::TimeSignature(time) => write!(f, "{}{}", TIME_SIGNATURE_PREFIX, time),
            Token::Note(note) => write!(
                f,
                "{}{}_{}{}",
                NOTE_PREFIX,
                note.height,
                note.length,
                fermata_suffix(note.fermata)
            ),
            Token::GraceNote(note) => write!(
                f,
                "{}{}_{}{}",
                GRACENOTE_PREFIX,
                note.height,
                note.length,
                fermata_suffix(note.fermata)
            ),
            Token::Rest { length, fermata } => {
                write!(f, "{}{}{}", REST_PREFIX, length, fermata_suffix(*fermata))
            }
            Token::MultiRest(count) => write!(f, "{}{}", MULTIREST_PREFIX, count),
            Token::Tie => write!(f, "{}", TIE),
            Token::Barline => write!(f, "{}", BARLINE),
        }
    }
}

/// Join groups of tokens into label text: tokens of one group are space separated,
/// groups are joined with ` + `, and the text ends with a single space.
pub fn join_groups(groups: &[Vec<Token>]) -> String {
    let mut text = groups
        .iter()
        .filter(|group| !group.is_empty())
        .map(|group| {
            group
                .iter()
                .map(|t| t.to_string())
                .collect::<Vec<_>>()
                .join(" ")
        })
        .collect::<Vec<_>>()
        .join(&format!(" {} ", SEPARATOR));
    if !text.is_empty() {
        text.push(' ');
    }
    text
}
