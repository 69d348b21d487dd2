//! Note lengths and their durations
//!
//! A `Length` is the `<length>` part of a label (`quarter`, `eighth.`, `double_whole..`).
//! Durations are exact rationals measured in quarter notes, so a dotted eighth is `3/4`
//! and a hundred-twenty-eighth is `1/32`.

use num_rational::Rational32;
use serde::{Deserialize, Serialize};
use std::fmt;

/// Duration in quarter-note units
pub type Rational = Rational32;

/// Zero duration (attributes, ties, grace notes)
pub fn zero() -> Rational {
    Rational::from_integer(0)
}

// ============================================================================
// NOTE TYPES
// ============================================================================

/// Undotted note value, shortest first
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum NoteType {
    HundredTwentyEighth,
    SixtyFourth,
    ThirtySecond,
    Sixteenth,
    Eighth,
    Quarter,
    Half,
    Whole,
    DoubleWhole,
    QuadrupleWhole,
}

impl NoteType {
    pub const ALL: [NoteType; 10] = [
        NoteType::HundredTwentyEighth,
        NoteType::SixtyFourth,
        NoteType::ThirtySecond,
        NoteType::Sixteenth,
        NoteType::Eighth,
        NoteType::Quarter,
        NoteType::Half,
        NoteType::Whole,
        NoteType::DoubleWhole,
        NoteType::QuadrupleWhole,
    ];

    /// Name used in labels
    pub fn label(&self) -> &'static str {
        match self {
            NoteType::HundredTwentyEighth => "hundred_twenty_eighth",
            NoteType::SixtyFourth => "sixty_fourth",
            NoteType::ThirtySecond => "thirty_second",
            NoteType::Sixteenth => "sixteenth",
            NoteType::Eighth => "eighth",
            NoteType::Quarter => "quarter",
            NoteType::Half => "half",
            NoteType::Whole => "whole",
            NoteType::DoubleWhole => "double_whole",
            NoteType::QuadrupleWhole => "quadruple_whole",
        }
    }

    pub fn from_label(label: &str) -> Option<Self> {
        NoteType::ALL.iter().copied().find(|t| t.label() == label)
    }

    /// Parse the MusicXML `<type>` element value
    pub fn from_musicxml(value: &str) -> Option<Self> {
        match value.trim() {
            "128th" => Some(NoteType::HundredTwentyEighth),
            "64th" => Some(NoteType::SixtyFourth),
            "32nd" => Some(NoteType::ThirtySecond),
            "16th" => Some(NoteType::Sixteenth),
            "eighth" => Some(NoteType::Eighth),
            "quarter" => Some(NoteType::Quarter),
            "half" => Some(NoteType::Half),
            "whole" => Some(NoteType::Whole),
            "breve" => Some(NoteType::DoubleWhole),
            "long" => Some(NoteType::QuadrupleWhole),
            _ => None,
        }
    }

    /// Undotted duration in quarter notes
    pub fn quarter_length(&self) -> Rational {
        // 128th = 1/32 of a quarter, each step doubles
        let exponent = *self as i32 - NoteType::Quarter as i32;
        if exponent >= 0 {
            Rational::from_integer(1 << exponent)
        } else {
            Rational::new(1, 1 << (-exponent))
        }
    }
}

// ============================================================================
// LENGTH
// ============================================================================

/// Note value plus zero, one or two augmentation dots
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Length {
    pub note_type: NoteType,
    pub dots: u8,
}

impl Length {
    pub const MAX_DOTS: u8 = 2;

    pub fn new(note_type: NoteType, dots: u8) -> Self {
        Self {
            note_type,
            dots: dots.min(Self::MAX_DOTS),
        }
    }

    pub fn quarter() -> Self {
        Self::new(NoteType::Quarter, 0)
    }

    /// Parse a label length such as `half.` or `sixteenth`
    pub fn parse(label: &str) -> Option<Self> {
        let base = label.trim_end_matches('.');
        let dots = label.len() - base.len();
        if dots > Self::MAX_DOTS as usize {
            return None;
        }
        NoteType::from_label(base).map(|t| Self::new(t, dots as u8))
    }

    /// Duration in quarter notes: one dot is 1.5x, two dots 1.75x
    pub fn quarter_length(&self) -> Rational {
        let base = self.note_type.quarter_length();
        match self.dots {
            0 => base,
            1 => base * Rational::new(3, 2),
            _ => base * Rational::new(7, 4),
        }
    }

    /// Every length in the table, shortest first
    pub fn table() -> Vec<Length> {
        let mut lengths: Vec<Length> = NoteType::ALL
            .iter()
            .flat_map(|t| (0..=Self::MAX_DOTS).map(move |d| Length::new(*t, d)))
            .collect();
        lengths.sort_by_key(|l| l.quarter_length());
        lengths
    }

    /// Exact table entry for a duration, if one exists
    pub fn from_quarter_length(value: Rational) -> Option<Self> {
        Self::table().into_iter().find(|l| l.quarter_length() == value)
    }

    /// Largest table entry not longer than `gap`
    pub fn largest_within(gap: Rational) -> Option<Self> {
        Self::table()
            .into_iter()
            .rev()
            .find(|l| l.quarter_length() <= gap)
    }

    /// Split `gap` into table lengths, largest first
    ///
    /// Stops when the remainder is shorter than a hundred-twenty-eighth.
    pub fn fill(gap: Rational) -> Vec<Self> {
        let mut remaining = gap;
        let mut lengths = Vec::new();
        while remaining > zero() {
            match Self::largest_within(remaining) {
                Some(length) => {
                    remaining -= length.quarter_length();
                    lengths.push(length);
                }
                None => break,
            }
        }
        lengths
    }
}

impl fmt::Display for Length {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}{}", self.note_type.label(), ".".repeat(self.dots as usize))
    }
}
