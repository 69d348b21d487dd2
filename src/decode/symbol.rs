//! Symbol Parser
//!
//! Turns one label into a typed `Symbol`. Parsing never fails: anything that does not
//! match the grammar becomes a documented placeholder and is logged at info level.
//!
//! | Label part            | Fallback                 |
//! |-----------------------|--------------------------|
//! | unknown prefix        | `note-C4_quarter`        |
//! | note height           | `C4`                     |
//! | length                | `quarter`                |
//! | clef code             | `G2`                     |
//! | key signature         | no sharps or flats       |
//! | time signature        | `4/4`                    |
//! | multirest count       | 1                        |

use crate::models::token::{
    CLEF_PREFIX, FERMATA_SUFFIX, GRACENOTE_PREFIX, KEY_SIGNATURE_PREFIX, MULTIREST_PREFIX,
    NOTE_PREFIX, REST_PREFIX, TIE, TIME_SIGNATURE_PREFIX,
};
use crate::models::{Clef, Height, KeySignature, Length, NoteToken, Pitch, Rational, Step, TimeSignature, Token};
use serde::{Deserialize, Serialize};

/// One parsed label
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Symbol {
    /// Label as written
    pub label: String,
    pub token: Token,
    /// Sounding pitch, set by the pitch resolver for notes and grace notes
    pub pitch: Option<Pitch>,
}

impl Symbol {
    pub fn parse(label: &str) -> Self {
        Self {
            label: label.to_string(),
            token: parse_token(label),
            pitch: None,
        }
    }

    /// Temporal duration in quarter notes (0 for grace notes and non-temporal symbols)
    pub fn duration(&self) -> Rational {
        self.token.duration()
    }

    pub fn is_note(&self) -> bool {
        self.token.is_note()
    }

    pub fn is_attribute(&self) -> bool {
        self.token.is_attribute()
    }
}

fn placeholder_height() -> Height {
    Height::new(Step::C, None, 4)
}

/// Parse one label into a token, substituting placeholders for malformed parts
pub fn parse_token(label: &str) -> Token {
    if let Some(code) = label.strip_prefix(CLEF_PREFIX) {
        Token::Clef(Clef::parse(code).unwrap_or_else(|| {
            log::info!("Unknown clef label: {}, using default clef", label);
            Clef::treble()
        }))
    } else if let Some(rest) = label.strip_prefix(GRACENOTE_PREFIX) {
        Token::GraceNote(parse_note(rest, label))
    } else if let Some(code) = label.strip_prefix(KEY_SIGNATURE_PREFIX) {
        Token::KeySignature(KeySignature::parse(code).unwrap_or_else(|| {
            log::info!("Unknown key signature label: {}, using default key", label);
            KeySignature::default()
        }))
    } else if let Some(count) = label.strip_prefix(MULTIREST_PREFIX) {
        Token::MultiRest(count.parse().ok().filter(|n| *n > 0).unwrap_or_else(|| {
            log::info!("Unknown multi rest label: {}, using a single measure", label);
            1
        }))
    } else if let Some(rest) = label.strip_prefix(NOTE_PREFIX) {
        Token::Note(parse_note(rest, label))
    } else if let Some(rest) = label.strip_prefix(REST_PREFIX) {
        let (body, fermata) = split_fermata(rest);
        Token::Rest { length: parse_length(body, label), fermata }
    } else if label.starts_with(TIE) {
        Token::Tie
    } else if let Some(code) = label.strip_prefix(TIME_SIGNATURE_PREFIX) {
        Token::TimeSignature(TimeSignature::parse(code).unwrap_or_else(|| {
            log::info!("Unknown time signature label: {}, using default time signature", label);
            TimeSignature::default()
        }))
    } else {
        log::info!("Unknown label: {}, using placeholder note", label);
        Token::Note(NoteToken::new(placeholder_height(), Length::quarter()))
    }
}

fn split_fermata(body: &str) -> (&str, bool) {
    match body.strip_suffix(FERMATA_SUFFIX) {
        Some(stripped) => (stripped, true),
        None => (body, false),
    }
}

fn parse_length(text: &str, label: &str) -> Length {
    Length::parse(text).unwrap_or_else(|| {
        log::info!("Unknown duration label: {} in {}, using quarter", text, label);
        Length::quarter()
    })
}

/// `<height>_<length>[_fermata]`
fn parse_note(body: &str, label: &str) -> NoteToken {
    let (body, fermata) = split_fermata(body);
    let Some((height, length)) = body.split_once('_') else {
        log::info!("Unknown note label: {}, using placeholder note", label);
        return NoteToken { height: placeholder_height(), length: Length::quarter(), fermata };
    };
    let height = Height::parse(height).unwrap_or_else(|| {
        log::info!("Unknown note height: {} in {}, using C4", height, label);
        placeholder_height()
    });
    NoteToken { height, length: parse_length(length, label), fermata }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{Accidental, ClefSign, NoteType};

    #[test]
    fn test_parse_every_kind() {
        assert_eq!(parse_token("clef-F4"), Token::Clef(Clef::new(ClefSign::F, 4)));
        assert_eq!(parse_token("keySignature--2"), Token::KeySignature(KeySignature::new(-2)));
        assert_eq!(parse_token("keySignature-DM"), Token::KeySignature(KeySignature::new(2)));
        assert_eq!(parse_token("timeSignature-3/4"), Token::TimeSignature(TimeSignature::Standard { beats: 3, beat_type: 4 }));
        assert_eq!(parse_token("timeSignature-C/"), Token::TimeSignature(TimeSignature::Cut));
        assert_eq!(parse_token("multirest-7"), Token::MultiRest(7));
        assert_eq!(parse_token("tie"), Token::Tie);
        assert_eq!(
            parse_token("rest-half._fermata"),
            Token::Rest { length: Length::new(NoteType::Half, 1), fermata: true }
        );

        let Token::Note(note) = parse_token("note-Bb3_eighth..") else {
            panic!("expected a note");
        };
        assert_eq!(note.height, Height::new(Step::B, Some(Accidental::Flat), 3));
        assert_eq!(note.length, Length::new(NoteType::Eighth, 2));
        assert!(!note.fermata);

        let Token::GraceNote(grace) = parse_token("gracenote-D5_sixteenth_fermata") else {
            panic!("expected a grace note");
        };
        assert!(grace.fermata);
    }

    #[test]
    fn test_durations() {
        assert_eq!(Symbol::parse("note-C4_half.").duration(), Rational::from_integer(3));
        assert_eq!(Symbol::parse("rest-eighth").duration(), Rational::new(1, 2));
        assert_eq!(Symbol::parse("gracenote-C4_half").duration(), Rational::from_integer(0));
        assert_eq!(Symbol::parse("clef-G2").duration(), Rational::from_integer(0));
        assert_eq!(Symbol::parse("multirest-4").duration(), Rational::from_integer(0));
    }

    #[test]
    fn test_unknown_labels_become_placeholders() {
        let placeholder = Token::Note(NoteToken::new(Height::parse("C4").unwrap(), Length::quarter()));
        assert_eq!(parse_token("dynamic-ff"), placeholder);
        assert_eq!(parse_token("note-"), placeholder);
        assert_eq!(parse_token("note-X9_quarter"), placeholder);
        assert_eq!(
            parse_token("note-E4_crotchet"),
            Token::Note(NoteToken::new(Height::parse("E4").unwrap(), Length::quarter()))
        );
        assert_eq!(parse_token("clef-Q9"), Token::Clef(Clef::treble()));
        assert_eq!(parse_token("keySignature-"), Token::KeySignature(KeySignature::default()));
        assert_eq!(parse_token("timeSignature-x"), Token::TimeSignature(TimeSignature::default()));
        assert_eq!(parse_token("multirest-"), Token::MultiRest(1));
    }

    #[test]
    fn test_labels_round_trip_through_display() {
        for label in [
            "clef-C3",
            "keySignature-4",
            "timeSignature-6/8",
            "note-G#5_quarter.",
            "gracenote-Ab4_eighth",
            "rest-whole_fermata",
            "multirest-12",
            "tie",
        ] {
            assert_eq!(parse_token(label).to_string(), label);
        }
    }
}
