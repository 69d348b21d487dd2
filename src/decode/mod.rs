//! Flat sequence → notation decoder
//!
//! Pipeline: Symbol Parser (`symbol`) → Group Classifier (`group`) → Pitch Resolver
//! (`pitch`) → Voice Splitter (`voices`). The text is parsed once into typed groups;
//! later stages only annotate and rearrange them.

pub mod group;
pub mod pitch;
pub mod symbol;
pub mod voices;

pub use group::{Group, GroupKind};
pub use pitch::{resolve_measure, AlteredPitches};
pub use symbol::{parse_token, Symbol};
pub use voices::split_voices;

use crate::models::token::{BARLINE, SEPARATOR};
use crate::models::{KeySignature, Part};

/// Split label text into measures of classified groups
///
/// `+` closes a group and `barline` closes a measure. Content after the last barline
/// still forms a measure.
pub fn parse_measures(text: &str) -> Vec<Vec<Group>> {
    let text = text.trim().trim_matches('"');
    let mut measures = Vec::new();
    let mut groups = Vec::new();
    let mut labels: Vec<&str> = Vec::new();

    for word in text.split_whitespace() {
        if word == SEPARATOR || word == BARLINE {
            if !labels.is_empty() {
                groups.push(Group::from_labels(labels.drain(..)));
            }
            if word == BARLINE {
                measures.push(std::mem::take(&mut groups));
            }
        } else {
            labels.push(word);
        }
    }
    if !labels.is_empty() {
        groups.push(Group::from_labels(labels));
    }
    if !groups.is_empty() {
        measures.push(groups);
    }
    measures
}

/// Decode one sequence, starting in `key`; also returns the key in effect at its end
pub fn decode_sequence_in_key(text: &str, key: KeySignature, first_number: usize) -> (Part, KeySignature) {
    let mut part = Part::new();
    let mut key = key;
    for (offset, mut groups) in parse_measures(text).into_iter().enumerate() {
        key = resolve_measure(&mut groups, key);
        part.measures.push(split_voices(first_number + offset, key, &groups));
    }
    (part, key)
}

/// Decode one sequence (one printed system)
pub fn decode_sequence(text: &str) -> Part {
    decode_sequence_in_key(text, KeySignature::default(), 1).0
}

/// Append several sequences into one part
///
/// Each system restates its clef; a restated clef equal to the one already in effect
/// is dropped.
pub fn assemble_part<'a>(sequences: impl IntoIterator<Item = &'a str>) -> Part {
    let mut part = Part::new();
    let mut key = KeySignature::default();

    for text in sequences {
        let (decoded, next_key) = decode_sequence_in_key(text, key, part.measures.len() + 1);
        key = next_key;
        for mut measure in decoded.measures {
            if let (Some(start), Some(current)) = (measure.start_clef(), part.last_clef()) {
                if start == current {
                    measure.remove_start_clef();
                }
            }
            part.measures.push(measure);
        }
    }
    part
}

#[cfg(test)]
#[path = "tests.rs"]
mod tests;
