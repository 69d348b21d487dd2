//! Pitch Resolver
//!
//! A printed height only names a letter; what it sounds like depends on the key and on
//! accidentals printed earlier in the same measure. `AlteredPitches` holds that state.

use super::group::Group;
use crate::models::{Accidental, Height, KeySignature, Pitch, Step, Token};
use std::collections::HashMap;

/// Accidental currently in force for each altered letter
#[derive(Debug, Clone, Default, PartialEq)]
pub struct AlteredPitches {
    altered: HashMap<Step, Accidental>,
}

impl AlteredPitches {
    pub fn from_key(key: KeySignature) -> Self {
        Self {
            altered: key.altered_steps().into_iter().collect(),
        }
    }

    pub fn get(&self, step: Step) -> Option<Accidental> {
        self.altered.get(&step).copied()
    }

    /// Record a printed accidental; a natural clears the letter
    pub fn set(&mut self, step: Step, accidental: Accidental) {
        if accidental == Accidental::Natural {
            self.altered.remove(&step);
        } else {
            self.altered.insert(step, accidental);
        }
    }

    /// Sounding pitch of a printed height, updating the state for explicit accidentals
    pub fn resolve(&mut self, height: &Height) -> Pitch {
        let alter = match height.accidental {
            Some(accidental) => {
                self.set(height.step, accidental);
                accidental.alter()
            }
            None => self.get(height.step).map(|a| a.alter()).unwrap_or(0),
        };
        Pitch::new(height.step, alter, height.octave)
    }
}

/// Resolve every note of one measure, in label order
///
/// `key` is the key in effect when the measure starts; a key signature inside the
/// measure reseeds the state. Returns the key in effect at the end of the measure.
pub fn resolve_measure(groups: &mut [Group], key: KeySignature) -> KeySignature {
    let mut key = key;
    let mut altered = AlteredPitches::from_key(key);

    for group in groups.iter_mut() {
        for symbol in group.symbols.iter_mut() {
            match symbol.token {
                Token::KeySignature(new_key) => {
                    key = new_key;
                    altered = AlteredPitches::from_key(key);
                }
                Token::Note(note) | Token::GraceNote(note) => {
                    symbol.pitch = Some(altered.resolve(&note.height));
                }
                _ => {}
            }
        }
        // Sub-groups hold copies of the same symbols
        let resolved: Vec<_> = group.symbols.iter().map(|s| s.pitch).collect();
        let mut index = 0;
        for sub in group.subgroups.iter_mut() {
            for symbol in sub.symbols.iter_mut() {
                symbol.pitch = resolved.get(index).copied().flatten();
                index += 1;
            }
        }
    }
    key
}
