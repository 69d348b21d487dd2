//! Vocabulary translator
//!
//! Maps full symbol labels to the short forms used by recognition models and back.
//! The dictionary is a JSON object of `full → short` pairs. Symbols missing from the
//! dictionary translate to nothing and are reported once per translator.

use crate::errors::{CodecError, Result};
use crate::models::token::SEPARATOR;
use std::collections::{HashMap, HashSet};

#[derive(Debug, Clone, Default)]
pub struct Translator {
    to_short: HashMap<String, String>,
    to_full: HashMap<String, String>,
    reported: HashSet<String>,
}

impl Translator {
    pub fn from_json(json: &str) -> Result<Self> {
        let to_short: HashMap<String, String> =
            serde_json::from_str(json).map_err(|e| CodecError::Translator(e.to_string()))?;
        let to_full = to_short.iter().map(|(full, short)| (short.clone(), full.clone())).collect();
        Ok(Self {
            to_short,
            to_full,
            reported: HashSet::new(),
        })
    }

    /// Full labels → short forms
    pub fn shorten(&mut self, sequence: &str) -> String {
        let Self { to_short, reported, .. } = self;
        translate(sequence, to_short, reported)
    }

    /// Short forms → full labels
    pub fn expand(&mut self, sequence: &str) -> String {
        let Self { to_full, reported, .. } = self;
        translate(sequence, to_full, reported)
    }

    /// Symbols seen so far that were not in the dictionary
    pub fn unknown(&self) -> impl Iterator<Item = &str> {
        self.reported.iter().map(String::as_str)
    }
}

fn translate(sequence: &str, table: &HashMap<String, String>, reported: &mut HashSet<String>) -> String {
    let mut out: Vec<&str> = Vec::new();
    for word in sequence.split_whitespace() {
        if word == SEPARATOR {
            out.push(word);
            continue;
        }
        match table.get(word) {
            Some(translated) => out.push(translated),
            None => {
                if reported.insert(word.to_string()) {
                    log::warn!("symbol not in vocabulary: {}", word);
                }
            }
        }
    }
    out.join(" ")
}

#[cfg(test)]
mod tests {
    use super::*;

    const DICT: &str = r#"{"note-C4_quarter": "C4q", "barline": "|", "clef-G2": "G2"}"#;

    #[test]
    fn test_shorten_and_expand() {
        let mut translator = Translator::from_json(DICT).unwrap();
        let short = translator.shorten("clef-G2 + note-C4_quarter + barline ");
        assert_eq!(short, "G2 + C4q + |");
        assert_eq!(translator.expand(&short), "clef-G2 + note-C4_quarter + barline");
    }

    #[test]
    fn test_unknown_symbol_translates_to_nothing() {
        let mut translator = Translator::from_json(DICT).unwrap();
        assert_eq!(translator.shorten("note-D4_quarter note-C4_quarter"), "C4q");
        translator.shorten("note-D4_quarter");
        assert_eq!(translator.unknown().collect::<Vec<_>>(), vec!["note-D4_quarter"]);
    }

    #[test]
    fn test_malformed_dictionary() {
        assert!(matches!(Translator::from_json("[1, 2]"), Err(CodecError::Translator(_))));
    }
}
