//! Group Classifier
//!
//! A group is the run of symbols between two ` + ` separators. One symbol is a SYMBOL
//! group; equal-duration notes are a CHORD; anything else is a TUPLE, which stands for
//! several voices sounding at once and is split into sub-groups.

use super::symbol::Symbol;
use crate::models::duration::zero;
use crate::models::Rational;
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum GroupKind {
    Symbol,
    Chord,
    Tuple,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Group {
    pub kind: GroupKind,
    pub symbols: Vec<Symbol>,
    /// Per-voice parts of a TUPLE, bottom-up; empty for other kinds
    pub subgroups: Vec<Group>,
}

impl Group {
    /// Classify a non-empty list of symbols
    pub fn new(symbols: Vec<Symbol>) -> Self {
        let kind = classify(&symbols);
        let subgroups = match kind {
            GroupKind::Tuple => split_runs(&symbols).into_iter().map(Group::new).collect(),
            _ => Vec::new(),
        };
        Self { kind, symbols, subgroups }
    }

    pub fn from_labels<'a>(labels: impl IntoIterator<Item = &'a str>) -> Self {
        Self::new(labels.into_iter().map(Symbol::parse).collect())
    }

    /// Number of voices the group spans
    pub fn voice_count(&self) -> usize {
        match self.kind {
            GroupKind::Tuple => self.subgroups.len(),
            _ => 1,
        }
    }

    /// Duration of a SYMBOL or CHORD group (the longest part for a TUPLE)
    pub fn duration(&self) -> Rational {
        self.symbols.iter().map(|s| s.duration()).max().unwrap_or_else(zero)
    }

    /// Made only of clef, key and time signature symbols
    pub fn is_attribute_only(&self) -> bool {
        !self.symbols.is_empty() && self.symbols.iter().all(|s| s.is_attribute())
    }
}

fn classify(symbols: &[Symbol]) -> GroupKind {
    match symbols {
        [_] => GroupKind::Symbol,
        [first, rest @ ..]
            if symbols.iter().all(|s| s.is_note())
                && rest.iter().all(|s| s.duration() == first.duration()) =>
        {
            GroupKind::Chord
        }
        _ => GroupKind::Tuple,
    }
}

/// Split into maximal runs of notes sharing the duration of the run's first note
///
/// Non-note symbols always stand alone, so every run is a SYMBOL or a CHORD.
pub fn split_runs(symbols: &[Symbol]) -> Vec<Vec<Symbol>> {
    let mut runs: Vec<Vec<Symbol>> = Vec::new();
    for symbol in symbols {
        let extends = runs.last().and_then(|run| run.first()).map_or(false, |anchor| {
            anchor.is_note() && symbol.is_note() && anchor.duration() == symbol.duration()
        });
        match runs.last_mut() {
            Some(run) if extends => run.push(symbol.clone()),
            _ => runs.push(vec![symbol.clone()]),
        }
    }
    runs
}

#[cfg(test)]
mod tests {
    use super::*;

    fn group(text: &str) -> Group {
        Group::from_labels(text.split_whitespace())
    }

    #[test]
    fn test_symbol_group() {
        let g = group("note-C4_quarter");
        assert_eq!(g.kind, GroupKind::Symbol);
        assert_eq!(g.voice_count(), 1);
    }

    #[test]
    fn test_chord_group() {
        let g = group("note-C4_quarter note-E4_quarter note-G4_quarter");
        assert_eq!(g.kind, GroupKind::Chord);
        assert!(g.subgroups.is_empty());
        assert_eq!(g.duration(), Rational::from_integer(1));
    }

    #[test]
    fn test_chord_is_never_split() {
        let g = group("note-C4_half note-E4_half");
        let runs = split_runs(&g.symbols);
        assert_eq!(runs.len(), 1);
        assert_eq!(Group::new(runs[0].clone()).kind, GroupKind::Chord);
    }

    #[test]
    fn test_tuple_group() {
        let g = group("note-C5_quarter rest-half");
        assert_eq!(g.kind, GroupKind::Tuple);
        assert_eq!(g.voice_count(), 2);
        assert_eq!(g.subgroups[0].symbols[0].label, "note-C5_quarter");
        assert_eq!(g.subgroups[1].symbols[0].label, "rest-half");
        assert_eq!(g.duration(), Rational::from_integer(2));
    }

    #[test]
    fn test_tuple_with_chord_part() {
        let g = group("note-E4_half note-G4_half note-C5_quarter note-E5_quarter");
        assert_eq!(g.kind, GroupKind::Tuple);
        assert_eq!(g.voice_count(), 2);
        assert!(g.subgroups.iter().all(|s| s.kind == GroupKind::Chord));
    }

    #[test]
    fn test_equal_rests_are_a_tuple() {
        let g = group("rest-quarter rest-quarter");
        assert_eq!(g.kind, GroupKind::Tuple);
        assert_eq!(g.voice_count(), 2);
    }

    #[test]
    fn test_attribute_only() {
        assert!(group("clef-G2").is_attribute_only());
        assert!(!group("note-C4_quarter").is_attribute_only());
        assert!(!group("multirest-3").is_attribute_only());
    }
}
