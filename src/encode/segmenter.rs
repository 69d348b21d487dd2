//! System Segmenter
//!
//! Cuts the stream of encoded measures into one sequence per printed system, using the
//! explicit `<print new-system="yes">` / `<print new-page="yes">` markers that MuseScore
//! writes into the score.

use super::interleave::EncodedMeasure;
use super::xml::children_named;
use crate::models::token::join_groups;
use crate::models::Token;
use roxmltree::Node;
use serde::{Deserialize, Serialize};

/// How system breaks are detected
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum ParsingMode {
    /// Break on explicit new-system / new-page markers
    #[default]
    NewSystem,
    /// Width-based heuristic; deprecated and produces no sequences
    Legacy,
}

/// True if the measure carries a new-system or new-page marker
pub fn is_new_system(measure: Node) -> bool {
    let marked = |value: Option<&str>| value.map_or(false, |v| v != "no");
    children_named(measure, "print")
        .any(|print| marked(print.attribute("new-system")) || marked(print.attribute("new-page")))
}

/// One printed system worth of measures
#[derive(Debug, Clone, Default, PartialEq)]
pub struct System {
    pub groups: Vec<Vec<Token>>,
    /// At least one measure of the system had two or more voices
    pub polyphonic: bool,
}

impl System {
    /// Label text (groups joined with ` + `, trailing space)
    pub fn text(&self) -> String {
        join_groups(&self.groups)
    }

    pub fn is_empty(&self) -> bool {
        self.groups.is_empty()
    }
}

/// Accumulates measures and closes a system at every break
///
/// A break always closes a system, even an empty one, so system indices follow the
/// printed layout (MuseScore 4 marks the very first measure as a new system).
#[derive(Debug, Default)]
pub struct SystemSegmenter {
    current: System,
    /// A measure was seen since the last break
    open: bool,
    systems: Vec<System>,
}

impl SystemSegmenter {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn break_system(&mut self) {
        self.systems.push(std::mem::take(&mut self.current));
        self.open = false;
    }

    pub fn push(&mut self, measure: EncodedMeasure) {
        self.open = true;
        self.current.polyphonic |= measure.polyphonic;
        self.current.groups.extend(measure.groups);
    }

    /// Record a measure that produced nothing (unsupported staff, dropped, multirest body)
    pub fn push_empty(&mut self) {
        self.open = true;
    }

    /// Every system in order, empty ones included
    pub fn finish(mut self) -> Vec<System> {
        if self.open {
            self.systems.push(self.current);
        }
        self.systems
    }
}
