//! Reconstructed notation
//!
//! The decoder's output: a part made of measures, each measure holding the attribute
//! changes that apply to all voices followed by one or more independent voices.
//! Everything here is plain data (serde-serializable) so it can cross the WASM boundary
//! or be handed to a MusicXML writer.

use super::duration::{zero, Length, Rational};
use super::pitch::Pitch;
use super::token::{Clef, KeySignature, TimeSignature};
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Note {
    pub pitch: Pitch,
    pub length: Length,
    pub grace: bool,
    pub fermata: bool,
}

impl Note {
    pub fn duration(&self) -> Rational {
        if self.grace {
            zero()
        } else {
            self.length.quarter_length()
        }
    }
}

/// Simultaneous notes of one length
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Chord {
    pub notes: Vec<Note>,
}

impl Chord {
    pub fn duration(&self) -> Rational {
        self.notes.first().map(|n| n.duration()).unwrap_or_else(zero)
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Rest {
    pub length: Length,
    pub fermata: bool,
    /// Inserted to keep voices aligned, not present in the labels
    pub padding: bool,
}

/// One item of a voice
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum Event {
    Note(Note),
    Chord(Chord),
    Rest(Rest),
    MultiRest(u32),
    Tie,
    Clef(Clef),
    Key(KeySignature),
    Time(TimeSignature),
}

impl Event {
    pub fn duration(&self) -> Rational {
        match self {
            Event::Note(note) => note.duration(),
            Event::Chord(chord) => chord.duration(),
            Event::Rest(rest) => rest.length.quarter_length(),
            _ => zero(),
        }
    }

    pub fn is_padding(&self) -> bool {
        matches!(self, Event::Rest(Rest { padding: true, .. }))
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Voice {
    pub events: Vec<Event>,
}

impl Voice {
    pub fn duration(&self) -> Rational {
        self.events.iter().map(|e| e.duration()).sum()
    }

    /// Durations of the events that came from labels
    pub fn written_durations(&self) -> Vec<Rational> {
        self.events
            .iter()
            .filter(|e| !e.is_padding())
            .map(|e| e.duration())
            .filter(|d| *d > zero())
            .collect()
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Measure {
    /// 1-based position within the part
    pub number: usize,
    /// Key in effect at the end of the measure
    pub key: KeySignature,
    /// Attribute changes that precede all voices
    pub leading: Vec<Event>,
    pub voices: Vec<Voice>,
}

impl Measure {
    pub fn new(number: usize, key: KeySignature) -> Self {
        Self {
            number,
            key,
            leading: Vec::new(),
            voices: Vec::new(),
        }
    }

    /// First clef of the measure, if it opens with one
    pub fn start_clef(&self) -> Option<Clef> {
        self.leading.iter().find_map(|e| match e {
            Event::Clef(clef) => Some(*clef),
            _ => None,
        })
    }

    /// Last clef written anywhere in the measure
    pub fn last_clef(&self) -> Option<Clef> {
        self.leading
            .iter()
            .chain(self.voices.iter().flat_map(|v| v.events.iter()))
            .filter_map(|e| match e {
                Event::Clef(clef) => Some(*clef),
                _ => None,
            })
            .last()
    }

    pub fn time_signature(&self) -> Option<TimeSignature> {
        self.leading.iter().find_map(|e| match e {
            Event::Time(time) => Some(*time),
            _ => None,
        })
    }

    /// Drop the opening clef (used when it repeats the previous line's clef)
    pub fn remove_start_clef(&mut self) {
        if let Some(pos) = self.leading.iter().position(|e| matches!(e, Event::Clef(_))) {
            self.leading.remove(pos);
        }
    }

    /// Notes of all voices in voice order, chords flattened
    pub fn notes(&self) -> Vec<&Note> {
        self.voices
            .iter()
            .flat_map(|v| v.events.iter())
            .flat_map(|e| match e {
                Event::Note(note) => vec![note],
                Event::Chord(chord) => chord.notes.iter().collect(),
                _ => Vec::new(),
            })
            .collect()
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Part {
    pub measures: Vec<Measure>,
}

impl Part {
    pub fn new() -> Self {
        Self::default()
    }

    /// Clef in effect after the last measure
    pub fn last_clef(&self) -> Option<Clef> {
        self.measures.iter().rev().find_map(|m| m.last_clef())
    }
}
