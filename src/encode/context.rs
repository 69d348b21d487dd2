//! Attribute context carried from one measure to the next

use crate::models::{Clef, KeySignature, TimeSignature, Token};

/// Attributes in effect at a measure boundary
///
/// The reader never mutates a context in place: it takes the context in effect at the
/// start of a measure and returns the one in effect at its end.
#[derive(Debug, Clone, PartialEq)]
pub struct EncodeContext {
    pub clef: Option<Clef>,
    pub key: Option<KeySignature>,
    pub time: Option<TimeSignature>,
    /// MusicXML divisions per quarter note
    pub divisions: i32,
    /// Staves in the part; `<staff>` is only consulted when there is more than one
    pub staves: u32,
}

impl Default for EncodeContext {
    fn default() -> Self {
        Self {
            clef: None,
            key: None,
            time: None,
            divisions: 1,
            staves: 1,
        }
    }
}

impl EncodeContext {
    /// Percussion or tablature staff: nothing from here on is encoded
    pub fn is_unsupported(&self) -> bool {
        self.clef.map(|c| c.is_unsupported()).unwrap_or(false)
    }

    /// Record an attribute token
    pub fn apply(&mut self, token: &Token) {
        match token {
            Token::Clef(clef) => self.clef = Some(*clef),
            Token::KeySignature(key) => self.key = Some(*key),
            Token::TimeSignature(time) => self.time = Some(*time),
            _ => {}
        }
    }
}

/// Attributes that must open a measure because it starts a system or the score
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Header {
    pub clef: Option<Clef>,
    pub key: Option<KeySignature>,
    pub time: Option<TimeSignature>,
}

impl Header {
    /// Header for a measure that starts a new system (and maybe the score)
    pub fn for_measure(context: &EncodeContext, new_system: bool, new_score: bool) -> Self {
        let mut header = Header::default();
        if new_system || new_score {
            header.clef = context.clef;
            header.key = context.key;
        }
        if new_score {
            header.time = context.time;
        }
        header
    }

    pub fn is_empty(&self) -> bool {
        self.clef.is_none() && self.key.is_none() && self.time.is_none()
    }
}
