//! Shared data model
//!
//! Types used by both directions of the codec: durations, pitch spelling,
//! the label vocabulary, and the reconstructed notation tree.

pub mod duration;
pub mod notation;
pub mod pitch;
pub mod token;

// Re-export commonly used types
pub use duration::{Length, NoteType, Rational};
pub use notation::{Chord, Event, Measure, Note, Part, Rest, Voice};
pub use pitch::{Accidental, Height, Pitch, Step};
pub use token::{Clef, ClefSign, KeySignature, NoteToken, TimeSignature, Token};
