//! Measure Reader
//!
//! Walks the children of one `<measure>` in document order and produces, per voice,
//! a timeline of token groups with their durations. Attribute changes are collected
//! separately with the onset at which they occur, so the interleaver can slot them in
//! ahead of whatever sounds at that instant.
//!
//! Time is tracked in quarter notes as exact rationals (`<duration>` / divisions).

use super::context::EncodeContext;
use super::xml::{children_named, get_child, get_child_int, get_child_text, has_child};
use crate::models::duration::zero;
use crate::models::{
    Accidental, Clef, ClefSign, Height, KeySignature, Length, NoteToken, NoteType, Rational, Step,
    TimeSignature, Token,
};
use roxmltree::Node;
use std::collections::BTreeMap;

// ============================================================================
// OUTPUT TYPES
// ============================================================================

/// What a voice does for a span of time
#[derive(Debug, Clone, PartialEq)]
pub enum VoiceItem {
    /// Tokens sounding together (a note, a chord, a rest, a grace note, a tie)
    Tokens(Vec<Token>),
    /// Invisible time gap
    Forward,
}

#[derive(Debug, Clone, PartialEq)]
pub struct VoiceEvent {
    pub item: VoiceItem,
    pub duration: Rational,
}

impl VoiceEvent {
    pub fn tokens(tokens: Vec<Token>, duration: Rational) -> Self {
        Self { item: VoiceItem::Tokens(tokens), duration }
    }

    pub fn forward(duration: Rational) -> Self {
        Self { item: VoiceItem::Forward, duration }
    }

    pub fn is_forward(&self) -> bool {
        matches!(self.item, VoiceItem::Forward)
    }
}

/// Timeline of one voice within a measure
#[derive(Debug, Clone, PartialEq)]
pub struct VoiceLine {
    pub voice: u32,
    pub events: Vec<VoiceEvent>,
}

impl VoiceLine {
    pub fn new(voice: u32) -> Self {
        Self { voice, events: Vec::new() }
    }

    pub fn total(&self) -> Rational {
        self.events.iter().map(|e| e.duration).sum()
    }

    /// True if the voice produces at least one token
    pub fn has_tokens(&self) -> bool {
        self.events.iter().any(|e| !e.is_forward())
    }
}

/// Attribute or multirest token that applies to every voice at a given onset
#[derive(Debug, Clone, PartialEq)]
pub struct Directive {
    pub onset: Rational,
    pub token: Token,
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct MeasureReading {
    pub number: String,
    pub voices: Vec<VoiceLine>,
    pub directives: Vec<Directive>,
    /// Measures covered by a multirest, including this one
    pub skip: u32,
}

impl MeasureReading {
    /// More than one voice carries tokens
    pub fn is_polyphonic(&self) -> bool {
        self.voices.iter().filter(|v| v.has_tokens()).count() > 1
    }
}

#[derive(Debug, Clone, PartialEq)]
pub enum ReadOutcome {
    Read(MeasureReading),
    /// Percussion or tablature: the measure (and every later one) is not encoded
    Unsupported,
}

// ============================================================================
// READER
// ============================================================================

/// Read one measure given the context in effect at its start
///
/// Returns the reading and the context in effect at its end.
pub fn read_measure(measure: Node, context: &EncodeContext) -> (ReadOutcome, EncodeContext) {
    let mut context = context.clone();
    if context.is_unsupported() {
        return (ReadOutcome::Unsupported, context);
    }

    let mut builder = MeasureBuilder::new(measure.attribute("number").unwrap_or(""));

    for child in measure.children().filter(|n| n.is_element()) {
        match child.tag_name().name() {
            "attributes" => {
                let attributes = read_attributes(child, &mut context);
                if attributes.unsupported {
                    log::debug!("measure {}: unsupported clef, skipping staff", builder.number);
                    return (ReadOutcome::Unsupported, context);
                }
                let onset = builder.cursor.max(zero());
                for token in attributes.tokens {
                    builder.directives.push(Directive { onset, token });
                }
                if let Some(count) = attributes.multirest {
                    builder.directives.push(Directive { onset, token: Token::MultiRest(count) });
                    builder.skip = count;
                    // The rest of a multirest measure is a placeholder whole rest
                    break;
                }
            }
            "note" => builder.note(child, &context),
            "forward" => {
                let duration = element_duration(child, &context);
                builder.pending_forward += duration;
                builder.cursor += duration;
            }
            "backup" => {
                builder.flush_forward_to_current();
                builder.current_voice = None;
                builder.cursor -= element_duration(child, &context);
            }
            _ => {
                // direction, print, barline, sound, harmony... carry no labels
            }
        }
    }

    (ReadOutcome::Read(builder.finish()), context)
}

/// One event before ties are expanded
struct PendingEvent {
    tokens: Vec<Token>,
    duration: Rational,
    forward: bool,
    tie_after: bool,
}

struct MeasureBuilder {
    number: String,
    voices: BTreeMap<u32, Vec<PendingEvent>>,
    directives: Vec<Directive>,
    current_voice: Option<u32>,
    /// Voice and index of the last visible note, which `<chord/>` notes join
    chord_anchor: Option<(u32, usize)>,
    pending_forward: Rational,
    /// Position of the MusicXML cursor within the measure
    cursor: Rational,
    skip: u32,
}

impl MeasureBuilder {
    fn new(number: &str) -> Self {
        Self {
            number: number.to_string(),
            voices: BTreeMap::new(),
            directives: Vec::new(),
            current_voice: None,
            chord_anchor: None,
            pending_forward: zero(),
            cursor: zero(),
            skip: 0,
        }
    }

    fn total(&self, voice: u32) -> Rational {
        self.voices
            .get(&voice)
            .map(|events| events.iter().map(|e| e.duration).sum())
            .unwrap_or_else(zero)
    }

    /// Bring `voice` up to `position` with an invisible gap, at most `limit` long
    fn catch_up(&mut self, voice: u32, position: Rational, limit: Option<Rational>) {
        let mut gap = position - self.total(voice);
        if let Some(limit) = limit {
            gap = gap.min(limit);
        }
        if gap > zero() {
            self.voices.entry(voice).or_default().push(PendingEvent {
                tokens: Vec::new(),
                duration: gap,
                forward: true,
                tie_after: false,
            });
        }
    }

    /// Pending gap belongs to the voice that was current when it was read
    fn flush_forward_to_current(&mut self) {
        if self.pending_forward > zero() {
            if let Some(voice) = self.current_voice {
                self.catch_up(voice, self.cursor, Some(self.pending_forward));
            }
        }
        self.pending_forward = zero();
    }

    fn note(&mut self, note: Node, context: &EncodeContext) {
        let read = read_note(note, context);
        let onset = self.cursor;

        if !read.chord {
            self.cursor += read.duration;
        }
        if context.staves > 1 && read.staff != 1 {
            return;
        }

        if read.chord {
            if read.hidden {
                return;
            }
            let anchor = match self.chord_anchor {
                Some((voice, index)) if voice == read.voice => self
                    .voices
                    .get_mut(&voice)
                    .filter(|events| events.len() == index + 1)
                    .and_then(|events| events.last_mut()),
                _ => None,
            };
            match anchor {
                Some(last) => {
                    if let Some(token) = read.token {
                        last.tokens.push(token);
                    }
                    last.tie_after |= read.tie_start;
                }
                None => log::debug!("measure {}: chord note without a visible main note", self.number),
            }
            return;
        }

        // A voice change closes the previous voice's pending gap
        if self.current_voice != Some(read.voice) && self.pending_forward > zero() {
            if let Some(previous) = self.current_voice {
                self.catch_up(previous, onset, Some(self.pending_forward));
            }
        }
        self.pending_forward = zero();
        self.current_voice = Some(read.voice);
        self.catch_up(read.voice, onset, None);

        match read.token {
            Some(token) if !read.hidden => {
                let events = self.voices.entry(read.voice).or_default();
                events.push(PendingEvent {
                    tokens: vec![token],
                    duration: read.duration,
                    forward: false,
                    tie_after: read.tie_start,
                });
                self.chord_anchor = Some((read.voice, events.len() - 1));
            }
            _ => {
                self.chord_anchor = None;
                self.pending_forward += read.duration;
            }
        }
    }

    fn finish(mut self) -> MeasureReading {
        // Trailing gap only if it doesn't run past the longest voice
        if self.pending_forward > zero() {
            let longest = self.voices.keys().map(|v| self.total(*v)).max();
            let target = self
                .current_voice
                .or_else(|| self.voices.keys().next_back().copied());
            if let (Some(longest), Some(voice)) = (longest, target) {
                let gap = (self.cursor - self.total(voice)).min(self.pending_forward);
                if self.total(voice) + gap <= longest {
                    self.catch_up(voice, self.cursor, Some(self.pending_forward));
                }
            }
        }

        let voices = self
            .voices
            .into_iter()
            .map(|(voice, pending)| {
                let mut line = VoiceLine::new(voice);
                for event in pending {
                    if event.forward {
                        line.events.push(VoiceEvent::forward(event.duration));
                        continue;
                    }
                    line.events.push(VoiceEvent::tokens(event.tokens, event.duration));
                    if event.tie_after {
                        line.events.push(VoiceEvent::tokens(vec![Token::Tie], zero()));
                    }
                }
                line
            })
            .collect();

        MeasureReading {
            number: self.number,
            voices,
            directives: self.directives,
            skip: self.skip,
        }
    }
}

// ============================================================================
// NOTES
// ============================================================================

struct NoteRead {
    voice: u32,
    staff: u32,
    chord: bool,
    hidden: bool,
    duration: Rational,
    /// None for unpitched notes
    token: Option<Token>,
    tie_start: bool,
}

fn read_note(note: Node, context: &EncodeContext) -> NoteRead {
    let grace = has_child(note, "grace");
    let chord = has_child(note, "chord");
    let voice = get_child_int(note, "voice").filter(|v| *v > 0).unwrap_or(1) as u32;
    let staff = get_child_int(note, "staff").filter(|s| *s > 0).unwrap_or(1) as u32;
    let hidden = note.attribute("print-object") == Some("no");
    let duration = if grace { zero() } else { element_duration(note, context) };

    let fermata = get_child(note, "notations")
        .map(|n| has_child(n, "fermata"))
        .unwrap_or(false);
    let tie_start = children_named(note, "tie").any(|t| t.attribute("type") == Some("start"))
        || get_child(note, "notations")
            .map(|n| children_named(n, "tied").any(|t| t.attribute("type") == Some("start")))
            .unwrap_or(false);

    let token = if let Some(rest) = get_child(note, "rest") {
        let length = note_length(note, duration, rest.attribute("measure") == Some("yes"));
        Some(Token::Rest { length, fermata })
    } else if let Some(pitch) = get_child(note, "pitch") {
        read_height(note, pitch).map(|height| {
            let token = NoteToken { height, length: note_length(note, duration, false), fermata };
            if grace {
                Token::GraceNote(token)
            } else {
                Token::Note(token)
            }
        })
    } else {
        None
    };

    NoteRead { voice, staff, chord, hidden, duration, token, tie_start }
}

/// Printed spelling: step and octave from `<pitch>`, sign from `<accidental>`
fn read_height(note: Node, pitch: Node) -> Option<Height> {
    let step = get_child_text(pitch, "step")
        .and_then(|s| s.chars().next())
        .and_then(Step::from_char)?;
    let octave = get_child_int(pitch, "octave")? as i8;
    let accidental = get_child_text(note, "accidental").and_then(Accidental::from_musicxml);
    Some(Height::new(step, accidental, octave))
}

/// Written length: `<type>` plus `<dot/>`s, else derived from the duration
fn note_length(note: Node, duration: Rational, measure_rest: bool) -> Length {
    if let Some(note_type) = get_child_text(note, "type").and_then(NoteType::from_musicxml) {
        let dots = children_named(note, "dot").count() as u8;
        return Length::new(note_type, dots);
    }
    if measure_rest {
        return Length::new(NoteType::Whole, 0);
    }
    Length::from_quarter_length(duration).unwrap_or_else(|| {
        log::debug!("no table length for duration {}, using quarter", duration);
        Length::quarter()
    })
}

/// `<duration>` of a note, forward or backup, in quarter notes
fn element_duration(node: Node, context: &EncodeContext) -> Rational {
    let divisions = context.divisions.max(1);
    get_child_int(node, "duration")
        .map(|d| Rational::new(d, divisions))
        .unwrap_or_else(zero)
}

// ============================================================================
// ATTRIBUTES
// ============================================================================

#[derive(Default)]
struct AttributesRead {
    /// Canonical order: clef, key, time
    tokens: Vec<Token>,
    multirest: Option<u32>,
    unsupported: bool,
}

/// Read an `<attributes>` element, updating the context as a side effect
fn read_attributes(attributes: Node, context: &mut EncodeContext) -> AttributesRead {
    let mut read = AttributesRead::default();

    if let Some(divisions) = get_child_int(attributes, "divisions").filter(|d| *d > 0) {
        context.divisions = divisions;
    }
    if let Some(staves) = get_child_int(attributes, "staves").filter(|s| *s > 0) {
        context.staves = staves as u32;
    }

    if let Some(clef) = children_named(attributes, "clef").find(is_first_staff) {
        if let Some(sign) = get_child_text(clef, "sign").and_then(ClefSign::from_musicxml) {
            let line = get_child_int(clef, "line")
                .map(|l| l as u8)
                .unwrap_or_else(|| Clef::default_line(sign));
            let clef = Clef::new(sign, line);
            context.clef = Some(clef);
            if clef.is_unsupported() {
                read.unsupported = true;
                return read;
            }
            read.tokens.push(Token::Clef(clef));
        }
    }

    if let Some(key) = children_named(attributes, "key").find(is_first_staff) {
        if let Some(fifths) = get_child_int(key, "fifths") {
            read.tokens.push(Token::KeySignature(KeySignature::new(fifths as i8)));
        }
    }

    if let Some(time) = get_child(attributes, "time") {
        if let Some(signature) = read_time(time) {
            read.tokens.push(Token::TimeSignature(signature));
        }
    }

    for token in &read.tokens {
        context.apply(token);
    }

    read.multirest = get_child(attributes, "measure-style")
        .and_then(|style| get_child_int(style, "multiple-rest"))
        .filter(|n| *n > 0)
        .map(|n| n as u32);

    read
}

fn is_first_staff(node: &Node) -> bool {
    matches!(node.attribute("number"), None | Some("1"))
}

fn read_time(time: Node) -> Option<TimeSignature> {
    match time.attribute("symbol") {
        Some("common") => return Some(TimeSignature::Common),
        Some("cut") => return Some(TimeSignature::Cut),
        _ => {}
    }
    let beats = get_child_text(time, "beats")?;
    let beat_type = get_child_text(time, "beat-type")?;
    TimeSignature::parse(&format!("{}/{}", beats, beat_type))
}

#[cfg(test)]
#[path = "reader_tests.rs"]
mod tests;
