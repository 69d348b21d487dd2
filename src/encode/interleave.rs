//! Voice Interleaver
//!
//! Turns a `MeasureReading` into the token groups of one measure. A single voice is
//! emitted as read. Several voices are merged by onset: everything that starts at the
//! same instant becomes one group, ordered the way it reads on the staff.
//!
//! Attribute directives are placed before anything else that starts at their onset,
//! and a header (clef, key, time) is injected in front of measures that open a system.

use super::context::Header;
use super::reader::{MeasureReading, VoiceEvent, VoiceItem, VoiceLine};
use crate::errors::InterleaveError;
use crate::models::duration::zero;
use crate::models::{Rational, Token};
use std::cmp::Ordering;

/// Token groups of one measure, ending with `barline`
#[derive(Debug, Clone, PartialEq)]
pub struct EncodedMeasure {
    pub groups: Vec<Vec<Token>>,
    pub polyphonic: bool,
}

/// Interleave voices, inject the header and close the measure
pub fn encode_measure(reading: &MeasureReading, header: &Header) -> Result<EncodedMeasure, InterleaveError> {
    let polyphonic = reading.is_polyphonic();
    let mut groups = interleave(reading)?;
    if polyphonic {
        for group in groups.iter_mut() {
            group.sort_by(compare_tokens);
        }
    }
    inject_header(&mut groups, header);
    groups.push(vec![Token::Barline]);
    Ok(EncodedMeasure { groups, polyphonic })
}

// ============================================================================
// MERGE
// ============================================================================

/// Append invisible gaps so every voice ends at the same total
pub fn pad_voices(voices: &mut [VoiceLine]) {
    let Some(longest) = voices.iter().map(|v| v.total()).max() else {
        return;
    };
    for voice in voices.iter_mut() {
        let gap = longest - voice.total();
        if gap > zero() {
            voice.events.push(VoiceEvent::forward(gap));
        }
    }
}

struct Stream<'a> {
    /// (onset, event) in voice order
    events: Vec<(Rational, &'a VoiceEvent)>,
    next: usize,
}

impl<'a> Stream<'a> {
    fn new(line: &'a VoiceLine) -> Self {
        let mut onset = zero();
        let events = line
            .events
            .iter()
            .map(|event| {
                let start = onset;
                onset += event.duration;
                (start, event)
            })
            .collect();
        Self { events, next: 0 }
    }

    fn peek(&self) -> Option<(Rational, &'a VoiceEvent)> {
        self.events.get(self.next).copied()
    }
}

/// Merge voices and directives into groups, ordered by onset
///
/// At each onset, directives come first (one group each), then zero-duration events
/// (grace notes, ties), then one group holding every event that starts there.
///
/// Every step consumes a directive or at least one event, so the step bound is never
/// reached on well-formed input; `Diverged` is the error that rejects bad timelines.
pub fn interleave(reading: &MeasureReading) -> Result<Vec<Vec<Token>>, InterleaveError> {
    for line in &reading.voices {
        if let Some(event) = line.events.iter().find(|e| e.duration < zero()) {
            return Err(InterleaveError::Diverged {
                voice: line.voice,
                reason: format!("negative duration {}", event.duration),
            });
        }
    }

    let mut voices = reading.voices.clone();
    pad_voices(&mut voices);
    let mut streams: Vec<Stream> = voices.iter().map(Stream::new).collect();

    let mut directives: Vec<_> = reading.directives.iter().collect();
    directives.sort_by_key(|d| d.onset);
    let mut next_directive = 0;

    let limit = directives.len() + streams.iter().map(|s| s.events.len()).sum::<usize>() + 1;
    let mut groups = Vec::new();

    for _ in 0..limit {
        let directive_onset = directives.get(next_directive).map(|d| d.onset);
        let Some(onset) = streams
            .iter()
            .filter_map(|s| s.peek().map(|(onset, _)| onset))
            .chain(directive_onset)
            .min()
        else {
            return Ok(groups);
        };

        if directive_onset == Some(onset) {
            groups.push(vec![directives[next_directive].token]);
            next_directive += 1;
            continue;
        }

        let starting: Vec<usize> = streams
            .iter()
            .enumerate()
            .filter(|(_, s)| matches!(s.peek(), Some((o, _)) if o == onset))
            .map(|(i, _)| i)
            .collect();
        let instant: Vec<usize> = starting
            .iter()
            .copied()
            .filter(|i| matches!(streams[*i].peek(), Some((_, e)) if e.duration == zero()))
            .collect();
        let taking = if instant.is_empty() { starting } else { instant };

        let mut group = Vec::new();
        for i in taking {
            let stream = &mut streams[i];
            if let Some((_, event)) = stream.peek() {
                if let VoiceItem::Tokens(tokens) = &event.item {
                    group.extend(tokens.iter().copied());
                }
            }
            stream.next += 1;
        }
        if !group.is_empty() {
            groups.push(group);
        }
    }

    Err(InterleaveError::StepLimit { limit })
}

// ============================================================================
// ORDERING
// ============================================================================

fn rank(token: &Token) -> u8 {
    match token {
        Token::Clef(_) => 0,
        Token::Note(_) | Token::GraceNote(_) => 2,
        Token::Rest { .. } => 3,
        _ => 1,
    }
}

/// Staff order within a group: clefs, other marks, notes bottom-up, then rests
pub fn compare_tokens(a: &Token, b: &Token) -> Ordering {
    match (a.height(), b.height()) {
        (Some(x), Some(y)) => x.octave.cmp(&y.octave).then(x.ordinal().cmp(&y.ordinal())),
        _ => rank(a).cmp(&rank(b)),
    }
}

// ============================================================================
// HEADER
// ============================================================================

fn attribute_rank(token: &Token) -> u8 {
    match token {
        Token::Clef(_) => 0,
        Token::KeySignature(_) => 1,
        _ => 2,
    }
}

/// Make sure the measure opens with the header's attributes
///
/// Only the leading run of single-attribute groups is inspected; anything the header
/// adds is merged into that run and the run is put in clef, key, time order.
pub fn inject_header(groups: &mut Vec<Vec<Token>>, header: &Header) {
    if header.is_empty() {
        return;
    }
    let leading = groups
        .iter()
        .take_while(|g| g.len() == 1 && g[0].is_attribute())
        .count();
    let mut attributes: Vec<Token> = groups.drain(..leading).map(|g| g[0]).collect();

    let has = |attributes: &[Token], f: fn(&Token) -> bool| attributes.iter().any(f);
    if let Some(clef) = header.clef {
        if !has(&attributes, |t| matches!(t, Token::Clef(_))) {
            attributes.push(Token::Clef(clef));
        }
    }
    if let Some(key) = header.key {
        if !has(&attributes, |t| matches!(t, Token::KeySignature(_))) {
            attributes.push(Token::KeySignature(key));
        }
    }
    if let Some(time) = header.time {
        if !has(&attributes, |t| matches!(t, Token::TimeSignature(_))) {
            attributes.push(Token::TimeSignature(time));
        }
    }
    attributes.sort_by_key(attribute_rank);

    let mut merged: Vec<Vec<Token>> = attributes.into_iter().map(|t| vec![t]).collect();
    merged.append(groups);
    *groups = merged;
}

#[cfg(test)]
#[path = "interleave_tests.rs"]
mod tests;
