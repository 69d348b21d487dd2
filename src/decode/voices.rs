//! Voice Splitter
//!
//! Inverse of the voice interleaver. The measure needs as many voices as its widest
//! TUPLE group. Each group goes to the voice(s) that are furthest behind; voices are
//! padded with rests so that a TUPLE always finds enough voices starting together.

use super::group::{Group, GroupKind};
use super::symbol::Symbol;
use crate::models::duration::zero;
use crate::models::{Chord, Event, KeySignature, Length, Measure, Note, Pitch, Rational, Rest, Token, Voice};

/// Build a measure from resolved groups
pub fn split_voices(number: usize, key: KeySignature, groups: &[Group]) -> Measure {
    let mut measure = Measure::new(number, key);

    let leading = groups.iter().take_while(|g| g.is_attribute_only()).count();
    for group in &groups[..leading] {
        measure.leading.extend(group.symbols.iter().map(symbol_event));
    }

    let voice_count = groups
        .iter()
        .filter(|g| g.kind == GroupKind::Tuple)
        .map(|g| g.voice_count())
        .max()
        .unwrap_or(1)
        .max(1);
    let mut splitter = Splitter::new(voice_count);

    for group in &groups[leading..] {
        splitter.add(group);
    }
    splitter.pad_all();
    measure.voices = splitter.voices;
    measure
}

struct Splitter {
    voices: Vec<Voice>,
    /// Running time per voice, padding included
    totals: Vec<Rational>,
    last_voice: usize,
}

impl Splitter {
    fn new(count: usize) -> Self {
        Self {
            voices: vec![Voice::default(); count],
            totals: vec![zero(); count],
            last_voice: 0,
        }
    }

    fn min_total(&self) -> Rational {
        self.totals.iter().copied().min().unwrap_or_else(zero)
    }

    fn voices_at(&self, total: Rational) -> Vec<usize> {
        (0..self.totals.len()).filter(|i| self.totals[*i] == total).collect()
    }

    /// Pad `voice` towards `target`; returns the time actually filled
    fn pad(&mut self, voice: usize, target: Rational) -> Rational {
        let gap = target - self.totals[voice];
        let mut filled = zero();
        for length in Length::fill(gap) {
            filled += length.quarter_length();
            self.voices[voice].events.push(Event::Rest(Rest {
                length,
                fermata: false,
                padding: true,
            }));
        }
        if filled < gap {
            log::info!("voice {}: {} of padding has no rest length, left unfilled", voice + 1, gap - filled);
        }
        self.totals[voice] += filled;
        filled
    }

    fn append(&mut self, voice: usize, group: &Group) {
        if let Some(event) = group_event(group) {
            self.voices[voice].events.push(event);
        }
        self.totals[voice] += group.duration();
        self.last_voice = voice;
    }

    fn add(&mut self, group: &Group) {
        match group.kind {
            GroupKind::Tuple => self.add_tuple(group),
            // A tie belongs to the note just placed
            _ if group.symbols.iter().all(|s| s.token == Token::Tie) => {
                self.append(self.last_voice, group)
            }
            _ => {
                let min = self.min_total();
                let voice = self.voices_at(min)[0];
                self.append(voice, group);
            }
        }
    }

    fn add_tuple(&mut self, group: &Group) {
        let needed = group.subgroups.len().min(self.voices.len());

        // Level the shortest voices up until enough of them start together
        loop {
            let min = self.min_total();
            let at_min = self.voices_at(min);
            if at_min.len() >= needed {
                break;
            }
            let Some(next) = self.totals.iter().copied().filter(|t| *t > min).min() else {
                break;
            };
            let mut progressed = false;
            for voice in at_min {
                progressed |= self.pad(voice, next) > zero();
            }
            if !progressed {
                break;
            }
        }

        // The `needed` voices furthest behind, in voice order
        let mut chosen: Vec<usize> = (0..self.voices.len()).collect();
        chosen.sort_by_key(|i| (self.totals[*i], *i));
        chosen.truncate(needed);
        chosen.sort_unstable();
        for (voice, sub) in chosen.into_iter().zip(group.subgroups.iter().rev()) {
            self.append(voice, sub);
        }
    }

    fn pad_all(&mut self) {
        let longest = self.totals.iter().copied().max().unwrap_or_else(zero);
        for voice in 0..self.voices.len() {
            if self.totals[voice] < longest {
                self.pad(voice, longest);
            }
        }
    }
}

fn note_of(symbol: &Symbol) -> Option<Note> {
    let (note, grace) = match symbol.token {
        Token::Note(note) => (note, false),
        Token::GraceNote(note) => (note, true),
        _ => return None,
    };
    let pitch = symbol.pitch.unwrap_or_else(|| {
        Pitch::new(note.height.step, note.height.accidental.map(|a| a.alter()).unwrap_or(0), note.height.octave)
    });
    Some(Note { pitch, length: note.length, grace, fermata: note.fermata })
}

fn symbol_event(symbol: &Symbol) -> Event {
    if let Some(note) = note_of(symbol) {
        return Event::Note(note);
    }
    match symbol.token {
        Token::Clef(clef) => Event::Clef(clef),
        Token::KeySignature(key) => Event::Key(key),
        Token::TimeSignature(time) => Event::Time(time),
        Token::Rest { length, fermata } => Event::Rest(Rest { length, fermata, padding: false }),
        Token::MultiRest(count) => Event::MultiRest(count),
        _ => Event::Tie,
    }
}

/// A SYMBOL group becomes one event, a CHORD one chord
fn group_event(group: &Group) -> Option<Event> {
    match group.kind {
        GroupKind::Chord => Some(Event::Chord(Chord {
            notes: group.symbols.iter().filter_map(note_of).collect(),
        })),
        _ => group.symbols.first().map(symbol_event),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::decode::pitch::resolve_measure;

    fn groups(text: &str) -> Vec<Group> {
        let mut groups: Vec<Group> = text
            .split(" + ")
            .map(|g| Group::from_labels(g.split_whitespace()))
            .collect();
        resolve_measure(&mut groups, KeySignature::default());
        groups
    }

    #[test]
    fn test_monophonic_measure() {
        let measure = split_voices(
            1,
            KeySignature::default(),
            &groups("clef-G2 + keySignature-0 + timeSignature-4/4 + note-C4_quarter + note-D4_quarter"),
        );
        assert_eq!(measure.leading.len(), 3);
        assert_eq!(measure.voices.len(), 1);
        assert_eq!(measure.voices[0].events.len(), 2);
        assert_eq!(measure.voices[0].duration(), Rational::from_integer(2));
    }

    #[test]
    fn test_two_voices_recovered() {
        let measure = split_voices(
            1,
            KeySignature::default(),
            &groups("note-C5_quarter rest-half + note-D5_quarter"),
        );
        assert_eq!(measure.voices.len(), 2);
        // Upper voice first
        assert_eq!(
            measure.voices[0].written_durations(),
            vec![Rational::from_integer(2)]
        );
        assert_eq!(
            measure.voices[1].written_durations(),
            vec![Rational::from_integer(1), Rational::from_integer(1)]
        );
        assert!(measure.voices.iter().all(|v| v.duration() == Rational::from_integer(2)));
    }

    #[test]
    fn test_padding_before_tuple() {
        // Voice totals are 2 and 1 when the second tuple arrives; the shorter one is padded
        let measure = split_voices(
            1,
            KeySignature::default(),
            &groups("note-C5_half note-E4_quarter + note-F4_quarter note-D5_half"),
        );
        assert_eq!(measure.voices.len(), 2);
        assert!(measure.voices.iter().all(|v| v.duration() == Rational::from_integer(4)));
        assert!(measure.voices.iter().any(|v| v.events.iter().any(|e| e.is_padding())));
    }

    #[test]
    fn test_tie_stays_with_its_note() {
        let measure = split_voices(
            1,
            KeySignature::default(),
            &groups("note-C5_quarter rest-half + note-D5_quarter + tie + note-D5_quarter"),
        );
        assert_eq!(measure.voices.len(), 2);
        let lower = &measure.voices[1].events;
        assert!(matches!(lower[1], Event::Note(_)));
        assert_eq!(lower[2], Event::Tie);
    }

    #[test]
    fn test_chord_event() {
        let measure = split_voices(1, KeySignature::default(), &groups("note-C4_half note-E4_half"));
        assert_eq!(measure.voices.len(), 1);
        let Event::Chord(chord) = &measure.voices[0].events[0] else {
            panic!("expected a chord");
        };
        assert_eq!(chord.notes.len(), 2);
    }

    #[test]
    fn test_unfillable_padding_keeps_totals_in_step() {
        let mut splitter = Splitter::new(2);
        for group in groups("note-C5_hundred_twenty_eighth.. rest-half + note-D5_quarter") {
            splitter.add(&group);
        }
        splitter.pad_all();
        for (voice, total) in splitter.voices.iter().zip(&splitter.totals) {
            assert_eq!(voice.duration(), *total);
        }
        // A hundred-twenty-eighth is the shortest rest, so 1/128 stays open
        assert_eq!(splitter.totals[1], Rational::new(255, 128));
    }

    #[test]
    fn test_tuple_placed_after_unfillable_gap() {
        let measure = split_voices(
            1,
            KeySignature::default(),
            &groups("note-C5_hundred_twenty_eighth.. rest-half + note-D5_quarter note-E4_half"),
        );
        assert_eq!(measure.voices.len(), 2);
        assert_eq!(measure.notes().len(), 3);
    }

    #[test]
    fn test_grace_note_has_no_duration() {
        let measure = split_voices(1, KeySignature::default(), &groups("gracenote-D5_eighth + note-C5_half"));
        assert_eq!(measure.voices[0].duration(), Rational::from_integer(2));
        let Event::Note(grace) = &measure.voices[0].events[0] else {
            panic!("expected a note");
        };
        assert!(grace.grace);
    }
}
