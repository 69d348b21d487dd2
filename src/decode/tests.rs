use super::*;
use crate::models::{Clef, ClefSign, Event, Rational, TimeSignature};

const SCENARIO: &str =
    "clef-G2 + keySignature-0 + timeSignature-4/4 + note-C4_quarter + note-D4_quarter + barline ";

#[test]
fn test_scenario_single_measure() {
    let part = decode_sequence(SCENARIO);
    assert_eq!(part.measures.len(), 1);

    let measure = &part.measures[0];
    assert_eq!(measure.start_clef(), Some(Clef::treble()));
    assert_eq!(measure.time_signature(), Some(TimeSignature::default()));
    assert_eq!(measure.key, KeySignature::new(0));
    assert_eq!(measure.voices.len(), 1);

    let notes: Vec<String> = measure.notes().iter().map(|n| n.pitch.to_string()).collect();
    assert_eq!(notes, vec!["C4", "D4"]);
    assert!(measure.notes().iter().all(|n| n.length.quarter_length() == Rational::from_integer(1)));
    assert!(measure.notes().iter().all(|n| n.pitch.alter == 0));
}

#[test]
fn test_parse_measures_boundaries() {
    let measures = parse_measures("\"note-C4_whole + barline + note-D4_half + note-E4_half + barline \"");
    assert_eq!(measures.len(), 2);
    assert_eq!(measures[0].len(), 1);
    assert_eq!(measures[1].len(), 2);

    // Trailing content without a barline is still a measure
    let measures = parse_measures("note-C4_whole + barline + note-D4_whole");
    assert_eq!(measures.len(), 2);

    assert!(parse_measures("").is_empty());
    assert!(parse_measures("  +  ").is_empty());
}

#[test]
fn test_key_propagates_between_measures() {
    let part = decode_sequence("keySignature-2 + note-F5_quarter + barline + note-F5_quarter + note-C5_quarter + barline ");
    let second: Vec<String> = part.measures[1].notes().iter().map(|n| n.pitch.to_string()).collect();
    assert_eq!(second, vec!["F#5", "C#5"]);
    assert_eq!(part.measures[1].key, KeySignature::new(2));
}

#[test]
fn test_accidental_does_not_leak_into_next_measure() {
    let part = decode_sequence("keySignature-2 + note-Fb5_quarter + note-F5_quarter + barline + note-F5_quarter + barline ");
    let pitches: Vec<String> = part
        .measures
        .iter()
        .flat_map(|m| m.notes())
        .map(|n| n.pitch.to_string())
        .collect();
    assert_eq!(pitches, vec!["Fb5", "Fb5", "F#5"]);
}

#[test]
fn test_two_voice_measure() {
    let part = decode_sequence("note-C5_quarter rest-half + note-D5_quarter + barline ");
    let measure = &part.measures[0];
    assert_eq!(measure.voices.len(), 2);
    assert!(measure.voices.iter().all(|v| v.duration() == Rational::from_integer(2)));
}

#[test]
fn test_unknown_tokens_do_not_abort() {
    let part = decode_sequence("clef-G2 + dynamic-ff + note-E4_quarter + barline ");
    let notes: Vec<String> = part.measures[0].notes().iter().map(|n| n.pitch.to_string()).collect();
    assert_eq!(notes, vec!["C4", "E4"]);
}

#[test]
fn test_multirest_and_tie_events() {
    let part = decode_sequence("multirest-4 + barline + note-C4_half + tie + note-C4_half + barline ");
    assert_eq!(part.measures.len(), 2);
    assert_eq!(part.measures[0].voices[0].events, vec![Event::MultiRest(4)]);
    assert!(part.measures[1].voices[0].events.contains(&Event::Tie));
}

#[test]
fn test_assemble_part_drops_repeated_clef() {
    let lines = [
        "clef-G2 + keySignature-1 + timeSignature-3/4 + note-F4_half. + barline ",
        "clef-G2 + keySignature-1 + note-F4_half. + barline ",
        "clef-F4 + keySignature-1 + note-F3_half. + barline ",
    ];
    let part = assemble_part(lines);
    assert_eq!(part.measures.len(), 3);
    assert_eq!(part.measures[1].number, 2);
    assert_eq!(part.measures[0].start_clef(), Some(Clef::treble()));
    assert_eq!(part.measures[1].start_clef(), None);
    assert_eq!(part.measures[2].start_clef(), Some(Clef::new(ClefSign::F, 4)));
    assert_eq!(part.last_clef(), Some(Clef::new(ClefSign::F, 4)));

    let f = part.measures[1].notes()[0].pitch;
    assert_eq!(f.to_string(), "F#4");
}
