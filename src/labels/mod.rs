//! Label files
//!
//! One label line per printed system: `<identifier> "<sequence>"`. The reverse direction
//! also accepts the numbered form written by training tools, `<identifier> <n> "<sequence>"`.

pub mod batch;
pub mod cleanup;
pub mod store;
pub mod translator;

pub use batch::{decode_labels, encode_batch, encode_directory, BatchReport, DecodedLine};
pub use cleanup::clean_musicxml;
pub use store::LabelStore;
pub use translator::Translator;

use crate::encode::EncodedSystem;
use lazy_static::lazy_static;
use regex::Regex;
use serde::{Deserialize, Serialize};
use std::fmt;

lazy_static! {
    static ref LINE_PATTERN: Regex =
        Regex::new(r#"^(\S+)\s+(?:[0-9]+\s+)?"(.*)"\s*$"#).expect("label line pattern is valid");
}

/// One line of a label file
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize)]
pub struct LabelLine {
    pub id: String,
    pub sequence: String,
}

impl LabelLine {
    pub fn new(id: impl Into<String>, sequence: impl Into<String>) -> Self {
        Self { id: id.into(), sequence: sequence.into() }
    }

    /// Parse a line; `None` if it does not match the label pattern
    pub fn parse(line: &str) -> Option<Self> {
        let captures = LINE_PATTERN.captures(line.trim_end_matches(['\r', '\n']))?;
        Some(Self::new(&captures[1], &captures[2]))
    }
}

impl fmt::Display for LabelLine {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} \"{}\"", self.id, self.sequence)
    }
}

impl From<EncodedSystem> for LabelLine {
    fn from(system: EncodedSystem) -> Self {
        Self::new(system.id, system.sequence)
    }
}

/// Identifier prefix for a source file: its base name up to the first dot
pub fn file_stem(path: &str) -> &str {
    let name = path.rsplit(['/', '\\']).next().unwrap_or(path);
    name.split('.').next().unwrap_or(name)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_format_and_parse() {
        let line = LabelLine::new("0001_s01.png", "clef-G2 + note-C4_quarter + barline ");
        let text = line.to_string();
        assert_eq!(text, "0001_s01.png \"clef-G2 + note-C4_quarter + barline \"");
        assert_eq!(LabelLine::parse(&text), Some(line));
    }

    #[test]
    fn test_parse_numbered_form() {
        let line = LabelLine::parse("stave-12_a.png 7 \"note-C4_whole + barline \"").unwrap();
        assert_eq!(line.id, "stave-12_a.png");
        assert_eq!(line.sequence, "note-C4_whole + barline ");
    }

    #[test]
    fn test_parse_rejects_malformed() {
        assert_eq!(LabelLine::parse("no quotes here"), None);
        assert_eq!(LabelLine::parse("\"missing id\""), None);
        assert_eq!(LabelLine::parse(""), None);
    }

    #[test]
    fn test_file_stem() {
        assert_eq!(file_stem("scores/0001.musicxml"), "0001");
        assert_eq!(file_stem("C:\\data\\piece.v2.musicxml"), "piece");
        assert_eq!(file_stem("plain"), "plain");
    }
}
