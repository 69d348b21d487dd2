//! MusicXML → flat sequence encoder
//!
//! Pipeline: document reader (`xml`) → Measure Reader (`reader`) → Voice Interleaver
//! (`interleave`) → System Segmenter (`segmenter`). Only the first staff of the first
//! part is encoded; each printed system becomes one sequence.

pub mod context;
pub mod interleave;
pub mod reader;
pub mod segmenter;
pub mod xml;

pub use context::{EncodeContext, Header};
pub use interleave::{encode_measure, EncodedMeasure};
pub use reader::{read_measure, MeasureReading, ReadOutcome};
pub use segmenter::{ParsingMode, System, SystemSegmenter};

use crate::errors::Result;
use serde::{Deserialize, Serialize};

/// Encoder configuration
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct EncodeSettings {
    pub mode: ParsingMode,
    /// Appended to every identifier (e.g. `.png` to match rendered images)
    pub id_extension: Option<String>,
}

/// One encoded system, ready to be written as a label line
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EncodedSystem {
    pub id: String,
    pub sequence: String,
    pub polyphonic: bool,
}

/// Result of encoding one score
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ScoreEncoding {
    pub systems: Vec<EncodedSystem>,
    /// Measures whose voices could not be merged
    pub dropped_measures: usize,
}

/// Identifier of the `index`-th system of a file
///
/// MuseScore 3 exports count systems from 1, everything else from 0.
pub fn system_id(file_stem: &str, index: usize, musescore_version: Option<u32>, extension: Option<&str>) -> String {
    let number = if musescore_version == Some(3) { index + 1 } else { index };
    format!("{}_s{:02}{}", file_stem, number, extension.unwrap_or(""))
}

/// Encode a MusicXML document into one sequence per printed system
pub fn encode_musicxml(xml_text: &str, file_stem: &str, settings: &EncodeSettings) -> Result<ScoreEncoding> {
    let source = xml::strip_doctype(xml_text);
    let doc = xml::parse_document(&source)?;
    let score = xml::score_partwise(&doc)?;
    let part = xml::first_part(score)?;
    let version = xml::musescore_version(score);

    if settings.mode == ParsingMode::Legacy {
        log::warn!("{}: legacy parsing mode is no longer supported, ignoring file", file_stem);
        return Ok(ScoreEncoding::default());
    }

    let mut encoding = ScoreEncoding::default();
    let mut segmenter = SystemSegmenter::new();
    let mut context = EncodeContext::default();
    let mut skip_remaining = 0u32;
    let mut new_score = true;

    let measures = xml::measures(part);
    if measures.is_empty() {
        log::warn!("{}: first part has no measures", file_stem);
    }

    for measure in measures {
        let new_system = segmenter::is_new_system(measure);
        if new_system {
            segmenter.break_system();
        }
        if skip_remaining > 0 {
            // Covered by a preceding multirest
            skip_remaining -= 1;
            segmenter.push_empty();
            continue;
        }

        let header = Header::for_measure(&context, new_system, new_score);
        new_score = false;
        let (outcome, next) = read_measure(measure, &context);
        context = next;

        let reading = match outcome {
            ReadOutcome::Read(reading) => reading,
            ReadOutcome::Unsupported => {
                segmenter.push_empty();
                continue;
            }
        };
        skip_remaining = reading.skip.saturating_sub(1);

        match encode_measure(&reading, &header) {
            Ok(encoded) => segmenter.push(encoded),
            Err(e) => {
                log::warn!("{}: dropping measure {}: {}", file_stem, reading.number, e);
                encoding.dropped_measures += 1;
                segmenter.push_empty();
            }
        }
    }

    for (index, system) in segmenter.finish().into_iter().enumerate() {
        if system.is_empty() {
            continue;
        }
        let id = system_id(file_stem, index, version, settings.id_extension.as_deref());
        if system.polyphonic {
            log::debug!("polyphonic page: {}-{}", file_stem, index);
        }
        encoding.systems.push(EncodedSystem {
            id,
            sequence: system.text(),
            polyphonic: system.polyphonic,
        });
    }

    log::debug!("{}: separated into {} systems", file_stem, encoding.systems.len());
    Ok(encoding)
}
