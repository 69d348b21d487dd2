//! Batch drivers
//!
//! Encode a corpus of MusicXML files into a label store, or decode a label file back
//! into notation. A bad input never stops the batch; it is logged and counted.

use super::{file_stem, LabelLine, LabelStore};
use crate::decode::decode_sequence;
use crate::encode::{encode_musicxml, EncodeSettings};
use crate::errors::Result;
use crate::models::Part;
use serde::Serialize;
use std::fs;
use std::path::Path;

const MUSICXML_EXTENSION: &str = "musicxml";

/// Counters for one batch run
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct BatchReport {
    pub files_read: usize,
    pub files_failed: usize,
    pub sequences_written: usize,
    pub polyphonic_sequences: usize,
    pub measures_dropped: usize,
    pub lines_skipped: usize,
}

/// One decoded label line
#[derive(Debug, Clone, PartialEq)]
pub struct DecodedLine {
    pub id: String,
    pub part: Part,
}

/// Encode `(file name, document text)` pairs into `store`
pub fn encode_batch<'a>(
    files: impl IntoIterator<Item = (&'a str, &'a str)>,
    settings: &EncodeSettings,
    store: &mut LabelStore,
) -> BatchReport {
    let mut report = BatchReport::default();

    for (name, xml) in files {
        let stem = file_stem(name);
        match encode_musicxml(xml, stem, settings) {
            Ok(encoding) => {
                report.files_read += 1;
                report.measures_dropped += encoding.dropped_measures;
                for system in encoding.systems {
                    if system.polyphonic {
                        report.polyphonic_sequences += 1;
                    }
                    if store.insert(&LabelLine::from(system)) {
                        report.sequences_written += 1;
                    }
                }
            }
            Err(e) => {
                log::error!("{}: {}", name, e);
                report.files_failed += 1;
            }
        }
    }

    log::info!(
        "encoded {} files ({} failed), {} new sequences",
        report.files_read,
        report.files_failed,
        report.sequences_written
    );
    report
}

/// Encode every `.musicxml` file in `dir` into `store`
///
/// Files are visited in name order so that repeated runs log identically.
pub fn encode_directory(dir: &Path, settings: &EncodeSettings, store: &mut LabelStore) -> Result<BatchReport> {
    let mut paths: Vec<_> = fs::read_dir(dir)?
        .filter_map(|entry| entry.ok().map(|e| e.path()))
        .filter(|p| p.extension().and_then(|e| e.to_str()) == Some(MUSICXML_EXTENSION))
        .collect();
    paths.sort();

    let mut documents = Vec::with_capacity(paths.len());
    let mut unreadable = 0;
    for path in &paths {
        match fs::read_to_string(path) {
            Ok(text) => documents.push((path.to_string_lossy().into_owned(), text)),
            Err(e) => {
                log::error!("{}: {}", path.display(), e);
                unreadable += 1;
            }
        }
    }

    let mut report = encode_batch(
        documents.iter().map(|(name, text)| (name.as_str(), text.as_str())),
        settings,
        store,
    );
    report.files_failed += unreadable;
    Ok(report)
}

/// Decode every label line of `text`; lines not in label format are skipped
pub fn decode_labels(text: &str) -> (Vec<DecodedLine>, BatchReport) {
    let mut report = BatchReport::default();
    let mut decoded = Vec::new();

    for line in text.lines().filter(|l| !l.trim().is_empty()) {
        match LabelLine::parse(line) {
            Some(label) => decoded.push(DecodedLine {
                part: decode_sequence(&label.sequence),
                id: label.id,
            }),
            None => {
                log::debug!("skipping line: {}", line);
                report.lines_skipped += 1;
            }
        }
    }
    (decoded, report)
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    fn score(notes: &str) -> String {
        format!(
            r#"<score-partwise version="3.1">
  <part-list><score-part id="P1"><part-name>Voice</part-name></score-part></part-list>
  <part id="P1">
    <measure number="1">
      <attributes>
        <divisions>1</divisions>
        <key><fifths>0</fifths></key>
        <time><beats>4</beats><beat-type>4</beat-type></time>
        <clef><sign>G</sign><line>2</line></clef>
      </attributes>
      {}
    </measure>
  </part>
</score-partwise>"#,
            notes
        )
    }

    const WHOLE_C: &str =
        "<note><pitch><step>C</step><octave>4</octave></pitch><duration>4</duration><type>whole</type></note>";

    #[test]
    fn test_encode_batch_counts_failures() {
        let good = score(WHOLE_C);
        let mut store = LabelStore::new();
        let report = encode_batch(
            [("dir/0001.musicxml", good.as_str()), ("dir/0002.musicxml", "<not xml")],
            &EncodeSettings::default(),
            &mut store,
        );
        assert_eq!(report.files_read, 1);
        assert_eq!(report.files_failed, 1);
        assert_eq!(report.sequences_written, 1);
        assert_eq!(
            store.to_text(),
            "0001_s00 \"clef-G2 + keySignature-0 + timeSignature-4/4 + note-C4_whole + barline \"\n"
        );
    }

    #[test]
    fn test_encode_directory() {
        let dir = TempDir::new().unwrap();
        fs::write(dir.path().join("b.musicxml"), score(WHOLE_C)).unwrap();
        fs::write(dir.path().join("a.musicxml"), score(WHOLE_C)).unwrap();
        fs::write(dir.path().join("notes.txt"), "ignored").unwrap();

        let mut store = LabelStore::new();
        let report = encode_directory(dir.path(), &EncodeSettings::default(), &mut store).unwrap();
        assert_eq!(report.files_read, 2);
        let ids: Vec<String> = store.entries().map(|l| l.id).collect();
        assert_eq!(ids, vec!["a_s00", "b_s00"]);
    }

    #[test]
    fn test_decode_labels_skips_malformed_lines() {
        let text = "a_s00 \"note-C4_whole + barline \"\ngarbage line\n\nb_s00 3 \"rest-whole + barline \"\n";
        let (decoded, report) = decode_labels(text);
        assert_eq!(report.lines_skipped, 1);
        assert_eq!(decoded.len(), 2);
        assert_eq!(decoded[0].id, "a_s00");
        assert_eq!(decoded[1].part.measures.len(), 1);
    }
}
