use musicxml_semantic::encode::EncodeSettings;
use musicxml_semantic::labels::{clean_musicxml, decode_labels, encode_directory, LabelStore, Translator};
use std::fs;
use tempfile::TempDir;

fn score(title: &str, step: &str) -> String {
    format!(
        r#"<score-partwise version="3.1">
  <credit page="1"><credit-words>{}</credit-words></credit>
  <part-list><score-part id="P1"><part-name>Oboe</part-name></score-part></part-list>
  <part id="P1">
    <measure number="1">
      <attributes>
        <divisions>1</divisions>
        <key><fifths>-1</fifths></key>
        <time><beats>2</beats><beat-type>4</beat-type></time>
        <clef><sign>G</sign><line>2</line></clef>
      </attributes>
      <direction><direction-type><words>espr.</words></direction-type></direction>
      <note><pitch><step>{}</step><octave>4</octave></pitch><duration>2</duration><type>half</type></note>
    </measure>
  </part>
</score-partwise>"#,
        title, step
    )
}

#[test]
fn test_corpus_to_label_file_and_back() {
    let corpus = TempDir::new().unwrap();
    for (name, step) in [("0002", "B"), ("0001", "A")] {
        let cleaned = clean_musicxml(&score("Sonata", step)).unwrap();
        assert!(!cleaned.contains("Sonata"));
        fs::write(corpus.path().join(format!("{}.musicxml", name)), cleaned).unwrap();
    }
    fs::write(corpus.path().join("broken.musicxml"), "<score-partwise>").unwrap();

    let settings: EncodeSettings = serde_json::from_str(r#"{"id_extension": ".png"}"#).unwrap();
    let label_path = corpus.path().join("labels.semantic");
    let mut store = LabelStore::load(&label_path).unwrap();
    let report = encode_directory(corpus.path(), &settings, &mut store).unwrap();
    assert_eq!(report.files_read, 2);
    assert_eq!(report.files_failed, 1);
    store.save(&label_path).unwrap();

    // A second run adds nothing new
    let mut again = LabelStore::load(&label_path).unwrap();
    let rerun = encode_directory(corpus.path(), &settings, &mut again).unwrap();
    assert_eq!(rerun.sequences_written, 0);
    assert_eq!(again.len(), 2);

    let text = fs::read_to_string(&label_path).unwrap();
    assert_eq!(
        text,
        "0001_s00.png \"clef-G2 + keySignature--1 + timeSignature-2/4 + note-A4_half + barline \"\n\
         0002_s00.png \"clef-G2 + keySignature--1 + timeSignature-2/4 + note-B4_half + barline \"\n"
    );

    let (decoded, decode_report) = decode_labels(&text);
    assert_eq!(decode_report.lines_skipped, 0);
    let pitches: Vec<String> = decoded
        .iter()
        .flat_map(|line| line.part.measures[0].notes().into_iter().map(|n| n.pitch.to_string()))
        .collect();
    assert_eq!(pitches, vec!["A4", "Bb4"]);
}

#[test]
fn test_translated_labels_expand_back() {
    let dict = r#"{
        "clef-G2": "G2",
        "keySignature--1": "K-1",
        "timeSignature-2/4": "T2/4",
        "note-A4_half": "A4h",
        "barline": "|"
    }"#;
    let mut translator = Translator::from_json(dict).unwrap();
    let sequence = "clef-G2 + keySignature--1 + timeSignature-2/4 + note-A4_half + barline ";
    let short = translator.shorten(sequence);
    assert_eq!(short, "G2 + K-1 + T2/4 + A4h + |");
    assert_eq!(translator.expand(&short), sequence.trim_end());
}
