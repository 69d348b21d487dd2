//! WASM API
//!
//! JavaScript-facing entry points. Each export is a thin wrapper over a plain Rust
//! function returning JSON text, so the same paths run in native tests.

use crate::decode::{assemble_part, decode_sequence};
use crate::encode::{encode_musicxml, EncodeSettings};
use crate::errors::{CodecError, Result};
use crate::labels::{clean_musicxml, file_stem};
use wasm_bindgen::prelude::*;

fn to_json<T: serde::Serialize>(value: &T) -> Result<String> {
    serde_json::to_string(value).map_err(|e| CodecError::InternalError(e.to_string()))
}

fn js_error(context: &str, e: CodecError) -> JsValue {
    log::error!("{}: {}", context, e);
    JsValue::from_str(&format!("{}: {}", context, e))
}

// ============================================================================
// Encoding
// ============================================================================

/// Encode a MusicXML document; returns the `ScoreEncoding` as JSON
pub fn encode_to_json(xml: &str, file_name: &str, settings_json: Option<&str>) -> Result<String> {
    let settings: EncodeSettings = match settings_json {
        Some(json) if !json.trim().is_empty() => serde_json::from_str(json)
            .map_err(|e| CodecError::InternalError(format!("invalid settings: {}", e)))?,
        _ => EncodeSettings::default(),
    };
    let encoding = encode_musicxml(xml, file_stem(file_name), &settings)?;
    log::info!("{}: {} systems", file_name, encoding.systems.len());
    to_json(&encoding)
}

#[wasm_bindgen(js_name = encodeMusicXML)]
pub fn encode_musicxml_js(xml: &str, file_name: &str, settings_json: Option<String>) -> std::result::Result<String, JsValue> {
    encode_to_json(xml, file_name, settings_json.as_deref()).map_err(|e| js_error("encodeMusicXML", e))
}

// ============================================================================
// Decoding
// ============================================================================

/// Decode one sequence; returns the `Part` as JSON
pub fn decode_to_json(sequence: &str) -> Result<String> {
    to_json(&decode_sequence(sequence))
}

/// Decode consecutive sequences of one score into a single part
pub fn decode_systems_to_json(sequences: &[String]) -> Result<String> {
    to_json(&assemble_part(sequences.iter().map(String::as_str)))
}

#[wasm_bindgen(js_name = decodeSemantic)]
pub fn decode_semantic_js(sequence: &str) -> std::result::Result<String, JsValue> {
    decode_to_json(sequence).map_err(|e| js_error("decodeSemantic", e))
}

/// `sequences_json` is a JSON array of sequence strings
#[wasm_bindgen(js_name = decodeSemanticSystems)]
pub fn decode_semantic_systems_js(sequences_json: &str) -> std::result::Result<String, JsValue> {
    let sequences: Vec<String> = serde_json::from_str(sequences_json)
        .map_err(|e| js_error("decodeSemanticSystems", CodecError::InternalError(e.to_string())))?;
    decode_systems_to_json(&sequences).map_err(|e| js_error("decodeSemanticSystems", e))
}

// ============================================================================
// Cleanup
// ============================================================================

#[wasm_bindgen(js_name = cleanMusicXML)]
pub fn clean_musicxml_js(xml: &str) -> std::result::Result<String, JsValue> {
    clean_musicxml(xml).map_err(|e| js_error("cleanMusicXML", e))
}

#[cfg(test)]
mod tests {
    use super::*;

    const SCORE: &str = r#"<score-partwise version="3.1">
  <part-list><score-part id="P1"><part-name>Voice</part-name></score-part></part-list>
  <part id="P1">
    <measure number="1">
      <attributes><divisions>1</divisions><clef><sign>G</sign><line>2</line></clef></attributes>
      <note><pitch><step>E</step><octave>5</octave></pitch><duration>4</duration><type>whole</type></note>
    </measure>
  </part>
</score-partwise>"#;

    #[test]
    fn test_encode_to_json() {
        let json = encode_to_json(SCORE, "scores/0007.musicxml", Some(r#"{"id_extension": ".png"}"#)).unwrap();
        let value: serde_json::Value = serde_json::from_str(&json).unwrap();
        assert_eq!(value["systems"][0]["id"], "0007_s00.png");
        assert_eq!(value["systems"][0]["sequence"], "clef-G2 + note-E5_whole + barline ");
    }

    #[test]
    fn test_encode_rejects_bad_settings() {
        assert!(encode_to_json(SCORE, "x", Some("{not json")).is_err());
    }

    #[test]
    fn test_decode_to_json() {
        let json = decode_to_json("note-C4_half + note-D4_half + barline ").unwrap();
        let value: serde_json::Value = serde_json::from_str(&json).unwrap();
        assert_eq!(value["measures"].as_array().unwrap().len(), 1);
    }

    #[test]
    fn test_decode_systems_to_json() {
        let systems = vec![
            "clef-G2 + note-C4_whole + barline ".to_string(),
            "clef-G2 + note-D4_whole + barline ".to_string(),
        ];
        let json = decode_systems_to_json(&systems).unwrap();
        let value: serde_json::Value = serde_json::from_str(&json).unwrap();
        assert_eq!(value["measures"].as_array().unwrap().len(), 2);
    }
}
