//! MusicXML cleanup
//!
//! Strips printed text that would otherwise show up in rendered training images without
//! appearing in the labels: credits, rights, lyrics and directions are removed, part and
//! instrument names are blanked. Everything else is streamed through unchanged.

use crate::errors::{ParseError, Result};
use quick_xml::events::Event;
use quick_xml::{Reader, Writer};
use std::io::Cursor;

const REMOVED: &[&[u8]] = &[b"credit", b"rights", b"lyric", b"direction"];
const BLANKED: &[&[u8]] = &[b"part-name", b"instrument-name", b"part-abbreviation"];

fn xml_error(e: impl std::fmt::Display) -> ParseError {
    ParseError::InvalidXml(e.to_string())
}

/// Return the cleaned document text
pub fn clean_musicxml(xml: &str) -> Result<String> {
    let mut reader = Reader::from_str(xml);
    let mut writer = Writer::new(Cursor::new(Vec::new()));

    // Depth inside a removed element
    let mut removing = 0usize;
    // Depth inside a blanked element; its own text sits at depth 1
    let mut blanking = 0usize;

    loop {
        let event = reader.read_event().map_err(xml_error)?;

        if removing > 0 {
            match event {
                Event::Start(_) => removing += 1,
                Event::End(_) => removing -= 1,
                Event::Eof => return Err(xml_error("unexpected end of document").into()),
                _ => {}
            }
            continue;
        }

        match &event {
            Event::Eof => break,
            Event::Start(e) if REMOVED.contains(&e.name().as_ref()) => {
                removing = 1;
                continue;
            }
            Event::Empty(e) if REMOVED.contains(&e.name().as_ref()) => continue,
            Event::Start(e) if blanking > 0 || BLANKED.contains(&e.name().as_ref()) => {
                blanking += 1;
            }
            Event::End(_) if blanking > 0 => blanking -= 1,
            Event::Text(_) | Event::CData(_) if blanking == 1 => continue,
            _ => {}
        }
        writer.write_event(event).map_err(xml_error)?;
    }

    String::from_utf8(writer.into_inner().into_inner())
        .map_err(|e| xml_error(e).into())
}
