//! MusicXML ⇄ semantic sequence codec
//!
//! Converts MusicXML scores into the flat, line-per-system "semantic" label format used
//! to train optical music recognition models, and decodes such label sequences back into
//! a measure / voice notation tree.

pub mod api;
pub mod decode;
pub mod encode;
pub mod errors;
pub mod labels;
pub mod models;

// Re-export commonly used types
pub use decode::{assemble_part, decode_sequence};
pub use encode::{encode_musicxml, EncodeSettings, EncodedSystem, ParsingMode, ScoreEncoding};
pub use errors::{CodecError, ParseError, Result};
pub use labels::{LabelLine, LabelStore, Translator};
pub use models::*;

use wasm_bindgen::prelude::*;

// This is like the `main` function, but for WASM modules.
#[wasm_bindgen(start)]
pub fn main() {
    #[cfg(feature = "console_error_panic_hook")]
    console_error_panic_hook::set_once();

    #[cfg(feature = "console_log")]
    {
        if console_log::init_with_level(log::Level::Debug).is_err() {
            return;
        }
    }

    log::info!("semantic codec WASM module initialized");
}
