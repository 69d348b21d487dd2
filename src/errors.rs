//! Error types for the codec
//!
//! Nothing here aborts a batch: document errors skip one input, interleave errors drop
//! one measure. Unknown labels never surface as errors at all (see `decode::symbol`).

use thiserror::Error;

/// Top-level error type
#[derive(Debug, Clone, Error)]
pub enum CodecError {
    /// The source document could not be read
    #[error("MusicXML parsing failed: {0}")]
    Parse(#[from] ParseError),

    /// Reading or writing a label file failed
    #[error("I/O error: {0}")]
    Io(String),

    /// The vocabulary dictionary is malformed
    #[error("Invalid translator dictionary: {0}")]
    Translator(String),

    /// Internal error (should be rare, indicates a bug)
    #[error("Internal codec error: {0}")]
    InternalError(String),
}

impl From<std::io::Error> for CodecError {
    fn from(e: std::io::Error) -> Self {
        CodecError::Io(e.to_string())
    }
}

/// Fatal document-reader errors
#[derive(Debug, Clone, Error)]
pub enum ParseError {
    /// XML is malformed (not well-formed)
    #[error("Invalid XML: {0}")]
    InvalidXml(String),

    /// MusicXML flavour not supported (e.g. timewise instead of partwise)
    #[error("Unsupported MusicXML format: {0}")]
    UnsupportedFormat(String),

    /// Required structural element is missing
    #[error("Missing required element: {0}")]
    MissingRequiredElement(String),
}

/// Voice merge failures; the affected measure is dropped
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum InterleaveError {
    /// A voice timeline runs backwards, so voices can never line up
    #[error("voice {voice} diverges: {reason}")]
    Diverged { voice: u32, reason: String },

    /// The merge took more steps than there are events (an upper bound, not expected to trip)
    #[error("voice merge did not finish within {limit} steps")]
    StepLimit { limit: usize },
}

pub type Result<T> = std::result::Result<T, CodecError>;
