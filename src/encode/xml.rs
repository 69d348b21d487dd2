//! XML access layer for MusicXML documents
//!
//! Thin helpers over roxmltree: DOCTYPE stripping, locating the first part, and
//! child/text lookups used by the measure reader.

use crate::errors::ParseError;
use roxmltree::{Document, Node};
use std::borrow::Cow;

// ============================================================================
// DOCUMENT
// ============================================================================

/// Remove a `<!DOCTYPE ...>` declaration (roxmltree rejects DTDs)
pub fn strip_doctype(xml: &str) -> Cow<'_, str> {
    let Some(start) = xml.find("<!DOCTYPE") else {
        return Cow::Borrowed(xml);
    };
    let rest = &xml[start..];
    let end = match (rest.find('['), rest.find('>')) {
        // Internal subset: declaration ends at "]>"
        (Some(bracket), Some(close)) if bracket < close => rest.find("]>").map(|i| i + 2),
        (_, Some(close)) => Some(close + 1),
        _ => None,
    };
    match end {
        Some(end) => Cow::Owned(format!("{}{}", &xml[..start], &rest[end..])),
        None => Cow::Borrowed(xml),
    }
}

/// Parse XML text that has already had its DOCTYPE stripped
pub fn parse_document(xml: &str) -> Result<Document<'_>, ParseError> {
    Document::parse(xml).map_err(|e| ParseError::InvalidXml(format!("XML parse error: {}", e)))
}

/// Get the root `<score-partwise>` element
pub fn score_partwise<'a, 'input>(doc: &'a Document<'input>) -> Result<Node<'a, 'input>, ParseError> {
    let root = doc.root_element();
    match root.tag_name().name() {
        "score-partwise" => Ok(root),
        "score-timewise" => Err(ParseError::UnsupportedFormat(
            "score-timewise format (use score-partwise instead)".to_string(),
        )),
        other => Err(ParseError::UnsupportedFormat(format!(
            "Expected score-partwise, found {}",
            other
        ))),
    }
}

/// First `<part>` of the score; only this part is ever encoded
pub fn first_part<'a, 'input>(score: Node<'a, 'input>) -> Result<Node<'a, 'input>, ParseError> {
    if get_child(score, "part-list").is_none() {
        return Err(ParseError::MissingRequiredElement("part-list".to_string()));
    }
    get_child(score, "part")
        .ok_or_else(|| ParseError::MissingRequiredElement("part".to_string()))
}

/// Measures of a part in document order
pub fn measures<'a, 'input>(part: Node<'a, 'input>) -> Vec<Node<'a, 'input>> {
    children_named(part, "measure").collect()
}

/// Major version of MuseScore that wrote the file, from `<software>MuseScore 4.1.2</software>`
pub fn musescore_version(score: Node) -> Option<u32> {
    let software = score
        .descendants()
        .find(|n| n.is_element() && n.tag_name().name() == "software")?;
    let text = software.text()?;
    let version = text.split_whitespace().last()?;
    version.chars().next()?.to_digit(10)
}

// ============================================================================
// HELPER FUNCTIONS
// ============================================================================

/// Get first child element with given tag name
pub fn get_child<'a, 'input>(node: Node<'a, 'input>, tag: &str) -> Option<Node<'a, 'input>> {
    node.children()
        .find(|n| n.is_element() && n.tag_name().name() == tag)
}

/// All child elements with the given tag name
pub fn children_named<'a, 'input: 'a>(
    node: Node<'a, 'input>,
    tag: &'a str,
) -> impl Iterator<Item = Node<'a, 'input>> + 'a {
    node.children()
        .filter(move |n| n.is_element() && n.tag_name().name() == tag)
}

/// Trimmed text content of first child with given tag
pub fn get_child_text<'a>(node: Node<'a, '_>, tag: &str) -> Option<&'a str> {
    get_child(node, tag).and_then(|n| n.text()).map(str::trim)
}

pub fn has_child(node: Node, tag: &str) -> bool {
    get_child(node, tag).is_some()
}

/// Parse the integer text of a child element
pub fn get_child_int(node: Node, tag: &str) -> Option<i32> {
    get_child_text(node, tag).and_then(|t| t.parse().ok())
}
