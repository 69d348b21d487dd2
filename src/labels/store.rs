//! Label store
//!
//! A label file is a set of lines kept in sorted order. Re-running the encoder over the
//! same corpus merges into the existing file instead of duplicating lines.

use super::LabelLine;
use crate::errors::Result;
use std::collections::BTreeSet;
use std::fs;
use std::path::Path;

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct LabelStore {
    lines: BTreeSet<String>,
}

impl LabelStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Load an existing label file; a missing file yields an empty store
    pub fn load(path: &Path) -> Result<Self> {
        if !path.exists() {
            return Ok(Self::new());
        }
        let text = fs::read_to_string(path)?;
        let mut store = Self::new();
        store.extend_text(&text);
        Ok(store)
    }

    /// Add every non-empty line of `text`
    pub fn extend_text(&mut self, text: &str) {
        for line in text.lines() {
            let line = line.trim_end_matches('\r');
            if !line.trim().is_empty() {
                self.lines.insert(line.to_string());
            }
        }
    }

    /// Returns false if the line was already present
    pub fn insert(&mut self, line: &LabelLine) -> bool {
        self.lines.insert(line.to_string())
    }

    pub fn merge(&mut self, other: LabelStore) {
        self.lines.extend(other.lines);
    }

    pub fn len(&self) -> usize {
        self.lines.len()
    }

    pub fn is_empty(&self) -> bool {
        self.lines.is_empty()
    }

    pub fn lines(&self) -> impl Iterator<Item = &str> {
        self.lines.iter().map(String::as_str)
    }

    /// Parsed lines; lines that do not match the label pattern are skipped
    pub fn entries(&self) -> impl Iterator<Item = LabelLine> + '_ {
        self.lines.iter().filter_map(|l| LabelLine::parse(l))
    }

    /// Sorted, newline-joined contents
    pub fn to_text(&self) -> String {
        let mut text = String::new();
        for line in &self.lines {
            text.push_str(line);
            text.push('\n');
        }
        text
    }

    pub fn save(&self, path: &Path) -> Result<()> {
        fs::write(path, self.to_text())?;
        log::info!("wrote {} label lines to {}", self.len(), path.display());
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn test_sorted_and_deduplicated() {
        let mut store = LabelStore::new();
        assert!(store.insert(&LabelLine::new("b_s01", "barline ")));
        assert!(store.insert(&LabelLine::new("a_s00", "note-C4_whole + barline ")));
        assert!(!store.insert(&LabelLine::new("b_s01", "barline ")));
        assert_eq!(store.len(), 2);
        assert_eq!(
            store.to_text(),
            "a_s00 \"note-C4_whole + barline \"\nb_s01 \"barline \"\n"
        );
    }

    #[test]
    fn test_load_missing_file_is_empty() {
        let dir = TempDir::new().unwrap();
        let store = LabelStore::load(&dir.path().join("absent.semantic")).unwrap();
        assert!(store.is_empty());
    }

    #[test]
    fn test_save_merge_and_reload() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("labels.semantic");

        let mut first = LabelStore::new();
        first.insert(&LabelLine::new("x_s00", "rest-whole + barline "));
        first.save(&path).unwrap();

        let mut store = LabelStore::load(&path).unwrap();
        let mut second = LabelStore::new();
        second.insert(&LabelLine::new("x_s00", "rest-whole + barline "));
        second.insert(&LabelLine::new("w_s00", "note-D4_whole + barline "));
        store.merge(second);
        store.save(&path).unwrap();

        let reloaded = LabelStore::load(&path).unwrap();
        let ids: Vec<String> = reloaded.entries().map(|l| l.id).collect();
        assert_eq!(ids, vec!["w_s00", "x_s00"]);
    }
}
