//! Free-text body-metric entry classification.
//!
//! Input is a text buffer of blocks separated by blank lines:
//!
//! ```text
//! Peso (kg)
//! 72.4
//! en ayunas
//!
//! Grasa corporal
//! 21.3
//! ```
//!
//! The first line of a block is a type label, the second its value, anything
//! after that a comment. Labels are normalized and scored against the catalog;
//! blocks that resolve to nothing are handed back verbatim so they can be
//! fixed and resubmitted.

use crate::{Catalog, CatalogEntry, ClassifiedEntry};
use serde::Serialize;
use uuid::Uuid;

/// The generic weight term; must never resolve to a compound weight metric
pub const GENERIC_WEIGHT_LABEL: &str = "peso";

const LEADING_MARKERS: &[char] = &['-', '*', '•', '·', '>', '['];
const TRAILING_MARKERS: &[char] = &[']', '*', '•', '·', ':', '-'];

/// A blank-line separated block of the pending text
#[derive(Clone, Debug, PartialEq)]
pub struct ParsedBlock {
    /// Block lines exactly as entered
    pub raw_text: String,
    pub label: String,
    pub value: Option<String>,
    pub comment: String,
}

/// Result of one classification pass
#[derive(Clone, Debug, Default, Serialize)]
pub struct Classification {
    pub classified: Vec<ClassifiedEntry>,
    /// Raw text of each unmatched block, in input order
    pub unmatched: Vec<String>,
    /// Unmatched blocks re-joined; the new pending buffer
    pub pending_text: String,
}

/// Split text into blocks on blank lines
pub fn parse_blocks(text: &str) -> Vec<ParsedBlock> {
    let mut blocks = Vec::new();
    let mut current: Vec<&str> = Vec::new();

    for line in text.lines() {
        if line.trim().is_empty() {
            if !current.is_empty() {
                blocks.push(build_block(&current));
                current.clear();
            }
        } else {
            current.push(line.trim_end());
        }
    }
    if !current.is_empty() {
        blocks.push(build_block(&current));
    }

    blocks
}

fn build_block(lines: &[&str]) -> ParsedBlock {
    let trimmed: Vec<&str> = lines.iter().map(|l| l.trim()).collect();
    ParsedBlock {
        raw_text: lines.join("\n"),
        label: trimmed[0].to_string(),
        value: trimmed.get(1).map(|v| v.to_string()),
        comment: clean_comment(&trimmed.get(2..).unwrap_or_default().join(" ")),
    }
}

/// Drop stray one-character tokens left by OCR or dictation
pub fn clean_comment(comment: &str) -> String {
    comment
        .split_whitespace()
        .filter(|token| token.chars().count() >= 2)
        .collect::<Vec<_>>()
        .join(" ")
}

/// Reduce a label to the form used for catalog matching
///
/// `"- Peso (Kg):"` and `"peso"` both normalize to `"peso"`.
pub fn normalize_label(label: &str) -> String {
    let s = label.trim_start_matches(|c: char| LEADING_MARKERS.contains(&c) || c.is_whitespace());
    let s = trim_trailing_markers(s);

    let s = match (s.ends_with(')'), s.rfind('(')) {
        (true, Some(open)) => &s[..open],
        _ => s,
    };
    let s = match s.rfind('/') {
        Some(slash) => &s[..slash],
        None => s,
    };

    trim_trailing_markers(s).to_lowercase().trim().to_string()
}

fn trim_trailing_markers(s: &str) -> &str {
    s.trim_end_matches(|c: char| TRAILING_MARKERS.contains(&c) || c.is_whitespace())
}

/// Catalog with normalized names precomputed
pub struct Matcher<'a> {
    entries: Vec<(&'a CatalogEntry, String)>,
}

impl<'a> Matcher<'a> {
    pub fn new(catalog: &'a Catalog) -> Self {
        Self {
            entries: catalog
                .entries
                .iter()
                .map(|e| (e, normalize_label(&e.canonical_name)))
                .collect(),
        }
    }

    /// Resolve a raw label to a catalog entry
    pub fn resolve(&self, label: &str) -> Option<&'a CatalogEntry> {
        let label = normalize_label(label);
        if label.is_empty() {
            return None;
        }

        if let Some((entry, _)) = self.entries.iter().find(|(_, name)| *name == label) {
            return Some(*entry);
        }

        let mut best: Option<(&'a CatalogEntry, f64)> = None;
        for (entry, name) in &self.entries {
            let Some(score) = score(&label, name) else {
                continue;
            };
            tracing::debug!("Label {:?} vs {:?}: score {:.1}", label, name, score);
            if score <= 0.0 {
                continue;
            }
            if best.map_or(true, |(_, top)| score > top) {
                best = Some((*entry, score));
            }
        }

        best.map(|(entry, _)| entry)
    }
}

/// Score a normalized label against a normalized catalog name.
///
/// `None` when neither string contains the other.
pub fn score(label: &str, name: &str) -> Option<f64> {
    let name_in_label = label.contains(name);
    let label_in_name = name.contains(label);
    if !name_in_label && !label_in_name {
        return None;
    }

    let label_len = label.chars().count() as f64;
    let name_len = name.chars().count() as f64;
    let mut score = 0.0;

    if name_in_label {
        score += 1000.0 + (name_len / label_len) * 100.0;
    }
    if label_in_name {
        score += 500.0 - (label_len / name_len) * 50.0;
    }
    score += name_len * 10.0;
    score += common_prefix_len(label, name) as f64 * 20.0;

    if label == GENERIC_WEIGHT_LABEL && name != label && name.contains(GENERIC_WEIGHT_LABEL) {
        score -= 5000.0;
    }

    Some(score)
}

fn common_prefix_len(a: &str, b: &str) -> usize {
    a.chars().zip(b.chars()).take_while(|(x, y)| x == y).count()
}

/// Classify every block of `text` against `catalog`
pub fn classify(catalog: &Catalog, text: &str) -> Classification {
    let matcher = Matcher::new(catalog);
    let mut result = Classification::default();

    for block in parse_blocks(text) {
        let resolved = match &block.value {
            Some(value) => matcher.resolve(&block.label).map(|entry| (entry, value)),
            None => None,
        };

        match resolved {
            Some((entry, value)) => result.classified.push(ClassifiedEntry {
                id: Uuid::new_v4(),
                entry: entry.clone(),
                value: value.clone(),
                comment: block.comment,
            }),
            None => {
                tracing::info!("Unmatched block with label {:?}", block.label);
                result.unmatched.push(block.raw_text);
            }
        }
    }

    result.pending_text = result.unmatched.join("\n\n");
    tracing::debug!(
        "Classified {} blocks, {} unmatched",
        result.classified.len(),
        result.unmatched.len()
    );
    result
}

/// Render a classified entry back into an editable block
pub fn render_block(entry: &ClassifiedEntry) -> String {
    let mut block = format!("{}\n{}", entry.entry.canonical_name, entry.value);
    if !entry.comment.is_empty() {
        block.push('\n');
        block.push_str(&entry.comment);
    }
    block
}

/// Pending text plus the entries classified out of it so far
#[derive(Clone, Debug, Default)]
pub struct EntryBuffer {
    pub pending_text: String,
    pub entries: Vec<ClassifiedEntry>,
}

impl EntryBuffer {
    pub fn new(pending_text: impl Into<String>) -> Self {
        Self {
            pending_text: pending_text.into(),
            entries: Vec::new(),
        }
    }

    /// Classify the pending text, keeping only unmatched blocks pending
    pub fn submit(&mut self, catalog: &Catalog) -> Classification {
        let result = classify(catalog, &self.pending_text);
        self.entries.extend(result.classified.iter().cloned());
        self.pending_text = result.pending_text.clone();
        result
    }

    /// Move a classified entry back into the pending text for editing
    ///
    /// Returns false if no entry has that id.
    pub fn edit(&mut self, id: Uuid) -> bool {
        let Some(pos) = self.entries.iter().position(|e| e.id == id) else {
            return false;
        };
        let entry = self.entries.remove(pos);

        if !self.pending_text.trim().is_empty() {
            self.pending_text.push_str("\n\n");
        } else {
            self.pending_text.clear();
        }
        self.pending_text.push_str(&render_block(&entry));
        true
    }
}
