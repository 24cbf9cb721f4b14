//! Output file names: `"{base} - {value} - {value}.docx"` built from the row's qualifying cells.

use crate::sheet::ReplacementRow;
use docfill_domain::constants::{DEFAULT_BASE_NAME, TEMPLATE_EXTENSION};
use fxhash::FxHashSet;

const SEPARATOR: &str = " - ";
const RESERVED: &[char] = &['<', '>', ':', '"', '/', '\\', '|', '?', '*'];
/// Stems are cut to this many characters so the full name stays well under common limits.
const MAX_STEM_CHARS: usize = 200;

/// `true` when `column` contains any of the `excluded` substrings, ignoring case.
#[must_use]
pub fn is_excluded(column: &str, excluded: &[String]) -> bool {
    let column = column.to_lowercase();
    excluded.iter().any(|needle| !needle.is_empty() && column.contains(&needle.to_lowercase()))
}

/// Builds the sanitized `.docx` name for one row.
#[must_use]
pub fn output_file_name(base: &str, row: &ReplacementRow, excluded: &[String]) -> String {
    let mut stem = base.trim().to_owned();
    for cell in row.cells.iter().filter(|cell| !is_excluded(&cell.token, excluded)) {
        if !stem.is_empty() {
            stem.push_str(SEPARATOR);
        }
        stem.push_str(&cell.value);
    }
    format!("{}.{TEMPLATE_EXTENSION}", sanitize(&stem))
}

/// Makes `stem` safe as a flat archive entry or a file on disk.
#[must_use]
pub fn sanitize(stem: &str) -> String {
    let replaced: String = stem
        .chars()
        .map(|c| if c.is_control() || RESERVED.contains(&c) { '_' } else { c })
        .take(MAX_STEM_CHARS)
        .collect();

    let trimmed = replaced.trim_start().trim_end_matches(|c: char| c == '.' || c.is_whitespace());
    if trimmed.is_empty() { DEFAULT_BASE_NAME.to_owned() } else { trimmed.to_owned() }
}

/// Hands out names that are unique (case-insensitively) within one batch.
#[derive(Debug, Default)]
pub struct UniqueNames {
    seen: FxHashSet<String>,
}

impl UniqueNames {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Returns `name`, or `name (2)`, `name (3)`, … when it was already handed out.
    pub fn claim(&mut self, name: &str) -> String {
        let (stem, extension) = split_extension(name);
        let mut attempt = 1;
        loop {
            let candidate = if attempt == 1 {
                name.to_owned()
            } else {
                format!("{stem} ({attempt}){extension}")
            };
            if self.seen.insert(candidate.to_lowercase()) {
                return candidate;
            }
            attempt += 1;
        }
    }
}

fn split_extension(name: &str) -> (&str, &str) {
    match name.rfind('.') {
        Some(dot) if dot > 0 => name.split_at(dot),
        _ => (name, ""),
    }
}
