//! Replacements sheet: one header row of placeholder tokens, one data row per output document.

use crate::error::BatchError;
use docfill_domain::constants::CATEGORY_COLUMN;
use fxhash::FxHashSet;
use std::io::Read;

const UTF8_BOM: &[u8] = b"\xEF\xBB\xBF";

/// One non-empty value of a row, paired with the token it replaces.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Cell {
    pub token: String,
    pub value: String,
}

/// A data row of the sheet. Empty cells are dropped at parse time.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ReplacementRow {
    /// Zero-based position among data rows.
    pub index: usize,
    /// Source line in the CSV, for error messages.
    pub line: u64,
    pub category: Option<String>,
    pub cells: Vec<Cell>,
}

#[derive(Debug, Clone, Default)]
pub struct ReplacementSheet {
    tokens: Vec<String>,
    rows: Vec<ReplacementRow>,
}

impl ReplacementSheet {
    /// Parses a CSV sheet held in memory.
    ///
    /// # Errors
    /// [`BatchError::MalformedSheet`] for unreadable CSV, empty or duplicate headers and
    /// rows with more fields than the header; [`BatchError::EmptySheet`] when there is no
    /// data row. Missing trailing fields count as empty.
    pub fn from_csv(bytes: &[u8]) -> Result<Self, BatchError> {
        Self::from_reader(bytes.strip_prefix(UTF8_BOM).unwrap_or(bytes))
    }

    /// Parses a CSV sheet from any reader.
    ///
    /// # Errors
    /// Same as [`ReplacementSheet::from_csv`].
    pub fn from_reader<R: Read>(reader: R) -> Result<Self, BatchError> {
        let mut csv = csv::ReaderBuilder::new().has_headers(false).flexible(true).from_reader(reader);
        let mut records = csv.records();

        let header = match records.next() {
            Some(record) => record.map_err(malformed)?,
            None => {
                return Err(BatchError::EmptySheet {
                    message: "the sheet is empty".into(),
                    context: None,
                });
            }
        };

        let columns: Vec<String> = header.iter().map(|h| h.trim_start_matches('\u{feff}').to_owned()).collect();
        validate_header(&columns)?;

        let category_index = columns.iter().position(|c| c.eq_ignore_ascii_case(CATEGORY_COLUMN));
        let tokens: Vec<String> = columns
            .iter()
            .enumerate()
            .filter(|(i, _)| Some(*i) != category_index)
            .map(|(_, c)| c.clone())
            .collect();

        let mut rows = Vec::new();
        for record in records {
            let record = record.map_err(malformed)?;
            let line = record.position().map_or(0, csv::Position::line);

            if record.iter().all(|field| field.trim().is_empty()) {
                continue;
            }

            if record.len() > columns.len() {
                return Err(BatchError::MalformedSheet {
                    message: format!(
                        "expected at most {} fields but found {}",
                        columns.len(),
                        record.len()
                    )
                    .into(),
                    context: Some(format!("line {line}").into()),
                });
            }

            let mut category = None;
            let mut cells = Vec::new();
            for (i, (column, raw)) in columns.iter().zip(record.iter()).enumerate() {
                let value = raw.trim();
                if value.is_empty() {
                    continue;
                }
                if Some(i) == category_index {
                    category = Some(value.to_owned());
                } else {
                    cells.push(Cell { token: column.clone(), value: value.to_owned() });
                }
            }

            rows.push(ReplacementRow { index: rows.len(), line, category, cells });
        }

        if rows.is_empty() {
            return Err(BatchError::EmptySheet {
                message: "the header is present but no data rows follow".into(),
                context: None,
            });
        }

        Ok(Self { tokens, rows })
    }

    /// Placeholder tokens in column order, without the category column.
    #[must_use]
    pub fn tokens(&self) -> &[String] {
        &self.tokens
    }

    #[must_use]
    pub fn rows(&self) -> &[ReplacementRow] {
        &self.rows
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.rows.len()
    }

    /// Keeps the first `max` rows; returns how many were dropped.
    pub fn truncate(&mut self, max: usize) -> usize {
        let dropped = self.rows.len().saturating_sub(max);
        self.rows.truncate(max);
        dropped
    }

    /// Distinct categories in first-seen order.
    #[must_use]
    pub fn categories(&self) -> Vec<&str> {
        let mut seen = FxHashSet::default();
        self.rows
            .iter()
            .filter_map(|row| row.category.as_deref())
            .filter(|category| seen.insert(*category))
            .collect()
    }
}

fn validate_header(columns: &[String]) -> Result<(), BatchError> {
    let mut seen = FxHashSet::default();
    let mut category_seen = false;
    for (i, column) in columns.iter().enumerate() {
        if column.trim().is_empty() {
            return Err(BatchError::MalformedSheet {
                message: format!("column {} has an empty header", i + 1).into(),
                context: Some("header row".into()),
            });
        }
        let duplicate = if column.eq_ignore_ascii_case(CATEGORY_COLUMN) {
            std::mem::replace(&mut category_seen, true)
        } else {
            !seen.insert(column.as_str())
        };
        if duplicate {
            return Err(BatchError::MalformedSheet {
                message: format!("column '{column}' appears more than once").into(),
                context: Some("header row".into()),
            });
        }
    }
    Ok(())
}

fn malformed(err: csv::Error) -> BatchError {
    let context = err.position().map(|p| format!("line {}", p.line()).into());
    BatchError::MalformedSheet { message: err.to_string().into(), context }
}
