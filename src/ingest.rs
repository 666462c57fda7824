//! Table ingestion for uploaded transaction files.
//!
//! Splits on newlines and commas only. Double quotes are stripped, not
//! interpreted, so quoted delimiters and multi-line fields are not supported.

use crate::error::{PipelineError, PipelineResult};
use crate::types::row::{CellValue, ColumnSet, RawRow};
use serde::Serialize;
use std::collections::HashSet;
use tracing::{debug, warn};

/// Default number of preview rows shown before analysis
pub const PREVIEW_ROWS: usize = 5;

/// Default number of preview columns shown before analysis
pub const PREVIEW_COLUMNS: usize = 8;

/// Parsed upload: header order plus typed rows
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ParsedTable {
    pub columns: ColumnSet,
    pub rows: Vec<RawRow>,
}

/// Truncated view of a table for display
#[derive(Debug, Clone, PartialEq)]
pub struct TablePreview<'a> {
    pub columns: Vec<&'a str>,
    pub rows: Vec<Vec<&'a CellValue>>,
    pub hidden_columns: usize,
    pub total_rows: usize,
}

impl ParsedTable {
    pub fn row_count(&self) -> usize {
        self.rows.len()
    }

    /// First `max_rows` rows over the first `max_columns` columns
    pub fn preview(&self, max_rows: usize, max_columns: usize) -> TablePreview<'_> {
        let columns: Vec<&str> = self.columns.iter().take(max_columns).collect();
        let rows = self
            .rows
            .iter()
            .take(max_rows)
            .map(|row| {
                columns
                    .iter()
                    .map(|c| row.get(c).unwrap_or(&CellValue::Missing))
                    .collect()
            })
            .collect();

        TablePreview {
            hidden_columns: self.columns.len().saturating_sub(columns.len()),
            total_rows: self.rows.len(),
            columns,
            rows,
        }
    }

    /// Required columns absent from the header, in the order given
    pub fn missing_columns<'r, S: AsRef<str>>(&self, required: &'r [S]) -> Vec<&'r str> {
        required
            .iter()
            .map(AsRef::<str>::as_ref)
            .filter(|name| !self.columns.contains(name))
            .collect()
    }
}

/// Parses delimited text into a [`ParsedTable`]
#[derive(Debug, Clone)]
pub struct TableIngestor {
    extension: String,
}

impl TableIngestor {
    /// Create an ingestor accepting files with the given extension (e.g. `.csv`)
    pub fn new(extension: &str) -> Self {
        Self {
            extension: extension.to_ascii_lowercase(),
        }
    }

    pub fn extension(&self) -> &str {
        &self.extension
    }

    /// Reject names that do not end in the expected extension
    pub fn validate_file_name(&self, file_name: &str) -> PipelineResult<()> {
        if file_name.to_ascii_lowercase().ends_with(&self.extension) {
            Ok(())
        } else {
            Err(PipelineError::InvalidFileType {
                file_name: file_name.to_string(),
                expected: self.extension.clone(),
            })
        }
    }

    /// Validate the file name, then parse the raw bytes
    pub fn ingest(&self, file_name: &str, bytes: &[u8]) -> PipelineResult<ParsedTable> {
        self.validate_file_name(file_name)?;
        let table = Self::parse_bytes(bytes)?;
        debug!(
            file = %file_name,
            columns = table.columns.len(),
            rows = table.rows.len(),
            "File ingested"
        );
        Ok(table)
    }

    /// Parse raw bytes, rejecting anything that is not UTF-8
    pub fn parse_bytes(bytes: &[u8]) -> PipelineResult<ParsedTable> {
        let text = std::str::from_utf8(bytes)
            .map_err(|e| PipelineError::Parse(format!("input is not valid UTF-8: {}", e)))?;
        Self::parse(text)
    }

    /// Parse header + data lines.
    ///
    /// Short rows are padded with [`CellValue::Missing`]; surplus fields are
    /// dropped. Blank data lines are skipped.
    pub fn parse(text: &str) -> PipelineResult<ParsedTable> {
        // Spreadsheet exports often start with a byte order mark
        let text = text.strip_prefix('\u{feff}').unwrap_or(text);
        let lines: Vec<&str> = text.trim().split('\n').collect();
        if lines.len() < 2 {
            return Err(PipelineError::EmptyData);
        }

        let headers: Vec<String> = split_fields(lines[0]);
        let mut seen = HashSet::new();
        for header in &headers {
            if !seen.insert(header.as_str()) {
                return Err(PipelineError::Parse(format!(
                    "duplicate column name '{}'",
                    header
                )));
            }
        }

        let mut rows = Vec::with_capacity(lines.len() - 1);
        for (line_no, line) in lines.iter().enumerate().skip(1) {
            if line.trim().is_empty() {
                continue;
            }

            let fields = split_fields(line);
            if fields.len() > headers.len() {
                warn!(
                    line = line_no + 1,
                    fields = fields.len(),
                    columns = headers.len(),
                    "Row has more fields than header, extra fields dropped"
                );
            } else if fields.len() < headers.len() {
                debug!(
                    line = line_no + 1,
                    fields = fields.len(),
                    columns = headers.len(),
                    "Short row padded with missing values"
                );
            }

            let mut row = RawRow::new();
            let mut fields = fields.into_iter();
            for header in &headers {
                let value = match fields.next() {
                    Some(field) => CellValue::coerce(&field),
                    None => CellValue::Missing,
                };
                row.insert(header, value);
            }
            rows.push(row);
        }

        if rows.is_empty() {
            return Err(PipelineError::EmptyData);
        }

        Ok(ParsedTable {
            columns: ColumnSet::new(headers),
            rows,
        })
    }
}

impl Default for TableIngestor {
    fn default() -> Self {
        Self::new(".csv")
    }
}

fn split_fields(line: &str) -> Vec<String> {
    line.split(',').map(clean_field).collect()
}

fn clean_field(field: &str) -> String {
    field.trim().replace('"', "")
}
