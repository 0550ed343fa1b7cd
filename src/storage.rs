//! Header-preserving CSV tables.
//!
//! Rows are kept as name → value maps so that columns the pipeline does not
//! know about are carried through untouched, in their original order.

use std::collections::HashMap;
use std::fs::File;
use std::io::{Read, Write};
use std::path::Path;

use thiserror::Error;
use tracing::debug;

#[derive(Debug, Error)]
pub enum StorageError {
    #[error("CSV error: {0}")]
    Csv(#[from] csv::Error),
    #[error("I/O error on {path}: {source}")]
    Io {
        path: String,
        #[source]
        source: std::io::Error,
    },
    #[error("Missing required column '{column}'")]
    MissingColumn { column: String },
    #[error("Line {line} has {found} fields but the header has {expected}")]
    ExtraFields {
        line: u64,
        expected: usize,
        found: usize,
    },
}

/// One data row, keyed by column name.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Record {
    fields: HashMap<String, String>,
}

impl Record {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn get(&self, column: &str) -> Option<&str> {
        self.fields.get(column).map(|s| s.as_str())
    }

    /// Value of a column, or an empty string when the row lacks it.
    pub fn get_or_empty(&self, column: &str) -> &str {
        self.get(column).unwrap_or("")
    }

    pub fn set(&mut self, column: impl Into<String>, value: impl Into<String>) {
        self.fields.insert(column.into(), value.into());
    }

    pub fn with(mut self, column: impl Into<String>, value: impl Into<String>) -> Self {
        self.set(column, value);
        self
    }
}

/// A CSV file held in memory: header order plus rows.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Table {
    headers: Vec<String>,
    records: Vec<Record>,
}

impl Table {
    pub fn new(headers: Vec<String>) -> Self {
        Self {
            headers,
            records: Vec::new(),
        }
    }

    /// Read a UTF-8 CSV file with a header row.
    pub fn read(path: &Path) -> Result<Self, StorageError> {
        let file = File::open(path).map_err(|source| StorageError::Io {
            path: path.display().to_string(),
            source,
        })?;
        let table = Self::from_reader(file)?;
        debug!(
            "Read {} rows ({} columns) from {}",
            table.len(),
            table.headers.len(),
            path.display()
        );
        Ok(table)
    }

    pub fn from_reader<R: Read>(reader: R) -> Result<Self, StorageError> {
        let mut reader = csv::ReaderBuilder::new()
            .has_headers(true)
            .flexible(true)
            .from_reader(reader);

        let headers: Vec<String> = reader.headers()?.iter().map(|h| h.to_string()).collect();

        let mut records = Vec::new();
        for row in reader.records() {
            let row = row?;
            if row.len() > headers.len() {
                return Err(StorageError::ExtraFields {
                    line: row.position().map(|p| p.line()).unwrap_or_default(),
                    expected: headers.len(),
                    found: row.len(),
                });
            }
            let mut record = Record::new();
            // Short rows leave trailing columns unset
            for (name, value) in headers.iter().zip(row.iter()) {
                record.set(name.clone(), value);
            }
            records.push(record);
        }

        Ok(Self { headers, records })
    }

    /// Write the table, creating parent directories as needed.
    pub fn write(&self, path: &Path) -> Result<(), StorageError> {
        if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
            std::fs::create_dir_all(parent).map_err(|source| StorageError::Io {
                path: parent.display().to_string(),
                source,
            })?;
        }
        let file = File::create(path).map_err(|source| StorageError::Io {
            path: path.display().to_string(),
            source,
        })?;
        self.to_writer(file)?;
        debug!("Wrote {} rows to {}", self.len(), path.display());
        Ok(())
    }

    pub fn to_writer<W: Write>(&self, writer: W) -> Result<(), StorageError> {
        let mut writer = csv::Writer::from_writer(writer);
        writer.write_record(&self.headers)?;
        for record in &self.records {
            writer.write_record(self.headers.iter().map(|h| record.get_or_empty(h)))?;
        }
        writer.flush().map_err(|source| StorageError::Io {
            path: "<output>".to_string(),
            source,
        })?;
        Ok(())
    }

    pub fn headers(&self) -> &[String] {
        &self.headers
    }

    pub fn records(&self) -> &[Record] {
        &self.records
    }

    pub fn into_records(self) -> Vec<Record> {
        self.records
    }

    pub fn push(&mut self, record: Record) {
        self.records.push(record);
    }

    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    pub fn has_column(&self, column: &str) -> bool {
        self.headers.iter().any(|h| h == column)
    }

    /// Append a column to the header unless it is already there.
    ///
    /// Returns `true` if the column was added.
    pub fn ensure_column(&mut self, column: &str) -> bool {
        if self.has_column(column) {
            return false;
        }
        self.headers.push(column.to_string());
        true
    }

    /// Fail with the first column from `columns` the header lacks.
    pub fn require_columns(&self, columns: &[&str]) -> Result<(), StorageError> {
        match columns.iter().find(|c| !self.has_column(c)) {
            Some(column) => Err(StorageError::MissingColumn {
                column: column.to_string(),
            }),
            None => Ok(()),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_read_preserves_header_order() {
        let csv = "b,a,c\n1,2,3\n4,5,6\n";
        let table = Table::from_reader(csv.as_bytes()).unwrap();
        assert_eq!(table.headers(), &["b", "a", "c"]);
        assert_eq!(table.len(), 2);
        assert_eq!(table.records()[1].get("a"), Some("5"));
    }

    #[test]
    fn test_quoted_multiline_values_round_trip() {
        let csv = "name,notes\nlamp,\"line one\nline \"\"two\"\"\"\n";
        let table = Table::from_reader(csv.as_bytes()).unwrap();
        assert_eq!(
            table.records()[0].get("notes"),
            Some("line one\nline \"two\"")
        );

        let mut out = Vec::new();
        table.to_writer(&mut out).unwrap();
        let again = Table::from_reader(out.as_slice()).unwrap();
        assert_eq!(again, table);
    }

    #[test]
    fn test_short_rows_read_as_empty() {
        let table = Table::from_reader("a,b\n1\n".as_bytes()).unwrap();
        let record = &table.records()[0];
        assert_eq!(record.get("b"), None);
        assert_eq!(record.get_or_empty("b"), "");
    }

    #[test]
    fn test_long_rows_are_rejected() {
        let err = Table::from_reader("a,b\n1,2\n3,4,EXTRA\n".as_bytes()).unwrap_err();
        assert!(matches!(
            err,
            StorageError::ExtraFields {
                line: 3,
                expected: 2,
                found: 3
            }
        ));
        assert!(err.to_string().contains("Line 3"));
    }

    #[test]
    fn test_ensure_column_does_not_duplicate() {
        let mut table = Table::new(vec!["a".to_string(), "category".to_string()]);
        assert!(!table.ensure_column("category"));
        assert!(table.ensure_column("extra"));
        assert_eq!(table.headers(), &["a", "category", "extra"]);
    }

    #[test]
    fn test_require_columns_names_missing_column() {
        let table = Table::new(vec!["index".to_string(), "name".to_string()]);
        let err = table
            .require_columns(&["index", "explanation", "name"])
            .unwrap_err();
        assert!(matches!(err, StorageError::MissingColumn { ref column } if column == "explanation"));
    }

    #[test]
    fn test_write_creates_parent_dirs() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("nested/out.csv");
        let mut table = Table::new(vec!["x".to_string()]);
        table.push(Record::new().with("x", "1"));
        table.write(&path).unwrap();
        assert_eq!(std::fs::read_to_string(&path).unwrap(), "x\n1\n");
    }
}
