//! Delimited-text codecs for tables.
//!
//! Two flavors share one options type: the standard codec buffers the file
//! and infers column types (numbers and booleans survive a round trip),
//! while the fast codec makes a single streaming pass and keeps every field
//! as verbatim text.

use std::path::Path;

use csv::{ByteRecord, ReaderBuilder, StringRecord, WriterBuilder};

use crate::error::Result;
use crate::table::{Cell, Table};

/// Options for reading a delimited-text table.
#[derive(Debug, Clone)]
pub struct TableReadOptions {
    /// Field delimiter.
    pub delimiter: u8,
    /// Whether the first record holds column names.
    pub has_headers: bool,
}

impl Default for TableReadOptions {
    fn default() -> Self {
        Self {
            delimiter: b',',
            has_headers: true,
        }
    }
}

/// Options for writing a delimited-text table.
#[derive(Debug, Clone)]
pub struct TableWriteOptions {
    /// Field delimiter.
    pub delimiter: u8,
    /// Whether to write the column names as the first record.
    pub headers: bool,
}

impl Default for TableWriteOptions {
    fn default() -> Self {
        Self {
            delimiter: b',',
            headers: true,
        }
    }
}

#[derive(Clone, Copy, PartialEq)]
enum ColumnKind {
    Number,
    Bool,
    Text,
}

/// Decode with column-level type inference: a column becomes numeric or
/// boolean only if every non-empty field in it parses as such.
pub fn decode(path: &Path, options: &TableReadOptions) -> Result<Table> {
    let mut reader = ReaderBuilder::new()
        .delimiter(options.delimiter)
        .has_headers(options.has_headers)
        .from_path(path)?;

    let mut columns: Vec<String> = if options.has_headers {
        reader.headers()?.iter().map(str::to_string).collect()
    } else {
        Vec::new()
    };

    let mut records: Vec<StringRecord> = Vec::new();
    for record in reader.records() {
        records.push(record?);
    }

    if columns.is_empty() {
        let width = records.first().map_or(0, StringRecord::len);
        columns = (1..=width).map(|i| format!("column{i}")).collect();
    }

    let kinds: Vec<ColumnKind> = (0..columns.len())
        .map(|col| infer_column(&records, col))
        .collect();

    let width = columns.len();
    let mut table = Table::new(columns);
    for record in &records {
        let row = (0..width)
            .map(|col| typed_cell(record.get(col).unwrap_or(""), kinds[col]))
            .collect();
        table.push_row(row)?;
    }
    Ok(table)
}

/// Single-pass decode keeping every field as verbatim text.
pub fn decode_raw(path: &Path, options: &TableReadOptions) -> Result<Table> {
    let mut reader = ReaderBuilder::new()
        .delimiter(options.delimiter)
        .has_headers(options.has_headers)
        .from_path(path)?;

    let mut table: Option<Table> = if options.has_headers {
        let columns: Vec<String> = reader.headers()?.iter().map(str::to_string).collect();
        Some(Table::new(columns))
    } else {
        None
    };

    let mut record = ByteRecord::new();
    while reader.read_byte_record(&mut record)? {
        let row: Vec<Cell> = record
            .iter()
            .map(|field| Cell::Text(String::from_utf8_lossy(field).into_owned()))
            .collect();
        let width = row.len();
        table
            .get_or_insert_with(|| {
                Table::new((1..=width).map(|i| format!("column{i}")).collect::<Vec<_>>())
            })
            .push_row(row)?;
    }

    Ok(table.unwrap_or_default())
}

/// Encode through the standard record writer.
pub fn encode(table: &Table, path: &Path, options: &TableWriteOptions) -> Result<()> {
    let mut writer = WriterBuilder::new()
        .delimiter(options.delimiter)
        .from_path(path)?;

    if options.headers {
        writer.write_record(table.columns())?;
    }
    for row in table.rows() {
        let fields: Vec<String> = row.iter().map(Cell::to_string).collect();
        writer.write_record(&fields)?;
    }
    writer.flush()?;
    Ok(())
}

/// Encode through byte records, skipping per-field UTF-8 validation.
pub fn encode_raw(table: &Table, path: &Path, options: &TableWriteOptions) -> Result<()> {
    let mut writer = WriterBuilder::new()
        .delimiter(options.delimiter)
        .from_path(path)?;

    if options.headers {
        let record: ByteRecord = table.columns().iter().map(String::as_bytes).collect();
        writer.write_byte_record(&record)?;
    }
    for row in table.rows() {
        let mut record = ByteRecord::new();
        for cell in row {
            match cell {
                Cell::Text(s) => record.push_field(s.as_bytes()),
                other => record.push_field(other.to_string().as_bytes()),
            }
        }
        writer.write_byte_record(&record)?;
    }
    writer.flush()?;
    Ok(())
}

fn infer_column(records: &[StringRecord], col: usize) -> ColumnKind {
    let mut saw_value = false;
    let mut numeric = true;
    let mut boolean = true;

    for record in records {
        let field = record.get(col).unwrap_or("");
        if field.is_empty() {
            continue;
        }
        saw_value = true;
        if numeric && field.parse::<f64>().is_err() {
            numeric = false;
        }
        if boolean && parse_bool(field).is_none() {
            boolean = false;
        }
        if !numeric && !boolean {
            return ColumnKind::Text;
        }
    }

    if !saw_value {
        ColumnKind::Text
    } else if numeric {
        ColumnKind::Number
    } else if boolean {
        ColumnKind::Bool
    } else {
        ColumnKind::Text
    }
}

fn typed_cell(field: &str, kind: ColumnKind) -> Cell {
    if field.is_empty() {
        return Cell::Empty;
    }
    match kind {
        ColumnKind::Number => match field.parse::<f64>() {
            Ok(n) => Cell::Number(n),
            Err(_) => Cell::Text(field.to_string()),
        },
        ColumnKind::Bool => match parse_bool(field) {
            Some(b) => Cell::Bool(b),
            None => Cell::Text(field.to_string()),
        },
        ColumnKind::Text => Cell::Text(field.to_string()),
    }
}

fn parse_bool(field: &str) -> Option<bool> {
    match field {
        "true" | "TRUE" | "True" => Some(true),
        "false" | "FALSE" | "False" => Some(false),
        _ => None,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::NamedTempFile;

    fn sample_table() -> Table {
        let mut table = Table::new(vec!["name", "score", "active"]);
        table
            .push_row(vec![Cell::from("alice"), Cell::from(10.0), Cell::from(true)])
            .unwrap();
        table
            .push_row(vec![Cell::from("bob"), Cell::from(12.5), Cell::from(false)])
            .unwrap();
        table
    }

    #[test]
    fn test_standard_round_trip_preserves_types() {
        let file = NamedTempFile::new().unwrap();
        let original = sample_table();

        encode(&original, file.path(), &TableWriteOptions::default()).unwrap();
        let decoded = decode(file.path(), &TableReadOptions::default()).unwrap();

        assert_eq!(decoded, original);
    }

    #[test]
    fn test_fast_round_trip_is_verbatim() {
        let file = NamedTempFile::new().unwrap();
        let mut original = Table::new(vec!["id", "note"]);
        original
            .push_row(vec![Cell::from("007"), Cell::from("leading zeros stay")])
            .unwrap();
        original
            .push_row(vec![Cell::from("1e3"), Cell::from("so does notation")])
            .unwrap();

        encode_raw(&original, file.path(), &TableWriteOptions::default()).unwrap();
        let decoded = decode_raw(file.path(), &TableReadOptions::default()).unwrap();

        assert_eq!(decoded, original);
    }

    #[test]
    fn test_mixed_column_stays_text() {
        let file = NamedTempFile::new().unwrap();
        std::fs::write(file.path(), "v\n1\nx\n").unwrap();

        let table = decode(file.path(), &TableReadOptions::default()).unwrap();
        assert_eq!(table.rows()[0][0], Cell::Text("1".to_string()));
        assert_eq!(table.rows()[1][0], Cell::Text("x".to_string()));
    }

    #[test]
    fn test_numeric_column_with_gaps() {
        let file = NamedTempFile::new().unwrap();
        std::fs::write(file.path(), "v\n1\n\n2.5\n").unwrap();

        let table = decode(file.path(), &TableReadOptions::default()).unwrap();
        assert_eq!(table.rows()[0][0], Cell::Number(1.0));
        assert_eq!(table.rows()[1][0], Cell::Empty);
        assert_eq!(table.rows()[2][0], Cell::Number(2.5));
    }

    #[test]
    fn test_headerless_read_names_columns() {
        let file = NamedTempFile::new().unwrap();
        std::fs::write(file.path(), "1,2\n3,4\n").unwrap();

        let options = TableReadOptions {
            has_headers: false,
            ..TableReadOptions::default()
        };
        let table = decode(file.path(), &options).unwrap();
        assert_eq!(table.columns(), ["column1", "column2"]);
        assert_eq!(table.n_rows(), 2);
    }

    #[test]
    fn test_custom_delimiter() {
        let file = NamedTempFile::new().unwrap();
        std::fs::write(file.path(), "a;b\n1;2\n").unwrap();

        let options = TableReadOptions {
            delimiter: b';',
            ..TableReadOptions::default()
        };
        let table = decode(file.path(), &options).unwrap();
        assert_eq!(table.columns(), ["a", "b"]);
        assert_eq!(table.rows()[0][1], Cell::Number(2.0));
    }
}
