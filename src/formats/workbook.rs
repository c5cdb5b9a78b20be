//! Spreadsheet workbook codecs.
//!
//! Reading goes through calamine (both `.xlsx` and legacy `.xls`); writing
//! goes through rust_xlsxwriter and always produces `.xlsx`. The first row
//! of each sheet is treated as the header row.

use std::path::Path;

use calamine::{open_workbook_auto, Data, Reader};
use rust_xlsxwriter::Workbook as XlsxWorkbook;

use crate::error::{Error, Result};
use crate::table::{Cell, Table, Workbook};

/// Options for reading a workbook.
#[derive(Debug, Clone, Default)]
pub struct WorkbookReadOptions {
    /// Read only this sheet instead of the whole workbook.
    pub sheet: Option<String>,
}

/// Options for writing a workbook.
#[derive(Debug, Clone, Default)]
pub struct WorkbookWriteOptions {
    /// Autofit column widths after writing.
    pub autofit: bool,
}

/// Decode a workbook, or a single named sheet of it.
pub fn decode(path: &Path, options: &WorkbookReadOptions) -> Result<Workbook> {
    let mut book = open_workbook_auto(path)?;

    let names: Vec<String> = match &options.sheet {
        Some(name) => {
            if !book.sheet_names().iter().any(|n| n == name) {
                return Err(Error::NotFound(format!("sheet '{}'", name)));
            }
            vec![name.clone()]
        }
        None => book.sheet_names().to_vec(),
    };

    let mut workbook = Workbook::new();
    for name in names {
        let range = book.worksheet_range(&name)?;
        let table = range_to_table(&range)?;
        workbook.push_sheet(name, table);
    }
    Ok(workbook)
}

/// Encode a workbook as `.xlsx`.
pub fn encode(workbook: &Workbook, path: &Path, options: &WorkbookWriteOptions) -> Result<()> {
    if workbook.sheets().is_empty() {
        return Err(Error::InvalidArgument(
            "workbook has no sheets to write".to_string(),
        ));
    }

    let mut book = XlsxWorkbook::new();
    for (name, table) in workbook.sheets() {
        let sheet = book.add_worksheet();
        sheet.set_name(name.as_str())?;

        for (col, column) in table.columns().iter().enumerate() {
            sheet.write_string(0, col as u16, column.as_str())?;
        }
        for (r, row) in table.rows().iter().enumerate() {
            let row_idx = (r + 1) as u32;
            for (c, cell) in row.iter().enumerate() {
                let col_idx = c as u16;
                match cell {
                    Cell::Empty => {}
                    Cell::Bool(b) => {
                        sheet.write_boolean(row_idx, col_idx, *b)?;
                    }
                    Cell::Number(n) => {
                        sheet.write_number(row_idx, col_idx, *n)?;
                    }
                    Cell::Text(s) => {
                        sheet.write_string(row_idx, col_idx, s.as_str())?;
                    }
                }
            }
        }
        if options.autofit {
            sheet.autofit();
        }
    }

    book.save(path)?;
    Ok(())
}

fn range_to_table(range: &calamine::Range<Data>) -> Result<Table> {
    let mut rows = range.rows();

    let header = match rows.next() {
        Some(header) => header,
        None => return Ok(Table::default()),
    };
    let columns: Vec<String> = header
        .iter()
        .enumerate()
        .map(|(i, cell)| match cell {
            Data::Empty => format!("column{}", i + 1),
            other => data_to_cell(other).to_string(),
        })
        .collect();

    let mut table = Table::new(columns);
    for row in rows {
        table.push_row(row.iter().map(data_to_cell).collect())?;
    }
    Ok(table)
}

fn data_to_cell(data: &Data) -> Cell {
    match data {
        Data::Empty => Cell::Empty,
        Data::String(s) => Cell::Text(s.clone()),
        Data::Float(f) => Cell::Number(*f),
        Data::Int(i) => Cell::Number(*i as f64),
        Data::Bool(b) => Cell::Bool(*b),
        Data::DateTime(dt) => Cell::Number(dt.as_f64()),
        Data::DateTimeIso(s) | Data::DurationIso(s) => Cell::Text(s.clone()),
        Data::Error(e) => Cell::Text(e.to_string()),
    }
}
