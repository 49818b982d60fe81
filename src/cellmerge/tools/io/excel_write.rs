use std::fs::{self, OpenOptions};
use std::io::{self, Write};
use std::path::Path;

use rust_xlsxwriter::{Format, Workbook, Worksheet};

use crate::cellmerge::tools::error::Result;
use crate::cellmerge::tools::model::{CellValue, MergedTable};

const DATE_TIME_FORMAT: &str = "yyyy-mm-dd hh:mm:ss";

/// Renders the table as a single-sheet xlsx workbook held in memory. The
/// header row carries the column labels verbatim; there is no index column.
pub fn render_table(table: &MergedTable) -> Result<Vec<u8>> {
    let mut workbook = Workbook::new();
    let header_format = Format::new().set_bold();
    let date_format = Format::new().set_num_format(DATE_TIME_FORMAT);

    let worksheet = workbook.add_worksheet();
    for (col_idx, header) in table.columns.iter().enumerate() {
        worksheet.write_string_with_format(0, col_idx as u16, header, &header_format)?;
    }

    for (row_idx, row) in table.rows.iter().enumerate() {
        let row_num = (row_idx + 1) as u32;
        for (col_idx, cell) in row.iter().enumerate() {
            write_cell(worksheet, row_num, col_idx as u16, cell, &date_format)?;
        }
    }

    Ok(workbook.save_to_buffer()?)
}

fn write_cell(
    worksheet: &mut Worksheet,
    row: u32,
    col: u16,
    cell: &CellValue,
    date_format: &Format,
) -> Result<()> {
    match cell {
        CellValue::Empty => {}
        CellValue::String(value) | CellValue::Error(value) => {
            worksheet.write_string(row, col, value)?;
        }
        CellValue::Float(value) => {
            worksheet.write_number(row, col, *value)?;
        }
        CellValue::Int(value) => {
            worksheet.write_number(row, col, *value as f64)?;
        }
        CellValue::Bool(value) => {
            worksheet.write_boolean(row, col, *value)?;
        }
        CellValue::DateTime(value) => {
            worksheet.write_number_with_format(row, col, *value, date_format)?;
        }
    }
    Ok(())
}

/// Writes `bytes` to a file that must not exist yet. Returns an
/// [`io::ErrorKind::AlreadyExists`] error when the path is taken, so callers
/// can pick another name. A partially written file is removed before the
/// error is returned.
pub fn write_new_file(path: &Path, bytes: &[u8]) -> io::Result<()> {
    let mut file = OpenOptions::new().write(true).create_new(true).open(path)?;
    let written = file.write_all(bytes).and_then(|()| file.sync_all());
    if let Err(error) = written {
        drop(file);
        let _ = fs::remove_file(path);
        return Err(error);
    }
    Ok(())
}
