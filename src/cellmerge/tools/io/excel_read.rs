use std::fs::File;
use std::io::BufReader;
use std::path::Path;

use calamine::{DataType, Range, Reader, Sheets, open_workbook};

use crate::cellmerge::tools::address::CellAddress;
use crate::cellmerge::tools::error::{Result, ToolError};
use crate::cellmerge::tools::model::{CellValue, HeaderMapping};

/// Reads one row from the workbook at `path`: the value of every mapped cell,
/// in mapping order, taken from the primary worksheet.
///
/// Values are the cached results stored in the file, so formulas contribute
/// their last computed value rather than their text. Cells outside the used
/// range read as [`CellValue::Empty`].
pub fn read_row(path: &Path, mapping: &HeaderMapping) -> Result<Vec<CellValue>> {
    let range = read_primary_sheet(path)?;

    mapping
        .headers
        .iter()
        .map(|entry| {
            let address: CellAddress = entry.cell.parse()?;
            Ok(cell_value(&range, address))
        })
        .collect()
}

fn read_primary_sheet(path: &Path) -> Result<Range<DataType>> {
    let mut workbook = open_sheets(path)?;
    let range_result = workbook
        .worksheet_range_at(0)
        .ok_or_else(|| ToolError::MissingSheet(path.to_path_buf()))?;
    let range = range_result.map_err(ToolError::from)?;
    Ok(range)
}

/// Picks the reader from the extension, ignoring case.
fn open_sheets(path: &Path) -> Result<Sheets<BufReader<File>>> {
    let is_xls = path
        .extension()
        .and_then(|ext| ext.to_str())
        .is_some_and(|ext| ext.eq_ignore_ascii_case("xls"));
    let sheets = if is_xls {
        Sheets::Xls(open_workbook(path).map_err(calamine::Error::Xls)?)
    } else {
        Sheets::Xlsx(open_workbook(path).map_err(calamine::Error::Xlsx)?)
    };
    Ok(sheets)
}

fn cell_value(range: &Range<DataType>, address: CellAddress) -> CellValue {
    match range.get_value(address.position()) {
        Some(DataType::String(value)) => CellValue::String(value.clone()),
        Some(DataType::Float(value)) => CellValue::Float(*value),
        Some(DataType::Int(value)) => CellValue::Int(*value),
        Some(DataType::Bool(value)) => CellValue::Bool(*value),
        Some(DataType::DateTime(value)) => CellValue::DateTime(*value),
        Some(DataType::Error(error)) => CellValue::Error(error.to_string()),
        Some(DataType::Empty) | None => CellValue::Empty,
        Some(other) => CellValue::String(other.to_string()),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn legacy_extension_picks_xls_reader_regardless_of_case() {
        let temp_dir = tempfile::tempdir().expect("temporary directory");
        for name in ["upper.XLS", "lower.xls"] {
            let path = temp_dir.path().join(name);
            std::fs::write(&path, b"not a compound document").expect("file written");
            assert!(matches!(
                open_sheets(&path),
                Err(ToolError::ExcelRead(calamine::Error::Xls(_)))
            ));
        }

        let path = temp_dir.path().join("modern.XLSX");
        std::fs::write(&path, b"not a zip archive").expect("file written");
        assert!(matches!(
            open_sheets(&path),
            Err(ToolError::ExcelRead(calamine::Error::Xlsx(_)))
        ));
    }
}
