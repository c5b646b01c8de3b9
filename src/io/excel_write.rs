use std::path::Path;

use rust_xlsxwriter::Workbook;

use crate::error::Result;

/// One worksheet's cells, header row included.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct SheetData {
    pub name: String,
    pub rows: Vec<Vec<String>>,
}

/// Writes the provided sheets to the given path, replacing the file.
pub fn write_workbook(path: &Path, sheets: &[SheetData]) -> Result<()> {
    let mut workbook = Workbook::new();

    for sheet in sheets {
        let worksheet = workbook.add_worksheet();
        worksheet.set_name(&sheet.name)?;

        for (row_idx, row) in sheet.rows.iter().enumerate() {
            for (col_idx, cell) in row.iter().enumerate() {
                if cell.is_empty() {
                    continue;
                }
                worksheet.write_string(row_idx as u32, col_idx as u16, cell)?;
            }
        }
    }

    workbook.save(path)?;
    Ok(())
}
