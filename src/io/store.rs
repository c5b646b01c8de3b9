use std::path::{Path, PathBuf};

use calamine::{Reader, Xlsx, open_workbook};
use tracing::debug;

use crate::config::SyncConfig;
use crate::error::{Result, SyncError};
use crate::io::excel_read::{self, cell_to_string};
use crate::io::excel_write::{self, SheetData};
use crate::model::{Expense, Supplier};
use crate::sync::{ExpenseSource, MarkerSink, SupplierSource};

/// Header of the import-marker column in the expense sheet.
const MARKER_COLUMN: &str = "imported";

/// Workbook-file implementation of the expense source, supplier source, and
/// marker sink. Holds no file handle between calls; every operation opens
/// the workbook afresh, so clones of a store are interchangeable.
#[derive(Debug, Clone)]
pub struct WorkbookStore {
    path: PathBuf,
    expenses_sheet: String,
    suppliers_sheet: String,
}

impl WorkbookStore {
    pub fn new(path: &Path, config: &SyncConfig) -> Self {
        Self {
            path: path.to_path_buf(),
            expenses_sheet: config.active_expenses_sheet().to_string(),
            suppliers_sheet: config.suppliers_sheet.clone(),
        }
    }
}

impl ExpenseSource for WorkbookStore {
    fn expenses(&mut self) -> Result<Vec<Expense>> {
        excel_read::read_expenses(&self.path, &self.expenses_sheet)
    }

    fn expense_ids(&mut self) -> Result<Vec<String>> {
        excel_read::read_id_column(&self.path, &self.expenses_sheet)
    }
}

impl SupplierSource for WorkbookStore {
    fn suppliers(&mut self) -> Result<Vec<Supplier>> {
        excel_read::read_suppliers(&self.path, &self.suppliers_sheet)
    }
}

impl MarkerSink for WorkbookStore {
    /// Updates the marker cell and rewrites the whole workbook; the writer
    /// cannot edit files in place.
    fn write_marker(&mut self, row: usize, value: &str) -> Result<()> {
        let mut sheets = read_all_sheets(&self.path)?;
        let sheet = sheets
            .iter_mut()
            .find(|sheet| sheet.name == self.expenses_sheet)
            .ok_or_else(|| {
                SyncError::InvalidSheet(format!("missing sheet '{}'", self.expenses_sheet))
            })?;

        let column = marker_column(sheet)?;
        let row_idx = row + 1; // data rows start below the header
        if sheet.rows.len() <= row_idx {
            sheet.rows.resize(row_idx + 1, Vec::new());
        }
        let cells = &mut sheet.rows[row_idx];
        if cells.len() <= column {
            cells.resize(column + 1, String::new());
        }
        cells[column] = value.to_string();

        excel_write::write_workbook(&self.path, &sheets)
    }
}

/// Marker sink that records nothing; backs the runner's dry-run mode.
#[derive(Debug, Clone, Copy, Default)]
pub struct DryRunSink;

impl MarkerSink for DryRunSink {
    fn write_marker(&mut self, row: usize, value: &str) -> Result<()> {
        debug!(row, value, "dry run, marker not written");
        Ok(())
    }
}

fn marker_column(sheet: &SheetData) -> Result<usize> {
    sheet
        .rows
        .first()
        .and_then(|header| {
            header
                .iter()
                .position(|cell| cell.trim().eq_ignore_ascii_case(MARKER_COLUMN))
        })
        .ok_or_else(|| {
            SyncError::InvalidSheet(format!(
                "sheet '{}' has no '{MARKER_COLUMN}' column",
                sheet.name
            ))
        })
}

fn read_all_sheets(path: &Path) -> Result<Vec<SheetData>> {
    let mut workbook: Xlsx<_> = open_workbook(path)?;
    let names = workbook.sheet_names().to_owned();

    let mut sheets = Vec::with_capacity(names.len());
    for name in names {
        let Some(range_result) = workbook.worksheet_range(&name) else {
            continue;
        };
        let range = range_result.map_err(SyncError::from)?;
        let rows = range
            .rows()
            .map(|row| row.iter().map(|cell| cell_to_string(Some(cell))).collect())
            .collect();
        sheets.push(SheetData { name, rows });
    }
    Ok(sheets)
}
