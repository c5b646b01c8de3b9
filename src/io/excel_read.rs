use std::collections::HashMap;
use std::path::Path;

use calamine::{DataType, Reader, Xlsx, open_workbook};

use crate::error::{Result, SyncError};
use crate::model::{Expense, Supplier};

/// Reads the expense rows from the named worksheet. The first row must be a
/// header naming the columns; rows without an identifier are ignored.
pub fn read_expenses(path: &Path, sheet: &str) -> Result<Vec<Expense>> {
    let range = read_required_sheet(path, sheet)?;
    let columns = header_index(&range);

    let mut expenses = Vec::new();
    for row in range.rows().skip(1) {
        let field = |name: &str| column_value(&columns, row, name);
        let expense = Expense {
            id: field("id"),
            supplier: field("supplier"),
            vat_id: field("vat_id"),
            issued: field("issued"),
            taxable: field("taxable"),
            due: field("due"),
            invoice: field("invoice"),
            vs: field("vs"),
            category: field("category"),
            base_zero: field("base_zero"),
            base_reduced: field("base_reduced"),
            base_standard: field("base_standard"),
            base_eu: field("base_eu"),
            total: field("total"),
            imported: field("imported"),
        };
        if expense.id.is_empty() {
            continue;
        }
        expenses.push(expense);
    }
    Ok(expenses)
}

/// Reads the supplier rows from the named worksheet.
pub fn read_suppliers(path: &Path, sheet: &str) -> Result<Vec<Supplier>> {
    let range = read_required_sheet(path, sheet)?;
    let columns = header_index(&range);

    let mut suppliers = Vec::new();
    for row in range.rows().skip(1) {
        if row_is_empty(row) {
            continue;
        }
        let field = |name: &str| column_value(&columns, row, name);
        suppliers.push(Supplier {
            vat_id: field("vat_id"),
            country_code: field("country_code"),
            street: field("street"),
            city: field("city"),
            zip: field("zip"),
            registration_id: field("registration_id"),
            reverse_charge: parse_flag(&field("reverse_charge")),
        });
    }
    Ok(suppliers)
}

/// Narrow read of the identifier column only, one entry per data row in
/// sheet order. Rows with empty identifiers are kept so that positions map
/// one-to-one onto sheet rows.
pub fn read_id_column(path: &Path, sheet: &str) -> Result<Vec<String>> {
    let range = read_required_sheet(path, sheet)?;
    let columns = header_index(&range);
    let Some(&column) = columns.get("id") else {
        return Err(SyncError::InvalidSheet(format!(
            "sheet '{sheet}' has no 'id' column"
        )));
    };
    Ok(range
        .rows()
        .skip(1)
        .map(|row| cell_to_string(row.get(column)))
        .collect())
}

fn read_required_sheet(path: &Path, name: &str) -> Result<calamine::Range<DataType>> {
    let mut workbook: Xlsx<_> = open_workbook(path)?;
    let range_result = workbook
        .worksheet_range(name)
        .ok_or_else(|| SyncError::InvalidSheet(format!("missing sheet '{name}'")))?;
    let range = range_result.map_err(SyncError::from)?;
    Ok(range)
}

/// Maps lower-cased header names to column positions.
fn header_index(range: &calamine::Range<DataType>) -> HashMap<String, usize> {
    range
        .rows()
        .next()
        .map(|header| {
            header
                .iter()
                .enumerate()
                .map(|(idx, cell)| (cell_to_string(Some(cell)).trim().to_lowercase(), idx))
                .filter(|(name, _)| !name.is_empty())
                .collect()
        })
        .unwrap_or_default()
}

fn column_value(columns: &HashMap<String, usize>, row: &[DataType], name: &str) -> String {
    columns
        .get(name)
        .map(|&idx| cell_to_string(row.get(idx)))
        .unwrap_or_default()
}

fn row_is_empty(row: &[DataType]) -> bool {
    row.iter()
        .all(|cell| cell_to_string(Some(cell)).trim().is_empty())
}

fn parse_flag(raw: &str) -> bool {
    matches!(raw.trim().to_lowercase().as_str(), "1" | "true" | "yes")
}

pub(crate) fn cell_to_string(cell: Option<&DataType>) -> String {
    match cell {
        Some(DataType::String(value)) => value.clone(),
        Some(DataType::Float(value)) => value.to_string(),
        Some(DataType::Int(value)) => value.to_string(),
        Some(DataType::Bool(value)) => value.to_string(),
        Some(cell @ DataType::DateTime(_)) => cell
            .as_date()
            .map(|date| date.format("%Y-%m-%d").to_string())
            .unwrap_or_default(),
        Some(DataType::Empty) | None => String::new(),
        Some(other) => other.to_string(),
    }
}
