//! Orchestration of one synchronisation pass: load, map, validate, submit,
//! and mark, strictly sequentially and in sheet order.

use std::collections::HashMap;
use std::fmt;

use chrono::Local;
use serde::{Serialize, Serializer};
use serde_json::{Value, json};
use tracing::{debug, info, instrument, warn};

use crate::api::InvoicingApi;
use crate::config::SyncConfig;
use crate::error::{Result, SyncError};
use crate::format;
use crate::mapper;
use crate::model::{Expense, MappedPayload, Supplier};
use crate::validate::{self, SkipReason};

/// Ordered expense rows for the configured range, plus the narrow
/// identifier-column read used to locate rows for marker write-back.
pub trait ExpenseSource {
    fn expenses(&mut self) -> Result<Vec<Expense>>;

    /// Identifier column of every data row, in sheet order, including rows
    /// with empty identifiers. Positions map one-to-one onto sheet rows.
    fn expense_ids(&mut self) -> Result<Vec<String>>;
}

/// Ordered supplier rows for the configured range.
pub trait SupplierSource {
    fn suppliers(&mut self) -> Result<Vec<Supplier>>;
}

/// Writes one value into the import-marker cell of the given data row
/// (0-based over the rows reported by [`ExpenseSource::expense_ids`]).
pub trait MarkerSink {
    fn write_marker(&mut self, row: usize, value: &str) -> Result<()>;
}

/// One skip-report entry: the payload name paired with the reason it was
/// excluded from the pass.
#[derive(Debug, Clone, PartialEq)]
pub struct SkipEntry {
    pub name: String,
    pub reason: SkipReason,
}

impl fmt::Display for SkipEntry {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}: {}", self.name, self.reason)
    }
}

impl Serialize for SkipEntry {
    fn serialize<S: Serializer>(&self, serializer: S) -> std::result::Result<S::Ok, S::Error> {
        serializer.collect_str(self)
    }
}

/// Aggregate outcome of a pass.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct SyncReport {
    /// Expenses created and paid remotely during this pass.
    pub synced: usize,
    /// Expenses rejected by validation, in encounter order.
    pub skipped: Vec<SkipEntry>,
    /// Expense identifiers whose marker row could not be located after a
    /// successful remote sync; these rows stay re-processable.
    pub marker_misses: Vec<String>,
}

impl SyncReport {
    pub fn is_clean(&self) -> bool {
        self.skipped.is_empty() && self.marker_misses.is_empty()
    }

    /// Operator-facing summary; an empty skip list is reported as `null` so
    /// callers can tell "ran cleanly" from "ran with skips".
    pub fn summary(&self) -> Value {
        let skipped = if self.skipped.is_empty() {
            Value::Null
        } else {
            json!(self.skipped)
        };
        json!({ "skipped": skipped })
    }
}

/// Drives one pass over the collaborator seams. Single-threaded; every
/// remote call blocks the pass, and the first collaborator error aborts the
/// remaining iteration.
pub struct ExpenseSync<E, S, M, A> {
    expenses: E,
    suppliers: S,
    markers: M,
    api: A,
    config: SyncConfig,
}

impl<E, S, M, A> ExpenseSync<E, S, M, A>
where
    E: ExpenseSource,
    S: SupplierSource,
    M: MarkerSink,
    A: InvoicingApi,
{
    pub fn new(expenses: E, suppliers: S, markers: M, api: A, config: SyncConfig) -> Self {
        Self {
            expenses,
            suppliers,
            markers,
            api,
            config,
        }
    }

    /// Runs one synchronisation pass. Already-marked expenses are skipped
    /// silently; validation rejections land in the skip report; a failing
    /// remote call aborts the pass with the report accumulated so far.
    /// Markers written before an abort persist, so re-running is safe.
    #[instrument(level = "info", skip_all, fields(mode = ?self.config.mode))]
    pub fn sync(&mut self) -> Result<SyncReport> {
        let suppliers_by_vat_id = index_suppliers(self.suppliers.suppliers()?);
        let expenses = self.expenses.expenses()?;
        info!(
            expense_count = expenses.len(),
            supplier_count = suppliers_by_vat_id.len(),
            "loaded sheet data"
        );

        let mut report = SyncReport::default();
        for expense in &expenses {
            if expense.is_imported() {
                debug!(expense = %expense.id, "already imported, skipping");
                continue;
            }

            let payload = mapper::map(expense, &suppliers_by_vat_id, &self.config);
            if let Err(reason) = validate::validate(&payload, expense, &self.config) {
                info!(expense = %expense.id, %reason, "expense skipped");
                report.skipped.push(SkipEntry {
                    name: payload.invoice.name.clone(),
                    reason,
                });
                continue;
            }

            if let Err(error) = self.import(expense, &payload, &mut report) {
                warn!(expense = %expense.id, %error, "aborting pass");
                return Err(SyncError::Aborted {
                    source: Box::new(error),
                    report,
                });
            }
        }

        Ok(report)
    }

    fn import(
        &mut self,
        expense: &Expense,
        payload: &MappedPayload,
        report: &mut SyncReport,
    ) -> Result<()> {
        let created = self.api.create_expense(payload)?;
        self.api.record_payment(expense, payload, &created)?;
        report.synced += 1;
        self.write_marker(expense, report)
    }

    /// Locates the expense's row by scanning the identifier column top to
    /// bottom (first match wins) and writes today's date into the marker
    /// cell. A miss is recorded but never aborts the pass.
    fn write_marker(&mut self, expense: &Expense, report: &mut SyncReport) -> Result<()> {
        let ids = self.expenses.expense_ids()?;
        match ids.iter().position(|id| id == &expense.id) {
            Some(row) => {
                let today = format::marker_date(Local::now().date_naive());
                self.markers.write_marker(row, &today)?;
                debug!(expense = %expense.id, row, "import marker written");
            }
            None => {
                warn!(expense = %expense.id, "no matching row for marker write-back");
                report.marker_misses.push(expense.id.clone());
            }
        }
        Ok(())
    }
}

/// Indexes suppliers by VAT id. Rows without a VAT id are not indexable; on
/// a duplicate id the last row wins.
fn index_suppliers(suppliers: Vec<Supplier>) -> HashMap<String, Supplier> {
    let mut by_vat_id = HashMap::new();
    for supplier in suppliers {
        if supplier.vat_id.is_empty() {
            continue;
        }
        if let Some(previous) = by_vat_id.insert(supplier.vat_id.clone(), supplier) {
            warn!(vat_id = %previous.vat_id, "duplicate supplier VAT id, keeping the later row");
        }
    }
    by_vat_id
}
