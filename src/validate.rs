//! Consistency rules applied to a mapped payload before it is submitted.
//! Rules run in a fixed order and short-circuit on the first failure; the
//! outcome is a pure function of the payload and the original expense.

use thiserror::Error;

use crate::config::SyncConfig;
use crate::format;
use crate::model::{Expense, MappedPayload, VatLine};

/// Fields that may legitimately be empty or zero and are therefore skipped
/// by the completeness check.
const EXEMPT_FIELDS: &[&str] = &[
    "variable_symbol",
    "amount",
    "vat",
    "amount2",
    "vat2",
    "amount3",
    "vat3",
    "zip",
    "registration_id",
    "tax_id",
];

/// Absolute tolerance between computed and declared totals, in currency
/// units.
const ABS_TOLERANCE: f64 = 2.0;

/// Relative tolerance between computed and declared totals, in percent.
const RELATIVE_TOLERANCE_PERCENT: f64 = 0.005;

/// Why a payload was excluded from the pass. Rendered verbatim into the
/// skip report.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum SkipReason {
    #[error("Missing data ({field})")]
    MissingField { field: String },

    #[error("Country code mismatch | country table key '{code}' != tax id prefix '{prefix}'")]
    CountryMismatch { code: String, prefix: String },

    #[error("Calculation failed (EU) | {base} != {total}")]
    EuTotalMismatch { base: f64, total: f64 },

    #[error("Calculation failed | {sum} != {total} | {diff} ({percent}%) diff")]
    GrossTotalMismatch {
        sum: f64,
        total: f64,
        diff: f64,
        percent: f64,
    },
}

/// Checks the payload for completeness and financial consistency. EU
/// expenses end validation at the cross-border amount check; domestic
/// expenses end at the gross-total check.
pub fn validate(
    payload: &MappedPayload,
    expense: &Expense,
    config: &SyncConfig,
) -> Result<(), SkipReason> {
    check_completeness(payload)?;
    check_country(payload, config)?;
    if expense.is_eu() {
        return check_eu_total(expense);
    }
    check_gross_total(payload)
}

/// Every non-exempt field across the three sections must be populated.
fn check_completeness(payload: &MappedPayload) -> Result<(), SkipReason> {
    let sections = [
        payload.invoice.fields(),
        payload.extra.fields(),
        payload.counterparty.fields(),
    ];
    for fields in sections {
        for (field, value) in fields {
            if EXEMPT_FIELDS.contains(&field.as_str()) {
                continue;
            }
            if value.is_none_or(str::is_empty) {
                return Err(SkipReason::MissingField { field });
            }
        }
    }
    Ok(())
}

/// The counterparty's country identifier, when it is known to the table at
/// all, must agree with the two-character prefix of its tax id.
fn check_country(payload: &MappedPayload, config: &SyncConfig) -> Result<(), SkipReason> {
    let Some(country_id) = payload.counterparty.country_id.as_deref() else {
        return Ok(());
    };
    let prefix: String = payload
        .counterparty
        .tax_id
        .as_deref()
        .unwrap_or("")
        .chars()
        .take(2)
        .collect::<String>()
        .to_lowercase();

    match config.country_code_for(country_id) {
        Some(code) if code != prefix => Err(SkipReason::CountryMismatch {
            code: code.to_string(),
            prefix,
        }),
        _ => Ok(()),
    }
}

/// EU branch: the zero-rate domestic bucket must sit within the absolute
/// tolerance of the declared total.
fn check_eu_total(expense: &Expense) -> Result<(), SkipReason> {
    let base = format::parse_amount(&expense.base_zero).unwrap_or(0.0);
    let total = format::parse_amount(&expense.total).unwrap_or(0.0);
    if (base - total).abs() > ABS_TOLERANCE {
        return Err(SkipReason::EuTotalMismatch { base, total });
    }
    Ok(())
}

/// Domestic branch: recompute the gross from the amount/rate pairs and
/// compare against the declared total. Rejected only when the relative and
/// the absolute threshold are both exceeded, so rounding noise passes while
/// real mismatches are caught.
fn check_gross_total(payload: &MappedPayload) -> Result<(), SkipReason> {
    let gross: f64 = payload
        .invoice
        .lines
        .iter()
        .map(|line| line_amount(line) * (1.0 + f64::from(line.rate) / 100.0))
        .sum();
    let gross = round2(gross);

    let total = payload
        .invoice
        .total
        .as_deref()
        .and_then(format::parse_amount)
        .unwrap_or(0.0);

    let diff = (gross - total).abs();
    let percent = if total != 0.0 {
        diff / total.abs() * 100.0
    } else {
        0.0
    };

    if percent > RELATIVE_TOLERANCE_PERCENT && diff > ABS_TOLERANCE {
        return Err(SkipReason::GrossTotalMismatch {
            sum: gross,
            total,
            diff: round2(diff),
            percent: round2(percent),
        });
    }
    Ok(())
}

fn line_amount(line: &VatLine) -> f64 {
    format::parse_amount(&line.amount).unwrap_or(0.0)
}

fn round2(value: f64) -> f64 {
    (value * 100.0).round() / 100.0
}
