//! Maps one expense row plus the supplier lookup into the three-section
//! payload expected by the invoicing service.

use std::collections::HashMap;

use crate::config::SyncConfig;
use crate::format;
use crate::model::{
    Counterparty, Expense, InvoiceExtra, InvoiceHeader, MappedPayload, ROUNDING_POLICY, Supplier,
    VERSION_TAG, VatLine,
};

/// Builds the payload for a single expense. Supplier-derived fields resolve
/// to absent when the expense's VAT id has no supplier row. The result owns
/// all of its data.
pub fn map(
    expense: &Expense,
    suppliers_by_vat_id: &HashMap<String, Supplier>,
    config: &SyncConfig,
) -> MappedPayload {
    let supplier = if expense.vat_id.is_empty() {
        None
    } else {
        suppliers_by_vat_id.get(&expense.vat_id)
    };

    let currency = if expense.is_eu() {
        currency_prefix(&expense.base_eu)
    } else {
        config.domestic_currency.clone()
    };

    let lines = if expense.is_eu() {
        eu_lines(&expense.base_eu)
    } else {
        domestic_lines(expense, config)
    };

    MappedPayload {
        invoice: InvoiceHeader {
            name: format!("Expense {}", expense.id),
            currency,
            created: normalize_optional(format::format_date(&expense.issued)),
            delivery: normalize_optional(format::format_date(&expense.taxable)),
            due: normalize_optional(format::format_date(&expense.due)),
            document_number: normalize_optional(expense.invoice.clone()),
            category_id: config.category_table().get(&expense.category).cloned(),
            variable_symbol: normalize_optional(expense.vs.clone()),
            lines,
            total: normalize_optional(format::format_amount(&expense.total)),
            version: VERSION_TAG,
        },
        extra: InvoiceExtra {
            reverse_charge: supplier.map(|s| s.reverse_charge).unwrap_or(false),
            rounding: ROUNDING_POLICY,
        },
        counterparty: Counterparty {
            name: normalize_optional(expense.supplier.clone()),
            street: supplier.and_then(|s| normalize_optional(s.street.clone())),
            city: supplier.and_then(|s| normalize_optional(s.city.clone())),
            zip: supplier.and_then(|s| normalize_optional(s.zip.clone())),
            country_id: supplier
                .and_then(|s| config.country_id(&s.country_code))
                .map(str::to_string),
            registration_id: supplier.and_then(|s| normalize_optional(s.registration_id.clone())),
            tax_id: supplier.and_then(|s| normalize_optional(s.vat_id.clone())),
            update_addressbook: true,
        },
    }
}

/// First three characters of the cross-border base, upper-cased.
fn currency_prefix(base_eu: &str) -> String {
    base_eu.chars().take(3).collect::<String>().to_uppercase()
}

/// EU branch: exactly one pair, the cross-border base stripped of its
/// currency prefix, at rate 0. Domestic buckets are never consulted.
fn eu_lines(base_eu: &str) -> Vec<VatLine> {
    let amount = base_eu.get(3..).unwrap_or("");
    vec![VatLine {
        amount: format::format_amount(amount),
        rate: 0,
    }]
}

/// Domestic branch: one pair per non-zero bucket, in the fixed order
/// zero/reduced/standard. All buckets empty or zero collapses to a single
/// explicit zero pair.
fn domestic_lines(expense: &Expense, config: &SyncConfig) -> Vec<VatLine> {
    let buckets = [
        (&expense.base_zero, 0),
        (&expense.base_reduced, config.vat_rates.reduced),
        (&expense.base_standard, config.vat_rates.standard),
    ];

    let mut lines = Vec::new();
    for (raw, rate) in buckets {
        let amount = format::format_amount(raw);
        if amount.is_empty() || amount == "0" {
            continue;
        }
        lines.push(VatLine { amount, rate });
    }

    if lines.is_empty() {
        lines.push(VatLine {
            amount: "0".to_string(),
            rate: 0,
        });
    }
    lines
}

fn normalize_optional(value: String) -> Option<String> {
    let trimmed = value.trim();
    if trimmed.is_empty() {
        None
    } else {
        Some(trimmed.to_string())
    }
}
