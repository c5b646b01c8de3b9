use std::collections::HashMap;

use expense_sync::config::SyncConfig;
use expense_sync::mapper;
use expense_sync::model::{Expense, Supplier};
use expense_sync::validate::{self, SkipReason};

fn config() -> SyncConfig {
    let mut config = SyncConfig::default();
    config
        .category_ids
        .insert("office".to_string(), "112".to_string());
    config
}

fn supplier() -> Supplier {
    Supplier {
        vat_id: "CZ12345678".to_string(),
        country_code: "CZ".to_string(),
        street: "Dlouha 12".to_string(),
        city: "Praha".to_string(),
        zip: "11000".to_string(),
        registration_id: "12345678".to_string(),
        reverse_charge: false,
    }
}

fn suppliers_from(supplier: Supplier) -> HashMap<String, Supplier> {
    HashMap::from([(supplier.vat_id.clone(), supplier)])
}

fn expense() -> Expense {
    Expense {
        id: "42".to_string(),
        supplier: "Acme s.r.o.".to_string(),
        vat_id: "CZ12345678".to_string(),
        issued: "2025-03-01".to_string(),
        taxable: "2025-03-01".to_string(),
        due: "2025-03-15".to_string(),
        invoice: "FV-2025-001".to_string(),
        vs: "20250001".to_string(),
        category: "office".to_string(),
        base_zero: "1000".to_string(),
        base_reduced: String::new(),
        base_standard: String::new(),
        base_eu: String::new(),
        total: "1000".to_string(),
        imported: String::new(),
    }
}

fn check(expense: &Expense, supplier: Supplier) -> Result<(), SkipReason> {
    let config = config();
    let payload = mapper::map(expense, &suppliers_from(supplier), &config);
    validate::validate(&payload, expense, &config)
}

#[test]
fn accepts_a_complete_domestic_expense() {
    assert_eq!(check(&expense(), supplier()), Ok(()));
}

#[test]
fn missing_required_field_names_the_field() {
    let supplier = Supplier {
        city: String::new(),
        ..supplier()
    };
    let reason = check(&expense(), supplier).expect_err("city is required");
    assert_eq!(
        reason,
        SkipReason::MissingField {
            field: "city".to_string(),
        }
    );
    assert_eq!(reason.to_string(), "Missing data (city)");
}

#[test]
fn missing_issue_date_is_rejected() {
    let expense = Expense {
        issued: String::new(),
        ..expense()
    };
    let reason = check(&expense, supplier()).expect_err("created is required");
    assert_eq!(reason.to_string(), "Missing data (created)");
}

#[test]
fn exempt_fields_may_be_empty() {
    let supplier = Supplier {
        zip: String::new(),
        registration_id: String::new(),
        ..supplier()
    };
    let expense = Expense {
        vs: String::new(),
        ..expense()
    };
    assert_eq!(check(&expense, supplier), Ok(()));
}

#[test]
fn country_identifier_must_match_the_tax_id_prefix() {
    // Czech country code on the supplier row, Slovak tax id.
    let supplier = Supplier {
        vat_id: "SK12345678".to_string(),
        ..supplier()
    };
    let expense = Expense {
        vat_id: "SK12345678".to_string(),
        ..expense()
    };
    let reason = check(&expense, supplier).expect_err("prefixes disagree");
    assert_eq!(
        reason,
        SkipReason::CountryMismatch {
            code: "cz".to_string(),
            prefix: "sk".to_string(),
        }
    );
    assert!(reason.to_string().contains("'cz'"));
    assert!(reason.to_string().contains("'sk'"));
}

#[test]
fn unrecognised_country_identifier_passes_the_country_check() {
    let config = config();
    let mut payload = mapper::map(&expense(), &suppliers_from(supplier()), &config);
    payload.counterparty.country_id = Some("999".to_string());
    assert_eq!(validate::validate(&payload, &expense(), &config), Ok(()));
}

#[test]
fn eu_expense_within_tolerance_is_accepted() {
    let expense = Expense {
        base_eu: "EUR100.00".to_string(),
        base_zero: "2500".to_string(),
        total: "2500".to_string(),
        ..expense()
    };
    assert_eq!(check(&expense, supplier()), Ok(()));
}

#[test]
fn eu_expense_beyond_tolerance_is_rejected() {
    let expense = Expense {
        base_eu: "EUR100.00".to_string(),
        base_zero: "2500".to_string(),
        total: "2510".to_string(),
        ..expense()
    };
    let reason = check(&expense, supplier()).expect_err("difference exceeds 2 units");
    assert_eq!(
        reason,
        SkipReason::EuTotalMismatch {
            base: 2500.0,
            total: 2510.0,
        }
    );
    assert_eq!(reason.to_string(), "Calculation failed (EU) | 2500 != 2510");
}

#[test]
fn eu_check_is_terminal_for_eu_expenses() {
    // The gross recomputation would reject this payload; the EU branch must
    // never reach it.
    let expense = Expense {
        base_eu: "EUR100.00".to_string(),
        base_zero: "2500".to_string(),
        base_standard: "999".to_string(),
        total: "2501".to_string(),
        ..expense()
    };
    assert_eq!(check(&expense, supplier()), Ok(()));
}

#[test]
fn gross_mismatch_beyond_both_thresholds_is_rejected() {
    let expense = Expense {
        base_zero: "950".to_string(),
        total: "1000".to_string(),
        ..expense()
    };
    let reason = check(&expense, supplier()).expect_err("5% and 50 units off");
    assert_eq!(
        reason,
        SkipReason::GrossTotalMismatch {
            sum: 950.0,
            total: 1000.0,
            diff: 50.0,
            percent: 5.0,
        }
    );
    assert_eq!(
        reason.to_string(),
        "Calculation failed | 950 != 1000 | 50 (5%) diff"
    );
}

#[test]
fn gross_within_absolute_tolerance_is_accepted() {
    let expense = Expense {
        base_zero: "999".to_string(),
        total: "1000".to_string(),
        ..expense()
    };
    assert_eq!(check(&expense, supplier()), Ok(()));
}

#[test]
fn gross_within_relative_tolerance_is_accepted() {
    let expense = Expense {
        base_zero: "100000000".to_string(),
        total: "100000003".to_string(),
        ..expense()
    };
    assert_eq!(check(&expense, supplier()), Ok(()));
}

#[test]
fn gross_recomputation_applies_the_vat_rates() {
    let expense = Expense {
        base_zero: "1000".to_string(),
        base_standard: "1000".to_string(),
        total: "2210".to_string(),
        ..expense()
    };
    assert_eq!(check(&expense, supplier()), Ok(()));
}

#[test]
fn validation_is_idempotent() {
    let config = config();
    let expense = Expense {
        base_zero: "950".to_string(),
        total: "1000".to_string(),
        ..expense()
    };
    let payload = mapper::map(&expense, &suppliers_from(supplier()), &config);
    let first = validate::validate(&payload, &expense, &config);
    let second = validate::validate(&payload, &expense, &config);
    assert_eq!(first, second);
}
