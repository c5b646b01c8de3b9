//! Explicit configuration for a sync pass: the active mode, the static code
//! tables, and the workbook layout. Passed into the mapper, validator, and
//! orchestrator instead of living in globals, so sandbox-versus-production
//! selection is an ordinary, testable parameter.

use std::collections::BTreeMap;
use std::fs;
use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::error::{Result, SyncError};

/// Which side of the invoicing service a pass talks to. Sandbox passes use
/// their own category table and expense sheet.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum PassMode {
    #[default]
    Production,
    Sandbox,
}

/// Domestic VAT rates in whole percent. The zero-rate bucket is always 0.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct VatRates {
    pub reduced: u8,
    pub standard: u8,
}

impl Default for VatRates {
    fn default() -> Self {
        Self {
            reduced: 12,
            standard: 21,
        }
    }
}

/// Configuration for one sync pass. Loadable from a JSON file; every field
/// falls back to its default when omitted.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SyncConfig {
    pub mode: PassMode,
    pub domestic_currency: String,
    pub vat_rates: VatRates,
    pub expenses_sheet: String,
    pub sandbox_expenses_sheet: String,
    pub suppliers_sheet: String,
    /// Lower-case country code → invoicing-service country identifier.
    pub country_ids: BTreeMap<String, String>,
    /// Expense category code → production category identifier.
    pub category_ids: BTreeMap<String, String>,
    /// Expense category code → sandbox category identifier.
    pub sandbox_category_ids: BTreeMap<String, String>,
}

impl Default for SyncConfig {
    fn default() -> Self {
        let country_ids = [
            ("cz", "57"),
            ("sk", "189"),
            ("de", "85"),
            ("at", "14"),
            ("pl", "155"),
        ]
        .into_iter()
        .map(|(code, id)| (code.to_string(), id.to_string()))
        .collect();

        Self {
            mode: PassMode::default(),
            domestic_currency: "CZK".to_string(),
            vat_rates: VatRates::default(),
            expenses_sheet: "Expenses".to_string(),
            sandbox_expenses_sheet: "Expenses (sandbox)".to_string(),
            suppliers_sheet: "Suppliers".to_string(),
            country_ids,
            category_ids: BTreeMap::new(),
            sandbox_category_ids: BTreeMap::new(),
        }
    }
}

impl SyncConfig {
    /// Loads configuration from a JSON file, layering it over the defaults.
    pub fn load(path: &Path) -> Result<Self> {
        let data = fs::read_to_string(path)?;
        let config: Self = serde_json::from_str(&data)?;
        if config.domestic_currency.is_empty() {
            return Err(SyncError::Config(
                "domestic_currency must not be empty".to_string(),
            ));
        }
        Ok(config)
    }

    pub fn is_sandbox(&self) -> bool {
        self.mode == PassMode::Sandbox
    }

    /// Name of the expense sheet read by the active mode.
    pub fn active_expenses_sheet(&self) -> &str {
        match self.mode {
            PassMode::Production => &self.expenses_sheet,
            PassMode::Sandbox => &self.sandbox_expenses_sheet,
        }
    }

    /// Category table selected by the active mode.
    pub fn category_table(&self) -> &BTreeMap<String, String> {
        match self.mode {
            PassMode::Production => &self.category_ids,
            PassMode::Sandbox => &self.sandbox_category_ids,
        }
    }

    /// Country identifier for a country code; the lookup is
    /// case-insensitive.
    pub fn country_id(&self, country_code: &str) -> Option<&str> {
        self.country_ids
            .get(&country_code.to_lowercase())
            .map(String::as_str)
    }

    /// Reverse lookup: the country code registered for an identifier, if
    /// the identifier is known to the table at all.
    pub fn country_code_for(&self, country_id: &str) -> Option<&str> {
        self.country_ids
            .iter()
            .find(|(_, id)| id.as_str() == country_id)
            .map(|(code, _)| code.as_str())
    }
}
