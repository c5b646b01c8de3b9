use serde::ser::SerializeMap;
use serde::{Deserialize, Serialize, Serializer};

/// Versioning tag carried by every invoice header.
pub const VERSION_TAG: &str = "basic";

/// Rounding policy tag carried by every payload; rounding always happens at
/// document level.
pub const ROUNDING_POLICY: &str = "document";

/// One expense row awaiting import. Fields hold the raw cell text exactly as
/// read from the sheet; canonicalisation is the formatter's job.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Expense {
    pub id: String,
    /// Supplier display name as entered on the expense row itself.
    pub supplier: String,
    pub vat_id: String,
    pub issued: String,
    pub taxable: String,
    pub due: String,
    /// Invoice document number.
    pub invoice: String,
    /// Payment-reference code.
    pub vs: String,
    pub category: String,
    pub base_zero: String,
    pub base_reduced: String,
    pub base_standard: String,
    /// Currency-prefixed cross-border base, e.g. `EUR100.00`. Empty for
    /// domestic expenses.
    pub base_eu: String,
    pub total: String,
    /// Import marker; empty until the row has been synced.
    pub imported: String,
}

impl Expense {
    /// True once an import marker has been written for this row.
    pub fn is_imported(&self) -> bool {
        !self.imported.trim().is_empty()
    }

    /// True when the expense carries a cross-border base amount.
    pub fn is_eu(&self) -> bool {
        !self.base_eu.is_empty()
    }
}

/// One vendor row, keyed by VAT identifier.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Supplier {
    pub vat_id: String,
    pub country_code: String,
    pub street: String,
    pub city: String,
    pub zip: String,
    pub registration_id: String,
    pub reverse_charge: bool,
}

/// A single (amount, VAT-rate) pair in the invoice header.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct VatLine {
    /// Canonical decimal string, non-negative, at most two fractional digits.
    pub amount: String,
    /// VAT rate in whole percent.
    pub rate: u8,
}

/// Invoice header section of the mapped payload. Optional fields are absent
/// (`None`) when the source cell was empty or failed to canonicalise.
#[derive(Debug, Clone, PartialEq)]
pub struct InvoiceHeader {
    pub name: String,
    pub currency: String,
    pub created: Option<String>,
    pub delivery: Option<String>,
    pub due: Option<String>,
    pub document_number: Option<String>,
    pub category_id: Option<String>,
    pub variable_symbol: Option<String>,
    /// One to three amount/rate pairs; never empty.
    pub lines: Vec<VatLine>,
    pub total: Option<String>,
    pub version: &'static str,
}

/// Extras section of the mapped payload.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct InvoiceExtra {
    pub reverse_charge: bool,
    pub rounding: &'static str,
}

/// Counterparty section of the mapped payload.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Counterparty {
    pub name: Option<String>,
    pub street: Option<String>,
    pub city: Option<String>,
    pub zip: Option<String>,
    pub country_id: Option<String>,
    pub registration_id: Option<String>,
    pub tax_id: Option<String>,
    pub update_addressbook: bool,
}

/// The three-section structure submitted to the remote invoicing service.
/// A fresh value with no aliasing back to the source records.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct MappedPayload {
    pub invoice: InvoiceHeader,
    pub extra: InvoiceExtra,
    pub counterparty: Counterparty,
}

/// Name of the nth amount/vat field on the wire: the first pair is
/// unsuffixed, later pairs carry suffixes `2` and `3`.
pub(crate) fn line_field(base: &str, index: usize) -> String {
    if index == 0 {
        base.to_string()
    } else {
        format!("{base}{}", index + 1)
    }
}

impl Serialize for InvoiceHeader {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let mut map = serializer.serialize_map(None)?;
        map.serialize_entry("name", &self.name)?;
        map.serialize_entry("currency", &self.currency)?;
        map.serialize_entry("created", &self.created)?;
        map.serialize_entry("delivery", &self.delivery)?;
        map.serialize_entry("due", &self.due)?;
        map.serialize_entry("document_number", &self.document_number)?;
        map.serialize_entry("category_id", &self.category_id)?;
        map.serialize_entry("variable_symbol", &self.variable_symbol)?;
        for (index, line) in self.lines.iter().enumerate() {
            map.serialize_entry(&line_field("amount", index), &line.amount)?;
            map.serialize_entry(&line_field("vat", index), &line.rate)?;
        }
        map.serialize_entry("total", &self.total)?;
        map.serialize_entry("version", self.version)?;
        map.end()
    }
}

impl InvoiceHeader {
    /// Field names and values as seen by the completeness check. Amount
    /// fields carry the same suffixes as the wire form.
    pub(crate) fn fields(&self) -> Vec<(String, Option<&str>)> {
        let mut fields = vec![
            ("name".to_string(), Some(self.name.as_str())),
            ("currency".to_string(), Some(self.currency.as_str())),
            ("created".to_string(), self.created.as_deref()),
            ("delivery".to_string(), self.delivery.as_deref()),
            ("due".to_string(), self.due.as_deref()),
            ("document_number".to_string(), self.document_number.as_deref()),
            ("category_id".to_string(), self.category_id.as_deref()),
            ("variable_symbol".to_string(), self.variable_symbol.as_deref()),
        ];
        for (index, line) in self.lines.iter().enumerate() {
            fields.push((line_field("amount", index), Some(line.amount.as_str())));
        }
        fields.push(("total".to_string(), self.total.as_deref()));
        fields.push(("version".to_string(), Some(self.version)));
        fields
    }
}

impl InvoiceExtra {
    pub(crate) fn fields(&self) -> Vec<(String, Option<&str>)> {
        vec![("rounding".to_string(), Some(self.rounding))]
    }
}

impl Counterparty {
    pub(crate) fn fields(&self) -> Vec<(String, Option<&str>)> {
        vec![
            ("name".to_string(), self.name.as_deref()),
            ("street".to_string(), self.street.as_deref()),
            ("city".to_string(), self.city.as_deref()),
            ("zip".to_string(), self.zip.as_deref()),
            ("country_id".to_string(), self.country_id.as_deref()),
            ("registration_id".to_string(), self.registration_id.as_deref()),
            ("tax_id".to_string(), self.tax_id.as_deref()),
        ]
    }
}

/// Opaque response returned by the remote create call; consumed only as
/// input to the follow-up payment call.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct CreateResponse(pub serde_json::Value);
