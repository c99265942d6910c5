//! Reconciliation output: comparison rows and the product summary.

use std::fmt;

use serde::{Deserialize, Serialize};

use super::record::{InvoiceRecord, LabRecord};

/// Placeholder shown for values that are missing or not compared.
pub const NOT_APPLICABLE: &str = "N/A";

/// Outcome of comparing one field across the documents.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum MatchStatus {
    /// Values agree.
    #[serde(rename = "ok")]
    Ok,
    /// Values disagree.
    #[serde(rename = "erro")]
    Erro,
    /// Nothing to compare.
    #[serde(rename = "N/A")]
    NotApplicable,
}

impl MatchStatus {
    /// Status for a plain equality check.
    pub fn from_match(matched: bool) -> Self {
        if matched { Self::Ok } else { Self::Erro }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            MatchStatus::Ok => "ok",
            MatchStatus::Erro => "erro",
            MatchStatus::NotApplicable => NOT_APPLICABLE,
        }
    }
}

impl fmt::Display for MatchStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// The five fields of the report, in display order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ComparedField {
    InvoiceNumber,
    NetWeight,
    GrossWeight,
    TrailerPlate,
    Seals,
}

impl ComparedField {
    pub const ALL: [ComparedField; 5] = [
        ComparedField::InvoiceNumber,
        ComparedField::NetWeight,
        ComparedField::GrossWeight,
        ComparedField::TrailerPlate,
        ComparedField::Seals,
    ];

    /// Row label shown to users.
    pub fn label(&self) -> &'static str {
        match self {
            ComparedField::InvoiceNumber => "Invoice Number",
            ComparedField::NetWeight => "Net Weight (kg)",
            ComparedField::GrossWeight => "Gross Weight (kg)",
            ComparedField::TrailerPlate => "Trailer Plate",
            ComparedField::Seals => "Seals",
        }
    }
}

/// One line of the reconciliation table.
///
/// The status is computed by the reconciler when the row is built and the
/// row exposes no way to change it afterwards.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ComparisonRow {
    field: ComparedField,
    label: String,
    value_a: String,
    value_b: String,
    value_lab: String,
    status: MatchStatus,
    /// Reserved column, always empty.
    remarks: String,
}

impl ComparisonRow {
    pub fn new(
        field: ComparedField,
        value_a: impl Into<String>,
        value_b: impl Into<String>,
        value_lab: impl Into<String>,
        status: MatchStatus,
    ) -> Self {
        Self {
            field,
            label: field.label().to_string(),
            value_a: or_not_applicable(value_a.into()),
            value_b: or_not_applicable(value_b.into()),
            value_lab: or_not_applicable(value_lab.into()),
            status,
            remarks: String::new(),
        }
    }

    pub fn field(&self) -> ComparedField {
        self.field
    }

    pub fn label(&self) -> &str {
        &self.label
    }

    /// Value from the first invoice.
    pub fn value_a(&self) -> &str {
        &self.value_a
    }

    /// Value from the second invoice.
    pub fn value_b(&self) -> &str {
        &self.value_b
    }

    /// Value from the lab report.
    pub fn value_lab(&self) -> &str {
        &self.value_lab
    }

    pub fn status(&self) -> MatchStatus {
        self.status
    }

    pub fn remarks(&self) -> &str {
        &self.remarks
    }
}

/// Product information surfaced next to the table.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ProductSummary {
    pub product_code: String,
    pub manufacture_date: String,
    pub expiry_date: String,
    /// Always [`MatchStatus::Ok`]; the summary is informational only.
    pub status: MatchStatus,
}

impl ProductSummary {
    pub fn from_lab(lab: &LabRecord) -> Self {
        Self {
            product_code: or_not_applicable(lab.product_code.clone()),
            manufacture_date: or_not_applicable(lab.production_date.clone()),
            expiry_date: or_not_applicable(lab.expiry_date.clone()),
            status: MatchStatus::Ok,
        }
    }
}

/// Full result of one reconciliation run.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Reconciliation {
    /// Exactly one row per [`ComparedField`], in display order.
    pub rows: Vec<ComparisonRow>,

    /// Product code with manufacture and expiry dates.
    pub product: ProductSummary,

    /// Raw records the rows were computed from.
    pub invoice_a: InvoiceRecord,
    pub invoice_b: InvoiceRecord,
    pub lab: LabRecord,
}

impl Reconciliation {
    /// Row for a given field.
    pub fn row(&self, field: ComparedField) -> Option<&ComparisonRow> {
        self.rows.iter().find(|r| r.field == field)
    }

    /// True when every compared row is `ok`.
    pub fn all_ok(&self) -> bool {
        self.rows.iter().all(|r| r.status == MatchStatus::Ok)
    }

    /// Number of rows with status `erro`.
    pub fn mismatches(&self) -> usize {
        self.rows.iter().filter(|r| r.status == MatchStatus::Erro).count()
    }
}

fn or_not_applicable(value: String) -> String {
    if value.trim().is_empty() {
        NOT_APPLICABLE.to_string()
    } else {
        value
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_status_serializes_as_report_strings() {
        assert_eq!(serde_json::to_string(&MatchStatus::Ok).unwrap(), "\"ok\"");
        assert_eq!(serde_json::to_string(&MatchStatus::Erro).unwrap(), "\"erro\"");
        assert_eq!(
            serde_json::to_string(&MatchStatus::NotApplicable).unwrap(),
            "\"N/A\""
        );
    }

    #[test]
    fn test_row_fills_missing_values() {
        let row = ComparisonRow::new(ComparedField::Seals, "", "12-34", " ", MatchStatus::NotApplicable);

        assert_eq!(row.label(), "Seals");
        assert_eq!(row.value_a(), "N/A");
        assert_eq!(row.value_b(), "12-34");
        assert_eq!(row.value_lab(), "N/A");
        assert_eq!(row.remarks(), "");
    }

    #[test]
    fn test_product_summary_is_always_ok() {
        let summary = ProductSummary::from_lab(&LabRecord::default());

        assert_eq!(summary.product_code, "N/A");
        assert_eq!(summary.manufacture_date, "N/A");
        assert_eq!(summary.expiry_date, "N/A");
        assert_eq!(summary.status, MatchStatus::Ok);
    }
}
