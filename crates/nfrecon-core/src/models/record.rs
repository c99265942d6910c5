//! Records produced by the document extractors.
//!
//! Every field is a raw string as found in the source. Missing fields are
//! empty strings, never errors.

use serde::{Deserialize, Serialize};

/// Fields extracted from one NF-e invoice.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct InvoiceRecord {
    /// Invoice number (`nNF`), possibly zero-padded.
    pub invoice_number: String,

    /// Net weight as written (`pesoL`), unit-less or with a unit suffix.
    pub net_weight: String,

    /// Gross weight as written (`pesoB`).
    pub gross_weight: String,

    /// Trailer plate, upper-cased, possibly with dash or `/UF` suffix.
    pub plate: String,

    /// Seal numbers taken from the free-text field.
    pub seals: String,
}

impl InvoiceRecord {
    /// True when no field could be extracted.
    pub fn is_empty(&self) -> bool {
        self.invoice_number.is_empty()
            && self.net_weight.is_empty()
            && self.gross_weight.is_empty()
            && self.plate.is_empty()
            && self.seals.is_empty()
    }
}

/// Fields extracted from the lab report.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct LabRecord {
    /// Invoice number the report refers to.
    pub invoice_number_ref: String,

    /// Vehicle plate recorded by the lab, upper-cased.
    pub plate: String,

    /// Production date, `DD/MM/YYYY`.
    pub production_date: String,

    /// Numeric product code.
    pub product_code: String,

    /// Seal numbers recorded by the lab.
    pub seals: String,

    /// Expiry date derived from product code and production date.
    pub expiry_date: String,
}

impl LabRecord {
    /// True when no field could be extracted.
    pub fn is_empty(&self) -> bool {
        self.invoice_number_ref.is_empty()
            && self.plate.is_empty()
            && self.production_date.is_empty()
            && self.product_code.is_empty()
            && self.seals.is_empty()
            && self.expiry_date.is_empty()
    }
}
