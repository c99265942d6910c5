//! Reconciliation of two NF-e invoices against a lab report.

use futures_util::future::join3;
use tracing::{debug, info, warn};

use crate::extract::{DocumentExtractor, ExpiryCalculator, InvoiceExtractor, LabReportExtractor};
use crate::models::config::{NfreconConfig, WeightConfig};
use crate::models::record::{InvoiceRecord, LabRecord};
use crate::models::report::{
    ComparedField, ComparisonRow, MatchStatus, ProductSummary, Reconciliation, NOT_APPLICABLE,
};
use crate::normalize::{normalize_invoice_number, normalize_plate, normalize_weight_with, Kilograms};
use crate::source::{TextEncoding, TextSource};

/// Extracts, normalizes and compares the three documents of a shipment.
#[derive(Debug, Clone, Default)]
pub struct Reconciler {
    invoice: InvoiceExtractor,
    lab: LabReportExtractor,
    weights: WeightConfig,
}

impl Reconciler {
    /// Create a reconciler with default settings.
    pub fn new() -> Self {
        Self::default()
    }

    /// Create a reconciler from a loaded configuration.
    pub fn from_config(config: &NfreconConfig) -> Self {
        Self {
            invoice: InvoiceExtractor::new().with_tags(config.invoice.clone()),
            lab: LabReportExtractor::new()
                .with_expiry_calculator(ExpiryCalculator::from_config(&config.shelf_life)),
            weights: config.weights.clone(),
        }
    }

    /// Reconcile documents already available as text.
    pub fn reconcile(&self, invoice_a: &str, invoice_b: &str, lab_report: &str) -> Reconciliation {
        self.compare(
            self.invoice.extract(invoice_a),
            self.invoice.extract(invoice_b),
            self.lab.extract(lab_report),
        )
    }

    /// Read and extract the three sources concurrently, then reconcile.
    ///
    /// A source that cannot be read contributes an empty record.
    pub async fn reconcile_sources<A, B, L>(
        &self,
        invoice_a: &A,
        invoice_b: &B,
        lab_report: &L,
    ) -> Reconciliation
    where
        A: TextSource + ?Sized,
        B: TextSource + ?Sized,
        L: TextSource + ?Sized,
    {
        let (a, b, lab) = join3(
            self.read_invoice(invoice_a),
            self.read_invoice(invoice_b),
            self.read_lab_report(lab_report),
        )
        .await;

        self.compare(a, b, lab)
    }

    async fn read_invoice<S: TextSource + ?Sized>(&self, source: &S) -> InvoiceRecord {
        match source.read_as_text(TextEncoding::Default).await {
            Ok(text) => self.invoice.extract(&text),
            Err(e) => {
                warn!("Failed to read invoice {}: {}", source.describe(), e);
                InvoiceRecord::default()
            }
        }
    }

    async fn read_lab_report<S: TextSource + ?Sized>(&self, source: &S) -> LabRecord {
        match source.read_as_text(TextEncoding::Utf8).await {
            Ok(text) => self.lab.extract(&text),
            Err(e) => {
                warn!("Failed to read lab report {}: {}", source.describe(), e);
                LabRecord::default()
            }
        }
    }

    /// Compare extracted records and build the report.
    pub fn compare(&self, invoice_a: InvoiceRecord, invoice_b: InvoiceRecord, lab: LabRecord) -> Reconciliation {
        let net_a = normalize_weight_with(&invoice_a.net_weight, &self.weights);
        let net_b = normalize_weight_with(&invoice_b.net_weight, &self.weights);
        let gross_a = normalize_weight_with(&invoice_a.gross_weight, &self.weights);
        let gross_b = normalize_weight_with(&invoice_b.gross_weight, &self.weights);
        let tolerance = self.weights.tolerance;

        let rows = vec![
            invoice_number_row(&invoice_a, &lab),
            weight_row(ComparedField::NetWeight, net_a, net_b, tolerance),
            weight_row(ComparedField::GrossWeight, gross_a, gross_b, tolerance),
            plate_row(&invoice_a, &invoice_b, &lab),
            seal_row(&invoice_a, &invoice_b, &lab),
        ];

        for row in &rows {
            debug!(
                "{}: {} | {} | {} -> {}",
                row.label(),
                row.value_a(),
                row.value_b(),
                row.value_lab(),
                row.status()
            );
        }

        let result = Reconciliation {
            rows,
            product: ProductSummary::from_lab(&lab),
            invoice_a,
            invoice_b,
            lab,
        };

        info!(
            "Reconciled shipment: {} of {} fields ok, {} mismatches",
            result.rows.iter().filter(|r| r.status() == MatchStatus::Ok).count(),
            result.rows.len(),
            result.mismatches()
        );

        result
    }
}

// The second invoice's number is shown as N/A and never compared.
fn invoice_number_row(invoice_a: &InvoiceRecord, lab: &LabRecord) -> ComparisonRow {
    let number_a = normalize_invoice_number(&invoice_a.invoice_number);
    let number_lab = normalize_invoice_number(&lab.invoice_number_ref);

    let status = MatchStatus::from_match(number_a == number_lab);

    ComparisonRow::new(
        ComparedField::InvoiceNumber,
        invoice_a.invoice_number.as_str(),
        NOT_APPLICABLE,
        lab.invoice_number_ref.as_str(),
        status,
    )
}

fn weight_row(field: ComparedField, a: Kilograms, b: Kilograms, tolerance: f64) -> ComparisonRow {
    let status = MatchStatus::from_match(a.approx_eq(b, tolerance));

    ComparisonRow::new(field, display_weight(a), display_weight(b), NOT_APPLICABLE, status)
}

fn display_weight(weight: Kilograms) -> String {
    if weight.is_zero() {
        String::new()
    } else {
        weight.to_string()
    }
}

// Either invoice may be the one whose plate the lab copied. An empty lab
// plate matches an empty invoice plate.
fn plate_row(invoice_a: &InvoiceRecord, invoice_b: &InvoiceRecord, lab: &LabRecord) -> ComparisonRow {
    let plate_a = normalize_plate(&invoice_a.plate);
    let plate_b = normalize_plate(&invoice_b.plate);
    let plate_lab = normalize_plate(&lab.plate);

    let status = MatchStatus::from_match(plate_a == plate_lab || plate_b == plate_lab);

    ComparisonRow::new(ComparedField::TrailerPlate, plate_a, plate_b, plate_lab, status)
}

fn seal_row(invoice_a: &InvoiceRecord, invoice_b: &InvoiceRecord, lab: &LabRecord) -> ComparisonRow {
    let status = if lab.seals.is_empty() {
        MatchStatus::NotApplicable
    } else {
        MatchStatus::from_match(lab.seals == invoice_a.seals || lab.seals == invoice_b.seals)
    };

    ComparisonRow::new(
        ComparedField::Seals,
        invoice_a.seals.as_str(),
        invoice_b.seals.as_str(),
        lab.seals.as_str(),
        status,
    )
}
