//! Core library for NF-e / lab report reconciliation.
//!
//! This crate provides:
//! - Normalizers for weights, vehicle plates and invoice numbers
//! - NF-e (XML) field extraction with trailer plate and seal heuristics
//! - Lab report (delimited text) field extraction with expiry derivation
//! - Reconciliation of two invoices against one lab report

pub mod error;
pub mod models;
pub mod normalize;
pub mod xml;
pub mod extract;
pub mod reconcile;
pub mod source;

pub use error::{NfreconError, Result};
pub use models::config::NfreconConfig;
pub use models::record::{InvoiceRecord, LabRecord};
pub use models::report::{ComparedField, ComparisonRow, MatchStatus, ProductSummary, Reconciliation};
pub use normalize::{normalize_invoice_number, normalize_plate, normalize_weight, Kilograms, RawWeight};
pub use extract::{DocumentExtractor, ExpiryCalculator, InvoiceExtractor, LabReportExtractor};
pub use reconcile::Reconciler;
pub use source::{FileSource, TextEncoding, TextSource};
