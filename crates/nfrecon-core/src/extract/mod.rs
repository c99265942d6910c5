//! Field extraction for NF-e invoices and lab reports.

pub mod expiry;
pub mod invoice;
pub mod lab;
pub mod patterns;

pub use expiry::{compute_expiry, ExpiryCalculator};
pub use invoice::InvoiceExtractor;
pub use lab::LabReportExtractor;

use tracing::{trace, warn};

use crate::error::ExtractionError;

/// Result type for extraction operations.
pub type Result<T> = std::result::Result<T, ExtractionError>;

/// Trait for best-effort document extractors.
///
/// `try_extract` reports why a document could not be read; `extract` never
/// fails and returns an all-empty record instead.
pub trait DocumentExtractor {
    /// Record produced for one document.
    type Output: Default;

    /// Extract fields, surfacing malformed input as an error.
    fn try_extract(&self, text: &str) -> Result<Self::Output>;

    /// Extract fields, falling back to an empty record on error.
    fn extract(&self, text: &str) -> Self::Output {
        match self.try_extract(text) {
            Ok(record) => record,
            Err(e) => {
                warn!("Extraction failed, using empty record: {}", e);
                Self::Output::default()
            }
        }
    }
}

/// A named heuristic that may resolve a field from a context.
pub struct Strategy<C: ?Sized> {
    /// Name used in logs.
    pub name: &'static str,
    /// Returns `Some` with a non-empty value when the heuristic applies.
    pub run: fn(&C) -> Option<String>,
}

impl<C: ?Sized> Strategy<C> {
    pub const fn new(name: &'static str, run: fn(&C) -> Option<String>) -> Self {
        Self { name, run }
    }
}

/// Try each strategy in order and keep the first non-empty value.
pub fn first_match<C: ?Sized>(strategies: &[Strategy<C>], context: &C) -> Option<String> {
    strategies.iter().find_map(|strategy| {
        let value = (strategy.run)(context).filter(|v| !v.is_empty())?;
        trace!("Strategy {} resolved {:?}", strategy.name, value);
        Some(value)
    })
}
