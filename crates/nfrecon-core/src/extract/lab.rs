//! Lab report extraction.
//!
//! Lab reports are spreadsheet exports with no fixed layout, so each field
//! is a line rule: the first line (top to bottom) the rule accepts supplies
//! the value. Rules are independent of one another.

use tracing::debug;

use crate::models::record::LabRecord;

use super::expiry::ExpiryCalculator;
use super::patterns::{
    DATE_DMY, FIELD_SEPARATOR, INVOICE_DIGITS, INVOICE_KEYWORD, NUMERIC_FIELD, PLATE,
    PRODUCT_KEYWORD, SEAL_KEYWORD, SEAL_LABEL,
};
use super::{DocumentExtractor, Result};

/// A rule reading one field from one line.
pub type LineRule = fn(&str) -> Option<String>;

fn invoice_reference(line: &str) -> Option<String> {
    if !INVOICE_KEYWORD.is_match(line) {
        return None;
    }
    INVOICE_DIGITS.find(line).map(|m| m.as_str().to_string())
}

fn plate(line: &str) -> Option<String> {
    PLATE.find(line).map(|m| m.as_str().to_uppercase())
}

fn product_code(line: &str) -> Option<String> {
    if !PRODUCT_KEYWORD.is_match(line) {
        return None;
    }
    FIELD_SEPARATOR
        .split(line)
        .map(str::trim)
        .find(|field| NUMERIC_FIELD.is_match(field))
        .map(str::to_string)
}

fn production_date(line: &str) -> Option<String> {
    DATE_DMY.find(line).map(|m| m.as_str().to_string())
}

fn seals(line: &str) -> Option<String> {
    if !SEAL_KEYWORD.is_match(line) {
        return None;
    }
    SEAL_LABEL.captures(line).map(|caps| caps[1].trim().to_string())
}

/// Value from the first line `rule` accepts, or empty.
fn first_line_match(lines: &[&str], rule: LineRule) -> String {
    lines.iter().find_map(|line| rule(line)).unwrap_or_default()
}

/// Non-empty lines with surrounding whitespace (and `\r`) removed.
fn report_lines(text: &str) -> Vec<&str> {
    text.split('\n')
        .map(str::trim)
        .filter(|line| !line.is_empty())
        .collect()
}

/// Extracts a [`LabRecord`] from a delimited lab report.
#[derive(Debug, Clone, Default)]
pub struct LabReportExtractor {
    expiry: ExpiryCalculator,
}

impl LabReportExtractor {
    /// Create an extractor with the standard shelf-life table.
    pub fn new() -> Self {
        Self::default()
    }

    /// Use a custom expiry calculator.
    pub fn with_expiry_calculator(mut self, expiry: ExpiryCalculator) -> Self {
        self.expiry = expiry;
        self
    }
}

impl DocumentExtractor for LabReportExtractor {
    type Output = LabRecord;

    fn try_extract(&self, text: &str) -> Result<LabRecord> {
        let lines = report_lines(text);

        let mut record = LabRecord {
            invoice_number_ref: first_line_match(&lines, invoice_reference),
            plate: first_line_match(&lines, plate),
            production_date: first_line_match(&lines, production_date),
            product_code: first_line_match(&lines, product_code),
            seals: first_line_match(&lines, seals),
            expiry_date: String::new(),
        };
        record.expiry_date = self.expiry.compute(&record.product_code, &record.production_date);

        debug!(
            "Extracted lab report from {} lines: invoice {:?}, product {:?}, expiry {:?}",
            lines.len(),
            record.invoice_number_ref,
            record.product_code,
            record.expiry_date
        );

        Ok(record)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    const REPORT: &str = "Laudo de Analise;;\r\n\
        Nota Fiscal;000123;\r\n\
        Placa;abc-1234;\r\n\
        Produto;223;Creme de leite\r\n\
        Data de Fabricacao;01/01/2024;\r\n\
        Data de Analise;03/01/2024;\r\n\
        Lacres: 12-34;;\r\n";

    #[test]
    fn test_extract_report() {
        let record = LabReportExtractor::new().extract(REPORT);

        assert_eq!(
            record,
            LabRecord {
                invoice_number_ref: "000123".to_string(),
                plate: "ABC-1234".to_string(),
                production_date: "01/01/2024".to_string(),
                product_code: "223".to_string(),
                seals: "12-34".to_string(),
                expiry_date: "29/06/2024".to_string(),
            }
        );
    }

    #[test]
    fn test_invoice_needs_keyword() {
        let record = LabReportExtractor::new().extract("Lote 98765\nNOTA 4321 serie 1\n");
        assert_eq!(record.invoice_number_ref, "4321");
    }

    #[test]
    fn test_product_code_separators() {
        let record = LabReportExtractor::new().extract("Produto,Codigo\nProduto:\t 104 \tIogurte\n");
        assert_eq!(record.product_code, "104");

        let record = LabReportExtractor::new().extract("Produto, 250 ,Queijo");
        assert_eq!(record.product_code, "250");
    }

    #[test]
    fn test_first_match_per_field() {
        let text = "Placa XYZ9876\nPlaca ABC1234\n10/10/2023\n11/11/2023";
        let record = LabReportExtractor::new().extract(text);

        assert_eq!(record.plate, "XYZ9876");
        assert_eq!(record.production_date, "10/10/2023");
    }

    #[test]
    fn test_seals_need_label() {
        let record = LabReportExtractor::new().extract("Lacres;55-66\nLacre: 77-88");
        assert_eq!(record.seals, "77-88");
    }

    #[test]
    fn test_unknown_product_has_no_expiry() {
        let record = LabReportExtractor::new().extract("Produto;999\n01/01/2024");

        assert_eq!(record.product_code, "999");
        assert_eq!(record.production_date, "01/01/2024");
        assert_eq!(record.expiry_date, "");
    }

    #[test]
    fn test_empty_report() {
        assert!(LabReportExtractor::new().extract("").is_empty());
        assert!(LabReportExtractor::new().extract("\r\n\r\n;;;\n").is_empty());
    }
}
