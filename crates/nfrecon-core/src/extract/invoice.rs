//! NF-e invoice extraction.
//!
//! Scalar fields are looked up by tag name with aliases. The trailer plate
//! and the seals go through ordered strategy chains because NF-e issuers
//! place them inconsistently: in a second `<placa>`, inside a trailer block,
//! or only in the free-text `<infCpl>` field.

use tracing::debug;

use crate::models::config::InvoiceTagConfig;
use crate::models::record::InvoiceRecord;
use crate::xml::XmlDocument;

use super::patterns::{CARRETA_LABEL, PLATE, PLATE_WITH_STATE, REBOQUE_LABEL, SEAL_LABEL};
use super::{first_match, DocumentExtractor, Result, Strategy};

/// A parsed invoice together with the lookup settings.
pub struct InvoiceDocument<'a> {
    doc: &'a XmlDocument,
    tags: &'a InvoiceTagConfig,
    free_text: String,
}

impl<'a> InvoiceDocument<'a> {
    pub fn new(doc: &'a XmlDocument, tags: &'a InvoiceTagConfig) -> Self {
        Self {
            doc,
            tags,
            free_text: doc.find_text(&tags.free_text_tag),
        }
    }

    /// Contents of the free-text field (`infCpl`).
    pub fn free_text(&self) -> &str {
        &self.free_text
    }
}

/// Plate heuristics, most specific first.
pub fn plate_strategies<'a>() -> [Strategy<InvoiceDocument<'a>>; 6] {
    [
        Strategy::new("second plate tag", second_plate_tag),
        Strategy::new("single plate tag", single_plate_tag),
        Strategy::new("trailer element", trailer_element),
        Strategy::new("carreta label", carreta_label),
        Strategy::new("reboque label", reboque_label),
        Strategy::new("last plate in free text", last_plate_in_free_text),
    ]
}

/// Seal heuristics.
pub fn seal_strategies<'a>() -> [Strategy<InvoiceDocument<'a>>; 1] {
    [Strategy::new("seal label", seal_label)]
}

// With two or more plate tags the first is the tractor, the second the trailer.
fn second_plate_tag(invoice: &InvoiceDocument<'_>) -> Option<String> {
    invoice
        .doc
        .elements_named(&invoice.tags.plate_tag)
        .nth(1)
        .map(|e| e.text().trim().to_string())
}

fn single_plate_tag(invoice: &InvoiceDocument<'_>) -> Option<String> {
    if invoice.doc.elements_named(&invoice.tags.plate_tag).count() > 1 {
        return None;
    }
    Some(invoice.doc.find_text(&invoice.tags.plate_tag))
}

fn trailer_element(invoice: &InvoiceDocument<'_>) -> Option<String> {
    invoice
        .doc
        .elements()
        .iter()
        .filter(|e| {
            let local = e.local_name().to_lowercase();
            invoice.tags.trailer_keywords.iter().any(|k| local.contains(k.as_str()))
        })
        .find_map(|e| PLATE.find(e.text()))
        .map(|m| m.as_str().to_uppercase())
}

fn carreta_label(invoice: &InvoiceDocument<'_>) -> Option<String> {
    CARRETA_LABEL
        .captures(&invoice.free_text)
        .map(|caps| caps[1].to_uppercase())
}

fn reboque_label(invoice: &InvoiceDocument<'_>) -> Option<String> {
    REBOQUE_LABEL
        .captures(&invoice.free_text)
        .map(|caps| caps[1].to_uppercase())
}

// The tractor usually appears before the trailer in free text.
fn last_plate_in_free_text(invoice: &InvoiceDocument<'_>) -> Option<String> {
    PLATE_WITH_STATE
        .find_iter(&invoice.free_text)
        .last()
        .map(|m| m.as_str().to_uppercase())
}

fn seal_label(invoice: &InvoiceDocument<'_>) -> Option<String> {
    SEAL_LABEL
        .captures(&invoice.free_text)
        .map(|caps| caps[1].trim().to_string())
}

/// Extracts an [`InvoiceRecord`] from NF-e XML.
#[derive(Debug, Clone, Default)]
pub struct InvoiceExtractor {
    tags: InvoiceTagConfig,
}

impl InvoiceExtractor {
    /// Create an extractor with the standard NF-e tag names.
    pub fn new() -> Self {
        Self::default()
    }

    /// Use custom tag names.
    pub fn with_tags(mut self, tags: InvoiceTagConfig) -> Self {
        self.tags = tags;
        self
    }

    /// Extract from an already parsed document.
    pub fn extract_document(&self, doc: &XmlDocument) -> InvoiceRecord {
        let tags = &self.tags;
        let invoice = InvoiceDocument::new(doc, tags);

        let record = InvoiceRecord {
            invoice_number: doc.find_first_text(&tags.invoice_number_tags),
            net_weight: doc.find_first_text(&tags.net_weight_tags),
            gross_weight: doc.find_first_text(&tags.gross_weight_tags),
            plate: first_match(&plate_strategies(), &invoice).unwrap_or_default(),
            seals: first_match(&seal_strategies(), &invoice).unwrap_or_default(),
        };

        debug!(
            "Extracted invoice {:?}: plate {:?}, seals {:?}",
            record.invoice_number, record.plate, record.seals
        );

        record
    }
}

impl DocumentExtractor for InvoiceExtractor {
    type Output = InvoiceRecord;

    fn try_extract(&self, text: &str) -> Result<InvoiceRecord> {
        let doc = XmlDocument::parse(text)?;
        Ok(self.extract_document(&doc))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::normalize::normalize_plate;
    use pretty_assertions::assert_eq;

    const FULL_INVOICE: &str = r#"<?xml version="1.0" encoding="UTF-8"?>
<nfeProc xmlns="http://www.portalfiscal.inf.br/nfe" versao="4.00">
  <NFe>
    <infNFe Id="NFe35240112345678000199550010000012341000012345">
      <ide><nNF>0001234</nNF></ide>
      <transp>
        <veicTransp><placa>ABC1234</placa><UF>SP</UF></veicTransp>
        <reboque><placa>XYZ9876</placa><UF>SP</UF></reboque>
        <vol><pesoL>27.5</pesoL><pesoB>28,1</pesoB></vol>
      </transp>
      <infAdic><infCpl>Lacres: 5501-5502 Motorista Jose</infCpl></infAdic>
    </infNFe>
  </NFe>
</nfeProc>"#;

    #[test]
    fn test_extract_full_invoice() {
        let record = InvoiceExtractor::new().try_extract(FULL_INVOICE).unwrap();

        assert_eq!(
            record,
            InvoiceRecord {
                invoice_number: "0001234".to_string(),
                net_weight: "27.5".to_string(),
                gross_weight: "28,1".to_string(),
                plate: "XYZ9876".to_string(),
                seals: "5501-5502".to_string(),
            }
        );
    }

    #[test]
    fn test_second_plate_wins() {
        let xml = "<NFe><placa>ABC1234</placa><placa>XYZ9876</placa></NFe>";
        let record = InvoiceExtractor::new().extract(xml);
        assert_eq!(record.plate, "XYZ9876");
    }

    #[test]
    fn test_single_plate() {
        let xml = "<NFe><veicTransp><placa> ABC1234 </placa></veicTransp></NFe>";
        let record = InvoiceExtractor::new().extract(xml);
        assert_eq!(record.plate, "ABC1234");
    }

    #[test]
    fn test_empty_second_plate_skips_first() {
        let xml = r#"<NFe><placa>ABC1234</placa><placa/>
            <infCpl>Carreta: GHI-1J23</infCpl></NFe>"#;
        let record = InvoiceExtractor::new().extract(xml);
        assert_eq!(record.plate, "GHI-1J23");
    }

    #[test]
    fn test_trailer_element_scan() {
        let xml = r#"<NFe><transp><dadosCarreta>Placa xyz-9k87 UF MG</dadosCarreta></transp>
            <infCpl>Carreta: DEF-5678</infCpl></NFe>"#;
        let record = InvoiceExtractor::new().extract(xml);
        assert_eq!(record.plate, "XYZ-9K87");
    }

    #[test]
    fn test_carreta_label_in_free_text() {
        let xml = r#"<NFe><infAdic><infCpl>Cavalo ABC1234 Carreta: DEF-5678 Lacres: 12-34</infCpl></infAdic></NFe>"#;
        let record = InvoiceExtractor::new().extract(xml);

        assert_eq!(record.plate, "DEF-5678");
        assert_eq!(normalize_plate(&record.plate), "DEF5678");
        assert_eq!(record.seals, "12-34");
    }

    #[test]
    fn test_reboque_label_in_free_text() {
        let xml = r#"<NFe><infCpl>Veiculo ABC1234 reboque jkl2m34/pr</infCpl></NFe>"#;
        let record = InvoiceExtractor::new().extract(xml);
        assert_eq!(record.plate, "JKL2M34/PR");
    }

    #[test]
    fn test_last_plate_in_free_text() {
        let xml = r#"<NFe><infCpl>Placas ABC1234/SP e XYZ9876/SP</infCpl></NFe>"#;
        let record = InvoiceExtractor::new().extract(xml);
        assert_eq!(record.plate, "XYZ9876/SP");
    }

    #[test]
    fn test_invoice_number_aliases() {
        let xml = "<Nota><NFNumero>555</NFNumero><pesoLiquido>1000</pesoLiquido><pesoBruto>1100</pesoBruto></Nota>";
        let record = InvoiceExtractor::new().extract(xml);

        assert_eq!(record.invoice_number, "555");
        assert_eq!(record.net_weight, "1000");
        assert_eq!(record.gross_weight, "1100");
    }

    #[test]
    fn test_missing_fields_are_empty() {
        let record = InvoiceExtractor::new().extract("<NFe><ide/></NFe>");
        assert!(record.is_empty());
    }

    #[test]
    fn test_malformed_document() {
        let extractor = InvoiceExtractor::new();
        let broken = "<NFe><nNF>123</nNF><placa>ABC1234</NFe>";

        assert!(extractor.try_extract(broken).is_err());
        assert_eq!(extractor.extract(broken), InvoiceRecord::default());
    }

    #[test]
    fn test_custom_tags() {
        let tags = InvoiceTagConfig {
            plate_tag: "plate".to_string(),
            free_text_tag: "notes".to_string(),
            ..InvoiceTagConfig::default()
        };
        let xml = "<doc><plate>AAA1111</plate><plate>BBB2222</plate><notes>Lacre: 77</notes></doc>";
        let record = InvoiceExtractor::new().with_tags(tags).extract(xml);

        assert_eq!(record.plate, "BBB2222");
        assert_eq!(record.seals, "77");
    }
}
