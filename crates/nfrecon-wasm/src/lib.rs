//! WASM bindings for NF-e / lab report reconciliation.
//!
//! This crate provides WebAssembly bindings for use in browsers. Files picked
//! by the user are read through [`BlobSource`], so the whole pipeline runs
//! client-side.

use std::io;

use serde::Serialize;
use wasm_bindgen::prelude::*;
use wasm_bindgen_futures::JsFuture;
use web_sys::{Blob, File};

use nfrecon_core::source::decode_text;
use nfrecon_core::{
    DocumentExtractor, InvoiceExtractor, Kilograms, LabReportExtractor, NfreconConfig, Reconciler,
    TextEncoding, TextSource,
};

/// Initialize panic hook for better error messages in console.
#[wasm_bindgen(start)]
pub fn init() {
    #[cfg(feature = "console_error_panic_hook")]
    console_error_panic_hook::set_once();
}

/// Version information.
#[wasm_bindgen]
pub fn version() -> String {
    env!("CARGO_PKG_VERSION").to_string()
}

fn to_js<T: Serialize>(value: &T) -> Result<JsValue, JsValue> {
    serde_wasm_bindgen::to_value(value).map_err(|e| JsValue::from_str(&e.to_string()))
}

/// A browser `Blob` (or `File`) read as text.
pub struct BlobSource {
    blob: Blob,
    name: String,
}

impl BlobSource {
    pub fn new(blob: Blob, name: impl Into<String>) -> Self {
        Self {
            blob,
            name: name.into(),
        }
    }

    pub fn from_file(file: &File) -> Self {
        Self::new(Blob::clone(file), file.name())
    }
}

impl TextSource for BlobSource {
    async fn read_as_text(&self, encoding: TextEncoding) -> io::Result<String> {
        let buffer = JsFuture::from(self.blob.array_buffer())
            .await
            .map_err(|e| io::Error::other(format!("{:?}", e)))?;
        let bytes = js_sys::Uint8Array::new(&buffer).to_vec();
        Ok(decode_text(bytes, encoding))
    }

    fn describe(&self) -> String {
        self.name.clone()
    }
}

/// Reconcile two NF-e files against a lab report file.
///
/// Resolves to `{ rows, product, invoice_a, invoice_b, lab }`. Files that
/// cannot be read count as empty documents.
#[wasm_bindgen]
pub async fn compare_files(invoice_a: File, invoice_b: File, lab_report: File) -> Result<JsValue, JsValue> {
    let result = Reconciler::new()
        .reconcile_sources(
            &BlobSource::from_file(&invoice_a),
            &BlobSource::from_file(&invoice_b),
            &BlobSource::from_file(&lab_report),
        )
        .await;

    to_js(&result)
}

/// Reconcile documents already read as text.
#[wasm_bindgen]
pub fn compare_texts(invoice_a: &str, invoice_b: &str, lab_report: &str) -> Result<JsValue, JsValue> {
    to_js(&Reconciler::new().reconcile(invoice_a, invoice_b, lab_report))
}

/// Extract the fields of one NF-e (XML text).
#[wasm_bindgen]
pub fn extract_invoice(text: &str) -> Result<JsValue, JsValue> {
    to_js(&InvoiceExtractor::new().extract(text))
}

/// Extract the fields of one lab report.
#[wasm_bindgen]
pub fn extract_lab_report(text: &str) -> Result<JsValue, JsValue> {
    to_js(&LabReportExtractor::new().extract(text))
}

/// Normalize a weight (string or number) to kilograms.
#[wasm_bindgen]
pub fn normalize_weight(value: JsValue) -> f64 {
    let weight = match (value.as_f64(), value.as_string()) {
        (Some(number), _) => nfrecon_core::normalize_weight(number),
        (None, Some(text)) => nfrecon_core::normalize_weight(text.as_str()),
        (None, None) => Kilograms::ZERO,
    };
    weight.value()
}

/// Normalize a vehicle plate (`abc-1234/sp` -> `ABC1234`).
#[wasm_bindgen]
pub fn normalize_plate(plate: &str) -> String {
    nfrecon_core::normalize_plate(plate)
}

/// Strip leading zeros from an invoice number.
#[wasm_bindgen]
pub fn normalize_invoice_number(number: &str) -> String {
    nfrecon_core::normalize_invoice_number(number)
}

/// Expiry date (`DD/MM/YYYY`) for a product code and production date.
///
/// Empty when the code is unknown or the date is malformed.
#[wasm_bindgen]
pub fn compute_expiry(product_code: &str, production_date: &str) -> String {
    nfrecon_core::extract::compute_expiry(product_code, production_date)
}

/// Reconciler with custom settings, for browser use.
#[wasm_bindgen(js_name = Reconciler)]
pub struct ReconcilerJs {
    inner: Reconciler,
}

#[wasm_bindgen(js_class = Reconciler)]
impl ReconcilerJs {
    /// Create a reconciler; `config` is an optional settings object.
    #[wasm_bindgen(constructor)]
    pub fn new(config: JsValue) -> Result<ReconcilerJs, JsValue> {
        let config: NfreconConfig = if config.is_undefined() || config.is_null() {
            NfreconConfig::default()
        } else {
            serde_wasm_bindgen::from_value(config).map_err(|e| JsValue::from_str(&e.to_string()))?
        };

        Ok(Self {
            inner: Reconciler::from_config(&config),
        })
    }

    /// Reconcile documents already read as text.
    #[wasm_bindgen]
    pub fn compare_texts(&self, invoice_a: &str, invoice_b: &str, lab_report: &str) -> Result<JsValue, JsValue> {
        to_js(&self.inner.reconcile(invoice_a, invoice_b, lab_report))
    }

    /// Reconcile three files; returns a promise.
    #[wasm_bindgen]
    pub fn compare_files(&self, invoice_a: File, invoice_b: File, lab_report: File) -> js_sys::Promise {
        let reconciler = self.inner.clone();

        wasm_bindgen_futures::future_to_promise(async move {
            let result = reconciler
                .reconcile_sources(
                    &BlobSource::from_file(&invoice_a),
                    &BlobSource::from_file(&invoice_b),
                    &BlobSource::from_file(&lab_report),
                )
                .await;
            to_js(&result)
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use nfrecon_core::{MatchStatus, Reconciliation};
    use wasm_bindgen_test::*;

    wasm_bindgen_test_configure!(run_in_browser);

    const INVOICE_A: &str = "<NFe><nNF>000123</nNF><pesoL>27.5</pesoL><pesoB>28.1</pesoB>\
        <placa>ABC1234</placa><placa>XYZ9876</placa><infCpl>Lacres: 12-34</infCpl></NFe>";
    const INVOICE_B: &str = "<NFe><nNF>9</nNF><pesoL>27500</pesoL><pesoB>28100</pesoB></NFe>";
    const LAB: &str = "Nota Fiscal;000123\nPlaca;XYZ-9876\nProduto;223\n01/01/2024\nLacres: 12-34\n";

    fn file(text: &str, name: &str) -> File {
        let parts = js_sys::Array::of1(&JsValue::from_str(text));
        File::new_with_str_sequence(&parts, name).unwrap()
    }

    fn statuses(value: JsValue) -> Vec<MatchStatus> {
        let result: Reconciliation = serde_wasm_bindgen::from_value(value).unwrap();
        result.rows.iter().map(|row| row.status()).collect()
    }

    #[wasm_bindgen_test]
    fn test_normalizers() {
        assert_eq!(normalize_weight(JsValue::from_str("45,2")), 45200.0);
        assert_eq!(normalize_weight(JsValue::from_f64(4520.0)), 4520.0);
        assert_eq!(normalize_weight(JsValue::NULL), 0.0);
        assert_eq!(normalize_plate("abc-1234/sp"), "ABC1234");
        assert_eq!(normalize_invoice_number("00123"), "123");
        assert_eq!(compute_expiry("223", "01/01/2024"), "29/06/2024");
    }

    #[wasm_bindgen_test]
    fn test_compare_texts() {
        let value = compare_texts(INVOICE_A, INVOICE_B, LAB).unwrap();
        assert_eq!(statuses(value), vec![MatchStatus::Ok; 5]);
    }

    #[wasm_bindgen_test]
    fn test_reconciler_with_config() {
        let config = serde_wasm_bindgen::to_value(&tolerant_config()).unwrap();
        let reconciler = ReconcilerJs::new(config).unwrap();
        let value = reconciler.compare_texts(INVOICE_A, INVOICE_B, "Lacres: 55-66").unwrap();

        let result: Reconciliation = serde_wasm_bindgen::from_value(value).unwrap();
        assert_eq!(result.rows[4].status(), MatchStatus::Erro);
    }

    fn tolerant_config() -> NfreconConfig {
        let mut config = NfreconConfig::default();
        config.weights.tolerance = 1.0;
        config
    }

    #[wasm_bindgen_test]
    async fn test_compare_files() {
        let value = compare_files(file(INVOICE_A, "a.xml"), file(INVOICE_B, "b.xml"), file(LAB, "laudo.csv"))
            .await
            .unwrap();
        assert_eq!(statuses(value), vec![MatchStatus::Ok; 5]);
    }

    #[wasm_bindgen_test]
    async fn test_blob_source_name() {
        let source = BlobSource::from_file(&file("x", "nota.xml"));
        assert_eq!(source.describe(), "nota.xml");
        assert_eq!(source.read_as_text(TextEncoding::Utf8).await.unwrap(), "x");
    }
}
