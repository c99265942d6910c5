//! Configuration structures for the reconciliation pipeline.

use serde::{Deserialize, Serialize};
use std::path::Path;

use crate::error::{NfreconError, Result};

/// Main configuration for the nfrecon pipeline.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct NfreconConfig {
    /// NF-e tag lookup configuration.
    pub invoice: InvoiceTagConfig,

    /// Weight normalization and matching.
    pub weights: WeightConfig,

    /// Shelf-life table used to derive expiry dates.
    pub shelf_life: ShelfLifeConfig,
}

/// Tag names the invoice extractor looks up, in priority order.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct InvoiceTagConfig {
    /// Invoice number tag and its aliases.
    pub invoice_number_tags: Vec<String>,

    /// Net weight tag and its aliases.
    pub net_weight_tags: Vec<String>,

    /// Gross weight tag and its aliases.
    pub gross_weight_tags: Vec<String>,

    /// Vehicle plate tag. A second occurrence is taken as the trailer.
    pub plate_tag: String,

    /// Free-text tag searched for labelled plates and seals.
    pub free_text_tag: String,

    /// Element name fragments that mark a trailer block.
    pub trailer_keywords: Vec<String>,
}

impl Default for InvoiceTagConfig {
    fn default() -> Self {
        Self {
            invoice_number_tags: strings(&["nNF", "NFNumero", "numero"]),
            net_weight_tags: strings(&["pesoL", "pesoLiquido"]),
            gross_weight_tags: strings(&["pesoB", "pesoBruto"]),
            plate_tag: "placa".to_string(),
            free_text_tag: "infCpl".to_string(),
            trailer_keywords: strings(&["carreta", "reboque", "trailer", "reboques", "carroceria"]),
        }
    }
}

/// Weight normalization and matching configuration.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct WeightConfig {
    /// Values below this magnitude are taken as tonnes.
    pub tonne_threshold: f64,

    /// Maximum absolute difference (kg) for two weights to match.
    pub tolerance: f64,
}

impl Default for WeightConfig {
    fn default() -> Self {
        Self {
            tonne_threshold: 100.0,
            tolerance: 0.001,
        }
    }
}

/// A shelf life shared by a set of product codes.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ShelfLifeRule {
    /// Days between production and expiry.
    pub days: u32,

    /// Product codes with this shelf life.
    pub codes: Vec<u32>,
}

impl ShelfLifeRule {
    pub fn new(days: u32, codes: &[u32]) -> Self {
        Self {
            days,
            codes: codes.to_vec(),
        }
    }
}

/// Expiry calculation configuration.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ShelfLifeConfig {
    /// Rules in lookup order. The first rule listing a code wins.
    pub rules: Vec<ShelfLifeRule>,

    /// `chrono` format string for computed expiry dates.
    pub date_format: String,
}

impl Default for ShelfLifeConfig {
    fn default() -> Self {
        Self {
            rules: vec![
                ShelfLifeRule::new(180, &[223, 201]),
                ShelfLifeRule::new(7, &[104, 120]),
                ShelfLifeRule::new(15, &[106, 122]),
                ShelfLifeRule::new(60, &[250, 290]),
                ShelfLifeRule::new(365, &[300, 304, 305, 306, 307, 308]),
            ],
            date_format: "%d/%m/%Y".to_string(),
        }
    }
}

impl NfreconConfig {
    /// Load configuration from a JSON file.
    pub fn from_file(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path)?;
        serde_json::from_str(&content)
            .map_err(|e| NfreconError::Config(format!("{}: {}", path.display(), e)))
    }

    /// Save configuration to a JSON file.
    pub fn save(&self, path: &Path) -> Result<()> {
        let content = serde_json::to_string_pretty(self)
            .map_err(|e| NfreconError::Config(e.to_string()))?;
        std::fs::write(path, content)?;
        Ok(())
    }
}

fn strings(values: &[&str]) -> Vec<String> {
    values.iter().map(|s| s.to_string()).collect()
}
