//! Common regex patterns for NF-e and lab report extraction.

use lazy_static::lazy_static;
use regex::Regex;

lazy_static! {
    // Brazilian plate: legacy ABC-1234 and Mercosul ABC1D23
    pub static ref PLATE: Regex = Regex::new(
        r"(?i)[A-Z]{3}-?\d[A-Z0-9]{3}"
    ).unwrap();

    pub static ref PLATE_WITH_STATE: Regex = Regex::new(
        r"(?i)[A-Z]{3}-?\d[A-Z0-9]{3}(?:/[A-Z]{2})?"
    ).unwrap();

    // Labelled trailer plates in infCpl
    pub static ref CARRETA_LABEL: Regex = Regex::new(
        r"(?i)Carreta[:\s]*([A-Z]{3}-?\d[A-Z0-9]{3}(?:/[A-Z]{2})?)"
    ).unwrap();

    pub static ref REBOQUE_LABEL: Regex = Regex::new(
        r"(?i)Reboque[:\s]*([A-Z]{3}-?\d[A-Z0-9]{3}(?:/[A-Z]{2})?)"
    ).unwrap();

    // Seals (lacres)
    pub static ref SEAL_KEYWORD: Regex = Regex::new(
        r"(?i)lacres?"
    ).unwrap();

    pub static ref SEAL_LABEL: Regex = Regex::new(
        r"(?i)Lacres?:\s*([0-9-]+)"
    ).unwrap();

    // Lab report lines
    pub static ref INVOICE_KEYWORD: Regex = Regex::new(
        r"(?i)nota"
    ).unwrap();

    pub static ref INVOICE_DIGITS: Regex = Regex::new(
        r"\d{4,}"
    ).unwrap();

    pub static ref PRODUCT_KEYWORD: Regex = Regex::new(
        r"(?i)produto"
    ).unwrap();

    pub static ref FIELD_SEPARATOR: Regex = Regex::new(
        r"[,;\t]"
    ).unwrap();

    pub static ref NUMERIC_FIELD: Regex = Regex::new(
        r"^\d+$"
    ).unwrap();

    pub static ref DATE_DMY: Regex = Regex::new(
        r"\d{2}/\d{2}/\d{4}"
    ).unwrap();

    // Weight units, stripped in this order from lower-cased input
    pub static ref UNIT_KG: Regex = Regex::new(
        r"kg"
    ).unwrap();

    pub static ref UNIT_KILO: Regex = Regex::new(
        r"kilo"
    ).unwrap();

    pub static ref UNIT_TONNE: Regex = Regex::new(
        r"t\b|tonelada|ton"
    ).unwrap();

    // Leading decimal number, as a lenient float parse would read it
    pub static ref FLOAT_PREFIX: Regex = Regex::new(
        r"^[+-]?(?:\d+\.?\d*|\.\d+)(?:[eE][+-]?\d+)?"
    ).unwrap();

    // Plate normalization
    pub static ref STATE_SUFFIX: Regex = Regex::new(
        r"(?i)/\s*[A-Z]{2}$"
    ).unwrap();

    pub static ref NON_ALPHANUMERIC: Regex = Regex::new(
        r"[^A-Za-z0-9]"
    ).unwrap();
}
