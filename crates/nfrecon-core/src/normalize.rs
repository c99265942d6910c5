//! Normalizers turning raw extracted strings into comparable values.
//!
//! All functions here are total: malformed input maps to zero or an empty
//! string, and feeding a normalized value back in returns it unchanged.

use std::fmt;

use serde::{Deserialize, Serialize};

use crate::extract::patterns::{
    FLOAT_PREFIX, NON_ALPHANUMERIC, STATE_SUFFIX, UNIT_KG, UNIT_KILO, UNIT_TONNE,
};
use crate::models::config::WeightConfig;

/// Decimal places kept after normalization.
const WEIGHT_DECIMALS: i32 = 3;

/// A weight in kilograms, rounded to three decimal places.
#[derive(Debug, Clone, Copy, Default, PartialEq, PartialOrd, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Kilograms(f64);

impl Kilograms {
    pub const ZERO: Kilograms = Kilograms(0.0);

    /// Wrap a kilogram value, rounding it to three decimals.
    pub fn new(value: f64) -> Self {
        if !value.is_finite() {
            return Self::ZERO;
        }
        let scale = 10f64.powi(WEIGHT_DECIMALS);
        Self((value * scale).round() / scale)
    }

    pub fn value(&self) -> f64 {
        self.0
    }

    pub fn is_zero(&self) -> bool {
        self.0 == 0.0
    }

    /// Absolute difference within `tolerance`.
    pub fn approx_eq(&self, other: Kilograms, tolerance: f64) -> bool {
        (self.0 - other.0).abs() <= tolerance
    }
}

impl fmt::Display for Kilograms {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        // Shortest round-trip form: 45200, 45200.5
        write!(f, "{}", self.0)
    }
}

/// Input accepted by [`normalize_weight`].
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum RawWeight<'a> {
    /// Text as found in a document, e.g. `"45,2 t"` or `"4520 kg"`.
    Text(&'a str),
    /// A bare number; unit inference still applies.
    Number(f64),
    /// An already normalized weight.
    Normalized(Kilograms),
}

impl<'a> From<&'a str> for RawWeight<'a> {
    fn from(value: &'a str) -> Self {
        RawWeight::Text(value)
    }
}

impl<'a> From<&'a String> for RawWeight<'a> {
    fn from(value: &'a String) -> Self {
        RawWeight::Text(value.as_str())
    }
}

impl<'a> From<Option<&'a str>> for RawWeight<'a> {
    fn from(value: Option<&'a str>) -> Self {
        RawWeight::Text(value.unwrap_or_default())
    }
}

impl From<f64> for RawWeight<'_> {
    fn from(value: f64) -> Self {
        RawWeight::Number(value)
    }
}

impl From<Kilograms> for RawWeight<'_> {
    fn from(value: Kilograms) -> Self {
        RawWeight::Normalized(value)
    }
}

/// Normalize a weight to kilograms with the default settings.
///
/// Values below 100 are taken to be tonnes: invoices often report
/// `pesoL`/`pesoB` in tonnes without a unit.
pub fn normalize_weight<'a>(raw: impl Into<RawWeight<'a>>) -> Kilograms {
    normalize_weight_with(raw, &WeightConfig::default())
}

/// Normalize a weight to kilograms using `config.tonne_threshold`.
pub fn normalize_weight_with<'a>(raw: impl Into<RawWeight<'a>>, config: &WeightConfig) -> Kilograms {
    let number = match raw.into() {
        RawWeight::Normalized(kg) => return kg,
        RawWeight::Number(n) if n.is_finite() => n,
        RawWeight::Number(_) => return Kilograms::ZERO,
        RawWeight::Text(text) => match parse_weight_text(text) {
            Some(n) => n,
            None => return Kilograms::ZERO,
        },
    };

    if number < config.tonne_threshold {
        Kilograms::new(number * 1000.0)
    } else {
        Kilograms::new(number)
    }
}

fn parse_weight_text(text: &str) -> Option<f64> {
    let lowered = text.trim().to_lowercase();
    let stripped = UNIT_KG.replace_all(&lowered, "");
    let stripped = UNIT_KILO.replace_all(&stripped, "");
    let stripped = UNIT_TONNE.replace_all(&stripped, "");
    // Only the first comma is a decimal separator.
    let decimal = stripped.replacen(',', ".", 1);

    let prefix = FLOAT_PREFIX.find(decimal.trim_start())?;
    prefix.as_str().parse::<f64>().ok().filter(|n| n.is_finite())
}

/// Reduce a plate to upper-case ASCII letters and digits.
///
/// A trailing state suffix such as `/SP` is dropped first, so
/// `"abc-1d23/sp"` becomes `"ABC1D23"`.
pub fn normalize_plate(raw: &str) -> String {
    if raw.is_empty() {
        return String::new();
    }
    let without_state = STATE_SUFFIX.replace(raw.trim(), "");
    NON_ALPHANUMERIC
        .replace_all(without_state.trim(), "")
        .to_ascii_uppercase()
}

/// Strip surrounding whitespace and leading zeros from an invoice number.
pub fn normalize_invoice_number(raw: &str) -> String {
    raw.trim_start_matches(|c: char| c == '0' || c.is_whitespace())
        .trim_end()
        .to_string()
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn test_weight_unit_inference() {
        assert_eq!(normalize_weight("45.2").value(), 45200.0);
        assert_eq!(normalize_weight("45,2").value(), 45200.0);
        assert_eq!(normalize_weight("4520 kg").value(), 4520.0);
        assert_eq!(normalize_weight("4520").value(), 4520.0);
    }

    #[test]
    fn test_weight_unit_tokens() {
        assert_eq!(normalize_weight("32 t").value(), 32000.0);
        assert_eq!(normalize_weight("32 ton").value(), 32000.0);
        assert_eq!(normalize_weight("2 Toneladas").value(), 2000.0);
        assert_eq!(normalize_weight("12,5 KILO").value(), 12500.0);
        assert_eq!(normalize_weight("31250.125KG").value(), 31250.125);
    }

    #[test]
    fn test_weight_rounding() {
        assert_eq!(normalize_weight("1234.56789").value(), 1234.568);
        assert_eq!(normalize_weight("12.3456789").value(), 12345.679);
    }

    #[test]
    fn test_weight_fails_soft() {
        assert_eq!(normalize_weight(""), Kilograms::ZERO);
        assert_eq!(normalize_weight("   "), Kilograms::ZERO);
        assert_eq!(normalize_weight("abc"), Kilograms::ZERO);
        assert_eq!(normalize_weight(None::<&str>), Kilograms::ZERO);
        assert_eq!(normalize_weight(f64::NAN), Kilograms::ZERO);
    }

    #[test]
    fn test_weight_leading_number_prefix() {
        // Trailing garbage is ignored like a lenient float parse.
        assert_eq!(normalize_weight("15000 liquido").value(), 15000.0);
        assert_eq!(normalize_weight("1.234,5").value(), 1234.0);
    }

    #[test]
    fn test_weight_numbers() {
        assert_eq!(normalize_weight(45.2).value(), 45200.0);
        assert_eq!(normalize_weight(45200.0).value(), 45200.0);
    }

    #[test]
    fn test_weight_idempotent() {
        for raw in ["45.2", "4520 kg", "0.05", "", "x", "99.9999", "100"] {
            let once = normalize_weight(raw);
            assert_eq!(normalize_weight(once), once, "input {raw:?}");
        }
    }

    #[test]
    fn test_weight_custom_threshold() {
        let config = WeightConfig {
            tonne_threshold: 10.0,
            ..WeightConfig::default()
        };
        assert_eq!(normalize_weight_with("45.2", &config).value(), 45.2);
        assert_eq!(normalize_weight_with("4.5", &config).value(), 4500.0);
    }

    #[test]
    fn test_kilograms_display() {
        assert_eq!(Kilograms::new(45200.0).to_string(), "45200");
        assert_eq!(Kilograms::new(45200.5).to_string(), "45200.5");
    }

    #[test]
    fn test_kilograms_tolerance() {
        let a = Kilograms::new(1000.0);
        assert!(a.approx_eq(Kilograms::new(1000.001), 0.001));
        assert!(!a.approx_eq(Kilograms::new(1000.002), 0.001));
    }

    #[test]
    fn test_plate() {
        assert_eq!(normalize_plate("ABC-1234"), "ABC1234");
        assert_eq!(normalize_plate("abc1d23"), "ABC1D23");
        assert_eq!(normalize_plate("DEF-5678/SP"), "DEF5678");
        assert_eq!(normalize_plate("DEF5678 / mg"), "DEF5678");
        assert_eq!(normalize_plate(" GHI 9J87 "), "GHI9J87");
        assert_eq!(normalize_plate(""), "");
    }

    #[test]
    fn test_plate_idempotent() {
        for raw in ["ABC-1234/SP", "a/b/cd", "xyz 9k87", "", "//", "ÁBC1234"] {
            let once = normalize_plate(raw);
            assert_eq!(normalize_plate(&once), once, "input {raw:?}");
        }
    }

    #[test]
    fn test_invoice_number() {
        assert_eq!(normalize_invoice_number("00123"), "123");
        assert_eq!(normalize_invoice_number("123"), "123");
        assert_eq!(normalize_invoice_number(" 0045 "), "45");
        assert_eq!(normalize_invoice_number("000"), "");
        assert_eq!(normalize_invoice_number(""), "");
        assert_eq!(normalize_invoice_number("0 12"), "12");
        assert_eq!(normalize_invoice_number(" 0 0 7\t"), "7");
    }

    #[test]
    fn test_invoice_number_idempotent() {
        for raw in ["00123", "  007", "", "0", "1200", "0 12", "00 0 340 "] {
            let once = normalize_invoice_number(raw);
            assert_eq!(normalize_invoice_number(&once), once, "input {raw:?}");
        }
    }
}
