//! Expiry date derivation from product code and production date.

use std::fmt::Write;

use chrono::{NaiveDate, TimeDelta};
use tracing::{debug, warn};

use crate::models::config::{ShelfLifeConfig, ShelfLifeRule};

/// Maps product codes to shelf lives and computes expiry dates.
#[derive(Debug, Clone)]
pub struct ExpiryCalculator {
    rules: Vec<ShelfLifeRule>,
    date_format: String,
}

impl ExpiryCalculator {
    /// Create a calculator with the standard shelf-life table.
    pub fn new() -> Self {
        Self::from_config(&ShelfLifeConfig::default())
    }

    pub fn from_config(config: &ShelfLifeConfig) -> Self {
        Self {
            rules: config.rules.clone(),
            date_format: config.date_format.clone(),
        }
    }

    /// Shelf life in days for a product code.
    ///
    /// Rules are scanned in table order, so a code listed twice takes the
    /// first shelf life.
    pub fn shelf_life_days(&self, product_code: &str) -> Option<u32> {
        let code: u32 = product_code.trim().parse().ok()?;
        self.rules
            .iter()
            .find(|rule| rule.codes.contains(&code))
            .map(|rule| rule.days)
    }

    /// Expiry date for a product made on `production_date` (`DD/MM/YYYY`).
    ///
    /// Returns an empty string for unknown codes and malformed dates.
    pub fn compute(&self, product_code: &str, production_date: &str) -> String {
        let Some(days) = self.shelf_life_days(product_code) else {
            return String::new();
        };
        let Some(expiry) = add_days(production_date, days) else {
            debug!("Cannot derive expiry from date {:?}", production_date);
            return String::new();
        };

        let mut formatted = String::new();
        if write!(formatted, "{}", expiry.format(&self.date_format)).is_err() {
            warn!("Invalid expiry date format {:?}", self.date_format);
            return String::new();
        }
        formatted
    }
}

impl Default for ExpiryCalculator {
    fn default() -> Self {
        Self::new()
    }
}

/// Expiry date with the standard shelf-life table.
pub fn compute_expiry(product_code: &str, production_date: &str) -> String {
    ExpiryCalculator::new().compute(product_code, production_date)
}

/// Parse `DD/MM/YYYY` and add `days`.
///
/// Out-of-range days and months roll over into the following month or year
/// (`31/02/2024` is read as `02/03/2024`), matching a calendar constructor.
fn add_days(date: &str, days: u32) -> Option<NaiveDate> {
    let parts: Vec<&str> = date.trim().split('/').collect();
    if parts.len() != 3 {
        return None;
    }

    let mut numbers = [0i64; 3];
    for (slot, part) in numbers.iter_mut().zip(&parts) {
        if part.is_empty() || !part.bytes().all(|b| b.is_ascii_digit()) {
            return None;
        }
        *slot = part.parse().ok()?;
    }
    let [day, month, year] = numbers;

    let months = year.checked_mul(12)?.checked_add(month - 1)?;
    let first_of_month = NaiveDate::from_ymd_opt(
        i32::try_from(months.div_euclid(12)).ok()?,
        u32::try_from(months.rem_euclid(12) + 1).ok()?,
        1,
    )?;

    let offset = day.checked_sub(1)?.checked_add(i64::from(days))?;
    first_of_month.checked_add_signed(TimeDelta::try_days(offset)?)
}
