//! Report Configuration
//!
//! Presentation settings for reports and exports. Every field has a default,
//! so an empty TOML document is a valid configuration.
//!
//! ```toml
//! segmentation = "equal-split"
//!
//! [currency]
//! symbol = "R$"
//! decimal_separator = ","
//! thousands_separator = "."
//!
//! [csv]
//! delimiter = ","
//! include_bom = true
//! ```

use rust_decimal::{Decimal, RoundingStrategy};
use serde::{Deserialize, Serialize};
use std::path::Path;
use std::str::FromStr;

use crate::error::{RecurraError, Result};

/// Report configuration
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct ReportConfig {
    /// How revenue is attributed to individual subscriptions
    pub segmentation: SegmentationMode,
    /// Currency formatting for exports and tables
    pub currency: CurrencyFormat,
    /// CSV writer options
    pub csv: CsvOptions,
}

impl ReportConfig {
    /// Parse from TOML text
    pub fn from_toml_str(content: &str) -> Result<Self> {
        toml::from_str(content).map_err(|e| RecurraError::Config(e.to_string()))
    }

    /// Load from a TOML file
    pub fn load(path: impl AsRef<Path>) -> Result<Self> {
        let content = std::fs::read_to_string(path)?;
        Self::from_toml_str(&content)
    }

    /// Serialize to TOML
    pub fn to_toml_string(&self) -> Result<String> {
        toml::to_string_pretty(self).map_err(|e| RecurraError::Config(e.to_string()))
    }
}

/// Per-subscription revenue attribution
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum SegmentationMode {
    /// Total revenue divided evenly across active subscriptions
    #[default]
    EqualSplit,
    /// Each subscription's own projected deliveries
    Projected,
}

impl FromStr for SegmentationMode {
    type Err = RecurraError;

    fn from_str(s: &str) -> Result<Self> {
        match s.trim().to_lowercase().as_str() {
            "equal-split" | "equal_split" | "equal" => Ok(Self::EqualSplit),
            "projected" => Ok(Self::Projected),
            other => Err(RecurraError::InvalidArgument(format!("unknown segmentation mode: {}", other))),
        }
    }
}

/// Locale currency format, two decimal places
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct CurrencyFormat {
    /// Symbol placed before the amount
    pub symbol: String,
    /// Decimal separator
    pub decimal_separator: char,
    /// Thousands separator
    pub thousands_separator: char,
    /// Space between symbol and digits
    pub symbol_spacing: bool,
}

impl Default for CurrencyFormat {
    fn default() -> Self {
        Self {
            symbol: "$".into(),
            decimal_separator: '.',
            thousands_separator: ',',
            symbol_spacing: false,
        }
    }
}

impl CurrencyFormat {
    /// Brazilian real, as used by the storefront dashboards
    pub fn brl() -> Self {
        Self {
            symbol: "R$".into(),
            decimal_separator: ',',
            thousands_separator: '.',
            symbol_spacing: true,
        }
    }

    /// Format `amount`, e.g. `-R$ 1.234,57`
    pub fn format(&self, amount: Decimal) -> String {
        let rounded = amount.round_dp_with_strategy(2, RoundingStrategy::MidpointAwayFromZero);
        let text = format!("{:.2}", rounded.abs());
        let (int_part, frac_part) = text.split_once('.').unwrap_or((text.as_str(), "00"));

        let mut grouped = String::with_capacity(int_part.len() + int_part.len() / 3);
        for (i, ch) in int_part.chars().enumerate() {
            if i > 0 && (int_part.len() - i) % 3 == 0 {
                grouped.push(self.thousands_separator);
            }
            grouped.push(ch);
        }

        let sign = if rounded.is_sign_negative() && !rounded.is_zero() { "-" } else { "" };
        let space = if self.symbol_spacing { " " } else { "" };
        format!("{}{}{}{}{}{}", sign, self.symbol, space, grouped, self.decimal_separator, frac_part)
    }
}

/// CSV writer options
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct CsvOptions {
    /// Field delimiter
    pub delimiter: char,
    /// Prefix output with the UTF-8 byte order mark for spreadsheet apps
    pub include_bom: bool,
}

impl Default for CsvOptions {
    fn default() -> Self {
        Self { delimiter: ',', include_bom: true }
    }
}
