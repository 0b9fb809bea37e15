//! Output formatting

use clap::ValueEnum;
use colored::Colorize;
use rust_decimal::Decimal;
use serde::Serialize;
use tabled::settings::Style;
use tabled::{Table, Tabled};

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum OutputFormat {
    Table,
    Json,
    Yaml,
}

impl OutputFormat {
    /// Format named in a profile, if it is a known one
    pub fn from_profile(name: Option<&str>) -> Option<Self> {
        name.and_then(|n| <Self as ValueEnum>::from_str(n, true).ok())
    }

    /// Print `data` as JSON/YAML, or `rows` as a table
    pub fn print<T: Serialize, R: Tabled>(&self, data: &T, rows: Vec<R>) {
        match self {
            OutputFormat::Json => {
                println!("{}", serde_json::to_string_pretty(data).unwrap_or_default());
            }
            OutputFormat::Yaml => {
                println!("{}", serde_yaml::to_string(data).unwrap_or_default());
            }
            OutputFormat::Table => {
                if rows.is_empty() {
                    println!("{}", "(no rows)".dimmed());
                } else {
                    println!("{}", Table::new(rows).with(Style::rounded()));
                }
            }
        }
    }
}

/// Currency amount, red when negative
pub fn signed(formatted: String, amount: Decimal) -> String {
    if amount.is_sign_negative() && !amount.is_zero() {
        formatted.red().to_string()
    } else {
        formatted
    }
}

/// Section title above a table
pub fn heading(text: &str) {
    println!("{}", text.bold());
}

/// Margin as `12.34%`
pub fn percent(value: Decimal) -> String {
    format!("{:.2}%", value.round_dp(2))
}
