// Copyright (c) 2025 Soumyadip Sarkar.
// All rights reserved.
//
// This source code is licensed under the license found in the
// LICENSE file in the root directory of this source tree.

use std::sync::Once;

use anyhow::{Context, Result};
use chrono::{Datelike, Duration, Local, NaiveDate};
use comfy_table::{presets::UTF8_FULL, Cell, Table};
use rust_decimal::Decimal;

use crate::errors::ValidationError;

static TRACING_INIT: Once = Once::new();

/// Install the global tracing subscriber. Logs go to stderr so that
/// `--json` output on stdout stays machine readable.
pub fn init_tracing() {
    TRACING_INIT.call_once(|| {
        use tracing_subscriber::{fmt, EnvFilter};

        let filter = EnvFilter::try_from_default_env()
            .unwrap_or_else(|_| EnvFilter::new("pokeledger=info"));

        fmt()
            .with_env_filter(filter)
            .with_writer(std::io::stderr)
            .init();
    });
}

pub fn today() -> NaiveDate {
    Local::now().date_naive()
}

pub fn parse_date(s: &str) -> Result<NaiveDate, ValidationError> {
    NaiveDate::parse_from_str(s.trim(), "%Y-%m-%d")
        .map_err(|_| ValidationError::InvalidDate(s.trim().to_string()))
}

pub fn parse_month(s: &str) -> Result<String, ValidationError> {
    let s = s.trim();
    if s.len() != 7 || NaiveDate::parse_from_str(&format!("{}-01", s), "%Y-%m-%d").is_err() {
        return Err(ValidationError::InvalidMonth(s.to_string()));
    }
    Ok(s.to_string())
}

pub fn parse_decimal(s: &str) -> Result<Decimal> {
    s.trim()
        .parse::<Decimal>()
        .with_context(|| format!("Invalid decimal '{}'", s))
}

/// Parse a row id coming from the command line.
pub fn parse_id(s: &str) -> Result<i64, ValidationError> {
    match s.trim().parse::<i64>() {
        Ok(id) if id > 0 => Ok(id),
        _ => Err(ValidationError::InvalidId(s.trim().to_string())),
    }
}

/// Month key ("YYYY-MM") of a calendar date.
pub fn month_key(date: NaiveDate) -> String {
    date.format("%Y-%m").to_string()
}

fn first_of_month(date: NaiveDate) -> NaiveDate {
    // day 1 exists in every month
    date.with_day(1).unwrap_or(date)
}

pub fn previous_month(date: NaiveDate) -> String {
    month_key(first_of_month(date) - Duration::days(1))
}

/// The month of `today` followed by the `count - 1` months before it.
pub fn months_back(today: NaiveDate, count: usize) -> Vec<String> {
    let mut months = Vec::with_capacity(count);
    let mut cursor = first_of_month(today);
    for _ in 0..count {
        months.push(month_key(cursor));
        cursor = first_of_month(cursor - Duration::days(1));
    }
    months
}

pub fn fmt_money(d: &Decimal) -> String {
    format!("€{:.2}", d.round_dp(2))
}

pub fn fmt_pct(d: &Decimal) -> String {
    format!("{:.1}%", d.round_dp(1))
}

/// Signed month-over-month change; anything within 5 points reads as flat.
pub fn fmt_trend(d: &Decimal) -> String {
    if d.abs() < Decimal::from(5) {
        "≈0%".to_string()
    } else if d.is_sign_positive() {
        format!("+{}", fmt_pct(d))
    } else {
        fmt_pct(d)
    }
}

pub fn pretty_table(headers: &[&str], rows: Vec<Vec<String>>) -> Table {
    let mut t = Table::new();
    t.load_preset(UTF8_FULL);
    t.set_header(headers.iter().map(|h| Cell::new(*h)));
    for r in rows {
        t.add_row(r.into_iter().map(Cell::new));
    }
    t
}

pub fn maybe_print_json<T: serde::Serialize>(
    json_flag: bool,
    jsonl_flag: bool,
    v: &T,
) -> Result<bool> {
    if json_flag {
        println!("{}", serde_json::to_string_pretty(v)?);
        return Ok(true);
    }
    if jsonl_flag {
        // If v is an array, stream each element; else stream single line
        let val = serde_json::to_value(v)?;
        if let Some(arr) = val.as_array() {
            for item in arr {
                println!("{}", serde_json::to_string(item)?);
            }
        } else {
            println!("{}", serde_json::to_string(&val)?);
        }
        return Ok(true);
    }
    Ok(false)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn months_back_crosses_year_boundary() {
        let today = NaiveDate::from_ymd_opt(2025, 2, 14).unwrap();
        assert_eq!(months_back(today, 3), vec!["2025-02", "2025-01", "2024-12"]);
        assert_eq!(previous_month(today), "2025-01");
    }

    #[test]
    fn parse_id_rejects_garbage() {
        assert_eq!(parse_id(" 7 "), Ok(7));
        assert!(parse_id("0").is_err());
        assert!(parse_id("abc").is_err());
    }

    #[test]
    fn trend_within_five_points_is_flat() {
        assert_eq!(fmt_trend(&Decimal::new(49, 1)), "≈0%");
        assert_eq!(fmt_trend(&Decimal::new(-49, 1)), "≈0%");
        assert_eq!(fmt_trend(&Decimal::from(5)), "+5.0%");
        assert_eq!(fmt_trend(&Decimal::new(-125, 1)), "-12.5%");
    }

    #[test]
    fn parse_month_requires_year_and_month() {
        assert_eq!(parse_month("2025-08").unwrap(), "2025-08");
        assert!(parse_month("2025-13").is_err());
        assert!(parse_month("2025-8").is_err());
    }
}
