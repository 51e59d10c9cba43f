// Copyright (c) AlphaVelocity.
// All rights reserved.
//
// This source code is licensed under the license found in the
// LICENSE file in the root directory of this source tree.

use crate::store::{self, TransactionFilter, TransactionSort};
use anyhow::{bail, Result};
use rusqlite::Connection;

pub fn handle(conn: &Connection, m: &clap::ArgMatches) -> Result<()> {
    match m.subcommand() {
        Some(("transactions", sub)) => {
            let fmt = sub.get_one::<String>("format").unwrap();
            let out = sub.get_one::<String>("out").unwrap();
            let count = export_transactions(conn, fmt, out)?;
            println!("Exported {} transactions to {}", count, out);
            Ok(())
        }
        _ => Ok(()),
    }
}

/// Write the whole ledger, oldest first, as `csv` or `json`.
pub fn export_transactions(conn: &Connection, fmt: &str, out: &str) -> Result<usize> {
    let fmt = fmt.trim().to_lowercase();
    if fmt != "csv" && fmt != "json" {
        bail!("Unknown format: {} (use csv|json)", fmt);
    }
    let mut rows = store::find_transactions(conn, &TransactionFilter::default(), TransactionSort::Date)?;
    rows.reverse();

    if fmt == "csv" {
        let mut wtr = csv::Writer::from_path(out)?;
        wtr.write_record([
            "id",
            "date",
            "month",
            "type",
            "category",
            "description",
            "amount",
            "scheduled",
        ])?;
        for t in &rows {
            wtr.write_record([
                t.id.to_string(),
                t.date.to_string(),
                t.month.clone(),
                t.kind.as_str().to_string(),
                t.category.as_str().to_string(),
                t.description.clone(),
                t.amount.to_string(),
                t.is_scheduled.to_string(),
            ])?;
        }
        wtr.flush()?;
    } else {
        std::fs::write(out, serde_json::to_string_pretty(&rows)?)?;
    }
    tracing::info!(count = rows.len(), format = %fmt, out, "exported transactions");
    Ok(rows.len())
}
