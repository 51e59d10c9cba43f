// Copyright (c) AlphaVelocity.
// All rights reserved.
//
// This source code is licensed under the license found in the
// LICENSE file in the root directory of this source tree.

use crate::store;
use crate::utils::{fmt_pct, pretty_table};
use anyhow::Result;
use rust_decimal::Decimal;
use rusqlite::Connection;

/// `(issue, detail)` pairs, empty when the data is consistent.
pub fn find_issues(conn: &Connection) -> Result<Vec<(String, String)>> {
    let mut issues = Vec::new();

    // 1) month column out of sync with the date
    let mut stmt = conn.prepare(
        "SELECT id, date, month FROM transactions WHERE month <> substr(date,1,7) ORDER BY id",
    )?;
    let mut rows = stmt.query([])?;
    while let Some(r) = rows.next()? {
        let id: i64 = r.get(0)?;
        let date: String = r.get(1)?;
        let month: String = r.get(2)?;
        issues.push((
            "month_mismatch".into(),
            format!("tx {}: date {} month {}", id, date, month),
        ));
    }

    // 2) categories outside the known set
    let mut stmt = conn.prepare(
        "SELECT id, type, category FROM transactions
         WHERE (type='income' AND category<>'income')
            OR (type='expense' AND category NOT IN ('fisse','variabili','svago','risparmi'))
         ORDER BY id",
    )?;
    let mut rows = stmt.query([])?;
    while let Some(r) = rows.next()? {
        let id: i64 = r.get(0)?;
        let kind: String = r.get(1)?;
        let category: String = r.get(2)?;
        issues.push((
            "unknown_category".into(),
            format!("tx {}: {} '{}'", id, kind, category),
        ));
    }

    // 3) budget percentages
    let settings = store::load_budget_settings(conn)?;
    let total = settings.percentage_total();
    if total != Decimal::ONE_HUNDRED {
        issues.push(("budget_percentages".into(), format!("sum to {}", fmt_pct(&total))));
    }

    Ok(issues)
}

pub fn handle(conn: &Connection) -> Result<()> {
    let issues = find_issues(conn)?;
    if issues.is_empty() {
        println!("✅ doctor: no issues found");
    } else {
        let rows = issues.into_iter().map(|(i, d)| vec![i, d]).collect();
        println!("{}", pretty_table(&["Issue", "Detail"], rows));
    }
    Ok(())
}
