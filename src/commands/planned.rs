// Copyright (c) AlphaVelocity.
// All rights reserved.
//
// This source code is licensed under the license found in the
// LICENSE file in the root directory of this source tree.

use std::collections::BTreeMap;

use crate::commands::purchases::pokemon_name;
use crate::models::PlannedPurchase;
use crate::utils::{
    fmt_money, maybe_print_json, month_key, parse_date, parse_decimal, parse_id, parse_month,
    pretty_table, today,
};
use anyhow::{Context, Result};
use chrono::NaiveDate;
use rusqlite::{params, Connection};
use rust_decimal::Decimal;
use serde::Serialize;

pub fn handle(conn: &Connection, m: &clap::ArgMatches) -> Result<()> {
    match m.subcommand() {
        Some(("add", sub)) => {
            let pokemon_id = parse_id(sub.get_one::<String>("pokemon-id").unwrap())?;
            let price = parse_decimal(sub.get_one::<String>("price").unwrap())?;
            let date = parse_date(sub.get_one::<String>("date").unwrap())?;
            let id = add_planned(conn, pokemon_id, price, date)?;
            println!("Planned purchase {} of #{} on {}", id, pokemon_id, date);
        }
        Some(("list", sub)) => list(conn, sub)?,
        Some(("cancel", sub)) => {
            let date = parse_date(sub.get_one::<String>("date").unwrap())?;
            if cancel_date(conn, date)? {
                println!("Cancelled planned purchases on {}", date);
            } else {
                println!("No pending purchases on {}", date);
            }
        }
        Some(("complete", sub)) => {
            let date = parse_date(sub.get_one::<String>("date").unwrap())?;
            let total = parse_decimal(sub.get_one::<String>("total").unwrap())?;
            let month = match sub.get_one::<String>("month") {
                Some(m) => parse_month(m)?,
                None => month_key(today()),
            };
            let done = complete_date(conn, date, total, &month)?;
            if done.purchases_created == 0 {
                println!("No pending purchases on {}", date);
            } else {
                println!(
                    "Completed {} purchases at {} each",
                    done.purchases_created,
                    fmt_money(&done.price_per_item)
                );
            }
        }
        Some(("rm", sub)) => {
            let id = parse_id(sub.get_one::<String>("id").unwrap())?;
            if delete_planned(conn, id)? {
                println!("Removed planned purchase {}", id);
            } else {
                println!("Planned purchase {} not found", id);
            }
        }
        Some(("check", sub)) => {
            let pokemon_id = parse_id(sub.get_one::<String>("pokemon-id").unwrap())?;
            if is_planned(conn, pokemon_id)? {
                println!("#{} is already planned", pokemon_id);
            } else {
                println!("#{} is not planned", pokemon_id);
            }
        }
        _ => {}
    }
    Ok(())
}

pub fn add_planned(
    conn: &Connection,
    pokemon_id: i64,
    base_price: Decimal,
    date: NaiveDate,
) -> Result<i64> {
    anyhow::ensure!(!base_price.is_sign_negative(), "Price must not be negative");
    let name = pokemon_name(conn, pokemon_id)?;
    conn.execute(
        "INSERT INTO planned_purchases(pokemon_id, pokemon_name, base_price, planned_date)
         VALUES (?1,?2,?3,?4)",
        params![pokemon_id, name, base_price.to_string(), date.to_string()],
    )?;
    Ok(conn.last_insert_rowid())
}

fn pending_on(conn: &Connection, date: Option<NaiveDate>) -> Result<Vec<PlannedPurchase>> {
    let mut sql = String::from(
        "SELECT id, pokemon_id, pokemon_name, base_price, planned_date, status
         FROM planned_purchases WHERE status='pending'",
    );
    let mut args: Vec<String> = Vec::new();
    if let Some(d) = date {
        sql.push_str(" AND planned_date=?1");
        args.push(d.to_string());
    }
    sql.push_str(" ORDER BY planned_date, id");

    let mut stmt = conn.prepare(&sql)?;
    let mut rows = stmt.query(rusqlite::params_from_iter(args.iter()))?;
    let mut data = Vec::new();
    while let Some(r) = rows.next()? {
        let price: String = r.get(3)?;
        let date: String = r.get(4)?;
        data.push(PlannedPurchase {
            id: r.get(0)?,
            pokemon_id: r.get(1)?,
            pokemon_name: r.get(2)?,
            base_price: price
                .parse::<Decimal>()
                .with_context(|| format!("Invalid price '{}' in planned purchases", price))?,
            planned_date: NaiveDate::parse_from_str(&date, "%Y-%m-%d")
                .with_context(|| format!("Invalid planned date '{}'", date))?,
            status: r.get(5)?,
        });
    }
    Ok(data)
}

/// Pending purchases keyed by planned date, earliest first.
pub fn pending_by_date(conn: &Connection) -> Result<BTreeMap<NaiveDate, Vec<PlannedPurchase>>> {
    let mut grouped: BTreeMap<NaiveDate, Vec<PlannedPurchase>> = BTreeMap::new();
    for p in pending_on(conn, None)? {
        grouped.entry(p.planned_date).or_default().push(p);
    }
    Ok(grouped)
}

pub fn cancel_date(conn: &Connection, date: NaiveDate) -> Result<bool> {
    let n = conn.execute(
        "UPDATE planned_purchases SET status='cancelled', updated_at=datetime('now')
         WHERE planned_date=?1 AND status='pending'",
        params![date.to_string()],
    )?;
    Ok(n > 0)
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Completion {
    pub purchases_created: usize,
    pub price_per_item: Decimal,
}

/// Convert every pending purchase of `date` into a real purchase, splitting
/// `total` evenly. Nothing is written when there is nothing pending.
pub fn complete_date(
    conn: &Connection,
    date: NaiveDate,
    total: Decimal,
    month: &str,
) -> Result<Completion> {
    anyhow::ensure!(!total.is_sign_negative(), "Total must not be negative");
    let pending = pending_on(conn, Some(date))?;
    if pending.is_empty() {
        return Ok(Completion {
            purchases_created: 0,
            price_per_item: Decimal::ZERO,
        });
    }
    let per_item = (total / Decimal::from(pending.len())).round_dp(2);

    let tx = conn.unchecked_transaction()?;
    for p in &pending {
        tx.execute(
            "INSERT INTO purchases(pokemon_id, pokemon_name, final_price, month, was_planned, original_planned_date)
             VALUES (?1,?2,?3,?4,1,?5)",
            params![
                p.pokemon_id,
                p.pokemon_name,
                per_item.to_string(),
                month,
                p.planned_date.to_string()
            ],
        )?;
    }
    tx.execute(
        "UPDATE planned_purchases
         SET status='completed', completion_date=datetime('now'),
             final_price_per_item=?1, total_price=?2, updated_at=datetime('now')
         WHERE planned_date=?3 AND status='pending'",
        params![per_item.to_string(), total.to_string(), date.to_string()],
    )?;
    tx.commit()?;
    tracing::info!(date = %date, count = pending.len(), "completed planned purchases");
    Ok(Completion {
        purchases_created: pending.len(),
        price_per_item: per_item,
    })
}

pub fn delete_planned(conn: &Connection, id: i64) -> Result<bool> {
    let n = conn.execute("DELETE FROM planned_purchases WHERE id=?1", params![id])?;
    Ok(n > 0)
}

pub fn is_planned(conn: &Connection, pokemon_id: i64) -> Result<bool> {
    let n: i64 = conn.query_row(
        "SELECT COUNT(*) FROM planned_purchases WHERE pokemon_id=?1 AND status='pending'",
        params![pokemon_id],
        |r| r.get(0),
    )?;
    Ok(n > 0)
}

fn list(conn: &Connection, sub: &clap::ArgMatches) -> Result<()> {
    let grouped = pending_by_date(conn)?;
    if !maybe_print_json(sub.get_flag("json"), sub.get_flag("jsonl"), &grouped)? {
        let mut rows = Vec::new();
        for (date, items) in &grouped {
            let total = items.iter().map(|p| p.base_price).fold(Decimal::ZERO, Decimal::saturating_add);
            let names: Vec<String> = items
                .iter()
                .map(|p| format!("#{:04} {}", p.pokemon_id, p.pokemon_name))
                .collect();
            rows.push(vec![
                date.to_string(),
                names.join(", "),
                items.len().to_string(),
                fmt_money(&total),
            ]);
        }
        println!(
            "{}",
            pretty_table(&["Date", "Pokémon", "Items", "Expected"], rows)
        );
    }
    Ok(())
}
