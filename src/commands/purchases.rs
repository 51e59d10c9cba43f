// Copyright (c) AlphaVelocity.
// All rights reserved.
//
// This source code is licensed under the license found in the
// LICENSE file in the root directory of this source tree.

use crate::models::Purchase;
use crate::utils::{
    fmt_money, maybe_print_json, month_key, parse_decimal, parse_id, parse_month, pretty_table,
    today,
};
use anyhow::{Context, Result};
use chrono::NaiveDate;
use rusqlite::{params, Connection, OptionalExtension};
use rust_decimal::Decimal;

pub fn handle(conn: &Connection, m: &clap::ArgMatches) -> Result<()> {
    match m.subcommand() {
        Some(("add", sub)) => {
            let pokemon_id = parse_id(sub.get_one::<String>("pokemon-id").unwrap())?;
            let price = parse_decimal(sub.get_one::<String>("price").unwrap())?;
            let month = match sub.get_one::<String>("month") {
                Some(m) => parse_month(m)?,
                None => month_key(today()),
            };
            let id = add_purchase(conn, pokemon_id, price, &month)?;
            println!("Recorded purchase {} of #{} for {}", id, pokemon_id, fmt_money(&price));
        }
        Some(("list", sub)) => list(conn, sub)?,
        Some(("rm", sub)) => {
            let id = parse_id(sub.get_one::<String>("id").unwrap())?;
            if delete_purchase(conn, id)? {
                println!("Removed purchase {}", id);
            } else {
                println!("Purchase {} not found", id);
            }
        }
        Some(("clear", _)) => {
            if delete_all_purchases(conn)? {
                println!("Removed all purchases");
            } else {
                println!("No purchases to remove");
            }
        }
        _ => {}
    }
    Ok(())
}

pub fn pokemon_name(conn: &Connection, pokemon_id: i64) -> Result<String> {
    conn.query_row(
        "SELECT name FROM pokemon WHERE id=?1",
        params![pokemon_id],
        |r| r.get(0),
    )
    .optional()?
    .with_context(|| format!("Pokémon #{} not found", pokemon_id))
}

pub fn add_purchase(conn: &Connection, pokemon_id: i64, price: Decimal, month: &str) -> Result<i64> {
    anyhow::ensure!(!price.is_sign_negative(), "Price must not be negative");
    let name = pokemon_name(conn, pokemon_id)?;
    conn.execute(
        "INSERT INTO purchases(pokemon_id, pokemon_name, final_price, month) VALUES (?1,?2,?3,?4)",
        params![pokemon_id, name, price.to_string(), month],
    )?;
    Ok(conn.last_insert_rowid())
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum PurchaseSort {
    #[default]
    Date,
    PriceAsc,
    PriceDesc,
    PokemonId,
}

impl PurchaseSort {
    pub fn parse(s: &str) -> Self {
        match s.trim() {
            "price-asc" => PurchaseSort::PriceAsc,
            "price-desc" => PurchaseSort::PriceDesc,
            "pokemon-id" => PurchaseSort::PokemonId,
            _ => PurchaseSort::Date,
        }
    }

    fn order_by(&self) -> &'static str {
        match self {
            PurchaseSort::Date => "date DESC, id DESC",
            PurchaseSort::PriceAsc => "CAST(final_price AS REAL) ASC, id",
            PurchaseSort::PriceDesc => "CAST(final_price AS REAL) DESC, id",
            PurchaseSort::PokemonId => "pokemon_id ASC, id",
        }
    }
}

pub fn list_purchases(conn: &Connection, sort: PurchaseSort) -> Result<Vec<Purchase>> {
    let sql = format!(
        "SELECT id, pokemon_id, pokemon_name, final_price, month, date, was_planned, original_planned_date
         FROM purchases ORDER BY {}",
        sort.order_by()
    );
    let mut stmt = conn.prepare(&sql)?;
    let mut rows = stmt.query([])?;
    let mut data = Vec::new();
    while let Some(r) = rows.next()? {
        let price: String = r.get(3)?;
        let planned: Option<String> = r.get(7)?;
        data.push(Purchase {
            id: r.get(0)?,
            pokemon_id: r.get(1)?,
            pokemon_name: r.get(2)?,
            final_price: price
                .parse::<Decimal>()
                .with_context(|| format!("Invalid price '{}' in purchases", price))?,
            month: r.get(4)?,
            date: r.get(5)?,
            was_planned: r.get(6)?,
            original_planned_date: planned
                .map(|d| NaiveDate::parse_from_str(&d, "%Y-%m-%d"))
                .transpose()?,
        });
    }
    Ok(data)
}

pub fn delete_purchase(conn: &Connection, id: i64) -> Result<bool> {
    let n = conn.execute("DELETE FROM purchases WHERE id=?1", params![id])?;
    Ok(n > 0)
}

/// `false` when there was nothing to delete.
pub fn delete_all_purchases(conn: &Connection) -> Result<bool> {
    let n = conn.execute("DELETE FROM purchases", [])?;
    tracing::info!(deleted = n, "deleted all purchases");
    Ok(n > 0)
}

fn list(conn: &Connection, sub: &clap::ArgMatches) -> Result<()> {
    let sort = PurchaseSort::parse(sub.get_one::<String>("sort").unwrap());
    let data = list_purchases(conn, sort)?;
    if !maybe_print_json(sub.get_flag("json"), sub.get_flag("jsonl"), &data)? {
        let total = data.iter().map(|p| p.final_price).fold(Decimal::ZERO, Decimal::saturating_add);
        let rows = data
            .iter()
            .map(|p| {
                vec![
                    p.id.to_string(),
                    format!("#{:04} {}", p.pokemon_id, p.pokemon_name),
                    fmt_money(&p.final_price),
                    p.month.clone(),
                    if p.was_planned { "planned".into() } else { String::new() },
                ]
            })
            .collect();
        println!(
            "{}",
            pretty_table(&["ID", "Pokémon", "Price", "Month", "Source"], rows)
        );
        println!("Total spent: {}", fmt_money(&total));
    }
    Ok(())
}
