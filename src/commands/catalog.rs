// Copyright (c) 2025 Soumyadip Sarkar.
// All rights reserved.
//
// This source code is licensed under the license found in the
// LICENSE file in the root directory of this source tree.

use crate::models::Pokemon;
use crate::utils::{fmt_money, maybe_print_json, parse_decimal, parse_id, pretty_table};
use anyhow::{Context, Result};
use regex::RegexBuilder;
use rusqlite::{params, Connection, Params, Row};
use rust_decimal::Decimal;
use serde::Serialize;

const POKEMON_COLUMNS: &str = "id, name, generation, collected, price, url";

pub fn handle(conn: &mut Connection, m: &clap::ArgMatches) -> Result<()> {
    match m.subcommand() {
        Some(("list", sub)) => list(conn, sub)?,
        Some(("stats", sub)) => stats(conn, sub)?,
        Some(("search", sub)) => search_cmd(conn, sub)?,
        Some(("collect", sub)) => {
            let id = parse_id(sub.get_one::<String>("id").unwrap())?;
            let collected = !sub.get_flag("undo");
            if set_collected(conn, id, collected)? {
                println!(
                    "#{} marked as {}",
                    id,
                    if collected { "collected" } else { "missing" }
                );
            } else {
                println!("#{} unchanged", id);
            }
        }
        Some(("price", sub)) => {
            let id = parse_id(sub.get_one::<String>("id").unwrap())?;
            let price = parse_decimal(sub.get_one::<String>("price").unwrap())?;
            anyhow::ensure!(!price.is_sign_negative(), "Price must not be negative");
            anyhow::ensure!(set_price(conn, id, price)?, "Pokémon #{} not found", id);
            println!("#{} price set to {}", id, fmt_money(&price));
        }
        Some(("url", sub)) => {
            let id = parse_id(sub.get_one::<String>("id").unwrap())?;
            let url = sub.get_one::<String>("url").unwrap().trim();
            anyhow::ensure!(set_url(conn, id, url)?, "Pokémon #{} not found", id);
            println!("#{} url set to {}", id, url);
        }
        Some(("import", sub)) => crate::commands::importer::import_pokemon(conn, sub)?,
        _ => {}
    }
    Ok(())
}

fn read_pokemon(r: &Row<'_>) -> Result<Pokemon> {
    let price: Option<String> = r.get(4)?;
    let price = match price.filter(|s| !s.is_empty()) {
        Some(s) => Some(
            s.parse::<Decimal>()
                .with_context(|| format!("Invalid price '{}' in catalog", s))?,
        ),
        None => None,
    };
    Ok(Pokemon {
        id: r.get(0)?,
        name: r.get(1)?,
        generation: r.get(2)?,
        collected: r.get(3)?,
        price,
        url: r.get(5)?,
    })
}

fn query_pokemon<P: Params>(conn: &Connection, sql: &str, args: P) -> Result<Vec<Pokemon>> {
    let mut stmt = conn.prepare(sql)?;
    let mut rows = stmt.query(args)?;
    let mut data = Vec::new();
    while let Some(r) = rows.next()? {
        data.push(read_pokemon(r)?);
    }
    Ok(data)
}

pub fn list_generation(conn: &Connection, generation: i64, missing_only: bool) -> Result<Vec<Pokemon>> {
    let mut sql = format!("SELECT {} FROM pokemon WHERE generation=?1", POKEMON_COLUMNS);
    if missing_only {
        sql.push_str(" AND collected=0");
    }
    sql.push_str(" ORDER BY id");
    query_pokemon(conn, &sql, params![generation])
}

/// Sum of the reference prices, items without a price count as zero.
pub fn total_price(items: &[Pokemon]) -> Decimal {
    items.iter().filter_map(|p| p.price).fold(Decimal::ZERO, Decimal::saturating_add)
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct CatalogStats {
    pub total_pokemon: i64,
    pub collected_pokemon: i64,
    pub remaining_pokemon: i64,
}

pub fn database_stats(conn: &Connection) -> Result<CatalogStats> {
    let (total, collected): (i64, i64) = conn.query_row(
        "SELECT COUNT(*), IFNULL(SUM(collected),0) FROM pokemon",
        [],
        |r| Ok((r.get(0)?, r.get(1)?)),
    )?;
    Ok(CatalogStats {
        total_pokemon: total,
        collected_pokemon: collected,
        remaining_pokemon: total - collected,
    })
}

/// Match by National Dex number, or by name as a case-insensitive pattern.
/// A query that is not a valid pattern is matched literally.
pub fn search(conn: &Connection, query: &str) -> Result<Vec<Pokemon>> {
    let query = query.trim();
    let number = query.parse::<i64>().ok();
    let re = RegexBuilder::new(query)
        .case_insensitive(true)
        .build()
        .or_else(|_| {
            RegexBuilder::new(&regex::escape(query))
                .case_insensitive(true)
                .build()
        })?;
    let all = query_pokemon(
        conn,
        &format!("SELECT {} FROM pokemon ORDER BY id", POKEMON_COLUMNS),
        [],
    )?;
    Ok(all
        .into_iter()
        .filter(|p| Some(p.id) == number || re.is_match(&p.name))
        .collect())
}

pub fn set_collected(conn: &Connection, id: i64, collected: bool) -> Result<bool> {
    let n = conn.execute(
        "UPDATE pokemon SET collected=?1 WHERE id=?2 AND collected<>?1",
        params![collected, id],
    )?;
    Ok(n > 0)
}

pub fn set_price(conn: &Connection, id: i64, price: Decimal) -> Result<bool> {
    let n = conn.execute(
        "UPDATE pokemon SET price=?1 WHERE id=?2",
        params![price.to_string(), id],
    )?;
    Ok(n > 0)
}

pub fn set_url(conn: &Connection, id: i64, url: &str) -> Result<bool> {
    let n = conn.execute("UPDATE pokemon SET url=?1 WHERE id=?2", params![url, id])?;
    Ok(n > 0)
}

fn rows_for(items: &[Pokemon]) -> Vec<Vec<String>> {
    items
        .iter()
        .map(|p| {
            vec![
                format!("#{:04}", p.id),
                p.name.clone(),
                if p.collected { "✔".into() } else { String::new() },
                p.price.map(|d| fmt_money(&d)).unwrap_or_default(),
            ]
        })
        .collect()
}

fn list(conn: &Connection, sub: &clap::ArgMatches) -> Result<()> {
    let generation = *sub.get_one::<i64>("generation").unwrap();
    let missing = sub.get_flag("missing");
    let items = list_generation(conn, generation, missing)?;
    if !maybe_print_json(sub.get_flag("json"), sub.get_flag("jsonl"), &items)? {
        println!(
            "{}",
            pretty_table(&["No.", "Name", "Collected", "Price"], rows_for(&items))
        );
        if missing {
            println!("Missing: {} items, {}", items.len(), fmt_money(&total_price(&items)));
        }
    }
    Ok(())
}

fn stats(conn: &Connection, sub: &clap::ArgMatches) -> Result<()> {
    let s = database_stats(conn)?;
    if !maybe_print_json(sub.get_flag("json"), sub.get_flag("jsonl"), &s)? {
        println!(
            "{}",
            pretty_table(
                &["Total", "Collected", "Remaining"],
                vec![vec![
                    s.total_pokemon.to_string(),
                    s.collected_pokemon.to_string(),
                    s.remaining_pokemon.to_string(),
                ]],
            )
        );
    }
    Ok(())
}

fn search_cmd(conn: &Connection, sub: &clap::ArgMatches) -> Result<()> {
    let items = search(conn, sub.get_one::<String>("query").unwrap())?;
    if !maybe_print_json(sub.get_flag("json"), sub.get_flag("jsonl"), &items)? {
        println!(
            "{}",
            pretty_table(&["No.", "Name", "Collected", "Price"], rows_for(&items))
        );
    }
    Ok(())
}
