// Copyright (c) 2025 Soumyadip Sarkar.
// All rights reserved.
//
// This source code is licensed under the license found in the
// LICENSE file in the root directory of this source tree.

use crate::utils::parse_decimal;
use anyhow::{Context, Result, anyhow};
use csv::ReaderBuilder;
use rusqlite::{Connection, params};

/// Upsert catalog rows from a CSV with header `id,name,generation[,price][,url]`.
/// Existing rows keep their collected flag.
pub fn import_pokemon(conn: &mut Connection, sub: &clap::ArgMatches) -> Result<()> {
    let path = sub.get_one::<String>("path").unwrap().trim();
    let count = import_pokemon_file(conn, path)?;
    println!("Imported {} catalog rows from {}", count, path);
    Ok(())
}

pub fn import_pokemon_file(conn: &mut Connection, path: &str) -> Result<usize> {
    let mut rdr = ReaderBuilder::new()
        .has_headers(true)
        .flexible(true)
        .from_path(path)
        .with_context(|| format!("Open CSV {}", path))?;

    let tx = conn.transaction()?;
    let mut count = 0;
    for (line, result) in rdr.records().enumerate() {
        let rec = result?;
        let id_raw = rec.get(0).context("id missing")?.trim();
        let name = rec.get(1).context("name missing")?.trim();
        let gen_raw = rec.get(2).context("generation missing")?.trim();
        let price_raw = rec.get(3).map(str::trim).filter(|s| !s.is_empty());
        let url = rec.get(4).map(str::trim).filter(|s| !s.is_empty());

        let id = id_raw
            .parse::<i64>()
            .with_context(|| format!("Invalid id '{}' on row {}", id_raw, line + 1))?;
        let generation = gen_raw
            .parse::<i64>()
            .with_context(|| format!("Invalid generation '{}' for {}", gen_raw, name))?;
        if name.is_empty() {
            return Err(anyhow!("Empty name for #{}", id));
        }
        let price = price_raw
            .map(|p| {
                parse_decimal(p).with_context(|| format!("Invalid price '{}' for {}", p, name))
            })
            .transpose()?;

        tx.execute(
            "INSERT INTO pokemon(id, name, generation, price, url) VALUES (?1,?2,?3,?4,?5)
             ON CONFLICT(id) DO UPDATE SET
                name=excluded.name,
                generation=excluded.generation,
                price=COALESCE(excluded.price, pokemon.price),
                url=COALESCE(excluded.url, pokemon.url)",
            params![id, name, generation, price.map(|p| p.to_string()), url],
        )?;
        count += 1;
    }
    tx.commit()?;
    tracing::info!(count, path, "imported catalog");
    Ok(count)
}
