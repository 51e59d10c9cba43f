// Copyright (c) 2025 Soumyadip Sarkar.
// All rights reserved.
//
// This source code is licensed under the license found in the
// LICENSE file in the root directory of this source tree.

use crate::models::Transaction;
use crate::session::{Session, TransactionInput};
use crate::store::{CategoryFilter, TransactionFilter, TransactionSort};
use crate::utils::{fmt_money, maybe_print_json, parse_month, pretty_table};
use anyhow::{bail, Result};

pub fn handle(session: &mut Session, m: &clap::ArgMatches) -> Result<()> {
    match m.subcommand() {
        Some(("add", sub)) => add(session, sub)?,
        Some(("list", sub)) => list(session, sub)?,
        Some(("rm", sub)) => {
            let id = sub.get_one::<String>("id").unwrap();
            if !session.delete_transaction(id) {
                bail!("Transaction {} not deleted", id);
            }
            println!("Removed transaction {}", id);
        }
        _ => {}
    }
    Ok(())
}

/// Collect the shared ledger fields of `tx add` and `scheduled add`.
pub fn input_from(sub: &clap::ArgMatches) -> TransactionInput {
    TransactionInput {
        kind: sub.get_one::<String>("type").unwrap().to_string(),
        category: sub.get_one::<String>("category").map(|s| s.to_string()),
        description: sub.get_one::<String>("description").unwrap().to_string(),
        amount: sub.get_one::<String>("amount").unwrap().to_string(),
    }
}

fn add(session: &mut Session, sub: &clap::ArgMatches) -> Result<()> {
    let input = input_from(sub);
    let date = sub.get_one::<String>("date").unwrap();
    if !session.add_transaction(&input, date) {
        bail!("Transaction '{}' not recorded", input.description);
    }
    println!(
        "Recorded {} '{}' of {} on {}",
        input.kind, input.description, input.amount, date
    );
    Ok(())
}

pub fn filter_from(sub: &clap::ArgMatches) -> Result<TransactionFilter> {
    let month = sub
        .get_one::<String>("month")
        .map(|m| parse_month(m))
        .transpose()?;
    let category = match sub.get_one::<String>("category") {
        Some(c) => CategoryFilter::parse(c)?,
        None => None,
    };
    Ok(TransactionFilter { month, category })
}

fn list(session: &Session, sub: &clap::ArgMatches) -> Result<()> {
    let filter = filter_from(sub)?;
    let sort = sub
        .get_one::<String>("sort")
        .and_then(|s| s.parse::<TransactionSort>().ok())
        .unwrap_or_default();
    let mut data = session.list_transactions(&filter, sort);
    if let Some(limit) = sub.get_one::<usize>("limit") {
        data.truncate(*limit);
    }
    if !maybe_print_json(sub.get_flag("json"), sub.get_flag("jsonl"), &data)? {
        println!(
            "{}",
            pretty_table(
                &["ID", "Date", "Type", "Category", "Description", "Amount", "Source"],
                rows_for(&data),
            )
        );
    }
    Ok(())
}

fn rows_for(data: &[Transaction]) -> Vec<Vec<String>> {
    data.iter()
        .map(|t| {
            vec![
                t.id.to_string(),
                t.date.to_string(),
                t.kind.as_str().to_string(),
                t.category.as_str().to_string(),
                t.description.clone(),
                fmt_money(&t.amount),
                if t.is_scheduled {
                    "scheduled".into()
                } else {
                    String::new()
                },
            ]
        })
        .collect()
}
