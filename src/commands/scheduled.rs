// Copyright (c) AlphaVelocity.
// All rights reserved.
//
// This source code is licensed under the license found in the
// LICENSE file in the root directory of this source tree.

use crate::commands::transactions::input_from;
use crate::session::Session;
use crate::utils::{fmt_money, maybe_print_json, parse_date, pretty_table, today};
use anyhow::{bail, Result};

pub fn handle(session: &mut Session, m: &clap::ArgMatches) -> Result<()> {
    match m.subcommand() {
        Some(("add", sub)) => {
            let input = input_from(sub);
            let day = *sub.get_one::<u32>("day").unwrap();
            if !session.add_scheduled(&input, day) {
                bail!("Scheduled transaction '{}' not saved", input.description);
            }
            println!("Scheduled '{}' on day {} of every month", input.description, day);
        }
        Some(("list", sub)) => list(session, sub)?,
        Some(("rm", sub)) => {
            let id = sub.get_one::<String>("id").unwrap();
            if !session.deactivate_scheduled(id) {
                bail!("Scheduled transaction {} not found or already inactive", id);
            }
            println!("Deactivated scheduled transaction {}", id);
        }
        Some(("run", sub)) => {
            let day = match sub.get_one::<String>("today") {
                Some(d) => parse_date(d)?,
                None => today(),
            };
            let outcome = session.process_scheduled_transactions(day);
            if !outcome.success {
                bail!(outcome.message);
            }
            println!("{}", outcome.message);
        }
        _ => {}
    }
    Ok(())
}

fn list(session: &Session, sub: &clap::ArgMatches) -> Result<()> {
    let data = session.list_scheduled();
    if !maybe_print_json(sub.get_flag("json"), sub.get_flag("jsonl"), &data)? {
        let rows = data
            .iter()
            .map(|d| {
                vec![
                    d.id.to_string(),
                    d.day_of_month.to_string(),
                    d.kind.as_str().to_string(),
                    d.category.as_str().to_string(),
                    d.description.clone(),
                    fmt_money(&d.amount),
                    d.last_executed_date
                        .map(|d| d.to_string())
                        .unwrap_or_else(|| "never".into()),
                ]
            })
            .collect();
        println!(
            "{}",
            pretty_table(
                &["ID", "Day", "Type", "Category", "Description", "Amount", "Last run"],
                rows,
            )
        );
    }
    Ok(())
}
