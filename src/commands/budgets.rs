// Copyright (c) AlphaVelocity.
// All rights reserved.
//
// This source code is licensed under the license found in the
// LICENSE file in the root directory of this source tree.

use crate::finance::CategoryBudget;
use crate::models::{BudgetSettings, ExpenseCategory};
use crate::session::Session;
use crate::utils::{
    fmt_money, fmt_pct, maybe_print_json, month_key, parse_decimal, parse_month, pretty_table,
    today,
};
use anyhow::{bail, ensure, Result};

pub fn handle(session: &mut Session, m: &clap::ArgMatches) -> Result<()> {
    match m.subcommand() {
        Some(("show", sub)) => show(session, sub)?,
        Some(("set", sub)) => set(session, sub)?,
        Some(("status", sub)) => status(session, sub)?,
        _ => {}
    }
    Ok(())
}

fn show(session: &Session, sub: &clap::ArgMatches) -> Result<()> {
    let settings = session.budget_settings();
    if !maybe_print_json(sub.get_flag("json"), sub.get_flag("jsonl"), settings)? {
        let mut rows: Vec<Vec<String>> = settings
            .percentages
            .iter()
            .map(|(cat, pct)| vec![cat.display_name().to_string(), fmt_pct(pct)])
            .collect();
        rows.push(vec!["Total".into(), fmt_pct(&settings.percentage_total())]);
        println!("{}", pretty_table(&["Category", "Share of income"], rows));
        println!(
            "Monthly target: {}",
            fmt_money(&settings.monthly_budget_target)
        );
    }
    Ok(())
}

/// Apply the options given on the command line on top of `current`.
pub fn apply_overrides(
    current: &BudgetSettings,
    sub: &clap::ArgMatches,
) -> Result<BudgetSettings> {
    let mut next = current.clone();
    if let Some(t) = sub.get_one::<String>("target") {
        let target = parse_decimal(t)?;
        ensure!(!target.is_sign_negative(), "Target must not be negative");
        next.monthly_budget_target = target;
    }
    for cat in ExpenseCategory::ALL {
        if let Some(p) = sub.get_one::<String>(cat.as_str()) {
            let pct = parse_decimal(p)?;
            ensure!(
                !pct.is_sign_negative(),
                "Percentage for {} must not be negative",
                cat
            );
            *next.percentages.get_mut(cat) = pct;
        }
    }
    Ok(next)
}

fn set(session: &mut Session, sub: &clap::ArgMatches) -> Result<()> {
    let next = apply_overrides(session.budget_settings(), sub)?;
    let total = next.percentage_total();
    if !session.update_budget_settings(next) {
        bail!("Budget settings not saved");
    }
    println!("Budget settings saved (total {})", fmt_pct(&total));
    Ok(())
}

fn status(session: &Session, sub: &clap::ArgMatches) -> Result<()> {
    let month = match sub.get_one::<String>("month") {
        Some(m) => parse_month(m)?,
        None => month_key(today()),
    };
    let overview = session.budget_overview(&month);
    if !maybe_print_json(sub.get_flag("json"), sub.get_flag("jsonl"), &overview)? {
        println!("{}", overview_table(&overview));
    }
    Ok(())
}

fn overview_table(overview: &[CategoryBudget]) -> comfy_table::Table {
    let rows = overview
        .iter()
        .map(|b| {
            vec![
                b.name.to_string(),
                fmt_pct(&b.target_percentage),
                fmt_money(&b.budget),
                fmt_money(&b.spent),
                fmt_pct(&b.percentage_used),
                b.status.label().to_string(),
            ]
        })
        .collect();
    pretty_table(
        &["Category", "Target", "Budget", "Spent", "Used", "Status"],
        rows,
    )
}
