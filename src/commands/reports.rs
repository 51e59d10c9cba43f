// Copyright (c) AlphaVelocity.
// All rights reserved.
//
// This source code is licensed under the license found in the
// LICENSE file in the root directory of this source tree.

use crate::session::Session;
use crate::utils::{
    fmt_money, fmt_pct, fmt_trend, maybe_print_json, month_key, parse_month, pretty_table, today,
};
use anyhow::{Result, bail};

pub fn handle(session: &mut Session, m: &clap::ArgMatches) -> Result<()> {
    match m.subcommand() {
        Some(("stats", sub)) => stats(session, sub)?,
        Some(("history", sub)) => history(session, sub)?,
        Some(("insights", sub)) => insights(session, sub)?,
        _ => {}
    }
    Ok(())
}

fn stats(session: &Session, sub: &clap::ArgMatches) -> Result<()> {
    let month = match sub.get_one::<String>("month") {
        Some(m) => parse_month(m)?,
        None => month_key(today()),
    };
    let summary = session.financial_stats(&month);
    if !maybe_print_json(sub.get_flag("json"), sub.get_flag("jsonl"), &summary)? {
        let s = &summary.stats;
        let mut rows = vec![
            vec!["Income".to_string(), fmt_money(&s.total_income)],
            vec!["Expenses".to_string(), fmt_money(&s.total_expenses)],
            vec!["Net balance".to_string(), fmt_money(&s.net_balance)],
        ];
        for (cat, amount) in s.expenses_by_category.iter() {
            rows.push(vec![format!("  {}", cat.display_name()), fmt_money(amount)]);
        }
        rows.push(vec![
            "Transactions".to_string(),
            s.transaction_count.to_string(),
        ]);
        println!("{}", pretty_table(&[summary.month.as_str(), "Amount"], rows));
    }
    Ok(())
}

fn history(session: &Session, sub: &clap::ArgMatches) -> Result<()> {
    let months = *sub.get_one::<usize>("months").unwrap();
    let data = session.historical_financial_data(today(), months);
    if !maybe_print_json(sub.get_flag("json"), sub.get_flag("jsonl"), &data)? {
        let rows = data
            .values()
            .rev()
            .map(|h| {
                vec![
                    h.month.clone(),
                    fmt_money(&h.stats.total_income),
                    fmt_money(&h.stats.total_expenses),
                    fmt_money(&h.savings),
                    fmt_pct(&h.expense_percentages.fisse),
                    fmt_pct(&h.expense_percentages.variabili),
                    fmt_pct(&h.expense_percentages.svago),
                    fmt_pct(&h.expense_percentages.risparmi),
                ]
            })
            .collect();
        println!(
            "{}",
            pretty_table(
                &[
                    "Month", "Income", "Expenses", "Savings", "Fixed", "Variable", "Leisure",
                    "Saved",
                ],
                rows,
            )
        );
    }
    Ok(())
}

fn insights(session: &mut Session, sub: &clap::ArgMatches) -> Result<()> {
    let Some(report) = session.spending_insights(today()) else {
        bail!("Spending insights unavailable");
    };
    if !maybe_print_json(sub.get_flag("json"), sub.get_flag("jsonl"), &report)? {
        let t = &report.trends;
        let rows = vec![
            vec![
                "Income".to_string(),
                fmt_money(&report.last_month.total_income),
                fmt_money(&report.current_month.total_income),
                fmt_pct(&t.income),
            ],
            vec![
                "Expenses".to_string(),
                fmt_money(&report.last_month.total_expenses),
                fmt_money(&report.current_month.total_expenses),
                fmt_pct(&t.expenses),
            ],
            vec![
                "Savings".to_string(),
                fmt_money(&report.last_month.net_balance),
                fmt_money(&report.current_month.net_balance),
                fmt_pct(&t.savings),
            ],
        ];
        println!(
            "{}",
            pretty_table(&["", report.comparison_month.as_str(), "This month", "Change"], rows)
        );
        let categories = report
            .category_analysis
            .iter()
            .map(|c| {
                vec![
                    c.name.to_string(),
                    fmt_money(&c.amount),
                    format!("{} (target {}%)", fmt_pct(&c.percentage_of_income), c.target_percentage),
                    fmt_trend(&c.trend),
                    c.status.label().to_string(),
                ]
            })
            .collect();
        println!(
            "{}",
            pretty_table(&["Category", "Amount", "Share of income", "Trend", "Status"], categories)
        );
        for line in &report.insights {
            println!("• {}", line);
        }
    }
    Ok(())
}
