// Copyright (c) AlphaVelocity.
// All rights reserved.
//
// This source code is licensed under the license found in the
// LICENSE file in the root directory of this source tree.

use chrono::NaiveDate;
use pokeledger::commands::doctor;
use pokeledger::models::BudgetSettings;
use pokeledger::session::{Session, TransactionInput};
use pokeledger::db;
use rust_decimal::Decimal;

fn d(s: &str) -> Decimal {
    s.parse().unwrap()
}

fn day(s: &str) -> NaiveDate {
    NaiveDate::parse_from_str(s, "%Y-%m-%d").unwrap()
}

fn input(kind: &str, category: Option<&str>, amount: &str) -> TransactionInput {
    TransactionInput {
        kind: kind.into(),
        category: category.map(|c| c.to_string()),
        description: "entry".into(),
        amount: amount.into(),
    }
}

#[test]
fn history_has_one_entry_per_month() {
    let mut session = Session::open(db::open_in_memory().unwrap());
    assert!(session.add_transaction(&input("income", None, "1000"), "2024-12-15"));
    assert!(session.add_transaction(&input("expense", Some("fisse"), "250"), "2024-12-20"));
    assert!(session.add_transaction(&input("income", None, "50"), "2024-10-01"));

    let history = session.historical_financial_data(day("2025-02-10"), 3);
    let months: Vec<&str> = history.keys().map(|k| k.as_str()).collect();
    assert_eq!(months, vec!["2024-12", "2025-01", "2025-02"]);

    let dec = &history["2024-12"];
    assert_eq!(dec.stats.total_income, d("1000"));
    assert_eq!(dec.savings, d("750"));
    assert_eq!(dec.expense_percentages.fisse, d("25"));
    assert_eq!(history["2025-01"].stats.transaction_count, 0);
}

#[test]
fn stats_for_an_empty_month_are_zero() {
    let session = Session::open(db::open_in_memory().unwrap());
    let summary = session.financial_stats("2031-07");
    assert_eq!(summary.month, "2031-07");
    assert_eq!(summary.stats.total_income, Decimal::ZERO);
    assert_eq!(summary.stats.transaction_count, 0);
}

#[test]
fn insights_are_cached_until_data_changes() {
    let mut session = Session::open(db::open_in_memory().unwrap());
    let today = day("2025-03-15");
    assert!(session.add_transaction(&input("income", None, "800"), "2025-02-01"));
    assert!(session.add_transaction(&input("income", None, "1000"), "2025-03-01"));

    let first = session.spending_insights(today).unwrap();
    assert_eq!(first.comparison_month, "2025-02");
    assert_eq!(first.trends.income, d("25"));

    // a write behind the session's back is not seen until refresh
    session
        .conn()
        .execute(
            "INSERT INTO transactions(type, category, description, amount, date, month)
             VALUES ('income','income','late','200','2025-03-02','2025-03')",
            [],
        )
        .unwrap();
    assert_eq!(session.spending_insights(today).unwrap().trends.income, d("25"));

    session.refresh();
    assert_eq!(session.spending_insights(today).unwrap().trends.income, d("50"));

    assert!(session.add_transaction(&input("income", None, "400"), "2025-03-03"));
    assert_eq!(session.spending_insights(today).unwrap().trends.income, d("100"));
}

#[test]
fn scheduled_run_reports_processed_count() {
    let mut session = Session::open(db::open_in_memory().unwrap());
    assert!(session.add_scheduled(&input("expense", Some("fisse"), "700"), 5));
    assert!(!session.add_scheduled(&input("expense", Some("fisse"), "700"), 40));
    assert_eq!(session.list_scheduled().len(), 1);

    let outcome = session.process_scheduled_transactions(day("2025-03-05"));
    assert!(outcome.success);
    assert_eq!(outcome.processed_count, 1);
    assert_eq!(outcome.message, "Processed 1 scheduled transactions");

    let again = session.process_scheduled_transactions(day("2025-03-05"));
    assert_eq!(again.processed_count, 0);

    let id = session.list_scheduled()[0].id.to_string();
    assert!(session.deactivate_scheduled(&id));
    assert!(session.list_scheduled().is_empty());
}

#[test]
fn doctor_flags_inconsistent_rows() {
    let mut session = Session::open(db::open_in_memory().unwrap());
    assert!(session.add_transaction(&input("expense", Some("svago"), "10"), "2025-03-01"));
    assert!(doctor::find_issues(session.conn()).unwrap().is_empty());

    session
        .conn()
        .execute_batch(
            "INSERT INTO transactions(type, category, description, amount, date, month)
             VALUES ('expense','groceries','old','5','2025-03-02','2025-03');
             INSERT INTO transactions(type, category, description, amount, date, month)
             VALUES ('income','income','shifted','5','2025-03-31','2025-04');",
        )
        .unwrap();
    let mut settings = BudgetSettings::default();
    settings.percentages.svago = d("20");
    assert!(session.update_budget_settings(settings));

    let kinds: Vec<String> = doctor::find_issues(session.conn())
        .unwrap()
        .into_iter()
        .map(|(kind, _)| kind)
        .collect();
    assert_eq!(
        kinds,
        vec!["month_mismatch", "unknown_category", "budget_percentages"]
    );
}

#[test]
fn extreme_stored_amounts_saturate_instead_of_failing() {
    let mut session = Session::open(db::open_in_memory().unwrap());
    session
        .conn()
        .execute_batch(
            "INSERT INTO transactions(type, category, description, amount, date, month)
             VALUES ('income','income','legacy','50000000000000000000000000000','2025-03-01','2025-03');
             INSERT INTO transactions(type, category, description, amount, date, month)
             VALUES ('income','income','legacy','50000000000000000000000000000','2025-03-02','2025-03');",
        )
        .unwrap();

    let summary = session.financial_stats("2025-03");
    assert_eq!(summary.stats.transaction_count, 2);
    assert_eq!(summary.stats.total_income, Decimal::MAX);
    assert_eq!(summary.stats.net_balance, Decimal::MAX);
    assert!(session.budget_overview("2025-03").iter().all(|b| b.spent.is_zero()));

    let report = session.spending_insights(day("2025-04-10")).unwrap();
    assert_eq!(report.trends.income, d("-100"));
}

#[test]
fn tiny_previous_month_does_not_break_insights() {
    let mut session = Session::open(db::open_in_memory().unwrap());
    session
        .conn()
        .execute(
            "INSERT INTO transactions(type, category, description, amount, date, month)
             VALUES ('expense','fisse','legacy','0.0000000000000000000000000001','2025-02-10','2025-02')",
            [],
        )
        .unwrap();
    assert!(session.add_transaction(&input("expense", Some("fisse"), "1"), "2025-03-02"));

    let report = session.spending_insights(day("2025-03-15")).unwrap();
    assert_eq!(report.trends.expenses, Decimal::MAX);
    assert_eq!(report.trends.category_trends.fisse, Decimal::MAX);
    assert!(
        report
            .insights
            .iter()
            .any(|i| i.starts_with("Heads up: Fixed Expenses spending grew by"))
    );
}
