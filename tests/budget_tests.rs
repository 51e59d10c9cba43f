// Copyright (c) AlphaVelocity.
// All rights reserved.
//
// This source code is licensed under the license found in the
// LICENSE file in the root directory of this source tree.

use pokeledger::finance::BudgetStatus;
use pokeledger::models::BudgetSettings;
use pokeledger::session::{Session, TransactionInput};
use pokeledger::{cli, commands::budgets, db, store};
use rust_decimal::Decimal;

fn d(s: &str) -> Decimal {
    s.parse().unwrap()
}

fn add(session: &mut Session, kind: &str, category: Option<&str>, amount: &str, date: &str) {
    let input = TransactionInput {
        kind: kind.into(),
        category: category.map(|c| c.to_string()),
        description: "entry".into(),
        amount: amount.into(),
    };
    assert!(session.add_transaction(&input, date));
}

#[test]
fn defaults_when_nothing_is_stored() {
    let conn = db::open_in_memory().unwrap();
    assert!(store::get_budget_settings(&conn).unwrap().is_none());
    let settings = store::load_budget_settings(&conn).unwrap();
    assert_eq!(settings, BudgetSettings::default());
    assert_eq!(settings.monthly_budget_target, d("2500"));
    assert_eq!(settings.percentage_total(), d("100"));
}

#[test]
fn settings_survive_a_new_session() {
    let mut session = Session::open(db::open_in_memory().unwrap());
    let mut settings = BudgetSettings::default();
    settings.percentages.svago = d("10");
    settings.percentages.risparmi = d("20");
    assert!(session.update_budget_settings(settings.clone()));

    session.refresh();
    assert_eq!(session.budget_settings(), &settings);
    assert_eq!(
        store::get_budget_settings(session.conn()).unwrap(),
        Some(settings)
    );
}

#[test]
fn percentages_not_summing_to_100_are_kept() {
    let mut session = Session::open(db::open_in_memory().unwrap());
    let mut settings = BudgetSettings::default();
    settings.percentages.fisse = d("50");
    assert!(session.update_budget_settings(settings));
    assert_eq!(session.budget_settings().percentage_total(), d("110"));
}

#[test]
fn set_merges_options_into_current_settings() {
    let matches = cli::build_cli().get_matches_from([
        "pokeledger",
        "budget",
        "set",
        "--svago",
        "12.5",
        "--target",
        "3000",
    ]);
    let (_, budget_m) = matches.subcommand().unwrap();
    let (_, set_m) = budget_m.subcommand().unwrap();

    let next = budgets::apply_overrides(&BudgetSettings::default(), set_m).unwrap();
    assert_eq!(next.monthly_budget_target, d("3000"));
    assert_eq!(next.percentages.svago, d("12.5"));
    assert_eq!(next.percentages.fisse, d("40"));
    assert_eq!(next.percentages.risparmi, d("15"));
}

#[test]
fn set_rejects_negative_percentages() {
    let matches =
        cli::build_cli().get_matches_from(["pokeledger", "budget", "set", "--fisse=-5"]);
    let (_, budget_m) = matches.subcommand().unwrap();
    let (_, set_m) = budget_m.subcommand().unwrap();
    assert!(budgets::apply_overrides(&BudgetSettings::default(), set_m).is_err());
}

#[test]
fn overview_uses_the_month_income() {
    let mut session = Session::open(db::open_in_memory().unwrap());
    add(&mut session, "income", None, "2000", "2025-05-01");
    add(&mut session, "expense", Some("fisse"), "640", "2025-05-02");
    add(&mut session, "expense", Some("svago"), "301", "2025-05-03");
    add(&mut session, "expense", Some("risparmi"), "300", "2025-05-04");
    add(&mut session, "expense", Some("variabili"), "999", "2025-04-30");

    let overview = session.budget_overview("2025-05");
    let status: Vec<BudgetStatus> = overview.iter().map(|b| b.status).collect();
    assert_eq!(
        status,
        vec![
            BudgetStatus::OnTrack,
            BudgetStatus::OnTrack,
            BudgetStatus::OverBudget,
            BudgetStatus::GoalReached,
        ]
    );
    assert_eq!(overview[0].budget, d("800"));
    assert_eq!(overview[1].spent, Decimal::ZERO);
}

#[test]
fn overview_without_income_has_zero_budgets() {
    let mut session = Session::open(db::open_in_memory().unwrap());
    add(&mut session, "expense", Some("fisse"), "100", "2025-05-02");
    let overview = session.budget_overview("2025-05");
    assert!(overview.iter().all(|b| b.budget.is_zero()));
    assert_eq!(overview[0].status, BudgetStatus::OnTrack);
    assert_eq!(overview[3].status, BudgetStatus::GoalReached);
}

#[test]
fn corrupt_settings_fall_back_to_defaults() {
    let conn = db::open_in_memory().unwrap();
    conn.execute(
        "INSERT INTO settings(key, value) VALUES('budget_settings', 'not json')",
        [],
    )
    .unwrap();
    assert!(store::load_budget_settings(&conn).is_err());
    let session = Session::open(conn);
    assert_eq!(session.budget_settings(), &BudgetSettings::default());
}
