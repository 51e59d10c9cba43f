// Copyright (c) AlphaVelocity.
// All rights reserved.
//
// This source code is licensed under the license found in the
// LICENSE file in the root directory of this source tree.

use pokeledger::session::{Session, TransactionInput};
use pokeledger::store::{CategoryFilter, TransactionFilter, TransactionSort};
use pokeledger::errors::ValidationError;
use pokeledger::models::{ExpenseCategory, NewScheduled, NewTransaction, TxKind};
use chrono::NaiveDate;
use rust_decimal::Decimal;
use pokeledger::{cli, commands::transactions, db};

fn input(kind: &str, category: Option<&str>, desc: &str, amount: &str) -> TransactionInput {
    TransactionInput {
        kind: kind.into(),
        category: category.map(|c| c.to_string()),
        description: desc.into(),
        amount: amount.into(),
    }
}

fn setup() -> Session {
    let mut session = Session::open(db::open_in_memory().unwrap());
    assert!(session.add_transaction(&input("income", None, "Salary", "2000"), "2025-01-10"));
    assert!(session.add_transaction(&input("expense", Some("fisse"), "Rent", "700"), "2025-01-03"));
    assert!(session.add_transaction(&input("expense", Some("svago"), "Cinema", "15.5"), "2025-01-20"));
    assert!(session.add_transaction(&input("expense", Some("svago"), "Concert", "60"), "2025-02-01"));
    session
}

fn list_args(args: &[&str]) -> (TransactionFilter, clap::ArgMatches) {
    let mut argv = vec!["pokeledger", "tx", "list"];
    argv.extend_from_slice(args);
    let matches = cli::build_cli().get_matches_from(argv);
    if let Some(("tx", tx_m)) = matches.subcommand() {
        if let Some(("list", list_m)) = tx_m.subcommand() {
            let filter = transactions::filter_from(list_m).unwrap();
            return (filter, list_m.clone());
        }
    }
    panic!("no tx list subcommand");
}

#[test]
fn month_and_category_filters_combine() {
    let session = setup();
    let (filter, _) = list_args(&["--month", "2025-01", "--category", "svago"]);
    assert_eq!(
        filter.category,
        Some(CategoryFilter::Expense(ExpenseCategory::Svago))
    );
    let rows = session.list_transactions(&filter, TransactionSort::Date);
    assert_eq!(rows.len(), 1);
    assert_eq!(rows[0].description, "Cinema");
}

#[test]
fn income_filter_matches_type_not_category() {
    let session = setup();
    let (filter, _) = list_args(&["--category", "income"]);
    let rows = session.list_transactions(&filter, TransactionSort::Date);
    assert_eq!(rows.len(), 1);
    assert_eq!(rows[0].kind, TxKind::Income);
}

#[test]
fn all_means_no_category_filter() {
    let session = setup();
    let (filter, _) = list_args(&["--category", "all"]);
    assert!(filter.category.is_none());
    let rows = session.list_transactions(&filter, TransactionSort::Date);
    assert_eq!(rows.len(), 4);
    assert_eq!(rows[0].description, "Concert");
}

#[test]
fn unknown_filter_category_is_rejected() {
    let matches = cli::build_cli().get_matches_from(["pokeledger", "tx", "list", "--category", "pizza"]);
    let (_, tx_m) = matches.subcommand().unwrap();
    let (_, list_m) = tx_m.subcommand().unwrap();
    assert!(transactions::filter_from(list_m).is_err());
}

#[test]
fn amount_sort_orders_numerically() {
    let session = setup();
    let rows = session.list_transactions(&TransactionFilter::default(), TransactionSort::AmountDesc);
    let amounts: Vec<String> = rows.iter().map(|t| t.amount.to_string()).collect();
    assert_eq!(amounts, vec!["2000", "700", "60", "15.5"]);
}

#[test]
fn month_is_derived_from_date() {
    let session = setup();
    let rows = session.list_transactions(&TransactionFilter::default(), TransactionSort::Date);
    assert!(rows.iter().all(|t| t.month == t.date.format("%Y-%m").to_string()));
}

#[test]
fn invalid_input_is_not_recorded() {
    let mut session = setup();
    assert!(!session.add_transaction(&input("expense", None, "No category", "5"), "2025-01-05"));
    assert!(!session.add_transaction(&input("expense", Some("fisse"), "Refund", "-5"), "2025-01-05"));
    assert!(!session.add_transaction(&input("expense", Some("fisse"), "  ", "5"), "2025-01-05"));
    assert!(!session.add_transaction(&input("transfer", None, "Move", "5"), "2025-01-05"));
    assert!(!session.add_transaction(&input("income", None, "Bonus", "5"), "2025-13-05"));
    let rows = session.list_transactions(&TransactionFilter::default(), TransactionSort::Date);
    assert_eq!(rows.len(), 4);
}

#[test]
fn income_ignores_supplied_category() {
    let mut session = Session::open(db::open_in_memory().unwrap());
    assert!(session.add_transaction(&input("income", Some("svago"), "Gift", "50"), "2025-03-01"));
    let rows = session.list_transactions(&TransactionFilter::default(), TransactionSort::Date);
    assert_eq!(rows[0].category.as_str(), "income");
}

#[test]
fn delete_reports_missing_rows() {
    let mut session = setup();
    let id = session.list_transactions(&TransactionFilter::default(), TransactionSort::Date)[0].id;
    assert!(session.delete_transaction(&id.to_string()));
    assert!(!session.delete_transaction(&id.to_string()));
    assert!(!session.delete_transaction("abc"));
}

#[test]
fn list_limit_is_parsed() {
    let (_, list_m) = list_args(&["--limit", "2"]);
    assert_eq!(list_m.get_one::<usize>("limit"), Some(&2));
}

#[test]
fn amounts_are_bounded_to_cents() {
    let day = NaiveDate::from_ymd_opt(2025, 3, 1).unwrap();
    let new = |raw: &str| {
        NewTransaction::new(TxKind::Income, None, "Salary", raw.parse::<Decimal>().unwrap(), day)
    };
    assert!(new("1000000000000").is_ok());
    assert!(new("12.50").is_ok());
    assert!(new("1.500").is_ok());
    assert_eq!(
        new("0.001").unwrap_err(),
        ValidationError::AmountOutOfRange("0.001".into())
    );
    assert_eq!(
        new("1000000000000.01").unwrap_err(),
        ValidationError::AmountOutOfRange("1000000000000.01".into())
    );
    let huge: Decimal = "50000000000000000000000000000".parse().unwrap();
    assert!(NewScheduled::new(TxKind::Expense, Some("fisse"), "Rent", huge, 5).is_err());

    let mut session = setup();
    let tiny = "0.0000000000000000000000000001";
    assert!(!session.add_transaction(&input("expense", Some("fisse"), "Dust", tiny), "2025-01-05"));
    assert!(!session.add_scheduled(&input("income", None, "Windfall", "50000000000000000000000000000"), 1));
    let rows = session.list_transactions(&TransactionFilter::default(), TransactionSort::Date);
    assert_eq!(rows.len(), 4);
}

#[test]
fn unknown_sort_keys_are_rejected() {
    for sort in ["date", "amount-asc", "amount-desc", "category"] {
        let argv = ["pokeledger", "tx", "list", "--sort", sort];
        assert!(cli::build_cli().try_get_matches_from(argv).is_ok());
    }
    assert!(
        cli::build_cli()
            .try_get_matches_from(["pokeledger", "tx", "list", "--sort", "amont-asc"])
            .is_err()
    );
    assert!(
        cli::build_cli()
            .try_get_matches_from(["pokeledger", "purchase", "list", "--sort", "pokemon-id"])
            .is_ok()
    );
    assert!(
        cli::build_cli()
            .try_get_matches_from(["pokeledger", "purchase", "list", "--sort", "price"])
            .is_err()
    );
}
