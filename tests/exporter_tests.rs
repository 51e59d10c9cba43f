// Copyright (c) 2025 Soumyadip Sarkar.
// All rights reserved.
//
// This source code is licensed under the license found in the
// LICENSE file in the root directory of this source tree.

use pokeledger::session::{Session, TransactionInput};
use pokeledger::{cli, commands::exporter, db};
use serde_json::json;
use tempfile::tempdir;

fn seeded() -> Session {
    let mut session = Session::open(db::open_in_memory().unwrap());
    for (kind, category, desc, amount, date) in [
        ("expense", Some("variabili"), "Corner Shop", "12.34", "2025-01-05"),
        ("income", None, "Salary", "2000", "2025-01-02"),
    ] {
        let input = TransactionInput {
            kind: kind.into(),
            category: category.map(|c: &str| c.to_string()),
            description: desc.into(),
            amount: amount.into(),
        };
        assert!(session.add_transaction(&input, date));
    }
    session
}

#[test]
fn export_transactions_writes_pretty_json_oldest_first() {
    let session = seeded();
    let dir = tempdir().unwrap();
    let out_path = dir.path().join("export.json");
    let out_str = out_path.to_string_lossy().to_string();

    let cli = cli::build_cli();
    let matches = cli.get_matches_from([
        "pokeledger",
        "export",
        "transactions",
        "--format",
        "json",
        "--out",
        &out_str,
    ]);
    if let Some(("export", export_m)) = matches.subcommand() {
        exporter::handle(session.conn(), export_m).unwrap();
    } else {
        panic!("no export subcommand");
    }

    let contents = std::fs::read_to_string(&out_path).unwrap();
    let mut parsed: serde_json::Value = serde_json::from_str(&contents).unwrap();
    for item in parsed.as_array_mut().unwrap() {
        item.as_object_mut().unwrap().remove("created_at");
    }
    assert_eq!(
        parsed,
        json!([
            {
                "id": 2,
                "type": "income",
                "category": "income",
                "description": "Salary",
                "amount": "2000",
                "date": "2025-01-02",
                "month": "2025-01",
                "is_scheduled": false,
                "scheduled_source_id": null
            },
            {
                "id": 1,
                "type": "expense",
                "category": "variabili",
                "description": "Corner Shop",
                "amount": "12.34",
                "date": "2025-01-05",
                "month": "2025-01",
                "is_scheduled": false,
                "scheduled_source_id": null
            }
        ])
    );
}

#[test]
fn export_transactions_writes_csv_with_header() {
    let session = seeded();
    let dir = tempdir().unwrap();
    let out_path = dir.path().join("export.csv");
    let count =
        exporter::export_transactions(session.conn(), "CSV", out_path.to_str().unwrap()).unwrap();
    assert_eq!(count, 2);

    let contents = std::fs::read_to_string(&out_path).unwrap();
    let lines: Vec<&str> = contents.lines().collect();
    assert_eq!(
        lines,
        vec![
            "id,date,month,type,category,description,amount,scheduled",
            "2,2025-01-02,2025-01,income,income,Salary,2000,false",
            "1,2025-01-05,2025-01,expense,variabili,Corner Shop,12.34,false",
        ]
    );
}

#[test]
fn export_transactions_rejects_unknown_format() {
    let session = seeded();
    let dir = tempdir().unwrap();
    let out_path = dir.path().join("export.unknown");
    let out_str = out_path.to_string_lossy().to_string();

    let cli = cli::build_cli();
    let matches = cli.get_matches_from([
        "pokeledger",
        "export",
        "transactions",
        "--format",
        "xml",
        "--out",
        &out_str,
    ]);
    if let Some(("export", export_m)) = matches.subcommand() {
        assert!(exporter::handle(session.conn(), export_m).is_err());
    } else {
        panic!("no export subcommand");
    }
    assert!(!out_path.exists());
}
