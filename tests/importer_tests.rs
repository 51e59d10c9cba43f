// Copyright (c) 2025 Soumyadip Sarkar.
// All rights reserved.
//
// This source code is licensed under the license found in the
// LICENSE file in the root directory of this source tree.

use pokeledger::commands::{catalog, importer};
use pokeledger::{cli, db};
use rusqlite::Connection;
use std::io::Write;
use tempfile::NamedTempFile;

fn csv_file(contents: &str) -> NamedTempFile {
    let mut file = NamedTempFile::new().unwrap();
    write!(file, "{}", contents).unwrap();
    file.flush().unwrap();
    file
}

fn count(conn: &Connection) -> i64 {
    conn.query_row("SELECT COUNT(*) FROM pokemon", [], |r| r.get(0))
        .unwrap()
}

#[test]
fn importer_trims_cli_path_argument() {
    let mut conn = db::open_in_memory().unwrap();
    let file = csv_file("id,name,generation\n1,Bulbasaur,1\n4,Charmander,1\n");

    let path = file.path().to_str().unwrap().to_string();
    let padded = format!("  {}  ", path);
    let cli = cli::build_cli();
    let matches = cli.get_matches_from(["pokeledger", "pokemon", "import", "--path", &padded]);
    if let Some(("pokemon", pokemon_m)) = matches.subcommand() {
        catalog::handle(&mut conn, pokemon_m).unwrap();
    } else {
        panic!("no pokemon subcommand");
    }
    assert_eq!(count(&conn), 2);
}

#[test]
fn reimport_keeps_collected_flag_and_known_price() {
    let mut conn = db::open_in_memory().unwrap();
    let first = csv_file("id,name,generation,price,url\n25,Pikachu,1,4.50,https://shop/25\n");
    importer::import_pokemon_file(&mut conn, first.path().to_str().unwrap()).unwrap();
    assert!(catalog::set_collected(&conn, 25, true).unwrap());

    let second = csv_file("id,name,generation,price,url\n25,Pikachu,1,,\n");
    importer::import_pokemon_file(&mut conn, second.path().to_str().unwrap()).unwrap();

    let items = catalog::list_generation(&conn, 1, false).unwrap();
    assert_eq!(items.len(), 1);
    let p = &items[0];
    assert!(p.collected);
    assert_eq!(p.price.map(|d| d.to_string()).as_deref(), Some("4.50"));
    assert_eq!(p.url.as_deref(), Some("https://shop/25"));
}

#[test]
fn short_rows_are_accepted() {
    let mut conn = db::open_in_memory().unwrap();
    let file = csv_file("id,name,generation,price\n152,Chikorita,2\n155,Cyndaquil,2,3\n");
    let n = importer::import_pokemon_file(&mut conn, file.path().to_str().unwrap()).unwrap();
    assert_eq!(n, 2);
    let items = catalog::list_generation(&conn, 2, false).unwrap();
    assert!(items[0].price.is_none());
    assert_eq!(items[1].price.map(|d| d.to_string()).as_deref(), Some("3"));
}

#[test]
fn bad_row_rolls_back_the_whole_file() {
    let mut conn = db::open_in_memory().unwrap();
    let file = csv_file("id,name,generation\n1,Bulbasaur,1\nseven,Squirtle,1\n");
    assert!(importer::import_pokemon_file(&mut conn, file.path().to_str().unwrap()).is_err());
    assert_eq!(count(&conn), 0);
}

#[test]
fn missing_file_is_an_error() {
    let mut conn = db::open_in_memory().unwrap();
    assert!(importer::import_pokemon_file(&mut conn, "/nonexistent/pokemon.csv").is_err());
}
