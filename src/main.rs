// Copyright (c) 2025 Soumyadip Sarkar.
// All rights reserved.
//
// This source code is licensed under the license found in the
// LICENSE file in the root directory of this source tree.

use anyhow::Result;

use pokeledger::session::Session;
use pokeledger::{cli, commands, db, utils};

fn main() -> Result<()> {
    utils::init_tracing();
    let cli = cli::build_cli();
    let matches = cli.get_matches();

    let conn = db::open_or_init()?;
    let mut session = Session::open(conn);

    // recurring entries due today are materialized before any command runs
    if !matches!(matches.subcommand(), Some(("init", _)) | None) {
        let outcome = session.process_scheduled_transactions(utils::today());
        if outcome.processed_count > 0 {
            tracing::info!("{}", outcome.message);
        }
    }

    match matches.subcommand() {
        Some(("init", _)) => {
            println!("Database initialized at {}", db::db_path()?.display());
        }
        Some(("pokemon", sub)) => commands::catalog::handle(session.conn_mut(), sub)?,
        Some(("purchase", sub)) => commands::purchases::handle(session.conn(), sub)?,
        Some(("planned", sub)) => commands::planned::handle(session.conn(), sub)?,
        Some(("tx", sub)) => commands::transactions::handle(&mut session, sub)?,
        Some(("scheduled", sub)) => commands::scheduled::handle(&mut session, sub)?,
        Some(("budget", sub)) => commands::budgets::handle(&mut session, sub)?,
        Some(("report", sub)) => commands::reports::handle(&mut session, sub)?,
        Some(("export", sub)) => commands::exporter::handle(session.conn(), sub)?,
        Some(("doctor", _)) => commands::doctor::handle(session.conn())?,
        _ => {
            cli::build_cli().print_help()?;
            println!();
        }
    }
    Ok(())
}
