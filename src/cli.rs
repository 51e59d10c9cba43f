// Copyright (c) AlphaVelocity.
// All rights reserved.
//
// This source code is licensed under the license found in the
// LICENSE file in the root directory of this source tree.

use clap::{value_parser, Arg, ArgAction, Command};

fn json_flags(cmd: Command) -> Command {
    cmd.arg(
        Arg::new("json")
            .long("json")
            .action(ArgAction::SetTrue)
            .help("Print as pretty JSON"),
    )
    .arg(
        Arg::new("jsonl")
            .long("jsonl")
            .action(ArgAction::SetTrue)
            .conflicts_with("json")
            .help("Print as JSON lines"),
    )
}

fn opt(name: &'static str, help: &'static str) -> Arg {
    Arg::new(name).long(name).help(help)
}

fn req(name: &'static str, help: &'static str) -> Arg {
    opt(name, help).required(true)
}

fn tx_fields(cmd: Command) -> Command {
    cmd.arg(req("type", "income | expense"))
        .arg(opt(
            "category",
            "fisse | variabili | svago | risparmi (expenses only)",
        ))
        .arg(req("description", "Free text description"))
        .arg(req("amount", "Amount in EUR, never negative"))
}

fn pokemon_cmd() -> Command {
    Command::new("pokemon")
        .about("Browse and update the collection catalog")
        .subcommand(json_flags(
            Command::new("list")
                .about("List a generation ordered by number")
                .arg(
                    req("generation", "Generation number")
                        .value_parser(value_parser!(i64)),
                )
                .arg(
                    Arg::new("missing")
                        .long("missing")
                        .action(ArgAction::SetTrue)
                        .help("Only show items not yet collected"),
                ),
        ))
        .subcommand(json_flags(
            Command::new("stats").about("Collected / remaining counts"),
        ))
        .subcommand(json_flags(
            Command::new("search")
                .about("Search by number or name")
                .arg(req("query", "Number or part of the name")),
        ))
        .subcommand(
            Command::new("collect")
                .about("Mark an item as collected")
                .arg(req("id", "National Dex number"))
                .arg(
                    Arg::new("undo")
                        .long("undo")
                        .action(ArgAction::SetTrue)
                        .help("Mark as not collected"),
                ),
        )
        .subcommand(
            Command::new("price")
                .about("Set the reference price")
                .arg(req("id", "National Dex number"))
                .arg(req("price", "Price in EUR")),
        )
        .subcommand(
            Command::new("url")
                .about("Set the shop url")
                .arg(req("id", "National Dex number"))
                .arg(req("url", "Url")),
        )
        .subcommand(
            Command::new("import")
                .about("Import catalog rows from CSV: id,name,generation[,price][,url]")
                .arg(req("path", "CSV file")),
        )
}

fn purchase_cmd() -> Command {
    Command::new("purchase")
        .about("Record completed purchases")
        .subcommand(
            Command::new("add")
                .arg(req("pokemon-id", "National Dex number"))
                .arg(req("price", "Final price in EUR"))
                .arg(opt("month", "YYYY-MM, defaults to the current month")),
        )
        .subcommand(json_flags(
            Command::new("list").arg(
                opt("sort", "date | price-asc | price-desc | pokemon-id")
                    .value_parser(["date", "price-asc", "price-desc", "pokemon-id"])
                    .default_value("date"),
            ),
        ))
        .subcommand(Command::new("rm").arg(req("id", "Purchase id")))
        .subcommand(Command::new("clear").about("Delete every purchase"))
}

fn planned_cmd() -> Command {
    Command::new("planned")
        .about("Plan future purchases by date")
        .subcommand(
            Command::new("add")
                .arg(req("pokemon-id", "National Dex number"))
                .arg(req("price", "Expected price in EUR"))
                .arg(req("date", "Planned date YYYY-MM-DD")),
        )
        .subcommand(json_flags(
            Command::new("list").about("Pending purchases grouped by date"),
        ))
        .subcommand(
            Command::new("cancel")
                .about("Cancel every pending purchase on a date")
                .arg(req("date", "Planned date YYYY-MM-DD")),
        )
        .subcommand(
            Command::new("complete")
                .about("Turn a date's pending purchases into real ones")
                .arg(req("date", "Planned date YYYY-MM-DD"))
                .arg(req("total", "Total paid in EUR, split evenly"))
                .arg(opt("month", "YYYY-MM, defaults to the current month")),
        )
        .subcommand(Command::new("rm").arg(req("id", "Planned purchase id")))
        .subcommand(Command::new("check").arg(req("pokemon-id", "National Dex number")))
}

fn tx_cmd() -> Command {
    Command::new("tx")
        .about("Income and expense ledger")
        .subcommand(tx_fields(Command::new("add")).arg(req("date", "YYYY-MM-DD")))
        .subcommand(json_flags(
            Command::new("list")
                .arg(opt("month", "YYYY-MM"))
                .arg(opt(
                    "category",
                    "all | income | fisse | variabili | svago | risparmi",
                ))
                .arg(
                    opt("sort", "date | amount-asc | amount-desc | category")
                        .value_parser(["date", "amount-asc", "amount-desc", "category"])
                        .default_value("date"),
                )
                .arg(opt("limit", "Max rows").value_parser(value_parser!(usize))),
        ))
        .subcommand(Command::new("rm").arg(req("id", "Transaction id")))
}

fn scheduled_cmd() -> Command {
    Command::new("scheduled")
        .about("Recurring monthly transactions")
        .subcommand(
            tx_fields(Command::new("add")).arg(
                req("day", "Day of month 1..=31").value_parser(value_parser!(u32)),
            ),
        )
        .subcommand(json_flags(Command::new("list")))
        .subcommand(
            Command::new("rm")
                .about("Deactivate a definition")
                .arg(req("id", "Definition id")),
        )
        .subcommand(
            Command::new("run")
                .about("Materialize definitions due today")
                .arg(opt("today", "Override today's date YYYY-MM-DD")),
        )
}

fn budget_cmd() -> Command {
    Command::new("budget")
        .about("Percentage-of-income budget")
        .subcommand(json_flags(Command::new("show")))
        .subcommand(
            Command::new("set")
                .arg(opt("target", "Monthly budget target in EUR"))
                .arg(opt("fisse", "Percentage of income"))
                .arg(opt("variabili", "Percentage of income"))
                .arg(opt("svago", "Percentage of income"))
                .arg(opt("risparmi", "Percentage of income")),
        )
        .subcommand(json_flags(
            Command::new("status")
                .about("Allocation and usage per category")
                .arg(opt("month", "YYYY-MM, defaults to the current month")),
        ))
}

fn report_cmd() -> Command {
    Command::new("report")
        .about("Monthly analytics")
        .subcommand(json_flags(
            Command::new("stats").arg(opt("month", "YYYY-MM, defaults to the current month")),
        ))
        .subcommand(json_flags(
            Command::new("history").arg(
                opt("months", "How many months back")
                    .value_parser(value_parser!(usize))
                    .default_value("12"),
            ),
        ))
        .subcommand(json_flags(
            Command::new("insights").about("This month against the previous one"),
        ))
}

fn export_cmd() -> Command {
    Command::new("export").about("Export data").subcommand(
        Command::new("transactions")
            .arg(req("format", "csv | json"))
            .arg(req("out", "Output file")),
    )
}

pub fn build_cli() -> Command {
    Command::new("pokeledger")
        .version(clap::crate_version!())
        .about("Pokémon collection tracker with a percentage-based household budget")
        .subcommand(Command::new("init").about("Create the database"))
        .subcommand(pokemon_cmd())
        .subcommand(purchase_cmd())
        .subcommand(planned_cmd())
        .subcommand(tx_cmd())
        .subcommand(scheduled_cmd())
        .subcommand(budget_cmd())
        .subcommand(report_cmd())
        .subcommand(export_cmd())
        .subcommand(Command::new("doctor").about("Check stored data for inconsistencies"))
}
