// Copyright (c) AlphaVelocity.
// All rights reserved.
//
// This source code is licensed under the license found in the
// LICENSE file in the root directory of this source tree.

//! The boundary the command layer talks to.
//!
//! A [`Session`] owns the store connection together with the budget settings
//! and the last computed spending insights. Its methods never return errors:
//! failures are logged and degrade to an empty or zero value.

use std::collections::BTreeMap;

use anyhow::Result;
use chrono::NaiveDate;
use rusqlite::Connection;
use rust_decimal::Decimal;
use serde::Serialize;

use crate::finance::{self, CategoryBudget, HistoricalMonth, SpendingInsights};
use crate::models::{
    BudgetSettings, MonthStats, NewScheduled, NewTransaction, ScheduledDefinition, Transaction,
    TxKind,
};
use crate::scheduler;
use crate::store::{self, ScheduledFilter, TransactionFilter, TransactionSort};
use crate::utils::{month_key, months_back, parse_date, parse_decimal, parse_id, previous_month};

#[derive(Debug, Clone, Serialize)]
pub struct MonthSummary {
    pub month: String,
    #[serde(flatten)]
    pub stats: MonthStats,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ProcessOutcome {
    pub success: bool,
    pub processed_count: usize,
    pub message: String,
}

/// Raw user input for a ledger entry or a scheduled definition.
#[derive(Debug, Clone, Default)]
pub struct TransactionInput {
    pub kind: String,
    pub category: Option<String>,
    pub description: String,
    pub amount: String,
}

impl TransactionInput {
    fn parts(&self) -> Result<(TxKind, Decimal)> {
        let kind = self.kind.parse::<TxKind>()?;
        let amount = parse_decimal(&self.amount)?;
        Ok((kind, amount))
    }

    pub fn to_transaction(&self, date: &str) -> Result<NewTransaction> {
        let (kind, amount) = self.parts()?;
        let date = parse_date(date)?;
        Ok(NewTransaction::new(
            kind,
            self.category.as_deref(),
            &self.description,
            amount,
            date,
        )?)
    }

    pub fn to_scheduled(&self, day_of_month: u32) -> Result<NewScheduled> {
        let (kind, amount) = self.parts()?;
        Ok(NewScheduled::new(
            kind,
            self.category.as_deref(),
            &self.description,
            amount,
            day_of_month,
        )?)
    }
}

fn or_default<T>(what: &str, result: Result<T>, default: T) -> T {
    match result {
        Ok(v) => v,
        Err(err) => {
            tracing::error!(error = %format!("{:#}", err), "{} failed", what);
            default
        }
    }
}

pub struct Session {
    conn: Connection,
    settings: BudgetSettings,
    insights: Option<SpendingInsights>,
}

impl Session {
    pub fn open(conn: Connection) -> Self {
        let mut session = Session {
            conn,
            settings: BudgetSettings::default(),
            insights: None,
        };
        session.refresh();
        session
    }

    pub fn conn(&self) -> &Connection {
        &self.conn
    }

    pub fn conn_mut(&mut self) -> &mut Connection {
        &mut self.conn
    }

    /// Reload settings from the store and forget cached insights.
    pub fn refresh(&mut self) {
        self.settings = or_default(
            "load budget settings",
            store::load_budget_settings(&self.conn),
            BudgetSettings::default(),
        );
        self.insights = None;
    }

    pub fn budget_settings(&self) -> &BudgetSettings {
        &self.settings
    }

    pub fn update_budget_settings(&mut self, settings: BudgetSettings) -> bool {
        let total = settings.percentage_total();
        if total != Decimal::ONE_HUNDRED {
            tracing::warn!(total = %total, "budget percentages do not sum to 100");
        }
        match store::upsert_budget_settings(&self.conn, &settings) {
            Ok(()) => {
                self.settings = settings;
                true
            }
            Err(err) => {
                tracing::error!(error = %format!("{:#}", err), "update budget settings failed");
                false
            }
        }
    }

    fn month_transactions(&self, month: &str) -> Result<Vec<Transaction>> {
        let filter = TransactionFilter {
            month: Some(month.to_string()),
            category: None,
        };
        store::find_transactions(&self.conn, &filter, TransactionSort::Date)
    }

    pub fn financial_stats(&self, month: &str) -> MonthSummary {
        let stats = or_default(
            "financial stats",
            self.month_transactions(month).map(|txs| finance::aggregate(&txs)),
            MonthStats::default(),
        );
        MonthSummary {
            month: month.to_string(),
            stats,
        }
    }

    pub fn historical_financial_data(
        &self,
        today: NaiveDate,
        months_back_count: usize,
    ) -> BTreeMap<String, HistoricalMonth> {
        let months = months_back(today, months_back_count);
        let all = match store::transactions_for_months(&self.conn, &months) {
            Ok(all) => all,
            Err(err) => {
                tracing::error!(error = %format!("{:#}", err), "historical financial data failed");
                return BTreeMap::new();
            }
        };
        months
            .iter()
            .map(|m| {
                let in_month: Vec<Transaction> =
                    all.iter().filter(|t| &t.month == m).cloned().collect();
                (m.clone(), finance::historical_month(m, &in_month))
            })
            .collect()
    }

    /// Current month against the previous one. Cached until [`refresh`],
    /// a ledger write made through this session, or a scheduled run that adds
    /// transactions. Rows written to the connection directly are not seen
    /// until [`refresh`].
    ///
    /// [`refresh`]: Session::refresh
    pub fn spending_insights(&mut self, today: NaiveDate) -> Option<SpendingInsights> {
        let comparison_month = previous_month(today);
        if let Some(cached) = &self.insights {
            if cached.comparison_month == comparison_month {
                return Some(cached.clone());
            }
        }
        let current_month = month_key(today);
        let computed = self.month_transactions(&current_month).and_then(|current| {
            let previous = self.month_transactions(&comparison_month)?;
            Ok(finance::spending_insights(&current, &previous, &comparison_month))
        });
        match computed {
            Ok(insights) => {
                self.insights = Some(insights.clone());
                Some(insights)
            }
            Err(err) => {
                tracing::error!(error = %format!("{:#}", err), "spending insights failed");
                None
            }
        }
    }

    pub fn budget_overview(&self, month: &str) -> Vec<CategoryBudget> {
        let summary = self.financial_stats(month);
        finance::budget_overview(&summary.stats, &self.settings)
    }

    pub fn process_scheduled_transactions(&mut self, today: NaiveDate) -> ProcessOutcome {
        match scheduler::process(&self.conn, today) {
            Ok(report) => {
                if report.executed_count > 0 {
                    self.insights = None;
                }
                ProcessOutcome {
                    success: true,
                    processed_count: report.executed_count,
                    message: format!(
                        "Processed {} scheduled transactions",
                        report.executed_count
                    ),
                }
            }
            Err(err) => {
                tracing::error!(error = %format!("{:#}", err), "process scheduled transactions failed");
                ProcessOutcome {
                    success: false,
                    processed_count: 0,
                    message: "Error while processing scheduled transactions".to_string(),
                }
            }
        }
    }

    pub fn add_transaction(&mut self, input: &TransactionInput, date: &str) -> bool {
        let inserted = input
            .to_transaction(date)
            .and_then(|tx| store::insert_transaction(&self.conn, &tx));
        let ok = or_default("add transaction", inserted.map(|_| true), false);
        if ok {
            self.insights = None;
        }
        ok
    }

    pub fn list_transactions(
        &self,
        filter: &TransactionFilter,
        sort: TransactionSort,
    ) -> Vec<Transaction> {
        or_default(
            "list transactions",
            store::find_transactions(&self.conn, filter, sort),
            Vec::new(),
        )
    }

    pub fn delete_transaction(&mut self, raw_id: &str) -> bool {
        let deleted = parse_id(raw_id)
            .map_err(anyhow::Error::from)
            .and_then(|id| store::delete_transaction(&self.conn, id));
        let ok = or_default("delete transaction", deleted, false);
        if ok {
            self.insights = None;
        }
        ok
    }

    pub fn add_scheduled(&self, input: &TransactionInput, day_of_month: u32) -> bool {
        let inserted = input
            .to_scheduled(day_of_month)
            .and_then(|def| store::insert_scheduled(&self.conn, &def));
        or_default("add scheduled transaction", inserted.map(|_| true), false)
    }

    pub fn list_scheduled(&self) -> Vec<ScheduledDefinition> {
        let filter = ScheduledFilter {
            active: Some(true),
            day_of_month: None,
        };
        or_default(
            "list scheduled transactions",
            store::find_scheduled(&self.conn, &filter),
            Vec::new(),
        )
    }

    pub fn deactivate_scheduled(&self, raw_id: &str) -> bool {
        let deactivated = parse_id(raw_id)
            .map_err(anyhow::Error::from)
            .and_then(|id| store::deactivate_scheduled(&self.conn, id));
        or_default("deactivate scheduled transaction", deactivated, false)
    }
}
