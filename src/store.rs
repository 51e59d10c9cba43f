// Copyright (c) AlphaVelocity.
// All rights reserved.
//
// This source code is licensed under the license found in the
// LICENSE file in the root directory of this source tree.

//! Ledger, scheduled definitions and budget settings persisted in SQLite.

use std::str::FromStr;

use anyhow::{ensure, Context, Result};
use chrono::NaiveDate;
use rusqlite::{params, params_from_iter, Connection, OptionalExtension, Row};
use rust_decimal::Decimal;

use crate::errors::ValidationError;
use crate::models::{
    BudgetSettings, CategoryKey, ExpenseCategory, NewScheduled, NewTransaction,
    ScheduledDefinition, Transaction, TxKind,
};
use crate::utils::month_key;

const TX_COLUMNS: &str = "id, type, category, description, amount, date, month, created_at, is_scheduled, scheduled_source_id";
const SCHEDULED_COLUMNS: &str =
    "id, type, category, description, amount, day_of_month, is_active, last_executed_date";
const BUDGET_SETTINGS_KEY: &str = "budget_settings";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CategoryFilter {
    Income,
    Expense(ExpenseCategory),
}

impl CategoryFilter {
    /// `all` (or empty) means no filter.
    pub fn parse(s: &str) -> Result<Option<Self>, ValidationError> {
        match s.trim().to_lowercase().as_str() {
            "" | "all" => Ok(None),
            "income" => Ok(Some(CategoryFilter::Income)),
            other => Ok(Some(CategoryFilter::Expense(other.parse()?))),
        }
    }
}

#[derive(Debug, Clone, Default)]
pub struct TransactionFilter {
    pub month: Option<String>,
    pub category: Option<CategoryFilter>,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum TransactionSort {
    #[default]
    Date,
    AmountAsc,
    AmountDesc,
    Category,
}

impl TransactionSort {
    fn order_by(&self) -> &'static str {
        match self {
            TransactionSort::Date => "date DESC, id DESC",
            TransactionSort::AmountAsc => "CAST(amount AS REAL) ASC, id ASC",
            TransactionSort::AmountDesc => "CAST(amount AS REAL) DESC, id DESC",
            TransactionSort::Category => "category ASC, date DESC, id DESC",
        }
    }
}

impl FromStr for TransactionSort {
    type Err = std::convert::Infallible;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Ok(match s.trim() {
            "amount-asc" => TransactionSort::AmountAsc,
            "amount-desc" => TransactionSort::AmountDesc,
            "category" => TransactionSort::Category,
            _ => TransactionSort::Date,
        })
    }
}

#[derive(Debug, Clone, Copy, Default)]
pub struct ScheduledFilter {
    pub active: Option<bool>,
    pub day_of_month: Option<u32>,
}

fn parse_amount(raw: &str) -> Result<Decimal> {
    raw.parse::<Decimal>()
        .with_context(|| format!("Invalid amount '{}' in store", raw))
}

fn parse_stored_date(raw: &str) -> Result<NaiveDate> {
    // scheduled rows may carry a full timestamp; the date is the first 10 chars
    let day = raw.get(0..10).unwrap_or(raw);
    NaiveDate::parse_from_str(day, "%Y-%m-%d")
        .with_context(|| format!("Invalid date '{}' in store", raw))
}

fn read_transaction(r: &Row<'_>) -> Result<Transaction> {
    let kind: String = r.get(1)?;
    let category: String = r.get(2)?;
    let amount: String = r.get(4)?;
    let date: String = r.get(5)?;
    Ok(Transaction {
        id: r.get(0)?,
        kind: kind.parse::<TxKind>()?,
        category: CategoryKey::from(category),
        description: r.get(3)?,
        amount: parse_amount(&amount)?,
        date: parse_stored_date(&date)?,
        month: r.get(6)?,
        created_at: r.get(7)?,
        is_scheduled: r.get(8)?,
        scheduled_source_id: r.get(9)?,
    })
}

fn read_scheduled(r: &Row<'_>) -> Result<ScheduledDefinition> {
    let kind: String = r.get(1)?;
    let category: String = r.get(2)?;
    let amount: String = r.get(4)?;
    let last: Option<String> = r.get(7)?;
    Ok(ScheduledDefinition {
        id: r.get(0)?,
        kind: kind.parse::<TxKind>()?,
        category: CategoryKey::from(category),
        description: r.get(3)?,
        amount: parse_amount(&amount)?,
        day_of_month: r.get(5)?,
        is_active: r.get(6)?,
        last_executed_date: last.as_deref().map(parse_stored_date).transpose()?,
    })
}

pub fn find_transactions(
    conn: &Connection,
    filter: &TransactionFilter,
    sort: TransactionSort,
) -> Result<Vec<Transaction>> {
    let mut sql = format!("SELECT {} FROM transactions WHERE 1=1", TX_COLUMNS);
    let mut params_vec: Vec<String> = Vec::new();

    match filter.category {
        Some(CategoryFilter::Income) => sql.push_str(" AND type='income'"),
        Some(CategoryFilter::Expense(cat)) => {
            sql.push_str(" AND type='expense' AND category=?");
            params_vec.push(cat.as_str().to_string());
        }
        None => {}
    }
    if let Some(month) = &filter.month {
        sql.push_str(" AND month=?");
        params_vec.push(month.clone());
    }
    sql.push_str(" ORDER BY ");
    sql.push_str(sort.order_by());

    let mut stmt = conn.prepare(&sql)?;
    let mut rows = stmt.query(params_from_iter(params_vec.iter()))?;
    let mut data = Vec::new();
    while let Some(r) = rows.next()? {
        data.push(read_transaction(r)?);
    }
    Ok(data)
}

pub fn transactions_for_months(conn: &Connection, months: &[String]) -> Result<Vec<Transaction>> {
    if months.is_empty() {
        return Ok(Vec::new());
    }
    let placeholders = vec!["?"; months.len()].join(",");
    let sql = format!(
        "SELECT {} FROM transactions WHERE month IN ({}) ORDER BY date DESC, id DESC",
        TX_COLUMNS, placeholders
    );
    let mut stmt = conn.prepare(&sql)?;
    let mut rows = stmt.query(params_from_iter(months.iter()))?;
    let mut data = Vec::new();
    while let Some(r) = rows.next()? {
        data.push(read_transaction(r)?);
    }
    Ok(data)
}

pub fn insert_transaction(conn: &Connection, tx: &NewTransaction) -> Result<i64> {
    ensure!(
        tx.month == month_key(tx.date),
        "Transaction month '{}' does not match date {}",
        tx.month,
        tx.date
    );
    conn.execute(
        "INSERT INTO transactions(type, category, description, amount, date, month, is_scheduled, scheduled_source_id)
         VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8)",
        params![
            tx.kind.as_str(),
            tx.category.as_str(),
            tx.description,
            tx.amount.to_string(),
            tx.date.to_string(),
            tx.month,
            tx.is_scheduled,
            tx.scheduled_source_id
        ],
    )
    .with_context(|| format!("Insert transaction '{}'", tx.description))?;
    Ok(conn.last_insert_rowid())
}

pub fn delete_transaction(conn: &Connection, id: i64) -> Result<bool> {
    let n = conn.execute("DELETE FROM transactions WHERE id=?1", params![id])?;
    Ok(n > 0)
}

pub fn find_scheduled(
    conn: &Connection,
    filter: &ScheduledFilter,
) -> Result<Vec<ScheduledDefinition>> {
    let mut sql = format!(
        "SELECT {} FROM scheduled_transactions WHERE 1=1",
        SCHEDULED_COLUMNS
    );
    let mut params_vec: Vec<i64> = Vec::new();
    if let Some(active) = filter.active {
        sql.push_str(" AND is_active=?");
        params_vec.push(i64::from(active));
    }
    if let Some(day) = filter.day_of_month {
        sql.push_str(" AND day_of_month=?");
        params_vec.push(i64::from(day));
    }
    sql.push_str(" ORDER BY day_of_month, id");

    let mut stmt = conn.prepare(&sql)?;
    let mut rows = stmt.query(params_from_iter(params_vec.iter()))?;
    let mut data = Vec::new();
    while let Some(r) = rows.next()? {
        data.push(read_scheduled(r)?);
    }
    Ok(data)
}

pub fn insert_scheduled(conn: &Connection, def: &NewScheduled) -> Result<i64> {
    conn.execute(
        "INSERT INTO scheduled_transactions(type, category, description, amount, day_of_month)
         VALUES (?1, ?2, ?3, ?4, ?5)",
        params![
            def.kind.as_str(),
            def.category.as_str(),
            def.description,
            def.amount.to_string(),
            def.day_of_month
        ],
    )
    .with_context(|| format!("Insert scheduled transaction '{}'", def.description))?;
    Ok(conn.last_insert_rowid())
}

/// Soft delete: the definition is kept but never fires again.
pub fn deactivate_scheduled(conn: &Connection, id: i64) -> Result<bool> {
    let n = conn.execute(
        "UPDATE scheduled_transactions SET is_active=0, updated_at=datetime('now')
         WHERE id=?1 AND is_active=1",
        params![id],
    )?;
    Ok(n > 0)
}

/// Stamp `last_executed_date = today` unless the definition already ran in
/// the month of `today`. Returns whether the stamp was applied.
pub fn stamp_scheduled(conn: &Connection, id: i64, today: NaiveDate) -> Result<bool> {
    let n = conn.execute(
        "UPDATE scheduled_transactions
         SET last_executed_date=?1, updated_at=datetime('now')
         WHERE id=?2 AND is_active=1
           AND (last_executed_date IS NULL OR substr(last_executed_date,1,7) <> ?3)",
        params![today.to_string(), id, month_key(today)],
    )?;
    Ok(n > 0)
}

/// Materialize `def` on `today` as one atomic step: the guarded stamp and
/// the ledger insert commit together or not at all.
///
/// `Ok(None)` means the definition was already executed this month.
pub fn record_scheduled_execution(
    conn: &Connection,
    def: &ScheduledDefinition,
    today: NaiveDate,
) -> Result<Option<i64>> {
    let tx = conn.unchecked_transaction()?;
    if !stamp_scheduled(&tx, def.id, today)? {
        return Ok(None);
    }
    let id = insert_transaction(&tx, &NewTransaction::from_scheduled(def, today))?;
    tx.commit()?;
    Ok(Some(id))
}

pub fn get_budget_settings(conn: &Connection) -> Result<Option<BudgetSettings>> {
    let v: Option<String> = conn
        .query_row(
            "SELECT value FROM settings WHERE key=?1",
            params![BUDGET_SETTINGS_KEY],
            |r| r.get(0),
        )
        .optional()?;
    v.map(|s| serde_json::from_str(&s).context("Invalid budget settings in store"))
        .transpose()
}

pub fn load_budget_settings(conn: &Connection) -> Result<BudgetSettings> {
    Ok(get_budget_settings(conn)?.unwrap_or_default())
}

pub fn upsert_budget_settings(conn: &Connection, settings: &BudgetSettings) -> Result<()> {
    let value = serde_json::to_string(settings)?;
    conn.execute(
        "INSERT INTO settings(key, value) VALUES(?1, ?2)
         ON CONFLICT(key) DO UPDATE SET value=excluded.value",
        params![BUDGET_SETTINGS_KEY, value],
    )?;
    Ok(())
}
