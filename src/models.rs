// Copyright (c) 2025 Soumyadip Sarkar.
// All rights reserved.
//
// This source code is licensed under the license found in the
// LICENSE file in the root directory of this source tree.

use std::fmt;
use std::str::FromStr;

use chrono::NaiveDate;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use crate::errors::ValidationError;
use crate::utils::month_key;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TxKind {
    Income,
    Expense,
}

impl TxKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            TxKind::Income => "income",
            TxKind::Expense => "expense",
        }
    }
}

impl FromStr for TxKind {
    type Err = ValidationError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "income" => Ok(TxKind::Income),
            "expense" => Ok(TxKind::Expense),
            other => Err(ValidationError::UnknownKind(other.to_string())),
        }
    }
}

/// The four expense buckets of the budget model.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ExpenseCategory {
    Fisse,
    Variabili,
    Svago,
    Risparmi,
}

impl ExpenseCategory {
    pub const ALL: [ExpenseCategory; 4] = [
        ExpenseCategory::Fisse,
        ExpenseCategory::Variabili,
        ExpenseCategory::Svago,
        ExpenseCategory::Risparmi,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            ExpenseCategory::Fisse => "fisse",
            ExpenseCategory::Variabili => "variabili",
            ExpenseCategory::Svago => "svago",
            ExpenseCategory::Risparmi => "risparmi",
        }
    }

    pub fn display_name(&self) -> &'static str {
        match self {
            ExpenseCategory::Fisse => "Fixed Expenses",
            ExpenseCategory::Variabili => "Variable Expenses",
            ExpenseCategory::Svago => "Leisure",
            ExpenseCategory::Risparmi => "Savings",
        }
    }
}

impl fmt::Display for ExpenseCategory {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for ExpenseCategory {
    type Err = ValidationError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let key = s.trim().to_lowercase();
        ExpenseCategory::ALL
            .into_iter()
            .find(|c| c.as_str() == key)
            .ok_or(ValidationError::UnknownCategory(key))
    }
}

/// Category of a ledger entry.
///
/// Income rows carry the implicit `income` category and never collide with
/// the expense buckets. `Unrecognized` only shows up when reading legacy rows.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(into = "String", from = "String")]
pub enum CategoryKey {
    Income,
    Expense(ExpenseCategory),
    Unrecognized(String),
}

impl CategoryKey {
    pub fn as_str(&self) -> &str {
        match self {
            CategoryKey::Income => "income",
            CategoryKey::Expense(c) => c.as_str(),
            CategoryKey::Unrecognized(s) => s.as_str(),
        }
    }

    pub fn expense(&self) -> Option<ExpenseCategory> {
        match self {
            CategoryKey::Expense(c) => Some(*c),
            _ => None,
        }
    }

    /// Resolve the category for a new entry of the given kind.
    pub fn resolve(kind: TxKind, raw: Option<&str>) -> Result<Self, ValidationError> {
        match kind {
            TxKind::Income => Ok(CategoryKey::Income),
            TxKind::Expense => {
                let raw = raw
                    .map(str::trim)
                    .filter(|s| !s.is_empty())
                    .ok_or(ValidationError::MissingField("category"))?;
                Ok(CategoryKey::Expense(raw.parse()?))
            }
        }
    }
}

impl From<String> for CategoryKey {
    fn from(s: String) -> Self {
        if s == "income" {
            return CategoryKey::Income;
        }
        match s.parse::<ExpenseCategory>() {
            Ok(c) => CategoryKey::Expense(c),
            Err(_) => CategoryKey::Unrecognized(s),
        }
    }
}

impl From<CategoryKey> for String {
    fn from(c: CategoryKey) -> Self {
        c.as_str().to_string()
    }
}

/// One value per expense category.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ByCategory<T> {
    pub fisse: T,
    pub variabili: T,
    pub svago: T,
    pub risparmi: T,
}

impl<T> ByCategory<T> {
    pub fn get(&self, category: ExpenseCategory) -> &T {
        match category {
            ExpenseCategory::Fisse => &self.fisse,
            ExpenseCategory::Variabili => &self.variabili,
            ExpenseCategory::Svago => &self.svago,
            ExpenseCategory::Risparmi => &self.risparmi,
        }
    }

    pub fn get_mut(&mut self, category: ExpenseCategory) -> &mut T {
        match category {
            ExpenseCategory::Fisse => &mut self.fisse,
            ExpenseCategory::Variabili => &mut self.variabili,
            ExpenseCategory::Svago => &mut self.svago,
            ExpenseCategory::Risparmi => &mut self.risparmi,
        }
    }

    pub fn iter(&self) -> impl Iterator<Item = (ExpenseCategory, &T)> {
        ExpenseCategory::ALL.into_iter().map(move |c| (c, self.get(c)))
    }

    pub fn from_fn(mut f: impl FnMut(ExpenseCategory) -> T) -> Self {
        ByCategory {
            fisse: f(ExpenseCategory::Fisse),
            variabili: f(ExpenseCategory::Variabili),
            svago: f(ExpenseCategory::Svago),
            risparmi: f(ExpenseCategory::Risparmi),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Transaction {
    pub id: i64,
    #[serde(rename = "type")]
    pub kind: TxKind,
    pub category: CategoryKey,
    pub description: String,
    pub amount: Decimal,
    pub date: NaiveDate,
    pub month: String, // YYYY-MM, always date[..7]
    pub created_at: String,
    pub is_scheduled: bool,
    pub scheduled_source_id: Option<i64>,
}

/// A validated ledger entry ready to be written.
#[derive(Debug, Clone, PartialEq)]
pub struct NewTransaction {
    pub kind: TxKind,
    pub category: CategoryKey,
    pub description: String,
    pub amount: Decimal,
    pub date: NaiveDate,
    pub month: String,
    pub is_scheduled: bool,
    pub scheduled_source_id: Option<i64>,
}

impl NewTransaction {
    pub fn new(
        kind: TxKind,
        category: Option<&str>,
        description: &str,
        amount: Decimal,
        date: NaiveDate,
    ) -> Result<Self, ValidationError> {
        let category = CategoryKey::resolve(kind, category)?;
        let description = required("description", description)?;
        valid_amount(amount)?;
        Ok(NewTransaction {
            kind,
            category,
            description,
            amount,
            date,
            month: month_key(date),
            is_scheduled: false,
            scheduled_source_id: None,
        })
    }

    /// Materialize one occurrence of a scheduled definition on `today`.
    pub fn from_scheduled(def: &ScheduledDefinition, today: NaiveDate) -> Self {
        NewTransaction {
            kind: def.kind,
            category: def.category.clone(),
            description: def.description.clone(),
            amount: def.amount,
            date: today,
            month: month_key(today),
            is_scheduled: true,
            scheduled_source_id: Some(def.id),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ScheduledDefinition {
    pub id: i64,
    #[serde(rename = "type")]
    pub kind: TxKind,
    pub category: CategoryKey,
    pub description: String,
    pub amount: Decimal,
    pub day_of_month: u32,
    pub is_active: bool,
    pub last_executed_date: Option<NaiveDate>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct NewScheduled {
    pub kind: TxKind,
    pub category: CategoryKey,
    pub description: String,
    pub amount: Decimal,
    pub day_of_month: u32,
}

impl NewScheduled {
    pub fn new(
        kind: TxKind,
        category: Option<&str>,
        description: &str,
        amount: Decimal,
        day_of_month: u32,
    ) -> Result<Self, ValidationError> {
        if !(1..=31).contains(&day_of_month) {
            return Err(ValidationError::DayOutOfRange(day_of_month));
        }
        let category = CategoryKey::resolve(kind, category)?;
        let description = required("description", description)?;
        valid_amount(amount)?;
        Ok(NewScheduled {
            kind,
            category,
            description,
            amount,
            day_of_month,
        })
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BudgetSettings {
    pub monthly_budget_target: Decimal,
    pub percentages: ByCategory<Decimal>,
}

impl Default for BudgetSettings {
    fn default() -> Self {
        BudgetSettings {
            monthly_budget_target: Decimal::from(2500),
            percentages: ByCategory {
                fisse: Decimal::from(40),
                variabili: Decimal::from(30),
                svago: Decimal::from(15),
                risparmi: Decimal::from(15),
            },
        }
    }
}

impl BudgetSettings {
    pub fn percentage_total(&self) -> Decimal {
        self.percentages.iter().map(|(_, p)| *p).fold(Decimal::ZERO, Decimal::saturating_add)
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct MonthStats {
    pub total_income: Decimal,
    pub total_expenses: Decimal,
    pub net_balance: Decimal,
    pub expenses_by_category: ByCategory<Decimal>,
    pub transaction_count: usize,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Pokemon {
    pub id: i64,
    pub name: String,
    pub generation: i64,
    pub collected: bool,
    pub price: Option<Decimal>,
    pub url: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Purchase {
    pub id: i64,
    pub pokemon_id: i64,
    pub pokemon_name: String,
    pub final_price: Decimal,
    pub month: String,
    pub date: String,
    pub was_planned: bool,
    pub original_planned_date: Option<NaiveDate>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PlannedPurchase {
    pub id: i64,
    pub pokemon_id: i64,
    pub pokemon_name: String,
    pub base_price: Decimal,
    pub planned_date: NaiveDate,
    pub status: String, // pending | completed | cancelled
}

fn required(field: &'static str, value: &str) -> Result<String, ValidationError> {
    let value = value.trim();
    if value.is_empty() {
        return Err(ValidationError::MissingField(field));
    }
    Ok(value.to_string())
}

/// Largest amount a single ledger entry may carry.
pub fn max_amount() -> Decimal {
    Decimal::from(1_000_000_000_000i64)
}

pub const AMOUNT_DECIMALS: u32 = 2;

fn valid_amount(amount: Decimal) -> Result<(), ValidationError> {
    if amount.is_sign_negative() && !amount.is_zero() {
        return Err(ValidationError::NegativeAmount(amount.to_string()));
    }
    // trailing zeros are fine: "1.500" is still cents
    if amount > max_amount() || amount.normalize().scale() > AMOUNT_DECIMALS {
        return Err(ValidationError::AmountOutOfRange(amount.to_string()));
    }
    Ok(())
}
