// Copyright (c) AlphaVelocity.
// All rights reserved.
//
// This source code is licensed under the license found in the
// LICENSE file in the root directory of this source tree.

//! Monthly aggregation, trends, insights and percentage-of-income budgets.
//!
//! Everything here is a pure function over data already read from the store.

use rust_decimal::Decimal;
use serde::Serialize;

use crate::models::{BudgetSettings, ByCategory, ExpenseCategory, MonthStats, Transaction, TxKind};
use crate::utils::fmt_pct;

const INCOME_SWING_PCT: i64 = 10;
const SAVINGS_SWING_PCT: i64 = 20;
const CATEGORY_GROWTH_PCT: i64 = 30;

pub const NO_ACTIVITY_INSIGHT: &str = "No notable activity this month.";

/// 120% of target.
fn over_budget_factor() -> Decimal {
    Decimal::new(12, 1)
}

/// 80% of budget.
fn warning_ratio() -> Decimal {
    Decimal::new(8, 1)
}

/// `part / whole`, saturating at the representable range. `whole` must be
/// nonzero.
fn saturating_div(part: Decimal, whole: Decimal) -> Decimal {
    match part.checked_div(whole) {
        Some(q) => q,
        None if part.is_sign_negative() == whole.is_sign_negative() => Decimal::MAX,
        None => Decimal::MIN,
    }
}

fn percent_of(part: Decimal, whole: Decimal) -> Decimal {
    saturating_div(part, whole).saturating_mul(Decimal::ONE_HUNDRED)
}

/// Targets used by the adherence insight. These do not follow the user's
/// budget settings.
pub fn insight_target_percentages() -> ByCategory<Decimal> {
    ByCategory {
        fisse: Decimal::from(40),
        variabili: Decimal::from(30),
        svago: Decimal::from(15),
        risparmi: Decimal::from(15),
    }
}

pub fn aggregate(transactions: &[Transaction]) -> MonthStats {
    let mut stats = MonthStats {
        transaction_count: transactions.len(),
        ..MonthStats::default()
    };
    for t in transactions {
        match t.kind {
            TxKind::Income => stats.total_income = stats.total_income.saturating_add(t.amount),
            TxKind::Expense => {
                stats.total_expenses = stats.total_expenses.saturating_add(t.amount);
                // unknown categories still count toward the total
                if let Some(cat) = t.category.expense() {
                    let slot = stats.expenses_by_category.get_mut(cat);
                    *slot = slot.saturating_add(t.amount);
                }
            }
        }
    }
    stats.net_balance = stats.total_income.saturating_sub(stats.total_expenses);
    stats
}

pub fn percentage_change(old: Decimal, new: Decimal) -> Decimal {
    if old.is_zero() {
        return if new > Decimal::ZERO {
            Decimal::ONE_HUNDRED
        } else {
            Decimal::ZERO
        };
    }
    percent_of(new.saturating_sub(old), old)
}

#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct Trends {
    pub income: Decimal,
    pub expenses: Decimal,
    pub savings: Decimal,
    pub category_trends: ByCategory<Decimal>,
}

pub fn trend(previous: &MonthStats, current: &MonthStats) -> Trends {
    Trends {
        income: percentage_change(previous.total_income, current.total_income),
        expenses: percentage_change(previous.total_expenses, current.total_expenses),
        savings: percentage_change(previous.net_balance, current.net_balance),
        category_trends: ByCategory::from_fn(|c| {
            percentage_change(
                *previous.expenses_by_category.get(c),
                *current.expenses_by_category.get(c),
            )
        }),
    }
}

/// Advisory messages for the current month. Every rule is evaluated and may
/// add its own message; the fallback is returned only when none did.
pub fn generate_insights(
    current: &MonthStats,
    _previous: &MonthStats,
    trends: &Trends,
) -> Vec<String> {
    let mut insights = Vec::new();

    let income_swing = Decimal::from(INCOME_SWING_PCT);
    if trends.income > income_swing {
        insights.push(format!(
            "Your income grew by {} compared to last month!",
            fmt_pct(&trends.income)
        ));
    } else if trends.income < -income_swing {
        insights.push(format!(
            "Your income dropped by {} compared to last month.",
            fmt_pct(&trends.income.abs())
        ));
    }

    let savings_swing = Decimal::from(SAVINGS_SWING_PCT);
    if trends.savings > savings_swing {
        insights.push(format!(
            "Great! You saved {} more than last month.",
            fmt_pct(&trends.savings)
        ));
    } else if trends.savings < -savings_swing {
        insights.push(format!(
            "Your savings dropped by {} compared to last month.",
            fmt_pct(&trends.savings.abs())
        ));
    }

    let growth = Decimal::from(CATEGORY_GROWTH_PCT);
    for (cat, t) in trends.category_trends.iter() {
        if *t > growth {
            insights.push(format!(
                "Heads up: {} spending grew by {}.",
                cat.display_name(),
                fmt_pct(t)
            ));
        }
    }

    if current.total_income > Decimal::ZERO {
        let targets = insight_target_percentages();
        for (cat, amount) in current.expenses_by_category.iter() {
            let actual = percent_of(*amount, current.total_income);
            let target = *targets.get(cat);
            if actual > target * over_budget_factor() {
                insights.push(format!(
                    "You went over budget for {}: {} vs {}% target.",
                    cat.display_name(),
                    fmt_pct(&actual),
                    target
                ));
            }
        }
    }

    if insights.is_empty() {
        insights.push(NO_ACTIVITY_INSIGHT.to_string());
    }
    insights
}

pub fn allocate(total_income: Decimal, percentages: &ByCategory<Decimal>) -> ByCategory<Decimal> {
    ByCategory::from_fn(|c| total_income.saturating_mul(*percentages.get(c)) / Decimal::ONE_HUNDRED)
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Tone {
    Good,
    Warning,
    Danger,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum BudgetStatus {
    OnTrack,
    Warning,
    OverBudget,
    // savings scale: more is better
    GoalReached,
    BelowGoal,
    WellBelowGoal,
}

impl BudgetStatus {
    pub fn label(&self) -> &'static str {
        match self {
            BudgetStatus::OnTrack => "on track",
            BudgetStatus::Warning => "warning",
            BudgetStatus::OverBudget => "over budget",
            BudgetStatus::GoalReached => "goal reached",
            BudgetStatus::BelowGoal => "below goal",
            BudgetStatus::WellBelowGoal => "well below goal",
        }
    }

    pub fn tone(&self) -> Tone {
        match self {
            BudgetStatus::OnTrack | BudgetStatus::GoalReached => Tone::Good,
            BudgetStatus::Warning | BudgetStatus::BelowGoal => Tone::Warning,
            BudgetStatus::OverBudget | BudgetStatus::WellBelowGoal => Tone::Danger,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct BudgetUsage {
    pub percentage_used: Decimal,
    pub status: BudgetStatus,
}

pub fn budget_status(category: ExpenseCategory, spent: Decimal, budget: Decimal) -> BudgetUsage {
    let savings = category == ExpenseCategory::Risparmi;
    if budget.is_zero() {
        let status = if savings {
            BudgetStatus::GoalReached
        } else {
            BudgetStatus::OnTrack
        };
        return BudgetUsage {
            percentage_used: Decimal::ZERO,
            status,
        };
    }

    let ratio = saturating_div(spent, budget);
    let status = if savings {
        if ratio >= Decimal::ONE {
            BudgetStatus::GoalReached
        } else if ratio >= warning_ratio() {
            BudgetStatus::BelowGoal
        } else {
            BudgetStatus::WellBelowGoal
        }
    } else if ratio <= warning_ratio() {
        BudgetStatus::OnTrack
    } else if ratio <= Decimal::ONE {
        BudgetStatus::Warning
    } else {
        BudgetStatus::OverBudget
    };
    BudgetUsage {
        percentage_used: ratio.saturating_mul(Decimal::ONE_HUNDRED),
        status,
    }
}

#[derive(Debug, Clone, Serialize)]
pub struct CategoryBudget {
    pub category: ExpenseCategory,
    pub name: &'static str,
    pub target_percentage: Decimal,
    pub budget: Decimal,
    pub spent: Decimal,
    pub percentage_used: Decimal,
    pub status: BudgetStatus,
}

pub fn budget_overview(stats: &MonthStats, settings: &BudgetSettings) -> Vec<CategoryBudget> {
    let budgets = allocate(stats.total_income, &settings.percentages);
    ExpenseCategory::ALL
        .into_iter()
        .map(|cat| {
            let spent = *stats.expenses_by_category.get(cat);
            let budget = *budgets.get(cat);
            let usage = budget_status(cat, spent, budget);
            CategoryBudget {
                category: cat,
                name: cat.display_name(),
                target_percentage: *settings.percentages.get(cat),
                budget,
                spent,
                percentage_used: usage.percentage_used,
                status: usage.status,
            }
        })
        .collect()
}

/// Where a category stands against [`insight_target_percentages`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum TargetStatus {
    WithinTarget,
    AboveTarget,
    WellAboveTarget,
    GoalReached,
    BelowGoal,
    WellBelowGoal,
}

impl TargetStatus {
    pub fn label(&self) -> &'static str {
        match self {
            TargetStatus::WithinTarget => "within target",
            TargetStatus::AboveTarget => "above target",
            TargetStatus::WellAboveTarget => "well above target",
            TargetStatus::GoalReached => "goal reached",
            TargetStatus::BelowGoal => "below goal",
            TargetStatus::WellBelowGoal => "well below goal",
        }
    }

    pub fn tone(&self) -> Tone {
        match self {
            TargetStatus::WithinTarget | TargetStatus::GoalReached => Tone::Good,
            TargetStatus::AboveTarget | TargetStatus::BelowGoal => Tone::Warning,
            TargetStatus::WellAboveTarget | TargetStatus::WellBelowGoal => Tone::Danger,
        }
    }
}

/// `actual` and `target` are both percentages of income.
pub fn target_status(category: ExpenseCategory, actual: Decimal, target: Decimal) -> TargetStatus {
    if category == ExpenseCategory::Risparmi {
        if actual >= target {
            TargetStatus::GoalReached
        } else if actual >= target * warning_ratio() {
            TargetStatus::BelowGoal
        } else {
            TargetStatus::WellBelowGoal
        }
    } else if actual <= target {
        TargetStatus::WithinTarget
    } else if actual <= target * over_budget_factor() {
        TargetStatus::AboveTarget
    } else {
        TargetStatus::WellAboveTarget
    }
}

#[derive(Debug, Clone, Serialize)]
pub struct CategoryAnalysis {
    pub category: ExpenseCategory,
    pub name: &'static str,
    pub amount: Decimal,
    /// Zero when the month has no income.
    pub percentage_of_income: Decimal,
    pub target_percentage: Decimal,
    pub trend: Decimal,
    pub status: TargetStatus,
}

pub fn category_analysis(current: &MonthStats, trends: &Trends) -> Vec<CategoryAnalysis> {
    let targets = insight_target_percentages();
    current
        .expenses_by_category
        .iter()
        .map(|(cat, amount)| {
            let percentage_of_income = if current.total_income > Decimal::ZERO {
                percent_of(*amount, current.total_income)
            } else {
                Decimal::ZERO
            };
            let target = *targets.get(cat);
            CategoryAnalysis {
                category: cat,
                name: cat.display_name(),
                amount: *amount,
                percentage_of_income,
                target_percentage: target,
                trend: *trends.category_trends.get(cat),
                status: target_status(cat, percentage_of_income, target),
            }
        })
        .collect()
}

/// One month of the history view.
#[derive(Debug, Clone, Serialize)]
pub struct HistoricalMonth {
    pub month: String,
    #[serde(flatten)]
    pub stats: MonthStats,
    pub savings: Decimal,
    /// Share of the month's income spent per category.
    pub expense_percentages: ByCategory<Decimal>,
}

pub fn historical_month(month: &str, transactions: &[Transaction]) -> HistoricalMonth {
    let stats = aggregate(transactions);
    let expense_percentages = if stats.total_income > Decimal::ZERO {
        ByCategory::from_fn(|c| percent_of(*stats.expenses_by_category.get(c), stats.total_income))
    } else {
        ByCategory::default()
    };
    HistoricalMonth {
        month: month.to_string(),
        savings: stats.net_balance,
        stats,
        expense_percentages,
    }
}

#[derive(Debug, Clone, Serialize)]
pub struct SpendingInsights {
    pub current_month: MonthStats,
    pub last_month: MonthStats,
    pub trends: Trends,
    pub insights: Vec<String>,
    pub category_analysis: Vec<CategoryAnalysis>,
    pub comparison_month: String,
}

pub fn spending_insights(
    current: &[Transaction],
    previous: &[Transaction],
    comparison_month: &str,
) -> SpendingInsights {
    let current_month = aggregate(current);
    let last_month = aggregate(previous);
    let trends = trend(&last_month, &current_month);
    let insights = generate_insights(&current_month, &last_month, &trends);
    let category_analysis = category_analysis(&current_month, &trends);
    SpendingInsights {
        current_month,
        last_month,
        trends,
        insights,
        category_analysis,
        comparison_month: comparison_month.to_string(),
    }
}
