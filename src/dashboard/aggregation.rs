//! Pure selectors that turn the transaction collection into dashboard
//! numbers.
//!
//! Every function here takes plain slices and returns plain values, so the
//! dashboard math can be tested without a database or a request. The caller
//! applies the period filter first; only [total_balance] deliberately ignores
//! it.

use std::collections::HashMap;

use time::Date;

use crate::{
    account::Account,
    card::Card,
    html::month_abbreviation,
    transaction::{Transaction, TransactionKind},
};

/// The label spending without a category is grouped under.
pub(super) const UNCATEGORIZED_LABEL: &str = "Uncategorized";

/// The monthly income and expense series behind the cash-flow chart.
///
/// The vectors are index-aligned: `income[i]` and `expenses[i]` are the
/// totals for the month named by `labels[i]`.
#[derive(Debug, Clone, Default, PartialEq)]
pub(super) struct MonthlyCashFlow {
    pub labels: Vec<String>,
    pub income: Vec<f64>,
    pub expenses: Vec<f64>,
}

/// The balance across every account minus every card's open statement.
///
/// A point-in-time snapshot: the active filter never changes this number.
pub(super) fn total_balance(accounts: &[Account], cards: &[Card]) -> f64 {
    let account_total: f64 = accounts.iter().map(|account| account.balance).sum();
    let invoice_total: f64 = cards.iter().map(|card| card.current_invoice).sum();

    account_total - invoice_total
}

pub(super) fn income_for_period(transactions: &[Transaction]) -> f64 {
    sum_of_kind(transactions, TransactionKind::Income)
}

pub(super) fn expenses_for_period(transactions: &[Transaction]) -> f64 {
    sum_of_kind(transactions, TransactionKind::Expense)
}

fn sum_of_kind(transactions: &[Transaction], kind: TransactionKind) -> f64 {
    transactions
        .iter()
        .filter(|transaction| transaction.kind == kind)
        .map(|transaction| transaction.amount)
        .sum()
}

/// The fraction of income left after expenses, 0 when there is no income.
pub(super) fn savings_rate(income: f64, expenses: f64) -> f64 {
    if income == 0.0 {
        return 0.0;
    }

    (income - expenses) / income
}

/// The fraction of period income a category's spending consumed, 0 when
/// there is no income.
///
/// The divisor is income, not total expenses, so the number reads as "this
/// category ate N% of what came in".
pub(super) fn category_percentage(category_total: f64, income: f64) -> f64 {
    if income == 0.0 {
        return 0.0;
    }

    category_total / income
}

/// Expense totals grouped by category name, largest first.
pub(super) fn expenses_by_category(transactions: &[Transaction]) -> Vec<(String, f64)> {
    let mut totals: HashMap<&str, f64> = HashMap::new();

    for transaction in transactions {
        if transaction.kind != TransactionKind::Expense {
            continue;
        }

        let category = if transaction.category.is_empty() {
            UNCATEGORIZED_LABEL
        } else {
            transaction.category.as_str()
        };

        *totals.entry(category).or_insert(0.0) += transaction.amount;
    }

    let mut grouped: Vec<(String, f64)> = totals
        .into_iter()
        .map(|(category, total)| (category.to_owned(), total))
        .collect();

    // Ties break alphabetically so the order is stable between renders.
    grouped.sort_by(|a, b| b.1.total_cmp(&a.1).then_with(|| a.0.cmp(&b.0)));

    grouped
}

/// Income and expense totals bucketed by calendar month, oldest first.
pub(super) fn monthly_cash_flow(transactions: &[Transaction]) -> MonthlyCashFlow {
    let mut totals_by_month: HashMap<Date, (f64, f64)> = HashMap::new();

    for transaction in transactions {
        let month = transaction.date.replace_day(1).unwrap();
        let entry = totals_by_month.entry(month).or_insert((0.0, 0.0));

        match transaction.kind {
            TransactionKind::Income => entry.0 += transaction.amount,
            TransactionKind::Expense => entry.1 += transaction.amount,
        }
    }

    let mut sorted_months: Vec<Date> = totals_by_month.keys().copied().collect();
    sorted_months.sort();

    MonthlyCashFlow {
        labels: sorted_months.iter().map(|month| month_label(*month)).collect(),
        income: sorted_months
            .iter()
            .map(|month| totals_by_month[month].0)
            .collect(),
        expenses: sorted_months
            .iter()
            .map(|month| totals_by_month[month].1)
            .collect(),
    }
}

fn month_label(month: Date) -> String {
    format!("{} {}", month_abbreviation(month.month()), month.year())
}
