//! Card components for the dashboard.
//!
//! Provides the headline stat cards (total balance, income, expenses and
//! savings rate) and the per-category spending breakdown.

use maud::{Markup, html};

use crate::html::{currency_rounded_with_tooltip, format_currency};

/// A category's spending within the filtered period.
#[derive(Debug, Clone, PartialEq)]
pub(super) struct CategoryShare {
    pub name: String,
    pub amount: f64,
    /// Fraction of the period's income spent on this category, `0.0` when
    /// the period had no income.
    pub share_of_income: f64,
}

/// Formats a percentage value, avoiding "-0%" display.
fn format_percentage(value: f64) -> String {
    let rounded = value.round();
    if rounded.abs() < 0.5 {
        "0".to_string()
    } else {
        format!("{:.0}", rounded)
    }
}

/// Renders the four headline stat cards.
///
/// Total balance is a snapshot across every account and card; the other
/// three stats cover the filtered period only.
pub(super) fn stat_cards_view(
    total_balance: f64,
    income: f64,
    expenses: f64,
    savings_rate: f64,
) -> Markup {
    html! {
        section class="w-full mx-auto mt-6" {
            div class="grid grid-cols-1 sm:grid-cols-2 lg:grid-cols-4 gap-4" {
                (stat_card(
                    "Total balance",
                    "total-balance",
                    currency_rounded_with_tooltip(total_balance),
                    "Accounts minus card invoices",
                ))
                (stat_card(
                    "Income",
                    "income",
                    currency_rounded_with_tooltip(income),
                    "In the filtered period",
                ))
                (stat_card(
                    "Expenses",
                    "expenses",
                    currency_rounded_with_tooltip(expenses),
                    "In the filtered period",
                ))
                (stat_card(
                    "Savings rate",
                    "savings-rate",
                    html! { (format_percentage(savings_rate * 100.0)) "%" },
                    "Income kept after expenses",
                ))
            }
        }
    }
}

/// Renders a single stat card.
///
/// `stat` becomes a `data-stat` attribute so the value can be picked out
/// of the page without relying on styling classes.
fn stat_card(label: &str, stat: &str, value: Markup, note: &str) -> Markup {
    html! {
        div class="bg-white dark:bg-gray-800 border border-gray-200
                   dark:border-gray-700 rounded-lg p-4 shadow-md" {
            h4 class="text-sm font-medium text-gray-600 dark:text-gray-400 mb-2" {
                (label)
            }
            div class="text-3xl font-bold mb-1" data-stat=(stat) {
                (value)
            }
            div class="text-sm text-gray-600 dark:text-gray-400" {
                (note)
            }
        }
    }
}

/// Renders the per-category spending breakdown for the filtered period.
///
/// Shows one card per category, largest spend first, each with its share of
/// the period's income.
pub(super) fn category_breakdown_view(categories: &[CategoryShare]) -> Markup {
    if categories.is_empty() {
        return empty_breakdown_view();
    }

    html! {
        section class="w-full mx-auto mt-8 mb-8" {
            div class="flex justify-between items-baseline mb-4" {
                h3 class="text-xl font-semibold" {
                    "Category breakdown"
                }
                span class="text-sm text-gray-600 dark:text-gray-400" {
                    "Share of income"
                }
            }

            div class="grid grid-cols-1 sm:grid-cols-2 md:grid-cols-3 lg:grid-cols-4 gap-4" {
                @for category in categories {
                    (category_card(category))
                }
            }
        }
    }
}

/// Renders a single category breakdown card.
fn category_card(category: &CategoryShare) -> Markup {
    let share_percentage = category.share_of_income * 100.0;

    html! {
        div class="bg-white dark:bg-gray-800 border border-gray-200
                   dark:border-gray-700 rounded-lg p-4 shadow-md" {
            h4 class="text-lg font-semibold mb-3 truncate" title=(category.name) {
                (category.name)
            }

            div class="text-3xl font-bold mb-1" {
                (format_currency(category.amount))
            }

            div class="text-sm text-gray-600 dark:text-gray-400 mb-2" {
                (format_percentage(share_percentage)) "% of income"
            }

            (progress_bar(share_percentage))
        }
    }
}

/// Renders a horizontal progress bar showing a category's share of income.
fn progress_bar(percentage: f64) -> Markup {
    let clamped = percentage.clamp(0.0, 100.0);

    // Ensure minimum 3% width so rounded corners are visible
    let display_percentage = if clamped > 0.0 && clamped < 3.0 {
        3.0
    } else {
        clamped
    };

    html! {
        div
            class="w-full bg-gray-200 dark:bg-gray-700 rounded-full h-2.5 mb-2"
            role="progressbar"
            aria-valuenow=(format_percentage(clamped))
            aria-valuemin="0"
            aria-valuemax="100"
        {
            @if clamped > 0.0 {
                div
                    class="bg-blue-600 dark:bg-blue-500 h-2.5 rounded-full transition-all"
                    style=(format!("width: {:.1}%", display_percentage))
                {}
            }
        }
    }
}

/// Renders a placeholder when the filtered period has no expenses.
fn empty_breakdown_view() -> Markup {
    html! {
        section class="w-full mx-auto mt-8 mb-8" {
            div class="bg-white dark:bg-gray-800 border border-gray-200
                       dark:border-gray-700 rounded-lg p-8 shadow-md
                       text-center max-w-md mx-auto" {
                h3 class="text-xl font-semibold mb-3" {
                    "No expenses in this period."
                }
                p class="text-sm text-gray-600 dark:text-gray-400" {
                    "The category breakdown fills in once expenses land in the filtered range."
                }
            }
        }
    }
}
