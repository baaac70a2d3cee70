//! In-memory predicates for narrowing transaction lists.

use serde::{Deserialize, Serialize};
use time::Date;

use crate::{
    member::MemberId,
    transaction::{Transaction, TransactionKind, range::DateRange},
};

/// Limits a transaction list to one kind, or keeps both.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum KindFilter {
    #[default]
    All,
    Income,
    Expense,
}

impl KindFilter {
    pub fn matches(self, kind: TransactionKind) -> bool {
        match self {
            Self::All => true,
            Self::Income => kind == TransactionKind::Income,
            Self::Expense => kind == TransactionKind::Expense,
        }
    }

    pub fn as_query_value(self) -> &'static str {
        match self {
            Self::All => "all",
            Self::Income => "income",
            Self::Expense => "expense",
        }
    }

    pub fn label(self) -> &'static str {
        match self {
            Self::All => "All",
            Self::Income => "Income",
            Self::Expense => "Expense",
        }
    }
}

/// The combined filter applied to the transactions page and the dashboard.
///
/// Every field is optional; an empty filter matches every transaction. The
/// search text matches against the description and the category name,
/// ignoring case.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct TransactionFilter {
    pub member_id: Option<MemberId>,
    pub kind: KindFilter,
    pub search: String,
    pub start_date: Option<Date>,
    pub end_date: Option<Date>,
}

impl TransactionFilter {
    /// A filter matching only the transactions dated within `range`.
    pub fn for_range(range: DateRange) -> Self {
        Self {
            start_date: Some(range.start),
            end_date: Some(range.end),
            ..Self::default()
        }
    }

    pub fn matches(&self, transaction: &Transaction) -> bool {
        if let Some(member_id) = self.member_id {
            if transaction.member_id != Some(member_id) {
                return false;
            }
        }

        if !self.kind.matches(transaction.kind) {
            return false;
        }

        if let Some(start_date) = self.start_date {
            if transaction.date < start_date {
                return false;
            }
        }

        if let Some(end_date) = self.end_date {
            if transaction.date > end_date {
                return false;
            }
        }

        let search = self.search.trim().to_lowercase();

        if search.is_empty() {
            return true;
        }

        transaction.description.to_lowercase().contains(&search)
            || transaction.category.to_lowercase().contains(&search)
    }
}
