//! Core transaction domain types.

use std::fmt::Display;

use rusqlite::{
    ToSql,
    types::{FromSql, FromSqlError, FromSqlResult, ToSqlOutput, ValueRef},
};
use serde::{Deserialize, Serialize};
use time::Date;

use crate::{
    Error, account::AccountId, card::CardId, member::MemberId, recurring::TemplateId,
};

/// Database identifier for a transaction.
pub type TransactionId = i64;

/// Whether a transaction adds money to the household or spends it.
///
/// Amounts are stored as magnitudes, so the kind carries the sign.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TransactionKind {
    Income,
    Expense,
}

impl Display for TransactionKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            TransactionKind::Income => write!(f, "income"),
            TransactionKind::Expense => write!(f, "expense"),
        }
    }
}

impl ToSql for TransactionKind {
    fn to_sql(&self) -> rusqlite::Result<ToSqlOutput<'_>> {
        let text = match self {
            TransactionKind::Income => "income",
            TransactionKind::Expense => "expense",
        };

        Ok(text.into())
    }
}

impl FromSql for TransactionKind {
    fn column_result(value: ValueRef<'_>) -> FromSqlResult<Self> {
        match value.as_str()? {
            "income" => Ok(TransactionKind::Income),
            "expense" => Ok(TransactionKind::Expense),
            other => Err(FromSqlError::Other(
                format!("unknown transaction kind {other}").into(),
            )),
        }
    }
}

/// Where a transaction sits in its lifecycle.
///
/// Occurrences materialized from a recurring template start out pending when
/// they are dated after today.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TransactionStatus {
    Pending,
    Completed,
}

impl ToSql for TransactionStatus {
    fn to_sql(&self) -> rusqlite::Result<ToSqlOutput<'_>> {
        let text = match self {
            TransactionStatus::Pending => "pending",
            TransactionStatus::Completed => "completed",
        };

        Ok(text.into())
    }
}

impl FromSql for TransactionStatus {
    fn column_result(value: ValueRef<'_>) -> FromSqlResult<Self> {
        match value.as_str()? {
            "pending" => Ok(TransactionStatus::Pending),
            "completed" => Ok(TransactionStatus::Completed),
            other => Err(FromSqlError::Other(
                format!("unknown transaction status {other}").into(),
            )),
        }
    }
}

/// How a purchase is split across statement periods, e.g. payment 2 of 12.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Installments {
    current: u32,
    total: u32,
}

impl Installments {
    /// A regular, unsplit payment.
    pub const NONE: Self = Self {
        current: 1,
        total: 1,
    };

    /// Create an installment marker for payment `current` of `total`.
    ///
    /// # Errors
    /// Returns [Error::InvalidInstallments] if either number is zero or
    /// `current` exceeds `total`.
    pub fn new(current: u32, total: u32) -> Result<Self, Error> {
        if current == 0 || total == 0 || current > total {
            return Err(Error::InvalidInstallments { current, total });
        }

        Ok(Self { current, total })
    }

    /// Reconstruct installments from stored values, skipping validation.
    pub(crate) fn new_unchecked(current: u32, total: u32) -> Self {
        Self { current, total }
    }

    /// The index of this payment, starting from one.
    pub fn current(self) -> u32 {
        self.current
    }

    /// How many payments the purchase is split across.
    pub fn total(self) -> u32 {
        self.total
    }

    /// Whether the purchase is split across more than one payment.
    pub fn is_split(self) -> bool {
        self.total > 1
    }
}

/// An income or expense record.
///
/// To create a new `Transaction`, fill a [TransactionBuilder] and pass it to
/// [create_transaction](crate::transaction::create_transaction).
#[derive(Debug, Clone, PartialEq)]
pub struct Transaction {
    /// The ID of the transaction.
    pub id: TransactionId,
    /// The amount of money spent or earned, always zero or greater.
    pub amount: f64,
    /// When the transaction happened.
    pub date: Date,
    /// A text description of what the transaction was for.
    pub description: String,
    /// Whether the amount was earned or spent.
    pub kind: TransactionKind,
    /// The name of the category the transaction belongs to, or an empty
    /// string for uncategorized transactions.
    pub category: String,
    /// Whether the transaction has settled yet.
    pub status: TransactionStatus,
    /// The account the money moved through, if any.
    pub account_id: Option<AccountId>,
    /// The card the purchase was made with, if any.
    pub card_id: Option<CardId>,
    /// The family member the transaction belongs to, if any.
    pub member_id: Option<MemberId>,
    /// The recurring template this transaction was materialized from, if any.
    pub template_id: Option<TemplateId>,
    /// Which payment of a split purchase this is.
    pub installments: Installments,
}

/// The details of a transaction before it has been given an ID.
///
/// [TransactionBuilder::new] fills the optional fields with defaults; set the
/// rest with struct update syntax:
///
/// ```ignore
/// let builder = TransactionBuilder {
///     category: "Groceries".to_string(),
///     ..TransactionBuilder::new(42.0, date, "Weekly shop", TransactionKind::Expense)
/// };
/// ```
#[derive(Debug, Clone, PartialEq)]
pub struct TransactionBuilder {
    /// The amount of money spent or earned, always zero or greater.
    pub amount: f64,
    /// When the transaction happened.
    pub date: Date,
    /// A text description of what the transaction was for.
    pub description: String,
    /// Whether the amount was earned or spent.
    pub kind: TransactionKind,
    /// The name of the category the transaction belongs to. Defaults to the
    /// empty string (uncategorized).
    pub category: String,
    /// Whether the transaction has settled yet. Defaults to completed.
    pub status: TransactionStatus,
    /// The account the money moved through, if any.
    pub account_id: Option<AccountId>,
    /// The card the purchase was made with, if any. A transaction is paid
    /// from at most one of account or card.
    pub card_id: Option<CardId>,
    /// The family member the transaction belongs to, if any.
    pub member_id: Option<MemberId>,
    /// The recurring template this transaction was materialized from, if any.
    pub template_id: Option<TemplateId>,
    /// Which payment of a split purchase this is. Defaults to
    /// [Installments::NONE].
    pub installments: Installments,
}

impl TransactionBuilder {
    /// Create a builder with the required fields set and everything else
    /// defaulted.
    pub fn new(amount: f64, date: Date, description: &str, kind: TransactionKind) -> Self {
        Self {
            amount,
            date,
            description: description.to_owned(),
            kind,
            category: String::new(),
            status: TransactionStatus::Completed,
            account_id: None,
            card_id: None,
            member_id: None,
            template_id: None,
            installments: Installments::NONE,
        }
    }
}
