//! Core types for recurring transaction templates.

use std::fmt::Display;

use rusqlite::{
    ToSql,
    types::{FromSql, FromSqlError, FromSqlResult, ToSqlOutput, ValueRef},
};
use serde::{Deserialize, Serialize};
use time::{Date, Weekday};

use crate::{account::AccountId, card::DayOfMonth, member::MemberId, transaction::TransactionKind};

/// Database identifier for a recurring template.
pub type TemplateId = i64;

/// How often a recurring template produces a transaction.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Frequency {
    Daily,
    Weekly,
    Monthly,
    Yearly,
}

impl Frequency {
    pub const ALL: [Frequency; 4] = [
        Frequency::Daily,
        Frequency::Weekly,
        Frequency::Monthly,
        Frequency::Yearly,
    ];

    /// The capitalized name shown in form selects.
    pub fn label(self) -> &'static str {
        match self {
            Frequency::Daily => "Daily",
            Frequency::Weekly => "Weekly",
            Frequency::Monthly => "Monthly",
            Frequency::Yearly => "Yearly",
        }
    }
}

impl Display for Frequency {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let text = match self {
            Frequency::Daily => "daily",
            Frequency::Weekly => "weekly",
            Frequency::Monthly => "monthly",
            Frequency::Yearly => "yearly",
        };

        write!(f, "{text}")
    }
}

impl ToSql for Frequency {
    fn to_sql(&self) -> rusqlite::Result<ToSqlOutput<'_>> {
        let text = match self {
            Frequency::Daily => "daily",
            Frequency::Weekly => "weekly",
            Frequency::Monthly => "monthly",
            Frequency::Yearly => "yearly",
        };

        Ok(text.into())
    }
}

impl FromSql for Frequency {
    fn column_result(value: ValueRef<'_>) -> FromSqlResult<Self> {
        match value.as_str()? {
            "daily" => Ok(Frequency::Daily),
            "weekly" => Ok(Frequency::Weekly),
            "monthly" => Ok(Frequency::Monthly),
            "yearly" => Ok(Frequency::Yearly),
            other => Err(FromSqlError::Other(
                format!("unknown frequency {other}").into(),
            )),
        }
    }
}

/// Convert an ISO weekday number (Monday is 1) back into a weekday.
pub(crate) fn weekday_from_iso(number: u8) -> Option<Weekday> {
    match number {
        1 => Some(Weekday::Monday),
        2 => Some(Weekday::Tuesday),
        3 => Some(Weekday::Wednesday),
        4 => Some(Weekday::Thursday),
        5 => Some(Weekday::Friday),
        6 => Some(Weekday::Saturday),
        7 => Some(Weekday::Sunday),
        _ => None,
    }
}

/// A schedule that stamps out concrete transactions at a fixed cadence.
///
/// Templates are not transactions themselves. The sync process reads each
/// active template and creates one transaction per elapsed period, linking it
/// back through the transaction's `template_id`.
#[derive(Debug, Clone, PartialEq)]
pub struct RecurringTemplate {
    /// The ID of the template.
    pub id: TemplateId,
    /// The amount each generated transaction is for, always zero or greater.
    pub amount: f64,
    /// The description copied onto each generated transaction.
    pub description: String,
    /// Whether the generated transactions are income or expenses.
    pub kind: TransactionKind,
    /// The category name copied onto each generated transaction, or an empty
    /// string for uncategorized.
    pub category: String,
    /// How often a transaction is generated.
    pub frequency: Frequency,
    /// The weekday a weekly schedule lands on. Unused by other frequencies.
    pub day_of_week: Option<Weekday>,
    /// The day a monthly schedule lands on, clamped to the month's length.
    /// Unused by other frequencies.
    pub day_of_month: Option<DayOfMonth>,
    /// The first day the schedule covers. Yearly schedules anchor to this
    /// date's month and day.
    pub start_date: Date,
    /// The last day the schedule covers, if it ever ends.
    pub end_date: Option<Date>,
    /// The account the generated transactions draw from, if any.
    pub account_id: Option<AccountId>,
    /// The family member the generated transactions belong to, if any.
    pub member_id: Option<MemberId>,
    /// Whether the sync process should still generate transactions.
    pub active: bool,
    /// The date of the latest occurrence generated so far. The next sync
    /// resumes the day after this, which is what makes syncing idempotent.
    pub last_materialized: Option<Date>,
}

/// The details of a recurring template before it has been given an ID.
///
/// [TemplateBuilder::new] fills the optional fields with defaults; set the
/// rest with struct update syntax.
#[derive(Debug, Clone, PartialEq)]
pub struct TemplateBuilder {
    /// The amount each generated transaction is for, always zero or greater.
    pub amount: f64,
    /// The description copied onto each generated transaction.
    pub description: String,
    /// Whether the generated transactions are income or expenses.
    pub kind: TransactionKind,
    /// The category name copied onto each generated transaction. Defaults to
    /// the empty string (uncategorized).
    pub category: String,
    /// How often a transaction is generated.
    pub frequency: Frequency,
    /// The weekday a weekly schedule lands on. Required for weekly schedules.
    pub day_of_week: Option<Weekday>,
    /// The day a monthly schedule lands on. Required for monthly schedules.
    pub day_of_month: Option<DayOfMonth>,
    /// The first day the schedule covers.
    pub start_date: Date,
    /// The last day the schedule covers. Defaults to no end.
    pub end_date: Option<Date>,
    /// The account the generated transactions draw from, if any.
    pub account_id: Option<AccountId>,
    /// The family member the generated transactions belong to, if any.
    pub member_id: Option<MemberId>,
    /// Whether the sync process should generate transactions. Defaults to
    /// true.
    pub active: bool,
}

impl TemplateBuilder {
    /// Create a builder with the required fields set and everything else
    /// defaulted.
    pub fn new(
        amount: f64,
        start_date: Date,
        description: &str,
        kind: TransactionKind,
        frequency: Frequency,
    ) -> Self {
        Self {
            amount,
            description: description.to_owned(),
            kind,
            category: String::new(),
            frequency,
            day_of_week: None,
            day_of_month: None,
            start_date,
            end_date: None,
            account_id: None,
            member_id: None,
            active: true,
        }
    }
}
