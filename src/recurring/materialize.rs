//! Generating concrete transactions from recurring templates.

use rusqlite::Connection;
use time::{Date, Duration, Weekday};

use crate::{
    Error,
    recurring::{
        Frequency, RecurringTemplate,
        db::{get_active_templates, record_materialized_through},
    },
    transaction::{
        TransactionBuilder, TransactionStatus, create_transaction,
        range::{last_day_of_month, next_month},
    },
};

/// What a sync run did.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct MaterializeOutcome {
    /// How many transactions were created across all templates.
    pub transactions_created: usize,
    /// How many templates were brought up to date.
    pub templates_processed: usize,
    /// How many templates were skipped because they were malformed or their
    /// transactions could not be created.
    pub templates_skipped: usize,
}

/// Generate transactions for every elapsed period of every active template.
///
/// Templates are handled independently: a malformed template is logged and
/// counted as skipped without stopping the rest, and transactions that were
/// already created stay created.
pub fn materialize_recurring_transactions(
    connection: &Connection,
    today: Date,
) -> Result<MaterializeOutcome, Error> {
    let templates = get_active_templates(connection)?;
    let mut outcome = MaterializeOutcome::default();

    for template in templates {
        let dates = match occurrence_dates(&template, today) {
            Ok(dates) => dates,
            Err(error) => {
                tracing::warn!("skipping recurring template {}: {error}", template.id);
                outcome.templates_skipped += 1;
                continue;
            }
        };

        match materialize_template(&template, &dates, today, connection) {
            Ok(created) => {
                outcome.transactions_created += created;
                outcome.templates_processed += 1;
            }
            Err((created, error)) => {
                tracing::error!(
                    "stopping recurring template {} after {created} transactions: {error}",
                    template.id
                );
                outcome.transactions_created += created;
                outcome.templates_skipped += 1;
            }
        }
    }

    Ok(outcome)
}

/// Create one transaction per occurrence date, moving the template's
/// watermark forward as each one lands.
///
/// On failure, returns how many transactions were created before the error.
/// The watermark already covers them, so a later run picks up where this one
/// stopped.
fn materialize_template(
    template: &RecurringTemplate,
    dates: &[Date],
    today: Date,
    connection: &Connection,
) -> Result<usize, (usize, Error)> {
    let mut created = 0;

    for &date in dates {
        let status = if date <= today {
            TransactionStatus::Completed
        } else {
            TransactionStatus::Pending
        };

        let builder = TransactionBuilder {
            category: template.category.clone(),
            status,
            account_id: template.account_id,
            member_id: template.member_id,
            template_id: Some(template.id),
            ..TransactionBuilder::new(template.amount, date, &template.description, template.kind)
        };

        if let Err(error) = create_transaction(builder, connection) {
            return Err((created, error));
        }

        created += 1;

        if let Err(error) = record_materialized_through(template.id, date, connection) {
            return Err((created, error));
        }
    }

    Ok(created)
}

/// The dates `template` should generate transactions for, as of `today`.
///
/// An occurrence is emitted once the period containing it has started, so a
/// monthly bill due on the 25th shows up (as pending) from the first of the
/// month. Generation resumes the day after the template's last materialized
/// date, which keeps repeat runs from creating duplicates.
///
/// # Errors
/// Returns [Error::MissingScheduleAnchor] if the template's frequency needs
/// an anchor day that is not set.
pub(crate) fn occurrence_dates(
    template: &RecurringTemplate,
    today: Date,
) -> Result<Vec<Date>, Error> {
    let from = match template.last_materialized {
        Some(date) => match date.next_day() {
            Some(next) => next,
            None => return Ok(Vec::new()),
        },
        None => template.start_date,
    };
    let from = from.max(template.start_date);

    let dates = match template.frequency {
        Frequency::Daily => daily_occurrences(from, today),
        Frequency::Weekly => {
            let anchor = template
                .day_of_week
                .ok_or(Error::MissingScheduleAnchor(Frequency::Weekly))?;

            weekly_occurrences(from, today, anchor)
        }
        Frequency::Monthly => {
            let day = template
                .day_of_month
                .ok_or(Error::MissingScheduleAnchor(Frequency::Monthly))?;

            monthly_occurrences(from, today, day.get())
        }
        Frequency::Yearly => yearly_occurrences(from, today, template.start_date),
    };

    match template.end_date {
        Some(end_date) => Ok(dates
            .into_iter()
            .take_while(|date| *date <= end_date)
            .collect()),
        None => Ok(dates),
    }
}

fn daily_occurrences(from: Date, today: Date) -> Vec<Date> {
    let mut dates = Vec::new();
    let mut date = from;

    while date <= today {
        dates.push(date);

        let Some(next) = date.next_day() else {
            break;
        };
        date = next;
    }

    dates
}

fn weekly_occurrences(from: Date, today: Date, anchor: Weekday) -> Vec<Date> {
    let mut dates = Vec::new();
    // The Monday of the week containing `from`.
    let mut week_start = from - Duration::days(i64::from(from.weekday().number_days_from_monday()));

    while week_start <= today {
        let occurrence = week_start + Duration::days(i64::from(anchor.number_days_from_monday()));

        if occurrence >= from {
            dates.push(occurrence);
        }

        week_start += Duration::days(7);
    }

    dates
}

fn monthly_occurrences(from: Date, today: Date, day: u8) -> Vec<Date> {
    let mut dates = Vec::new();
    let (mut year, mut month) = (from.year(), from.month());

    loop {
        let month_start =
            Date::from_calendar_date(year, month, 1).expect("invalid month start date");
        if month_start > today {
            break;
        }

        let clamped_day = day.min(last_day_of_month(year, month));
        let occurrence =
            Date::from_calendar_date(year, month, clamped_day).expect("invalid occurrence date");

        if occurrence >= from {
            dates.push(occurrence);
        }

        (year, month) = next_month(year, month);
    }

    dates
}

fn yearly_occurrences(from: Date, today: Date, anchor: Date) -> Vec<Date> {
    let mut dates = Vec::new();
    let month = anchor.month();
    let mut year = from.year();

    loop {
        let month_start =
            Date::from_calendar_date(year, month, 1).expect("invalid month start date");
        if month_start > today {
            break;
        }

        let clamped_day = anchor.day().min(last_day_of_month(year, month));
        let occurrence =
            Date::from_calendar_date(year, month, clamped_day).expect("invalid occurrence date");

        if occurrence >= from {
            dates.push(occurrence);
        }

        year += 1;
    }

    dates
}
