//! Database operations for recurring transaction templates.

use rusqlite::{Connection, Row, params};
use time::Date;

use crate::{
    Error,
    card::DayOfMonth,
    recurring::{
        Frequency, RecurringTemplate, TemplateBuilder, TemplateId,
        domain::weekday_from_iso,
    },
    transaction::check_category_kind,
};

const TEMPLATE_COLUMNS: &str = "id, amount, description, kind, category, frequency, day_of_week, \
    day_of_month, start_date, end_date, account_id, member_id, active, last_materialized";

/// Create a recurring template and return it with its generated ID.
///
/// # Errors
/// Returns [Error::NegativeAmount] if the amount is below zero,
/// [Error::MissingScheduleAnchor] if the frequency needs an anchor day that
/// was not given, [Error::InvalidScheduleBounds] if the end date is not after
/// the start date, [Error::CategoryKindMismatch] if the category tracks the
/// opposite kind, or [Error::InvalidReference] if a referenced row does not
/// exist.
pub fn create_template(
    template: TemplateBuilder,
    connection: &Connection,
) -> Result<RecurringTemplate, Error> {
    validate(&template, connection)?;

    connection.execute(
        "INSERT INTO recurring_template (amount, description, kind, category, frequency,
        day_of_week, day_of_month, start_date, end_date, account_id, member_id, active)
        VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, ?10, ?11, ?12)",
        params![
            template.amount,
            template.description,
            template.kind,
            template.category,
            template.frequency,
            template.day_of_week.map(|weekday| weekday.number_from_monday()),
            template.day_of_month.map(DayOfMonth::get),
            template.start_date,
            template.end_date,
            template.account_id,
            template.member_id,
            template.active,
        ],
    )?;

    let id = connection.last_insert_rowid();

    Ok(RecurringTemplate {
        id,
        amount: template.amount,
        description: template.description,
        kind: template.kind,
        category: template.category,
        frequency: template.frequency,
        day_of_week: template.day_of_week,
        day_of_month: template.day_of_month,
        start_date: template.start_date,
        end_date: template.end_date,
        account_id: template.account_id,
        member_id: template.member_id,
        active: template.active,
        last_materialized: None,
    })
}

/// Retrieve a single template by ID.
pub fn get_template(
    template_id: TemplateId,
    connection: &Connection,
) -> Result<RecurringTemplate, Error> {
    connection
        .prepare(&format!(
            "SELECT {TEMPLATE_COLUMNS} FROM recurring_template WHERE id = :id"
        ))?
        .query_row(&[(":id", &template_id)], map_row)
        .map_err(Error::from)
}

/// Retrieve all templates ordered alphabetically by description.
pub fn get_all_templates(connection: &Connection) -> Result<Vec<RecurringTemplate>, Error> {
    connection
        .prepare(&format!(
            "SELECT {TEMPLATE_COLUMNS} FROM recurring_template ORDER BY description ASC"
        ))?
        .query_map([], map_row)?
        .map(|maybe_template| maybe_template.map_err(Error::from))
        .collect()
}

/// Retrieve the templates the sync process should generate transactions for,
/// in a stable processing order.
pub fn get_active_templates(connection: &Connection) -> Result<Vec<RecurringTemplate>, Error> {
    connection
        .prepare(&format!(
            "SELECT {TEMPLATE_COLUMNS} FROM recurring_template WHERE active = 1 ORDER BY id ASC"
        ))?
        .query_map([], map_row)?
        .map(|maybe_template| maybe_template.map_err(Error::from))
        .collect()
}

/// Update a template's details. Updating a template that does not exist is a
/// no-op.
///
/// The last materialized date is left untouched; only the sync process writes
/// it.
///
/// # Errors
/// Returns the same validation errors as [create_template].
pub fn update_template(
    template_id: TemplateId,
    template: TemplateBuilder,
    connection: &Connection,
) -> Result<(), Error> {
    validate(&template, connection)?;

    let rows_affected = connection.execute(
        "UPDATE recurring_template SET amount = ?1, description = ?2, kind = ?3, category = ?4,
        frequency = ?5, day_of_week = ?6, day_of_month = ?7, start_date = ?8, end_date = ?9,
        account_id = ?10, member_id = ?11, active = ?12
        WHERE id = ?13",
        params![
            template.amount,
            template.description,
            template.kind,
            template.category,
            template.frequency,
            template.day_of_week.map(|weekday| weekday.number_from_monday()),
            template.day_of_month.map(DayOfMonth::get),
            template.start_date,
            template.end_date,
            template.account_id,
            template.member_id,
            template.active,
            template_id,
        ],
    )?;

    if rows_affected == 0 {
        tracing::debug!("no recurring template with ID {template_id} to update");
    }

    Ok(())
}

/// Delete a template by ID. Deleting a template that does not exist is a
/// no-op.
///
/// Transactions generated from the template are kept and their template
/// reference is cleared by the schema's ON DELETE SET NULL clause.
pub fn delete_template(template_id: TemplateId, connection: &Connection) -> Result<(), Error> {
    let rows_affected =
        connection.execute("DELETE FROM recurring_template WHERE id = ?1", [template_id])?;

    if rows_affected == 0 {
        tracing::debug!("no recurring template with ID {template_id} to delete");
    }

    Ok(())
}

/// Advance a template's materialization watermark to `date`.
///
/// The next sync generates occurrences starting the day after `date`.
pub fn record_materialized_through(
    template_id: TemplateId,
    date: Date,
    connection: &Connection,
) -> Result<(), Error> {
    let rows_affected = connection.execute(
        "UPDATE recurring_template SET last_materialized = ?1 WHERE id = ?2",
        params![date, template_id],
    )?;

    if rows_affected == 0 {
        tracing::debug!("no recurring template with ID {template_id} to record");
    }

    Ok(())
}

/// Initialize the recurring template table.
pub fn create_recurring_template_table(connection: &Connection) -> Result<(), rusqlite::Error> {
    connection.execute_batch(
        "CREATE TABLE IF NOT EXISTS recurring_template (
            id INTEGER PRIMARY KEY,
            amount REAL NOT NULL,
            description TEXT NOT NULL,
            kind TEXT NOT NULL,
            category TEXT NOT NULL DEFAULT '',
            frequency TEXT NOT NULL,
            day_of_week INTEGER,
            day_of_month INTEGER,
            start_date TEXT NOT NULL,
            end_date TEXT,
            account_id INTEGER REFERENCES account(id) ON DELETE SET NULL,
            member_id INTEGER REFERENCES member(id) ON DELETE SET NULL,
            active INTEGER NOT NULL DEFAULT 1,
            last_materialized TEXT
        );",
    )?;

    Ok(())
}

fn validate(template: &TemplateBuilder, connection: &Connection) -> Result<(), Error> {
    if template.amount < 0.0 {
        return Err(Error::NegativeAmount(template.amount));
    }

    match template.frequency {
        Frequency::Weekly if template.day_of_week.is_none() => {
            return Err(Error::MissingScheduleAnchor(Frequency::Weekly));
        }
        Frequency::Monthly if template.day_of_month.is_none() => {
            return Err(Error::MissingScheduleAnchor(Frequency::Monthly));
        }
        _ => {}
    }

    if let Some(end_date) = template.end_date {
        if end_date <= template.start_date {
            return Err(Error::InvalidScheduleBounds);
        }
    }

    check_category_kind(&template.category, template.kind, connection)
}

fn map_row(row: &Row) -> Result<RecurringTemplate, rusqlite::Error> {
    let day_of_week: Option<u8> = row.get(6)?;
    let day_of_month: Option<u8> = row.get(7)?;

    Ok(RecurringTemplate {
        id: row.get(0)?,
        amount: row.get(1)?,
        description: row.get(2)?,
        kind: row.get(3)?,
        category: row.get(4)?,
        frequency: row.get(5)?,
        day_of_week: day_of_week.and_then(weekday_from_iso),
        day_of_month: day_of_month.map(DayOfMonth::new_unchecked),
        start_date: row.get(8)?,
        end_date: row.get(9)?,
        account_id: row.get(10)?,
        member_id: row.get(11)?,
        active: row.get(12)?,
        last_materialized: row.get(13)?,
    })
}

#[cfg(test)]
mod template_db_tests {
    use rusqlite::Connection;
    use time::{Weekday, macros::date};

    use crate::{
        Error,
        card::DayOfMonth,
        category::CategoryName,
        db::initialize,
        recurring::{Frequency, TemplateBuilder},
        transaction::TransactionKind,
    };

    use super::{
        create_template, delete_template, get_active_templates, get_all_templates, get_template,
        record_materialized_through, update_template,
    };

    fn get_test_db_connection() -> Connection {
        let connection = Connection::open_in_memory().unwrap();
        initialize(&connection).expect("Could not initialize database");
        connection
    }

    fn monthly_rent() -> TemplateBuilder {
        TemplateBuilder {
            day_of_month: Some(DayOfMonth::new_unchecked(5)),
            ..TemplateBuilder::new(
                1_800.0,
                date!(2024 - 01 - 01),
                "Rent",
                TransactionKind::Expense,
                Frequency::Monthly,
            )
        }
    }

    #[test]
    fn create_and_get_round_trip() {
        let connection = get_test_db_connection();
        let builder = TemplateBuilder {
            category: "Housing".to_string(),
            end_date: Some(date!(2024 - 12 - 31)),
            ..monthly_rent()
        };

        let created = create_template(builder, &connection).expect("Could not create template");

        assert!(created.id > 0);
        assert_eq!(created.last_materialized, None);

        let fetched = get_template(created.id, &connection).expect("Could not get template");
        assert_eq!(fetched, created);
    }

    #[test]
    fn get_template_with_invalid_id_returns_not_found() {
        let connection = get_test_db_connection();

        let result = get_template(999, &connection);

        assert_eq!(result, Err(Error::NotFound));
    }

    #[test]
    fn create_rejects_negative_amount() {
        let connection = get_test_db_connection();
        let builder = TemplateBuilder {
            amount: -1.0,
            ..monthly_rent()
        };

        let result = create_template(builder, &connection);

        assert_eq!(result, Err(Error::NegativeAmount(-1.0)));
    }

    #[test]
    fn create_rejects_weekly_without_a_weekday() {
        let connection = get_test_db_connection();
        let builder = TemplateBuilder::new(
            15.0,
            date!(2024 - 01 - 01),
            "Pocket money",
            TransactionKind::Expense,
            Frequency::Weekly,
        );

        let result = create_template(builder, &connection);

        assert_eq!(result, Err(Error::MissingScheduleAnchor(Frequency::Weekly)));
    }

    #[test]
    fn create_rejects_monthly_without_a_day() {
        let connection = get_test_db_connection();
        let builder = TemplateBuilder::new(
            1_800.0,
            date!(2024 - 01 - 01),
            "Rent",
            TransactionKind::Expense,
            Frequency::Monthly,
        );

        let result = create_template(builder, &connection);

        assert_eq!(
            result,
            Err(Error::MissingScheduleAnchor(Frequency::Monthly))
        );
    }

    #[test]
    fn create_rejects_end_date_on_or_before_start() {
        let connection = get_test_db_connection();

        for end_date in [date!(2024 - 01 - 01), date!(2023 - 12 - 31)] {
            let builder = TemplateBuilder {
                end_date: Some(end_date),
                ..monthly_rent()
            };

            let result = create_template(builder, &connection);

            assert_eq!(result, Err(Error::InvalidScheduleBounds));
        }
    }

    #[test]
    fn daily_needs_no_anchor() {
        let connection = get_test_db_connection();
        let builder = TemplateBuilder::new(
            4.5,
            date!(2024 - 01 - 01),
            "Coffee",
            TransactionKind::Expense,
            Frequency::Daily,
        );

        let result = create_template(builder, &connection);

        assert!(result.is_ok());
    }

    #[test]
    fn create_rejects_category_of_opposite_kind() {
        let connection = get_test_db_connection();
        crate::category::create_category(
            CategoryName::new_unchecked("Salary"),
            TransactionKind::Income,
            None,
            None,
            &connection,
        )
        .expect("Could not create test category");

        let builder = TemplateBuilder {
            category: "Salary".to_string(),
            ..monthly_rent()
        };

        let result = create_template(builder, &connection);

        assert_eq!(
            result,
            Err(Error::CategoryKindMismatch("Salary".to_string()))
        );
    }

    #[test]
    fn create_with_unknown_account_fails() {
        let connection = get_test_db_connection();
        let builder = TemplateBuilder {
            account_id: Some(999),
            ..monthly_rent()
        };

        let result = create_template(builder, &connection);

        assert_eq!(result, Err(Error::InvalidReference));
    }

    #[test]
    fn get_all_orders_by_description() {
        let connection = get_test_db_connection();
        for description in ["Rent", "Gym", "Power"] {
            let builder = TemplateBuilder {
                description: description.to_string(),
                ..monthly_rent()
            };
            create_template(builder, &connection).expect("Could not create template");
        }

        let templates = get_all_templates(&connection).expect("Could not get templates");

        let descriptions: Vec<&str> = templates
            .iter()
            .map(|template| template.description.as_str())
            .collect();
        assert_eq!(descriptions, vec!["Gym", "Power", "Rent"]);
    }

    #[test]
    fn get_active_templates_skips_inactive() {
        let connection = get_test_db_connection();
        create_template(monthly_rent(), &connection).expect("Could not create template");
        let inactive = TemplateBuilder {
            active: false,
            description: "Old gym".to_string(),
            ..monthly_rent()
        };
        create_template(inactive, &connection).expect("Could not create template");

        let templates = get_active_templates(&connection).expect("Could not get templates");

        assert_eq!(templates.len(), 1);
        assert_eq!(templates[0].description, "Rent");
    }

    #[test]
    fn update_template_succeeds_and_keeps_the_watermark() {
        let connection = get_test_db_connection();
        let template = create_template(monthly_rent(), &connection)
            .expect("Could not create template");
        record_materialized_through(template.id, date!(2024 - 03 - 05), &connection)
            .expect("Could not record watermark");

        let changes = TemplateBuilder {
            amount: 1_900.0,
            day_of_week: Some(Weekday::Friday),
            day_of_month: None,
            ..TemplateBuilder::new(
                1_900.0,
                date!(2024 - 01 - 01),
                "Rent",
                TransactionKind::Expense,
                Frequency::Weekly,
            )
        };
        update_template(template.id, changes, &connection).expect("Could not update template");

        let updated = get_template(template.id, &connection).expect("Could not get template");
        assert_eq!(updated.amount, 1_900.0);
        assert_eq!(updated.frequency, Frequency::Weekly);
        assert_eq!(updated.day_of_week, Some(Weekday::Friday));
        assert_eq!(updated.day_of_month, None);
        assert_eq!(updated.last_materialized, Some(date!(2024 - 03 - 05)));
    }

    #[test]
    fn update_template_with_missing_id_is_a_no_op() {
        let connection = get_test_db_connection();

        let result = update_template(999, monthly_rent(), &connection);

        assert_eq!(result, Ok(()));
        assert!(get_all_templates(&connection).unwrap().is_empty());
    }

    #[test]
    fn delete_template_succeeds() {
        let connection = get_test_db_connection();
        let template = create_template(monthly_rent(), &connection)
            .expect("Could not create template");

        delete_template(template.id, &connection).expect("Could not delete template");

        assert_eq!(get_template(template.id, &connection), Err(Error::NotFound));
    }

    #[test]
    fn delete_template_with_missing_id_is_a_no_op() {
        let connection = get_test_db_connection();

        let result = delete_template(999, &connection);

        assert_eq!(result, Ok(()));
    }

    #[test]
    fn record_materialized_through_is_read_back() {
        let connection = get_test_db_connection();
        let template = create_template(monthly_rent(), &connection)
            .expect("Could not create template");

        record_materialized_through(template.id, date!(2024 - 02 - 05), &connection)
            .expect("Could not record watermark");

        let fetched = get_template(template.id, &connection).expect("Could not get template");
        assert_eq!(fetched.last_materialized, Some(date!(2024 - 02 - 05)));
    }
}
