//! Database queries for transactions.

use rusqlite::{Connection, Row, params};

use crate::{
    Error,
    transaction::{
        Installments, Transaction, TransactionBuilder, TransactionId, TransactionKind,
        range::DateRange,
    },
};

/// Create a new transaction in the database from a builder.
///
/// # Errors
/// This function will return a:
/// - [Error::NegativeAmount] if the amount is below zero,
/// - or [Error::ConflictingFundingSources] if both an account and a card are
///   referenced,
/// - or [Error::CategoryKindMismatch] if the category name is stored only
///   under the opposite kind,
/// - or [Error::InvalidReference] if a referenced row does not exist,
/// - or [Error::SqlError] if there is some other SQL error.
pub fn create_transaction(
    builder: TransactionBuilder,
    connection: &Connection,
) -> Result<Transaction, Error> {
    validate(&builder, connection)?;

    connection.execute(
        "INSERT INTO \"transaction\" (amount, date, description, kind, category, status,
            account_id, card_id, member_id, template_id, installment_current, installment_total)
            VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, ?10, ?11, ?12)",
        params![
            builder.amount,
            builder.date,
            builder.description,
            builder.kind,
            builder.category,
            builder.status,
            builder.account_id,
            builder.card_id,
            builder.member_id,
            builder.template_id,
            builder.installments.current(),
            builder.installments.total(),
        ],
    )?;

    let id = connection.last_insert_rowid();

    Ok(Transaction {
        id,
        amount: builder.amount,
        date: builder.date,
        description: builder.description,
        kind: builder.kind,
        category: builder.category,
        status: builder.status,
        account_id: builder.account_id,
        card_id: builder.card_id,
        member_id: builder.member_id,
        template_id: builder.template_id,
        installments: builder.installments,
    })
}

/// Retrieve a transaction from the database by its `id`.
///
/// # Errors
/// Returns [Error::NotFound] if the transaction does not exist, or
/// [Error::SqlError] if another SQL related error occurred.
pub fn get_transaction(
    id: TransactionId,
    connection: &Connection,
) -> Result<Transaction, Error> {
    connection
        .prepare(&format!(
            "SELECT {TRANSACTION_COLUMNS} FROM \"transaction\" WHERE id = :id"
        ))?
        .query_row(&[(":id", &id)], map_row)
        .map_err(Error::from)
}

/// Retrieve all transactions, newest first.
///
/// Rows are sorted by date descending and then ID descending, so a
/// transaction recorded today appears at the top of the list.
///
/// # Errors
/// Returns [Error::SqlError] if an SQL related error occurred.
pub fn get_all_transactions(connection: &Connection) -> Result<Vec<Transaction>, Error> {
    connection
        .prepare(&format!(
            "SELECT {TRANSACTION_COLUMNS} FROM \"transaction\" ORDER BY date DESC, id DESC"
        ))?
        .query_map((), map_row)?
        .map(|transaction| transaction.map_err(Error::from))
        .collect()
}

/// Retrieve the transactions dated within `range`, newest first.
///
/// Both ends of the range are inclusive.
///
/// # Errors
/// Returns [Error::SqlError] if an SQL related error occurred.
pub fn get_transactions_between(
    range: DateRange,
    connection: &Connection,
) -> Result<Vec<Transaction>, Error> {
    connection
        .prepare(&format!(
            "SELECT {TRANSACTION_COLUMNS} FROM \"transaction\"
            WHERE date BETWEEN :start AND :end
            ORDER BY date DESC, id DESC"
        ))?
        .query_map(&[(":start", &range.start), (":end", &range.end)], map_row)?
        .map(|transaction| transaction.map_err(Error::from))
        .collect()
}

/// Update the transaction with `id` to the details in `builder`.
///
/// Does nothing if the transaction does not exist. The template
/// back-reference is left untouched; only the recurring scheduler writes it.
///
/// # Errors
/// Returns the same validation errors as [create_transaction], or
/// [Error::SqlError] if another SQL related error occurred.
pub fn update_transaction(
    id: TransactionId,
    builder: TransactionBuilder,
    connection: &Connection,
) -> Result<(), Error> {
    validate(&builder, connection)?;

    let rows_affected = connection.execute(
        "UPDATE \"transaction\" SET amount = ?1, date = ?2, description = ?3, kind = ?4,
            category = ?5, status = ?6, account_id = ?7, card_id = ?8, member_id = ?9,
            installment_current = ?10, installment_total = ?11
            WHERE id = ?12",
        params![
            builder.amount,
            builder.date,
            builder.description,
            builder.kind,
            builder.category,
            builder.status,
            builder.account_id,
            builder.card_id,
            builder.member_id,
            builder.installments.current(),
            builder.installments.total(),
            id,
        ],
    )?;

    if rows_affected == 0 {
        tracing::debug!("no transaction with ID {id} to update");
    }

    Ok(())
}

/// Delete the transaction with `id`.
///
/// Does nothing if the transaction does not exist.
///
/// # Errors
/// Returns [Error::SqlError] if an SQL related error occurred.
pub fn delete_transaction(id: TransactionId, connection: &Connection) -> Result<(), Error> {
    let rows_affected =
        connection.execute("DELETE FROM \"transaction\" WHERE id = ?1", params![id])?;

    if rows_affected == 0 {
        tracing::debug!("no transaction with ID {id} to delete");
    }

    Ok(())
}

/// Create the transaction table in the database.
///
/// # Errors
/// Returns [Error::SqlError] if an SQL related error occurred.
pub fn create_transaction_table(connection: &Connection) -> Result<(), Error> {
    connection
        .execute_batch(
            "CREATE TABLE IF NOT EXISTS \"transaction\" (
            id INTEGER PRIMARY KEY,
            amount REAL NOT NULL,
            date TEXT NOT NULL,
            description TEXT NOT NULL,
            kind TEXT NOT NULL,
            category TEXT NOT NULL DEFAULT '',
            status TEXT NOT NULL DEFAULT 'completed',
            account_id INTEGER REFERENCES account(id) ON DELETE SET NULL,
            card_id INTEGER REFERENCES card(id) ON DELETE SET NULL,
            member_id INTEGER REFERENCES member(id) ON DELETE SET NULL,
            template_id INTEGER REFERENCES recurring_template(id) ON DELETE SET NULL,
            installment_current INTEGER NOT NULL DEFAULT 1,
            installment_total INTEGER NOT NULL DEFAULT 1
            );
            CREATE INDEX IF NOT EXISTS idx_transaction_date ON \"transaction\"(date);
            CREATE INDEX IF NOT EXISTS idx_transaction_template ON \"transaction\"(template_id);",
        )
        .map_err(Error::from)
}

const TRANSACTION_COLUMNS: &str = "id, amount, date, description, kind, category, status, \
    account_id, card_id, member_id, template_id, installment_current, installment_total";

fn validate(builder: &TransactionBuilder, connection: &Connection) -> Result<(), Error> {
    if builder.amount < 0.0 {
        return Err(Error::NegativeAmount(builder.amount));
    }

    if builder.account_id.is_some() && builder.card_id.is_some() {
        return Err(Error::ConflictingFundingSources);
    }

    check_category_kind(&builder.category, builder.kind, connection)
}

/// Reject a category name that is stored only under the opposite kind.
///
/// Category names matching no stored category pass as free text, so
/// transactions keep their category name after the category itself is
/// deleted.
pub(crate) fn check_category_kind(
    category: &str,
    kind: TransactionKind,
    connection: &Connection,
) -> Result<(), Error> {
    if category.is_empty() {
        return Ok(());
    }

    let stored_kinds: Vec<TransactionKind> = connection
        .prepare("SELECT kind FROM category WHERE name = :name")?
        .query_map(&[(":name", &category)], |row| row.get(0))?
        .collect::<Result<_, _>>()?;

    if stored_kinds.is_empty() || stored_kinds.contains(&kind) {
        Ok(())
    } else {
        Err(Error::CategoryKindMismatch(category.to_owned()))
    }
}

fn map_row(row: &Row) -> Result<Transaction, rusqlite::Error> {
    let installment_current: u32 = row.get(11)?;
    let installment_total: u32 = row.get(12)?;

    Ok(Transaction {
        id: row.get(0)?,
        amount: row.get(1)?,
        date: row.get(2)?,
        description: row.get(3)?,
        kind: row.get(4)?,
        category: row.get(5)?,
        status: row.get(6)?,
        account_id: row.get(7)?,
        card_id: row.get(8)?,
        member_id: row.get(9)?,
        template_id: row.get(10)?,
        installments: Installments::new_unchecked(installment_current, installment_total),
    })
}

#[cfg(test)]
mod transaction_query_tests {
    use rusqlite::Connection;
    use time::macros::date;

    use crate::{
        Error,
        account::{AccountName, create_account, delete_account},
        category::{CategoryName, create_category},
        db::initialize,
        transaction::{
            Installments, TransactionBuilder, TransactionKind, TransactionStatus,
            create_transaction, delete_transaction, get_all_transactions, get_transaction,
            get_transactions_between, range::DateRange, update_transaction,
        },
    };

    fn get_test_db_connection() -> Connection {
        let connection =
            Connection::open_in_memory().expect("Could not open in-memory SQLite database");
        initialize(&connection).expect("Could not initialize database");

        connection
    }

    #[test]
    fn create_and_get_round_trip() {
        let connection = get_test_db_connection();
        let account = create_account(
            AccountName::new_unchecked("Everyday"),
            "Kiwibank",
            100.0,
            None,
            &connection,
        )
        .expect("Could not create account");

        let created = create_transaction(
            TransactionBuilder {
                category: "Groceries".to_string(),
                status: TransactionStatus::Pending,
                account_id: Some(account.id),
                installments: Installments::new(2, 12).unwrap(),
                ..TransactionBuilder::new(
                    42.5,
                    date!(2024 - 03 - 05),
                    "Weekly shop",
                    TransactionKind::Expense,
                )
            },
            &connection,
        )
        .expect("Could not create transaction");

        let retrieved =
            get_transaction(created.id, &connection).expect("Could not retrieve transaction");

        assert_eq!(created, retrieved);
        assert_eq!(retrieved.status, TransactionStatus::Pending);
        assert_eq!(retrieved.installments, Installments::new(2, 12).unwrap());
    }

    #[test]
    fn get_transaction_with_invalid_id_returns_not_found() {
        let connection = get_test_db_connection();

        assert!(matches!(
            get_transaction(999, &connection),
            Err(Error::NotFound)
        ));
    }

    #[test]
    fn create_rejects_negative_amount() {
        let connection = get_test_db_connection();

        let result = create_transaction(
            TransactionBuilder::new(
                -1.0,
                date!(2024 - 03 - 05),
                "refund",
                TransactionKind::Expense,
            ),
            &connection,
        );

        assert_eq!(result, Err(Error::NegativeAmount(-1.0)));
    }

    #[test]
    fn create_rejects_two_funding_sources() {
        let connection = get_test_db_connection();

        let result = create_transaction(
            TransactionBuilder {
                account_id: Some(1),
                card_id: Some(1),
                ..TransactionBuilder::new(
                    10.0,
                    date!(2024 - 03 - 05),
                    "split payment",
                    TransactionKind::Expense,
                )
            },
            &connection,
        );

        assert_eq!(result, Err(Error::ConflictingFundingSources));
    }

    #[test]
    fn create_rejects_category_of_opposite_kind() {
        let connection = get_test_db_connection();
        create_category(
            CategoryName::new_unchecked("Salary"),
            TransactionKind::Income,
            None,
            None,
            &connection,
        )
        .expect("Could not create category");

        let result = create_transaction(
            TransactionBuilder {
                category: "Salary".to_string(),
                ..TransactionBuilder::new(
                    100.0,
                    date!(2024 - 03 - 05),
                    "mislabelled",
                    TransactionKind::Expense,
                )
            },
            &connection,
        );

        assert_eq!(
            result,
            Err(Error::CategoryKindMismatch("Salary".to_string()))
        );
    }

    #[test]
    fn create_allows_category_matching_kind() {
        let connection = get_test_db_connection();
        create_category(
            CategoryName::new_unchecked("Salary"),
            TransactionKind::Income,
            None,
            None,
            &connection,
        )
        .expect("Could not create category");

        let result = create_transaction(
            TransactionBuilder {
                category: "Salary".to_string(),
                ..TransactionBuilder::new(
                    100.0,
                    date!(2024 - 03 - 05),
                    "March pay",
                    TransactionKind::Income,
                )
            },
            &connection,
        );

        assert!(result.is_ok());
    }

    #[test]
    fn create_allows_free_text_category() {
        let connection = get_test_db_connection();

        let result = create_transaction(
            TransactionBuilder {
                category: "Petrol".to_string(),
                ..TransactionBuilder::new(
                    80.0,
                    date!(2024 - 03 - 05),
                    "fill up",
                    TransactionKind::Expense,
                )
            },
            &connection,
        );

        assert!(result.is_ok());
    }

    #[test]
    fn create_with_unknown_account_fails() {
        let connection = get_test_db_connection();

        let result = create_transaction(
            TransactionBuilder {
                account_id: Some(999),
                ..TransactionBuilder::new(
                    10.0,
                    date!(2024 - 03 - 05),
                    "",
                    TransactionKind::Expense,
                )
            },
            &connection,
        );

        assert_eq!(result, Err(Error::InvalidReference));
    }

    #[test]
    fn get_all_orders_newest_first() {
        let connection = get_test_db_connection();
        for (amount, date) in [
            (1.0, date!(2024 - 03 - 05)),
            (2.0, date!(2024 - 03 - 07)),
            (3.0, date!(2024 - 03 - 05)),
        ] {
            create_transaction(
                TransactionBuilder::new(amount, date, "", TransactionKind::Expense),
                &connection,
            )
            .expect("Could not create transaction");
        }

        let transactions =
            get_all_transactions(&connection).expect("Could not retrieve transactions");
        let amounts: Vec<f64> = transactions
            .iter()
            .map(|transaction| transaction.amount)
            .collect();

        // Most recent date first, and within a date the latest insert first.
        assert_eq!(amounts, vec![2.0, 3.0, 1.0]);
    }

    #[test]
    fn get_transactions_between_includes_the_bounds() {
        let connection = get_test_db_connection();
        for date in [
            date!(2024 - 02 - 29),
            date!(2024 - 03 - 01),
            date!(2024 - 03 - 15),
            date!(2024 - 03 - 31),
            date!(2024 - 04 - 01),
        ] {
            create_transaction(
                TransactionBuilder::new(1.0, date, "", TransactionKind::Expense),
                &connection,
            )
            .expect("Could not create transaction");
        }

        let transactions = get_transactions_between(
            DateRange {
                start: date!(2024 - 03 - 01),
                end: date!(2024 - 03 - 31),
            },
            &connection,
        )
        .expect("Could not retrieve transactions");

        let dates: Vec<_> = transactions
            .iter()
            .map(|transaction| transaction.date)
            .collect();
        assert_eq!(
            dates,
            vec![
                date!(2024 - 03 - 31),
                date!(2024 - 03 - 15),
                date!(2024 - 03 - 01)
            ]
        );
    }

    #[test]
    fn update_transaction_succeeds() {
        let connection = get_test_db_connection();
        let transaction = create_transaction(
            TransactionBuilder::new(
                10.0,
                date!(2024 - 03 - 05),
                "Lunch",
                TransactionKind::Expense,
            ),
            &connection,
        )
        .expect("Could not create transaction");

        update_transaction(
            transaction.id,
            TransactionBuilder {
                category: "Eating Out".to_string(),
                ..TransactionBuilder::new(
                    12.5,
                    date!(2024 - 03 - 06),
                    "Lunch with friends",
                    TransactionKind::Expense,
                )
            },
            &connection,
        )
        .expect("Could not update transaction");

        let updated =
            get_transaction(transaction.id, &connection).expect("Could not retrieve transaction");
        assert_eq!(updated.amount, 12.5);
        assert_eq!(updated.date, date!(2024 - 03 - 06));
        assert_eq!(updated.description, "Lunch with friends");
        assert_eq!(updated.category, "Eating Out");
    }

    #[test]
    fn update_rejects_negative_amount() {
        let connection = get_test_db_connection();
        let transaction = create_transaction(
            TransactionBuilder::new(10.0, date!(2024 - 03 - 05), "", TransactionKind::Expense),
            &connection,
        )
        .expect("Could not create transaction");

        let result = update_transaction(
            transaction.id,
            TransactionBuilder::new(-5.0, date!(2024 - 03 - 05), "", TransactionKind::Expense),
            &connection,
        );

        assert_eq!(result, Err(Error::NegativeAmount(-5.0)));
    }

    #[test]
    fn update_transaction_with_missing_id_is_a_no_op() {
        let connection = get_test_db_connection();

        let result = update_transaction(
            999,
            TransactionBuilder::new(1.0, date!(2024 - 03 - 05), "", TransactionKind::Expense),
            &connection,
        );

        assert!(result.is_ok());
        assert!(
            get_all_transactions(&connection)
                .expect("Could not retrieve transactions")
                .is_empty()
        );
    }

    #[test]
    fn delete_transaction_succeeds() {
        let connection = get_test_db_connection();
        let transaction = create_transaction(
            TransactionBuilder::new(10.0, date!(2024 - 03 - 05), "", TransactionKind::Expense),
            &connection,
        )
        .expect("Could not create transaction");

        delete_transaction(transaction.id, &connection).expect("Could not delete transaction");

        assert!(matches!(
            get_transaction(transaction.id, &connection),
            Err(Error::NotFound)
        ));
    }

    #[test]
    fn delete_transaction_with_missing_id_is_a_no_op() {
        let connection = get_test_db_connection();

        assert!(delete_transaction(999, &connection).is_ok());
    }

    #[test]
    fn deleting_a_referenced_account_keeps_the_transaction() {
        let connection = get_test_db_connection();
        let account = create_account(
            AccountName::new_unchecked("Everyday"),
            "Kiwibank",
            100.0,
            None,
            &connection,
        )
        .expect("Could not create account");
        let transaction = create_transaction(
            TransactionBuilder {
                account_id: Some(account.id),
                ..TransactionBuilder::new(
                    10.0,
                    date!(2024 - 03 - 05),
                    "",
                    TransactionKind::Expense,
                )
            },
            &connection,
        )
        .expect("Could not create transaction");

        delete_account(account.id, &connection).expect("Could not delete account");

        let survivor =
            get_transaction(transaction.id, &connection).expect("Could not retrieve transaction");
        assert_eq!(survivor.account_id, None);
    }
}
