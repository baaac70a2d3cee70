//! Database functions for accounts.

use rusqlite::{Connection, Row, params};

use crate::{
    Error,
    account::{Account, AccountId, AccountName},
};

/// Create an account in the database.
///
/// # Errors
/// Returns [`Error::DuplicateAccountName`] if an account with the same name
/// already exists, or [`Error::SqlError`] if another SQL related error occurred.
pub fn create_account(
    name: AccountName,
    institution: &str,
    balance: f64,
    color: Option<&str>,
    connection: &Connection,
) -> Result<Account, Error> {
    connection
        .execute(
            "INSERT INTO account (name, institution, balance, color) VALUES (?1, ?2, ?3, ?4)",
            params![name.as_ref(), institution, balance, color],
        )
        .map_err(|error| match error {
            rusqlite::Error::SqliteFailure(error, Some(_)) if error.extended_code == 2067 => {
                Error::DuplicateAccountName
            }
            error => error.into(),
        })?;

    let id = connection.last_insert_rowid();

    Ok(Account {
        id,
        name,
        institution: institution.to_string(),
        balance,
        color: color.map(ToString::to_string),
    })
}

/// Retrieve the account with `account_id` from the database.
///
/// # Errors
/// Returns [`Error::NotFound`] if the account does not exist, or
/// [`Error::SqlError`] if another SQL related error occurred.
pub fn get_account(account_id: AccountId, connection: &Connection) -> Result<Account, Error> {
    connection
        .prepare("SELECT id, name, institution, balance, color FROM account WHERE id = :id")?
        .query_row(&[(":id", &account_id)], map_row)
        .map_err(Error::from)
}

/// Retrieve all accounts, sorted by name.
///
/// # Errors
/// Returns [`Error::SqlError`] if an SQL related error occurred.
pub fn get_all_accounts(connection: &Connection) -> Result<Vec<Account>, Error> {
    connection
        .prepare("SELECT id, name, institution, balance, color FROM account ORDER BY name ASC")?
        .query_map((), map_row)?
        .map(|account| account.map_err(Error::from))
        .collect()
}

/// Update the account with `account_id`.
///
/// Does nothing if the account does not exist.
///
/// # Errors
/// Returns [`Error::DuplicateAccountName`] if the new name belongs to another
/// account, or [`Error::SqlError`] if another SQL related error occurred.
pub fn update_account(
    account_id: AccountId,
    name: AccountName,
    institution: &str,
    balance: f64,
    color: Option<&str>,
    connection: &Connection,
) -> Result<(), Error> {
    let rows_affected = connection
        .execute(
            "UPDATE account SET name = ?1, institution = ?2, balance = ?3, color = ?4
            WHERE id = ?5",
            params![name.as_ref(), institution, balance, color, account_id],
        )
        .map_err(|error| match error {
            rusqlite::Error::SqliteFailure(error, Some(_)) if error.extended_code == 2067 => {
                Error::DuplicateAccountName
            }
            error => error.into(),
        })?;

    if rows_affected == 0 {
        tracing::debug!("no account with ID {account_id} to update");
    }

    Ok(())
}

/// Delete the account with `account_id`.
///
/// Does nothing if the account does not exist. Transactions paid from the
/// account keep their history but lose the account reference.
///
/// # Errors
/// Returns [`Error::SqlError`] if an SQL related error occurred.
pub fn delete_account(account_id: AccountId, connection: &Connection) -> Result<(), Error> {
    let rows_affected =
        connection.execute("DELETE FROM account WHERE id = ?1", params![account_id])?;

    if rows_affected == 0 {
        tracing::debug!("no account with ID {account_id} to delete");
    }

    Ok(())
}

/// Create the account table in the database.
///
/// # Errors
/// Returns [`Error::SqlError`] if an SQL related error occurred.
pub fn create_account_table(connection: &Connection) -> Result<(), Error> {
    connection
        .execute_batch(
            "CREATE TABLE IF NOT EXISTS account (
            id INTEGER PRIMARY KEY,
            name TEXT NOT NULL UNIQUE,
            institution TEXT NOT NULL,
            balance REAL NOT NULL,
            color TEXT
            )",
        )
        .map_err(Error::from)
}

fn map_row(row: &Row) -> Result<Account, rusqlite::Error> {
    let raw_name: String = row.get(1)?;

    Ok(Account {
        id: row.get(0)?,
        name: AccountName::new_unchecked(&raw_name),
        institution: row.get(2)?,
        balance: row.get(3)?,
        color: row.get(4)?,
    })
}
