//! Database operations for categories.

use rusqlite::{Connection, Row, params};

use crate::{
    Error,
    category::{Category, CategoryId, CategoryName},
    transaction::TransactionKind,
};

/// Create a category and return it with its generated ID.
///
/// # Errors
///
/// Returns [Error::DuplicateCategoryName] if a category with the same name
/// already exists under the same kind.
pub fn create_category(
    name: CategoryName,
    kind: TransactionKind,
    icon: Option<&str>,
    color: Option<&str>,
    connection: &Connection,
) -> Result<Category, Error> {
    connection
        .execute(
            "INSERT INTO category (name, kind, icon, color) VALUES (?1, ?2, ?3, ?4);",
            params![name.as_ref(), kind, icon, color],
        )
        .map_err(|error| match error {
            // Code 2067 occurs when a UNIQUE constraint failed.
            rusqlite::Error::SqliteFailure(error, Some(_)) if error.extended_code == 2067 => {
                Error::DuplicateCategoryName
            }
            error => error.into(),
        })?;

    let id = connection.last_insert_rowid();

    Ok(Category {
        id,
        name,
        kind,
        icon: icon.map(|icon| icon.to_string()),
        color: color.map(|color| color.to_string()),
    })
}

/// Retrieve a single category by ID.
pub fn get_category(category_id: CategoryId, connection: &Connection) -> Result<Category, Error> {
    connection
        .prepare("SELECT id, name, kind, icon, color FROM category WHERE id = :id;")?
        .query_row(&[(":id", &category_id)], map_row)
        .map_err(|error| error.into())
}

/// Retrieve all categories, income first, each kind sorted by name.
pub fn get_all_categories(connection: &Connection) -> Result<Vec<Category>, Error> {
    // Kinds are stored as text, so DESC puts "income" before "expense".
    connection
        .prepare("SELECT id, name, kind, icon, color FROM category ORDER BY kind DESC, name ASC;")?
        .query_map([], map_row)?
        .map(|maybe_category| maybe_category.map_err(|error| error.into()))
        .collect()
}

/// Retrieve the categories of one kind, ordered alphabetically by name.
pub fn get_categories_by_kind(
    kind: TransactionKind,
    connection: &Connection,
) -> Result<Vec<Category>, Error> {
    connection
        .prepare("SELECT id, name, kind, icon, color FROM category WHERE kind = :kind ORDER BY name ASC;")?
        .query_map(&[(":kind", &kind)], map_row)?
        .map(|maybe_category| maybe_category.map_err(|error| error.into()))
        .collect()
}

/// Update a category's details. Updating a category that does not exist is a no-op.
///
/// # Errors
///
/// Returns [Error::DuplicateCategoryName] if the new name collides with
/// another category of the same kind.
pub fn update_category(
    category_id: CategoryId,
    name: CategoryName,
    kind: TransactionKind,
    icon: Option<&str>,
    color: Option<&str>,
    connection: &Connection,
) -> Result<(), Error> {
    let rows_affected = connection
        .execute(
            "UPDATE category SET name = ?1, kind = ?2, icon = ?3, color = ?4 WHERE id = ?5",
            params![name.as_ref(), kind, icon, color, category_id],
        )
        .map_err(|error| match error {
            rusqlite::Error::SqliteFailure(error, Some(_)) if error.extended_code == 2067 => {
                Error::DuplicateCategoryName
            }
            error => error.into(),
        })?;

    if rows_affected == 0 {
        tracing::debug!("no category with ID {category_id} to update");
    }

    Ok(())
}

/// Delete a category by ID. Deleting a category that does not exist is a no-op.
///
/// Transactions keep the category name as free text, so deleting a category
/// leaves their grouping unchanged.
pub fn delete_category(category_id: CategoryId, connection: &Connection) -> Result<(), Error> {
    let rows_affected = connection.execute("DELETE FROM category WHERE id = ?1", [category_id])?;

    if rows_affected == 0 {
        tracing::debug!("no category with ID {category_id} to delete");
    }

    Ok(())
}

/// Initialize the category table and indexes.
pub fn create_category_table(connection: &Connection) -> Result<(), rusqlite::Error> {
    connection.execute_batch(
        "CREATE TABLE IF NOT EXISTS category (
            id INTEGER PRIMARY KEY,
            name TEXT NOT NULL,
            kind TEXT NOT NULL,
            icon TEXT,
            color TEXT,
            UNIQUE(name, kind)
        );

        CREATE INDEX IF NOT EXISTS idx_category_kind ON category(kind);",
    )?;

    Ok(())
}

fn map_row(row: &Row) -> Result<Category, rusqlite::Error> {
    let raw_name: String = row.get(1)?;

    Ok(Category {
        id: row.get(0)?,
        name: CategoryName::new_unchecked(&raw_name),
        kind: row.get(2)?,
        icon: row.get(3)?,
        color: row.get(4)?,
    })
}
