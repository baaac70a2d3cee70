//! Database functions for credit cards.

use rusqlite::{Connection, Row, params};

use crate::{
    Error,
    card::{
        Card, CardId, CardName, DayOfMonth, LastFour,
        domain::CardDetails,
    },
};

/// Create a card in the database.
///
/// # Errors
/// Returns [`Error::SqlError`] if an SQL related error occurred.
pub fn create_card(details: CardDetails, connection: &Connection) -> Result<Card, Error> {
    connection.execute(
        "INSERT INTO card (name, brand, last_four, credit_limit, current_invoice,
        closing_day, due_day, theme)
        VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8)",
        params![
            details.name.as_ref(),
            details.brand,
            details.last_four.as_ref(),
            details.limit,
            details.current_invoice,
            details.closing_day.get(),
            details.due_day.get(),
            details.theme,
        ],
    )?;

    let id = connection.last_insert_rowid();

    Ok(Card {
        id,
        name: details.name,
        brand: details.brand,
        last_four: details.last_four,
        limit: details.limit,
        current_invoice: details.current_invoice,
        closing_day: details.closing_day,
        due_day: details.due_day,
        theme: details.theme,
    })
}

/// Retrieve the card with `card_id` from the database.
///
/// # Errors
/// Returns [`Error::NotFound`] if the card does not exist, or
/// [`Error::SqlError`] if another SQL related error occurred.
pub fn get_card(card_id: CardId, connection: &Connection) -> Result<Card, Error> {
    connection
        .prepare(
            "SELECT id, name, brand, last_four, credit_limit, current_invoice,
            closing_day, due_day, theme
            FROM card WHERE id = :id",
        )?
        .query_row(&[(":id", &card_id)], map_row)
        .map_err(Error::from)
}

/// Retrieve all cards, sorted by name.
///
/// # Errors
/// Returns [`Error::SqlError`] if an SQL related error occurred.
pub fn get_all_cards(connection: &Connection) -> Result<Vec<Card>, Error> {
    connection
        .prepare(
            "SELECT id, name, brand, last_four, credit_limit, current_invoice,
            closing_day, due_day, theme
            FROM card ORDER BY name ASC",
        )?
        .query_map((), map_row)?
        .map(|card| card.map_err(Error::from))
        .collect()
}

/// Update the card with `card_id`.
///
/// Does nothing if the card does not exist.
///
/// # Errors
/// Returns [`Error::SqlError`] if an SQL related error occurred.
pub fn update_card(
    card_id: CardId,
    details: CardDetails,
    connection: &Connection,
) -> Result<(), Error> {
    let rows_affected = connection.execute(
        "UPDATE card SET name = ?1, brand = ?2, last_four = ?3, credit_limit = ?4,
        current_invoice = ?5, closing_day = ?6, due_day = ?7, theme = ?8
        WHERE id = ?9",
        params![
            details.name.as_ref(),
            details.brand,
            details.last_four.as_ref(),
            details.limit,
            details.current_invoice,
            details.closing_day.get(),
            details.due_day.get(),
            details.theme,
            card_id,
        ],
    )?;

    if rows_affected == 0 {
        tracing::debug!("no card with ID {card_id} to update");
    }

    Ok(())
}

/// Delete the card with `card_id`.
///
/// Does nothing if the card does not exist. Transactions paid with the card
/// keep their history but lose the card reference.
///
/// # Errors
/// Returns [`Error::SqlError`] if an SQL related error occurred.
pub fn delete_card(card_id: CardId, connection: &Connection) -> Result<(), Error> {
    let rows_affected = connection.execute("DELETE FROM card WHERE id = ?1", params![card_id])?;

    if rows_affected == 0 {
        tracing::debug!("no card with ID {card_id} to delete");
    }

    Ok(())
}

/// Create the card table in the database.
///
/// # Errors
/// Returns [`Error::SqlError`] if an SQL related error occurred.
pub fn create_card_table(connection: &Connection) -> Result<(), Error> {
    connection
        .execute_batch(
            "CREATE TABLE IF NOT EXISTS card (
            id INTEGER PRIMARY KEY,
            name TEXT NOT NULL,
            brand TEXT NOT NULL,
            last_four TEXT NOT NULL,
            credit_limit REAL NOT NULL,
            current_invoice REAL NOT NULL,
            closing_day INTEGER NOT NULL,
            due_day INTEGER NOT NULL,
            theme TEXT
            )",
        )
        .map_err(Error::from)
}

fn map_row(row: &Row) -> Result<Card, rusqlite::Error> {
    let raw_name: String = row.get(1)?;
    let raw_last_four: String = row.get(3)?;
    let raw_closing_day: u8 = row.get(6)?;
    let raw_due_day: u8 = row.get(7)?;

    Ok(Card {
        id: row.get(0)?,
        name: CardName::new_unchecked(&raw_name),
        brand: row.get(2)?,
        last_four: LastFour::new_unchecked(&raw_last_four),
        limit: row.get(4)?,
        current_invoice: row.get(5)?,
        closing_day: DayOfMonth::new_unchecked(raw_closing_day),
        due_day: DayOfMonth::new_unchecked(raw_due_day),
        theme: row.get(8)?,
    })
}

#[cfg(test)]
mod card_query_tests {
    use rusqlite::Connection;

    use crate::{
        Error,
        card::{
            create_card, create_card_table,
            db::delete_card,
            domain::{CardDetails, CardFormData},
            get_all_cards, get_card, update_card,
        },
    };

    fn get_test_db_connection() -> Connection {
        let connection =
            Connection::open_in_memory().expect("Could not open in-memory SQLite database");
        create_card_table(&connection).expect("Could not create card table");

        connection
    }

    fn test_details(name: &str) -> CardDetails {
        CardDetails::new(&CardFormData {
            name: name.to_string(),
            brand: "Visa".to_string(),
            last_four: "4242".to_string(),
            limit: 5_000.0,
            current_invoice: 1_200.0,
            closing_day: 28,
            due_day: 5,
            theme: "midnight".to_string(),
        })
        .expect("Could not validate card details")
    }

    #[test]
    fn create_card_succeeds() {
        let connection = get_test_db_connection();

        let card =
            create_card(test_details("Family Visa"), &connection).expect("Could not create card");

        assert!(card.id > 0);
        assert_eq!(card.name.as_ref(), "Family Visa");
        assert_eq!(card.last_four.as_ref(), "4242");
        assert_eq!(card.limit, 5_000.0);
        assert_eq!(card.closing_day.get(), 28);
        assert_eq!(card.theme.as_deref(), Some("midnight"));
    }

    #[test]
    fn get_card_round_trips() {
        let connection = get_test_db_connection();
        let inserted =
            create_card(test_details("Family Visa"), &connection).expect("Could not create card");

        let retrieved = get_card(inserted.id, &connection).expect("Could not retrieve card");

        assert_eq!(inserted, retrieved);
    }

    #[test]
    fn get_card_with_invalid_id_returns_not_found() {
        let connection = get_test_db_connection();

        assert!(matches!(get_card(999, &connection), Err(Error::NotFound)));
    }

    #[test]
    fn get_all_cards_sorts_by_name() {
        let connection = get_test_db_connection();
        for name in ["Travel Amex", "Family Visa"] {
            create_card(test_details(name), &connection).expect("Could not create card");
        }

        let cards = get_all_cards(&connection).expect("Could not retrieve cards");
        let names: Vec<&str> = cards.iter().map(|card| card.name.as_ref()).collect();

        assert_eq!(names, vec!["Family Visa", "Travel Amex"]);
    }

    #[test]
    fn update_card_succeeds() {
        let connection = get_test_db_connection();
        let card =
            create_card(test_details("Family Visa"), &connection).expect("Could not create card");

        let mut details = test_details("Family Visa Platinum");
        details.limit = 8_000.0;
        details.current_invoice = 0.0;
        update_card(card.id, details, &connection).expect("Could not update card");

        let updated = get_card(card.id, &connection).expect("Could not retrieve card");
        assert_eq!(updated.name.as_ref(), "Family Visa Platinum");
        assert_eq!(updated.limit, 8_000.0);
        assert_eq!(updated.current_invoice, 0.0);
    }

    #[test]
    fn update_card_with_missing_id_is_a_no_op() {
        let connection = get_test_db_connection();

        let result = update_card(999, test_details("Family Visa"), &connection);

        assert!(result.is_ok());
        assert!(
            get_all_cards(&connection)
                .expect("Could not retrieve cards")
                .is_empty()
        );
    }

    #[test]
    fn delete_card_succeeds() {
        let connection = get_test_db_connection();
        let card =
            create_card(test_details("Family Visa"), &connection).expect("Could not create card");

        delete_card(card.id, &connection).expect("Could not delete card");

        assert!(matches!(
            get_card(card.id, &connection),
            Err(Error::NotFound)
        ));
    }

    #[test]
    fn delete_card_with_missing_id_is_a_no_op() {
        let connection = get_test_db_connection();

        assert!(delete_card(999, &connection).is_ok());
    }
}
