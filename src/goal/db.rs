//! Database functions for savings goals.

use rusqlite::{Connection, Row, params};
use time::Date;

use crate::{
    Error,
    goal::{Goal, GoalId, GoalName},
};

/// Create a goal in the database.
///
/// # Errors
/// Returns [`Error::SqlError`] if an SQL related error occurred.
pub fn create_goal(
    name: GoalName,
    target: f64,
    saved: f64,
    deadline: Date,
    category: &str,
    image: Option<&str>,
    connection: &Connection,
) -> Result<Goal, Error> {
    connection.execute(
        "INSERT INTO goal (name, target, saved, deadline, category, image)
        VALUES (?1, ?2, ?3, ?4, ?5, ?6)",
        params![name.as_ref(), target, saved, deadline, category, image],
    )?;

    let id = connection.last_insert_rowid();

    Ok(Goal {
        id,
        name,
        target,
        saved,
        deadline,
        category: category.to_string(),
        image: image.map(ToString::to_string),
    })
}

/// Retrieve the goal with `goal_id` from the database.
///
/// # Errors
/// Returns [`Error::NotFound`] if the goal does not exist, or
/// [`Error::SqlError`] if another SQL related error occurred.
pub fn get_goal(goal_id: GoalId, connection: &Connection) -> Result<Goal, Error> {
    connection
        .prepare("SELECT id, name, target, saved, deadline, category, image FROM goal WHERE id = :id")?
        .query_row(&[(":id", &goal_id)], map_row)
        .map_err(Error::from)
}

/// Retrieve all goals, sorted by nearest deadline first.
///
/// # Errors
/// Returns [`Error::SqlError`] if an SQL related error occurred.
pub fn get_all_goals(connection: &Connection) -> Result<Vec<Goal>, Error> {
    connection
        .prepare(
            "SELECT id, name, target, saved, deadline, category, image
            FROM goal ORDER BY deadline ASC, id ASC",
        )?
        .query_map((), map_row)?
        .map(|goal| goal.map_err(Error::from))
        .collect()
}

/// Update the goal with `goal_id`.
///
/// Does nothing if the goal does not exist.
///
/// # Errors
/// Returns [`Error::SqlError`] if an SQL related error occurred.
pub fn update_goal(
    goal_id: GoalId,
    name: GoalName,
    target: f64,
    saved: f64,
    deadline: Date,
    category: &str,
    image: Option<&str>,
    connection: &Connection,
) -> Result<(), Error> {
    let rows_affected = connection.execute(
        "UPDATE goal SET name = ?1, target = ?2, saved = ?3, deadline = ?4,
        category = ?5, image = ?6
        WHERE id = ?7",
        params![name.as_ref(), target, saved, deadline, category, image, goal_id],
    )?;

    if rows_affected == 0 {
        tracing::debug!("no goal with ID {goal_id} to update");
    }

    Ok(())
}

/// Delete the goal with `goal_id`.
///
/// Does nothing if the goal does not exist.
///
/// # Errors
/// Returns [`Error::SqlError`] if an SQL related error occurred.
pub fn delete_goal(goal_id: GoalId, connection: &Connection) -> Result<(), Error> {
    let rows_affected = connection.execute("DELETE FROM goal WHERE id = ?1", params![goal_id])?;

    if rows_affected == 0 {
        tracing::debug!("no goal with ID {goal_id} to delete");
    }

    Ok(())
}

/// Create the goal table in the database.
///
/// # Errors
/// Returns [`Error::SqlError`] if an SQL related error occurred.
pub fn create_goal_table(connection: &Connection) -> Result<(), Error> {
    connection
        .execute_batch(
            "CREATE TABLE IF NOT EXISTS goal (
            id INTEGER PRIMARY KEY,
            name TEXT NOT NULL,
            target REAL NOT NULL,
            saved REAL NOT NULL,
            deadline TEXT NOT NULL,
            category TEXT NOT NULL,
            image TEXT
            )",
        )
        .map_err(Error::from)
}

fn map_row(row: &Row) -> Result<Goal, rusqlite::Error> {
    let raw_name: String = row.get(1)?;

    Ok(Goal {
        id: row.get(0)?,
        name: GoalName::new_unchecked(&raw_name),
        target: row.get(2)?,
        saved: row.get(3)?,
        deadline: row.get(4)?,
        category: row.get(5)?,
        image: row.get(6)?,
    })
}


#[cfg(test)]
mod goal_query_tests {
    use rusqlite::Connection;
    use time::macros::date;

    use crate::{
        Error,
        goal::{
            GoalName, create_goal, create_goal_table, db::delete_goal, get_all_goals, get_goal,
            update_goal,
        },
    };

    fn get_test_db_connection() -> Connection {
        let connection =
            Connection::open_in_memory().expect("Could not open in-memory SQLite database");
        create_goal_table(&connection).expect("Could not create goal table");

        connection
    }

    #[test]
    fn create_goal_succeeds() {
        let connection = get_test_db_connection();

        let goal = create_goal(
            GoalName::new_unchecked("Japan Trip"),
            8_000.0,
            1_200.0,
            date!(2026 - 12 - 31),
            "travel",
            Some("/static/images/japan.jpg"),
            &connection,
        )
        .expect("Could not create goal");

        assert!(goal.id > 0);
        assert_eq!(goal.name.as_ref(), "Japan Trip");
        assert_eq!(goal.target, 8_000.0);
        assert_eq!(goal.saved, 1_200.0);
        assert_eq!(goal.deadline, date!(2026 - 12 - 31));
        assert_eq!(goal.category, "travel");
        assert_eq!(goal.image.as_deref(), Some("/static/images/japan.jpg"));
    }

    #[test]
    fn get_goal_round_trips() {
        let connection = get_test_db_connection();
        let inserted = create_goal(
            GoalName::new_unchecked("Japan Trip"),
            8_000.0,
            1_200.0,
            date!(2026 - 12 - 31),
            "travel",
            None,
            &connection,
        )
        .expect("Could not create goal");

        let retrieved = get_goal(inserted.id, &connection).expect("Could not retrieve goal");

        assert_eq!(inserted, retrieved);
    }

    #[test]
    fn get_goal_with_invalid_id_returns_not_found() {
        let connection = get_test_db_connection();

        assert!(matches!(get_goal(999, &connection), Err(Error::NotFound)));
    }

    #[test]
    fn get_all_goals_sorts_by_deadline() {
        let connection = get_test_db_connection();
        for (name, deadline) in [
            ("New Car", date!(2027 - 06 - 30)),
            ("Japan Trip", date!(2026 - 12 - 31)),
        ] {
            create_goal(
                GoalName::new_unchecked(name),
                1_000.0,
                0.0,
                deadline,
                "",
                None,
                &connection,
            )
            .expect("Could not create goal");
        }

        let goals = get_all_goals(&connection).expect("Could not retrieve goals");
        let names: Vec<&str> = goals.iter().map(|goal| goal.name.as_ref()).collect();

        assert_eq!(names, vec!["Japan Trip", "New Car"]);
    }

    #[test]
    fn update_goal_succeeds() {
        let connection = get_test_db_connection();
        let goal = create_goal(
            GoalName::new_unchecked("Japan Trip"),
            8_000.0,
            1_200.0,
            date!(2026 - 12 - 31),
            "travel",
            None,
            &connection,
        )
        .expect("Could not create goal");

        update_goal(
            goal.id,
            GoalName::new_unchecked("Japan Trip 2027"),
            9_000.0,
            2_000.0,
            date!(2027 - 03 - 31),
            "travel",
            None,
            &connection,
        )
        .expect("Could not update goal");

        let updated = get_goal(goal.id, &connection).expect("Could not retrieve goal");
        assert_eq!(updated.name.as_ref(), "Japan Trip 2027");
        assert_eq!(updated.target, 9_000.0);
        assert_eq!(updated.saved, 2_000.0);
        assert_eq!(updated.deadline, date!(2027 - 03 - 31));
    }

    #[test]
    fn update_goal_with_missing_id_is_a_no_op() {
        let connection = get_test_db_connection();

        let result = update_goal(
            999,
            GoalName::new_unchecked("Japan Trip"),
            8_000.0,
            0.0,
            date!(2026 - 12 - 31),
            "",
            None,
            &connection,
        );

        assert!(result.is_ok());
        assert!(
            get_all_goals(&connection)
                .expect("Could not retrieve goals")
                .is_empty()
        );
    }

    #[test]
    fn delete_goal_succeeds() {
        let connection = get_test_db_connection();
        let goal = create_goal(
            GoalName::new_unchecked("Japan Trip"),
            8_000.0,
            0.0,
            date!(2026 - 12 - 31),
            "",
            None,
            &connection,
        )
        .expect("Could not create goal");

        delete_goal(goal.id, &connection).expect("Could not delete goal");

        assert!(matches!(
            get_goal(goal.id, &connection),
            Err(Error::NotFound)
        ));
    }

    #[test]
    fn delete_goal_with_missing_id_is_a_no_op() {
        let connection = get_test_db_connection();

        assert!(delete_goal(999, &connection).is_ok());
    }
}
