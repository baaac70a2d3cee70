//! Database operations for family members.

use rusqlite::{Connection, Row, params};

use crate::{
    Error,
    member::{Member, MemberId, MemberName},
};

/// Create a member and return it with its generated ID.
pub fn create_member(
    name: MemberName,
    role: &str,
    avatar: Option<&str>,
    monthly_income: Option<f64>,
    connection: &Connection,
) -> Result<Member, Error> {
    connection.execute(
        "INSERT INTO member (name, role, avatar, monthly_income) VALUES (?1, ?2, ?3, ?4);",
        params![name.as_ref(), role, avatar, monthly_income],
    )?;

    let id = connection.last_insert_rowid();

    Ok(Member {
        id,
        name,
        role: role.to_string(),
        avatar: avatar.map(|avatar| avatar.to_string()),
        monthly_income,
    })
}

/// Retrieve a single member by ID.
pub fn get_member(member_id: MemberId, connection: &Connection) -> Result<Member, Error> {
    connection
        .prepare(
            "SELECT id, name, role, avatar, monthly_income FROM member WHERE id = :id;",
        )?
        .query_row(&[(":id", &member_id)], map_row)
        .map_err(|error| error.into())
}

/// Retrieve all members ordered alphabetically by name.
pub fn get_all_members(connection: &Connection) -> Result<Vec<Member>, Error> {
    connection
        .prepare("SELECT id, name, role, avatar, monthly_income FROM member ORDER BY name ASC;")?
        .query_map([], map_row)?
        .map(|maybe_member| maybe_member.map_err(|error| error.into()))
        .collect()
}

/// Update a member's details. Updating a member that does not exist is a no-op.
pub fn update_member(
    member_id: MemberId,
    name: MemberName,
    role: &str,
    avatar: Option<&str>,
    monthly_income: Option<f64>,
    connection: &Connection,
) -> Result<(), Error> {
    let rows_affected = connection.execute(
        "UPDATE member SET name = ?1, role = ?2, avatar = ?3, monthly_income = ?4 WHERE id = ?5",
        params![name.as_ref(), role, avatar, monthly_income, member_id],
    )?;

    if rows_affected == 0 {
        tracing::debug!("no member with ID {member_id} to update");
    }

    Ok(())
}

/// Delete a member by ID. Deleting a member that does not exist is a no-op.
///
/// Transactions that reference the member are kept and their member reference
/// is cleared by the schema's ON DELETE SET NULL clause.
pub fn delete_member(member_id: MemberId, connection: &Connection) -> Result<(), Error> {
    let rows_affected = connection.execute("DELETE FROM member WHERE id = ?1", [member_id])?;

    if rows_affected == 0 {
        tracing::debug!("no member with ID {member_id} to delete");
    }

    Ok(())
}

/// Initialize the member table and indexes.
pub fn create_member_table(connection: &Connection) -> Result<(), rusqlite::Error> {
    connection.execute_batch(
        "CREATE TABLE IF NOT EXISTS member (
            id INTEGER PRIMARY KEY,
            name TEXT NOT NULL,
            role TEXT NOT NULL,
            avatar TEXT,
            monthly_income REAL
        );

        CREATE INDEX IF NOT EXISTS idx_member_name ON member(name);",
    )?;

    Ok(())
}

fn map_row(row: &Row) -> Result<Member, rusqlite::Error> {
    let raw_name: String = row.get(1)?;

    Ok(Member {
        id: row.get(0)?,
        name: MemberName::new_unchecked(&raw_name),
        role: row.get(2)?,
        avatar: row.get(3)?,
        monthly_income: row.get(4)?,
    })
}

#[cfg(test)]
mod member_name_tests {
    use crate::{Error, member::MemberName};

    #[test]
    fn new_fails_on_empty_string() {
        let member_name = MemberName::new("");

        assert_eq!(member_name, Err(Error::EmptyMemberName));
    }

    #[test]
    fn new_fails_on_just_whitespace() {
        let member_name = MemberName::new("\n\t \r");

        assert_eq!(member_name, Err(Error::EmptyMemberName));
    }

    #[test]
    fn new_trims_surrounding_whitespace() {
        let member_name = MemberName::new("  Alex  ").unwrap();

        assert_eq!(member_name.as_ref(), "Alex");
    }
}

#[cfg(test)]
mod member_query_tests {
    use rusqlite::Connection;

    use crate::{
        Error,
        member::{MemberName, create_member, get_all_members, get_member, update_member},
    };

    use super::{create_member_table, delete_member};

    fn get_test_db_connection() -> Connection {
        let connection = Connection::open_in_memory().unwrap();
        create_member_table(&connection).expect("Could not create member table");
        connection
    }

    #[test]
    fn create_member_succeeds() {
        let connection = get_test_db_connection();
        let name = MemberName::new("Alex").unwrap();

        let member = create_member(name.clone(), "Parent", None, Some(4200.0), &connection)
            .expect("Could not create member");

        assert!(member.id > 0);
        assert_eq!(member.name, name);
        assert_eq!(member.role, "Parent");
        assert_eq!(member.avatar, None);
        assert_eq!(member.monthly_income, Some(4200.0));
    }

    #[test]
    fn get_member_succeeds() {
        let connection = get_test_db_connection();
        let inserted_member = create_member(
            MemberName::new_unchecked("Alex"),
            "Parent",
            Some("/static/avatars/alex.png"),
            None,
            &connection,
        )
        .expect("Could not create test member");

        let selected_member = get_member(inserted_member.id, &connection);

        assert_eq!(Ok(inserted_member), selected_member);
    }

    #[test]
    fn get_member_with_invalid_id_returns_not_found() {
        let connection = get_test_db_connection();
        let inserted_member =
            create_member(MemberName::new_unchecked("Alex"), "Parent", None, None, &connection)
                .expect("Could not create test member");

        let selected_member = get_member(inserted_member.id + 123, &connection);

        assert_eq!(selected_member, Err(Error::NotFound));
    }

    #[test]
    fn get_all_members_sorts_by_name() {
        let connection = get_test_db_connection();
        create_member(MemberName::new_unchecked("Morgan"), "Parent", None, None, &connection)
            .expect("Could not create test member");
        create_member(MemberName::new_unchecked("Alex"), "Child", None, None, &connection)
            .expect("Could not create test member");

        let members = get_all_members(&connection).expect("Could not get all members");

        let names: Vec<&str> = members.iter().map(|member| member.name.as_ref()).collect();
        assert_eq!(names, vec!["Alex", "Morgan"]);
    }

    #[test]
    fn update_member_succeeds() {
        let connection = get_test_db_connection();
        let member =
            create_member(MemberName::new_unchecked("Alex"), "Child", None, None, &connection)
                .expect("Could not create test member");

        let new_name = MemberName::new_unchecked("Alexandra");
        update_member(
            member.id,
            new_name.clone(),
            "Parent",
            None,
            Some(5000.0),
            &connection,
        )
        .expect("Could not update member");

        let updated_member = get_member(member.id, &connection).expect("Could not get member");
        assert_eq!(updated_member.name, new_name);
        assert_eq!(updated_member.role, "Parent");
        assert_eq!(updated_member.monthly_income, Some(5000.0));
    }

    #[test]
    fn update_member_with_missing_id_is_a_no_op() {
        let connection = get_test_db_connection();
        let member =
            create_member(MemberName::new_unchecked("Alex"), "Parent", None, None, &connection)
                .expect("Could not create test member");

        let result = update_member(
            member.id + 123,
            MemberName::new_unchecked("Nobody"),
            "Ghost",
            None,
            None,
            &connection,
        );

        assert_eq!(result, Ok(()));
        let members = get_all_members(&connection).expect("Could not get all members");
        assert_eq!(members, vec![member]);
    }

    #[test]
    fn delete_member_succeeds() {
        let connection = get_test_db_connection();
        let member =
            create_member(MemberName::new_unchecked("Alex"), "Parent", None, None, &connection)
                .expect("Could not create test member");

        delete_member(member.id, &connection).expect("Could not delete member");

        let get_result = get_member(member.id, &connection);
        assert_eq!(get_result, Err(Error::NotFound));
    }

    #[test]
    fn delete_member_with_missing_id_is_a_no_op() {
        let connection = get_test_db_connection();

        let result = delete_member(999999, &connection);

        assert_eq!(result, Ok(()));
    }
}
