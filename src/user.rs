//! Code for creating the users table and fetching users from the database.
//!
//! Password hashing and session handling live in the web layer; this module
//! only stores the opaque hash it is given.

use rusqlite::Connection;
use serde::{Deserialize, Serialize};
use time::OffsetDateTime;

use crate::{Error, database_id::UserId};

/// A registered user of the application.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct User {
    /// The user's ID in the application database.
    pub id: UserId,
    /// The user's display name.
    pub name: String,
    /// The user's email address, unique across all users.
    pub email: String,
    /// The user's password hash, opaque to this crate.
    pub hashed_password: String,
    /// When the user signed up.
    pub created: OffsetDateTime,
}

/// Create the users table in the database.
///
/// # Errors
/// Returns an error if the table cannot be created or if there is an SQL
/// error.
pub fn create_users_table(connection: &Connection) -> Result<(), rusqlite::Error> {
    connection.execute(
        "CREATE TABLE IF NOT EXISTS users (
                id INTEGER PRIMARY KEY AUTOINCREMENT,
                name TEXT NOT NULL,
                email TEXT NOT NULL UNIQUE,
                hashed_password TEXT NOT NULL,
                created TEXT NOT NULL
                )",
        (),
    )?;

    Ok(())
}

/// Create and insert a new user into the database.
///
/// # Errors
/// This function will return a:
/// - [Error::DuplicateEmail] if a user with `email` already exists,
/// - or [Error::SqlError] if there is some other SQL error.
pub fn create_user(
    name: &str,
    email: &str,
    hashed_password: &str,
    connection: &Connection,
) -> Result<User, Error> {
    let user = connection
        .prepare(
            "INSERT INTO users (name, email, hashed_password, created)
             VALUES (?1, ?2, ?3, ?4)
             RETURNING id, name, email, hashed_password, created",
        )?
        .query_row(
            (name, email, hashed_password, OffsetDateTime::now_utc()),
            map_user_row,
        )
        .map_err(|error| match error {
            rusqlite::Error::SqliteFailure(
                rusqlite::ffi::Error {
                    code: _,
                    extended_code: rusqlite::ffi::SQLITE_CONSTRAINT_UNIQUE,
                },
                _,
            ) => Error::DuplicateEmail,
            error => error.into(),
        })?;

    Ok(user)
}

/// Retrieve a user from the database by their `id`.
///
/// # Errors
/// This function will return a:
/// - [Error::NotFound] if `id` does not refer to a valid user,
/// - or [Error::SqlError] if there is some other SQL error.
pub fn get_user_by_id(id: UserId, connection: &Connection) -> Result<User, Error> {
    let user = connection
        .prepare(
            "SELECT id, name, email, hashed_password, created FROM users WHERE id = :id",
        )?
        .query_row(&[(":id", &id)], map_user_row)?;

    Ok(user)
}

fn map_user_row(row: &rusqlite::Row) -> Result<User, rusqlite::Error> {
    Ok(User {
        id: row.get(0)?,
        name: row.get(1)?,
        email: row.get(2)?,
        hashed_password: row.get(3)?,
        created: row.get(4)?,
    })
}
