//! Defines the account model and its database queries.

use rusqlite::Connection;
use serde::{Deserialize, Serialize};

use crate::{
    Error,
    currency::Currency,
    database_id::{AccountId, UserId},
};

/// A named pot of money owned by one user and denominated in one currency.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Account {
    /// The ID of the account.
    pub id: AccountId,
    /// The user that owns the account.
    pub user_id: UserId,
    /// The display name of the account, unique per user.
    pub name: String,
    /// The cached balance, equal to the signed sum of the account's journal
    /// entries.
    pub balance: f64,
    /// The currency the account is denominated in.
    pub currency: Currency,
}

impl Account {
    /// The balance formatted for display, e.g. "1200.00 RSD".
    pub fn display_balance(&self) -> String {
        format!("{:.2} {}", self.balance, self.currency)
    }
}

/// Create the accounts table in the database.
///
/// # Errors
/// Returns an error if the table cannot be created or if there is an SQL
/// error.
pub fn create_accounts_table(connection: &Connection) -> Result<(), rusqlite::Error> {
    connection.execute(
        "CREATE TABLE IF NOT EXISTS accounts (
                id INTEGER PRIMARY KEY AUTOINCREMENT,
                user_id INTEGER NOT NULL,
                account_name TEXT NOT NULL,
                balance REAL NOT NULL,
                currency INTEGER NOT NULL,
                FOREIGN KEY(user_id) REFERENCES users(id) ON UPDATE CASCADE ON DELETE CASCADE,
                UNIQUE(user_id, account_name)
                )",
        (),
    )?;

    Ok(())
}

/// Create a new account with a zero balance.
///
/// # Errors
/// This function will return a:
/// - [Error::DuplicateAccountName] if the user already has an account named
///   `name`,
/// - or [Error::SqlError] if there is some other SQL error.
pub fn create_account(
    user_id: UserId,
    name: &str,
    currency: Currency,
    connection: &Connection,
) -> Result<Account, Error> {
    let account = connection
        .prepare(
            "INSERT INTO accounts (user_id, account_name, balance, currency)
             VALUES (?1, ?2, ?3, ?4)
             RETURNING id, user_id, account_name, balance, currency",
        )?
        .query_row((user_id, name, 0.0, currency), map_row_to_account)
        .map_err(|error| match error {
            rusqlite::Error::SqliteFailure(
                rusqlite::ffi::Error {
                    code: _,
                    extended_code: rusqlite::ffi::SQLITE_CONSTRAINT_UNIQUE,
                },
                _,
            ) => Error::DuplicateAccountName(name.to_owned()),
            error => error.into(),
        })?;

    Ok(account)
}

/// Retrieve an account by its `id`, scoped to the requesting user.
///
/// # Errors
/// This function will return a:
/// - [Error::NotFound] if `id` does not refer to an account owned by
///   `user_id`,
/// - or [Error::SqlError] if there is some other SQL error.
pub fn get_account(
    user_id: UserId,
    id: AccountId,
    connection: &Connection,
) -> Result<Account, Error> {
    let account = connection
        .prepare(
            "SELECT id, user_id, account_name, balance, currency FROM accounts
             WHERE user_id = :user_id AND id = :id",
        )?
        .query_row(&[(":user_id", &user_id), (":id", &id)], map_row_to_account)?;

    Ok(account)
}

/// Retrieve all accounts owned by `user_id`.
///
/// # Errors
/// This function will return a [Error::SqlError] if there is an SQL error.
pub fn get_all_accounts(user_id: UserId, connection: &Connection) -> Result<Vec<Account>, Error> {
    connection
        .prepare(
            "SELECT id, user_id, account_name, balance, currency FROM accounts
             WHERE user_id = :user_id",
        )?
        .query_map(&[(":user_id", &user_id)], map_row_to_account)?
        .map(|account_result| account_result.map_err(Error::SqlError))
        .collect()
}

/// Map a database row to an [Account].
pub fn map_row_to_account(row: &rusqlite::Row) -> Result<Account, rusqlite::Error> {
    Ok(Account {
        id: row.get(0)?,
        user_id: row.get(1)?,
        name: row.get(2)?,
        balance: row.get(3)?,
        currency: row.get(4)?,
    })
}

/// Read an account's balance, scoped to the requesting user.
///
/// Callers mutating the ledger must call this inside their transactional
/// scope so that overlapping mutations cannot observe the same starting
/// balance.
pub(crate) fn get_account_balance(
    account_id: AccountId,
    user_id: UserId,
    connection: &Connection,
) -> Result<f64, Error> {
    connection
        .query_row(
            "SELECT balance FROM accounts WHERE id = ?1 AND user_id = ?2",
            (account_id, user_id),
            |row| row.get(0),
        )
        .map_err(|error| match error {
            rusqlite::Error::QueryReturnedNoRows => Error::AccountDoesNotExist,
            error => error.into(),
        })
}

#[cfg(test)]
mod tests {
    use rusqlite::Connection;

    use crate::{Currency, Error, db::initialize, user::create_user};

    use super::{create_account, get_account, get_all_accounts};

    fn get_test_connection() -> Connection {
        let conn = Connection::open_in_memory().unwrap();
        initialize(&conn).unwrap();
        conn
    }

    fn create_test_user(conn: &Connection) -> i64 {
        create_user("Alice", "alice@example.com", "hunter2hash", conn)
            .expect("Could not create user")
            .id
    }

    #[test]
    fn create_starts_with_zero_balance() {
        let conn = get_test_connection();
        let user_id = create_test_user(&conn);

        let account = create_account(user_id, "cash", Currency::SerbianDinar, &conn)
            .expect("Could not create account");

        assert!(account.id > 0);
        assert_eq!(account.user_id, user_id);
        assert_eq!(account.name, "cash");
        assert_eq!(account.balance, 0.0);
        assert_eq!(account.currency, Currency::SerbianDinar);
    }

    #[test]
    fn create_fails_on_duplicate_name_for_same_user() {
        let conn = get_test_connection();
        let user_id = create_test_user(&conn);
        create_account(user_id, "cash", Currency::SerbianDinar, &conn)
            .expect("Could not create account");

        let duplicate = create_account(user_id, "cash", Currency::Euro, &conn);

        assert_eq!(
            duplicate,
            Err(Error::DuplicateAccountName("cash".to_owned()))
        );
    }

    #[test]
    fn create_allows_same_name_for_different_users() {
        let conn = get_test_connection();
        let first_user = create_test_user(&conn);
        let second_user = create_user("Bob", "bob@example.com", "hunter3hash", &conn)
            .expect("Could not create user")
            .id;
        create_account(first_user, "cash", Currency::SerbianDinar, &conn)
            .expect("Could not create account");

        let result = create_account(second_user, "cash", Currency::SerbianDinar, &conn);

        assert!(result.is_ok());
    }

    #[test]
    fn get_returns_inserted_account() {
        let conn = get_test_connection();
        let user_id = create_test_user(&conn);
        let inserted = create_account(user_id, "savings", Currency::Euro, &conn)
            .expect("Could not create account");

        let selected =
            get_account(user_id, inserted.id, &conn).expect("Could not get account");

        assert_eq!(inserted, selected);
    }

    #[test]
    fn get_fails_for_other_users_account() {
        let conn = get_test_connection();
        let owner = create_test_user(&conn);
        let other_user = create_user("Bob", "bob@example.com", "hunter3hash", &conn)
            .expect("Could not create user")
            .id;
        let account = create_account(owner, "savings", Currency::Euro, &conn)
            .expect("Could not create account");

        let result = get_account(other_user, account.id, &conn);

        assert_eq!(result, Err(Error::NotFound));
    }

    #[test]
    fn get_all_only_returns_own_accounts() {
        let conn = get_test_connection();
        let user_id = create_test_user(&conn);
        let other_user = create_user("Bob", "bob@example.com", "hunter3hash", &conn)
            .expect("Could not create user")
            .id;
        let cash = create_account(user_id, "cash", Currency::SerbianDinar, &conn).unwrap();
        let savings = create_account(user_id, "savings", Currency::Euro, &conn).unwrap();
        create_account(other_user, "cash", Currency::SerbianDinar, &conn).unwrap();

        let accounts = get_all_accounts(user_id, &conn).expect("Could not get accounts");

        assert_eq!(accounts, vec![cash, savings]);
    }

    #[test]
    fn display_balance_includes_currency() {
        let conn = get_test_connection();
        let user_id = create_test_user(&conn);

        let account = create_account(user_id, "cash", Currency::SerbianDinar, &conn)
            .expect("Could not create account");

        assert_eq!(account.display_balance(), "0.00 RSD");
    }
}
