//! Read-only queries over the journal.
//!
//! Every query is scoped to one user. Listings that feed paginated pages
//! are ordered by `date DESC, id DESC` so same-day entries keep a stable
//! order across requests; date ranges are inclusive on both ends.

use rusqlite::Connection;
use time::Date;

use crate::{
    Error,
    database_id::{TransactionId, UserId},
};

use super::{
    core::{Transaction, map_transaction_row},
    transaction_type::TransactionType,
};

const SELECT_COLUMNS: &str = "SELECT id, account_id, user_id, date, amount, currency, category, description, transaction_type FROM transactions";

/// Retrieve a journal entry by its `id`.
///
/// # Errors
/// This function will return a:
/// - [Error::NotFound] if `id` does not refer to a valid journal entry,
/// - or [Error::SqlError] if there is some other SQL error.
pub fn get_transaction(id: TransactionId, connection: &Connection) -> Result<Transaction, Error> {
    let transaction = connection
        .prepare(&format!("{SELECT_COLUMNS} WHERE id = :id"))?
        .query_row(&[(":id", &id)], map_transaction_row)?;

    Ok(transaction)
}

/// Retrieve all of a user's journal entries.
///
/// # Errors
/// This function will return a [Error::SqlError] if there is an SQL error.
pub fn get_all_transactions(
    user_id: UserId,
    connection: &Connection,
) -> Result<Vec<Transaction>, Error> {
    connection
        .prepare(&format!("{SELECT_COLUMNS} WHERE user_id = :user_id"))?
        .query_map(&[(":user_id", &user_id)], map_transaction_row)?
        .map(|transaction_result| transaction_result.map_err(Error::SqlError))
        .collect()
}

/// Retrieve a user's journal entries with dates between `start_date` and
/// `end_date` (both inclusive), newest first.
///
/// # Errors
/// This function will return a [Error::SqlError] if there is an SQL error.
pub fn get_transactions_by_date(
    user_id: UserId,
    start_date: Date,
    end_date: Date,
    connection: &Connection,
) -> Result<Vec<Transaction>, Error> {
    connection
        .prepare(&format!(
            "{SELECT_COLUMNS}
             WHERE user_id = ?1
             AND date BETWEEN ?2 AND ?3
             ORDER BY date DESC, id DESC"
        ))?
        .query_map((user_id, start_date, end_date), map_transaction_row)?
        .map(|transaction_result| transaction_result.map_err(Error::SqlError))
        .collect()
}

/// Retrieve a user's journal entries of one type.
///
/// # Errors
/// This function will return a [Error::SqlError] if there is an SQL error.
pub fn get_transactions_by_type(
    user_id: UserId,
    transaction_type: TransactionType,
    connection: &Connection,
) -> Result<Vec<Transaction>, Error> {
    connection
        .prepare(&format!(
            "{SELECT_COLUMNS}
             WHERE user_id = ?1
             AND transaction_type = ?2"
        ))?
        .query_map((user_id, transaction_type), map_transaction_row)?
        .map(|transaction_result| transaction_result.map_err(Error::SqlError))
        .collect()
}

/// Retrieve a user's journal entries of one type with dates between
/// `start_date` and `end_date` (both inclusive), newest first.
///
/// # Errors
/// This function will return a [Error::SqlError] if there is an SQL error.
pub fn get_transactions_by_date_and_type(
    user_id: UserId,
    transaction_type: TransactionType,
    start_date: Date,
    end_date: Date,
    connection: &Connection,
) -> Result<Vec<Transaction>, Error> {
    connection
        .prepare(&format!(
            "{SELECT_COLUMNS}
             WHERE user_id = ?1
             AND date BETWEEN ?2 AND ?3
             AND transaction_type = ?4
             ORDER BY date DESC, id DESC"
        ))?
        .query_map(
            (user_id, start_date, end_date, transaction_type),
            map_transaction_row,
        )?
        .map(|transaction_result| transaction_result.map_err(Error::SqlError))
        .collect()
}

/// Retrieve the most recent journal entries of one type, at most `limit`
/// rows, newest first.
///
/// # Errors
/// This function will return a [Error::SqlError] if there is an SQL error.
pub fn get_latest(
    user_id: UserId,
    limit: i64,
    transaction_type: TransactionType,
    connection: &Connection,
) -> Result<Vec<Transaction>, Error> {
    connection
        .prepare(&format!(
            "{SELECT_COLUMNS}
             WHERE user_id = ?1
             AND transaction_type = ?2
             ORDER BY date DESC, id DESC
             LIMIT ?3"
        ))?
        .query_map((user_id, transaction_type, limit), map_transaction_row)?
        .map(|transaction_result| transaction_result.map_err(Error::SqlError))
        .collect()
}

/// Retrieve both legs of a user's transfers with dates between `start_date`
/// and `end_date` (both inclusive), newest first.
///
/// # Errors
/// This function will return a [Error::SqlError] if there is an SQL error.
pub fn get_transfers(
    user_id: UserId,
    start_date: Date,
    end_date: Date,
    connection: &Connection,
) -> Result<Vec<Transaction>, Error> {
    connection
        .prepare(&format!(
            "{SELECT_COLUMNS}
             WHERE user_id = ?1
             AND date BETWEEN ?2 AND ?3
             AND transaction_type IN (?4, ?5)
             ORDER BY date DESC, id DESC"
        ))?
        .query_map(
            (
                user_id,
                start_date,
                end_date,
                TransactionType::TransferIn,
                TransactionType::TransferOut,
            ),
            map_transaction_row,
        )?
        .map(|transaction_result| transaction_result.map_err(Error::SqlError))
        .collect()
}
