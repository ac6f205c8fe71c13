//! Database initialization for the application.

use rusqlite::{Connection, Transaction as SqlTransaction, TransactionBehavior};

use crate::{
    Error, account::create_accounts_table, transaction::create_transactions_table,
    user::create_users_table,
};

/// Add the tables for the domain models to the database, if missing.
///
/// # Errors
/// Returns an error if the database cannot be initialized.
pub fn initialize(connection: &Connection) -> Result<(), Error> {
    let transaction =
        SqlTransaction::new_unchecked(connection, TransactionBehavior::Exclusive)?;

    create_users_table(&transaction)?;
    create_accounts_table(&transaction)?;
    create_transactions_table(&transaction)?;

    transaction.commit()?;

    Ok(())
}
