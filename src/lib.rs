//! Kasa is a web app for tracking personal finances across accounts held
//! in Serbian dinars and euros.
//!
//! This library is the ledger core of the application: every write that
//! affects an account balance goes through here, together with the journal
//! queries and reports built on top of it. The HTTP layer validates user
//! input and calls into this crate; it never touches the database directly.

#![warn(missing_docs)]

mod account;
mod currency;
mod database_id;
mod db;
mod report;
mod transaction;
mod transfer;
mod user;

pub use account::{Account, create_account, get_account, get_all_accounts};
pub use currency::Currency;
pub use database_id::{AccountId, DatabaseId, TransactionId, UserId};
pub use db::initialize;
pub use report::{GroupingReport, TotalReport, get_grouping_by_date, total_report};
pub use transaction::{
    CATEGORY_MAX_CHARS, DESCRIPTION_MAX_CHARS, Transaction, TransactionDraft, TransactionType,
    get_all_transactions, get_latest, get_transaction, get_transactions_by_date,
    get_transactions_by_date_and_type, get_transactions_by_type, get_transfers, record_rebalance,
    record_transaction,
};
pub use transfer::{DINARS_PER_EURO, TransferDraft, convert_amount, record_transfer};
pub use user::{User, create_user, get_user_by_id};

/// The errors that may occur in the application.
#[derive(Debug, thiserror::Error, PartialEq)]
pub enum Error {
    /// The requested resource was not found.
    ///
    /// For HTTP request handlers, the client should check that the
    /// parameters (e.g., ID) are correct and that the resource has been
    /// created.
    ///
    /// Internally, this error may occur when a query returns no rows.
    #[error("the requested resource could not be found")]
    NotFound,

    /// A ledger mutation referenced an account that does not exist for the
    /// requesting user.
    ///
    /// Surfaced as a field-level error on the account selector rather than
    /// a server error.
    #[error("the account does not exist")]
    AccountDoesNotExist,

    /// The specified account name already exists for this user.
    #[error("the account \"{0}\" already exists in the database")]
    DuplicateAccountName(String),

    /// The specified email address already belongs to a registered user.
    #[error("the email address is already registered")]
    DuplicateEmail,

    /// The mutation would take the account balance below zero.
    ///
    /// Checked inside the same transactional scope as the journal insert,
    /// so two overlapping mutations cannot both pass the check against the
    /// same starting balance.
    #[error("the account does not have sufficient funds")]
    InsufficientFunds,

    /// An unhandled/unexpected SQL error.
    #[error("an unexpected SQL error occurred: {0}")]
    SqlError(rusqlite::Error),
}

impl From<rusqlite::Error> for Error {
    fn from(value: rusqlite::Error) -> Self {
        match value {
            rusqlite::Error::QueryReturnedNoRows => Error::NotFound,
            error => {
                tracing::error!("an unhandled SQL error occurred: {}", error);
                Error::SqlError(error)
            }
        }
    }
}
