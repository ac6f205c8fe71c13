//! Journal entry management for the application.
//!
//! This module contains everything related to single-account journal
//! entries:
//! - The `Transaction` model and `TransactionDraft` for describing new
//!   entries
//! - The atomic `record_transaction`/`record_rebalance` mutations
//! - The read-only queries the transaction and report pages are built from
//!
//! Paired-entry transfers live in [crate::transfer].

mod core;
mod query;
mod transaction_type;

pub use core::{
    CATEGORY_MAX_CHARS, DESCRIPTION_MAX_CHARS, Transaction, TransactionDraft,
    create_transactions_table, map_transaction_row, record_rebalance, record_transaction,
};
pub use query::{
    get_all_transactions, get_latest, get_transaction, get_transactions_by_date,
    get_transactions_by_date_and_type, get_transactions_by_type, get_transfers,
};
pub use transaction_type::TransactionType;

pub(crate) use core::insert_journal_row;
