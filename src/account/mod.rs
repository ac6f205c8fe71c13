//! Account management for the application.
//!
//! An account's `balance` column caches the signed sum of its journal
//! entries. The ledger operations in [crate::transaction] and
//! [crate::transfer] are the only writers of that column.

mod core;

pub use core::{
    Account, create_account, create_accounts_table, get_account, get_all_accounts,
    map_row_to_account,
};

pub(crate) use core::get_account_balance;
