//! Database ID type definitions.

/// Alias for the integer type used for mapping to database IDs.
pub type DatabaseId = i64;

/// The ID of a row in the users table.
pub type UserId = i64;

/// The ID of a row in the accounts table.
pub type AccountId = i64;

/// The ID of a row in the transactions table (a journal entry).
pub type TransactionId = i64;
