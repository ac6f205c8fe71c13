//! Moving funds between two accounts as a pair of linked journal entries.

use rusqlite::{Connection, Transaction as SqlTransaction, TransactionBehavior};
use time::Date;

use crate::{
    Error,
    account::{Account, get_account_balance},
    currency::Currency,
    transaction::{TransactionDraft, TransactionType, insert_journal_row},
};

/// The fixed exchange rate the demo tooling converts with, in dinars per
/// euro. Handlers pass whatever rate they are configured with.
pub const DINARS_PER_EURO: f64 = 117.0;

/// A validated transfer waiting to be recorded.
///
/// `to_amount` is the already-converted amount that arrives on the
/// destination account; the caller applies its exchange rate (see
/// [convert_amount]) before building the draft.
#[derive(Debug, Clone, PartialEq)]
pub struct TransferDraft {
    /// A snapshot of the account the funds leave.
    pub from_account: Account,
    /// A snapshot of the account the funds arrive on.
    pub to_account: Account,
    /// The amount leaving the source account, in its currency.
    pub from_amount: f64,
    /// The amount arriving on the destination account, in its currency.
    pub to_amount: f64,
    /// The date both journal entries are recorded under.
    pub date: Date,
}

/// Convert `amount` from one currency to the other at `dinars_per_euro`.
///
/// Same-currency conversions return the amount unchanged.
pub fn convert_amount(amount: f64, from: Currency, to: Currency, dinars_per_euro: f64) -> f64 {
    match (from, to) {
        (Currency::Euro, Currency::SerbianDinar) => amount * dinars_per_euro,
        (Currency::SerbianDinar, Currency::Euro) => amount / dinars_per_euro,
        (Currency::SerbianDinar, Currency::SerbianDinar)
        | (Currency::Euro, Currency::Euro) => amount,
    }
}

/// Record a transfer as a [TransactionType::TransferOut] entry on the
/// source account and a [TransactionType::TransferIn] entry on the
/// destination account, updating both cached balances.
///
/// All four writes happen in one write-locking database transaction, so
/// money can never be observed leaving one account without arriving on the
/// other. Both balances are read back inside that transaction and updated
/// with relative increments, closing the lost-update race between
/// overlapping mutations. Both entries share a generated description naming
/// the two accounts.
///
/// # Errors
/// This function will return a:
/// - [Error::AccountDoesNotExist] if either account snapshot does not refer
///   to an account owned by its user,
/// - [Error::InsufficientFunds] if the source account holds less than
///   `from_amount`,
/// - or [Error::SqlError] if there is some other SQL error.
///
/// On any error the transactional scope is rolled back and no partial
/// transfer is persisted.
pub fn record_transfer(draft: TransferDraft, connection: &Connection) -> Result<(), Error> {
    let tx = SqlTransaction::new_unchecked(connection, TransactionBehavior::Immediate)?;

    let from_balance =
        get_account_balance(draft.from_account.id, draft.from_account.user_id, &tx)?;
    get_account_balance(draft.to_account.id, draft.to_account.user_id, &tx)?;

    if from_balance - draft.from_amount < 0.0 {
        return Err(Error::InsufficientFunds);
    }

    let description = format!(
        "[T] from {} to {}",
        draft.from_account.name, draft.to_account.name
    );

    insert_journal_row(
        &tx,
        &TransactionDraft::new(
            draft.from_account.id,
            draft.from_account.user_id,
            draft.date,
            draft.from_amount,
            draft.from_account.currency,
            "transfer",
            &description,
            TransactionType::TransferOut,
        ),
    )?;
    tx.execute(
        "UPDATE accounts SET balance = balance - ?1 WHERE id = ?2",
        (draft.from_amount, draft.from_account.id),
    )?;

    insert_journal_row(
        &tx,
        &TransactionDraft::new(
            draft.to_account.id,
            draft.to_account.user_id,
            draft.date,
            draft.to_amount,
            draft.to_account.currency,
            "transfer",
            &description,
            TransactionType::TransferIn,
        ),
    )?;
    tx.execute(
        "UPDATE accounts SET balance = balance + ?1 WHERE id = ?2",
        (draft.to_amount, draft.to_account.id),
    )?;

    tx.commit()?;

    Ok(())
}


#[cfg(test)]
mod record_transfer_tests {
    use rusqlite::Connection;
    use time::macros::date;

    use crate::{
        Currency, Error, TransactionType,
        account::{Account, create_account, get_account},
        db::initialize,
        transaction::{TransactionDraft, get_transfers, record_transaction},
        user::create_user,
    };

    use super::{TransferDraft, convert_amount, record_transfer};

    fn get_test_connection() -> Connection {
        let conn = Connection::open_in_memory().unwrap();
        initialize(&conn).unwrap();
        conn
    }

    /// A cash account holding 1000 RSD and an empty euro savings account.
    fn create_test_accounts(conn: &Connection) -> (Account, Account) {
        let user = create_user("Alice", "alice@example.com", "hunter2hash", conn)
            .expect("Could not create user");
        let cash = create_account(user.id, "cash", Currency::SerbianDinar, conn)
            .expect("Could not create account");
        let savings = create_account(user.id, "savings", Currency::Euro, conn)
            .expect("Could not create account");

        record_transaction(
            TransactionDraft::new(
                cash.id,
                cash.user_id,
                date!(2025 - 03 - 01),
                1000.0,
                cash.currency,
                "salary",
                "",
                TransactionType::Income,
            ),
            conn,
        )
        .expect("Could not seed balance");

        let cash = get_account(user.id, cash.id, conn).unwrap();
        (cash, savings)
    }

    #[test]
    fn transfer_moves_funds_between_accounts() {
        let conn = get_test_connection();
        let (cash, savings) = create_test_accounts(&conn);
        let from_amount = 234.0;
        let to_amount = convert_amount(from_amount, cash.currency, savings.currency, 117.0);

        record_transfer(
            TransferDraft {
                from_account: cash.clone(),
                to_account: savings.clone(),
                from_amount,
                to_amount,
                date: date!(2025 - 03 - 10),
            },
            &conn,
        )
        .expect("Could not record transfer");

        let cash = get_account(cash.user_id, cash.id, &conn).unwrap();
        let savings = get_account(savings.user_id, savings.id, &conn).unwrap();
        assert_eq!(cash.balance, 1000.0 - 234.0);
        assert_eq!(savings.balance, 2.0);
    }

    #[test]
    fn transfer_records_one_leg_per_account() {
        let conn = get_test_connection();
        let (cash, savings) = create_test_accounts(&conn);

        record_transfer(
            TransferDraft {
                from_account: cash.clone(),
                to_account: savings.clone(),
                from_amount: 117.0,
                to_amount: 1.0,
                date: date!(2025 - 03 - 10),
            },
            &conn,
        )
        .expect("Could not record transfer");

        let legs = get_transfers(
            cash.user_id,
            date!(2025 - 03 - 10),
            date!(2025 - 03 - 10),
            &conn,
        )
        .expect("Could not query transfers");

        assert_eq!(legs.len(), 2);
        let out_leg = legs
            .iter()
            .find(|leg| leg.transaction_type == TransactionType::TransferOut)
            .expect("Missing outgoing leg");
        let in_leg = legs
            .iter()
            .find(|leg| leg.transaction_type == TransactionType::TransferIn)
            .expect("Missing incoming leg");

        assert_eq!(out_leg.account_id, cash.id);
        assert_eq!(out_leg.amount, 117.0);
        assert_eq!(in_leg.account_id, savings.id);
        assert_eq!(in_leg.amount, 1.0);
        assert_eq!(out_leg.description, "[T] from cash to savings");
        assert_eq!(in_leg.description, out_leg.description);
        assert_eq!(out_leg.category, "transfer");
    }

    #[test]
    fn transfer_fails_on_missing_destination_without_touching_source() {
        let conn = get_test_connection();
        let (cash, savings) = create_test_accounts(&conn);
        let mut missing = savings.clone();
        missing.id = savings.id + 100;

        let result = record_transfer(
            TransferDraft {
                from_account: cash.clone(),
                to_account: missing,
                from_amount: 100.0,
                to_amount: 100.0,
                date: date!(2025 - 03 - 10),
            },
            &conn,
        );

        assert_eq!(result, Err(Error::AccountDoesNotExist));
        let cash = get_account(cash.user_id, cash.id, &conn).unwrap();
        assert_eq!(cash.balance, 1000.0);
        let legs = get_transfers(
            cash.user_id,
            date!(2025 - 03 - 10),
            date!(2025 - 03 - 10),
            &conn,
        )
        .unwrap();
        assert_eq!(legs, vec![]);
    }

    #[test]
    fn transfer_fails_on_insufficient_funds() {
        let conn = get_test_connection();
        let (cash, savings) = create_test_accounts(&conn);

        let result = record_transfer(
            TransferDraft {
                from_account: cash.clone(),
                to_account: savings.clone(),
                from_amount: 1000.5,
                to_amount: 1000.5,
                date: date!(2025 - 03 - 10),
            },
            &conn,
        );

        assert_eq!(result, Err(Error::InsufficientFunds));
        let cash = get_account(cash.user_id, cash.id, &conn).unwrap();
        let savings = get_account(savings.user_id, savings.id, &conn).unwrap();
        assert_eq!(cash.balance, 1000.0);
        assert_eq!(savings.balance, 0.0);
    }
}
