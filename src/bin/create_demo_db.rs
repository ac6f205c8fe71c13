use std::{path::Path, process::exit};

use clap::Parser;
use rusqlite::Connection;
use time::{Duration, OffsetDateTime};
use tracing_subscriber::{filter::EnvFilter, layer::SubscriberExt, util::SubscriberInitExt, Layer};

use kasa_rs::{
    Currency, DINARS_PER_EURO, TransactionDraft, TransactionType, TransferDraft, convert_amount,
    create_account, create_user, get_account, get_all_accounts, get_grouping_by_date, initialize,
    record_rebalance, record_transaction, record_transfer,
};

/// Create and populate a database for manual testing.
#[derive(Parser, Debug)]
#[command(version, about, long_about = None)]
struct Args {
    /// File path to write the demo SQLite database to.
    #[arg(long)]
    db_path: String,
}

fn main() -> Result<(), Box<dyn std::error::Error>> {
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::fmt::layer()
                .pretty()
                .with_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"))),
        )
        .init();

    let args = Args::parse();
    let output_path = Path::new(&args.db_path);

    if output_path.is_file() {
        eprintln!("File already exists at {output_path:#?}!");
        exit(1);
    }

    tracing::info!("Creating database at {output_path:#?}");
    let conn = Connection::open(output_path)?;
    initialize(&conn)?;

    tracing::info!("Creating demo user...");
    // Not a real login: the web layer hashes passwords before they reach
    // the ledger crate.
    let user = create_user("Demo User", "demo@example.com", "demo-password-hash", &conn)?;

    let cash = create_account(user.id, "cash", Currency::SerbianDinar, &conn)?;
    let savings = create_account(user.id, "savings", Currency::Euro, &conn)?;

    let today = OffsetDateTime::now_utc().date();

    tracing::info!("Recording demo transactions...");
    record_transaction(
        TransactionDraft::new(
            cash.id,
            user.id,
            today - Duration::days(14),
            75000.0,
            cash.currency,
            "salary",
            "march salary",
            TransactionType::Income,
        ),
        &conn,
    )?;
    record_transaction(
        TransactionDraft::new(
            cash.id,
            user.id,
            today - Duration::days(10),
            4200.0,
            cash.currency,
            "groceries",
            "weekly shop",
            TransactionType::Expense,
        ),
        &conn,
    )?;
    record_transaction(
        TransactionDraft::new(
            cash.id,
            user.id,
            today - Duration::days(7),
            6300.0,
            cash.currency,
            "utilities",
            "power and water",
            TransactionType::Expense,
        ),
        &conn,
    )?;

    tracing::info!("Recording demo transfer...");
    let from_amount = 11700.0;
    let cash = get_account(user.id, cash.id, &conn)?;
    record_transfer(
        TransferDraft {
            from_account: cash.clone(),
            to_account: savings.clone(),
            from_amount,
            to_amount: convert_amount(
                from_amount,
                cash.currency,
                savings.currency,
                DINARS_PER_EURO,
            ),
            date: today - Duration::days(3),
        },
        &conn,
    )?;

    // Pretend the bank statement shows 52790 instead of the cached 52800.
    let cash = get_account(user.id, cash.id, &conn)?;
    record_rebalance(&cash, cash.balance - 52790.0, today, &conn)?;

    for account in get_all_accounts(user.id, &conn)? {
        println!("{}: {}", account.name, account.display_balance());
    }

    let spending = get_grouping_by_date(
        user.id,
        TransactionType::Expense,
        today - Duration::days(30),
        today,
        &conn,
    )?;
    println!("{}", serde_json::to_string_pretty(&spending)?);

    Ok(())
}
