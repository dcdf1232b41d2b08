use std::error::Error;
use std::path::Path;
use std::process::exit;

use clap::Parser;
use rusqlite::Connection;
use time::{Date, Duration, OffsetDateTime};

use fintrack::{TransactionDraft, TransactionType, UserId, create_transaction, initialize_db};

/// A utility for creating a test database for the REST API server of fintrack.
#[derive(Parser, Debug)]
#[command(version, about, long_about = None)]
struct Args {
    /// File path to save the SQLite database to.
    #[arg(long, short)]
    output_path: String,

    /// The user ID that owns the sample transactions. Use the same ID with
    /// `issue_token` to view them.
    #[arg(long, short, default_value = "test-user")]
    user_id: String,
}

/// Create and populate a database for manual testing.
fn main() -> Result<(), Box<dyn Error>> {
    let args = Args::parse();

    let output_path = Path::new(&args.output_path);

    match output_path.extension() {
        None => {
            eprintln!("Output path must include a file extension (e.g., 'my_database.db').");
            exit(1);
        }
        Some(extension) if extension.is_empty() => {
            eprintln!("Output path must include a file extension (e.g., 'my_database.db').");
            exit(1);
        }
        _ => {}
    }

    if output_path.is_file() {
        eprintln!("File already exists at {output_path:#?}!");
        exit(1);
    }

    println!("Creating database at {output_path:#?}");
    let conn = Connection::open(output_path)?;

    initialize_db(&conn)?;

    let owner = UserId::new(&args.user_id);
    let today = OffsetDateTime::now_utc().date();

    println!("Creating sample transactions for {owner}...");

    for draft in sample_transactions(today) {
        create_transaction(&owner, draft.validate()?, &conn)?;
    }

    println!("Success!");

    Ok(())
}

fn sample_transactions(today: Date) -> Vec<TransactionDraft> {
    let draft = |title: &str,
                 amount: f64,
                 days_ago: i64,
                 category: &str,
                 transaction_type: TransactionType| TransactionDraft {
        title: title.to_owned(),
        amount,
        date: today - Duration::days(days_ago),
        category: category.to_owned(),
        transaction_type,
    };

    vec![
        draft("Salary", 3000.0, 30, "Salary", TransactionType::Income),
        draft("Rent", 1200.0, 28, "Rent", TransactionType::Expense),
        draft("Power bill", 140.5, 21, "Utilities", TransactionType::Expense),
        draft("Groceries", 182.3, 14, "Food", TransactionType::Expense),
        draft("Bus pass", 60.0, 10, "Transport", TransactionType::Expense),
        draft("Birthday money", 100.0, 7, "Gift", TransactionType::Income),
        draft("Movie tickets", 32.0, 3, "Entertainment", TransactionType::Expense),
        draft("Coffee", 5.5, 0, "Food", TransactionType::Expense),
    ]
}
