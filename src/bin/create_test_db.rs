use std::error::Error;
use std::path::Path;
use std::process::exit;
use std::sync::{Arc, Mutex};

use clap::Parser;
use rusqlite::Connection;
use rust_decimal::Decimal;
use time::{Duration, OffsetDateTime};

use finance_tracker::{
    Category, NewTransaction, SQLiteTransactionStore, TransactionStore, TransactionType,
    initialize_db,
};

/// A utility for creating a test database for the finance tracker server.
#[derive(Parser, Debug)]
#[command(version, about, long_about = None)]
struct Args {
    /// File path to save the SQLite database to.
    #[arg(long, short)]
    output_path: String,

    /// The number of months to create transactions for, ending with the current month.
    #[arg(long, short, default_value_t = 6)]
    months: i64,
}

/// The expenses repeated every month as (days after the start of the month,
/// amount in cents, category, description).
const MONTHLY_EXPENSES: [(i64, i64, Category, &str); 7] = [
    (1, 185_000, Category::Other, "Rent"),
    (3, 14_250, Category::Food, "Weekly groceries"),
    (6, 6_000, Category::Transportation, "Bus pass"),
    (10, 12_999, Category::Utilities, "Power bill"),
    (14, 4_550, Category::Entertainment, "Cinema tickets"),
    (18, 8_999, Category::Shopping, "New shoes"),
    (22, 3_500, Category::Healthcare, "Prescription"),
];

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

    let store = SQLiteTransactionStore::new(Arc::new(Mutex::new(conn)));
    let today = OffsetDateTime::now_utc().replace_time(time::Time::MIDNIGHT);
    let mut count = 0;

    println!("Creating transactions for the last {} months...", args.months);

    for months_ago in (0..args.months).rev() {
        // Close enough to the start of a month for sample data.
        let month_start = today - Duration::days(30 * months_ago + i64::from(today.day()) - 1);

        let mut transactions = vec![NewTransaction {
            amount: Decimal::new(520_000, 2),
            description: "Salary".to_owned(),
            category: Category::Income,
            kind: TransactionType::Income,
            date: month_start,
        }];

        for (day, cents, category, description) in MONTHLY_EXPENSES {
            transactions.push(NewTransaction {
                amount: Decimal::new(cents + 100 * months_ago, 2),
                description: description.to_owned(),
                category,
                kind: TransactionType::Expense,
                date: month_start + Duration::days(day),
            });
        }

        for transaction in transactions {
            if transaction.date > today {
                continue;
            }

            store.insert(transaction)?;
            count += 1;
        }
    }

    println!("Created {count} transactions.");
    println!("Success!");

    Ok(())
}
