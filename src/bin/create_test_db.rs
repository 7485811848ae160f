use std::error::Error;
use std::path::Path;
use std::process::exit;

use clap::Parser;
use rusqlite::Connection;
use rust_decimal::Decimal;
use time::{Date, Duration, OffsetDateTime};

use wallet_rs::{
    EntryType, NewTransaction, PasswordHash, Username, ValidatedPassword, create_profile,
    create_transaction, create_user, get_categories_by_kind, get_currencies, initialize_db,
};

/// A utility for creating a test database for the web server of wallet_rs.
#[derive(Parser, Debug)]
#[command(version, about, long_about = None)]
struct Args {
    /// File path to save the SQLite database to.
    #[arg(long, short)]
    output_path: String,
}

/// How many days of sample entries to create, counting back from today.
const SAMPLE_DAYS: i64 = 210;

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

    println!("Creating test user...");

    let password_hash = PasswordHash::new(
        ValidatedPassword::new_unchecked("test"),
        PasswordHash::DEFAULT_COST,
    )?;
    let user = create_user(Username::new("test")?, password_hash, &conn)?;

    let currency = get_currencies(&conn)?
        .into_iter()
        .find(|currency| currency.abbreviation == "USD")
        .ok_or("the US dollar is missing from the seeded currencies")?;
    create_profile(user.id, currency.id, &conn)?;

    println!("Creating sample entries...");

    let today = OffsetDateTime::now_utc().date();
    let mut count = 0;
    for transaction in sample_transactions(today, &conn)? {
        create_transaction(user.id, transaction, &conn)?;
        count += 1;
    }

    println!("Created {count} entries for the user \"test\" with the password \"test\".");
    println!("Success!");

    Ok(())
}

/// An expense every other day and a salary every fortnight.
fn sample_transactions(
    today: Date,
    conn: &Connection,
) -> Result<Vec<NewTransaction>, Box<dyn Error>> {
    let expense_categories = get_categories_by_kind(EntryType::Expense, conn)?;
    let income_categories = get_categories_by_kind(EntryType::Income, conn)?;
    let salary = income_categories
        .iter()
        .find(|category| category.name == "Salary")
        .ok_or("the salary category is missing from the seeded categories")?;

    let mut transactions = Vec::new();

    for days_ago in 0..SAMPLE_DAYS {
        let date = today - Duration::days(days_ago);

        if days_ago % 14 == 0 {
            transactions.push(NewTransaction {
                date,
                type_id: salary.type_id,
                category_id: salary.id,
                name: "Pay".to_owned(),
                amount: Decimal::new(215_000, 2),
                note: "fortnightly pay".to_owned(),
            });
        }

        if days_ago % 2 == 0 && !expense_categories.is_empty() {
            let index = (days_ago as usize / 2) % expense_categories.len();
            let category = &expense_categories[index];
            let cents = 1_250 + (days_ago * 731) % 9_000;

            transactions.push(NewTransaction {
                date,
                type_id: category.type_id,
                category_id: category.id,
                name: format!("{} purchase", category.name),
                amount: Decimal::new(cents, 2),
                note: String::new(),
            });
        }
    }

    Ok(transactions)
}
