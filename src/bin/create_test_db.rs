use std::error::Error;
use std::path::Path;
use std::process::exit;

use clap::Parser;
use rusqlite::Connection;

use widata::{
    ExpenseCategory, NewDebt, NewExpense, NewUser, PasswordHash, ValidatedPassword, create_debt,
    create_expense, create_user, get_lending_banks, initialize_db, parse_email,
};

/// A utility for creating a test database for the Widata server.
#[derive(Parser, Debug)]
#[command(version, about, long_about = None)]
struct Args {
    /// File path to save the SQLite database to.
    #[arg(long, short)]
    output_path: String,
}

const TEST_EMAIL: &str = "test@example.com";
const TEST_PASSWORD: &str = "test";

/// Create and populate a database for manual testing.
fn main() -> Result<(), Box<dyn Error>> {
    let args = Args::parse();

    let output_path = Path::new(&args.output_path);

    match output_path.extension() {
        Some(extension) if !extension.is_empty() => {}
        _ => {
            eprintln!("Output path must include a file extension (e.g., 'my_database.db').");
            exit(1);
        }
    }

    if output_path.is_file() {
        eprintln!("File already exists at {output_path:#?}!");
        exit(1);
    }

    println!("Creating database at {output_path:#?}");
    let conn = Connection::open(output_path)?;

    initialize_db(&conn)?;

    println!("Creating test user {TEST_EMAIL} with the password {TEST_PASSWORD:?}...");

    let password_hash = PasswordHash::new(
        ValidatedPassword::new_unchecked(TEST_PASSWORD),
        PasswordHash::DEFAULT_COST,
    )?;

    let user = create_user(
        NewUser {
            first_name: "Test".to_owned(),
            last_name: "User".to_owned(),
            age: 30,
            phone: "5512345678".to_owned(),
            email: parse_email(TEST_EMAIL)?,
            password_hash,
        },
        &conn,
    )?;

    println!("Adding debts...");

    let banks = get_lending_banks(&conn)?;
    let debts = [
        (15_000.0, 20_000.0, 45.0, 750.0),
        (3_200.0, 10_000.0, 62.5, 320.0),
        (48_000.0, 0.0, 18.9, 2_100.0),
    ];

    for (bank, (balance, credit_limit, annual_rate, minimum_payment)) in banks.iter().zip(debts) {
        create_debt(
            user.id,
            NewDebt {
                bank_id: bank.id,
                balance,
                credit_limit,
                annual_rate,
                minimum_payment,
            },
            &conn,
        )?;
    }

    println!("Adding expenses...");

    let expenses = [
        ("Rent", 8_500.0, ExpenseCategory::Fixed),
        ("Streaming subscriptions", 299.0, ExpenseCategory::Fixed),
        ("Groceries", 2_350.0, ExpenseCategory::Variable),
        ("Electricity", 640.0, ExpenseCategory::Variable),
        ("Coffee", 65.0, ExpenseCategory::Ant),
        ("Snacks", 48.5, ExpenseCategory::Ant),
        ("Mobile game", 99.0, ExpenseCategory::Ant),
    ];

    for (description, amount, category) in expenses {
        create_expense(
            user.id,
            NewExpense {
                description: description.to_owned(),
                amount,
                category,
            },
            &conn,
        )?;
    }

    println!("Success!");

    Ok(())
}
