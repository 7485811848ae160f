use std::{error::Error, io::ErrorKind, path::PathBuf, process::ExitCode};

use clap::Parser;
use rusqlite::Connection;

use wallet_rs::{PasswordHash, User, get_user_by_username, update_password};

/// Set a new password for a Wallet user, e.g. when they have forgotten theirs.
#[derive(Parser, Debug)]
#[command(version, about, long_about = None)]
struct Args {
    /// File path to the Wallet SQLite database.
    #[arg(long)]
    db_path: PathBuf,

    /// The username of the user whose password should be reset.
    #[arg(long, short)]
    username: String,
}

fn main() -> ExitCode {
    let args = Args::parse();

    match run(&args) {
        Ok(()) => ExitCode::SUCCESS,
        Err(error) => {
            eprintln!("\x1b[31;1mError: {error}\x1b[0m");
            ExitCode::FAILURE
        }
    }
}

fn run(args: &Args) -> Result<(), Box<dyn Error>> {
    if !args.db_path.is_file() {
        return Err(format!("no database at {}", args.db_path.display()).into());
    }

    let connection = Connection::open(&args.db_path)?;
    let user = get_user_by_username(&args.username, &connection)
        .map_err(|error| format!("could not find the user \"{}\": {error}", args.username))?;
    println!("Resetting password for {}", describe(&user));

    let Some(password_hash) = prompt_new_password(&user)? else {
        println!("Password left unchanged.");
        return Ok(());
    };

    update_password(user.username.as_str(), &password_hash, &connection)?;
    println!("Password updated successfully!");

    Ok(())
}

fn describe(user: &User) -> String {
    let full_name = format!("{} {}", user.details.first_name, user.details.last_name);

    match full_name.trim() {
        "" => user.username.to_string(),
        full_name => format!("{} ({full_name})", user.username),
    }
}

/// Ask for a password twice until both entries match and it is strong enough.
///
/// Returns `None` if the input ends, e.g. on Ctrl-D.
fn prompt_new_password(user: &User) -> Result<Option<PasswordHash>, Box<dyn Error>> {
    let user_inputs = [
        user.username.as_str(),
        user.details.first_name.as_str(),
        user.details.last_name.as_str(),
        user.details.email.as_str(),
    ];

    loop {
        println!();

        let password = match rpassword::prompt_password("Enter a new password: ") {
            Ok(password) => password,
            Err(error) if error.kind() == ErrorKind::UnexpectedEof => return Ok(None),
            Err(error) => return Err(error.into()),
        };
        let confirmation = match rpassword::prompt_password("Enter the same password again: ") {
            Ok(password) => password,
            Err(error) if error.kind() == ErrorKind::UnexpectedEof => return Ok(None),
            Err(error) => return Err(error.into()),
        };

        if password != confirmation {
            eprintln!("Passwords must match, try again.");
            continue;
        }

        match PasswordHash::from_raw_password(&password, &user_inputs, PasswordHash::DEFAULT_COST)
        {
            Ok(password_hash) => return Ok(Some(password_hash)),
            Err(error) => eprintln!("{error}"),
        }
    }
}
