use std::process::exit;

use clap::Parser;
use time::Duration;

use fintrack::{UserId, issue_hs256_token};

/// A utility for minting HS256 bearer tokens for local development.
///
/// The server must be started with the same `IDENTITY_SECRET`.
#[derive(Parser, Debug)]
#[command(version, about, long_about = None)]
struct Args {
    /// The user ID to put in the `sub` claim.
    user_id: String,

    /// Shared secret used to sign the token.
    #[arg(long, env = "IDENTITY_SECRET", hide_env_values = true)]
    secret: String,

    /// How long the token is valid for, in minutes.
    #[arg(long, default_value_t = 60)]
    ttl_minutes: i64,
}

fn main() {
    let _ = dotenvy::dotenv();

    let args = Args::parse();
    let user_id = UserId::new(&args.user_id);

    match issue_hs256_token(&user_id, &args.secret, Duration::minutes(args.ttl_minutes)) {
        Ok(token) => println!("{token}"),
        Err(error) => {
            eprintln!("{error}");
            exit(1);
        }
    }
}
