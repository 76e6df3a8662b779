//! Soko CLI - Database migrations and management tools.
//!
//! # Usage
//!
//! ```bash
//! # Apply pending migrations
//! soko migrate
//!
//! # Load categories, brands, and products from YAML
//! soko seed catalog --file crates/cli/seed/catalog.yaml
//!
//! # Create an account, optionally as an admin
//! soko user create -e admin@example.com -p 'correct horse' --first-name Amina --admin
//!
//! # Grant the admin role to an existing account
//! soko user promote -e amina@example.com
//! ```
//!
//! # Environment Variables
//!
//! - `DATABASE_URL` - `PostgreSQL` connection string (read from `.env` too)

#![cfg_attr(not(test), forbid(unsafe_code))]

use std::path::PathBuf;

use clap::{Parser, Subcommand};

mod commands;

#[derive(Parser)]
#[command(name = "soko")]
#[command(author, version, about = "Soko CLI tools")]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Run database migrations
    Migrate,
    /// Load reference data
    Seed {
        #[command(subcommand)]
        target: SeedTarget,
    },
    /// Manage accounts
    User {
        #[command(subcommand)]
        action: UserAction,
    },
}

#[derive(Subcommand)]
enum SeedTarget {
    /// Upsert categories, brands, and products by name
    Catalog {
        /// Path to the catalog YAML file
        #[arg(short, long, default_value = "crates/cli/seed/catalog.yaml")]
        file: PathBuf,
    },
}

#[derive(Subcommand)]
enum UserAction {
    /// Create an account with a password
    Create {
        /// Email address
        #[arg(short, long)]
        email: String,

        /// Password (8 to 128 characters)
        #[arg(short, long)]
        password: String,

        #[arg(long)]
        first_name: Option<String>,

        #[arg(long)]
        last_name: Option<String>,

        /// Create the account with the admin role
        #[arg(long)]
        admin: bool,
    },
    /// Grant the admin role to an existing account
    Promote {
        /// Email address
        #[arg(short, long)]
        email: String,
    },
}

#[tokio::main]
async fn main() {
    tracing_subscriber::fmt::init();

    let cli = Cli::parse();

    let result: Result<(), Box<dyn std::error::Error>> = run(cli).await;

    if let Err(e) = result {
        tracing::error!("Command failed: {e}");
        std::process::exit(1);
    }
}

async fn run(cli: Cli) -> Result<(), Box<dyn std::error::Error>> {
    match cli.command {
        Commands::Migrate => commands::migrate::run().await?,
        Commands::Seed { target } => match target {
            SeedTarget::Catalog { file } => commands::seed::catalog(&file).await?,
        },
        Commands::User { action } => match action {
            UserAction::Create {
                email,
                password,
                first_name,
                last_name,
                admin,
            } => {
                commands::user::create(
                    &email,
                    &password,
                    first_name.as_deref(),
                    last_name.as_deref(),
                    admin,
                )
                .await?;
            }
            UserAction::Promote { email } => commands::user::promote(&email).await?,
        },
    }
    Ok(())
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    #[test]
    fn test_cli_definition_is_valid() {
        use clap::CommandFactory;
        Cli::command().debug_assert();
    }

    #[test]
    fn test_parse_user_create() {
        let cli = Cli::try_parse_from([
            "soko", "user", "create", "-e", "a@example.com", "-p", "hunter22", "--admin",
        ])
        .unwrap();
        match cli.command {
            Commands::User {
                action: UserAction::Create { email, admin, first_name, .. },
            } => {
                assert_eq!(email, "a@example.com");
                assert!(admin);
                assert!(first_name.is_none());
            }
            _ => panic!("expected user create"),
        }
    }
}
