//! Bitversity CLI - Database migrations and management tools.
//!
//! # Usage
//!
//! ```bash
//! # Run database migrations
//! bv-cli migrate
//!
//! # Create an admin user
//! bv-cli admin create -e ops@bitversity.com -f Ada -l Lovelace -p 'correct horse battery'
//!
//! # Disable an admin user
//! bv-cli admin set-active -e ops@bitversity.com --active false
//!
//! # Delete expired remember-me tokens
//! bv-cli tokens purge
//! ```

#![cfg_attr(not(test), forbid(unsafe_code))]

use clap::{ArgAction, Parser, Subcommand};

mod commands;

#[derive(Debug, Parser)]
#[command(name = "bv-cli")]
#[command(author, version, about = "Bitversity CLI tools")]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Debug, Subcommand)]
enum Commands {
    /// Run database migrations
    Migrate,
    /// Manage admin users
    Admin {
        #[command(subcommand)]
        action: AdminAction,
    },
    /// Maintain remember-me tokens
    Tokens {
        #[command(subcommand)]
        action: TokenAction,
    },
}

#[derive(Debug, Subcommand)]
enum AdminAction {
    /// Create a new admin user
    Create {
        /// Admin email address
        #[arg(short, long)]
        email: String,

        /// First name
        #[arg(short, long)]
        first_name: String,

        /// Last name
        #[arg(short, long)]
        last_name: String,

        /// Initial password (at least 12 characters)
        #[arg(short, long)]
        password: String,
    },
    /// Activate or deactivate an account
    SetActive {
        /// Account email address
        #[arg(short, long)]
        email: String,

        /// `true` to activate, `false` to deactivate
        #[arg(long, action = ArgAction::Set)]
        active: bool,
    },
}

#[derive(Debug, Subcommand)]
enum TokenAction {
    /// Delete expired remember-me tokens
    Purge,
}

#[tokio::main]
async fn main() {
    let env_filter = tracing_subscriber::EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| "info".into());
    tracing_subscriber::fmt().with_env_filter(env_filter).init();

    let cli = Cli::parse();

    if let Err(e) = run(cli).await {
        tracing::error!("Command failed: {e}");
        std::process::exit(1);
    }
}

async fn run(cli: Cli) -> Result<(), commands::CommandError> {
    match cli.command {
        Commands::Migrate => commands::migrate::run().await?,
        Commands::Admin { action } => match action {
            AdminAction::Create {
                email,
                first_name,
                last_name,
                password,
            } => {
                commands::admin::create_user(&email, &first_name, &last_name, &password).await?;
            }
            AdminAction::SetActive { email, active } => {
                commands::admin::set_active(&email, active).await?;
            }
        },
        Commands::Tokens { action } => match action {
            TokenAction::Purge => {
                commands::tokens::purge().await?;
            }
        },
    }
    Ok(())
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use clap::CommandFactory;

    use super::*;

    #[test]
    fn test_cli_definition_is_valid() {
        Cli::command().debug_assert();
    }

    #[test]
    fn test_parse_admin_create_short_flags() {
        let cli = Cli::try_parse_from([
            "bv-cli",
            "admin",
            "create",
            "-e",
            "ops@bitversity.com",
            "-f",
            "Ada",
            "-l",
            "Lovelace",
            "-p",
            "correct horse battery",
        ])
        .unwrap();

        match cli.command {
            Commands::Admin {
                action:
                    AdminAction::Create {
                        email,
                        first_name,
                        last_name,
                        password,
                    },
            } => {
                assert_eq!(email, "ops@bitversity.com");
                assert_eq!(first_name, "Ada");
                assert_eq!(last_name, "Lovelace");
                assert_eq!(password, "correct horse battery");
            }
            other => panic!("unexpected command: {other:?}"),
        }
    }

    #[test]
    fn test_parse_set_active_takes_explicit_bool() {
        let cli = Cli::try_parse_from([
            "bv-cli",
            "admin",
            "set-active",
            "-e",
            "ops@bitversity.com",
            "--active",
            "false",
        ])
        .unwrap();
        assert!(matches!(
            cli.command,
            Commands::Admin {
                action: AdminAction::SetActive { active: false, .. }
            }
        ));

        assert!(
            Cli::try_parse_from(["bv-cli", "admin", "set-active", "-e", "a@b.co", "--active"])
                .is_err()
        );
    }

    #[test]
    fn test_parse_tokens_purge_and_migrate() {
        assert!(matches!(
            Cli::try_parse_from(["bv-cli", "tokens", "purge"]).unwrap().command,
            Commands::Tokens {
                action: TokenAction::Purge
            }
        ));
        assert!(matches!(
            Cli::try_parse_from(["bv-cli", "migrate"]).unwrap().command,
            Commands::Migrate
        ));
    }
}
