//! 運用CLI（`seasoners-admin`）
//!
//! 各サブコマンドは DB 接続を1つ開き、1つの操作を行って結果を標準出力に書く。
//! 接続の解放はバイナリ側で全ての終了経路に対して行う。

mod commands;

use clap::{Parser, Subcommand};
use sqlx::PgPool;
use uuid::Uuid;

#[derive(Debug, Parser)]
#[command(name = "seasoners-admin")]
#[command(about = "Seasoners database maintenance commands")]
pub struct Cli {
    #[command(subcommand)]
    pub command: Command,
}

#[derive(Debug, Clone, Subcommand)]
pub enum Command {
    /// Find or create a user with the given email and print its id
    CreateUser { email: String },

    /// Create the fixed automated-test user
    CreateTestUser,

    /// Delete a user together with sessions, accounts, waitlist signups and tokens
    DeleteUser { email: String },

    /// Delete users whose email contains "test" (case-insensitive)
    DeleteTestUsers,

    /// Delete listings that look like test or smoke-test data
    DeleteTestListings,

    /// Delete every listing
    DeleteAllListings,

    /// Set (argon2id-hashed) password for an existing user
    SetPassword {
        email: String,
        #[arg(long)]
        password: String,
    },

    /// Print agreements for a listing
    QueryAgreements { listing_id: Uuid },

    /// Print the most recently created users
    ListUsers {
        #[arg(long, default_value_t = 10)]
        limit: u32,
    },

    /// Create a throwaway user with a hashed password, then delete it
    SmokeUser,

    /// Delete verification tokens that have already expired
    PurgeExpiredTokens,
}

/// サブコマンドを実行
pub async fn run(command: Command, pool: &PgPool) -> anyhow::Result<()> {
    match command {
        Command::CreateUser { email } => commands::create_user(pool, &email).await,
        Command::CreateTestUser => commands::create_test_user(pool).await,
        Command::DeleteUser { email } => commands::delete_user(pool, &email).await,
        Command::DeleteTestUsers => commands::delete_test_users(pool).await,
        Command::DeleteTestListings => commands::delete_test_listings(pool).await,
        Command::DeleteAllListings => commands::delete_all_listings(pool).await,
        Command::SetPassword { email, password } => {
            commands::set_password(pool, &email, &password).await
        }
        Command::QueryAgreements { listing_id } => {
            commands::query_agreements(pool, listing_id).await
        }
        Command::ListUsers { limit } => commands::list_users(pool, limit).await,
        Command::SmokeUser => commands::smoke_user(pool).await,
        Command::PurgeExpiredTokens => commands::purge_expired_tokens(pool).await,
    }
}

#[cfg(test)]
mod tests {
    use clap::CommandFactory;

    use super::*;

    fn parse(args: &[&str]) -> Result<Cli, clap::Error> {
        Cli::try_parse_from(std::iter::once("seasoners-admin").chain(args.iter().copied()))
    }

    #[test]
    fn test_cli_definition_is_valid() {
        Cli::command().debug_assert();
    }

    #[test]
    fn test_parse_create_user() {
        let cli = parse(&["create-user", "ci@example.com"]).unwrap();
        assert!(matches!(cli.command, Command::CreateUser { email } if email == "ci@example.com"));
    }

    #[test]
    fn test_create_user_requires_email() {
        let err = parse(&["create-user"]).unwrap_err();
        assert_eq!(err.kind(), clap::error::ErrorKind::MissingRequiredArgument);
    }

    #[test]
    fn test_parse_set_password() {
        let cli = parse(&["set-password", "a@example.com", "--password", "TempPassword123!"]).unwrap();
        assert!(matches!(
            cli.command,
            Command::SetPassword { email, password }
                if email == "a@example.com" && password == "TempPassword123!"
        ));
    }

    #[test]
    fn test_query_agreements_requires_uuid() {
        assert!(parse(&["query-agreements", "not-a-uuid"]).is_err());
        let id = Uuid::new_v4().to_string();
        let cli = parse(&["query-agreements", id.as_str()]).unwrap();
        assert!(matches!(cli.command, Command::QueryAgreements { listing_id } if listing_id.to_string() == id));
    }

    #[test]
    fn test_list_users_default_limit() {
        let cli = parse(&["list-users"]).unwrap();
        assert!(matches!(cli.command, Command::ListUsers { limit: 10 }));
    }

    #[test]
    fn test_list_users_rejects_negative_limit() {
        assert!(parse(&["list-users", "--limit", "-1"]).is_err());
        let cli = parse(&["list-users", "--limit", "0"]).unwrap();
        assert!(matches!(cli.command, Command::ListUsers { limit: 0 }));
    }

    #[test]
    fn test_parse_unit_commands() {
        for name in [
            "create-test-user",
            "delete-test-users",
            "delete-test-listings",
            "delete-all-listings",
            "smoke-user",
            "purge-expired-tokens",
        ] {
            assert!(parse(&[name]).is_ok(), "{name} should parse");
        }
    }
}
