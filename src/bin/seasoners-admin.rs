use std::process::ExitCode;

use clap::Parser;
use secrecy::ExposeSecret;
use sqlx::postgres::PgPoolOptions;

use seasoners::admin::{self, Cli};
use seasoners::config::AdminConfig;

#[tokio::main]
async fn main() -> ExitCode {
    // 結果は stdout、ログは stderr
    tracing_subscriber::fmt()
        .with_writer(std::io::stderr)
        .with_target(false)
        .with_env_filter("seasoners=info,sqlx=warn")
        .init();

    let cli = Cli::parse();

    let config = match AdminConfig::load() {
        Ok(config) => config,
        Err(e) => {
            eprintln!("Failed to load config: {e}");
            return ExitCode::FAILURE;
        }
    };

    let pool = match PgPoolOptions::new()
        .max_connections(1)
        .connect(config.database_url.expose_secret())
        .await
    {
        Ok(pool) => pool,
        Err(e) => {
            eprintln!("Failed to connect to database: {e}");
            return ExitCode::FAILURE;
        }
    };

    let result = admin::run(cli.command, &pool).await;

    // 成功・失敗どちらでも接続を解放
    pool.close().await;

    match result {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            tracing::error!(error = ?e, "コマンド失敗");
            eprintln!("Error: {e:#}");
            ExitCode::FAILURE
        }
    }
}
