//! HTTP サーバーの組み立てと起動

use std::net::SocketAddr;

use anyhow::Context;
use axum::{
    Router,
    routing::{get, post},
};
use secrecy::ExposeSecret;
use sqlx::{PgPool, postgres::PgPoolOptions};
use tokio::net::TcpListener;
use tower_http::trace::TraceLayer;

use crate::config::Config;
use crate::handlers;
use crate::repositories::PgVerificationStore;
use crate::state::AppState;

/// 設定から待ち受けアドレスを組み立てる
pub fn listen_addr(config: &Config) -> anyhow::Result<SocketAddr> {
    format!("{}:{}", config.host, config.port)
        .parse()
        .with_context(|| format!("invalid listen address {}:{}", config.host, config.port))
}

/// 全ルートを登録した Router
pub fn router(state: AppState) -> Router {
    let verification = Router::new()
        .route(
            "/auth/verify/email",
            get(handlers::verify_email::<PgVerificationStore>),
        )
        .route(
            "/api/auth/verify-email",
            post(handlers::request_verification_email),
        )
        .route(
            "/api/auth/resend-verification",
            post(handlers::resend_verification),
        );

    let diagnostics = Router::new()
        .route("/api/debug-session", get(handlers::debug_session))
        .route("/api/debug-cookies", get(handlers::debug_cookies));

    Router::new()
        .route("/api/health", get(handlers::health_check))
        .route("/api/launch-status", get(handlers::launch_status))
        .merge(verification)
        .merge(diagnostics)
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}

async fn connect(config: &Config) -> anyhow::Result<PgPool> {
    let pool = PgPoolOptions::new()
        .max_connections(config.database_max_connections)
        .connect(config.database_url.expose_secret())
        .await
        .context("failed to connect to database")?;

    tracing::info!(
        max_connections = config.database_max_connections,
        "データベース接続完了"
    );
    Ok(pool)
}

/// DB に接続してサーバーを起動し、終了シグナルまで待つ
pub async fn run(config: Config) -> anyhow::Result<()> {
    let addr = listen_addr(&config)?;
    let pool = connect(&config).await?;
    let app = router(AppState::new(pool, config));

    let listener = TcpListener::bind(addr)
        .await
        .with_context(|| format!("failed to bind {addr}"))?;

    tracing::info!(addr = %addr, "待ち受け開始");

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await
        .context("server error")?;

    tracing::info!("サーバー停止");
    Ok(())
}

/// Ctrl+C または SIGTERM を待つ
async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(e) = tokio::signal::ctrl_c().await {
            tracing::error!(error = ?e, "Ctrl+C の待機に失敗");
        }
    };

    #[cfg(unix)]
    let terminate = async {
        use tokio::signal::unix::{SignalKind, signal};

        match signal(SignalKind::terminate()) {
            Ok(mut sigterm) => {
                sigterm.recv().await;
            }
            Err(e) => tracing::error!(error = ?e, "SIGTERM の待機に失敗"),
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    let signal = tokio::select! {
        _ = ctrl_c => "SIGINT",
        _ = terminate => "SIGTERM",
    };
    tracing::info!(signal, "シャットダウン開始");
}
