use tracing_subscriber::{EnvFilter, layer::SubscriberExt, util::SubscriberInitExt};

use seasoners::{config::Config, server};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // JSON 形式、RUST_LOG で上書き可
    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info,seasoners=debug"));
    tracing_subscriber::registry()
        .with(filter)
        .with(tracing_subscriber::fmt::layer().json())
        .init();

    let config = Config::load().inspect_err(|e| {
        tracing::error!(error = ?e, "設定の読み込みに失敗");
    })?;

    tracing::info!(
        version = env!("CARGO_PKG_VERSION"),
        host = %config.host,
        port = config.port,
        "seasoners 起動"
    );

    server::run(config).await.inspect_err(|e| {
        tracing::error!(error = ?e, "サーバー異常終了");
    })
}
