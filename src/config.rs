use secrecy::SecretBox;
use serde::Deserialize;

/// サーバー設定（環境変数から読み込み）
#[derive(Debug, Deserialize)]
pub struct Config {
    pub database_url: SecretBox<String>,
    #[serde(default = "default_host")]
    pub host: String,
    #[serde(default = "default_port")]
    pub port: u16,
    #[serde(default = "default_database_max_connections")]
    pub database_max_connections: u32,

    // 公開URL（検証リンクの組み立てに使用）
    #[serde(default)]
    pub app_base_url: Option<String>,

    // 外部認証プロバイダー設定（debug-session で有無のみ報告）
    #[serde(default)]
    pub auth_url: Option<String>,
    pub auth_secret: Option<SecretBox<String>>,

    // メール検証設定
    #[serde(default = "default_verification_token_ttl_secs")]
    pub verification_token_ttl_secs: i64,
    #[serde(default = "default_email_rate_limit")]
    pub email_rate_limit: usize,
    #[serde(default = "default_email_rate_window_secs")]
    pub email_rate_window_secs: u64,

    // Resend 設定（未設定時はメール送信をスキップ）
    pub resend_api_key: Option<SecretBox<String>>,
    #[serde(default = "default_resend_api_url")]
    pub resend_api_url: String,
    #[serde(default = "default_email_from")]
    pub email_from: String,
    #[serde(default = "default_email_reply_to")]
    pub email_reply_to: String,
}

/// 運用CLI用の設定
///
/// CLI はデータベース接続のみ必要とする。
#[derive(Debug, Deserialize)]
pub struct AdminConfig {
    pub database_url: SecretBox<String>,
}

const DEFAULT_HOST: &str = "0.0.0.0";
const DEFAULT_PORT: u16 = 3000;
const DEFAULT_DATABASE_MAX_CONNECTIONS: u32 = 5;
const DEFAULT_APP_BASE_URL: &str = "http://localhost:3000";
const DEFAULT_VERIFICATION_TOKEN_TTL_SECS: i64 = 30 * 60;
const DEFAULT_EMAIL_RATE_LIMIT: usize = 5;
const DEFAULT_EMAIL_RATE_WINDOW_SECS: u64 = 60;
const DEFAULT_RESEND_API_URL: &str = "https://api.resend.com";
const DEFAULT_EMAIL_FROM: &str = "Seasoners <noreply@seasoners.eu>";
const DEFAULT_EMAIL_REPLY_TO: &str = "support@seasoners.eu";

fn default_host() -> String {
    DEFAULT_HOST.to_string()
}

fn default_port() -> u16 {
    DEFAULT_PORT
}

fn default_database_max_connections() -> u32 {
    DEFAULT_DATABASE_MAX_CONNECTIONS
}

fn default_verification_token_ttl_secs() -> i64 {
    DEFAULT_VERIFICATION_TOKEN_TTL_SECS
}

fn default_email_rate_limit() -> usize {
    DEFAULT_EMAIL_RATE_LIMIT
}

fn default_email_rate_window_secs() -> u64 {
    DEFAULT_EMAIL_RATE_WINDOW_SECS
}

fn default_resend_api_url() -> String {
    DEFAULT_RESEND_API_URL.to_string()
}

fn default_email_from() -> String {
    DEFAULT_EMAIL_FROM.to_string()
}

fn default_email_reply_to() -> String {
    DEFAULT_EMAIL_REPLY_TO.to_string()
}

impl Config {
    pub fn load() -> Result<Self, envy::Error> {
        envy::from_env()
    }

    /// 検証リンクのベースURL
    ///
    /// APP_BASE_URL → AUTH_URL → localhost の順で解決する。
    /// 末尾のスラッシュは取り除く。
    pub fn app_base_url(&self) -> &str {
        self.app_base_url
            .as_deref()
            .or(self.auth_url.as_deref())
            .unwrap_or(DEFAULT_APP_BASE_URL)
            .trim_end_matches('/')
    }
}

impl AdminConfig {
    pub fn load() -> Result<Self, envy::Error> {
        envy::from_env()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn load_from(vars: &[(&str, &str)]) -> Config {
        envy::from_iter(
            vars.iter()
                .map(|(k, v)| (k.to_string(), v.to_string())),
        )
        .unwrap()
    }

    #[test]
    fn test_defaults_applied() {
        let config = load_from(&[("DATABASE_URL", "postgres://localhost/seasoners")]);
        assert_eq!(config.host, "0.0.0.0");
        assert_eq!(config.port, 3000);
        assert_eq!(config.verification_token_ttl_secs, 1800);
        assert_eq!(config.email_rate_limit, 5);
        assert_eq!(config.email_rate_window_secs, 60);
        assert!(config.resend_api_key.is_none());
        assert!(config.auth_secret.is_none());
        assert_eq!(config.email_from, "Seasoners <noreply@seasoners.eu>");
    }

    #[test]
    fn test_missing_database_url_is_error() {
        let result: Result<Config, _> = envy::from_iter(Vec::<(String, String)>::new());
        assert!(result.is_err());
    }

    #[test]
    fn test_app_base_url_falls_back_to_auth_url() {
        let config = load_from(&[
            ("DATABASE_URL", "postgres://localhost/seasoners"),
            ("AUTH_URL", "https://seasoners.eu/"),
        ]);
        assert_eq!(config.app_base_url(), "https://seasoners.eu");
    }

    #[test]
    fn test_app_base_url_prefers_explicit_value() {
        let config = load_from(&[
            ("DATABASE_URL", "postgres://localhost/seasoners"),
            ("AUTH_URL", "https://auth.seasoners.eu"),
            ("APP_BASE_URL", "https://www.seasoners.eu"),
        ]);
        assert_eq!(config.app_base_url(), "https://www.seasoners.eu");
    }

    #[test]
    fn test_app_base_url_default() {
        let config = load_from(&[("DATABASE_URL", "postgres://localhost/seasoners")]);
        assert_eq!(config.app_base_url(), "http://localhost:3000");
    }
}
