use std::sync::Arc;

use time::{Duration, OffsetDateTime};

use crate::config::Config;
use crate::error::AppError;
use crate::repositories::{UserRepository, VerificationTokenRepository};
use crate::services::email::{EmailDelivery, EmailService};

/// 検証トークンのバイト長（hex エンコード後は 64 文字）
const TOKEN_BYTES: usize = 32;

/// 再送リクエストの結果
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ResendResult {
    /// ユーザー不在（存在有無は呼び出し元に漏らさない）
    UnknownUser,
    AlreadyVerified,
    Issued(EmailDelivery),
}

/// 検証トークン発行サービス
#[derive(Clone)]
pub struct VerificationIssuer {
    user_repo: UserRepository,
    token_repo: VerificationTokenRepository,
    email_service: EmailService,
    config: Arc<Config>,
}

impl VerificationIssuer {
    pub fn new(
        user_repo: UserRepository,
        token_repo: VerificationTokenRepository,
        email_service: EmailService,
        config: Arc<Config>,
    ) -> Self {
        Self {
            user_repo,
            token_repo,
            email_service,
            config,
        }
    }

    /// トークンを発行して検証メールを送信
    ///
    /// # Security
    /// トークン（平文）はログに出力しない
    pub async fn issue(&self, email: &str) -> Result<EmailDelivery, AppError> {
        let token = generate_token();
        let expires =
            OffsetDateTime::now_utc() + Duration::seconds(self.config.verification_token_ttl_secs);

        self.token_repo.create(email, &token, expires).await?;

        tracing::info!(email = %email, "検証トークン発行");

        let verification_url = build_verification_url(self.config.app_base_url(), &token);

        self.email_service
            .send_verification_email(email, &verification_url)
            .await
    }

    /// 未検証ユーザーに検証メールを再送
    pub async fn resend(&self, email: &str) -> Result<ResendResult, AppError> {
        let email = email.trim().to_lowercase();

        let Some(user) = self.user_repo.find_by_email(&email).await? else {
            tracing::info!(email = %email, "検証メール再送: ユーザー不在（成功レスポンス返却）");
            return Ok(ResendResult::UnknownUser);
        };

        if user.is_email_verified() {
            return Ok(ResendResult::AlreadyVerified);
        }

        let delivery = self.issue(&user.email).await?;
        Ok(ResendResult::Issued(delivery))
    }
}

/// 32バイトのランダムトークンを生成（小文字 hex）
pub fn generate_token() -> String {
    let mut bytes = [0u8; TOKEN_BYTES];
    rand::RngCore::fill_bytes(&mut rand::thread_rng(), &mut bytes);
    hex::encode(bytes)
}

/// 検証URLを構築
pub fn build_verification_url(base_url: &str, token: &str) -> String {
    format!(
        "{}/auth/verify/email?token={}",
        base_url.trim_end_matches('/'),
        urlencoding::encode(token)
    )
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_generate_token_is_64_hex_chars() {
        let token = generate_token();
        assert_eq!(token.len(), 64);
        assert!(token.chars().all(|c| c.is_ascii_hexdigit() && !c.is_ascii_uppercase()));
    }

    #[test]
    fn test_generate_token_is_unique() {
        assert_ne!(generate_token(), generate_token());
    }

    #[test]
    fn test_build_verification_url() {
        assert_eq!(
            build_verification_url("https://seasoners.eu/", "abc123"),
            "https://seasoners.eu/auth/verify/email?token=abc123"
        );
    }

    #[test]
    fn test_build_verification_url_encodes_token() {
        assert_eq!(
            build_verification_url("http://localhost:3000", "a b&c"),
            "http://localhost:3000/auth/verify/email?token=a%20b%26c"
        );
    }
}
