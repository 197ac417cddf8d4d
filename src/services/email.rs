use std::sync::Arc;

use secrecy::ExposeSecret;
use serde::{Deserialize, Serialize};

use crate::config::Config;
use crate::error::AppError;

/// Resend 送信リクエスト
#[derive(Debug, Serialize)]
pub struct ResendEmailRequest {
    pub from: String,
    pub to: Vec<String>,
    pub reply_to: String,
    pub subject: String,
    pub html: String,
    pub text: String,
    pub tags: Vec<ResendTag>,
}

#[derive(Debug, Serialize)]
pub struct ResendTag {
    pub name: &'static str,
    pub value: &'static str,
}

/// Resend 送信レスポンス
#[derive(Debug, Deserialize)]
pub struct ResendEmailResponse {
    pub id: String,
}

/// メール送信結果
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum EmailDelivery {
    /// プロバイダーが受け付けた（Resend のメッセージID）
    Sent { id: String },
    /// プロバイダー未設定のため送信しなかった
    Skipped,
}

/// メール送信サービス（Resend HTTP API）
///
/// RESEND_API_KEY 未設定時は送信せず警告ログのみ出力する。
#[derive(Clone)]
pub struct EmailService {
    client: reqwest::Client,
    config: Arc<Config>,
}

impl EmailService {
    /// 新しい EmailService を作成
    pub fn new(config: Arc<Config>) -> Self {
        Self {
            client: reqwest::Client::new(),
            config,
        }
    }

    /// 検証メールを送信
    ///
    /// # Security
    /// 検証URL（トークンを含む）はログに出力しない
    pub async fn send_verification_email(
        &self,
        to: &str,
        verification_url: &str,
    ) -> Result<EmailDelivery, AppError> {
        let Some(api_key) = &self.config.resend_api_key else {
            tracing::warn!(to = %to, "RESEND_API_KEY 未設定のため検証メール送信をスキップ");
            return Ok(EmailDelivery::Skipped);
        };

        let body = verification_email(
            &self.config.email_from,
            &self.config.email_reply_to,
            to,
            verification_url,
            self.config.verification_token_ttl_secs / 60,
        );

        let url = format!(
            "{}/emails",
            self.config.resend_api_url.trim_end_matches('/')
        );

        let response: reqwest::Response = self
            .client
            .post(&url)
            .bearer_auth(api_key.expose_secret())
            .json(&body)
            .send()
            .await?;

        if !response.status().is_success() {
            let status = response.status();
            let detail = response.text().await.unwrap_or_default();
            tracing::error!(status = %status, "Resend 送信失敗");
            return Err(AppError::EmailProvider(format!("{status}: {detail}")));
        }

        let sent: ResendEmailResponse = response.json().await.map_err(|e| {
            tracing::error!(error = ?e, "Resend レスポンスのパースエラー");
            AppError::EmailProvider("Failed to parse Resend response".to_string())
        })?;

        tracing::info!(to = %to, message_id = %sent.id, "検証メール送信完了");

        Ok(EmailDelivery::Sent { id: sent.id })
    }
}

/// 検証メール本文を組み立てる
pub fn verification_email(
    from: &str,
    reply_to: &str,
    to: &str,
    verification_url: &str,
    expires_in_minutes: i64,
) -> ResendEmailRequest {
    let html = format!(
        r#"<div style="font-family: -apple-system, BlinkMacSystemFont, 'Segoe UI', Arial, sans-serif; max-width: 520px; margin: 0 auto; padding: 24px; color: #334155;">
  <h1 style="color: #0ea5e9; font-size: 22px; margin: 0 0 12px;">Verify your email</h1>
  <p style="font-size: 14px; line-height: 1.6; margin: 0 0 16px;">Click the button below to confirm your email and activate your account.</p>
  <p style="text-align: center; margin: 16px 0;">
    <a href="{verification_url}" style="display: inline-block; background: #0ea5e9; color: #ffffff; padding: 12px 24px; text-decoration: none; border-radius: 6px; font-weight: 600; font-size: 14px;">Verify Email</a>
  </p>
  <p style="font-size: 12px; color: #64748b; margin: 16px 0 0;">This link expires in {expires_in_minutes} minutes.</p>
  <p style="font-size: 12px; color: #94a3b8; margin: 8px 0 0;">If you didn't sign up, you can ignore this email.</p>
</div>"#
    );

    let text = format!(
        "Verify your email\n\nUse this link to activate your account (expires in {expires_in_minutes} minutes):\n{verification_url}\n\nIf you didn't sign up, ignore this email."
    );

    ResendEmailRequest {
        from: from.to_string(),
        to: vec![to.to_string()],
        reply_to: reply_to.to_string(),
        subject: "Verify your email to activate Seasoners".to_string(),
        html,
        text,
        tags: vec![
            ResendTag {
                name: "type",
                value: "transactional",
            },
            ResendTag {
                name: "feature",
                value: "email_verification",
            },
        ],
    }
}
