use std::time::Instant;

use axum::{Json, extract::State, http::HeaderMap};
use serde::{Deserialize, Serialize};

use crate::error::AppError;
use crate::services::{EmailDelivery, ResendResult, VerificationIssuer};
use crate::state::AppState;

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct VerifyEmailRequest {
    #[serde(default)]
    pub email: Option<String>,
    #[serde(default)]
    pub user_id: Option<String>,
}

#[derive(Debug, Deserialize)]
pub struct ResendVerificationRequest {
    #[serde(default)]
    pub email: Option<String>,
}

#[derive(Debug, Serialize)]
pub struct MessageResponse {
    pub message: String,
}

/// POST /api/auth/verify-email
///
/// 検証トークンを発行してメールを送信する。
/// 送信元IPとメールアドレスの組ごとにレート制限をかける。
///
/// # Security
/// トークンはレスポンス・ログに含めない
pub async fn request_verification_email(
    State(state): State<AppState>,
    headers: HeaderMap,
    Json(request): Json<VerifyEmailRequest>,
) -> Result<Json<MessageResponse>, AppError> {
    let email = validate_email(request.email.as_deref())?;

    tracing::debug!(user_id = ?request.user_id, "検証メール送信リクエスト");

    enforce_rate_limit(&state, &headers, email)?;

    let delivery = issuer(&state).issue(email).await?;

    Ok(Json(MessageResponse {
        message: delivery_message(&delivery).to_string(),
    }))
}

/// POST /api/auth/resend-verification
///
/// # Security
/// ユーザー不在時も成功を返す（存在有無を漏洩しない）
pub async fn resend_verification(
    State(state): State<AppState>,
    headers: HeaderMap,
    Json(request): Json<ResendVerificationRequest>,
) -> Result<Json<MessageResponse>, AppError> {
    let email = request
        .email
        .as_deref()
        .map(str::trim)
        .filter(|e| !e.is_empty())
        .ok_or_else(|| AppError::Validation("Email is required".to_string()))?;

    enforce_rate_limit(&state, &headers, email)?;

    let message = match issuer(&state).resend(email).await? {
        ResendResult::UnknownUser => "If an account exists, a verification email has been sent.",
        ResendResult::AlreadyVerified => "Email is already verified.",
        ResendResult::Issued(delivery) => delivery_message(&delivery),
    };

    Ok(Json(MessageResponse {
        message: message.to_string(),
    }))
}

fn issuer(state: &AppState) -> VerificationIssuer {
    VerificationIssuer::new(
        state.user_repo.clone(),
        state.token_repo.clone(),
        state.email_service.clone(),
        state.config.clone(),
    )
}

fn enforce_rate_limit(state: &AppState, headers: &HeaderMap, email: &str) -> Result<(), AppError> {
    let key = format!("{}:{}", client_ip(headers), email.to_lowercase());
    if !state.email_rate_limiter.check(&key, Instant::now()) {
        tracing::warn!(email = %email, "検証メール送信のレート制限超過");
        return Err(AppError::RateLimited);
    }
    Ok(())
}

fn delivery_message(delivery: &EmailDelivery) -> &'static str {
    match delivery {
        EmailDelivery::Sent { .. } => "Verification email sent successfully",
        EmailDelivery::Skipped => {
            "Verification email skipped (no email provider configured)."
        }
    }
}

/// メールアドレスのバリデーション
fn validate_email(email: Option<&str>) -> Result<&str, AppError> {
    match email.map(str::trim) {
        Some(email) if !email.is_empty() && email.contains('@') => Ok(email),
        _ => Err(AppError::Validation(
            "A valid email address is required".to_string(),
        )),
    }
}

/// 送信元IP（x-forwarded-for の先頭、なければ "local"）
fn client_ip(headers: &HeaderMap) -> &str {
    headers
        .get("x-forwarded-for")
        .and_then(|v| v.to_str().ok())
        .and_then(|v| v.split(',').next())
        .map(str::trim)
        .filter(|ip| !ip.is_empty())
        .unwrap_or("local")
}
