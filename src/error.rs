use axum::{
    Json,
    http::StatusCode,
    response::{IntoResponse, Response},
};
use serde::Serialize;

/// API 層のエラー
///
/// 検証フローの「トークンなし」「無効/期限切れ」「ユーザー不在」は
/// エラーではなくリダイレクト結果として扱う（`VerificationOutcome` を参照）。
#[derive(Debug, thiserror::Error)]
pub enum AppError {
    #[error("バリデーションエラー: {0}")]
    Validation(String),

    #[error("リクエスト回数の上限に達しました")]
    RateLimited,

    #[error("データベースエラー")]
    Database(#[from] sqlx::Error),

    #[error("メール送信 API との通信エラー")]
    Email(#[from] reqwest::Error),

    #[error("メールプロバイダーエラー: {0}")]
    EmailProvider(String),

    #[error("内部エラー")]
    Internal(#[from] anyhow::Error),
}

#[derive(Serialize)]
struct ErrorResponse {
    error: String,
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let (status, message) = match &self {
            Self::Validation(msg) => (StatusCode::BAD_REQUEST, msg.clone()),
            Self::RateLimited => (
                StatusCode::TOO_MANY_REQUESTS,
                "Too many requests. Please try again later.".to_string(),
            ),
            Self::Database(e) => {
                tracing::error!(error = ?e, "データベースエラー");
                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    "Internal server error".to_string(),
                )
            }
            Self::Email(e) => {
                tracing::error!(error = ?e, "メール送信 API 通信エラー");
                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    "Failed to send verification email".to_string(),
                )
            }
            Self::EmailProvider(detail) => {
                tracing::error!(detail = %detail, "メールプロバイダーがエラーを返却");
                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    "Failed to send verification email".to_string(),
                )
            }
            Self::Internal(e) => {
                tracing::error!(error = ?e, "内部エラー");
                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    "Internal server error".to_string(),
                )
            }
        };

        (status, Json(ErrorResponse { error: message })).into_response()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_validation_maps_to_bad_request() {
        let response = AppError::Validation("Email is required".to_string()).into_response();
        assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    }

    #[test]
    fn test_rate_limited_maps_to_too_many_requests() {
        let response = AppError::RateLimited.into_response();
        assert_eq!(response.status(), StatusCode::TOO_MANY_REQUESTS);
    }

    #[test]
    fn test_database_error_maps_to_internal_server_error() {
        let response = AppError::Database(sqlx::Error::PoolTimedOut).into_response();
        assert_eq!(response.status(), StatusCode::INTERNAL_SERVER_ERROR);
    }
}
