use axum::{
    extract::{Query, State},
    response::Redirect,
};
use serde::Deserialize;
use time::OffsetDateTime;

use crate::error::AppError;
use crate::repositories::VerificationStore;
use crate::services::{EmailVerificationService, VerificationOutcome};

/// 検証リンクのクエリパラメータ
#[derive(Debug, Deserialize)]
pub struct VerifyEmailQuery {
    pub token: Option<String>,
}

/// メール検証ハンドラー
///
/// GET /auth/verify/email?token=...
///
/// ストアは `FromRef` で `AppState` から取り出す（本番は `PgVerificationStore`）。
///
/// 結果はリダイレクト先のクエリパラメータでのみ伝える:
/// - `/auth/verify?error=missing_token`
/// - `/auth/verify?error=invalid_or_expired`
/// - `/auth/verify?error=user_not_found`
/// - `/auth/verify?success=email_verified`
pub async fn verify_email<S>(
    State(store): State<S>,
    Query(query): Query<VerifyEmailQuery>,
) -> Result<Redirect, AppError>
where
    S: VerificationStore + Clone + Send + Sync + 'static,
{
    let service = EmailVerificationService::new(store);
    let outcome = service
        .verify(query.token.as_deref(), OffsetDateTime::now_utc())
        .await?;

    Ok(outcome_redirect(outcome))
}

fn outcome_redirect(outcome: VerificationOutcome) -> Redirect {
    Redirect::to(outcome.redirect_path())
}

#[cfg(test)]
mod tests {
    use axum::http::{StatusCode, header};
    use axum::response::{IntoResponse, Response};
    use time::Duration;

    use super::*;
    use crate::repositories::memory::MemoryStore;

    const EMAIL: &str = "guest@example.com";

    async fn call(store: &MemoryStore, token: Option<&str>) -> Response {
        verify_email(
            State(store.clone()),
            Query(VerifyEmailQuery {
                token: token.map(str::to_string),
            }),
        )
        .await
        .unwrap()
        .into_response()
    }

    #[test]
    fn test_outcome_redirect_sets_location() {
        let response = outcome_redirect(VerificationOutcome::Verified).into_response();
        assert_eq!(response.status(), StatusCode::SEE_OTHER);
        assert_eq!(
            response.headers()[header::LOCATION],
            "/auth/verify?success=email_verified"
        );
    }

    #[tokio::test]
    async fn test_verify_email_without_token_redirects_missing() {
        let store = MemoryStore::default().with_user(EMAIL).await;

        let response = call(&store, None).await;

        assert_eq!(response.status(), StatusCode::SEE_OTHER);
        assert_eq!(
            response.headers()[header::LOCATION],
            "/auth/verify?error=missing_token"
        );
        assert_eq!(store.snapshot().await.writes, 0);
    }

    #[tokio::test]
    async fn test_verify_email_with_valid_token_redirects_success() {
        let store = MemoryStore::default()
            .with_user(EMAIL)
            .await
            .with_token("valid", EMAIL, OffsetDateTime::now_utc() + Duration::minutes(30))
            .await;

        let response = call(&store, Some("valid")).await;

        assert_eq!(
            response.headers()[header::LOCATION],
            "/auth/verify?success=email_verified"
        );
        let state = store.snapshot().await;
        assert!(state.users[EMAIL].is_some());
        assert!(state.tokens.is_empty());
    }

    #[tokio::test]
    async fn test_verify_email_with_expired_token_redirects_invalid() {
        let store = MemoryStore::default()
            .with_user(EMAIL)
            .await
            .with_token("old", EMAIL, OffsetDateTime::now_utc() - Duration::minutes(1))
            .await;

        let response = call(&store, Some("old")).await;

        assert_eq!(
            response.headers()[header::LOCATION],
            "/auth/verify?error=invalid_or_expired"
        );
        assert_eq!(store.snapshot().await.users[EMAIL], None);
    }

    #[tokio::test]
    async fn test_verify_email_for_deleted_user_redirects_not_found() {
        let store = MemoryStore::default()
            .with_token(
                "orphan",
                "deleted@example.com",
                OffsetDateTime::now_utc() + Duration::minutes(30),
            )
            .await;

        let response = call(&store, Some("orphan")).await;

        assert_eq!(
            response.headers()[header::LOCATION],
            "/auth/verify?error=user_not_found"
        );
        assert!(store.snapshot().await.tokens.contains_key("orphan"));
    }
}
