use std::sync::Arc;
use std::time::Duration;

use axum::extract::FromRef;
use sqlx::PgPool;

use crate::config::Config;
use crate::repositories::{
    PgVerificationStore, SessionRepository, UserRepository, VerificationTokenRepository,
};
use crate::services::{EmailRateLimiter, EmailService};

/// アプリケーション共有状態
///
/// axum の State として全ハンドラーで共有される。
/// Clone は必須（axum が内部で clone するため）。
#[derive(Clone)]
pub struct AppState {
    /// アプリケーション設定（Arc で共有）
    pub config: Arc<Config>,
    pub user_repo: UserRepository,
    /// 検証トークンリポジトリ（発行・掃除用）
    pub token_repo: VerificationTokenRepository,
    pub session_repo: SessionRepository,
    /// 検証フローのトランザクション境界
    pub verification_store: PgVerificationStore,
    /// メールサービス
    pub email_service: EmailService,
    /// 検証メール送信のレートリミッター
    pub email_rate_limiter: EmailRateLimiter,
}

impl AppState {
    /// 新しい AppState を作成
    pub fn new(db_pool: PgPool, config: Config) -> Self {
        let config = Arc::new(config);
        let user_repo = UserRepository::new(db_pool.clone());
        let token_repo = VerificationTokenRepository::new(db_pool.clone());
        let session_repo = SessionRepository::new(db_pool.clone());
        let verification_store = PgVerificationStore::new(db_pool);
        let email_service = EmailService::new(config.clone());
        let email_rate_limiter = EmailRateLimiter::new(
            config.email_rate_limit,
            Duration::from_secs(config.email_rate_window_secs),
        );

        if config.resend_api_key.is_some() {
            tracing::info!("Resend メール送信を有効化");
        } else {
            tracing::info!("Resend 未設定（検証メール送信はスキップ）");
        }

        Self {
            config,
            user_repo,
            token_repo,
            session_repo,
            verification_store,
            email_service,
            email_rate_limiter,
        }
    }
}

/// 検証ハンドラーはストアのみを State として受け取る
impl FromRef<AppState> for PgVerificationStore {
    fn from_ref(state: &AppState) -> Self {
        state.verification_store.clone()
    }
}
