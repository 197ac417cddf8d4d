use time::OffsetDateTime;

use crate::error::AppError;
use crate::repositories::{VerificationStore, VerificationUnitOfWork};

/// 検証フローの終端結果
///
/// いずれもリダイレクトとして利用者に伝える。DB障害のみ `AppError` になる。
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum VerificationOutcome {
    /// token パラメータなし
    MissingToken,
    /// トークンが存在しない、または期限切れ
    InvalidOrExpired,
    /// トークンは有効だが発行先のユーザーが存在しない（トークンは残る）
    UserNotFound,
    /// 検証完了
    Verified,
}

impl VerificationOutcome {
    /// 結果ごとのリダイレクト先
    pub fn redirect_path(self) -> &'static str {
        match self {
            Self::MissingToken => "/auth/verify?error=missing_token",
            Self::InvalidOrExpired => "/auth/verify?error=invalid_or_expired",
            Self::UserNotFound => "/auth/verify?error=user_not_found",
            Self::Verified => "/auth/verify?success=email_verified",
        }
    }
}

/// メール検証サービス
///
/// トークンの消費とユーザーの有効化は同一の作業単位で行い、
/// どちらか一方だけが反映されることはない。
#[derive(Clone)]
pub struct EmailVerificationService<S> {
    store: S,
}

impl<S: VerificationStore> EmailVerificationService<S> {
    pub fn new(store: S) -> Self {
        Self { store }
    }

    /// トークンを検証してユーザーを検証済みにする
    ///
    /// 処理フロー:
    /// 1. トークン未指定 → MissingToken（DBアクセスなし）
    /// 2. トークン検索（行ロック）、不在または期限切れ → InvalidOrExpired
    /// 3. 発行先ユーザーを検証済みに更新、不在 → UserNotFound（ロールバック）
    /// 4. トークン削除
    /// 5. コミット → Verified
    ///
    /// # Security
    /// トークン値はログに出力しない
    pub async fn verify(
        &self,
        token: Option<&str>,
        now: OffsetDateTime,
    ) -> Result<VerificationOutcome, AppError> {
        // 1. トークン未指定
        let Some(token) = token.filter(|t| !t.is_empty()) else {
            tracing::info!("メール検証: トークン未指定");
            return Ok(VerificationOutcome::MissingToken);
        };

        let mut uow = self.store.begin().await?;

        // 2. トークン検索・期限確認
        let verification = match uow.find_token(token).await? {
            Some(v) if !v.is_expired_at(now) => v,
            Some(_) => {
                tracing::info!("メール検証: 期限切れトークン");
                return Ok(VerificationOutcome::InvalidOrExpired);
            }
            None => {
                tracing::info!("メール検証: トークン不在");
                return Ok(VerificationOutcome::InvalidOrExpired);
            }
        };

        // 3. ユーザー更新
        if !uow
            .mark_email_verified(&verification.identifier, now)
            .await?
        {
            tracing::warn!(
                email = %verification.identifier,
                "メール検証: 発行先ユーザーが存在しない"
            );
            return Ok(VerificationOutcome::UserNotFound);
        }

        // 4. トークン削除
        uow.delete_token(token).await?;

        // 5. コミット
        uow.commit().await?;

        tracing::info!(email = %verification.identifier, "メール検証完了");

        Ok(VerificationOutcome::Verified)
    }
}
