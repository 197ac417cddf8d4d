//! メール検証フローのトランザクション境界
//!
//! 「トークン検索 → 期限確認 → ユーザー更新 → トークン削除」を
//! 1つの作業単位（unit of work）として扱う。`commit` せずに破棄した場合は
//! 全ての変更が取り消される。

use async_trait::async_trait;
use sqlx::{PgPool, Postgres, Transaction};
use time::OffsetDateTime;

use crate::models::VerificationToken;

/// 検証フロー用の作業単位を開始するストア
#[async_trait]
pub trait VerificationStore: Send + Sync {
    type UnitOfWork: VerificationUnitOfWork;

    async fn begin(&self) -> Result<Self::UnitOfWork, sqlx::Error>;
}

/// 検証フローの作業単位
///
/// トークンは読み取り時点でロックされ、同じトークンを同時に消費しようとする
/// 別の作業単位はこちらの完了を待つ。
#[async_trait]
pub trait VerificationUnitOfWork: Send {
    /// トークンを検索し、作業単位が終わるまで他の消費から保護する
    async fn find_token(&mut self, token: &str)
    -> Result<Option<VerificationToken>, sqlx::Error>;

    /// `email` のユーザーを検証済みにする
    ///
    /// # Returns
    /// 該当ユーザーが存在した場合 true
    async fn mark_email_verified(
        &mut self,
        email: &str,
        verified_at: OffsetDateTime,
    ) -> Result<bool, sqlx::Error>;

    async fn delete_token(&mut self, token: &str) -> Result<(), sqlx::Error>;

    async fn commit(self) -> Result<(), sqlx::Error>;
}

/// PostgreSQL 実装
#[derive(Clone)]
pub struct PgVerificationStore {
    pool: PgPool,
}

impl PgVerificationStore {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

pub struct PgUnitOfWork {
    tx: Transaction<'static, Postgres>,
}

#[async_trait]
impl VerificationStore for PgVerificationStore {
    type UnitOfWork = PgUnitOfWork;

    async fn begin(&self) -> Result<PgUnitOfWork, sqlx::Error> {
        let tx = self.pool.begin().await?;
        Ok(PgUnitOfWork { tx })
    }
}

#[async_trait]
impl VerificationUnitOfWork for PgUnitOfWork {
    async fn find_token(
        &mut self,
        token: &str,
    ) -> Result<Option<VerificationToken>, sqlx::Error> {
        // FOR UPDATE: 同一トークンの並行消費を直列化する
        sqlx::query_as::<_, VerificationToken>(
            r#"
            SELECT identifier, token, expires
            FROM verification_tokens
            WHERE token = $1
            FOR UPDATE
            "#,
        )
        .bind(token)
        .fetch_optional(&mut *self.tx)
        .await
    }

    async fn mark_email_verified(
        &mut self,
        email: &str,
        verified_at: OffsetDateTime,
    ) -> Result<bool, sqlx::Error> {
        let result = sqlx::query(
            r#"
            UPDATE users
            SET email_verified = $2, updated_at = NOW()
            WHERE email = $1
            "#,
        )
        .bind(email)
        .bind(verified_at)
        .execute(&mut *self.tx)
        .await?;

        Ok(result.rows_affected() > 0)
    }

    async fn delete_token(&mut self, token: &str) -> Result<(), sqlx::Error> {
        sqlx::query("DELETE FROM verification_tokens WHERE token = $1")
            .bind(token)
            .execute(&mut *self.tx)
            .await?;

        Ok(())
    }

    async fn commit(self) -> Result<(), sqlx::Error> {
        self.tx.commit().await
    }
}
