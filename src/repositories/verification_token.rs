use sqlx::PgPool;
use time::OffsetDateTime;

use crate::models::VerificationToken;

/// 検証トークンの発行・掃除用リポジトリ
///
/// 消費（検証フロー）は `VerificationStore` 経由でトランザクション内で行う。
#[derive(Clone)]
pub struct VerificationTokenRepository {
    pool: PgPool,
}

impl VerificationTokenRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    /// 新しい検証トークンを保存
    pub async fn create(
        &self,
        identifier: &str,
        token: &str,
        expires: OffsetDateTime,
    ) -> Result<VerificationToken, sqlx::Error> {
        sqlx::query_as::<_, VerificationToken>(
            r#"
            INSERT INTO verification_tokens (identifier, token, expires)
            VALUES ($1, $2, $3)
            RETURNING identifier, token, expires
            "#,
        )
        .bind(identifier)
        .bind(token)
        .bind(expires)
        .fetch_one(&self.pool)
        .await
    }

    /// 期限切れトークンを削除
    ///
    /// # Returns
    /// 削除された行数
    pub async fn delete_expired(&self, now: OffsetDateTime) -> Result<u64, sqlx::Error> {
        let result = sqlx::query(
            r#"
            DELETE FROM verification_tokens
            WHERE expires < $1
            "#,
        )
        .bind(now)
        .execute(&self.pool)
        .await?;

        Ok(result.rows_affected())
    }
}
