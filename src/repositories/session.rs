use sqlx::PgPool;
use time::OffsetDateTime;

use crate::models::SessionWithUser;

#[derive(Clone)]
pub struct SessionRepository {
    pool: PgPool,
}

impl SessionRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    /// セッショントークンから有効なセッションを検索
    ///
    /// 期限切れのセッションは None として扱う。
    pub async fn find_active(
        &self,
        session_token: &str,
        now: OffsetDateTime,
    ) -> Result<Option<SessionWithUser>, sqlx::Error> {
        sqlx::query_as::<_, SessionWithUser>(
            r#"
            SELECT u.email, s.expires
            FROM sessions s
            LEFT JOIN users u ON u.id = s.user_id
            WHERE s.session_token = $1 AND s.expires > $2
            "#,
        )
        .bind(session_token)
        .bind(now)
        .fetch_optional(&self.pool)
        .await
    }
}
