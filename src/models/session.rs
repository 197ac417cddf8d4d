use sqlx::FromRow;
use time::OffsetDateTime;

/// 認証プロバイダーのセッション（ユーザーのメールアドレスを結合済み）
#[derive(Debug, Clone, FromRow)]
pub struct SessionWithUser {
    pub email: Option<String>,
    pub expires: OffsetDateTime,
}
