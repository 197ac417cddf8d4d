use sqlx::FromRow;
use time::OffsetDateTime;
use uuid::Uuid;

#[derive(Debug, Clone, FromRow)]
pub struct User {
    pub id: Uuid,
    pub email: String,
    pub name: Option<String>,
    pub role: String,
    pub password_hash: Option<String>,
    pub phone_number: Option<String>,
    /// NULL は未検証を表す
    pub email_verified: Option<OffsetDateTime>,
    pub created_at: OffsetDateTime,
    pub updated_at: OffsetDateTime,
}

impl User {
    pub fn is_email_verified(&self) -> bool {
        self.email_verified.is_some()
    }
}
