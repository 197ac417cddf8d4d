use sqlx::FromRow;
use time::OffsetDateTime;
use uuid::Uuid;

#[derive(Debug, Clone, FromRow)]
pub struct Agreement {
    pub id: Uuid,
    pub listing_id: Uuid,
    pub status: String,
    pub created_at: OffsetDateTime,
}
