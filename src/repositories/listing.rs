use sqlx::PgPool;
use uuid::Uuid;

use crate::models::Agreement;

#[derive(Clone)]
pub struct ListingRepository {
    pool: PgPool,
}

impl ListingRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    /// 全リスティングを削除
    pub async fn delete_all(&self) -> Result<u64, sqlx::Error> {
        let result = sqlx::query("DELETE FROM listings")
            .execute(&self.pool)
            .await?;

        Ok(result.rows_affected())
    }

    /// テスト・デモ用とみなせるリスティングを削除
    ///
    /// タイトルに "test" / "smoke"、所在地または説明に "test" を含むもの
    /// （大文字小文字を区別しない）。
    pub async fn delete_test_listings(&self) -> Result<u64, sqlx::Error> {
        let result = sqlx::query(
            r#"
            DELETE FROM listings
            WHERE title ILIKE '%test%'
               OR title ILIKE '%smoke%'
               OR location ILIKE '%test%'
               OR description ILIKE '%test%'
            "#,
        )
        .execute(&self.pool)
        .await?;

        Ok(result.rows_affected())
    }

    /// リスティングに紐づく契約を作成日時順に取得
    pub async fn find_agreements(&self, listing_id: Uuid) -> Result<Vec<Agreement>, sqlx::Error> {
        sqlx::query_as::<_, Agreement>(
            r#"
            SELECT id, listing_id, status, created_at
            FROM agreements
            WHERE listing_id = $1
            ORDER BY created_at
            "#,
        )
        .bind(listing_id)
        .fetch_all(&self.pool)
        .await
    }
}
