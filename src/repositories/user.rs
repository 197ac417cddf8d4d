use sqlx::PgPool;
use uuid::Uuid;

use crate::models::User;

const USER_COLUMNS: &str = "id, email, name, role, password_hash, phone_number, email_verified, created_at, updated_at";

/// ユーザー作成パラメータ
#[derive(Debug, Clone, Default)]
pub struct NewUser<'a> {
    pub email: &'a str,
    pub name: Option<&'a str>,
    pub role: &'a str,
    pub phone_number: Option<&'a str>,
    pub password_hash: Option<&'a str>,
}

/// ユーザー削除時に一緒に削除した関連レコード数
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct UserDeletion {
    pub waitlist_signups: u64,
    pub accounts: u64,
    pub sessions: u64,
    pub verification_tokens: u64,
}

#[derive(Clone)]
pub struct UserRepository {
    pool: PgPool,
}

impl UserRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    /// メールアドレスでユーザーを検索
    pub async fn find_by_email(&self, email: &str) -> Result<Option<User>, sqlx::Error> {
        sqlx::query_as::<_, User>(&format!(
            "SELECT {USER_COLUMNS} FROM users WHERE email = $1"
        ))
        .bind(email)
        .fetch_optional(&self.pool)
        .await
    }

    /// 新しいユーザーを作成
    ///
    /// # Errors
    /// - UNIQUE制約違反時: `sqlx::Error::Database` (constraint = "users_email_key")
    pub async fn create_user(&self, user: &NewUser<'_>) -> Result<User, sqlx::Error> {
        sqlx::query_as::<_, User>(&format!(
            r#"
            INSERT INTO users (email, name, role, phone_number, password_hash)
            VALUES ($1, $2, $3, $4, $5)
            RETURNING {USER_COLUMNS}
            "#
        ))
        .bind(user.email)
        .bind(user.name)
        .bind(user.role)
        .bind(user.phone_number)
        .bind(user.password_hash)
        .fetch_one(&self.pool)
        .await
    }

    /// メールアドレス指定でパスワードハッシュを更新
    ///
    /// # Returns
    /// 対象ユーザーが存在した場合 true
    pub async fn update_password_by_email(
        &self,
        email: &str,
        password_hash: &str,
    ) -> Result<bool, sqlx::Error> {
        let result = sqlx::query(
            r#"
            UPDATE users
            SET password_hash = $2, updated_at = NOW()
            WHERE email = $1
            "#,
        )
        .bind(email)
        .bind(password_hash)
        .execute(&self.pool)
        .await?;

        Ok(result.rows_affected() > 0)
    }

    /// 作成日時の新しい順にユーザーを取得
    pub async fn list_recent(&self, limit: u32) -> Result<Vec<User>, sqlx::Error> {
        sqlx::query_as::<_, User>(&format!(
            "SELECT {USER_COLUMNS} FROM users ORDER BY created_at DESC LIMIT $1"
        ))
        .bind(i64::from(limit))
        .fetch_all(&self.pool)
        .await
    }

    /// ユーザーを ID 指定で削除
    pub async fn delete(&self, user_id: Uuid) -> Result<bool, sqlx::Error> {
        let result = sqlx::query("DELETE FROM users WHERE id = $1")
            .bind(user_id)
            .execute(&self.pool)
            .await?;

        Ok(result.rows_affected() > 0)
    }

    /// メールアドレスに `fragment` を含むユーザーを一括削除（大文字小文字を区別しない）
    ///
    /// 対象ユーザーのウェイトリスト登録・検証トークンも同じトランザクションで削除する。
    /// セッションと外部アカウント連携は外部キーの ON DELETE CASCADE で消える。
    ///
    /// # Returns
    /// 削除されたユーザー数
    pub async fn delete_where_email_contains(&self, fragment: &str) -> Result<u64, sqlx::Error> {
        let mut tx = self.pool.begin().await?;

        sqlx::query(
            r#"
            DELETE FROM waitlist_signups
            WHERE email IN (SELECT email FROM users WHERE email ILIKE '%' || $1 || '%')
            "#,
        )
        .bind(fragment)
        .execute(&mut *tx)
        .await?;

        sqlx::query(
            r#"
            DELETE FROM verification_tokens
            WHERE identifier IN (SELECT email FROM users WHERE email ILIKE '%' || $1 || '%')
            "#,
        )
        .bind(fragment)
        .execute(&mut *tx)
        .await?;

        let deleted = sqlx::query(
            r#"
            DELETE FROM users
            WHERE email ILIKE '%' || $1 || '%'
            "#,
        )
        .bind(fragment)
        .execute(&mut *tx)
        .await?
        .rows_affected();

        tx.commit().await?;

        Ok(deleted)
    }

    /// ユーザーと関連レコードを単一トランザクションで削除
    ///
    /// ウェイトリスト登録、外部アカウント連携、セッション、検証トークンを
    /// 先に削除してからユーザー本体を削除する。途中で失敗した場合は全てロールバック。
    pub async fn delete_with_related(&self, user: &User) -> Result<UserDeletion, sqlx::Error> {
        let mut tx = self.pool.begin().await?;

        let waitlist_signups = sqlx::query("DELETE FROM waitlist_signups WHERE email = $1")
            .bind(&user.email)
            .execute(&mut *tx)
            .await?
            .rows_affected();

        let accounts = sqlx::query("DELETE FROM accounts WHERE user_id = $1")
            .bind(user.id)
            .execute(&mut *tx)
            .await?
            .rows_affected();

        let sessions = sqlx::query("DELETE FROM sessions WHERE user_id = $1")
            .bind(user.id)
            .execute(&mut *tx)
            .await?
            .rows_affected();

        let verification_tokens =
            sqlx::query("DELETE FROM verification_tokens WHERE identifier = $1")
                .bind(&user.email)
                .execute(&mut *tx)
                .await?
                .rows_affected();

        sqlx::query("DELETE FROM users WHERE id = $1")
            .bind(user.id)
            .execute(&mut *tx)
            .await?;

        tx.commit().await?;

        Ok(UserDeletion {
            waitlist_signups,
            accounts,
            sessions,
            verification_tokens,
        })
    }
}
