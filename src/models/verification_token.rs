use sqlx::FromRow;
use time::OffsetDateTime;

/// メール検証トークン
///
/// 発行時に作成され、検証フローで一度だけ消費（読み取り → 削除）される。
/// 更新されることはない。トークン値はログに出力しないこと。
#[derive(Debug, Clone, FromRow)]
pub struct VerificationToken {
    /// 発行先のメールアドレス
    pub identifier: String,
    pub token: String,
    pub expires: OffsetDateTime,
}

impl VerificationToken {
    /// `expires` が `now` より厳密に前なら期限切れ
    pub fn is_expired_at(&self, now: OffsetDateTime) -> bool {
        self.expires < now
    }
}
