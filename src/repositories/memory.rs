//! テスト用インメモリ `VerificationStore`
//!
//! 作業単位は開始時にストア全体をロックし、変更はコピー上で行う。
//! commit で書き戻し、破棄すればロールバック。

use std::collections::HashMap;
use std::sync::Arc;
use std::sync::atomic::{AtomicUsize, Ordering};

use async_trait::async_trait;
use time::OffsetDateTime;
use tokio::sync::{Mutex, OwnedMutexGuard};

use crate::models::VerificationToken;
use crate::repositories::{VerificationStore, VerificationUnitOfWork};

#[derive(Debug, Clone, Default)]
pub(crate) struct MemoryState {
    pub(crate) tokens: HashMap<String, VerificationToken>,
    /// email → email_verified
    pub(crate) users: HashMap<String, Option<OffsetDateTime>>,
    /// コミット済みの書き込み数
    pub(crate) writes: usize,
}

#[derive(Clone, Default)]
pub(crate) struct MemoryStore {
    state: Arc<Mutex<MemoryState>>,
    /// 開始された作業単位の数
    pub(crate) begins: Arc<AtomicUsize>,
}

pub(crate) struct MemoryUnitOfWork {
    guard: OwnedMutexGuard<MemoryState>,
    staged: MemoryState,
}

impl MemoryStore {
    pub(crate) async fn with_user(self, email: &str) -> Self {
        self.state.lock().await.users.insert(email.to_string(), None);
        self
    }

    pub(crate) async fn with_token(
        self,
        token: &str,
        identifier: &str,
        expires: OffsetDateTime,
    ) -> Self {
        self.state.lock().await.tokens.insert(
            token.to_string(),
            VerificationToken {
                identifier: identifier.to_string(),
                token: token.to_string(),
                expires,
            },
        );
        self
    }

    pub(crate) async fn snapshot(&self) -> MemoryState {
        self.state.lock().await.clone()
    }
}

#[async_trait]
impl VerificationStore for MemoryStore {
    type UnitOfWork = MemoryUnitOfWork;

    async fn begin(&self) -> Result<MemoryUnitOfWork, sqlx::Error> {
        self.begins.fetch_add(1, Ordering::SeqCst);
        let guard = self.state.clone().lock_owned().await;
        let staged = guard.clone();
        Ok(MemoryUnitOfWork { guard, staged })
    }
}

#[async_trait]
impl VerificationUnitOfWork for MemoryUnitOfWork {
    async fn find_token(
        &mut self,
        token: &str,
    ) -> Result<Option<VerificationToken>, sqlx::Error> {
        Ok(self.staged.tokens.get(token).cloned())
    }

    async fn mark_email_verified(
        &mut self,
        email: &str,
        verified_at: OffsetDateTime,
    ) -> Result<bool, sqlx::Error> {
        match self.staged.users.get_mut(email) {
            Some(verified) => {
                *verified = Some(verified_at);
                self.staged.writes += 1;
                Ok(true)
            }
            None => Ok(false),
        }
    }

    async fn delete_token(&mut self, token: &str) -> Result<(), sqlx::Error> {
        if self.staged.tokens.remove(token).is_some() {
            self.staged.writes += 1;
        }
        Ok(())
    }

    async fn commit(self) -> Result<(), sqlx::Error> {
        let MemoryUnitOfWork { mut guard, staged } = self;
        *guard = staged;
        Ok(())
    }
}
