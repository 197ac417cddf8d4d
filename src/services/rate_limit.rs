use std::collections::HashMap;
use std::sync::{Arc, Mutex};
use std::time::{Duration, Instant};

/// メール送信用のスライディングウィンドウ型レートリミッター
///
/// プロセス内メモリのみで管理する（複数インスタンス間では共有しない）。
#[derive(Clone)]
pub struct EmailRateLimiter {
    limit: usize,
    window: Duration,
    attempts: Arc<Mutex<HashMap<String, Vec<Instant>>>>,
}

impl EmailRateLimiter {
    pub fn new(limit: usize, window: Duration) -> Self {
        Self {
            limit,
            window,
            attempts: Arc::new(Mutex::new(HashMap::new())),
        }
    }

    /// 試行を記録し、ウィンドウ内の試行数が上限以下なら true
    ///
    /// 拒否された試行もカウントに含める。
    pub fn check(&self, key: &str, now: Instant) -> bool {
        let mut attempts = self
            .attempts
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner());

        // 古いキーを掃除
        attempts.retain(|_, times| {
            times
                .last()
                .is_some_and(|last| now.duration_since(*last) < self.window)
        });

        let recent = attempts.entry(key.to_string()).or_default();
        recent.retain(|t| now.duration_since(*t) < self.window);
        recent.push(now);

        recent.len() <= self.limit
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_allows_up_to_limit() {
        let limiter = EmailRateLimiter::new(5, Duration::from_secs(60));
        let now = Instant::now();

        for _ in 0..5 {
            assert!(limiter.check("127.0.0.1:guest@example.com", now));
        }
        assert!(!limiter.check("127.0.0.1:guest@example.com", now));
    }

    #[test]
    fn test_keys_are_independent() {
        let limiter = EmailRateLimiter::new(1, Duration::from_secs(60));
        let now = Instant::now();

        assert!(limiter.check("a", now));
        assert!(limiter.check("b", now));
        assert!(!limiter.check("a", now));
    }

    #[test]
    fn test_window_expiry_resets_count() {
        let limiter = EmailRateLimiter::new(1, Duration::from_secs(60));
        let start = Instant::now();

        assert!(limiter.check("a", start));
        assert!(!limiter.check("a", start + Duration::from_secs(30)));
        assert!(limiter.check("a", start + Duration::from_secs(120)));
    }
}
