use std::{fmt::Display, future::Future, time::Duration};

use rand::Rng;

/// 连接池（事务模式）下预编译语句冲突对应的 SQLSTATE
///
/// - `42P05`: duplicate_prepared_statement
/// - `26000`: invalid_sql_statement_name（prepared statement does not exist）
const PREPARED_STATEMENT_CODES: [&str; 2] = ["42P05", "26000"];

/// 判断错误是否为预编译语句冲突。
pub fn is_prepared_statement_error(err: &sqlx::Error) -> bool {
    if let Some(db_err) = err.as_database_error() {
        if db_err
            .code()
            .is_some_and(|code| PREPARED_STATEMENT_CODES.contains(&code.as_ref()))
        {
            return true;
        }
    }
    err.to_string().contains("prepared statement")
}

/// 可重试错误的判定
pub trait Retryable {
    fn is_retryable(&self) -> bool;
}

impl Retryable for sqlx::Error {
    fn is_retryable(&self) -> bool {
        is_prepared_statement_error(self)
    }
}

impl Retryable for crate::error::Error {
    fn is_retryable(&self) -> bool {
        matches!(self, crate::error::Error::Sqlx(e) if is_prepared_statement_error(e))
    }
}

/// 重试策略：最多尝试次数与退避基准时长。
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RetryPolicy {
    pub max_attempts: u32,
    pub base_delay: Duration,
}

impl Default for RetryPolicy {
    fn default() -> Self {
        Self::new(3, Duration::from_millis(100))
    }
}

impl RetryPolicy {
    /// 统计面板使用的策略，计数查询并发较多，给更长的退避
    pub const STATS: RetryPolicy = RetryPolicy::new(5, Duration::from_millis(150));

    pub const fn new(max_attempts: u32, base_delay: Duration) -> Self {
        Self {
            max_attempts,
            base_delay,
        }
    }

    /// 第 `attempt` 次失败后（从 0 开始）的等待时长
    ///
    /// `base_delay * 2^attempt`，再加上 `[0, base_delay)` 的随机抖动。
    pub fn delay_for(&self, attempt: u32) -> Duration {
        let backoff = self.base_delay.saturating_mul(1u32 << attempt.min(16));
        backoff + self.jitter()
    }

    fn jitter(&self) -> Duration {
        let base = self.base_delay.as_millis() as u64;
        if base == 0 {
            return Duration::ZERO;
        }
        Duration::from_millis(rand::thread_rng().gen_range(0..base))
    }
}

/// 执行 `op`，遇到预编译语句冲突时按 [`RetryPolicy`] 退避重试。
///
/// 其他错误立即返回；重试次数用尽后返回最后一次的错误。
///
/// ```ignore
/// let total = with_retry(RetryPolicy::default(), || pool.count_users()).await?;
/// ```
pub async fn with_retry<F, Fut, T, E>(policy: RetryPolicy, mut op: F) -> Result<T, E>
where
    F: FnMut() -> Fut,
    Fut: Future<Output = Result<T, E>>,
    E: Retryable + Display,
{
    let max_attempts = policy.max_attempts.max(1);
    let mut attempt = 0;

    loop {
        match op().await {
            Ok(value) => {
                if attempt > 0 {
                    tracing::debug!(attempts = attempt + 1, "query succeeded after retry");
                }
                return Ok(value);
            }
            Err(e) if e.is_retryable() && attempt + 1 < max_attempts => {
                let delay = policy.delay_for(attempt);
                tracing::warn!(
                    error = %e,
                    attempt = attempt + 1,
                    max_attempts,
                    delay_ms = delay.as_millis() as u64,
                    "prepared statement conflict, retrying"
                );
                tokio::time::sleep(delay).await;
                attempt += 1;
            }
            Err(e) => return Err(e),
        }
    }
}

#[cfg(test)]
mod tests {
    use std::sync::atomic::{AtomicU32, Ordering};

    use super::*;

    #[derive(Debug)]
    enum FakeError {
        Prepared,
        Other,
    }

    impl Display for FakeError {
        fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
            write!(f, "{self:?}")
        }
    }

    impl Retryable for FakeError {
        fn is_retryable(&self) -> bool {
            matches!(self, FakeError::Prepared)
        }
    }

    #[test]
    fn detects_prepared_statement_messages() {
        let err = sqlx::Error::Protocol("prepared statement \"s0\" does not exist".into());
        assert!(is_prepared_statement_error(&err));
        assert!(!is_prepared_statement_error(&sqlx::Error::PoolTimedOut));
        assert!(!is_prepared_statement_error(&sqlx::Error::RowNotFound));
    }

    #[test]
    fn delay_grows_exponentially_with_bounded_jitter() {
        let policy = RetryPolicy::new(5, Duration::from_millis(100));
        for attempt in 0..4 {
            let floor = Duration::from_millis(100 * (1 << attempt));
            let delay = policy.delay_for(attempt);
            assert!(delay >= floor, "attempt {attempt}: {delay:?} < {floor:?}");
            assert!(delay < floor + Duration::from_millis(100));
        }
    }

    #[test]
    fn zero_base_delay_has_no_jitter() {
        let policy = RetryPolicy::new(3, Duration::ZERO);
        assert_eq!(policy.delay_for(2), Duration::ZERO);
    }

    #[tokio::test(start_paused = true)]
    async fn retries_prepared_statement_errors_until_success() {
        let calls = &AtomicU32::new(0);
        let result = with_retry(RetryPolicy::default(), move || async move {
            match calls.fetch_add(1, Ordering::SeqCst) {
                0 | 1 => Err(FakeError::Prepared),
                n => Ok(n),
            }
        })
        .await;

        assert_eq!(result.unwrap(), 2);
        assert_eq!(calls.load(Ordering::SeqCst), 3);
    }

    #[tokio::test(start_paused = true)]
    async fn gives_up_after_max_attempts() {
        let calls = &AtomicU32::new(0);
        let result: Result<(), _> = with_retry(RetryPolicy::STATS, move || async move {
            calls.fetch_add(1, Ordering::SeqCst);
            Err(FakeError::Prepared)
        })
        .await;

        assert!(matches!(result, Err(FakeError::Prepared)));
        assert_eq!(calls.load(Ordering::SeqCst), 5);
    }

    #[tokio::test(start_paused = true)]
    async fn other_errors_are_not_retried() {
        let calls = &AtomicU32::new(0);
        let result: Result<(), _> = with_retry(RetryPolicy::default(), move || async move {
            calls.fetch_add(1, Ordering::SeqCst);
            Err(FakeError::Other)
        })
        .await;

        assert!(matches!(result, Err(FakeError::Other)));
        assert_eq!(calls.load(Ordering::SeqCst), 1);
    }

    #[tokio::test]
    async fn zero_attempts_still_runs_once() {
        let calls = &AtomicU32::new(0);
        let result: Result<(), _> = with_retry(RetryPolicy::new(0, Duration::ZERO), move || async move {
            calls.fetch_add(1, Ordering::SeqCst);
            Err(FakeError::Prepared)
        })
        .await;

        assert!(result.is_err());
        assert_eq!(calls.load(Ordering::SeqCst), 1);
    }
}
