//! Network boundary: the article-search API and raw article pages.
//!
//! Both clients share [`retry_fetch`]: a fixed attempt budget for transient
//! failures, no delay between attempts, and `None` instead of an error once
//! the budget is spent. A failed fetch never aborts the run.

mod newsapi;
mod page;

pub use newsapi::{DateRange, NewsApiClient};
pub use page::{PageFetcher, RawPage};

use crate::error::FetchError;
use std::future::Future;
use tracing::warn;

/// Run `op` until it succeeds, fails non-transiently, or `max_attempts` is
/// reached. Every failed attempt is logged.
pub async fn retry_fetch<T, F, Fut>(what: &str, max_attempts: usize, mut op: F) -> Option<T>
where
    F: FnMut() -> Fut,
    Fut: Future<Output = Result<T, FetchError>>,
{
    let max_attempts = max_attempts.max(1);
    for attempt in 1..=max_attempts {
        match op().await {
            Ok(value) => return Some(value),
            Err(e) if e.is_transient() && attempt < max_attempts => {
                warn!(what, attempt, max_attempts, error = %e, "Fetch attempt failed; retrying");
            }
            Err(e) => {
                warn!(what, attempt, max_attempts, transient = e.is_transient(), error = %e, "Fetch failed; giving up");
                return None;
            }
        }
    }
    None
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::cell::Cell;

    fn unavailable() -> FetchError {
        FetchError::Status { status: 503, url: "https://news.example".into() }
    }

    #[tokio::test]
    async fn test_succeeds_after_transient_failures() {
        let calls = Cell::new(0);
        let result = retry_fetch("test", 3, || {
            calls.set(calls.get() + 1);
            let n = calls.get();
            async move { if n < 3 { Err(unavailable()) } else { Ok(n) } }
        })
        .await;
        assert_eq!(result, Some(3));
        assert_eq!(calls.get(), 3);
    }

    #[tokio::test]
    async fn test_gives_up_after_budget() {
        let calls = Cell::new(0);
        let result: Option<()> = retry_fetch("test", 3, || {
            calls.set(calls.get() + 1);
            async { Err(unavailable()) }
        })
        .await;
        assert_eq!(result, None);
        assert_eq!(calls.get(), 3);
    }

    #[tokio::test]
    async fn test_permanent_failure_not_retried() {
        let calls = Cell::new(0);
        let result: Option<()> = retry_fetch("test", 3, || {
            calls.set(calls.get() + 1);
            async { Err(FetchError::Status { status: 404, url: "https://x".into() }) }
        })
        .await;
        assert_eq!(result, None);
        assert_eq!(calls.get(), 1);
    }
}
