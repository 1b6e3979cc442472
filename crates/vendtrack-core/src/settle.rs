// ── All-settle fan-out ──
//
// Screens load several independent reports at once. A failure in one must
// not discard the others, so every future is driven to completion and the
// outcomes are summarized by count.

use std::future::Future;

use futures_util::future::join_all;

use crate::error::CoreError;

/// Outcome counts of one fan-out.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct BatchReport {
    pub total: usize,
    pub failed: usize,
}

impl BatchReport {
    pub fn from_results<T, E>(results: &[Result<T, E>]) -> Self {
        Self {
            total: results.len(),
            failed: results.iter().filter(|r| r.is_err()).count(),
        }
    }

    pub fn succeeded(&self) -> usize {
        self.total - self.failed
    }

    pub fn all_ok(&self) -> bool {
        self.failed == 0
    }

    pub fn all_failed(&self) -> bool {
        self.total > 0 && self.failed == self.total
    }

    /// `"K of N requests failed"`, or `None` when everything succeeded.
    pub fn summary(&self, noun: &str) -> Option<String> {
        (!self.all_ok()).then(|| format!("{} of {} {noun} failed", self.failed, self.total))
    }
}

/// Await every future, keeping each outcome in input order.
pub async fn settle<I, F, T>(futures: I) -> Vec<Result<T, CoreError>>
where
    I: IntoIterator<Item = F>,
    F: Future<Output = Result<T, CoreError>>,
{
    join_all(futures).await
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn summary_counts_failures() {
        let results: Vec<Result<u8, &str>> = vec![Ok(1), Err("boom"), Ok(3)];
        let report = BatchReport::from_results(&results);
        assert_eq!(report.succeeded(), 2);
        assert_eq!(
            report.summary("requests").as_deref(),
            Some("1 of 3 requests failed")
        );
    }

    #[test]
    fn clean_batch_has_no_summary() {
        let results: Vec<Result<u8, &str>> = vec![Ok(1), Ok(2)];
        assert_eq!(BatchReport::from_results(&results).summary("reports"), None);
    }

    #[test]
    fn empty_batch_is_not_all_failed() {
        assert!(!BatchReport::default().all_failed());
    }

    #[tokio::test]
    async fn settle_keeps_order_and_every_outcome() {
        let futures = (0..4u8).map(|n| async move {
            if n % 2 == 0 {
                Ok(n)
            } else {
                Err(CoreError::Internal(format!("odd {n}")))
            }
        });
        let results = settle(futures).await;
        assert_eq!(results.len(), 4);
        assert!(matches!(results[0], Ok(0)));
        assert!(results[1].is_err());
        assert!(matches!(results[2], Ok(2)));
    }
}
