use std::sync::Arc;
use std::time::Duration;

use tokio::task::JoinHandle;
use tokio::time::MissedTickBehavior;
use tracing::{debug, warn};

use crate::scoring::repository::ReferenceData;

/// Ping the reference database on a fixed interval for the lifetime of the
/// process so idle pooled connections are not dropped by the server.
/// Failures are logged and otherwise ignored.
pub fn spawn_keepalive<S>(source: Arc<S>, interval: Duration) -> JoinHandle<()>
where
    S: ReferenceData + ?Sized + 'static,
{
    let period = if interval.is_zero() {
        Duration::from_secs(1)
    } else {
        interval
    };

    tokio::spawn(async move {
        let mut ticker = tokio::time::interval(period);
        ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);

        loop {
            ticker.tick().await;
            match source.ping().await {
                Ok(()) => debug!("keep-alive ping sent"),
                Err(err) => warn!(error = %err, "keep-alive ping failed"),
            }
        }
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::scoring::domain::{
        EnrollmentStanding, EnrollmentThresholds, FacultySubjectWeight, GrantTierMinimums,
        SubjectExamStatistics,
    };
    use crate::scoring::repository::RepositoryError;
    use async_trait::async_trait;
    use std::sync::atomic::{AtomicUsize, Ordering};

    #[derive(Default)]
    struct FlakyDatabase {
        pings: AtomicUsize,
    }

    #[async_trait]
    impl ReferenceData for FlakyDatabase {
        async fn exam_statistics(
            &self,
            _subjects: &[String],
        ) -> Result<Vec<SubjectExamStatistics>, RepositoryError> {
            Ok(Vec::new())
        }

        async fn grant_amount(
            &self,
            _subject: &str,
            _year: i32,
            _grant_score: f64,
        ) -> Result<Option<i32>, RepositoryError> {
            Ok(None)
        }

        async fn grant_tier_minimums(
            &self,
            _subject: &str,
        ) -> Result<Vec<GrantTierMinimums>, RepositoryError> {
            Ok(Vec::new())
        }

        async fn faculty_weights(
            &self,
            _faculty_id: &str,
            _year: i32,
            _subjects: &[String],
        ) -> Result<Vec<FacultySubjectWeight>, RepositoryError> {
            Ok(Vec::new())
        }

        async fn enrollment_standing(
            &self,
            _faculty_id: &str,
            _year: i32,
            _elected_subject: &str,
            _contest_score: f64,
        ) -> Result<EnrollmentStanding, RepositoryError> {
            Ok(EnrollmentStanding {
                total_enrolled: 0,
                rank: 1,
            })
        }

        async fn faculty_capacity(
            &self,
            _faculty_id: &str,
            _year: i32,
        ) -> Result<Option<i32>, RepositoryError> {
            Ok(None)
        }

        async fn enrollment_thresholds(
            &self,
            _faculty_id: &str,
            _year: i32,
            _elected_subject: &str,
        ) -> Result<EnrollmentThresholds, RepositoryError> {
            Ok(EnrollmentThresholds::default())
        }

        async fn ping(&self) -> Result<(), RepositoryError> {
            let count = self.pings.fetch_add(1, Ordering::SeqCst);
            if count % 2 == 0 {
                Err(RepositoryError::Unavailable("connection reset".to_string()))
            } else {
                Ok(())
            }
        }
    }

    #[tokio::test(start_paused = true)]
    async fn keepalive_keeps_pinging_after_failures() {
        let database = Arc::new(FlakyDatabase::default());
        let handle = spawn_keepalive(database.clone(), Duration::from_secs(240));

        tokio::time::sleep(Duration::from_secs(240 * 3 + 1)).await;

        assert!(database.pings.load(Ordering::SeqCst) >= 3);
        assert!(!handle.is_finished());
        handle.abort();
    }
}
