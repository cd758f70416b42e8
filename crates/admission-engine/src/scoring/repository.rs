use async_trait::async_trait;

use super::domain::{
    EnrollmentStanding, EnrollmentThresholds, FacultySubjectWeight, GrantTierMinimums,
    SubjectExamStatistics,
};

/// Read-only access to the historical reference tables.
///
/// Every method is a single aggregate or lookup; implementations never hold
/// state between calls.
#[async_trait]
pub trait ReferenceData: Send + Sync {
    /// Statistics rows for every year in which any of `subjects` was examined.
    async fn exam_statistics(
        &self,
        subjects: &[String],
    ) -> Result<Vec<SubjectExamStatistics>, RepositoryError>;

    /// Amount of the highest tier whose boundary lies strictly below `grant_score`.
    async fn grant_amount(
        &self,
        subject: &str,
        year: i32,
        grant_score: f64,
    ) -> Result<Option<i32>, RepositoryError>;

    async fn grant_tier_minimums(
        &self,
        subject: &str,
    ) -> Result<Vec<GrantTierMinimums>, RepositoryError>;

    /// Weight rows for a faculty and year, restricted to `subjects`.
    async fn faculty_weights(
        &self,
        faculty_id: &str,
        year: i32,
        subjects: &[String],
    ) -> Result<Vec<FacultySubjectWeight>, RepositoryError>;

    async fn enrollment_standing(
        &self,
        faculty_id: &str,
        year: i32,
        elected_subject: &str,
        contest_score: f64,
    ) -> Result<EnrollmentStanding, RepositoryError>;

    async fn faculty_capacity(
        &self,
        faculty_id: &str,
        year: i32,
    ) -> Result<Option<i32>, RepositoryError>;

    async fn enrollment_thresholds(
        &self,
        faculty_id: &str,
        year: i32,
        elected_subject: &str,
    ) -> Result<EnrollmentThresholds, RepositoryError>;

    /// Cheap round trip used by the keep-alive task.
    async fn ping(&self) -> Result<(), RepositoryError>;
}

/// Error enumeration for reference data failures.
#[derive(Debug, thiserror::Error)]
pub enum RepositoryError {
    #[error("reference data unavailable: {0}")]
    Unavailable(String),
}

impl From<sqlx::Error> for RepositoryError {
    fn from(value: sqlx::Error) -> Self {
        Self::Unavailable(value.to_string())
    }
}
