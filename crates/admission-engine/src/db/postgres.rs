use async_trait::async_trait;
use sqlx::PgPool;

use crate::scoring::domain::{
    EnrollmentStanding, EnrollmentThresholds, FacultySubjectWeight, GrantTierMinimums,
    SubjectExamStatistics,
};
use crate::scoring::repository::{ReferenceData, RepositoryError};

/// Reference tables read straight from Postgres. Each call borrows one pooled
/// connection for a single statement; dropping the future returns it.
#[derive(Debug, Clone)]
pub struct PgReferenceData {
    pool: PgPool,
}

impl PgReferenceData {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    pub fn pool(&self) -> &PgPool {
        &self.pool
    }
}

#[async_trait]
impl ReferenceData for PgReferenceData {
    async fn exam_statistics(
        &self,
        subjects: &[String],
    ) -> Result<Vec<SubjectExamStatistics>, RepositoryError> {
        let rows = sqlx::query_as::<_, SubjectExamStatistics>(
            r#"
            SELECT
                subject_name,
                year::int4 AS year,
                mean::float8 AS mean,
                standard_deviation::float8 AS standard_deviation,
                max_score::float8 AS max_score
            FROM exam
            WHERE subject_name = ANY($1)
            ORDER BY year, subject_name
            "#,
        )
        .bind(subjects)
        .fetch_all(&self.pool)
        .await?;

        Ok(rows)
    }

    async fn grant_amount(
        &self,
        subject: &str,
        year: i32,
        grant_score: f64,
    ) -> Result<Option<i32>, RepositoryError> {
        // "grant" is a reserved word
        let amount = sqlx::query_scalar::<_, i32>(
            r#"
            SELECT grant_amount::int4
            FROM "grant"
            WHERE grant_score::float8 < $1
              AND subject_name = $2
              AND year = $3
            ORDER BY grant_score DESC
            LIMIT 1
            "#,
        )
        .bind(grant_score)
        .bind(subject)
        .bind(year)
        .fetch_optional(&self.pool)
        .await?;

        Ok(amount)
    }

    async fn grant_tier_minimums(
        &self,
        subject: &str,
    ) -> Result<Vec<GrantTierMinimums>, RepositoryError> {
        let rows = sqlx::query_as::<_, GrantTierMinimums>(
            r#"
            SELECT
                year::int4 AS year,
                (MIN(grant_score) FILTER (WHERE grant_amount = 50))::float8 AS min_grant_50,
                (MIN(grant_score) FILTER (WHERE grant_amount = 70))::float8 AS min_grant_70,
                (MIN(grant_score) FILTER (WHERE grant_amount = 100))::float8 AS min_grant_100
            FROM "grant"
            WHERE subject_name = $1
            GROUP BY year
            ORDER BY year
            "#,
        )
        .bind(subject)
        .fetch_all(&self.pool)
        .await?;

        Ok(rows)
    }

    async fn faculty_weights(
        &self,
        faculty_id: &str,
        year: i32,
        subjects: &[String],
    ) -> Result<Vec<FacultySubjectWeight>, RepositoryError> {
        let rows = sqlx::query_as::<_, FacultySubjectWeight>(
            r#"
            SELECT
                faculty_id,
                year::int4 AS year,
                subject_name,
                weight::float8 AS weight,
                seats::int4 AS seats
            FROM faculty_year_subjects
            WHERE faculty_id = $1 AND year = $2 AND subject_name = ANY($3)
            ORDER BY subject_name
            "#,
        )
        .bind(faculty_id)
        .bind(year)
        .bind(subjects)
        .fetch_all(&self.pool)
        .await?;

        Ok(rows)
    }

    async fn enrollment_standing(
        &self,
        faculty_id: &str,
        year: i32,
        elected_subject: &str,
        contest_score: f64,
    ) -> Result<EnrollmentStanding, RepositoryError> {
        let standing = sqlx::query_as::<_, EnrollmentStanding>(
            r#"
            SELECT
                COUNT(*) AS total_enrolled,
                COUNT(*) FILTER (WHERE e.contest_score::float8 > $1) + 1 AS rank
            FROM enrollment e
            JOIN result r ON r.enrollment_id = e.student_id
            WHERE e.faculty_id = $2 AND e.year = $3 AND r.subject_name = $4
            "#,
        )
        .bind(contest_score)
        .bind(faculty_id)
        .bind(year)
        .bind(elected_subject)
        .fetch_optional(&self.pool)
        .await?;

        Ok(standing.unwrap_or(EnrollmentStanding {
            total_enrolled: 0,
            rank: 1,
        }))
    }

    async fn faculty_capacity(
        &self,
        faculty_id: &str,
        year: i32,
    ) -> Result<Option<i32>, RepositoryError> {
        let capacity = sqlx::query_scalar::<_, i32>(
            r#"
            SELECT capacity::int4
            FROM faculty
            WHERE id = $1 AND year = $2
            "#,
        )
        .bind(faculty_id)
        .bind(year)
        .fetch_optional(&self.pool)
        .await?;

        Ok(capacity)
    }

    async fn enrollment_thresholds(
        &self,
        faculty_id: &str,
        year: i32,
        elected_subject: &str,
    ) -> Result<EnrollmentThresholds, RepositoryError> {
        let thresholds = sqlx::query_as::<_, EnrollmentThresholds>(
            r#"
            SELECT
                MIN(e.contest_score)::float8 AS min_score,
                MAX(e.contest_score)::float8 AS max_score
            FROM enrollment e
            JOIN result r ON e.student_id = r.enrollment_id
            WHERE e.faculty_id = $1 AND e.year = $2 AND r.subject_name = $3
            "#,
        )
        .bind(faculty_id)
        .bind(year)
        .bind(elected_subject)
        .fetch_optional(&self.pool)
        .await?;

        Ok(thresholds.unwrap_or_default())
    }

    async fn ping(&self) -> Result<(), RepositoryError> {
        sqlx::query("SELECT 1").execute(&self.pool).await?;
        Ok(())
    }
}
