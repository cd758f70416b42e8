use std::sync::Arc;

use futures::stream::{self, StreamExt, TryStreamExt};
use tracing::info;

use super::domain::{
    AnalysisRequest, AnalysisResult, EnrollmentResult, GrantTierMinimums, ScaledScoreTable,
};
use super::enrollment::evaluate_enrollment;
use super::grants::evaluate_grants;
use super::repository::{ReferenceData, RepositoryError};
use super::standardizer::{percentages, standardize};
use crate::config::SubjectCatalog;

/// Service composing the subject catalog, reference data and the three evaluators.
pub struct AdmissionAnalyzer<S: ?Sized> {
    catalog: Arc<SubjectCatalog>,
    concurrency: usize,
    source: Arc<S>,
}

impl<S> AdmissionAnalyzer<S>
where
    S: ReferenceData + ?Sized + 'static,
{
    pub fn new(source: Arc<S>, catalog: Arc<SubjectCatalog>) -> Self {
        Self::with_concurrency(source, catalog, 1)
    }

    /// `concurrency` bounds how many faculties are evaluated at once; match it to
    /// the pool size so one request cannot starve the others.
    pub fn with_concurrency(source: Arc<S>, catalog: Arc<SubjectCatalog>, concurrency: usize) -> Self {
        Self {
            catalog,
            concurrency: concurrency.max(1),
            source,
        }
    }

    pub fn catalog(&self) -> &SubjectCatalog {
        &self.catalog
    }

    pub fn source(&self) -> &Arc<S> {
        &self.source
    }

    /// Scaled score for every historical year of the applicant's subjects.
    pub async fn standardize(
        &self,
        request: &AnalysisRequest,
    ) -> Result<ScaledScoreTable, AnalysisError> {
        // validate before touching the database
        percentages(&request.points, &self.catalog)?;

        let subjects: Vec<String> = request.points.keys().cloned().collect();
        let statistics = self.source.exam_statistics(&subjects).await?;
        standardize(&request.points, &self.catalog, &statistics)
    }

    /// Grant tiers for every standardized year and standing for each requested faculty.
    pub async fn analyze(&self, request: &AnalysisRequest) -> Result<AnalysisResult, AnalysisError> {
        let table = self.standardize(request).await?;
        let chosen = request.chosen_subjects();
        let source = self.source.as_ref();

        let grants = async {
            evaluate_grants(&table, source)
                .await
                .map_err(AnalysisError::from)
        };

        let pending: Vec<_> = request
            .faculties
            .iter()
            .map(|target| evaluate_enrollment(&table, target, &chosen, source))
            .collect();
        let enrollments = stream::iter(pending)
            .buffered(self.concurrency)
            .try_collect::<Vec<EnrollmentResult>>();

        let (grants, enrollments) = tokio::try_join!(grants, enrollments)?;

        info!(
            years = grants.len(),
            faculties = enrollments.len(),
            "admission analysis completed"
        );

        Ok(AnalysisResult {
            grants,
            enrollments,
        })
    }

    /// Lowest grant score that reached each tier, per year.
    pub async fn grant_tier_minimums(
        &self,
        subject: &str,
    ) -> Result<Vec<GrantTierMinimums>, AnalysisError> {
        if self.catalog.reference_max(subject).is_none() {
            return Err(AnalysisError::UnknownSubject {
                subject: subject.to_string(),
            });
        }
        Ok(self.source.grant_tier_minimums(subject).await?)
    }
}

/// Error raised while analysing an applicant.
#[derive(Debug, thiserror::Error)]
pub enum AnalysisError {
    #[error("invalid subject combination: {subjects}")]
    InvalidCombination { subjects: String },
    #[error("{subject} points {points} must be between 0 and {max}")]
    PointsOutOfRange {
        subject: String,
        points: f64,
        max: f64,
    },
    #[error("unknown subject {subject}")]
    UnknownSubject { subject: String },
    #[error("no exam statistics for year {year}")]
    MissingYear { year: i32 },
    #[error(
        "faculty {faculty_id} ({year}) does not offer the scored subjects: {offered} weight rows for {scored} subjects"
    )]
    SubjectMismatch {
        faculty_id: String,
        year: i32,
        offered: usize,
        scored: usize,
    },
    #[error("could not determine elected subject from {subjects}")]
    AmbiguousElective { subjects: String },
    #[error(transparent)]
    Repository(#[from] RepositoryError),
}

impl AnalysisError {
    /// Errors the applicant can fix by changing the request.
    pub fn is_client_error(&self) -> bool {
        !matches!(self, AnalysisError::Repository(_))
    }
}
