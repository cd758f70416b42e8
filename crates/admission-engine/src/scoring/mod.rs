//! Applicant scoring: scaled exam scores, grant tiers and faculty standing.
//!
//! The evaluators are plain functions over a [`ScaledScoreTable`]; the
//! [`AdmissionAnalyzer`] service validates the request, standardizes once and
//! fans the table out to the grant and enrollment evaluators.

pub mod domain;
pub mod enrollment;
pub mod grants;
pub mod memory;
pub mod repository;
pub mod router;
pub mod service;
pub mod snapshot;
pub mod standardizer;

#[cfg(test)]
mod tests;

pub use domain::{
    AnalysisRequest, AnalysisResult, EnrollmentRecord, EnrollmentResult, EnrollmentStanding,
    EnrollmentThresholds, FacultyCapacity, FacultySubjectWeight, FacultyTarget, GrantThreshold,
    GrantTierMinimums, ScaledScoreTable, SubjectExamStatistics, SubjectGrant, YearlyGrantResult,
};
pub use memory::InMemoryReferenceData;
pub use repository::{ReferenceData, RepositoryError};
pub use router::analysis_router;
pub use service::{AdmissionAnalyzer, AnalysisError};
pub use snapshot::{ReferenceSnapshot, SnapshotError};
