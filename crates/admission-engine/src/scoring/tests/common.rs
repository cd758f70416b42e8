use std::collections::BTreeMap;
use std::sync::Arc;

use async_trait::async_trait;
use axum::response::Response;
use serde_json::Value;

use crate::config::SubjectCatalog;
use crate::scoring::domain::{
    AnalysisRequest, EnrollmentRecord, EnrollmentStanding, EnrollmentThresholds, FacultyCapacity,
    FacultySubjectWeight, FacultyTarget, GrantThreshold, GrantTierMinimums,
    SubjectExamStatistics, BIOLOGY, FOREIGN_LANGUAGE, GEORGIAN_LANGUAGE,
};
use crate::scoring::memory::InMemoryReferenceData;
use crate::scoring::repository::{ReferenceData, RepositoryError};
use crate::scoring::{analysis_router, AdmissionAnalyzer};

pub(super) const HISTORY: &str = "HISTORY";
pub(super) const CHEMISTRY: &str = "CHEMISTRY";
pub(super) const MATHEMATICS: &str = "MATHEMATICS";

fn exam(subject: &str, year: i32, mean: f64, sd: f64, max: f64) -> SubjectExamStatistics {
    SubjectExamStatistics {
        subject_name: subject.to_string(),
        year,
        mean,
        standard_deviation: sd,
        max_score: max,
    }
}

fn grant(subject: &str, year: i32, score: f64, amount: i32) -> GrantThreshold {
    GrantThreshold {
        subject_name: subject.to_string(),
        year,
        grant_score: score,
        grant_amount: amount,
    }
}

fn weight(
    faculty_id: &str,
    year: i32,
    subject: &str,
    weight: f64,
    seats: Option<i32>,
) -> FacultySubjectWeight {
    FacultySubjectWeight {
        faculty_id: faculty_id.to_string(),
        year,
        subject_name: subject.to_string(),
        weight,
        seats,
    }
}

fn enrolled(faculty_id: &str, year: i32, score: f64, subject: &str) -> EnrollmentRecord {
    EnrollmentRecord {
        faculty_id: faculty_id.to_string(),
        year,
        contest_score: score,
        elected_subject: subject.to_string(),
    }
}

fn capacity(faculty_id: &str, year: i32, capacity: i32) -> FacultyCapacity {
    FacultyCapacity {
        faculty_id: faculty_id.to_string(),
        year,
        capacity,
    }
}

/// Two exam years, three faculties and a small admitted cohort.
pub(super) fn reference_data() -> InMemoryReferenceData {
    InMemoryReferenceData {
        exams: vec![
            exam(GEORGIAN_LANGUAGE, 2023, 36.0, 8.0, 60.0),
            exam(FOREIGN_LANGUAGE, 2023, 40.0, 12.0, 70.0),
            exam(HISTORY, 2023, 30.0, 10.0, 60.0),
            exam(BIOLOGY, 2023, 35.0, 10.0, 70.0),
            exam(CHEMISTRY, 2023, 28.0, 9.0, 63.0),
            exam(GEORGIAN_LANGUAGE, 2024, 33.0, 9.0, 60.0),
            exam(FOREIGN_LANGUAGE, 2024, 42.0, 12.0, 70.0),
            exam(HISTORY, 2024, 32.0, 10.0, 60.0),
            exam(BIOLOGY, 2024, 36.0, 10.0, 70.0),
            exam(CHEMISTRY, 2024, 30.0, 9.0, 63.0),
        ],
        grants: vec![
            grant(HISTORY, 2023, 5804.0, 50),
            grant(HISTORY, 2023, 5966.5, 70),
            grant(HISTORY, 2023, 6060.0, 100),
            grant(HISTORY, 2024, 5801.5, 50),
            grant(HISTORY, 2024, 6008.0, 70),
            grant(HISTORY, 2024, 6109.0, 100),
            grant(CHEMISTRY, 2024, 5651.5, 50),
            grant(CHEMISTRY, 2024, 5932.5, 70),
            grant(CHEMISTRY, 2024, 6030.5, 100),
        ],
        faculty_weights: vec![
            weight("TSU-LAW", 2024, GEORGIAN_LANGUAGE, 3.0, None),
            weight("TSU-LAW", 2024, FOREIGN_LANGUAGE, 2.0, None),
            weight("TSU-LAW", 2024, HISTORY, 3.0, None),
            weight("ISU-HUM", 2023, GEORGIAN_LANGUAGE, 2.0, None),
            weight("ISU-HUM", 2023, FOREIGN_LANGUAGE, 2.0, None),
            weight("ISU-HUM", 2023, HISTORY, 2.0, Some(20)),
            weight("GTU-ENG", 2024, GEORGIAN_LANGUAGE, 1.0, None),
            weight("GTU-ENG", 2024, FOREIGN_LANGUAGE, 1.0, None),
            weight("GTU-ENG", 2024, MATHEMATICS, 3.0, None),
            weight("TSMU-MED", 2024, GEORGIAN_LANGUAGE, 1.0, None),
            weight("TSMU-MED", 2024, FOREIGN_LANGUAGE, 1.0, None),
            weight("TSMU-MED", 2024, BIOLOGY, 2.0, None),
            weight("TSMU-MED", 2024, CHEMISTRY, 2.0, Some(40)),
        ],
        capacities: vec![
            capacity("TSU-LAW", 2024, 150),
            capacity("ISU-HUM", 2023, 80),
            capacity("TSMU-MED", 2024, 120),
        ],
        enrollments: vec![
            enrolled("TSU-LAW", 2024, 1450.25, HISTORY),
            enrolled("TSU-LAW", 2024, 1400.0, HISTORY),
            enrolled("TSU-LAW", 2024, 1368.5, HISTORY),
            enrolled("TSU-LAW", 2024, 1300.75, HISTORY),
            enrolled("TSU-LAW", 2024, 1250.0, HISTORY),
            enrolled("TSU-LAW", 2024, 1500.0, MATHEMATICS),
            enrolled("TSMU-MED", 2024, 1100.0, CHEMISTRY),
            enrolled("TSMU-MED", 2024, 1000.0, CHEMISTRY),
            enrolled("TSMU-MED", 2024, 1200.0, BIOLOGY),
        ],
    }
}

pub(super) fn target(faculty_id: &str, year: i32) -> FacultyTarget {
    FacultyTarget {
        faculty_id: faculty_id.to_string(),
        year,
    }
}

/// 80% in both languages and 75% in History.
pub(super) fn history_request(faculties: Vec<FacultyTarget>) -> AnalysisRequest {
    AnalysisRequest {
        points: BTreeMap::from([
            (GEORGIAN_LANGUAGE.to_string(), 48.0),
            (FOREIGN_LANGUAGE.to_string(), 56.0),
            (HISTORY.to_string(), 45.0),
        ]),
        faculties,
    }
}

pub(super) fn medical_request(faculties: Vec<FacultyTarget>) -> AnalysisRequest {
    AnalysisRequest {
        points: BTreeMap::from([
            (GEORGIAN_LANGUAGE.to_string(), 48.0),
            (FOREIGN_LANGUAGE.to_string(), 56.0),
            (BIOLOGY.to_string(), 56.0),
            (CHEMISTRY.to_string(), 50.0),
        ]),
        faculties,
    }
}

pub(super) fn analyzer() -> AdmissionAnalyzer<InMemoryReferenceData> {
    AdmissionAnalyzer::with_concurrency(
        Arc::new(reference_data()),
        Arc::new(SubjectCatalog::standard()),
        4,
    )
}

pub(super) fn router_with_data(data: InMemoryReferenceData) -> axum::Router {
    analysis_router(Arc::new(AdmissionAnalyzer::new(
        Arc::new(data),
        Arc::new(SubjectCatalog::standard()),
    )))
}

pub(super) async fn read_json_body(response: Response) -> Value {
    let body = axum::body::to_bytes(response.into_body(), 64 * 1024)
        .await
        .expect("read body");
    serde_json::from_slice(&body).expect("json payload")
}

pub(super) struct UnavailableReferenceData;

fn offline() -> RepositoryError {
    RepositoryError::Unavailable("database offline".to_string())
}

#[async_trait]
impl ReferenceData for UnavailableReferenceData {
    async fn exam_statistics(
        &self,
        _subjects: &[String],
    ) -> Result<Vec<SubjectExamStatistics>, RepositoryError> {
        Err(offline())
    }

    async fn grant_amount(
        &self,
        _subject: &str,
        _year: i32,
        _grant_score: f64,
    ) -> Result<Option<i32>, RepositoryError> {
        Err(offline())
    }

    async fn grant_tier_minimums(
        &self,
        _subject: &str,
    ) -> Result<Vec<GrantTierMinimums>, RepositoryError> {
        Err(offline())
    }

    async fn faculty_weights(
        &self,
        _faculty_id: &str,
        _year: i32,
        _subjects: &[String],
    ) -> Result<Vec<FacultySubjectWeight>, RepositoryError> {
        Err(offline())
    }

    async fn enrollment_standing(
        &self,
        _faculty_id: &str,
        _year: i32,
        _elected_subject: &str,
        _contest_score: f64,
    ) -> Result<EnrollmentStanding, RepositoryError> {
        Err(offline())
    }

    async fn faculty_capacity(
        &self,
        _faculty_id: &str,
        _year: i32,
    ) -> Result<Option<i32>, RepositoryError> {
        Err(offline())
    }

    async fn enrollment_thresholds(
        &self,
        _faculty_id: &str,
        _year: i32,
        _elected_subject: &str,
    ) -> Result<EnrollmentThresholds, RepositoryError> {
        Err(offline())
    }

    async fn ping(&self) -> Result<(), RepositoryError> {
        Err(offline())
    }
}
