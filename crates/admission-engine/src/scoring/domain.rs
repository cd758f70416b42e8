use std::collections::{BTreeMap, BTreeSet};

use serde::{Deserialize, Serialize};

pub const GEORGIAN_LANGUAGE: &str = "GEORGIAN LANGUAGE";
pub const FOREIGN_LANGUAGE: &str = "FOREIGN LANGUAGE";
pub const BIOLOGY: &str = "BIOLOGY";

/// Subjects every applicant sits regardless of track.
pub const MANDATORY_SUBJECTS: [&str; 2] = [GEORGIAN_LANGUAGE, FOREIGN_LANGUAGE];

/// Per-year normalization parameters of one exam subject.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, sqlx::FromRow)]
pub struct SubjectExamStatistics {
    pub subject_name: String,
    pub year: i32,
    pub mean: f64,
    pub standard_deviation: f64,
    pub max_score: f64,
}

/// Scaled scores keyed by exam year, then subject.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
#[serde(transparent)]
pub struct ScaledScoreTable {
    years: BTreeMap<i32, BTreeMap<String, f64>>,
}

impl ScaledScoreTable {
    pub fn insert(&mut self, year: i32, subject: impl Into<String>, scaled: f64) {
        self.years
            .entry(year)
            .or_default()
            .insert(subject.into(), scaled);
    }

    pub fn year(&self, year: i32) -> Option<&BTreeMap<String, f64>> {
        self.years.get(&year)
    }

    pub fn score(&self, year: i32, subject: &str) -> Option<f64> {
        self.years
            .get(&year)
            .and_then(|subjects| subjects.get(subject))
            .copied()
    }

    pub fn iter(&self) -> impl Iterator<Item = (i32, &BTreeMap<String, f64>)> {
        self.years.iter().map(|(year, subjects)| (*year, subjects))
    }

    pub fn years(&self) -> impl Iterator<Item = i32> + '_ {
        self.years.keys().copied()
    }

    pub fn is_empty(&self) -> bool {
        self.years.is_empty()
    }
}

/// Scholarship tier boundary for a subject and year.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, sqlx::FromRow)]
pub struct GrantThreshold {
    pub subject_name: String,
    pub year: i32,
    pub grant_score: f64,
    pub grant_amount: i32,
}

/// Lowest grant score observed per tier in one year.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, sqlx::FromRow)]
pub struct GrantTierMinimums {
    pub year: i32,
    pub min_grant_50: Option<f64>,
    pub min_grant_70: Option<f64>,
    pub min_grant_100: Option<f64>,
}

/// Subject weight a faculty applies to the contest score.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, sqlx::FromRow)]
pub struct FacultySubjectWeight {
    pub faculty_id: String,
    pub year: i32,
    pub subject_name: String,
    pub weight: f64,
    pub seats: Option<i32>,
}

/// Historical enrollment of one admitted applicant.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EnrollmentRecord {
    pub faculty_id: String,
    pub year: i32,
    pub contest_score: f64,
    pub elected_subject: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, sqlx::FromRow)]
pub struct FacultyCapacity {
    #[serde(alias = "id")]
    pub faculty_id: String,
    pub year: i32,
    pub capacity: i32,
}

/// Size of the historical pool and where a contest score would have landed in it.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, sqlx::FromRow)]
pub struct EnrollmentStanding {
    pub total_enrolled: i64,
    pub rank: i64,
}

/// Historical contest score range for a faculty, year and elective.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize, sqlx::FromRow)]
pub struct EnrollmentThresholds {
    pub min_score: Option<f64>,
    pub max_score: Option<f64>,
}

/// Faculty and admission year an applicant wants to be ranked against.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct FacultyTarget {
    pub faculty_id: String,
    pub year: i32,
}

/// Raw exam points plus the faculties to evaluate.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AnalysisRequest {
    pub points: BTreeMap<String, f64>,
    #[serde(default)]
    pub faculties: Vec<FacultyTarget>,
}

impl AnalysisRequest {
    pub fn chosen_subjects(&self) -> BTreeSet<String> {
        self.points.keys().cloned().collect()
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SubjectGrant {
    pub subject: String,
    pub grant_score: f64,
    pub grant_amount: i32,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct YearlyGrantResult {
    pub year: i32,
    pub grants: Vec<SubjectGrant>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EnrollmentResult {
    pub faculty_id: String,
    pub year: i32,
    pub contest_score: f64,
    pub thresholds: EnrollmentThresholds,
    pub rank: i64,
    pub total_enrolled: i64,
    pub total_available: i64,
    pub seats_with_subject: i64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AnalysisResult {
    pub grants: Vec<YearlyGrantResult>,
    pub enrollments: Vec<EnrollmentResult>,
}

pub(crate) fn round2(value: f64) -> f64 {
    (value * 100.0).round() / 100.0
}

/// Percentages of the reference maximum carry three decimals.
pub(crate) fn round3(value: f64) -> f64 {
    (value * 1000.0).round() / 1000.0
}
