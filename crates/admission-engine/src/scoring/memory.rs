use std::collections::BTreeMap;

use async_trait::async_trait;

use super::domain::{
    EnrollmentRecord, EnrollmentStanding, EnrollmentThresholds, FacultyCapacity,
    FacultySubjectWeight, GrantThreshold, GrantTierMinimums, SubjectExamStatistics,
};
use super::grants::select_tier;
use super::repository::{ReferenceData, RepositoryError};

/// Reference tables held in memory, used for offline snapshots and tests.
#[derive(Debug, Clone, Default)]
pub struct InMemoryReferenceData {
    pub exams: Vec<SubjectExamStatistics>,
    pub grants: Vec<GrantThreshold>,
    pub faculty_weights: Vec<FacultySubjectWeight>,
    pub capacities: Vec<FacultyCapacity>,
    pub enrollments: Vec<EnrollmentRecord>,
}

impl InMemoryReferenceData {
    fn history<'a>(
        &'a self,
        faculty_id: &'a str,
        year: i32,
        elected_subject: &'a str,
    ) -> impl Iterator<Item = &'a EnrollmentRecord> + 'a {
        self.enrollments.iter().filter(move |record| {
            record.faculty_id == faculty_id
                && record.year == year
                && record.elected_subject == elected_subject
        })
    }
}

#[async_trait]
impl ReferenceData for InMemoryReferenceData {
    async fn exam_statistics(
        &self,
        subjects: &[String],
    ) -> Result<Vec<SubjectExamStatistics>, RepositoryError> {
        Ok(self
            .exams
            .iter()
            .filter(|row| subjects.contains(&row.subject_name))
            .cloned()
            .collect())
    }

    async fn grant_amount(
        &self,
        subject: &str,
        year: i32,
        grant_score: f64,
    ) -> Result<Option<i32>, RepositoryError> {
        let candidates = self
            .grants
            .iter()
            .filter(|row| row.subject_name == subject && row.year == year);
        Ok(select_tier(candidates, grant_score))
    }

    async fn grant_tier_minimums(
        &self,
        subject: &str,
    ) -> Result<Vec<GrantTierMinimums>, RepositoryError> {
        let mut by_year: BTreeMap<i32, GrantTierMinimums> = BTreeMap::new();

        for row in self.grants.iter().filter(|row| row.subject_name == subject) {
            let entry = by_year.entry(row.year).or_insert(GrantTierMinimums {
                year: row.year,
                min_grant_50: None,
                min_grant_70: None,
                min_grant_100: None,
            });
            let slot = match row.grant_amount {
                50 => &mut entry.min_grant_50,
                70 => &mut entry.min_grant_70,
                100 => &mut entry.min_grant_100,
                _ => continue,
            };
            *slot = Some(slot.map_or(row.grant_score, |current| current.min(row.grant_score)));
        }

        Ok(by_year.into_values().collect())
    }

    async fn faculty_weights(
        &self,
        faculty_id: &str,
        year: i32,
        subjects: &[String],
    ) -> Result<Vec<FacultySubjectWeight>, RepositoryError> {
        Ok(self
            .faculty_weights
            .iter()
            .filter(|row| {
                row.faculty_id == faculty_id
                    && row.year == year
                    && subjects.contains(&row.subject_name)
            })
            .cloned()
            .collect())
    }

    async fn enrollment_standing(
        &self,
        faculty_id: &str,
        year: i32,
        elected_subject: &str,
        contest_score: f64,
    ) -> Result<EnrollmentStanding, RepositoryError> {
        let mut total_enrolled = 0;
        let mut ahead = 0;
        for record in self.history(faculty_id, year, elected_subject) {
            total_enrolled += 1;
            if record.contest_score > contest_score {
                ahead += 1;
            }
        }

        Ok(EnrollmentStanding {
            total_enrolled,
            rank: ahead + 1,
        })
    }

    async fn faculty_capacity(
        &self,
        faculty_id: &str,
        year: i32,
    ) -> Result<Option<i32>, RepositoryError> {
        Ok(self
            .capacities
            .iter()
            .find(|row| row.faculty_id == faculty_id && row.year == year)
            .map(|row| row.capacity))
    }

    async fn enrollment_thresholds(
        &self,
        faculty_id: &str,
        year: i32,
        elected_subject: &str,
    ) -> Result<EnrollmentThresholds, RepositoryError> {
        let scores = self
            .history(faculty_id, year, elected_subject)
            .map(|record| record.contest_score);

        Ok(scores.fold(EnrollmentThresholds::default(), |range, score| {
            EnrollmentThresholds {
                min_score: Some(range.min_score.map_or(score, |min| min.min(score))),
                max_score: Some(range.max_score.map_or(score, |max| max.max(score))),
            }
        }))
    }

    async fn ping(&self) -> Result<(), RepositoryError> {
        Ok(())
    }
}
