use std::collections::{BTreeMap, BTreeSet};

use tracing::debug;

use super::domain::{
    round2, EnrollmentResult, EnrollmentThresholds, FacultySubjectWeight, FacultyTarget,
    ScaledScoreTable, BIOLOGY, MANDATORY_SUBJECTS,
};
use super::repository::ReferenceData;
use super::service::AnalysisError;

/// The one subject beyond the languages (and Biology on medical tracks) that
/// scopes the historical enrollment pool.
pub fn extract_elected_subject(chosen: &BTreeSet<String>) -> Result<String, AnalysisError> {
    let medical_track = chosen.len() == 4;
    let mut remaining = chosen.iter().filter(|subject| {
        !MANDATORY_SUBJECTS.contains(&subject.as_str())
            && !(medical_track && subject.as_str() == BIOLOGY)
    });

    match (remaining.next(), remaining.next()) {
        (Some(elected), None) => Ok(elected.clone()),
        _ => Err(AnalysisError::AmbiguousElective {
            subjects: chosen.iter().cloned().collect::<Vec<_>>().join(", "),
        }),
    }
}

/// Fail unless the faculty weights cover exactly the scored subjects.
pub fn ensure_weights_match(
    target: &FacultyTarget,
    scored: &BTreeMap<String, f64>,
    weights: &[FacultySubjectWeight],
) -> Result<(), AnalysisError> {
    let offered: BTreeSet<&str> = weights
        .iter()
        .map(|row| row.subject_name.as_str())
        .collect();
    let expected: BTreeSet<&str> = scored.keys().map(String::as_str).collect();

    if weights.len() != scored.len() || offered != expected {
        return Err(AnalysisError::SubjectMismatch {
            faculty_id: target.faculty_id.clone(),
            year: target.year,
            offered: weights.len(),
            scored: scored.len(),
        });
    }

    Ok(())
}

/// Weighted sum of scaled scores over the faculty's declared subjects.
pub fn contest_score(scored: &BTreeMap<String, f64>, weights: &[FacultySubjectWeight]) -> f64 {
    round2(
        weights
            .iter()
            .filter_map(|row| {
                scored
                    .get(&row.subject_name)
                    .map(|score| score * row.weight)
            })
            .sum(),
    )
}

/// Subject-specific seat reservation, or the whole faculty capacity.
pub fn seats_with_subject(weights: &[FacultySubjectWeight], capacity: i64) -> i64 {
    weights
        .iter()
        .find_map(|row| row.seats)
        .map(i64::from)
        .unwrap_or(capacity)
}

/// Contest score, rank and capacity for one requested faculty.
pub async fn evaluate_enrollment<S>(
    table: &ScaledScoreTable,
    target: &FacultyTarget,
    chosen: &BTreeSet<String>,
    source: &S,
) -> Result<EnrollmentResult, AnalysisError>
where
    S: ReferenceData + ?Sized,
{
    let scored = table
        .year(target.year)
        .ok_or(AnalysisError::MissingYear { year: target.year })?;
    let subjects: Vec<String> = scored.keys().cloned().collect();

    let weights = source
        .faculty_weights(&target.faculty_id, target.year, &subjects)
        .await?;
    ensure_weights_match(target, scored, &weights)?;

    let elected_subject = extract_elected_subject(chosen)?;
    let contest_score = contest_score(scored, &weights);

    let standing = source
        .enrollment_standing(
            &target.faculty_id,
            target.year,
            &elected_subject,
            contest_score,
        )
        .await?;

    let total_available = source
        .faculty_capacity(&target.faculty_id, target.year)
        .await?
        .map(i64::from)
        .unwrap_or(0);
    let seats_with_subject = seats_with_subject(&weights, total_available);

    let thresholds = source
        .enrollment_thresholds(&target.faculty_id, target.year, &elected_subject)
        .await?;
    let thresholds = EnrollmentThresholds {
        min_score: thresholds.min_score.map(round2),
        max_score: thresholds.max_score.map(round2),
    };

    debug!(
        faculty_id = %target.faculty_id,
        year = target.year,
        %elected_subject,
        contest_score,
        rank = standing.rank,
        "enrollment standing resolved"
    );

    Ok(EnrollmentResult {
        faculty_id: target.faculty_id.clone(),
        year: target.year,
        contest_score,
        thresholds,
        rank: standing.rank,
        total_enrolled: standing.total_enrolled,
        total_available,
        seats_with_subject,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::scoring::domain::{FOREIGN_LANGUAGE, GEORGIAN_LANGUAGE};

    fn set(subjects: &[&str]) -> BTreeSet<String> {
        subjects.iter().map(|subject| subject.to_string()).collect()
    }

    fn weight(subject: &str, weight: f64, seats: Option<i32>) -> FacultySubjectWeight {
        FacultySubjectWeight {
            faculty_id: "TSU-LAW".to_string(),
            year: 2024,
            subject_name: subject.to_string(),
            weight,
            seats,
        }
    }

    fn target() -> FacultyTarget {
        FacultyTarget {
            faculty_id: "TSU-LAW".to_string(),
            year: 2024,
        }
    }

    #[test]
    fn medical_track_drops_biology() {
        let chosen = set(&[GEORGIAN_LANGUAGE, FOREIGN_LANGUAGE, BIOLOGY, "CHEMISTRY"]);

        assert_eq!(
            extract_elected_subject(&chosen).expect("single elective"),
            "CHEMISTRY"
        );
    }

    #[test]
    fn three_subject_track_keeps_elective() {
        let chosen = set(&[GEORGIAN_LANGUAGE, FOREIGN_LANGUAGE, "HISTORY"]);

        assert_eq!(
            extract_elected_subject(&chosen).expect("single elective"),
            "HISTORY"
        );
    }

    #[test]
    fn biology_alone_is_an_elective() {
        let chosen = set(&[GEORGIAN_LANGUAGE, FOREIGN_LANGUAGE, BIOLOGY]);

        assert_eq!(
            extract_elected_subject(&chosen).expect("single elective"),
            BIOLOGY
        );
    }

    #[test]
    fn multiple_remaining_electives_are_rejected() {
        let chosen = set(&[GEORGIAN_LANGUAGE, FOREIGN_LANGUAGE, "HISTORY", "PHYSICS"]);

        let err = extract_elected_subject(&chosen).expect_err("two electives remain");

        assert!(matches!(err, AnalysisError::AmbiguousElective { .. }));
    }

    #[test]
    fn languages_only_have_no_elective() {
        let chosen = set(&[GEORGIAN_LANGUAGE, FOREIGN_LANGUAGE]);

        assert!(matches!(
            extract_elected_subject(&chosen),
            Err(AnalysisError::AmbiguousElective { .. })
        ));
    }

    #[test]
    fn weights_for_unscored_subject_are_a_mismatch() {
        let scored = BTreeMap::from([("A".to_string(), 150.0)]);
        let weights = vec![weight("A", 1.0, None), weight("B", 1.0, None)];

        let err = ensure_weights_match(&target(), &scored, &weights)
            .expect_err("faculty asks for B which was never scored");

        assert!(matches!(
            err,
            AnalysisError::SubjectMismatch {
                offered: 2,
                scored: 1,
                ..
            }
        ));
    }

    #[test]
    fn missing_weight_row_is_a_mismatch() {
        let scored = BTreeMap::from([("A".to_string(), 150.0), ("B".to_string(), 140.0)]);
        let weights = vec![weight("A", 1.0, None)];

        assert!(ensure_weights_match(&target(), &scored, &weights).is_err());
    }

    #[test]
    fn same_count_different_subjects_is_a_mismatch() {
        let scored = BTreeMap::from([("A".to_string(), 150.0)]);
        let weights = vec![weight("B", 1.0, None)];

        assert!(ensure_weights_match(&target(), &scored, &weights).is_err());
    }

    #[test]
    fn contest_score_is_weighted_sum() {
        let scored = BTreeMap::from([
            (GEORGIAN_LANGUAGE.to_string(), 150.0),
            (FOREIGN_LANGUAGE.to_string(), 160.0),
            ("HISTORY".to_string(), 170.333),
        ]);
        let weights = vec![
            weight(GEORGIAN_LANGUAGE, 3.0, None),
            weight(FOREIGN_LANGUAGE, 2.0, None),
            weight("HISTORY", 3.0, None),
        ];

        assert_eq!(contest_score(&scored, &weights), 1281.0);
    }

    #[test]
    fn seats_fall_back_to_capacity() {
        let weights = vec![weight("A", 1.0, None), weight("B", 1.0, None)];
        assert_eq!(seats_with_subject(&weights, 120), 120);

        let weights = vec![weight("A", 1.0, None), weight("B", 1.0, Some(35))];
        assert_eq!(seats_with_subject(&weights, 120), 35);
    }
}
