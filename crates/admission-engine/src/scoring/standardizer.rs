use std::collections::BTreeMap;

use tracing::warn;

use super::domain::{round2, round3, ScaledScoreTable, SubjectExamStatistics};
use super::service::AnalysisError;
use crate::config::SubjectCatalog;

const SCALED_MEAN: f64 = 150.0;
const SCALED_SPREAD: f64 = 15.0;

/// Check the subject combination and convert raw points into fractions of each
/// subject's reference maximum.
pub fn percentages(
    points: &BTreeMap<String, f64>,
    catalog: &SubjectCatalog,
) -> Result<BTreeMap<String, f64>, AnalysisError> {
    let chosen = points.keys().cloned().collect();
    if !catalog.is_allowed(&chosen) {
        return Err(AnalysisError::InvalidCombination {
            subjects: points.keys().cloned().collect::<Vec<_>>().join(", "),
        });
    }

    points
        .iter()
        .map(|(subject, raw)| {
            let max = catalog
                .reference_max(subject)
                .ok_or_else(|| AnalysisError::InvalidCombination {
                    subjects: subject.clone(),
                })?;
            if !raw.is_finite() || *raw < 0.0 || *raw > max {
                return Err(AnalysisError::PointsOutOfRange {
                    subject: subject.clone(),
                    points: *raw,
                    max,
                });
            }
            Ok((subject.clone(), round3(raw / max)))
        })
        .collect()
}

/// Rescaled z-score of a year-adjusted point.
pub fn scaled_score(percentage: f64, statistics: &SubjectExamStatistics) -> f64 {
    let year_point = percentage * statistics.max_score;
    let z = (year_point - statistics.mean) / statistics.standard_deviation;
    round2(SCALED_SPREAD * z + SCALED_MEAN)
}

/// Scaled score for every (year, subject) statistics row of the chosen subjects.
pub fn standardize(
    points: &BTreeMap<String, f64>,
    catalog: &SubjectCatalog,
    statistics: &[SubjectExamStatistics],
) -> Result<ScaledScoreTable, AnalysisError> {
    let percentages = percentages(points, catalog)?;
    let mut table = ScaledScoreTable::default();

    for row in statistics {
        let Some(percentage) = percentages.get(&row.subject_name) else {
            continue;
        };
        if row.standard_deviation.is_nan() || row.standard_deviation <= 0.0 {
            warn!(
                subject = %row.subject_name,
                year = row.year,
                standard_deviation = row.standard_deviation,
                "skipping exam statistics without spread"
            );
            continue;
        }

        table.insert(
            row.year,
            row.subject_name.clone(),
            scaled_score(*percentage, row),
        );
    }

    Ok(table)
}
