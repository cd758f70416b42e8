use std::collections::BTreeMap;

use tracing::debug;

use super::domain::{
    round2, GrantThreshold, ScaledScoreTable, SubjectGrant, YearlyGrantResult, FOREIGN_LANGUAGE,
    GEORGIAN_LANGUAGE, MANDATORY_SUBJECTS,
};
use super::repository::{ReferenceData, RepositoryError};

const ELECTIVE_WEIGHT: f64 = 1.5;
const GRANT_SCALE: f64 = 10.0;

/// Composite score used only for the scholarship tier lookup.
pub fn grant_score(georgian: f64, foreign: f64, elective: f64) -> f64 {
    round2((georgian + foreign + ELECTIVE_WEIGHT * elective) * GRANT_SCALE)
}

/// Grant score of every non-language subject scored in one year.
pub fn grant_candidates(subject_scores: &BTreeMap<String, f64>) -> Vec<(String, f64)> {
    let georgian = subject_scores
        .get(GEORGIAN_LANGUAGE)
        .copied()
        .unwrap_or(0.0);
    let foreign = subject_scores.get(FOREIGN_LANGUAGE).copied().unwrap_or(0.0);

    subject_scores
        .iter()
        .filter(|(subject, _)| !MANDATORY_SUBJECTS.contains(&subject.as_str()))
        .map(|(subject, score)| (subject.clone(), grant_score(georgian, foreign, *score)))
        .collect()
}

/// Best tier among `thresholds` for a computed score: the highest boundary
/// strictly below it. A score equal to a boundary does not reach that tier.
pub fn select_tier<'a, I>(thresholds: I, grant_score: f64) -> Option<i32>
where
    I: IntoIterator<Item = &'a GrantThreshold>,
{
    thresholds
        .into_iter()
        .filter(|threshold| threshold.grant_score < grant_score)
        .max_by(|left, right| left.grant_score.total_cmp(&right.grant_score))
        .map(|threshold| threshold.grant_amount)
}

/// Grant tier per grant-eligible subject for every standardized year.
pub async fn evaluate_grants<S>(
    table: &ScaledScoreTable,
    source: &S,
) -> Result<Vec<YearlyGrantResult>, RepositoryError>
where
    S: ReferenceData + ?Sized,
{
    let mut results = Vec::new();

    for (year, subject_scores) in table.iter() {
        let mut grants = Vec::new();
        for (subject, score) in grant_candidates(subject_scores) {
            let grant_amount = source
                .grant_amount(&subject, year, score)
                .await?
                .unwrap_or(0);
            debug!(year, %subject, grant_score = score, grant_amount, "grant tier resolved");
            grants.push(SubjectGrant {
                subject,
                grant_score: score,
                grant_amount,
            });
        }
        results.push(YearlyGrantResult { year, grants });
    }

    Ok(results)
}
