use std::collections::{BTreeMap, BTreeSet};
use std::io::Read;
use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::scoring::domain::{BIOLOGY, FOREIGN_LANGUAGE, GEORGIAN_LANGUAGE};

const CHEMISTRY: &str = "CHEMISTRY";
const HISTORY: &str = "HISTORY";
const MATHEMATICS: &str = "MATHEMATICS";
const PHYSICS: &str = "PHYSICS";

/// Fixed subject configuration: the point ceiling of every subject and the
/// subject sets an applicant may be scored on.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SubjectCatalog {
    reference_maxima: BTreeMap<String, f64>,
    allowed_combinations: Vec<BTreeSet<String>>,
}

#[derive(Debug, Deserialize)]
struct CatalogFile {
    reference_maxima: BTreeMap<String, f64>,
    allowed_combinations: Vec<Vec<String>>,
}

impl SubjectCatalog {
    /// Catalog used by the national exam since 2021.
    pub fn standard() -> Self {
        let reference_maxima = [
            (GEORGIAN_LANGUAGE, 60.0),
            (FOREIGN_LANGUAGE, 70.0),
            (MATHEMATICS, 51.0),
            (HISTORY, 60.0),
            (CHEMISTRY, 63.0),
            (PHYSICS, 63.0),
            (BIOLOGY, 70.0),
        ]
        .into_iter()
        .map(|(subject, max)| (subject.to_string(), max))
        .collect();

        let mut allowed_combinations = Vec::new();
        for elective in [MATHEMATICS, HISTORY, PHYSICS, BIOLOGY, CHEMISTRY] {
            allowed_combinations.push(combination(&[elective]));
        }
        for elective in [CHEMISTRY, MATHEMATICS, PHYSICS] {
            allowed_combinations.push(combination(&[BIOLOGY, elective]));
        }

        Self {
            reference_maxima,
            allowed_combinations,
        }
    }

    pub fn new(
        reference_maxima: BTreeMap<String, f64>,
        allowed_combinations: Vec<BTreeSet<String>>,
    ) -> Result<Self, CatalogError> {
        if allowed_combinations.is_empty() {
            return Err(CatalogError::Empty);
        }

        for (subject, max) in &reference_maxima {
            if !max.is_finite() || *max <= 0.0 {
                return Err(CatalogError::InvalidMaximum {
                    subject: subject.clone(),
                    max: *max,
                });
            }
        }

        for (index, subjects) in allowed_combinations.iter().enumerate() {
            if !(3..=4).contains(&subjects.len()) {
                return Err(CatalogError::CombinationSize {
                    index,
                    len: subjects.len(),
                });
            }
            if !subjects.contains(GEORGIAN_LANGUAGE) || !subjects.contains(FOREIGN_LANGUAGE) {
                return Err(CatalogError::MissingMandatory { index });
            }
            if subjects.len() == 4 && !subjects.contains(BIOLOGY) {
                return Err(CatalogError::MissingMandatory { index });
            }
            if let Some(subject) = subjects
                .iter()
                .find(|subject| !reference_maxima.contains_key(*subject))
            {
                return Err(CatalogError::UnknownSubject {
                    subject: subject.clone(),
                });
            }
        }

        Ok(Self {
            reference_maxima,
            allowed_combinations,
        })
    }

    pub fn from_path<P: AsRef<Path>>(path: P) -> Result<Self, CatalogError> {
        let file = std::fs::File::open(path)?;
        Self::from_reader(file)
    }

    pub fn from_reader<R: Read>(reader: R) -> Result<Self, CatalogError> {
        let raw: CatalogFile = serde_json::from_reader(reader)?;
        let combinations = raw
            .allowed_combinations
            .into_iter()
            .map(|subjects| subjects.into_iter().collect())
            .collect();
        Self::new(raw.reference_maxima, combinations)
    }

    pub fn reference_max(&self, subject: &str) -> Option<f64> {
        self.reference_maxima.get(subject).copied()
    }

    pub fn is_allowed(&self, subjects: &BTreeSet<String>) -> bool {
        self.allowed_combinations
            .iter()
            .any(|allowed| allowed == subjects)
    }

    pub fn reference_maxima(&self) -> &BTreeMap<String, f64> {
        &self.reference_maxima
    }

    pub fn allowed_combinations(&self) -> &[BTreeSet<String>] {
        &self.allowed_combinations
    }
}

impl Default for SubjectCatalog {
    fn default() -> Self {
        Self::standard()
    }
}

fn combination(electives: &[&str]) -> BTreeSet<String> {
    [GEORGIAN_LANGUAGE, FOREIGN_LANGUAGE]
        .iter()
        .chain(electives)
        .map(|subject| subject.to_string())
        .collect()
}

#[derive(Debug, thiserror::Error)]
pub enum CatalogError {
    #[error("failed to read subject catalog: {0}")]
    Io(#[from] std::io::Error),
    #[error("invalid subject catalog JSON: {0}")]
    Json(#[from] serde_json::Error),
    #[error("subject catalog lists no allowed combinations")]
    Empty,
    #[error("reference maximum for {subject} must be positive, got {max}")]
    InvalidMaximum { subject: String, max: f64 },
    #[error("combination #{index} has {len} subjects, expected 3 or 4")]
    CombinationSize { index: usize, len: usize },
    #[error("combination #{index} is missing a mandatory subject")]
    MissingMandatory { index: usize },
    #[error("subject {subject} has no reference maximum")]
    UnknownSubject { subject: String },
}
