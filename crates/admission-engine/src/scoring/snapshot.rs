use std::io::Read;
use std::path::{Path, PathBuf};

use serde::de::DeserializeOwned;
use tracing::info;

use super::memory::InMemoryReferenceData;

pub const EXAM_FILE: &str = "exam.csv";
pub const GRANT_FILE: &str = "grant.csv";
pub const FACULTY_WEIGHTS_FILE: &str = "faculty_year_subjects.csv";
pub const FACULTY_FILE: &str = "faculty.csv";
pub const ENROLLMENT_FILE: &str = "enrollment.csv";

/// Loads CSV exports of the reference tables into memory.
pub struct ReferenceSnapshot;

impl ReferenceSnapshot {
    /// `exam.csv` is required; the remaining tables default to empty when absent.
    pub fn from_dir<P: AsRef<Path>>(dir: P) -> Result<InMemoryReferenceData, SnapshotError> {
        let dir = dir.as_ref();
        let data = InMemoryReferenceData {
            exams: read_file(dir, EXAM_FILE, true)?,
            grants: read_file(dir, GRANT_FILE, false)?,
            faculty_weights: read_file(dir, FACULTY_WEIGHTS_FILE, false)?,
            capacities: read_file(dir, FACULTY_FILE, false)?,
            enrollments: read_file(dir, ENROLLMENT_FILE, false)?,
        };

        info!(
            dir = %dir.display(),
            exams = data.exams.len(),
            grants = data.grants.len(),
            enrollments = data.enrollments.len(),
            "reference snapshot loaded"
        );
        Ok(data)
    }

    pub fn read_table<T, R>(reader: R) -> Result<Vec<T>, csv::Error>
    where
        T: DeserializeOwned,
        R: Read,
    {
        let mut csv_reader = csv::ReaderBuilder::new()
            .trim(csv::Trim::All)
            .from_reader(reader);
        csv_reader.deserialize::<T>().collect()
    }
}

fn read_file<T: DeserializeOwned>(
    dir: &Path,
    name: &str,
    required: bool,
) -> Result<Vec<T>, SnapshotError> {
    let path = dir.join(name);
    if !required && !path.exists() {
        return Ok(Vec::new());
    }

    let file = std::fs::File::open(&path).map_err(|source| SnapshotError::Io {
        path: path.clone(),
        source,
    })?;
    ReferenceSnapshot::read_table(file).map_err(|source| SnapshotError::Csv { path, source })
}

#[derive(Debug, thiserror::Error)]
pub enum SnapshotError {
    #[error("failed to read {}: {source}", path.display())]
    Io {
        path: PathBuf,
        source: std::io::Error,
    },
    #[error("invalid reference data in {}: {source}", path.display())]
    Csv { path: PathBuf, source: csv::Error },
}
