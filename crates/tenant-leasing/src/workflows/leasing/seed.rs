use std::fs::File;
use std::io::{BufReader, Read};
use std::path::{Path, PathBuf};

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

use super::domain::{Applicant, ApplicantGroup};
use super::renewals::LeaseRenewalRecord;

/// Snapshot of the leasing lists used to hydrate an in-memory collaborator.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct LeasingSeed {
    #[serde(default)]
    pub applicants: Vec<Applicant>,
    #[serde(default)]
    pub groups: Vec<ApplicantGroup>,
    #[serde(default)]
    pub renewals: Vec<LeaseRenewalRecord>,
}

#[derive(Debug, thiserror::Error)]
pub enum SeedError {
    #[error("failed to read leasing seed {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("invalid leasing seed data: {0}")]
    Json(#[from] serde_json::Error),
}

impl LeasingSeed {
    pub fn from_path(path: impl AsRef<Path>) -> Result<Self, SeedError> {
        let path = path.as_ref();
        let file = File::open(path).map_err(|source| SeedError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        Self::from_reader(BufReader::new(file))
    }

    pub fn from_reader<R: Read>(reader: R) -> Result<Self, SeedError> {
        Ok(serde_json::from_reader(reader)?)
    }

    /// Re-derive `days_left` for renewals that carry a lease end date.
    pub fn as_of(mut self, today: NaiveDate) -> Self {
        for renewal in &mut self.renewals {
            renewal.refresh_days_left(today);
        }
        self
    }
}
