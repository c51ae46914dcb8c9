use chrono::{DateTime, Utc};

use super::domain::{
    Applicant, ApplicantGroup, ApplicantId, ApplicantStatus, GroupId, GroupStatus,
};
use super::renewals::LeaseRenewalRecord;

/// Persistence collaborator behind the leasing screens.
///
/// List calls return records in the collaborator's order; the filter engine
/// never re-sorts them. Status changes and deletes carry the status the caller
/// validated against and must fail with [`RepositoryError::StatusChanged`]
/// when the stored status no longer matches, checked in the same critical
/// section as the mutation.
pub trait LeasingRepository: Send + Sync {
    fn applicants(&self) -> Result<Vec<Applicant>, RepositoryError>;
    fn applicant(&self, id: &ApplicantId) -> Result<Option<Applicant>, RepositoryError>;
    fn insert_applicant(&self, applicant: Applicant) -> Result<Applicant, RepositoryError>;
    fn update_applicant_status(
        &self,
        id: &ApplicantId,
        expected: &ApplicantStatus,
        status: ApplicantStatus,
        updated_at: DateTime<Utc>,
    ) -> Result<Applicant, RepositoryError>;
    fn delete_applicant(
        &self,
        id: &ApplicantId,
        expected: &ApplicantStatus,
    ) -> Result<(), RepositoryError>;

    fn groups(&self) -> Result<Vec<ApplicantGroup>, RepositoryError>;
    fn group(&self, id: &GroupId) -> Result<Option<ApplicantGroup>, RepositoryError>;
    fn insert_group(&self, group: ApplicantGroup) -> Result<ApplicantGroup, RepositoryError>;
    fn update_group_status(
        &self,
        id: &GroupId,
        expected: &GroupStatus,
        status: GroupStatus,
        updated_at: DateTime<Utc>,
    ) -> Result<ApplicantGroup, RepositoryError>;
    fn delete_group(&self, id: &GroupId, expected: &GroupStatus) -> Result<(), RepositoryError>;

    fn renewals(&self) -> Result<Vec<LeaseRenewalRecord>, RepositoryError>;
}

#[derive(Debug, thiserror::Error)]
pub enum RepositoryError {
    #[error("record already exists")]
    Conflict,
    #[error("record not found")]
    NotFound,
    #[error("status changed to '{current}' before the update was applied")]
    StatusChanged { current: String },
    #[error("repository unavailable: {0}")]
    Unavailable(String),
}
