use std::sync::{Arc, Mutex, MutexGuard};

use chrono::{DateTime, Utc};

use super::domain::{
    Applicant, ApplicantGroup, ApplicantId, ApplicantStatus, GroupId, GroupStatus,
};
use super::renewals::LeaseRenewalRecord;
use super::repository::{LeasingRepository, RepositoryError};
use super::seed::LeasingSeed;

#[derive(Debug, Default)]
struct LeasingStore {
    applicants: Vec<Applicant>,
    groups: Vec<ApplicantGroup>,
    renewals: Vec<LeaseRenewalRecord>,
}

/// Process-local collaborator that keeps records in insertion order.
#[derive(Debug, Default, Clone)]
pub struct InMemoryLeasingRepository {
    store: Arc<Mutex<LeasingStore>>,
}

impl InMemoryLeasingRepository {
    pub fn from_seed(seed: LeasingSeed) -> Self {
        let LeasingSeed {
            applicants,
            groups,
            renewals,
        } = seed;

        Self {
            store: Arc::new(Mutex::new(LeasingStore {
                applicants,
                groups,
                renewals,
            })),
        }
    }

    pub fn replace_renewals(&self, renewals: Vec<LeaseRenewalRecord>) -> Result<(), RepositoryError> {
        self.lock()?.renewals = renewals;
        Ok(())
    }

    fn lock(&self) -> Result<MutexGuard<'_, LeasingStore>, RepositoryError> {
        self.store
            .lock()
            .map_err(|_| RepositoryError::Unavailable("leasing store lock poisoned".to_string()))
    }
}

impl LeasingRepository for InMemoryLeasingRepository {
    fn applicants(&self) -> Result<Vec<Applicant>, RepositoryError> {
        Ok(self.lock()?.applicants.clone())
    }

    fn applicant(&self, id: &ApplicantId) -> Result<Option<Applicant>, RepositoryError> {
        Ok(self
            .lock()?
            .applicants
            .iter()
            .find(|applicant| &applicant.id == id)
            .cloned())
    }

    fn insert_applicant(&self, applicant: Applicant) -> Result<Applicant, RepositoryError> {
        let mut store = self.lock()?;
        if store.applicants.iter().any(|existing| existing.id == applicant.id) {
            return Err(RepositoryError::Conflict);
        }
        store.applicants.push(applicant.clone());
        Ok(applicant)
    }

    fn update_applicant_status(
        &self,
        id: &ApplicantId,
        expected: &ApplicantStatus,
        status: ApplicantStatus,
        updated_at: DateTime<Utc>,
    ) -> Result<Applicant, RepositoryError> {
        let mut store = self.lock()?;
        let applicant = store
            .applicants
            .iter_mut()
            .find(|applicant| &applicant.id == id)
            .ok_or(RepositoryError::NotFound)?;
        ensure_unchanged(&applicant.status, expected, ApplicantStatus::label)?;
        applicant.status = status;
        applicant.updated_at = updated_at;
        Ok(applicant.clone())
    }

    fn delete_applicant(
        &self,
        id: &ApplicantId,
        expected: &ApplicantStatus,
    ) -> Result<(), RepositoryError> {
        let mut store = self.lock()?;
        let position = store
            .applicants
            .iter()
            .position(|applicant| &applicant.id == id)
            .ok_or(RepositoryError::NotFound)?;
        ensure_unchanged(&store.applicants[position].status, expected, ApplicantStatus::label)?;
        store.applicants.remove(position);
        Ok(())
    }

    fn groups(&self) -> Result<Vec<ApplicantGroup>, RepositoryError> {
        Ok(self.lock()?.groups.clone())
    }

    fn group(&self, id: &GroupId) -> Result<Option<ApplicantGroup>, RepositoryError> {
        Ok(self
            .lock()?
            .groups
            .iter()
            .find(|group| &group.id == id)
            .cloned())
    }

    fn insert_group(&self, group: ApplicantGroup) -> Result<ApplicantGroup, RepositoryError> {
        let mut store = self.lock()?;
        if store.groups.iter().any(|existing| existing.id == group.id) {
            return Err(RepositoryError::Conflict);
        }
        store.groups.push(group.clone());
        Ok(group)
    }

    fn update_group_status(
        &self,
        id: &GroupId,
        expected: &GroupStatus,
        status: GroupStatus,
        updated_at: DateTime<Utc>,
    ) -> Result<ApplicantGroup, RepositoryError> {
        let mut store = self.lock()?;
        let group = store
            .groups
            .iter_mut()
            .find(|group| &group.id == id)
            .ok_or(RepositoryError::NotFound)?;
        ensure_unchanged(&group.status, expected, GroupStatus::label)?;
        group.status = status;
        group.last_updated = updated_at;
        Ok(group.clone())
    }

    fn delete_group(&self, id: &GroupId, expected: &GroupStatus) -> Result<(), RepositoryError> {
        let mut store = self.lock()?;
        let position = store
            .groups
            .iter()
            .position(|group| &group.id == id)
            .ok_or(RepositoryError::NotFound)?;
        ensure_unchanged(&store.groups[position].status, expected, GroupStatus::label)?;
        store.groups.remove(position);
        Ok(())
    }

    fn renewals(&self) -> Result<Vec<LeaseRenewalRecord>, RepositoryError> {
        Ok(self.lock()?.renewals.clone())
    }
}

fn ensure_unchanged<S: PartialEq>(
    current: &S,
    expected: &S,
    label: impl Fn(&S) -> &str,
) -> Result<(), RepositoryError> {
    if current == expected {
        Ok(())
    } else {
        Err(RepositoryError::StatusChanged {
            current: label(current).to_string(),
        })
    }
}
