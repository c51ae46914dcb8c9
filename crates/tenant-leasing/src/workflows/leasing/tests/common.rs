use std::sync::mpsc::{self, Receiver, Sender};
use std::sync::{Arc, Mutex};

use axum::body::to_bytes;
use axum::response::Response;
use chrono::{DateTime, NaiveDate, TimeZone, Utc};
use serde_json::Value;

use crate::workflows::leasing::domain::{
    Applicant, ApplicantGroup, ApplicantId, ApplicantStatus, FacetKey, GroupId, GroupStatus,
    RenewalId,
};
use crate::workflows::leasing::renewals::LeaseRenewalRecord;
use crate::workflows::leasing::repository::{LeasingRepository, RepositoryError};
use crate::workflows::leasing::{InMemoryLeasingRepository, LeasingSeed, LeasingService};

pub(super) fn timestamp() -> DateTime<Utc> {
    Utc.with_ymd_and_hms(2025, 3, 4, 10, 0, 0)
        .single()
        .expect("valid timestamp")
}

pub(super) fn applicant(id: &str, status: &str) -> Applicant {
    Applicant {
        id: ApplicantId(id.to_string()),
        name: format!("Applicant {id}"),
        email: format!("{id}@example.com"),
        phone: "555-0100".to_string(),
        property: FacetKey::new("Maple Court"),
        status: ApplicantStatus::parse(status),
        stage_in_process: FacetKey::new("Screening"),
        application_date: NaiveDate::from_ymd_opt(2025, 3, 1).expect("valid date"),
        updated_at: timestamp(),
    }
}

pub(super) fn group(id: &str, status: &str, percent_complete: u8) -> ApplicantGroup {
    ApplicantGroup {
        id: GroupId(id.to_string()),
        name: format!("Group {id}"),
        members: vec!["Rosa Lind".to_string(), "Theo Lind".to_string()],
        property: FacetKey::new("Maple Court"),
        unit: "2B".to_string(),
        status: GroupStatus::parse(status),
        percent_complete,
        last_updated: timestamp(),
    }
}

pub(super) fn renewal(id: &str, owner: &str, days_left: i64) -> LeaseRenewalRecord {
    LeaseRenewalRecord {
        id: RenewalId(id.to_string()),
        tenant_name: format!("Tenant {id}"),
        property_title: "Birch Flats".to_string(),
        rental_owners: owner.to_string(),
        current_terms: "12 months @ 1450".to_string(),
        days_left,
        lease_end: None,
    }
}

pub(super) fn seed() -> LeasingSeed {
    let mut mira = applicant("app-1", "Pending");
    mira.name = "Mira Holt".to_string();
    mira.stage_in_process = FacetKey::new("Background Check");

    let mut jon = applicant("app-2", "Approved");
    jon.name = "Jon Park".to_string();
    jon.property = FacetKey::new("Oak Terrace");

    let mut ada = applicant("app-3", "lease created");
    ada.name = "Ada Quist".to_string();

    let mut lena = applicant("app-4", "Under Review");
    lena.name = "Lena Ortiz".to_string();
    lena.stage_in_process = FacetKey::new("Income Verification");

    LeasingSeed {
        applicants: vec![mira, jon, ada, lena],
        groups: vec![
            group("grp-1", "Pending", 40),
            group("grp-2", "Active", 100),
            group("grp-3", "Inactive", 0),
        ],
        renewals: vec![
            renewal("rn-1", "Cedar Holdings", -5),
            renewal("rn-2", "Elm LLC", 0),
            renewal("rn-3", "Cedar Holdings", 30),
            renewal("rn-4", "Elm LLC", 31),
            renewal("rn-5", "Cedar Holdings", 360),
            renewal("rn-6", "Birch Trust", 361),
        ],
    }
}

pub(super) fn build_service() -> (
    LeasingService<InMemoryLeasingRepository>,
    Arc<InMemoryLeasingRepository>,
) {
    let repository = Arc::new(InMemoryLeasingRepository::from_seed(seed()));
    let service = LeasingService::new(repository.clone());
    (service, repository)
}

pub(super) async fn read_json_body(response: Response) -> Value {
    let bytes = to_bytes(response.into_body(), usize::MAX)
        .await
        .expect("body readable");
    serde_json::from_slice(&bytes).expect("body is json")
}

/// Collaborator that is always down.
pub(super) struct UnavailableRepository;

impl UnavailableRepository {
    fn offline<T>() -> Result<T, RepositoryError> {
        Err(RepositoryError::Unavailable("leasing api offline".to_string()))
    }
}

impl LeasingRepository for UnavailableRepository {
    fn applicants(&self) -> Result<Vec<Applicant>, RepositoryError> {
        Self::offline()
    }

    fn applicant(&self, _id: &ApplicantId) -> Result<Option<Applicant>, RepositoryError> {
        Self::offline()
    }

    fn insert_applicant(&self, _applicant: Applicant) -> Result<Applicant, RepositoryError> {
        Self::offline()
    }

    fn update_applicant_status(
        &self,
        _id: &ApplicantId,
        _expected: &ApplicantStatus,
        _status: ApplicantStatus,
        _updated_at: DateTime<Utc>,
    ) -> Result<Applicant, RepositoryError> {
        Self::offline()
    }

    fn delete_applicant(
        &self,
        _id: &ApplicantId,
        _expected: &ApplicantStatus,
    ) -> Result<(), RepositoryError> {
        Self::offline()
    }

    fn groups(&self) -> Result<Vec<ApplicantGroup>, RepositoryError> {
        Self::offline()
    }

    fn group(&self, _id: &GroupId) -> Result<Option<ApplicantGroup>, RepositoryError> {
        Self::offline()
    }

    fn insert_group(&self, _group: ApplicantGroup) -> Result<ApplicantGroup, RepositoryError> {
        Self::offline()
    }

    fn update_group_status(
        &self,
        _id: &GroupId,
        _expected: &GroupStatus,
        _status: GroupStatus,
        _updated_at: DateTime<Utc>,
    ) -> Result<ApplicantGroup, RepositoryError> {
        Self::offline()
    }

    fn delete_group(&self, _id: &GroupId, _expected: &GroupStatus) -> Result<(), RepositoryError> {
        Self::offline()
    }

    fn renewals(&self) -> Result<Vec<LeaseRenewalRecord>, RepositoryError> {
        Self::offline()
    }
}

/// In-memory collaborator whose first single-record lookup parks after
/// reading until the test lets it continue.
pub(super) struct PausedLookupRepository {
    inner: InMemoryLeasingRepository,
    gate: Mutex<Option<(Sender<()>, Receiver<()>)>>,
}

impl PausedLookupRepository {
    /// Returns the repository, a receiver that fires once the first lookup has
    /// read its record, and a sender that releases it.
    pub(super) fn new(inner: InMemoryLeasingRepository) -> (Self, Receiver<()>, Sender<()>) {
        let (read_tx, read_rx) = mpsc::channel();
        let (resume_tx, resume_rx) = mpsc::channel();
        let repository = Self {
            inner,
            gate: Mutex::new(Some((read_tx, resume_rx))),
        };
        (repository, read_rx, resume_tx)
    }

    fn pause_once(&self) {
        let gate = self.gate.lock().expect("gate lock").take();
        if let Some((read, resume)) = gate {
            read.send(()).expect("test waits for the lookup");
            resume.recv().expect("test releases the lookup");
        }
    }
}

impl LeasingRepository for PausedLookupRepository {
    fn applicants(&self) -> Result<Vec<Applicant>, RepositoryError> {
        self.inner.applicants()
    }

    fn applicant(&self, id: &ApplicantId) -> Result<Option<Applicant>, RepositoryError> {
        let found = self.inner.applicant(id);
        self.pause_once();
        found
    }

    fn insert_applicant(&self, applicant: Applicant) -> Result<Applicant, RepositoryError> {
        self.inner.insert_applicant(applicant)
    }

    fn update_applicant_status(
        &self,
        id: &ApplicantId,
        expected: &ApplicantStatus,
        status: ApplicantStatus,
        updated_at: DateTime<Utc>,
    ) -> Result<Applicant, RepositoryError> {
        self.inner
            .update_applicant_status(id, expected, status, updated_at)
    }

    fn delete_applicant(
        &self,
        id: &ApplicantId,
        expected: &ApplicantStatus,
    ) -> Result<(), RepositoryError> {
        self.inner.delete_applicant(id, expected)
    }

    fn groups(&self) -> Result<Vec<ApplicantGroup>, RepositoryError> {
        self.inner.groups()
    }

    fn group(&self, id: &GroupId) -> Result<Option<ApplicantGroup>, RepositoryError> {
        let found = self.inner.group(id);
        self.pause_once();
        found
    }

    fn insert_group(&self, group: ApplicantGroup) -> Result<ApplicantGroup, RepositoryError> {
        self.inner.insert_group(group)
    }

    fn update_group_status(
        &self,
        id: &GroupId,
        expected: &GroupStatus,
        status: GroupStatus,
        updated_at: DateTime<Utc>,
    ) -> Result<ApplicantGroup, RepositoryError> {
        self.inner.update_group_status(id, expected, status, updated_at)
    }

    fn delete_group(&self, id: &GroupId, expected: &GroupStatus) -> Result<(), RepositoryError> {
        self.inner.delete_group(id, expected)
    }

    fn renewals(&self) -> Result<Vec<LeaseRenewalRecord>, RepositoryError> {
        self.inner.renewals()
    }
}
