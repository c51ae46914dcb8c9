use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;

use chrono::Utc;
use serde::Serialize;
use tracing::{debug, info, warn};

use super::domain::{
    Applicant, ApplicantGroup, ApplicantId, ApplicantStatus, CallerRole, EntityKind, GroupId,
    GroupStatus, LeasingInputError, NewApplicant, NewApplicantGroup,
};
use super::filter::{self, ApplicantCriteria, Criteria, GroupCriteria};
use super::lifecycle::{
    ActionKind, LifecycleResolver, LifecycleStatus, OpenRolePolicy, Resolution, RolePolicy,
};
use super::renewals::{bucket_counts, BucketCount, LeaseRenewalRecord, RenewalCriteria};
use super::repository::{LeasingRepository, RepositoryError};

/// Hands out `{prefix}-000001`, `{prefix}-000002`, ... for one service.
#[derive(Debug)]
struct IdSequence {
    prefix: &'static str,
    next: AtomicU64,
}

impl IdSequence {
    const fn new(prefix: &'static str) -> Self {
        Self {
            prefix,
            next: AtomicU64::new(1),
        }
    }

    fn next(&self) -> String {
        let id = self.next.fetch_add(1, Ordering::Relaxed);
        format!("{}-{id:06}", self.prefix)
    }

    /// Move the sequence beyond every `{prefix}-N` id already in use.
    fn skip_past<'a>(&self, taken: impl IntoIterator<Item = &'a str>) {
        let highest = taken
            .into_iter()
            .filter_map(|id| id.strip_prefix(self.prefix)?.strip_prefix('-'))
            .filter_map(|suffix| suffix.parse::<u64>().ok())
            .max();
        if let Some(highest) = highest {
            self.next.fetch_max(highest.saturating_add(1), Ordering::Relaxed);
        }
    }
}

const INSERT_ATTEMPTS: usize = 3;

/// An applicant together with what the caller may do with it.
#[derive(Debug, Clone, Serialize)]
pub struct ApplicantRow {
    #[serde(flatten)]
    pub applicant: Applicant,
    pub resolution: Resolution,
}

#[derive(Debug, Clone, Serialize)]
pub struct ApplicantListing {
    pub matches: usize,
    pub total: usize,
    pub applicants: Vec<ApplicantRow>,
}

#[derive(Debug, Clone, Serialize)]
pub struct GroupRow {
    #[serde(flatten)]
    pub group: ApplicantGroup,
    pub resolution: Resolution,
}

#[derive(Debug, Clone, Serialize)]
pub struct GroupListing {
    pub matches: usize,
    pub total: usize,
    pub groups: Vec<GroupRow>,
}

#[derive(Debug, Clone, Serialize)]
pub struct RenewalListing {
    pub matches: usize,
    pub total: usize,
    /// Counts across the unfiltered collection.
    pub buckets: Vec<BucketCount>,
    pub renewals: Vec<LeaseRenewalRecord>,
}

/// Result of a lifecycle command; `record` is absent after a delete.
#[derive(Debug, Clone, Serialize)]
pub struct ActionOutcome<T> {
    pub action: ActionKind,
    pub entity_id: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub record: Option<T>,
}

/// Binds the filter engine and lifecycle resolver to the leasing collaborator.
pub struct LeasingService<R, P = OpenRolePolicy> {
    repository: Arc<R>,
    resolver: LifecycleResolver<P>,
    applicant_ids: IdSequence,
    group_ids: IdSequence,
}

impl<R> LeasingService<R>
where
    R: LeasingRepository + 'static,
{
    pub fn new(repository: Arc<R>) -> Self {
        Self::with_policy(repository, OpenRolePolicy)
    }
}

impl<R, P> LeasingService<R, P>
where
    R: LeasingRepository + 'static,
    P: RolePolicy + 'static,
{
    pub fn with_policy(repository: Arc<R>, policy: P) -> Self {
        Self {
            repository,
            resolver: LifecycleResolver::with_policy(policy),
            applicant_ids: IdSequence::new("app"),
            group_ids: IdSequence::new("grp"),
        }
    }

    pub fn resolver(&self) -> &LifecycleResolver<P> {
        &self.resolver
    }

    pub fn list_applicants(
        &self,
        criteria: &ApplicantCriteria,
        role: CallerRole,
    ) -> Result<ApplicantListing, LeasingServiceError> {
        let applicants = self.repository.applicants()?;
        let matched = filter::apply(&applicants, criteria);
        debug!(
            total = applicants.len(),
            matches = matched.len(),
            filtered = criteria.is_active(),
            "evaluated applicant filters"
        );

        let rows: Vec<ApplicantRow> = matched
            .into_iter()
            .map(|applicant| self.applicant_row(applicant.clone(), role))
            .collect();

        Ok(ApplicantListing {
            matches: rows.len(),
            total: applicants.len(),
            applicants: rows,
        })
    }

    pub fn list_groups(
        &self,
        criteria: &GroupCriteria,
        role: CallerRole,
    ) -> Result<GroupListing, LeasingServiceError> {
        let groups = self.repository.groups()?;
        let matched = filter::apply(&groups, criteria);
        debug!(
            total = groups.len(),
            matches = matched.len(),
            filtered = criteria.is_active(),
            "evaluated applicant group filters"
        );

        let rows: Vec<GroupRow> = matched
            .into_iter()
            .map(|group| self.group_row(group.clone(), role))
            .collect();

        Ok(GroupListing {
            matches: rows.len(),
            total: groups.len(),
            groups: rows,
        })
    }

    pub fn list_renewals(
        &self,
        criteria: &RenewalCriteria,
    ) -> Result<RenewalListing, LeasingServiceError> {
        let renewals = self.repository.renewals()?;
        let buckets = bucket_counts(&renewals);
        let matched: Vec<LeaseRenewalRecord> = filter::apply(&renewals, criteria)
            .into_iter()
            .cloned()
            .collect();
        debug!(
            total = renewals.len(),
            matches = matched.len(),
            filtered = criteria.is_active(),
            "evaluated renewal filters"
        );

        Ok(RenewalListing {
            matches: matched.len(),
            total: renewals.len(),
            buckets,
            renewals: matched,
        })
    }

    pub fn add_applicant(&self, new: NewApplicant) -> Result<Applicant, LeasingServiceError> {
        if new.name.trim().is_empty() {
            return Err(LeasingInputError::Blank { field: "name" }.into());
        }
        if new.property.is_blank() {
            return Err(LeasingInputError::Blank { field: "property" }.into());
        }

        let now = Utc::now();
        let draft = Applicant {
            id: ApplicantId(String::new()),
            name: new.name.trim().to_string(),
            email: new.email.trim().to_string(),
            phone: new.phone.trim().to_string(),
            property: new.property,
            status: new.status.unwrap_or(ApplicantStatus::Pending),
            stage_in_process: new.stage_in_process.unwrap_or_default(),
            application_date: new.application_date.unwrap_or_else(|| now.date_naive()),
            updated_at: now,
        };

        let stored = insert_with_fresh_id(
            &self.applicant_ids,
            |id| {
                self.repository.insert_applicant(Applicant {
                    id: ApplicantId(id),
                    ..draft.clone()
                })
            },
            || {
                Ok(self
                    .repository
                    .applicants()?
                    .into_iter()
                    .map(|applicant| applicant.id.0)
                    .collect())
            },
        )?;
        info!(applicant_id = %stored.id.0, status = stored.status.label(), "applicant added");
        Ok(stored)
    }

    pub fn add_group(&self, new: NewApplicantGroup) -> Result<ApplicantGroup, LeasingServiceError> {
        if new.name.trim().is_empty() {
            return Err(LeasingInputError::Blank { field: "name" }.into());
        }
        if new.property.is_blank() {
            return Err(LeasingInputError::Blank { field: "property" }.into());
        }

        let draft = ApplicantGroup {
            id: GroupId(String::new()),
            name: new.name.trim().to_string(),
            members: new.members,
            property: new.property,
            unit: new.unit.trim().to_string(),
            status: new.status.unwrap_or(GroupStatus::Pending),
            percent_complete: new.percent_complete.min(100),
            last_updated: Utc::now(),
        };

        let stored = insert_with_fresh_id(
            &self.group_ids,
            |id| {
                self.repository.insert_group(ApplicantGroup {
                    id: GroupId(id),
                    ..draft.clone()
                })
            },
            || {
                Ok(self
                    .repository
                    .groups()?
                    .into_iter()
                    .map(|group| group.id.0)
                    .collect())
            },
        )?;
        info!(group_id = %stored.id.0, status = stored.status.label(), "applicant group added");
        Ok(stored)
    }

    /// Re-validate `action` against the stored status, then issue the command.
    pub fn apply_applicant_action(
        &self,
        id: &ApplicantId,
        action: ActionKind,
        role: CallerRole,
    ) -> Result<ActionOutcome<ApplicantRow>, LeasingServiceError> {
        let current = self
            .repository
            .applicant(id)?
            .ok_or_else(|| LeasingServiceError::not_found(EntityKind::Individual, &id.0))?;

        self.ensure_permitted(&current.status, action, role, &id.0)?;

        let record = match ApplicantStatus::target(action) {
            Some(target) => {
                let updated = self
                    .repository
                    .update_applicant_status(id, &current.status, target, Utc::now())
                    .map_err(|err| self.mutation_failed::<ApplicantStatus>(err, &id.0, action))?;
                Some(self.applicant_row(updated, role))
            }
            None => {
                self.repository
                    .delete_applicant(id, &current.status)
                    .map_err(|err| self.mutation_failed::<ApplicantStatus>(err, &id.0, action))?;
                None
            }
        };

        info!(
            applicant_id = %id.0,
            %action,
            from = current.status.label(),
            role = role.label(),
            "applicant lifecycle action applied"
        );

        Ok(ActionOutcome {
            action,
            entity_id: id.0.clone(),
            record,
        })
    }

    pub fn apply_group_action(
        &self,
        id: &GroupId,
        action: ActionKind,
        role: CallerRole,
    ) -> Result<ActionOutcome<GroupRow>, LeasingServiceError> {
        let current = self
            .repository
            .group(id)?
            .ok_or_else(|| LeasingServiceError::not_found(EntityKind::Group, &id.0))?;

        self.ensure_permitted(&current.status, action, role, &id.0)?;

        let record = match GroupStatus::target(action) {
            Some(target) => {
                let updated = self
                    .repository
                    .update_group_status(id, &current.status, target, Utc::now())
                    .map_err(|err| self.mutation_failed::<GroupStatus>(err, &id.0, action))?;
                Some(self.group_row(updated, role))
            }
            None => {
                self.repository
                    .delete_group(id, &current.status)
                    .map_err(|err| self.mutation_failed::<GroupStatus>(err, &id.0, action))?;
                None
            }
        };

        info!(
            group_id = %id.0,
            %action,
            from = current.status.label(),
            role = role.label(),
            "applicant group lifecycle action applied"
        );

        Ok(ActionOutcome {
            action,
            entity_id: id.0.clone(),
            record,
        })
    }

    fn ensure_permitted<S: LifecycleStatus>(
        &self,
        status: &S,
        action: ActionKind,
        role: CallerRole,
        id: &str,
    ) -> Result<(), LeasingServiceError> {
        if self.resolver.permits(status, action, role) {
            return Ok(());
        }

        warn!(
            entity = %S::ENTITY,
            id,
            %action,
            status = status.display(),
            role = role.label(),
            "lifecycle action refused"
        );
        Err(LeasingServiceError::ActionNotPermitted {
            entity: S::ENTITY,
            id: id.to_string(),
            action,
            status: status.display().to_string(),
        })
    }

    /// A status that moved between validation and mutation refuses the action
    /// the same way a stale button would.
    fn mutation_failed<S: LifecycleStatus>(
        &self,
        err: RepositoryError,
        id: &str,
        action: ActionKind,
    ) -> LeasingServiceError {
        match err {
            RepositoryError::StatusChanged { current } => {
                warn!(
                    entity = %S::ENTITY,
                    id,
                    %action,
                    status = %current,
                    "lifecycle action lost a race with a concurrent change"
                );
                LeasingServiceError::ActionNotPermitted {
                    entity: S::ENTITY,
                    id: id.to_string(),
                    action,
                    status: current,
                }
            }
            other => other.into(),
        }
    }

    fn applicant_row(&self, applicant: Applicant, role: CallerRole) -> ApplicantRow {
        let resolution = self.resolver.resolve(&applicant.status, role);
        ApplicantRow {
            applicant,
            resolution,
        }
    }

    fn group_row(&self, group: ApplicantGroup, role: CallerRole) -> GroupRow {
        let resolution = self.resolver.resolve(&group.status, role);
        GroupRow { group, resolution }
    }
}

/// Insert under the next free id, skipping past ids the collaborator already holds.
fn insert_with_fresh_id<T>(
    ids: &IdSequence,
    insert: impl Fn(String) -> Result<T, RepositoryError>,
    taken: impl Fn() -> Result<Vec<String>, RepositoryError>,
) -> Result<T, RepositoryError> {
    let mut attempts = 1;
    loop {
        match insert(ids.next()) {
            Err(RepositoryError::Conflict) if attempts < INSERT_ATTEMPTS => {
                attempts += 1;
                let taken = taken()?;
                ids.skip_past(taken.iter().map(String::as_str));
            }
            result => return result,
        }
    }
}

#[derive(Debug, thiserror::Error)]
pub enum LeasingServiceError {
    #[error("{entity} {id} not found")]
    NotFound { entity: EntityKind, id: String },
    #[error("{action} is not available for {entity} {id} in status '{status}'")]
    ActionNotPermitted {
        entity: EntityKind,
        id: String,
        action: ActionKind,
        status: String,
    },
    #[error(transparent)]
    Input(#[from] LeasingInputError),
    #[error(transparent)]
    Repository(#[from] RepositoryError),
}

impl LeasingServiceError {
    fn not_found(entity: EntityKind, id: &str) -> Self {
        Self::NotFound {
            entity,
            id: id.to_string(),
        }
    }
}
