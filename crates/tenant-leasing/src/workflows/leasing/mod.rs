//! Leasing applicant and group lifecycle rules, plus the filter and bucket
//! engine behind the applicants, groups and lease renewal tables.

pub mod domain;
pub mod filter;
pub mod lifecycle;
pub mod memory;
pub mod renewals;
pub mod repository;
pub mod router;
pub mod seed;
pub mod service;

#[cfg(test)]
mod tests;

pub use domain::{
    normalize_key, Applicant, ApplicantGroup, ApplicantId, ApplicantStatus, CallerRole,
    EntityKind, FacetKey, GroupId, GroupStatus, LeasingInputError, NewApplicant,
    NewApplicantGroup, ProgressBand, RenewalId, UnknownStatus,
};
pub use filter::{apply, ApplicantCriteria, Criteria, FilterAxis, GroupCriteria, SearchText};
pub use lifecycle::{
    ActionKind, LifecycleAction, LifecycleResolver, LifecycleStatus, OpenRolePolicy, Resolution,
    RolePolicy,
};
pub use memory::InMemoryLeasingRepository;
pub use renewals::{
    bucket_counts, days_left_between, BucketCount, DayBucket, LeaseRenewalRecord,
    RenewalCriteria,
};
pub use repository::{LeasingRepository, RepositoryError};
pub use router::{leasing_router, ActionRequest, ApplicantQuery, GroupQuery, RenewalQuery};
pub use seed::{LeasingSeed, SeedError};
pub use service::{
    ActionOutcome, ApplicantListing, ApplicantRow, GroupListing, GroupRow, LeasingService,
    LeasingServiceError, RenewalListing,
};
