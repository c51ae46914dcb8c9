use std::cmp::Ordering;
use std::fmt;
use std::hash::{Hash, Hasher};

use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};

/// Collapse casing and separator noise into a comparison key.
///
/// `Lease Created`, `lease_created` and ` LEASE-CREATED ` all become
/// `lease-created`. Every vocabulary in this module compares through this key
/// so stored values and filter values agree no matter how either was typed.
pub fn normalize_key(value: &str) -> String {
    let mut key = String::with_capacity(value.len());
    let mut separator = false;

    for ch in value.trim().chars() {
        if ch.is_whitespace() || ch == '-' || ch == '_' {
            separator = !key.is_empty();
            continue;
        }
        if separator {
            key.push('-');
            separator = false;
        }
        key.extend(ch.to_lowercase());
    }

    key
}

/// Identifier wrapper for individual applicants.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct ApplicantId(pub String);

/// Identifier wrapper for applicant groups.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct GroupId(pub String);

/// Identifier wrapper for lease renewal rows.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct RenewalId(pub String);

/// Which lifecycle vocabulary an entity follows.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum EntityKind {
    Individual,
    Group,
}

impl EntityKind {
    pub const fn label(self) -> &'static str {
        match self {
            Self::Individual => "applicant",
            Self::Group => "applicant group",
        }
    }
}

impl fmt::Display for EntityKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

/// Role of the user acting in the console.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub enum CallerRole {
    Owner,
    Agent,
    Tenant,
    Vendor,
}

impl CallerRole {
    pub const fn ordered() -> [Self; 4] {
        [Self::Owner, Self::Agent, Self::Tenant, Self::Vendor]
    }

    pub const fn label(self) -> &'static str {
        match self {
            Self::Owner => "OWNER",
            Self::Agent => "AGENT",
            Self::Tenant => "TENANT",
            Self::Vendor => "VENDOR",
        }
    }

    pub fn parse(raw: &str) -> Result<Self, LeasingInputError> {
        match normalize_key(raw).as_str() {
            "owner" => Ok(Self::Owner),
            "agent" => Ok(Self::Agent),
            "tenant" => Ok(Self::Tenant),
            "vendor" => Ok(Self::Vendor),
            _ => Err(LeasingInputError::UnknownRole(raw.trim().to_string())),
        }
    }
}

impl TryFrom<String> for CallerRole {
    type Error = LeasingInputError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        Self::parse(&value)
    }
}

impl From<CallerRole> for String {
    fn from(value: CallerRole) -> Self {
        value.label().to_string()
    }
}

/// Rejected boundary input. Raised while parsing query strings, request bodies
/// and CLI flags, never by the engines themselves.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum LeasingInputError {
    #[error("unknown caller role '{0}' (expected OWNER, AGENT, TENANT or VENDOR)")]
    UnknownRole(String),
    #[error("unknown lifecycle action '{0}' (expected approve, reject or delete)")]
    UnknownAction(String),
    #[error("unknown renewal bucket '{0}'")]
    UnknownBucket(String),
    #[error("unknown progress band '{0}' (expected not-started, in-progress or complete)")]
    UnknownProgressBand(String),
    #[error("{field} must not be blank")]
    Blank { field: &'static str },
}

/// Status text outside every known vocabulary, kept as supplied.
///
/// Only the status parsers build one, so it never spells a known status and
/// equality by key agrees with the lifecycle tables.
#[derive(Debug, Clone)]
pub struct UnknownStatus(String);

impl UnknownStatus {
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

/// Status of an individual rental application.
///
/// Text that matches none of the known statuses is kept verbatim in `Other`
/// and treated as actionable.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(from = "String", into = "String")]
pub enum ApplicantStatus {
    Pending,
    UnderReview,
    Approved,
    Rejected,
    LeaseCreated,
    Other(UnknownStatus),
}

impl ApplicantStatus {
    pub fn parse(raw: &str) -> Self {
        match normalize_key(raw).as_str() {
            "pending" => Self::Pending,
            "under-review" => Self::UnderReview,
            "approved" => Self::Approved,
            "rejected" => Self::Rejected,
            "lease-created" => Self::LeaseCreated,
            _ => Self::Other(UnknownStatus(raw.trim().to_string())),
        }
    }

    pub fn label(&self) -> &str {
        match self {
            Self::Pending => "Pending",
            Self::UnderReview => "Under Review",
            Self::Approved => "Approved",
            Self::Rejected => "Rejected",
            Self::LeaseCreated => "Lease Created",
            Self::Other(raw) => raw.as_str(),
        }
    }

    pub fn key(&self) -> String {
        normalize_key(self.label())
    }
}

impl From<String> for ApplicantStatus {
    fn from(value: String) -> Self {
        Self::parse(&value)
    }
}

impl From<&str> for ApplicantStatus {
    fn from(value: &str) -> Self {
        Self::parse(value)
    }
}

impl From<ApplicantStatus> for String {
    fn from(value: ApplicantStatus) -> Self {
        value.label().to_string()
    }
}

/// Status of an applicant group. Disjoint from [`ApplicantStatus`].
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(from = "String", into = "String")]
pub enum GroupStatus {
    Pending,
    Active,
    Inactive,
    Other(UnknownStatus),
}

impl GroupStatus {
    pub fn parse(raw: &str) -> Self {
        match normalize_key(raw).as_str() {
            "pending" => Self::Pending,
            "active" => Self::Active,
            "inactive" => Self::Inactive,
            _ => Self::Other(UnknownStatus(raw.trim().to_string())),
        }
    }

    pub fn label(&self) -> &str {
        match self {
            Self::Pending => "Pending",
            Self::Active => "Active",
            Self::Inactive => "Inactive",
            Self::Other(raw) => raw.as_str(),
        }
    }

    pub fn key(&self) -> String {
        normalize_key(self.label())
    }
}

impl From<String> for GroupStatus {
    fn from(value: String) -> Self {
        Self::parse(&value)
    }
}

impl From<&str> for GroupStatus {
    fn from(value: &str) -> Self {
        Self::parse(value)
    }
}

impl From<GroupStatus> for String {
    fn from(value: GroupStatus) -> Self {
        value.label().to_string()
    }
}

macro_rules! compare_by_key {
    ($($ty:ty),+ $(,)?) => {
        $(
            impl PartialEq for $ty {
                fn eq(&self, other: &Self) -> bool {
                    self.key() == other.key()
                }
            }

            impl Eq for $ty {}

            impl Hash for $ty {
                fn hash<H: Hasher>(&self, state: &mut H) {
                    self.key().hash(state);
                }
            }

            impl PartialOrd for $ty {
                fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
                    Some(self.cmp(other))
                }
            }

            impl Ord for $ty {
                fn cmp(&self, other: &Self) -> Ordering {
                    self.key().cmp(&other.key())
                }
            }
        )+
    };
}

compare_by_key!(ApplicantStatus, GroupStatus, FacetKey);

/// Free-text facet value (stage, property, rental owner) that keeps the label
/// it was first seen with but compares by its normalized key.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(from = "String", into = "String")]
pub struct FacetKey {
    label: String,
}

impl FacetKey {
    pub fn new(label: impl Into<String>) -> Self {
        let label = label.into();
        Self {
            label: label.trim().to_string(),
        }
    }

    pub fn label(&self) -> &str {
        &self.label
    }

    pub fn key(&self) -> String {
        normalize_key(&self.label)
    }

    pub fn is_blank(&self) -> bool {
        self.label.is_empty()
    }
}

impl From<String> for FacetKey {
    fn from(value: String) -> Self {
        Self::new(value)
    }
}

impl From<&str> for FacetKey {
    fn from(value: &str) -> Self {
        Self::new(value)
    }
}

impl From<FacetKey> for String {
    fn from(value: FacetKey) -> Self {
        value.label
    }
}

impl fmt::Display for FacetKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.label)
    }
}

/// An individual rental application tracked through review.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Applicant {
    pub id: ApplicantId,
    pub name: String,
    #[serde(default)]
    pub email: String,
    #[serde(default)]
    pub phone: String,
    pub property: FacetKey,
    #[serde(alias = "applicationStatus")]
    pub status: ApplicantStatus,
    #[serde(default, alias = "stageInProcess")]
    pub stage_in_process: FacetKey,
    #[serde(alias = "applicationDate")]
    pub application_date: NaiveDate,
    #[serde(alias = "updatedAt")]
    pub updated_at: DateTime<Utc>,
}

/// Payload for the "add applicant" command.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct NewApplicant {
    pub name: String,
    #[serde(default)]
    pub email: String,
    #[serde(default)]
    pub phone: String,
    pub property: FacetKey,
    #[serde(default, alias = "applicationStatus")]
    pub status: Option<ApplicantStatus>,
    #[serde(default, alias = "stageInProcess")]
    pub stage_in_process: Option<FacetKey>,
    #[serde(default, alias = "applicationDate")]
    pub application_date: Option<NaiveDate>,
}

/// Co-applicants progressing through leasing together.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ApplicantGroup {
    pub id: GroupId,
    pub name: String,
    #[serde(default)]
    pub members: Vec<String>,
    pub property: FacetKey,
    #[serde(default)]
    pub unit: String,
    pub status: GroupStatus,
    #[serde(default, alias = "percentComplete")]
    pub percent_complete: u8,
    #[serde(alias = "lastUpdated")]
    pub last_updated: DateTime<Utc>,
}

impl ApplicantGroup {
    pub fn progress_band(&self) -> ProgressBand {
        ProgressBand::from_percent(self.percent_complete)
    }
}

/// Payload for the "add applicant group" command.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct NewApplicantGroup {
    pub name: String,
    #[serde(default)]
    pub members: Vec<String>,
    pub property: FacetKey,
    #[serde(default)]
    pub unit: String,
    #[serde(default)]
    pub status: Option<GroupStatus>,
    #[serde(default, alias = "percentComplete")]
    pub percent_complete: u8,
}

/// Coarse progress slice over a group's `percent_complete`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum ProgressBand {
    NotStarted,
    InProgress,
    Complete,
}

impl ProgressBand {
    pub const fn from_percent(percent: u8) -> Self {
        match percent {
            0 => Self::NotStarted,
            1..=99 => Self::InProgress,
            _ => Self::Complete,
        }
    }

    pub const fn id(self) -> &'static str {
        match self {
            Self::NotStarted => "not-started",
            Self::InProgress => "in-progress",
            Self::Complete => "complete",
        }
    }

    pub fn parse(raw: &str) -> Result<Self, LeasingInputError> {
        match normalize_key(raw).as_str() {
            "not-started" => Ok(Self::NotStarted),
            "in-progress" => Ok(Self::InProgress),
            "complete" | "completed" => Ok(Self::Complete),
            _ => Err(LeasingInputError::UnknownProgressBand(raw.trim().to_string())),
        }
    }
}
