use std::sync::Arc;

use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    response::{IntoResponse, Response},
    routing::{get, post},
    Json, Router,
};
use serde::Deserialize;
use serde_json::json;

use super::domain::{
    ApplicantId, ApplicantStatus, CallerRole, FacetKey, GroupId, GroupStatus, LeasingInputError,
    NewApplicant, NewApplicantGroup, ProgressBand,
};
use super::filter::{ApplicantCriteria, FilterAxis, GroupCriteria, SearchText};
use super::lifecycle::{ActionKind, RolePolicy};
use super::renewals::{DayBucket, RenewalCriteria};
use super::repository::{LeasingRepository, RepositoryError};
use super::service::{
    ActionOutcome, ApplicantListing, ApplicantRow, GroupListing, GroupRow, LeasingService,
    LeasingServiceError, RenewalListing,
};

/// Role assumed when a request does not name one.
pub const DEFAULT_ROLE: CallerRole = CallerRole::Owner;

/// Router exposing the leasing screens' list, add and lifecycle endpoints.
pub fn leasing_router<R, P>(service: Arc<LeasingService<R, P>>) -> Router
where
    R: LeasingRepository + 'static,
    P: RolePolicy + 'static,
{
    Router::new()
        .route(
            "/api/v1/leasing/applicants",
            get(list_applicants_handler::<R, P>).post(add_applicant_handler::<R, P>),
        )
        .route(
            "/api/v1/leasing/applicants/:applicant_id/actions",
            post(applicant_action_handler::<R, P>),
        )
        .route(
            "/api/v1/leasing/groups",
            get(list_groups_handler::<R, P>).post(add_group_handler::<R, P>),
        )
        .route(
            "/api/v1/leasing/groups/:group_id/actions",
            post(group_action_handler::<R, P>),
        )
        .route(
            "/api/v1/leasing/renewals",
            get(list_renewals_handler::<R, P>),
        )
        .with_state(service)
}

/// Comma-separated multi-select query for the applicants table.
#[derive(Debug, Default, Deserialize)]
pub struct ApplicantQuery {
    pub status: Option<String>,
    pub stage: Option<String>,
    pub property: Option<String>,
    pub q: Option<String>,
    pub role: Option<String>,
}

impl ApplicantQuery {
    pub fn into_criteria(self) -> Result<(ApplicantCriteria, CallerRole), LeasingInputError> {
        let criteria = ApplicantCriteria {
            status: FilterAxis::from_csv(self.status.as_deref(), |raw| {
                Ok::<_, LeasingInputError>(ApplicantStatus::parse(raw))
            })?,
            stage: facet_axis(self.stage.as_deref()),
            property: facet_axis(self.property.as_deref()),
            search: SearchText::from_optional(self.q.as_deref()),
        };
        Ok((criteria, parse_role(self.role.as_deref())?))
    }
}

#[derive(Debug, Default, Deserialize)]
pub struct GroupQuery {
    pub status: Option<String>,
    pub progress: Option<String>,
    pub property: Option<String>,
    pub q: Option<String>,
    pub role: Option<String>,
}

impl GroupQuery {
    pub fn into_criteria(self) -> Result<(GroupCriteria, CallerRole), LeasingInputError> {
        let criteria = GroupCriteria {
            status: FilterAxis::from_csv(self.status.as_deref(), |raw| {
                Ok::<_, LeasingInputError>(GroupStatus::parse(raw))
            })?,
            progress: FilterAxis::from_csv(self.progress.as_deref(), ProgressBand::parse)?,
            property: facet_axis(self.property.as_deref()),
            search: SearchText::from_optional(self.q.as_deref()),
        };
        Ok((criteria, parse_role(self.role.as_deref())?))
    }
}

#[derive(Debug, Default, Deserialize)]
pub struct RenewalQuery {
    pub owner: Option<String>,
    pub bucket: Option<String>,
    pub q: Option<String>,
}

impl RenewalQuery {
    pub fn into_criteria(self) -> Result<RenewalCriteria, LeasingInputError> {
        Ok(RenewalCriteria {
            owner: facet_axis(self.owner.as_deref()),
            buckets: FilterAxis::from_csv(self.bucket.as_deref(), DayBucket::parse)?,
            search: SearchText::from_optional(self.q.as_deref()),
        })
    }
}

/// Body of a lifecycle button click.
#[derive(Debug, Deserialize)]
pub struct ActionRequest {
    pub action: String,
    #[serde(default)]
    pub role: Option<String>,
}

impl ActionRequest {
    fn parse(&self) -> Result<(ActionKind, CallerRole), LeasingInputError> {
        Ok((
            ActionKind::parse(&self.action)?,
            parse_role(self.role.as_deref())?,
        ))
    }
}

fn facet_axis(raw: Option<&str>) -> FilterAxis<FacetKey> {
    raw.map(|raw| {
        raw.split(',')
            .map(str::trim)
            .filter(|part| !part.is_empty())
            .map(FacetKey::new)
            .collect()
    })
    .unwrap_or_default()
}

fn parse_role(raw: Option<&str>) -> Result<CallerRole, LeasingInputError> {
    match raw.map(str::trim).filter(|raw| !raw.is_empty()) {
        Some(raw) => CallerRole::parse(raw),
        None => Ok(DEFAULT_ROLE),
    }
}

pub(crate) async fn list_applicants_handler<R, P>(
    State(service): State<Arc<LeasingService<R, P>>>,
    Query(query): Query<ApplicantQuery>,
) -> Result<Json<ApplicantListing>, LeasingServiceError>
where
    R: LeasingRepository + 'static,
    P: RolePolicy + 'static,
{
    let (criteria, role) = query.into_criteria()?;
    Ok(Json(service.list_applicants(&criteria, role)?))
}

pub(crate) async fn add_applicant_handler<R, P>(
    State(service): State<Arc<LeasingService<R, P>>>,
    Json(payload): Json<NewApplicant>,
) -> Result<Response, LeasingServiceError>
where
    R: LeasingRepository + 'static,
    P: RolePolicy + 'static,
{
    let applicant = service.add_applicant(payload)?;
    let row = ApplicantRow {
        resolution: service.resolver().resolve(&applicant.status, DEFAULT_ROLE),
        applicant,
    };
    Ok((StatusCode::CREATED, Json(row)).into_response())
}

pub(crate) async fn applicant_action_handler<R, P>(
    State(service): State<Arc<LeasingService<R, P>>>,
    Path(applicant_id): Path<String>,
    Json(request): Json<ActionRequest>,
) -> Result<Json<ActionOutcome<ApplicantRow>>, LeasingServiceError>
where
    R: LeasingRepository + 'static,
    P: RolePolicy + 'static,
{
    let (action, role) = request.parse()?;
    let outcome = service.apply_applicant_action(&ApplicantId(applicant_id), action, role)?;
    Ok(Json(outcome))
}

pub(crate) async fn list_groups_handler<R, P>(
    State(service): State<Arc<LeasingService<R, P>>>,
    Query(query): Query<GroupQuery>,
) -> Result<Json<GroupListing>, LeasingServiceError>
where
    R: LeasingRepository + 'static,
    P: RolePolicy + 'static,
{
    let (criteria, role) = query.into_criteria()?;
    Ok(Json(service.list_groups(&criteria, role)?))
}

pub(crate) async fn add_group_handler<R, P>(
    State(service): State<Arc<LeasingService<R, P>>>,
    Json(payload): Json<NewApplicantGroup>,
) -> Result<Response, LeasingServiceError>
where
    R: LeasingRepository + 'static,
    P: RolePolicy + 'static,
{
    let group = service.add_group(payload)?;
    let row = GroupRow {
        resolution: service.resolver().resolve(&group.status, DEFAULT_ROLE),
        group,
    };
    Ok((StatusCode::CREATED, Json(row)).into_response())
}

pub(crate) async fn group_action_handler<R, P>(
    State(service): State<Arc<LeasingService<R, P>>>,
    Path(group_id): Path<String>,
    Json(request): Json<ActionRequest>,
) -> Result<Json<ActionOutcome<GroupRow>>, LeasingServiceError>
where
    R: LeasingRepository + 'static,
    P: RolePolicy + 'static,
{
    let (action, role) = request.parse()?;
    let outcome = service.apply_group_action(&GroupId(group_id), action, role)?;
    Ok(Json(outcome))
}

pub(crate) async fn list_renewals_handler<R, P>(
    State(service): State<Arc<LeasingService<R, P>>>,
    Query(query): Query<RenewalQuery>,
) -> Result<Json<RenewalListing>, LeasingServiceError>
where
    R: LeasingRepository + 'static,
    P: RolePolicy + 'static,
{
    let criteria = query.into_criteria()?;
    Ok(Json(service.list_renewals(&criteria)?))
}

impl LeasingServiceError {
    pub fn status_code(&self) -> StatusCode {
        match self {
            Self::NotFound { .. } | Self::Repository(RepositoryError::NotFound) => {
                StatusCode::NOT_FOUND
            }
            Self::ActionNotPermitted { .. }
            | Self::Repository(RepositoryError::Conflict)
            | Self::Repository(RepositoryError::StatusChanged { .. }) => StatusCode::CONFLICT,
            Self::Input(_) => StatusCode::BAD_REQUEST,
            Self::Repository(RepositoryError::Unavailable(_)) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}

impl IntoResponse for LeasingServiceError {
    fn into_response(self) -> Response {
        let status = self.status_code();
        let body = Json(json!({ "error": self.to_string() }));
        (status, body).into_response()
    }
}
