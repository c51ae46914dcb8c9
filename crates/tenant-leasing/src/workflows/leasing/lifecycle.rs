//! Decides which lifecycle actions an applicant or applicant group offers.
//!
//! Resolution is a pure function of the entity's status and the caller's role.
//! Terminal statuses short-circuit to a display badge; every other status,
//! including ones the vocabulary does not recognise, walks the transition
//! table in the fixed order Approve, Reject, Delete.

use std::fmt;

use serde::{Deserialize, Serialize};

use super::domain::{
    normalize_key, ApplicantStatus, CallerRole, EntityKind, GroupStatus, LeasingInputError,
};

/// Command a reviewer can issue against an applicant or group.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ActionKind {
    Approve,
    Reject,
    Delete,
}

impl ActionKind {
    pub const fn ordered() -> [Self; 3] {
        [Self::Approve, Self::Reject, Self::Delete]
    }

    pub const fn label(self) -> &'static str {
        match self {
            Self::Approve => "Approve",
            Self::Reject => "Reject",
            Self::Delete => "Delete",
        }
    }

    pub const fn icon(self) -> &'static str {
        match self {
            Self::Approve => "check",
            Self::Reject => "x",
            Self::Delete => "trash",
        }
    }

    pub fn parse(raw: &str) -> Result<Self, LeasingInputError> {
        match normalize_key(raw).as_str() {
            "approve" => Ok(Self::Approve),
            "reject" => Ok(Self::Reject),
            "delete" => Ok(Self::Delete),
            _ => Err(LeasingInputError::UnknownAction(raw.trim().to_string())),
        }
    }
}

impl fmt::Display for ActionKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

/// One renderable action button.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct LifecycleAction {
    pub kind: ActionKind,
    pub label: &'static str,
    pub icon: &'static str,
    /// Status the entity moves to; `None` for deletes.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub target_status: Option<String>,
}

/// What the caller should render for an entity.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum Resolution {
    Actions { actions: Vec<LifecycleAction> },
    Badge { label: &'static str },
    NoActions,
}

impl Resolution {
    pub fn actions(&self) -> &[LifecycleAction] {
        match self {
            Self::Actions { actions } => actions,
            Self::Badge { .. } | Self::NoActions => &[],
        }
    }

    pub fn kinds(&self) -> Vec<ActionKind> {
        self.actions().iter().map(|action| action.kind).collect()
    }

    pub fn offers(&self, kind: ActionKind) -> bool {
        self.actions().iter().any(|action| action.kind == kind)
    }

    pub const fn badge(&self) -> Option<&'static str> {
        match self {
            Self::Badge { label } => Some(*label),
            Self::Actions { .. } | Self::NoActions => None,
        }
    }
}

/// Transition table for one entity vocabulary.
pub trait LifecycleStatus: Sized {
    const ENTITY: EntityKind;

    /// Badge shown instead of actions once the status is terminal.
    fn terminal_badge(&self) -> Option<&'static str>;

    /// Whether the status alone allows `action`.
    fn allows(&self, action: ActionKind) -> bool;

    /// Status an entity lands in after `action`, if the action changes status.
    fn target(action: ActionKind) -> Option<Self>;

    fn display(&self) -> &str;
}

impl LifecycleStatus for ApplicantStatus {
    const ENTITY: EntityKind = EntityKind::Individual;

    fn terminal_badge(&self) -> Option<&'static str> {
        match self {
            Self::Approved => Some("Final"),
            Self::LeaseCreated => Some("Lease Created"),
            _ => None,
        }
    }

    fn allows(&self, action: ActionKind) -> bool {
        match action {
            ActionKind::Approve => !matches!(self, Self::Approved | Self::LeaseCreated),
            ActionKind::Reject => {
                !matches!(self, Self::Rejected | Self::Approved | Self::LeaseCreated)
            }
            ActionKind::Delete => !matches!(self, Self::LeaseCreated),
        }
    }

    fn target(action: ActionKind) -> Option<Self> {
        match action {
            ActionKind::Approve => Some(Self::Approved),
            ActionKind::Reject => Some(Self::Rejected),
            ActionKind::Delete => None,
        }
    }

    fn display(&self) -> &str {
        self.label()
    }
}

impl LifecycleStatus for GroupStatus {
    const ENTITY: EntityKind = EntityKind::Group;

    fn terminal_badge(&self) -> Option<&'static str> {
        match self {
            Self::Active => Some("Active"),
            _ => None,
        }
    }

    fn allows(&self, action: ActionKind) -> bool {
        match action {
            ActionKind::Approve => !matches!(self, Self::Active),
            ActionKind::Reject => !matches!(self, Self::Inactive | Self::Active),
            ActionKind::Delete => true,
        }
    }

    fn target(action: ActionKind) -> Option<Self> {
        match action {
            ActionKind::Approve => Some(Self::Active),
            ActionKind::Reject => Some(Self::Inactive),
            ActionKind::Delete => None,
        }
    }

    fn display(&self) -> &str {
        self.label()
    }
}

/// Hook for restricting actions by the acting user's role.
pub trait RolePolicy: Send + Sync {
    fn allows(&self, role: CallerRole, entity: EntityKind, action: ActionKind) -> bool;
}

/// Every role sees every action the status allows.
#[derive(Debug, Clone, Copy, Default)]
pub struct OpenRolePolicy;

impl RolePolicy for OpenRolePolicy {
    fn allows(&self, _role: CallerRole, _entity: EntityKind, _action: ActionKind) -> bool {
        true
    }
}

impl<F> RolePolicy for F
where
    F: Fn(CallerRole, EntityKind, ActionKind) -> bool + Send + Sync,
{
    fn allows(&self, role: CallerRole, entity: EntityKind, action: ActionKind) -> bool {
        self(role, entity, action)
    }
}

#[derive(Debug, Clone, Default)]
pub struct LifecycleResolver<P = OpenRolePolicy> {
    policy: P,
}

impl LifecycleResolver {
    pub fn new() -> Self {
        Self::default()
    }
}

impl<P: RolePolicy> LifecycleResolver<P> {
    pub fn with_policy(policy: P) -> Self {
        Self { policy }
    }

    pub fn resolve<S: LifecycleStatus>(&self, status: &S, role: CallerRole) -> Resolution {
        if let Some(label) = status.terminal_badge() {
            return Resolution::Badge { label };
        }

        let actions: Vec<LifecycleAction> = ActionKind::ordered()
            .into_iter()
            .filter(|action| self.admits(status, *action, role))
            .map(|action| LifecycleAction {
                kind: action,
                label: action.label(),
                icon: action.icon(),
                target_status: S::target(action).map(|target| target.display().to_string()),
            })
            .collect();

        if actions.is_empty() {
            Resolution::NoActions
        } else {
            Resolution::Actions { actions }
        }
    }

    /// Resolve straight from the collaborator's free-text status.
    pub fn resolve_raw(&self, entity: EntityKind, status: &str, role: CallerRole) -> Resolution {
        match entity {
            EntityKind::Individual => self.resolve(&ApplicantStatus::parse(status), role),
            EntityKind::Group => self.resolve(&GroupStatus::parse(status), role),
        }
    }

    /// Re-check a requested action before any mutation is issued.
    pub fn permits<S: LifecycleStatus>(
        &self,
        status: &S,
        action: ActionKind,
        role: CallerRole,
    ) -> bool {
        status.terminal_badge().is_none() && self.admits(status, action, role)
    }

    fn admits<S: LifecycleStatus>(&self, status: &S, action: ActionKind, role: CallerRole) -> bool {
        status.allows(action) && self.policy.allows(role, S::ENTITY, action)
    }
}
