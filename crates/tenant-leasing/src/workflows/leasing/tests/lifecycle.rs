use crate::workflows::leasing::domain::{ApplicantStatus, CallerRole, EntityKind, GroupStatus};
use crate::workflows::leasing::lifecycle::{
    ActionKind, LifecycleResolver, OpenRolePolicy, Resolution, RolePolicy,
};

use ActionKind::{Approve, Delete, Reject};

fn resolver() -> LifecycleResolver {
    LifecycleResolver::new()
}

fn applicant_resolution(status: &str) -> Resolution {
    resolver().resolve(&ApplicantStatus::parse(status), CallerRole::Agent)
}

fn group_resolution(status: &str) -> Resolution {
    resolver().resolve(&GroupStatus::parse(status), CallerRole::Agent)
}

#[test]
fn approve_offered_for_every_non_terminal_applicant_status() {
    for status in ["Pending", "under review", "REJECTED", "Rejected", "Waiting on docs", ""] {
        let resolution = applicant_resolution(status);
        assert!(resolution.offers(Approve), "approve missing for '{status}'");
    }
}

#[test]
fn reject_absent_for_rejected_and_terminal_applicants() {
    for status in [
        "rejected",
        "Rejected",
        "APPROVED",
        "approved",
        "Lease Created",
        "lease created",
    ] {
        let resolution = applicant_resolution(status);
        assert!(!resolution.offers(Reject), "reject offered for '{status}'");
    }
}

#[test]
fn lease_created_shows_badge_regardless_of_case() {
    for status in ["Lease Created", "lease created", "LEASE CREATED", "lease_created"] {
        let resolution = applicant_resolution(status);
        assert_eq!(resolution.badge(), Some("Lease Created"));
        assert!(resolution.actions().is_empty());
    }
}

#[test]
fn approved_shows_final_badge() {
    let resolution = applicant_resolution("Approved");
    assert_eq!(resolution, Resolution::Badge { label: "Final" });
    assert!(resolution.kinds().is_empty());
}

#[test]
fn applicant_examples_resolve_in_fixed_order() {
    let pending = applicant_resolution("Pending");
    let approved = applicant_resolution("Approved");
    let lease_created = applicant_resolution("Lease Created");

    assert_eq!(pending.kinds(), vec![Approve, Reject, Delete]);
    assert_eq!(approved.kinds(), Vec::<ActionKind>::new());
    assert_eq!(approved.badge(), Some("Final"));
    assert_eq!(lease_created.kinds(), Vec::<ActionKind>::new());
    assert_eq!(lease_created.badge(), Some("Lease Created"));
}

#[test]
fn rejected_applicant_can_still_be_approved_or_deleted() {
    assert_eq!(applicant_resolution("Rejected").kinds(), vec![Approve, Delete]);
}

#[test]
fn unknown_applicant_status_is_fully_actionable() {
    let resolution = applicant_resolution("Awaiting Co-signer");
    assert_eq!(resolution.kinds(), vec![Approve, Reject, Delete]);
    assert!(resolution.badge().is_none());
}

#[test]
fn actions_carry_labels_icons_and_targets() {
    let resolution = applicant_resolution("Pending");
    let actions = resolution.actions();

    assert_eq!(actions[0].label, "Approve");
    assert_eq!(actions[0].icon, "check");
    assert_eq!(actions[0].target_status.as_deref(), Some("Approved"));
    assert_eq!(actions[1].label, "Reject");
    assert_eq!(actions[1].target_status.as_deref(), Some("Rejected"));
    assert_eq!(actions[2].label, "Delete");
    assert_eq!(actions[2].icon, "trash");
    assert!(actions[2].target_status.is_none());
}

#[test]
fn active_group_takes_the_badge_path() {
    let resolution = group_resolution("Active");
    assert_eq!(resolution.badge(), Some("Active"));
    assert!(resolution.actions().is_empty());
}

#[test]
fn pending_group_offers_all_three_actions() {
    let resolution = group_resolution("Pending");
    assert_eq!(resolution.kinds(), vec![Approve, Reject, Delete]);

    let targets: Vec<Option<&str>> = resolution
        .actions()
        .iter()
        .map(|action| action.target_status.as_deref())
        .collect();
    assert_eq!(targets, vec![Some("Active"), Some("Inactive"), None]);
}

#[test]
fn inactive_group_offers_approve_and_delete() {
    assert_eq!(group_resolution("inactive").kinds(), vec![Approve, Delete]);
}

#[test]
fn resolve_raw_routes_to_the_entity_vocabulary() {
    let resolver = resolver();
    let as_applicant = resolver.resolve_raw(EntityKind::Individual, "Active", CallerRole::Owner);
    let as_group = resolver.resolve_raw(EntityKind::Group, "Active", CallerRole::Owner);

    assert_eq!(as_applicant.kinds(), vec![Approve, Reject, Delete]);
    assert_eq!(as_group.badge(), Some("Active"));
}

#[test]
fn open_policy_gives_every_role_the_same_actions() {
    let resolver = LifecycleResolver::with_policy(OpenRolePolicy);
    let status = ApplicantStatus::UnderReview;
    let baseline = resolver.resolve(&status, CallerRole::Owner);

    for role in CallerRole::ordered() {
        assert_eq!(resolver.resolve(&status, role), baseline);
    }
}

#[test]
fn role_policy_can_restrict_actions() {
    let policy = |role: CallerRole, _entity: EntityKind, action: ActionKind| {
        role != CallerRole::Tenant || action == Delete
    };
    let resolver = LifecycleResolver::with_policy(policy);

    let tenant = resolver.resolve(&ApplicantStatus::Pending, CallerRole::Tenant);
    let owner = resolver.resolve(&ApplicantStatus::Pending, CallerRole::Owner);

    assert_eq!(tenant.kinds(), vec![Delete]);
    assert_eq!(owner.kinds(), vec![Approve, Reject, Delete]);
    assert!(!resolver.permits(&ApplicantStatus::Pending, Approve, CallerRole::Tenant));
}

struct DenyAll;

impl RolePolicy for DenyAll {
    fn allows(&self, _role: CallerRole, _entity: EntityKind, _action: ActionKind) -> bool {
        false
    }
}

#[test]
fn policy_removing_every_action_reports_no_actions() {
    let resolver = LifecycleResolver::with_policy(DenyAll);

    assert_eq!(
        resolver.resolve(&GroupStatus::Pending, CallerRole::Vendor),
        Resolution::NoActions
    );
    assert_eq!(
        resolver.resolve(&ApplicantStatus::Approved, CallerRole::Vendor),
        Resolution::Badge { label: "Final" }
    );
}

#[test]
fn permits_refuses_terminal_statuses() {
    let resolver = resolver();
    assert!(!resolver.permits(&ApplicantStatus::Approved, Delete, CallerRole::Owner));
    assert!(!resolver.permits(&GroupStatus::Active, Delete, CallerRole::Owner));
    assert!(resolver.permits(&ApplicantStatus::Rejected, Delete, CallerRole::Owner));
    assert!(!resolver.permits(&ApplicantStatus::Rejected, Reject, CallerRole::Owner));
}

#[test]
fn resolution_serializes_with_a_kind_tag() {
    let json = serde_json::to_value(applicant_resolution("Lease Created")).expect("serializes");
    assert_eq!(json, serde_json::json!({ "kind": "badge", "label": "Lease Created" }));

    let json = serde_json::to_value(group_resolution("Inactive")).expect("serializes");
    assert_eq!(json["kind"], "actions");
    assert_eq!(json["actions"][0]["kind"], "approve");
    assert_eq!(json["actions"][0]["target_status"], "Active");
    assert!(json["actions"][1].get("target_status").is_none());
}

#[test]
fn equal_statuses_resolve_identically() {
    let resolver = resolver();
    let spellings = [
        "Approved",
        "approved",
        " APPROVED ",
        "Lease Created",
        "lease_created",
        "Pending",
        "under-review",
        "Rejected",
        "Waiting on docs",
        "waiting_on_docs",
    ];

    for left in spellings {
        for right in spellings {
            let (a, b) = (ApplicantStatus::parse(left), ApplicantStatus::parse(right));
            if a == b {
                assert_eq!(
                    resolver.resolve(&a, CallerRole::Owner),
                    resolver.resolve(&b, CallerRole::Owner),
                    "'{left}' and '{right}' compare equal but resolve differently"
                );
            }
        }
    }

    let approved = ApplicantStatus::from("approved");
    assert_eq!(
        resolver.resolve(&approved, CallerRole::Owner),
        Resolution::Badge { label: "Final" }
    );
    let active = GroupStatus::from(" ACTIVE ");
    assert_eq!(resolver.resolve(&active, CallerRole::Owner).badge(), Some("Active"));
}
