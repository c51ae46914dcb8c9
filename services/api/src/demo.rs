use crate::infra::{parse_date, seeded_repository};
use chrono::{Local, NaiveDate};
use clap::Args;
use std::path::PathBuf;
use std::sync::Arc;
use tenant_leasing::error::AppError;
use tenant_leasing::workflows::leasing::{
    ActionKind, ApplicantCriteria, CallerRole, DayBucket, FacetKey, FilterAxis, GroupCriteria,
    InMemoryLeasingRepository, LeasingService, RenewalCriteria, RenewalListing, Resolution,
    SearchText,
};

#[derive(Args, Debug)]
pub(crate) struct DemoArgs {
    /// Leasing seed JSON (defaults to the bundled sample lists)
    #[arg(long)]
    pub(crate) seed: Option<PathBuf>,
    /// Role the walkthrough acts as (OWNER, AGENT, TENANT or VENDOR)
    #[arg(long, value_parser = CallerRole::parse, default_value = "owner")]
    pub(crate) role: CallerRole,
    /// Reference date for renewal days-left (YYYY-MM-DD, defaults to today)
    #[arg(long, value_parser = parse_date)]
    pub(crate) today: Option<NaiveDate>,
}

#[derive(Args, Debug)]
pub(crate) struct RenewalsArgs {
    /// Leasing seed JSON (defaults to the bundled sample lists)
    #[arg(long)]
    pub(crate) seed: Option<PathBuf>,
    /// Days-left buckets to keep, e.g. `expired,0-30` (repeatable)
    #[arg(
        long = "bucket",
        value_delimiter = ',',
        value_parser = DayBucket::parse
    )]
    pub(crate) buckets: Vec<DayBucket>,
    /// Only show leases held by this rental owner
    #[arg(long)]
    pub(crate) owner: Option<String>,
    /// Case-insensitive search over tenant, property and owner
    #[arg(long, short = 'q')]
    pub(crate) query: Option<String>,
    /// Reference date for days-left (YYYY-MM-DD, defaults to today)
    #[arg(long, value_parser = parse_date)]
    pub(crate) today: Option<NaiveDate>,
}

pub(crate) fn run_renewals_report(args: RenewalsArgs) -> Result<(), AppError> {
    let RenewalsArgs {
        seed,
        buckets,
        owner,
        query,
        today,
    } = args;

    let today = today.unwrap_or_else(|| Local::now().date_naive());
    let service = leasing_service(seed, today)?;
    let criteria = RenewalCriteria {
        owner: owner
            .map(|owner| FilterAxis::only(FacetKey::new(owner)))
            .unwrap_or_default(),
        buckets: buckets.into_iter().collect(),
        search: SearchText::from_optional(query.as_deref()),
    };

    let listing = service.list_renewals(&criteria)?;
    println!("Lease renewals as of {today}");
    render_renewals(&listing);
    Ok(())
}

pub(crate) fn run_demo(args: DemoArgs) -> Result<(), AppError> {
    let DemoArgs { seed, role, today } = args;
    let today = today.unwrap_or_else(|| Local::now().date_naive());
    let service = leasing_service(seed, today)?;

    println!("Leasing console demo (acting as {})", role.label());

    let applicants = service.list_applicants(&ApplicantCriteria::default(), role)?;
    println!("\nApplicants ({})", applicants.total);
    for row in &applicants.applicants {
        println!(
            "- {} | {} | {} | {} -> {}",
            row.applicant.id.0,
            row.applicant.name,
            row.applicant.property,
            row.applicant.status.label(),
            describe(&row.resolution)
        );
    }

    let groups = service.list_groups(&GroupCriteria::default(), role)?;
    println!("\nApplicant groups ({})", groups.total);
    for row in &groups.groups {
        println!(
            "- {} | {} ({} members) | {}% | {} -> {}",
            row.group.id.0,
            row.group.name,
            row.group.members.len(),
            row.group.percent_complete,
            row.group.status.label(),
            describe(&row.resolution)
        );
    }

    let approvable = applicants
        .applicants
        .iter()
        .find(|row| row.resolution.offers(ActionKind::Approve));
    match approvable {
        Some(row) => {
            let outcome =
                service.apply_applicant_action(&row.applicant.id, ActionKind::Approve, role)?;
            println!("\nApproved {}", outcome.entity_id);
            if let Some(updated) = outcome.record {
                println!(
                    "  now {} -> {}",
                    updated.applicant.status.label(),
                    describe(&updated.resolution)
                );
            }
            match service.apply_applicant_action(&row.applicant.id, ActionKind::Approve, role) {
                Ok(_) => println!("  second approval unexpectedly accepted"),
                Err(err) => println!("  second approval refused: {err}"),
            }
        }
        None => println!("\nNo applicant offers Approve for {}", role.label()),
    }

    println!("\nLease renewals as of {today}");
    let renewals = service.list_renewals(&RenewalCriteria::default())?;
    render_renewals(&renewals);

    Ok(())
}

fn leasing_service(
    seed: Option<PathBuf>,
    today: NaiveDate,
) -> Result<LeasingService<InMemoryLeasingRepository>, AppError> {
    let repository = seeded_repository(seed.as_deref(), today)?;
    Ok(LeasingService::new(Arc::new(repository)))
}

fn describe(resolution: &Resolution) -> String {
    match resolution {
        Resolution::Badge { label } => format!("[{label}]"),
        Resolution::NoActions => "no actions".to_string(),
        Resolution::Actions { actions } => actions
            .iter()
            .map(|action| action.label)
            .collect::<Vec<_>>()
            .join(" / "),
    }
}

fn render_renewals(listing: &RenewalListing) {
    println!("Buckets:");
    for count in listing.buckets.iter().filter(|count| count.count > 0) {
        println!("  - {}: {}", count.label, count.count);
    }

    println!("Showing {} of {} leases", listing.matches, listing.total);
    for renewal in &listing.renewals {
        println!(
            "  - {} | {} | {} | {} days ({})",
            renewal.tenant_name,
            renewal.property_title,
            renewal.rental_owners,
            renewal.days_left,
            renewal.bucket().label()
        );
    }
}
