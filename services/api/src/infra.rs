use chrono::NaiveDate;
use metrics_exporter_prometheus::PrometheusHandle;
use std::path::Path;
use std::sync::atomic::AtomicBool;
use std::sync::Arc;
use tenant_leasing::workflows::leasing::{InMemoryLeasingRepository, LeasingSeed, SeedError};
use tracing::info;

/// Sample leasing lists used by the demo and by development servers without a seed file.
pub(crate) const SAMPLE_SEED: &str = include_str!("../data/demo_seed.json");

#[derive(Clone)]
pub(crate) struct AppState {
    pub(crate) readiness: Arc<AtomicBool>,
    pub(crate) metrics: Arc<PrometheusHandle>,
}

/// Read the seed at `path`, or the bundled sample when none is given, with
/// `days_left` re-derived against `today`.
pub(crate) fn load_seed(path: Option<&Path>, today: NaiveDate) -> Result<LeasingSeed, SeedError> {
    let seed = match path {
        Some(path) => {
            info!(path = %path.display(), "loading leasing seed");
            LeasingSeed::from_path(path)?
        }
        None => LeasingSeed::from_reader(SAMPLE_SEED.as_bytes())?,
    };
    Ok(seed.as_of(today))
}

pub(crate) fn seeded_repository(
    path: Option<&Path>,
    today: NaiveDate,
) -> Result<InMemoryLeasingRepository, SeedError> {
    let seed = load_seed(path, today)?;
    info!(
        applicants = seed.applicants.len(),
        groups = seed.groups.len(),
        renewals = seed.renewals.len(),
        "leasing repository hydrated"
    );
    Ok(InMemoryLeasingRepository::from_seed(seed))
}

pub(crate) fn parse_date(raw: &str) -> Result<NaiveDate, String> {
    NaiveDate::parse_from_str(raw.trim(), "%Y-%m-%d")
        .map_err(|err| format!("failed to parse '{raw}' as YYYY-MM-DD ({err})"))
}
