use crate::cli::ServeArgs;
use crate::infra::{seeded_repository, AppState};
use crate::routes::with_leasing_routes;
use axum::Extension;
use axum_prometheus::PrometheusMetricLayer;
use chrono::Local;
use std::sync::atomic::Ordering;
use std::sync::Arc;
use tenant_leasing::config::{AppConfig, AppEnvironment};
use tenant_leasing::error::AppError;
use tenant_leasing::telemetry;
use tenant_leasing::workflows::leasing::{InMemoryLeasingRepository, LeasingService};
use tracing::{info, warn};

pub(crate) async fn run(mut args: ServeArgs) -> Result<(), AppError> {
    let mut config = AppConfig::load()?;

    if let Some(host) = args.host.take() {
        config.server.host = host;
    }
    if let Some(port) = args.port.take() {
        config.server.port = port;
    }

    telemetry::init(&config.telemetry)?;

    let (prometheus_layer, prometheus_handle) = PrometheusMetricLayer::pair();
    let readiness_flag = Arc::new(std::sync::atomic::AtomicBool::new(false));
    let app_state = AppState {
        readiness: readiness_flag.clone(),
        metrics: Arc::new(prometheus_handle),
    };

    let today = Local::now().date_naive();
    let repository = match (&config.leasing.seed_path, config.environment) {
        (Some(path), _) => seeded_repository(Some(path.as_path()), today)?,
        (None, AppEnvironment::Production) => {
            warn!("APP_SEED_PATH not set; starting with empty leasing lists");
            InMemoryLeasingRepository::default()
        }
        (None, _) => seeded_repository(None, today)?,
    };
    let leasing_service = Arc::new(LeasingService::new(Arc::new(repository)));

    let app = with_leasing_routes(leasing_service)
        .layer(Extension(app_state))
        .layer(prometheus_layer);

    let addr = config.server.socket_addr()?;
    let listener = tokio::net::TcpListener::bind(addr).await?;
    readiness_flag.store(true, Ordering::Release);

    info!(?config.environment, %addr, "leasing console backend ready");

    axum::serve(listener, app).await?;
    Ok(())
}
