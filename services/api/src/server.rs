use crate::cli::ServeArgs;
use crate::infra::AppState;
use crate::routes::with_analysis_routes;
use admission_engine::config::AppConfig;
use admission_engine::db::{connect_pool, spawn_keepalive, PgReferenceData};
use admission_engine::error::AppError;
use admission_engine::scoring::AdmissionAnalyzer;
use admission_engine::telemetry;
use axum::Extension;
use axum_prometheus::PrometheusMetricLayer;
use std::sync::atomic::Ordering;
use std::sync::Arc;
use tracing::info;

pub(crate) async fn run(mut args: ServeArgs) -> Result<(), AppError> {
    let mut config = AppConfig::load()?;

    if let Some(host) = args.host.take() {
        config.server.host = host;
    }
    if let Some(port) = args.port.take() {
        config.server.port = port;
    }

    telemetry::init(&config.telemetry)?;

    let catalog = Arc::new(config.analysis.catalog()?);
    let pool = connect_pool(&config.database)?;
    let reference_data = Arc::new(PgReferenceData::new(pool));
    let keepalive = spawn_keepalive(reference_data.clone(), config.database.keepalive_interval);

    let (prometheus_layer, prometheus_handle) = PrometheusMetricLayer::pair();
    let readiness_flag = Arc::new(std::sync::atomic::AtomicBool::new(false));
    let app_state = AppState {
        readiness: readiness_flag.clone(),
        metrics: Arc::new(prometheus_handle),
        reference_data: reference_data.clone(),
    };

    let analyzer = Arc::new(AdmissionAnalyzer::with_concurrency(
        reference_data,
        catalog,
        config.analysis.concurrency,
    ));

    let app = with_analysis_routes(analyzer)
        .layer(Extension(app_state))
        .layer(prometheus_layer);

    let addr = config.server.socket_addr()?;
    let listener = tokio::net::TcpListener::bind(addr).await?;
    readiness_flag.store(true, Ordering::Release);

    info!(
        ?config.environment,
        %addr,
        max_connections = config.database.max_connections(),
        concurrency = config.analysis.concurrency,
        "admission analyzer ready"
    );

    let served = axum::serve(listener, app).await;
    keepalive.abort();
    served?;
    Ok(())
}
