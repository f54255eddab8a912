use crate::cli::ServeArgs;
use crate::infra::{build_controller, AppState};
use crate::routes::with_correction_routes;
use axum::Extension;
use axum_prometheus::PrometheusMetricLayer;
use redacai::config::AppConfig;
use redacai::error::AppError;
use redacai::telemetry;
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

    let (prometheus_layer, prometheus_handle) = PrometheusMetricLayer::pair();
    let readiness_flag = Arc::new(std::sync::atomic::AtomicBool::new(false));
    let app_state = AppState {
        readiness: readiness_flag.clone(),
        metrics: Arc::new(prometheus_handle),
    };

    let controller = Arc::new(build_controller(&config));

    let app = with_correction_routes(controller)
        .layer(Extension(app_state))
        .layer(prometheus_layer);

    let addr = config.server.socket_addr()?;
    let listener = tokio::net::TcpListener::bind(addr).await?;
    readiness_flag.store(true, Ordering::Release);

    info!(
        ?config.environment,
        %addr,
        daily_limit = config.quota.daily_limit.get(),
        evaluation_endpoint = %config.evaluation.endpoint,
        "correction service ready"
    );

    axum::serve(listener, app).await?;
    Ok(())
}
