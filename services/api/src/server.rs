use crate::cli::ServeArgs;
use crate::infra::{in_memory_service, AppState, InMemoryNotificationOutbox, SeededDirectory};
use crate::routes::with_moderation_routes;
use axum::Extension;
use axum_prometheus::PrometheusMetricLayer;
use jobboard_moderation::config::AppConfig;
use jobboard_moderation::error::AppError;
use jobboard_moderation::telemetry;
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

    let moderation_service = in_memory_service(
        config.moderation,
        SeededDirectory::default(),
        InMemoryNotificationOutbox::default(),
    );

    let app = with_moderation_routes(moderation_service)
        .layer(Extension(app_state))
        .layer(prometheus_layer);

    let addr = config.server.socket_addr()?;
    let listener = tokio::net::TcpListener::bind(addr).await?;
    readiness_flag.store(true, Ordering::Release);

    info!(
        ?config.environment,
        %addr,
        recent_window_days = config.moderation.recent_window_days,
        "job board moderation service ready"
    );

    axum::serve(listener, app).await?;
    Ok(())
}
