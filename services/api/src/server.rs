use crate::cli::ServeArgs;
use crate::infra::{AppState, InMemoryPredictionRepository, InMemoryPropertyRepository};
use crate::routes::with_property_routes;
use axum::Extension;
use axum_prometheus::PrometheusMetricLayer;
use house_price::config::AppConfig;
use house_price::error::AppError;
use house_price::prediction::PricePredictionEngine;
use house_price::property::PropertyService;
use house_price::telemetry;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use tracing::{info, warn};

pub(crate) async fn run(mut args: ServeArgs) -> Result<(), AppError> {
    let mut config = AppConfig::load()?;

    if let Some(host) = args.host.take() {
        config.server.host = host;
    }
    if let Some(port) = args.port.take() {
        config.server.port = port;
    }
    if let Some(workers) = args.workers.take() {
        config.engine.worker_threads = workers.max(1);
    }

    telemetry::init(&config.telemetry)?;

    let (prometheus_layer, prometheus_handle) = PrometheusMetricLayer::pair();
    let readiness_flag = Arc::new(AtomicBool::new(false));
    let app_state = AppState {
        readiness: readiness_flag.clone(),
        metrics: Arc::new(prometheus_handle),
    };

    let engine = Arc::new(PricePredictionEngine::new(config.engine.clone())?);
    let property_service = Arc::new(PropertyService::new(
        Arc::new(InMemoryPropertyRepository::default()),
        Arc::new(InMemoryPredictionRepository::default()),
        engine.clone(),
    ));

    let app = with_property_routes(property_service)
        .layer(Extension(app_state))
        .layer(prometheus_layer);

    let addr = config.server.socket_addr()?;
    let listener = tokio::net::TcpListener::bind(addr).await?;
    readiness_flag.store(true, Ordering::Release);

    info!(
        ?config.environment,
        %addr,
        workers = config.engine.worker_threads,
        "house price service ready"
    );

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal(readiness_flag))
        .await?;

    // Drain in-flight predictions off the async runtime.
    tokio::task::spawn_blocking(move || engine.shutdown())
        .await
        .map_err(std::io::Error::from)?;
    info!("house price service stopped");
    Ok(())
}

async fn shutdown_signal(readiness: Arc<AtomicBool>) {
    if let Err(err) = tokio::signal::ctrl_c().await {
        warn!(%err, "unable to listen for shutdown signal");
        std::future::pending::<()>().await;
    }
    readiness.store(false, Ordering::Release);
    info!("shutdown signal received; draining connections");
}
