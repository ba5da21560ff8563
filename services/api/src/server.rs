use crate::cli::ServeArgs;
use crate::infra::{enroll_demo_citizen, AppState, PortalStores};
use crate::routes::portal_router;
use axum::Extension;
use axum_prometheus::PrometheusMetricLayer;
use scheme_portal::auth::TokenRegistry;
use scheme_portal::config::{AppConfig, AppEnvironment};
use scheme_portal::error::AppError;
use scheme_portal::telemetry;
use std::sync::atomic::Ordering;
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

    telemetry::init(&config.telemetry, config.environment)?;

    let (prometheus_layer, prometheus_handle) = PrometheusMetricLayer::pair();
    let readiness_flag = Arc::new(std::sync::atomic::AtomicBool::new(false));
    let app_state = AppState {
        readiness: readiness_flag.clone(),
        metrics: Arc::new(prometheus_handle),
    };

    let stores = PortalStores::build(config.catalog.seed_catalog)?;
    let registry = Arc::new(TokenRegistry::from_config(&config.auth));

    if config.environment == AppEnvironment::Development {
        let (citizen_id, issued) = enroll_demo_citizen(&stores, &registry)?;
        warn!(
            citizen = %citizen_id,
            token = %issued.token,
            expires_at = %issued.expires_at,
            "development citizen enrolled"
        );
    }

    let app = portal_router(&stores, registry)
        .layer(Extension(app_state))
        .layer(prometheus_layer);

    let addr = config.server.socket_addr()?;
    let listener = tokio::net::TcpListener::bind(addr).await?;
    readiness_flag.store(true, Ordering::Release);

    info!(?config.environment, %addr, "scheme portal ready");

    axum::serve(listener, app).await?;
    Ok(())
}
