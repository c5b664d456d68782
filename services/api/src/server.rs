use crate::cli::ServeArgs;
use crate::infra::{build_service_stack, seed_demo_client, AppState, ScriptedOracle};
use crate::routes::with_workflow_routes;
use axum::Extension;
use axum_prometheus::PrometheusMetricLayer;
use coach_ai::config::AppConfig;
use coach_ai::error::AppError;
use coach_ai::telemetry;
use coach_ai::workflows::quest::{CoachingOracle, HttpCoachingOracle};
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

    telemetry::init(&config.telemetry)?;

    let (prometheus_layer, prometheus_handle) = PrometheusMetricLayer::pair();
    let readiness_flag = Arc::new(std::sync::atomic::AtomicBool::new(false));
    let app_state = AppState {
        readiness: readiness_flag.clone(),
        metrics: Arc::new(prometheus_handle),
    };

    let oracle: Arc<dyn CoachingOracle> = if config.oracle.api_key.is_empty() {
        warn!("no oracle credentials configured, falling back to the scripted oracle");
        Arc::new(ScriptedOracle)
    } else {
        Arc::new(HttpCoachingOracle::new(&config.oracle)?)
    };

    let stack = build_service_stack(oracle, config.diagnosis.session_ttl);
    if args.seed_demo_client {
        let client = seed_demo_client(&stack.directory);
        info!(%client, "seeded demo client");
    }

    let app = with_workflow_routes(stack.diagnosis, stack.quests)
        .layer(Extension(app_state))
        .layer(prometheus_layer);

    let addr = config.server.socket_addr()?;
    let listener = tokio::net::TcpListener::bind(addr).await?;
    readiness_flag.store(true, Ordering::Release);

    info!(?config.environment, %addr, "coaching platform core ready");

    axum::serve(listener, app).await?;
    Ok(())
}
