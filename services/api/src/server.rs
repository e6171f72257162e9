use crate::cli::ServeArgs;
use crate::infra::AppState;
use crate::routes::with_operational_routes;
use axum::Extension;
use axum_prometheus::PrometheusMetricLayer;
use laptop_advisor::api::{advisor_router, AdvisorState};
use laptop_advisor::assistant::client::OpenAiCompatibleClient;
use laptop_advisor::assistant::ChatAssistant;
use laptop_advisor::config::AppConfig;
use laptop_advisor::error::AppError;
use laptop_advisor::recommend::RecommendationService;
use laptop_advisor::telemetry;
use std::sync::atomic::{AtomicBool, Ordering};
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
    if let Some(data) = args.data.take() {
        config.dataset.path = data;
    }

    telemetry::init(&config.telemetry)?;

    let (prometheus_layer, prometheus_handle) = PrometheusMetricLayer::pair();
    let readiness_flag = Arc::new(AtomicBool::new(false));
    let app_state = AppState {
        readiness: readiness_flag.clone(),
        metrics: Arc::new(prometheus_handle),
    };

    let service = Arc::new(RecommendationService::from_path(&config.dataset.path)?);
    if config.llm.api_key.is_none() {
        info!("no LLM API key configured; chat answers will report the missing key");
    }
    let client = Arc::new(OpenAiCompatibleClient::from_config(&config.llm));
    let assistant = Arc::new(ChatAssistant::new(client));

    let app = with_operational_routes(advisor_router(AdvisorState::new(service, assistant)))
        .layer(Extension(app_state))
        .layer(prometheus_layer);

    let addr = config.server.socket_addr()?;
    let listener = tokio::net::TcpListener::bind(addr).await?;
    readiness_flag.store(true, Ordering::Release);

    info!(?config.environment, %addr, dataset = %config.dataset.path.display(), "laptop advisor ready");

    axum::serve(listener, app).await?;
    Ok(())
}
