mod handlers;
mod middleware;
mod models;
mod utils;

use std::sync::Arc;

use axum::{
    Json, Router,
    http::{HeaderValue, Method, header},
    response::Html,
    routing::get,
};
use tokio::net::TcpListener;
use tower::ServiceBuilder;
use tower_http::cors::{AllowOrigin, CorsLayer};
use tracing_subscriber::EnvFilter;
use utoipa::OpenApi;
use utoipa_scalar::Scalar;

use common::database::{DbPool, connect_with_retry, create_pool, initialize_database};
use common::utils::config::Config;

use handlers::{
    appraisals::{create_appraisal, list_appraisals},
    health::health_check,
};
use middleware::{origin_guard, request_logger};
use utils::error::{ApiError, Result};

#[derive(Clone)]
pub struct AppState {
    pub pool: DbPool,
    pub allowed_origins: Arc<[String]>,
}

impl AppState {
    pub fn new(pool: DbPool, config: &Config) -> Self {
        Self {
            pool,
            allowed_origins: config.allowed_origins().into(),
        }
    }

    pub fn is_allowed_origin(&self, origin: &str) -> bool {
        self.allowed_origins.iter().any(|allowed| allowed == origin)
    }
}

#[derive(OpenApi)]
#[openapi(
    info(
        title = "Appraisal Service",
        description = "Stores and lists employee appraisals.",
        version = "0.1.0"
    ),
    paths(
        handlers::health::health_check,
        handlers::appraisals::list_appraisals,
        handlers::appraisals::create_appraisal,
    ),
    components(
        schemas(
            models::appraisal::Appraisal,
            models::appraisal::AppraisalSubmission,
            models::appraisal::HealthStatus,
        )
    ),
    tags(
        (name = "health", description = "Liveness of the service and its store"),
        (name = "appraisals", description = "Create and list appraisals"),
    )
)]
struct ApiDoc;

async fn serve_docs() -> Html<String> {
    Html(Scalar::new(ApiDoc::openapi()).to_html())
}

async fn serve_openapi_json() -> Json<utoipa::openapi::OpenApi> {
    Json(ApiDoc::openapi())
}

fn cors_layer(origins: &[String]) -> CorsLayer {
    let origins: Vec<HeaderValue> = origins
        .iter()
        .filter_map(|origin| HeaderValue::from_str(origin).ok())
        .collect();

    CorsLayer::new()
        .allow_origin(AllowOrigin::list(origins))
        .allow_methods([Method::GET, Method::POST, Method::OPTIONS])
        .allow_headers([header::CONTENT_TYPE])
        .allow_credentials(true)
}

fn create_router(state: AppState) -> Router {
    let cors = cors_layer(&state.allowed_origins);

    Router::new()
        .route("/api/health", get(health_check))
        .route("/api/appraisals", get(list_appraisals).post(create_appraisal))
        .route("/api-docs/openapi.json", get(serve_openapi_json))
        .route("/api/docs", get(serve_docs))
        .layer(
            ServiceBuilder::new()
                .layer(axum::middleware::from_fn(request_logger))
                .layer(axum::middleware::from_fn_with_state(state.clone(), origin_guard))
                .layer(cors),
        )
        .with_state(state)
}

async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(e) = tokio::signal::ctrl_c().await {
            tracing::error!("Failed to listen for Ctrl+C: {}", e);
            std::future::pending::<()>().await;
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match tokio::signal::unix::signal(tokio::signal::unix::SignalKind::terminate()) {
            Ok(mut signal) => {
                signal.recv().await;
            }
            Err(e) => {
                tracing::error!("Failed to install SIGTERM handler: {}", e);
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        () = ctrl_c => tracing::info!("Received Ctrl+C, shutting down"),
        () = terminate => tracing::info!("Received SIGTERM, shutting down"),
    }
}

#[tokio::main]
async fn main() -> Result<()> {
    rustls::crypto::aws_lc_rs::default_provider()
        .install_default()
        .map_err(|_| ApiError::Config("Failed to install crypto provider".to_owned()))?;

    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .init();

    let config = Config::from_env()?;
    let pool = create_pool(&config)?;

    if let Err(e) =
        connect_with_retry(&pool, config.connect_attempts, config.connect_retry_delay()).await
    {
        tracing::error!("Giving up on database: {}", e);
        std::process::exit(1);
    }

    match initialize_database(&pool).await {
        Ok(status) => tracing::info!(?status, "Database schema ready"),
        Err(e) => {
            tracing::error!("Database initialization failed: {}", e);
            std::process::exit(1);
        }
    }

    let app = create_router(AppState::new(pool, &config));

    let addr = format!("0.0.0.0:{}", config.api_port);
    let listener = TcpListener::bind(&addr).await?;

    tracing::info!("Appraisal service starting on {}", addr);
    tracing::info!(
        "API documentation available at http://localhost:{}/api/docs",
        config.api_port
    );

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    Ok(())
}
