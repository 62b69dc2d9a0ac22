use axum::{Json, extract::State};
use tracing::instrument;

use crate::{
    AppState,
    models::appraisal::HealthStatus,
    utils::{
        database::ping,
        error::{ApiError, Result},
    },
};

#[utoipa::path(
    get,
    path = "/api/health",
    responses(
        (status = 200, description = "Store is reachable", body = HealthStatus),
        (status = 500, description = "Store is unreachable")
    ),
    tag = "health"
)]
#[instrument(skip(state))]
pub async fn health_check(State(state): State<AppState>) -> Result<Json<HealthStatus>> {
    ping(&state.pool).await.map_err(ApiError::Unhealthy)?;

    Ok(Json(HealthStatus {
        status: "healthy".to_owned(),
    }))
}
