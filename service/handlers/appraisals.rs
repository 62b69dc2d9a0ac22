use axum::{
    Json,
    extract::{State, rejection::JsonRejection},
    http::StatusCode,
};
use tracing::{info, instrument};

use common::database::{StoreError, StoreErrorKind};

use crate::{
    AppState,
    models::appraisal::{Appraisal, AppraisalSubmission},
    utils::{
        database,
        error::{ApiError, Result},
    },
};

fn list_error(err: StoreError) -> ApiError {
    match err.kind {
        StoreErrorKind::UndefinedTable => ApiError::NotInitialized(err),
        _ => ApiError::Store(err),
    }
}

#[utoipa::path(
    get,
    path = "/api/appraisals",
    responses(
        (status = 200, description = "All appraisals, newest first", body = [Appraisal]),
        (status = 500, description = "Store failure or table not initialized")
    ),
    tag = "appraisals"
)]
#[instrument(skip(state))]
pub async fn list_appraisals(State(state): State<AppState>) -> Result<Json<Vec<Appraisal>>> {
    let appraisals = database::list_appraisals(&state.pool)
        .await
        .map_err(list_error)?;

    info!(results_count = appraisals.len(), "Listed appraisals");
    Ok(Json(appraisals))
}

#[utoipa::path(
    post,
    path = "/api/appraisals",
    request_body = AppraisalSubmission,
    responses(
        (status = 201, description = "Stored appraisal", body = Appraisal),
        (status = 400, description = "A required field is missing"),
        (status = 500, description = "Rejected by the store")
    ),
    tag = "appraisals"
)]
#[instrument(skip(state, payload))]
pub async fn create_appraisal(
    State(state): State<AppState>,
    payload: std::result::Result<Json<AppraisalSubmission>, JsonRejection>,
) -> Result<(StatusCode, Json<Appraisal>)> {
    let Json(submission) = payload.map_err(|rejection| ApiError::Validation {
        field: "body".to_owned(),
        message: format!("Invalid request body: {}", rejection.body_text()),
    })?;

    let new = submission.validate()?;
    let appraisal = database::insert_appraisal(&state.pool, &new).await?;

    info!(
        id = appraisal.id,
        employee_id = %appraisal.employee_id,
        "Appraisal created"
    );
    Ok((StatusCode::CREATED, Json(appraisal)))
}
