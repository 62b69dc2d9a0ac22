use axum::{
    body::Body,
    extract::State,
    http::{Request, header},
    middleware::Next,
    response::Response,
};

use crate::{
    AppState,
    utils::error::{ApiError, Result},
};

pub async fn request_logger(
    req: Request<Body>,
    next: Next,
) -> Response {
    let method = req.method().clone();
    let uri = req.uri().clone();
    let origin = req
        .headers()
        .get(header::ORIGIN)
        .and_then(|origin| origin.to_str().ok())
        .unwrap_or("-")
        .to_owned();
    let start = std::time::Instant::now();

    tracing::info!(
        method = %method,
        uri = %uri,
        origin = %origin,
        "Request started"
    );

    let response = next.run(req).await;
    let status = response.status();
    let duration = start.elapsed();

    tracing::info!(
        method = %method,
        uri = %uri,
        origin = %origin,
        status = status.as_u16(),
        duration_ms = duration.as_millis(),
        "Request completed"
    );

    response
}

/// Turns away browser requests from origins outside the allow-list before
/// they reach a handler. Requests without an `Origin` header pass through.
pub async fn origin_guard(
    State(state): State<AppState>,
    req: Request<Body>,
    next: Next,
) -> Result<Response> {
    if let Some(origin) = req.headers().get(header::ORIGIN) {
        let allowed = origin
            .to_str()
            .is_ok_and(|origin| state.is_allowed_origin(origin));

        if !allowed {
            return Err(ApiError::OriginRejected(
                String::from_utf8_lossy(origin.as_bytes()).into_owned(),
            ));
        }
    }

    Ok(next.run(req).await)
}
