use axum::{
    body::{to_bytes, Body},
    extract::{Request, State},
    http::StatusCode,
    middleware::Next,
    response::Response,
};

use crate::request_id::RequestId;
use crate::{AppError, AppState};

const MAX_BODY_BYTES: usize = 1024 * 1024;

/// Logs request and response bodies at debug level when `LOG_REQUESTS` or
/// `LOG_RESPONSES` is set. Bodies are buffered and passed on unchanged.
pub async fn log_bodies(
    State(state): State<AppState>,
    request: Request,
    next: Next,
) -> Result<Response, AppError> {
    let request_id = request
        .extensions()
        .get::<RequestId>()
        .map(|id| id.0.clone())
        .unwrap_or_default();

    let request = if state.log_requests {
        let (parts, body) = request.into_parts();
        let bytes = to_bytes(body, MAX_BODY_BYTES).await.map_err(|e| {
            AppError::with_status(
                StatusCode::PAYLOAD_TOO_LARGE,
                anyhow::anyhow!("request body: {}", e),
            )
        })?;
        tracing::debug!(
            "[{}] {} {} request: {}",
            request_id,
            parts.method,
            parts.uri,
            String::from_utf8_lossy(&bytes)
        );
        Request::from_parts(parts, Body::from(bytes))
    } else {
        request
    };

    let response = next.run(request).await;
    if !state.log_responses {
        return Ok(response);
    }

    let (parts, body) = response.into_parts();
    let bytes = to_bytes(body, usize::MAX).await.map_err(|e| {
        AppError::with_status(
            StatusCode::INTERNAL_SERVER_ERROR,
            anyhow::anyhow!("response body: {}", e),
        )
    })?;
    tracing::debug!(
        "[{}] {} response: {}",
        request_id,
        parts.status,
        String::from_utf8_lossy(&bytes)
    );
    Ok(Response::from_parts(parts, Body::from(bytes)))
}
