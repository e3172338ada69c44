use axum::extract::{Request, State};
use axum::middleware::Next;
use axum::response::Response;

use super::error::AppError;
use super::SharedState;

pub(super) const CLIENT_ID_HEADER: &str = "x-client-id";

const ANONYMOUS_CLIENT: &str = "anonymous";

/// Admit one request for the calling client, identified by `x-client-id`.
pub(super) async fn admit_client(
    State(state): State<SharedState>,
    request: Request,
    next: Next,
) -> Result<Response, AppError> {
    if let Some(limiter) = &state.client_limiter {
        let client = request
            .headers()
            .get(CLIENT_ID_HEADER)
            .and_then(|v| v.to_str().ok())
            .map(str::trim)
            .filter(|v| !v.is_empty())
            .unwrap_or(ANONYMOUS_CLIENT);
        limiter.check_limit(&format!("client:{client}"))?;
    }
    Ok(next.run(request).await)
}
