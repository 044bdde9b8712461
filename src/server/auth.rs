//! Optional bearer-token check for `/api` routes

use axum::extract::{Request, State};
use axum::http::{header, StatusCode};
use axum::middleware::Next;
use axum::response::{IntoResponse, Response};
use tracing::warn;

use super::handlers::ApiError;
use super::AppState;

pub(super) async fn require_token(State(state): State<AppState>, req: Request, next: Next) -> Response {
    let Some(expected) = state.api_token.as_deref() else {
        return next.run(req).await;
    };

    let presented = req
        .headers()
        .get(header::AUTHORIZATION)
        .and_then(|value| value.to_str().ok())
        .and_then(|value| value.strip_prefix("Bearer "))
        .map(str::trim);

    match presented {
        Some(token) if token == expected => next.run(req).await,
        Some(_) => {
            warn!(path = %req.uri().path(), "rejected request with wrong API token");
            ApiError::new(StatusCode::UNAUTHORIZED, "Invalid API token.").into_response()
        }
        None => ApiError::new(StatusCode::UNAUTHORIZED, "Missing bearer token.").into_response(),
    }
}
