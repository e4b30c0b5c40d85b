use axum::{
    Json,
    extract::{Request, State},
    middleware::Next,
    response::{IntoResponse, Response},
};

use crate::web::{AppState, error::DetailedError};

/// In debug mode, replaces error bodies with their detailed variant.
pub async fn expose_details_fn(State(state): State<AppState>, req: Request, next: Next) -> Response {
    let mut response = next.run(req).await;
    if !state.config().host().debug() {
        return response;
    }

    match response.extensions_mut().remove::<DetailedError>() {
        Some(DetailedError(body)) => (response.status(), Json(body)).into_response(),
        None => response,
    }
}
