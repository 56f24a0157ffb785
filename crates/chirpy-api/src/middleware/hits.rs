//! File server hit counting
//!
//! Every request routed to the `/app` file server bumps the process-wide
//! counter in [`AppState`], whatever the response status.

use crate::state::AppState;
use axum::{
    extract::{Request, State},
    middleware::Next,
    response::Response,
};
use std::sync::Arc;

pub async fn fileserver_hits_middleware(
    State(state): State<Arc<AppState>>,
    request: Request,
    next: Next,
) -> Response {
    let previous = state.record_hit();
    tracing::trace!(path = %request.uri().path(), hits = previous + 1, "File server hit");

    next.run(request).await
}
