use std::sync::Arc;

use axum::extract::DefaultBodyLimit;
use axum::routing::get;
use axum::Router;
use tower_http::trace::TraceLayer;

use crate::handler::{self, AppState};

/// Build the axum router with all picture endpoints nested under the
/// configured prefix.
pub fn build_router(state: Arc<AppState>) -> Router {
    let prefix = state.prefix.clone();
    let max_upload_bytes = state.max_upload_bytes;
    let pictures = Router::new()
        .route("/", get(handler::list))
        .route(
            "/:name",
            get(handler::retrieve)
                .put(handler::upload)
                .post(handler::derive)
                .delete(handler::remove),
        )
        .with_state(state.clone());

    Router::new()
        // Nesting alone does not match the bare `{prefix}/` listing path:
        // the nested `/` route only covers `{prefix}` without the slash.
        .route(&format!("{prefix}/"), get(handler::list))
        .with_state(state)
        .nest(&prefix, pictures)
        .layer(DefaultBodyLimit::max(max_upload_bytes))
        .layer(TraceLayer::new_for_http())
}
