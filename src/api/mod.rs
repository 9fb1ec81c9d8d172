
pub mod webhook;

use axum::{
    Extension, Router,
    http::{HeaderValue, header},
    routing::{get, post},
};
use tower_http::{set_header::SetResponseHeaderLayer, trace::TraceLayer};

use crate::SharedState;

pub const RECORDS_PATH: &str = "/records";
pub const ADJUST_PATH: &str = "/adjustendpoints";

/// Content type of every webhook response.
pub const MEDIA_TYPE: &str = "application/external.dns.webhook+json;version=1";

pub fn create_router(state: SharedState) -> Router {
    use crate::api::webhook;

    Router::new()
        .route("/", get(webhook::domain_filter))
        .route("/healthz", get(webhook::health))
        .route(
            RECORDS_PATH,
            get(webhook::records).post(webhook::apply_changes),
        )
        .route(ADJUST_PATH, post(webhook::adjust_endpoints))
        .layer(Extension(state))
        .layer(SetResponseHeaderLayer::overriding(
            header::CONTENT_TYPE,
            HeaderValue::from_static(MEDIA_TYPE),
        ))
        .layer(TraceLayer::new_for_http())
}
