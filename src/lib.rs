//! Email reply drafting service.
//!
//! The server side takes an email (sender, subject, body) and a tone, asks
//! Gemini for a reply and hands back either `{ "reply" }` or a JSON error.
//! The [`form`] and [`backend`] modules hold the client side: form state,
//! validation and the call to the reply endpoint.

pub mod backend;
pub mod config;
pub mod dto;
pub mod error;
pub mod form;
pub mod gemini;
pub mod handler;
pub mod service;

use axum::{
    Router,
    http::{
        HeaderValue,
        header::{ACCESS_CONTROL_ALLOW_HEADERS, ACCESS_CONTROL_ALLOW_ORIGIN},
    },
    routing::{MethodRouter, get, post},
};
use tower_http::{set_header::SetResponseHeaderLayer, trace::TraceLayer};

use std::sync::Arc;

use service::ReplyService;

pub const ALLOWED_HEADERS: &str = "authorization, x-client-info, apikey, content-type";

fn reply_route() -> MethodRouter<Arc<ReplyService>> {
    post(handler::generate_reply)
        .options(handler::preflight)
        .fallback(handler::method_not_allowed)
}

/// Builds the HTTP router. Every response carries the permissive CORS headers.
pub fn router(service: Arc<ReplyService>) -> Router {
    Router::new()
        .route("/", reply_route())
        .route("/generate-reply", reply_route())
        .route("/health", get(handler::health_check))
        .route("/api-doc/openapi.json", get(handler::openapi))
        .with_state(service)
        .layer(SetResponseHeaderLayer::overriding(
            ACCESS_CONTROL_ALLOW_ORIGIN,
            HeaderValue::from_static("*"),
        ))
        .layer(SetResponseHeaderLayer::overriding(
            ACCESS_CONTROL_ALLOW_HEADERS,
            HeaderValue::from_static(ALLOWED_HEADERS),
        ))
        .layer(TraceLayer::new_for_http())
}
