use axum::{
    Json,
    body::Bytes,
    extract::State,
    http::StatusCode,
    response::{IntoResponse, Response},
};
use axum_macros::debug_handler;
use utoipa::OpenApi;

use std::sync::Arc;

use crate::{
    dto::{ErrorResponse, ReplyRequest, ReplyResponse},
    error::ReplyError,
    service::ReplyService,
};

#[derive(OpenApi)]
#[openapi(
    paths(generate_reply),
    components(schemas(ReplyRequest, ReplyResponse, ErrorResponse)),
    tags(
        (name = "reply", description = "Email reply generation API")
    )
)]
pub struct ApiDoc;

// The body is parsed by hand so malformed JSON is reported in the error shape with a 500
async fn process(service: &ReplyService, body: &[u8]) -> Result<ReplyResponse, ReplyError> {
    let request: ReplyRequest = serde_json::from_slice(body)?;
    service.generate_reply(request).await
}

#[utoipa::path(
    post,
    path = "/",
    request_body = ReplyRequest,
    responses(
        (status = 200, description = "Reply generated successfully", body = ReplyResponse),
        (status = 405, description = "Method not allowed", body = ErrorResponse),
        (status = 500, description = "Configuration, generation or internal error", body = ErrorResponse)
    ),
    tag = "reply"
)]
#[debug_handler]
pub async fn generate_reply(State(service): State<Arc<ReplyService>>, body: Bytes) -> Response {
    match process(&service, &body).await {
        Ok(reply) => (StatusCode::OK, Json(reply)).into_response(),
        Err(e) => {
            tracing::error!("Error in generate-reply handler: {e}");
            e.into_response()
        }
    }
}

#[debug_handler]
pub async fn preflight() -> Response {
    StatusCode::OK.into_response()
}

#[debug_handler]
pub async fn method_not_allowed() -> Response {
    (
        StatusCode::METHOD_NOT_ALLOWED,
        Json(ErrorResponse::new("Method not allowed")),
    )
        .into_response()
}

#[debug_handler]
pub async fn health_check() -> Response {
    (StatusCode::OK, "Hello from reply assistant!").into_response()
}

#[debug_handler]
pub async fn openapi() -> Response {
    (StatusCode::OK, Json(ApiDoc::openapi())).into_response()
}
