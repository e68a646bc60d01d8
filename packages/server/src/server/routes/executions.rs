use axum::{
    extract::{rejection::JsonRejection, Extension},
    http::{header::CONTENT_TYPE, StatusCode},
    response::{IntoResponse, Response},
    Json,
};

use crate::domains::feedback::gateway::{StartSyncExecutionRequest, UpstreamResponse};
use crate::kernel::handle_start_sync_execution;
use crate::server::app::AxumAppState;

/// Workflow engine endpoint: run one execution and return it
///
/// 200 with the execution (including FAILED ones), 400 with
/// `{"__type", "message"}` when the request itself is invalid.
pub async fn start_sync_execution_handler(
    Extension(state): Extension<AxumAppState>,
    request: Result<Json<StartSyncExecutionRequest>, JsonRejection>,
) -> Response {
    let response = match request {
        Ok(Json(request)) => handle_start_sync_execution(&state.workflow, request).await,
        Err(rejection) => {
            tracing::warn!(error = %rejection.body_text(), "Rejected execution request");
            UpstreamResponse::rejected(400, "InvalidExecutionInput", rejection.body_text())
        }
    };
    let status =
        StatusCode::from_u16(response.status_code).unwrap_or(StatusCode::INTERNAL_SERVER_ERROR);

    (status, [(CONTENT_TYPE, "application/json")], response.body).into_response()
}
