//! HTTP adapter - axum routes over the roster services
//!
//! - `POST /users`: create a user
//! - `GET /users`: list users
//! - `DELETE /users/:user_id`: delete a user
//! - `POST /users/upload_csv`: bulk import from a multipart `file` field
//! - `GET /users/average_age`: average age by name initial
//! - `GET /health`: liveness

use std::future::Future;
use std::sync::Arc;

use axum::extract::multipart::{MultipartError, MultipartRejection};
use axum::extract::rejection::JsonRejection;
use axum::extract::{DefaultBodyLimit, Multipart, Path, Query, State};
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::routing::{delete, get, post};
use axum::{Json, Router};
use serde::{Deserialize, Serialize};
use tokio::net::TcpListener;

use crate::domain::result::Error;
use crate::domain::{NewUser, User};
use crate::services::{AverageAgeReport, ImportOptions, ImportResult};
use crate::RosterContext;

/// Multipart field carrying the CSV upload
const UPLOAD_FIELD: &str = "file";

/// Error body returned by every failing endpoint
#[derive(Debug, Serialize, Deserialize)]
pub struct ErrorBody {
    pub detail: String,
}

/// An error on its way out as an HTTP response
#[derive(Debug)]
pub struct ApiError {
    status: StatusCode,
    detail: String,
}

impl ApiError {
    fn new(status: StatusCode, detail: impl Into<String>) -> Self {
        Self {
            status,
            detail: detail.into(),
        }
    }
}

impl From<Error> for ApiError {
    fn from(err: Error) -> Self {
        let status = match &err {
            Error::DuplicateName(_)
            | Error::InvalidFileType(_)
            | Error::InputMalformed(_)
            | Error::SchemaMismatch(_) => StatusCode::BAD_REQUEST,
            Error::NotFound(_) => StatusCode::NOT_FOUND,
            Error::Validation(_) => StatusCode::UNPROCESSABLE_ENTITY,
            Error::Storage(_) | Error::Config(_) | Error::Io(_) | Error::Json(_) => {
                StatusCode::INTERNAL_SERVER_ERROR
            }
        };
        Self::new(status, err.to_string())
    }
}

impl From<JsonRejection> for ApiError {
    fn from(rejection: JsonRejection) -> Self {
        Self::new(rejection.status(), rejection.body_text())
    }
}

impl From<MultipartRejection> for ApiError {
    fn from(rejection: MultipartRejection) -> Self {
        Self::new(rejection.status(), rejection.body_text())
    }
}

impl From<MultipartError> for ApiError {
    fn from(err: MultipartError) -> Self {
        Self::new(err.status(), err.body_text())
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        if self.status.is_server_error() {
            tracing::error!(status = %self.status, detail = %self.detail, "request failed");
        } else {
            tracing::debug!(status = %self.status, detail = %self.detail, "request rejected");
        }
        (self.status, Json(ErrorBody { detail: self.detail })).into_response()
    }
}

type ApiResult<T> = std::result::Result<T, ApiError>;

#[derive(Debug, Default, Deserialize)]
pub struct UploadParams {
    #[serde(default)]
    pub preview: bool,
}

/// Build the router for a context
pub fn router(ctx: Arc<RosterContext>) -> Router {
    let body_limit = ctx.config.server.max_upload_bytes;

    Router::new()
        .route("/health", get(health))
        .route("/users", post(create_user).get(list_users))
        .route("/users/upload_csv", post(upload_csv))
        .route("/users/average_age", get(average_age))
        .route("/users/:user_id", delete(delete_user))
        .layer(DefaultBodyLimit::max(body_limit))
        .with_state(ctx)
}

/// Serve the API on `listener` until `shutdown` resolves
pub async fn serve<F>(ctx: Arc<RosterContext>, listener: TcpListener, shutdown: F) -> std::io::Result<()>
where
    F: Future<Output = ()> + Send + 'static,
{
    if let Ok(addr) = listener.local_addr() {
        tracing::info!(%addr, "listening");
    }
    axum::serve(listener, router(ctx))
        .with_graceful_shutdown(shutdown)
        .await
}

async fn health() -> Json<serde_json::Value> {
    Json(serde_json::json!({ "status": "ok" }))
}

async fn create_user(
    State(ctx): State<Arc<RosterContext>>,
    payload: std::result::Result<Json<NewUser>, JsonRejection>,
) -> ApiResult<(StatusCode, Json<User>)> {
    let Json(new_user) = payload?;
    let user = ctx.user_service.create(new_user)?;
    Ok((StatusCode::CREATED, Json(user)))
}

async fn list_users(State(ctx): State<Arc<RosterContext>>) -> ApiResult<Json<Vec<User>>> {
    Ok(Json(ctx.user_service.list_all()?))
}

async fn delete_user(
    State(ctx): State<Arc<RosterContext>>,
    Path(user_id): Path<String>,
) -> ApiResult<StatusCode> {
    ctx.user_service.delete(&user_id)?;
    Ok(StatusCode::NO_CONTENT)
}

async fn upload_csv(
    State(ctx): State<Arc<RosterContext>>,
    Query(params): Query<UploadParams>,
    multipart: std::result::Result<Multipart, MultipartRejection>,
) -> ApiResult<(StatusCode, Json<ImportResult>)> {
    let mut multipart = multipart?;
    while let Some(field) = multipart.next_field().await? {
        if field.name() != Some(UPLOAD_FIELD) {
            continue;
        }

        let content_type = field.content_type().map(str::to_owned);
        tracing::debug!(
            file_name = field.file_name().unwrap_or(""),
            content_type = content_type.as_deref().unwrap_or(""),
            "received CSV upload"
        );
        // Reject on the declared type before reading the body
        ctx.import_service.check_content_type(content_type.as_deref())?;

        let bytes = field.bytes().await?;
        let options = ImportOptions {
            preview: params.preview,
        };
        let result = ctx.import_service.import_bytes(&bytes, options)?;
        return Ok((StatusCode::CREATED, Json(result)));
    }

    Err(ApiError::new(
        StatusCode::UNPROCESSABLE_ENTITY,
        format!("Missing '{}' field in upload", UPLOAD_FIELD),
    ))
}

async fn average_age(State(ctx): State<Arc<RosterContext>>) -> ApiResult<Json<AverageAgeReport>> {
    Ok(Json(ctx.stats_service.average_age_by_initial()?))
}
