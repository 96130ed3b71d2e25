//! API handlers for the shared address book.

use crate::middleware::CallerContext;
use crate::AppState;
use axum::{
    extract::{Extension, Json, Path, Query},
    http::{header, HeaderValue, StatusCode},
    response::{IntoResponse, Response},
};
use base64::{engine::general_purpose::STANDARD, Engine};
use roster_types::{BackendError, ChangeSet, ContactRecord, DirectoryError};
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use thiserror::Error;

/// Request body for a bulk card fetch.
#[derive(Debug, Deserialize)]
pub struct MultigetRequest {
    /// Card names to fetch.
    pub names: Vec<String>,
}

/// Query parameters of an incremental-sync request.
#[derive(Debug, Deserialize)]
pub struct ChangesQuery {
    /// Token from the previous sync. Absent or empty for an initial sync.
    #[serde(rename = "syncToken")]
    pub sync_token: Option<String>,
    /// Requested sync depth.
    #[serde(rename = "syncLevel", default = "default_sync_level")]
    pub sync_level: u32,
    /// Maximum number of changes to return.
    pub limit: Option<u32>,
}

fn default_sync_level() -> u32 {
    1
}

/// One access-control entry of a card.
#[derive(Debug, Serialize, Deserialize)]
pub struct AclResponse {
    pub privilege: String,
    pub principal: String,
    pub protected: bool,
}

/// A card as returned by listing and bulk fetch.
#[derive(Debug, Serialize, Deserialize)]
pub struct CardResponse {
    pub id: String,
    /// Serialized vCard text, or base64 when `encoding` says so.
    #[serde(rename = "cardData")]
    pub card_data: String,
    /// `"base64"` when the stored card is not valid UTF-8.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub encoding: Option<String>,
    pub acl: Vec<AclResponse>,
}

impl From<ContactRecord> for CardResponse {
    fn from(record: ContactRecord) -> Self {
        let (card_data, encoding) = match String::from_utf8(record.raw_data) {
            Ok(text) => (text, None),
            Err(e) => (STANDARD.encode(e.into_bytes()), Some("base64".to_string())),
        };
        Self {
            id: record.id,
            card_data,
            encoding,
            acl: record
                .acl
                .into_iter()
                .map(|entry| AclResponse {
                    privilege: entry.privilege.as_str().to_string(),
                    principal: entry.principal,
                    protected: entry.protected,
                })
                .collect(),
        }
    }
}

/// API error type mapping to HTTP status codes.
#[derive(Debug, Error)]
pub enum ApiError {
    #[error("invalid input: {0}")]
    BadRequest(String),
    #[error("unauthorized: {0}")]
    Unauthorized(String),
    #[error("forbidden: {0}")]
    Forbidden(String),
    #[error("not found: {0}")]
    NotFound(String),
    #[error("not implemented: {0}")]
    NotImplemented(String),
    #[error("internal server error: {0}")]
    InternalServerError(String),
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let (status, message) = match self {
            ApiError::BadRequest(msg) => (StatusCode::BAD_REQUEST, msg),
            ApiError::Unauthorized(msg) => (StatusCode::UNAUTHORIZED, msg),
            ApiError::Forbidden(msg) => (StatusCode::FORBIDDEN, msg),
            ApiError::NotFound(msg) => (StatusCode::NOT_FOUND, msg),
            ApiError::NotImplemented(msg) => (StatusCode::NOT_IMPLEMENTED, msg),
            ApiError::InternalServerError(msg) => (StatusCode::INTERNAL_SERVER_ERROR, msg),
        };

        let body = Json(serde_json::json!({
            "error": message
        }));

        let mut response = (status, body).into_response();
        if status == StatusCode::UNAUTHORIZED {
            response.headers_mut().insert(
                header::WWW_AUTHENTICATE,
                HeaderValue::from_static("Basic realm=\"roster\""),
            );
        }
        response
    }
}

impl From<DirectoryError> for ApiError {
    fn from(err: DirectoryError) -> Self {
        match err {
            DirectoryError::NotFound(_) => ApiError::NotFound(err.to_string()),
            DirectoryError::Forbidden(_) => ApiError::Forbidden(err.to_string()),
            DirectoryError::Unauthenticated => ApiError::Unauthorized(err.to_string()),
            DirectoryError::UnsupportedLimitOnInitialSync => ApiError::BadRequest(err.to_string()),
            DirectoryError::Backend(BackendError::InvalidSyncToken(_)) => {
                ApiError::BadRequest(err.to_string())
            }
            DirectoryError::Backend(e) => {
                tracing::error!(error = %e, "directory backend failed");
                ApiError::InternalServerError(e.to_string())
            }
        }
    }
}

fn join_error(e: tokio::task::JoinError) -> ApiError {
    ApiError::InternalServerError(format!("task join error: {}", e))
}

fn check_address_book(state: &AppState, uri: &str) -> Result<(), ApiError> {
    if state.gate.address_book().uri == uri {
        Ok(())
    } else {
        Err(ApiError::NotFound(format!("address book not found: {uri}")))
    }
}

/// Handler for `GET /addressbooks/{uri}/cards`.
pub async fn list_cards_handler(
    Extension(state): Extension<Arc<AppState>>,
    Extension(caller): Extension<CallerContext>,
    Path(uri): Path<String>,
) -> Result<Json<Vec<CardResponse>>, ApiError> {
    check_address_book(&state, &uri)?;

    let records =
        tokio::task::spawn_blocking(move || state.gate.list_all(Some(caller.credential())))
            .await
            .map_err(join_error)??;

    Ok(Json(records.into_iter().map(CardResponse::from).collect()))
}

/// Handler for `GET /addressbooks/{uri}/cards/{name}`.
///
/// Returns the card as `text/vcard`.
pub async fn get_card_handler(
    Extension(state): Extension<Arc<AppState>>,
    Extension(caller): Extension<CallerContext>,
    Path((uri, name)): Path<(String, String)>,
) -> Result<Response, ApiError> {
    check_address_book(&state, &uri)?;

    let record = tokio::task::spawn_blocking(move || {
        state.gate.fetch_one(Some(caller.credential()), &name)
    })
    .await
    .map_err(join_error)??;

    Ok((
        [(header::CONTENT_TYPE, "text/vcard; charset=utf-8")],
        record.raw_data,
    )
        .into_response())
}

/// Handler for `POST /addressbooks/{uri}/multiget`.
pub async fn multiget_handler(
    Extension(state): Extension<Arc<AppState>>,
    Extension(caller): Extension<CallerContext>,
    Path(uri): Path<String>,
    Json(payload): Json<MultigetRequest>,
) -> Result<Json<Vec<CardResponse>>, ApiError> {
    check_address_book(&state, &uri)?;

    let records = tokio::task::spawn_blocking(move || {
        state.gate.fetch_many(Some(caller.credential()), &payload.names)
    })
    .await
    .map_err(join_error)??;

    Ok(Json(records.into_iter().map(CardResponse::from).collect()))
}

/// Handler for `GET /addressbooks/{uri}/changes`.
pub async fn changes_handler(
    Extension(state): Extension<Arc<AppState>>,
    Extension(caller): Extension<CallerContext>,
    Path(uri): Path<String>,
    Query(query): Query<ChangesQuery>,
) -> Result<Json<ChangeSet>, ApiError> {
    check_address_book(&state, &uri)?;

    let changes = tokio::task::spawn_blocking(move || {
        state.gate.get_changes(
            Some(caller.credential()),
            query.sync_token.as_deref(),
            query.sync_level,
            query.limit,
        )
    })
    .await
    .map_err(join_error)??;

    changes.map(Json).ok_or_else(|| {
        ApiError::NotImplemented("incremental sync is not supported by this address book".into())
    })
}
