use crate::api::ApiError;
use crate::AppState;
use axum::{
    body::Body,
    http::{header::AUTHORIZATION, Request},
    middleware::Next,
    response::Response,
};
use base64::{engine::general_purpose::STANDARD, Engine};
use roster_federation::is_federated_peer;
use roster_types::{Credential, PeerRegistry, SYSTEM_USERNAME};
use std::sync::Arc;

/// The authenticated caller of the current request.
///
/// Inserted into request extensions by [`auth_middleware`].
#[derive(Clone)]
pub struct CallerContext(pub Credential);

impl CallerContext {
    pub fn credential(&self) -> &Credential {
        &self.0
    }
}

/// Authenticates `Authorization: Basic` credentials.
///
/// A `system` login must present the shared secret of a trusted peer;
/// any other username must match a local account. Requests without
/// credentials, or whose credentials do not verify, get 401 with a
/// `WWW-Authenticate: Basic` challenge.
pub async fn auth_middleware(mut req: Request<Body>, next: Next) -> Result<Response, ApiError> {
    let credential = req
        .headers()
        .get(AUTHORIZATION)
        .and_then(|value| value.to_str().ok())
        .and_then(parse_basic_auth)
        .ok_or_else(|| ApiError::Unauthorized("credentials required".into()))?;

    let state = req
        .extensions()
        .get::<Arc<AppState>>()
        .ok_or_else(|| ApiError::InternalServerError("application state missing".into()))?
        .clone();

    let checked = credential.clone();
    let verified = tokio::task::spawn_blocking(move || verify(&state, &checked))
        .await
        .map_err(|e| ApiError::InternalServerError(format!("task join error: {e}")))??;

    if !verified {
        tracing::debug!(username = %credential.username, "credentials rejected");
        return Err(ApiError::Unauthorized("invalid credentials".into()));
    }

    req.extensions_mut().insert(CallerContext(credential));
    Ok(next.run(req).await)
}

fn verify(state: &AppState, credential: &Credential) -> Result<bool, ApiError> {
    let Some(secret) = credential.secret.as_deref() else {
        return Ok(false);
    };

    if credential.username == SYSTEM_USERNAME {
        let peers = state.peers.list_peers().map_err(|e| {
            tracing::error!(error = %e, "failed to read trusted servers");
            ApiError::InternalServerError(e.to_string())
        })?;
        return Ok(is_federated_peer(Some(credential), &peers));
    }

    state
        .users
        .verify_password(&credential.username, secret)
        .map_err(|e| {
            tracing::error!(error = %e, "failed to read user accounts");
            ApiError::InternalServerError(e.to_string())
        })
}

/// Parses a `Basic` authorization header value.
///
/// A decoded value without a `:` is a username with no secret.
pub fn parse_basic_auth(header: &str) -> Option<Credential> {
    let (scheme, encoded) = header.trim().split_once(' ')?;
    if !scheme.eq_ignore_ascii_case("basic") {
        return None;
    }

    let decoded = STANDARD.decode(encoded.trim()).ok()?;
    let decoded = String::from_utf8(decoded).ok()?;

    match decoded.split_once(':') {
        Some((username, secret)) => {
            Credential::from_parts(Some(username.to_string()), Some(secret.to_string()))
        }
        None => Credential::from_parts(Some(decoded), None),
    }
}
