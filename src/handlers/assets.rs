use std::io::ErrorKind;

use axum::{
    extract::State,
    http::{StatusCode, header},
    response::{IntoResponse, Response},
};

use crate::PortalError;
use crate::server::router::PortalState;

/// Candidates for `/favicon.ico`, in order of preference.
const FAVICON_CANDIDATES: [(&str, &str); 2] = [
    ("favicon.ico", "image/vnd.microsoft.icon"),
    ("logo.svg", "image/svg+xml"),
];

/// GET /favicon.ico -> the first icon found in the static dir, else 204.
pub async fn favicon(State(state): State<PortalState>) -> Result<Response, PortalError> {
    for (file, mime) in FAVICON_CANDIDATES {
        let path = state.static_dir.join(file);
        match tokio::fs::read(&path).await {
            Ok(bytes) => return Ok(([(header::CONTENT_TYPE, mime)], bytes).into_response()),
            Err(e) if e.kind() == ErrorKind::NotFound => continue,
            Err(e) => return Err(e.into()),
        }
    }
    Ok(StatusCode::NO_CONTENT.into_response())
}
