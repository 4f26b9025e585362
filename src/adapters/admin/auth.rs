//! Shared-token guard for the admin surface.
//!
//! When a token is configured every request must carry it as `?token=...`.
//! Links and form actions rendered by the pages carry it forward.

use axum::extract::{Request, State};
use axum::middleware::Next;
use axum::response::Response;

use super::AdminState;
use super::error::AdminError;

/// Value of the `token` query parameter, percent-decoded.
pub fn query_token(query: Option<&str>) -> Option<String> {
    query?.split('&').find_map(|pair| {
        let (k, v) = pair.split_once('=')?;
        if k != "token" {
            return None;
        }
        urlencoding::decode(v).ok().map(|v| v.into_owned())
    })
}

pub async fn require_token(
    State(state): State<AdminState>,
    req: Request,
    next: Next,
) -> Result<Response, AdminError> {
    if let Some(expected) = state.token.as_deref() {
        let given = query_token(req.uri().query());
        if given.as_deref() != Some(expected) {
            tracing::warn!(path = %req.uri().path(), "admin request rejected");
            return Err(AdminError::Unauthorized);
        }
    }
    Ok(next.run(req).await)
}
