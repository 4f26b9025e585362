use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use serde_json::json;

use crate::domain::DomainError;

/// Error type for admin handlers. Renders as JSON `{ error, code }`.
#[derive(Debug, thiserror::Error)]
pub enum AdminError {
    #[error(transparent)]
    Domain(#[from] DomainError),

    #[error("Missing or invalid access token")]
    Unauthorized,
}

pub type AdminResult<T> = Result<T, AdminError>;

impl IntoResponse for AdminError {
    fn into_response(self) -> Response {
        let (status, code, message) = match &self {
            AdminError::Domain(DomainError::Settings(msg)) => {
                (StatusCode::BAD_REQUEST, "VALIDATION_ERROR", msg.clone())
            }
            AdminError::Domain(err) => {
                tracing::error!(error = %err, "admin request failed");
                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    "INTERNAL_ERROR",
                    err.to_string(),
                )
            }
            AdminError::Unauthorized => {
                (StatusCode::UNAUTHORIZED, "UNAUTHORIZED", self.to_string())
            }
        };

        let body = json!({
            "error": message,
            "code": code,
        });

        (status, axum::Json(body)).into_response()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn status_codes_follow_the_error_kind() {
        let bad = AdminError::from(DomainError::Settings("bad day".into())).into_response();
        assert_eq!(bad.status(), StatusCode::BAD_REQUEST);
        let store = AdminError::from(DomainError::Store("locked".into())).into_response();
        assert_eq!(store.status(), StatusCode::INTERNAL_SERVER_ERROR);
        let server = AdminError::from(DomainError::Server("address in use".into())).into_response();
        assert_eq!(server.status(), StatusCode::INTERNAL_SERVER_ERROR);
        assert_eq!(
            AdminError::Unauthorized.into_response().status(),
            StatusCode::UNAUTHORIZED
        );
    }
}
