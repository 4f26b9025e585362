//! HTTP admin surface (axum). Settings tabs, manual sends and the live preview.
//!
//! Every route goes through [`InputPort`]; the adapter holds no state of its own
//! apart from the access token and the site timezone used to format dates.

pub mod auth;
pub mod error;
pub mod handlers;
pub mod pages;

use std::net::SocketAddr;
use std::sync::Arc;

use axum::Router;
use axum::http::Uri;
use axum::middleware;
use axum::response::Redirect;
use axum::routing::{get, post};
use chrono::FixedOffset;
use tower_http::trace::TraceLayer;

use crate::domain::DomainError;
use crate::ports::InputPort;

#[derive(Clone)]
pub struct AdminState {
    pub port: Arc<dyn InputPort>,
    /// Required `?token=` value; `None` leaves the surface open.
    pub token: Option<String>,
    pub tz: FixedOffset,
}

async fn root(uri: Uri) -> Redirect {
    match uri.query() {
        Some(q) => Redirect::to(&format!("/admin?{}", q)),
        None => Redirect::to("/admin"),
    }
}

pub fn build_router(state: AdminState) -> Router {
    Router::new()
        .route("/", get(root))
        .route("/admin", get(handlers::index))
        .route("/admin/options", post(handlers::save_options))
        .route("/admin/send-now", post(handlers::send_now))
        .route("/admin/send-test", post(handlers::send_test))
        .route("/admin/preview", post(handlers::preview))
        .route("/admin/preview/frame", get(handlers::preview_frame))
        .layer(middleware::from_fn_with_state(
            state.clone(),
            auth::require_token,
        ))
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}

/// Bind `addr` and serve until the task is dropped or the listener fails.
pub async fn serve(state: AdminState, addr: SocketAddr) -> Result<(), DomainError> {
    if state.token.is_none() {
        tracing::warn!(%addr, "admin surface has no access token");
    }
    let listener = tokio::net::TcpListener::bind(addr)
        .await
        .map_err(|e| DomainError::Server(format!("cannot bind admin address {}: {}", addr, e)))?;
    tracing::info!(%addr, "admin listening");
    axum::serve(listener, build_router(state))
        .await
        .map_err(|e| DomainError::Server(format!("admin server stopped: {}", e)))
}

#[cfg(test)]
mod tests {
    use std::collections::HashMap;
    use std::sync::Mutex;

    use axum::body::Body;
    use axum::http::{Request, StatusCode, header};
    use chrono::{DateTime, TimeZone, Utc};
    use http_body_util::BodyExt;
    use tower::ServiceExt;

    use super::*;
    use crate::domain::{DispatchReport, SendOutcome, Settings};

    #[derive(Default)]
    struct StubPort {
        saved: Mutex<Vec<HashMap<String, String>>>,
        previews: Mutex<Vec<HashMap<String, String>>>,
        fail_preview: bool,
    }

    #[async_trait::async_trait]
    impl InputPort for StubPort {
        async fn settings(&self) -> Result<Settings, DomainError> {
            Ok(Settings::default())
        }

        async fn save_settings(
            &self,
            form: HashMap<String, String>,
        ) -> Result<Settings, DomainError> {
            if form.get("send_time").is_some_and(|t| t == "25:99") {
                return Err(DomainError::Settings("invalid send time".into()));
            }
            self.saved.lock().unwrap().push(form);
            Ok(Settings::default())
        }

        async fn send_now(&self) -> Result<SendOutcome, DomainError> {
            Ok(SendOutcome::Sent {
                report: DispatchReport {
                    recipients: 2,
                    sent: 2,
                    failed: 0,
                },
                items: 4,
                subject: "News".into(),
            })
        }

        async fn send_test(&self, to: &str) -> Result<SendOutcome, DomainError> {
            if !to.contains('@') {
                return Err(DomainError::Mail("invalid test address".into()));
            }
            Ok(SendOutcome::Sent {
                report: DispatchReport {
                    recipients: 1,
                    sent: 1,
                    failed: 0,
                },
                items: 4,
                subject: "[Test] News".into(),
            })
        }

        async fn preview(
            &self,
            overrides: &HashMap<String, String>,
        ) -> Result<String, DomainError> {
            if self.fail_preview {
                return Err(DomainError::Content("database unreachable".into()));
            }
            self.previews.lock().unwrap().push(overrides.clone());
            Ok("<html>digest</html>".into())
        }

        async fn next_send(&self) -> Result<Option<DateTime<Utc>>, DomainError> {
            Ok(Some(Utc.with_ymd_and_hms(2024, 3, 11, 7, 0, 0).unwrap()))
        }

        async fn activate(&self) -> Result<(), DomainError> {
            Ok(())
        }

        async fn deactivate(&self) -> Result<(), DomainError> {
            Ok(())
        }

        async fn uninstall(&self) -> Result<(), DomainError> {
            Ok(())
        }
    }

    fn app(port: Arc<StubPort>, token: Option<&str>) -> Router {
        build_router(AdminState {
            port,
            token: token.map(str::to_string),
            tz: FixedOffset::east_opt(3600).unwrap(),
        })
    }

    fn form_post(uri: &str, body: &str) -> Request<Body> {
        Request::builder()
            .method("POST")
            .uri(uri)
            .header(header::CONTENT_TYPE, "application/x-www-form-urlencoded")
            .body(Body::from(body.to_string()))
            .unwrap()
    }

    async fn body_text(res: axum::response::Response) -> String {
        let bytes = res.into_body().collect().await.unwrap().to_bytes();
        String::from_utf8(bytes.to_vec()).unwrap()
    }

    fn location(res: &axum::response::Response) -> String {
        res.headers()[header::LOCATION].to_str().unwrap().to_string()
    }

    #[tokio::test]
    async fn taken_address_is_a_server_error() {
        let held = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = held.local_addr().unwrap();
        let state = AdminState {
            port: Arc::new(StubPort::default()),
            token: None,
            tz: FixedOffset::east_opt(0).unwrap(),
        };
        let err = serve(state, addr).await.unwrap_err();
        assert!(matches!(err, DomainError::Server(_)));
    }

    #[tokio::test]
    async fn page_renders_next_send_in_site_time() {
        let res = app(Arc::new(StubPort::default()), None)
            .oneshot(Request::get("/admin").body(Body::empty()).unwrap())
            .await
            .unwrap();
        assert_eq!(res.status(), StatusCode::OK);
        let html = body_text(res).await;
        assert!(html.contains("Next automatic send: 11.03.2024 08:00"));
    }

    #[tokio::test]
    async fn token_is_required_when_configured() {
        let port = Arc::new(StubPort::default());
        let res = app(port.clone(), Some("s3cret"))
            .oneshot(Request::get("/admin").body(Body::empty()).unwrap())
            .await
            .unwrap();
        assert_eq!(res.status(), StatusCode::UNAUTHORIZED);
        assert!(body_text(res).await.contains("UNAUTHORIZED"));

        let res = app(port, Some("s3cret"))
            .oneshot(
                Request::get("/admin?tab=design&token=s3cret")
                    .body(Body::empty())
                    .unwrap(),
            )
            .await
            .unwrap();
        assert_eq!(res.status(), StatusCode::OK);
        assert!(body_text(res).await.contains("token=s3cret"));
    }

    #[tokio::test]
    async fn saving_redirects_with_a_notice() {
        let port = Arc::new(StubPort::default());
        let res = app(port.clone(), Some("t"))
            .oneshot(form_post(
                "/admin/options?tab=settings&token=t",
                "subject=News&roles=subscriber&roles=editor&enabled=1",
            ))
            .await
            .unwrap();
        assert_eq!(res.status(), StatusCode::SEE_OTHER);
        let to = location(&res);
        assert!(to.starts_with("/admin?tab=settings&notice="));
        assert!(to.ends_with("&token=t"));

        let saved = port.saved.lock().unwrap();
        assert_eq!(saved[0]["roles"], "subscriber,editor");
        assert_eq!(saved[0]["include_wp"], "0");
    }

    #[tokio::test]
    async fn invalid_settings_come_back_as_an_error() {
        let port = Arc::new(StubPort::default());
        let res = app(port.clone(), None)
            .oneshot(form_post("/admin/options?tab=settings", "send_time=25%3A99"))
            .await
            .unwrap();
        assert!(location(&res).contains("&error="));
        assert!(port.saved.lock().unwrap().is_empty());
    }

    #[tokio::test]
    async fn send_now_reports_counts() {
        let res = app(Arc::new(StubPort::default()), None)
            .oneshot(form_post("/admin/send-now", ""))
            .await
            .unwrap();
        let to = location(&res);
        let decoded = urlencoding::decode(&to).unwrap();
        assert!(decoded.contains("Newsletter sent to 2/2 recipients (4 items)."));
    }

    #[tokio::test]
    async fn test_send_with_bad_address_is_an_error() {
        let res = app(Arc::new(StubPort::default()), None)
            .oneshot(form_post("/admin/send-test", "email=nobody"))
            .await
            .unwrap();
        assert!(location(&res).contains("&error="));
    }

    #[tokio::test]
    async fn preview_passes_unsaved_values() {
        let port = Arc::new(StubPort::default());
        let res = app(port.clone(), None)
            .oneshot(form_post("/admin/preview", "email_header_title=Draft"))
            .await
            .unwrap();
        assert_eq!(res.status(), StatusCode::OK);
        let body: serde_json::Value = serde_json::from_str(&body_text(res).await).unwrap();
        assert_eq!(body["html"], "<html>digest</html>");
        assert_eq!(port.previews.lock().unwrap()[0]["email_header_title"], "Draft");
    }

    #[tokio::test]
    async fn preview_failure_is_still_ok_with_an_error_field() {
        let port = Arc::new(StubPort {
            fail_preview: true,
            ..Default::default()
        });
        let res = app(port.clone(), None)
            .oneshot(form_post("/admin/preview", ""))
            .await
            .unwrap();
        assert_eq!(res.status(), StatusCode::OK);
        assert!(body_text(res).await.contains("database unreachable"));

        let res = app(port, None)
            .oneshot(Request::get("/admin/preview/frame").body(Body::empty()).unwrap())
            .await
            .unwrap();
        assert!(body_text(res).await.contains("Preview unavailable"));
    }

    #[tokio::test]
    async fn root_redirects_to_admin_keeping_the_token() {
        let res = app(Arc::new(StubPort::default()), Some("t"))
            .oneshot(Request::get("/?token=t").body(Body::empty()).unwrap())
            .await
            .unwrap();
        assert_eq!(location(&res), "/admin?token=t");
    }
}
