//! Admin request handlers. Form posts redirect back to the page with a notice.

use std::collections::HashMap;

use axum::Form;
use axum::Json;
use axum::extract::{Query, State};
use axum::response::{Html, Redirect};
use serde::Deserialize;
use serde_json::{Value, json};
use tracing::{info, warn};

use super::AdminState;
use super::error::AdminResult;
use super::pages::{self, Notice, PageContext, Tab};
use crate::domain::SendOutcome;
use crate::domain::settings::keys;

#[derive(Debug, Default, Deserialize)]
pub struct PageQuery {
    pub tab: Option<String>,
    pub notice: Option<String>,
    pub error: Option<String>,
}

/// Fold posted pairs into one map. Repeated `roles` values are joined;
/// unchecked boxes of `tab` are absent from the post and become off.
pub fn form_values(pairs: Vec<(String, String)>, tab: Tab) -> HashMap<String, String> {
    let mut values: HashMap<String, String> = HashMap::new();
    let mut roles: Vec<String> = Vec::new();
    for (key, value) in pairs {
        if key == keys::ROLES || key == "roles[]" {
            roles.push(value);
        } else {
            values.insert(key, value);
        }
    }
    if !roles.is_empty() || tab == Tab::Settings {
        values.insert(keys::ROLES.to_string(), roles.join(","));
    }
    for name in tab.checkboxes() {
        values
            .entry(name.to_string())
            .or_insert_with(|| "0".to_string());
    }
    values
}

/// Back to the admin page of `tab`, carrying the token and one message.
fn back_to(state: &AdminState, tab: Tab, notice: Result<String, String>) -> Redirect {
    let mut url = format!("/admin?tab={}", tab.slug());
    let (key, text) = match notice {
        Ok(text) => ("notice", text),
        Err(text) => ("error", text),
    };
    url.push_str(&format!("&{}={}", key, urlencoding::encode(&text)));
    if let Some(token) = &state.token {
        url.push_str(&format!("&token={}", urlencoding::encode(token)));
    }
    Redirect::to(&url)
}

pub fn outcome_message(outcome: &SendOutcome) -> String {
    match outcome {
        SendOutcome::Disabled => {
            "The newsletter is disabled. Enable it on the settings tab to send.".to_string()
        }
        SendOutcome::Sent { report, items, .. } => format!(
            "Newsletter sent to {}/{} recipients ({} items).",
            report.sent, report.recipients, items
        ),
    }
}

pub async fn index(
    State(state): State<AdminState>,
    Query(query): Query<PageQuery>,
) -> AdminResult<Html<String>> {
    let tab = Tab::parse(query.tab.as_deref());
    let settings = state.port.settings().await?;
    let next_send = state.port.next_send().await?.map(|at| {
        at.with_timezone(&state.tz)
            .format("%d.%m.%Y %H:%M")
            .to_string()
    });
    let notice = match (query.error, query.notice) {
        (Some(e), _) => Some(Notice::Error(e)),
        (None, Some(n)) => Some(Notice::Success(n)),
        (None, None) => None,
    };
    Ok(Html(pages::render_page(&PageContext {
        tab,
        settings: &settings,
        next_send,
        notice,
        token: state.token.as_deref(),
    })))
}

pub async fn save_options(
    State(state): State<AdminState>,
    Query(query): Query<PageQuery>,
    Form(pairs): Form<Vec<(String, String)>>,
) -> Redirect {
    let tab = Tab::parse(query.tab.as_deref());
    let form = form_values(pairs, tab);
    match state.port.save_settings(form).await {
        Ok(_) => {
            info!(tab = tab.slug(), "settings saved from admin");
            back_to(&state, tab, Ok("Settings saved.".to_string()))
        }
        Err(e) => {
            warn!(tab = tab.slug(), error = %e, "settings rejected");
            back_to(&state, tab, Err(e.to_string()))
        }
    }
}

pub async fn send_now(State(state): State<AdminState>) -> Redirect {
    let result = state
        .port
        .send_now()
        .await
        .map(|o| outcome_message(&o))
        .map_err(|e| {
            warn!(error = %e, "manual send failed");
            e.to_string()
        });
    back_to(&state, Tab::Settings, result)
}

#[derive(Debug, Deserialize)]
pub struct TestForm {
    #[serde(default)]
    pub email: String,
}

pub async fn send_test(State(state): State<AdminState>, Form(form): Form<TestForm>) -> Redirect {
    let result = match state.port.send_test(&form.email).await {
        Ok(SendOutcome::Sent { report, .. }) if report.sent > 0 => {
            Ok(format!("Test email sent to {}.", form.email.trim()))
        }
        Ok(_) => Err(format!("Test email to {} failed.", form.email.trim())),
        Err(e) => Err(e.to_string()),
    };
    back_to(&state, Tab::Settings, result)
}

/// Preview with unsaved form values. Always 200; failures come back as `{error}`.
pub async fn preview(
    State(state): State<AdminState>,
    Form(pairs): Form<Vec<(String, String)>>,
) -> Json<Value> {
    let overrides = form_values(pairs, Tab::Design);
    match state.port.preview(&overrides).await {
        Ok(html) => Json(json!({ "html": html })),
        Err(e) => {
            warn!(error = %e, "preview failed");
            Json(json!({ "error": e.to_string() }))
        }
    }
}

/// Preview of the saved settings as a standalone document.
pub async fn preview_frame(State(state): State<AdminState>) -> Html<String> {
    match state.port.preview(&HashMap::new()).await {
        Ok(html) => Html(html),
        Err(e) => {
            warn!(error = %e, "preview failed");
            Html(pages::render_inline_error(&e.to_string()))
        }
    }
}
